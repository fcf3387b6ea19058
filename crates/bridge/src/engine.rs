//! Seam to the engine's connection primitive.
//!
//! The bridge never links the engine's client library directly. A host
//! supplies an [`Engine`] that opens connections, and each [`Connection`]
//! exposes the blocking calls the session and dispatch loop need. Every call
//! reports the engine's raw [`Status`] on failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use simlink_proto::{DataRequest, DefinitionId, EventId, FieldSpec, ObjectId, RequestId, SimObjectType, Status};

/// Factory for engine connections.
pub trait Engine: Send + Sync + 'static {
	/// Connection type produced by [`Engine::open`].
	type Connection: Connection;

	/// Opens a connection registered under `app_name`.
	fn open(&self, app_name: &str) -> Result<Self::Connection, Status>;

	/// Extracts a NUL-terminated string at `offset` within a record payload.
	///
	/// Returns the string and the number of bytes it occupies.
	fn retrieve_string(&self, payload: &[u8], offset: usize) -> Result<(String, usize), Status> {
		simlink_proto::retrieve_string(payload, offset)
	}
}

/// One open engine connection.
///
/// Shared between the dispatch thread, which only calls
/// [`Connection::next_dispatch`], and the host thread, which issues every
/// other call.
pub trait Connection: Send + Sync + 'static {
	fn close(&self) -> Result<(), Status>;

	/// Polls for the next message without blocking.
	///
	/// A non-fatal error status means no message is ready.
	fn next_dispatch(&self) -> Result<Vec<u8>, Status>;

	fn add_to_data_definition(&self, definition: DefinitionId, field: &FieldSpec) -> Result<(), Status>;

	fn request_data_on_sim_object(&self, request: RequestId, definition: DefinitionId, params: &DataRequest) -> Result<(), Status>;

	fn request_data_on_sim_object_type(
		&self,
		request: RequestId,
		definition: DefinitionId,
		radius_meters: u32,
		object_type: SimObjectType,
	) -> Result<(), Status>;

	fn set_data_on_sim_object(&self, definition: DefinitionId, object: ObjectId, flags: u32, data: &[u8]) -> Result<(), Status>;

	fn subscribe_to_system_event(&self, event: EventId, name: &str) -> Result<(), Status>;

	fn map_client_event_to_sim_event(&self, event: EventId, name: &str) -> Result<(), Status>;

	fn transmit_client_event(&self, object: ObjectId, event: EventId, data: u32, group: u32, flags: u32) -> Result<(), Status>;

	fn request_system_state(&self, request: RequestId, name: &str) -> Result<(), Status>;

	fn flight_load(&self, path: &str) -> Result<(), Status>;
}

/// A stored connection tagged with the open that produced it.
pub(crate) struct Live<C> {
	pub(crate) generation: u64,
	pub(crate) conn: Arc<C>,
}

/// Shared, swappable slot holding the active connection.
///
/// Readers take an `Arc` clone, so clearing the slot never frees a
/// connection that an in-flight call is still using. Each store bumps the
/// generation, which lets the router tell a stale notification from one
/// produced by the current connection.
pub(crate) struct ConnectionHandle<C> {
	slot: ArcSwapOption<Live<C>>,
	generations: AtomicU64,
}

impl<C> ConnectionHandle<C> {
	pub(crate) fn empty() -> Self {
		Self {
			slot: ArcSwapOption::empty(),
			generations: AtomicU64::new(0),
		}
	}

	pub(crate) fn load(&self) -> Option<Arc<C>> {
		(*self.slot.load()).as_ref().map(|live| Arc::clone(&live.conn))
	}

	pub(crate) fn live(&self) -> Option<Arc<Live<C>>> {
		self.slot.load_full()
	}

	/// Generation of the stored connection, if any.
	pub(crate) fn generation(&self) -> Option<u64> {
		(*self.slot.load()).as_ref().map(|live| live.generation)
	}

	/// Stores `conn` under a fresh generation and returns it.
	pub(crate) fn store(&self, conn: C) -> u64 {
		let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
		self.slot.store(Some(Arc::new(Live {
			generation,
			conn: Arc::new(conn),
		})));
		generation
	}

	/// Empties the slot, returning the previous connection.
	pub(crate) fn clear(&self) -> Option<Arc<C>> {
		self.slot.swap(None).map(|live| Arc::clone(&live.conn))
	}

	/// Empties the slot only while it still holds `generation`.
	pub(crate) fn clear_generation(&self, generation: u64) -> Option<Arc<C>> {
		let current = self.slot.load();
		if (*current).as_ref().is_none_or(|live| live.generation != generation) {
			return None;
		}
		let previous = self.slot.compare_and_swap(&current, None::<Arc<Live<C>>>);
		match (&*previous, &*current) {
			(Some(prev), Some(cur)) if Arc::ptr_eq(prev, cur) => Some(Arc::clone(&prev.conn)),
			_ => None,
		}
	}

	pub(crate) fn is_connected(&self) -> bool {
		self.slot.load().is_some()
	}
}
