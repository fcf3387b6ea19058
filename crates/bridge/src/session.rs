//! Host-facing session.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use simlink_proto::{
	DataRequest, DataType, DefinitionId, EVENT_FLAG_GROUPID_IS_PRIORITY, EventId, FieldSpec, GROUP_PRIORITY_HIGHEST, InitPosition,
	ObjectId, RequestId, SimObjectType, Status, SystemState,
};
use simlink_worker::{Handoff, Wakeup};

use crate::config::BridgeConfig;
use crate::decoder::Record;
use crate::definitions::{self, DefinitionTable};
use crate::dispatch::{self, PollTiming, Shared};
use crate::engine::{Connection, ConnectionHandle, Engine};
use crate::error::{BridgeError, Result};
use crate::handlers::{Callbacks, EventPayload, RequestHandler, SessionHandlers};
use crate::ids::Registries;

/// Where a by-type request gets its definition from.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionSource {
	/// Create a fresh definition from these fields.
	Fields(Vec<FieldSpec>),
	/// Reuse a definition created earlier on this session.
	Existing(DefinitionId),
}

impl From<Vec<FieldSpec>> for DefinitionSource {
	fn from(fields: Vec<FieldSpec>) -> Self {
		Self::Fields(fields)
	}
}

impl From<DefinitionId> for DefinitionSource {
	fn from(id: DefinitionId) -> Self {
		Self::Existing(id)
	}
}

/// Event ids claimed at construction for the built-in handlers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReservedEvents {
	pub(crate) open: EventId,
	pub(crate) quit: EventId,
	pub(crate) exception: EventId,
}

/// A single engine connection plus everything registered against it.
///
/// Every handler runs on whichever thread calls one of the `dispatch_*`
/// methods. Handlers may call back into the session but must not dispatch
/// recursively.
pub struct Session<E: Engine> {
	pub(crate) engine: E,
	pub(crate) config: BridgeConfig,
	pub(crate) shared: Arc<Shared<E::Connection>>,
	pub(crate) ids: Registries,
	pub(crate) definitions: DefinitionTable,
	pub(crate) callbacks: Callbacks,
	pub(crate) reserved: ReservedEvents,
	client_events: Mutex<HashMap<String, EventId>>,
	bridge: Mutex<Option<JoinHandle<()>>>,
}

impl<E: Engine> Session<E> {
	/// Creates a closed session with the default configuration.
	pub fn new(engine: E) -> Self {
		Self::with_config(engine, BridgeConfig::default())
	}

	/// Creates a closed session with `config`.
	pub fn with_config(engine: E, config: BridgeConfig) -> Self {
		Self::build(engine, config, Handoff::new())
	}

	/// Creates a closed session configured from the TOML file at `path`.
	pub fn from_config_file(engine: E, path: impl AsRef<Path>) -> Result<Self> {
		let config = BridgeConfig::load(path)?;
		tracing::debug!(?config, "session.config.loaded");
		Ok(Self::with_config(engine, config))
	}

	/// Like [`Session::with_config`], calling `wakeup` after each published
	/// notification so a foreign event loop can schedule a
	/// [`Session::try_dispatch`].
	pub fn with_wakeup(engine: E, config: BridgeConfig, wakeup: impl Fn() + Send + Sync + 'static) -> Self {
		let wakeup: Wakeup = Arc::new(wakeup);
		Self::build(engine, config, Handoff::with_wakeup(wakeup))
	}

	fn build(engine: E, config: BridgeConfig, handoff: Handoff<dispatch::Notification>) -> Self {
		let ids = Registries::default();
		let reserved = ReservedEvents {
			open: ids.allocate_event_id(),
			quit: ids.allocate_event_id(),
			exception: ids.allocate_event_id(),
		};
		Self {
			engine,
			config,
			shared: Arc::new(Shared {
				handle: ConnectionHandle::empty(),
				handoff,
			}),
			ids,
			definitions: DefinitionTable::default(),
			callbacks: Callbacks::default(),
			reserved,
			client_events: Mutex::new(HashMap::new()),
			bridge: Mutex::new(None),
		}
	}

	/// The configuration this session was built with.
	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Opens a connection and starts delivering its messages.
	///
	/// `handlers` replace those of any earlier open. The dispatch thread is
	/// started on the first successful open and reused afterwards.
	pub fn open(&self, app_name: &str, handlers: SessionHandlers) -> Result<()> {
		if self.shared.handle.is_connected() {
			return Err(BridgeError::AlreadyConnected);
		}
		self.install(handlers);
		self.client_events.lock().clear();

		let conn = self.engine.open(app_name).map_err(|status| self.fail(BridgeError::Status { op: "open", status }))?;
		self.shared.handle.store(conn);
		if let Err(err) = self.ensure_bridge() {
			self.shared.handle.clear();
			return Err(self.fail(err));
		}
		tracing::info!(app_name, "session.open");
		Ok(())
	}

	fn install(&self, handlers: SessionHandlers) {
		let SessionHandlers {
			on_open,
			on_quit,
			on_exception,
			on_error,
		} = handlers;
		let ReservedEvents { open, quit, exception } = self.reserved;

		match on_open {
			Some(f) => self.callbacks.register_event(
				open,
				Arc::new(move |payload: &EventPayload| {
					if let EventPayload::Open(info) = payload {
						f(info);
					}
				}),
			),
			None => self.callbacks.unregister_event(open),
		}
		match on_quit {
			Some(f) => self.callbacks.register_event(
				quit,
				Arc::new(move |payload: &EventPayload| {
					if let EventPayload::Quit = payload {
						f();
					}
				}),
			),
			None => self.callbacks.unregister_event(quit),
		}
		match on_exception {
			Some(f) => self.callbacks.register_event(
				exception,
				Arc::new(move |payload: &EventPayload| {
					if let EventPayload::Exception(info) = payload {
						f(info);
					}
				}),
			),
			None => self.callbacks.unregister_event(exception),
		}
		self.callbacks.set_error_handler(on_error);
	}

	fn ensure_bridge(&self) -> Result<()> {
		let mut bridge = self.bridge.lock();
		if bridge.is_none() {
			let timing = PollTiming {
				idle: self.config.idle_poll(),
				disconnected: self.config.disconnected_poll(),
			};
			let handle = dispatch::spawn_bridge(&self.config.thread_name, Arc::clone(&self.shared), timing).map_err(BridgeError::Spawn)?;
			*bridge = Some(handle);
		}
		Ok(())
	}

	/// Closes the connection. A no-op when none is open.
	pub fn close(&self) -> Result<()> {
		let Some(conn) = self.shared.handle.clear() else {
			return Ok(());
		};
		self.call("close", conn.close())?;
		tracing::info!("session.close");
		Ok(())
	}

	/// Returns true while a connection is open.
	pub fn is_connected(&self) -> bool {
		self.shared.handle.is_connected()
	}

	/// Subscribes to a named system event.
	pub fn subscribe_to_system_event(&self, name: &str, handler: impl Fn(&EventPayload) + Send + Sync + 'static) -> Result<EventId> {
		let conn = self.connection()?;
		let id = self.ids.allocate_event_id();
		self.callbacks.register_event(id, Arc::new(handler));
		if let Err(err) = self.call("subscribe_to_system_event", conn.subscribe_to_system_event(id, name)) {
			self.callbacks.unregister_event(id);
			return Err(err);
		}
		tracing::debug!(event_id = id.0, name, "session.subscribe");
		Ok(id)
	}

	/// Creates a definition from `fields` and requests it for one object.
	pub fn request_data_on_sim_object(
		&self,
		fields: &[FieldSpec],
		params: DataRequest,
		handler: impl Fn(&Record) + Send + Sync + 'static,
	) -> Result<RequestId> {
		let conn = self.connection()?;
		let definition = self.definitions.create(&self.ids, &*conn, fields).map_err(|err| self.fail(err))?;
		self.issue_request(RequestHandler::Data(Arc::new(handler)), false, |request| {
			self.call(
				"request_data_on_sim_object",
				conn.request_data_on_sim_object(request, definition, &params),
			)
		})
	}

	/// Requests `source` for every object of `object_type` within
	/// `radius_meters`. The request id is recycled after the final entry.
	pub fn request_data_on_sim_object_type(
		&self,
		source: impl Into<DefinitionSource>,
		radius_meters: u32,
		object_type: SimObjectType,
		handler: impl Fn(&Record) + Send + Sync + 'static,
	) -> Result<RequestId> {
		let conn = self.connection()?;
		let definition = match source.into() {
			DefinitionSource::Fields(fields) => self.definitions.create(&self.ids, &*conn, &fields),
			DefinitionSource::Existing(id) => self.definitions.lookup(id).map(|d| d.id),
		}
		.map_err(|err| self.fail(err))?;
		self.issue_request(RequestHandler::Data(Arc::new(handler)), true, |request| {
			self.call(
				"request_data_on_sim_object_type",
				conn.request_data_on_sim_object_type(request, definition, radius_meters, object_type),
			)
		})
	}

	/// Registers the handler before the engine call so an immediate
	/// response cannot miss it; rolls back on failure.
	fn issue_request(&self, handler: RequestHandler, one_shot: bool, send: impl FnOnce(RequestId) -> Result<()>) -> Result<RequestId> {
		let request = self.ids.allocate_request_id();
		self.callbacks.register_request(request, handler, one_shot);
		if let Err(err) = send(request) {
			self.callbacks.take_request(request);
			self.ids.release_request_id(request);
			return Err(err);
		}
		tracing::debug!(request_id = request.0, one_shot, "session.request");
		Ok(request)
	}

	/// Creates a reusable definition, e.g. for later by-type requests.
	pub fn create_data_definition(&self, fields: &[FieldSpec]) -> Result<DefinitionId> {
		let conn = self.connection()?;
		self.definitions.create(&self.ids, &*conn, fields).map_err(|err| self.fail(err))
	}

	/// Writes one `Float64` simulation variable.
	pub fn set_data_on_sim_object(&self, name: &str, unit: &str, value: f64, object: ObjectId, flags: u32) -> Result<()> {
		let conn = self.connection()?;
		let definition = definitions::define(&self.ids, &*conn, &[FieldSpec::new(name, unit)]).map_err(|err| self.fail(err))?;
		self.call(
			"set_data_on_sim_object",
			conn.set_data_on_sim_object(definition.id, object, flags, &value.to_le_bytes()),
		)
	}

	/// Places the user aircraft.
	pub fn set_aircraft_initial_position(&self, position: &InitPosition) -> Result<()> {
		let conn = self.connection()?;
		let field = FieldSpec::unitless("Initial Position", DataType::InitPosition);
		let definition = definitions::define(&self.ids, &*conn, &[field]).map_err(|err| self.fail(err))?;
		self.call(
			"set_data_on_sim_object",
			conn.set_data_on_sim_object(definition.id, ObjectId::USER, 0, &position.to_bytes()),
		)
	}

	/// Sends a named client event to the user aircraft.
	///
	/// Each name is mapped once per connection.
	pub fn transmit_client_event(&self, name: &str, data: u32) -> Result<()> {
		let conn = self.connection()?;
		let event = self.client_event(&*conn, name)?;
		self.call(
			"transmit_client_event",
			conn.transmit_client_event(ObjectId::USER, event, data, GROUP_PRIORITY_HIGHEST, EVENT_FLAG_GROUPID_IS_PRIORITY),
		)
	}

	fn client_event(&self, conn: &E::Connection, name: &str) -> Result<EventId> {
		if let Some(&id) = self.client_events.lock().get(name) {
			return Ok(id);
		}
		let id = self.ids.allocate_event_id();
		self.call("map_client_event_to_sim_event", conn.map_client_event_to_sim_event(id, name))?;
		Ok(*self.client_events.lock().entry(name.to_owned()).or_insert(id))
	}

	/// Queries a named system state; `handler` receives the single response.
	pub fn request_system_state(&self, name: &str, handler: impl Fn(&SystemState) + Send + Sync + 'static) -> Result<RequestId> {
		let conn = self.connection()?;
		let request = self.ids.allocate_request_id();
		self.callbacks.register_request(request, RequestHandler::SystemState(Arc::new(handler)), false);
		if let Err(err) = self.call("request_system_state", conn.request_system_state(request, name)) {
			self.callbacks.take_request(request);
			self.ids.release_request_id(request);
			return Err(err);
		}
		Ok(request)
	}

	/// Loads a saved flight.
	pub fn flight_load(&self, path: &str) -> Result<()> {
		let conn = self.connection()?;
		self.call("flight_load", conn.flight_load(path))
	}

	/// Blocks until a notification arrives and routes it.
	///
	/// Returns false once the session is shutting down.
	pub fn dispatch_next(&self) -> bool {
		match self.shared.handoff.recv() {
			Some(delivery) => {
				self.route(&delivery);
				true
			}
			None => false,
		}
	}

	/// Routes a pending notification if there is one.
	pub fn try_dispatch(&self) -> bool {
		match self.shared.handoff.try_recv() {
			Some(delivery) => {
				self.route(&delivery);
				true
			}
			None => false,
		}
	}

	/// Like [`Session::dispatch_next`], giving up after `timeout`.
	pub fn dispatch_next_timeout(&self, timeout: Duration) -> bool {
		match self.shared.handoff.recv_timeout(timeout) {
			Some(delivery) => {
				self.route(&delivery);
				true
			}
			None => false,
		}
	}

	/// Waits for a notification without blocking the executor, then routes it.
	pub async fn dispatch_next_async(&self) -> bool {
		match self.shared.handoff.recv_async().await {
			Some(delivery) => {
				self.route(&delivery);
				true
			}
			None => false,
		}
	}

	fn connection(&self) -> Result<Arc<E::Connection>> {
		self.shared.handle.load().ok_or(BridgeError::NotConnected)
	}

	/// Maps a failing engine status to an error and reports it.
	fn call(&self, op: &'static str, result: std::result::Result<(), Status>) -> Result<()> {
		result.map_err(|status| self.fail(BridgeError::Status { op, status }))
	}

	pub(crate) fn fail(&self, err: BridgeError) -> BridgeError {
		tracing::debug!(error = %err, "session.call.failed");
		self.callbacks.report(&err);
		err
	}
}

impl<E: Engine> Drop for Session<E> {
	fn drop(&mut self) {
		self.shared.handoff.close();
		if let Some(handle) = self.bridge.get_mut().take()
			&& handle.join().is_err()
		{
			tracing::warn!("bridge.panicked");
		}
		if let Some(conn) = self.shared.handle.clear()
			&& let Err(status) = conn.close()
		{
			tracing::debug!(%status, "session.close.failed");
		}
	}
}
