//! Callback registries.
//!
//! Handlers are cloned out of the maps before they run, so a handler may
//! freely call back into the session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use simlink_proto::{EventId, ExceptionInfo, OpenInfo, RequestId, SystemState};

use crate::decoder::Record;
use crate::error::BridgeError;

/// What an event handler receives.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
	/// Plain system event with its scalar payload.
	Data(u32),
	/// Event carrying a file path, such as a flight load.
	Filename(String),
	/// Per-frame event.
	Frame { frame_rate: f32, sim_speed: f32 },
	Open(OpenInfo),
	Quit,
	Exception(ExceptionInfo),
}

/// Receives system event payloads.
pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync>;
/// Receives decoded data records.
pub type DataHandler = Arc<dyn Fn(&Record) + Send + Sync>;
/// Receives the answer to a system state query.
pub type SystemStateHandler = Arc<dyn Fn(&SystemState) + Send + Sync>;
/// Receives every reported failure.
pub type ErrorHandler = Arc<dyn Fn(&BridgeError) + Send + Sync>;

/// Handler bound to a request id.
#[derive(Clone)]
pub(crate) enum RequestHandler {
	Data(DataHandler),
	SystemState(SystemStateHandler),
}

#[derive(Clone)]
pub(crate) struct RequestRegistration {
	pub(crate) handler: RequestHandler,
	/// The id goes back to the pool once the final response is consumed.
	pub(crate) one_shot: bool,
}

/// Handlers installed by [`Session::open`](crate::Session::open).
///
/// The open, quit and exception handlers live under the session's reserved
/// event ids; the error handler receives every reported failure.
#[derive(Clone, Default)]
pub struct SessionHandlers {
	pub on_open: Option<Arc<dyn Fn(&OpenInfo) + Send + Sync>>,
	pub on_quit: Option<Arc<dyn Fn() + Send + Sync>>,
	pub on_exception: Option<Arc<dyn Fn(&ExceptionInfo) + Send + Sync>>,
	pub on_error: Option<ErrorHandler>,
}

impl SessionHandlers {
	/// No handlers installed.
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs once the engine acknowledges the connection.
	pub fn on_open(mut self, f: impl Fn(&OpenInfo) + Send + Sync + 'static) -> Self {
		self.on_open = Some(Arc::new(f));
		self
	}

	/// Runs when the engine ends the session.
	pub fn on_quit(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_quit = Some(Arc::new(f));
		self
	}

	/// Runs for each exception the engine reports.
	pub fn on_exception(mut self, f: impl Fn(&ExceptionInfo) + Send + Sync + 'static) -> Self {
		self.on_exception = Some(Arc::new(f));
		self
	}

	/// Runs for each reported failure.
	pub fn on_error(mut self, f: impl Fn(&BridgeError) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(f));
		self
	}
}

impl std::fmt::Debug for SessionHandlers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionHandlers")
			.field("on_open", &self.on_open.is_some())
			.field("on_quit", &self.on_quit.is_some())
			.field("on_exception", &self.on_exception.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

#[derive(Default)]
pub(crate) struct Callbacks {
	events: RwLock<HashMap<EventId, EventHandler>>,
	requests: Mutex<HashMap<RequestId, RequestRegistration>>,
	error: RwLock<Option<ErrorHandler>>,
}

impl Callbacks {
	/// Binds `handler` to `id`, replacing any earlier binding.
	pub(crate) fn register_event(&self, id: EventId, handler: EventHandler) {
		if self.events.write().insert(id, handler).is_some() {
			tracing::debug!(event_id = id.0, "registry.event.replaced");
		}
	}

	pub(crate) fn unregister_event(&self, id: EventId) {
		self.events.write().remove(&id);
	}

	pub(crate) fn event(&self, id: EventId) -> Option<EventHandler> {
		self.events.read().get(&id).cloned()
	}

	/// Binds `handler` to `id`, replacing any earlier binding.
	pub(crate) fn register_request(&self, id: RequestId, handler: RequestHandler, one_shot: bool) {
		if self.requests.lock().insert(id, RequestRegistration { handler, one_shot }).is_some() {
			tracing::debug!(request_id = id.0, "registry.request.replaced");
		}
	}

	pub(crate) fn request(&self, id: RequestId) -> Option<RequestRegistration> {
		self.requests.lock().get(&id).cloned()
	}

	pub(crate) fn take_request(&self, id: RequestId) -> Option<RequestRegistration> {
		self.requests.lock().remove(&id)
	}

	pub(crate) fn set_error_handler(&self, handler: Option<ErrorHandler>) {
		*self.error.write() = handler;
	}

	/// Hands `err` to the error handler, or logs it when none is installed.
	pub(crate) fn report(&self, err: &BridgeError) {
		let handler = self.error.read().clone();
		match handler {
			Some(handler) => handler(err),
			None => tracing::warn!(error = %err, "router.error.unhandled"),
		}
	}

	#[cfg(test)]
	pub(crate) fn request_count(&self) -> usize {
		self.requests.lock().len()
	}
}
