//! Message router: classify one notification and run its handler.

use simlink_proto::{EventId, Message, RequestId, SimObjectData, SystemState};

use crate::decoder::{Record, decode_record};
use crate::dispatch::Notification;
use crate::engine::Engine;
use crate::error::{BridgeError, DecodeError};
use crate::handlers::{EventPayload, RequestHandler};
use crate::session::Session;

impl<E: Engine> Session<E> {
	pub(crate) fn route(&self, notification: &Notification) {
		let generation = notification.generation();
		// Anything polled from a connection that has since been closed or
		// replaced is stale.
		if self.shared.handle.generation() != Some(generation) {
			tracing::debug!(generation, "router.stale");
			return;
		}
		match notification {
			Notification::Failure { status, .. } => {
				if self.shared.handle.clear_generation(generation).is_none() {
					return;
				}
				tracing::warn!(%status, generation, "router.connection.lost");
				self.callbacks.report(&BridgeError::Status {
					op: "next_dispatch",
					status: *status,
				});
			}
			Notification::Message { bytes, .. } => match Message::parse(bytes) {
				Ok(message) => self.route_message(generation, message),
				Err(err) => {
					tracing::warn!(error = %err, "router.malformed");
					self.callbacks.report(&BridgeError::Malformed(err));
				}
			},
		}
	}

	fn route_message(&self, generation: u64, message: Message<'_>) {
		match message {
			Message::Null => tracing::trace!("router.null"),
			Message::Open(info) => self.fire_event(self.reserved.open, &EventPayload::Open(info)),
			Message::Quit => {
				self.shared.handle.clear_generation(generation);
				tracing::info!(generation, "router.quit");
				self.fire_event(self.reserved.quit, &EventPayload::Quit);
			}
			Message::Exception(info) => {
				tracing::debug!(exception = info.name, send_id = info.send_id, index = info.index, "router.exception");
				self.fire_event(self.reserved.exception, &EventPayload::Exception(info));
			}
			Message::Event(ev) => self.fire_event(ev.event_id, &EventPayload::Data(ev.data)),
			Message::EventFilename(ev) => self.fire_event(ev.event_id, &EventPayload::Filename(ev.file_name)),
			Message::EventFrame(ev) => self.fire_event(
				ev.event_id,
				&EventPayload::Frame {
					frame_rate: ev.frame_rate,
					sim_speed: ev.sim_speed,
				},
			),
			Message::SimObjectData(data) => self.deliver_data(&data),
			Message::SimObjectDataByType(data) => {
				self.deliver_data(&data);
				if data.is_last_entry() {
					self.finish_one_shot(data.request_id);
				}
			}
			Message::SystemState(state) => self.deliver_system_state(&state),
			Message::Unhandled(kind) => tracing::debug!(?kind, "router.unhandled"),
			Message::Unrecognized(raw) => tracing::warn!(kind = raw, "router.unrecognized"),
		}
	}

	fn fire_event(&self, id: EventId, payload: &EventPayload) {
		match self.callbacks.event(id) {
			Some(handler) => handler(payload),
			None => tracing::debug!(event_id = id.0, "router.event.unclaimed"),
		}
	}

	fn deliver_data(&self, data: &SimObjectData<'_>) {
		let Some(registration) = self.callbacks.request(data.request_id) else {
			tracing::debug!(request_id = data.request_id.0, "router.data.unclaimed");
			return;
		};
		let RequestHandler::Data(handler) = registration.handler else {
			tracing::warn!(request_id = data.request_id.0, "router.data.mismatched");
			return;
		};
		match self.decode(data) {
			Ok(record) => handler(&record),
			Err(err) => self.callbacks.report(&BridgeError::Decode(err)),
		}
	}

	fn decode(&self, data: &SimObjectData<'_>) -> Result<Record, DecodeError> {
		let definition = self.definitions.get(data.define_id).ok_or(DecodeError::UnknownDefinition(data.define_id))?;
		decode_record(&definition, data.data, self.config.string_padding, |payload, offset| {
			self.engine.retrieve_string(payload, offset)
		})
	}

	/// Drops the registration of a finished request and recycles its id.
	fn finish_one_shot(&self, request_id: RequestId) {
		if let Some(registration) = self.callbacks.take_request(request_id)
			&& registration.one_shot
		{
			self.ids.release_request_id(request_id);
			tracing::trace!(request_id = request_id.0, "router.request.recycled");
		}
	}

	fn deliver_system_state(&self, state: &SystemState) {
		match self.callbacks.request(state.request_id).map(|r| r.handler) {
			Some(RequestHandler::SystemState(handler)) => {
				self.callbacks.take_request(state.request_id);
				handler(state);
			}
			Some(_) => tracing::warn!(request_id = state.request_id.0, "router.system_state.mismatched"),
			None => tracing::debug!(request_id = state.request_id.0, "router.system_state.unclaimed"),
		}
	}
}
