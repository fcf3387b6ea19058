//! Scripted engine for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use simlink_proto::{DataRequest, DataType, DefinitionId, EventId, FieldSpec, ObjectId, RequestId, SimObjectType, Status};

use crate::engine::{Connection, Engine};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
	Open(String),
	Close,
	AddToDataDefinition {
		definition: DefinitionId,
		name: String,
		unit: Option<String>,
		data_type: DataType,
	},
	RequestData {
		request: RequestId,
		definition: DefinitionId,
		params: DataRequest,
	},
	RequestDataByType {
		request: RequestId,
		definition: DefinitionId,
		radius_meters: u32,
		object_type: SimObjectType,
	},
	SetData {
		definition: DefinitionId,
		object: ObjectId,
		flags: u32,
		data: Vec<u8>,
	},
	Subscribe(EventId, String),
	MapClientEvent(EventId, String),
	Transmit {
		object: ObjectId,
		event: EventId,
		data: u32,
		group: u32,
		flags: u32,
	},
	RequestSystemState(RequestId, String),
	FlightLoad(String),
}

/// Shared script and call log.
#[derive(Default)]
pub(crate) struct Script {
	inbox: Mutex<VecDeque<Result<Vec<u8>, Status>>>,
	calls: Mutex<Vec<Call>>,
	failures: Mutex<HashMap<&'static str, Status>>,
}

impl Script {
	/// Queues a message for the next poll.
	pub(crate) fn push(&self, bytes: Vec<u8>) {
		self.inbox.lock().push_back(Ok(bytes));
	}

	/// Queues a poll failure.
	pub(crate) fn push_status(&self, status: Status) {
		self.inbox.lock().push_back(Err(status));
	}

	/// Makes the next call named `op` fail with `status`.
	pub(crate) fn fail_once(&self, op: &'static str, status: Status) {
		self.failures.lock().insert(op, status);
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub(crate) fn pending(&self) -> usize {
		self.inbox.lock().len()
	}

	fn record(&self, op: &'static str, call: Call) -> Result<(), Status> {
		self.calls.lock().push(call);
		match self.failures.lock().remove(op) {
			Some(status) => Err(status),
			None => Ok(()),
		}
	}
}

pub(crate) struct MockEngine {
	pub(crate) script: Arc<Script>,
}

impl MockEngine {
	pub(crate) fn new() -> (Self, Arc<Script>) {
		let script = Arc::new(Script::default());
		(
			Self {
				script: Arc::clone(&script),
			},
			script,
		)
	}
}

impl Engine for MockEngine {
	type Connection = MockConnection;

	fn open(&self, app_name: &str) -> Result<MockConnection, Status> {
		self.script.record("open", Call::Open(app_name.to_owned()))?;
		Ok(MockConnection {
			script: Arc::clone(&self.script),
		})
	}
}

pub(crate) struct MockConnection {
	script: Arc<Script>,
}

impl Connection for MockConnection {
	fn close(&self) -> Result<(), Status> {
		self.script.record("close", Call::Close)
	}

	fn next_dispatch(&self) -> Result<Vec<u8>, Status> {
		self.script.inbox.lock().pop_front().unwrap_or(Err(Status::E_FAIL))
	}

	fn add_to_data_definition(&self, definition: DefinitionId, field: &FieldSpec) -> Result<(), Status> {
		self.script.record(
			"add_to_data_definition",
			Call::AddToDataDefinition {
				definition,
				name: field.name.clone(),
				unit: field.unit.clone(),
				data_type: field.data_type,
			},
		)
	}

	fn request_data_on_sim_object(&self, request: RequestId, definition: DefinitionId, params: &DataRequest) -> Result<(), Status> {
		self.script.record(
			"request_data_on_sim_object",
			Call::RequestData {
				request,
				definition,
				params: *params,
			},
		)
	}

	fn request_data_on_sim_object_type(
		&self,
		request: RequestId,
		definition: DefinitionId,
		radius_meters: u32,
		object_type: SimObjectType,
	) -> Result<(), Status> {
		self.script.record(
			"request_data_on_sim_object_type",
			Call::RequestDataByType {
				request,
				definition,
				radius_meters,
				object_type,
			},
		)
	}

	fn set_data_on_sim_object(&self, definition: DefinitionId, object: ObjectId, flags: u32, data: &[u8]) -> Result<(), Status> {
		self.script.record(
			"set_data_on_sim_object",
			Call::SetData {
				definition,
				object,
				flags,
				data: data.to_vec(),
			},
		)
	}

	fn subscribe_to_system_event(&self, event: EventId, name: &str) -> Result<(), Status> {
		self.script.record("subscribe_to_system_event", Call::Subscribe(event, name.to_owned()))
	}

	fn map_client_event_to_sim_event(&self, event: EventId, name: &str) -> Result<(), Status> {
		self.script.record("map_client_event_to_sim_event", Call::MapClientEvent(event, name.to_owned()))
	}

	fn transmit_client_event(&self, object: ObjectId, event: EventId, data: u32, group: u32, flags: u32) -> Result<(), Status> {
		self.script.record(
			"transmit_client_event",
			Call::Transmit {
				object,
				event,
				data,
				group,
				flags,
			},
		)
	}

	fn request_system_state(&self, request: RequestId, name: &str) -> Result<(), Status> {
		self.script.record("request_system_state", Call::RequestSystemState(request, name.to_owned()))
	}

	fn flight_load(&self, path: &str) -> Result<(), Status> {
		self.script.record("flight_load", Call::FlightLoad(path.to_owned()))
	}
}

/// Installs a test-writer subscriber once per process.
pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}
