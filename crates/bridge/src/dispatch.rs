//! Background dispatch loop.
//!
//! One named thread polls the engine and hands each result to the host
//! through a [`Handoff`]. The permit is acquired before polling, so a new
//! poll only starts once the host has finished routing the previous
//! notification.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use simlink_proto::Status;
use simlink_worker::{Handoff, spawn_named_thread};

use crate::engine::{Connection, ConnectionHandle};

/// One unit of work produced by one poll call.
///
/// `generation` names the connection that was polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notification {
	/// Owned copy of a received message.
	Message { generation: u64, bytes: Vec<u8> },
	/// Fatal status from the poll call.
	Failure { generation: u64, status: Status },
}

impl Notification {
	pub(crate) fn generation(&self) -> u64 {
		match self {
			Self::Message { generation, .. } | Self::Failure { generation, .. } => *generation,
		}
	}
}

/// State shared between the dispatch thread and the session.
pub(crate) struct Shared<C> {
	pub(crate) handle: ConnectionHandle<C>,
	pub(crate) handoff: Handoff<Notification>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollTiming {
	pub(crate) idle: Duration,
	pub(crate) disconnected: Duration,
}

pub(crate) fn spawn_bridge<C: Connection>(name: &str, shared: Arc<Shared<C>>, timing: PollTiming) -> std::io::Result<JoinHandle<()>> {
	spawn_named_thread(name, move || run(&shared, timing))
}

/// Runs until the handoff is closed.
pub(crate) fn run<C: Connection>(shared: &Shared<C>, timing: PollTiming) {
	tracing::debug!("bridge.start");
	loop {
		let Some(permit) = shared.handoff.acquire() else {
			break;
		};
		let Some(live) = shared.handle.live() else {
			drop(permit);
			std::thread::sleep(timing.disconnected);
			continue;
		};
		let generation = live.generation;
		match live.conn.next_dispatch() {
			Ok(bytes) => {
				tracing::trace!(len = bytes.len(), generation, "bridge.poll.message");
				permit.publish(Notification::Message { generation, bytes });
			}
			Err(status) if status.is_fatal() => {
				tracing::debug!(%status, generation, "bridge.poll.failure");
				permit.publish(Notification::Failure { generation, status });
			}
			Err(_) => {
				drop(permit);
				std::thread::sleep(timing.idle);
			}
		}
	}
	tracing::debug!("bridge.stop");
}

#[cfg(test)]
mod tests;
