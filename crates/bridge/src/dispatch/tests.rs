use std::time::Duration;

use simlink_proto::fixtures;

use super::*;
use crate::engine::Engine;
use crate::testing::{MockConnection, MockEngine, Script};

const WAIT: Duration = Duration::from_secs(2);

/// Generation of the connection stored by `start(true)`.
const FIRST: u64 = 1;

fn start(connected: bool) -> (Arc<Shared<MockConnection>>, Arc<Script>, JoinHandle<()>) {
	let (engine, script) = MockEngine::new();
	let shared = Arc::new(Shared {
		handle: ConnectionHandle::empty(),
		handoff: Handoff::new(),
	});
	if connected {
		shared.handle.store(engine.open("test").unwrap());
	}
	let timing = PollTiming {
		idle: Duration::from_millis(1),
		disconnected: Duration::from_millis(1),
	};
	let handle = spawn_bridge("simlink-dispatch-test", Arc::clone(&shared), timing).unwrap();
	(shared, script, handle)
}

fn stop(shared: &Shared<MockConnection>, handle: JoinHandle<()>) {
	shared.handoff.close();
	handle.join().unwrap();
}

#[test]
fn delivers_in_poll_order_one_at_a_time() {
	let (shared, script, handle) = start(true);
	for i in 0..100 {
		script.push(fixtures::event(3, i));
	}

	for i in 0..100 {
		let delivery = shared.handoff.recv_timeout(WAIT).expect("notification");
		assert_eq!(
			*delivery,
			Notification::Message {
				generation: FIRST,
				bytes: fixtures::event(3, i)
			}
		);
		// Nothing else can be polled while this one is held.
		assert!(shared.handoff.try_recv().is_none());
	}

	stop(&shared, handle);
}

#[test]
fn next_poll_waits_for_the_host() {
	let (shared, script, handle) = start(true);
	script.push(fixtures::event(3, 1));
	script.push(fixtures::event(3, 2));

	let first = shared.handoff.recv_timeout(WAIT).expect("first");
	std::thread::sleep(Duration::from_millis(20));
	assert_eq!(script.pending(), 1, "bridge polled while a notification was in flight");
	drop(first);

	let second = shared.handoff.recv_timeout(WAIT).expect("second");
	assert_eq!(
		*second,
		Notification::Message {
			generation: FIRST,
			bytes: fixtures::event(3, 2)
		}
	);
	drop(second);

	stop(&shared, handle);
}

#[test]
fn fatal_status_is_published_and_warning_status_is_not() {
	let (shared, script, handle) = start(true);
	script.push_status(Status::E_FAIL);
	script.push_status(Status::PIPE_BROKEN);

	let delivery = shared.handoff.recv_timeout(WAIT).expect("failure");
	assert_eq!(
		*delivery,
		Notification::Failure {
			generation: FIRST,
			status: Status::PIPE_BROKEN
		}
	);
	drop(delivery);

	stop(&shared, handle);
}

#[test]
fn notifications_carry_the_polled_generation() {
	let (shared, script, handle) = start(true);
	script.push(fixtures::event(3, 1));
	let first = shared.handoff.recv_timeout(WAIT).expect("first");
	assert_eq!(first.generation(), FIRST);

	shared.handle.clear();
	let (engine, reopened_script) = MockEngine::new();
	let reopened = shared.handle.store(engine.open("again").unwrap());
	drop(first);

	reopened_script.push(fixtures::event(3, 2));
	let second = shared.handoff.recv_timeout(WAIT).expect("second");
	assert_eq!(second.generation(), reopened);
	assert_ne!(reopened, FIRST);
	drop(second);

	stop(&shared, handle);
}

#[test]
fn idles_while_disconnected_and_exits_on_close() {
	let (shared, script, handle) = start(false);
	script.push(fixtures::event(3, 1));

	assert!(shared.handoff.recv_timeout(Duration::from_millis(30)).is_none());
	assert_eq!(script.pending(), 1);

	stop(&shared, handle);
}
