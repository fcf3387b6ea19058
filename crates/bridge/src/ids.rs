//! Identifier registries.
//!
//! Definition and event ids come from plain monotonic counters. Request ids
//! additionally recycle through a LIFO free list fed by one-shot requests.

use parking_lot::Mutex;
use simlink_proto::{DefinitionId, EventId, RequestId};

/// Guarded monotonic counter. Values are never reused.
#[derive(Debug, Default)]
pub(crate) struct IdCounter {
	next: Mutex<u32>,
}

impl IdCounter {
	pub(crate) fn next(&self) -> u32 {
		let mut next = self.next.lock();
		let id = *next;
		*next += 1;
		id
	}
}

#[derive(Debug, Default)]
struct PoolState {
	next: u32,
	free: Vec<u32>,
}

/// Request id allocator with LIFO reuse.
#[derive(Debug, Default)]
pub(crate) struct RequestIdPool {
	state: Mutex<PoolState>,
}

impl RequestIdPool {
	pub(crate) fn allocate(&self) -> RequestId {
		let mut state = self.state.lock();
		if let Some(id) = state.free.pop() {
			tracing::trace!(request_id = id, "registry.request.reuse");
			return RequestId(id);
		}
		let id = state.next;
		state.next += 1;
		RequestId(id)
	}

	/// Returns `id` to the free list; the next allocation hands it out first.
	pub(crate) fn release(&self, id: RequestId) {
		let mut state = self.state.lock();
		debug_assert!(!state.free.contains(&id.0), "request id {id:?} released twice");
		debug_assert!(id.0 < state.next, "request id {id:?} was never allocated");
		state.free.push(id.0);
	}

	#[cfg(test)]
	pub(crate) fn free_len(&self) -> usize {
		self.state.lock().free.len()
	}
}

/// The three id spaces of a session.
#[derive(Debug, Default)]
pub(crate) struct Registries {
	definitions: IdCounter,
	events: IdCounter,
	pub(crate) requests: RequestIdPool,
}

impl Registries {
	pub(crate) fn allocate_definition_id(&self) -> DefinitionId {
		DefinitionId(self.definitions.next())
	}

	pub(crate) fn allocate_event_id(&self) -> EventId {
		EventId(self.events.next())
	}

	pub(crate) fn allocate_request_id(&self) -> RequestId {
		self.requests.allocate()
	}

	pub(crate) fn release_request_id(&self, id: RequestId) {
		self.requests.release(id);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;
	use std::sync::Arc;

	use proptest::prelude::*;

	use super::*;

	#[test]
	fn counters_are_independent_and_start_at_zero() {
		let ids = Registries::default();
		assert_eq!(ids.allocate_definition_id(), DefinitionId(0));
		assert_eq!(ids.allocate_event_id(), EventId(0));
		assert_eq!(ids.allocate_event_id(), EventId(1));
		assert_eq!(ids.allocate_request_id(), RequestId(0));
		assert_eq!(ids.allocate_definition_id(), DefinitionId(1));
	}

	#[test]
	fn released_request_ids_come_back_last_in_first_out() {
		let ids = Registries::default();
		let a = ids.allocate_request_id();
		let b = ids.allocate_request_id();
		let c = ids.allocate_request_id();
		ids.release_request_id(a);
		ids.release_request_id(c);
		assert_eq!(ids.allocate_request_id(), c);
		assert_eq!(ids.allocate_request_id(), a);
		assert_eq!(ids.allocate_request_id(), RequestId(b.0 + 2));
		assert_eq!(ids.requests.free_len(), 0);
	}

	#[test]
	fn concurrent_allocation_never_duplicates() {
		let ids = Arc::new(Registries::default());
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let ids = Arc::clone(&ids);
				std::thread::spawn(move || (0..250).map(|_| ids.allocate_event_id()).collect::<Vec<_>>())
			})
			.collect();
		let mut seen = HashSet::new();
		for handle in handles {
			for id in handle.join().unwrap() {
				assert!(seen.insert(id), "duplicate event id {id:?}");
			}
		}
		assert_eq!(seen.len(), 1000);
	}

	proptest! {
		#[test]
		fn live_request_ids_are_unique(ops in proptest::collection::vec(any::<bool>(), 1..200)) {
			let pool = RequestIdPool::default();
			let mut live: Vec<RequestId> = Vec::new();
			for allocate in ops {
				if allocate || live.is_empty() {
					let id = pool.allocate();
					prop_assert!(!live.contains(&id));
					live.push(id);
				} else {
					let id = live.swap_remove(live.len() / 2);
					pool.release(id);
					prop_assert_eq!(pool.allocate(), id);
					live.push(id);
				}
			}
		}

		#[test]
		fn definition_ids_strictly_increase(n in 1usize..100) {
			let ids = Registries::default();
			let all: Vec<_> = (0..n).map(|_| ids.allocate_definition_id()).collect();
			prop_assert!(all.windows(2).all(|w| w[0] < w[1]));
		}
	}
}
