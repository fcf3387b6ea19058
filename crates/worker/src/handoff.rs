//! One-slot, one-in-flight handoff between a producer thread and a consumer.
//!
//! The producer must hold a [`Permit`] before it may publish, and only one
//! permit exists. A published value stays owned by the slot until the
//! consumer takes it as a [`Delivery`]; dropping the delivery is what frees
//! the permit for the next cycle. This yields strict FIFO ordering with at
//! most one value in flight and no queue.
//!
//! Consumers may block ([`Handoff::recv`], [`Handoff::recv_timeout`]), poll
//! ([`Handoff::try_recv`]) or await ([`Handoff::recv_async`]). An optional
//! wakeup hook runs after every publish so foreign event loops can schedule
//! a `try_recv` on their own thread.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

/// Hook invoked on the producer thread after each publish.
pub type Wakeup = Arc<dyn Fn() + Send + Sync>;

enum Slot<T> {
	/// No permit outstanding.
	Free,
	/// Producer holds the permit but has not published.
	Reserved,
	/// Value published, not yet taken.
	Ready(T),
	/// Consumer is processing the value.
	Delivering,
}

impl<T> Slot<T> {
	const fn name(&self) -> &'static str {
		match self {
			Self::Free => "free",
			Self::Reserved => "reserved",
			Self::Ready(_) => "ready",
			Self::Delivering => "delivering",
		}
	}
}

struct State<T> {
	slot: Slot<T>,
	closed: bool,
}

struct Inner<T> {
	state: Mutex<State<T>>,
	permit_freed: Condvar,
	published: Condvar,
	notify: Notify,
	wakeup: Option<Wakeup>,
}

/// Shared one-slot handoff. Cloning yields another handle to the same slot.
pub struct Handoff<T> {
	inner: Arc<Inner<T>>,
}

impl<T> Clone for Handoff<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Default for Handoff<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for Handoff<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Handoff")
			.field("slot", &state.slot.name())
			.field("closed", &state.closed)
			.finish()
	}
}

impl<T> Handoff<T> {
	/// Creates an open handoff with a free permit.
	pub fn new() -> Self {
		Self::build(None)
	}

	/// Creates a handoff that calls `wakeup` after every publish.
	pub fn with_wakeup(wakeup: Wakeup) -> Self {
		Self::build(Some(wakeup))
	}

	fn build(wakeup: Option<Wakeup>) -> Self {
		Self {
			inner: Arc::new(Inner {
				state: Mutex::new(State {
					slot: Slot::Free,
					closed: false,
				}),
				permit_freed: Condvar::new(),
				published: Condvar::new(),
				notify: Notify::new(),
				wakeup,
			}),
		}
	}

	/// Blocks until the permit is free, then takes it.
	///
	/// Returns `None` once the handoff is closed.
	pub fn acquire(&self) -> Option<Permit<'_, T>> {
		let mut state = self.inner.state.lock();
		loop {
			if state.closed {
				return None;
			}
			if matches!(state.slot, Slot::Free) {
				state.slot = Slot::Reserved;
				return Some(Permit { handoff: self });
			}
			self.inner.permit_freed.wait(&mut state);
		}
	}

	/// Takes the published value without waiting.
	pub fn try_recv(&self) -> Option<Delivery<'_, T>> {
		let mut state = self.inner.state.lock();
		self.take_ready(&mut state)
	}

	/// Blocks until a value is published. Returns `None` once closed and drained.
	pub fn recv(&self) -> Option<Delivery<'_, T>> {
		let mut state = self.inner.state.lock();
		loop {
			if let Some(delivery) = self.take_ready(&mut state) {
				return Some(delivery);
			}
			if state.closed {
				return None;
			}
			self.inner.published.wait(&mut state);
		}
	}

	/// Like [`Self::recv`], giving up after `timeout`.
	pub fn recv_timeout(&self, timeout: Duration) -> Option<Delivery<'_, T>> {
		let deadline = Instant::now() + timeout;
		let mut state = self.inner.state.lock();
		loop {
			if let Some(delivery) = self.take_ready(&mut state) {
				return Some(delivery);
			}
			if state.closed {
				return None;
			}
			if self.inner.published.wait_until(&mut state, deadline).timed_out() {
				return self.take_ready(&mut state);
			}
		}
	}

	/// Awaits the next published value. Returns `None` once closed and drained.
	pub async fn recv_async(&self) -> Option<Delivery<'_, T>> {
		loop {
			// Register before checking so a publish in between is not lost.
			let notified = self.inner.notify.notified();
			{
				let mut state = self.inner.state.lock();
				if let Some(delivery) = self.take_ready(&mut state) {
					return Some(delivery);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}

	/// Closes the handoff, waking every waiter on both sides.
	///
	/// A value already published can still be received.
	pub fn close(&self) {
		let mut state = self.inner.state.lock();
		state.closed = true;
		drop(state);
		self.inner.permit_freed.notify_all();
		self.inner.published.notify_all();
		self.inner.notify.notify_waiters();
	}

	/// Returns true while a permit is held or a value is published or being processed.
	pub fn in_flight(&self) -> bool {
		!matches!(self.inner.state.lock().slot, Slot::Free)
	}

	fn take_ready(&self, state: &mut State<T>) -> Option<Delivery<'_, T>> {
		match std::mem::replace(&mut state.slot, Slot::Delivering) {
			Slot::Ready(value) => Some(Delivery { handoff: self, value }),
			other => {
				state.slot = other;
				None
			}
		}
	}

	fn release(&self) {
		let mut state = self.inner.state.lock();
		state.slot = Slot::Free;
		drop(state);
		self.inner.permit_freed.notify_one();
	}
}

/// The producer's exclusive right to publish one value.
///
/// Dropping an unused permit frees it immediately.
#[must_use = "dropping a permit releases it without publishing"]
pub struct Permit<'a, T> {
	handoff: &'a Handoff<T>,
}

impl<T> Permit<'_, T> {
	/// Publishes `value` and wakes the consumer.
	///
	/// The permit stays held until the consumer drops the resulting [`Delivery`].
	pub fn publish(self, value: T) {
		let inner = &self.handoff.inner;
		{
			let mut state = inner.state.lock();
			state.slot = Slot::Ready(value);
		}
		inner.published.notify_one();
		inner.notify.notify_one();
		if let Some(wakeup) = &inner.wakeup {
			wakeup();
		}
	}
}

impl<T> Drop for Permit<'_, T> {
	fn drop(&mut self) {
		let mut state = self.handoff.inner.state.lock();
		if matches!(state.slot, Slot::Reserved) {
			state.slot = Slot::Free;
			drop(state);
			self.handoff.inner.permit_freed.notify_one();
		}
	}
}

/// A published value being processed by the consumer.
///
/// The producer cannot acquire the next permit until this is dropped.
pub struct Delivery<'a, T> {
	handoff: &'a Handoff<T>,
	value: T,
}

impl<T> Deref for Delivery<'_, T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.value
	}
}

impl<T: fmt::Debug> fmt::Debug for Delivery<'_, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Delivery").field(&self.value).finish()
	}
}

impl<T> Drop for Delivery<'_, T> {
	fn drop(&mut self) {
		self.handoff.release();
	}
}
