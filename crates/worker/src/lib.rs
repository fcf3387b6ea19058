//! Threading primitives for the engine dispatch bridge.
//!
//! * [`spawn_named_thread`]: dedicated OS thread for the blocking poll loop.
//! * [`Handoff`]: one-slot, one-in-flight transfer from that thread to the host.

#![warn(missing_docs)]

mod handoff;
mod spawn;

pub use handoff::{Delivery, Handoff, Permit, Wakeup};
pub use spawn::spawn_named_thread;
