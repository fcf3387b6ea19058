//! Bridge from a blocking, poll-based simulation engine API to a host thread.
//!
//! A [`Session`] owns one engine connection. A background thread polls it and
//! hands each message across with exactly one notification in flight; the
//! host drains them through [`Session::dispatch_next`] (or its non-blocking
//! and async siblings), which classifies the message, decodes data records
//! against their [`DataDefinition`] and runs the handler registered when the
//! request or subscription was made.
//!
//! ```ignore
//! let session = Session::new(engine);
//! session.open("my-app", SessionHandlers::new().on_error(|e| eprintln!("{e}")))?;
//! session.request_data_on_sim_object(
//! 	&[FieldSpec::new("AIRSPEED INDICATED", "knots")],
//! 	DataRequest::default(),
//! 	|record| println!("{record:?}"),
//! )?;
//! while session.dispatch_next() {}
//! ```

mod config;
mod decoder;
mod definitions;
mod dispatch;
mod engine;
mod error;
mod handlers;
mod ids;
mod router;
mod session;

#[cfg(test)]
mod testing;

pub use config::BridgeConfig;
pub use decoder::{Record, Value, decode_record};
pub use definitions::{DataDefinition, DefinedField};
pub use engine::{Connection, Engine};
pub use error::{BridgeError, ConfigError, DecodeError, Result};
pub use handlers::{DataHandler, ErrorHandler, EventHandler, EventPayload, SessionHandlers, SystemStateHandler};
pub use session::{DefinitionSource, Session};
pub use simlink_proto as proto;
