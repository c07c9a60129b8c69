//! Event envelope codec and downstream event delivery.
//!
//! - [`Event`] -- the versioned event wrapper the service consumes and
//!   emits (`insert`, `enroll-response`).
//! - [`Envelope`] -- the `{ "payload": <bytes> }` indirection carrying the
//!   binary-encoded request/response bodies.
//! - [`InsertPublisher`] -- posts the insert event to the configured sink
//!   and interprets the bus acknowledgement.

pub mod envelope;
pub mod event;
pub mod publisher;

pub use envelope::Envelope;
pub use event::{Event, EVENT_SOURCE, TYPE_ENROLL_RESPONSE, TYPE_INSERT};
pub use publisher::InsertPublisher;
