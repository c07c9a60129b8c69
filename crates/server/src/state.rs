//! Shared application state for the receiver.

use std::sync::Arc;

use enrolld_events::InsertPublisher;
use enrolld_pipeline::Dispatcher;

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Submission side of the worker pool.
    pub dispatcher: Dispatcher,
    /// Downstream delivery of insert events.
    pub publisher: Arc<InsertPublisher>,
}
