//! Concurrent job dispatch and response correlation.
//!
//! This crate is the heart of the enrollment service: a fixed-size pool of
//! long-lived workers, each owning one expensive [`FaceProcessor`]
//! instance, fed by a single shared job queue with zero-buffer handoff.
//!
//! - [`WorkerPool`] -- owns the worker threads and the queue lifecycle.
//! - [`Dispatcher`] -- submits one [`Job`] per request and awaits its
//!   correlated result on a private one-shot reply channel.
//!
//! Workers may finish in any order; the per-job reply channel is the only
//! correlation mechanism and guarantees exactly one result per caller.
//!
//! [`FaceProcessor`]: enrolld_face::FaceProcessor

pub mod dispatcher;
pub mod job;
pub mod pool;
mod worker;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use dispatcher::Dispatcher;
pub use job::Job;
pub use pool::{PoolError, PoolHandle, WorkerPool};
