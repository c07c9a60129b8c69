//! HTTP entry point of the enrollment service.
//!
//! Receives enrollment events, dispatches the face work onto the worker
//! pool, forwards the derived insert event downstream, and replies with
//! the `enroll-response` event.

pub mod config;
pub mod error;
pub mod receiver;
pub mod state;
