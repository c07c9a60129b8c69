//! Shared data model for the enrollment pipeline.
//!
//! This crate holds the types that cross crate boundaries:
//!
//! - [`types`] -- wire-facing request/response bodies and geometry.
//! - [`embedding`] -- the fixed-width [`FeatureVector`](embedding::FeatureVector)
//!   and its little-endian / base64 codec.
//! - [`error`] -- the [`EnrollError`](error::EnrollError) taxonomy shared by
//!   every stage of the pipeline.

pub mod embedding;
pub mod error;
pub mod types;

pub use embedding::{FeatureVector, EMBEDDING_DIM};
pub use error::{EnrollError, ErrorClass};
pub use types::{BoundingBox, EnrollRequest, EnrollResponse, EnrollStatus, InsertRequest, Point};
