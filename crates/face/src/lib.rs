//! Face-processing capability consumed by the worker pool.
//!
//! The [`FaceProcessor`] trait is the opaque boundary around image
//! decoding, face detection, cropping, and embedding generation. Each
//! worker owns exactly one processor instance; instances are never shared.
//!
//! [`SeetaProcessor`] is the production implementation: SeetaFace detection
//! via `rustface`, JPEG decoding and cropping via `image`, and a linear
//! projection model for the embedding itself.

pub mod processor;
pub mod projection;
pub mod seeta;

pub use processor::{FaceError, FaceProcessor};
pub use seeta::SeetaProcessor;
