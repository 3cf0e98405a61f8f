//! Primitive clipping.
//!
//! Primitives are clipped in eye space, before projection, against the
//! hither and yon planes only, using the Sutherland-Hodgman algorithm.
//! See [`eye_space`] for the details.

pub mod eye_space;

pub use eye_space::{ClipOutcome, ClipPlane, ClipVertex, EyeSpaceClipper};
