//! Raster output.
//!
//! [`RasterBackend`] implements [`DrawBackend`](crate::backend::DrawBackend)
//! by scan converting into an owned ARGB [`FrameBuffer`]. It performs no
//! depth test of its own: it relies on being fed primitives back to front.

pub mod framebuffer;
pub mod rasterizer;
mod raster;

pub use framebuffer::FrameBuffer;
pub use raster::{RasterBackend, RasterOptions};
