//! Raw camera images, pixel format conversion, JPEG coding and the few
//! drawing primitives the capture overlay needs.
//!
//! Pixel data is row-major. RGB images are packed `[r, g, b]` triples.

mod convert;
pub use convert::*;

mod draw;
pub use draw::*;

mod error;
pub use error::*;

mod image;
pub use image::*;

mod jpeg;
pub use jpeg::*;

mod pixelformat;
pub use pixelformat::*;

mod resize;
pub use resize::*;
