//! Live capture: the composited preview surface, the recording of that surface
//! into a clip and the per-frame tick that drives both.
//!
//! * `FrameCompositor` mirrors the camera frame, draws the skeleton overlay and
//!   publishes the result. One `SurfaceStream` at a time may lease it.
//! * `RecordingSession` samples a `SurfaceStream` at a fixed rate into a `Clip`
//!   and collects the poses estimated meanwhile.
//! * `FrameLoop` runs one estimate, one composite and one presence update per tick.

use base::Vec2;

mod clip;
pub use clip::*;

mod compositor;
pub use compositor::*;

mod error;
pub use error::*;

mod frameloop;
pub use frameloop::*;

mod recording;
pub use recording::*;

/// Size of the composited surface, independent of the camera resolution.
pub const SURFACE_SIZE: Vec2<usize> = Vec2::new(640, 480);
