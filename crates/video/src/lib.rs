//! Camera acquisition.
//!
//! A `VideoIn` owns one capture device on a blocking worker thread and hands
//! frames to async code over a bounded channel. Devices are injected through
//! the `VideoInDevice` trait; the V4L2 backend lives behind the `v4l2` feature.

mod videoerror;
pub use videoerror::*;

mod videoframe;
pub use videoframe::*;

mod videoin;
pub use videoin::*;
