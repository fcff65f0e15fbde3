//! Body keypoint detection.
//!
//! `PoseEstimator` runs a `PoseModel` (MoveNet over ONNX Runtime with the
//! `onnx` feature, or anything else implementing the trait) off the async
//! runtime and turns each frame into a `Pose` of named landmarks in
//! source-frame pixel coordinates.

mod error;
pub use error::*;

mod landmark;
pub use landmark::*;

mod pose;
pub use pose::*;

mod sequence;
pub use sequence::*;

mod estimator;
pub use estimator::*;

pub mod movenet;
