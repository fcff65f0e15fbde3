//! Measurement of recorded motion.
//!
//! * `MotionAnalysisSpec` / `MeasurementSpec`: validated measurement criteria.
//! * `score`: turns a pose sequence and a frame range into an `AssessmentOutcome`.
//! * `FrameRangeSelector`: picks the frame range to score on a recorded clip.
//! * `PresenceMonitor`: decides whether the subject is fully in frame and when to say so.

mod geometry;
pub use geometry::*;

mod presence;
pub use presence::*;

mod score;
pub use score::*;

mod spec;
pub use spec::*;

mod trim;
pub use trim::*;

/// Nominal capture and playback rate of recorded clips.
pub const NOMINAL_FRAME_RATE: f64 = 30.0;
