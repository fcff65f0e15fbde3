//! The assessment as a whole: conversational intake, motion capture and
//! scoring, then diagnosis.
//!
//! `Intake` talks to the generation service until it hands over an assessment
//! and a `MotionAnalysisSpec`. `Orchestrator` walks one assessment attempt
//! through capture, recording, trimming and scoring, then asks the diagnosis
//! service for a verdict.

mod config;
pub use config::*;

mod error;
pub use error::*;

mod intake;
pub use intake::*;

mod orchestrator;
pub use orchestrator::*;

mod service;
pub use service::*;
