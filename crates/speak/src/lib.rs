//! Spoken guidance.
//!
//! A `SpeechSynth` turns text into audio (`HttpSpeechSynth` asks the
//! text-to-audio service), an `AudioPlayer` plays it, and a `Speaker` ties the
//! two together without ever making the caller wait.

mod error;
pub use error::*;

mod http;
pub use http::*;

mod speaker;
pub use speaker::*;

mod synth;
pub use synth::*;
