use std::fmt;

#[derive(Debug)]
pub enum AudioError {
    Device(String),
    Decode(String),
    /// The playback worker has stopped.
    Closed,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Device(msg) => write!(f, "audio device error: {msg}"),
            AudioError::Decode(msg) => write!(f, "audio decode error: {msg}"),
            AudioError::Closed => write!(f, "audio output closed"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::Decode(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AudioError::Decode(err.to_string())
    }
}
