use {audio::AudioError, std::fmt};

#[derive(Debug)]
pub enum SpeechError {
    /// The request did not complete.
    Http(String),
    /// The service answered with a non-success status.
    Status(u16),
    Decode(AudioError),
    Playback(AudioError),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Http(msg) => write!(f, "speech request failed: {}", msg),
            SpeechError::Status(status) => write!(f, "speech service returned status {}", status),
            SpeechError::Decode(error) => write!(f, "cannot decode speech audio: {}", error),
            SpeechError::Playback(error) => write!(f, "cannot play speech audio: {}", error),
        }
    }
}

impl std::error::Error for SpeechError {}

impl From<reqwest::Error> for SpeechError {
    fn from(error: reqwest::Error) -> Self {
        SpeechError::Http(error.to_string())
    }
}
