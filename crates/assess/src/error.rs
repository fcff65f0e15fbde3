use {
    crate::*,
    capture::{CaptureError, RecordingError},
    motion::{SpecError, TrimError},
    std::fmt,
    video::VideoError,
};

/// Failure talking to the generation or diagnosis service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    Http(String),
    Status(u16),
    /// The body was not the JSON we expected.
    Decode(String),
    /// The body parsed but broke the response contract.
    Contract(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Http(msg) => write!(f, "request failed: {}", msg),
            ServiceError::Status(status) => write!(f, "service returned status {}", status),
            ServiceError::Decode(msg) => write!(f, "cannot decode response: {}", msg),
            ServiceError::Contract(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ServiceError::Decode(error.to_string())
        } else {
            ServiceError::Http(error.to_string())
        }
    }
}

#[derive(Debug)]
pub enum AssessError {
    /// The orchestrator was asked to do something its current stage does not allow.
    PreconditionNotMet { stage: Stage, action: &'static str },
    /// Camera, model or capture resource failure. The session has to be restarted.
    Resource(String),
    /// The clip cannot be trimmed.
    DataUnavailable(TrimError),
    Service(ServiceError),
    Spec(SpecError),
}

impl fmt::Display for AssessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessError::PreconditionNotMet { stage, action } => {
                write!(f, "cannot {} while {:?}", action, stage)
            }
            AssessError::Resource(msg) => write!(f, "resource failure: {}", msg),
            AssessError::DataUnavailable(error) => write!(f, "data unavailable: {}", error),
            AssessError::Service(error) => write!(f, "service error: {}", error),
            AssessError::Spec(error) => write!(f, "invalid motion analysis: {}", error),
        }
    }
}

impl std::error::Error for AssessError {}

impl From<ServiceError> for AssessError {
    fn from(error: ServiceError) -> Self {
        AssessError::Service(error)
    }
}

impl From<SpecError> for AssessError {
    fn from(error: SpecError) -> Self {
        AssessError::Spec(error)
    }
}

impl From<TrimError> for AssessError {
    fn from(error: TrimError) -> Self {
        AssessError::DataUnavailable(error)
    }
}

impl From<CaptureError> for AssessError {
    fn from(error: CaptureError) -> Self {
        AssessError::Resource(error.to_string())
    }
}

impl From<RecordingError> for AssessError {
    fn from(error: RecordingError) -> Self {
        AssessError::Resource(error.to_string())
    }
}

impl From<VideoError> for AssessError {
    fn from(error: VideoError) -> Self {
        AssessError::Resource(error.to_string())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// An environment override did not parse.
    Env { var: &'static str, value: String },
    /// A value is outside the range the pipeline can run with.
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(error) => write!(f, "cannot read config: {}", error),
            ConfigError::Parse(error) => write!(f, "cannot parse config: {}", error),
            ConfigError::Env { var, value } => write!(f, "invalid {}: \"{}\"", var, value),
            ConfigError::Invalid { key, value } => write!(f, "{} out of range: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io(error)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::Parse(error)
    }
}
