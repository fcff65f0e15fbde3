use {image::ImageError, pose::PoseError, std::fmt, video::VideoError};

#[derive(Debug)]
pub enum CaptureError {
    /// The surface stream is already leased, typically by another recording.
    CaptureBusy,
    Image(ImageError),
    Video(VideoError),
    /// The pose model is gone for good. Single-frame failures are not reported here.
    Pose(PoseError),
    Io(std::io::Error),
    /// Frame index past the end of a clip.
    NoFrame(usize),
    /// The compositor was dropped.
    Closed,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::CaptureBusy => write!(f, "capture stream is already in use"),
            CaptureError::Image(error) => write!(f, "image error: {}", error),
            CaptureError::Video(error) => write!(f, "video error: {}", error),
            CaptureError::Pose(error) => write!(f, "pose error: {}", error),
            CaptureError::Io(error) => write!(f, "I/O error: {}", error),
            CaptureError::NoFrame(index) => write!(f, "clip has no frame {}", index),
            CaptureError::Closed => write!(f, "compositor closed"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<ImageError> for CaptureError {
    fn from(error: ImageError) -> Self {
        CaptureError::Image(error)
    }
}

impl From<VideoError> for CaptureError {
    fn from(error: VideoError) -> Self {
        CaptureError::Video(error)
    }
}

impl From<PoseError> for CaptureError {
    fn from(error: PoseError) -> Self {
        CaptureError::Pose(error)
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(error: std::io::Error) -> Self {
        CaptureError::Io(error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordingError {
    /// `stop` or `record_pose` outside of the Recording state. Not fatal.
    NotRecording,
    AlreadyStarted,
    /// The frame rate must be positive and finite.
    InvalidFrameRate(f64),
    /// The capture worker died or failed to encode.
    Worker(String),
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::NotRecording => write!(f, "not recording"),
            RecordingError::AlreadyStarted => write!(f, "recording already started"),
            RecordingError::InvalidFrameRate(rate) => write!(f, "invalid frame rate {}", rate),
            RecordingError::Worker(msg) => write!(f, "recording worker failed: {}", msg),
        }
    }
}

impl std::error::Error for RecordingError {}
