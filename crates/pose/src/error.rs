use std::fmt;

#[derive(Debug)]
pub enum PoseError {
    /// The model could not be loaded.
    Load(String),
    /// A single estimation failed; the next frame may succeed.
    Estimation(String),
    /// Model input or output had an unexpected shape.
    Shape(String),
    Image(image::ImageError),
    /// The model was lost (its worker panicked) and no further estimates are possible.
    Unavailable,
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseError::Load(msg) => write!(f, "failed to load pose model: {msg}"),
            PoseError::Estimation(msg) => write!(f, "pose estimation failed: {msg}"),
            PoseError::Shape(msg) => write!(f, "shape error: {msg}"),
            PoseError::Image(err) => write!(f, "image error: {err}"),
            PoseError::Unavailable => write!(f, "pose model unavailable"),
        }
    }
}

impl std::error::Error for PoseError {}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        PoseError::Image(err)
    }
}

impl From<base::TensorError> for PoseError {
    fn from(err: base::TensorError) -> Self {
        PoseError::Shape(err.to_string())
    }
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for PoseError {
    fn from(err: ort::Error) -> Self {
        PoseError::Estimation(err.to_string())
    }
}
