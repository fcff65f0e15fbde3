//! MoveNet single-pose pre- and post-processing, plus the ONNX Runtime model.
//!
//! MoveNet takes a square NHWC image (192x192 for Lightning, 256x256 for
//! Thunder) and returns `[1, 1, 17, 3]` rows of `(y, x, score)` normalized to
//! the model input.

use {
    crate::*,
    base::{Tensor, Vec2},
    image::{Image, PixelFormat},
};

pub const LIGHTNING_INPUT_SIZE: usize = 192;
pub const THUNDER_INPUT_SIZE: usize = 256;

/// Keypoints scoring below this are treated as not detected.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.1;

/// How the source frame was fitted into the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub input_size: usize,
    pub scale: f32,
    pub pad: Vec2<f32>,
}

impl Letterbox {
    pub fn new(source: Vec2<usize>, input_size: usize) -> Self {
        let scale = (input_size as f32 / source.x.max(1) as f32)
            .min(input_size as f32 / source.y.max(1) as f32);
        let fitted_x = ((source.x as f32 * scale).round() as usize).min(input_size);
        let fitted_y = ((source.y as f32 * scale).round() as usize).min(input_size);
        Self {
            input_size,
            scale,
            pad: Vec2::new(
                ((input_size - fitted_x) / 2) as f32,
                ((input_size - fitted_y) / 2) as f32,
            ),
        }
    }

    /// Map a point given in normalized model-input coordinates back to the source frame.
    pub fn to_source(&self, normalized: Vec2<f32>) -> Vec2<f32> {
        let input = normalized * self.input_size as f32;
        (input - self.pad) / self.scale
    }
}

/// Letterbox `image` into a black `[1, size, size, 3]` tensor of raw 0-255 values.
pub fn preprocess(image: &Image, input_size: usize) -> Result<(Tensor<f32>, Letterbox), PoseError> {
    if image.format != PixelFormat::Rgb8 {
        return Err(PoseError::Shape(format!(
            "MoveNet expects RGB input, got {:?}",
            image.format
        )));
    }
    let (w, h) = (image.size.x, image.size.y);
    if w == 0 || h == 0 {
        return Err(PoseError::Shape("empty image".to_string()));
    }

    let letterbox = Letterbox::new(image.size, input_size);
    let pad_x = letterbox.pad.x as usize;
    let pad_y = letterbox.pad.y as usize;
    let fitted_x = input_size - 2 * pad_x;
    let fitted_y = input_size - 2 * pad_y;

    let mut tensor = Tensor::filled(vec![1, input_size, input_size, 3], 0.0f32)?;
    for y in 0..fitted_y {
        let src_y = ((y as f32 / letterbox.scale) as usize).min(h - 1);
        for x in 0..fitted_x {
            let src_x = ((x as f32 / letterbox.scale) as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst = ((y + pad_y) * input_size + x + pad_x) * 3;
            for c in 0..3 {
                tensor.data[dst + c] = image.data[src + c] as f32;
            }
        }
    }

    Ok((tensor, letterbox))
}

/// Turn MoveNet output into a pose in source-frame pixels, dropping keypoints
/// below `min_confidence`. Returns `None` if no keypoint survives.
pub fn postprocess(
    output: &Tensor<f32>,
    letterbox: &Letterbox,
    min_confidence: f32,
) -> Result<Option<Pose>, PoseError> {
    if output.data.len() != LANDMARK_COUNT * 3 || output.shape.last() != Some(&3) {
        return Err(PoseError::Shape(format!(
            "expected [1, 1, 17, 3] MoveNet output, got {:?}",
            output.shape
        )));
    }

    let keypoints: Vec<Keypoint> = output
        .data
        .chunks_exact(3)
        .zip(Landmark::ALL)
        .filter(|(row, _)| row[2] >= min_confidence)
        .map(|(row, landmark)| {
            let position = letterbox.to_source(Vec2::new(row[1], row[0]));
            Keypoint::new(landmark, position.x, position.y, row[2])
        })
        .collect();

    if keypoints.is_empty() {
        return Ok(None);
    }
    Ok(Some(Pose::from_keypoints(keypoints)))
}

#[cfg(feature = "onnx")]
pub use onnx::*;

#[cfg(feature = "onnx")]
mod onnx {
    use {
        super::*,
        ort::{session::Session, value::Tensor as OrtTensor},
        std::path::Path,
    };

    /// Element type of the model input. TF Hub exports take int32, most
    /// community conversions take float32.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MoveNetInput {
        Int32,
        Float32,
    }

    pub struct MoveNet {
        session: Session,
        input_size: usize,
        input_type: MoveNetInput,
        min_confidence: f32,
    }

    impl MoveNet {
        /// Load a single-pose MoveNet ONNX model.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseError> {
            let path = path.as_ref();
            let session = Session::builder()
                .and_then(|builder| builder.commit_from_file(path))
                .map_err(|e| PoseError::Load(format!("{}: {}", path.display(), e)))?;
            log::info!("pose: loaded MoveNet from {}", path.display());
            Ok(Self {
                session,
                input_size: LIGHTNING_INPUT_SIZE,
                input_type: MoveNetInput::Int32,
                min_confidence: DEFAULT_MIN_CONFIDENCE,
            })
        }

        pub fn with_input_size(mut self, input_size: usize) -> Self {
            self.input_size = input_size;
            self
        }

        pub fn with_input_type(mut self, input_type: MoveNetInput) -> Self {
            self.input_type = input_type;
            self
        }

        pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
            self.min_confidence = min_confidence;
            self
        }

        fn run(&mut self, input: Tensor<f32>) -> Result<Tensor<f32>, PoseError> {
            let shape = [1usize, self.input_size, self.input_size, 3];
            let outputs = match self.input_type {
                MoveNetInput::Float32 => {
                    let value = OrtTensor::from_array((shape, input.data))?;
                    self.session.run(ort::inputs![value])?
                }
                MoveNetInput::Int32 => {
                    let data: Vec<i32> = input.data.iter().map(|&v| v as i32).collect();
                    let value = OrtTensor::from_array((shape, data))?;
                    self.session.run(ort::inputs![value])?
                }
            };
            let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
            let shape = shape.iter().map(|&d| d as usize).collect();
            Ok(Tensor::new(shape, data.to_vec())?)
        }
    }

    impl PoseModel for MoveNet {
        fn infer(&mut self, image: &Image) -> Result<Option<Pose>, PoseError> {
            let rgb = image.to_rgb()?;
            let (input, letterbox) = preprocess(&rgb, self.input_size)?;
            let output = self.run(input)?;
            postprocess(&output, &letterbox, self.min_confidence)
        }
    }
}
