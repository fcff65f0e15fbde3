use {
    crate::*,
    image::Image,
    std::fmt,
    tokio::task::{JoinHandle, spawn_blocking},
};

/// A per-frame keypoint detector. Runs on a blocking worker thread.
pub trait PoseModel: Send {
    /// Detect the body in `image`. `Ok(None)` means nobody was found.
    fn infer(&mut self, image: &Image) -> Result<Option<Pose>, PoseError>;
}

type Inflight = JoinHandle<(Box<dyn PoseModel>, Result<Option<Pose>, PoseError>)>;

enum Slot {
    Idle(Box<dyn PoseModel>),
    Busy(Inflight),
    Lost,
}

/// Runs a `PoseModel` off the async runtime, one frame at a time.
///
/// `estimate` takes `&mut self`, so a second estimate cannot start while one is
/// in flight. If a caller drops an `estimate` future early, the model is
/// recovered (and the stale result discarded) at the start of the next call.
pub struct PoseEstimator {
    slot: Slot,
    estimates: u64,
    failures: u64,
    discarded: u64,
}

impl fmt::Debug for PoseEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseEstimator")
            .field("available", &self.is_available())
            .field("estimates", &self.estimates)
            .field("failures", &self.failures)
            .field("discarded", &self.discarded)
            .finish()
    }
}

impl PoseEstimator {
    pub fn new(model: impl PoseModel + 'static) -> Self {
        Self::from_boxed(Box::new(model))
    }

    pub fn from_boxed(model: Box<dyn PoseModel>) -> Self {
        Self {
            slot: Slot::Idle(model),
            estimates: 0,
            failures: 0,
            discarded: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.slot, Slot::Lost)
    }

    /// Number of completed estimates, failed ones included.
    pub fn estimates(&self) -> u64 {
        self.estimates
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    async fn take_model(&mut self) -> Result<Box<dyn PoseModel>, PoseError> {
        match std::mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Idle(model) => Ok(model),
            Slot::Busy(inflight) => match inflight.await {
                Ok((model, _)) => {
                    self.discarded += 1;
                    log::debug!("pose: discarded stale estimate ({} so far)", self.discarded);
                    Ok(model)
                }
                Err(error) => {
                    log::error!("pose: model worker died: {}", error);
                    Err(PoseError::Unavailable)
                }
            },
            Slot::Lost => Err(PoseError::Unavailable),
        }
    }

    /// Estimate the pose in `image`.
    ///
    /// Returns `Ok(None)` when no body was detected and `Err(PoseError::Estimation)`
    /// when the model failed on this frame; the caller simply tries the next frame.
    pub async fn estimate(&mut self, image: Image) -> Result<Option<Pose>, PoseError> {
        let mut model = self.take_model().await?;
        self.slot = Slot::Busy(spawn_blocking(move || {
            let result = model.infer(&image);
            (model, result)
        }));

        let joined = match &mut self.slot {
            Slot::Busy(inflight) => inflight.await,
            _ => return Err(PoseError::Unavailable),
        };
        let result = match joined {
            Ok((model, result)) => {
                self.slot = Slot::Idle(model);
                result
            }
            Err(error) => {
                self.slot = Slot::Lost;
                log::error!("pose: model worker died: {}", error);
                return Err(PoseError::Unavailable);
            }
        };

        self.estimates += 1;
        match result {
            Ok(pose) => Ok(pose.filter(|pose| !pose.is_empty())),
            Err(error) => {
                self.failures += 1;
                log::warn!(
                    "pose: estimation failed ({} of {}): {}",
                    self.failures,
                    self.estimates,
                    error
                );
                Err(match error {
                    PoseError::Estimation(msg) => PoseError::Estimation(msg),
                    other => PoseError::Estimation(other.to_string()),
                })
            }
        }
    }
}
