use {
    crate::*,
    image::Image,
    motion::{PresenceEvent, PresenceMonitor},
    pose::{Pose, PoseError, PoseEstimator},
    std::{sync::Arc, time::Instant},
    video::VideoFrame,
};

/// Result of processing one camera frame.
#[derive(Debug, Clone)]
pub struct Tick {
    pub surface: Arc<Image>,
    /// `None` when nobody was detected or the estimate failed on this frame.
    pub pose: Option<Pose>,
    pub event: Option<PresenceEvent>,
    pub captured_at: Instant,
}

/// The per-frame scheduler: estimate, then composite, then update presence.
///
/// `tick` holds `&mut self` across the single estimation await, so ticks never
/// overlap. Hosts feed it the newest camera frame (`VideoIn::latest`) so a slow
/// model drops frames instead of queueing them.
pub struct FrameLoop {
    estimator: PoseEstimator,
    compositor: FrameCompositor,
    presence: Option<PresenceMonitor>,
    ticks: u64,
    detections: u64,
}

impl FrameLoop {
    pub fn new(estimator: PoseEstimator, compositor: FrameCompositor) -> Self {
        Self {
            estimator,
            compositor,
            presence: None,
            ticks: 0,
            detections: 0,
        }
    }

    pub fn with_presence(mut self, monitor: PresenceMonitor) -> Self {
        self.presence = Some(monitor);
        self
    }

    pub fn set_presence(&mut self, monitor: Option<PresenceMonitor>) {
        self.presence = monitor;
    }

    pub fn presence_mut(&mut self) -> Option<&mut PresenceMonitor> {
        self.presence.as_mut()
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn estimator(&self) -> &PoseEstimator {
        &self.estimator
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Process the next frame.
    ///
    /// A failed estimate counts as "no pose" for this frame; only a lost model
    /// is an error.
    pub async fn tick(&mut self, frame: VideoFrame) -> Result<Tick, CaptureError> {
        let image = frame.to_rgb()?;
        let pose = match self.estimator.estimate(image.clone()).await {
            Ok(pose) => pose,
            Err(PoseError::Unavailable) => return Err(CaptureError::Pose(PoseError::Unavailable)),
            // already logged by the estimator
            Err(_) => None,
        };
        self.ticks += 1;
        if pose.is_some() {
            self.detections += 1;
        }
        if self.ticks % 300 == 0 {
            log::debug!(
                "frame loop: {} ticks, {} with a pose, {} estimator failures",
                self.ticks,
                self.detections,
                self.estimator.failures()
            );
        }

        let surface = self.compositor.composite(&image, pose.as_ref())?;
        let event = self.presence.as_mut().and_then(|presence| {
            presence.update(pose.as_ref(), image.size.to_f32(), frame.captured_at)
        });
        Ok(Tick {
            surface,
            pose,
            event,
            captured_at: frame.captured_at,
        })
    }
}
