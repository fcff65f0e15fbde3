use {
    crate::*,
    base::Vec2,
    image::{Image, resize_nearest},
    pose::{Pose, SKELETON},
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    tokio::sync::watch,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub color: [u8; 3],
    pub line_width: i32,
    pub point_radius: i32,
    /// Keypoints must score strictly above this to be drawn.
    pub confidence: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [255, 255, 255],
            line_width: 2,
            point_radius: 4,
            confidence: 0.5,
        }
    }
}

// where a source-frame keypoint lands on the mirrored surface
fn to_surface(position: Vec2<f32>, source: Vec2<usize>, surface: Vec2<usize>) -> Vec2<i32> {
    let sx = surface.x as f32 / source.x.max(1) as f32;
    let sy = surface.y as f32 / source.y.max(1) as f32;
    Vec2::new(
        ((source.x as f32 - position.x) * sx).round() as i32,
        (position.y * sy).round() as i32,
    )
}

/// Draw the skeleton of `pose` (in `source` pixel space) onto a mirrored `surface`.
pub fn draw_overlay(surface: &mut Image, pose: &Pose, source: Vec2<usize>, style: &OverlayStyle) {
    let size = surface.size;
    let point = |landmark| {
        pose.confident(landmark, style.confidence)
            .map(|k| to_surface(k.position, source, size))
    };
    for (a, b) in SKELETON {
        if let (Some(from), Some(to)) = (point(a), point(b)) {
            surface.draw_line(from, to, style.line_width, style.color);
        }
    }
    for keypoint in pose.keypoints().filter(|k| !k.landmark.is_facial()) {
        if keypoint.confidence > style.confidence {
            let center = to_surface(keypoint.position, source, size);
            surface.draw_filled_circle(center, style.point_radius, style.color);
        }
    }
}

/// Renders the mirrored camera frame plus skeleton onto an off-screen surface
/// and publishes every rendered surface.
pub struct FrameCompositor {
    size: Vec2<usize>,
    style: OverlayStyle,
    sender: watch::Sender<Option<Arc<Image>>>,
    leased: Arc<AtomicBool>,
}

impl FrameCompositor {
    pub fn new(size: Vec2<usize>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            size,
            style: OverlayStyle::default(),
            sender,
            leased: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Render `frame` with `pose` without publishing it.
    pub fn render(&self, frame: &Image, pose: Option<&Pose>) -> Result<Image, CaptureError> {
        let rgb = frame.to_rgb()?;
        let mut surface = resize_nearest(&rgb, self.size, true)?;
        if let Some(pose) = pose {
            draw_overlay(&mut surface, pose, rgb.size, &self.style);
        }
        Ok(surface)
    }

    /// Render and publish to the stream, returning the new surface.
    pub fn composite(&self, frame: &Image, pose: Option<&Pose>) -> Result<Arc<Image>, CaptureError> {
        let surface = Arc::new(self.render(frame, pose)?);
        self.sender.send_replace(Some(Arc::clone(&surface)));
        Ok(surface)
    }

    /// Most recently published surface.
    pub fn current(&self) -> Option<Arc<Image>> {
        self.sender.borrow().clone()
    }

    /// Lease the surface stream. Fails with `CaptureBusy` while another lease is alive.
    pub fn stream(&self) -> Result<SurfaceStream, CaptureError> {
        if self
            .leased
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CaptureError::CaptureBusy);
        }
        let mut receiver = self.sender.subscribe();
        receiver.mark_changed();
        Ok(SurfaceStream {
            receiver,
            size: self.size,
            lease: Arc::clone(&self.leased),
        })
    }
}

/// Exclusive view of the compositor output. Dropping it ends the lease.
pub struct SurfaceStream {
    receiver: watch::Receiver<Option<Arc<Image>>>,
    size: Vec2<usize>,
    lease: Arc<AtomicBool>,
}

impl SurfaceStream {
    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    /// Latest surface, and whether it is new since the previous call.
    pub fn latest(&mut self) -> (Option<Arc<Image>>, bool) {
        let fresh = self.receiver.has_changed().unwrap_or(false);
        let surface = self.receiver.borrow_and_update().clone();
        (surface, fresh)
    }

    /// Wait until a new surface is published. Fails once the compositor is gone.
    pub async fn changed(&mut self) -> Result<(), CaptureError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| CaptureError::Closed)
    }
}

impl Drop for SurfaceStream {
    fn drop(&mut self) {
        self.lease.store(false, Ordering::Release);
    }
}
