use {
    crate::*,
    base::Vec2,
    image::{Image, decode_jpeg, resize_nearest},
    motion::DurationProbe,
    std::{
        fs::File,
        io::{BufWriter, Write},
        path::Path,
        sync::Arc,
        time::Duration,
    },
};

/// Number of thumbnails in the trimming strip.
pub const DEFAULT_THUMBNAIL_COUNT: usize = 20;

/// A finished recording: JPEG frames at a fixed frame rate.
///
/// Consecutive identical frames share one encoded buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    frames: Vec<Arc<Vec<u8>>>,
    frame_rate: f64,
    size: Vec2<usize>,
}

impl Clip {
    pub fn new(frames: Vec<Arc<Vec<u8>>>, frame_rate: f64, size: Vec2<usize>) -> Self {
        Self {
            frames,
            frame_rate,
            size,
        }
    }
}

/// Cheap, cloneable reference to a finished `Clip`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipHandle(Arc<Clip>);

impl From<Clip> for ClipHandle {
    fn from(clip: Clip) -> Self {
        Self(Arc::new(clip))
    }
}

impl ClipHandle {
    pub fn frame_count(&self) -> usize {
        self.0.frames.len()
    }

    pub fn frame_rate(&self) -> f64 {
        self.0.frame_rate
    }

    pub fn size(&self) -> Vec2<usize> {
        self.0.size
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    pub fn duration_secs(&self) -> f64 {
        if self.0.frame_rate > 0.0 {
            self.frame_count() as f64 / self.0.frame_rate
        } else {
            0.0
        }
    }

    /// Encoded frame `index`.
    pub fn jpeg(&self, index: usize) -> Option<&[u8]> {
        self.0.frames.get(index).map(|frame| frame.as_slice())
    }

    pub fn decode_frame(&self, index: usize) -> Result<Image, CaptureError> {
        let jpeg = self.jpeg(index).ok_or(CaptureError::NoFrame(index))?;
        Ok(decode_jpeg(jpeg)?)
    }

    /// Frame shown at playback position `at`.
    pub fn frame_at(&self, at: Duration) -> Result<Image, CaptureError> {
        let index = (at.as_secs_f64() * self.0.frame_rate).floor() as usize;
        self.decode_frame(index.min(self.frame_count().saturating_sub(1)))
    }

    /// Write the clip as a Motion-JPEG stream (concatenated JPEG images).
    pub fn write_mjpeg(&self, writer: &mut impl Write) -> Result<(), CaptureError> {
        for frame in &self.0.frames {
            writer.write_all(frame)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_mjpeg(&self, path: impl AsRef<Path>) -> Result<(), CaptureError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_mjpeg(&mut writer)?;
        log::info!(
            "clip: saved {} frames to {}",
            self.frame_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Up to `count` evenly spaced frames side by side, each `height` pixels tall.
    pub fn thumbnail_strip(&self, count: usize, height: usize) -> Result<Image, CaptureError> {
        let frames = self.frame_count();
        let count = count.min(frames);
        let size = self.size();
        let width = if size.y == 0 { 0 } else { height * size.x / size.y };
        let mut strip = Image::filled(Vec2::new(width * count, height), [0, 0, 0]);
        for slot in 0..count {
            let index = slot * frames / count;
            let thumbnail = resize_nearest(&self.decode_frame(index)?, Vec2::new(width, height), false)?;
            for y in 0..height {
                let src = y * width * 3;
                let dst = (y * strip.size.x + slot * width) * 3;
                strip.data[dst..dst + width * 3].copy_from_slice(&thumbnail.data[src..src + width * 3]);
            }
        }
        Ok(strip)
    }
}

impl DurationProbe for ClipHandle {
    fn duration_secs(&mut self) -> Option<f64> {
        Some(ClipHandle::duration_secs(self))
    }
}
