use {
    crate::*,
    image::{Image, PixelFormat},
    std::time::Instant,
};

/// One captured camera frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: Image,
    pub captured_at: Instant,
    /// Position in capture order since the device was opened.
    pub sequence: u64,
}

impl VideoFrame {
    /// The frame as packed RGB, decoding YUYV or JPEG if needed.
    pub fn to_rgb(&self) -> Result<Image, VideoError> {
        match self.image.format {
            PixelFormat::Rgb8 => Ok(self.image.clone()),
            _ => Ok(self.image.to_rgb()?),
        }
    }
}
