use {
    crate::*,
    base::{Tensor, Vec2},
};

/// A frame as produced by a camera or rendered by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl Image {
    pub fn new(size: Vec2<usize>, data: Vec<u8>, format: PixelFormat) -> Self {
        Self { size, data, format }
    }

    /// Create an RGB image, checking the buffer length against `size`.
    pub fn rgb(size: Vec2<usize>, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.area() * 3;
        if data.len() != expected {
            return Err(ImageError::Size {
                expected,
                got: data.len(),
            });
        }
        Ok(Self::new(size, data, PixelFormat::Rgb8))
    }

    /// Solid-colour RGB image.
    pub fn filled(size: Vec2<usize>, color: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(size.area() * 3);
        for _ in 0..size.area() {
            data.extend_from_slice(&color);
        }
        Self::new(size, data, PixelFormat::Rgb8)
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    /// Convert to packed RGB, decoding if necessary.
    pub fn to_rgb(&self) -> Result<Image, ImageError> {
        match self.format {
            PixelFormat::Rgb8 => Ok(self.clone()),
            PixelFormat::Yuyv => {
                let expected = self.size.area() * 2;
                if self.data.len() < expected {
                    return Err(ImageError::Size {
                        expected,
                        got: self.data.len(),
                    });
                }
                Ok(Image::new(
                    self.size,
                    yuyv_to_rgb(self.size, &self.data),
                    PixelFormat::Rgb8,
                ))
            }
            PixelFormat::Jpeg => decode_jpeg(&self.data),
        }
    }

    pub fn into_rgb(self) -> Result<Image, ImageError> {
        match self.format {
            PixelFormat::Rgb8 => Ok(self),
            _ => self.to_rgb(),
        }
    }

    /// RGB pixel at `(x, y)`, `None` outside the image or for non-RGB formats.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if self.format != PixelFormat::Rgb8 || x >= self.size.x || y >= self.size.y {
            return None;
        }
        let i = (y * self.size.x + x) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// HWC tensor view of an RGB image.
    pub fn to_tensor(&self) -> Result<Tensor<u8>, ImageError> {
        if self.format != PixelFormat::Rgb8 {
            return Err(ImageError::Unsupported(self.format));
        }
        Ok(Tensor::new(
            vec![self.size.y, self.size.x, 3],
            self.data.clone(),
        )?)
    }
}
