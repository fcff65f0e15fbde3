use {
    crate::*,
    base::Vec2,
    crates_image::{ImageEncoder, codecs::jpeg::JpegEncoder},
};

/// Encode an image as JPEG, converting to RGB first when needed.
pub fn encode_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, ImageError> {
    if image.format == PixelFormat::Jpeg {
        return Ok(image.data.clone());
    }
    let rgb = image.to_rgb()?;
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &rgb.data,
            rgb.size.x as u32,
            rgb.size.y as u32,
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Decode JPEG bytes into an RGB image.
pub fn decode_jpeg(data: &[u8]) -> Result<Image, ImageError> {
    let decoded =
        crates_image::load_from_memory_with_format(data, crates_image::ImageFormat::Jpeg)?;
    let rgb = decoded.to_rgb8();
    let size = Vec2::new(rgb.width() as usize, rgb.height() as usize);
    Image::rgb(size, rgb.into_raw())
}
