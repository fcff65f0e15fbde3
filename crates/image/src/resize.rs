use {crate::*, base::Vec2};

/// Nearest-neighbour resample of an RGB image to `size`. With `mirror` set the
/// result is flipped horizontally, the way a selfie preview is shown.
pub fn resize_nearest(image: &Image, size: Vec2<usize>, mirror: bool) -> Result<Image, ImageError> {
    if image.format != PixelFormat::Rgb8 {
        return Err(ImageError::Unsupported(image.format));
    }
    if image.size.area() == 0 || size.area() == 0 {
        return Ok(Image::filled(size, [0, 0, 0]));
    }

    let mut data = Vec::with_capacity(size.area() * 3);
    for y in 0..size.y {
        let sy = y * image.size.y / size.y;
        let row = sy * image.size.x;
        for x in 0..size.x {
            let dx = if mirror { size.x - 1 - x } else { x };
            let sx = dx * image.size.x / size.x;
            let i = (row + sx) * 3;
            data.extend_from_slice(&image.data[i..i + 3]);
        }
    }
    Ok(Image::new(size, data, PixelFormat::Rgb8))
}
