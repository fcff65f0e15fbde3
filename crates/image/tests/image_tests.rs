use {
    base::Vec2,
    image::{Image, ImageError, PixelFormat, decode_jpeg, encode_jpeg, rgb_to_u32},
};

#[test]
fn test_rgb_checks_length() {
    let size = Vec2::new(2, 3);
    let image = Image::rgb(size, (0..18).collect()).unwrap();
    assert_eq!(image.size, size);
    assert_eq!(image.format, PixelFormat::Rgb8);

    let error = Image::rgb(size, vec![0; 17]).unwrap_err();
    assert!(matches!(error, ImageError::Size { expected: 18, got: 17 }));
}

#[test]
fn test_yuyv_to_rgb() {
    let image = Image::new(Vec2::new(2, 1), vec![128, 128, 128, 128], PixelFormat::Yuyv);
    let rgb = image.to_rgb().unwrap();
    assert_eq!(rgb.data, vec![128; 6]);
}

#[test]
fn test_short_yuyv_is_rejected() {
    let image = Image::new(Vec2::new(4, 2), vec![128; 8], PixelFormat::Yuyv);
    assert!(matches!(image.to_rgb(), Err(ImageError::Size { .. })));
}

#[test]
fn test_jpeg_keeps_dimensions_and_colour() {
    let image = Image::filled(Vec2::new(16, 8), [200, 40, 40]);
    let jpeg = encode_jpeg(&image, 90).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let decoded = decode_jpeg(&jpeg).unwrap();
    assert_eq!(decoded.size, Vec2::new(16, 8));
    let [r, g, b] = decoded.pixel(8, 4).unwrap();
    assert!((r as i32 - 200).abs() < 12);
    assert!((g as i32 - 40).abs() < 12);
    assert!((b as i32 - 40).abs() < 12);
}

#[test]
fn test_jpeg_image_to_rgb_decodes() {
    let jpeg = encode_jpeg(&Image::filled(Vec2::new(4, 4), [0, 0, 0]), 80).unwrap();
    let image = Image::new(Vec2::new(4, 4), jpeg, PixelFormat::Jpeg);
    assert_eq!(image.to_rgb().unwrap().format, PixelFormat::Rgb8);
}

#[test]
fn test_garbage_jpeg_fails() {
    assert!(matches!(decode_jpeg(&[1, 2, 3]), Err(ImageError::Decode(_))));
}

#[test]
fn test_to_tensor_is_hwc() {
    let image = Image::filled(Vec2::new(3, 2), [1, 2, 3]);
    let tensor = image.to_tensor().unwrap();
    assert_eq!(tensor.shape, vec![2, 3, 3]);
    assert_eq!(&tensor.data[..3], &[1, 2, 3]);
}

#[test]
fn test_rgb_to_u32() {
    assert_eq!(rgb_to_u32(&[0x12, 0x34, 0x56]), vec![0x0012_3456]);
}
