/// Raster operations backing the transformation pipeline
///
/// All intermediate work happens on RGBA8 buffers so every stage can rely
/// on a full alpha channel being present.
use crate::error::{AppError, AppResult};
use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageFormat, Rgba, RgbaImage,
};
use std::io::Cursor;

/// Read image dimensions from the header without a full decode
pub fn probe_dimensions(data: &[u8]) -> AppResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Unreadable image data: {}", e)))?;
    reader
        .into_dimensions()
        .map_err(|e| AppError::Decode(format!("Unreadable image data: {}", e)))
}

/// Decode stored bytes to RGBA8, remembering the source format
/// (PNG when the format cannot be detected)
pub fn decode(data: &[u8]) -> AppResult<(RgbaImage, ImageFormat)> {
    let format = image::guess_format(data).unwrap_or(ImageFormat::Png);
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::Decode(format!("Failed to decode image: {}", e)))?
        .to_rgba8();
    Ok((img, format))
}

/// Encode an RGBA8 buffer in the given format.
///
/// Formats without alpha support get a flattened RGB copy; by the time a
/// non-alpha format is chosen the image is fully opaque, so nothing is lost.
pub fn encode(img: &RgbaImage, format: ImageFormat) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);

    let result = match format {
        ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => {
            img.write_to(&mut cursor, format)
        }
        _ => DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .write_to(&mut cursor, format),
    };
    result.map_err(|e| AppError::Internal(format!("Failed to encode image: {}", e)))?;

    Ok(buf)
}

/// MIME type for an output format, defaulting to image/png
pub fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "image/png",
    }
}

/// Bounding box (x, y, width, height) of pixels with alpha > 0,
/// or `None` when the image is entirely transparent
pub fn opaque_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop a sub-rectangle out of the image
pub fn crop(img: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    imageops::crop_imm(img, x, y, width, height).to_image()
}

/// Alpha-composite `img` centered onto `canvas`, offsets floor-divided on
/// both axes. A source larger than the canvas gets clipped symmetrically.
pub fn composite_centered(canvas: &mut RgbaImage, img: &RgbaImage) {
    let x = (canvas.width() as i64 - img.width() as i64).div_euclid(2);
    let y = (canvas.height() as i64 - img.height() as i64).div_euclid(2);
    imageops::overlay(canvas, img, x, y);
}

/// Scale down (never up) to fit within the target box, preserving aspect
/// ratio. Degenerate inputs pass through unchanged.
pub fn scale_to_fit(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = (img.width(), img.height());
    if sw == 0 || sh == 0 {
        return img.clone();
    }

    let scale = (width as f64 / sw as f64)
        .min(height as f64 / sh as f64)
        .min(1.0);
    if scale >= 1.0 {
        return img.clone();
    }

    let nw = ((sw as f64 * scale).round() as u32).max(1);
    let nh = ((sh as f64 * scale).round() as u32).max(1);
    imageops::resize(img, nw, nh, FilterType::Lanczos3)
}

/// Scale so the target box is entirely covered, then center-crop to
/// exactly (width, height)
pub fn scale_to_cover(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = (img.width(), img.height());
    if sw == 0 || sh == 0 {
        return RgbaImage::new(width, height);
    }

    let scale = (width as f64 / sw as f64).max(height as f64 / sh as f64);
    let nw = ((sw as f64 * scale).ceil() as u32).max(width);
    let nh = ((sh as f64 * scale).ceil() as u32).max(height);

    let scaled = imageops::resize(img, nw, nh, FilterType::Lanczos3);
    let x = (nw - width) / 2;
    let y = (nh - height) / 2;
    crop(&scaled, x, y, width, height)
}

/// Rec.601 luminance of an RGBA pixel
fn luminance(pixel: &Rgba<u8>) -> u8 {
    let l = 299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32;
    (l / 1000) as u8
}

/// Replace each pixel with its luminance, keeping alpha intact
pub fn grayscale_in_place(img: &mut RgbaImage) {
    for pixel in img.pixels_mut() {
        let l = luminance(pixel);
        *pixel = Rgba([l, l, l, pixel[3]]);
    }
}

/// Map each pixel's luminance through the fixed sepia ramp
/// (255, 240, 192), producing a fully opaque image
pub fn sepia_in_place(img: &mut RgbaImage) {
    for pixel in img.pixels_mut() {
        let l = luminance(pixel) as u16;
        *pixel = Rgba([
            (255 * l / 255) as u8,
            (240 * l / 255) as u8,
            (192 * l / 255) as u8,
            255,
        ]);
    }
}

/// Gaussian blur across all channels, including alpha
pub fn gaussian_blur(img: &RgbaImage, radius: u32) -> RgbaImage {
    imageops::blur(img, radius as f32)
}

/// True if any pixel is not fully opaque
pub fn has_translucency(img: &RgbaImage) -> bool {
    img.pixels().any(|p| p[3] != 255)
}
