/// The ordered transformation pipeline
///
/// A pure function of the original bytes and the parsed parameters; holds
/// no state between invocations, so concurrent requests need no locking.
use crate::{
    error::{AppError, AppResult},
    transform::{
        color::{OPAQUE_WHITE, TRANSPARENT},
        raster, ColorFilter, FitMode, TransformParams,
    },
};
use image::{ImageFormat, RgbaImage};
use tracing::debug;

/// Decode the original, apply the fixed stage sequence, and re-encode.
///
/// Stage order is load-bearing: filters and blur must see the final framed
/// canvas, and canvas padding must see the already-resized image.
pub fn transform(
    original: &[u8],
    params: &TransformParams,
    max_pixels: u64,
) -> AppResult<(Vec<u8>, &'static str)> {
    // Bound memory/CPU before committing to a full decode
    let (w, h) = raster::probe_dimensions(original)?;
    if w as u64 * h as u64 > max_pixels {
        return Err(AppError::Validation(format!(
            "Image of {}x{} exceeds the {} pixel limit",
            w, h, max_pixels
        )));
    }
    check_canvas_bounds((w, h), params, max_pixels)?;

    let (mut img, source_format) = raster::decode(original)?;
    debug!(
        "Decoded {}x{} image (source format {:?})",
        img.width(),
        img.height(),
        source_format
    );

    img = perfect_fit(img, params);
    img = resize_fit(img, params);
    img = canvas_pad(img, params);

    match params.filter {
        ColorFilter::Grayscale => raster::grayscale_in_place(&mut img),
        ColorFilter::Sepia => raster::sepia_in_place(&mut img),
        ColorFilter::None => {}
    }

    if let Some(radius) = params.blur {
        if radius > 0 {
            debug!("Applying Gaussian blur with radius {}", radius);
            img = raster::gaussian_blur(&img, radius);
        }
    }

    // Translucency forces PNG; fully opaque output keeps the source format
    let output_format = if raster::has_translucency(&img) {
        ImageFormat::Png
    } else {
        source_format
    };

    let bytes = raster::encode(&img, output_format)?;
    Ok((bytes, raster::mime_type(output_format)))
}

/// Reject parameter sets whose intermediate canvases would exceed the
/// pixel limit; stage math below allocates canvases of these sizes
fn check_canvas_bounds(
    source: (u32, u32),
    params: &TransformParams,
    max_pixels: u64,
) -> AppResult<()> {
    let mut canvases: Vec<(u64, u64)> = Vec::new();

    if let Some(p) = params.perfect_fit {
        canvases.push((
            source.0 as u64 + 2 * p as u64,
            source.1 as u64 + 2 * p as u64,
        ));
    }
    match (params.width, params.height) {
        (Some(w), Some(h)) => canvases.push((w as u64, h as u64)),
        (Some(w), None) => canvases.push((w as u64, w as u64)),
        (None, Some(h)) => canvases.push((h as u64, h as u64)),
        (None, None) => {}
    }
    if let (Some(pw), Some(ph)) = (params.pad_width, params.pad_height) {
        canvases.push((pw as u64, ph as u64));
    }

    for (w, h) in canvases {
        if w.checked_mul(h).map_or(true, |px| px > max_pixels) {
            return Err(AppError::Validation(format!(
                "Requested canvas of {}x{} exceeds the {} pixel limit",
                w, h, max_pixels
            )));
        }
    }
    Ok(())
}

/// Trim fully-transparent margins, then re-add a uniform transparent
/// padding margin. No-op when the parameter is absent or the image has no
/// opaque content to trim to.
fn perfect_fit(img: RgbaImage, params: &TransformParams) -> RgbaImage {
    let Some(padding) = params.perfect_fit else {
        return img;
    };
    let Some((x, y, w, h)) = raster::opaque_bounds(&img) else {
        return img;
    };

    debug!("Perfect fit: trimming to {}x{}, padding {}", w, h, padding);
    let trimmed = raster::crop(&img, x, y, w, h);
    let mut canvas = RgbaImage::from_pixel(w + 2 * padding, h + 2 * padding, TRANSPARENT);
    raster::composite_centered(&mut canvas, &trimmed);
    canvas
}

/// Resize to the requested box. A single given axis implies a square
/// target. Crop mode fills the box exactly; contain mode scales down and
/// composites centered onto a background canvas of the exact box size.
fn resize_fit(img: RgbaImage, params: &TransformParams) -> RgbaImage {
    let (width, height) = match (params.width, params.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w),
        (None, Some(h)) => (h, h),
        (None, None) => return img,
    };

    match params.fit {
        FitMode::Crop => {
            debug!("Resize: crop to {}x{}", width, height);
            raster::scale_to_cover(&img, width, height)
        }
        FitMode::Contain => {
            let background = params
                .background
                .map(|c| c.rgba())
                .unwrap_or(TRANSPARENT);
            debug!("Resize: contain within {}x{}", width, height);

            let scaled = raster::scale_to_fit(&img, width, height);
            let mut canvas = RgbaImage::from_pixel(width, height, background);
            raster::composite_centered(&mut canvas, &scaled);
            canvas
        }
    }
}

/// Composite the current image centered onto a fixed-size colored canvas.
/// Requires both pad dimensions; runs strictly after the resize stage.
fn canvas_pad(img: RgbaImage, params: &TransformParams) -> RgbaImage {
    let (Some(pad_w), Some(pad_h)) = (params.pad_width, params.pad_height) else {
        return img;
    };

    let fill = params.pad_color.map(|c| c.rgba()).unwrap_or(OPAQUE_WHITE);
    debug!("Canvas padding to {}x{}", pad_w, pad_h);

    let mut canvas = RgbaImage::from_pixel(pad_w, pad_h, fill);
    raster::composite_centered(&mut canvas, &img);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ColorSpec;
    use image::Rgba;

    const MAX_PIXELS: u64 = 50_000_000;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        raster::encode(img, ImageFormat::Png).unwrap()
    }

    fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([120, 90, 60, 255]));
        raster::encode(&img, ImageFormat::Jpeg).unwrap()
    }

    fn decoded(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_identity_keeps_source_format_for_opaque_input() {
        let original = jpeg_bytes(20, 10);
        let (out, mime) = transform(&original, &TransformParams::default(), MAX_PIXELS).unwrap();

        assert_eq!(mime, "image/jpeg");
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let img = decoded(&out);
        assert_eq!((img.width(), img.height()), (20, 10));
    }

    #[test]
    fn test_translucent_output_is_png() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 128]));
        let (out, mime) = transform(&png_bytes(&img), &TransformParams::default(), MAX_PIXELS)
            .unwrap();

        assert_eq!(mime, "image/png");
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_contain_forces_png_for_jpeg_source_with_transparent_margin() {
        // a 20x10 JPEG contained in a 100x100 box gains transparent bars
        let params = TransformParams {
            width: Some(100),
            height: Some(100),
            ..Default::default()
        };
        let (out, mime) = transform(&jpeg_bytes(20, 10), &params, MAX_PIXELS).unwrap();

        assert_eq!(mime, "image/png");
        let img = decoded(&out);
        assert_eq!((img.width(), img.height()), (100, 100));
    }

    #[test]
    fn test_crop_fit_exact_dimensions() {
        for (sw, sh) in [(400, 100), (100, 400), (50, 50)] {
            let params = TransformParams {
                width: Some(100),
                height: Some(100),
                fit: FitMode::Crop,
                ..Default::default()
            };
            let (out, _) = transform(&jpeg_bytes(sw, sh), &params, MAX_PIXELS).unwrap();
            let img = decoded(&out);
            assert_eq!((img.width(), img.height()), (100, 100));
        }
    }

    #[test]
    fn test_single_axis_becomes_square() {
        let params = TransformParams {
            width: Some(200),
            ..Default::default()
        };
        let (out, _) = transform(&jpeg_bytes(400, 100), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);
        assert_eq!((img.width(), img.height()), (200, 200));
    }

    #[test]
    fn test_contain_never_upscales_content() {
        let source = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let params = TransformParams {
            width: Some(100),
            height: Some(100),
            ..Default::default()
        };
        let (out, _) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);

        assert_eq!((img.width(), img.height()), (100, 100));
        // content stays 10x10, centered at (45..55); corners are background
        assert_eq!(img.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(44, 50)[3], 0);
    }

    #[test]
    fn test_contain_background_color() {
        let params = TransformParams {
            width: Some(40),
            height: Some(40),
            background: ColorSpec::parse("red"),
            ..Default::default()
        };
        let source = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]));
        let (out, _) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);

        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(20, 20), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_perfect_fit_trims_and_pads() {
        // 30x30 transparent canvas with an opaque 10x6 block at (5, 7)
        let mut source = RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 0]));
        for x in 5..15 {
            for y in 7..13 {
                source.put_pixel(x, y, Rgba([0, 255, 0, 255]));
            }
        }
        let params = TransformParams {
            perfect_fit: Some(10),
            ..Default::default()
        };
        let (out, mime) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);

        assert_eq!(mime, "image/png");
        assert_eq!((img.width(), img.height()), (10 + 20, 6 + 20));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(10, 10), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_perfect_fit_on_fully_transparent_image_is_noop() {
        let source = RgbaImage::from_pixel(12, 9, Rgba([0, 0, 0, 0]));
        let params = TransformParams {
            perfect_fit: Some(10),
            ..Default::default()
        };
        let (out, _) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);
        assert_eq!((img.width(), img.height()), (12, 9));
    }

    #[test]
    fn test_canvas_padding_after_resize() {
        let params = TransformParams {
            width: Some(50),
            height: Some(50),
            fit: FitMode::Crop,
            pad_width: Some(80),
            pad_height: Some(60),
            ..Default::default()
        };
        let (out, _) = transform(&jpeg_bytes(100, 100), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);

        assert_eq!((img.width(), img.height()), (80, 60));
        // default pad fill is opaque white
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_canvas_padding_requires_both_dimensions() {
        let params = TransformParams {
            pad_width: Some(80),
            ..Default::default()
        };
        let (out, _) = transform(&jpeg_bytes(20, 20), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);
        assert_eq!((img.width(), img.height()), (20, 20));
    }

    #[test]
    fn test_blur_clamp_outputs_identical() {
        let mut source = RgbaImage::from_pixel(16, 16, Rgba([200, 10, 10, 255]));
        source.put_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let bytes = png_bytes(&source);

        let at_50 = TransformParams {
            blur: Some(50),
            ..Default::default()
        };
        // parse-time clamping means blur=51 arrives here as 50 already;
        // verify the equivalence end to end through from_query
        let query_51: std::collections::HashMap<String, String> =
            [("blur".to_string(), "51".to_string())].into();
        let at_51 = TransformParams::from_query(&query_51);

        let (out_50, _) = transform(&bytes, &at_50, MAX_PIXELS).unwrap();
        let (out_51, _) = transform(&bytes, &at_51, MAX_PIXELS).unwrap();
        assert_eq!(out_50, out_51);
    }

    #[test]
    fn test_blur_zero_is_noop() {
        let bytes = jpeg_bytes(10, 10);
        let none = transform(&bytes, &TransformParams::default(), MAX_PIXELS).unwrap();
        let zero = transform(
            &bytes,
            &TransformParams {
                blur: Some(0),
                ..Default::default()
            },
            MAX_PIXELS,
        )
        .unwrap();
        assert_eq!(none.0, zero.0);
    }

    #[test]
    fn test_grayscale_filter() {
        let source = RgbaImage::from_pixel(5, 5, Rgba([255, 0, 0, 255]));
        let params = TransformParams {
            filter: ColorFilter::Grayscale,
            ..Default::default()
        };
        let (out, _) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);
        let p = img.get_pixel(2, 2);
        assert_eq!((p[0], p[1], p[2]), (76, 76, 76));
    }

    #[test]
    fn test_sepia_filter_is_opaque() {
        let source = RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 100]));
        let params = TransformParams {
            filter: ColorFilter::Sepia,
            ..Default::default()
        };
        let (out, mime) = transform(&png_bytes(&source), &params, MAX_PIXELS).unwrap();
        let img = decoded(&out);

        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 240, 192, 255]));
        // fully opaque output of a PNG source still encodes as PNG
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn test_undecodable_bytes_error() {
        let err = transform(b"not an image", &TransformParams::default(), MAX_PIXELS)
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_pixel_limit_enforced() {
        let bytes = jpeg_bytes(100, 100);
        let err = transform(&bytes, &TransformParams::default(), 9_999).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_requested_canvas_bounded_by_pixel_limit() {
        let bytes = jpeg_bytes(10, 10);
        let params = TransformParams {
            width: Some(100_000),
            height: Some(100_000),
            ..Default::default()
        };
        let err = transform(&bytes, &params, MAX_PIXELS).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let params = TransformParams {
            perfect_fit: Some(u32::MAX),
            ..Default::default()
        };
        let err = transform(&bytes, &params, MAX_PIXELS).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
