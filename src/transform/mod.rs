/// On-the-fly image transformation
///
/// `TransformParams` is the parsed, immutable parameter set for one view
/// request; `pipeline::transform` applies the ordered stage sequence.

pub mod color;
pub mod pipeline;
pub mod raster;

pub use color::ColorSpec;

use std::collections::HashMap;

/// Maximum accepted Gaussian blur radius; bounds worst-case CPU per request
pub const MAX_BLUR_RADIUS: u32 = 50;

/// How a resize request maps the source onto the target box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale down to fit inside the box, composite centered on a
    /// background canvas of exactly the requested size
    #[default]
    Contain,
    /// Scale and center-crop to exactly fill the box
    Crop,
}

/// Per-pixel color filter applied after geometry stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFilter {
    #[default]
    None,
    Grayscale,
    Sepia,
}

/// Immutable transformation parameters for one request.
///
/// Invariant: parsing never fails. Unparseable or degenerate values are
/// dropped and the affected stage falls back to its default or is skipped.
#[derive(Debug, Clone, Default)]
pub struct TransformParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: FitMode,
    pub background: Option<ColorSpec>,
    pub filter: ColorFilter,
    /// Already clamped to `0..=MAX_BLUR_RADIUS`
    pub blur: Option<u32>,
    pub perfect_fit: Option<u32>,
    pub pad_width: Option<u32>,
    pub pad_height: Option<u32>,
    pub pad_color: Option<ColorSpec>,
}

impl TransformParams {
    /// Build parameters from raw query pairs, silently dropping anything
    /// that does not parse.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let int = |key: &str| query.get(key).and_then(|v| v.parse::<u32>().ok());
        // zero-sized targets are degenerate; treat them as absent
        let dim = |key: &str| int(key).filter(|v| *v > 0);

        let fit = match query.get("fit").map(String::as_str) {
            Some("crop") => FitMode::Crop,
            _ => FitMode::Contain,
        };
        let filter = match query.get("filter").map(String::as_str) {
            Some("grayscale") => ColorFilter::Grayscale,
            Some("sepia") => ColorFilter::Sepia,
            _ => ColorFilter::None,
        };

        Self {
            width: dim("w"),
            height: dim("h"),
            fit,
            background: query.get("bg_color").and_then(|v| ColorSpec::parse(v)),
            filter,
            blur: int("blur").map(|r| r.min(MAX_BLUR_RADIUS)),
            perfect_fit: int("perfect_fit"),
            pad_width: dim("pad_w"),
            pad_height: dim("pad_h"),
            pad_color: query.get("pad_color").and_then(|v| ColorSpec::parse(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_query_is_all_defaults() {
        let p = TransformParams::from_query(&HashMap::new());
        assert_eq!(p.width, None);
        assert_eq!(p.height, None);
        assert_eq!(p.fit, FitMode::Contain);
        assert_eq!(p.filter, ColorFilter::None);
        assert_eq!(p.blur, None);
        assert_eq!(p.perfect_fit, None);
    }

    #[test]
    fn test_integers_parse() {
        let p = TransformParams::from_query(&query(&[
            ("w", "120"),
            ("h", "80"),
            ("blur", "3"),
            ("perfect_fit", "10"),
            ("pad_w", "200"),
            ("pad_h", "100"),
        ]));
        assert_eq!(p.width, Some(120));
        assert_eq!(p.height, Some(80));
        assert_eq!(p.blur, Some(3));
        assert_eq!(p.perfect_fit, Some(10));
        assert_eq!(p.pad_width, Some(200));
        assert_eq!(p.pad_height, Some(100));
    }

    #[test]
    fn test_unparseable_integers_dropped() {
        let p = TransformParams::from_query(&query(&[
            ("w", "abc"),
            ("h", "-5"),
            ("blur", "1.5"),
            ("perfect_fit", ""),
        ]));
        assert_eq!(p.width, None);
        assert_eq!(p.height, None);
        assert_eq!(p.blur, None);
        assert_eq!(p.perfect_fit, None);
    }

    #[test]
    fn test_zero_dimensions_dropped() {
        let p = TransformParams::from_query(&query(&[("w", "0"), ("pad_w", "0")]));
        assert_eq!(p.width, None);
        assert_eq!(p.pad_width, None);
    }

    #[test]
    fn test_blur_clamped_at_parse() {
        let p = TransformParams::from_query(&query(&[("blur", "51")]));
        assert_eq!(p.blur, Some(MAX_BLUR_RADIUS));
        let p = TransformParams::from_query(&query(&[("blur", "0")]));
        assert_eq!(p.blur, Some(0));
    }

    #[test]
    fn test_unknown_enum_tokens_degrade_to_default() {
        let p = TransformParams::from_query(&query(&[("fit", "stretch"), ("filter", "invert")]));
        assert_eq!(p.fit, FitMode::Contain);
        assert_eq!(p.filter, ColorFilter::None);
    }

    #[test]
    fn test_invalid_colors_dropped() {
        let p = TransformParams::from_query(&query(&[
            ("bg_color", "notacolor"),
            ("pad_color", "#12345"),
        ]));
        assert_eq!(p.background, None);
        assert_eq!(p.pad_color, None);
    }
}
