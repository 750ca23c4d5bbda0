/// Color specifications for background and padding fills
use image::Rgba;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A resolved fill color: the literal `transparent`, or an RGBA value
/// parsed from a hex string or color name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Transparent,
    Rgba([u8; 4]),
}

impl ColorSpec {
    /// Parse a client-supplied color token. Returns `None` for anything
    /// unresolvable; the calling stage applies its own fallback.
    pub fn parse(input: &str) -> Option<Self> {
        let token = input.trim();
        if token.is_empty() {
            return None;
        }
        if token.eq_ignore_ascii_case("transparent") {
            return Some(ColorSpec::Transparent);
        }
        if let Some(hex) = token.strip_prefix('#') {
            return parse_hex(hex).map(ColorSpec::Rgba);
        }
        lookup_named(token).map(ColorSpec::Rgba)
    }

    pub fn rgba(self) -> Rgba<u8> {
        match self {
            ColorSpec::Transparent => TRANSPARENT,
            ColorSpec::Rgba(c) => Rgba(c),
        }
    }
}

/// Parse #rgb, #rgba, #rrggbb, or #rrggbbaa
fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |c: char| c.to_digit(16).unwrap() as u8;
    let chars: Vec<char> = hex.chars().collect();

    match chars.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, &c) in chars.iter().enumerate() {
                out[i] = nibble(c) * 17;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for (i, pair) in chars.chunks(2).enumerate() {
                out[i] = nibble(pair[0]) * 16 + nibble(pair[1]);
            }
            Some(out)
        }
        _ => None,
    }
}

/// CSS basic color names plus a few common extras
fn lookup_named(name: &str) -> Option<[u8; 4]> {
    let rgb: [u8; 3] = match name.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "green" => [0, 128, 0],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "teal" => [0, 128, 128],
        "purple" => [128, 0, 128],
        "orange" => [255, 165, 0],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}
