//! Color conversion between hex, RGB(A) and HSL notations.
//!
//! Hex output is lowercase `#rrggbb`. Parsers return `None` for input they cannot
//! read instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RGBA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)(?:,\s*([\d.]+))?\)").expect("valid rgba regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees (0-360), saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

/// Three-color scheme with hues 120 degrees apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triadic {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

fn channel(n: f64) -> u8 {
    n.clamp(0.0, 255.0).round() as u8
}

/// Channels are clamped to 0-255 and rounded.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Accepts `#rgb`, `#rrggbb`, with or without the leading `#`.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = hex.replacen('#', "", 1);
    let hex = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex,
        _ => return None,
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if max == min {
        (0.0, 0.0) // achromatic
    } else {
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
        } else if max == g {
            ((b - r) / d + 2.0) / 6.0
        } else {
            ((r - g) / d + 4.0) / 6.0
        };
        (h, s)
    };

    Hsl {
        h: (h * 360.0).round() as u16,
        s: (s * 100.0).round() as u8,
        l: (l * 100.0).round() as u8,
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// `h` in degrees, `s` and `l` in percent.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h / 360.0;
    let s = s / 100.0;
    let l = l / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    Rgb {
        r: channel(r * 255.0),
        g: channel(g * 255.0),
        b: channel(b * 255.0),
    }
}

pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    hex_to_rgb(hex).map(|rgb| rgb_to_hsl(rgb.r, rgb.g, rgb.b))
}

pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let rgb = hsl_to_rgb(h, s, l);
    rgb_to_hex(rgb.r.into(), rgb.g.into(), rgb.b.into())
}

/// `rgba(r, g, b, alpha)`; unreadable hex renders as black.
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
    let rgb = hex_to_rgb(hex).unwrap_or(Rgb { r: 0, g: 0, b: 0 });
    format!("rgba({}, {}, {}, {})", rgb.r, rgb.g, rgb.b, alpha)
}

/// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)` into hex, optionally with an alpha byte.
pub fn rgba_to_hex(rgba: &str, include_alpha: bool) -> Option<String> {
    let caps = RGBA_RE.captures(rgba)?;

    let component = |i: usize| -> Option<u8> { caps.get(i)?.as_str().parse::<u8>().ok() };
    let r = component(1)?;
    let g = component(2)?;
    let b = component(3)?;
    let alpha = match caps.get(4) {
        Some(a) => a.as_str().parse::<f64>().ok()?,
        None => 1.0,
    };
    if !(0.0..=1.0).contains(&alpha) {
        return None;
    }

    let mut hex = rgb_to_hex(r.into(), g.into(), b.into());
    if include_alpha {
        hex.push_str(&format!("{:02x}", channel(alpha * 255.0)));
    }
    Some(hex)
}

/// `steps + 1` colors blending linearly from `start` to `end`, both included.
pub fn gradient(start: &str, end: &str, steps: usize) -> Vec<String> {
    let (Some(from), Some(to)) = (hex_to_rgb(start), hex_to_rgb(end)) else {
        return Vec::new();
    };
    if steps == 0 {
        return vec![rgb_to_hex(from.r.into(), from.g.into(), from.b.into())];
    }

    let mix = |a: u8, b: u8, ratio: f64| f64::from(a) * (1.0 - ratio) + f64::from(b) * ratio;
    (0..=steps)
        .map(|i| {
            let ratio = i as f64 / steps as f64;
            rgb_to_hex(
                mix(from.r, to.r, ratio).round(),
                mix(from.g, to.g, ratio).round(),
                mix(from.b, to.b, ratio).round(),
            )
        })
        .collect()
}

fn rotate_hue(hsl: Hsl, degrees: u16) -> String {
    let hue = (hsl.h + degrees) % 360;
    hsl_to_hex(hue.into(), hsl.s.into(), hsl.l.into())
}

/// Opposite hue; unreadable input is returned unchanged.
pub fn complementary(hex: &str) -> String {
    match hex_to_hsl(hex) {
        Some(hsl) => rotate_hue(hsl, 180),
        None => hex.to_string(),
    }
}

pub fn triadic(hex: &str) -> Triadic {
    match hex_to_hsl(hex) {
        Some(hsl) => Triadic {
            primary: hex.to_string(),
            secondary: rotate_hue(hsl, 120),
            tertiary: rotate_hue(hsl, 240),
        },
        None => Triadic {
            primary: hex.to_string(),
            secondary: hex.to_string(),
            tertiary: hex.to_string(),
        },
    }
}

fn random_color(lightness: std::ops::Range<u32>) -> String {
    let h = fastrand::u32(0..360);
    let s = fastrand::u32(70..100);
    let l = fastrand::u32(lightness);
    hsl_to_hex(h.into(), s.into(), l.into())
}

pub fn random_light_color() -> String {
    random_color(70..90)
}

pub fn random_dark_color() -> String {
    random_color(10..30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(255.0, 0.0, 0.0, "#ff0000")]
    #[case(300.0, -5.0, 15.4, "#ff000f")]
    #[case(0.0, 128.0, 255.0, "#0080ff")]
    fn given_channels_when_converting_to_hex_then_clamps_and_pads(
        #[case] r: f64,
        #[case] g: f64,
        #[case] b: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(rgb_to_hex(r, g, b), expected);
    }

    #[rstest]
    #[case("#ff8000", Some(Rgb { r: 255, g: 128, b: 0 }))]
    #[case("F80", Some(Rgb { r: 255, g: 136, b: 0 }))]
    #[case("#ff80", None)]
    #[case("#gg0000", None)]
    #[case("", None)]
    fn given_hex_when_parsing_then_returns_rgb(#[case] hex: &str, #[case] expected: Option<Rgb>) {
        assert_eq!(hex_to_rgb(hex), expected);
    }

    #[test]
    fn given_primary_red_when_converting_to_hsl_and_back_then_matches() {
        let hsl = rgb_to_hsl(255, 0, 0);
        assert_eq!(hsl, Hsl { h: 0, s: 100, l: 50 });
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn given_gray_when_converting_to_hsl_then_is_achromatic() {
        assert_eq!(rgb_to_hsl(128, 128, 128), Hsl { h: 0, s: 0, l: 50 });
        assert_eq!(hsl_to_hex(0.0, 0.0, 50.0), "#808080");
    }

    #[test]
    fn given_hex_when_converting_to_rgba_then_formats_alpha() {
        assert_eq!(hex_to_rgba("#ff0000", 0.5), "rgba(255, 0, 0, 0.5)");
        assert_eq!(hex_to_rgba("nope", 1.0), "rgba(0, 0, 0, 1)");
    }

    #[rstest]
    #[case("rgba(255, 0, 0, 0.5)", false, Some("#ff0000"))]
    #[case("rgba(255, 0, 0, 0.5)", true, Some("#ff000080"))]
    #[case("rgb(0, 128, 255)", true, Some("#0080ffff"))]
    #[case("rgb(256, 0, 0)", false, None)]
    #[case("rgba(0, 0, 0, 1.5)", false, None)]
    #[case("blue", false, None)]
    fn given_rgba_string_when_converting_then_returns_hex(
        #[case] input: &str,
        #[case] include_alpha: bool,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(rgba_to_hex(input, include_alpha).as_deref(), expected);
    }

    #[test]
    fn given_black_to_white_when_building_gradient_then_includes_both_ends() {
        let colors = gradient("#000000", "#ffffff", 2);
        assert_eq!(colors, vec!["#000000", "#808080", "#ffffff"]);
        assert!(gradient("bad", "#ffffff", 2).is_empty());
        assert_eq!(gradient("#000", "#fff", 0), vec!["#000000"]);
    }

    #[test]
    fn given_red_when_deriving_schemes_then_rotates_hue() {
        assert_eq!(complementary("#ff0000"), "#00ffff");
        assert_eq!(complementary("oops"), "oops");

        let scheme = triadic("#ff0000");
        assert_eq!(scheme.primary, "#ff0000");
        assert_eq!(scheme.secondary, "#00ff00");
        assert_eq!(scheme.tertiary, "#0000ff");
    }

    #[test]
    fn given_random_colors_when_generated_then_fall_in_lightness_band() {
        for _ in 0..20 {
            let light = hex_to_hsl(&random_light_color()).unwrap();
            let dark = hex_to_hsl(&random_dark_color()).unwrap();
            assert!(light.l >= 65, "light color too dark: {:?}", light);
            assert!(dark.l <= 35, "dark color too light: {:?}", dark);
        }
    }
}
