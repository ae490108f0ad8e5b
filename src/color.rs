//! Hex color strings.

use std::sync::OnceLock;

use regex::Regex;

static HEX_COLOR: OnceLock<Option<Regex>> = OnceLock::new();

fn hex_pattern() -> Option<&'static Regex> {
    HEX_COLOR
        .get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok())
        .as_ref()
}

/// Whether `s` is `#rgb` or `#rrggbb`.
pub fn is_hex_color(s: &str) -> bool {
    hex_pattern().is_some_and(|re| re.is_match(s))
}

/// Canonical `#rrggbb` lowercase form, or `None` if `s` is not a hex color.
pub fn normalize_hex(s: &str) -> Option<String> {
    if !is_hex_color(s) {
        return None;
    }
    let digits = &s[1..];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}

/// Color components in `0.0..=1.0`. Anything unparseable is black.
pub fn hex_to_rgb(s: &str) -> (f64, f64, f64) {
    let Some(hex) = normalize_hex(s) else {
        return (0.0, 0.0, 0.0);
    };
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| f64::from(v) / 255.0)
            .unwrap_or(0.0)
    };
    (channel(1), channel(3), channel(5))
}

/// Format `0.0..=1.0` components as `#rrggbb`.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#1A2b3C"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color("red"));
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#AbC").as_deref(), Some("#aabbcc"));
        assert_eq!(normalize_hex("#102030").as_deref(), Some("#102030"));
        assert_eq!(normalize_hex("blue"), None);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff0000"), (1.0, 0.0, 0.0));
        assert_eq!(hex_to_rgb("#fff"), (1.0, 1.0, 1.0));
        assert_eq!(hex_to_rgb("nonsense"), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(0.0, 0.5, 1.0), "#0080ff");
        assert_eq!(rgb_to_hex(2.0, -1.0, 0.0), "#ff0000");
    }
}
