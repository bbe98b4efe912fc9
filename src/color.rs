use std::borrow::Cow;

/// Fallback keyword substituted for color functions the rasterizer cannot parse.
pub const CURRENT_COLOR: &str = "currentColor";

/// Parse a color string into an RGB tuple.
///
/// Supports:
/// - Named colors: black, white, red, green, blue, yellow, cyan, magenta,
///   gray/grey, orange, purple, pink, brown
/// - Hex: `#RGB` (expanded to `#RRGGBB`), `#RRGGBB`
/// - Functional: `rgb(r, g, b)` and `rgba(r, g, b, a)` (alpha ignored)
/// - Case-insensitive, trims whitespace
pub fn parse_color(s: &str) -> Option<(u8, u8, u8)> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else if let Some(args) = function_args(s, "rgba").or_else(|| function_args(s, "rgb")) {
        parse_rgb_args(args)
    } else {
        parse_named(s)
    }
}

/// Whether `s` uses the CSS `color()` function (e.g. `color(display-p3 1 0 0)`).
pub fn is_color_function(s: &str) -> bool {
    s.to_ascii_lowercase().contains("color(")
}

/// Replace color values the rasterizer cannot parse with [`CURRENT_COLOR`].
pub fn simplify_color(s: &str) -> Cow<'_, str> {
    if is_color_function(s) {
        Cow::Borrowed(CURRENT_COLOR)
    } else {
        Cow::Borrowed(s)
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let open = s.find('(')?;
    if !s[..open].trim().eq_ignore_ascii_case(name) {
        return None;
    }
    s[open + 1..].trim_end().strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Option<(u8, u8, u8)> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        let value: f64 = p.parse().ok()?;
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    Some((channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}

fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some((r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

fn parse_named(s: &str) -> Option<(u8, u8, u8)> {
    match s.to_lowercase().as_str() {
        "black"         => Some((0, 0, 0)),
        "white"         => Some((255, 255, 255)),
        "red"           => Some((255, 0, 0)),
        "green"         => Some((0, 128, 0)),
        "blue"          => Some((0, 0, 255)),
        "yellow"        => Some((255, 255, 0)),
        "cyan"          => Some((0, 255, 255)),
        "magenta"       => Some((255, 0, 255)),
        "gray" | "grey" => Some((128, 128, 128)),
        "orange"        => Some((255, 165, 0)),
        "purple"        => Some((128, 0, 128)),
        "pink"          => Some((255, 192, 203)),
        "brown"         => Some((139, 69, 19)),
        _               => None,
    }
}
