use once_cell::sync::Lazy;

mod hex_color;

pub use hex_color::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn alpha(self) -> u8 {
        self.a
    }

    /// Linear-space RGBA, the form written into UI constant records.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a as f32 / 255.0,
        ]
    }

    /// Parses a stylesheet color value: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)` or one of a handful of names.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with('#') {
            return HexColor::new(raw).to_color();
        }
        let lower = raw.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_function(args);
        }
        named_color(&lower)
    }
}

fn function_args<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_function(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(s) => {
            let v: f32 = s.parse().ok()?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::rgba(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "yellow" => Color::rgb(255, 255, 0),
        _ => return None,
    };
    Some(color)
}

static SRGB8_TO_LINEAR: Lazy<[f32; 256]> = Lazy::new(|| {
    let mut t = [0.0f32; 256];
    for (i, slot) in t.iter_mut().enumerate() {
        *slot = srgb_to_linear_f32(i as f32 / 255.0);
    }
    t
});

pub fn srgb_to_linear(c: u8) -> f32 {
    SRGB8_TO_LINEAR[c as usize]
}

pub fn srgb_to_linear_f32(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_hex_rgb_and_names() {
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#0f08"), Some(Color::rgba(0, 255, 0, 136)));
        assert_eq!(Color::parse("rgba(10, 20, 30, 0.5)"), Some(Color::rgba(10, 20, 30, 128)));
        assert_eq!(Color::parse("rgb(1,2,3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(Color::parse("  White "), Some(Color::WHITE));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let [r, g, b, a] = Color::rgba(255, 0, 255, 0).to_rgba_f32();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert_eq!(b, 1.0);
        assert_eq!(a, 0.0);
    }
}
