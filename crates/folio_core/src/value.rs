//! Animatable values
//!
//! Numbers carry a unit so that pixel, percentage and angle properties can be
//! interpolated linearly without the engine knowing anything about layout.
//! Colors are interpolated component-wise in straight (non-premultiplied)
//! sRGB space.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit attached to a numeric property value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Unitless scalar (opacity, scale, progress)
    #[default]
    None,
    /// Logical pixels
    Px,
    /// Percentage of some host-defined reference
    Percent,
    /// Degrees
    Deg,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Deg => "deg",
        }
    }
}

/// RGBA color with f32 components (0.0 to 1.0)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from u8 components (0-255)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create from hex value (0xRRGGBB or 0xRRGGBBAA)
    pub fn from_hex(hex: u32) -> Self {
        if hex > 0xFFFFFF {
            Self::from_rgba8(
                ((hex >> 24) & 0xFF) as u8,
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
            )
        } else {
            Self::from_rgba8(
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
                255,
            )
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise linear interpolation
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// A property value a target can hold
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Number(f32, Unit),
    Color(Color),
}

impl Value {
    pub const fn number(value: f32) -> Self {
        Value::Number(value, Unit::None)
    }

    pub const fn px(value: f32) -> Self {
        Value::Number(value, Unit::Px)
    }

    pub const fn percent(value: f32) -> Self {
        Value::Number(value, Unit::Percent)
    }

    pub const fn deg(value: f32) -> Self {
        Value::Number(value, Unit::Deg)
    }

    /// Numeric component, if this is a number
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Number(v, _) => Some(*v),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Number(..) => None,
        }
    }

    pub fn unit(&self) -> Option<Unit> {
        match self {
            Value::Number(_, unit) => Some(*unit),
            Value::Color(_) => None,
        }
    }

    /// Shift a number by `delta` keeping its unit. Colors are returned unchanged.
    pub fn offset(&self, delta: f32) -> Value {
        match self {
            Value::Number(v, unit) => Value::Number(v + delta, *unit),
            Value::Color(c) => Value::Color(*c),
        }
    }

    /// Interpolate toward `other`.
    ///
    /// Numbers with different units interpolate their magnitudes and take the
    /// destination unit. A number and a color cannot be blended, so the value
    /// steps to `other` only once `t` reaches 1.
    pub fn lerp(&self, other: &Value, t: f32) -> Value {
        match (self, other) {
            (Value::Number(a, _), Value::Number(b, unit)) => Value::Number(a + (b - a) * t, *unit),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            _ => {
                if t >= 1.0 {
                    *other
                } else {
                    *self
                }
            }
        }
    }

    pub fn approx_eq(&self, other: &Value, epsilon: f32) -> bool {
        match (self, other) {
            (Value::Number(a, _), Value::Number(b, _)) => (a - b).abs() < epsilon,
            (Value::Color(a), Value::Color(b)) => {
                (a.r - b.r).abs() < epsilon
                    && (a.g - b.g).abs() < epsilon
                    && (a.b - b.b).abs() < epsilon
                    && (a.a - b.a).abs() < epsilon
            }
            _ => false,
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::number(value)
    }
}

impl From<Color> for Value {
    fn from(color: Color) -> Self {
        Value::Color(color)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v, unit) => write!(f, "{}{}", v, unit.suffix()),
            Value::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
        }
    }
}

/// Resting value a property is assumed to hold when a target never set it.
///
/// Scale and opacity rest at 1, everything else at 0 in the unit of `like`.
pub fn default_for(property: &str, like: Option<&Value>) -> Value {
    match property {
        "opacity" | "scale" | "scaleX" | "scaleY" => Value::number(1.0),
        _ => match like {
            Some(Value::Color(_)) => Value::Color(Color::TRANSPARENT),
            Some(Value::Number(_, unit)) => Value::Number(0.0, *unit),
            None => Value::number(0.0),
        },
    }
}

/// Error returned when a value string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse `{0}` as a property value")]
pub struct ParseValueError(pub String);

impl FromStr for Value {
    type Err = ParseValueError;

    /// Accepts `12`, `12px`, `50%`, `360deg`, `#rgb`, `#rrggbb` and `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseValueError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map(Value::Color).ok_or_else(err);
        }

        let (number, unit) = if let Some(n) = s.strip_suffix("px") {
            (n, Unit::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Unit::Percent)
        } else if let Some(n) = s.strip_suffix("deg") {
            (n, Unit::Deg)
        } else {
            (s, Unit::None)
        };

        number
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| Value::Number(v, unit))
            .ok_or_else(err)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let raw = u32::from_str_radix(hex, 16).ok()?;
            let expand = |n: u32| ((n & 0xF) * 0x11) as u8;
            Some(Color::from_rgba8(
                expand(raw >> 8),
                expand(raw >> 4),
                expand(raw),
                255,
            ))
        }
        6 => Some(Color::from_hex(u32::from_str_radix(hex, 16).ok()?)),
        8 => {
            let raw = u32::from_str_radix(hex, 16).ok()?;
            Some(Color::from_rgba8(
                (raw >> 24) as u8,
                (raw >> 16) as u8,
                (raw >> 8) as u8,
                raw as u8,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("20px".parse::<Value>(), Ok(Value::px(20.0)));
        assert_eq!("-50%".parse::<Value>(), Ok(Value::percent(-50.0)));
        assert_eq!("360deg".parse::<Value>(), Ok(Value::deg(360.0)));
        assert_eq!("0.8".parse::<Value>(), Ok(Value::number(0.8)));
        assert!("wide".parse::<Value>().is_err());
    }

    #[test]
    fn test_parse_colors() {
        let red: Value = "#f00".parse().unwrap();
        assert_eq!(red, Value::Color(Color::rgb(1.0, 0.0, 0.0)));

        let half: Value = "#00000080".parse().unwrap();
        let c = half.as_color().unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_number_lerp_keeps_destination_unit() {
        let v = Value::px(0.0).lerp(&Value::px(100.0), 0.25);
        assert_eq!(v, Value::px(25.0));

        let mixed = Value::number(0.0).lerp(&Value::percent(50.0), 0.5);
        assert_eq!(mixed, Value::percent(25.0));
    }

    #[test]
    fn test_color_lerp_componentwise() {
        let a = Value::Color(Color::BLACK);
        let b = Value::Color(Color::WHITE);
        let mid = a.lerp(&b, 0.5).as_color().unwrap();
        assert_eq!(mid, Color::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_mismatched_kinds_step_at_end() {
        let a = Value::number(1.0);
        let b = Value::Color(Color::WHITE);
        assert_eq!(a.lerp(&b, 0.99), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_for("opacity", None), Value::number(1.0));
        assert_eq!(default_for("y", Some(&Value::px(20.0))), Value::px(0.0));
    }
}
