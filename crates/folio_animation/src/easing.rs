//! Easing functions for animations

use crate::error::AnimationError;
use std::str::FromStr;

/// Default overshoot for the `back` family
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    /// Pulls back before moving forward (overshoot amount)
    BackIn(f32),
    /// Overshoots the destination then settles (overshoot amount)
    BackOut(f32),
    BackInOut(f32),
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::BackIn(s) => back_in(t, *s),
            Easing::BackOut(s) => 1.0 - back_in(1.0 - t, *s),
            Easing::BackInOut(s) => {
                if t < 0.5 {
                    back_in(t * 2.0, *s) / 2.0
                } else {
                    1.0 - back_in((1.0 - t) * 2.0, *s) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }
}

#[inline]
fn back_in(t: f32, s: f32) -> f32 {
    t * t * ((s + 1.0) * t - s)
}

impl FromStr for Easing {
    type Err = AnimationError;

    /// Parse a named curve.
    ///
    /// Accepts CSS names (`linear`, `ease-in`, `ease-out`, `ease-in-out`,
    /// `cubic-bezier(a, b, c, d)`) and the `family.direction` form used by
    /// page scripts (`none`, `power1.out`, `power2.inOut`, `back.out(1.7)`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || AnimationError::UnknownEasing(name.to_string());

        if let Some(args) = call_args(name, "cubic-bezier") {
            let values: Vec<f32> = args
                .split(',')
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| unknown())?;
            return match values.as_slice() {
                [x1, y1, x2, y2] => Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2)),
                _ => Err(unknown()),
            };
        }

        let (base, overshoot) = match name.find('(') {
            Some(open) => {
                let args = call_args(name, &name[..open]).ok_or_else(unknown)?;
                let value = args.trim().parse::<f32>().map_err(|_| unknown())?;
                (&name[..open], Some(value))
            }
            None => (name, None),
        };

        let easing = match base {
            "linear" | "none" => Easing::Linear,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "power1.in" | "quad.in" => Easing::EaseInQuad,
            "power1.out" | "power1" | "quad.out" => Easing::EaseOutQuad,
            "power1.inOut" | "quad.inOut" => Easing::EaseInOutQuad,
            "power2.in" | "cubic.in" => Easing::EaseInCubic,
            "power2.out" | "power2" | "cubic.out" => Easing::EaseOutCubic,
            "power2.inOut" | "cubic.inOut" => Easing::EaseInOutCubic,
            "power3.in" | "quart.in" => Easing::EaseInQuart,
            "power3.out" | "power3" | "quart.out" => Easing::EaseOutQuart,
            "power3.inOut" | "quart.inOut" => Easing::EaseInOutQuart,
            "back.in" => Easing::BackIn(overshoot.unwrap_or(BACK_OVERSHOOT)),
            "back.out" | "back-out" | "back" => Easing::BackOut(overshoot.unwrap_or(BACK_OVERSHOOT)),
            "back.inOut" => Easing::BackInOut(overshoot.unwrap_or(BACK_OVERSHOOT)),
            _ => return Err(unknown()),
        };

        // Only the back family takes an argument
        if overshoot.is_some()
            && !matches!(
                easing,
                Easing::BackIn(_) | Easing::BackOut(_) | Easing::BackInOut(_)
            )
        {
            return Err(unknown());
        }

        Ok(easing)
    }
}

/// `name(args)` -> `args`
fn call_args<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Cubic bezier easing calculation (matches browser `cubic-bezier()` timing).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter at 120fps.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break; // slope too flat, switch to binary search
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::BackIn(BACK_OVERSHOOT),
        Easing::BackOut(BACK_OVERSHOOT),
        Easing::BackInOut(BACK_OVERSHOOT),
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_power_out_endpoint_is_bit_exact() {
        // Progress counters rely on reaching exactly 1.0
        assert_eq!(Easing::EaseOutCubic.apply(1.0), 1.0);
        assert_eq!(Easing::EaseOutQuad.apply(1.0), 1.0);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BackOut(1.7).apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("none".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("power2.out".parse::<Easing>(), Ok(Easing::EaseOutCubic));
        assert_eq!("power1.inOut".parse::<Easing>(), Ok(Easing::EaseInOutQuad));
        assert_eq!("ease-in-out".parse::<Easing>(), Ok(Easing::EaseInOut));
        assert_eq!("back.out(1.7)".parse::<Easing>(), Ok(Easing::BackOut(1.7)));
        assert_eq!(
            "back.out".parse::<Easing>(),
            Ok(Easing::BackOut(BACK_OVERSHOOT))
        );
        assert_eq!(
            "cubic-bezier(0.4, 0, 0.2, 1)".parse::<Easing>(),
            Ok(Easing::CubicBezier(0.4, 0.0, 0.2, 1.0))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "bouncy".parse::<Easing>(),
            Err(AnimationError::UnknownEasing(_))
        ));
        assert!("power2.out(3)".parse::<Easing>().is_err());
        assert!("cubic-bezier(1, 2)".parse::<Easing>().is_err());
    }
}
