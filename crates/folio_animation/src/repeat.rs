//! Repeat and yoyo policy
//!
//! An animation with a repeat policy plays one *period* (its duration, or a
//! timeline's span) `1 + count` times, or forever. With yoyo enabled every odd
//! iteration runs backward. The delay only applies before the first iteration.

use crate::error::{AnimationError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How many extra iterations follow the first one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    Count(u32),
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

impl Repeat {
    /// `-1` means infinite, any other negative number is rejected
    pub fn from_count(count: i64) -> Result<Self> {
        match count {
            -1 => Ok(Repeat::Infinite),
            n if n < 0 => Err(AnimationError::InvalidRepeat(n.to_string())),
            n => Ok(Repeat::Count(u32::try_from(n).unwrap_or(u32::MAX))),
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Repeat::Infinite)
    }
}

impl FromStr for Repeat {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "infinite" | "-1" => Ok(Repeat::Infinite),
            other => other
                .parse::<i64>()
                .map_err(|_| AnimationError::InvalidRepeat(other.to_string()))
                .and_then(Repeat::from_count),
        }
    }
}

/// Repeat count plus direction alternation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepeatPolicy {
    pub repeat: Repeat,
    pub yoyo: bool,
}

/// Where a playhead falls inside a repeating animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cycle {
    /// Zero-based iteration index
    pub iteration: u32,
    /// Time inside the current iteration, `0..=period`
    pub local: f64,
    /// Whether this iteration runs backward (yoyo)
    pub reversed: bool,
    /// Playhead is at or past the end of the last iteration
    pub finished: bool,
}

impl Cycle {
    /// Linear progress through the iteration in `0.0..=1.0`, direction applied
    pub fn fraction(&self, period: f64) -> f64 {
        let raw = if period > 0.0 && period.is_finite() {
            (self.local / period).clamp(0.0, 1.0)
        } else if period.is_infinite() {
            0.0
        } else {
            1.0
        };
        if self.reversed {
            1.0 - raw
        } else {
            raw
        }
    }
}

impl RepeatPolicy {
    pub const ONCE: RepeatPolicy = RepeatPolicy {
        repeat: Repeat::Count(0),
        yoyo: false,
    };

    pub fn new(repeat: Repeat, yoyo: bool) -> Self {
        Self { repeat, yoyo }
    }

    /// Total play time for a given period (excluding delay).
    ///
    /// A zero-length period never loops, even when the repeat is infinite.
    pub fn total_duration(&self, period: f64) -> f64 {
        if period <= 0.0 {
            return 0.0;
        }
        match self.repeat {
            Repeat::Infinite => f64::INFINITY,
            Repeat::Count(n) => period * (n as f64 + 1.0),
        }
    }

    /// Locate `time` (measured from the end of the delay)
    pub fn locate(&self, time: f64, period: f64) -> Cycle {
        let time = time.max(0.0);

        if period <= 0.0 {
            return Cycle {
                iteration: 0,
                local: 0.0,
                reversed: false,
                finished: true,
            };
        }

        // An endless child makes the period itself endless
        if period.is_infinite() {
            return Cycle {
                iteration: 0,
                local: time,
                reversed: false,
                finished: false,
            };
        }

        let total = self.total_duration(period);
        if time >= total {
            let last = match self.repeat {
                Repeat::Count(n) => n,
                Repeat::Infinite => 0,
            };
            return Cycle {
                iteration: last,
                local: period,
                reversed: self.yoyo && last % 2 == 1,
                finished: true,
            };
        }

        let iteration = (time / period).floor();
        let local = time - iteration * period;
        let iteration = iteration.min(u32::MAX as f64) as u32;
        Cycle {
            iteration,
            local,
            reversed: self.yoyo && iteration % 2 == 1,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration() {
        assert_eq!(RepeatPolicy::ONCE.total_duration(2.0), 2.0);
        assert_eq!(
            RepeatPolicy::new(Repeat::Count(2), false).total_duration(1.5),
            4.5
        );
        assert!(RepeatPolicy::new(Repeat::Infinite, true)
            .total_duration(1.0)
            .is_infinite());
        assert_eq!(
            RepeatPolicy::new(Repeat::Infinite, false).total_duration(0.0),
            0.0
        );
    }

    #[test]
    fn test_yoyo_alternates_direction() {
        let policy = RepeatPolicy::new(Repeat::Infinite, true);
        let first = policy.locate(0.25, 1.0);
        let second = policy.locate(1.25, 1.0);
        assert!(!first.reversed);
        assert!(second.reversed);
        assert!((second.fraction(1.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_yoyo_odd_repeat_finishes_at_start() {
        let policy = RepeatPolicy::new(Repeat::Count(1), true);
        let cycle = policy.locate(5.0, 0.1);
        assert!(cycle.finished);
        assert_eq!(cycle.fraction(0.1), 0.0);
    }

    #[test]
    fn test_finished_fraction_is_exactly_one() {
        let cycle = RepeatPolicy::ONCE.locate(2.6, 2.5);
        assert!(cycle.finished);
        assert_eq!(cycle.fraction(2.5), 1.0);
    }

    #[test]
    fn test_parse_repeat() {
        assert_eq!("infinite".parse::<Repeat>(), Ok(Repeat::Infinite));
        assert_eq!("-1".parse::<Repeat>(), Ok(Repeat::Infinite));
        assert_eq!("3".parse::<Repeat>(), Ok(Repeat::Count(3)));
        assert!("-2".parse::<Repeat>().is_err());
        assert!("often".parse::<Repeat>().is_err());
    }
}
