use serde::{Deserialize, Serialize};

/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time(pub f64); // seconds since the Unix epoch

/// Length of the default timeline window (365 days).
pub const SECONDS_PER_YEAR: f64 = 365.0 * 86_400.0;

impl Time {
    pub fn from_unix(seconds: i64) -> Self {
        Time(seconds as f64)
    }

    pub fn unix(self) -> i64 {
        self.0.round() as i64
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    pub fn forever() -> Self {
        Self {
            start: Time(f64::NEG_INFINITY),
            end: Time(f64::INFINITY),
        }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    /// The year leading up to `end`.
    pub fn trailing_year(end: Time) -> Self {
        Self {
            start: Time(end.0 - SECONDS_PER_YEAR),
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    pub fn contains(&self, t: Time) -> bool {
        t.0 >= self.start.0 && t.0 <= self.end.0
    }

    /// Time at `fraction` of the way through the span; `fraction` is clamped to `[0, 1]`.
    pub fn lerp(&self, fraction: f64) -> Time {
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Time(self.start.0 + (self.end.0 - self.start.0) * f)
    }

    /// Inverse of [`TimeSpan::lerp`]. Zero-length spans map everything to `0.0`.
    pub fn fraction_of(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return 0.0;
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }

    /// Smallest span covering both `self` and `t`.
    pub fn extend(self, t: Time) -> Self {
        Self {
            start: Time(self.start.0.min(t.0)),
            end: Time(self.end.0.max(t.0)),
        }
    }
}
