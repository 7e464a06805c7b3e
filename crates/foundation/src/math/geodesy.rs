use serde::{Deserialize, Serialize};

/// Geographic position in degrees (WGS84 latitude/longitude).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and within the usual degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Wrap an angle in radians into `[-PI, PI)`.
pub fn wrap_longitude_rad(lambda: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (lambda + PI).rem_euclid(TAU) - PI
}
