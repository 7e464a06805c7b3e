//! Rotatable spherical Mercator projection.
//!
//! Longitudes are rotated by `yaw` degrees before projecting, then scaled by
//! `scale` (pixels per radian) and offset by `translate` (the screen position
//! of the rotated origin). Screen y grows downward.

use std::f64::consts::FRAC_PI_4;

use super::geodesy::wrap_longitude_rad;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mercator {
    /// Rotation around the polar axis, degrees.
    pub yaw: f64,
    /// Pixels per radian.
    pub scale: f64,
    pub translate: [f64; 2],
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            scale: 1.0,
            translate: [0.0, 0.0],
        }
    }
}

impl Mercator {
    pub fn new(yaw: f64, scale: f64, translate: [f64; 2]) -> Self {
        Self {
            yaw,
            scale,
            translate,
        }
    }

    /// Project `(longitude, latitude)` in degrees without any domain check.
    ///
    /// Latitudes at the poles produce infinite y; NaN inputs propagate.
    pub fn project_unchecked(&self, longitude: f64, latitude: f64) -> [f64; 2] {
        let lambda = wrap_longitude_rad((longitude + self.yaw).to_radians());
        let phi = latitude.to_radians();
        let y = (FRAC_PI_4 + phi / 2.0).tan().ln();
        [
            self.translate[0] + lambda * self.scale,
            self.translate[1] - y * self.scale,
        ]
    }

    /// Project `(longitude, latitude)` in degrees, or `None` when the point
    /// lies outside the open latitude interval (-90, 90) or the result is not
    /// a finite screen position.
    pub fn project(&self, longitude: f64, latitude: f64) -> Option<[f64; 2]> {
        // tan(pi/2) is finite in f64, so the north pole must be rejected here.
        if !(latitude > -90.0 && latitude < 90.0) {
            return None;
        }
        let [x, y] = self.project_unchecked(longitude, latitude);
        (x.is_finite() && y.is_finite()).then_some([x, y])
    }

    /// Screen position back to `(longitude, latitude)` in degrees.
    pub fn invert(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        if self.scale == 0.0 {
            return None;
        }
        let lambda = (x - self.translate[0]) / self.scale;
        let my = (self.translate[1] - y) / self.scale;
        let phi = 2.0 * my.exp().atan() - std::f64::consts::FRAC_PI_2;
        let lon = wrap_longitude_rad(lambda - self.yaw.to_radians()).to_degrees();
        let lat = phi.to_degrees();
        (lon.is_finite() && lat.is_finite()).then_some([lon, lat])
    }
}

#[cfg(test)]
mod tests {
    use super::Mercator;
    use std::f64::consts::PI;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_projects_to_translate() {
        let m = Mercator::new(0.0, 100.0, [300.0, 200.0]);
        let [x, y] = m.project(0.0, 0.0).expect("finite");
        assert_close(x, 300.0, 1e-9);
        assert_close(y, 200.0, 1e-9);
    }

    #[test]
    fn yaw_shifts_longitudes() {
        let m = Mercator::new(90.0, 1.0, [0.0, 0.0]);
        let [x, _] = m.project(0.0, 0.0).expect("finite");
        assert_close(x, PI / 2.0, 1e-12);

        // 170 + 90 wraps around the antimeridian.
        let [x, _] = m.project(170.0, 0.0).expect("finite");
        assert_close(x, -100f64.to_radians(), 1e-12);
    }

    #[test]
    fn north_is_up() {
        let m = Mercator::new(0.0, 10.0, [0.0, 0.0]);
        let [_, y] = m.project(0.0, 45.0).expect("finite");
        assert!(y < 0.0);
    }

    #[test]
    fn poles_are_outside_the_domain() {
        let m = Mercator::new(0.0, 10.0, [0.0, 0.0]);
        assert!(m.project(0.0, 90.0).is_none());
        assert!(m.project(0.0, -90.0).is_none());
        assert!(m.project(f64::NAN, 0.0).is_none());
        assert!(m.project(0.0, f64::NAN).is_none());
        assert!(m.project(0.0, 90.5).is_none());
    }

    #[test]
    fn near_pole_latitudes_still_project() {
        let m = Mercator::new(0.0, 10.0, [0.0, 0.0]);
        let [_, north] = m.project(0.0, 89.999).expect("finite");
        let [_, south] = m.project(0.0, -89.999).expect("finite");
        assert!(north < 0.0 && south > 0.0);
    }

    #[test]
    fn invert_round_trips() {
        let m = Mercator::new(60.0, 95.0, [300.0, 200.0]);
        let [x, y] = m.project(-96.8, 32.78).expect("finite");
        let [lon, lat] = m.invert(x, y).expect("finite");
        assert_close(lon, -96.8, 1e-9);
        assert_close(lat, 32.78, 1e-9);
    }
}
