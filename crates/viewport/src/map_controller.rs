//! Pan/zoom controller for a rotatable Mercator world map.
//!
//! Zoom gestures arrive as absolute `(scale, translate)` pairs, the way
//! gesture recognizers report them. A changed scale zooms; an unchanged
//! scale pans. Horizontal panning rotates the globe under the viewport so
//! the map wraps endlessly, vertical panning translates the map but never
//! past the latitude clamp.

use foundation::{Aabb2, Mercator};
use serde::Serialize;
use tracing::trace;

/// Latitude beyond which the map is not drawn (Mercator diverges at the poles).
pub const MAX_LATITUDE: f64 = 83.0;

/// Yaw applied before the first interaction, degrees.
pub const DEFAULT_YAW: f64 = 60.0;

/// Upper zoom limit relative to the fit-to-width scale.
pub const MAX_ZOOM: f64 = 10.0;

/// Keeps the bounds probes on the near side of the antimeridian seam.
const SEAM_EPSILON: f64 = 1e-6;

/// Which branch an interaction took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    Scale,
    Pan,
}

/// Read-only snapshot for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionState {
    pub rotation_yaw: f64,
    pub scale: f64,
    pub translation: [f64; 2],
    pub scale_extent: [f64; 2],
    pub last_scale: Option<f64>,
    pub last_translation: Option<[f64; 2]>,
}

#[derive(Debug, Clone)]
pub struct ProjectionController {
    width: f64,
    height: f64,
    projection: Mercator,
    scale_extent: [f64; 2],
    last_scale: Option<f64>,
    last_translation: Option<[f64; 2]>,
}

impl ProjectionController {
    /// Fit the whole (latitude-clamped) world to `width`.
    pub fn new(width: f64, height: f64) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let mut controller = Self {
            width,
            height,
            projection: Mercator::new(DEFAULT_YAW, 1.0, [width / 2.0, height / 2.0]),
            scale_extent: [1.0, MAX_ZOOM],
            last_scale: None,
            last_translation: None,
        };

        // Probe at unit scale to find how wide the world is per unit.
        let probe = controller.bounds();
        let scale = width / probe.width();
        controller.scale_extent = [scale, scale * MAX_ZOOM];
        controller.projection.scale = scale;
        controller
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn projection(&self) -> &Mercator {
        &self.projection
    }

    pub fn scale(&self) -> f64 {
        self.projection.scale
    }

    pub fn yaw(&self) -> f64 {
        self.projection.yaw
    }

    pub fn scale_extent(&self) -> [f64; 2] {
        self.scale_extent
    }

    pub fn state(&self) -> ProjectionState {
        ProjectionState {
            rotation_yaw: self.projection.yaw,
            scale: self.projection.scale,
            translation: self.projection.translate,
            scale_extent: self.scale_extent,
            last_scale: self.last_scale,
            last_translation: self.last_translation,
        }
    }

    /// Resize the viewport. The map stays horizontally centred.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.projection.translate[0] = self.width / 2.0;
    }

    /// Screen-space corners of the drawable world: top-left at
    /// (west edge, +83°) and bottom-right at (east edge, -83°).
    pub fn bounds(&self) -> Aabb2 {
        let yaw = self.projection.yaw;
        let min = self
            .projection
            .project_unchecked(-yaw - 180.0 + SEAM_EPSILON, MAX_LATITUDE);
        let max = self
            .projection
            .project_unchecked(-yaw + 180.0 - SEAM_EPSILON, -MAX_LATITUDE);
        Aabb2::new(min, max)
    }

    /// Screen position for a geographic point, `None` outside the valid domain.
    pub fn project(&self, longitude: f64, latitude: f64) -> Option<[f64; 2]> {
        self.projection.project(longitude, latitude)
    }

    pub fn invert(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        self.projection.invert(x, y)
    }

    /// Apply one zoom-gesture update.
    ///
    /// `scale` is clamped to the scale extent first. In pan mode the stored
    /// translation keeps the y component that was actually applied, so drag
    /// deltas stay incremental even while the clamp is engaged.
    pub fn on_zoom(&mut self, scale: f64, translate_x: f64, translate_y: f64) -> ZoomMode {
        let scale = scale.clamp(self.scale_extent[0], self.scale_extent[1]);

        if self.last_scale != Some(scale) {
            // Ignore translation while scaling; pinch gestures report both.
            self.projection.scale = scale;
            self.last_scale = Some(scale);
            self.last_translation = Some([translate_x, translate_y]);
            return ZoomMode::Scale;
        }

        let [last_x, last_y] = self.last_translation.unwrap_or([0.0, 0.0]);
        let dx = translate_x - last_x;
        let mut dy = translate_y - last_y;

        self.projection.yaw += 360.0 * dx / self.width * self.scale_extent[0] / scale;

        let b = self.bounds();
        if b.min[1] + dy > 0.0 {
            trace!(dy, top = b.min[1], "clamping pan at the north edge");
            dy = -b.min[1];
        } else if b.max[1] + dy < self.height {
            trace!(dy, bottom = b.max[1], "clamping pan at the south edge");
            dy = self.height - b.max[1];
        }
        self.projection.translate[1] += dy;

        self.last_scale = Some(scale);
        self.last_translation = Some([translate_x, last_y + dy]);
        ZoomMode::Pan
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_YAW, MAX_ZOOM, ProjectionController, ZoomMode};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn started(width: f64, height: f64) -> ProjectionController {
        let mut c = ProjectionController::new(width, height);
        let s = c.scale();
        assert_eq!(c.on_zoom(s, 0.0, 0.0), ZoomMode::Scale);
        c
    }

    #[test]
    fn initial_scale_fits_world_to_width() {
        let c = ProjectionController::new(600.0, 400.0);
        assert_close(c.scale(), 600.0 / std::f64::consts::TAU, 1e-5);
        assert_close(c.bounds().width(), 600.0, 1e-6);
        assert_eq!(c.scale_extent()[1], c.scale_extent()[0] * MAX_ZOOM);
        assert_eq!(c.yaw(), DEFAULT_YAW);
    }

    #[test]
    fn first_event_is_always_a_zoom() {
        let mut c = ProjectionController::new(600.0, 400.0);
        let yaw = c.yaw();
        assert_eq!(c.on_zoom(c.scale(), 50.0, 20.0), ZoomMode::Scale);
        assert_eq!(c.yaw(), yaw);
        assert_eq!(c.state().last_translation, Some([50.0, 20.0]));
    }

    #[test]
    fn equal_scale_only_pans() {
        let mut c = started(600.0, 400.0);
        let scale = c.scale();
        let yaw = c.yaw();

        assert_eq!(c.on_zoom(scale, 60.0, 0.0), ZoomMode::Pan);
        assert_eq!(c.scale(), scale);
        // A tenth of the width at base zoom is a tenth of a full turn.
        assert_close(c.yaw(), yaw + 36.0, 1e-9);

        assert_eq!(c.on_zoom(scale, 90.0, 0.0), ZoomMode::Pan);
        assert_eq!(c.scale(), scale);
        assert_close(c.yaw(), yaw + 54.0, 1e-9);
    }

    #[test]
    fn pan_sensitivity_falls_with_zoom() {
        let mut c = started(600.0, 400.0);
        let zoomed = c.scale() * 2.0;
        assert_eq!(c.on_zoom(zoomed, 0.0, 0.0), ZoomMode::Scale);
        let yaw = c.yaw();
        c.on_zoom(zoomed, 60.0, 0.0);
        assert_close(c.yaw(), yaw + 18.0, 1e-9);
    }

    #[test]
    fn scale_is_clamped_to_extent() {
        let mut c = started(600.0, 400.0);
        let [min, max] = c.scale_extent();
        c.on_zoom(max * 5.0, 0.0, 0.0);
        assert_eq!(c.scale(), max);
        c.on_zoom(min / 5.0, 0.0, 0.0);
        assert_eq!(c.scale(), min);
    }

    #[test]
    fn top_bound_clamps_at_zero_and_is_idempotent() {
        let mut c = started(600.0, 400.0);
        let scale = c.scale();
        assert!(c.bounds().min[1] < 0.0);

        c.on_zoom(scale, 0.0, 10_000.0);
        assert_close(c.bounds().min[1], 0.0, 1e-9);
        let after_first = c.state();

        c.on_zoom(scale, 0.0, 10_000.0);
        assert_close(c.bounds().min[1], 0.0, 1e-9);
        assert_close(c.state().translation[1], after_first.translation[1], 1e-9);
        assert_eq!(c.scale(), scale);
    }

    #[test]
    fn bottom_bound_clamps_at_height() {
        let mut c = started(600.0, 400.0);
        let scale = c.scale();
        c.on_zoom(scale, 0.0, -10_000.0);
        assert_close(c.bounds().max[1], 400.0, 1e-9);
    }

    #[test]
    fn unclamped_vertical_pan_is_applied_directly() {
        let mut c = started(600.0, 400.0);
        let scale = c.scale();
        let ty = c.state().translation[1];
        c.on_zoom(scale, 0.0, 10.0);
        assert_close(c.state().translation[1], ty + 10.0, 1e-9);
        c.on_zoom(scale, 0.0, 15.0);
        assert_close(c.state().translation[1], ty + 15.0, 1e-9);
    }

    #[test]
    fn poles_are_not_projectable() {
        let c = ProjectionController::new(600.0, 400.0);
        assert!(c.project(0.0, 90.0).is_none());
        let [x, y] = c.project(-DEFAULT_YAW, 0.0).expect("finite");
        assert_close(x, 300.0, 1e-9);
        assert_close(y, 200.0, 1e-9);
    }

    #[test]
    fn resize_recentres_horizontally() {
        let mut c = ProjectionController::new(600.0, 400.0);
        c.set_size(800.0, 500.0);
        assert_eq!(c.state().translation[0], 400.0);
        assert_eq!(c.height(), 500.0);
    }
}
