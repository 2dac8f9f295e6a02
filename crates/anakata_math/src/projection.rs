//! Mapping rotated 4D points into 3D
//!
//! The projection is perspective-like along w only: after rotation, a point
//! is scaled by `1 / zoom` with `zoom = 1 + (w * fov) / camera_w`. Points
//! further along +w shrink, points toward -w grow.

use std::f32::consts::FRAC_PI_2;

use serde::{Serialize, Deserialize};

use crate::{PlaneRotations, RotationState, Vec3, Vec4};

/// Smallest magnitude allowed for the zoom denominator and the camera distance
pub const ZOOM_EPSILON: f32 = 1e-6;

/// Replace a near-zero value with `ZOOM_EPSILON`, keeping its sign
#[inline]
fn clamp_away_from_zero(value: f32) -> f32 {
    if value.abs() < ZOOM_EPSILON {
        ZOOM_EPSILON.copysign(value)
    } else {
        value
    }
}

/// Camera parameters along the fourth axis
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Field of view along w, in radians
    pub fov: f32,
    /// Camera distance along w
    pub w: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_2,
            w: 10.0,
        }
    }
}

impl ProjectionConfig {
    /// Create a projection config
    pub fn new(fov: f32, w: f32) -> Self {
        Self { fov, w }
    }

    /// The zoom divisor for a (rotated) w coordinate
    ///
    /// Never returns a value closer to zero than [`ZOOM_EPSILON`]; a
    /// degenerate projection is recovered here rather than reported.
    #[inline]
    pub fn zoom(&self, w_coord: f32) -> f32 {
        let camera = clamp_away_from_zero(self.w);
        clamp_away_from_zero(1.0 + (w_coord * self.fov) / camera)
    }

    /// Divide the xyz part of an already rotated point by its zoom
    #[inline]
    pub fn perspective(&self, rotated: Vec4) -> Vec3 {
        let zoom = self.zoom(rotated.w);
        Vec3::new(rotated.x / zoom, rotated.y / zoom, rotated.z / zoom)
    }
}

/// Rotates and projects points for one frame
///
/// Built once per derivation from the current [`RotationState`]; the six
/// (cos, sin) pairs are shared by every point projected with it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projector {
    rotations: PlaneRotations,
    config: ProjectionConfig,
}

impl Projector {
    /// Create a projector for the given rotation and camera
    pub fn new(state: &RotationState, config: ProjectionConfig) -> Self {
        Self {
            rotations: state.rotations(),
            config,
        }
    }

    /// A projector that does not rotate
    pub fn unrotated(config: ProjectionConfig) -> Self {
        Self {
            rotations: PlaneRotations::IDENTITY,
            config,
        }
    }

    #[inline]
    pub fn rotations(&self) -> &PlaneRotations {
        &self.rotations
    }

    #[inline]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Apply the frame's rotation only
    #[inline]
    pub fn rotate(&self, p: Vec4) -> Vec4 {
        self.rotations.apply(p)
    }

    /// Rotate then project a 4D point into 3D
    #[inline]
    pub fn project(&self, p: Vec4) -> Vec3 {
        self.config.perspective(self.rotations.apply(p))
    }
}

/// Rotate and project a single point without caching
///
/// Equivalent to `Projector::new(state, ProjectionConfig::new(fov, w)).project(point)`.
pub fn project(state: &RotationState, point: Vec4, fov: f32, w: f32) -> Vec3 {
    ProjectionConfig::new(fov, w).perspective(state.rotate_point(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlaneAngles, RotationPlane};
    use std::f32::consts::TAU;
    use proptest::prelude::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_w_zero_is_orthographic() {
        let config = ProjectionConfig::new(1.5, 5.0);
        let p = config.perspective(Vec4::new(1.0, -2.0, 3.0, 0.0));
        assert_eq!(p, Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_zoom_formula() {
        // zoom = 1 + (1 * 1.5) / 5 = 1.3
        let p = project(&RotationState::new(), Vec4::new(1.3, 2.6, 0.0, 1.0), 1.5, 5.0);
        assert!(p.approx_eq(Vec3::new(1.0, 2.0, 0.0), EPSILON), "got {:?}", p);
    }

    #[test]
    fn test_degenerate_zoom_is_clamped() {
        // 1 + (-2 * 1) / 2 = 0
        let config = ProjectionConfig::new(1.0, 2.0);
        let zoom = config.zoom(-2.0);
        assert_eq!(zoom, ZOOM_EPSILON);
        let p = config.perspective(Vec4::new(1.0, 1.0, 1.0, -2.0));
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
    }

    #[test]
    fn test_zero_camera_distance_is_clamped() {
        let config = ProjectionConfig::new(1.0, 0.0);
        let p = config.perspective(Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert!(p.x.is_finite());
    }

    #[test]
    fn test_projector_matches_free_function() {
        let state = RotationState::from_angles(PlaneAngles {
            xy: 0.1, xz: 0.2, xw: 0.3, yz: 0.4, yw: 0.5, zw: 0.6,
        });
        let config = ProjectionConfig::new(1.5, 5.0);
        let projector = Projector::new(&state, config);
        let v = Vec4::new(0.7, -1.0, 0.25, 0.9);
        assert_eq!(projector.project(v), project(&state, v, config.fov, config.w));
    }

    #[test]
    fn test_unrotated_projector() {
        let projector = Projector::unrotated(ProjectionConfig::default());
        let v = Vec4::new(1.0, 2.0, 3.0, 0.0);
        assert_eq!(projector.rotate(v), v);
        assert_eq!(projector.project(v), v.xyz());
    }

    proptest! {
        #[test]
        fn prop_zero_delta_leaves_projection_unchanged(
            x in -5.0f32..5.0, y in -5.0f32..5.0, z in -5.0f32..5.0, w in -2.0f32..2.0,
            a in 0.0f32..TAU, b in 0.0f32..TAU, elapsed in 0.0f32..1000.0,
        ) {
            let mut state = RotationState::from_angles(PlaneAngles { xw: a, yz: b, ..PlaneAngles::ZERO });
            let v = Vec4::new(x, y, z, w);
            let before = project(&state, v, 1.5, 5.0);
            state.rotate(&PlaneAngles::ZERO, elapsed);
            let after = project(&state, v, 1.5, 5.0);
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_full_cycle_returns_to_start(
            x in -2.0f32..2.0, y in -2.0f32..2.0, z in -2.0f32..2.0, w in -2.0f32..2.0,
            steps in 1u32..8,
        ) {
            let mut state = RotationState::from_angles(PlaneAngles { xy: 0.3, zw: 1.2, ..PlaneAngles::ZERO });
            let v = Vec4::new(x, y, z, w);
            let before = project(&state, v, 1.0, 10.0);
            // Each plane turns by a whole multiple of 2π over `steps` frames
            let mut delta = PlaneAngles::ZERO;
            for (i, plane) in RotationPlane::ALL.into_iter().enumerate() {
                delta[plane] = TAU * (i as f32 + 1.0) / (steps as f32 * 100.0);
            }
            for _ in 0..steps {
                state.rotate(&delta, 100.0);
            }
            let after = project(&state, v, 1.0, 10.0);
            prop_assert!(before.approx_eq(after, 1e-3), "{:?} vs {:?}", before, after);
        }
    }
}
