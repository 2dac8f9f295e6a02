//! The four coordinate axes as line segments
//!
//! Each basis vector, scaled to the axis length, goes through the same
//! rotation and projection as the polytope and is drawn from a fixed 3D
//! origin. Turning the polytope turns the axes with it.

use anakata_math::{Projector, Vec3, Vec4};

use crate::buffer::{BatchSource, Channel, RenderBatch, RenderBuffer};
use crate::color::Palette;

/// Names of the axes in drawing order
pub const AXIS_NAMES: [&str; 4] = ["x", "y", "z", "w"];

/// One segment per axis, from `origin` to the projected axis tip
///
/// The result is a single unindexed edges batch of 8 positions, colored
/// per axis from [`Palette::axes`]. Positions are absolute: the batch is
/// not recentered.
pub fn axes(projector: &Projector, length: f32, origin: Vec3) -> RenderBuffer {
    let palette = Palette::axes();
    let basis = [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W];

    let mut batch = RenderBatch::new(BatchSource::Whole);
    for (axis, unit) in basis.into_iter().enumerate() {
        let tip = origin + projector.project(unit * length);
        batch.positions.extend([origin, tip]);
        batch.colors.extend([palette.get(axis); 2]);
    }

    let mut buffer = RenderBuffer::new(Channel::Edges);
    buffer.batches.push(batch);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use anakata_math::{PlaneAngles, ProjectionConfig, RotationPlane, RotationState};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn tips(buffer: &RenderBuffer) -> Vec<Vec3> {
        buffer.batches[0].positions.iter().skip(1).step_by(2).copied().collect()
    }

    #[test]
    fn test_unrotated_axes() {
        let origin = Vec3::new(0.5, -1.0, 2.0);
        let buffer = axes(&Projector::unrotated(ProjectionConfig::default()), 2.0, origin);
        assert_eq!(buffer.channel, Channel::Edges);
        assert_eq!(buffer.batches.len(), 1);

        let batch = &buffer.batches[0];
        assert_eq!(batch.vertex_count(), 8);
        assert!(batch.indices.is_none());
        assert!(batch.positions.iter().step_by(2).all(|&p| p == origin));

        let tips = tips(&buffer);
        assert!(tips[0].approx_eq(origin + Vec3::new(2.0, 0.0, 0.0), EPSILON));
        assert!(tips[1].approx_eq(origin + Vec3::new(0.0, 2.0, 0.0), EPSILON));
        assert!(tips[2].approx_eq(origin + Vec3::new(0.0, 0.0, 2.0), EPSILON));
        // w has no 3D extent before rotation
        assert!(tips[3].approx_eq(origin, EPSILON));
    }

    #[test]
    fn test_axis_colors() {
        let buffer = axes(&Projector::default(), 1.0, Vec3::ZERO);
        let palette = Palette::axes();
        for (axis, pair) in buffer.batches[0].colors.chunks(2).enumerate() {
            assert_eq!(pair, [palette.get(axis); 2], "axis {}", AXIS_NAMES[axis]);
        }
    }

    #[test]
    fn test_quarter_turn_swaps_x_and_w() {
        let state = RotationState::from_angles(PlaneAngles::single(RotationPlane::XW, FRAC_PI_2));
        let config = ProjectionConfig::default();
        let turned = tips(&axes(&Projector::new(&state, config), 2.0, Vec3::ZERO));
        let still = tips(&axes(&Projector::unrotated(config), 2.0, Vec3::ZERO));

        // x now points along w and projects where w did
        assert!(turned[0].approx_eq(still[3], EPSILON), "x tip {:?}", turned[0]);
        // w now lies along x, at full length since its own w is zero
        assert!((turned[3].x.abs() - 2.0).abs() < EPSILON);
        assert!(turned[3].y.abs() < EPSILON && turned[3].z.abs() < EPSILON);
        // y and z are untouched
        assert!(turned[1].approx_eq(still[1], EPSILON));
        assert!(turned[2].approx_eq(still[2], EPSILON));
    }
}
