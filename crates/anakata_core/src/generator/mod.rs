//! Procedural polytope generators

mod angular;
mod grid;

pub use angular::{angular_polytope, three_sphere, three_torus};
pub use grid::{AxisSampling, CellGrouping, ParametricGrid};

use std::f32::consts::TAU;

use anakata_math::Vec4;

use crate::polytope::Polytope;

/// The Clifford-style flat torus: two circles of radius `r1` and `r2`
///
/// Each angle is sampled `2 * resolution` times around a full turn and
/// both axes loop, so the surface closes on itself. All quads form a
/// single cell.
pub fn flat_torus(r1: f32, r2: f32, resolution: u32) -> Polytope {
    let axis = AxisSampling::looped(0.0, TAU, 2 * resolution);
    ParametricGrid::surface(axis, axis)
        .grouped(CellGrouping::ALL)
        .generate("flat torus", |u, v, _| {
            let (su, cu) = u.sin_cos();
            let (sv, cv) = v.sin_cos();
            Vec4::new(r1 * cu, r1 * su, r2 * cv, r2 * sv)
        })
}
