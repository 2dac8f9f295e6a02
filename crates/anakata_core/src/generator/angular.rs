//! Hyperspherical-coordinate generators: the 3-sphere and the 3-torus
//!
//! Vertices are sampled over three angles: theta and phi in `[0, π]`
//! (inclusive) and gamma in `[0, 2π)` (looped), each at `π / resolution`
//! steps. Every vertex is classified by the theta, phi and gamma sample it
//! came from. Each class is then walked as a stack of rings, and quads
//! between consecutive rings form one cell per class. This yields three
//! families of cells, one per angle.

use std::f32::consts::PI;

use anakata_math::Vec4;

use crate::polytope::{Cell, Face, Polytope};

/// Sample an angular parametrization and build its cells
///
/// `f(theta, phi, gamma)` maps the three angles to a point.
pub fn angular_polytope<F>(name: &str, resolution: u32, f: F) -> Polytope
where
    F: Fn(f32, f32, f32) -> Vec4,
{
    if resolution == 0 {
        log::warn!("Angular generator '{}' called with zero resolution; generating empty geometry", name);
        return Polytope::empty(name);
    }
    let r = resolution as usize;
    let (nt, np, ng) = (r + 1, r + 1, 2 * r);
    let step = PI / resolution as f32;
    let index = |t: usize, p: usize, g: usize| (t * np + p) * ng + g;

    let mut vertices = Vec::with_capacity(nt * np * ng);
    for t in 0..nt {
        for p in 0..np {
            for g in 0..ng {
                vertices.push(f(t as f32 * step, p as f32 * step, g as f32 * step));
            }
        }
    }

    let mut faces = Vec::new();
    let mut cells = Vec::new();

    // theta classes: rings run over gamma, stacked along phi
    for t in 0..nt {
        let rings: Vec<Vec<usize>> = (0..np)
            .map(|p| (0..ng).map(|g| index(t, p, g)).collect())
            .collect();
        cells.push(connect_rings(&rings, &mut faces));
    }

    // phi classes: rings run over gamma, stacked along theta
    for p in 0..np {
        let rings: Vec<Vec<usize>> = (0..nt)
            .map(|t| (0..ng).map(|g| index(t, p, g)).collect())
            .collect();
        cells.push(connect_rings(&rings, &mut faces));
    }

    // gamma classes: gamma g and its opposite g + r together form a great
    // half-circle pair over phi; rings are stacked along theta
    for g in 0..r {
        let rings: Vec<Vec<usize>> = (0..nt)
            .map(|t| {
                (0..np)
                    .map(|p| index(t, p, g))
                    .chain((0..np).rev().map(|p| index(t, p, g + r)))
                    .collect()
            })
            .collect();
        cells.push(connect_rings(&rings, &mut faces));
    }

    Polytope::from_parts(name, vertices, faces, cells)
}

/// Join each ring to the next with quads, wrapping within a ring
fn connect_rings(rings: &[Vec<usize>], faces: &mut Vec<Face>) -> Cell {
    let mut cell = Vec::new();
    for pair in rings.windows(2) {
        let (ring, next) = (&pair[0], &pair[1]);
        let n = ring.len();
        for i in 0..n {
            let i1 = (i + 1) % n;
            cell.push(faces.len());
            faces.push(Face::new(vec![ring[i], ring[i1], next[i1], next[i]]));
        }
    }
    Cell::new(cell)
}

/// A 3-sphere of the given radius
pub fn three_sphere(radius: f32, resolution: u32) -> Polytope {
    angular_polytope("3-sphere", resolution, |theta, phi, gamma| {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let (sg, cg) = gamma.sin_cos();
        Vec4::new(
            radius * ct,
            radius * st * cp,
            radius * st * sp * cg,
            radius * st * sp * sg,
        )
    })
}

/// A 3-torus: a circle of radius `r1` swept around `r2`, then around `r3`
pub fn three_torus(r1: f32, r2: f32, r3: f32, resolution: u32) -> Polytope {
    angular_polytope("3-torus", resolution, |theta, phi, gamma| {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let (sg, cg) = gamma.sin_cos();
        let inner = r2 + r1 * st;
        let outer = r3 + inner * sp;
        Vec4::new(r1 * ct, inner * cp, outer * cg, outer * sg)
    })
}
