//! Parametric grids over two or three parameters
//!
//! A grid samples `f(u, v, w)` at every combination of per-axis samples.
//! With two parameters each grid square is a quad face; with three, each
//! grid box is a hexahedron bounded by six quads. Elements become cells,
//! optionally merged along an axis by [`CellGrouping`].

use std::collections::HashMap;

use anakata_math::Vec4;
use serde::{Serialize, Deserialize};

use crate::polytope::{Cell, Face, Polytope};

/// How one parameter axis is sampled
///
/// `resolution` splits `[min, max]` into that many steps. With `inclusive`
/// the last sample lands exactly on `max`; without it sampling stops one
/// step short. With `wrap` (written `loop` in config files) the last sample
/// is joined back to the first, which closes tori and spheres; `max` itself
/// is then never sampled since it coincides with `min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSampling {
    pub min: f32,
    pub max: f32,
    pub resolution: u32,
    pub inclusive: bool,
    #[serde(rename = "loop")]
    pub wrap: bool,
}

impl Default for AxisSampling {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            resolution: 8,
            inclusive: true,
            wrap: false,
        }
    }
}

impl AxisSampling {
    /// An inclusive, open axis
    pub fn new(min: f32, max: f32, resolution: u32) -> Self {
        Self {
            min,
            max,
            resolution,
            inclusive: true,
            wrap: false,
        }
    }

    /// An axis whose last sample connects back to the first
    pub fn looped(min: f32, max: f32, resolution: u32) -> Self {
        Self {
            min,
            max,
            resolution,
            inclusive: false,
            wrap: true,
        }
    }

    /// Builder: set whether the final sample equals `max`
    pub fn with_inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    /// Distance between consecutive samples
    #[inline]
    pub fn step(&self) -> f32 {
        if self.resolution == 0 {
            0.0
        } else {
            (self.max - self.min) / self.resolution as f32
        }
    }

    /// Number of samples taken along this axis
    pub fn sample_count(&self) -> usize {
        let res = self.resolution as usize;
        match (res, self.wrap, self.inclusive) {
            (0, _, _) => 0,
            (_, true, _) => res,
            (_, false, true) => res + 1,
            (_, false, false) => res,
        }
    }

    /// Parameter value of sample `i`
    #[inline]
    pub fn value(&self, i: usize) -> f32 {
        if !self.wrap && self.inclusive && i == self.resolution as usize {
            self.max
        } else {
            self.min + i as f32 * self.step()
        }
    }

    /// Number of grid elements spanned along this axis
    pub fn span_count(&self) -> usize {
        let n = self.sample_count();
        if self.wrap && n >= 3 {
            n
        } else {
            n.saturating_sub(1)
        }
    }

    /// Index of the sample after `i`, wrapping on looped axes
    #[inline]
    fn next(&self, i: usize) -> usize {
        let n = self.sample_count();
        if self.wrap { (i + 1) % n } else { i + 1 }
    }
}

/// Which axes merge neighboring elements into a single cell
///
/// With nothing set each element is its own cell. Grouping `u` puts every
/// element that differs only in its u index into the same cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellGrouping {
    pub u: bool,
    pub v: bool,
    pub w: bool,
}

impl CellGrouping {
    pub const NONE: Self = Self { u: false, v: false, w: false };
    pub const ALL: Self = Self { u: true, v: true, w: true };

    #[inline]
    fn key(&self, i: usize, j: usize, k: usize) -> (usize, usize, usize) {
        (
            if self.u { 0 } else { i },
            if self.v { 0 } else { j },
            if self.w { 0 } else { k },
        )
    }
}

/// A parametric hypersurface sampled on a grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParametricGrid {
    pub u: AxisSampling,
    pub v: AxisSampling,
    /// Third parameter; `None` makes a 2-parameter surface
    pub w: Option<AxisSampling>,
    pub group: CellGrouping,
}

impl ParametricGrid {
    /// A 2-parameter grid with one cell per quad
    pub fn surface(u: AxisSampling, v: AxisSampling) -> Self {
        Self {
            u,
            v,
            w: None,
            group: CellGrouping::NONE,
        }
    }

    /// A 3-parameter grid with one cell per hexahedron
    pub fn volume(u: AxisSampling, v: AxisSampling, w: AxisSampling) -> Self {
        Self {
            u,
            v,
            w: Some(w),
            group: CellGrouping::NONE,
        }
    }

    /// Builder: set cell grouping
    pub fn grouped(mut self, group: CellGrouping) -> Self {
        self.group = group;
        self
    }

    /// Sample `f` on the grid and build the polytope
    ///
    /// An axis with zero resolution yields an empty polytope.
    pub fn generate<F>(&self, name: &str, f: F) -> Polytope
    where
        F: Fn(f32, f32, f32) -> Vec4,
    {
        let axes = [Some(self.u), Some(self.v), self.w];
        if axes.iter().flatten().any(|a| a.resolution == 0) {
            log::warn!("Grid for '{}' has a zero-resolution axis; generating empty geometry", name);
            return Polytope::empty(name);
        }

        let w_axis = self.w.unwrap_or(AxisSampling {
            min: 0.0,
            max: 0.0,
            resolution: 1,
            inclusive: false,
            wrap: false,
        });
        let (nu, nv, nw) = (self.u.sample_count(), self.v.sample_count(), w_axis.sample_count());

        let mut vertices = Vec::with_capacity(nu * nv * nw);
        for i in 0..nu {
            for j in 0..nv {
                for k in 0..nw {
                    vertices.push(f(self.u.value(i), self.v.value(j), w_axis.value(k)));
                }
            }
        }

        let index = |i: usize, j: usize, k: usize| (i * nv + j) * nw + k;
        let mut builder = CellBuilder::default();

        match self.w {
            None => {
                for i in 0..self.u.span_count() {
                    let i1 = self.u.next(i);
                    for j in 0..self.v.span_count() {
                        let j1 = self.v.next(j);
                        let quad = [index(i, j, 0), index(i1, j, 0), index(i1, j1, 0), index(i, j1, 0)];
                        builder.push(self.group.key(i, j, 0), quad);
                    }
                }
            }
            Some(w) => {
                for i in 0..self.u.span_count() {
                    let i1 = self.u.next(i);
                    for j in 0..self.v.span_count() {
                        let j1 = self.v.next(j);
                        for k in 0..w.span_count() {
                            let k1 = w.next(k);
                            let c = |a: usize, b: usize, d: usize| index(a, b, d);
                            let key = self.group.key(i, j, k);
                            builder.push(key, [c(i, j, k), c(i, j1, k), c(i, j1, k1), c(i, j, k1)]);
                            builder.push(key, [c(i1, j, k), c(i1, j, k1), c(i1, j1, k1), c(i1, j1, k)]);
                            builder.push(key, [c(i, j, k), c(i, j, k1), c(i1, j, k1), c(i1, j, k)]);
                            builder.push(key, [c(i, j1, k), c(i1, j1, k), c(i1, j1, k1), c(i, j1, k1)]);
                            builder.push(key, [c(i, j, k), c(i1, j, k), c(i1, j1, k), c(i, j1, k)]);
                            builder.push(key, [c(i, j, k1), c(i, j1, k1), c(i1, j1, k1), c(i1, j, k1)]);
                        }
                    }
                }
            }
        }

        let (faces, cells) = builder.finish(self.w.is_some());
        Polytope::from_parts(name, vertices, faces, cells)
    }
}

type CellKey = (usize, usize, usize);

/// Collects quads per cell, then drops interior faces and shares the rest
#[derive(Default)]
struct CellBuilder {
    order: Vec<CellKey>,
    quads: HashMap<CellKey, Vec<[usize; 4]>>,
}

impl CellBuilder {
    fn push(&mut self, key: CellKey, quad: [usize; 4]) {
        let quads = self.quads.entry(key).or_insert_with(|| {
            self.order.push(key);
            Vec::new()
        });
        quads.push(quad);
    }

    fn finish(mut self, volumetric: bool) -> (Vec<Face>, Vec<Cell>) {
        let mut faces = Vec::new();
        let mut face_index: HashMap<[usize; 4], usize> = HashMap::new();
        let mut cells = Vec::with_capacity(self.order.len());

        for key in &self.order {
            let quads = self.quads.remove(key).unwrap_or_default();
            let sorted = |q: &[usize; 4]| {
                let mut s = *q;
                s.sort_unstable();
                s
            };

            // A face seen twice inside one grouped cell separates two of its
            // own elements and is not part of the cell boundary
            let mut counts: HashMap<[usize; 4], usize> = HashMap::new();
            if volumetric {
                for q in &quads {
                    *counts.entry(sorted(q)).or_default() += 1;
                }
            }

            let mut cell_faces = Vec::new();
            for quad in quads {
                let id = sorted(&quad);
                if volumetric && counts.get(&id).copied().unwrap_or(0) > 1 {
                    continue;
                }
                let index = *face_index.entry(id).or_insert_with(|| {
                    faces.push(Face::new(quad.to_vec()));
                    faces.len() - 1
                });
                if !cell_faces.contains(&index) {
                    cell_faces.push(index);
                }
            }
            cells.push(Cell::new(cell_faces));
        }
        (faces, cells)
    }
}
