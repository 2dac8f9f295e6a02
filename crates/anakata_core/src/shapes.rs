//! Serializable shape templates
//!
//! ShapeTemplate is the closed registry of every shape the viewer can
//! build. Each variant stores its construction parameters, so a template
//! can live in a config or RON file and be turned into a [`Polytope`] on
//! demand. Code that consumes polytopes only sees [`PolytopeProvider`].

use std::f32::consts::TAU;

use serde::{Serialize, Deserialize};

use crate::error::GeometryError;
use crate::expr::{Formula4, FormulaText};
use crate::generator::{self, AxisSampling, CellGrouping, ParametricGrid};
use crate::polytope::{Polytope, PolytopeDescription, PolytopeProvider};
use crate::regular;

fn default_u() -> AxisSampling {
    AxisSampling::looped(0.0, TAU, 16)
}

fn default_v() -> AxisSampling {
    AxisSampling::looped(0.0, TAU, 16)
}

/// Serializable shape template
///
/// Variants are tagged by `type`, e.g. `(type: "Tesseract", size: 2.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeTemplate {
    /// 4D hypercube with full edge length `size`
    Tesseract { size: f32 },
    /// 5-cell
    Pentachoron { scale: f32 },
    /// 16-cell
    Hexadecachoron { scale: f32 },
    /// 3-sphere sampled at `π / resolution` steps
    ThreeSphere { radius: f32, resolution: u32 },
    /// 3-torus with nested radii
    ThreeTorus {
        r1: f32,
        r2: f32,
        r3: f32,
        resolution: u32,
    },
    /// Flat torus, a product of two circles
    FlatTorus { r1: f32, r2: f32, resolution: u32 },
    /// A hypersurface given by four coordinate formulas over `u`, `v`, `w`
    Formula {
        expressions: FormulaText,
        #[serde(default = "default_u")]
        u: AxisSampling,
        #[serde(default = "default_v")]
        v: AxisSampling,
        /// Third parameter for volumetric cells
        #[serde(default)]
        w: Option<AxisSampling>,
        #[serde(default)]
        group: CellGrouping,
    },
    /// Literal vertex/face/cell tables
    Custom { description: PolytopeDescription },
}

impl Default for ShapeTemplate {
    fn default() -> Self {
        ShapeTemplate::tesseract(2.0)
    }
}

impl ShapeTemplate {
    /// Create a tesseract template
    pub fn tesseract(size: f32) -> Self {
        ShapeTemplate::Tesseract { size }
    }

    /// Create a 3-sphere template
    pub fn three_sphere(radius: f32, resolution: u32) -> Self {
        ShapeTemplate::ThreeSphere { radius, resolution }
    }

    /// Create a formula surface over looped `u` and `v` axes
    pub fn formula(expressions: FormulaText) -> Self {
        ShapeTemplate::Formula {
            expressions,
            u: default_u(),
            v: default_v(),
            w: None,
            group: CellGrouping::NONE,
        }
    }

    /// Short human-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeTemplate::Tesseract { .. } => "tesseract",
            ShapeTemplate::Pentachoron { .. } => "pentachoron",
            ShapeTemplate::Hexadecachoron { .. } => "hexadecachoron",
            ShapeTemplate::ThreeSphere { .. } => "3-sphere",
            ShapeTemplate::ThreeTorus { .. } => "3-torus",
            ShapeTemplate::FlatTorus { .. } => "flat torus",
            ShapeTemplate::Formula { .. } => "formula",
            ShapeTemplate::Custom { .. } => "custom",
        }
    }
}

impl PolytopeProvider for ShapeTemplate {
    fn build(&self) -> Result<Polytope, GeometryError> {
        match self {
            ShapeTemplate::Tesseract { size } => regular::tesseract(*size),
            ShapeTemplate::Pentachoron { scale } => regular::pentachoron(*scale),
            ShapeTemplate::Hexadecachoron { scale } => regular::hexadecachoron(*scale),
            ShapeTemplate::ThreeSphere { radius, resolution } => {
                Ok(generator::three_sphere(*radius, *resolution))
            }
            ShapeTemplate::ThreeTorus { r1, r2, r3, resolution } => {
                Ok(generator::three_torus(*r1, *r2, *r3, *resolution))
            }
            ShapeTemplate::FlatTorus { r1, r2, resolution } => {
                Ok(generator::flat_torus(*r1, *r2, *resolution))
            }
            ShapeTemplate::Formula { expressions, u, v, w, group } => {
                let formula = Formula4::parse(expressions)?;
                let grid = ParametricGrid { u: *u, v: *v, w: *w, group: *group };
                Ok(grid.generate("formula", |u, v, w| formula.eval(u, v, w)))
            }
            ShapeTemplate::Custom { description } => description.to_polytope(),
        }
    }
}
