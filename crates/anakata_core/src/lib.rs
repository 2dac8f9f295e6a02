//! Polytope model for the Anakata engine
//!
//! This crate describes 4D solids as combinatorial complexes:
//!
//! - [`Polytope`] - Immutable vertices, faces and cells with validated indices
//! - [`PolytopeDescription`] - Raw tables, loadable from RON
//! - [`PolytopeProvider`] - Anything that builds a polytope
//! - [`ShapeTemplate`] - Serializable registry of every built-in shape
//! - [`ParametricGrid`] / [`AxisSampling`] - Grid generators for hypersurfaces
//! - [`Expr`] - Safe formula expressions for user-defined surfaces

mod error;
mod expr;
pub mod generator;
mod polytope;
pub mod regular;
mod shapes;

pub use error::{GeometryError, ShapeDefect, ShapeLoadError};
pub use expr::{BinOp, Expr, ExpressionError, ExpressionErrorKind, Formula4, FormulaText, Func, Variable};
pub use generator::{AxisSampling, CellGrouping, ParametricGrid};
pub use polytope::{Cell, Face, Polytope, PolytopeDescription, PolytopeProvider};
pub use shapes::ShapeTemplate;

// Re-export commonly used types from anakata_math for convenience
pub use anakata_math::{Vec3, Vec4};
