//! 4D Mathematics Library
//!
//! This crate provides the numeric kernel of Anakata: points in 4-space,
//! rotations in the six coordinate planes, and the perspective-like mapping
//! of rotated 4D points into 3D.
//!
//! ## Core Types
//!
//! - [`Vec4`] - 4D point with x, y, z, w components
//! - [`Vec3`] - 3D point produced by projection
//! - [`RotationPlane`] - One of the six coordinate planes (xy, xz, xw, yz, yw, zw)
//! - [`RotationState`] - Six plane angles, advanced once per frame
//! - [`PlaneRotations`] - Cached (cos, sin) pairs for one frame
//!
//! ## Projection
//!
//! - [`ProjectionConfig`] - Camera distance and field of view along w
//! - [`Projector`] - Rotates then divides by the w-dependent zoom

mod vec4;
mod vec3;
pub mod rotation;
pub mod projection;

pub use vec4::Vec4;
pub use vec3::Vec3;
pub use rotation::{PlaneAngles, PlaneRotations, RotationPlane, RotationState};
pub use projection::{project, ProjectionConfig, Projector, ZOOM_EPSILON};
