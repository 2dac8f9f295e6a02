//! 4D Rendering Library
//!
//! This crate turns polytopes into renderer-ready buffers. It owns no
//! window or GPU state; the host uploads the byte views of each batch.
//!
//! ## Key Components
//!
//! - [`Tessellator`] - Plans topology once, re-projects positions per frame
//! - [`RenderBuffer`] / [`RenderBatch`] - Positions, indices and colors per draw batch
//! - [`ColorAssigner`] - Palette lookup by cell, face, depth or w
//! - [`CrossSectioner`] - Per-cell polygons where a w hyperplane cuts the polytope
//! - [`WSlice`] - Bouncing slice offset for animation
//! - [`axes`] - The four coordinate axes, turned with the polytope
//!
//! ## Kernel entry points
//!
//! [`derive`], [`slice`] and [`rotate`] are the one-shot forms. A session
//! that renders many frames keeps a [`Tessellator`] per channel instead, so
//! topology is only planned once.

pub mod axes;
pub mod buffer;
pub mod color;
pub mod cross_section;
pub mod tessellator;

pub use axes::{axes, AXIS_NAMES};
pub use buffer::{BatchSource, Channel, RenderBatch, RenderBuffer, Reuse, Split, TessellationConfig, MAX_CELL_SCALE};
pub use color::{ColorAssigner, ColorStrategy, Palette, PaletteTable, Rgb, DEFAULT_PALETTE};
pub use cross_section::{CrossSection, CrossSectioner, FaceSegment, SlicePolygon, WSlice};
pub use tessellator::Tessellator;

use anakata_core::{GeometryError, Polytope};
use anakata_math::{PlaneAngles, ProjectionConfig, Projector, RotationState};

/// Build the buffer of one channel for the current rotation
///
/// Polytopes are only read, so the three channels can be derived from the
/// same polytope on different threads.
pub fn derive(
    polytope: &Polytope,
    rotation: &RotationState,
    projection: ProjectionConfig,
    tessellation: &TessellationConfig,
    channel: Channel,
    colors: &ColorAssigner,
) -> Result<RenderBuffer, GeometryError> {
    let mut tessellator = Tessellator::new(polytope, channel, *tessellation)?;
    tessellator.update(polytope, &Projector::new(rotation, projection), colors)?;
    Ok(tessellator.into_buffer())
}

/// Cross-section of the unrotated polytope at `w`, one polygon per cell
pub fn slice(polytope: &Polytope, w: f32) -> CrossSection {
    CrossSectioner::new().slice(polytope, w)
}

/// Advance every plane by `delta * elapsed_ms`
#[inline]
pub fn rotate(rotation: &mut RotationState, delta: &PlaneAngles, elapsed_ms: f32) {
    rotation.rotate(delta, elapsed_ms);
}
