//! Render buffers handed to the external renderer
//!
//! Position, color and index data are plain `Pod` arrays; the byte views
//! can be uploaded to a GPU buffer without copying.

use anakata_math::Vec3;
use serde::{Serialize, Deserialize};

use crate::color::Rgb;

/// The three independent render channels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Filled cells, drawn as triangles
    Cells,
    /// Face outlines, drawn as line segments
    Edges,
    /// Vertices, drawn as points
    Points,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Cells, Channel::Edges, Channel::Points];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Cells => "cells",
            Channel::Edges => "edges",
            Channel::Points => "points",
        }
    }
}

/// How projected vertices are shared between faces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reuse {
    /// One position per distinct vertex in a batch
    #[default]
    All,
    /// One position per vertex of each face
    Faces,
    /// Disjoint primitives, nothing shared
    None,
}

/// How the output is divided into draw batches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// The whole polytope is one batch
    #[default]
    None,
    /// One batch per cell
    Cells,
    /// One batch per face
    Faces,
}

/// Largest batch scale; keeps a visible seam between neighboring cells
pub const MAX_CELL_SCALE: f32 = 0.999;

/// Tessellation options shared by every channel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub reuse: Reuse,
    pub split: Split,
    /// Size of each batch relative to its natural size, 0 to 100
    pub cell_size_percent: f32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            reuse: Reuse::All,
            split: Split::None,
            cell_size_percent: 100.0,
        }
    }
}

impl TessellationConfig {
    pub fn new(reuse: Reuse, split: Split) -> Self {
        Self {
            reuse,
            split,
            ..Self::default()
        }
    }

    /// Uniform scale applied to every batch
    #[inline]
    pub fn scale(&self) -> f32 {
        (self.cell_size_percent / 100.0).clamp(0.0, MAX_CELL_SCALE)
    }
}

/// What part of the polytope a batch was built from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchSource {
    Whole,
    Cell(usize),
    Face(usize),
}

/// One independently placed draw batch
///
/// Positions are centered on their bounding box. The renderer places the
/// batch at `offset` and scales it by `scale`:
/// `world = offset + position * scale`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderBatch {
    pub source: BatchSource,
    pub positions: Vec<Vec3>,
    /// Triangle indices (cells channel) or line indices (edges channel);
    /// `None` for non-indexed primitives
    pub indices: Option<Vec<u32>>,
    /// One color per position
    pub colors: Vec<Rgb>,
    pub offset: Vec3,
    pub scale: f32,
}

impl RenderBatch {
    pub(crate) fn new(source: BatchSource) -> Self {
        Self {
            source,
            positions: Vec::new(),
            indices: None,
            colors: Vec::new(),
            offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a flat `[x, y, z, x, y, z, ...]` slice
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }

    /// Position `i` after placement
    #[inline]
    pub fn world_position(&self, i: usize) -> Vec3 {
        self.offset + self.positions[i] * self.scale
    }

    /// Center positions on their bounding box and record the translation
    pub(crate) fn recenter(&mut self, scale: f32) {
        self.scale = scale;
        let Some(&first) = self.positions.first() else {
            self.offset = Vec3::ZERO;
            return;
        };
        let (lo, hi) = self
            .positions
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min_components(p), hi.max_components(p)));
        let center = (lo + hi) * 0.5;
        for p in &mut self.positions {
            *p -= center;
        }
        self.offset = center;
    }
}

/// All batches of one channel for one derivation
#[derive(Clone, Debug, PartialEq)]
pub struct RenderBuffer {
    pub channel: Channel,
    pub batches: Vec<RenderBatch>,
}

impl RenderBuffer {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            batches: Vec::new(),
        }
    }

    /// Total positions over all batches
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(RenderBatch::vertex_count).sum()
    }

    /// Total triangles (cells channel only)
    pub fn triangle_count(&self) -> usize {
        if self.channel != Channel::Cells {
            return 0;
        }
        self.batches
            .iter()
            .map(|b| b.indices.as_ref().map_or(b.positions.len(), Vec::len) / 3)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(|b| b.positions.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderBatch> {
        self.batches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_pod_sizes() {
        // 3 floats position, 3 floats color
        assert_eq!(size_of::<Vec3>(), 12);
        assert_eq!(size_of::<Rgb>(), 12);
        assert_eq!(std::mem::align_of::<Vec3>(), 4);
    }

    #[test]
    fn test_scale_clamp() {
        assert_eq!(TessellationConfig::default().scale(), MAX_CELL_SCALE);
        let half = TessellationConfig { cell_size_percent: 50.0, ..Default::default() };
        assert_eq!(half.scale(), 0.5);
        let negative = TessellationConfig { cell_size_percent: -10.0, ..Default::default() };
        assert_eq!(negative.scale(), 0.0);
    }

    #[test]
    fn test_recenter() {
        let mut batch = RenderBatch::new(BatchSource::Cell(0));
        batch.positions = vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 5.0, 1.0)];
        batch.recenter(0.5);
        assert_eq!(batch.offset, Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(batch.positions[0], Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(batch.world_position(1), Vec3::new(2.5, 4.0, 1.0));
    }

    #[test]
    fn test_byte_views() {
        let mut batch = RenderBatch::new(BatchSource::Whole);
        batch.positions = vec![Vec3::new(1.0, 2.0, 3.0)];
        batch.colors = vec![Rgb::WHITE];
        batch.indices = Some(vec![0, 0, 0]);
        assert_eq!(batch.flat_positions(), &[1.0, 2.0, 3.0]);
        assert_eq!(batch.position_bytes().len(), 12);
        assert_eq!(batch.color_bytes().len(), 12);
        assert_eq!(batch.index_bytes().map(<[u8]>::len), Some(12));
    }

    #[test]
    fn test_config_from_toml() {
        let config: TessellationConfig = toml::from_str("reuse = \"none\"\nsplit = \"cells\"").unwrap();
        assert_eq!(config.reuse, Reuse::None);
        assert_eq!(config.split, Split::Cells);
        assert_eq!(config.cell_size_percent, 100.0);
    }
}
