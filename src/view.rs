//! The viewing session
//!
//! A [`HyperView`] owns the current polytope, the rotation state and one
//! tessellator per enabled channel. `advance` moves time forward, `frame`
//! derives the buffers for the renderer. Dirty flags record what changed in
//! between so a frame only does the work it needs.

use std::sync::Arc;

use anakata_core::{GeometryError, Polytope, PolytopeProvider};
use anakata_math::{PlaneAngles, ProjectionConfig, Projector, RotationState};
use anakata_render::{
    Channel, ColorAssigner, ColorStrategy, CrossSection, CrossSectioner, PaletteTable, RenderBuffer,
    TessellationConfig, Tessellator, WSlice,
};
use bitflags::bitflags;

use crate::config::{AppConfig, AxesConfig, ColorConfig, SliceConfig};

bitflags! {
    /// What changed since the last frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// Nothing changed, buffers are current
        const NONE = 0;
        /// Rotation or projection changed; positions must be re-projected
        const ROTATION = 1 << 0;
        /// Polytope or reuse/split policy changed; index buffers are new
        const TOPOLOGY = 1 << 1;
        /// Palette or color strategy changed
        const COLORS = 1 << 2;
        /// The slicing hyperplane moved or was toggled
        const SLICE = 1 << 3;
        /// Everything must be derived again
        const ALL = Self::ROTATION.bits() | Self::TOPOLOGY.bits() | Self::COLORS.bits() | Self::SLICE.bits();
    }
}

/// Per-channel derivation state
#[derive(Clone, Debug)]
struct ChannelState {
    tessellator: Tessellator,
    colors: ColorAssigner,
}

/// Buffers derived for one frame
#[derive(Debug)]
pub struct Frame<'a> {
    /// What changed since the previous frame
    pub dirty: DirtyFlags,
    /// Whether the buffers show the cross-section
    pub sliced: bool,
    /// One buffer per enabled channel
    pub buffers: Vec<&'a RenderBuffer>,
    /// The coordinate axes, when enabled
    pub axes: Option<&'a RenderBuffer>,
}

impl Frame<'_> {
    pub fn vertex_count(&self) -> usize {
        self.buffers.iter().map(|b| b.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.buffers.iter().map(|b| b.triangle_count()).sum()
    }

    pub fn batch_count(&self) -> usize {
        self.buffers.iter().map(|b| b.batches.len()).sum()
    }

    pub fn buffer(&self, channel: Channel) -> Option<&RenderBuffer> {
        self.buffers.iter().copied().find(|b| b.channel == channel)
    }
}

/// A polytope being viewed, with its animation state
#[derive(Debug)]
pub struct HyperView {
    polytope: Arc<Polytope>,
    rotation: RotationState,
    speed: PlaneAngles,
    projection: ProjectionConfig,
    tessellation: TessellationConfig,
    color_config: ColorConfig,
    palettes: PaletteTable,
    channels: Vec<Channel>,
    states: Vec<ChannelState>,
    slice_config: SliceConfig,
    slice: WSlice,
    sectioner: CrossSectioner,
    section: Option<CrossSection>,
    section_buffers: Vec<RenderBuffer>,
    axes_config: AxesConfig,
    axes: Option<RenderBuffer>,
    dirty: DirtyFlags,
}

impl HyperView {
    /// Build the configured shape and set up every enabled channel
    pub fn new(config: &AppConfig) -> Result<Self, GeometryError> {
        let polytope = Arc::new(config.shape.build()?);
        Self::with_polytope(config, polytope)
    }

    /// Set up a session for an already built polytope
    pub fn with_polytope(config: &AppConfig, polytope: Arc<Polytope>) -> Result<Self, GeometryError> {
        let palettes = config.colors.palettes();
        let channels = config.channels.enabled();
        let states = build_states(&polytope, &channels, config.tessellation, &config.colors, &palettes)?;
        Ok(Self {
            polytope,
            rotation: RotationState::from_angles(config.rotation.angles),
            speed: config.rotation.speed,
            projection: config.projection,
            tessellation: config.tessellation,
            color_config: config.colors.clone(),
            palettes,
            channels,
            states,
            slice_config: config.slice,
            slice: WSlice::new(config.slice.w),
            sectioner: CrossSectioner::new(),
            section: None,
            section_buffers: Vec::new(),
            axes_config: config.axes,
            axes: None,
            dirty: DirtyFlags::ALL,
        })
    }

    #[inline]
    pub fn polytope(&self) -> &Arc<Polytope> {
        &self.polytope
    }

    #[inline]
    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    #[inline]
    pub fn slice_w(&self) -> f32 {
        self.slice.value
    }

    #[inline]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[inline]
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// The most recent cross-section, if slicing is enabled
    pub fn section(&self) -> Option<&CrossSection> {
        self.section.as_ref()
    }

    /// Build a new shape and switch to it
    ///
    /// On error the current shape and buffers stay untouched.
    pub fn set_shape<P: PolytopeProvider + ?Sized>(&mut self, provider: &P) -> Result<(), GeometryError> {
        let polytope = provider.build()?;
        self.set_polytope(Arc::new(polytope))
    }

    /// Replace the polytope, discarding all cached topology
    pub fn set_polytope(&mut self, polytope: Arc<Polytope>) -> Result<(), GeometryError> {
        let states = build_states(&polytope, &self.channels, self.tessellation, &self.color_config, &self.palettes)?;
        log::info!("Switched to '{}'", polytope.name());
        self.polytope = polytope;
        self.states = states;
        self.section = None;
        self.dirty |= DirtyFlags::ALL;
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: RotationState) {
        self.rotation = rotation;
        self.dirty |= DirtyFlags::ROTATION;
    }

    /// Rotation speed per plane, radians per millisecond
    pub fn set_speed(&mut self, speed: PlaneAngles) {
        self.speed = speed;
    }

    pub fn set_projection(&mut self, projection: ProjectionConfig) {
        if projection != self.projection {
            self.projection = projection;
            self.dirty |= DirtyFlags::ROTATION;
        }
    }

    /// Change tessellation options; topology is only rebuilt if reuse or split changed
    pub fn set_tessellation(&mut self, tessellation: TessellationConfig) -> Result<(), GeometryError> {
        let topology = tessellation.reuse != self.tessellation.reuse || tessellation.split != self.tessellation.split;
        for state in &mut self.states {
            state.tessellator.set_config(&self.polytope, tessellation)?;
        }
        self.tessellation = tessellation;
        self.dirty |= if topology { DirtyFlags::TOPOLOGY } else { DirtyFlags::ROTATION };
        Ok(())
    }

    /// Change the color strategy of one channel
    pub fn set_color_strategy(&mut self, channel: Channel, strategy: ColorStrategy) {
        match channel {
            Channel::Cells => self.color_config.cells = strategy,
            Channel::Edges => self.color_config.edges = strategy,
            Channel::Points => self.color_config.points = strategy,
        }
        self.refresh_colors();
    }

    /// Switch palette by name; unknown names fall back to the default
    pub fn set_palette(&mut self, name: &str) {
        self.color_config.palette = name.to_string();
        self.refresh_colors();
    }

    pub fn set_slicing(&mut self, enabled: bool) {
        if enabled != self.slice_config.enabled {
            self.slice_config.enabled = enabled;
            self.section = None;
            self.dirty |= DirtyFlags::SLICE | DirtyFlags::TOPOLOGY;
        }
    }

    pub fn set_slice_w(&mut self, w: f32) {
        self.slice.value = w;
        self.dirty |= DirtyFlags::SLICE;
    }

    pub fn set_axes(&mut self, axes: AxesConfig) {
        if axes != self.axes_config {
            self.axes_config = axes;
            self.axes = None;
            self.dirty |= DirtyFlags::ROTATION;
        }
    }

    fn refresh_colors(&mut self) {
        for state in &mut self.states {
            let channel = state.tessellator.channel();
            state.colors = self.color_config.assigner(channel, &self.palettes, &self.polytope);
            state.tessellator.invalidate_colors();
        }
        self.dirty |= DirtyFlags::COLORS;
    }

    /// Advance rotation and slice animation by `elapsed_ms`
    ///
    /// Must be called before [`frame`](Self::frame) in each frame.
    pub fn advance(&mut self, elapsed_ms: f32) {
        if self.speed != PlaneAngles::ZERO {
            anakata_render::rotate(&mut self.rotation, &self.speed, elapsed_ms);
            self.dirty |= DirtyFlags::ROTATION;
        }
        let s = self.slice_config;
        if s.enabled && s.speed != 0.0 {
            self.slice.shift(s.speed, s.min, s.max, elapsed_ms);
            self.dirty |= DirtyFlags::SLICE;
        }
    }

    /// Derive the buffers of every enabled channel
    ///
    /// Positions are re-projected in place; topology is reused unless the
    /// polytope or tessellation policy changed. With nothing dirty the
    /// previous buffers are returned as they are.
    pub fn frame(&mut self) -> Result<Frame<'_>, GeometryError> {
        let dirty = std::mem::take(&mut self.dirty);
        if self.axes_config.enabled && (dirty.contains(DirtyFlags::ROTATION) || self.axes.is_none()) {
            let projector = Projector::new(&self.rotation, self.projection);
            let AxesConfig { length, origin, .. } = self.axes_config;
            self.axes = Some(anakata_render::axes(&projector, length, origin));
        }

        if self.slice_config.enabled {
            if !dirty.is_empty() || self.section.is_none() {
                self.derive_section();
            }
            return Ok(Frame {
                dirty,
                sliced: true,
                buffers: self.section_buffers.iter().collect(),
                axes: self.axes(),
            });
        }

        if !dirty.is_empty() {
            let projector = Projector::new(&self.rotation, self.projection);
            for ChannelState { tessellator, colors } in &mut self.states {
                tessellator.update(&self.polytope, &projector, colors)?;
            }
        }
        Ok(Frame {
            dirty,
            sliced: false,
            buffers: self.states.iter().map(|s| s.tessellator.buffer()).collect(),
            axes: self.axes(),
        })
    }

    fn axes(&self) -> Option<&RenderBuffer> {
        self.axes.as_ref().filter(|_| self.axes_config.enabled)
    }

    fn derive_section(&mut self) {
        let section = self
            .sectioner
            .slice_rotated(&self.polytope, &self.rotation.rotations(), self.slice.value);
        self.section_buffers = self
            .states
            .iter()
            .map(|state| Tessellator::section(&section, state.tessellator.channel(), &self.tessellation, &state.colors))
            .collect();
        self.section = Some(section);
    }
}

fn build_states(
    polytope: &Polytope,
    channels: &[Channel],
    tessellation: TessellationConfig,
    colors: &ColorConfig,
    palettes: &PaletteTable,
) -> Result<Vec<ChannelState>, GeometryError> {
    channels
        .iter()
        .map(|&channel| {
            Ok(ChannelState {
                tessellator: Tessellator::new(polytope, channel, tessellation)?,
                colors: colors.assigner(channel, palettes, polytope),
            })
        })
        .collect()
}
