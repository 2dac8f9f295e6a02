//! Turning polytopes into draw batches
//!
//! A [`Tessellator`] plans its topology once per polytope and reuse/split
//! policy: which source vertex feeds each output position, and the index
//! lists. Each frame [`update`](Tessellator::update) only re-projects the
//! positions in place and recenters the batches.

use std::collections::{HashMap, HashSet};

use anakata_core::{GeometryError, Polytope};
use anakata_math::{Projector, Vec3, Vec4};

use crate::buffer::{BatchSource, Channel, RenderBatch, RenderBuffer, Reuse, Split, TessellationConfig};
use crate::color::ColorAssigner;
use crate::cross_section::CrossSection;

/// One output position: which source vertex it shows, and for which cell/face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Emit {
    vertex: usize,
    cell: usize,
    face: usize,
}

/// A vertex loop to tessellate
struct Loop<'a> {
    cell: usize,
    face: usize,
    vertices: &'a [usize],
}

#[derive(Clone, Debug)]
struct BatchPlan {
    source: BatchSource,
    emits: Vec<Emit>,
    indices: Option<Vec<u32>>,
}

/// Fan triangulation of a convex loop of `n` vertices: `(0, i+1, i+2)`
fn fan(n: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..n.saturating_sub(2)).map(|i| [0, i + 1, i + 2])
}

/// Minimum loop length for a channel
fn min_arity(channel: Channel) -> usize {
    match channel {
        Channel::Cells => 3,
        Channel::Edges => 2,
        Channel::Points => 0,
    }
}

/// Maps source vertices to batch-local indices on first use
#[derive(Default)]
struct SharedVertices {
    local: HashMap<usize, u32>,
}

impl SharedVertices {
    fn index(&mut self, emits: &mut Vec<Emit>, emit: Emit) -> u32 {
        *self.local.entry(emit.vertex).or_insert_with(|| {
            emits.push(emit);
            (emits.len() - 1) as u32
        })
    }
}

/// Plan one batch
///
/// With `strict`, loops too short for the channel are an error; otherwise
/// they are skipped.
fn plan_batch<'a>(
    channel: Channel,
    reuse: Reuse,
    source: BatchSource,
    loops: impl Iterator<Item = Loop<'a>>,
    strict: bool,
) -> Result<BatchPlan, GeometryError> {
    let mut emits = Vec::new();
    let mut indices = Vec::new();
    let mut shared = SharedVertices::default();
    let mut seen_edges = HashSet::new();

    for face_loop in loops {
        let n = face_loop.vertices.len();
        if n < min_arity(channel) {
            if strict {
                return Err(GeometryError::UnsupportedFaceArity { face: face_loop.face, arity: n });
            }
            continue;
        }
        let emit = |i: usize| Emit {
            vertex: face_loop.vertices[i],
            cell: face_loop.cell,
            face: face_loop.face,
        };

        match (channel, reuse) {
            (Channel::Cells, Reuse::All) => {
                let local: Vec<u32> = (0..n).map(|i| shared.index(&mut emits, emit(i))).collect();
                for tri in fan(n) {
                    indices.extend(tri.iter().map(|&t| local[t]));
                }
            }
            (Channel::Cells, Reuse::Faces) => {
                let base = emits.len() as u32;
                emits.extend((0..n).map(emit));
                for tri in fan(n) {
                    indices.extend(tri.iter().map(|&t| base + t as u32));
                }
            }
            (Channel::Cells, Reuse::None) => {
                for tri in fan(n) {
                    emits.extend(tri.iter().map(|&t| emit(t)));
                }
            }
            (Channel::Edges, Reuse::All) => {
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (a, b) = (face_loop.vertices[i], face_loop.vertices[j]);
                    if a == b || !seen_edges.insert((a.min(b), a.max(b))) {
                        continue;
                    }
                    let ia = shared.index(&mut emits, emit(i));
                    let ib = shared.index(&mut emits, emit(j));
                    indices.extend([ia, ib]);
                }
            }
            (Channel::Edges, _) => {
                for i in 0..n {
                    emits.push(emit(i));
                    emits.push(emit((i + 1) % n));
                }
            }
            (Channel::Points, Reuse::All) => {
                for i in 0..n {
                    shared.index(&mut emits, emit(i));
                }
            }
            (Channel::Points, _) => {
                emits.extend((0..n).map(emit));
            }
        }
    }

    let indexed = matches!(
        (channel, reuse),
        (Channel::Cells, Reuse::All | Reuse::Faces) | (Channel::Edges, Reuse::All)
    );
    Ok(BatchPlan {
        source,
        emits,
        indices: indexed.then_some(indices),
    })
}

/// Group the (cell, face) occurrences of a polytope into batches
fn batch_groups(polytope: &Polytope, split: Split) -> Vec<(BatchSource, Vec<(usize, usize)>)> {
    let occurrences = move |cell: usize| polytope.cell(cell).faces.iter().map(move |&f| (cell, f));
    match split {
        Split::None => vec![(
            BatchSource::Whole,
            (0..polytope.cell_count()).flat_map(occurrences).collect(),
        )],
        Split::Cells => (0..polytope.cell_count())
            .map(|cell| (BatchSource::Cell(cell), occurrences(cell).collect()))
            .collect(),
        Split::Faces => {
            let mut seen = HashSet::new();
            (0..polytope.cell_count())
                .flat_map(occurrences)
                .filter(|&(_, face)| seen.insert(face))
                .map(|(cell, face)| (BatchSource::Face(face), vec![(cell, face)]))
                .collect()
        }
    }
}

/// Tessellates one channel of a polytope, reusing topology across frames
#[derive(Clone, Debug)]
pub struct Tessellator {
    channel: Channel,
    config: TessellationConfig,
    vertex_count: usize,
    plans: Vec<BatchPlan>,
    buffer: RenderBuffer,
    projected: Vec<Vec3>,
    colors_stale: bool,
}

impl Tessellator {
    /// Plan the topology of `channel` for `polytope`
    ///
    /// Fails with [`GeometryError::UnsupportedFaceArity`] if a face is too
    /// short to draw in this channel.
    pub fn new(polytope: &Polytope, channel: Channel, config: TessellationConfig) -> Result<Self, GeometryError> {
        let mut tessellator = Self {
            channel,
            config,
            vertex_count: 0,
            plans: Vec::new(),
            buffer: RenderBuffer::new(channel),
            projected: Vec::new(),
            colors_stale: true,
        };
        tessellator.rebuild(polytope)?;
        Ok(tessellator)
    }

    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    pub fn config(&self) -> &TessellationConfig {
        &self.config
    }

    #[inline]
    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> RenderBuffer {
        self.buffer
    }

    /// Rebuild topology for a (new) polytope
    pub fn rebuild(&mut self, polytope: &Polytope) -> Result<(), GeometryError> {
        let mut plans = Vec::new();
        for (source, occurrences) in batch_groups(polytope, self.config.split) {
            let loops = occurrences.iter().map(|&(cell, face)| Loop {
                cell,
                face,
                vertices: polytope.face(face).vertices.as_slice(),
            });
            plans.push(plan_batch(self.channel, self.config.reuse, source, loops, true)?);
        }

        self.buffer.batches = plans
            .iter()
            .map(|plan| {
                let mut batch = RenderBatch::new(plan.source);
                batch.positions = vec![Vec3::ZERO; plan.emits.len()];
                batch.colors = vec![Default::default(); plan.emits.len()];
                batch.indices = plan.indices.clone();
                batch
            })
            .collect();
        log::debug!(
            "Built {} topology for '{}': reuse {:?}, split {:?}, {} batches",
            self.channel.name(),
            polytope.name(),
            self.config.reuse,
            self.config.split,
            plans.len()
        );
        self.plans = plans;
        self.vertex_count = polytope.vertex_count();
        self.colors_stale = true;
        Ok(())
    }

    /// Change policies, rebuilding topology only if reuse or split changed
    pub fn set_config(&mut self, polytope: &Polytope, config: TessellationConfig) -> Result<(), GeometryError> {
        let topology_changed = config.reuse != self.config.reuse || config.split != self.config.split;
        self.config = config;
        if topology_changed {
            self.rebuild(polytope)?;
        }
        Ok(())
    }

    /// Force colors to be rewritten on the next update
    pub fn invalidate_colors(&mut self) {
        self.colors_stale = true;
    }

    /// Re-project every position in place
    ///
    /// Colors are rewritten only after a rebuild, after
    /// [`invalidate_colors`](Self::invalidate_colors), or when the color
    /// strategy depends on the projection.
    pub fn update(&mut self, polytope: &Polytope, projector: &Projector, colors: &ColorAssigner) -> Result<(), GeometryError> {
        if polytope.vertex_count() != self.vertex_count {
            log::warn!(
                "Tessellator planned for {} vertices got '{}' with {}; rebuilding",
                self.vertex_count,
                polytope.name(),
                polytope.vertex_count()
            );
            self.rebuild(polytope)?;
        }

        self.projected.clear();
        self.projected.extend(polytope.vertices().iter().map(|&v| projector.project(v)));

        let write_colors = self.colors_stale || colors.depends_on_projection();
        let scale = self.config.scale();
        for (plan, batch) in self.plans.iter().zip(&mut self.buffer.batches) {
            for (i, e) in plan.emits.iter().enumerate() {
                let projected = self.projected[e.vertex];
                batch.positions[i] = projected;
                if write_colors {
                    batch.colors[i] = colors.color(e.cell, e.face, polytope.vertex(e.vertex), projected);
                }
            }
            batch.recenter(scale);
        }
        self.colors_stale = false;
        Ok(())
    }

    /// Tessellate a cross-section
    ///
    /// Slice polygons are drawn like faces of their cell; a cell lying in
    /// the hyperplane is drawn as its faces. Polygons too short for the
    /// channel (a cell touched at a single point or edge) are skipped rather
    /// than reported. Colors of a cut cell use its cell index for both the
    /// cell and face index.
    pub fn section(
        section: &CrossSection,
        channel: Channel,
        config: &TessellationConfig,
        colors: &ColorAssigner,
    ) -> RenderBuffer {
        let mut points = Vec::new();
        // (cell, face, loop) per outline, grouped per polygon
        let mut polygon_loops: Vec<Vec<(usize, usize, Vec<usize>)>> = Vec::new();
        for polygon in section.polygons.iter().filter(|p| !p.is_empty()) {
            let outlines = polygon
                .outlines()
                .into_iter()
                .map(|(face, outline)| {
                    let start = points.len();
                    points.extend_from_slice(outline);
                    (polygon.cell, face, (start..points.len()).collect())
                })
                .collect();
            polygon_loops.push(outlines);
        }

        let groups: Vec<(BatchSource, Vec<usize>)> = match config.split {
            Split::None => vec![(BatchSource::Whole, (0..polygon_loops.len()).collect())],
            Split::Cells | Split::Faces => polygon_loops
                .iter()
                .enumerate()
                .map(|(i, outlines)| (BatchSource::Cell(outlines[0].0), vec![i]))
                .collect(),
        };

        let mut buffer = RenderBuffer::new(channel);
        for (source, members) in groups {
            let loops = members.iter().flat_map(|&i| {
                polygon_loops[i].iter().map(|(cell, face, vertices)| Loop {
                    cell: *cell,
                    face: *face,
                    vertices: vertices.as_slice(),
                })
            });
            // Non-strict planning never fails
            let Ok(plan) = plan_batch(channel, config.reuse, source, loops, false) else {
                continue;
            };
            let mut batch = RenderBatch::new(plan.source);
            batch.positions = plan.emits.iter().map(|e| points[e.vertex]).collect();
            batch.colors = plan
                .emits
                .iter()
                .map(|e| {
                    let p = points[e.vertex];
                    colors.color(e.cell, e.face, Vec4::new(p.x, p.y, p.z, section.w), p)
                })
                .collect();
            batch.indices = plan.indices;
            batch.recenter(config.scale());
            buffer.batches.push(batch);
        }
        buffer
    }
}
