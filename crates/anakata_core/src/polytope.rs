//! The vertex/face/cell model of a 4-polytope
//!
//! A [`Polytope`] is immutable once built. Indices are stable for its
//! whole lifetime; a shape or resolution change builds a new polytope
//! instead of editing the old one. Because nothing mutates it, a polytope
//! can be shared by reference (or `Arc`) between every tessellation and
//! cross-section of a frame.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anakata_math::Vec4;
use serde::{Serialize, Deserialize};

use crate::error::{GeometryError, ShapeDefect, ShapeLoadError};

/// A planar polygon given as an ordered loop of vertex indices
///
/// Winding matters to whoever computes normals downstream; the model does
/// not enforce it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face {
    pub vertices: Vec<usize>,
}

impl Face {
    pub fn new(vertices: Vec<usize>) -> Self {
        Self { vertices }
    }

    /// Number of vertices in the loop
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consecutive vertex pairs, wrapping last-to-first
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl From<Vec<usize>> for Face {
    fn from(vertices: Vec<usize>) -> Self {
        Self::new(vertices)
    }
}

/// A 3D "room" of the polytope, bounded by the listed faces
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    pub faces: Vec<usize>,
}

impl Cell {
    pub fn new(faces: Vec<usize>) -> Self {
        Self { faces }
    }
}

impl From<Vec<usize>> for Cell {
    fn from(faces: Vec<usize>) -> Self {
        Self::new(faces)
    }
}

/// The boundary complex of a 4-dimensional solid
#[derive(Clone, Debug, PartialEq)]
pub struct Polytope {
    name: String,
    vertices: Vec<Vec4>,
    faces: Vec<Face>,
    cells: Vec<Cell>,
}

impl Polytope {
    /// Build a polytope, checking that every index is in range
    ///
    /// Fails with [`GeometryError::MalformedShape`] on the first face that
    /// references a missing vertex or cell that references a missing face.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec4>,
        faces: Vec<Face>,
        cells: Vec<Cell>,
    ) -> Result<Self, GeometryError> {
        validate(vertices.len(), &faces, &cells)?;
        Ok(Self::from_parts(name, vertices, faces, cells))
    }

    /// Assemble a polytope whose indices are correct by construction
    pub(crate) fn from_parts(
        name: impl Into<String>,
        vertices: Vec<Vec4>,
        faces: Vec<Face>,
        cells: Vec<Cell>,
    ) -> Self {
        debug_assert!(validate(vertices.len(), &faces, &cells).is_ok());
        let polytope = Self {
            name: name.into(),
            vertices,
            faces,
            cells,
        };
        log::info!(
            "Built polytope '{}': {} vertices, {} faces, {} cells",
            polytope.name,
            polytope.vertices.len(),
            polytope.faces.len(),
            polytope.cells.len()
        );
        polytope
    }

    /// A polytope with no geometry at all
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Build from literal tables
    pub fn from_tables(
        name: impl Into<String>,
        vertices: &[[f32; 4]],
        faces: &[&[usize]],
        cells: &[&[usize]],
    ) -> Result<Self, GeometryError> {
        Self::new(
            name,
            vertices.iter().map(|&v| Vec4::from(v)).collect(),
            faces.iter().map(|f| Face::new(f.to_vec())).collect(),
            cells.iter().map(|c| Cell::new(c.to_vec())).collect(),
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> Vec4 {
        self.vertices[index]
    }

    #[inline]
    pub fn face(&self, index: usize) -> &Face {
        &self.faces[index]
    }

    #[inline]
    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether there is nothing to draw
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The faces of a cell together with their face indices
    pub fn cell_faces(&self, cell: usize) -> impl Iterator<Item = (usize, &Face)> + '_ {
        self.cells[cell].faces.iter().map(move |&f| (f, &self.faces[f]))
    }

    /// Distinct vertex indices of a cell, in first-seen order
    pub fn cell_vertex_indices(&self, cell: usize) -> Vec<usize> {
        let mut seen = HashSet::new();
        self.cell_faces(cell)
            .flat_map(|(_, face)| face.vertices.iter().copied())
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Distinct undirected edges over all faces, in first-seen order
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut seen = HashSet::new();
        self.faces
            .iter()
            .flat_map(|face| face.edges())
            .map(|(a, b)| if a < b { [a, b] } else { [b, a] })
            .filter(|e| e[0] != e[1] && seen.insert(*e))
            .collect()
    }

    /// Smallest and largest vertex w coordinate
    pub fn w_range(&self) -> Option<(f32, f32)> {
        let first = self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first.w, first.w), |(lo, hi), v| (lo.min(v.w), hi.max(v.w))),
        )
    }

    /// Largest distance of any vertex from the origin
    pub fn bounding_radius(&self) -> f32 {
        self.vertices.iter().map(|v| v.length()).fold(0.0, f32::max)
    }

    /// Raw tables for serialization
    pub fn to_description(&self) -> PolytopeDescription {
        PolytopeDescription {
            name: self.name.clone(),
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            cells: self.cells.clone(),
        }
    }
}

fn validate(vertex_count: usize, faces: &[Face], cells: &[Cell]) -> Result<(), ShapeDefect> {
    for (face_index, face) in faces.iter().enumerate() {
        if let Some(&vertex) = face.vertices.iter().find(|&&v| v >= vertex_count) {
            return Err(ShapeDefect::VertexOutOfRange {
                face: face_index,
                vertex,
                vertex_count,
            });
        }
    }
    let face_count = faces.len();
    for (cell_index, cell) in cells.iter().enumerate() {
        if let Some(&face) = cell.faces.iter().find(|&&f| f >= face_count) {
            return Err(ShapeDefect::FaceOutOfRange {
                cell: cell_index,
                face,
                face_count,
            });
        }
    }
    Ok(())
}

/// Unvalidated vertex/face/cell tables, as written in shape files
///
/// ```ron
/// (
///     name: "triangle prism",
///     vertices: [(0.0, 0.0, 0.0, 1.0), ...],
///     faces: [[0, 1, 2], ...],
///     cells: [[0, 1, 2, 3, 4]],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolytopeDescription {
    #[serde(default)]
    pub name: String,
    pub vertices: Vec<Vec4>,
    pub faces: Vec<Face>,
    pub cells: Vec<Cell>,
}

impl PolytopeDescription {
    /// Validate the tables into a polytope
    pub fn to_polytope(&self) -> Result<Polytope, GeometryError> {
        Polytope::new(
            self.name.clone(),
            self.vertices.clone(),
            self.faces.clone(),
            self.cells.clone(),
        )
    }

    /// Parse a description from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ShapeLoadError> {
        Ok(ron::from_str(text)?)
    }

    /// Load and validate a polytope from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Polytope, ShapeLoadError> {
        let contents = fs::read_to_string(path)?;
        let description = Self::from_ron_str(&contents)?;
        Ok(description.to_polytope()?)
    }
}

/// Anything that can produce a fresh polytope
///
/// The tessellator and cross-sectioner only ever see the resulting
/// [`Polytope`]; named presets, generators and loaded files all sit behind
/// this trait.
pub trait PolytopeProvider {
    fn build(&self) -> Result<Polytope, GeometryError>;
}

impl PolytopeProvider for PolytopeDescription {
    fn build(&self) -> Result<Polytope, GeometryError> {
        self.to_polytope()
    }
}

impl<F> PolytopeProvider for F
where
    F: Fn() -> Result<Polytope, GeometryError>,
{
    fn build(&self) -> Result<Polytope, GeometryError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_pyramid_cell() -> Result<Polytope, GeometryError> {
        Polytope::from_tables(
            "pyramid",
            &[
                [0.0, 0.0, 0.0, -1.0],
                [1.0, 0.0, 0.0, -1.0],
                [1.0, 1.0, 0.0, -1.0],
                [0.0, 1.0, 0.0, -1.0],
                [0.5, 0.5, 1.0, 1.0],
            ],
            &[&[0, 1, 2, 3], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
            &[&[0, 1, 2, 3, 4]],
        )
    }

    #[test]
    fn test_valid_tables() {
        let p = square_pyramid_cell().unwrap();
        assert_eq!(p.vertex_count(), 5);
        assert_eq!(p.face_count(), 5);
        assert_eq!(p.cell_count(), 1);
        assert_eq!(p.name(), "pyramid");
    }

    #[test]
    fn test_vertex_out_of_range() {
        let err = Polytope::from_tables("bad", &[[0.0; 4]; 3], &[&[0, 1, 3]], &[&[0]]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MalformedShape(ShapeDefect::VertexOutOfRange { face: 0, vertex: 3, vertex_count: 3 })
        );
    }

    #[test]
    fn test_face_out_of_range() {
        let err = Polytope::from_tables("bad", &[[0.0; 4]; 3], &[&[0, 1, 2]], &[&[0, 1]]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MalformedShape(ShapeDefect::FaceOutOfRange { cell: 0, face: 1, face_count: 1 })
        );
    }

    #[test]
    fn test_cell_vertex_indices_distinct_in_order() {
        let p = square_pyramid_cell().unwrap();
        assert_eq!(p.cell_vertex_indices(0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let p = square_pyramid_cell().unwrap();
        // 4 base edges + 4 lateral edges
        assert_eq!(p.edges().len(), 8);
    }

    #[test]
    fn test_w_range_and_radius() {
        let p = square_pyramid_cell().unwrap();
        assert_eq!(p.w_range(), Some((-1.0, 1.0)));
        assert!(p.bounding_radius() > 1.0);
        assert_eq!(Polytope::empty("nothing").w_range(), None);
    }

    #[test]
    fn test_face_edges_wrap() {
        let face = Face::new(vec![4, 5, 6]);
        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges, vec![(4, 5), (5, 6), (6, 4)]);
    }

    #[test]
    fn test_description_round_trip() {
        let p = square_pyramid_cell().unwrap();
        let text = ron::to_string(&p.to_description()).unwrap();
        let parsed = PolytopeDescription::from_ron_str(&text).unwrap();
        assert_eq!(parsed.to_polytope().unwrap(), p);
    }

    #[test]
    fn test_description_rejects_bad_indices() {
        let text = "(name: \"broken\", vertices: [(0.0, 0.0, 0.0, 0.0)], faces: [[0, 0, 5]], cells: [[0]])";
        let description = PolytopeDescription::from_ron_str(text).unwrap();
        assert!(matches!(description.build(), Err(GeometryError::MalformedShape(_))));
    }

    #[test]
    fn test_closure_provider() {
        let provider = || square_pyramid_cell();
        assert_eq!(provider.build().unwrap().cell_count(), 1);
    }
}
