//! Regular convex 4-polytopes as literal tables
//!
//! The tables are validated like any other input so a typo in an index
//! shows up as a `MalformedShape` error instead of garbage geometry.

use anakata_math::Vec4;

use crate::error::GeometryError;
use crate::polytope::Polytope;

const TESSERACT_VERTICES: [[f32; 4]; 16] = [
    [ 1.0,  1.0,  1.0,  1.0], // 0
    [ 1.0,  1.0, -1.0,  1.0], // 1
    [ 1.0, -1.0, -1.0,  1.0], // 2
    [ 1.0, -1.0,  1.0,  1.0], // 3
    [-1.0,  1.0,  1.0,  1.0], // 4
    [-1.0,  1.0, -1.0,  1.0], // 5
    [-1.0, -1.0, -1.0,  1.0], // 6
    [-1.0, -1.0,  1.0,  1.0], // 7
    [ 1.0,  1.0,  1.0, -1.0], // 8
    [ 1.0,  1.0, -1.0, -1.0], // 9
    [ 1.0, -1.0, -1.0, -1.0], // 10
    [ 1.0, -1.0,  1.0, -1.0], // 11
    [-1.0,  1.0,  1.0, -1.0], // 12
    [-1.0,  1.0, -1.0, -1.0], // 13
    [-1.0, -1.0, -1.0, -1.0], // 14
    [-1.0, -1.0,  1.0, -1.0], // 15
];

const TESSERACT_FACES: [&[usize]; 24] = [
    // w = +1 cube
    &[0, 1, 2, 3],
    &[0, 4, 5, 1],
    &[0, 3, 7, 4],
    &[3, 2, 6, 7],
    &[1, 5, 6, 2],
    &[4, 7, 6, 5],
    // faces spanning w
    &[0, 1, 9, 8],
    &[4, 5, 13, 12],
    &[3, 2, 10, 11],
    &[7, 6, 14, 15],
    &[0, 3, 11, 8],
    &[4, 7, 15, 12],
    &[1, 2, 10, 9],
    &[5, 6, 14, 13],
    &[0, 4, 12, 8],
    &[1, 5, 13, 9],
    &[2, 6, 14, 10],
    &[3, 7, 15, 11],
    // w = -1 cube
    &[11, 10, 9, 8],
    &[9, 13, 12, 8],
    &[12, 15, 11, 8],
    &[15, 14, 10, 11],
    &[10, 14, 13, 9],
    &[13, 14, 15, 12],
];

const TESSERACT_CELLS: [&[usize]; 8] = [
    &[0, 1, 2, 3, 4, 5],
    &[0, 6, 12, 8, 10, 18],
    &[1, 6, 14, 7, 15, 19],
    &[4, 12, 16, 13, 15, 22],
    &[3, 8, 16, 9, 17, 21],
    &[2, 10, 17, 11, 14, 20],
    &[5, 7, 13, 9, 11, 23],
    &[18, 19, 20, 21, 22, 23],
];

const PENTACHORON_FACES: [&[usize]; 10] = [
    &[1, 2, 3],
    &[0, 1, 2],
    &[0, 1, 3],
    &[0, 3, 2],
    &[0, 4, 1],
    &[0, 2, 4],
    &[0, 3, 4],
    &[2, 4, 3],
    &[1, 3, 4],
    &[1, 4, 2],
];

const PENTACHORON_CELLS: [&[usize]; 5] = [
    &[0, 1, 2, 3],
    &[1, 5, 4, 9],
    &[3, 6, 5, 7],
    &[2, 4, 6, 8],
    &[0, 7, 8, 9],
];

const HEXADECACHORON_VERTICES: [[f32; 4]; 8] = [
    [-1.0, 0.0, 0.0, 0.0],
    [ 1.0, 0.0, 0.0, 0.0],
    [0.0, -1.0, 0.0, 0.0],
    [0.0,  1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0, 0.0],
    [0.0, 0.0,  1.0, 0.0],
    [0.0, 0.0, 0.0, -1.0],
    [0.0, 0.0, 0.0,  1.0],
];

const HEXADECACHORON_FACES: [&[usize]; 32] = [
    &[0, 2, 4], &[0, 2, 5], &[0, 2, 6], &[0, 2, 7],
    &[0, 3, 4], &[0, 3, 5], &[0, 3, 6], &[0, 3, 7],
    &[0, 4, 6], &[0, 4, 7], &[0, 5, 6], &[0, 5, 7],
    &[1, 2, 4], &[1, 2, 5], &[1, 2, 6], &[1, 2, 7],
    &[1, 3, 4], &[1, 3, 5], &[1, 3, 6], &[1, 3, 7],
    &[1, 4, 6], &[1, 4, 7], &[1, 5, 6], &[1, 5, 7],
    &[2, 4, 6], &[2, 4, 7], &[2, 5, 6], &[2, 5, 7],
    &[3, 4, 6], &[3, 4, 7], &[3, 5, 6], &[3, 5, 7],
];

// One cell per choice of sign on each axis
const HEXADECACHORON_CELLS: [&[usize]; 16] = [
    &[0, 2, 8, 24],
    &[0, 3, 9, 25],
    &[1, 2, 10, 26],
    &[1, 3, 11, 27],
    &[4, 6, 8, 28],
    &[4, 7, 9, 29],
    &[5, 6, 10, 30],
    &[5, 7, 11, 31],
    &[12, 14, 20, 24],
    &[12, 15, 21, 25],
    &[13, 14, 22, 26],
    &[13, 15, 23, 27],
    &[16, 18, 20, 28],
    &[16, 19, 21, 29],
    &[17, 18, 22, 30],
    &[17, 19, 23, 31],
];

/// Scale a unit table
fn scaled(table: &[[f32; 4]], factor: f32) -> Vec<[f32; 4]> {
    table
        .iter()
        .map(|&v| (Vec4::from(v) * factor).to_array())
        .collect()
}

/// A tesseract (8-cell) centered at the origin
///
/// `size` is the full edge length; vertices sit at ±size/2 on every axis.
/// 16 vertices, 24 square faces, 8 cubic cells.
pub fn tesseract(size: f32) -> Result<Polytope, GeometryError> {
    Polytope::from_tables(
        "tesseract",
        &scaled(&TESSERACT_VERTICES, size * 0.5),
        &TESSERACT_FACES,
        &TESSERACT_CELLS,
    )
}

/// A pentachoron (5-cell, 4-simplex)
///
/// 5 vertices, 10 triangular faces, 5 tetrahedral cells. The base
/// tetrahedron lies at `w = -scale/√5` and the apex on the +w axis.
pub fn pentachoron(scale: f32) -> Result<Polytope, GeometryError> {
    let root5 = 5f32.sqrt();
    let low = -1.0 / root5;
    let apex = root5 - 1.0 / root5;
    let unit = [
        [ 1.0,  1.0,  1.0, low],
        [ 1.0, -1.0, -1.0, low],
        [-1.0,  1.0, -1.0, low],
        [-1.0, -1.0,  1.0, low],
        [0.0, 0.0, 0.0, apex],
    ];
    Polytope::from_tables(
        "pentachoron",
        &scaled(&unit, scale),
        &PENTACHORON_FACES,
        &PENTACHORON_CELLS,
    )
}

/// A hexadecachoron (16-cell, 4-orthoplex)
///
/// Vertices at ±scale on each axis; 32 triangular faces, 16 tetrahedral
/// cells.
pub fn hexadecachoron(scale: f32) -> Result<Polytope, GeometryError> {
    Polytope::from_tables(
        "hexadecachoron",
        &scaled(&HEXADECACHORON_VERTICES, scale),
        &HEXADECACHORON_FACES,
        &HEXADECACHORON_CELLS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Every face of a closed 3-manifold boundary is shared by exactly two cells
    fn assert_closed(p: &Polytope) {
        let mut uses: HashMap<usize, usize> = HashMap::new();
        for cell in p.cells() {
            for &f in &cell.faces {
                *uses.entry(f).or_default() += 1;
            }
        }
        assert_eq!(uses.len(), p.face_count(), "{} has unused faces", p.name());
        for (face, count) in uses {
            assert_eq!(count, 2, "{} face {} used {} times", p.name(), face, count);
        }
    }

    #[test]
    fn test_tesseract_counts() {
        let t = tesseract(2.0).unwrap();
        assert_eq!(t.vertex_count(), 16);
        assert_eq!(t.face_count(), 24);
        assert_eq!(t.cell_count(), 8);
        assert_eq!(t.edges().len(), 32);
        assert_eq!(t.w_range(), Some((-1.0, 1.0)));
        assert_closed(&t);
    }

    #[test]
    fn test_tesseract_size_scales() {
        let t = tesseract(4.0).unwrap();
        assert_eq!(t.vertex(0), Vec4::new(2.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn test_tesseract_cells_are_cubes() {
        let t = tesseract(2.0).unwrap();
        for cell in 0..t.cell_count() {
            assert_eq!(t.cell_vertex_indices(cell).len(), 8);
        }
    }

    #[test]
    fn test_pentachoron_counts() {
        let p = pentachoron(1.0).unwrap();
        assert_eq!(p.vertex_count(), 5);
        assert_eq!(p.face_count(), 10);
        assert_eq!(p.cell_count(), 5);
        assert_eq!(p.edges().len(), 10);
        assert_closed(&p);
    }

    #[test]
    fn test_pentachoron_is_regular() {
        let p = pentachoron(1.0).unwrap();
        let edges = p.edges();
        let first = (p.vertex(edges[0][0]) - p.vertex(edges[0][1])).length();
        for [a, b] in edges {
            let len = (p.vertex(a) - p.vertex(b)).length();
            assert!((len - first).abs() < 1e-4, "edge {}-{} has length {}", a, b, len);
        }
    }

    #[test]
    fn test_hexadecachoron_counts() {
        let h = hexadecachoron(1.0).unwrap();
        assert_eq!(h.vertex_count(), 8);
        assert_eq!(h.face_count(), 32);
        assert_eq!(h.cell_count(), 16);
        assert_eq!(h.edges().len(), 24);
        assert_closed(&h);
        for cell in 0..h.cell_count() {
            assert_eq!(h.cell_vertex_indices(cell).len(), 4);
        }
    }
}
