//! Cross-sections of a polytope by a hyperplane of constant w
//!
//! Every cell is cut separately. Each face of the cell contributes the
//! points where its edges cross the hyperplane; a vertex lying exactly on
//! the hyperplane counts once per face. The crossings of one cell are then
//! joined into a polygon loop using the face segments, so neighboring
//! slice points are neighbors in the loop.
//!
//! A cell lying entirely in the hyperplane has no single loop; its slice is
//! the cell itself, drawn as its faces.

use std::collections::HashMap;

use anakata_core::Polytope;
use anakata_math::{PlaneRotations, Vec3, Vec4};

/// The crossing points one face contributes to its cell's slice
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSegment {
    pub face: usize,
    /// Usually two points; one when the face only touches the hyperplane,
    /// all of its vertices when it lies in it
    pub points: Vec<Vec3>,
}

/// The slice of one cell: an ordered polygon loop, possibly empty
#[derive(Clone, Debug, PartialEq)]
pub struct SlicePolygon {
    pub cell: usize,
    /// Distinct slice points in loop order, or in first-seen order when
    /// the cell lies in the hyperplane
    pub points: Vec<Vec3>,
    pub segments: Vec<FaceSegment>,
    /// Every vertex of the cell lies in the hyperplane; each segment is
    /// then a whole face loop
    pub in_plane: bool,
}

impl SlicePolygon {
    fn empty(cell: usize) -> Self {
        Self {
            cell,
            points: Vec::new(),
            segments: Vec::new(),
            in_plane: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn centroid(&self) -> Vec3 {
        centroid(&self.points)
    }

    /// Newell normal of the loop (not normalized; zero when degenerate or
    /// in the hyperplane)
    pub fn normal(&self) -> Vec3 {
        if self.in_plane {
            return Vec3::ZERO;
        }
        newell_normal(&self.points)
    }

    /// The loops that make up this slice, with the face each one shows
    ///
    /// A cut cell gives its single loop, tagged with the cell index. A cell
    /// in the hyperplane gives each of its faces.
    pub fn outlines(&self) -> Vec<(usize, &[Vec3])> {
        if self.in_plane {
            self.segments.iter().map(|s| (s.face, s.points.as_slice())).collect()
        } else if self.points.is_empty() {
            Vec::new()
        } else {
            vec![(self.cell, self.points.as_slice())]
        }
    }
}

/// The slice of every cell of a polytope at one w value
#[derive(Clone, Debug, PartialEq)]
pub struct CrossSection {
    pub w: f32,
    /// One entry per cell, in cell order
    pub polygons: Vec<SlicePolygon>,
}

impl CrossSection {
    /// Cells that intersect the hyperplane
    pub fn non_empty(&self) -> impl Iterator<Item = &SlicePolygon> {
        self.polygons.iter().filter(|p| !p.is_empty())
    }

    /// Whether no cell intersects the hyperplane
    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(SlicePolygon::is_empty)
    }
}

/// Where a slice point comes from; identical keys give identical points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Crossing {
    Vertex(usize),
    /// Edge with endpoints in ascending order
    Edge(usize, usize),
}

fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    let sum = points.iter().fold(Vec3::ZERO, |acc, &p| acc + p);
    sum / points.len() as f32
}

fn newell_normal(points: &[Vec3]) -> Vec3 {
    let c = centroid(points);
    let n = points.len();
    (0..n).fold(Vec3::ZERO, |acc, i| {
        acc + (points[i] - c).cross(points[(i + 1) % n] - c)
    })
}

/// Computes cross-sections, reusing its scratch buffers between calls
#[derive(Clone, Debug, Default)]
pub struct CrossSectioner {
    rotated: Vec<Vec4>,
    distances: Vec<f32>,
}

impl CrossSectioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice the polytope as stored, at `w`
    ///
    /// Cells entirely on one side of the hyperplane produce empty polygons.
    pub fn slice(&mut self, polytope: &Polytope, w: f32) -> CrossSection {
        self.slice_vertices(polytope, polytope.vertices(), w)
    }

    /// Rotate the polytope first, then slice it at `w`
    pub fn slice_rotated(&mut self, polytope: &Polytope, rotations: &PlaneRotations, w: f32) -> CrossSection {
        let mut rotated = std::mem::take(&mut self.rotated);
        rotated.clear();
        rotated.extend(polytope.vertices().iter().map(|&v| rotations.apply(v)));
        let section = self.slice_vertices(polytope, &rotated, w);
        self.rotated = rotated;
        section
    }

    fn slice_vertices(&mut self, polytope: &Polytope, vertices: &[Vec4], w: f32) -> CrossSection {
        self.distances.clear();
        self.distances.extend(vertices.iter().map(|v| v.w - w));
        let d = &self.distances;

        let point = |key: Crossing| -> Vec3 {
            match key {
                Crossing::Vertex(i) => vertices[i].xyz(),
                Crossing::Edge(a, b) => {
                    let t = d[a] / (d[a] - d[b]);
                    vertices[a].lerp(vertices[b], t).xyz()
                }
            }
        };

        let mut polygons = Vec::with_capacity(polytope.cell_count());
        for cell in 0..polytope.cell_count() {
            let mut keys: Vec<Crossing> = Vec::new();
            let mut slot: HashMap<Crossing, usize> = HashMap::new();
            let mut segments = Vec::new();
            let mut links = Vec::new();
            let mut in_plane = true;

            for (face_index, face) in polytope.cell_faces(cell) {
                in_plane &= face.vertices.iter().all(|&v| d[v] == 0.0);
                let crossings = face_crossings(&face.vertices, d);
                if crossings.is_empty() {
                    continue;
                }
                let ids: Vec<usize> = crossings
                    .iter()
                    .map(|&key| {
                        *slot.entry(key).or_insert_with(|| {
                            keys.push(key);
                            keys.len() - 1
                        })
                    })
                    .collect();
                if let [a, b] = ids[..] {
                    if a != b {
                        links.push((a, b));
                    }
                }
                segments.push(FaceSegment {
                    face: face_index,
                    points: crossings.into_iter().map(point).collect(),
                });
            }

            if keys.is_empty() {
                polygons.push(SlicePolygon::empty(cell));
                continue;
            }
            let points: Vec<Vec3> = keys.iter().map(|&k| point(k)).collect();
            if in_plane {
                polygons.push(SlicePolygon {
                    cell,
                    points,
                    segments,
                    in_plane,
                });
                continue;
            }
            let order = chain_loop(points.len(), &links).unwrap_or_else(|| angular_order(&points));
            polygons.push(SlicePolygon {
                cell,
                points: order.into_iter().map(|i| points[i]).collect(),
                segments,
                in_plane,
            });
        }

        orient_outward(&mut polygons);
        log::debug!(
            "Sliced '{}' at w = {}: {} of {} cells intersect",
            polytope.name(),
            w,
            polygons.iter().filter(|p| !p.is_empty()).count(),
            polygons.len()
        );
        CrossSection { w, polygons }
    }
}

/// Crossings of one face loop, in loop order
fn face_crossings(face: &[usize], d: &[f32]) -> Vec<Crossing> {
    let n = face.len();
    let mut crossings = Vec::new();
    for i in 0..n {
        let (a, b) = (face[i], face[(i + 1) % n]);
        if d[a] == 0.0 && !crossings.contains(&Crossing::Vertex(a)) {
            crossings.push(Crossing::Vertex(a));
        }
        if (d[a] < 0.0 && d[b] > 0.0) || (d[a] > 0.0 && d[b] < 0.0) {
            crossings.push(Crossing::Edge(a.min(b), a.max(b)));
        }
    }
    crossings
}

/// Walk the segment graph as a single cycle through every point
fn chain_loop(count: usize, links: &[(usize, usize)]) -> Option<Vec<usize>> {
    if count < 3 {
        return Some((0..count).collect());
    }
    let mut neighbors = vec![Vec::with_capacity(2); count];
    for &(a, b) in links {
        if !neighbors[a].contains(&b) {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }
    if neighbors.iter().any(|n| n.len() != 2) {
        return None;
    }

    let mut order = Vec::with_capacity(count);
    let (mut prev, mut current) = (usize::MAX, 0);
    loop {
        order.push(current);
        let next = if neighbors[current][0] != prev { neighbors[current][0] } else { neighbors[current][1] };
        prev = current;
        current = next;
        if current == 0 || order.len() > count {
            break;
        }
    }
    (order.len() == count).then_some(order)
}

/// Order points by angle around their centroid, in their best-fit plane
fn angular_order(points: &[Vec3]) -> Vec<usize> {
    let c = centroid(points);
    let u = (points[0] - c).normalized();
    let normal = points
        .iter()
        .map(|&p| u.cross(p - c))
        .fold(Vec3::ZERO, |best, n| if n.length() > best.length() { n } else { best })
        .normalized();

    let mut order: Vec<usize> = (0..points.len()).collect();
    if normal == Vec3::ZERO {
        // collinear: order along the line
        order.sort_by(|&a, &b| (points[a] - c).dot(u).total_cmp(&(points[b] - c).dot(u)));
        return order;
    }
    let v = normal.cross(u);
    let angle = |i: usize| {
        let r = points[i] - c;
        r.dot(v).atan2(r.dot(u))
    };
    order.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    order
}

/// Wind every polygon so its normal points away from the section's center
///
/// The faces of a cell in the hyperplane are wound away from that cell's
/// center instead.
fn orient_outward(polygons: &mut [SlicePolygon]) {
    let all: Vec<Vec3> = polygons.iter().flat_map(|p| p.points.iter().copied()).collect();
    let center = centroid(&all);
    for polygon in polygons.iter_mut().filter(|p| p.in_plane) {
        let inner = polygon.centroid();
        for segment in polygon.segments.iter_mut().filter(|s| s.points.len() >= 3) {
            let outward = centroid(&segment.points) - inner;
            if newell_normal(&segment.points).dot(outward) < 0.0 {
                segment.points[1..].reverse();
            }
        }
    }
    for polygon in polygons.iter_mut().filter(|p| !p.in_plane && p.len() >= 3) {
        let outward = polygon.centroid() - center;
        if polygon.normal().dot(outward) < 0.0 {
            polygon.points[1..].reverse();
        }
    }
}

/// The w value of an animated slicing hyperplane
///
/// [`shift`](WSlice::shift) moves it at a constant speed and bounces it
/// between two bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WSlice {
    pub value: f32,
    /// `1.0` when moving toward `max`, `-1.0` toward `min`
    pub direction: f32,
}

impl Default for WSlice {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl WSlice {
    pub fn new(value: f32) -> Self {
        Self { value, direction: 1.0 }
    }

    /// Advance by `speed * elapsed`, reflecting at `min` and `max`
    ///
    /// Reaching a bound inverts the direction. Long steps may bounce
    /// several times.
    pub fn shift(&mut self, speed: f32, min: f32, max: f32, elapsed: f32) {
        let span = max - min;
        if !(span > 0.0) {
            self.value = min;
            return;
        }
        // Unfold the bounce into a loop of length 2 * span
        let offset = (self.value - min).clamp(0.0, span);
        let unfolded = if self.direction >= 0.0 { offset } else { 2.0 * span - offset };
        let moved = (unfolded + speed * elapsed).rem_euclid(2.0 * span);
        if moved < span {
            self.value = min + moved;
            self.direction = 1.0;
        } else {
            self.value = min + (2.0 * span - moved);
            self.direction = -1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anakata_core::regular;
    use anakata_math::{PlaneAngles, RotationPlane, RotationState};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;

    fn key(p: Vec3) -> (i32, i32, i32) {
        ((p.x * 1000.0).round() as i32, (p.y * 1000.0).round() as i32, (p.z * 1000.0).round() as i32)
    }

    #[test]
    fn test_tesseract_center_slice_is_a_cube() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let section = CrossSectioner::new().slice(&tesseract, 0.0);
        assert_eq!(section.polygons.len(), 8);

        // the w = +1 and w = -1 cubes are parallel to the hyperplane
        assert!(section.polygons[0].is_empty());
        assert!(section.polygons[7].is_empty());

        let squares: Vec<_> = section.non_empty().collect();
        assert_eq!(squares.len(), 6);
        for square in &squares {
            assert_eq!(square.len(), 4);
            assert_eq!(square.segments.len(), 4);
            assert!(square.segments.iter().all(|s| s.points.len() == 2));
        }

        // closed boundary: every polygon edge is shared by exactly two polygons
        let mut edges: HashMap<((i32, i32, i32), (i32, i32, i32)), usize> = HashMap::new();
        for square in &squares {
            let n = square.len();
            for i in 0..n {
                let (a, b) = (key(square.points[i]), key(square.points[(i + 1) % n]));
                *edges.entry(if a < b { (a, b) } else { (b, a) }).or_default() += 1;
            }
        }
        assert_eq!(edges.len(), 12);
        assert!(edges.values().all(|&n| n == 2));
    }

    #[test]
    fn test_polygons_are_loops_facing_outward() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let section = CrossSectioner::new().slice(&tesseract, 0.3);
        for polygon in section.non_empty() {
            let n = polygon.len();
            for i in 0..n {
                // consecutive points of a square differ in exactly one coordinate
                let d = polygon.points[(i + 1) % n] - polygon.points[i];
                let moved = [d.x, d.y, d.z].iter().filter(|c| c.abs() > EPSILON).count();
                assert_eq!(moved, 1);
            }
            assert!(polygon.normal().dot(polygon.centroid()) > 0.0);
        }
    }

    #[test]
    fn test_outside_range_is_empty() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let mut sectioner = CrossSectioner::new();
        for w in [-1.5, 1.01, 3.0] {
            let section = sectioner.slice(&tesseract, w);
            assert!(section.is_empty(), "w = {}", w);
            assert_eq!(section.polygons.len(), 8);
        }
    }

    #[test]
    fn test_cell_in_plane_keeps_its_faces() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let mut sectioner = CrossSectioner::new();
        for (w, flat, far) in [(1.0, 0, 7), (-1.0, 7, 0)] {
            let section = sectioner.slice(&tesseract, w);
            assert!(section.polygons[far].is_empty(), "w = {}", w);

            let cube = &section.polygons[flat];
            assert!(cube.in_plane);
            assert_eq!(cube.len(), 8);
            assert_eq!(cube.normal(), Vec3::ZERO);
            let outlines = cube.outlines();
            assert_eq!(outlines.len(), 6);
            for (_, face) in &outlines {
                assert_eq!(face.len(), 4);
                // every face of the cube is planar: one coordinate is fixed at +-1
                let fixed = (0..3)
                    .filter(|&axis| {
                        let c = |p: &Vec3| [p.x, p.y, p.z][axis];
                        face.iter().all(|p| (c(p) - c(&face[0])).abs() < EPSILON && c(p).abs() > 1.0 - EPSILON)
                    })
                    .count();
                assert_eq!(fixed, 1, "not a cube face: {:?}", face);
                assert!(newell_normal(face).dot(centroid(face)) > 0.0);
            }

            // the side cells touch the hyperplane in one square each
            let sides: Vec<_> = section.non_empty().filter(|p| !p.in_plane).collect();
            assert_eq!(sides.len(), 6);
            for side in sides {
                assert_eq!(side.len(), 4);
                assert_eq!(side.outlines().len(), 1);
            }
        }
    }

    #[test]
    fn test_vertex_on_plane_counts_once() {
        let cell16 = regular::hexadecachoron(1.0).unwrap();
        // the hyperplane w = 1 only touches vertex 7
        let section = CrossSectioner::new().slice(&cell16, 1.0);
        for polygon in section.non_empty() {
            assert_eq!(polygon.len(), 1);
            assert!(polygon.segments.iter().all(|s| s.points.len() == 1));
        }
        assert_eq!(section.non_empty().count(), 8);
    }

    #[test]
    fn test_pentachoron_slices_are_triangles() {
        let pentachoron = regular::pentachoron(1.0).unwrap();
        let section = CrossSectioner::new().slice(&pentachoron, 0.5);
        // the four cells through the apex are cut into triangles
        let sizes: Vec<usize> = section.non_empty().map(SlicePolygon::len).collect();
        assert_eq!(sizes, vec![3, 3, 3, 3]);
        for polygon in section.non_empty() {
            assert!(polygon.points.iter().all(|p| p.length() < 2.0));
        }
    }

    #[test]
    fn test_slice_rotated_matches_identity_slice() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let mut sectioner = CrossSectioner::new();
        let identity = sectioner.slice_rotated(&tesseract, &RotationState::new().rotations(), 0.2);
        assert_eq!(identity, sectioner.slice(&tesseract, 0.2));
    }

    #[test]
    fn test_slice_rotated_quarter_turn() {
        // after a quarter turn in XW the hyperplane cuts the original x = 0
        // and the former w extent shows up along x
        let tesseract = regular::tesseract(2.0).unwrap();
        let state = RotationState::from_angles(PlaneAngles::single(RotationPlane::XW, FRAC_PI_2));
        let section = CrossSectioner::new().slice_rotated(&tesseract, &state.rotations(), 0.0);
        assert_eq!(section.non_empty().count(), 6);
        for polygon in section.non_empty() {
            assert_eq!(polygon.len(), 4);
            for p in &polygon.points {
                let extent = p.x.abs().max(p.y.abs()).max(p.z.abs());
                assert!((extent - 1.0).abs() < EPSILON, "off the unit cube: {:?}", p);
            }
        }
        // the w = +1 and w = -1 cubes are now the ones cut face-on
        assert!(!section.polygons[0].is_empty());
        assert!(!section.polygons[7].is_empty());
    }

    #[test]
    fn test_shift_reflects_at_bound() {
        let mut slice = WSlice::new(0.9);
        slice.shift(1.0, -1.0, 1.0, 0.3);
        assert!((slice.value - 0.8).abs() < EPSILON, "got {}", slice.value);
        assert_eq!(slice.direction, -1.0);
    }

    #[test]
    fn test_shift_reflects_at_min() {
        let mut slice = WSlice { value: -0.5, direction: -1.0 };
        slice.shift(2.0, -1.0, 1.0, 0.5);
        assert!((slice.value - -0.5).abs() < EPSILON);
        assert_eq!(slice.direction, 1.0);
    }

    #[test]
    fn test_shift_multiple_bounces_and_degenerate_range() {
        let mut slice = WSlice::new(0.0);
        // 9 units from 0: up to 1, down to -1, up to 1, down to -1, then 0
        slice.shift(3.0, -1.0, 1.0, 3.0);
        assert!(slice.value.abs() < EPSILON, "got {}", slice.value);
        assert_eq!(slice.direction, 1.0);

        let mut stuck = WSlice::new(0.3);
        stuck.shift(1.0, 0.5, 0.5, 1.0);
        assert_eq!(stuck.value, 0.5);
    }
}
