//! Rotations in the six coordinate planes of 4-space
//!
//! In 4D, rotations happen in planes rather than around axes. There are
//! six coordinate planes: XY, XZ, XW, YZ, YW, ZW. A [`RotationState`] keeps
//! one angle per plane and applies them as six sequential Givens rotations
//! in that fixed order. 4D rotations do not commute, so the order is part
//! of the contract.

use std::f32::consts::TAU;
use std::ops::{Index, IndexMut};

use serde::{Serialize, Deserialize};

use crate::Vec4;

/// The 6 rotation planes in 4D space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPlane {
    /// XY plane - standard yaw
    XY,
    /// XZ plane - standard pitch
    XZ,
    /// XW plane - ana-kata rotation affecting X
    XW,
    /// YZ plane - standard roll
    YZ,
    /// YW plane - ana-kata rotation affecting Y
    YW,
    /// ZW plane - ana-kata rotation affecting Z
    ZW,
}

impl RotationPlane {
    /// All planes, in the order their rotations are applied
    pub const ALL: [RotationPlane; 6] = [
        RotationPlane::XY,
        RotationPlane::XZ,
        RotationPlane::XW,
        RotationPlane::YZ,
        RotationPlane::YW,
        RotationPlane::ZW,
    ];

    /// The two coordinate indices (0=X, 1=Y, 2=Z, 3=W) mixed by this plane
    #[inline]
    pub const fn axes(self) -> (usize, usize) {
        match self {
            RotationPlane::XY => (0, 1),
            RotationPlane::XZ => (0, 2),
            RotationPlane::XW => (0, 3),
            RotationPlane::YZ => (1, 2),
            RotationPlane::YW => (1, 3),
            RotationPlane::ZW => (2, 3),
        }
    }

    /// Lowercase plane name, e.g. `"xw"`
    pub const fn name(self) -> &'static str {
        match self {
            RotationPlane::XY => "xy",
            RotationPlane::XZ => "xz",
            RotationPlane::XW => "xw",
            RotationPlane::YZ => "yz",
            RotationPlane::YW => "yw",
            RotationPlane::ZW => "zw",
        }
    }
}

/// One scalar per rotation plane
///
/// Used both for the angles of a [`RotationState`] and for per-plane
/// angular speeds. Missing planes deserialize as zero, so a partial delta
/// map such as `{ xw = 0.001 }` rotates only in XW.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneAngles {
    pub xy: f32,
    pub xz: f32,
    pub xw: f32,
    pub yz: f32,
    pub yw: f32,
    pub zw: f32,
}

impl PlaneAngles {
    pub const ZERO: Self = Self { xy: 0.0, xz: 0.0, xw: 0.0, yz: 0.0, yw: 0.0, zw: 0.0 };

    /// A value set for a single plane, zero elsewhere
    pub fn single(plane: RotationPlane, value: f32) -> Self {
        let mut angles = Self::ZERO;
        angles[plane] = value;
        angles
    }
}

impl Index<RotationPlane> for PlaneAngles {
    type Output = f32;

    fn index(&self, plane: RotationPlane) -> &f32 {
        match plane {
            RotationPlane::XY => &self.xy,
            RotationPlane::XZ => &self.xz,
            RotationPlane::XW => &self.xw,
            RotationPlane::YZ => &self.yz,
            RotationPlane::YW => &self.yw,
            RotationPlane::ZW => &self.zw,
        }
    }
}

impl IndexMut<RotationPlane> for PlaneAngles {
    fn index_mut(&mut self, plane: RotationPlane) -> &mut f32 {
        match plane {
            RotationPlane::XY => &mut self.xy,
            RotationPlane::XZ => &mut self.xz,
            RotationPlane::XW => &mut self.xw,
            RotationPlane::YZ => &mut self.yz,
            RotationPlane::YW => &mut self.yw,
            RotationPlane::ZW => &mut self.zw,
        }
    }
}

/// Wrap an angle into `[0, 2π)`
#[inline]
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Apply one Givens rotation to coordinates `a` and `b` of `p`
#[inline(always)]
fn givens(p: &mut [f32; 4], (a, b): (usize, usize), cos: f32, sin: f32) {
    let t = p[a];
    p[a] = p[a] * cos + p[b] * sin;
    p[b] = p[b] * cos - t * sin;
}

/// The orientation of the viewed object: six angles in radians
///
/// Each angle is held modulo 2π. The state has a single writer (the
/// animation driver calls [`rotate`](RotationState::rotate) once per frame)
/// and is read by every projection of that frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlaneAngles", into = "PlaneAngles")]
pub struct RotationState {
    angles: PlaneAngles,
}

impl RotationState {
    /// Create a state with every angle at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state from initial angles (wrapped into `[0, 2π)`)
    pub fn from_angles(angles: PlaneAngles) -> Self {
        let mut state = Self::new();
        for plane in RotationPlane::ALL {
            state.set_angle(plane, angles[plane]);
        }
        state
    }

    /// All six angles
    #[inline]
    pub fn angles(&self) -> &PlaneAngles {
        &self.angles
    }

    /// Angle for one plane
    #[inline]
    pub fn angle(&self, plane: RotationPlane) -> f32 {
        self.angles[plane]
    }

    /// Set the angle for one plane (wrapped into `[0, 2π)`)
    pub fn set_angle(&mut self, plane: RotationPlane, angle: f32) {
        self.angles[plane] = wrap_angle(angle);
    }

    /// Advance every plane by `delta * elapsed_ms`
    ///
    /// `delta` holds radians per millisecond; planes left at zero do not move.
    pub fn rotate(&mut self, delta: &PlaneAngles, elapsed_ms: f32) {
        for plane in RotationPlane::ALL {
            self.angles[plane] = wrap_angle(self.angles[plane] + delta[plane] * elapsed_ms);
        }
    }

    /// Precompute the (cos, sin) pair of every plane for this frame
    pub fn rotations(&self) -> PlaneRotations {
        let mut pairs = [(1.0, 0.0); 6];
        for (pair, plane) in pairs.iter_mut().zip(RotationPlane::ALL) {
            let (sin, cos) = self.angles[plane].sin_cos();
            *pair = (cos, sin);
        }
        PlaneRotations { pairs }
    }

    /// Rotate a point without caching the trigonometry
    ///
    /// Produces exactly the same bits as `self.rotations().apply(p)`.
    pub fn rotate_point(&self, p: Vec4) -> Vec4 {
        let mut c = p.to_array();
        for plane in RotationPlane::ALL {
            let (sin, cos) = self.angles[plane].sin_cos();
            givens(&mut c, plane.axes(), cos, sin);
        }
        Vec4::from(c)
    }
}

impl From<PlaneAngles> for RotationState {
    fn from(angles: PlaneAngles) -> Self {
        Self::from_angles(angles)
    }
}

impl From<RotationState> for PlaneAngles {
    fn from(state: RotationState) -> Self {
        state.angles
    }
}

/// The six (cos, sin) pairs of one frame
///
/// Every point projected in a frame shares the same trigonometry, so the
/// projector computes these once and reuses them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneRotations {
    pairs: [(f32, f32); 6],
}

impl Default for PlaneRotations {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PlaneRotations {
    /// No rotation in any plane
    pub const IDENTITY: Self = Self { pairs: [(1.0, 0.0); 6] };

    /// The (cos, sin) pair of one plane
    #[inline]
    pub fn pair(&self, plane: RotationPlane) -> (f32, f32) {
        let slot = RotationPlane::ALL
            .iter()
            .position(|p| *p == plane)
            .unwrap_or(0);
        self.pairs[slot]
    }

    /// Apply the six rotations to a point in the fixed plane order
    #[inline]
    pub fn apply(&self, p: Vec4) -> Vec4 {
        let mut c = p.to_array();
        for (&(cos, sin), plane) in self.pairs.iter().zip(RotationPlane::ALL) {
            givens(&mut c, plane.axes(), cos, sin);
        }
        Vec4::from(c)
    }

    /// Compose the rotations into a 4x4 matrix for GPU upload
    ///
    /// Column-major: column `i` is the image of basis vector `i`.
    pub fn to_matrix(&self) -> [[f32; 4]; 4] {
        [
            self.apply(Vec4::X).to_array(),
            self.apply(Vec4::Y).to_array(),
            self.apply(Vec4::Z).to_array(),
            self.apply(Vec4::W).to_array(),
        ]
    }
}
