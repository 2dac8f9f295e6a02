//! Vertex coloring
//!
//! A [`ColorAssigner`] maps the identity of an emitted vertex (its cell,
//! face, original 4D position and projected 3D position) to an RGB color
//! from a [`Palette`]. Every strategy is a pure function of those inputs.

use std::collections::BTreeMap;

use anakata_core::Polytope;
use anakata_math::{Vec3, Vec4};
use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

/// Name of the palette used when none (or an unknown one) is requested
pub const DEFAULT_PALETTE: &str = "material";

/// Linear RGB color, each channel in `[0, 1]`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode a `0xRRGGBB` color
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        c.to_array()
    }
}

/// An ordered list of colors, indexed modulo its length
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn from_hex(colors: &[u32]) -> Self {
        Self::new(colors.iter().map(|&c| Rgb::from_hex(c)).collect())
    }

    /// The eight cell colors of the classic tesseract view
    pub fn material() -> Self {
        Self::from_hex(&[
            0xc3e88d, 0x009688, 0x73d1c8, 0x89ddf3, 0x82aaff, 0x7986cb, 0xc792ea, 0xff5370,
        ])
    }

    /// Primary colors of the four axes
    pub fn axes() -> Self {
        Self::from_hex(&[0xff0000, 0x00ff00, 0x0000ff, 0xff00ff])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color at `index` wrapped modulo the palette length; white if empty
    #[inline]
    pub fn get(&self, index: usize) -> Rgb {
        if self.colors.is_empty() {
            Rgb::WHITE
        } else {
            self.colors[index % self.colors.len()]
        }
    }
}

/// Named palettes supplied by the host application
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteTable {
    palettes: BTreeMap<String, Palette>,
    fallback: Palette,
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PaletteTable {
    /// A table with the built-in palettes only
    pub fn builtin() -> Self {
        let mut palettes = BTreeMap::new();
        palettes.insert(DEFAULT_PALETTE.to_string(), Palette::material());
        palettes.insert("axes".to_string(), Palette::axes());
        palettes.insert("mono".to_string(), Palette::new(vec![Rgb::WHITE]));
        Self {
            palettes,
            fallback: Palette::material(),
        }
    }

    /// Add or replace a palette
    pub fn insert(&mut self, name: impl Into<String>, palette: Palette) {
        self.palettes.insert(name.into(), palette);
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    /// Look up a palette, falling back to the default for unknown names
    pub fn resolve(&self, name: &str) -> &Palette {
        match self.palettes.get(name) {
            Some(palette) => palette,
            None => {
                log::warn!("Unknown palette '{}', using '{}'", name, DEFAULT_PALETTE);
                self.palettes.get(DEFAULT_PALETTE).unwrap_or(&self.fallback)
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }
}

/// How palette entries are chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorStrategy {
    /// The first palette entry everywhere
    #[default]
    Uniform,
    /// Indexed by cell
    Cell,
    /// Indexed by face
    Face,
    /// Bucketed projected z
    Depth,
    /// Bucketed original w
    WDepth,
}

/// Picks a color for each emitted vertex
#[derive(Clone, Debug, PartialEq)]
pub struct ColorAssigner {
    strategy: ColorStrategy,
    palette: Palette,
    buckets: usize,
    depth_radius: f32,
    w_range: (f32, f32),
}

impl ColorAssigner {
    /// Create an assigner for one polytope
    ///
    /// Depth ranges are taken from the polytope: projected z is normalized
    /// over its bounding radius and w over its vertex w range. A `buckets`
    /// value of zero uses one bucket per palette entry.
    pub fn new(strategy: ColorStrategy, palette: Palette, polytope: &Polytope, buckets: usize) -> Self {
        Self {
            strategy,
            palette,
            buckets,
            depth_radius: polytope.bounding_radius(),
            w_range: polytope.w_range().unwrap_or((0.0, 0.0)),
        }
    }

    /// An assigner that paints everything with one color
    pub fn uniform(color: Rgb) -> Self {
        Self {
            strategy: ColorStrategy::Uniform,
            palette: Palette::new(vec![color]),
            buckets: 0,
            depth_radius: 0.0,
            w_range: (0.0, 0.0),
        }
    }

    #[inline]
    pub fn strategy(&self) -> ColorStrategy {
        self.strategy
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Whether colors change when the rotation changes
    #[inline]
    pub fn depends_on_projection(&self) -> bool {
        self.strategy == ColorStrategy::Depth
    }

    fn bucket_count(&self) -> usize {
        if self.buckets == 0 {
            self.palette.len().max(1)
        } else {
            self.buckets
        }
    }

    /// Map `t` in `[0, 1]` to a bucket index
    fn bucket(&self, t: f32) -> usize {
        let n = self.bucket_count();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        ((t * n as f32) as usize).min(n - 1)
    }

    /// Color for a vertex of `face` in `cell`
    pub fn color(&self, cell: usize, face: usize, original: Vec4, projected: Vec3) -> Rgb {
        match self.strategy {
            ColorStrategy::Uniform => self.palette.get(0),
            ColorStrategy::Cell => self.palette.get(cell),
            ColorStrategy::Face => self.palette.get(face),
            ColorStrategy::Depth => {
                let r = self.depth_radius;
                let t = if r > 0.0 { (projected.z + r) / (2.0 * r) } else { 0.0 };
                self.palette.get(self.bucket(t))
            }
            ColorStrategy::WDepth => {
                let (lo, hi) = self.w_range;
                let t = if hi > lo { (original.w - lo) / (hi - lo) } else { 0.0 };
                self.palette.get(self.bucket(t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anakata_core::regular;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex(0xff0000), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(Rgb::from_hex(0xffffff), Rgb::WHITE);
        let c = Rgb::from_hex(0x009688);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 150.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_palette_wraps() {
        let palette = Palette::axes();
        assert_eq!(palette.get(4), palette.get(0));
        assert_eq!(Palette::default().get(3), Rgb::WHITE);
    }

    #[test]
    fn test_cell_strategy_cycles_palette() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let palette = Palette::from_hex(&[0x111111, 0x222222, 0x333333]);
        let assigner = ColorAssigner::new(ColorStrategy::Cell, palette.clone(), &tesseract, 0);
        for cell in 0..tesseract.cell_count() {
            let c = assigner.color(cell, 0, Vec4::ZERO, Vec3::ZERO);
            assert_eq!(c, palette.get(cell % 3));
        }
    }

    #[test]
    fn test_face_and_uniform() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let palette = Palette::material();
        let face = ColorAssigner::new(ColorStrategy::Face, palette.clone(), &tesseract, 0);
        assert_eq!(face.color(0, 9, Vec4::ZERO, Vec3::ZERO), palette.get(1));
        let uniform = ColorAssigner::new(ColorStrategy::Uniform, palette.clone(), &tesseract, 0);
        assert_eq!(uniform.color(5, 9, Vec4::ZERO, Vec3::ZERO), palette.get(0));
    }

    #[test]
    fn test_w_depth_buckets() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let palette = Palette::axes();
        let assigner = ColorAssigner::new(ColorStrategy::WDepth, palette.clone(), &tesseract, 2);
        let low = assigner.color(0, 0, Vec4::new(0.0, 0.0, 0.0, -1.0), Vec3::ZERO);
        let high = assigner.color(0, 0, Vec4::new(0.0, 0.0, 0.0, 1.0), Vec3::ZERO);
        assert_eq!(low, palette.get(0));
        assert_eq!(high, palette.get(1));
    }

    #[test]
    fn test_depth_clamps_out_of_range() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let palette = Palette::material();
        let assigner = ColorAssigner::new(ColorStrategy::Depth, palette.clone(), &tesseract, 0);
        assert!(assigner.depends_on_projection());
        let far = assigner.color(0, 0, Vec4::ZERO, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(far, palette.get(7));
        let near = assigner.color(0, 0, Vec4::ZERO, Vec3::new(0.0, 0.0, -100.0));
        assert_eq!(near, palette.get(0));
    }

    #[test]
    fn test_deterministic() {
        let tesseract = regular::tesseract(2.0).unwrap();
        let assigner = ColorAssigner::new(ColorStrategy::Depth, Palette::material(), &tesseract, 4);
        let p = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(assigner.color(1, 2, Vec4::ZERO, p), assigner.color(1, 2, Vec4::ZERO, p));
    }

    #[test]
    fn test_strategy_serde_names() {
        let json_like = ron::to_string(&ColorStrategy::WDepth).unwrap();
        assert_eq!(json_like, "wDepth");
        let parsed: ColorStrategy = ron::from_str("cell").unwrap();
        assert_eq!(parsed, ColorStrategy::Cell);
    }

    #[test]
    fn test_unknown_palette_falls_back() {
        let table = PaletteTable::builtin();
        assert_eq!(table.resolve("no-such-palette"), &Palette::material());
        assert_eq!(table.resolve("axes"), &Palette::axes());
        assert!(table.names().any(|n| n == "mono"));
    }
}
