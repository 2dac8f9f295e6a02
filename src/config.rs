//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`ANAKATA_SECTION__KEY`)

use std::collections::BTreeMap;
use std::path::Path;

use anakata_core::{Polytope, ShapeTemplate};
use anakata_math::{PlaneAngles, ProjectionConfig, Vec3};
use anakata_render::{Channel, ColorAssigner, ColorStrategy, Palette, PaletteTable, TessellationConfig, DEFAULT_PALETTE};
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shape to build at startup
    #[serde(default)]
    pub shape: ShapeTemplate,
    /// Camera along the fourth axis
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Initial orientation and spin
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Vertex reuse, batch split and cell size
    #[serde(default)]
    pub tessellation: TessellationConfig,
    /// Palette and per-channel color strategies
    #[serde(default)]
    pub colors: ColorConfig,
    /// Which render channels are produced
    #[serde(default)]
    pub channels: ChannelConfig,
    /// Cross-section hyperplane
    #[serde(default)]
    pub slice: SliceConfig,
    /// Coordinate axes drawn next to the polytope
    #[serde(default)]
    pub axes: AxesConfig,
    /// Headless frame loop
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`ANAKATA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // ANAKATA_TESSELLATION__REUSE=none -> tessellation.reuse = "none"
        figment = figment.merge(Env::prefixed("ANAKATA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Rotation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Starting angle per plane, in radians
    pub angles: PlaneAngles,
    /// Radians per millisecond per plane; planes left out do not spin
    pub speed: PlaneAngles,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            angles: PlaneAngles::ZERO,
            speed: PlaneAngles {
                xw: 0.0005,
                yw: 0.0003,
                ..PlaneAngles::ZERO
            },
        }
    }
}

/// Color configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Palette name, looked up in the built-in and custom palettes
    pub palette: String,
    /// Strategy for filled cells
    pub cells: ColorStrategy,
    /// Strategy for edges
    pub edges: ColorStrategy,
    /// Strategy for points
    pub points: ColorStrategy,
    /// Bucket count for depth strategies (0 = one per palette entry)
    pub buckets: usize,
    /// Extra named palettes
    pub custom: BTreeMap<String, Palette>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_string(),
            cells: ColorStrategy::Cell,
            edges: ColorStrategy::Uniform,
            points: ColorStrategy::WDepth,
            buckets: 0,
            custom: BTreeMap::new(),
        }
    }
}

impl ColorConfig {
    /// Built-in palettes plus the custom ones (custom names win)
    pub fn palettes(&self) -> PaletteTable {
        let mut table = PaletteTable::builtin();
        for (name, palette) in &self.custom {
            table.insert(name.clone(), palette.clone());
        }
        table
    }

    pub fn strategy(&self, channel: Channel) -> ColorStrategy {
        match channel {
            Channel::Cells => self.cells,
            Channel::Edges => self.edges,
            Channel::Points => self.points,
        }
    }

    /// Color assigner for one channel of `polytope`
    pub fn assigner(&self, channel: Channel, palettes: &PaletteTable, polytope: &Polytope) -> ColorAssigner {
        let palette = palettes.resolve(&self.palette).clone();
        ColorAssigner::new(self.strategy(channel), palette, polytope, self.buckets)
    }
}

/// Channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub cells: bool,
    pub edges: bool,
    pub points: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            cells: true,
            edges: true,
            points: false,
        }
    }
}

impl ChannelConfig {
    pub fn is_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Cells => self.cells,
            Channel::Edges => self.edges,
            Channel::Points => self.points,
        }
    }

    /// Enabled channels in draw order
    pub fn enabled(&self) -> Vec<Channel> {
        Channel::ALL.into_iter().filter(|&c| self.is_enabled(c)).collect()
    }
}

/// Cross-section configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Render the cross-section instead of the projection
    pub enabled: bool,
    /// Starting hyperplane offset
    pub w: f32,
    /// Units per millisecond; 0 keeps the hyperplane still
    pub speed: f32,
    /// Lower bounce bound
    pub min: f32,
    /// Upper bounce bound
    pub max: f32,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            w: 0.0,
            speed: 0.0005,
            min: -1.0,
            max: 1.0,
        }
    }
}

/// Axes configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub enabled: bool,
    /// Length of each axis before projection
    pub length: f32,
    /// Where the axes start, in projected space
    pub origin: Vec3,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            length: 2.0,
            origin: Vec3::ZERO,
        }
    }
}

/// Headless loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of frames to derive
    pub frames: u32,
    /// Simulated time per frame in milliseconds
    pub frame_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            frame_ms: 16.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    source: figment::Error,
}

impl From<figment::Error> for ConfigError {
    fn from(source: figment::Error) -> Self {
        ConfigError { source }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.source)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anakata_core::regular;
    use anakata_render::{Reuse, Rgb};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.shape, ShapeTemplate::tesseract(2.0));
        assert_eq!(config.tessellation.reuse, Reuse::All);
        assert_eq!(config.channels.enabled(), vec![Channel::Cells, Channel::Edges]);
        assert!(!config.slice.enabled);
        assert!(config.axes.enabled);
        assert_eq!(config.axes.length, 2.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("[shape]"));
        assert!(toml.contains("cell_size_percent"));
        assert!(toml.contains("frame_ms"));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let text = r#"
            [shape]
            type = "ThreeSphere"
            radius = 1.5
            resolution = 6

            [colors]
            points = "depth"

            [slice]
            enabled = true
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.shape, ShapeTemplate::three_sphere(1.5, 6));
        assert_eq!(config.colors.points, ColorStrategy::Depth);
        assert_eq!(config.colors.cells, ColorStrategy::Cell);
        assert!(config.slice.enabled);
        assert_eq!(config.slice.max, 1.0);
        assert_eq!(config.rotation, RotationConfig::default());
    }

    #[test]
    fn test_custom_palette_wins() {
        let text = r#"
            palette = "mine"
            cells = "uniform"
            [custom]
            mine = [[0.25, 0.5, 0.75]]
        "#;
        let colors: ColorConfig = toml::from_str(text).unwrap();
        let tesseract = regular::tesseract(2.0).unwrap();
        let assigner = colors.assigner(Channel::Cells, &colors.palettes(), &tesseract);
        assert_eq!(
            assigner.color(0, 0, tesseract.vertex(0), tesseract.vertex(0).xyz()),
            Rgb::new(0.25, 0.5, 0.75)
        );
    }

    #[test]
    fn test_unknown_palette_falls_back() {
        let colors = ColorConfig {
            palette: "no-such-palette".to_string(),
            ..Default::default()
        };
        let tesseract = regular::tesseract(2.0).unwrap();
        let assigner = colors.assigner(Channel::Edges, &colors.palettes(), &tesseract);
        assert_eq!(assigner.palette(), &Palette::material());
    }
}
