//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::path::PathBuf;

use anakata::config::AppConfig;
use anakata_core::ShapeTemplate;
use anakata_render::{ColorStrategy, Reuse, Split};
use serial_test::serial;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("anakata-config-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("ANAKATA_TESSELLATION__REUSE", "none");
    std::env::set_var("ANAKATA_SLICE__ENABLED", "true");
    let config = AppConfig::load();
    std::env::remove_var("ANAKATA_TESSELLATION__REUSE");
    std::env::remove_var("ANAKATA_SLICE__ENABLED");

    let config = config.unwrap();
    assert_eq!(config.tessellation.reuse, Reuse::None);
    assert!(config.slice.enabled);
}

#[test]
#[serial]
fn test_default_file_loading() {
    let config = AppConfig::load().unwrap();
    assert_eq!(config.shape, ShapeTemplate::tesseract(2.0));
    assert_eq!(config.tessellation.split, Split::Cells);
    assert_eq!(config.tessellation.cell_size_percent, 90.0);
    assert_eq!(config.colors.points, ColorStrategy::WDepth);
    assert!(config.axes.enabled);
    assert_eq!(config.axes.origin, anakata_math::Vec3::ZERO);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = scratch_dir("user");
    std::fs::write(dir.join("default.toml"), "[tessellation]\nreuse = \"faces\"\nsplit = \"faces\"\n").unwrap();
    std::fs::write(
        dir.join("user.toml"),
        "[tessellation]\nsplit = \"none\"\n\n[shape]\ntype = \"FlatTorus\"\nr1 = 1.0\nr2 = 1.0\nresolution = 4\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(config.tessellation.reuse, Reuse::Faces);
    assert_eq!(config.tessellation.split, Split::None);
    assert_eq!(config.shape, ShapeTemplate::FlatTorus { r1: 1.0, r2: 1.0, resolution: 4 });
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from(scratch_dir("empty").join("does-not-exist")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
#[serial]
fn test_bad_value_is_an_error() {
    let dir = scratch_dir("bad");
    std::fs::write(dir.join("default.toml"), "[tessellation]\nreuse = \"sometimes\"\n").unwrap();
    let result = AppConfig::load_from(&dir);
    std::fs::remove_dir_all(&dir).ok();

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
