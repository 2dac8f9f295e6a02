//! Anakata - 4D polytope viewer
//!
//! Runs the frame loop headless: every frame advances the rotation (and the
//! slicing hyperplane), derives the buffers of each enabled channel and
//! logs what a renderer would upload.
//!
//! Usage: `anakata [shape.ron]`. Without an argument the shape comes from
//! the `[shape]` config section.

use std::sync::Arc;

use anakata::{AppConfig, DirtyFlags, HyperView};
use anakata_core::{PolytopeDescription, ShapeLoadError};

/// Main application state
struct App {
    config: AppConfig,
    view: HyperView,
    /// Frames that rebuilt index buffers
    topology_uploads: u32,
}

impl App {
    fn new(config: AppConfig, shape_path: Option<String>) -> Result<Self, ShapeLoadError> {
        let view = match shape_path {
            Some(path) => {
                let polytope = PolytopeDescription::load(&path)?;
                HyperView::with_polytope(&config, Arc::new(polytope))?
            }
            None => HyperView::new(&config)?,
        };

        let polytope = view.polytope();
        log::info!(
            "Viewing '{}': {} vertices, {} faces, {} cells",
            polytope.name(),
            polytope.vertex_count(),
            polytope.face_count(),
            polytope.cell_count()
        );

        Ok(Self {
            config,
            view,
            topology_uploads: 0,
        })
    }

    fn run(&mut self) -> Result<(), ShapeLoadError> {
        let frames = self.config.animation.frames;
        let frame_ms = self.config.animation.frame_ms;

        for index in 0..frames {
            self.view.advance(frame_ms);
            let frame = self.view.frame()?;
            if frame.dirty.contains(DirtyFlags::TOPOLOGY) {
                self.topology_uploads += 1;
            }
            if index % 30 == 0 {
                log::info!(
                    "Frame {}: {} batches, {} vertices, {} triangles{}",
                    index,
                    frame.batch_count(),
                    frame.vertex_count(),
                    frame.triangle_count(),
                    if frame.sliced { " (slice)" } else { "" }
                );
            }
            if let Some(axes) = frame.axes {
                log::trace!("  axes: {} segments", axes.vertex_count() / 2);
            }
            for buffer in &frame.buffers {
                log::trace!(
                    "  {}: {} bytes of positions",
                    buffer.channel.name(),
                    buffer.iter().map(|b| b.position_bytes().len()).sum::<usize>()
                );
            }
        }

        log::info!(
            "Finished {} frames ({} topology uploads), final w slice {:.3}",
            frames,
            self.topology_uploads,
            self.view.slice_w()
        );
        Ok(())
    }
}

fn main() {
    let loaded = AppConfig::load();

    // Initialize logging; RUST_LOG still wins over the configured level
    let level = loaded
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Starting Anakata");

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let shape_path = std::env::args().nth(1);
    let result = App::new(config, shape_path).and_then(|mut app| app.run());
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
