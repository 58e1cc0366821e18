//! Feeds a synthetic scene through the tiled ViBe model and reports how much
//! of each frame is classified as foreground.
//!
//! Usage: `vibe_demo [config.yaml]`

use std::path::Path;

use anyhow::{Context, Result};
use common::log_setup::{setup_logging, LogConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vibe::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    params: Params,
    /// Bands to split each frame into; one per rayon worker when absent.
    tile_count: Option<usize>,
    width: usize,
    height: usize,
    frames: usize,
    seed: u64,
    log: LogConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            params: Params::default(),
            tile_count: None,
            width: 320,
            height: 240,
            frames: 60,
            seed: 42,
            log: LogConfig::named("vibe_demo"),
        }
    }
}

impl DemoConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: DemoConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.params.validate().context("Invalid model parameters")?;
        Ok(config)
    }
}

/// Static RGB gradient with sensor noise, a slow brightness drift and a
/// square that crosses the frame diagonally.
struct SyntheticScene {
    width: usize,
    height: usize,
    square: usize,
    rng: StdRng,
}

impl SyntheticScene {
    fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            square: (width.min(height) / 6).max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn square_origin(&self, index: usize, frames: usize) -> (usize, usize) {
        let span_x = self.width - self.square;
        let span_y = self.height - self.square;
        let t = index as f64 / frames.max(1) as f64;
        ((span_x as f64 * t) as usize, (span_y as f64 * t) as usize)
    }

    /// Frame `index` of `frames`. Frame 0 carries no object.
    fn frame(&mut self, index: usize, frames: usize) -> Vec<u8> {
        let drift = (index / 10) as u8;
        let origin = (index > 0).then(|| self.square_origin(index, frames));

        let mut bytes = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                let inside = origin.is_some_and(|(ox, oy)| {
                    (ox..ox + self.square).contains(&x) && (oy..oy + self.square).contains(&y)
                });
                if inside {
                    bytes.extend_from_slice(&[230, 30, 30]);
                    continue;
                }

                let base = [
                    (x * 160 / self.width) as u8 + 40,
                    (y * 160 / self.height) as u8 + 40,
                    90,
                ];
                for value in base {
                    let noise = self.rng.random_range(0u8..6);
                    bytes.push(value.saturating_add(drift).saturating_add(noise));
                }
            }
        }
        bytes
    }
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load(Path::new(&path))?,
        None => DemoConfig::default(),
    };
    let _log_guard = setup_logging(&config.log).context("Failed to set up logging")?;
    tracing::info!(?config, "Starting ViBe demo");

    let (width, height) = (config.width, config.height);
    let mut scene = SyntheticScene::new(width, height, config.seed);
    let mut model = TiledBackgroundModel::with_seed(config.params, config.seed)?;

    let first = scene.frame(0, config.frames);
    let first_view = ImageView::from_raw(width, height, 3, &first)?;
    match config.tile_count {
        Some(tiles) => model.initialize_parallel(&first_view, tiles)?,
        None => model.initialize_parallel_auto(&first_view)?,
    }
    tracing::info!(tiles = model.tile_count(), "Model initialized");

    let object_area = scene.square * scene.square;
    let mut mask = vec![0u8; width * height];
    let segmenter: &mut dyn ForegroundSegmenter = &mut model;
    for index in 1..config.frames {
        let frame = scene.frame(index, config.frames);
        segmenter
            .process(&ImageView::from_raw(width, height, 3, &frame)?, &mut mask)
            .with_context(|| format!("Failed to process frame {}", index))?;

        let foreground = mask.iter().filter(|&&v| v == FOREGROUND).count();
        tracing::info!(
            frame = index,
            foreground,
            object_area,
            ratio = foreground as f64 / mask.len() as f64,
            "Frame processed"
        );
    }

    let background = model.background_image()?;
    let mean = background.bytes().iter().map(|&v| v as u64).sum::<u64>()
        / background.bytes().len() as u64;
    tracing::info!(mean, "Background reconstruction done");

    Ok(())
}
