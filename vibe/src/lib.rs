//! ViBe background subtraction.
//!
//! Keeps a small set of past values per pixel and labels every pixel of a new
//! frame as background or foreground by counting how many of those values lie
//! close to it. Background pixels feed back into their own and a neighbour's
//! sample set at random, so the model adapts to slow scene changes.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vibe::prelude::*;
//!
//! let mut model = TiledBackgroundModel::new(Params::default())?;
//! model.initialize_parallel(&ImageView::from_raw(640, 480, 3, &first)?, 8)?;
//!
//! let mut mask = vec![0u8; 640 * 480];
//! model.apply_parallel(&ImageView::from_raw(640, 480, 3, &next)?, &mut mask)?;
//! ```

pub mod config;
pub mod error;
pub mod image;
pub mod kernel;
pub mod model;
pub mod rng;
pub mod segmenter;
pub mod tiled;

pub mod prelude;

pub use config::Params;
pub use error::{Error, Result};
pub use image::{Channels, ImageBuffer, ImageDesc, ImageView};
pub use model::{BackgroundModel, BACKGROUND, FOREGROUND};
pub use rng::{tile_seed, Pcg32Fast, DEFAULT_SEED};
pub use segmenter::ForegroundSegmenter;
pub use tiled::{partition_bands, Band, TiledBackgroundModel};
