//! Band-parallel execution of the background model.
//!
//! The frame is cut into horizontal bands. Each band owns a private
//! [`BackgroundModel`] with its own RNG, reads only its rows of the input and
//! writes only its rows of the mask. Nothing mutable is shared between bands,
//! so they run under rayon without any locking.


use rand::SeedableRng;
use rayon::prelude::*;

use common::parallel::{auto_band_count, split_rows_mut};

use crate::config::Params;
use crate::error::{Error, Result};
use crate::image::{ImageBuffer, ImageDesc, ImageView};
use crate::model::BackgroundModel;
use crate::rng::{tile_seed, Pcg32Fast, DEFAULT_SEED};

/// Rows `y..y + height` of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub y: usize,
    pub height: usize,
}

/// Splits `height` rows into `tile_count` bands of `height / tile_count` rows;
/// the last band also takes the remainder.
pub fn partition_bands(height: usize, tile_count: usize) -> Result<Vec<Band>> {
    if tile_count == 0 || tile_count > height {
        return Err(Error::InvalidTileCount {
            tiles: tile_count,
            height,
        });
    }

    let band_height = height / tile_count;
    let bands = (0..tile_count)
        .map(|i| {
            let y = i * band_height;
            let rows = if i + 1 == tile_count {
                height - y
            } else {
                band_height
            };
            Band { y, height: rows }
        })
        .collect();
    Ok(bands)
}

#[derive(Debug)]
struct Tile {
    band: Band,
    model: BackgroundModel<Pcg32Fast>,
}

#[derive(Debug)]
pub struct TiledBackgroundModel {
    params: Params,
    seed: u64,
    tiles: Vec<Tile>,
    // Band heights in tile order, reused to split every mask.
    row_counts: Vec<usize>,
    desc: Option<ImageDesc>,
}

impl TiledBackgroundModel {
    pub fn new(params: Params) -> Result<Self> {
        Self::with_seed(params, DEFAULT_SEED)
    }

    /// Tile `i` draws from `Pcg32Fast::seed_from_u64(tile_seed(seed, i))`.
    pub fn with_seed(params: Params, seed: u64) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            params,
            seed,
            tiles: Vec::new(),
            row_counts: Vec::new(),
            desc: None,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn desc(&self) -> Option<&ImageDesc> {
        self.desc.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.desc.is_some()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn bands(&self) -> Vec<Band> {
        self.tiles.iter().map(|tile| tile.band).collect()
    }

    /// Model of band `index`.
    pub fn tile_model(&self, index: usize) -> Option<&BackgroundModel<Pcg32Fast>> {
        self.tiles.get(index).map(|tile| &tile.model)
    }

    /// Splits `frame` into `tile_count` bands and seeds one model per band.
    /// Replaces any previous tiling.
    pub fn initialize_parallel(&mut self, frame: &ImageView<'_>, tile_count: usize) -> Result<()> {
        let desc = *frame.desc();
        let bands = partition_bands(desc.height, tile_count)?;
        let (params, seed) = (self.params, self.seed);

        let tiles = bands
            .into_par_iter()
            .enumerate()
            .map(|(index, band)| {
                let rng = Pcg32Fast::seed_from_u64(tile_seed(seed, index));
                let mut model = BackgroundModel::with_rng(params, rng)?;
                model.initialize(&frame.rows(band.y, band.height));
                Ok(Tile { band, model })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            width = desc.width,
            height = desc.height,
            channels = desc.channels.count(),
            tiles = tiles.len(),
            "Initialized tiled background model"
        );

        self.row_counts = tiles.iter().map(|tile| tile.band.height).collect();
        self.tiles = tiles;
        self.desc = Some(desc);
        Ok(())
    }

    /// [`initialize_parallel`](Self::initialize_parallel) with one band per
    /// rayon worker.
    pub fn initialize_parallel_auto(&mut self, frame: &ImageView<'_>) -> Result<()> {
        self.initialize_parallel(frame, auto_band_count(frame.desc().height))
    }

    /// Classifies and updates every band in parallel; returns once all bands
    /// are done.
    pub fn apply_parallel(&mut self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        let desc = self.check_layout(frame, mask)?;
        let mask_bands = split_rows_mut(mask, desc.width, &self.row_counts);

        tracing::trace!(tiles = self.tiles.len(), "Dispatching tiles");

        self.tiles
            .par_iter_mut()
            .zip(mask_bands)
            .try_for_each(|(tile, mask_band)| {
                let band_frame = frame.rows(tile.band.y, tile.band.height);
                tile.model.apply(&band_frame, mask_band)
            })
    }

    /// Parallel classification without touching any sample.
    pub fn classify_parallel(&self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        let desc = self.check_layout(frame, mask)?;
        let mask_bands = split_rows_mut(mask, desc.width, &self.row_counts);

        self.tiles
            .par_iter()
            .zip(mask_bands)
            .try_for_each(|(tile, mask_band)| {
                let band_frame = frame.rows(tile.band.y, tile.band.height);
                tile.model.classify(&band_frame, mask_band)
            })
    }

    /// Full-frame background reconstruction stitched from every band.
    pub fn background_image(&self) -> Result<ImageBuffer> {
        let desc = self.desc.ok_or(Error::NotInitialized)?;

        let mut background = ImageBuffer::new_empty(desc);
        let row_bytes = desc.row_bytes();
        for tile in &self.tiles {
            let band_background = tile.model.background_image()?;
            let start = tile.band.y * row_bytes;
            background.bytes_mut()[start..start + band_background.bytes().len()]
                .copy_from_slice(band_background.bytes());
        }
        Ok(background)
    }

    fn check_layout(&self, frame: &ImageView<'_>, mask: &[u8]) -> Result<ImageDesc> {
        let desc = self.desc.ok_or(Error::NotInitialized)?;
        if *frame.desc() != desc {
            return Err(Error::LayoutMismatch {
                expected: desc,
                actual: *frame.desc(),
            });
        }
        if mask.len() != desc.pixel_count() {
            return Err(Error::MaskSizeMismatch {
                expected: desc.pixel_count(),
                actual: mask.len(),
            });
        }
        Ok(desc)
    }
}
