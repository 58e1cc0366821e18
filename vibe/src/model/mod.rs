//! Single-region ViBe background model.
//!
//! Each pixel keeps `N` samples of past values. A pixel is background when at
//! least `required_bg_samples` of them lie within the match radius of its
//! current value. Background pixels randomly refresh one of their own samples
//! and one sample of a random neighbour, which is how the model follows slow
//! scene changes.


use rand::RngCore;

use crate::config::Params;
use crate::error::{Error, Result};
use crate::image::{Channels, ImageBuffer, ImageDesc, ImageView};
use crate::kernel::{init_sample_position, neighbor_position};
use crate::rng::Pcg32Fast;

/// Mask value of a background pixel.
pub const BACKGROUND: u8 = 0;
/// Mask value of a foreground pixel.
pub const FOREGROUND: u8 = u8::MAX;

#[derive(Clone, Debug)]
pub struct BackgroundModel<R = Pcg32Fast> {
    params: Params,
    rng: R,
    samples: Vec<ImageBuffer>,
    desc: Option<ImageDesc>,
}

impl BackgroundModel<Pcg32Fast> {
    /// Builds a model with the fixed default seed.
    pub fn new(params: Params) -> Result<Self> {
        Self::with_rng(params, Pcg32Fast::default())
    }
}

impl<R: RngCore> BackgroundModel<R> {
    /// Builds a model that draws every random decision from `rng`.
    pub fn with_rng(params: Params, rng: R) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            params,
            rng,
            samples: Vec::new(),
            desc: None,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Layout fixed by the last [`initialize`](Self::initialize) call.
    pub fn desc(&self) -> Option<&ImageDesc> {
        self.desc.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.desc.is_some()
    }

    pub fn samples(&self) -> &[ImageBuffer] {
        &self.samples
    }

    /// Seeds every sample of every pixel from a Gaussian-jittered location of
    /// `frame`. Calling it again re-seeds the model, reallocating only when
    /// the layout changed.
    pub fn initialize(&mut self, frame: &ImageView<'_>) {
        let desc = *frame.desc();
        let n = self.params.bg_samples;

        if self.desc != Some(desc) || self.samples.len() != n {
            tracing::debug!(
                width = desc.width,
                height = desc.height,
                channels = desc.channels.count(),
                samples = n,
                "Allocating background samples"
            );
            self.samples = (0..n).map(|_| ImageBuffer::new_empty(desc)).collect();
        }

        let Self { rng, samples, .. } = self;
        for sample in samples.iter_mut() {
            for y in 0..desc.height {
                for x in 0..desc.width {
                    let (sx, sy) = init_sample_position(rng, (x, y), desc.width, desc.height);
                    sample.pixel_mut(x, y).copy_from_slice(frame.pixel(sx, sy));
                }
            }
        }

        self.desc = Some(desc);
    }

    /// Classifies `frame` into `mask` and updates the samples in place.
    ///
    /// `mask` must hold one byte per pixel; every byte is overwritten with
    /// [`BACKGROUND`] or [`FOREGROUND`]. On error the model is left untouched.
    pub fn apply(&mut self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        let desc = self.check_layout(frame, mask)?;
        let threshold = self.params.match_threshold(desc.channels);

        match desc.channels {
            Channels::Gray => self.classify_and_update::<1>(frame.bytes(), mask, &desc, threshold),
            Channels::Rgb => self.classify_and_update::<3>(frame.bytes(), mask, &desc, threshold),
        }

        Ok(())
    }

    /// Classifies `frame` against the current samples without updating them.
    pub fn classify(&self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        let desc = self.check_layout(frame, mask)?;
        let threshold = self.params.match_threshold(desc.channels);

        match desc.channels {
            Channels::Gray => self.classify_only::<1>(frame.bytes(), mask, threshold),
            Channels::Rgb => self.classify_only::<3>(frame.bytes(), mask, threshold),
        }

        Ok(())
    }

    /// Per-pixel mean of the samples, rounded down.
    pub fn background_image(&self) -> Result<ImageBuffer> {
        let desc = self.desc.ok_or(Error::NotInitialized)?;

        let mut sums = vec![0u32; desc.byte_len()];
        for sample in &self.samples {
            for (acc, &v) in sums.iter_mut().zip(sample.bytes()) {
                *acc += v as u32;
            }
        }

        let count = self.samples.len() as u32;
        let mut background = ImageBuffer::new_empty(desc);
        for (dst, sum) in background.bytes_mut().iter_mut().zip(sums) {
            *dst = (sum / count) as u8;
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

    /// Counts matching samples in slot order, stopping once `required` is reached.
    #[inline]
    fn count_matches<const C: usize>(
        samples: &[ImageBuffer],
        pixel: &[u8; C],
        offset: usize,
        required: usize,
        threshold: u32,
    ) -> usize {
        let mut matches = 0;
        for sample in samples {
            if matches >= required {
                break;
            }
            if distance(pixel, &sample.bytes()[offset..offset + C]) < threshold {
                matches += 1;
            }
        }
        matches
    }

    fn classify_only<const C: usize>(&self, frame: &[u8], mask: &mut [u8], threshold: u32) {
        let required = self.params.required_bg_samples;

        for (idx, (out, px)) in mask.iter_mut().zip(frame.chunks_exact(C)).enumerate() {
            let mut pixel = [0u8; C];
            pixel.copy_from_slice(px);
            let matches = Self::count_matches(&self.samples, &pixel, idx * C, required, threshold);
            *out = if matches < required {
                FOREGROUND
            } else {
                BACKGROUND
            };
        }
    }

    fn classify_and_update<const C: usize>(
        &mut self,
        frame: &[u8],
        mask: &mut [u8],
        desc: &ImageDesc,
        threshold: u32,
    ) {
        let required = self.params.required_bg_samples;
        let n = self.params.bg_samples;
        let learning_mask = self.params.learning_rate_mask();
        let (width, height) = (desc.width, desc.height);
        let Self { rng, samples, .. } = self;

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let offset = idx * C;
                let mut pixel = [0u8; C];
                pixel.copy_from_slice(&frame[offset..offset + C]);

                if Self::count_matches(samples, &pixel, offset, required, threshold) < required {
                    mask[idx] = FOREGROUND;
                    continue;
                }
                mask[idx] = BACKGROUND;

                if rng.next_u32() & learning_mask == 0 {
                    let slot = rng.next_u32() as usize % n;
                    samples[slot].bytes_mut()[offset..offset + C].copy_from_slice(&pixel);
                }
                if rng.next_u32() & learning_mask == 0 {
                    let (nx, ny) = neighbor_position(rng, (x, y), width, height);
                    let slot = rng.next_u32() as usize % n;
                    let neighbor_offset = (ny * width + nx) * C;
                    samples[slot].bytes_mut()[neighbor_offset..neighbor_offset + C]
                        .copy_from_slice(&pixel);
                }
            }
        }
    }
}

/// Absolute difference for one channel, squared Euclidean otherwise.
#[inline(always)]
fn distance<const C: usize>(pixel: &[u8; C], sample: &[u8]) -> u32 {
    if C == 1 {
        pixel[0].abs_diff(sample[0]) as u32
    } else {
        pixel
            .iter()
            .zip(sample)
            .map(|(&a, &b)| {
                let d = a.abs_diff(b) as u32;
                d * d
            })
            .sum()
    }
}
