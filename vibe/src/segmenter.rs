use rand::RngCore;

use crate::error::Result;
use crate::image::ImageView;
use crate::model::BackgroundModel;
use crate::tiled::TiledBackgroundModel;

/// Anything that turns a frame into a per-pixel foreground mask and learns
/// from it along the way.
pub trait ForegroundSegmenter {
    fn process(&mut self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()>;
}

impl<R: RngCore> ForegroundSegmenter for BackgroundModel<R> {
    fn process(&mut self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        self.apply(frame, mask)
    }
}

impl ForegroundSegmenter for TiledBackgroundModel {
    fn process(&mut self, frame: &ImageView<'_>, mask: &mut [u8]) -> Result<()> {
        self.apply_parallel(frame, mask)
    }
}
