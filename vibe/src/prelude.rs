//! Commonly used types.
//!
//! ```rust,ignore
//! use vibe::prelude::*;
//! ```

pub use crate::{
    BackgroundModel, Channels, Error, ForegroundSegmenter, ImageBuffer, ImageDesc, ImageView,
    Params, TiledBackgroundModel, BACKGROUND, FOREGROUND,
};
