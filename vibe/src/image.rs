//! Byte-buffer image layouts: a borrowed view for caller frames and an owned
//! buffer for model-owned sample sets.

use crate::error::{Error, Result};

/// Interleaved 8-bit channel layouts accepted by the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channels {
    Gray,
    Rgb,
}

impl Channels {
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

impl TryFrom<usize> for Channels {
    type Error = Error;

    fn try_from(count: usize) -> Result<Self> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            other => Err(Error::UnsupportedChannels(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDesc {
    pub width: usize,
    pub height: usize,
    pub channels: Channels,
}

impl ImageDesc {
    pub fn new(width: usize, height: usize, channels: Channels) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Bytes between consecutive pixels.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels.count()
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width * self.bytes_per_pixel()
    }

    /// Total bytes of the layout. Only called on layouts that already passed
    /// [`checked_byte_len`](Self::checked_byte_len) through [`ImageView::new`].
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * self.bytes_per_pixel()
    }

    /// Total bytes of the layout, or `None` when it does not fit in `usize`.
    pub fn checked_byte_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.bytes_per_pixel())
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y * self.width + x) * self.bytes_per_pixel()
    }

    /// Same layout restricted to `height` rows.
    #[inline]
    pub fn with_height(&self, height: usize) -> Self {
        Self { height, ..*self }
    }
}

/// Read-only view over caller-owned pixel bytes.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    desc: ImageDesc,
    bytes: &'a [u8],
}

impl<'a> ImageView<'a> {
    /// Wraps `bytes` as an image. Trailing bytes past the layout are ignored.
    pub fn new(desc: ImageDesc, bytes: &'a [u8]) -> Result<Self> {
        let expected = desc.checked_byte_len().unwrap_or(usize::MAX);
        if bytes.len() < expected {
            return Err(Error::BufferTooSmall {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            desc,
            bytes: &bytes[..expected],
        })
    }

    /// Builds a view from a raw channel count, as handed over by frame sources.
    pub fn from_raw(width: usize, height: usize, channels: usize, bytes: &'a [u8]) -> Result<Self> {
        let channels = Channels::try_from(channels)?;
        Self::new(ImageDesc::new(width, height, channels), bytes)
    }

    #[inline]
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let offset = self.desc.offset(x, y);
        &self.bytes[offset..offset + self.desc.bytes_per_pixel()]
    }

    /// Zero-copy view of the full-width band `y..y + height`.
    ///
    /// # Panics
    ///
    /// Panics if the band extends past the bottom of the image.
    pub fn rows(&self, y: usize, height: usize) -> ImageView<'a> {
        assert!(
            y + height <= self.desc.height,
            "row band {}..{} exceeds image height {}",
            y,
            y + height,
            self.desc.height
        );
        let row_bytes = self.desc.row_bytes();
        ImageView {
            desc: self.desc.with_height(height),
            bytes: &self.bytes[y * row_bytes..(y + height) * row_bytes],
        }
    }
}

/// Owned image bytes, used for sample sets and reconstructed backgrounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

impl ImageBuffer {
    pub fn new_empty(desc: ImageDesc) -> Self {
        Self {
            desc,
            bytes: vec![0; desc.byte_len()],
        }
    }

    #[inline]
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn take_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let offset = self.desc.offset(x, y);
        &self.bytes[offset..offset + self.desc.bytes_per_pixel()]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let offset = self.desc.offset(x, y);
        let bpp = self.desc.bytes_per_pixel();
        &mut self.bytes[offset..offset + bpp]
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            desc: self.desc,
            bytes: &self.bytes,
        }
    }
}
