//! Encode/decode between an [`Image`] and a self-contained compressed
//! stream.
//!
//! The stream tiles the image and compresses each tile as an independent
//! QOI payload, indexed by a length table in the header (the `header`
//! module documents the exact layout). Because tiles decode independently,
//! [`DecodeRequest::bounded_to`] reconstructs an arbitrary in-bounds
//! rectangle by decompressing only the tiles it intersects.
//!
//! Determinism: encoding the same pixels with the same header always
//! produces a stream that decodes to identical pixels. The compressed bytes
//! themselves are reproducible too, though only the decoded pixels are
//! contractual.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod header;

use enough::Stop;

use crate::error::SnapError;
use crate::geom::IRect;
use crate::image::Image;
use crate::limits::Limits;
use crate::pixel::AlphaMode;

pub use header::DEFAULT_TILE_SIZE;
use header::{MAX_TILE_SIZE, StreamHeader};

/// Builder for encoding an [`Image`] to a compressed stream.
#[derive(Clone, Copy, Debug)]
pub struct EncodeRequest {
    tile_size: u16,
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }

    /// Tile edge length in pixels, clamped to `1..=8192`. Smaller tiles make
    /// subset decode cheaper; larger tiles compress marginally better.
    pub fn with_tile_size(mut self, tile_size: u16) -> Self {
        self.tile_size = tile_size.clamp(1, MAX_TILE_SIZE);
        self
    }

    pub fn encode(&self, image: &Image, stop: impl Stop) -> Result<Vec<u8>, SnapError> {
        let header = StreamHeader {
            width: image.width(),
            height: image.height(),
            alpha: image.alpha_mode(),
            tile_size: self.tile_size,
        };
        encode::encode_tiled(image, &header, &stop)
    }
}

impl Default for EncodeRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for decoding a compressed stream, optionally bounded to a
/// rectangle and/or subject to resource [`Limits`].
#[derive(Clone, Copy, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    subset: Option<IRect>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            subset: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Decode only the pixels inside `rect`, yielding an image of `rect`'s
    /// dimensions. Fails with [`SnapError::InvalidSubset`] unless `rect`
    /// lies entirely within the stream's declared bounds.
    pub fn bounded_to(mut self, rect: IRect) -> Self {
        self.subset = Some(rect);
        self
    }

    pub fn decode(&self, stop: impl Stop) -> Result<Image, SnapError> {
        decode::decode_tiled(self.data, self.limits, self.subset, &stop)
    }
}

/// Probe a stream's declared alpha convention without decoding pixels.
pub fn peek_alpha(data: &[u8]) -> Result<AlphaMode, SnapError> {
    decode::peek_alpha(data)
}
