//! Encoded stream header and tile length table.
//!
//! Layout (big endian):
//!
//! ```text
//! offset  size   field
//! 0       8      magic  b"snaptile"
//! 8       1      format tag (0x01 = packed 8-bit RGBA)
//! 9       1      alpha convention (0 = opaque, 1 = premultiplied)
//! 10      2      tile size in pixels, 1..=8192
//! 12      4      width  (> 0)
//! 16      4      height (> 0)
//! 20      4*nt   compressed byte length of each tile, row-major tile order
//! ...            payload: concatenated per-tile QOI streams
//! ```

use crate::error::SnapError;
use crate::pixel::AlphaMode;

pub(crate) const MAGIC: &[u8; 8] = b"snaptile";
pub(crate) const FORMAT_RGBA8: u8 = 0x01;
pub(crate) const FIXED_HEADER_LEN: usize = 20;
pub(crate) const MAX_TILE_SIZE: u16 = 8192;

/// Default tile edge length used by [`crate::EncodeRequest`].
pub const DEFAULT_TILE_SIZE: u16 = 64;

#[derive(Clone, Copy, Debug)]
pub(crate) struct StreamHeader {
    pub width: u32,
    pub height: u32,
    pub alpha: AlphaMode,
    pub tile_size: u16,
}

impl StreamHeader {
    pub(crate) fn tiles_x(&self) -> u32 {
        self.width.div_ceil(self.tile_size as u32)
    }

    pub(crate) fn tiles_y(&self) -> u32 {
        self.height.div_ceil(self.tile_size as u32)
    }

    pub(crate) fn tile_count(&self) -> Result<usize, SnapError> {
        (self.tiles_x() as usize)
            .checked_mul(self.tiles_y() as usize)
            .ok_or(SnapError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    /// Pixel bounds of the tile at tile coordinates (tx, ty). Edge tiles are
    /// clipped to the image, never padded.
    pub(crate) fn tile_bounds(&self, tx: u32, ty: u32) -> (u32, u32, u32, u32) {
        let t = self.tile_size as u32;
        let x = tx * t;
        let y = ty * t;
        (x, y, t.min(self.width - x), t.min(self.height - y))
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_RGBA8);
        out.push(match self.alpha {
            AlphaMode::Opaque => 0,
            AlphaMode::Premultiplied => 1,
        });
        out.extend_from_slice(&self.tile_size.to_be_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
    }

    pub(crate) fn parse(data: &[u8]) -> Result<Self, SnapError> {
        if data.len() < FIXED_HEADER_LEN {
            return Err(SnapError::UnexpectedEof);
        }
        if &data[0..8] != MAGIC {
            return Err(SnapError::CorruptHeader("bad magic".into()));
        }
        if data[8] != FORMAT_RGBA8 {
            return Err(SnapError::CorruptHeader(format!(
                "unrecognized format tag 0x{:02x}",
                data[8]
            )));
        }
        let alpha = match data[9] {
            0 => AlphaMode::Opaque,
            1 => AlphaMode::Premultiplied,
            other => {
                return Err(SnapError::CorruptHeader(format!(
                    "unrecognized alpha convention {other}"
                )));
            }
        };
        let tile_size = u16::from_be_bytes([data[10], data[11]]);
        if tile_size == 0 || tile_size > MAX_TILE_SIZE {
            return Err(SnapError::CorruptHeader(format!(
                "tile size {tile_size} out of range 1..={MAX_TILE_SIZE}"
            )));
        }
        let width = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
        let height = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        if width == 0 || height == 0 {
            return Err(SnapError::CorruptHeader(format!(
                "zero dimension: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            alpha,
            tile_size,
        })
    }
}

/// Parse the tile length table, returning per-tile (offset, length) pairs
/// relative to the payload start, plus the payload slice itself.
pub(crate) fn parse_tile_table<'a>(
    data: &'a [u8],
    header: &StreamHeader,
) -> Result<(Vec<(usize, usize)>, &'a [u8]), SnapError> {
    let tile_count = header.tile_count()?;
    let table_len = tile_count
        .checked_mul(4)
        .ok_or(SnapError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    let table = data
        .get(FIXED_HEADER_LEN..FIXED_HEADER_LEN + table_len)
        .ok_or(SnapError::UnexpectedEof)?;
    let payload = &data[FIXED_HEADER_LEN + table_len..];

    let mut spans = Vec::with_capacity(tile_count);
    let mut offset = 0usize;
    for entry in table.chunks_exact(4) {
        let len = u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]) as usize;
        spans.push((offset, len));
        offset = offset
            .checked_add(len)
            .ok_or_else(|| SnapError::CorruptHeader("tile table overflow".into()))?;
    }
    if offset > payload.len() {
        return Err(SnapError::UnexpectedEof);
    }
    Ok((spans, payload))
}
