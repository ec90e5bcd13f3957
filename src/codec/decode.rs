//! Tiled decoder: full decode and rectangle-bounded subset decode.
//!
//! Each tile is an independent QOI stream, so subset decode translates the
//! requested pixel rectangle into the covering tile range and decompresses
//! only those tiles — no full-image materialization.

use enough::Stop;
use rapid_qoi::Qoi;

use crate::error::SnapError;
use crate::geom::IRect;
use crate::image::Image;
use crate::limits::Limits;
use crate::pixel::AlphaMode;

use super::header::{StreamHeader, parse_tile_table};

pub(crate) fn decode_tiled(
    data: &[u8],
    limits: Option<&Limits>,
    subset: Option<IRect>,
    stop: &dyn Stop,
) -> Result<Image, SnapError> {
    let header = StreamHeader::parse(data)?;
    if let Some(limits) = limits {
        limits.check_stream(header.width, header.height)?;
    }

    let target = match subset {
        Some(rect) => {
            if !rect.contained_in(header.width, header.height) {
                return Err(SnapError::InvalidSubset {
                    rect,
                    width: header.width,
                    height: header.height,
                });
            }
            rect
        }
        None => IRect::from_xywh(0, 0, header.width, header.height),
    };

    let out_bytes = (target.width as usize)
        .checked_mul(target.height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(SnapError::DimensionsTooLarge {
            width: target.width,
            height: target.height,
        })?;
    if let Some(limits) = limits {
        limits.check_output(out_bytes)?;
    }
    stop.check()?;

    let (spans, payload) = parse_tile_table(data, &header)?;

    // covering tile range for the target window
    let t = header.tile_size as u32;
    let tx0 = target.x as u32 / t;
    let ty0 = target.y as u32 / t;
    let tx1 = (target.right() as u32 - 1) / t;
    let ty1 = (target.bottom() as u32 - 1) / t;
    tracing::debug!(
        ?target,
        tiles = (tx1 - tx0 + 1) * (ty1 - ty0 + 1),
        "decoding tile range ({tx0},{ty0})..=({tx1},{ty1})"
    );

    let mut out = vec![0u8; out_bytes];
    let out_stride = target.width as usize * 4;

    for ty in ty0..=ty1 {
        stop.check()?;
        for tx in tx0..=tx1 {
            let (tile_x, tile_y, tw, th) = header.tile_bounds(tx, ty);
            let tile_index = (ty as usize) * header.tiles_x() as usize + tx as usize;
            let (offset, len) = spans[tile_index];
            let tile_data = payload
                .get(offset..offset + len)
                .ok_or(SnapError::UnexpectedEof)?;

            // validate declared tile dimensions before the decode allocates
            let declared = Qoi::decode_header(tile_data)
                .map_err(|e| SnapError::CorruptHeader(format!("qoi tile header: {e:?}")))?;
            if declared.width != tw || declared.height != th || !declared.colors.has_alpha() {
                return Err(SnapError::CorruptHeader(format!(
                    "tile {tile_index} is {}x{}, expected {tw}x{th}",
                    declared.width, declared.height
                )));
            }
            let (_, pixels) = Qoi::decode_alloc(tile_data)
                .map_err(|e| SnapError::CorruptHeader(format!("qoi tile decode: {e:?}")))?;

            copy_intersection(&pixels, (tile_x, tile_y, tw, th), target, &mut out, out_stride);
        }
    }

    Image::from_pixels(out, target.width, target.height, header.alpha)
}

/// Whole-stream alpha convention, without decoding any pixels.
pub(crate) fn peek_alpha(data: &[u8]) -> Result<AlphaMode, SnapError> {
    Ok(StreamHeader::parse(data)?.alpha)
}

/// Copy the pixels where the tile intersects the target window into the
/// output buffer, placing tile pixel (x, y) at (x - target.x, y - target.y).
fn copy_intersection(
    tile_pixels: &[u8],
    (tile_x, tile_y, tw, th): (u32, u32, u32, u32),
    target: IRect,
    out: &mut [u8],
    out_stride: usize,
) {
    let x0 = tile_x.max(target.x as u32);
    let y0 = tile_y.max(target.y as u32);
    // both bounds are in-range: the tile range was derived from the target
    let x1 = (tile_x + tw).min(target.right() as u32);
    let y1 = (tile_y + th).min(target.bottom() as u32);
    let span = (x1 - x0) as usize * 4;
    let tile_stride = tw as usize * 4;

    for y in y0..y1 {
        let src_off = ((y - tile_y) as usize) * tile_stride + ((x0 - tile_x) as usize) * 4;
        let dst_off =
            ((y - target.y as u32) as usize) * out_stride + ((x0 - target.x as u32) as usize) * 4;
        out[dst_off..dst_off + span].copy_from_slice(&tile_pixels[src_off..src_off + span]);
    }
}
