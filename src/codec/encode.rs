//! Tiled encoder: full CPU read-back, header + tile length table, per-tile
//! QOI compression in row-major tile order.

use enough::Stop;
use rapid_qoi::{Colors, Qoi};

use crate::error::SnapError;
use crate::image::Image;

use super::header::StreamHeader;

pub(crate) fn encode_tiled(
    image: &Image,
    header: &StreamHeader,
    stop: &dyn Stop,
) -> Result<Vec<u8>, SnapError> {
    let tile_count = header.tile_count()?;
    tracing::debug!(
        width = header.width,
        height = header.height,
        tile_size = header.tile_size,
        tile_count,
        "encoding tiled stream"
    );

    let mut out = Vec::new();
    header.write(&mut out);

    // length table is back-patched once the payload sizes are known
    let table_start = out.len();
    out.resize(table_start + tile_count * 4, 0);

    let mut tile_pixels = Vec::new();
    let mut index = 0usize;
    for ty in 0..header.tiles_y() {
        stop.check()?;
        for tx in 0..header.tiles_x() {
            let (x, y, tw, th) = header.tile_bounds(tx, ty);
            gather_tile(image, x, y, tw, th, &mut tile_pixels);

            let qoi = Qoi {
                width: tw,
                height: th,
                colors: Colors::Rgba,
            };
            let compressed = qoi
                .encode_alloc(&tile_pixels)
                .map_err(|e| SnapError::EncodeFailed(format!("qoi tile encode: {e:?}")))?;

            let len = u32::try_from(compressed.len()).map_err(|_| {
                SnapError::EncodeFailed(format!("tile {index} exceeds u32 length"))
            })?;
            out[table_start + index * 4..table_start + index * 4 + 4]
                .copy_from_slice(&len.to_be_bytes());
            out.extend_from_slice(&compressed);
            index += 1;
        }
    }

    Ok(out)
}

/// Copy the tile at pixel origin (x, y) into a contiguous RGBA8 buffer.
fn gather_tile(image: &Image, x: u32, y: u32, tw: u32, th: u32, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(tw as usize * th as usize * 4);
    for row in y..y + th {
        let src = image.row(row);
        out.extend_from_slice(&src[x as usize * 4..(x + tw) as usize * 4]);
    }
}
