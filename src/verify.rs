//! Pixel-exact comparison of two images over a normalized format.
//!
//! Used to validate the round-trip and subset-decode contracts: compare a
//! decoded image against the original (optionally against a sub-rectangle of
//! the original). The comparison normalizes both sides into packed RGBA8
//! buffers whose alpha convention is derived from the first image's opacity,
//! then walks rows over exactly `width * 4` bytes, so stride padding never
//! participates. The first mismatching pixel is reported with both values.

use crate::buffer::PixelBuffer;
use crate::geom::IRect;
use crate::image::Image;
use crate::pixel::{AlphaMode, PixelFormat};

/// Why two images failed the pixel-equality check.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompareFailure {
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("read-back of the {which} image failed")]
    ReadFailed { which: &'static str },

    #[error("pixel mismatch at ({x}, {y}): expected {expected:?}, got {actual:?}")]
    PixelMismatch {
        x: u32,
        y: u32,
        expected: [u8; 4],
        actual: [u8; 4],
    },
}

/// Compare `b` against `a` (or against `subrect_a` of `a`) pixel by pixel.
///
/// Opacity flags are deliberately not compared; only pixel values under the
/// normalized convention are. Returns the first point of mismatch.
pub fn compare_pixels(
    a: &Image,
    subrect_a: Option<IRect>,
    b: &Image,
) -> Result<(), CompareFailure> {
    let (width, height) = match subrect_a {
        Some(r) => (r.width, r.height),
        None => (a.width(), a.height()),
    };
    if b.width() != width || b.height() != height {
        return Err(CompareFailure::DimensionMismatch {
            expected_width: width,
            expected_height: height,
            actual_width: b.width(),
            actual_height: b.height(),
        });
    }

    let alpha = if a.is_opaque() {
        AlphaMode::Opaque
    } else {
        AlphaMode::Premultiplied
    };
    let mut pm_a = match PixelBuffer::new(width, height, PixelFormat::Rgba8, alpha) {
        Ok(buf) => buf,
        Err(_) => return Err(CompareFailure::ReadFailed { which: "first" }),
    };
    let mut pm_b = pm_a.clone();

    let (src_x, src_y) = match subrect_a {
        Some(r) => (r.x, r.y),
        None => (0, 0),
    };
    if !a.read_pixels(&mut pm_a, src_x, src_y) {
        return Err(CompareFailure::ReadFailed { which: "first" });
    }
    if !b.read_pixels(&mut pm_b, 0, 0) {
        return Err(CompareFailure::ReadFailed { which: "second" });
    }

    for y in 0..height {
        let row_a = pm_a.row(y);
        let row_b = pm_b.row(y);
        if row_a == row_b {
            continue;
        }
        for x in 0..width {
            let off = x as usize * 4;
            if row_a[off..off + 4] != row_b[off..off + 4] {
                let mut expected = [0u8; 4];
                let mut actual = [0u8; 4];
                expected.copy_from_slice(&row_a[off..off + 4]);
                actual.copy_from_slice(&row_b[off..off + 4]);
                return Err(CompareFailure::PixelMismatch {
                    x,
                    y,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Image {
        let pixels = px.repeat((w * h) as usize);
        Image::from_pixels(pixels, w, h, AlphaMode::Opaque).unwrap()
    }

    #[test]
    fn equal_images_pass() {
        let a = solid(4, 4, [9, 8, 7, 255]);
        let b = solid(4, 4, [9, 8, 7, 255]);
        compare_pixels(&a, None, &b).unwrap();
    }

    #[test]
    fn dimension_precondition_fails_without_panic() {
        let a = solid(4, 4, [0, 0, 0, 255]);
        let b = solid(4, 3, [0, 0, 0, 255]);
        assert!(matches!(
            compare_pixels(&a, None, &b),
            Err(CompareFailure::DimensionMismatch { .. })
        ));
        // b must match the subrect, not the full image
        compare_pixels(&a, Some(IRect::from_xywh(0, 1, 4, 3)), &b).unwrap();
    }

    #[test]
    fn reports_first_mismatch() {
        let a = solid(4, 4, [1, 2, 3, 255]);
        let mut pixels = a.pixels().to_vec();
        pixels[(2 * 4 + 3) * 4] = 200; // pixel (3, 2), red channel
        let b = Image::from_pixels(pixels, 4, 4, AlphaMode::Opaque).unwrap();
        match compare_pixels(&a, None, &b) {
            Err(CompareFailure::PixelMismatch { x: 3, y: 2, expected, actual }) => {
                assert_eq!(expected, [1, 2, 3, 255]);
                assert_eq!(actual, [200, 2, 3, 255]);
            }
            other => panic!("expected pixel mismatch at (3, 2), got {other:?}"),
        }
    }

    #[test]
    fn windowed_compare_reads_subrect_origin() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[i as u8, 0, 0, 255]);
        }
        let a = Image::from_pixels(pixels, 4, 4, AlphaMode::Opaque).unwrap();
        // lower-right 2x2 window of a: indices 10, 11, 14, 15
        let b = Image::from_pixels(
            vec![10, 0, 0, 255, 11, 0, 0, 255, 14, 0, 0, 255, 15, 0, 0, 255],
            2,
            2,
            AlphaMode::Opaque,
        )
        .unwrap();
        compare_pixels(&a, Some(IRect::from_xywh(2, 2, 2, 2)), &b).unwrap();
    }
}
