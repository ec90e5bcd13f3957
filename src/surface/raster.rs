//! CPU-backed surface: a premultiplied RGBA8 buffer with copy-on-write
//! snapshot isolation.

use std::sync::Arc;

use crate::error::SnapError;
use crate::geom::IRect;
use crate::image::Image;
use crate::pixel::{AlphaMode, Color};
use crate::surface::SurfaceBackend;

pub(crate) struct RasterBackend {
    width: u32,
    height: u32,
    alpha: AlphaMode,
    /// Shared with outstanding snapshots. `Arc::make_mut` in [`Self::pixels_mut`]
    /// is the write barrier: the first draw after a snapshot clones the store,
    /// so the snapshot's pixels are never touched again.
    pixels: Arc<Vec<u8>>,
}

impl RasterBackend {
    pub(crate) fn new(width: u32, height: u32, alpha: AlphaMode) -> Result<Self, SnapError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        let mut pixels = vec![0u8; len];
        if alpha == AlphaMode::Opaque {
            for px in pixels.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        Ok(Self {
            width,
            height,
            alpha,
            pixels: Arc::new(pixels),
        })
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.pixels).as_mut_slice()
    }

    fn fill_span(span: &mut [u8], src: [u8; 4], alpha: AlphaMode) {
        let a = src[3];
        if a == 255 {
            for px in span.chunks_exact_mut(4) {
                px.copy_from_slice(&src);
            }
        } else {
            // source-over with premultiplied source
            let inv = 255 - a as u16;
            for px in span.chunks_exact_mut(4) {
                for c in 0..4 {
                    px[c] = src[c].wrapping_add(((px[c] as u16 * inv + 127) / 255) as u8);
                }
                if alpha == AlphaMode::Opaque {
                    px[3] = 255;
                }
            }
        }
    }
}

impl SurfaceBackend for RasterBackend {
    fn clear(&mut self, color: Color) {
        let mut src = color.premultiplied();
        if self.alpha == AlphaMode::Opaque {
            src[3] = 255;
        }
        for px in self.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&src);
        }
    }

    fn draw_rect(&mut self, rect: IRect, color: Color) {
        let src = color.premultiplied();
        let (width, alpha) = (self.width as usize, self.alpha);
        let pixels = self.pixels_mut();
        for y in rect.y..rect.y + rect.height as i32 {
            let row_start = (y as usize * width + rect.x as usize) * 4;
            let span = &mut pixels[row_start..row_start + rect.width as usize * 4];
            Self::fill_span(span, src, alpha);
        }
    }

    fn snapshot(&mut self) -> Result<Image, SnapError> {
        Image::from_shared(Arc::clone(&self.pixels), self.width, self.height, self.alpha)
    }
}
