//! Drawable surfaces: a mutable pixel target plus its drawing context.
//!
//! Two backends implement one capability interface: `Raster` keeps pixels in
//! a CPU buffer, `Accelerated` renders into a wgpu texture (behind the `gpu`
//! cargo feature). Snapshots freeze the current pixel state into an
//! immutable [`Image`]; later draws never retroactively change an
//! already-taken snapshot.

mod raster;

#[cfg(feature = "gpu")]
mod gpu;

use crate::error::SnapError;
use crate::geom::IRect;
use crate::image::Image;
use crate::pixel::{AlphaMode, Color};

/// Which storage model backs a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU-mapped pixel buffer.
    Raster,
    /// GPU-resident render target (requires the `gpu` feature and a usable
    /// adapter).
    Accelerated,
}

/// Capability interface unifying the two storage models.
pub(crate) trait SurfaceBackend {
    fn clear(&mut self, color: Color);
    fn draw_rect(&mut self, rect: IRect, color: Color);
    /// Freeze the current pixel state; the returned image must be host
    /// visible and isolated from subsequent draws.
    fn snapshot(&mut self) -> Result<Image, SnapError>;
}

/// A mutable drawable target producing immutable snapshots.
pub struct Surface {
    width: u32,
    height: u32,
    alpha: AlphaMode,
    kind: BackendKind,
    backend: Box<dyn SurfaceBackend>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Create a surface of the given backing kind.
    ///
    /// Fails with [`SnapError::InvalidDimensions`] on a zero dimension and
    /// [`SnapError::BackendUnavailable`] when `Accelerated` is requested
    /// without the `gpu` feature or without a usable device.
    pub fn new(
        kind: BackendKind,
        width: u32,
        height: u32,
        alpha: AlphaMode,
    ) -> Result<Self, SnapError> {
        if width == 0 || height == 0 {
            return Err(SnapError::InvalidDimensions { width, height });
        }
        let backend: Box<dyn SurfaceBackend> = match kind {
            BackendKind::Raster => Box::new(raster::RasterBackend::new(width, height, alpha)?),
            #[cfg(feature = "gpu")]
            BackendKind::Accelerated => Box::new(gpu::AcceleratedBackend::new(
                width, height, alpha,
            )?),
            #[cfg(not(feature = "gpu"))]
            BackendKind::Accelerated => {
                return Err(SnapError::BackendUnavailable(
                    "snaptile was built without the `gpu` feature".into(),
                ));
            }
        };
        tracing::debug!(?kind, width, height, "surface created");
        Ok(Self {
            width,
            height,
            alpha,
            kind,
            backend,
        })
    }

    pub fn new_raster(width: u32, height: u32, alpha: AlphaMode) -> Result<Self, SnapError> {
        Self::new(BackendKind::Raster, width, height, alpha)
    }

    pub fn new_accelerated(width: u32, height: u32, alpha: AlphaMode) -> Result<Self, SnapError> {
        Self::new(BackendKind::Accelerated, width, height, alpha)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Fill the whole surface with `color`, replacing previous content.
    pub fn clear(&mut self, color: Color) {
        self.backend.clear(color);
    }

    /// Source-over fill of `rect`, clipped to the surface bounds.
    pub fn draw_rect(&mut self, rect: IRect, color: Color) {
        if let Some(clipped) = rect.clipped_to(self.width, self.height) {
            self.backend.draw_rect(clipped, color);
        }
    }

    /// Capture the current pixel state as an immutable [`Image`].
    ///
    /// The image reflects exactly the draws issued before this call; it
    /// remains valid and unchanged after further draws or after the surface
    /// is dropped. On a GPU-resident target this blocks for the
    /// device-to-host transfer.
    pub fn snapshot(&mut self) -> Result<Image, SnapError> {
        self.backend.snapshot()
    }
}
