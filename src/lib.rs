//! # snaptile
//!
//! Surface snapshots with a tiled lossless codec and rectangle-bounded
//! subset decode.
//!
//! A [`Surface`] is a mutable drawable target backed either by a CPU pixel
//! buffer (`Raster`) or, with the `gpu` feature, by a wgpu texture
//! (`Accelerated`). [`Surface::snapshot`] freezes the current pixel state
//! into an immutable, cheaply cloneable [`Image`] that is never affected by
//! later draws. Images encode to a self-contained compressed stream and
//! decode back — in full, or bounded to a sub-rectangle without
//! materializing the whole image — with pixels guaranteed identical to the
//! originally rendered region regardless of which backend produced it.
//!
//! ## Round trip
//!
//! ```no_run
//! use snaptile::{AlphaMode, Color, IRect, Image, Surface, Unstoppable, compare_pixels};
//!
//! let mut surface = Surface::new_raster(20, 20, AlphaMode::Opaque)?;
//! surface.clear(Color::WHITE);
//! surface.draw_rect(IRect::from_xywh(5, 5, 10, 10), Color::BLACK);
//!
//! let original = surface.snapshot()?;
//! let encoded = original.encode(Unstoppable)?;
//!
//! // full decode
//! let decoded = Image::decode(&encoded, Unstoppable)?;
//! compare_pixels(&original, None, &decoded).unwrap();
//!
//! // subset decode: only the tiles intersecting the rectangle are
//! // decompressed
//! let rect = IRect::from_xywh(5, 5, 10, 10);
//! let window = Image::decode_subset(&encoded, rect, Unstoppable)?;
//! compare_pixels(&original, Some(rect), &window).unwrap();
//! # Ok::<(), snaptile::SnapError>(())
//! ```
//!
//! ## Non-goals
//!
//! - A general 2D drawing command set — surfaces expose `clear` and
//!   `draw_rect` only
//! - Rendering quality (antialiasing) or codec ratio/quality tuning
//! - Windowing and file I/O

#![forbid(unsafe_code)]

mod buffer;
mod error;
mod geom;
mod image;
mod limits;
mod pixel;
mod surface;
mod verify;

pub mod codec;

// Re-exports
pub use buffer::PixelBuffer;
pub use codec::{DecodeRequest, EncodeRequest};
pub use enough::{Stop, Unstoppable};
pub use error::SnapError;
pub use geom::IRect;
pub use image::Image;
pub use limits::Limits;
pub use pixel::{AlphaMode, Color, PixelFormat};
pub use surface::{BackendKind, Surface};
pub use verify::{CompareFailure, compare_pixels};
