/// Packed 32-bit pixel memory layout.
///
/// Images always store pixels as `Rgba8` internally; `Bgra8` exists as a
/// read-back destination layout (the common native layout on Windows GDI
/// and many GPU swapchains).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 channels, 8-bit R, G, B, A byte order.
    Rgba8,
    /// 4 channels, 8-bit B, G, R, A byte order.
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel for this format. Always 4 in the packed-RGBA family.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

/// Alpha convention of a pixel store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    /// Every pixel is fully opaque; the alpha byte is 255.
    Opaque,
    /// Color channels are premultiplied by alpha.
    Premultiplied,
}

impl AlphaMode {
    pub const fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque)
    }
}

/// A draw color with straight (unpremultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied RGBA bytes, rounding to nearest.
    pub(crate) fn premultiplied(&self) -> [u8; 4] {
        let mul = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        [mul(self.r), mul(self.g), mul(self.b), self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_rounds_to_nearest() {
        let c = Color::rgba(255, 128, 1, 128);
        assert_eq!(c.premultiplied(), [128, 64, 1, 128]);
        let opaque = Color::rgb(10, 20, 30);
        assert_eq!(opaque.premultiplied(), [10, 20, 30, 255]);
        assert_eq!(Color::TRANSPARENT.premultiplied(), [0, 0, 0, 0]);
    }
}
