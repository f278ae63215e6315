//! Glyph table builder: drives the rasterizer, quantizer and packer for
//! an ordered codepoint set and accumulates the result into one [`Font`].

use tracing::{debug, warn};

use crate::bitplane::{bytes_per_row, pack_plane, split_gray_planes};
use crate::quantize::{bw_bit, gray4_level};
use crate::raster::{RasterizeGlyph, RasterizerError};

/// Vertical gap between lines on top of the pixel size; the font-wide
/// `y_advance` is always `pixel_size + LINE_GAP`. The firmware renderer
/// bakes this spacing into its layout, so it is part of the asset
/// contract.
pub const LINE_GAP: u32 = 2;

/// One glyph's metrics plus its canonical quantized pixels.
///
/// `pixel_values` (levels 0..=3, row-major) is the source of truth; the
/// packed planes in [`Font`] are derived from it and never diverge.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub codepoint: u32,
    pub width: u32,
    pub height: u32,
    pub x_advance: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub bitmap_offset: u32,
    pub pixel_values: Vec<u8>,
}

impl Glyph {
    /// Byte length of this glyph's data in every plane buffer.
    pub fn plane_len(&self) -> u32 {
        bytes_per_row(self.width) * self.height
    }
}

/// The two packed planes of the 2-bit grayscale encoding.
#[derive(Clone, Debug, Default)]
pub struct GrayPlanes {
    pub lsb: Vec<u8>,
    pub msb: Vec<u8>,
}

/// A completed font: glyphs in codepoint-set order plus the concatenated
/// plane buffers they index into. Built once per run, never mutated.
#[derive(Clone, Debug)]
pub struct Font {
    pub glyphs: Vec<Glyph>,
    pub bitmap: Vec<u8>,
    pub gray: Option<GrayPlanes>,
    pub y_advance: u32,
}

#[derive(Debug)]
pub enum FontBuildError {
    Rasterize {
        codepoint: u32,
        err: RasterizerError,
    },
}

impl core::fmt::Display for FontBuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FontBuildError::Rasterize { codepoint, err } => {
                write!(f, "failed to rasterize codepoint 0x{:X}: {}", codepoint, err)
            }
        }
    }
}

impl std::error::Error for FontBuildError {}

/// Builds a [`Font`] from an ordered codepoint set.
///
/// Strictly sequential: each codepoint is rasterized, quantized and
/// packed completely before the next, because `bitmap_offset` is a
/// running byte total. Any rasterization failure aborts the whole build;
/// a partial font is never returned.
pub struct FontBuilder<R> {
    rasterizer: R,
    gray: bool,
}

impl<R: RasterizeGlyph> FontBuilder<R> {
    pub fn new(rasterizer: R) -> Self {
        FontBuilder {
            rasterizer,
            gray: true,
        }
    }

    /// Skip the 2-bit grayscale planes and emit only the 1-bit plane.
    pub fn bw_only(mut self) -> Self {
        self.gray = false;
        self
    }

    pub fn build(self, codepoints: &[u32]) -> Result<Font, FontBuildError> {
        let mut glyphs = Vec::with_capacity(codepoints.len());
        let mut bitmap = Vec::new();
        let mut gray = GrayPlanes::default();
        let mut offset: u32 = 0;

        for &codepoint in codepoints {
            let raster = self
                .rasterizer
                .rasterize(codepoint)
                .map_err(|err| FontBuildError::Rasterize { codepoint, err })?;
            debug_assert_eq!(
                raster.samples.len(),
                (raster.width * raster.height) as usize
            );
            debug!(
                codepoint,
                width = raster.width,
                height = raster.height,
                x_advance = raster.x_advance,
                x_offset = raster.x_offset,
                y_offset = raster.y_offset,
                "rasterized glyph"
            );

            let pixel_values: Vec<u8> =
                raster.samples.iter().map(|&s| gray4_level(s)).collect();
            // The packed 1-bit plane stores ink as a set bit, the
            // complement of the quantizer's background-high bw value.
            let ink_bits: Vec<u8> = raster.samples.iter().map(|&s| 1 - bw_bit(s)).collect();
            let bw_plane = pack_plane(&ink_bits, raster.width, raster.height);

            if let Some(byte) = uniform_block(&bw_plane) {
                warn!(
                    "glyph 0x{:X} rendered as a uniform block (0x{:02X}); the source font may be missing it",
                    codepoint, byte
                );
            }

            if self.gray {
                let (lsb, msb) = split_gray_planes(&pixel_values, raster.width, raster.height);
                gray.lsb.extend_from_slice(&lsb);
                gray.msb.extend_from_slice(&msb);
            }

            glyphs.push(Glyph {
                codepoint,
                width: raster.width,
                height: raster.height,
                x_advance: raster.x_advance,
                x_offset: raster.x_offset,
                y_offset: raster.y_offset,
                bitmap_offset: offset,
                pixel_values,
            });
            let next_offset = offset + bw_plane.len() as u32;
            if offset <= u16::MAX as u32 && next_offset > u16::MAX as u32 {
                warn!(
                    offset = next_offset,
                    "plane buffers exceed a 16-bit bitmap offset; firmware with \
                     16-bit offsets cannot address the tail glyphs"
                );
            }
            offset = next_offset;
            bitmap.extend_from_slice(&bw_plane);
        }

        Ok(Font {
            glyphs,
            bitmap,
            gray: self.gray.then_some(gray),
            y_advance: self.rasterizer.pixel_size() + LINE_GAP,
        })
    }
}

/// A packed plane consisting of one repeated all-clear or all-set byte,
/// the signature of a glyph that rendered as a blank or a filled box.
fn uniform_block(plane: &[u8]) -> Option<u8> {
    let first = *plane.first()?;
    if (first == 0x00 || first == 0xFF) && plane.iter().all(|&b| b == first) {
        Some(first)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uniform_block_detects_blank_and_filled() {
        assert_eq!(uniform_block(&[0x00, 0x00]), Some(0x00));
        assert_eq!(uniform_block(&[0xFF, 0xFF, 0xFF]), Some(0xFF));
        assert_eq!(uniform_block(&[0xFF, 0x00]), None);
        assert_eq!(uniform_block(&[0x7E, 0x7E]), None);
        assert_eq!(uniform_block(&[]), None);
    }
}
