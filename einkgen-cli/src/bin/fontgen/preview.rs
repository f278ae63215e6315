//! Debug preview: renders the packed 1-bit planes back into a PNG grid
//! so the on-device appearance can be eyeballed before flashing.

use anyhow::Context;
use einkgen_core::bitplane::plane_bit;
use einkgen_core::Font;
use image::{Rgb, RgbImage};
use std::path::Path;

const CANVAS: Rgb<u8> = Rgb([255, 255, 255]);
const GLYPH_BACKGROUND: Rgb<u8> = Rgb([255, 192, 203]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

pub fn write_preview(font: &Font, path: &Path) -> anyhow::Result<()> {
    let count = font.glyphs.len() as u32;
    let cols = (count as f64).sqrt() as u32 + 1;
    let rows = count.div_ceil(cols);
    let cell_w = font.glyphs.iter().map(|g| g.width).max().unwrap_or(1).max(1);
    let cell_h = font
        .glyphs
        .iter()
        .map(|g| g.height)
        .max()
        .unwrap_or(1)
        .max(1);

    let mut canvas = RgbImage::from_pixel(cols * cell_w, rows * cell_h, CANVAS);
    for (index, glyph) in font.glyphs.iter().enumerate() {
        let base_x = (index as u32 % cols) * cell_w;
        let base_y = (index as u32 / cols) * cell_h;
        let start = glyph.bitmap_offset as usize;
        let plane = &font.bitmap[start..start + glyph.plane_len() as usize];
        for y in 0..glyph.height {
            for x in 0..glyph.width {
                let pixel = if plane_bit(plane, glyph.width, x, y) == 1 {
                    INK
                } else {
                    GLYPH_BACKGROUND
                };
                canvas.put_pixel(base_x + x, base_y + y, pixel);
            }
        }
    }

    canvas
        .save(path)
        .with_context(|| format!("could not write preview image '{}'", path.display()))
}
