use einkgen_core::{RasterGlyph, RasterizeGlyph, RasterizerError};

/// Deterministic in-memory rasterizer so pipeline tests need no font
/// file: known codepoints return canned sample grids, everything else
/// falls back to the empty-glyph bitmap like a real adapter would.
pub struct StubRasterizer {
    pub pixel_size: u32,
    pub glyphs: Vec<(u32, RasterGlyph)>,
    pub fail_on: Option<u32>,
}

impl StubRasterizer {
    pub fn empty(pixel_size: u32) -> Self {
        StubRasterizer {
            pixel_size,
            glyphs: Vec::new(),
            fail_on: None,
        }
    }

    pub fn with_glyph(mut self, codepoint: u32, glyph: RasterGlyph) -> Self {
        self.glyphs.push((codepoint, glyph));
        self
    }
}

impl RasterizeGlyph for StubRasterizer {
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, RasterizerError> {
        if self.fail_on == Some(codepoint) {
            return Err(RasterizerError::Render { codepoint });
        }
        match self.glyphs.iter().find(|(cp, _)| *cp == codepoint) {
            Some((_, glyph)) => Ok(glyph.clone()),
            None => Ok(RasterGlyph::empty(self.pixel_size, self.pixel_size)),
        }
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }
}

/// A glyph whose samples walk every quantizer bucket, including the
/// below-darkest wrap.
pub fn gradient_glyph() -> RasterGlyph {
    let samples = vec![
        255, 205, 204, 154, 153, 103, 102, 52, 51, 0, //
        0, 51, 52, 102, 103, 153, 154, 204, 205, 255, //
        128, 64, 32, 16, 240, 200, 160, 120, 80, 40,
    ];
    RasterGlyph {
        width: 10,
        height: 3,
        samples,
        x_advance: 11,
        x_offset: 1,
        y_offset: -3,
    }
}
