//! Asset preparation pipeline for a memory-constrained e-ink display
//! controller: outline-font glyphs are rasterized, quantized and packed
//! into parallel 1-bit planes (black/white plus split 2-bit grayscale)
//! that firmware consumes as immutable, fixed-layout data.

// Pipeline stages
pub mod bitplane;
pub mod charset;
pub mod emit;
pub mod font;
pub mod quantize;
pub mod raster;

// Pipeline exports
pub use emit::emit_font_header;
pub use font::{Font, FontBuildError, FontBuilder, Glyph, GrayPlanes, LINE_GAP};
pub use quantize::{GrayPalette, PaletteError, DEFAULT_IMAGE_PALETTE};
pub use raster::{
    AxisSetting, FillLevel, FilledRasterizer, OutlineRasterizer, RasterGlyph, RasterizeGlyph,
    RasterizerError,
};
