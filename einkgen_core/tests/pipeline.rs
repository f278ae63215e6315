mod common;

use common::{gradient_glyph, StubRasterizer};
use einkgen_core::bitplane::{bytes_per_row, plane_bit};
use einkgen_core::quantize::{bw_bit, gray4_level};
use einkgen_core::{FontBuildError, FontBuilder, RasterGlyph};

#[test]
fn empty_glyph_for_space_at_size_eight() {
    // Size 8 with an empty glyph: the adapter's fallback is a 4x4
    // all-background bitmap and the planes pack to all-clear bytes.
    let font = FontBuilder::new(StubRasterizer::empty(8))
        .build(&[32])
        .unwrap();

    assert_eq!(font.glyphs.len(), 1);
    let glyph = &font.glyphs[0];
    assert_eq!(glyph.codepoint, 32);
    assert_eq!((glyph.width, glyph.height), (4, 4));
    assert_eq!(glyph.bitmap_offset, 0);

    let plane_len = (bytes_per_row(4) * 4) as usize;
    assert_eq!(font.bitmap.len(), plane_len);
    assert!(font.bitmap.iter().all(|&b| b == 0x00));
    let gray = font.gray.as_ref().unwrap();
    assert!(gray.lsb.iter().all(|&b| b == 0x00));
    assert!(gray.msb.iter().all(|&b| b == 0x00));
}

#[test]
fn bitmap_offsets_chain_without_gaps() {
    let wide = RasterGlyph {
        width: 9,
        height: 4,
        samples: vec![0; 36],
        x_advance: 10,
        x_offset: 0,
        y_offset: -4,
    };
    let font = FontBuilder::new(
        StubRasterizer::empty(16)
            .with_glyph(65, gradient_glyph())
            .with_glyph(66, wide),
    )
    .build(&[65, 66, 67])
    .unwrap();

    assert_eq!(font.glyphs[0].bitmap_offset, 0);
    for pair in font.glyphs.windows(2) {
        let expected = pair[0].bitmap_offset + bytes_per_row(pair[0].width) * pair[0].height;
        assert_eq!(pair[1].bitmap_offset, expected);
    }
    let total: u32 = font
        .glyphs
        .iter()
        .map(|g| bytes_per_row(g.width) * g.height)
        .sum();
    assert_eq!(font.bitmap.len() as u32, total);
    let gray = font.gray.as_ref().unwrap();
    assert_eq!(gray.lsb.len(), font.bitmap.len());
    assert_eq!(gray.msb.len(), font.bitmap.len());
}

#[test]
fn bw_plane_stores_the_complement_of_the_binary_threshold() {
    let raster = gradient_glyph();
    let font = FontBuilder::new(StubRasterizer::empty(24).with_glyph(65, raster.clone()))
        .build(&[65])
        .unwrap();

    let glyph = &font.glyphs[0];
    for y in 0..glyph.height {
        for x in 0..glyph.width {
            let sample = raster.samples[(y * glyph.width + x) as usize];
            let bit = plane_bit(&font.bitmap, glyph.width, x, y);
            assert_eq!(bit, 1 - bw_bit(sample), "at ({}, {})", x, y);
        }
    }
}

#[test]
fn gray_planes_reconstruct_pixel_values_exactly() {
    let raster = gradient_glyph();
    let font = FontBuilder::new(StubRasterizer::empty(24).with_glyph(65, raster.clone()))
        .build(&[65])
        .unwrap();

    let glyph = &font.glyphs[0];
    let gray = font.gray.as_ref().unwrap();
    for y in 0..glyph.height {
        for x in 0..glyph.width {
            let pos = (y * glyph.width + x) as usize;
            assert_eq!(glyph.pixel_values[pos], gray4_level(raster.samples[pos]));
            let level =
                plane_bit(&gray.msb, glyph.width, x, y) * 2 + plane_bit(&gray.lsb, glyph.width, x, y);
            assert_eq!(level, glyph.pixel_values[pos], "at ({}, {})", x, y);
        }
    }
}

#[test]
fn rasterizer_failure_aborts_the_whole_build() {
    let mut stub = StubRasterizer::empty(12).with_glyph(65, gradient_glyph());
    stub.fail_on = Some(66);
    let result = FontBuilder::new(stub).build(&[65, 66, 67]);
    assert!(matches!(
        result,
        Err(FontBuildError::Rasterize { codepoint: 66, .. })
    ));
}

#[test]
fn line_advance_is_pixel_size_plus_gap() {
    let font = FontBuilder::new(StubRasterizer::empty(24))
        .build(&[32])
        .unwrap();
    assert_eq!(font.y_advance, 26);
}

#[test]
fn bw_only_builds_skip_the_gray_planes() {
    let font = FontBuilder::new(StubRasterizer::empty(8).with_glyph(65, gradient_glyph()))
        .bw_only()
        .build(&[65])
        .unwrap();
    assert!(font.gray.is_none());
    assert!(!font.bitmap.is_empty());
}

#[test]
fn duplicate_codepoints_are_kept_in_order() {
    let font = FontBuilder::new(StubRasterizer::empty(8))
        .build(&[65, 65])
        .unwrap();
    assert_eq!(font.glyphs.len(), 2);
    assert_eq!(font.glyphs[0].codepoint, 65);
    assert_eq!(font.glyphs[1].codepoint, 65);
    assert_eq!(
        font.glyphs[1].bitmap_offset,
        bytes_per_row(font.glyphs[0].width) * font.glyphs[0].height
    );
}
