//! Rasterizer adapters: everything that turns a codepoint into raw
//! grayscale samples plus horizontal metrics.
//!
//! The rest of the pipeline only sees [`RasterizeGlyph`]. Which adapter
//! backs it is decided once at startup by configuration: an outline font
//! resource selects [`OutlineRasterizer`], no resource selects
//! [`FilledRasterizer`].

use std::collections::BTreeMap;

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};
use ttf_parser::{Face, GlyphId, Tag};

/// Empty or whitespace glyphs are emitted at `pixel_size / 2` square
/// (at least one pixel) so downstream packing never sees a zero side.
pub const EMPTY_GLYPH_DIVISOR: u32 = 2;

/// Raw rasterization output for one codepoint.
///
/// `samples` is row-major, `width * height` long, 255 = pure background,
/// 0 = pure ink. `y_offset` is relative to the baseline, negative above
/// it.
#[derive(Clone, Debug)]
pub struct RasterGlyph {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
    pub x_advance: u32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl RasterGlyph {
    /// The deterministic all-background bitmap used for empty glyphs.
    pub fn empty(pixel_size: u32, x_advance: u32) -> Self {
        let side = (pixel_size / EMPTY_GLYPH_DIVISOR).max(1);
        RasterGlyph {
            width: side,
            height: side,
            samples: vec![255; (side * side) as usize],
            x_advance,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

#[derive(Debug)]
pub enum RasterizerError {
    ZeroPixelSize,
    FaceParse(ttf_parser::FaceParsingError),
    Render { codepoint: u32 },
}

impl core::fmt::Display for RasterizerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RasterizerError::ZeroPixelSize => write!(f, "pixel size must be greater than zero"),
            RasterizerError::FaceParse(err) => write!(f, "unreadable font resource: {}", err),
            RasterizerError::Render { codepoint } => {
                write!(f, "could not render a bitmap for codepoint 0x{:X}", codepoint)
            }
        }
    }
}

impl std::error::Error for RasterizerError {}

pub trait RasterizeGlyph {
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, RasterizerError>;

    /// The pixel size this adapter was configured with; the glyph table
    /// builder derives the font-wide line advance from it.
    fn pixel_size(&self) -> u32;
}

/// One requested variable-font axis coordinate, e.g. `wght=600`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisSetting {
    pub tag: Tag,
    pub value: f32,
}

impl AxisSetting {
    pub fn new(tag: [u8; 4], value: f32) -> Self {
        AxisSetting {
            tag: Tag::from_bytes(&tag),
            value,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AxisRange {
    tag: Tag,
    min: f32,
    max: f32,
}

/// Clamp requested coordinates to their axis ranges, dropping unknown
/// tags, in deterministic tag order.
fn clamp_to_ranges(ranges: &[AxisRange], requested: &[AxisSetting]) -> Vec<AxisSetting> {
    let mut clamped: BTreeMap<[u8; 4], AxisSetting> = BTreeMap::new();
    for setting in requested {
        if let Some(range) = ranges.iter().find(|range| range.tag == setting.tag) {
            clamped.insert(
                setting.tag.to_bytes(),
                AxisSetting {
                    tag: setting.tag,
                    value: setting.value.clamp(range.min, range.max),
                },
            );
        }
    }
    clamped.into_values().collect()
}

/// Collects ttf-parser outline callbacks into a tiny-skia path, in font
/// design units (y-up).
struct OutlinePath {
    builder: PathBuilder,
}

impl OutlinePath {
    fn new() -> Self {
        OutlinePath {
            builder: PathBuilder::new(),
        }
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl ttf_parser::OutlineBuilder for OutlinePath {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Rasterizes glyphs from an outline font resource.
///
/// The face is validated and the variation coordinates clamped once at
/// construction; each `rasterize` call re-parses the face from the owned
/// bytes, fills the glyph outline into a coverage pixmap scaled to the
/// configured pixel size and crops it to the tight ink bounding box.
pub struct OutlineRasterizer {
    face_data: Vec<u8>,
    pixel_size: u32,
    thickness: f32,
    variations: Vec<AxisSetting>,
}

impl OutlineRasterizer {
    pub fn new(
        face_data: Vec<u8>,
        pixel_size: u32,
        thickness: f32,
        requested: Vec<AxisSetting>,
    ) -> Result<Self, RasterizerError> {
        if pixel_size == 0 {
            return Err(RasterizerError::ZeroPixelSize);
        }
        let face = Face::parse(&face_data, 0).map_err(RasterizerError::FaceParse)?;
        let ranges: Vec<AxisRange> = face
            .variation_axes()
            .into_iter()
            .map(|axis| AxisRange {
                tag: axis.tag,
                min: axis.min_value,
                max: axis.max_value,
            })
            .collect();
        let variations = clamp_to_ranges(&ranges, &requested);
        Ok(OutlineRasterizer {
            face_data,
            pixel_size,
            thickness,
            variations,
        })
    }

    fn parse_face(&self) -> Result<Face<'_>, RasterizerError> {
        let mut face = Face::parse(&self.face_data, 0).map_err(RasterizerError::FaceParse)?;
        for setting in &self.variations {
            let _ = face.set_variation(setting.tag, setting.value);
        }
        Ok(face)
    }
}

impl RasterizeGlyph for OutlineRasterizer {
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, RasterizerError> {
        let face = self.parse_face()?;
        let scale = self.pixel_size as f32 / face.units_per_em() as f32;

        // An unmapped codepoint falls back to .notdef so the table never
        // ends up with a hole.
        let glyph_id = char::from_u32(codepoint)
            .and_then(|c| face.glyph_index(c))
            .unwrap_or(GlyphId(0));

        let x_advance = face
            .glyph_hor_advance(glyph_id)
            .map(|advance| (advance as f32 * scale).round() as u32)
            .unwrap_or(self.pixel_size);

        let mut outline = OutlinePath::new();
        if face.outline_glyph(glyph_id, &mut outline).is_none() {
            return Ok(RasterGlyph::empty(self.pixel_size, self.pixel_size));
        }
        let path = match outline.finish() {
            Some(path) => path,
            None => return Ok(RasterGlyph::empty(self.pixel_size, self.pixel_size)),
        };

        // Rasterize into a padded coverage pixmap, then crop. Padding
        // leaves room for the stroke emphasis and anti-aliased edges.
        let bounds = path.bounds();
        let pad = self.thickness.ceil() as u32 + 2;
        let width = ((bounds.right() - bounds.left()) * scale).ceil() as u32 + 2 * pad;
        let height = ((bounds.bottom() - bounds.top()) * scale).ceil() as u32 + 2 * pad;
        let mut pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or(RasterizerError::Render { codepoint })?;

        // Font units are y-up; flip so the pixmap is y-down. The pen
        // origin (font 0,0) lands at (origin_x, baseline_y).
        let origin_x = pad as f32 - bounds.left() * scale;
        let baseline_y = pad as f32 + bounds.bottom() * scale;
        let transform = Transform::from_row(scale, 0.0, 0.0, -scale, origin_x, baseline_y);

        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        if self.thickness > 0.0 {
            let stroke = Stroke {
                width: self.thickness,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }

        match crop_coverage(&pixmap) {
            Some(crop) => Ok(RasterGlyph {
                width: crop.width,
                height: crop.height,
                samples: crop.samples,
                x_advance,
                x_offset: crop.x0 as i32 - origin_x.round() as i32,
                y_offset: crop.y0 as i32 - baseline_y.round() as i32,
            }),
            None => Ok(RasterGlyph::empty(self.pixel_size, self.pixel_size)),
        }
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }
}

struct CroppedCoverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// Tight-crop a coverage pixmap to its inked pixels, converting alpha
/// coverage into background-high samples (255 - coverage).
fn crop_coverage(pixmap: &Pixmap) -> Option<CroppedCoverage> {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    let mut x0 = u32::MAX;
    let mut y0 = u32::MAX;
    let mut x1 = 0u32;
    let mut y1 = 0u32;
    for (index, pixel) in pixels.iter().enumerate() {
        if pixel.alpha() > 0 {
            let x = index as u32 % width;
            let y = index as u32 / width;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    if x0 == u32::MAX {
        return None;
    }
    let crop_width = x1 - x0 + 1;
    let crop_height = y1 - y0 + 1;
    let mut samples = Vec::with_capacity((crop_width * crop_height) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let alpha = pixels[(y * width + x) as usize].alpha();
            samples.push(255 - alpha);
        }
    }
    Some(CroppedCoverage {
        x0,
        y0,
        width: crop_width,
        height: crop_height,
        samples,
    })
}

/// Fill level for the placeholder rasterizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillLevel {
    Background,
    Ink,
}

/// Emits uniform-fill placeholder glyphs when no font resource is
/// configured, keeping the asset layout exercisable without one.
pub struct FilledRasterizer {
    pixel_size: u32,
    fill: FillLevel,
}

impl FilledRasterizer {
    /// Minimum readable placeholder dimensions.
    pub const MIN_WIDTH: u32 = 3;
    pub const MIN_HEIGHT: u32 = 5;

    pub fn new(pixel_size: u32, fill: FillLevel) -> Result<Self, RasterizerError> {
        if pixel_size == 0 {
            return Err(RasterizerError::ZeroPixelSize);
        }
        Ok(FilledRasterizer { pixel_size, fill })
    }
}

impl RasterizeGlyph for FilledRasterizer {
    fn rasterize(&self, _codepoint: u32) -> Result<RasterGlyph, RasterizerError> {
        let width = (self.pixel_size / 2).max(Self::MIN_WIDTH);
        let height = self.pixel_size.max(Self::MIN_HEIGHT);
        let sample = match self.fill {
            FillLevel::Background => 255,
            FillLevel::Ink => 0,
        };
        Ok(RasterGlyph {
            width,
            height,
            samples: vec![sample; (width * height) as usize],
            x_advance: width.max(1),
            x_offset: 0,
            y_offset: 0,
        })
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ranges() -> Vec<AxisRange> {
        vec![
            AxisRange {
                tag: Tag::from_bytes(b"wght"),
                min: 100.0,
                max: 900.0,
            },
            AxisRange {
                tag: Tag::from_bytes(b"wdth"),
                min: 75.0,
                max: 125.0,
            },
        ]
    }

    #[test]
    fn variation_values_are_clamped_to_axis_ranges() {
        let clamped = clamp_to_ranges(
            &ranges(),
            &[
                AxisSetting::new(*b"wght", 1200.0),
                AxisSetting::new(*b"wdth", 50.0),
            ],
        );
        assert_eq!(
            clamped,
            vec![
                AxisSetting::new(*b"wdth", 75.0),
                AxisSetting::new(*b"wght", 900.0),
            ]
        );
    }

    #[test]
    fn unknown_axis_tags_are_dropped() {
        let clamped = clamp_to_ranges(&ranges(), &[AxisSetting::new(*b"slnt", -10.0)]);
        assert!(clamped.is_empty());
    }

    #[test]
    fn empty_glyph_never_has_a_zero_side() {
        let glyph = RasterGlyph::empty(8, 8);
        assert_eq!((glyph.width, glyph.height), (4, 4));
        assert!(glyph.samples.iter().all(|&s| s == 255));

        let tiny = RasterGlyph::empty(1, 1);
        assert_eq!((tiny.width, tiny.height), (1, 1));
    }

    #[test]
    fn filled_rasterizer_has_minimum_dimensions() {
        let stub = FilledRasterizer::new(4, FillLevel::Ink).unwrap();
        let glyph = stub.rasterize(65).unwrap();
        assert_eq!((glyph.width, glyph.height), (3, 5));
        assert!(glyph.samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn zero_pixel_size_is_a_configuration_error() {
        assert!(matches!(
            FilledRasterizer::new(0, FillLevel::Background),
            Err(RasterizerError::ZeroPixelSize)
        ));
    }
}
