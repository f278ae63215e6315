use anyhow::{anyhow, Context};
use clap::Parser;
use einkgen_core::charset;
use einkgen_core::{
    emit_font_header, AxisSetting, FillLevel, FilledRasterizer, Font, FontBuildError, FontBuilder,
    OutlineRasterizer, RasterizeGlyph,
};
use std::path::PathBuf;
use tracing::{event, Level};

mod preview;

#[derive(Parser)]
#[command(author, version, about = "Generate a packed bit-plane font header from an outline font", long_about = None)]
struct Cli {
    /// Font variable base name, e.g. NotoSans26
    name: String,
    /// Pixel size glyphs are rasterized at
    size: u32,
    /// Outline font resource (TTF/OTF); omit to generate uniform-fill placeholders
    ttf: Option<PathBuf>,
    /// Decimal codepoints with ranges (e.g. "32,48-57"), or a literal
    /// string of characters when it contains anything but digits and
    /// separators
    #[arg(long, default_value = "32")]
    chars: String,
    /// Read the literal character set from a file instead of --chars
    #[arg(long, value_name = "FILE")]
    chars_file: Option<PathBuf>,
    /// Output header path (default: <name>.h)
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
    /// Fractional stroke emphasis passed through to the rasterizer
    #[arg(long, default_value_t = 0.0)]
    thickness: f32,
    /// Variable-font axis coordinate, repeatable, e.g. --variation wght=600
    #[arg(long, value_name = "TAG=VALUE", value_parser = parse_axis)]
    variation: Vec<AxisSetting>,
    /// Placeholder fill for the no-TTF path: 0 => background, 1 => ink
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    fill: u8,
    /// Emit only the 1-bit plane, skipping the grayscale planes
    #[arg(long)]
    bw_only: bool,
    /// Optional PNG path for a preview grid of the packed glyphs
    #[arg(long, value_name = "FILE")]
    preview_output: Option<PathBuf>,
    #[arg(short)]
    verbosity: bool,
}

fn parse_axis(arg: &str) -> Result<AxisSetting, String> {
    let (tag, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VALUE, got '{}'", arg))?;
    let tag: [u8; 4] = tag
        .as_bytes()
        .try_into()
        .map_err(|_| format!("axis tag must be exactly 4 characters, got '{}'", tag))?;
    let value: f32 = value
        .parse()
        .map_err(|_| format!("invalid axis value: '{}'", value))?;
    Ok(AxisSetting::new(tag, value))
}

fn build_font<R: RasterizeGlyph>(
    rasterizer: R,
    codepoints: &[u32],
    bw_only: bool,
) -> Result<Font, FontBuildError> {
    let builder = FontBuilder::new(rasterizer);
    let builder = if bw_only { builder.bw_only() } else { builder };
    builder.build(codepoints)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbosity {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .pretty()
        .finish();
    // use that subscriber to process traces emitted after this point
    tracing::subscriber::set_global_default(subscriber)?;

    let codepoints = match &cli.chars_file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("could not read chars file '{}'", path.display()))?;
            let codepoints = charset::literal_codepoints(&contents);
            event!(
                Level::INFO,
                count = codepoints.len(),
                file = %path.display(),
                "loaded character set"
            );
            codepoints
        }
        None => charset::parse_char_spec(&cli.chars)?,
    };
    if codepoints.is_empty() {
        return Err(anyhow!("the character set is empty"));
    }

    let font = match &cli.ttf {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("could not read font resource '{}'", path.display()))?;
            let rasterizer =
                OutlineRasterizer::new(data, cli.size, cli.thickness, cli.variation.clone())?;
            event!(
                Level::INFO,
                glyphs = codepoints.len(),
                size = cli.size,
                ttf = %path.display(),
                "rasterizing glyphs"
            );
            build_font(rasterizer, &codepoints, cli.bw_only)?
        }
        None => {
            let fill = if cli.fill == 1 {
                FillLevel::Ink
            } else {
                FillLevel::Background
            };
            build_font(
                FilledRasterizer::new(cli.size, fill)?,
                &codepoints,
                cli.bw_only,
            )?
        }
    };

    let out_path = cli
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.h", cli.name)));
    std::fs::write(&out_path, emit_font_header(&font, &cli.name))
        .with_context(|| format!("could not write '{}'", out_path.display()))?;
    println!("Wrote {}", out_path.display());

    if let Some(path) = &cli.preview_output {
        preview::write_preview(&font, path)?;
        println!("Wrote preview image: {}", path.display());
    }

    Ok(())
}
