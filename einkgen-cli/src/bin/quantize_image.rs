use anyhow::Context;
use clap::Parser;
use einkgen_core::quantize::{collapse_to_ink, elide_black};
use einkgen_core::GrayPalette;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Quantize an image to a small gray palette, plus BW and no-black variants", long_about = None)]
struct Cli {
    /// Input image path
    input: PathBuf,
    /// Output PNG path
    output: PathBuf,
    /// Comma-separated gray levels (0-255)
    #[arg(long, default_value = "255,192,128,64,0", value_parser = parse_palette)]
    levels: GrayPalette,
}

fn parse_palette(arg: &str) -> Result<GrayPalette, String> {
    let mut levels = Vec::new();
    for part in arg.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let value: u8 = part
            .parse()
            .map_err(|_| format!("palette values must be 0-255: '{}'", part))?;
        levels.push(value);
    }
    GrayPalette::new(levels).map_err(|err| err.to_string())
}

/// Flatten any input to 8-bit grayscale, compositing alpha over a white
/// background and using ITU-R 601 luma weights, the convention every
/// existing display asset was produced with.
fn flatten_to_gray(img: &DynamicImage) -> GrayImage {
    let rgba = img.to_rgba8();
    let mut gray = GrayImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u32;
        let r = (r as u32 * a + 255 * (255 - a)) / 255;
        let g = (g as u32 * a + 255 * (255 - a)) / 255;
        let b = (b as u32 * a + 255 * (255 - a)) / 255;
        let luma = (r * 299 + g * 587 + b * 114) / 1000;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }
    gray
}

fn map_pixels(img: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = f(pixel.0[0]);
    }
    out
}

/// Derived variants sit next to the primary output: `<stem><suffix>.png`.
fn variant_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{}{}.png", stem, suffix))
}

fn save(img: &GrayImage, path: &Path) -> anyhow::Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("could not write '{}'", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let input = image::open(&cli.input)
        .with_context(|| format!("could not open input image '{}'", cli.input.display()))?;

    let quantized = map_pixels(&flatten_to_gray(&input), |sample| cli.levels.map(sample));
    save(&quantized, &cli.output)?;
    println!("Saved quantized image to: {}", cli.output.display());

    // Both variants are pixel-wise maps over the quantized output, not
    // re-derived from the original image.
    let bw = map_pixels(&quantized, collapse_to_ink);
    let bw_path = variant_path(&cli.output, "_bw");
    save(&bw, &bw_path)?;
    println!("Saved BW image to: {}", bw_path.display());

    let no_black = map_pixels(&quantized, elide_black);
    let no_black_path = variant_path(&cli.output, "_no_black");
    save(&no_black, &no_black_path)?;
    println!("Saved no-black image to: {}", no_black_path.display());

    Ok(())
}
