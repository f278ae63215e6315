//! Serializes a completed [`Font`] into the C header container consumed
//! by the firmware's `SimpleGFXfont` renderer.
//!
//! Emission is a pure function of the font and its symbolic name: the
//! same font always serializes to the same bytes, so generated assets
//! can be checked for reproducibility.

use crate::font::Font;

/// Bytes per line in emitted byte lists.
const BYTES_PER_LINE: usize = 12;

/// Render the complete header for `font`, with every identifier derived
/// from `name` (`<name>Bitmaps`, `<name>Glyphs`, ...).
pub fn emit_font_header(font: &Font, name: &str) -> String {
    let mut out = String::new();
    out.push_str("#pragma once\n");
    out.push_str("#include \"../text_renderer/SimpleFont.h\"\n\n");
    out.push_str("// Generated by fontgen\n");
    out.push_str(&format!("// Font: {}\n\n", name));

    push_plane_array(&mut out, &format!("{}Bitmaps", name), font, &font.bitmap);
    if let Some(gray) = &font.gray {
        push_plane_array(&mut out, &format!("{}Bitmaps_lsb", name), font, &gray.lsb);
        push_plane_array(&mut out, &format!("{}Bitmaps_msb", name), font, &gray.msb);
    }
    push_glyph_table(&mut out, name, font);
    push_font_record(&mut out, name, font);
    out
}

fn push_plane_array(out: &mut String, array_name: &str, font: &Font, plane: &[u8]) {
    out.push_str(&format!("const uint8_t {}[] PROGMEM = {{\n", array_name));
    let entries: Vec<String> = font
        .glyphs
        .iter()
        .map(|glyph| {
            let start = glyph.bitmap_offset as usize;
            let chunk = &plane[start..start + glyph.plane_len() as usize];
            let mut entry = format!("    {}", glyph_comment(glyph.codepoint));
            let bytes = byte_list(chunk);
            if !bytes.is_empty() {
                entry.push('\n');
                entry.push_str(&bytes);
            }
            entry
        })
        .collect();
    out.push_str(&entries.join(",\n"));
    out.push_str("\n};\n\n");
}

fn push_glyph_table(out: &mut String, name: &str, font: &Font) {
    out.push_str(&format!(
        "const SimpleGFXglyph {}Glyphs[] PROGMEM = {{\n",
        name
    ));
    let records: Vec<String> = font
        .glyphs
        .iter()
        .map(|glyph| {
            format!(
                "    {{{}, 0x{:X}, {}, {}, {}, {}, {}}}",
                glyph.bitmap_offset,
                glyph.codepoint,
                glyph.width,
                glyph.height,
                glyph.x_advance,
                glyph.x_offset,
                glyph.y_offset
            )
        })
        .collect();
    out.push_str(&records.join(",\n"));
    out.push_str("\n};\n\n");
}

fn push_font_record(out: &mut String, name: &str, font: &Font) {
    let (lsb, msb) = if font.gray.is_some() {
        (
            format!("(const uint8_t*){}Bitmaps_lsb", name),
            format!("(const uint8_t*){}Bitmaps_msb", name),
        )
    } else {
        ("nullptr".to_string(), "nullptr".to_string())
    };
    out.push_str(&format!(
        "const SimpleGFXfont {name} PROGMEM = {{(const uint8_t*){name}Bitmaps, {lsb}, {msb}, (const SimpleGFXglyph*){name}Glyphs,\n    {count}, {y_advance}, nullptr}};\n",
        name = name,
        lsb = lsb,
        msb = msb,
        count = font.glyphs.len(),
        y_advance = font.y_advance
    ));
}

fn glyph_comment(codepoint: u32) -> String {
    match char::from_u32(codepoint).filter(|c| !c.is_control()) {
        Some(c) => format!("// 0x{:X} '{}'", codepoint, c),
        None => format!("// 0x{:X}", codepoint),
    }
}

fn byte_list(bytes: &[u8]) -> String {
    let lines: Vec<String> = bytes
        .chunks(BYTES_PER_LINE)
        .map(|line| {
            let values: Vec<String> = line.iter().map(|b| format!("0x{:02X}", b)).collect();
            format!("    {}", values.join(", "))
        })
        .collect();
    lines.join(",\n")
}
