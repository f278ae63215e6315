//! Codepoint set parsing for the `--chars` / `--chars-file` surface.

#[derive(Clone, Debug)]
pub enum CharSpecError {
    InvalidNumber(String),
    Empty,
}

impl core::fmt::Display for CharSpecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CharSpecError::InvalidNumber(part) => {
                write!(f, "invalid decimal codepoint: '{}'", part)
            }
            CharSpecError::Empty => write!(f, "character spec expands to no codepoints"),
        }
    }
}

impl std::error::Error for CharSpecError {}

/// Expand a `--chars` spec into an ordered codepoint set.
///
/// A spec made entirely of ASCII digits, commas and dashes is a decimal
/// list with inclusive ranges, e.g. `"32,48-57"`. Any other character
/// anywhere in the spec makes the whole spec a literal string whose
/// characters supply the codepoints directly, in order.
pub fn parse_char_spec(spec: &str) -> Result<Vec<u32>, CharSpecError> {
    let literal = spec
        .chars()
        .any(|c| !c.is_ascii_digit() && c != ',' && c != '-');
    if literal {
        return Ok(spec.chars().map(|c| c as u32).collect());
    }

    let mut codepoints = Vec::new();
    for part in spec.split(',') {
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_decimal(start)?;
                let end = parse_decimal(end)?;
                // An inverted range expands to nothing rather than erroring.
                codepoints.extend(start..=end);
            }
            None => codepoints.push(parse_decimal(part)?),
        }
    }
    if codepoints.is_empty() {
        return Err(CharSpecError::Empty);
    }
    Ok(codepoints)
}

/// Turn the contents of a chars file into a codepoint set.
///
/// The file always supplies a literal character set (no decimal-list
/// sniffing, so a file of digits means the digit characters). Byte-order
/// marks and trailing line breaks are stripped first, since editors and
/// shell redirections add both.
pub fn literal_codepoints(contents: &str) -> Vec<u32> {
    contents
        .replace('\u{feff}', "")
        .trim_end_matches(['\r', '\n'])
        .chars()
        .map(|c| c as u32)
        .collect()
}

fn parse_decimal(part: &str) -> Result<u32, CharSpecError> {
    part.parse()
        .map_err(|_| CharSpecError::InvalidNumber(part.to_string()))
}
