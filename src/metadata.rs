//! Ancillary metadata chunks: pHYs, tEXt, gAMA and tIME. None of these
//! affect how scanlines are decoded; they're collected into
//! [`PngMetadata`] for callers that want them.

use crate::constants::INCHES_PER_METRE;
use crate::error::PngDecodeErrors;
use crate::options::TextEncoding;

/// Physical pixel dimensions from a pHYs chunk.
#[derive(Copy, Clone, Debug)]
pub struct PhysicalDimensions
{
    pub pixels_per_unit_x: u32,
    pub pixels_per_unit_y: u32,
    /// `true` when the unit is metres (pHYs byte 8 == 1); `false` means
    /// the unit is unspecified and DPI cannot be derived.
    pub unit_is_metre:     bool
}

impl PhysicalDimensions
{
    /// Horizontal resolution in dots per inch, if the unit is known.
    pub fn dpi_x(&self) -> Option<f32>
    {
        self.unit_is_metre.then(|| self.pixels_per_unit_x as f32 / INCHES_PER_METRE)
    }

    /// Vertical resolution in dots per inch, if the unit is known.
    pub fn dpi_y(&self) -> Option<f32>
    {
        self.unit_is_metre.then(|| self.pixels_per_unit_y as f32 / INCHES_PER_METRE)
    }
}

/// The timestamp carried by a tIME chunk, in the fields PNG stores it
/// as (UTC, no timezone).
#[derive(Copy, Clone, Debug)]
pub struct PngTimestamp
{
    pub year:   u16,
    pub month:  u8,
    pub day:    u8,
    pub hour:   u8,
    pub minute: u8,
    pub second: u8
}

/// A tEXt chunk's keyword/value pair.
#[derive(Clone, Debug)]
pub struct TextEntry
{
    pub keyword: String,
    pub value:   String
}

/// Everything this crate collects from ancillary chunks over the
/// course of a decode. Every field is optional because the chunk it
/// comes from is itself optional.
#[derive(Clone, Debug, Default)]
pub struct PngMetadata
{
    pub physical_dimensions: Option<PhysicalDimensions>,
    pub timestamp:           Option<PngTimestamp>,
    pub gamma:                Option<f32>,
    pub text:                Vec<TextEntry>
}

pub(crate) fn parse_phys(data: &[u8]) -> Result<PhysicalDimensions, PngDecodeErrors>
{
    if data.len() != 9
    {
        return Err(PngDecodeErrors::CorruptData(format!("pHYs must be 9 bytes, got {}", data.len())));
    }

    Ok(PhysicalDimensions {
        pixels_per_unit_x: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
        pixels_per_unit_y: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        unit_is_metre:     data[8] == 1
    })
}

pub(crate) fn parse_gama(data: &[u8]) -> Result<f32, PngDecodeErrors>
{
    if data.len() != 4
    {
        return Err(PngDecodeErrors::CorruptData(format!("gAMA must be 4 bytes, got {}", data.len())));
    }

    let raw = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    Ok(raw as f32 / 100_000.0)
}

pub(crate) fn parse_time(data: &[u8]) -> Result<PngTimestamp, PngDecodeErrors>
{
    if data.len() != 7
    {
        return Err(PngDecodeErrors::CorruptData(format!("tIME must be 7 bytes, got {}", data.len())));
    }

    Ok(PngTimestamp {
        year:   u16::from_be_bytes([data[0], data[1]]),
        month:  data[2],
        day:    data[3],
        hour:   data[4],
        minute: data[5],
        second: data[6]
    })
}

/// Splits a tEXt chunk on its first NUL into keyword/value, decoding
/// both halves as Latin-1 (each byte maps to the `char` of the same
/// codepoint), the only encoding [`TextEncoding`] currently supports.
pub(crate) fn parse_text(data: &[u8], encoding: TextEncoding) -> Result<TextEntry, PngDecodeErrors>
{
    let TextEncoding::Latin1 = encoding;

    let separator = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| PngDecodeErrors::CorruptData("tEXt has no keyword/value separator".to_string()))?;

    let decode_latin1 = |bytes: &[u8]| -> String { bytes.iter().map(|&b| b as char).collect() };

    let keyword = decode_latin1(&data[..separator]);
    if keyword.is_empty() || keyword.len() > 79
    {
        return Err(PngDecodeErrors::CorruptData(format!(
            "tEXt keyword length {} is outside 1..=79",
            keyword.len()
        )));
    }

    Ok(TextEntry { keyword, value: decode_latin1(&data[separator + 1..]) })
}
