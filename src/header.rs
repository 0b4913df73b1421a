//! IHDR parsing and the allowed (colour type, bit depth) matrix, plus
//! PLTE and tRNS, the three chunks that shape how scanlines are read,
//! as opposed to the metadata chunks in [`crate::metadata`].

use crate::enums::{FilterMethod, InterlaceMethod, PngColor};
use crate::error::PngDecodeErrors;
use crate::palette::{PLTEEntry, TrnsKey};

/// Everything IHDR establishes about an image's pixel layout.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PngInfo
{
    pub width:            u32,
    pub height:           u32,
    pub depth:            u8,
    pub color:            PngColor,
    pub component:        u8,
    pub filter_method:    FilterMethod,
    pub interlace_method: InterlaceMethod
}

/// The allowed (colour type, bit depth) matrix.
fn depth_allowed(color: PngColor, depth: u8) -> bool
{
    match color
    {
        PngColor::Luma | PngColor::Palette => matches!(depth, 1 | 2 | 4 | 8),
        PngColor::RGB | PngColor::LumaA | PngColor::RGBA => depth == 8,
        PngColor::Unknown => false
    }
}

pub(crate) fn parse_ihdr(
    data: &[u8], max_width: usize, max_height: usize
) -> Result<PngInfo, PngDecodeErrors>
{
    if data.len() != 13
    {
        return Err(PngDecodeErrors::CorruptData(format!(
            "IHDR must be 13 bytes, got {}",
            data.len()
        )));
    }

    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

    if width == 0 || height == 0
    {
        return Err(PngDecodeErrors::CorruptData("IHDR declares a zero dimension".to_string()));
    }

    if width as usize > max_width || height as usize > max_height
    {
        return Err(PngDecodeErrors::ImageTooLarge {
            width: width as usize,
            height: height as usize,
            max_width,
            max_height
        });
    }

    let depth = data[8];
    let color = PngColor::from_int(data[9])
        .ok_or_else(|| PngDecodeErrors::UnsupportedFormat(format!("colour type {}", data[9])))?;

    if !depth_allowed(color, depth)
    {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "bit depth {depth} is not valid for colour type {color:?}"
        )));
    }

    if data[10] != 0
    {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "compression method {} (only 0 is defined)",
            data[10]
        )));
    }

    let filter_method = FilterMethod::from_int(data[11])
        .ok_or_else(|| PngDecodeErrors::UnsupportedFormat(format!("filter method {}", data[11])))?;

    let interlace_method = InterlaceMethod::from_int(data[12]).ok_or_else(|| {
        PngDecodeErrors::UnsupportedFormat(format!("interlace method {}", data[12]))
    })?;

    Ok(PngInfo {
        width,
        height,
        depth,
        color,
        component: color.num_components(),
        filter_method,
        interlace_method
    })
}

/// Parses a PLTE chunk into palette entries, defaulting every entry's
/// alpha to opaque (a later tRNS chunk may lower some of them).
pub(crate) fn parse_plte(data: &[u8]) -> Result<Vec<PLTEEntry>, PngDecodeErrors>
{
    if data.is_empty() || data.len() % 3 != 0
    {
        return Err(PngDecodeErrors::CorruptData(format!(
            "PLTE length {} is not a positive multiple of 3",
            data.len()
        )));
    }

    if data.len() / 3 > 256
    {
        return Err(PngDecodeErrors::CorruptData("PLTE declares more than 256 entries".to_string()));
    }

    Ok(data
        .chunks_exact(3)
        .map(|c| PLTEEntry { red: c[0], green: c[1], blue: c[2], alpha: 255 })
        .collect())
}

/// Applies a tRNS chunk. For palette images this lowers the alpha of
/// the first `data.len()` palette entries in place; for greyscale and
/// RGB images it instead returns the single sample value (or RGB
/// triplet) to treat as transparent.
pub(crate) fn parse_trns(
    data: &[u8], color: PngColor, palette: &mut [PLTEEntry]
) -> Result<Option<TrnsKey>, PngDecodeErrors>
{
    match color
    {
        PngColor::Palette =>
        {
            if data.len() > palette.len()
            {
                return Err(PngDecodeErrors::CorruptData(
                    "tRNS has more entries than PLTE".to_string()
                ));
            }

            for (entry, &alpha) in palette.iter_mut().zip(data.iter())
            {
                entry.alpha = alpha;
            }

            Ok(None)
        }
        PngColor::Luma =>
        {
            if data.len() != 2
            {
                return Err(PngDecodeErrors::CorruptData(
                    "tRNS for greyscale must be 2 bytes".to_string()
                ));
            }

            Ok(Some(TrnsKey { samples: [u16::from_be_bytes([data[0], data[1]]), 0, 0] }))
        }
        PngColor::RGB =>
        {
            if data.len() != 6
            {
                return Err(PngDecodeErrors::CorruptData(
                    "tRNS for RGB must be 6 bytes".to_string()
                ));
            }

            Ok(Some(TrnsKey {
                samples: [
                    u16::from_be_bytes([data[0], data[1]]),
                    u16::from_be_bytes([data[2], data[3]]),
                    u16::from_be_bytes([data[4], data[5]]),
                ]
            }))
        }
        PngColor::LumaA | PngColor::RGBA =>
        {
            Err(PngDecodeErrors::UnsupportedFormat(
                "tRNS is not valid alongside a colour type that already carries alpha".to_string()
            ))
        }
        PngColor::Unknown => unreachable!("validated at IHDR parse time")
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sample_ihdr(depth: u8, color: u8, interlace: u8) -> Vec<u8>
    {
        vec![0_u8, 0, 0, 4, 0, 0, 0, 4, depth, color, 0, 0, interlace]
    }

    #[test]
    fn parses_a_valid_8bit_rgba_header()
    {
        let info = parse_ihdr(&sample_ihdr(8, 6, 0), 1 << 20, 1 << 20).unwrap();

        assert_eq!(info.width, 4);
        assert_eq!(info.height, 4);
        assert_eq!(info.color, PngColor::RGBA);
        assert_eq!(info.component, 4);
        assert_eq!(info.interlace_method, InterlaceMethod::Standard);
    }

    #[test]
    fn rejects_16_bit_depth_as_unsupported()
    {
        let err = parse_ihdr(&sample_ihdr(16, 2, 0), 1 << 20, 1 << 20).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_depth_3_for_any_colour_type()
    {
        let err = parse_ihdr(&sample_ihdr(3, 0, 0), 1 << 20, 1 << 20).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_dimensions_over_the_configured_maximum()
    {
        let err = parse_ihdr(&sample_ihdr(8, 2, 0), 2, 2).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::ImageTooLarge { .. }));
    }

    #[test]
    fn trns_on_palette_lowers_matching_entries_alpha()
    {
        let mut palette = vec![PLTEEntry::default(); 3];
        let result = parse_trns(&[0, 128], PngColor::Palette, &mut palette).unwrap();

        assert!(result.is_none());
        assert_eq!(palette[0].alpha, 0);
        assert_eq!(palette[1].alpha, 128);
        assert_eq!(palette[2].alpha, 255);
    }

    #[test]
    fn trns_with_too_many_entries_is_corrupt_data()
    {
        let mut palette = vec![PLTEEntry::default(); 1];
        let err = parse_trns(&[0, 0, 0], PngColor::Palette, &mut palette).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn trns_on_rgba_is_rejected()
    {
        let mut palette: Vec<PLTEEntry> = Vec::new();
        let err = parse_trns(&[0, 0], PngColor::RGBA, &mut palette).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::UnsupportedFormat(_)));
    }
}
