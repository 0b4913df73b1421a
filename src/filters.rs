//! The five PNG scanline filters, reversed in place.
//!
//! Each function is handed the *content* bytes of a scanline (the
//! leading filter-type byte already stripped and consumed by the
//! caller) plus the previous scanline's already-defiltered bytes. The
//! previous-scanline buffer is expected to be all zero at the start of
//! a pass, which makes `Up`/`Average`/`Paeth` degenerate correctly for
//! a pass's first row without any special-cased "first row" variants.

use crate::enums::FilterType;
use crate::error::PngDecodeErrors;

/// Reverses the filter named by `filter_byte`, operating in place on
/// `current`. `previous` must be the same length as `current` (padded
/// with zeros past the end of a shorter sub-scanline is not needed
/// since Adam7 passes each get their own correctly sized buffers).
pub(crate) fn unfilter_row(
    filter_byte: u8, current: &mut [u8], previous: &[u8], bpp: usize
) -> Result<(), PngDecodeErrors>
{
    let filter = FilterType::from_int(filter_byte).ok_or_else(|| {
        PngDecodeErrors::CorruptData(format!("unknown scanline filter type {filter_byte}"))
    })?;

    match filter
    {
        FilterType::None => {}
        FilterType::Sub => unfilter_sub(current, bpp),
        FilterType::Up => unfilter_up(current, previous),
        FilterType::Average => unfilter_average(current, previous, bpp),
        FilterType::Paeth => unfilter_paeth(current, previous, bpp)
    }

    Ok(())
}

fn unfilter_sub(current: &mut [u8], bpp: usize)
{
    for i in bpp..current.len()
    {
        current[i] = current[i].wrapping_add(current[i - bpp]);
    }
}

fn unfilter_up(current: &mut [u8], previous: &[u8])
{
    for (x, &b) in current.iter_mut().zip(previous.iter())
    {
        *x = x.wrapping_add(b);
    }
}

fn unfilter_average(current: &mut [u8], previous: &[u8], bpp: usize)
{
    for i in 0..current.len()
    {
        let a = if i >= bpp { current[i - bpp] } else { 0 };
        let b = previous[i];

        current[i] = current[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8);
    }
}

fn unfilter_paeth(current: &mut [u8], previous: &[u8], bpp: usize)
{
    for i in 0..current.len()
    {
        let a = if i >= bpp { current[i - bpp] } else { 0 };
        let b = previous[i];
        let c = if i >= bpp { previous[i - bpp] } else { 0 };

        current[i] = current[i].wrapping_add(paeth_predictor(a, b, c));
    }
}

/// Picks whichever of `a` (left), `b` (up) or `c` (upper-left) is
/// closest to `a + b - c`; ties break to `a`, then `b`, then `c`.
pub(crate) fn paeth_predictor(a: u8, b: u8, c: u8) -> u8
{
    let (a, b, c) = (i16::from(a), i16::from(b), i16::from(c));
    let p = a + b - c;

    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc
    {
        a as u8
    }
    else if pb <= pc
    {
        b as u8
    }
    else
    {
        c as u8
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn paeth_reference_matches_all_corner_values()
    {
        // brute-force check against the textbook definition for every
        // combination of the three "extreme" byte values.
        for &a in &[0_u8, 128, 255]
        {
            for &b in &[0_u8, 128, 255]
            {
                for &c in &[0_u8, 128, 255]
                {
                    let (ai, bi, ci) = (i32::from(a), i32::from(b), i32::from(c));
                    let p = ai + bi - ci;
                    let pa = (p - ai).abs();
                    let pb = (p - bi).abs();
                    let pc = (p - ci).abs();

                    let expected = if pa <= pb && pa <= pc
                    {
                        a
                    }
                    else if pb <= pc
                    {
                        b
                    }
                    else
                    {
                        c
                    };

                    assert_eq!(paeth_predictor(a, b, c), expected);
                }
            }
        }
    }

    #[test]
    fn sub_filter_scenario()
    {
        // One RGB row, width 2, depth 8.
        let mut current = vec![10, 20, 30, 5, 5, 5];
        let previous = vec![0; 6];

        unfilter_row(1, &mut current, &previous, 3).unwrap();

        assert_eq!(current, vec![10, 20, 30, 15, 25, 35]);
    }

    #[test]
    fn paeth_first_row_scenario()
    {
        // One RGB row, width 3, depth 8, Paeth filter on the first row of a pass.
        let mut current = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        let previous = vec![0; 9];

        unfilter_row(4, &mut current, &previous, 3).unwrap();

        assert_eq!(current, vec![1, 2, 3, 5, 7, 9, 12, 15, 18]);
    }

    #[test]
    fn unknown_filter_byte_is_corrupt_data()
    {
        let mut current = vec![0; 4];
        let previous = vec![0; 4];

        let err = unfilter_row(5, &mut current, &previous, 1).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn first_row_idempotence()
    {
        // Applying a filter then its inverse on a zero-filled previous
        // row should round-trip for every filter type.
        let original = vec![5_u8, 250, 1, 77, 128, 200];
        let bpp = 2;

        for filter in [0_u8, 1, 2, 3, 4]
        {
            let mut forward = original.clone();
            let previous = vec![0_u8; forward.len()];

            // Forward-filter manually (mirrors each filter's own definition).
            match filter
            {
                0 => {}
                1 =>
                {
                    for i in (bpp..forward.len()).rev()
                    {
                        forward[i] = forward[i].wrapping_sub(forward[i - bpp]);
                    }
                }
                2 => { /* up with an all-zero previous row is a no-op */ }
                3 =>
                {
                    for i in (0..forward.len()).rev()
                    {
                        let a = if i >= bpp { forward[i - bpp] } else { 0 };
                        forward[i] = forward[i].wrapping_sub((u16::from(a) / 2) as u8);
                    }
                }
                4 =>
                {
                    for i in (0..forward.len()).rev()
                    {
                        let a = if i >= bpp { forward[i - bpp] } else { 0 };
                        forward[i] = forward[i].wrapping_sub(paeth_predictor(a, 0, 0));
                    }
                }
                _ => unreachable!()
            }

            let mut roundtrip = forward;
            unfilter_row(filter, &mut roundtrip, &previous, bpp).unwrap();

            assert_eq!(roundtrip, original, "filter type {filter} did not round-trip");
        }
    }
}
