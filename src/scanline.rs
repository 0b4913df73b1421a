//! The scanline engine: pulls one filter byte plus one row of content
//! bytes at a time out of the zlib adapter (which may need several
//! calls, and several IDAT chunks, to satisfy a single row), reverses
//! the row's filter, and hands the result to the pixel expander.

use std::io::Read;

use crate::enums::PngColor;
use crate::error::PngDecodeErrors;
use crate::filters;
use crate::interlace::Pass;
use crate::palette::{PLTEEntry, TrnsKey};
use crate::pixels::{self, PixelSink};
use crate::zlib::ZlibFrameAdapter;

/// Bytes needed to hold one pixel's samples, rounded up; the unit the
/// `Sub`/`Average`/`Paeth` filters look back by. PNG defines this as
/// never less than 1, which holds automatically here since every
/// colour type with a sub-byte bit depth has exactly one component.
pub(crate) fn bytes_per_pixel(color: PngColor, depth: u8) -> usize
{
    ((usize::from(color.num_components()) * usize::from(depth)) + 7) / 8
}

/// Bytes needed for one full-width scanline's content (filter byte not
/// included), for a (sub-)image of the given pixel width.
pub(crate) fn bytes_per_scanline(width: usize, color: PngColor, depth: u8) -> usize
{
    (width * usize::from(color.num_components()) * usize::from(depth) + 7) / 8
}

/// Keeps pulling inflated bytes into `dst[*filled..]` until it's full.
///
/// Returns `Ok(true)` once `dst` is completely filled, or `Ok(false)`
/// if the current IDAT chunk ran out of input first. The caller must
/// register the next IDAT chunk with the adapter and call this again.
pub(crate) fn pull_exact<R: Read>(
    adapter: &mut ZlibFrameAdapter, reader: &mut R, dst: &mut [u8], filled: &mut usize
) -> Result<bool, PngDecodeErrors>
{
    while *filled < dst.len()
    {
        let n = adapter.read_inflated(reader, &mut dst[*filled..])?;

        if n == 0
        {
            if adapter.is_finished()
            {
                return Err(PngDecodeErrors::TruncatedStream(
                    "compressed data ended before the image was fully decoded"
                ));
            }

            return Ok(false);
        }

        *filled += n;
    }

    Ok(true)
}

/// The two scanline buffers for one Adam7 pass (or the single
/// degenerate pass of a non-interlaced image), plus the bookkeeping
/// needed to resume filling a row across chunk boundaries.
pub(crate) struct RowState
{
    pub current:  Vec<u8>,
    pub previous: Vec<u8>,
    pub filter_byte: Option<u8>,
    pub filled:   usize
}

impl RowState
{
    pub(crate) fn for_width(row_bytes: usize) -> RowState
    {
        RowState {
            current: vec![0_u8; row_bytes],
            previous: vec![0_u8; row_bytes],
            filter_byte: None,
            filled: 0
        }
    }

    pub(crate) fn start_new_row(&mut self)
    {
        self.filter_byte = None;
        self.filled = 0;
    }

    pub(crate) fn is_row_complete(&self) -> bool
    {
        self.filter_byte.is_some() && self.filled == self.current.len()
    }

    /// Pulls whatever bytes of the filter byte and row content are
    /// currently available. Returns `Ok(true)` once the whole row
    /// (filter byte + content) has arrived, `Ok(false)` if the current
    /// IDAT chunk ran dry first. Call again after the caller has
    /// registered the next IDAT chunk with `adapter`.
    pub(crate) fn advance<R: Read>(
        &mut self, adapter: &mut ZlibFrameAdapter, reader: &mut R
    ) -> Result<bool, PngDecodeErrors>
    {
        if self.filter_byte.is_none()
        {
            let mut fb = [0_u8; 1];
            let mut fb_filled = 0_usize;

            if !pull_exact(adapter, reader, &mut fb, &mut fb_filled)?
            {
                return Ok(false);
            }

            self.filter_byte = Some(fb[0]);
        }

        pull_exact(adapter, reader, &mut self.current, &mut self.filled)
    }

    /// Reverses this row's filter and expands it into `sink`, then
    /// copies `current` into `previous` ready for the next row.
    /// `width` is the pixel width of this (sub-)scanline.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn finish_row(
        &mut self, bpp: usize, width: usize, color: PngColor, depth: u8, palette: &[PLTEEntry],
        trns: Option<TrnsKey>, pass: &Pass, pass_row: usize, sink: &mut dyn PixelSink
    ) -> Result<(), PngDecodeErrors>
    {
        let filter_byte = self
            .filter_byte
            .expect("finish_row called before the row's filter byte was read");

        filters::unfilter_row(filter_byte, &mut self.current, &self.previous, bpp)?;

        let dst_row = pass.dst_row(pass_row);

        pixels::expand_row(&self.current, color, depth, palette, trns, width, |col, rgba| {
            sink.write_rgba8(dst_row, pass.dst_col(col), rgba[0], rgba[1], rgba[2], rgba[3]);
        })?;

        self.previous.copy_from_slice(&self.current);

        Ok(())
    }
}
