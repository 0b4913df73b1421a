//! Incremental zlib/DEFLATE consumption across IDAT chunk boundaries.
//!
//! Wraps `flate2::Decompress` in its low-level streaming mode, so an
//! image's compressed data can be split across an arbitrary number of
//! IDAT chunks without the caller having them all on hand up front.

use std::io::Read;
use std::mem;

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::PngDecodeErrors;

/// How many raw bytes to pull from the reader at once while staging
/// input for the inflater. Unrelated to the IDAT chunk boundaries,
/// just an I/O granularity.
const STAGING_CHUNK: usize = 8 * 1024;

pub(crate) struct ZlibFrameAdapter
{
    inflater:       Decompress,
    /// Raw bytes of the current IDAT chunk not yet read from the
    /// underlying reader.
    idat_remaining: u32,
    staging:        Vec<u8>,
    staging_pos:    usize,
    hasher:         crc32fast::Hasher,
    confirm_crc:    bool,
    finished:       bool
}

impl ZlibFrameAdapter
{
    pub(crate) fn new(confirm_crc: bool) -> ZlibFrameAdapter
    {
        ZlibFrameAdapter {
            inflater: Decompress::new(true),
            idat_remaining: 0,
            staging: Vec::new(),
            staging_pos: 0,
            hasher: crc32fast::Hasher::new(),
            confirm_crc,
            finished: false
        }
    }

    /// Registers a new IDAT chunk's declared length and reseeds the CRC
    /// accumulator with the chunk type bytes.
    pub(crate) fn begin_idat(&mut self, length: u32)
    {
        self.idat_remaining = length;
        self.hasher = crc32fast::Hasher::new();
        self.hasher.update(b"IDAT");
        self.staging.clear();
        self.staging_pos = 0;
    }

    pub(crate) const fn is_finished(&self) -> bool
    {
        self.finished
    }

    /// Refills the staging buffer from `reader` if it's exhausted.
    /// Returns whether any input is available for the inflater.
    fn fill_staging<R: Read>(&mut self, reader: &mut R) -> Result<bool, PngDecodeErrors>
    {
        if self.staging_pos < self.staging.len()
        {
            return Ok(true);
        }

        if self.idat_remaining == 0
        {
            return Ok(false);
        }

        let want = self.idat_remaining.min(STAGING_CHUNK as u32) as usize;
        let mut buf = vec![0_u8; want];
        reader
            .read_exact(&mut buf)
            .map_err(|_| PngDecodeErrors::TruncatedStream("IDAT data"))?;

        if self.confirm_crc
        {
            self.hasher.update(&buf);
        }

        self.idat_remaining -= want as u32;
        self.staging = buf;
        self.staging_pos = 0;

        Ok(true)
    }

    /// Fills `dst` with inflated bytes, pulling fresh input from
    /// `reader` as needed. Returns `0` either because the current IDAT
    /// chunk ran out ([`ZlibFrameAdapter::is_finished`] is `false`, the
    /// caller must supply the next one) or the DEFLATE stream ended
    /// ([`ZlibFrameAdapter::is_finished`] is `true`).
    pub(crate) fn read_inflated<R: Read>(
        &mut self, reader: &mut R, dst: &mut [u8]
    ) -> Result<usize, PngDecodeErrors>
    {
        if self.finished
        {
            return Ok(0);
        }

        loop
        {
            let have_input = self.fill_staging(reader)?;
            let flush = if have_input { FlushDecompress::None } else { FlushDecompress::Finish };

            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();

            let status = self
                .inflater
                .decompress(&self.staging[self.staging_pos..], dst, flush)
                .map_err(|e| PngDecodeErrors::CorruptData(format!("zlib stream error: {e}")))?;

            let consumed = (self.inflater.total_in() - before_in) as usize;
            let produced = (self.inflater.total_out() - before_out) as usize;
            self.staging_pos += consumed;

            if status == Status::StreamEnd
            {
                self.finished = true;
                return Ok(produced);
            }

            if produced > 0
            {
                return Ok(produced);
            }

            if !have_input
            {
                // Nothing more to feed and nothing produced: the
                // caller needs to supply the next IDAT chunk.
                return Ok(0);
            }

            if consumed == 0
            {
                return Err(PngDecodeErrors::CorruptData(
                    "zlib stream made no progress on a full input buffer".to_string()
                ));
            }
        }
    }

    /// Reads and hashes any unconsumed bytes of the current IDAT chunk,
    /// e.g. trailing Adler-32 bytes the inflater didn't need.
    pub(crate) fn drain_remaining<R: Read>(&mut self, reader: &mut R) -> Result<(), PngDecodeErrors>
    {
        while self.idat_remaining > 0
        {
            self.fill_staging(reader)?;
            self.staging_pos = self.staging.len();
        }

        Ok(())
    }

    /// Compares the accumulated CRC against the value stored in the
    /// file for the current IDAT chunk, then resets the accumulator.
    pub(crate) fn finalize_idat_crc(&mut self, crc_from_file: u32) -> Result<(), PngDecodeErrors>
    {
        if !self.confirm_crc
        {
            return Ok(());
        }

        let hasher = mem::replace(&mut self.hasher, crc32fast::Hasher::new());
        let calculated = hasher.finalize();

        if calculated != crc_from_file
        {
            return Err(PngDecodeErrors::CorruptData(format!(
                "CRC mismatch in IDAT chunk: expected {crc_from_file:08x}, calculated \
                 {calculated:08x}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use std::io::Cursor;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    use super::*;

    fn zlib_compress(data: &[u8]) -> Vec<u8>
    {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_a_single_idat_chunk_fully()
    {
        let plain = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = zlib_compress(&plain);

        let mut adapter = ZlibFrameAdapter::new(false);
        adapter.begin_idat(compressed.len() as u32);

        let mut reader = Cursor::new(compressed);
        let mut out = Vec::new();
        let mut buf = [0_u8; 64];

        loop
        {
            let n = adapter.read_inflated(&mut reader, &mut buf).unwrap();
            if n == 0
            {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        assert!(adapter.is_finished());
        assert_eq!(out, plain);
    }

    #[test]
    fn resumes_across_a_chunk_boundary_mid_stream()
    {
        let plain = b"split across two IDAT chunks, byte for byte".repeat(8);
        let compressed = zlib_compress(&plain);
        let midpoint = compressed.len() / 2;
        let (first_half, second_half) = compressed.split_at(midpoint);

        let mut adapter = ZlibFrameAdapter::new(false);
        let mut out = Vec::new();
        let mut buf = [0_u8; 32];

        adapter.begin_idat(first_half.len() as u32);
        let mut reader = Cursor::new(first_half.to_vec());
        loop
        {
            let n = adapter.read_inflated(&mut reader, &mut buf).unwrap();
            if n == 0
            {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert!(!adapter.is_finished());

        adapter.begin_idat(second_half.len() as u32);
        let mut reader = Cursor::new(second_half.to_vec());
        loop
        {
            let n = adapter.read_inflated(&mut reader, &mut buf).unwrap();
            if n == 0
            {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        assert!(adapter.is_finished());
        assert_eq!(out, plain);
    }
}
