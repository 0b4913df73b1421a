//! The orchestrator tying chunk framing, header validation, zlib
//! streaming, scanline filtering and Adam7 reconstruction together
//! behind one `decode` call.

use std::io::Read;

use log::{debug, warn};

use crate::chunk::{self, ChunkHeader};
use crate::constants::PNG_SIGNATURE;
use crate::enums::{InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngDecodeErrors;
use crate::header::{self, PngInfo};
use crate::interlace::Pass;
use crate::metadata::{self, PngMetadata};
use crate::options::PngOptions;
use crate::palette::{PLTEEntry, TrnsKey};
use crate::pixels::{PixelSink, RgbaBuffer};
use crate::pool::BufferPool;
use crate::scanline;
use crate::zlib::ZlibFrameAdapter;

/// The subset of IHDR a caller typically wants without reaching into
/// this crate's internal representation.
#[derive(Copy, Clone, Debug)]
pub struct ImageInfo
{
    pub width:      u32,
    pub height:     u32,
    pub bit_depth:  u8,
    pub color_type: PngColor,
    pub interlaced: bool
}

enum ChunkLoopExit
{
    FirstIdat(ChunkHeader),
    End
}

/// Decodes a PNG stream from any [`Read`] source into RGBA8 pixels.
///
/// Construct with [`PngDecoder::new`], then call [`PngDecoder::decode`]
/// with a [`PixelSink`] of your choice, or [`PngDecoder::decode_to_rgba`]
/// for a convenience buffer. [`PngDecoder::image_info`] reads just far
/// enough to report dimensions and colour type.
pub struct PngDecoder<R: Read>
{
    reader:       R,
    options:      PngOptions,
    pool:         BufferPool,
    info:         Option<PngInfo>,
    palette:      Vec<PLTEEntry>,
    trns:         Option<TrnsKey>,
    metadata:     PngMetadata,
    pending_idat: Option<ChunkHeader>,
    headers_done: bool
}

impl<R: Read> PngDecoder<R>
{
    pub fn new(reader: R) -> PngDecoder<R>
    {
        Self::new_with_options(reader, PngOptions::default())
    }

    pub fn new_with_options(reader: R, options: PngOptions) -> PngDecoder<R>
    {
        PngDecoder {
            reader,
            options,
            pool: BufferPool::new(),
            info: None,
            palette: Vec::new(),
            trns: None,
            metadata: PngMetadata::default(),
            pending_idat: None,
            headers_done: false
        }
    }

    /// Reads the signature and every chunk up to (not including) the
    /// first IDAT, returning the image's dimensions and colour type.
    pub fn image_info(&mut self) -> Result<ImageInfo, PngDecodeErrors>
    {
        self.decode_headers()?;
        let info = self.info.expect("decode_headers always sets info on success");

        Ok(ImageInfo {
            width:      info.width,
            height:     info.height,
            bit_depth:  info.depth,
            color_type: info.color,
            interlaced: matches!(info.interlace_method, InterlaceMethod::Adam7)
        })
    }

    /// Decodes straight into a freshly allocated [`RgbaBuffer`] sized
    /// to the image's declared dimensions.
    pub fn decode_to_rgba(&mut self) -> Result<(RgbaBuffer, PngMetadata), PngDecodeErrors>
    {
        self.decode_headers()?;
        let info = self.info.expect("decode_headers always sets info on success");
        let mut buffer = RgbaBuffer::new(info.width as usize, info.height as usize);
        let metadata = self.decode(&mut buffer)?;

        Ok((buffer, metadata))
    }

    /// Decodes the image's pixels into `sink`, reconstructing Adam7
    /// interlacing if present. Calls [`PngDecoder::decode_headers`]
    /// first if it hasn't run yet.
    pub fn decode<S: PixelSink>(&mut self, sink: &mut S) -> Result<PngMetadata, PngDecodeErrors>
    {
        self.decode_headers()?;
        let info = self.info.expect("decode_headers always sets info on success");

        let idat_header = self.pending_idat.take().ok_or_else(|| {
            PngDecodeErrors::CorruptData("decode() was already called on this decoder".to_string())
        })?;

        if info.color == PngColor::Palette && self.palette.is_empty()
        {
            return Err(PngDecodeErrors::CorruptData(
                "palette colour type with no PLTE chunk".to_string()
            ));
        }

        let mut zlib = ZlibFrameAdapter::new(self.options.get_confirm_crc());
        zlib.begin_idat(idat_header.length);

        let bpp = scanline::bytes_per_pixel(info.color, info.depth);
        let passes: &[Pass] = match info.interlace_method
        {
            InterlaceMethod::Standard => std::slice::from_ref(&Pass::FULL),
            InterlaceMethod::Adam7 => &Pass::ADAM7
        };

        for pass in passes
        {
            let (sub_width, sub_height) = pass.sub_dims(info.width as usize, info.height as usize);
            if sub_width == 0 || sub_height == 0
            {
                continue;
            }

            let row_bytes = scanline::bytes_per_scanline(sub_width, info.color, info.depth);
            let mut row = scanline::RowState::for_width(row_bytes);

            for pass_row in 0..sub_height
            {
                row.start_new_row();

                while !row.advance(&mut zlib, &mut self.reader)?
                {
                    self.advance_idat_chunk(&mut zlib)?;
                }

                row.finish_row(
                    bpp,
                    sub_width,
                    info.color,
                    info.depth,
                    &self.palette,
                    self.trns,
                    pass,
                    pass_row,
                    sink
                )?;
            }
        }

        self.finish_after_image_data(&mut zlib)?;

        Ok(std::mem::take(&mut self.metadata))
    }

    /// Reads the signature and every chunk before the first IDAT,
    /// validating and stashing what each one means. A no-op if already
    /// called.
    pub fn decode_headers(&mut self) -> Result<(), PngDecodeErrors>
    {
        if self.headers_done
        {
            return Ok(());
        }

        self.read_signature()?;

        match self.run_chunk_loop(true)?
        {
            ChunkLoopExit::FirstIdat(header) =>
            {
                self.pending_idat = Some(header);
                self.headers_done = true;
                Ok(())
            }
            ChunkLoopExit::End =>
            {
                Err(PngDecodeErrors::CorruptData("no IDAT chunk before IEND".to_string()))
            }
        }
    }

    fn read_signature(&mut self) -> Result<(), PngDecodeErrors>
    {
        let mut signature = [0_u8; 8];
        chunk::read_exact_or_truncated(&mut self.reader, &mut signature, "PNG signature")?;

        if self.options.get_strict_signature() && signature != PNG_SIGNATURE
        {
            return Err(PngDecodeErrors::CorruptData(
                "stream does not start with the PNG signature".to_string()
            ));
        }

        Ok(())
    }

    /// Drives the chunk dispatch used both before the first IDAT and
    /// after the last one. With `stop_at_first_idat`, returns as soon
    /// as an IDAT header is read (without consuming its data); without
    /// it, any further IDAT chunks are treated as opaque trailing data
    /// and skipped whole.
    fn run_chunk_loop(&mut self, stop_at_first_idat: bool) -> Result<ChunkLoopExit, PngDecodeErrors>
    {
        loop
        {
            let chunk_header = match chunk::read_chunk_header(&mut self.reader)?
            {
                Some(header) => header,
                // Stream ended cleanly right at a chunk boundary, having
                // never produced an IEND chunk.
                None => return Err(PngDecodeErrors::MissingEnd)
            };
            let confirm_crc = self.options.get_confirm_crc();

            match chunk_header.chunk_type
            {
                PngChunkType::IHDR =>
                {
                    if self.info.is_some()
                    {
                        return Err(PngDecodeErrors::CorruptData(
                            "duplicate IHDR chunk".to_string()
                        ));
                    }

                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    let info = header::parse_ihdr(
                        &data,
                        self.options.get_max_width(),
                        self.options.get_max_height()
                    )?;
                    debug!(
                        "IHDR: {}x{} depth={} color={:?} interlace={:?}",
                        info.width, info.height, info.depth, info.color, info.interlace_method
                    );
                    self.info = Some(info);
                    self.pool.give_back(data);
                }
                PngChunkType::PLTE =>
                {
                    let info = self.info_or_err()?;
                    if !matches!(info.color, PngColor::Palette | PngColor::RGB | PngColor::RGBA)
                    {
                        return Err(PngDecodeErrors::UnsupportedFormat(
                            "PLTE is not valid for this colour type".to_string()
                        ));
                    }
                    if !self.palette.is_empty()
                    {
                        return Err(PngDecodeErrors::CorruptData(
                            "duplicate PLTE chunk".to_string()
                        ));
                    }

                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    self.palette = header::parse_plte(&data)?;
                    self.pool.give_back(data);
                }
                PngChunkType::tRNS =>
                {
                    let info = self.info_or_err()?;
                    if self.trns.is_some() && self.options.get_strict_mode()
                    {
                        return Err(PngDecodeErrors::CorruptData(
                            "duplicate tRNS chunk".to_string()
                        ));
                    }

                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    self.trns = header::parse_trns(&data, info.color, &mut self.palette)?;
                    self.pool.give_back(data);
                }
                PngChunkType::pHYs =>
                {
                    if self.metadata.physical_dimensions.is_some()
                    {
                        self.reject_or_warn_duplicate("pHYs")?;
                    }
                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    let phys = metadata::parse_phys(&data)?;
                    self.pool.give_back(data);
                    if self.metadata.physical_dimensions.is_none()
                    {
                        self.metadata.physical_dimensions = Some(phys);
                    }
                }
                PngChunkType::gAMA =>
                {
                    if self.metadata.gamma.is_some()
                    {
                        self.reject_or_warn_duplicate("gAMA")?;
                    }
                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    let gamma = metadata::parse_gama(&data)?;
                    self.pool.give_back(data);
                    if self.metadata.gamma.is_none()
                    {
                        self.metadata.gamma = Some(gamma);
                    }
                }
                PngChunkType::tIME =>
                {
                    if self.metadata.timestamp.is_some()
                    {
                        self.reject_or_warn_duplicate("tIME")?;
                    }
                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    let time = metadata::parse_time(&data)?;
                    self.pool.give_back(data);
                    if self.metadata.timestamp.is_none()
                    {
                        self.metadata.timestamp = Some(time);
                    }
                }
                PngChunkType::tEXt =>
                {
                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    if !self.options.get_ignore_metadata()
                    {
                        self.metadata
                            .text
                            .push(metadata::parse_text(&data, self.options.get_text_encoding())?);
                    }
                    self.pool.give_back(data);
                }
                PngChunkType::acTL => return Err(PngDecodeErrors::UnsupportedApng),
                PngChunkType::IDAT =>
                {
                    if self.info.is_none()
                    {
                        return Err(PngDecodeErrors::CorruptData("IDAT before IHDR".to_string()));
                    }

                    if stop_at_first_idat
                    {
                        return Ok(ChunkLoopExit::FirstIdat(chunk_header));
                    }

                    let data = chunk::read_chunk_data(
                        &mut self.reader,
                        &chunk_header,
                        &mut self.pool,
                        confirm_crc
                    )?;
                    self.pool.give_back(data);
                }
                PngChunkType::IEND => return Ok(ChunkLoopExit::End),
                PngChunkType::unkn =>
                {
                    if PngChunkType::is_critical(&chunk_header.name)
                    {
                        return Err(PngDecodeErrors::UnsupportedFormat(format!(
                            "unrecognised critical chunk {:?}",
                            String::from_utf8_lossy(&chunk_header.name)
                        )));
                    }

                    debug!(
                        "skipping ancillary chunk {:?} ({} bytes)",
                        String::from_utf8_lossy(&chunk_header.name),
                        chunk_header.length
                    );
                    (self.options.chunk_handler())(
                        chunk_header.length as usize,
                        chunk_header.name,
                        &mut self.reader
                    )?;
                }
            }
        }
    }

    fn info_or_err(&self) -> Result<PngInfo, PngDecodeErrors>
    {
        self.info
            .ok_or_else(|| PngDecodeErrors::CorruptData("chunk appeared before IHDR".to_string()))
    }

    /// A duplicate single-instance ancillary chunk (pHYs, gAMA, tIME) is a
    /// hard error under `strict_mode`; otherwise the first occurrence wins
    /// and the repeat is just logged.
    fn reject_or_warn_duplicate(&self, name: &'static str) -> Result<(), PngDecodeErrors>
    {
        if self.options.get_strict_mode()
        {
            return Err(PngDecodeErrors::CorruptData(format!("duplicate {name} chunk")));
        }

        warn!("duplicate {name} chunk, keeping the first occurrence");
        Ok(())
    }

    /// Called when a scanline needs bytes beyond what the current IDAT
    /// chunk has left: validates that chunk's CRC, then requires the
    /// very next chunk to be another IDAT.
    fn advance_idat_chunk(&mut self, zlib: &mut ZlibFrameAdapter) -> Result<(), PngDecodeErrors>
    {
        zlib.drain_remaining(&mut self.reader)?;

        let mut crc_buf = [0_u8; 4];
        chunk::read_exact_or_truncated(&mut self.reader, &mut crc_buf, "IDAT CRC")?;
        zlib.finalize_idat_crc(u32::from_be_bytes(crc_buf))?;

        let next = chunk::read_chunk_header(&mut self.reader)?;
        match next
        {
            Some(header) if header.chunk_type == PngChunkType::IDAT =>
            {
                zlib.begin_idat(header.length);
                Ok(())
            }
            _ => Err(PngDecodeErrors::TruncatedStream(
                "image data ended before all scanlines were read"
            ))
        }
    }

    /// Closes out the final IDAT chunk (draining any bytes the
    /// inflater never needed, e.g. trailing Adler-32 padding) and
    /// processes every chunk after it up to and including IEND.
    fn finish_after_image_data(&mut self, zlib: &mut ZlibFrameAdapter) -> Result<(), PngDecodeErrors>
    {
        zlib.drain_remaining(&mut self.reader)?;

        let mut crc_buf = [0_u8; 4];
        chunk::read_exact_or_truncated(&mut self.reader, &mut crc_buf, "IDAT CRC")?;
        zlib.finalize_idat_crc(u32::from_be_bytes(crc_buf))?;

        match self.run_chunk_loop(false)?
        {
            ChunkLoopExit::End => Ok(()),
            ChunkLoopExit::FirstIdat(_) =>
            {
                unreachable!("run_chunk_loop(false) never stops at an IDAT chunk")
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::io::{Cursor, Write};

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;

    fn chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8>
    {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(data);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(chunk_type);
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());

        out
    }

    /// Builds a minimal, valid, non-interlaced 2x2 8-bit RGB PNG with
    /// solid colours, split across two IDAT chunks to exercise the
    /// streaming path.
    fn two_by_two_rgb_png() -> Vec<u8>
    {
        let mut raw = Vec::new();
        for _ in 0..2
        {
            raw.push(0); // filter type None
            raw.extend_from_slice(&[10, 20, 30]);
            raw.extend_from_slice(&[40, 50, 60]);
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let compressed = encoder.finish().unwrap();
        let midpoint = compressed.len() / 2;
        let (first, second) = compressed.split_at(midpoint);

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2_u32.to_be_bytes());
        ihdr.extend_from_slice(&2_u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);

        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend(chunk(b"IHDR", &ihdr));
        bytes.extend(chunk(b"IDAT", first));
        bytes.extend(chunk(b"IDAT", second));
        bytes.extend(chunk(b"IEND", &[]));

        bytes
    }

    #[test]
    fn decodes_a_minimal_rgb_image_split_across_two_idat_chunks()
    {
        let bytes = two_by_two_rgb_png();
        let mut decoder = PngDecoder::new(Cursor::new(bytes));

        let (buffer, _metadata) = decoder.decode_to_rgba().unwrap();

        assert_eq!(buffer.width, 2);
        assert_eq!(buffer.height, 2);
        assert_eq!(buffer.pixel_at(0, 0), [10, 20, 30, 255]);
        assert_eq!(buffer.pixel_at(0, 1), [40, 50, 60, 255]);
        assert_eq!(buffer.pixel_at(1, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn image_info_reports_dimensions_without_decoding_pixels()
    {
        let bytes = two_by_two_rgb_png();
        let mut decoder = PngDecoder::new(Cursor::new(bytes));

        let info = decoder.image_info().unwrap();
        assert_eq!(info.width, 2);
        assert_eq!(info.height, 2);
        assert_eq!(info.color_type, PngColor::RGB);
        assert!(!info.interlaced);
    }

    #[test]
    fn decoding_twice_is_an_error_not_a_panic()
    {
        let bytes = two_by_two_rgb_png();
        let mut decoder = PngDecoder::new(Cursor::new(bytes));

        decoder.decode_to_rgba().unwrap();
        let err = decoder.decode_to_rgba().unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn rejects_a_bad_signature()
    {
        let mut bytes = two_by_two_rgb_png();
        bytes[0] = 0;

        let mut decoder = PngDecoder::new(Cursor::new(bytes));
        let err = decoder.decode_headers().unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn rejects_idat_before_ihdr()
    {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend(chunk(b"IDAT", &[]));

        let mut decoder = PngDecoder::new(Cursor::new(bytes));
        let err = decoder.decode_headers().unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn truncated_idat_data_is_a_truncated_stream_error()
    {
        let mut bytes = two_by_two_rgb_png();
        bytes.truncate(bytes.len() - 20);

        let mut decoder = PngDecoder::new(Cursor::new(bytes));
        let err = decoder.decode_to_rgba().unwrap_err();
        // Depending on exactly where the cut lands, this is a truncated
        // zlib stream, a truncated IDAT CRC, or a clean EOF right at a
        // chunk boundary with no IEND ever observed.
        assert!(matches!(
            err,
            PngDecodeErrors::TruncatedStream(_)
                | PngDecodeErrors::CorruptData(_)
                | PngDecodeErrors::MissingEnd
        ));
    }
}
