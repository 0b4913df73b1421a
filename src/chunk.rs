//! Chunk framing: the length/type/data/CRC record layout shared by
//! every PNG chunk, plus the IDAT special case that lets the caller
//! hand compressed bytes to the zlib adapter instead of buffering them.

use std::io::Read;

use crate::enums::PngChunkType;
use crate::error::PngDecodeErrors;
use crate::pool::BufferPool;

/// A chunk's length and type, read before its data. For IDAT this is
/// all the decoder reads up front: the data bytes are streamed
/// straight into the zlib adapter by the caller instead of being
/// buffered here.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ChunkHeader
{
    pub length:     u32,
    pub chunk_type: PngChunkType,
    pub name:       [u8; 4]
}

pub(crate) fn read_exact_or_truncated<R: Read>(
    reader: &mut R, buf: &mut [u8], what: &'static str
) -> Result<(), PngDecodeErrors>
{
    match reader.read_exact(buf)
    {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof =>
        {
            Err(PngDecodeErrors::TruncatedStream(what))
        }
        Err(e) => Err(PngDecodeErrors::Io(e))
    }
}

/// Reads exactly `buf.len()` bytes. A clean end-of-stream (zero bytes
/// available before any were read) reports `Ok(false)`; a partial read
/// (1 or more bytes, then EOF) is `TruncatedStream`.
fn try_read_exact<R: Read>(
    reader: &mut R, buf: &mut [u8], what: &'static str
) -> Result<bool, PngDecodeErrors>
{
    let mut filled = 0;
    while filled < buf.len()
    {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0
        {
            if filled == 0
            {
                return Ok(false);
            }
            return Err(PngDecodeErrors::TruncatedStream(what));
        }
        filled += n;
    }

    Ok(true)
}

/// Reads the 4-byte length and 4-byte type of the next chunk, or `None`
/// if the stream ends cleanly exactly at this chunk boundary. A length
/// with the high bit set is rejected outright rather than reinterpreted.
pub(crate) fn read_chunk_header<R: Read>(
    reader: &mut R
) -> Result<Option<ChunkHeader>, PngDecodeErrors>
{
    let mut len_buf = [0_u8; 4];
    if !try_read_exact(reader, &mut len_buf, "chunk length")?
    {
        return Ok(None);
    }

    let length = u32::from_be_bytes(len_buf);
    if length & 0x8000_0000 != 0
    {
        return Err(PngDecodeErrors::CorruptData(format!(
            "chunk length {length} has the high bit set"
        )));
    }

    let mut name = [0_u8; 4];
    read_exact_or_truncated(reader, &mut name, "chunk type")?;

    Ok(Some(ChunkHeader { length, chunk_type: PngChunkType::from_bytes(&name), name }))
}

/// Reads a chunk's data and trailing CRC in full. Not used for IDAT,
/// whose data the zlib adapter consumes incrementally instead.
pub(crate) fn read_chunk_data<R: Read>(
    reader: &mut R, header: &ChunkHeader, pool: &mut BufferPool, confirm_crc: bool
) -> Result<Vec<u8>, PngDecodeErrors>
{
    let mut data = pool.rent(header.length as usize);
    read_exact_or_truncated(reader, &mut data, "chunk data")?;

    let mut crc_buf = [0_u8; 4];
    read_exact_or_truncated(reader, &mut crc_buf, "chunk CRC")?;
    let crc = u32::from_be_bytes(crc_buf);

    if confirm_crc
    {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header.name);
        hasher.update(&data);
        let calculated = hasher.finalize();

        if calculated != crc
        {
            return Err(PngDecodeErrors::CorruptData(format!(
                "CRC mismatch in {} chunk: expected {crc:08x}, calculated {calculated:08x}",
                String::from_utf8_lossy(&header.name)
            )));
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests
{
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_length_and_type()
    {
        let bytes = [0_u8, 0, 0, 13, b'I', b'H', b'D', b'R'];
        let header = read_chunk_header(&mut Cursor::new(bytes)).unwrap().unwrap();

        assert_eq!(header.length, 13);
        assert_eq!(&header.name, b"IHDR");
        assert_eq!(header.chunk_type, PngChunkType::IHDR);
    }

    #[test]
    fn high_bit_length_is_corrupt_data()
    {
        let bytes = [0x80_u8, 0, 0, 0, b'I', b'D', b'A', b'T'];
        let err = read_chunk_header(&mut Cursor::new(bytes)).unwrap_err();

        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn truncated_length_field_is_truncated_stream()
    {
        let bytes = [0_u8, 0];
        let err = read_chunk_header(&mut Cursor::new(bytes)).unwrap_err();

        assert!(matches!(err, PngDecodeErrors::TruncatedStream(_)));
    }

    #[test]
    fn clean_eof_at_a_chunk_boundary_is_not_an_error()
    {
        let bytes: [u8; 0] = [];
        let header = read_chunk_header(&mut Cursor::new(bytes)).unwrap();

        assert!(header.is_none());
    }

    #[test]
    fn data_crc_mismatch_is_rejected()
    {
        let header = ChunkHeader { length: 4, chunk_type: PngChunkType::unkn, name: *b"abCd" };
        let mut pool = BufferPool::new();
        let bytes = [1_u8, 2, 3, 4, 0, 0, 0, 0]; // CRC deliberately wrong.

        let err = read_chunk_data(&mut Cursor::new(bytes), &header, &mut pool, true).unwrap_err();
        assert!(matches!(err, PngDecodeErrors::CorruptData(_)));
    }

    #[test]
    fn data_crc_accepted_when_confirm_crc_is_false()
    {
        let header = ChunkHeader { length: 4, chunk_type: PngChunkType::unkn, name: *b"abCd" };
        let mut pool = BufferPool::new();
        let bytes = [1_u8, 2, 3, 4, 0, 0, 0, 0];

        let data = read_chunk_data(&mut Cursor::new(bytes), &header, &mut pool, false).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4]);
    }
}
