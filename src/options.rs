use std::io::Read;

use crate::constants::DEFAULT_MAX_DIMENSION;
use crate::error::PngDecodeErrors;

/// How to decode the bytes of a tEXt chunk's keyword/value pair. Only
/// [`TextEncoding::Latin1`] is implemented.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum TextEncoding
{
    #[default]
    Latin1
}

/// Callback invoked for any chunk type this crate does not parse
/// itself. Receives the chunk's declared length and 4-byte type and a
/// reader positioned at the start of the chunk's data. Implementations
/// are expected to consume exactly `length` bytes of data plus the
/// trailing 4-byte CRC themselves.
pub type UnknownChunkHandler = fn(usize, [u8; 4], &mut dyn Read) -> Result<(), PngDecodeErrors>;

/// Reads and discards an unrecognised ancillary chunk's payload,
/// validating its CRC the same way a recognised chunk would.
pub fn default_chunk_handler(
    length: usize, chunk_type: [u8; 4], reader: &mut dyn Read
) -> Result<(), PngDecodeErrors>
{
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&chunk_type);

    let mut scratch = [0_u8; 4096];
    let mut remaining = length;

    while remaining > 0
    {
        let want = remaining.min(scratch.len());
        reader.read_exact(&mut scratch[..want])?;
        hasher.update(&scratch[..want]);
        remaining -= want;
    }

    let mut crc_buf = [0_u8; 4];
    reader.read_exact(&mut crc_buf)?;
    let crc = u32::from_be_bytes(crc_buf);
    let calculated = hasher.finalize();

    if calculated != crc
    {
        return Err(PngDecodeErrors::CorruptData(format!(
            "CRC mismatch in chunk {:?}: expected {crc:08x}, calculated {calculated:08x}",
            String::from_utf8_lossy(&chunk_type)
        )));
    }

    Ok(())
}

/// Configuration accepted by [`crate::PngDecoder`].
///
/// Follows the builder shape used across the `zune-image` codec
/// family: construct with [`PngOptions::new`] (or `Default::default`),
/// chain `set_*` calls, and read back with the matching `get_*`
/// accessor.
#[derive(Copy, Clone, Debug)]
pub struct PngOptions
{
    max_width:        usize,
    max_height:        usize,
    ignore_metadata:  bool,
    text_encoding:    TextEncoding,
    confirm_crc:      bool,
    strict_mode:      bool,
    strict_signature: bool,
    chunk_handler:    UnknownChunkHandler
}

impl Default for PngOptions
{
    fn default() -> Self
    {
        PngOptions {
            max_width:        DEFAULT_MAX_DIMENSION,
            max_height:        DEFAULT_MAX_DIMENSION,
            ignore_metadata:  false,
            text_encoding:    TextEncoding::Latin1,
            confirm_crc:      true,
            strict_mode:      false,
            strict_signature: true,
            chunk_handler:    default_chunk_handler
        }
    }
}

impl PngOptions
{
    pub fn new() -> PngOptions
    {
        PngOptions::default()
    }

    pub fn set_max_width(mut self, width: usize) -> Self
    {
        self.max_width = width;
        self
    }
    pub fn set_max_height(mut self, height: usize) -> Self
    {
        self.max_height = height;
        self
    }
    pub fn set_ignore_metadata(mut self, yes: bool) -> Self
    {
        self.ignore_metadata = yes;
        self
    }
    pub fn set_text_encoding(mut self, encoding: TextEncoding) -> Self
    {
        self.text_encoding = encoding;
        self
    }
    pub fn set_confirm_crc(mut self, yes: bool) -> Self
    {
        self.confirm_crc = yes;
        self
    }
    pub fn set_strict_mode(mut self, yes: bool) -> Self
    {
        self.strict_mode = yes;
        self
    }
    pub fn set_strict_signature(mut self, yes: bool) -> Self
    {
        self.strict_signature = yes;
        self
    }
    pub fn set_unknown_chunk_handler(mut self, handler: UnknownChunkHandler) -> Self
    {
        self.chunk_handler = handler;
        self
    }

    pub const fn get_max_width(&self) -> usize
    {
        self.max_width
    }
    pub const fn get_max_height(&self) -> usize
    {
        self.max_height
    }
    pub const fn get_ignore_metadata(&self) -> bool
    {
        self.ignore_metadata
    }
    pub const fn get_text_encoding(&self) -> TextEncoding
    {
        self.text_encoding
    }
    pub const fn get_confirm_crc(&self) -> bool
    {
        self.confirm_crc
    }
    pub const fn get_strict_mode(&self) -> bool
    {
        self.strict_mode
    }
    pub const fn get_strict_signature(&self) -> bool
    {
        self.strict_signature
    }
    pub(crate) fn chunk_handler(&self) -> UnknownChunkHandler
    {
        self.chunk_handler
    }
}
