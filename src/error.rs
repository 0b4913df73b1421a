use core::fmt::{Debug, Display, Formatter};
use std::io;

/// Every way a [`crate::PngDecoder`] can fail to produce an image.
pub enum PngDecodeErrors
{
    /// Input ended mid-field, mid-chunk, or mid-scanline with no more IDAT chunks.
    TruncatedStream(&'static str),
    /// CRC mismatch, unknown filter byte, inflate failure, or chunk-ordering violation.
    CorruptData(String),
    /// Disallowed (colour type, bit depth) pair, bad filter/interlace method, or unknown critical chunk.
    UnsupportedFormat(String),
    /// Declared width or height exceeds the configured maximum.
    ImageTooLarge
    {
        width:     usize,
        height:    usize,
        max_width: usize,
        max_height: usize
    },
    /// Stream ended without an IEND chunk.
    MissingEnd,
    /// An animation control chunk was seen; APNG is out of scope.
    UnsupportedApng,
    /// A lower-level I/O failure from the byte source.
    Io(io::Error)
}

impl Debug for PngDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        Display::fmt(self, f)
    }
}

impl Display for PngDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        match self
        {
            PngDecodeErrors::TruncatedStream(s) =>
            {
                write!(f, "truncated PNG stream: {s}")
            }
            PngDecodeErrors::CorruptData(s) =>
            {
                write!(f, "corrupt PNG data: {s}")
            }
            PngDecodeErrors::UnsupportedFormat(s) =>
            {
                write!(f, "unsupported PNG format: {s}")
            }
            PngDecodeErrors::ImageTooLarge { width, height, max_width, max_height } =>
            {
                write!(
                    f,
                    "image dimensions {width}x{height} exceed the configured maximum of \
                     {max_width}x{max_height}"
                )
            }
            PngDecodeErrors::MissingEnd =>
            {
                write!(f, "stream ended before an IEND chunk was observed")
            }
            PngDecodeErrors::UnsupportedApng =>
            {
                write!(f, "animated PNG (APNG) is not supported by this decoder")
            }
            PngDecodeErrors::Io(e) =>
            {
                write!(f, "I/O error reading PNG stream: {e}")
            }
        }
    }
}

impl std::error::Error for PngDecodeErrors {}

impl From<io::Error> for PngDecodeErrors
{
    fn from(value: io::Error) -> Self
    {
        PngDecodeErrors::Io(value)
    }
}
