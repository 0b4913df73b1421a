//! A streaming, chunk-level PNG decoder.
//!
//! Reads a chunked, CRC-validated, DEFLATE-compressed, optionally
//! Adam7-interlaced PNG stream from any [`std::io::Read`] and produces
//! 8-bit-per-channel RGBA pixels. IDAT chunks are consumed
//! incrementally, in whatever order and size they arrive in.
//!
//! ```no_run
//! use std::fs::File;
//! use zune_png::PngDecoder;
//!
//! let file = File::open("image.png").unwrap();
//! let mut decoder = PngDecoder::new(file);
//! let (pixels, metadata) = decoder.decode_to_rgba().unwrap();
//! println!("{}x{}, {} text chunks", pixels.width, pixels.height, metadata.text.len());
//! ```
//!
//! Out of scope: a top-level image container/format-dispatch API,
//! pixel-format conversion beyond RGBA8, the DEFLATE decompressor's
//! internals (provided by `flate2`), and the PNG encoder.

mod chunk;
mod constants;
mod decoder;
mod enums;
mod error;
mod filters;
mod header;
mod interlace;
mod metadata;
mod options;
mod palette;
mod pixels;
mod pool;
mod scanline;
mod zlib;

pub use crate::decoder::{ImageInfo, PngDecoder};
pub use crate::enums::PngColor;
pub use crate::error::PngDecodeErrors;
pub use crate::metadata::{PhysicalDimensions, PngMetadata, PngTimestamp, TextEntry};
pub use crate::options::{default_chunk_handler, PngOptions, TextEncoding, UnknownChunkHandler};
pub use crate::pixels::{PixelSink, RgbaBuffer};
