//! Constants shared across the decoder.

/// The 8-byte magic sequence every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Default ceiling on width/height, chosen to keep a maliciously large
/// IHDR from causing an unbounded allocation before any pixel data has
/// even been seen. Callers with legitimately huge images can raise this
/// via [`crate::options::PngOptions`].
pub const DEFAULT_MAX_DIMENSION: usize = 1 << 20;

/// Inches per metre, used to convert the pHYs chunk's pixels-per-metre
/// fields into DPI.
pub const INCHES_PER_METRE: f32 = 39.3700787;

/// Expands a `(2^depth - 1)`-scaled sample up to the full 0..=255 range,
/// indexed by bit depth. Only 1, 2 and 4 are meaningful; other entries
/// are unused padding.
pub const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];
