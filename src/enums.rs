//! Small enums describing the fixed vocabularies used by IHDR and by
//! chunk dispatch.

/// The colour type byte of IHDR.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum PngColor
{
    /// Colour type 0.
    Luma,
    /// Colour type 2.
    RGB,
    /// Colour type 3, an index into a PLTE chunk.
    Palette,
    /// Colour type 4.
    LumaA,
    /// Colour type 6.
    RGBA,
    /// Not a value the PNG spec defines.
    #[default]
    Unknown
}

impl PngColor
{
    pub(crate) fn from_int(value: u8) -> Option<PngColor>
    {
        match value
        {
            0 => Some(PngColor::Luma),
            2 => Some(PngColor::RGB),
            3 => Some(PngColor::Palette),
            4 => Some(PngColor::LumaA),
            6 => Some(PngColor::RGBA),
            _ => None
        }
    }

    /// Number of samples per pixel as stored in the scanline, before any
    /// palette expansion or tRNS-driven alpha synthesis.
    pub(crate) const fn num_components(&self) -> u8
    {
        match self
        {
            PngColor::Luma | PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4,
            PngColor::Unknown => 0
        }
    }
}

/// The filter method byte of IHDR; PNG defines exactly one (adaptive,
/// per-scanline filtering), so this mostly exists to make "not zero" an
/// explicit, named error case.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum FilterMethod
{
    #[default]
    Adaptive
}

impl FilterMethod
{
    pub(crate) fn from_int(value: u8) -> Option<FilterMethod>
    {
        match value
        {
            0 => Some(FilterMethod::Adaptive),
            _ => None
        }
    }
}

/// The per-scanline filter *type* byte (distinct from [`FilterMethod`],
/// which is the one IHDR-level filter *method*).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterType
{
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterType
{
    pub(crate) fn from_int(value: u8) -> Option<FilterType>
    {
        match value
        {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None
        }
    }
}

/// The interlace method byte of IHDR.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum InterlaceMethod
{
    #[default]
    Standard,
    Adam7
}

impl InterlaceMethod
{
    pub(crate) fn from_int(value: u8) -> Option<InterlaceMethod>
    {
        match value
        {
            0 => Some(InterlaceMethod::Standard),
            1 => Some(InterlaceMethod::Adam7),
            _ => None
        }
    }
}

/// The chunk types this crate knows how to handle explicitly. Anything
/// else falls back to the unknown-chunk handler in [`crate::options`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum PngChunkType
{
    IHDR,
    PLTE,
    IDAT,
    IEND,
    tRNS,
    pHYs,
    tEXt,
    tIME,
    gAMA,
    acTL,
    unkn
}

impl PngChunkType
{
    pub(crate) fn from_bytes(bytes: &[u8; 4]) -> PngChunkType
    {
        match bytes
        {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            b"tRNS" => PngChunkType::tRNS,
            b"pHYs" => PngChunkType::pHYs,
            b"tEXt" => PngChunkType::tEXt,
            b"tIME" => PngChunkType::tIME,
            b"gAMA" => PngChunkType::gAMA,
            b"acTL" => PngChunkType::acTL,
            _ => PngChunkType::unkn
        }
    }

    /// A chunk is treated as critical when the fourth letter of its name
    /// is uppercase: an unrecognised chunk matching that shape is
    /// refused rather than silently skipped.
    pub(crate) fn is_critical(name: &[u8; 4]) -> bool
    {
        name[3].is_ascii_uppercase()
    }
}
