//! Palette (PLTE) and transparency (tRNS) storage, shared by the header
//! parser (which fills it in) and the pixel expander (which reads it).

/// One RGB(A) palette entry.
///
/// The alpha field defaults to fully opaque; a tRNS chunk may supply
/// fewer entries than the palette has, in which case the remaining
/// entries keep this default.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PLTEEntry
{
    pub red:   u8,
    pub green: u8,
    pub blue:  u8,
    pub alpha: u8
}

impl Default for PLTEEntry
{
    fn default() -> Self
    {
        PLTEEntry { red: 0, green: 0, blue: 0, alpha: 255 }
    }
}

/// The tRNS chunk's contents for non-palette colour types: one 16-bit
/// sample value per channel (only the low 8 bits matter for the bit
/// depths this crate supports) that should be treated as fully
/// transparent wherever it appears verbatim in the decoded samples.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct TrnsKey
{
    pub samples: [u16; 3]
}
