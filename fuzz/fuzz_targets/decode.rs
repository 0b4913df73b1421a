#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use zune_png::PngDecoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = PngDecoder::new(Cursor::new(data));
    // Any outcome other than a panic is acceptable: arbitrary bytes are
    // expected to fail decoding, not crash the decoder.
    let _ = decoder.decode_to_rgba();
});
