//! Fuzz target: ASCII-decimal decoders
//!
//! Arbitrary bytes must always decode to something, and re-encoding the
//! decoded number must decode to the same number.
//!
//! cargo fuzz run fuzz_codec

#![no_main]

use libfuzzer_sys::fuzz_target;
use lmtherapy::gatt::codec;

fuzz_target!(|data: &[u8]| {
    let n = codec::decode_uint(data);
    let clamped = n.min(codec::UINT_MAX_ENCODED);
    assert_eq!(codec::decode_uint(&codec::encode_uint(n)), clamped);

    let p = codec::decode_percent(data);
    assert!(p <= 100);
    assert_eq!(codec::decode_u8(&codec::encode_u8(p)), p);

    let _ = codec::decode_bool(data);
});
