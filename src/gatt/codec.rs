//! ASCII-decimal attribute codec.
//!
//! Wire format: every numeric attribute travels as its decimal text, not as
//! raw little-endian bytes, so that any mobile BLE library can read it as a
//! string.
//!
//! ```text
//!   u32 300   ──▶  "300"  = [0x33, 0x30, 0x30]
//!   u8  7     ──▶  "7"    = [0x37]
//!   bool true ──▶  "1"    = [0x31]
//! ```
//!
//! Decoding is lenient on purpose: a GATT write cannot carry a decode error
//! back to the writer, so malformed numbers become 0 instead of failing.

use crate::error::AttributeError;

/// Largest decimal payload for an unsigned attribute.
pub const UINT_MAX_LEN: usize = 6;

/// Largest decimal payload for a byte-range attribute.
pub const BYTE_MAX_LEN: usize = 3;

/// Largest value that fits in [`UINT_MAX_LEN`] digits.
pub const UINT_MAX_ENCODED: u32 = 999_999;

pub type UintPayload = heapless::Vec<u8, UINT_MAX_LEN>;
pub type BytePayload = heapless::Vec<u8, BYTE_MAX_LEN>;

// ── Numeric ───────────────────────────────────────────────────

fn encode_decimal<const N: usize>(mut value: u32) -> heapless::Vec<u8, N> {
    let mut digits = [0u8; 10];
    let mut n = 0;
    loop {
        digits[n] = b'0' + (value % 10) as u8;
        n += 1;
        value /= 10;
        if value == 0 {
            break;
        }
    }

    let mut out = heapless::Vec::new();
    for &d in digits[..n].iter().rev() {
        // Callers clamp `value` so the digit count never exceeds N.
        let _ = out.push(d);
    }
    out
}

/// Encode an unsigned integer as minimal decimal text (no sign, no padding).
///
/// Values above [`UINT_MAX_ENCODED`] saturate so the payload stays within
/// [`UINT_MAX_LEN`] bytes.
pub fn encode_uint(value: u32) -> UintPayload {
    encode_decimal(value.min(UINT_MAX_ENCODED))
}

/// Parse leading ASCII digits.  Empty or non-numeric input yields 0.
///
/// Parsing stops at the first non-digit byte (`b"12ab"` → 12) and
/// saturates at `u32::MAX`.
pub fn decode_uint(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

/// Encode a byte-range value (location id, battery, intensity).
pub fn encode_u8(value: u8) -> BytePayload {
    encode_decimal(u32::from(value))
}

/// Decode a byte-range value, saturating at 255.
pub fn decode_u8(bytes: &[u8]) -> u8 {
    decode_uint(bytes).min(u32::from(u8::MAX)) as u8
}

/// Decode a percentage, clamping to 100.
pub fn decode_percent(bytes: &[u8]) -> u8 {
    decode_uint(bytes).min(u32::from(crate::config::PERCENT_MAX)) as u8
}

// ── Boolean ───────────────────────────────────────────────────

/// `'1'` for true, `'0'` for false.
pub fn encode_bool(value: bool) -> [u8; 1] {
    [if value { b'1' } else { b'0' }]
}

/// Only the first byte is inspected; anything other than `'1'` is false.
pub fn decode_bool(bytes: &[u8]) -> bool {
    bytes.first() == Some(&b'1')
}

// ── Text ──────────────────────────────────────────────────────

/// Validate a raw text write against its declared maximum length.
pub fn decode_text<const N: usize>(raw: &[u8]) -> Result<heapless::String<N>, AttributeError> {
    if raw.len() > N {
        return Err(AttributeError::PayloadTooLong);
    }
    let s = core::str::from_utf8(raw).map_err(|_| AttributeError::InvalidUtf8)?;
    let mut out = heapless::String::new();
    out.push_str(s)
        .map_err(|_| AttributeError::PayloadTooLong)?;
    Ok(out)
}
