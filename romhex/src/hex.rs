use std::fmt;

pub(crate) const DIGITS_PER_BYTE: usize = 2;

const UPPER_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Decodes pairs of hex digits into bytes. Both cases are accepted.
pub fn hex_string_to_bytes(hex_string: &[u8]) -> Result<Vec<u8>> {
    debug_assert!(
        hex_string.len() % DIGITS_PER_BYTE == 0,
        "hex string must consist of pairs of hex digits"
    );
    let mut bytes = Vec::with_capacity(hex_string.len() / DIGITS_PER_BYTE);
    for (pair_idx, hex_digit_pair) in hex_string.chunks(DIGITS_PER_BYTE).enumerate() {
        let position = pair_idx * DIGITS_PER_BYTE;
        let high = decode_hex_digit(hex_digit_pair[0], position)?;
        let low = decode_hex_digit(hex_digit_pair[1], position + 1)?;
        bytes.push(high << 4 | low);
    }
    Ok(bytes)
}

/// Appends the two uppercase hex digits of `byte` to `out`.
pub fn push_hex_byte(out: &mut String, byte: u8) {
    out.push(UPPER_DIGITS[(byte >> 4) as usize] as char);
    out.push(UPPER_DIGITS[(byte & 0x0f) as usize] as char);
}

fn decode_hex_digit(digit: u8, position: usize) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(10 + (digit - b'a')),
        b'A'..=b'F' => Ok(10 + (digit - b'A')),
        d => Err(InvalidHexString { digit: d, position }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHexString {
    pub digit: u8,
    pub position: usize,
}

impl fmt::Display for InvalidHexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid hex digit {:?} at position {}",
            self.digit as char, self.position
        )
    }
}

impl std::error::Error for InvalidHexString {}

type Result<T> = std::result::Result<T, InvalidHexString>;
