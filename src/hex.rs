//! Hex strings, printable characters and scalar decoding.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("no hex digits")]
    Empty,
    #[error("odd number of hex digits ({0})")]
    OddLength(usize),
    #[error("'{0}' is not a hex digit")]
    InvalidDigit(char),
}

/// Parse pairs of hex digits into bytes. Spaces are ignored.
///
/// ```
/// use hexless::hex::parse_hex;
///
/// assert_eq!(parse_hex("41 42").unwrap(), b"AB");
/// assert!(parse_hex("4").is_err());
/// ```
///
/// # Errors
///
/// Returns a [`HexError`] for empty input, an odd digit count or a non-hex
/// character.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let digits: Vec<char> = input.chars().filter(|&c| c != ' ').collect();
    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    if let Some(&bad) = digits.iter().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit(bad));
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16).ok_or(HexError::InvalidDigit(pair[0]))?;
            let lo = pair[1].to_digit(16).ok_or(HexError::InvalidDigit(pair[1]))?;
            u8::try_from((hi << 4) | lo).map_err(|_| HexError::InvalidDigit(pair[0]))
        })
        .collect()
}

/// The character shown for a byte in the ASCII pane.
pub const fn display_char(byte: u8) -> char {
    match byte {
        0 => ' ',
        32..=126 => byte as char,
        _ => '\u{b7}',
    }
}

/// Byte order used when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("LE"),
            Self::Big => f.write_str("BE"),
        }
    }
}

/// The bytes at the cursor reinterpreted as every scalar type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub endian: Endian,
    pub first_byte: u8,
    pub i8: i8,
    pub u8: u8,
    pub i16: i16,
    pub u16: u16,
    pub i32: i32,
    pub u32: u32,
    pub i64: i64,
    pub u64: u64,
    pub f32: f32,
    pub f64: f64,
}

/// Decode up to eight bytes; shorter input is zero-extended.
pub fn decode(bytes: &[u8], endian: Endian) -> Decoded {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);

    let [b0, b1, b2, b3, ..] = buf;
    let two = [b0, b1];
    let four = [b0, b1, b2, b3];
    let (w16, w32, w64) = match endian {
        Endian::Little => (
            u16::from_le_bytes(two),
            u32::from_le_bytes(four),
            u64::from_le_bytes(buf),
        ),
        Endian::Big => (
            u16::from_be_bytes(two),
            u32::from_be_bytes(four),
            u64::from_be_bytes(buf),
        ),
    };
    Decoded {
        endian,
        first_byte: b0,
        i8: i8::from_ne_bytes([b0]),
        u8: b0,
        i16: i16::from_ne_bytes(w16.to_ne_bytes()),
        u16: w16,
        i32: i32::from_ne_bytes(w32.to_ne_bytes()),
        u32: w32,
        i64: i64::from_ne_bytes(w64.to_ne_bytes()),
        u64: w64,
        f32: f32::from_bits(w32),
        f64: f64::from_bits(w64),
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08b} {} i8:{} u8:{} i16:{} u16:{} i32:{} u32:{} i64:{} u64:{} f32:{:?} f64:{:?}",
            self.first_byte,
            self.endian,
            self.i8,
            self.u8,
            self.i16,
            self.u16,
            self.i32,
            self.u32,
            self.i64,
            self.u64,
            self.f32,
            self.f64,
        )
    }
}
