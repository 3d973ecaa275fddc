//! Run configuration for the merge and text tools, plus the number syntax
//! their command lines share.

use std::fmt;

use crate::common::ADDRESS_SPACE;
use crate::error::Result;
use crate::image::ImageBuffer;
use crate::text::OverflowPolicy;
use crate::write::LineEnding;

pub const DEFAULT_FILL: u8 = 0xff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    pub rom_size: usize,
    pub offset: u16,
    pub fill: u8,
    /// Report a bad input file and carry on instead of stopping the run.
    pub keep_going: bool,
    pub line_ending: LineEnding,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            rom_size: ADDRESS_SPACE,
            offset: 0,
            fill: DEFAULT_FILL,
            keep_going: false,
            line_ending: LineEnding::Lf,
        }
    }
}

impl MergeConfig {
    pub fn image(&self) -> Result<ImageBuffer> {
        ImageBuffer::new(self.rom_size, self.offset, self.fill)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextConfig {
    pub address: u16,
    pub capacity: usize,
    pub overflow: OverflowPolicy,
    pub line_ending: LineEnding,
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            address: 0,
            capacity: ADDRESS_SPACE,
            overflow: OverflowPolicy::Truncate,
            line_ending: LineEnding::Lf,
        }
    }
}

impl TextConfig {
    pub fn image(&self) -> Result<ImageBuffer> {
        ImageBuffer::new(self.capacity, self.address, DEFAULT_FILL)
    }
}

/// Parses `nnnn`, `0xhhhh` or `nnk` (multiples of 1024).
pub fn parse_number(text: &str) -> std::result::Result<u32, NumberError> {
    let invalid = || NumberError::Invalid(text.to_string());
    let (digits, scale) = match text.strip_suffix(['k', 'K']) {
        Some(digits) => (digits, 1024),
        None => (text, 1),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16),
        None => digits.parse::<u32>(),
    }
    .map_err(|_| invalid())?;
    value.checked_mul(scale).ok_or_else(invalid)
}

/// ROM size in bytes, 1 through 65536.
pub fn parse_rom_size(text: &str) -> std::result::Result<usize, NumberError> {
    let size = parse_number(text)? as usize;
    if size == 0 || size > ADDRESS_SPACE {
        return Err(NumberError::OutOfRange {
            text: text.to_string(),
            max: ADDRESS_SPACE as u32,
        });
    }
    Ok(size)
}

/// A 16-bit address or offset.
pub fn parse_address(text: &str) -> std::result::Result<u16, NumberError> {
    let value = parse_number(text)?;
    u16::try_from(value).map_err(|_| NumberError::OutOfRange {
        text: text.to_string(),
        max: u16::MAX as u32,
    })
}

pub fn parse_fill_byte(text: &str) -> std::result::Result<u8, NumberError> {
    let value = parse_number(text)?;
    u8::try_from(value).map_err(|_| NumberError::OutOfRange {
        text: text.to_string(),
        max: u8::MAX as u32,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    Invalid(String),
    OutOfRange { text: String, max: u32 },
}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::Invalid(text) => write!(f, "\"{text}\" is not a number"),
            NumberError::OutOfRange { text, max } => {
                write!(f, "\"{text}\" is out of range (max {max})")
            }
        }
    }
}

impl std::error::Error for NumberError {}
