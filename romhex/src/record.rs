//! Single-line Intel HEX record codec.
//!
//! A record has the shape `:LLAAAATT[DD...]CC`. Only data (`00`) and
//! end-of-file (`01`) records exist in the 16-bit format handled here.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::common::{Record, RecordKind};
use crate::hex::{self, DIGITS_PER_BYTE};

pub const START_CODE: u8 = b':';

/// The one and only end-of-file record.
pub const EOF_RECORD: &str = ":00000001FF";

/// Payload size used when chunking an image into data records.
pub const MAX_DATA_RECORD_LEN: usize = 16;

/// Decodes one record line. Surrounding whitespace must already be stripped.
pub fn decode_record(line: &[u8]) -> Result<Record> {
    RecordParser::new(line).parse()
}

/// Encodes a data record for `data` loaded at `addr`.
pub fn encode_data_record(addr: u16, data: &[u8]) -> String {
    encode_record(addr, RecordKind::Data, data)
}

pub fn encode_record(addr: u16, kind: RecordKind, data: &[u8]) -> String {
    assert!(
        data.len() <= u8::MAX as usize,
        "record payload cannot exceed 255 bytes"
    );
    let mut fields = BytesMut::with_capacity(4 + data.len());
    fields.put_u8(data.len() as u8);
    fields.put_u16(addr);
    fields.put_u8(kind.to_int());
    fields.put_slice(data);

    let mut line = String::with_capacity(1 + (fields.len() + 1) * DIGITS_PER_BYTE);
    line.push(START_CODE as char);
    for &byte in fields.iter() {
        hex::push_hex_byte(&mut line, byte);
    }
    hex::push_hex_byte(&mut line, checksum(&fields));
    line
}

/// Two's complement of the byte sum, so that all fields plus the checksum
/// add up to zero modulo 256.
pub fn checksum(fields: &[u8]) -> u8 {
    fields
        .iter()
        .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
        .wrapping_neg()
}

struct RecordParser<'a> {
    cursor: &'a [u8],
    to_checksum: Vec<u8>,
}

impl<'a> RecordParser<'a> {
    fn new(line: &'a [u8]) -> Self {
        RecordParser {
            cursor: line,
            to_checksum: Vec::with_capacity(4 + MAX_DATA_RECORD_LEN),
        }
    }

    fn parse(mut self) -> Result<Record> {
        self.skip_start_code()?;

        let byte_count = self.parse_field(Field::ByteCount, 1)?.as_slice().get_u8();
        let addr = self.parse_field(Field::Address, 2)?.as_slice().get_u16();
        let kind_val = self.parse_field(Field::Type, 1)?.as_slice().get_u8();
        let kind = RecordKind::from_int(kind_val).ok_or(ParseRecordError::UnknownType(kind_val))?;
        let data = self.parse_field(Field::Data, byte_count as usize)?;

        let found = self.parse_checksum()?;
        let expected = checksum(&self.to_checksum);
        if found != expected {
            return Err(ParseRecordError::ChecksumMismatch { expected, found });
        }

        if !self.cursor.is_empty() {
            return Err(ParseRecordError::TrailingCharacters(self.cursor.len()));
        }

        Ok(Record { addr, kind, data })
    }

    fn skip_start_code(&mut self) -> Result<()> {
        match self.cursor.split_first() {
            Some((&START_CODE, remaining)) => {
                self.cursor = remaining;
                Ok(())
            }
            _ => Err(field_error(Field::StartCode, ParseFieldError::Missing)),
        }
    }

    fn parse_field(&mut self, field: Field, num_bytes: usize) -> Result<Vec<u8>> {
        let bytes = self.take_hex_bytes(field, num_bytes)?;
        self.to_checksum.extend_from_slice(&bytes);
        Ok(bytes)
    }

    fn parse_checksum(&mut self) -> Result<u8> {
        Ok(self.take_hex_bytes(Field::Checksum, 1)?.as_slice().get_u8())
    }

    fn take_hex_bytes(&mut self, field: Field, num_bytes: usize) -> Result<Vec<u8>> {
        let field_size = num_bytes * DIGITS_PER_BYTE;
        if field_size == 0 {
            return Ok(Vec::new());
        }
        if self.cursor.is_empty() {
            return Err(field_error(field, ParseFieldError::Missing));
        }
        if self.cursor.len() < field_size {
            return Err(field_error(field, ParseFieldError::Incomplete));
        }
        let (hex_string, remaining) = self.cursor.split_at(field_size);
        self.cursor = remaining;
        hex::hex_string_to_bytes(hex_string)
            .map_err(|e| field_error(field, ParseFieldError::InvalidHex(e)))
    }
}

fn field_error(field: Field, kind: ParseFieldError) -> ParseRecordError {
    ParseRecordError::ParseField { field, kind }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseRecordError {
    ParseField { field: Field, kind: ParseFieldError },
    UnknownType(u8),
    ChecksumMismatch { expected: u8, found: u8 },
    TrailingCharacters(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFieldError {
    Missing,
    Incomplete,
    InvalidHex(hex::InvalidHexString),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StartCode,
    ByteCount,
    Address,
    Type,
    Data,
    Checksum,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Field::*;
        match self {
            StartCode => write!(f, "StartCode"),
            ByteCount => write!(f, "ByteCount"),
            Address => write!(f, "Address"),
            Type => write!(f, "Type"),
            Data => write!(f, "Data"),
            Checksum => write!(f, "Checksum"),
        }
    }
}

impl fmt::Display for ParseRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseRecordError::*;
        match self {
            ParseField { field, kind } => {
                write!(f, "bad {field} field: ")?;
                match kind {
                    ParseFieldError::Missing => write!(f, "field missing"),
                    ParseFieldError::Incomplete => write!(f, "field incomplete"),
                    ParseFieldError::InvalidHex(error) => write!(f, "{error}"),
                }
            }
            UnknownType(kind) => write!(f, "unknown record type {kind:02X}"),
            ChecksumMismatch { expected, found } => {
                write!(f, "checksum error, expected {expected:02X} but found {found:02X}")
            }
            TrailingCharacters(count) => {
                write!(f, "{count} unexpected characters after the checksum")
            }
        }
    }
}

impl std::error::Error for ParseRecordError {}

pub type Result<T> = std::result::Result<T, ParseRecordError>;
