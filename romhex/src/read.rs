use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, trace};

use crate::common::{Record, RecordKind};
use crate::error::{record_error, Error, Result};
use crate::image::{ImageBuffer, Store};
use crate::record::decode_record;

/// Loads a HEX file into `image`, returning the number of data bytes decoded.
pub fn read_hex_file<P>(path: P, image: &mut ImageBuffer) -> Result<usize>
where
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    read_hex(BufReader::new(file), image)
}

/// Decodes records from `reader` into `image` until the end-of-file record.
///
/// Nothing is rolled back on failure: bytes from records that were applied
/// before the bad one stay in the image.
pub fn read_hex<R: BufRead>(reader: R, image: &mut ImageBuffer) -> Result<usize> {
    ImageLoader::new(image).load(reader)
}

struct ImageLoader<'a> {
    image: &'a mut ImageBuffer,
    byte_count: usize,
    written: usize,
}

impl<'a> ImageLoader<'a> {
    fn new(image: &'a mut ImageBuffer) -> Self {
        ImageLoader {
            image,
            byte_count: 0,
            written: 0,
        }
    }

    fn load<R: BufRead>(mut self, reader: R) -> Result<usize> {
        for (line_idx, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let line_no = line_idx + 1;
            let record = decode_record(line).map_err(|e| record_error(line_no, e))?;
            match record.kind {
                RecordKind::Data => self.apply(&record)?,
                RecordKind::EndOfFile => {
                    debug!(
                        "end of file on line {line_no}: {} bytes decoded, {} newly written",
                        self.byte_count, self.written
                    );
                    return Ok(self.byte_count);
                }
            }
        }

        Err(Error::MissingEofRecord)
    }

    fn apply(&mut self, record: &Record) -> Result<()> {
        trace!("{} bytes at 0x{:04X}", record.len(), record.addr);
        for (k, &byte) in record.data.iter().enumerate() {
            let address = record.addr.wrapping_add(k as u16);
            if self.image.store(address, byte)? == Store::Written {
                self.written += 1;
            }
        }
        self.byte_count += record.len();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::test::test_file_path;
    use crate::error::ErrorKind;

    fn image(capacity: usize, offset: u16, fill: u8) -> ImageBuffer {
        ImageBuffer::new(capacity, offset, fill).expect("image")
    }

    #[test]
    fn reads_single_file() {
        let mut rom = image(16, 0, 0x00);
        let count = read_hex_file(test_file_path("merge_a.hex"), &mut rom).expect("read failed");
        assert_eq!(count, 2);
        assert_eq!(&rom.bytes()[..4], &[0xaa, 0xbb, 0x00, 0x00]);
    }

    #[test]
    fn applies_offset() {
        let mut rom = image(0x20, 0x8000, 0xff);
        let count =
            read_hex_file(test_file_path("offset_8000.hex"), &mut rom).expect("read failed");
        assert_eq!(count, 20);
        assert_eq!(rom.bytes()[0x0f], 0x0f);
        assert_eq!(&rom.bytes()[0x10..0x15], &[0xde, 0xad, 0xbe, 0xef, 0xff]);
    }

    #[test]
    fn conflicting_files() {
        let mut rom = image(0x200, 0, 0xff);
        read_hex_file(test_file_path("conflict_a.hex"), &mut rom).expect("read failed");
        let result = read_hex_file(test_file_path("conflict_b.hex"), &mut rom);
        assert!(matches!(
            result,
            Err(Error::WriteConflict {
                address: 0x0100,
                existing: 0x12,
                incoming: 0x34
            })
        ));
    }

    #[test]
    fn overlapping_identical_bytes_are_accepted() {
        let mut rom = image(0x200, 0, 0xff);
        read_hex_file(test_file_path("conflict_a.hex"), &mut rom).expect("read failed");
        let count = read_hex_file(test_file_path("repeat_b.hex"), &mut rom).expect("read failed");
        assert_eq!(count, 3);
        assert_eq!(&rom.bytes()[0xff..0x102], &[0x11, 0x12, 0x13]);
    }

    #[test]
    fn address_outside_rom() {
        let mut rom = image(16, 0, 0xff);
        let result = read_hex_file(test_file_path("out_of_range.hex"), &mut rom);
        assert!(matches!(
            result,
            Err(Error::AddressOutOfRange { address: 0x0010, capacity: 16 })
        ));
        // Bytes before the failing one were already stored.
        assert_eq!(&rom.bytes()[0x0e..], &[1, 2]);
    }

    #[test]
    fn missing_eof_record() {
        let mut rom = image(16, 0, 0xff);
        let result = read_hex_file(test_file_path("missing_eof_record.hex"), &mut rom);
        assert!(matches!(result, Err(Error::MissingEofRecord)));
    }

    #[test]
    fn checksum_mismatch() {
        let mut rom = image(0x100, 0, 0xff);
        let error = read_hex_file(test_file_path("checksum_mismatch.hex"), &mut rom).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ChecksumMismatch);
        assert!(matches!(error, Error::Record { line_no: 1, .. }));
        assert_eq!(rom.bytes()[0x10], 0xff);
    }

    #[test]
    fn unknown_record_type() {
        let mut rom = image(0x100, 0, 0xff);
        let error =
            read_hex_file(test_file_path("unknown_record_type.hex"), &mut rom).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownRecordType);
    }

    #[test]
    fn malformed_data() {
        let mut rom = image(0x100, 0, 0xff);
        let error = read_hex_file(test_file_path("malformed_data.hex"), &mut rom).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn lenient_layout() {
        let mut rom = image(0x40, 0, 0xff);
        let count = read_hex_file(test_file_path("lenient.hex"), &mut rom).expect("read failed");
        assert_eq!(count, 3);
        assert_eq!(&rom.bytes()[0x20..0x23], &[0xab, 0xcd, 0xef]);
        // The record after the end-of-file record is never looked at.
        assert_eq!(rom.bytes()[0x30], 0xff);
    }

    #[test]
    fn missing_file() {
        let mut rom = image(16, 0, 0xff);
        let error = read_hex_file("/path/to/missing.hex", &mut rom).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IoError);
    }

    #[test]
    fn reads_from_memory() {
        let mut rom = image(4, 0, 0xff);
        let input = b":0100030042BA\n:00000001FF\n";
        let count = read_hex(&input[..], &mut rom).expect("read failed");
        assert_eq!(count, 1);
        assert_eq!(rom.bytes(), &[0xff, 0xff, 0xff, 0x42]);
    }
}
