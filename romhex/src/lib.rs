//! Intel HEX codec for 16-bit ROM images.
//!
//! Only data and end-of-file records are understood. Images are held
//! entirely in memory and never exceed the 64K address space.

mod common;
pub mod config;
pub mod error;
pub mod hex;
pub mod image;
pub mod logger;
pub mod merge;
pub mod read;
pub mod record;
pub mod text;
pub mod write;

pub use common::{Record, RecordKind, ADDRESS_SPACE};
pub use config::{MergeConfig, TextConfig};
pub use error::{Error, ErrorKind};
pub use image::{ImageBuffer, Store};
pub use merge::{merge_files, Merge, MergeError, MergeSummary};
pub use read::{read_hex, read_hex_file};
pub use record::{decode_record, encode_data_record, encode_record, EOF_RECORD};
pub use text::{read_text, text_to_hex, OverflowPolicy, TextSize};
pub use write::{data_chunks, write_hex, Chunk, LineEnding};
