use std::io::{BufRead, Write};

use log::warn;

use crate::config::TextConfig;
use crate::error::{Error, Result};
use crate::image::ImageBuffer;
use crate::write::write_hex;

const COMMENT_START: u8 = b'#';
const LINE_END: &[u8] = b"\r\n";
const TERMINATOR: u8 = 0;

/// What to do when the text does not fit in the image.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Keep what fits and drop the rest.
    #[default]
    Truncate,
    /// Fail with [`Error::BufferOverflow`].
    Error,
}

/// Sizes produced by [`read_text`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextSize {
    /// Bytes the text occupies, including ones that did not fit.
    pub counted: usize,
    /// Bytes actually placed in the image.
    pub stored: usize,
}

impl TextSize {
    pub fn truncated(&self) -> bool {
        self.counted > self.stored
    }

    /// Last address the text reaches when loaded at `start`.
    pub fn end_address(&self, start: u16) -> u16 {
        start.wrapping_add(self.counted as u16).wrapping_sub(1)
    }
}

/// Copies text lines into `image` from index 0.
///
/// Lines starting with `#` are skipped, every other line ends in CR LF
/// whatever it ended with in the input, and a NUL byte closes the text.
pub fn read_text<R: BufRead>(
    mut reader: R,
    image: &mut ImageBuffer,
    overflow: OverflowPolicy,
) -> Result<TextSize> {
    let mut counted = 0;
    let mut line = Vec::new();
    let mut push = |byte: u8, image: &mut ImageBuffer| {
        image.put(counted, byte);
        counted += 1;
    };

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.first() == Some(&COMMENT_START) {
            continue;
        }
        let content = strip_line_end(&line);
        for &byte in content.iter().chain(LINE_END) {
            push(byte, image);
        }
    }
    push(TERMINATOR, image);

    let capacity = image.capacity();
    if counted > capacity {
        match overflow {
            OverflowPolicy::Error => {
                return Err(Error::BufferOverflow {
                    capacity,
                    needed: counted,
                })
            }
            OverflowPolicy::Truncate => {
                warn!("text needs {counted} bytes, only the first {capacity} were kept")
            }
        }
    }

    Ok(TextSize {
        counted,
        stored: counted.min(capacity),
    })
}

/// Converts text from `input` into HEX records on `output`, loaded at
/// `config.address`.
pub fn text_to_hex<R, W>(config: &TextConfig, input: R, output: W) -> Result<TextSize>
where
    R: BufRead,
    W: Write,
{
    let mut image = config.image()?;
    let size = read_text(input, &mut image, config.overflow)?;
    write_hex(
        output,
        &image.bytes()[..size.stored],
        config.address,
        config.line_ending,
    )?;
    Ok(size)
}

fn strip_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
