use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::{error, info};

use romhex::config::{parse_address, parse_rom_size};
use romhex::logger::{self, Logger};
use romhex::{text_to_hex, LineEnding, OverflowPolicy, TextConfig};

/*
Usage:
  romtext -a0x2000 messages.txt messages.hex

  With no OUTPUT the records go to stdout; with no INPUT either the text is
  read from stdin. "-" names either stream explicitly.
 */

const LONG_ABOUT: &str = "Convert a plain text file into an Intel HEX image.

Lines starting with # are comments and are left out. Every other line is
stored with a CR LF ending, and the text is closed with a NUL byte.
Numbers may be decimal, 0x-prefixed hex, or end in k for multiples of 1024.";

#[derive(Parser, Debug)]
#[command(name = "romtext", version, about = "Convert text into an Intel HEX image", long_about = LONG_ABOUT)]
struct Cli {
    #[arg(
        short = 'a',
        long = "address",
        value_name = "ADDRESS",
        default_value = "0",
        value_parser = parse_address,
        help = "Load address of the image (e.g. -a8192 or -a0x2000)"
    )]
    address: u16,
    #[arg(
        short = 's',
        long = "size",
        value_name = "SIZE",
        default_value = "64k",
        value_parser = parse_rom_size,
        help = "Largest image to produce, in bytes"
    )]
    size: usize,
    #[arg(
        long = "strict",
        action = ArgAction::SetTrue,
        help = "Fail instead of dropping text that does not fit"
    )]
    strict: bool,
    #[arg(long = "crlf", action = ArgAction::SetTrue, help = "End output records with CR LF")]
    crlf: bool,
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, help = "More output (repeatable)")]
    verbose: u8,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        help = "Only report warnings and errors"
    )]
    quiet: bool,
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> TextConfig {
        TextConfig {
            address: self.address,
            capacity: self.size,
            overflow: if self.strict {
                OverflowPolicy::Error
            } else {
                OverflowPolicy::Truncate
            },
            line_ending: if self.crlf {
                LineEnding::CrLf
            } else {
                LineEnding::Lf
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logger::init(Logger::new("romtext", cli.verbose, cli.quiet)) {
        eprintln!("ERROR: {e}");
    }

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
    let input_path = stream_path(&cli.input);
    let input: Box<dyn BufRead> = match input_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("can't read {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let input_name = input_path.map_or_else(|| "<stdin>".into(), |p| p.display().to_string());
    let config = cli.config();
    let mut records = Vec::new();
    let size = text_to_hex(&config, input, &mut records).with_context(|| input_name.clone())?;
    write_output(stream_path(&cli.output), &records)?;
    info!(
        "{input_name}: {} bytes from 0x{:04X} to 0x{:04X}",
        size.counted,
        config.address,
        size.end_address(config.address)
    );
    Ok(())
}

/// Only called once the text has converted, so a failed run creates no file.
fn write_output(path: Option<&Path>, records: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => fs::write(path, records).with_context(|| format!("can't write {}", path.display())),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(records)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// `None` for the standard streams, whether omitted or given as "-".
fn stream_path(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| *p != Path::new("-"))
}
