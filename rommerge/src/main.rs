use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{error, warn};

use romhex::config::{parse_address, parse_fill_byte, parse_rom_size};
use romhex::logger::{self, Logger};
use romhex::{merge_files, LineEnding, MergeConfig};

/*
Usage:
  rommerge -s32k -o32k -f0 rom.hex boot.hex monitor.hex

  Every input is loaded into one image, then the whole image is written out,
  unused locations included.
 */

const LONG_ABOUT: &str = "Merge Intel HEX files into a single ROM image.

Locations no input touches are written out holding the fill byte.
Two inputs giving different values for one address is an error, unless
one of the values is the fill byte itself.
Numbers may be decimal, 0x-prefixed hex, or end in k for multiples of 1024.";

#[derive(Parser, Debug)]
#[command(name = "rommerge", version, about = "Merge Intel HEX files into one ROM image", long_about = LONG_ABOUT)]
struct Cli {
    #[arg(
        short = 's',
        long = "size",
        value_name = "SIZE",
        default_value = "64k",
        value_parser = parse_rom_size,
        help = "ROM size in bytes (e.g. -s32k or -s32768)"
    )]
    size: usize,
    #[arg(
        short = 'o',
        long = "offset",
        value_name = "OFFSET",
        default_value = "0",
        value_parser = parse_address,
        help = "Address of the first ROM byte (e.g. -o32k starts the image at 0x8000)"
    )]
    offset: u16,
    #[arg(
        short = 'f',
        long = "fill",
        value_name = "BYTE",
        default_value = "255",
        value_parser = parse_fill_byte,
        help = "Filler for unused locations (e.g. -f0 or -f255)"
    )]
    fill: u8,
    #[arg(
        long = "keep-going",
        action = ArgAction::SetTrue,
        help = "Report an input that fails to load and continue with the rest"
    )]
    keep_going: bool,
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
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,
}

impl Cli {
    fn config(&self) -> MergeConfig {
        MergeConfig {
            rom_size: self.size,
            offset: self.offset,
            fill: self.fill,
            keep_going: self.keep_going,
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
    if let Err(e) = logger::init(Logger::new("rommerge", cli.verbose, cli.quiet)) {
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
    let config = cli.config();
    let summary = merge_files(&config, &cli.output, cli.inputs.as_slice())?;
    if summary.skipped > 0 {
        warn!("{} of {} input files skipped", summary.skipped, cli.inputs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_style_options() {
        let cli = Cli::try_parse_from(["rommerge", "-s32k", "-o32k", "-f0", "out.hex", "a.hex", "b.hex"])
            .expect("parse failed");
        let config = cli.config();
        assert_eq!(config.rom_size, 0x8000);
        assert_eq!(config.offset, 0x8000);
        assert_eq!(config.fill, 0);
        assert_eq!(cli.output, PathBuf::from("out.hex"));
        assert_eq!(cli.inputs.len(), 2);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["rommerge", "out.hex", "a.hex"]).expect("parse failed");
        assert_eq!(cli.config(), MergeConfig::default());
    }

    #[test]
    fn input_required() {
        assert!(Cli::try_parse_from(["rommerge", "out.hex"]).is_err());
    }

    #[test]
    fn rejects_oversized_rom() {
        assert!(Cli::try_parse_from(["rommerge", "-s65537", "out.hex", "a.hex"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
