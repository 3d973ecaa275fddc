use std::io::{self, Write};

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))
}

/// Writes log lines to stderr, keeping stdout free for HEX output.
pub struct Logger {
    pub level: LevelFilter,
    /// Name printed in front of warnings and errors.
    pub program: &'static str,
}

impl Logger {
    pub fn new(program: &'static str, verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            LevelFilter::Warn
        } else {
            match verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        Logger { level, program }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = match record.level() {
            Level::Info => writeln!(stderr, "{}", record.args()),
            Level::Error | Level::Warn => {
                writeln!(stderr, "{}: {} - {}", self.program, record.level(), record.args())
            }
            level => writeln!(stderr, "{level} - {}", record.args()),
        };
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
