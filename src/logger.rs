//! Terminal backend for the `log` facade.
//!
//! Messages go to stderr with a coloured level prefix so stdout stays free
//! for the final summary line (or the `--json` report).

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Stream};

struct TerminalLogger;

static LOGGER: TerminalLogger = TerminalLogger;

impl Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("{} {}", prefix(record.level()), record.args());
    }

    fn flush(&self) {}
}

fn prefix(level: Level) -> String {
    let tag = format!("[{}]", level.as_str().to_lowercase());
    match level {
        Level::Error => tag.if_supports_color(Stream::Stderr, |t| t.red()).to_string(),
        Level::Warn => tag.if_supports_color(Stream::Stderr, |t| t.yellow()).to_string(),
        Level::Info => tag.if_supports_color(Stream::Stderr, |t| t.green()).to_string(),
        Level::Debug | Level::Trace => tag.if_supports_color(Stream::Stderr, |t| t.dimmed()).to_string(),
    }
}

/// Level used for a given `--verbose` setting
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the logger. Calling it twice only updates the level.
pub fn init(verbose: bool) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_for(verbose));
}
