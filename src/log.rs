use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};
use std::io::Write;

fn level_prefix(level: Level) -> ColoredString {
    match level {
        Level::Error => "error".red().bold(),
        Level::Warn => "warning".yellow().bold(),
        Level::Info => "info".cyan(),
        Level::Debug => "debug".dimmed(),
        Level::Trace => "trace".dimmed(),
    }
}

/// Initialize the logger with a cargo-style formatter. `RUST_LOG` overrides
/// `default`.
pub fn init(default: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format(|buf, record| {
            let location = match (record.file(), record.line()) {
                (Some(file), Some(line)) => format!(" [{}:{}]", file, line),
                (Some(file), None) => format!(" [{}]", file),
                _ => String::new(),
            };

            // "error: message [file:line]"
            writeln!(
                buf,
                "{}: {}{}",
                level_prefix(record.level()),
                record.args(),
                location
            )
        })
        .init();
}
