//! Logging setup for the roundtable binary
//!
//! Console output always goes to stderr so transcripts and JSON reports on
//! stdout stay clean. An optional rolling file is written off-thread.
//! `RUST_LOG` still controls other crates; the `roundtable` target follows
//! the configured level and the `-v`/`-q` flags.

use std::fs;
use std::path::Path;

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

const CRATE_TARGET: &str = "roundtable";

/// Size limit (MB) under which the file rotates hourly instead of daily
const HOURLY_ROTATION_BELOW_MB: u64 = 10;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Keeps the file writer alive; dropping it flushes pending lines
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Terminal,
    File,
}

/// Install the global subscriber for a long-running command.
///
/// Hold the returned guards until the program exits.
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = effective_level(&settings.level, verbose, quiet);

    let (file, file_guard) = match settings.file {
        Some(ref log_file) => {
            let (layer, guard) = file_layer(Path::new(log_file), settings)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(crate_filter(level)?)
        .with(format_layer(std::io::stderr, settings.json_format, Sink::Terminal))
        .with(file)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        level = %level,
        file = ?settings.file,
        json = settings.json_format,
        "Logging initialized"
    );

    Ok(LogGuards {
        _file_guard: file_guard,
    })
}

/// Minimal stderr logging for catalog and config subcommands
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(crate_filter(level)?)
        .with(fmt::layer().with_writer(std::io::stderr).without_time().compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// `-q` wins, then each `-v` steps past the configured level
fn effective_level(configured: &str, verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => parse_level(configured),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` (or warn) for dependencies, `level` for this crate
fn crate_filter(level: Level) -> Result<EnvFilter> {
    let directive: Directive = format!("{}={}", CRATE_TARGET, level.as_str().to_lowercase())
        .parse()
        .map_err(|e| Error::Config(format!("Invalid log directive: {}", e)))?;

    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    Ok(base.add_directive(directive))
}

fn format_layer<S, W>(writer: W, json: bool, sink: Sink) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let detailed = sink == Sink::File;

    if json {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_file(detailed)
                .with_line_number(detailed)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(writer)
                .with_target(detailed)
                .with_thread_ids(detailed)
                .with_file(detailed)
                .with_line_number(detailed)
                .with_ansi(sink == Sink::Terminal)
                .compact(),
        )
    }
}

/// Rolling file layer; tracing-appender rotates by time, so the size limit
/// only picks the rotation period
fn file_layer<S>(path: &Path, settings: &LoggingSettings) -> Result<(BoxedLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|e| Error::IoWrite {
        path: directory.to_path_buf(),
        source: e,
    })?;

    let prefix = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or(CRATE_TARGET);

    let rotation = if settings.max_file_size_mb > 0 && settings.max_file_size_mb < HOURLY_ROTATION_BELOW_MB {
        Rotation::HOURLY
    } else {
        Rotation::DAILY
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(settings.max_files.max(1) as usize)
        .build(directory)
        .map_err(|e| Error::Config(format!("Failed to create log file appender: {}", e)))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((format_layer(writer, settings.json_format, Sink::File), guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn test_quiet_beats_verbose() {
        assert_eq!(effective_level("info", 2, true), Level::ERROR);
    }

    #[test]
    fn test_verbosity_steps() {
        assert_eq!(effective_level("warn", 0, false), Level::WARN);
        assert_eq!(effective_level("warn", 1, false), Level::DEBUG);
        assert_eq!(effective_level("warn", 3, false), Level::TRACE);
    }

    #[test]
    fn test_crate_filter_targets_roundtable() {
        let filter = crate_filter(Level::DEBUG).unwrap();
        assert!(filter.to_string().to_lowercase().contains("roundtable=debug"));
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("roundtable.log");
        let settings = LoggingSettings {
            file: Some(log_path.to_string_lossy().into_owned()),
            max_files: 3,
            json_format: true,
            ..Default::default()
        };

        let result = file_layer::<tracing_subscriber::Registry>(&log_path, &settings);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("logs").is_dir());
    }
}
