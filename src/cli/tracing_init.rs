//! Tracing initialization for the binary.
//!
//! `-v`/`-vv` pick debug/trace; otherwise `WAYFINDER_LOG` holds an
//! `EnvFilter` directive. `WAYFINDER_LOG_FORMAT` selects `json` or `text`
//! and `WAYFINDER_LOG_FILE` appends to a file instead of stderr.

use crate::constants;
use std::fs::{File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Log sink: the configured file, falling back to stderr.
struct LogWriter {
    file: Option<Mutex<File>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogWriter {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.file
            .as_ref()
            .and_then(|mutex| mutex.lock().ok())
            .and_then(|file| file.try_clone().ok())
            .map_or_else(
                || Box::new(std::io::stderr()) as Self::Writer,
                |cloned| Box::new(cloned) as Self::Writer,
            )
    }
}

fn filter_directive(verbosity: u8, env_value: Option<String>) -> String {
    match verbosity {
        0 => env_value.unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn log_format(env_value: Option<&str>) -> Option<LogFormat> {
    match env_value.map(str::to_lowercase).as_deref() {
        None | Some("text") => Some(LogFormat::Text),
        Some("json") => Some(LogFormat::Json),
        Some(_) => None,
    }
}

fn log_writer() -> LogWriter {
    let Ok(path) = std::env::var(constants::ENV_WAYFINDER_LOG_FILE) else {
        return LogWriter { file: None };
    };
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => LogWriter {
            file: Some(Mutex::new(file)),
        },
        Err(e) => {
            // Tracing is not initialized yet; stderr is the only channel.
            eprintln!("Warning: Could not open log file '{path}': {e}. Using stderr.");
            LogWriter { file: None }
        }
    }
}

/// Installs the global subscriber. Call once, before any logging.
pub fn init_tracing(verbosity: u8) {
    let directive = filter_directive(verbosity, std::env::var(constants::ENV_WAYFINDER_LOG).ok());
    let env_filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let format_value = std::env::var(constants::ENV_WAYFINDER_LOG_FORMAT).ok();
    let format = log_format(format_value.as_deref()).unwrap_or_else(|| {
        eprintln!(
            "Warning: Unrecognized {} '{}'. Valid values: 'json', 'text'. Using 'text'.",
            constants::ENV_WAYFINDER_LOG_FORMAT,
            format_value.unwrap_or_default()
        );
        LogFormat::Text
    });

    let writer = log_writer();
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_list(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(writer),
            )
            .init(),
    }
}
