//! Rolling file logs for the inventory core.
//!
//! # Responsibility
//! - Start one `flexi_logger` file backend per process, sized by
//!   [`InventoryConfig`] or an explicit level.
//! - Record which inventory tunables the process started with.
//! - Route panics into the log with sanitized payloads.
//!
//! # Invariants
//! - Starting again with the same level and directory is a no-op.
//! - Starting with a different level or directory is rejected.
//! - Startup never panics.
//! - Events carry ids, counts and durations only; medication names and
//!   search text never reach the log files.

use crate::config::InventoryConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "medstash";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOG: OnceCell<ActiveLog> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated level + directory pair a logger is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: &'static str,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: normalize_level(level)?,
            dir: normalize_log_dir(log_dir)?,
        })
    }

    /// Describes why `self` cannot replace the already running `active`.
    fn conflict_with(&self, active: &LogTarget) -> Option<String> {
        if active.dir != self.dir {
            return Some(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                active.dir.display(),
                self.dir.display()
            ));
        }
        if active.level != self.level {
            return Some(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                active.level, self.level
            ));
        }
        None
    }
}

struct ActiveLog {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - `level` is not one of trace|debug|info|warn|error.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging already runs with another level or directory.
/// - The `flexi_logger` backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let target = LogTarget::parse(level, log_dir)?;
    if let Some(active) = ACTIVE_LOG.get() {
        return target.conflict_with(&active.target).map_or(Ok(()), Err);
    }

    let active = ACTIVE_LOG.get_or_try_init(|| start_file_logger(target.clone()))?;
    target.conflict_with(&active.target).map_or(Ok(()), Err)
}

/// Starts file logging at the configured level and records the inventory
/// tunables in effect.
///
/// # Errors
/// - Same as [`init_logging`].
pub fn init_logging_with_config(config: &InventoryConfig, log_dir: &str) -> Result<(), String> {
    init_logging(&config.log_level, log_dir)?;
    info!(
        "event=config_applied module=core status=ok undo_grace_ms={} search_debounce_ms={} default_sort={:?}",
        config.undo_grace_ms, config.search_debounce_ms, config.default_sort
    );
    Ok(())
}

/// Returns `(level, log_dir)` of the running logger, `None` before startup.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOG
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_file_logger(target: LogTarget) -> Result<ActiveLog, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(target.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_start module=core status=ok platform={} build_mode={} version={} level={} log_dir={}",
        std::env::consts::OS,
        if cfg!(debug_assertions) { "debug" } else { "release" },
        env!("CARGO_PKG_VERSION"),
        target.level,
        target.dir.display()
    );

    Ok(ActiveLog {
        target,
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        // Payload may echo medication names.
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    let mut truncated: String = single_line.chars().take(max_chars).collect();
    if single_line.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
