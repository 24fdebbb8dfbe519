use parking_lot::Mutex;
/// Debug logging for tabspace
///
/// Every `log::*!` call in the workspace crates is routed through a single
/// `log::Log` bridge that appends timestamped lines to
/// `$TMPDIR/tabspace_debug.log`. When `RUST_LOG` is set the same lines are
/// mirrored to stderr.
///
/// The level is picked in order of precedence:
/// - `--log-level` on the command line
/// - `RUST_LOG` (a plain level name such as `debug`)
/// - `log_level` in config.yaml
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use tabspace_config::LogLevel;

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("tabspace_debug.log")
}

/// Pick the effective level from the CLI flag, `RUST_LOG` and the config.
///
/// An unparseable `RUST_LOG` falls through to the config value.
pub fn resolve_level(cli: Option<LogLevel>, rust_log: Option<&str>, config: LogLevel) -> LogLevel {
    cli.or_else(|| rust_log.and_then(LogLevel::from_name))
        .unwrap_or(config)
}

struct DebugLogger {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn open(level: LogLevel, mirror_stderr: bool) -> Self {
        let file = if level == LogLevel::Off {
            None
        } else {
            // Failure to open the file is not fatal; logging just goes nowhere.
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path())
                .ok()
        };

        let logger = DebugLogger {
            file: Mutex::new(file),
            mirror_stderr,
        };
        logger.write_line(&format!(
            "{}\ntabspace debug session started at {} (level={})\n{}",
            "=".repeat(80),
            timestamp(),
            level.display_name(),
            "=".repeat(80)
        ));
        logger
    }

    fn write_line(&self, line: &str) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = writeln!(file, "{}", line);
            let _ = file.flush();
        }
        if self.mirror_stderr {
            eprintln!("{}", line);
        }
    }
}

impl log::Log for DebugLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "[{}] [{:<5}] [{}] {}",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

/// Install the log bridge. Only the first call has any effect.
pub fn init_log_bridge(cli: Option<LogLevel>, config: LogLevel) -> LogLevel {
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = resolve_level(cli, rust_log.as_deref(), config);

    let logger = LOGGER.get_or_init(|| DebugLogger::open(level, rust_log.is_some()));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
    level
}

// Category macros: the category becomes the log target.
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        ::log::error!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        ::log::info!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        ::log::debug!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        ::log::trace!(target: $category, $($arg)*)
    };
}
