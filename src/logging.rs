//! Tracing setup for the two ways the binary runs.
//!
//! The `serve` subcommand gets machine-readable JSON logs on disk (daily
//! rotation) alongside a stderr layer; the interactive subcommands only log
//! to stderr and default to `warn` so log lines do not interleave with the
//! prompt flow. Both modes read `RUST_LOG` when it is set.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Rotated log file prefix; the appender adds a `.YYYY-MM-DD` suffix.
const LOG_FILE_PREFIX: &str = "draftsmith.log";

/// Filter directive used by the service when `RUST_LOG` is unset.
const SERVICE_DEFAULT_DIRECTIVE: &str = "info";

/// Filter directive used by interactive subcommands when `RUST_LOG` is unset.
const CLI_DEFAULT_DIRECTIVE: &str = "warn";

/// Keeps the non-blocking file writer alive.
///
/// Hold this for the whole process; dropping it flushes queued entries and
/// closes the log file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// `RUST_LOG` if set, otherwise the given default directive.
fn rust_log_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Set up logging for the `serve` subcommand.
///
/// JSON entries go to `{logs_dir}/draftsmith.log.YYYY-MM-DD`, rotated daily;
/// a human-readable copy goes to stderr. One filter governs both layers,
/// defaulting to `info`.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created.
pub fn init_service(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(rust_log_filter(SERVICE_DEFAULT_DIRECTIVE))
        .with(json_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard { _guard: guard })
}

/// Set up stderr-only logging for the interactive subcommands.
///
/// Defaults to `warn` so prompts stay clean; raise via `RUST_LOG` when
/// debugging.
pub fn init_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(rust_log_filter(CLI_DEFAULT_DIRECTIVE))
        .with_writer(std::io::stderr)
        .init();
}
