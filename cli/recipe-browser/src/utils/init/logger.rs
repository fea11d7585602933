use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use anyhow::{Context, Result};
use tracing::{debug, error};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

/// Tracing targets of this workspace.
const OWN_TARGETS: [&str; 3] = ["recipes", "recipe_view", "recipe_catalog"];

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// Log file of the interactive session, set while a [LogFileGuard] is alive.
static SESSION_LOG: Mutex<Option<NonBlocking>> = Mutex::new(None);

fn session_log() -> std::sync::MutexGuard<'static, Option<NonBlocking>> {
    SESSION_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writes to stderr unless logs are redirected to the session log.
struct TerminalStderr;
impl<'a> MakeWriter<'a> for TerminalStderr {
    type Writer = TerminalStderr;

    fn make_writer(&'a self) -> Self::Writer {
        TerminalStderr
    }
}

impl Write for TerminalStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if session_log().is_some() {
            return Ok(buf.len());
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Writes to the session log if there is one, drops everything otherwise.
struct SessionLog;
impl<'a> MakeWriter<'a> for SessionLog {
    type Writer = SessionLog;

    fn make_writer(&'a self) -> Self::Writer {
        SessionLog
    }
}

impl Write for SessionLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match session_log().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match session_log().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn directives(verbosity: Verbosity) -> String {
    let own = |level: &str| {
        OWN_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    };

    match verbosity {
        // Show only errors
        Verbosity::Quiet => format!("off,{}", own("error")),
        // Only show warnings
        Verbosity::Verbose(0) => format!("off,{}", own("warn")),
        Verbosity::Verbose(1) => format!("off,{}", own("info")),
        Verbosity::Verbose(2) => format!("off,{}", own("debug")),
        Verbosity::Verbose(3) => format!("off,{}", own("trace")),
        // Also show debug from the http stack
        Verbosity::Verbose(4) => format!("debug,{}", own("trace")),
        Verbosity::Verbose(_) => "trace".to_string(),
    }
}

/// Install the global subscriber on first use, then only update its filter.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let log_filter = directives(verbosity.unwrap_or_default());

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle) = create_registry_and_filter_reload_handle();
        subscriber.init();
        reload_handle
    });

    update_filters(filter_handle, &log_filter);
}

fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

fn create_registry_and_filter_reload_handle() -> (
    impl tracing_subscriber::layer::SubscriberExt,
    Handle<EnvFilter, Registry>,
) {
    // Lowered to the requested level right after installation.
    let (filter, filter_reload_handle) =
        tracing_subscriber::reload::Layer::new(EnvFilter::new("trace"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(TerminalStderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(SessionLog);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);

    (registry, filter_reload_handle)
}

/// Keeps logs redirected to the session log file.
///
/// Dropping it sends logs back to stderr and flushes the file.
#[must_use = "logs go back to stderr once the guard is dropped"]
pub struct LogFileGuard {
    _worker: WorkerGuard,
}

impl Drop for LogFileGuard {
    fn drop(&mut self) {
        session_log().take();
    }
}

/// Redirect all log output to `path`, appending to an existing file.
///
/// Used while the terminal is owned by the interactive session.
pub fn log_to_file(path: &Path) -> Result<LogFileGuard> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path '{}' has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create log directory '{}'", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("could not open log file '{}'", path.display()))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    *session_log() = Some(writer);
    debug!(log_file = %path.display(), "redirected logs");

    Ok(LogFileGuard { _worker: worker })
}
