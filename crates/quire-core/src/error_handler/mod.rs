//! # Quire Core Error Handler
//!
//! Strategy object that receives runtime failures after boot and decides
//! how they surface. Every report is appended to the error log and sent
//! through the `log` facade; only in [`DisplayMode::Development`] is the
//! rendered report also written to the display sink (stderr unless
//! replaced).
//!
//! Three entry points mirror the kinds of failure a site can hit:
//! [`ErrorHandler::error`] for recoverable errors,
//! [`ErrorHandler::exception`] for errors that reached the top level
//! unhandled, and [`ErrorHandler::fatal`] for conditions that end the
//! process, including panics once [`install_panic_hook`] is called.
use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::StorageProvider;

/// Whether errors are shown to the user or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Show every error with its full cause chain.
    Development,
    /// Suppress display; errors are only logged.
    Production,
}

impl DisplayMode {
    pub fn from_display_flag(display: bool) -> Self {
        if display {
            DisplayMode::Development
        } else {
            DisplayMode::Production
        }
    }
}

/// Kind of failure being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Error,
    Exception,
    Fatal,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportKind::Error => "error",
            ReportKind::Exception => "exception",
            ReportKind::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

pub struct ErrorHandler {
    mode: DisplayMode,
    log_file: PathBuf,
    provider: Arc<dyn StorageProvider>,
    display: Mutex<Box<dyn Write + Send>>,
}

impl ErrorHandler {
    /// Create a handler writing to `<logs_dir>/errors.log`.
    ///
    /// The log directory must already exist; the kernel creates it before
    /// building the handler.
    pub fn new(mode: DisplayMode, logs_dir: &Path, provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            mode,
            log_file: logs_dir.join(constants::ERROR_LOG_FILE),
            provider,
            display: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Replace the display sink.
    pub fn with_display_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.display = Mutex::new(sink);
        self
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_development(&self) -> bool {
        self.mode == DisplayMode::Development
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Report a recoverable error.
    pub fn error(&self, err: &(dyn StdError + 'static)) -> Option<String> {
        self.report(ReportKind::Error, &err.to_string(), causes(err))
    }

    /// Report an error that reached the top level unhandled.
    pub fn exception(&self, err: &(dyn StdError + 'static)) -> Option<String> {
        self.report(ReportKind::Exception, &err.to_string(), causes(err))
    }

    /// Report a fatal condition.
    pub fn fatal(&self, message: &str) -> Option<String> {
        self.report(ReportKind::Fatal, message, Vec::new())
    }

    fn report(&self, kind: ReportKind, message: &str, causes: Vec<String>) -> Option<String> {
        let mut line = format!(
            "[{}] {}: {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            kind.to_string().to_uppercase(),
            message
        );
        for cause in &causes {
            line.push_str(" | caused by: ");
            line.push_str(cause);
        }

        match kind {
            ReportKind::Fatal | ReportKind::Exception => log::error!("{}", line),
            ReportKind::Error => log::warn!("{}", line),
        }
        if let Err(e) = self.append_to_log(&line) {
            log::warn!("Could not write to error log {}: {}", self.log_file.display(), e);
        }

        if self.mode == DisplayMode::Production {
            return None;
        }

        let rendered = render(kind, message, &causes);
        match self.display.lock() {
            Ok(mut sink) => {
                if let Err(e) = sink.write_all(rendered.as_bytes()).and_then(|()| sink.flush()) {
                    log::warn!("Could not display error report: {}", e);
                }
            }
            Err(_) => log::warn!("Error display sink is poisoned; report not displayed"),
        }
        Some(rendered)
    }

    fn append_to_log(&self, line: &str) -> Result<()> {
        let mut file = self.provider.open_append(&self.log_file)?;
        writeln!(file, "{}", line)
            .map_err(|e| crate::kernel::error::Error::io(e, "append_error_log", self.log_file.clone()))
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("mode", &self.mode)
            .field("log_file", &self.log_file)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Route panics to [`ErrorHandler::fatal`], then to the hook that was
/// installed before.
pub fn install_panic_hook(handler: Arc<ErrorHandler>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        handler.fatal(&info.to_string());
        previous(info);
    }));
}

fn causes(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

fn render(kind: ReportKind, message: &str, causes: &[String]) -> String {
    let mut out = format!("{} {}: {}\n", constants::APP_NAME, kind, message);
    for (i, cause) in causes.iter().enumerate() {
        out.push_str(&format!("  {}: caused by: {}\n", i, cause));
    }
    out
}
