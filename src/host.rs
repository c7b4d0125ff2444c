//! The host extension API (spec.md §6) — logging, dialogs, notifications,
//! and the one narrow disk read a few detectors need. Everything else
//! (physical file copies, packaging, test fixtures) lives entirely on the
//! host side and never crosses this trait.

use std::path::Path;

use crate::error::{InstallError, InstallResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogSeverity {
    Info,
    Warning,
    Error,
}

/// A notification the host should surface to the user without blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: DialogSeverity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: DialogSeverity::Info, title: title.into(), message: message.into() }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: DialogSeverity::Warning, title: title.into(), message: message.into() }
    }
}

/// Capability interface the core installer pipeline consumes from its host.
/// All methods are synchronous in signature — spec.md §5 confines
/// suspension to these exact boundary calls and lets the host adapt them to
/// its own event loop (async or otherwise).
#[cfg_attr(test, mockall::automock)]
pub trait HostApi {
    fn log(&self, level: LogLevel, message: &str);

    /// Show a blocking dialog with the given actions; returns the chosen
    /// action's label. Hosts with no UI (e.g. batch/headless runs) should
    /// return a sensible default — usually the first action.
    fn show_dialog(&self, severity: DialogSeverity, title: &str, body: &str, actions: &[&str]) -> String;

    fn send_notification(&self, notification: Notification);

    /// Read a file from the host's staging directory. Used only by the
    /// REDmod installer to load `info.json`.
    fn read_file(&self, path_on_disk: &Path) -> InstallResult<Vec<u8>>;
}

/// A host that logs to `tracing`, auto-picks the first dialog action, and
/// reads files straight from disk. Suitable for the CLI harness and for
/// any headless/batch caller.
#[derive(Debug, Default)]
pub struct TracingHost;

impl HostApi for TracingHost {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }

    fn show_dialog(&self, severity: DialogSeverity, title: &str, body: &str, actions: &[&str]) -> String {
        tracing::warn!(?severity, title, body, ?actions, "dialog surfaced to headless host");
        actions.first().map(|s| s.to_string()).unwrap_or_default()
    }

    fn send_notification(&self, notification: Notification) {
        tracing::info!(title = %notification.title, message = %notification.message, "notification");
    }

    fn read_file(&self, path_on_disk: &Path) -> InstallResult<Vec<u8>> {
        std::fs::read(path_on_disk).map_err(|e| InstallError::io(path_on_disk.display().to_string(), e))
    }
}

/// A host double that records every call instead of acting on it, for unit
/// tests that need to assert which dialogs/notifications a detector raised.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub logs: std::cell::RefCell<Vec<(LogLevel, String)>>,
    pub dialogs: std::cell::RefCell<Vec<(DialogSeverity, String, String)>>,
    pub notifications: std::cell::RefCell<Vec<Notification>>,
    /// Files the test wants `read_file` to "contain", keyed by path string.
    pub files: std::collections::HashMap<String, Vec<u8>>,
    /// The action to return from every `show_dialog` call.
    pub dialog_choice: String,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self { dialog_choice: String::new(), ..Default::default() }
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with_dialog_choice(mut self, choice: impl Into<String>) -> Self {
        self.dialog_choice = choice.into();
        self
    }
}

impl HostApi for RecordingHost {
    fn log(&self, level: LogLevel, message: &str) {
        self.logs.borrow_mut().push((level, message.to_string()));
    }

    fn show_dialog(&self, severity: DialogSeverity, title: &str, body: &str, _actions: &[&str]) -> String {
        self.dialogs.borrow_mut().push((severity, title.to_string(), body.to_string()));
        self.dialog_choice.clone()
    }

    fn send_notification(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }

    fn read_file(&self, path_on_disk: &Path) -> InstallResult<Vec<u8>> {
        let key = path_on_disk.to_string_lossy().to_string();
        self.files
            .get(&key)
            .cloned()
            .ok_or_else(|| InstallError::io(key, "no such file registered on RecordingHost"))
    }
}
