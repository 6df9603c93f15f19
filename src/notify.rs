use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{error, info};

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A single user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Emits toasts as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(target: "toast", "{}", message),
            _ => info!(target: "toast", severity = %severity, "{}", message),
        }
    }
}

/// Keeps every toast in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts in the order they were raised
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages only
    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Toast {
                message: message.to_string(),
                severity,
            });
    }
}
