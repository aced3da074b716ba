//! Translation between the object model and the IDF record graph.
//!
//! Component translation is driven by per-class [`mapping`] tables; composite
//! components are spliced into the node graph by [`stitch`].

pub mod forward;
pub mod mapping;
pub mod reverse;
pub mod stitch;

pub use forward::ForwardTranslator;
pub use reverse::ReverseTranslator;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Severity of a translator diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A diagnostic produced during a translation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    /// Brief description of the object concerned, if any.
    pub object: Option<String>,
    pub message: String,
}

impl std::fmt::Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.object {
            Some(object) => write!(f, "{object}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Diagnostics of one pass. Every entry is also emitted as a tracing event.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<LogMessage>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, object: Option<&str>, message: impl Into<String>) {
        self.push(LogLevel::Info, object, message.into());
    }

    pub fn warn(&mut self, object: Option<&str>, message: impl Into<String>) {
        self.push(LogLevel::Warn, object, message.into());
    }

    pub fn error(&mut self, object: Option<&str>, message: impl Into<String>) {
        self.push(LogLevel::Error, object, message.into());
    }

    fn push(&mut self, level: LogLevel, object: Option<&str>, message: String) {
        let entry = LogMessage {
            level,
            object: object.map(str::to_string),
            message,
        };
        match level {
            LogLevel::Info => info!("{}", entry),
            LogLevel::Warn => warn!("{}", entry),
            LogLevel::Error => error!("{}", entry),
        }
        self.messages.push(entry);
    }

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    pub fn warnings(&self) -> Vec<LogMessage> {
        self.of_level(LogLevel::Warn)
    }

    pub fn errors(&self) -> Vec<LogMessage> {
        self.of_level(LogLevel::Error)
    }

    fn of_level(&self, level: LogLevel) -> Vec<LogMessage> {
        self.messages
            .iter()
            .filter(|m| m.level == level)
            .cloned()
            .collect()
    }
}

/// Options of the forward translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Check references at the end of a pass and log every issue as an error.
    pub check_references: bool,
    /// Fail the pass when the reference check finds issues.
    pub fail_on_dangling_references: bool,
    /// Name of the schedule synthesized for fields that default to always on.
    pub always_on_schedule_name: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            check_references: true,
            fail_on_dangling_references: false,
            always_on_schedule_name: "Always On Discrete".to_string(),
        }
    }
}
