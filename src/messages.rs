//! Diagnostic Messages
//!
//! Compilers and runtime collaborators report diagnostics through the
//! [`MessageSink`] trait. The stock implementation, [`MessageStack`], keeps
//! the entries for the UI panel and mirrors each one to the `log` facade.

use std::fmt;

/// Severity of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Error,
    Warning,
    Message,
}

/// A single diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    /// Owning pipeline item, if the message belongs to one.
    pub group: Option<String>,
    pub text: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}({line}): {}", self.text),
            (Some(file), None) => write!(f, "{file}: {}", self.text),
            (None, Some(line)) => write!(f, "({line}): {}", self.text),
            (None, None) => f.write_str(&self.text),
        }
    }
}

/// Receives compiler and runtime diagnostics.
///
/// No format contract beyond severity, optional file and optional line.
pub trait MessageSink {
    fn log(&mut self, message: &str, is_error: bool, file: Option<&str>, line: Option<u32>);

    /// Warnings are not part of the minimal contract; sinks that do not
    /// distinguish them see a non-error entry.
    fn warn(&mut self, message: &str, file: Option<&str>, line: Option<u32>) {
        self.log(message, false, file, line);
    }
}

/// Ordered message store scoped to one session.
#[derive(Debug, Default)]
pub struct MessageStack {
    messages: Vec<Message>,
    current_group: Option<String>,
}

impl MessageStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags subsequent entries with a pipeline item name.
    pub fn set_group(&mut self, group: Option<&str>) {
        self.current_group = group.map(str::to_owned);
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.current_group.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.kind == MessageKind::Error)
            .count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.kind == MessageKind::Error)
    }

    /// Drops every message attached to `group`, typically before recompiling it.
    pub fn clear_group(&mut self, group: &str) {
        self.messages.retain(|m| m.group.as_deref() != Some(group));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, kind: MessageKind, text: &str, file: Option<&str>, line: Option<u32>) {
        let message = Message {
            kind,
            group: self.current_group.clone(),
            text: text.to_owned(),
            file: file.map(str::to_owned),
            line,
        };

        match kind {
            MessageKind::Error => log::error!("{message}"),
            MessageKind::Warning => log::warn!("{message}"),
            MessageKind::Message => log::info!("{message}"),
        }

        self.messages.push(message);
    }
}

impl MessageSink for MessageStack {
    fn log(&mut self, message: &str, is_error: bool, file: Option<&str>, line: Option<u32>) {
        let kind = if is_error {
            MessageKind::Error
        } else {
            MessageKind::Message
        };
        self.push(kind, message, file, line);
    }

    fn warn(&mut self, message: &str, file: Option<&str>, line: Option<u32>) {
        self.push(MessageKind::Warning, message, file, line);
    }
}
