use rusqlite;
use std::env;
use std::io;
use thiserror::Error;

/// Ambient host context a capability may require and find absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// No active document in the host editor.
    Editor,
    /// No workspace folder open in the host.
    Workspace,
}

impl ContextKind {
    /// Stable reason code recorded in telemetry metadata.
    pub fn reason(&self) -> &'static str {
        match self {
            ContextKind::Editor => "no_editor",
            ContextKind::Workspace => "no_workspace",
        }
    }

    /// Fixed user-facing text returned in the failure envelope.
    pub fn user_text(&self) -> &'static str {
        match self {
            ContextKind::Editor => "No active editor found",
            ContextKind::Workspace => "No workspace folder open",
        }
    }
}

#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Activation failed: {0}")]
    ActivationError(String),
    #[error("{}", .0.user_text())]
    MissingContext(ContextKind),
    #[error("Malformed input at {path}: {reason}")]
    MalformedInput { path: String, reason: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
}
