//! Transport-failure classification and the terminal command-error
//! taxonomy. All terminal failures funnel through `CommandError`;
//! per-slot property errors stay inline in their result batch.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ftp::transport::{TransportError, TransportErrorKind};
use crate::ftp::url::FtpUrl;

// ─── Retry actions ───────────────────────────────────────────────────

/// Classification of a transport failure, computed per failed attempt
/// and never persisted. Only `RetryWithAuth` leads to a re-attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RetryAction {
    None,
    RetryWithAuth,
    DenyAccess,
    ConnectFailed,
    ResolveFailed,
    QuotaError,
    MissingResource,
    GeneralError,
}

/// Map a transport error kind onto a retry action. Total, pure and
/// deterministic.
pub fn classify(kind: TransportErrorKind) -> RetryAction {
    match kind {
        TransportErrorKind::ConnectionFailed => RetryAction::ConnectFailed,
        TransportErrorKind::ResolveFailed => RetryAction::ResolveFailed,
        TransportErrorKind::AuthFailed => RetryAction::RetryWithAuth,
        TransportErrorKind::AccessDenied => RetryAction::DenyAccess,
        TransportErrorKind::CommandRejected => RetryAction::QuotaError,
        TransportErrorKind::NotFound => RetryAction::MissingResource,
        TransportErrorKind::AlreadyExists
        | TransportErrorKind::Io
        | TransportErrorKind::Unknown => RetryAction::GeneralError,
    }
}

// ─── Command errors ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CommandErrorKind {
    /// Wrong argument shape for a command. Terminal, never retried.
    IllegalArgument,
    /// Command name outside the fixed vocabulary.
    UnsupportedCommand,
    /// Open mode the provider cannot serve.
    UnsupportedOpenMode,
    /// Document-mode open with a sink that accepts neither a stream
    /// nor pushed bytes.
    UnsupportedDataSink,
    /// File-typed pending resource inserted without a data stream.
    MissingInputStream,
    /// Pending resource inserted before a title was assigned.
    MissingProperties,
    /// Create/insert target exists and replacement was not approved.
    NameClash,
    /// The interaction handler declined the authentication request.
    AuthenticationCancelled,
    /// Authentication required but no interaction handler attached.
    InteractivelyUnresolvable,
    /// The authentication retry cap was exhausted.
    RetryLimitReached,
    /// Access denied by the remote server.
    AccessDenied,
    /// Connection could not be established.
    ConnectFailed,
    /// Host name could not be resolved.
    ResolveFailed,
    /// A control command was rejected by the server.
    QuotaError,
    /// Requested resource could not be retrieved.
    NotFound,
    /// Nothing known about the cause.
    General,
}

/// Terminal command failure — the single cancellation boundary for a
/// command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub kind: CommandErrorKind,
    pub message: String,
    /// Identifier of the resource the command targeted, if known.
    pub url: Option<String>,
}

pub type CommandResult<T> = Result<T, CommandError>;

impl CommandError {
    pub fn new(kind: CommandErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    // ── Convenience constructors ─────────────────────────────────

    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        Self::new(CommandErrorKind::IllegalArgument, msg)
    }

    pub fn unsupported_command(name: &str) -> Self {
        Self::new(
            CommandErrorKind::UnsupportedCommand,
            format!("Unsupported command '{}'", name),
        )
    }

    pub fn unsupported_open_mode(mode: &str) -> Self {
        Self::new(
            CommandErrorKind::UnsupportedOpenMode,
            format!("Unsupported open mode '{}'", mode),
        )
    }

    pub fn unsupported_data_sink() -> Self {
        Self::new(
            CommandErrorKind::UnsupportedDataSink,
            "Sink accepts neither an input stream nor pushed bytes",
        )
    }

    pub fn missing_input_stream() -> Self {
        Self::new(
            CommandErrorKind::MissingInputStream,
            "File insert requires a data stream",
        )
    }

    pub fn missing_properties(names: &[&str]) -> Self {
        Self::new(
            CommandErrorKind::MissingProperties,
            format!("Missing properties: {}", names.join(", ")),
        )
    }

    pub fn name_clash(url: &FtpUrl) -> Self {
        Self::new(
            CommandErrorKind::NameClash,
            format!("'{}' already exists", url.title()),
        )
        .with_url(url.ident())
    }

    pub fn authentication_cancelled(server: &str) -> Self {
        Self::new(
            CommandErrorKind::AuthenticationCancelled,
            format!("Authentication against '{}' cancelled", server),
        )
    }

    pub fn interactively_unresolvable(server: &str) -> Self {
        Self::new(
            CommandErrorKind::InteractivelyUnresolvable,
            format!(
                "Authentication against '{}' required but no interaction handler is attached",
                server
            ),
        )
    }

    pub fn retry_limit_reached(attempts: u32) -> Self {
        Self::new(
            CommandErrorKind::RetryLimitReached,
            format!("Giving up after {} authentication attempts", attempts),
        )
    }

    pub fn not_found(url: &FtpUrl) -> Self {
        Self::new(CommandErrorKind::NotFound, "Resource could not be retrieved")
            .with_url(url.ident())
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(CommandErrorKind::General, msg)
    }

    /// Terminal error for a classified transport failure. Only valid
    /// for terminal actions; `None` and `RetryWithAuth` are handled by
    /// the retry loop before this point.
    pub fn from_action(action: RetryAction, url: &FtpUrl, cause: &TransportError) -> Self {
        match action {
            RetryAction::DenyAccess => {
                Self::new(CommandErrorKind::AccessDenied, cause.message.clone())
                    .with_url(url.ident())
            }
            RetryAction::ConnectFailed => Self::new(
                CommandErrorKind::ConnectFailed,
                format!("Could not connect to '{}'", url.host()),
            ),
            RetryAction::ResolveFailed => Self::new(
                CommandErrorKind::ResolveFailed,
                format!("Could not resolve '{}'", url.host()),
            ),
            RetryAction::QuotaError => {
                Self::new(CommandErrorKind::QuotaError, cause.message.clone())
            }
            RetryAction::MissingResource => Self::not_found(url),
            RetryAction::None | RetryAction::RetryWithAuth | RetryAction::GeneralError => {
                Self::new(CommandErrorKind::General, cause.message.clone())
            }
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "[{:?}] {} ({})", self.kind, self.message, url),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for CommandError {}
