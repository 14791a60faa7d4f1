//! Blocking transport contract — the component performing actual
//! network I/O for list/read/create/rename/delete. Failures carry a
//! transport-specific error kind that the command core classifies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

use crate::ftp::url::FtpUrl;

// ─── Directory entries ───────────────────────────────────────────────

/// Kind of a remote filesystem entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DirentryKind {
    File,
    Folder,
    /// The transport could not determine the mode bits.
    Unknown,
}

/// Metadata snapshot for one remote object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Direntry {
    pub name: String,
    pub kind: DirentryKind,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    /// Write-permission bit; `IsReadOnly` derives from its absence.
    pub writable: bool,
}

impl Direntry {
    pub fn is_folder(&self) -> bool {
        self.kind == DirentryKind::Folder
    }

    pub fn is_document(&self) -> bool {
        self.kind == DirentryKind::File
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Transport failure category. `classify` in the error module maps
/// these onto retry actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransportErrorKind {
    /// TCP connection could not be established.
    ConnectionFailed,
    /// Host name could not be resolved.
    ResolveFailed,
    /// Bad credentials / login denied / bad password.
    AuthFailed,
    /// Access denied by the remote server.
    AccessDenied,
    /// A control command was rejected by the server.
    CommandRejected,
    /// Requested file could not be retrieved.
    NotFound,
    /// Create/insert target already exists (name clash during insert).
    AlreadyExists,
    /// Local I/O error while feeding or draining a data stream.
    Io,
    /// Nothing known about the cause.
    Unknown,
}

/// Categorised transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// Server reply code that triggered the error, if any.
    pub reply_code: Option<u16>,
}

pub type TransportResult<T> = Result<T, TransportError>;

impl TransportError {
    pub fn new(kind: TransportErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            reply_code: None,
        }
    }

    pub fn with_reply_code(mut self, code: u16) -> Self {
        self.reply_code = Some(code);
        self
    }

    // ── Convenience constructors ─────────────────────────────────

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ConnectionFailed, msg)
    }

    pub fn resolve_failed(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ResolveFailed, msg)
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::AuthFailed, msg)
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::AccessDenied, msg)
    }

    pub fn command_rejected(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::CommandRejected, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotFound, msg)
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::AlreadyExists, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Io, msg)
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, msg)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.reply_code {
            write!(f, "[transport {:?} {}] {}", self.kind, code, self.message)
        } else {
            write!(f, "[transport {:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

// ─── Contract ────────────────────────────────────────────────────────

/// Blocking transport layer. All calls run on the invoking thread; the
/// command core never holds a content lock across any of them.
pub trait Transport: Send + Sync {
    /// Metadata snapshot for the resource itself.
    fn direntry(&self, url: &FtpUrl) -> TransportResult<Direntry>;

    /// Children of a folder resource.
    fn list(&self, url: &FtpUrl) -> TransportResult<Vec<Direntry>>;

    /// Readable document stream for a file resource.
    fn open(&self, url: &FtpUrl) -> TransportResult<Box<dyn Read + Send>>;

    /// Create/overwrite a remote file from the data stream. Signals
    /// `AlreadyExists` when `replace` is false and the target exists.
    fn store(&self, url: &FtpUrl, replace: bool, data: &mut dyn Read) -> TransportResult<()>;

    /// Create a remote folder. Same `AlreadyExists` contract as `store`.
    fn mkdir(&self, url: &FtpUrl, replace: bool) -> TransportResult<()>;

    /// Remove the remote object.
    fn del(&self, url: &FtpUrl) -> TransportResult<()>;

    /// Rename the leaf to `new_title`; returns the previous title.
    fn rename(&self, url: &FtpUrl, new_title: &str) -> TransportResult<String>;
}
