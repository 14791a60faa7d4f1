//! # ucp-ftp — FTP content provider
//!
//! Executes generic, named commands (open, insert, delete, rename,
//! property get/set, child creation) against a blocking FTP transport,
//! classifies transport failures into a fixed taxonomy of
//! recoverable/unrecoverable conditions, and drives an interactive
//! credential-retry protocol for authentication failures before
//! re-attempting the same command.

pub mod ftp;

pub use ftp::content::FtpContent;
pub use ftp::error::{classify, CommandError, CommandErrorKind, CommandResult, RetryAction};
pub use ftp::provider::{FtpContentProvider, ProviderConfig};
pub use ftp::transport::{
    Direntry, DirentryKind, Transport, TransportError, TransportErrorKind, TransportResult,
};
pub use ftp::types::*;
pub use ftp::url::FtpUrl;
