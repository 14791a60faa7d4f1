//! Command vocabulary, content-type constants, open modes and sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

use ucp_core::properties::{ContentInfo, Property, PropertyError, PropertyValue};
use ucp_core::PropertyRow;

use crate::ftp::content::FtpContent;
use crate::ftp::resultset::ResultSet;

// ─── Content types ───────────────────────────────────────────────────

/// Content type of every FTP content exposed by this provider.
pub const FTP_CONTENT_TYPE: &str = "application/ftp";
/// Creatable file kind.
pub const FTP_FILE: &str = "application/vnd.sun.staroffice.ftp-file";
/// Creatable folder kind.
pub const FTP_FOLDER: &str = "application/vnd.sun.staroffice.ftp-folder";

// ─── Command names ───────────────────────────────────────────────────

pub const CMD_GET_PROPERTY_VALUES: &str = "getPropertyValues";
pub const CMD_SET_PROPERTY_VALUES: &str = "setPropertyValues";
pub const CMD_GET_COMMAND_INFO: &str = "getCommandInfo";
pub const CMD_GET_PROPERTY_SET_INFO: &str = "getPropertySetInfo";
pub const CMD_INSERT: &str = "insert";
pub const CMD_DELETE: &str = "delete";
pub const CMD_OPEN: &str = "open";
pub const CMD_CREATE_NEW_CONTENT: &str = "createNewContent";

// ─── Open ────────────────────────────────────────────────────────────

/// Requested mode for the `open` command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OpenMode {
    /// Stream the document into the sink.
    Document,
    /// Enumerate all children.
    All,
    /// Enumerate file children only.
    Documents,
    /// Enumerate folder children only.
    Folders,
    /// Share-mode variant this provider does not serve.
    DocumentShareDenyNone,
    /// Share-mode variant this provider does not serve.
    DocumentShareDenyWrite,
}

impl OpenMode {
    pub fn is_listing(self) -> bool {
        matches!(self, OpenMode::All | OpenMode::Documents | OpenMode::Folders)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpenMode::Document => "document",
            OpenMode::All => "all",
            OpenMode::Documents => "documents",
            OpenMode::Folders => "folders",
            OpenMode::DocumentShareDenyNone => "documentShareDenyNone",
            OpenMode::DocumentShareDenyWrite => "documentShareDenyWrite",
        };
        f.write_str(name)
    }
}

/// Sink-side write failure; swallowed per chunk by the best-effort
/// drain in document-mode open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SinkError {
    NotConnected,
    BufferFull,
    Io,
}

/// Sink accepting a readable stream wholesale.
pub trait ActiveDataSink: Send {
    fn set_input_stream(&mut self, stream: Box<dyn Read + Send>);
}

/// Sink accepting pushed byte chunks.
pub trait OutputStream: Send {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), SinkError>;
}

/// Data sink supplied with an `open` command.
pub enum OpenSink {
    /// Takes ownership of the document stream.
    DataSink(Box<dyn ActiveDataSink>),
    /// Receives the document pushed in fixed-size chunks.
    OutputStream(Box<dyn OutputStream>),
    /// No sink; only valid for listing modes.
    None,
}

impl fmt::Debug for OpenSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpenSink::DataSink(_) => "DataSink",
            OpenSink::OutputStream(_) => "OutputStream",
            OpenSink::None => "None",
        };
        f.write_str(name)
    }
}

/// Argument of the `open` command.
#[derive(Debug)]
pub struct OpenArgument {
    pub mode: OpenMode,
    pub sink: OpenSink,
    /// Properties each row of a listing result set resolves.
    pub properties: Vec<Property>,
}

// ─── Insert ──────────────────────────────────────────────────────────

/// Argument of the `insert` command.
pub struct InsertArgument {
    /// Document data; required for file-typed pending resources.
    pub data: Option<Box<dyn Read + Send>>,
    /// Overwrite an existing object without asking.
    pub replace_existing: bool,
}

impl fmt::Debug for InsertArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertArgument")
            .field("data", &self.data.is_some())
            .field("replace_existing", &self.replace_existing)
            .finish()
    }
}

// ─── Commands ────────────────────────────────────────────────────────

/// Typed command argument. The shape must match the command name;
/// mismatches are terminal argument errors, never retried.
#[derive(Debug)]
pub enum CommandArgument {
    None,
    Properties(Vec<Property>),
    PropertyValues(Vec<(String, PropertyValue)>),
    Insert(InsertArgument),
    Open(OpenArgument),
    ContentInfo(ContentInfo),
}

/// A named, typed request executed against a content. Synchronous and
/// stateless; no identity beyond the single invocation.
#[derive(Debug)]
pub struct Command {
    pub name: String,
    pub argument: CommandArgument,
}

impl Command {
    pub fn new(name: impl Into<String>, argument: CommandArgument) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }

    pub fn get_property_values(properties: Vec<Property>) -> Self {
        Self::new(
            CMD_GET_PROPERTY_VALUES,
            CommandArgument::Properties(properties),
        )
    }

    pub fn set_property_values(values: Vec<(String, PropertyValue)>) -> Self {
        Self::new(
            CMD_SET_PROPERTY_VALUES,
            CommandArgument::PropertyValues(values),
        )
    }

    pub fn insert(argument: InsertArgument) -> Self {
        Self::new(CMD_INSERT, CommandArgument::Insert(argument))
    }

    pub fn delete() -> Self {
        Self::new(CMD_DELETE, CommandArgument::None)
    }

    pub fn open(argument: OpenArgument) -> Self {
        Self::new(CMD_OPEN, CommandArgument::Open(argument))
    }

    pub fn create_new_content(info: ContentInfo) -> Self {
        Self::new(CMD_CREATE_NEW_CONTENT, CommandArgument::ContentInfo(info))
    }

    pub fn get_command_info() -> Self {
        Self::new(CMD_GET_COMMAND_INFO, CommandArgument::None)
    }

    pub fn get_property_set_info() -> Self {
        Self::new(CMD_GET_PROPERTY_SET_INFO, CommandArgument::None)
    }
}

// ─── Capability description ──────────────────────────────────────────

/// Argument shape a command expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentKind {
    None,
    Properties,
    PropertyValues,
    Insert,
    Open,
    ContentInfo,
}

/// Static description of one supported command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandInfoEntry {
    pub name: String,
    pub argument_kind: ArgumentKind,
}

// ─── Outcomes ────────────────────────────────────────────────────────

/// Successful result of `execute`, keyed to the command.
pub enum CommandOutcome {
    /// `getPropertyValues` — one value-or-void slot per descriptor.
    Row(PropertyRow),
    /// `setPropertyValues` — one ok-or-error slot per pair.
    SetResults(Vec<Result<(), PropertyError>>),
    /// `open` in a listing mode.
    ResultSet(ResultSet),
    /// `createNewContent`; `None` when the type is unrecognized.
    Created(Option<FtpContent>),
    /// `getCommandInfo`.
    CommandInfo(Vec<CommandInfoEntry>),
    /// `getPropertySetInfo`.
    PropertySetInfo(Vec<Property>),
    /// Commands with no value (`insert`, `delete`, document-mode `open`).
    None,
}

impl fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandOutcome::Row(_) => "Row",
            CommandOutcome::SetResults(_) => "SetResults",
            CommandOutcome::ResultSet(_) => "ResultSet",
            CommandOutcome::Created(_) => "Created",
            CommandOutcome::CommandInfo(_) => "CommandInfo",
            CommandOutcome::PropertySetInfo(_) => "PropertySetInfo",
            CommandOutcome::None => "None",
        };
        f.write_str(name)
    }
}
