//! Property read/write paths and the provider's declared tables.

use lazy_static::lazy_static;
use log::debug;

use ucp_core::properties::{
    content_info_attribute, property_attribute, ContentInfo, Property, PropertyChangeEvent,
    PropertyError, PropertyRow, PropertyValue, PropertyValueType,
};

use crate::ftp::content::{ExecResult, FtpContent};
use crate::ftp::transport::Direntry;
use crate::ftp::types::{
    ArgumentKind, CommandInfoEntry, CMD_CREATE_NEW_CONTENT, CMD_DELETE, CMD_GET_COMMAND_INFO,
    CMD_GET_PROPERTY_SET_INFO, CMD_GET_PROPERTY_VALUES, CMD_INSERT, CMD_OPEN,
    CMD_SET_PROPERTY_VALUES, FTP_FILE, FTP_FOLDER,
};

// ─── Declared tables ─────────────────────────────────────────────────

lazy_static! {
    /// Properties this provider declares. Title is the only one
    /// accepted on the write path.
    pub static ref FTP_PROPERTIES: Vec<Property> = vec![
        Property::new(
            "Title",
            PropertyValueType::Text,
            property_attribute::BOUND | property_attribute::MAYBE_VOID,
        ),
        Property::new(
            "ContentType",
            PropertyValueType::Text,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "IsReadOnly",
            PropertyValueType::Bool,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "IsDocument",
            PropertyValueType::Bool,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "IsFolder",
            PropertyValueType::Bool,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "Size",
            PropertyValueType::Long,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "DateCreated",
            PropertyValueType::Timestamp,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
        Property::new(
            "CreatableContentsInfo",
            PropertyValueType::ContentsInfo,
            property_attribute::BOUND | property_attribute::READ_ONLY,
        ),
    ];
}

/// Descriptors of the content kinds this provider can create.
pub fn creatable_contents_info() -> Vec<ContentInfo> {
    let title = Property::new(
        "Title",
        PropertyValueType::Text,
        property_attribute::BOUND | property_attribute::MAYBE_VOID,
    );
    vec![
        ContentInfo::new(
            FTP_FILE,
            content_info_attribute::INSERT_WITH_INPUTSTREAM
                | content_info_attribute::KIND_DOCUMENT,
            vec![title.clone()],
        ),
        ContentInfo::new(FTP_FOLDER, content_info_attribute::KIND_FOLDER, vec![title]),
    ]
}

/// Static capability description for `getCommandInfo`.
pub fn command_info() -> Vec<CommandInfoEntry> {
    [
        (CMD_GET_COMMAND_INFO, ArgumentKind::None),
        (CMD_GET_PROPERTY_SET_INFO, ArgumentKind::None),
        (CMD_GET_PROPERTY_VALUES, ArgumentKind::Properties),
        (CMD_SET_PROPERTY_VALUES, ArgumentKind::PropertyValues),
        (CMD_INSERT, ArgumentKind::Insert),
        (CMD_DELETE, ArgumentKind::None),
        (CMD_OPEN, ArgumentKind::Open),
        (CMD_CREATE_NEW_CONTENT, ArgumentKind::ContentInfo),
    ]
    .into_iter()
    .map(|(name, argument_kind)| CommandInfoEntry {
        name: name.to_string(),
        argument_kind,
    })
    .collect()
}

fn is_declared(name: &str) -> bool {
    FTP_PROPERTIES.iter().any(|p| p.name == name)
}

// ─── Read path ───────────────────────────────────────────────────────

/// Resolve the requested descriptors against a metadata snapshot.
/// Always one slot per descriptor, in request order; unresolvable
/// names get a void slot instead of failing the call.
pub(crate) fn read_row(properties: &[Property], entry: &Direntry) -> PropertyRow {
    let mut row = PropertyRow::new();
    for prop in properties {
        match prop.name.as_str() {
            "Title" => row.append_text(prop, entry.name.clone()),
            "CreatableContentsInfo" => row.append_object(
                prop,
                PropertyValue::ContentsInfo(creatable_contents_info()),
            ),
            _ if entry.kind != crate::ftp::transport::DirentryKind::Unknown => {
                match prop.name.as_str() {
                    "ContentType" => row.append_text(
                        prop,
                        if entry.is_folder() { FTP_FOLDER } else { FTP_FILE },
                    ),
                    "IsReadOnly" => row.append_bool(prop, !entry.writable),
                    "IsDocument" => row.append_bool(prop, entry.is_document()),
                    "IsFolder" => row.append_bool(prop, entry.is_folder()),
                    "Size" => row.append_long(
                        prop,
                        i64::try_from(entry.size).unwrap_or(i64::MAX),
                    ),
                    "DateCreated" => match entry.created {
                        Some(ts) => row.append_timestamp(prop, ts),
                        None => row.append_void(prop),
                    },
                    _ => row.append_void(prop),
                }
            }
            _ => row.append_void(prop),
        }
    }
    row
}

impl FtpContent {
    pub(crate) fn get_property_values(&self, properties: &[Property]) -> ExecResult<PropertyRow> {
        let url = self.url_snapshot();
        let entry = self.provider().transport().direntry(&url)?;
        Ok(read_row(properties, &entry))
    }

    // ─── Write path ──────────────────────────────────────────────

    /// One slot per pair, in input order. Title is the only writable
    /// property; a successful rename queues a change event, and a
    /// single aggregated notification fires after the batch.
    pub(crate) fn set_property_values(
        &self,
        values: &[(String, PropertyValue)],
    ) -> Vec<Result<(), PropertyError>> {
        let mut results = Vec::with_capacity(values.len());
        let mut events: Vec<PropertyChangeEvent> = Vec::new();

        for (name, value) in values {
            if name == "Title" {
                results.push(self.set_title(value, &mut events));
            } else if is_declared(name) {
                results.push(Err(PropertyError::illegal_access(name)));
            } else {
                results.push(Err(PropertyError::unknown_property(name)));
            }
        }

        if !events.is_empty() {
            self.notify_properties_change(&events);
        }

        results
    }

    fn set_title(
        &self,
        value: &PropertyValue,
        events: &mut Vec<PropertyChangeEvent>,
    ) -> Result<(), PropertyError> {
        let title = match value {
            PropertyValue::Text(t) => t,
            _ => return Err(PropertyError::illegal_type("Title")),
        };
        if title.is_empty() {
            return Err(PropertyError::illegal_argument("Empty title"));
        }

        // Pending resources cache the title on the locator; committed
        // ones go through the transport rename.
        let url = {
            let state = self.lock_state();
            if state.pending {
                None
            } else {
                Some(state.url.clone())
            }
        };

        match url {
            None => {
                let mut state = self.lock_state();
                state.url = if state.title_set {
                    state.url.with_title(title)
                } else {
                    state.url.child(title)
                };
                state.title_set = true;
                debug!("pending content titled '{}'", title);
                Ok(())
            }
            Some(url) => match self.provider().transport().rename(&url, title) {
                Ok(old_title) => {
                    let mut state = self.lock_state();
                    state.url = url.with_title(title);
                    events.push(PropertyChangeEvent {
                        name: "Title".to_string(),
                        old_value: PropertyValue::Text(old_title),
                        new_value: PropertyValue::Text(title.clone()),
                    });
                    Ok(())
                }
                Err(e) => Err(PropertyError::access_denied(e.message)),
            },
        }
    }
}
