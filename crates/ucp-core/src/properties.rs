//! Generic property descriptors, values and the ordered row builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Attributes ──────────────────────────────────────────────────────

/// Property attribute bit flags.
pub mod property_attribute {
    pub const BOUND: u32 = 1 << 0;
    pub const READ_ONLY: u32 = 1 << 1;
    pub const MAYBE_VOID: u32 = 1 << 2;
}

/// Declared type of a property's value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValueType {
    Text,
    Long,
    Bool,
    Timestamp,
    ContentsInfo,
}

/// A property descriptor — name, declared type and attribute flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub value_type: PropertyValueType,
    pub attributes: u32,
}

impl Property {
    pub fn new(name: impl Into<String>, value_type: PropertyValueType, attributes: u32) -> Self {
        Self {
            name: name.into(),
            value_type,
            attributes,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes & property_attribute::READ_ONLY != 0
    }
}

// ─── Values ──────────────────────────────────────────────────────────

/// Content-creation descriptor: resource type identifier, creation
/// attribute flags and the property list supported at creation time.
/// Carried by the `CreatableContentsInfo` meta property and supplied
/// to `createNewContent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub content_type: String,
    pub attributes: u32,
    pub properties: Vec<Property>,
}

impl ContentInfo {
    pub fn new(content_type: impl Into<String>, attributes: u32, properties: Vec<Property>) -> Self {
        Self {
            content_type: content_type.into(),
            attributes,
            properties,
        }
    }
}

/// Content-info attribute bit flags.
pub mod content_info_attribute {
    pub const NONE: u32 = 0;
    pub const INSERT_WITH_INPUTSTREAM: u32 = 1 << 0;
    pub const KIND_DOCUMENT: u32 = 1 << 1;
    pub const KIND_FOLDER: u32 = 1 << 2;
    pub const KIND_LINK: u32 = 1 << 3;
}

/// A resolved property value; `Void` marks an unresolvable slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    Text(String),
    Long(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    ContentsInfo(Vec<ContentInfo>),
    Void,
}

impl PropertyValue {
    pub fn is_void(&self) -> bool {
        matches!(self, PropertyValue::Void)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// ─── Row builder ─────────────────────────────────────────────────────

/// An ordered set of resolved property values — exactly one slot per
/// requested descriptor, in request order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRow {
    slots: Vec<(Property, PropertyValue)>,
}

impl PropertyRow {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn append_text(&mut self, prop: &Property, value: impl Into<String>) {
        self.slots
            .push((prop.clone(), PropertyValue::Text(value.into())));
    }

    pub fn append_long(&mut self, prop: &Property, value: i64) {
        self.slots.push((prop.clone(), PropertyValue::Long(value)));
    }

    pub fn append_bool(&mut self, prop: &Property, value: bool) {
        self.slots.push((prop.clone(), PropertyValue::Bool(value)));
    }

    pub fn append_timestamp(&mut self, prop: &Property, value: DateTime<Utc>) {
        self.slots
            .push((prop.clone(), PropertyValue::Timestamp(value)));
    }

    pub fn append_object(&mut self, prop: &Property, value: PropertyValue) {
        self.slots.push((prop.clone(), value));
    }

    pub fn append_void(&mut self, prop: &Property) {
        self.slots.push((prop.clone(), PropertyValue::Void));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Value at slot index (request order).
    pub fn value_at(&self, index: usize) -> Option<&PropertyValue> {
        self.slots.get(index).map(|(_, v)| v)
    }

    /// First value resolved for the given property name.
    pub fn value_of(&self, name: &str) -> Option<&PropertyValue> {
        self.slots
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Property, PropertyValue)> {
        self.slots.iter()
    }
}

// ─── Per-slot write errors ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PropertyErrorKind {
    /// The property is not part of the declared set.
    UnknownProperty,
    /// The property is declared but read-only.
    IllegalAccess,
    /// The supplied value has the wrong type.
    IllegalType,
    /// The supplied value is invalid (e.g. empty title).
    IllegalArgument,
    /// The remote server refused the change.
    AccessDenied,
}

/// Per-slot error on the property write path. Returned inline in the
/// result batch, never raised as a whole-call failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyError {
    pub kind: PropertyErrorKind,
    pub message: String,
}

impl PropertyError {
    pub fn new(kind: PropertyErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn unknown_property(name: &str) -> Self {
        Self::new(
            PropertyErrorKind::UnknownProperty,
            format!("Unknown property '{}'", name),
        )
    }

    pub fn illegal_access(name: &str) -> Self {
        Self::new(
            PropertyErrorKind::IllegalAccess,
            format!("Property '{}' is read-only", name),
        )
    }

    pub fn illegal_type(name: &str) -> Self {
        Self::new(
            PropertyErrorKind::IllegalType,
            format!("Wrong value type for property '{}'", name),
        )
    }

    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        Self::new(PropertyErrorKind::IllegalArgument, msg)
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::new(PropertyErrorKind::AccessDenied, msg)
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for PropertyError {}

// ─── Change notification ─────────────────────────────────────────────

/// A single property change, aggregated and delivered once per batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChangeEvent {
    pub name: String,
    pub old_value: PropertyValue,
    pub new_value: PropertyValue,
}

/// Listener for aggregated property-change batches.
pub trait PropertiesChangeListener: Send + Sync {
    fn properties_changed(&self, events: &[PropertyChangeEvent]);
}
