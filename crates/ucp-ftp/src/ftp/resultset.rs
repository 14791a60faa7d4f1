//! Enumerable result set for `open` in a listing mode — one property
//! row per surviving directory entry.

use ucp_core::properties::{Property, PropertyRow};

use crate::ftp::properties::read_row;
use crate::ftp::transport::Direntry;
use crate::ftp::types::OpenMode;

/// Listing snapshot filtered by open mode, with each entry resolved
/// against the requested properties.
#[derive(Debug, Clone)]
pub struct ResultSet {
    rows: Vec<PropertyRow>,
}

impl ResultSet {
    pub fn new(mode: OpenMode, properties: &[Property], entries: Vec<Direntry>) -> Self {
        let rows = entries
            .iter()
            .filter(|entry| match mode {
                OpenMode::Documents => entry.is_document(),
                OpenMode::Folders => entry.is_folder(),
                _ => true,
            })
            .map(|entry| read_row(properties, entry))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&PropertyRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyRow> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = PropertyRow;
    type IntoIter = std::vec::IntoIter<PropertyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
