//! FTP content-provider internals.
//!
//! Architecture:
//! - `types` — command vocabulary, content descriptors, open modes, sinks
//! - `error` — transport-failure classification and terminal command errors
//! - `url` — identifier/URL resolver producing structured locators
//! - `transport` — blocking transport contract and directory entries
//! - `resultset` — enumerable listing rows for folder-mode `open`
//! - `properties` — property read/write paths and the declared tables
//! - `insert` — commit protocol with single-shot name-clash retry
//! - `content` — the command processor and its retry state machine
//! - `provider` — content factory owning transport and credential store

pub mod content;
pub mod error;
pub mod insert;
pub mod properties;
pub mod provider;
pub mod resultset;
pub mod transport;
pub mod types;
pub mod url;
