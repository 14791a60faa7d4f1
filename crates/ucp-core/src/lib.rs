//! # ucp-core — provider-agnostic content plumbing
//!
//! Shared building blocks for content providers:
//! - `properties` — generic property descriptors, values, row builder,
//!   per-slot write errors, change events
//! - `interaction` — injected interaction-handler contracts
//!   (authentication, name clash) and the per-call environment
//! - `credentials` — process-wide credential store keyed by
//!   (host, port, user)

pub mod credentials;
pub mod interaction;
pub mod properties;

pub use credentials::{CredentialEntry, CredentialKey, CredentialStore};
pub use interaction::{
    AuthenticationRequest, AuthenticationSelection, Environment, InteractionHandler,
    NameClashRequest, NameClashSelection,
};
pub use properties::{
    ContentInfo, Property, PropertyChangeEvent, PropertyError, PropertyErrorKind, PropertyRow,
    PropertyValue, PropertyValueType, PropertiesChangeListener,
};
