//! Interaction-handler contracts — the injected capability that puts
//! authentication and name-clash decisions in front of a human or an
//! automation layer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Authentication ──────────────────────────────────────────────────

/// Request presented when the remote server rejected the credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRequest {
    /// Identifier of the resource being accessed (no credentials).
    pub url: String,
    pub server_name: String,
    pub username: String,
    /// Protection space, for protocols that have one.
    pub realm: Option<String>,
    /// Password currently cached for this (host, port, user), if any.
    pub previous_password: Option<String>,
}

/// Outcome of an authentication interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticationSelection {
    /// Re-attempt with unchanged credentials.
    Retry,
    /// New credentials supplied; persist and re-attempt.
    Supply {
        password: String,
        account: Option<String>,
    },
    /// No selection / declined — give up.
    Abort,
}

// ─── Name clash ──────────────────────────────────────────────────────

/// Request presented when a create/insert targets an existing object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameClashRequest {
    pub url: String,
    pub clashing_name: String,
}

/// Outcome of a name-clash interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NameClashSelection {
    /// Overwrite the existing object.
    Replace,
    /// Keep the existing object and fail the insert.
    Abort,
}

// ─── Handler / environment ──────────────────────────────────────────

/// Injected decision-maker. Implementations must not block forever.
pub trait InteractionHandler: Send + Sync {
    fn handle_authentication(&self, request: &AuthenticationRequest) -> AuthenticationSelection;

    fn handle_name_clash(&self, request: &NameClashRequest) -> NameClashSelection;
}

/// Per-invocation execution environment. A missing handler means
/// interactive conditions fail immediately instead of hanging.
#[derive(Clone, Default)]
pub struct Environment {
    pub interaction_handler: Option<Arc<dyn InteractionHandler>>,
}

impl Environment {
    pub fn new(handler: Arc<dyn InteractionHandler>) -> Self {
        Self {
            interaction_handler: Some(handler),
        }
    }

    /// Environment with no interaction capability.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Option<&Arc<dyn InteractionHandler>> {
        self.interaction_handler.as_ref()
    }
}
