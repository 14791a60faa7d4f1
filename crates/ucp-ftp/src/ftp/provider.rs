//! Content factory — owns the transport, the process-wide credential
//! store and the retry configuration shared by all contents.

use std::sync::Arc;

use ucp_core::credentials::CredentialStore;

use crate::ftp::content::FtpContent;
use crate::ftp::error::{CommandError, CommandResult};
use crate::ftp::transport::Transport;
use crate::ftp::url::FtpUrl;

/// Provider-wide knobs.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Cap on authentication re-attempts per command execution. Guards
    /// against a handler that keeps answering "retry" with unchanged
    /// credentials.
    pub max_auth_attempts: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_auth_attempts: 8,
        }
    }
}

pub struct FtpContentProvider {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    config: ProviderConfig,
}

impl FtpContentProvider {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<CredentialStore>) -> Arc<Self> {
        Self::with_config(transport, credentials, ProviderConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        config: ProviderConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            transport,
            credentials,
            config,
        })
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve an identifier and hand out a content for it.
    pub fn query_content(self: &Arc<Self>, identifier: &str) -> CommandResult<FtpContent> {
        let url = FtpUrl::parse(identifier)
            .map_err(|e| CommandError::illegal_argument(e.to_string()))?;
        Ok(FtpContent::committed(self.clone(), url))
    }
}
