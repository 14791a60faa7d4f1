//! Identifier/URL resolver — turns `ftp://` identifier strings into
//! structured remote-resource locators.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_USERNAME: &str = "anonymous";

/// Raised when an identifier cannot be resolved into a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedUrlError {
    pub message: String,
}

impl MalformedUrlError {
    fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl fmt::Display for MalformedUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed ftp url: {}", self.message)
    }
}

impl std::error::Error for MalformedUrlError {}

/// Structured remote-resource locator. Immutable; `parent` and `child`
/// yield new locators, and a content replaces its locator wholesale on
/// rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FtpUrl {
    host: String,
    port: u16,
    username: String,
    path: Vec<String>,
}

impl FtpUrl {
    /// Resolve an `ftp://[user@]host[:port]/path` identifier.
    pub fn parse(identifier: &str) -> Result<FtpUrl, MalformedUrlError> {
        let parsed =
            Url::parse(identifier).map_err(|e| MalformedUrlError::new(e.to_string()))?;

        if parsed.scheme() != "ftp" {
            return Err(MalformedUrlError::new(format!(
                "unexpected scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| MalformedUrlError::new("missing host"))?
            .to_string();

        let username = if parsed.username().is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            parsed.username().to_string()
        };

        let path = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(FtpUrl {
            host,
            port: parsed.port().unwrap_or(DEFAULT_PORT),
            username,
            path,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Leaf segment name; empty for the server root.
    pub fn title(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// Locator of the parent resource. The root is its own parent.
    pub fn parent(&self) -> FtpUrl {
        let mut parent = self.clone();
        parent.path.pop();
        parent
    }

    /// Locator of a named child resource.
    pub fn child(&self, title: &str) -> FtpUrl {
        let mut child = self.clone();
        child.path.push(title.to_string());
        child
    }

    /// Locator with the leaf segment replaced (rename target).
    pub fn with_title(&self, title: &str) -> FtpUrl {
        let mut renamed = self.clone();
        renamed.path.pop();
        renamed.path.push(title.to_string());
        renamed
    }

    /// Canonical identifier without credentials.
    pub fn ident(&self) -> String {
        format!("ftp://{}{}{}", self.host, self.port_suffix(), self.path_suffix())
    }

    /// Identifier carrying the username.
    pub fn ident_with_user(&self) -> String {
        format!(
            "ftp://{}@{}{}{}",
            self.username,
            self.host,
            self.port_suffix(),
            self.path_suffix()
        )
    }

    fn port_suffix(&self) -> String {
        if self.port == DEFAULT_PORT {
            String::new()
        } else {
            format!(":{}", self.port)
        }
    }

    fn path_suffix(&self) -> String {
        if self.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.path.join("/"))
        }
    }
}

impl fmt::Display for FtpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ident())
    }
}
