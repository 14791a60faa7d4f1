//! The FTP content — composes command-processor, property-accessor and
//! content-identity capabilities on one entity, and owns the retry
//! state machine around the transport.

use log::{debug, warn};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};

use ucp_core::credentials::{CredentialEntry, CredentialKey};
use ucp_core::interaction::{AuthenticationRequest, AuthenticationSelection, Environment};
use ucp_core::properties::{ContentInfo, PropertyChangeEvent, PropertiesChangeListener};

use crate::ftp::error::{classify, CommandError, CommandErrorKind, CommandResult, RetryAction};
use crate::ftp::properties::{command_info, FTP_PROPERTIES};
use crate::ftp::provider::FtpContentProvider;
use crate::ftp::resultset::ResultSet;
use crate::ftp::transport::TransportError;
use crate::ftp::types::*;
use crate::ftp::url::FtpUrl;

/// Chunk size for document-mode streaming.
pub const STREAM_CHUNK: usize = 4096;

// ─── Execution errors ────────────────────────────────────────────────

/// Failure raised while dispatching a command. Transport failures are
/// classified by the retry loop; command errors are terminal as-is.
#[derive(Debug)]
pub(crate) enum ExecError {
    Command(CommandError),
    Transport(TransportError),
}

pub(crate) type ExecResult<T> = Result<T, ExecError>;

impl From<CommandError> for ExecError {
    fn from(e: CommandError) -> Self {
        ExecError::Command(e)
    }
}

impl From<TransportError> for ExecError {
    fn from(e: TransportError) -> Self {
        ExecError::Transport(e)
    }
}

// ─── Content state ───────────────────────────────────────────────────

/// Mutable fields of a content, guarded by one exclusive lock. The
/// lock is held only across in-memory mutation, never across a
/// blocking transport call.
pub(crate) struct ContentState {
    pub url: FtpUrl,
    /// Descriptor supplied at creation time; present only while the
    /// resource is not yet committed.
    pub info: Option<ContentInfo>,
    /// Not-yet-committed resource.
    pub pending: bool,
    /// An explicit name has been assigned to the pending resource.
    pub title_set: bool,
    /// The remote object was removed through this content.
    pub deleted: bool,
}

pub struct FtpContent {
    provider: Arc<FtpContentProvider>,
    state: Mutex<ContentState>,
    listeners: Mutex<Vec<Arc<dyn PropertiesChangeListener>>>,
}

impl FtpContent {
    /// Content for an already-committed remote resource.
    pub(crate) fn committed(provider: Arc<FtpContentProvider>, url: FtpUrl) -> Self {
        Self {
            provider,
            state: Mutex::new(ContentState {
                url,
                info: None,
                pending: false,
                title_set: false,
                deleted: false,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Pending content scoped as a child of `parent_url`; committed by
    /// `insert` once a title has been assigned.
    pub(crate) fn pending(
        provider: Arc<FtpContentProvider>,
        parent_url: FtpUrl,
        info: ContentInfo,
    ) -> Self {
        Self {
            provider,
            state: Mutex::new(ContentState {
                url: parent_url,
                info: Some(info),
                pending: true,
                title_set: false,
                deleted: false,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    // ─── State access ────────────────────────────────────────────

    pub(crate) fn provider(&self) -> &Arc<FtpContentProvider> {
        &self.provider
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ContentState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Locator snapshot for a transport call, taken without holding
    /// the lock across the call itself.
    pub(crate) fn url_snapshot(&self) -> FtpUrl {
        self.lock_state().url.clone()
    }

    // ─── Content identity ────────────────────────────────────────

    /// Canonical identifier of the current locator.
    pub fn identifier(&self) -> String {
        self.lock_state().url.ident()
    }

    pub fn content_type(&self) -> &'static str {
        FTP_CONTENT_TYPE
    }

    pub fn is_pending(&self) -> bool {
        self.lock_state().pending
    }

    pub fn parent_identifier(&self) -> String {
        self.lock_state().url.parent().ident()
    }

    /// Content for the parent resource.
    pub fn parent(&self) -> FtpContent {
        let parent_url = self.lock_state().url.parent();
        FtpContent::committed(self.provider.clone(), parent_url)
    }

    /// Re-parenting is not part of this provider's contract.
    pub fn set_parent(&self, _parent: &FtpContent) -> CommandResult<()> {
        Err(CommandError::new(
            CommandErrorKind::UnsupportedCommand,
            "Re-parenting an FTP content is not supported",
        ))
    }

    /// Mid-flight cancellation of a blocking transport call is not
    /// supported; present for interface completeness.
    pub fn abort(&self, _command_id: i32) {}

    // ─── Change listeners ────────────────────────────────────────

    pub fn add_properties_change_listener(&self, listener: Arc<dyn PropertiesChangeListener>) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }

    pub fn remove_properties_change_listener(&self, listener: &Arc<dyn PropertiesChangeListener>) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|l| !Arc::ptr_eq(l, listener));
        }
    }

    pub(crate) fn notify_properties_change(&self, events: &[PropertyChangeEvent]) {
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for listener in listeners {
            listener.properties_changed(events);
        }
    }

    // ─── Command execution ───────────────────────────────────────

    /// Execute one command. Transport failures are classified into a
    /// `RetryAction`; authentication failure is the only class that
    /// re-attempts the dispatch, bounded by the provider's retry cap.
    pub fn execute(&self, mut command: Command, env: &Environment) -> CommandResult<CommandOutcome> {
        if self.lock_state().deleted {
            return Err(CommandError::new(
                CommandErrorKind::NotFound,
                "Content has been deleted",
            )
            .with_url(self.identifier()));
        }

        let max_attempts = self.provider.config().max_auth_attempts;
        let mut action = RetryAction::None;
        let mut auth_attempts: u32 = 0;

        loop {
            if action == RetryAction::RetryWithAuth {
                auth_attempts += 1;
                if auth_attempts > max_attempts {
                    warn!(
                        "'{}' on {}: authentication retry cap ({}) exhausted",
                        command.name,
                        self.identifier(),
                        max_attempts
                    );
                    return Err(CommandError::retry_limit_reached(max_attempts));
                }
                // May only reset the action; terminal outcomes
                // (cancelled, unresolvable) surface directly.
                self.authenticate(env)?;
                action = RetryAction::None;
            }

            match self.dispatch(&mut command, env) {
                Ok(outcome) => return Ok(outcome),
                Err(ExecError::Command(e)) => return Err(e),
                Err(ExecError::Transport(cause)) => {
                    let url = self.url_snapshot();
                    let next = classify(cause.kind);
                    debug!(
                        "'{}' on {} failed: {} -> {:?}",
                        command.name,
                        url.ident(),
                        cause,
                        next
                    );
                    if next == RetryAction::RetryWithAuth {
                        action = next;
                    } else {
                        return Err(CommandError::from_action(next, &url, &cause));
                    }
                }
            }
        }
    }

    /// Credential-coordinator step for `RetryWithAuth`: consult the
    /// store, drive the interaction handler, update the store. `Ok`
    /// means "re-attempt the dispatch".
    fn authenticate(&self, env: &Environment) -> CommandResult<()> {
        let url = self.url_snapshot();
        let key = CredentialKey::new(url.host(), url.port(), url.username());
        let cached = self.provider.credentials().lookup(&key);

        let handler = match env.handler() {
            Some(handler) => handler,
            // Never hang on a missing handler.
            None => return Err(CommandError::interactively_unresolvable(url.host())),
        };

        let request = AuthenticationRequest {
            url: url.ident(),
            server_name: url.host().to_string(),
            username: url.username().to_string(),
            // FTP has no protection spaces.
            realm: None,
            previous_password: cached.as_ref().map(|entry| entry.password.clone()),
        };

        match handler.handle_authentication(&request) {
            AuthenticationSelection::Retry => {
                debug!("auth retry with unchanged credentials for {}", url.host());
                Ok(())
            }
            AuthenticationSelection::Supply { password, account } => {
                self.provider.credentials().store(
                    key,
                    CredentialEntry {
                        password,
                        account: account.or(cached.and_then(|entry| entry.account)),
                    },
                );
                Ok(())
            }
            AuthenticationSelection::Abort => {
                Err(CommandError::authentication_cancelled(url.host()))
            }
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────

    fn dispatch(&self, command: &mut Command, env: &Environment) -> ExecResult<CommandOutcome> {
        match (command.name.as_str(), &mut command.argument) {
            (CMD_GET_PROPERTY_VALUES, CommandArgument::Properties(props)) => {
                Ok(CommandOutcome::Row(self.get_property_values(props)?))
            }
            (CMD_SET_PROPERTY_VALUES, CommandArgument::PropertyValues(values)) => {
                Ok(CommandOutcome::SetResults(self.set_property_values(values)))
            }
            (CMD_GET_COMMAND_INFO, CommandArgument::None) => {
                Ok(CommandOutcome::CommandInfo(command_info()))
            }
            (CMD_GET_PROPERTY_SET_INFO, CommandArgument::None) => {
                Ok(CommandOutcome::PropertySetInfo(FTP_PROPERTIES.clone()))
            }
            (CMD_INSERT, CommandArgument::Insert(argument)) => {
                self.insert(argument, env)?;
                Ok(CommandOutcome::None)
            }
            (CMD_DELETE, CommandArgument::None) => {
                self.require_titled()?;
                let url = self.url_snapshot();
                self.provider.transport().del(&url)?;
                self.lock_state().deleted = true;
                Ok(CommandOutcome::None)
            }
            (CMD_OPEN, CommandArgument::Open(argument)) => {
                self.require_titled()?;
                self.open(argument)
            }
            (CMD_CREATE_NEW_CONTENT, CommandArgument::ContentInfo(info)) => {
                Ok(CommandOutcome::Created(self.create_new_content(info)))
            }
            (
                CMD_GET_PROPERTY_VALUES | CMD_SET_PROPERTY_VALUES | CMD_GET_COMMAND_INFO
                | CMD_GET_PROPERTY_SET_INFO | CMD_INSERT | CMD_DELETE | CMD_OPEN
                | CMD_CREATE_NEW_CONTENT,
                _,
            ) => Err(CommandError::illegal_argument("Wrong argument type!").into()),
            (name, _) => Err(CommandError::unsupported_command(name).into()),
        }
    }

    /// Until a title is assigned, a pending content's locator still
    /// names the parent; delete/open must not act on it.
    fn require_titled(&self) -> ExecResult<()> {
        let state = self.lock_state();
        if state.pending && !state.title_set {
            return Err(CommandError::missing_properties(&["Title"]).into());
        }
        Ok(())
    }

    // ─── open ────────────────────────────────────────────────────

    fn open(&self, argument: &mut OpenArgument) -> ExecResult<CommandOutcome> {
        match argument.mode {
            OpenMode::Document => {
                let url = self.url_snapshot();
                match &mut argument.sink {
                    OpenSink::DataSink(sink) => {
                        let stream = self.provider.transport().open(&url)?;
                        sink.set_input_stream(stream);
                        Ok(CommandOutcome::None)
                    }
                    OpenSink::OutputStream(sink) => {
                        let mut stream = self.provider.transport().open(&url)?;
                        let mut buf = [0u8; STREAM_CHUNK];
                        loop {
                            let n = stream.read(&mut buf).map_err(TransportError::from)?;
                            if n == 0 {
                                break;
                            }
                            // Best-effort drain: a failed sink write
                            // must not leave the transport side with a
                            // half-consumed stream.
                            if let Err(e) = sink.write_bytes(&buf[..n]) {
                                debug!("sink write failed ({:?}), draining stream", e);
                            }
                        }
                        Ok(CommandOutcome::None)
                    }
                    OpenSink::None => Err(CommandError::unsupported_data_sink().into()),
                }
            }
            OpenMode::All | OpenMode::Documents | OpenMode::Folders => {
                let url = self.url_snapshot();
                let entries = self.provider.transport().list(&url)?;
                Ok(CommandOutcome::ResultSet(ResultSet::new(
                    argument.mode,
                    &argument.properties,
                    entries,
                )))
            }
            OpenMode::DocumentShareDenyNone | OpenMode::DocumentShareDenyWrite => {
                Err(CommandError::unsupported_open_mode(&argument.mode.to_string()).into())
            }
        }
    }

    // ─── createNewContent ────────────────────────────────────────

    /// New, not-yet-inserted content scoped as a child; `None` when
    /// the requested type is not one this provider can create.
    pub fn create_new_content(&self, info: &ContentInfo) -> Option<FtpContent> {
        if info.content_type == FTP_FILE || info.content_type == FTP_FOLDER {
            let url = self.url_snapshot();
            Some(FtpContent::pending(self.provider.clone(), url, info.clone()))
        } else {
            warn!("cannot create content of type '{}'", info.content_type);
            None
        }
    }
}
