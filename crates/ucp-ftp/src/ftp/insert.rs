//! Commit protocol for pending resources — a bounded two-iteration
//! attempt with a single interactive name-clash gate, separate from
//! the unbounded authentication retry in the command processor.

use log::{debug, info};

use ucp_core::interaction::{Environment, NameClashRequest, NameClashSelection};

use crate::ftp::content::{ExecError, ExecResult, FtpContent};
use crate::ftp::error::CommandError;
use crate::ftp::transport::TransportErrorKind;
use crate::ftp::types::{InsertArgument, FTP_FOLDER};
use crate::ftp::url::FtpUrl;

impl FtpContent {
    /// Commit the resource to the transport. Preconditions are checked
    /// before any transport call; a name clash asks the handler at
    /// most once and retries at most once with replace set. Any other
    /// transport failure propagates to the outer retry loop.
    pub(crate) fn insert(
        &self,
        argument: &mut InsertArgument,
        env: &Environment,
    ) -> ExecResult<()> {
        let (url, folder, pending) = {
            let state = self.lock_state();
            if state.pending && !state.title_set {
                return Err(CommandError::missing_properties(&["Title"]).into());
            }
            let folder = state
                .info
                .as_ref()
                .map(|info| info.content_type == FTP_FOLDER)
                .unwrap_or(false);
            if !folder && argument.data.is_none() {
                return Err(CommandError::missing_input_stream().into());
            }
            (state.url.clone(), folder, state.pending)
        };

        let mut replace = argument.replace_existing;
        let mut asked = false;

        loop {
            let attempt = if folder {
                self.provider().transport().mkdir(&url, replace)
            } else {
                match argument.data.as_mut() {
                    Some(data) => self.provider().transport().store(&url, replace, &mut **data),
                    None => return Err(CommandError::missing_input_stream().into()),
                }
            };

            match attempt {
                Ok(()) => break,
                Err(e) if e.kind == TransportErrorKind::AlreadyExists && !asked => {
                    debug!("insert clash at {}", url.ident());
                    asked = true;
                    if self.ask_replace(&url, env)? {
                        replace = true;
                    } else {
                        return Err(CommandError::name_clash(&url).into());
                    }
                }
                Err(e) if e.kind == TransportErrorKind::AlreadyExists => {
                    return Err(CommandError::name_clash(&url).into());
                }
                Err(e) => return Err(ExecError::Transport(e)),
            }
        }

        if pending {
            let mut state = self.lock_state();
            state.pending = false;
            state.title_set = false;
        }
        info!("inserted {}", url.ident());
        Ok(())
    }

    /// Single-shot name-clash interaction. With no handler attached
    /// the clash is unresolvable and fails immediately.
    fn ask_replace(&self, url: &FtpUrl, env: &Environment) -> ExecResult<bool> {
        let handler = match env.handler() {
            Some(handler) => handler,
            None => return Err(CommandError::name_clash(url).into()),
        };
        let request = NameClashRequest {
            url: url.ident(),
            clashing_name: url.title().to_string(),
        };
        Ok(handler.handle_name_clash(&request) == NameClashSelection::Replace)
    }
}
