//! Auth session holder.
//!
//! Process-wide session state lives in one observable container, injected
//! into the synchronizer and any UI layer rather than reached through a
//! global. Holders read the current value with [`SessionHolder::current`] and
//! subscribe to transitions with [`SessionHolder::subscribe`].
//!
//! The bearer token is durable: it is written to a file under the client data
//! dir on login and read back at construction, so a restarted client resumes
//! its session once the token has been revalidated (see
//! `Storefront::restore_session`).

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::types::UserProfile;

/// File under the data dir holding the persisted bearer token.
const TOKEN_FILE: &str = "session_token";

/// A point-in-time view of the session.
///
/// `Debug` never prints the token.
#[derive(Clone, Default)]
pub struct SessionState {
    token: Option<SecretString>,
    profile: Option<UserProfile>,
}

impl SessionState {
    /// Whether the session has an authenticated identity.
    ///
    /// A stored token alone is not enough: the backend must have confirmed it
    /// by serving the profile. Until then the session behaves as a guest.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    /// The authenticated profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// The bearer token attached to outgoing requests, if any.
    pub(crate) const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("profile", &self.profile)
            .finish()
    }
}

/// Shared, observable session container.
///
/// Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct SessionHolder {
    inner: std::sync::Arc<SessionInner>,
}

struct SessionInner {
    state: watch::Sender<SessionState>,
    token_path: PathBuf,
}

impl SessionHolder {
    /// Create a holder rooted at the client data dir.
    ///
    /// A token persisted by an earlier run is loaded immediately, but the
    /// session stays unauthenticated until the token is revalidated against
    /// the backend.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        let token_path = data_dir.join(TOKEN_FILE);
        let token = read_token(&token_path);

        let (state, _) = watch::channel(SessionState {
            token,
            profile: None,
        });

        Self {
            inner: std::sync::Arc::new(SessionInner { state, token_path }),
        }
    }

    /// Subscribe to session transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The current session state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Whether the session currently has an authenticated identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// The bearer token to attach to outgoing requests, if any.
    pub(crate) fn access_token(&self) -> Option<SecretString> {
        self.inner.state.borrow().token().cloned()
    }

    /// Whether a token survives from an earlier run, pending revalidation.
    #[must_use]
    pub fn has_stored_token(&self) -> bool {
        self.inner.state.borrow().token.is_some()
    }

    /// Install a fresh credential and profile (login or registration).
    ///
    /// The token is persisted so the session survives a restart. A failed
    /// write downgrades durability, not the live session, so it is logged
    /// rather than surfaced.
    pub fn set_session(&self, access: SecretString, profile: UserProfile) {
        if let Err(e) = write_token(&self.inner.token_path, &access) {
            tracing::warn!("failed to persist session token: {e}");
        }
        self.inner.state.send_modify(|s| {
            s.token = Some(access);
            s.profile = Some(profile);
        });
    }

    /// Attach a profile to an already-held token (session restore).
    pub fn set_profile(&self, profile: UserProfile) {
        self.inner.state.send_modify(|s| s.profile = Some(profile));
    }

    /// Drop the credential and profile, and erase the persisted token.
    pub fn clear(&self) {
        if let Err(e) = remove_token(&self.inner.token_path) {
            tracing::warn!("failed to erase session token: {e}");
        }
        self.inner.state.send_modify(|s| {
            s.token = None;
            s.profile = None;
        });
    }
}

fn read_token(path: &Path) -> Option<SecretString> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(SecretString::from(trimmed.to_owned()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("failed to read session token: {e}");
            None
        }
    }
}

fn write_token(path: &Path, token: &SecretString) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token.expose_secret())
}

fn remove_token(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
