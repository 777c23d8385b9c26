//! Session state: the auth token and everything derived from it.
//!
//! `SessionStore` is the single source of truth for "who is logged in".
//! It is a cloneable handle over shared state, constructed explicitly and
//! passed to every consumer; there is no ambient global session.
//!
//! Token mutations trigger the dependent profile fetch directly: both
//! `initialize` and `save_token` end in a `refresh_profile` call, so the
//! profile can only ever originate from a token-authenticated fetch.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, warn};

use crate::api::{ApiError, TbookeApi};

use super::profile::Profile;
use super::tokens::TokenStore;

/// Error string stored when a profile fetch fails
const PROFILE_FETCH_ERROR: &str = "Failed to fetch profile data";

/// Read-only snapshot of the session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current bearer token; presence is the authentication signal
    pub token: Option<String>,

    /// Last successfully fetched profile
    pub profile: Option<Profile>,

    /// A profile fetch is in flight
    pub loading: bool,

    /// Last fetch/persistence failure, user-readable
    pub error: Option<String>,

    /// Unread notification count (derived, optimistically updatable)
    pub notification_count: u32,

    /// Account is an institution (derived from the profile)
    pub is_institution: bool,

    /// Account holds an active subscription (derived from the profile)
    pub is_subscribed: bool,
}

impl Session {
    /// Token presence is the sole authentication signal
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Owner of the auth token and the fetched profile
pub struct SessionStore {
    api: Arc<dyn TbookeApi>,
    tokens: Arc<TokenStore>,
    state: Arc<Mutex<Session>>,
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            tokens: Arc::clone(&self.tokens),
            state: Arc::clone(&self.state),
        }
    }
}

impl SessionStore {
    /// Create a session store with no current session
    pub fn new(api: Arc<dyn TbookeApi>, tokens: TokenStore) -> Self {
        Self {
            api,
            tokens: Arc::new(tokens),
            state: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Lock the shared state, recovering from poisoning
    fn state(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Restore a persisted session at startup.
    ///
    /// Reads the durable token entry; if one is present it becomes the
    /// current token and the profile is fetched. Call once per process.
    pub async fn initialize(&self) {
        let token = match self.tokens.load().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted token: {:#}", e);
                None
            }
        };

        if let Some(token) = token {
            self.state().token = Some(token);
            self.refresh_profile().await;
        }
    }

    /// Persist a token, make it current, and fetch the profile.
    ///
    /// Persistence and fetch failures are logged and recorded in `error`
    /// rather than returned; the token stays current in memory. The one
    /// exception: a fetch rejected with 401 forces `logout`, so an
    /// immediately-rejected token never remains current.
    pub async fn save_token(&self, token: &str) {
        if let Err(e) = self.tokens.save(token).await {
            error!("Failed to save token: {:#}", e);
            self.state().error = Some("Failed to save token".to_string());
        }

        self.state().token = Some(token.to_string());
        self.refresh_profile().await;
    }

    /// Fetch the profile for the current token and update derived state.
    ///
    /// No-op without a token. `loading` is cleared on every completion
    /// path. A completion whose originating token no longer matches the
    /// current one is discarded; a competing `logout` wins over any
    /// in-flight fetch.
    pub async fn refresh_profile(&self) {
        let token = {
            let mut state = self.state();
            let Some(token) = state.token.clone() else {
                return;
            };
            state.loading = true;
            token
        };

        let result = self.api.fetch_profile(&token).await;

        let forced_logout = {
            let mut state = self.state();

            if state.token.as_deref() != Some(token.as_str()) {
                debug!("Discarding stale profile fetch result");
                state.loading = false;
                return;
            }

            match result {
                Ok(profile) => {
                    state.is_institution = profile.is_institution();
                    state.is_subscribed = profile.is_subscribed();
                    state.notification_count = profile.notification_count;
                    state.profile = Some(profile);
                    state.error = None;
                    state.loading = false;
                    false
                }
                Err(e) => {
                    error!("Failed to fetch profile data: {}", e);
                    state.error = Some(PROFILE_FETCH_ERROR.to_string());
                    state.loading = false;
                    matches!(e, ApiError::Unauthorized)
                }
            }
        };

        if forced_logout {
            self.logout().await;
        }
    }

    /// End the session: clear the persisted entry, the token, the profile,
    /// and every derived flag. Never fails.
    pub async fn logout(&self) {
        if let Err(e) = self.tokens.clear().await {
            warn!("Failed to clear persisted token: {:#}", e);
        }

        let mut state = self.state();
        state.token = None;
        state.profile = None;
        state.notification_count = 0;
        state.is_institution = false;
        state.is_subscribed = false;
    }

    /// Optimistically update the cached notification count
    pub fn update_notification_count(&self, count: u32) {
        self.state().notification_count = count;
    }

    /// Optimistically update the cached subscription flag, keeping the
    /// cached profile consistent with it
    pub fn update_subscription_status(&self, subscribed: bool) {
        let mut state = self.state();
        state.is_subscribed = subscribed;
        if let Some(profile) = state.profile.as_mut() {
            profile.user.is_subscribed = Some(subscribed);
        }
    }

    // ------------------------------------------------------------------
    // Read state
    // ------------------------------------------------------------------

    /// Clone the full session state
    pub fn snapshot(&self) -> Session {
        self.state().clone()
    }

    /// Current bearer token
    pub fn auth_token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Last fetched profile
    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    pub fn is_institution(&self) -> bool {
        self.state().is_institution
    }

    pub fn is_subscribed(&self) -> bool {
        self.state().is_subscribed
    }

    pub fn notification_count(&self) -> u32 {
        self.state().notification_count
    }

    pub fn loading(&self) -> bool {
        self.state().loading
    }

    /// Last recorded failure, if any
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }
}
