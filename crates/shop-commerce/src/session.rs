//! Auth session state and the session event bus.
//!
//! The bearer token, the logged-in flag and the cached profile live under
//! separate storage keys. Login and logout are announced on [`SessionEvents`]
//! so other parts of the process can re-read auth state; the cart is never
//! part of these events.

use serde::{Deserialize, Serialize};
use shop_cache::{cache_key, Cache, KvStore};
use tokio::sync::broadcast;

use crate::api::AuthGrant;
use crate::error::CommerceError;
use crate::ids::UserId;

/// Storage key suffix for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key suffix for the logged-in flag.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";
/// Storage key suffix for the cached profile.
pub const USER_KEY: &str = "user";

const EVENT_BUFFER: usize = 16;

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    /// A profile is complete once it has a name and an email.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.name) && filled(&self.email)
    }
}

/// Something changed about who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: UserId },
    LoggedOut,
}

/// Broadcast bus for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Emits one event to current subscribers.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

/// Persisted auth state.
#[derive(Debug)]
pub struct AuthSession<S> {
    cache: Cache<S>,
    namespace: String,
    events: SessionEvents,
}

impl<S: KvStore> AuthSession<S> {
    pub fn new(store: S, namespace: impl Into<String>, events: SessionEvents) -> Self {
        Self {
            cache: Cache::new(store),
            namespace: namespace.into(),
            events,
        }
    }

    /// The bus this session publishes on.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Store the grant and announce the login.
    pub fn login(&self, grant: &AuthGrant) -> Result<(), CommerceError> {
        self.cache.set(&self.key(TOKEN_KEY), &grant.token)?;
        self.cache.set(&self.key(LOGGED_IN_KEY), &true)?;
        self.cache.set(&self.key(USER_KEY), &grant.user)?;

        tracing::info!(user_id = %grant.user.id, "signed in");
        self.events.publish(SessionEvent::LoggedIn {
            user_id: grant.user.id.clone(),
        });
        Ok(())
    }

    /// Forget the token and profile and announce the logout.
    pub fn logout(&self) -> Result<(), CommerceError> {
        for key in [TOKEN_KEY, LOGGED_IN_KEY, USER_KEY] {
            self.cache.delete(&self.key(key))?;
        }

        tracing::info!("signed out");
        self.events.publish(SessionEvent::LoggedOut);
        Ok(())
    }

    /// The stored bearer token.
    pub fn token(&self) -> Result<Option<String>, CommerceError> {
        Ok(self.cache.get(&self.key(TOKEN_KEY))?)
    }

    /// Signed in: the flag is set and a token is stored.
    pub fn is_authenticated(&self) -> Result<bool, CommerceError> {
        let flag: Option<bool> = self.cache.get(&self.key(LOGGED_IN_KEY))?;
        Ok(flag.unwrap_or(false) && self.token()?.is_some())
    }

    /// The cached profile. An unreadable entry counts as absent.
    pub fn profile(&self) -> Option<UserProfile> {
        match self.cache.get(&self.key(USER_KEY)) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cached profile");
                None
            }
        }
    }

    /// Replace the cached profile after a profile update.
    pub fn store_profile(&self, profile: &UserProfile) -> Result<(), CommerceError> {
        self.cache.set(&self.key(USER_KEY), profile)?;
        Ok(())
    }

    /// Whether the cached profile is complete. False when signed out.
    pub fn is_profile_complete(&self) -> bool {
        self.profile().is_some_and(|p| p.is_complete())
    }

    fn key(&self, suffix: &str) -> String {
        cache_key!(self.namespace.as_str(), suffix)
    }
}
