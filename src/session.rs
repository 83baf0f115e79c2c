//! Process-wide authentication state.
//!
//! [`SessionStore`] is the only owner of the [`Session`]; everything else
//! reads snapshots or subscribes. The two mutators, [`SessionStore::login`]
//! and [`SessionStore::logout`], swap the whole snapshot at once, so nobody
//! ever sees a user without a token or the other way round.

use std::sync::Arc;

use tokio::sync::watch;

use crate::entities::{Token, UserProfile};
use crate::storage::{KeyValueStorage, PROFILE_KEY, TOKEN_KEY};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        user: Arc<UserProfile>,
        token: Token,
    },
}

impl Session {
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool { matches!(self, Session::Authenticated { .. }) }
}

pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn KeyValueStorage + Sync + Send>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage + Sync + Send>) -> Self {
        let (state, _) = watch::channel(Session::Anonymous);

        Self { state, storage }
    }

    /// Picks up a session persisted by an earlier run.
    ///
    /// Both the token and the cached profile must be present; a lone token
    /// is not enough to know who the user is, so the store stays anonymous.
    pub fn resume(&self) -> bool {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(Some(t)) if !t.trim().is_empty() => t,
            Ok(_) => return false,
            Err(e) => {
                tracing::warn!("cannot read stored token: {}", e);
                return false;
            },
        };

        let profile = match self.storage.get(PROFILE_KEY) {
            Ok(Some(p)) => serde_json::from_str::<UserProfile>(&p).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("cannot read stored profile: {}", e);
                None
            },
        };

        match profile {
            Some(user) => {
                self.replace(Session::Authenticated {
                    user: Arc::new(user),
                    token: Token::new(token.trim()),
                });
                tracing::info!("session resumed from storage");
                true
            },
            None => {
                tracing::warn!("stored token has no profile, staying anonymous");
                false
            },
        }
    }

    pub fn login(&self, user: UserProfile, token: Token) {
        self.persist(&user, &token);
        self.replace(Session::Authenticated {
            user: Arc::new(user),
            token,
        });
    }

    pub fn logout(&self) {
        for key in [TOKEN_KEY, PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("cannot remove `{}` from storage: {}", key, e);
            }
        }
        self.replace(Session::Anonymous);
    }

    pub fn current_session(&self) -> Session { self.state.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<Session> { self.state.subscribe() }

    fn persist(&self, user: &UserProfile, token: &Token) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token.expose()) {
            tracing::warn!("cannot persist token: {}", e);
        }

        match serde_json::to_string(user) {
            Ok(profile) =>
                if let Err(e) = self.storage.set(PROFILE_KEY, &profile) {
                    tracing::warn!("cannot persist profile: {}", e);
                },
            Err(e) => tracing::warn!("cannot encode profile: {}", e),
        }
    }

    fn replace(&self, next: Session) {
        let prev = self.state.send_replace(next);
        tracing::debug!(
            "session {} -> {}",
            label(&prev),
            label(&self.state.borrow())
        );
    }
}

fn label(session: &Session) -> &'static str {
    match session {
        Session::Anonymous => "anonymous",
        Session::Authenticated { .. } => "authenticated",
    }
}
