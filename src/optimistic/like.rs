use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

use super::intent::{LikeSnapshot, LikeState, LikeView, MutationIntent};
use crate::entities::{Post, PostId, UserId};
use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::guard::View;
use crate::presenters::Navigator;
use crate::session::{Session, SessionStore};

const LOGIN_REQUIRED: &str = "You must be logged in to like a post!";

/// How a background confirmation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    RolledBack { message: String },
    /// A newer toggle on the same post was issued meanwhile.
    Superseded,
    /// The owning view is gone.
    Detached,
}

struct Slot {
    state: LikeState,
    count: usize,
    seq: u64,
}

impl Slot {
    fn snapshot(&self) -> LikeSnapshot {
        LikeSnapshot {
            liked: self.state.is_liked(),
            count: self.count,
        }
    }

    fn view(&self) -> LikeView {
        LikeView {
            state: self.state,
            count: self.count,
        }
    }
}

#[derive(Default)]
struct Inner {
    slots: HashMap<PostId, Slot>,
    detached: bool,
    notice: Option<String>,
}

/// Like state of the posts one view shows.
///
/// Confirmations run on spawned tasks that only hold a weak handle to the
/// state, so a view can go away while calls are in flight.
#[derive(Clone)]
pub struct LikeEngine {
    inner: Arc<Mutex<Inner>>,
    gateway: ApiGateway,
    session: Arc<SessionStore>,
    nav: Arc<dyn Navigator + Sync + Send>,
}

impl LikeEngine {
    pub fn new(
        gateway: ApiGateway,
        session: Arc<SessionStore>,
        nav: Arc<dyn Navigator + Sync + Send>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            gateway,
            session,
            nav,
        }
    }

    /// Seeds slots with what the server says. Pending slots are left alone.
    pub fn observe<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) {
        let viewer = self.session.current_session().user().map(|u| u.id.clone());
        let mut inner = self.inner.lock();

        for post in posts {
            let liked = viewer.as_ref().map_or(false, |v| post.is_liked_by(v));
            let slot = inner.slots.entry(post.id.clone()).or_insert(Slot {
                state: LikeState::Unliked,
                count: 0,
                seq: 0,
            });

            if slot.state.is_pending() {
                tracing::debug!("post {} has a toggle in flight, keeping it", post.id);
                continue;
            }

            slot.state = LikeState::settled(liked);
            slot.count = post.like_count();
        }
    }

    pub fn view(&self, post_id: &PostId) -> Option<LikeView> {
        self.inner.lock().slots.get(post_id).map(Slot::view)
    }

    /// Flips the like at once and confirms it in the background.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&self, post_id: &PostId) -> Result<JoinHandle<Resolution>, ClientError> {
        let (viewer, token) = match self.session.current_session() {
            Session::Authenticated { user, token } => (user.id.clone(), token),
            Session::Anonymous => {
                self.nav
                    .navigate(View::Login, Some(LOGIN_REQUIRED.to_string()));
                return Err(ClientError::Unauthenticated);
            },
        };

        let intent = {
            let mut inner = self.inner.lock();
            let slot = inner.slots.get_mut(post_id).ok_or_else(|| {
                ClientError::Validation(format!("post {} is not loaded.", post_id))
            })?;

            let before = slot.snapshot();
            let after = before.flipped();

            slot.seq += 1;
            slot.state = slot.state.toggled();
            slot.count = after.count;

            MutationIntent {
                post_id: post_id.clone(),
                viewer,
                seq: slot.seq,
                before,
                after,
            }
        };

        tracing::debug!("intent - {:?}", intent);

        let gateway = self.gateway.clone();
        let inner = Arc::downgrade(&self.inner);

        Ok(tokio::spawn(async move {
            let result = gateway.toggle_like(&intent.post_id, &token).await;
            resolve(&inner, intent, result)
        }))
    }

    /// Stops applying resolutions. Calls in flight still complete.
    pub fn unmount(&self) { self.inner.lock().detached = true; }

    pub fn notice(&self) -> Option<String> { self.inner.lock().notice.clone() }

    pub fn clear_notice(&self) { self.inner.lock().notice = None; }
}

fn resolve(
    inner: &Weak<Mutex<Inner>>,
    intent: MutationIntent,
    result: Result<Value, ClientError>,
) -> Resolution {
    let strong = match inner.upgrade() {
        Some(s) => s,
        None => {
            tracing::debug!("like state dropped, post {} detached", intent.post_id);
            return Resolution::Detached;
        },
    };
    let mut guard = strong.lock();

    if guard.detached {
        tracing::debug!("view unmounted, post {} detached", intent.post_id);
        return Resolution::Detached;
    }

    let Inner { slots, notice, .. } = &mut *guard;

    let slot = match slots.get_mut(&intent.post_id) {
        Some(s) if s.seq == intent.seq => s,
        _ => {
            tracing::debug!(
                "intent #{} on post {} superseded",
                intent.seq,
                intent.post_id
            );
            return Resolution::Superseded;
        },
    };

    match result {
        Ok(body) => {
            match server_likes(&body) {
                Some(likes) => {
                    slot.state = LikeState::settled(likes.contains(&intent.viewer));
                    slot.count = likes.len();
                },
                None => slot.state = slot.state.settle(),
            }
            Resolution::Confirmed
        },
        Err(e) => {
            slot.state = LikeState::settled(intent.before.liked);
            slot.count = intent.before.count;

            let message = format!("Could not update like status: {}", e.user_message());
            tracing::warn!("{}", message);
            *notice = Some(message.clone());

            Resolution::RolledBack { message }
        },
    }
}

/// Like set echoed by the server, bare or under `data`.
fn server_likes(body: &Value) -> Option<HashSet<UserId>> {
    let likes = body
        .get("likes")
        .or_else(|| body.get("data").and_then(|d| d.get("likes")))?;

    serde_json::from_value(likes.clone()).ok()
}
