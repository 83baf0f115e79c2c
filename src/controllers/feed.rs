use std::cmp::Reverse;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::Instrument;

use super::Phase;
use crate::entities::Post;
use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::optimistic::LikeEngine;
use crate::presenters::Navigator;
use crate::session::SessionStore;

pub const TOP_DEFAULT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Server order.
    pub posts: Vec<Post>,
    pub phase: Phase,
    /// Set when `load` found no token and sent nothing.
    pub unauthenticated: bool,
}

struct FeedState {
    generation: u64,
    mounted: bool,
    snapshot: FeedSnapshot,
}

/// The list of every post.
pub struct FeedController {
    state: Arc<Mutex<FeedState>>,
    gateway: ApiGateway,
    session: Arc<SessionStore>,
    likes: LikeEngine,
}

impl FeedController {
    pub fn new(
        gateway: ApiGateway,
        session: Arc<SessionStore>,
        nav: Arc<dyn Navigator + Sync + Send>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                generation: 0,
                mounted: true,
                snapshot: FeedSnapshot::default(),
            })),
            likes: LikeEngine::new(gateway.clone(), session.clone(), nav),
            gateway,
            session,
        }
    }

    /// Starts loading right away; the returned future resolves with the
    /// number of posts committed.
    pub fn load(&self) -> impl Future<Output = Result<usize, ClientError>> + Send + 'static {
        let token = self.session.current_session().token().cloned();

        let begun = {
            let mut state = self.state.lock();
            state.generation += 1;

            match token {
                Some(token) => {
                    state.snapshot.unauthenticated = false;
                    state.snapshot.phase.begin();
                    Ok((token, state.generation))
                },
                None => {
                    tracing::debug!("no token, feed left unloaded");
                    state.snapshot = FeedSnapshot {
                        unauthenticated: true,
                        ..FeedSnapshot::default()
                    };
                    Err(ClientError::Unauthenticated)
                },
            }
        };

        let state = self.state.clone();
        let gateway = self.gateway.clone();
        let likes = self.likes.clone();
        let span = tracing::debug_span!("feed_load");

        async move {
            let (token, generation) = begun?;
            let result = gateway.get_all_posts(&token).await;

            let mut state = state.lock();
            if state.generation != generation || !state.mounted {
                tracing::debug!("feed generation {} is stale", generation);
                return Err(ClientError::Stale);
            }

            match result {
                Ok(posts) => {
                    likes.observe(&posts);
                    let n = posts.len();
                    state.snapshot.posts = posts;
                    state.snapshot.phase.succeed();
                    tracing::trace!("output - {} posts", n);
                    Ok(n)
                },
                Err(e) => {
                    state.snapshot.phase.fail(&e);
                    Err(e)
                },
            }
        }
        .instrument(span)
    }

    pub fn snapshot(&self) -> FeedSnapshot { self.state.lock().snapshot.clone() }

    pub fn recent(&self) -> Vec<Post> { self.state.lock().snapshot.posts.clone() }

    /// The `n` most liked posts as last fetched, ties kept in server order.
    ///
    /// Pending toggles do not move a post up or down.
    pub fn top(&self, n: usize) -> SmallVec<[Post; TOP_DEFAULT]> {
        let mut posts = self.recent();
        posts.sort_by_key(|p| Reverse(p.like_count()));

        posts.into_iter().take(n).collect()
    }

    pub fn likes(&self) -> &LikeEngine { &self.likes }

    pub fn unmount(&self) {
        self.state.lock().mounted = false;
        self.likes.unmount();
    }
}
