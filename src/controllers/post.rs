use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Instrument;

use super::Phase;
use crate::entities::{Post, PostDraft, PostId, PostPatch, Token, UserProfile};
use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::guard::View;
use crate::optimistic::LikeEngine;
use crate::presenters::{Confirm, Navigator};
use crate::session::{Session, SessionStore};
use crate::utils::{AlsoChain, LetChain};

type Result<T> = ::std::result::Result<T, ClientError>;

pub const MISSING_TOKEN_OR_ID: &str = "Missing authentication token or post ID.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this post?";
pub const DELETED: &str = "Post successfully deleted!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostActions {
    pub can_like: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PostActions {
    pub fn of(post: &Post, viewer: Option<&UserProfile>) -> Self {
        let owner = viewer.map_or(false, |v| post.is_owned_by(v));

        PostActions {
            can_like: viewer.is_some(),
            can_edit: owner,
            can_delete: owner,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostSnapshot {
    pub target: Option<PostId>,
    pub post: Option<Post>,
    /// `load`
    pub phase: Phase,
    /// `create`, `update` and `delete`
    pub submit: Phase,
}

struct PostState {
    generation: u64,
    mounted: bool,
    snapshot: PostSnapshot,
}

/// One post: detail, create, edit and delete.
pub struct PostController {
    state: Arc<Mutex<PostState>>,
    gateway: ApiGateway,
    session: Arc<SessionStore>,
    nav: Arc<dyn Navigator + Sync + Send>,
    confirm: Arc<dyn Confirm + Sync + Send>,
    likes: LikeEngine,
}

impl PostController {
    pub fn new(
        gateway: ApiGateway,
        session: Arc<SessionStore>,
        nav: Arc<dyn Navigator + Sync + Send>,
        confirm: Arc<dyn Confirm + Sync + Send>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(PostState {
                generation: 0,
                mounted: true,
                snapshot: PostSnapshot::default(),
            })),
            likes: LikeEngine::new(gateway.clone(), session.clone(), nav.clone()),
            gateway,
            session,
            nav,
            confirm,
        }
    }

    /// Retargets the controller and starts fetching `id` right away.
    ///
    /// Any earlier `load` still in flight resolves to `Stale` without
    /// touching the view.
    pub fn load(&self, id: PostId) -> impl Future<Output = Result<Post>> + Send + 'static {
        let token = self.session.current_session().token().cloned();

        let begun = {
            let mut state = self.state.lock();
            state.generation += 1;

            let checked = match token {
                _ if id.0.trim().is_empty() => Err(ClientError::Validation(
                    MISSING_TOKEN_OR_ID.to_string(),
                )),
                None => Err(ClientError::Unauthenticated),
                Some(token) => Ok(token),
            };

            match checked {
                Ok(token) => {
                    state.snapshot.target = Some(id.clone());
                    state.snapshot.phase.begin();
                    Ok((token, state.generation))
                },
                Err(e) => {
                    state.snapshot.phase.reject(MISSING_TOKEN_OR_ID);
                    Err(e)
                },
            }
        };

        if begun.is_err() {
            self.nav.navigate(View::Login, None);
        }

        let state = self.state.clone();
        let gateway = self.gateway.clone();
        let likes = self.likes.clone();
        let span = tracing::debug_span!("post_load", %id);

        async move {
            let (token, generation) = begun?;
            let result = gateway.get_post(&id, &token).await;

            let mut state = state.lock();
            if state.generation != generation || !state.mounted {
                tracing::debug!("post {} (generation {}) is stale", id, generation);
                return Err(ClientError::Stale);
            }

            match result {
                Ok(post) => {
                    likes.observe([&post]);
                    state.snapshot.post = Some(post.clone());
                    state.snapshot.phase.succeed();
                    Ok(post)
                },
                Err(e) => {
                    state.snapshot.phase.fail(&e);
                    Err(e)
                },
            }
        }
        .instrument(span)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: PostDraft) -> Result<Option<Post>> {
        tracing::trace!("input - {:?}", draft);

        let token = self.begin_submit(draft.validate())?;
        let created = self
            .gateway
            .create_post(&draft, &token)
            .await
            .let_(|r| self.finish_submit(r))?;

        self.nav.navigate(View::Home, None);

        created
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: PostId, patch: PostPatch) -> Result<Option<Post>> {
        tracing::trace!("input - {:?}", patch);

        let token = self.begin_submit(patch.validate())?;
        self.ensure_owner(&id, &token).await?;

        let updated = self
            .gateway
            .update_post(&id, &patch, &token)
            .await
            .let_(|r| self.finish_submit(r))?;

        {
            let mut state = self.state.lock();
            if let Some(post) = state.snapshot.post.as_mut().filter(|p| p.id == id) {
                match &updated {
                    Some(fresh) => *post = fresh.clone(),
                    None => {
                        post.title = patch.title.clone();
                        post.content = patch.content.clone();
                    },
                }
            }
        }

        self.nav.navigate(View::PostDetails(id), None);

        updated
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Asks for confirmation first; only the author may delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: PostId) -> Result<()> {
        let token = match self.session.current_session() {
            Session::Authenticated { token, .. } => token,
            Session::Anonymous => return Err(ClientError::Unauthenticated),
        };

        self.ensure_owner(&id, &token).await?;

        if !self.confirm.confirm(DELETE_PROMPT).await {
            tracing::debug!("deletion of {} declined", id);
            return Err(ClientError::Cancelled);
        }

        self.begin_submit(Ok(()))?;
        self.gateway
            .delete_post(&id, &token)
            .await
            .let_(|r| self.finish_submit(r))?;

        {
            let mut state = self.state.lock();
            if state.snapshot.post.as_ref().map_or(false, |p| p.id == id) {
                state.snapshot.post = None;
            }
        }

        self.nav.navigate(View::Home, Some(DELETED.to_string()));

        Ok(())
    }

    /// What `viewer` may do with the loaded post.
    pub fn actions(&self, viewer: Option<&UserProfile>) -> PostActions {
        self.state
            .lock()
            .snapshot
            .post
            .as_ref()
            .map(|p| PostActions::of(p, viewer))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> PostSnapshot { self.state.lock().snapshot.clone() }

    pub fn likes(&self) -> &LikeEngine { &self.likes }

    pub fn unmount(&self) {
        self.state.lock().mounted = false;
        self.likes.unmount();
    }

    /// Fails with `NotOwner` unless the viewer wrote `id`.
    ///
    /// Uses the loaded post when it is the same one, and fetches it otherwise.
    async fn ensure_owner(&self, id: &PostId, token: &Token) -> Result<()> {
        let viewer = self.session.current_session().user().cloned();

        let verdict = match viewer {
            None => Err(ClientError::Unauthenticated),
            Some(viewer) => {
                let known = self
                    .state
                    .lock()
                    .snapshot
                    .post
                    .as_ref()
                    .filter(|p| &p.id == id)
                    .map(|p| p.is_owned_by(&viewer));

                let owned = match known {
                    Some(owned) => Ok(owned),
                    None => self
                        .gateway
                        .get_post(id, token)
                        .await
                        .map(|p| p.is_owned_by(&viewer)),
                };

                owned.and_then(|o| match o {
                    true => Ok(()),
                    false => Err(ClientError::NotOwner),
                })
            },
        };

        if let Err(e) = &verdict {
            tracing::debug!("change to {} refused: {}", id, e);
            self.state.lock().snapshot.submit.fail(e);
        }

        verdict
    }

    fn begin_submit(&self, check: Result<()>) -> Result<Token> {
        let token = self.session.current_session().token().cloned();
        let begun = check.and_then(|_| token.ok_or(ClientError::Unauthenticated));

        let mut state = self.state.lock();
        match &begun {
            Ok(_) => state.snapshot.submit.begin(),
            Err(e) => state.snapshot.submit.fail(e),
        }

        begun
    }

    fn finish_submit<T>(&self, result: Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        match &result {
            Ok(_) => state.snapshot.submit.succeed(),
            Err(e) => state.snapshot.submit.fail(e),
        }

        result
    }
}
