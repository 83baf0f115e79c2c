use std::fmt::{self, Display};
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cmds::ShellCmd;
use crate::controllers::{FeedController, PostActions, PostController};
use crate::entities::{Credentials, Post, PostDraft, PostId, PostPatch, Registration};
use crate::errors::ClientError;
use crate::guard::{Navigation, RouteGuard, Router, View};
use crate::optimistic::{LikeEngine, LikeView, Resolution};
use crate::presenters::Visit;
use crate::session::SessionStore;
use crate::usecases::auth::{login, logout, register};
use crate::utils::LetChain;

mod command_colors;
mod helper;

use command_colors::*;

type Result<T> = ::std::result::Result<T, ClientError>;

/// Runs shell commands against one session and renders the outcome.
pub struct Conductor {
    pub(crate) session: Arc<SessionStore>,
    pub(crate) router: Router,
    pub(crate) visits: UnboundedReceiver<Visit>,
    pub(crate) feed: FeedController,
    pub(crate) post: PostController,
    pub(crate) register: Arc<dyn register::Usecase + Sync + Send>,
    pub(crate) login: Arc<dyn login::Usecase + Sync + Send>,
    pub(crate) logout: Arc<dyn logout::Usecase + Sync + Send>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub title: String,
    pub rgb: (u8, u8, u8),
    pub description: String,
    pub fields: Vec<(String, String)>,
}

impl Response {
    fn plain(title: impl Display, description: impl Display, rgb: (u8, u8, u8)) -> Self {
        Response {
            title: format!("{}", title),
            rgb,
            description: format!("{}", description),
            fields: vec![],
        }
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.rgb;
        writeln!(f, "\x1b[1;38;2;{};{};{}m{}\x1b[0m", r, g, b, self.title)?;

        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }

        for (name, value) in &self.fields {
            writeln!(f, "  {} {}", name, value)?;
        }

        Ok(())
    }
}

impl Conductor {
    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn location(&self) -> &View { self.router.current() }

    pub async fn conduct(&mut self, cmd: ShellCmd) -> Vec<Response> {
        let mut out = match self.run(cmd).await {
            Ok(o) => o,
            Err(ClientError::Stale) => vec![],
            Err(e) => Response::plain("error occurred", e.user_message(), ERROR).let_(|r| vec![r]),
        };

        out.extend(self.follow_visits());

        out
    }

    async fn run(&mut self, cmd: ShellCmd) -> Result<Vec<Response>> {
        match cmd {
            ShellCmd::Register {
                username,
                full_name,
                email,
                password,
            } => {
                let registration = Registration {
                    username,
                    full_name,
                    email,
                    password: SecretString::from(password),
                };

                let register::Output { user } = self
                    .register
                    .handle(register::Input { registration })
                    .await?;

                helper::resp_from_user("registered", "welcome aboard.", AUTH, &user)
                    .let_(|r| Ok(vec![r]))
            },

            ShellCmd::Login { username, password } => {
                let login::Output { user } = self
                    .login
                    .handle(login::Input {
                        credentials: Credentials::new(username, password),
                    })
                    .await?;

                helper::resp_from_user("logged in", "", AUTH, &user).let_(|r| Ok(vec![r]))
            },

            ShellCmd::Logout => {
                let logout::Output {} = self.logout.handle(logout::Input {}).await?;

                Ok(vec![Response::plain("logged out", "", AUTH)])
            },

            ShellCmd::Whoami => match self.session.current_session().user() {
                Some(user) =>
                    helper::resp_from_user("you are", "", WHOAMI, user).let_(|r| Ok(vec![r])),
                None => Ok(vec![Response::plain("you are", "nobody (not logged in).", WHOAMI)]),
            },

            ShellCmd::Go { path } => {
                let view = View::parse(&path)
                    .ok_or_else(|| ClientError::Validation(format!("no such view: `{}`", path)))?;

                self.enter(view, None).await
            },

            ShellCmd::Posts { top } => self.enter(View::Home, top).await,

            ShellCmd::Show { id } => self.enter(View::PostDetails(PostId::from(id)), None).await,

            ShellCmd::Like { id } => self.like(PostId::from(id)).await,

            ShellCmd::Create {
                title,
                content,
                image,
            } => {
                if let Some(r) = self.guard(View::CreatePost) {
                    return Ok(vec![r]);
                }

                let draft = PostDraft {
                    title,
                    content,
                    image_url: image,
                };

                let resp = match self.post.create(draft).await? {
                    Some(p) => self.resp_post("created post", "", POST_CREATE, &p, None),
                    None => Response::plain("created post", "", POST_CREATE),
                };

                Ok(vec![resp])
            },

            ShellCmd::Edit { id, title, content } => {
                let id = PostId::from(id);
                if let Some(r) = self.guard(View::UpdatePost(id.clone())) {
                    return Ok(vec![r]);
                }

                let resp = match self.post.update(id, PostPatch { title, content }).await? {
                    Some(p) => self.resp_post("updated post", "", POST_UPDATE, &p, None),
                    None => Response::plain("updated post", "", POST_UPDATE),
                };

                Ok(vec![resp])
            },

            ShellCmd::Delete { id } => {
                let id = PostId::from(id);
                if let Some(r) = self.guard(View::PostDetails(id.clone())) {
                    return Ok(vec![r]);
                }

                self.post.delete(id.clone()).await?;

                Ok(vec![Response::plain("deleted post", id, POST_DELETE)])
            },

            ShellCmd::Quit => Ok(vec![]),
        }
    }

    /// Goes to `view` and renders it, unless the guard sends us elsewhere.
    async fn enter(&mut self, view: View, top: Option<usize>) -> Result<Vec<Response>> {
        let view = match self.router.navigate(view) {
            Navigation::Render(v) => v,
            nav => return Ok(vec![self.resp_navigation(&nav, None)]),
        };

        match view {
            View::Home => self.show_feed(top).await,
            View::Login => Ok(vec![Response::plain(
                "log in",
                "login <username> <password>",
                NAVIGATE,
            )]),
            View::Register => Ok(vec![Response::plain(
                "register",
                "register <username> <full name> <email> <password>",
                NAVIGATE,
            )]),
            View::CreatePost => Ok(vec![Response::plain(
                "new post",
                "create --title <title> --content <content> [--image <url>]",
                NAVIGATE,
            )]),
            View::PostDetails(id) => self.show_post(id, "").await,
            View::UpdatePost(id) => {
                let hint = format!("edit {} --title <title> --content <content>", id);
                self.show_post(id, hint).await
            },
        }
    }

    async fn show_feed(&self, top: Option<usize>) -> Result<Vec<Response>> {
        match self.feed.load().await {
            Ok(_) => {},
            Err(ClientError::Unauthenticated) =>
                return Ok(vec![Response::plain("posts", "log in to see posts.", POST_READ)]),
            Err(e) => return Err(e),
        }

        let posts = match top {
            Some(n) => self.feed.top(n).into_vec(),
            None => self.feed.recent(),
        };

        if posts.is_empty() {
            return Ok(vec![Response::plain("posts", "no posts yet.", POST_READ)]);
        }

        let all = posts.len();
        posts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                self.resp_post(
                    format!("posts [{}/{}]", i + 1, all),
                    "",
                    POST_READ,
                    p,
                    Some(self.feed.likes()),
                )
            })
            .collect::<Vec<_>>()
            .let_(Ok)
    }

    async fn show_post(&self, id: PostId, description: impl Display) -> Result<Vec<Response>> {
        let post = self.post.load(id).await?;

        self.resp_post("post", description, POST_READ, &post, Some(self.post.likes()))
            .let_(|r| Ok(vec![r]))
    }

    async fn like(&self, id: PostId) -> Result<Vec<Response>> {
        let known = |e: &LikeEngine| e.view(&id).is_some();

        if !known(self.post.likes())
            && !known(self.feed.likes())
            && self.session.current_session().is_authenticated()
        {
            self.post.load(id.clone()).await?;
        }

        let engine = match known(self.post.likes()) {
            true => self.post.likes(),
            false => self.feed.likes(),
        };

        let handle = engine.toggle(&id)?;
        let mut out = vec![resp_like("like sent", &id, engine.view(&id))];

        match handle.await {
            Ok(Resolution::Confirmed) =>
                out.push(resp_like("like confirmed", &id, engine.view(&id))),
            Ok(Resolution::RolledBack { message }) => {
                engine.clear_notice();
                out.push(Response::plain("like rolled back", message, ERROR));
            },
            Ok(r) => tracing::debug!("like on {} ended as {:?}", id, r),
            Err(e) => tracing::warn!("like task for {} failed: {}", id, e),
        }

        Ok(out)
    }

    fn guard(&mut self, view: View) -> Option<Response> {
        match self.router.navigate(view) {
            Navigation::Render(_) => None,
            nav => Some(self.resp_navigation(&nav, Some("log in first.".to_string()))),
        }
    }

    fn follow_visits(&mut self) -> Vec<Response> {
        let mut out = vec![];

        while let Ok(Visit { view, notice }) = self.visits.try_recv() {
            let nav = self.router.navigate(view);
            out.push(self.resp_navigation(&nav, notice));
        }

        out
    }

    fn resp_navigation(&self, nav: &Navigation, notice: Option<String>) -> Response {
        let title = match nav {
            Navigation::Render(v) => format!("at {}", v),
            Navigation::Redirect(v) => format!("redirected to {}", v),
        };

        let menu = RouteGuard::menu(&self.session.current_session());

        Response {
            title,
            rgb: NAVIGATE,
            description: notice.unwrap_or_default(),
            fields: vec![("menu:".to_string(), helper::menu_line(&menu))],
        }
    }

    fn resp_post(
        &self,
        title: impl Display,
        description: impl Display,
        rgb: (u8, u8, u8),
        post: &Post,
        likes: Option<&LikeEngine>,
    ) -> Response {
        let session = self.session.current_session();

        helper::resp_from_post(
            title,
            description,
            rgb,
            post,
            likes.and_then(|e| e.view(&post.id)),
            PostActions::of(post, session.user()),
        )
    }
}

fn resp_like(title: &str, id: &PostId, view: Option<LikeView>) -> Response {
    let mut fields = vec![("post:".to_string(), id.to_string())];

    if let Some(v) = view {
        let mut likes = helper::likes_label(v.count);
        if v.is_liked() {
            likes.push_str(" (liked)");
        }
        fields.push(("likes:".to_string(), likes));
    }

    Response {
        title: title.to_string(),
        rgb: LIKE,
        description: String::new(),
        fields,
    }
}
