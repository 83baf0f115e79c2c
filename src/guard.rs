use tokio::sync::watch;

use crate::entities::PostId;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    CreatePost,
    PostDetails(PostId),
    UpdatePost(PostId),
}

impl View {
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            View::CreatePost | View::PostDetails(_) | View::UpdatePost(_)
        )
    }

    pub fn path(&self) -> String {
        match self {
            View::Home => "/".to_string(),
            View::Login => "/login".to_string(),
            View::Register => "/register".to_string(),
            View::CreatePost => "/createPost".to_string(),
            View::PostDetails(id) => format!("/PostDetails/{}", id),
            View::UpdatePost(id) => format!("/UpdateBlog/{}", id),
        }
    }

    pub fn parse(path: &str) -> Option<View> {
        let segments = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let head = segments.first().map(|s| s.to_ascii_lowercase());

        match (head.as_deref(), segments.get(1), segments.len()) {
            (None, _, _) => Some(View::Home),
            (Some("login"), _, 1) => Some(View::Login),
            (Some("register"), _, 1) => Some(View::Register),
            (Some("createpost"), _, 1) => Some(View::CreatePost),
            (Some("postdetails"), Some(id), 2) => Some(View::PostDetails(PostId::from(*id))),
            (Some("updateblog"), Some(id), 2) => Some(View::UpdatePost(PostId::from(*id))),
            _ => None,
        }
    }
}

impl ::std::fmt::Display for View {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(View),
}

impl Navigation {
    pub fn view(&self) -> &View {
        match self {
            Navigation::Render(v) | Navigation::Redirect(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Home,
    CreatePost,
    Logout,
    Login,
    Register,
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn check(session: &Session, view: View) -> Navigation {
        match view.is_protected() && !session.is_authenticated() {
            true => Navigation::Redirect(View::Login),
            false => Navigation::Render(view),
        }
    }

    pub fn menu(session: &Session) -> Vec<MenuItem> {
        match session.is_authenticated() {
            true => vec![MenuItem::Home, MenuItem::CreatePost, MenuItem::Logout],
            false => vec![MenuItem::Home, MenuItem::Login, MenuItem::Register],
        }
    }
}

/// Current location, kept consistent with the session.
///
/// A redirect replaces the requested view; there is no "return to" memory.
pub struct Router {
    session: watch::Receiver<Session>,
    current: View,
}

impl Router {
    pub fn new(session: watch::Receiver<Session>) -> Self {
        Self {
            session,
            current: View::Home,
        }
    }

    pub fn current(&self) -> &View { &self.current }

    pub fn navigate(&mut self, view: View) -> Navigation {
        self.current = view;
        self.render()
    }

    pub fn render(&mut self) -> Navigation {
        let nav = RouteGuard::check(&self.session.borrow_and_update(), self.current.clone());

        if let Navigation::Redirect(to) = &nav {
            tracing::debug!("redirect {} -> {}", self.current, to);
            self.current = to.clone();
        }

        nav
    }

    /// Waits for the next session change and renders again.
    pub async fn next_change(&mut self) -> Option<Navigation> {
        match self.session.changed().await {
            Ok(()) => Some(self.render()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::{Token, UserId, UserProfile};
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;

    fn store() -> SessionStore { SessionStore::new(Arc::new(MemoryStorage::new())) }

    fn login(store: &SessionStore) {
        store.login(
            UserProfile {
                id: UserId::from("u1"),
                username: "alice".to_string(),
                full_name: "Alice".to_string(),
                email: String::new(),
            },
            Token::new("tok1"),
        );
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        let nav = RouteGuard::check(&Session::Anonymous, View::CreatePost);
        assert_eq!(nav, Navigation::Redirect(View::Login));

        let nav = RouteGuard::check(&Session::Anonymous, View::Home);
        assert_eq!(nav, Navigation::Render(View::Home));
    }

    #[test]
    fn authenticated_renders_protected_views() {
        let store = store();
        login(&store);

        let nav = RouteGuard::check(&store.current_session(), View::CreatePost);
        assert_eq!(nav, Navigation::Render(View::CreatePost));
    }

    #[test]
    fn logout_redirects_on_next_render() {
        let store = store();
        login(&store);

        let mut router = Router::new(store.subscribe());
        let id = PostId::from("p1");
        assert_eq!(
            router.navigate(View::PostDetails(id.clone())),
            Navigation::Render(View::PostDetails(id))
        );

        store.logout();
        assert_eq!(router.render(), Navigation::Redirect(View::Login));
        assert_eq!(router.current(), &View::Login);

        login(&store);
        assert_eq!(router.render(), Navigation::Render(View::Login));
    }

    #[tokio::test]
    async fn next_change_follows_session() {
        let store = store();
        login(&store);
        let mut router = Router::new(store.subscribe());
        router.navigate(View::CreatePost);

        store.logout();
        assert_eq!(
            router.next_change().await,
            Some(Navigation::Redirect(View::Login))
        );
    }

    #[test]
    fn paths_round_trip() {
        for view in [
            View::Home,
            View::Login,
            View::Register,
            View::CreatePost,
            View::PostDetails(PostId::from("p1")),
            View::UpdatePost(PostId::from("p1")),
        ] {
            assert_eq!(View::parse(&view.path()), Some(view));
        }

        assert_eq!(
            View::parse("/postdetails/abc"),
            Some(View::PostDetails(PostId::from("abc")))
        );
        assert_eq!(View::parse("/nowhere"), None);
    }

    #[test]
    fn menu_depends_on_session() {
        assert!(RouteGuard::menu(&Session::Anonymous).contains(&MenuItem::Login));

        let store = store();
        login(&store);
        assert!(RouteGuard::menu(&store.current_session()).contains(&MenuItem::CreatePost));
    }
}
