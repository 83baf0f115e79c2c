pub mod auth;

use crate::entities::{Token, UserProfile};
use crate::gateway::AuthPayload;
use crate::guard::View;
use crate::presenters::Navigator;
use crate::session::SessionStore;

/// Installs a fresh session from an auth reply and leaves for Home.
fn begin_session(
    session: &SessionStore,
    nav: &(dyn Navigator + Sync + Send),
    AuthPayload { user, access_token }: AuthPayload,
) -> UserProfile {
    session.login(user.clone(), Token::new(access_token));
    nav.navigate(View::Home, None);

    user
}
