use std::sync::Arc;

use crate::conductors::Conductor;
use crate::config::Config;
use crate::controllers::{FeedController, PostController};
use crate::gateway::http::ReqwestTransport;
use crate::gateway::{ApiGateway, Transport};
use crate::guard::Router;
use crate::interactors::auth::{AuthLoginInteractor, AuthLogoutInteractor, AuthRegisterInteractor};
use crate::presenters::impls::ret::ReturnNavigator;
use crate::presenters::impls::terminal::TerminalConfirm;
use crate::presenters::{Confirm, Navigator};
use crate::session::SessionStore;
use crate::storage::{FileStorage, KeyValueStorage};

/// Talks to the configured server and keeps the session under `state_dir`.
pub fn remote(config: &Config) -> Conductor {
    tracing::info!("using {}", config.base_url);

    with_parts(
        Arc::new(ReqwestTransport::new(config.base_url.clone())),
        Arc::new(FileStorage::new(config.state_dir.clone())),
        Arc::new(TerminalConfirm),
    )
}

pub fn with_parts(
    transport: Arc<dyn Transport + Sync + Send>,
    storage: Arc<dyn KeyValueStorage + Sync + Send>,
    confirm: Arc<dyn Confirm + Sync + Send>,
) -> Conductor {
    let gateway = ApiGateway::new(transport);

    let session = Arc::new(SessionStore::new(storage));
    session.resume();

    let (nav, visits) = ReturnNavigator::channel();
    let nav: Arc<dyn Navigator + Sync + Send> = Arc::new(nav);

    Conductor {
        router: Router::new(session.subscribe()),
        visits,
        feed: FeedController::new(gateway.clone(), session.clone(), nav.clone()),
        post: PostController::new(gateway.clone(), session.clone(), nav.clone(), confirm),
        register: Arc::new(AuthRegisterInteractor {
            gateway: gateway.clone(),
            session: session.clone(),
            nav: nav.clone(),
        }),
        login: Arc::new(AuthLoginInteractor {
            gateway,
            session: session.clone(),
            nav: nav.clone(),
        }),
        logout: Arc::new(AuthLogoutInteractor {
            session: session.clone(),
            nav,
        }),
        session,
    }
}
