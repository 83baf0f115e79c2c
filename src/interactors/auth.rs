use std::sync::Arc;

use async_trait::async_trait;

use super::*;
use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::usecases::auth::{login, logout, register};
use crate::utils::{AlsoChain, LetChain};

type Result<T> = ::std::result::Result<T, ClientError>;

pub struct AuthRegisterInteractor {
    pub gateway: ApiGateway,
    pub session: Arc<SessionStore>,
    pub nav: Arc<dyn Navigator + Sync + Send>,
}
#[async_trait]
impl register::Usecase for AuthRegisterInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: register::Input) -> Result<register::Output> {
        tracing::trace!("input - {:?}", data);

        let register::Input { registration } = data;

        registration.validate()?;

        self.gateway
            .register(&registration)
            .await?
            .let_(|payload| begin_session(&self.session, self.nav.as_ref(), payload))
            .let_(|user| register::Output { user })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct AuthLoginInteractor {
    pub gateway: ApiGateway,
    pub session: Arc<SessionStore>,
    pub nav: Arc<dyn Navigator + Sync + Send>,
}
#[async_trait]
impl login::Usecase for AuthLoginInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: login::Input) -> Result<login::Output> {
        tracing::trace!("input - {:?}", data);

        let login::Input { credentials } = data;

        credentials.validate()?;

        self.gateway
            .login(&credentials)
            .await?
            .let_(|payload| begin_session(&self.session, self.nav.as_ref(), payload))
            .let_(|user| login::Output { user })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct AuthLogoutInteractor {
    pub session: Arc<SessionStore>,
    pub nav: Arc<dyn Navigator + Sync + Send>,
}
#[async_trait]
impl logout::Usecase for AuthLogoutInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: logout::Input) -> Result<logout::Output> {
        tracing::trace!("input - {:?}", data);

        let logout::Input {} = data;

        self.session.logout();
        self.nav.navigate(View::Login, None);

        logout::Output {}
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::entities::{Credentials, Registration, Token, UserId};
    use crate::gateway::mock::MockTransport;
    use crate::gateway::Method;
    use crate::presenters::impls::ret::ReturnNavigator;
    use crate::presenters::Visit;
    use crate::session::Session;
    use crate::storage::{KeyValueStorage, MemoryStorage, TOKEN_KEY};
    use crate::usecases::auth::login::Usecase as _;
    use crate::usecases::auth::logout::Usecase as _;
    use crate::usecases::auth::register::Usecase as _;

    struct Fixture {
        transport: Arc<MockTransport>,
        storage: Arc<MemoryStorage>,
        session: Arc<SessionStore>,
        nav: Arc<ReturnNavigator>,
        visits: tokio::sync::mpsc::UnboundedReceiver<Visit>,
    }

    fn fixture() -> Fixture {
        let (nav, visits) = ReturnNavigator::channel();
        let storage = Arc::new(MemoryStorage::new());

        Fixture {
            transport: Arc::new(MockTransport::new()),
            session: Arc::new(SessionStore::new(storage.clone())),
            storage,
            nav: Arc::new(nav),
            visits,
        }
    }

    impl Fixture {
        fn login(&self) -> AuthLoginInteractor {
            AuthLoginInteractor {
                gateway: ApiGateway::new(self.transport.clone()),
                session: self.session.clone(),
                nav: self.nav.clone(),
            }
        }

        fn register(&self) -> AuthRegisterInteractor {
            AuthRegisterInteractor {
                gateway: ApiGateway::new(self.transport.clone()),
                session: self.session.clone(),
                nav: self.nav.clone(),
            }
        }
    }

    fn alice_registration() -> register::Input {
        register::Input {
            registration: Registration {
                username: "alice".to_string(),
                full_name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: SecretString::from("pw".to_string()),
            },
        }
    }

    fn alice_reply() -> serde_json::Value {
        json!({
            "success": true,
            "data": { "user": { "id": "u1", "fullName": "Alice" }, "accessToken": "tok1" }
        })
    }

    #[tokio::test]
    async fn login_installs_session_and_goes_home() {
        let mut f = fixture();
        f.transport
            .reply(Method::Post, "/users/login", 200, alice_reply())
            .await;

        let out = f
            .login()
            .handle(login::Input {
                credentials: Credentials::new("alice", "pw"),
            })
            .await
            .unwrap();

        assert_eq!(out.user.id, UserId::from("u1"));
        assert_eq!(f.session.current_session().token().unwrap().expose(), "tok1");
        assert_eq!(f.visits.try_recv().unwrap().view, View::Home);
    }

    #[tokio::test]
    async fn blank_password_never_reaches_the_server() {
        let f = fixture();

        let err = f
            .login()
            .handle(login::Input {
                credentials: Credentials::new("alice", "  "),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::Validation("password is required.".to_string()));
        assert!(f.transport.sent().await.is_empty());
        assert_eq!(f.session.current_session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn unsuccessful_login_keeps_anonymous() {
        let f = fixture();
        f.transport
            .reply(
                Method::Post,
                "/users/login",
                401,
                json!({ "success": false, "message": "Invalid credentials" }),
            )
            .await;

        let err = f
            .login()
            .handle(login::Input {
                credentials: Credentials::new("alice", "nope"),
            })
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(f.session.current_session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn register_logs_straight_in() {
        let mut f = fixture();
        f.transport
            .reply(Method::Post, "/users/register", 201, alice_reply())
            .await;

        let out = f.register().handle(alice_registration()).await.unwrap();

        assert_eq!(out.user.id, UserId::from("u1"));
        match f.session.current_session() {
            Session::Authenticated { user, token } => {
                assert_eq!(user.id, UserId::from("u1"));
                assert_eq!(token, Token::new("tok1"));
            },
            Session::Anonymous => panic!("registration did not log in"),
        }
        assert_eq!(f.storage.get(TOKEN_KEY).unwrap(), Some("tok1".to_string()));
        assert_eq!(f.visits.try_recv().unwrap().view, View::Home);

        let body = f.transport.sent().await[0].body.clone().unwrap();
        assert_eq!(body["fullName"], "Alice");
        assert_eq!(body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn unsuccessful_register_keeps_anonymous() {
        let mut f = fixture();
        f.transport
            .reply(
                Method::Post,
                "/users/register",
                200,
                json!({ "success": false, "message": "Username already taken" }),
            )
            .await;

        let err = f.register().handle(alice_registration()).await.unwrap_err();

        assert_eq!(err.user_message(), "Username already taken");
        assert_eq!(f.session.current_session(), Session::Anonymous);
        assert_eq!(f.storage.get(TOKEN_KEY).unwrap(), None);
        assert!(f.visits.try_recv().is_err());
    }

    #[tokio::test]
    async fn register_rejects_bad_email() {
        let f = fixture();

        let err = f
            .register()
            .handle(register::Input {
                registration: Registration {
                    username: "alice".to_string(),
                    full_name: "Alice".to_string(),
                    email: "alice-at-example".to_string(),
                    password: SecretString::from("pw".to_string()),
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(f.transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn logout_goes_to_login() {
        let mut f = fixture();
        f.transport
            .reply(Method::Post, "/users/login", 200, alice_reply())
            .await;
        f.login()
            .handle(login::Input {
                credentials: Credentials::new("alice", "pw"),
            })
            .await
            .unwrap();
        let _ = f.visits.try_recv();

        AuthLogoutInteractor {
            session: f.session.clone(),
            nav: f.nav.clone(),
        }
        .handle(logout::Input {})
        .await
        .unwrap();

        assert_eq!(f.session.current_session(), Session::Anonymous);
        assert_eq!(f.visits.try_recv().unwrap().view, View::Login);
    }
}
