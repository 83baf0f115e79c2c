use std::sync::Arc;

use blog_pudding::cmds::ShellCmd;
use blog_pudding::conductors::{Conductor, Response};
use blog_pudding::controllers::{FeedController, PostController};
use blog_pudding::entities::{PostId, Token, UserId, UserProfile};
use blog_pudding::errors::ClientError;
use blog_pudding::gateway::mock::MockTransport;
use blog_pudding::gateway::{ApiGateway, Method};
use blog_pudding::guard::View;
use blog_pudding::optimistic::Resolution;
use blog_pudding::presenters::impls::ret::{ReturnNavigator, ScriptedConfirm};
use blog_pudding::session::{Session, SessionStore};
use blog_pudding::storage::{KeyValueStorage, MemoryStorage, PROFILE_KEY, TOKEN_KEY};
use serde_json::{json, Value};

fn alice() -> UserProfile {
    UserProfile {
        id: UserId::from("u1"),
        username: "alice".to_string(),
        full_name: "Alice".to_string(),
        email: String::new(),
    }
}

fn login_reply() -> Value {
    json!({
        "success": true,
        "data": { "user": { "id": "u1", "fullName": "Alice" }, "accessToken": "tok1" }
    })
}

fn feed_reply() -> Value {
    json!({ "data": [
        { "_id": "p1", "title": "hello", "content": "first", "user": "u2", "likes": ["u2", "u3"] },
    ]})
}

fn detail_reply(id: &str, author: &str) -> Value {
    json!({ "data": {
        "_id": id,
        "title": format!("post {}", id),
        "content": "body",
        "user": { "_id": author, "fullName": "Bob" },
        "likes": []
    }})
}

struct Shell {
    transport: Arc<MockTransport>,
    storage: Arc<MemoryStorage>,
    confirm: Arc<ScriptedConfirm>,
    conductor: Conductor,
}

fn shell(answers: Vec<bool>) -> Shell {
    let transport = Arc::new(MockTransport::new());
    let storage = Arc::new(MemoryStorage::new());
    let confirm = Arc::new(ScriptedConfirm::answering(answers));

    let conductor = blog_pudding::with_parts(transport.clone(), storage.clone(), confirm.clone());

    Shell {
        transport,
        storage,
        confirm,
        conductor,
    }
}

impl Shell {
    async fn run(&mut self, cmd: ShellCmd) -> Vec<Response> { self.conductor.conduct(cmd).await }

    async fn login(&mut self) -> Vec<Response> {
        self.transport
            .reply(Method::Post, "/users/login", 200, login_reply())
            .await;

        self.run(ShellCmd::Login {
            username: "alice".to_string(),
            password: "pw".to_string(),
        })
        .await
    }
}

fn titles(responses: &[Response]) -> Vec<&str> {
    responses.iter().map(|r| r.title.as_str()).collect()
}

fn authenticated_session() -> (Arc<MockTransport>, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
    session.login(alice(), Token::new("tok1"));

    (Arc::new(MockTransport::new()), session)
}

#[tokio::test]
async fn login_installs_the_returned_session() {
    let mut sh = shell(vec![]);

    let out = sh.login().await;
    assert_eq!(titles(&out), vec!["logged in", "at /"]);

    let session = sh.conductor.session().current_session();
    assert_eq!(session.user().map(|u| &u.id), Some(&UserId::from("u1")));
    assert_eq!(session.user().map(|u| u.full_name.as_str()), Some("Alice"));
    assert_eq!(session.token(), Some(&Token::new("tok1")));
}

#[tokio::test]
async fn logout_leaves_exactly_the_empty_session() {
    let mut sh = shell(vec![]);
    sh.login().await;

    let out = sh.run(ShellCmd::Logout).await;
    assert_eq!(titles(&out), vec!["logged out", "at /login"]);

    assert_eq!(sh.conductor.session().current_session(), Session::Anonymous);
    assert_eq!(sh.storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(sh.storage.get(PROFILE_KEY).unwrap(), None);
}

#[tokio::test]
async fn stored_session_is_resumed() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(TOKEN_KEY, "tok1").unwrap();
    storage
        .set(PROFILE_KEY, &serde_json::to_string(&alice()).unwrap())
        .unwrap();

    let conductor = blog_pudding::with_parts(
        Arc::new(MockTransport::new()),
        storage,
        Arc::new(ScriptedConfirm::default()),
    );

    assert_eq!(conductor.session().current_session().user(), Some(&alice()));
}

#[tokio::test]
async fn guard_follows_the_session() {
    let mut sh = shell(vec![]);

    let out = sh
        .run(ShellCmd::Go {
            path: "/createPost".to_string(),
        })
        .await;
    assert_eq!(titles(&out), vec!["redirected to /login"]);
    assert_eq!(sh.conductor.location(), &View::Login);

    sh.login().await;
    let out = sh
        .run(ShellCmd::Go {
            path: "/createPost".to_string(),
        })
        .await;
    assert_eq!(titles(&out), vec!["new post"]);
    assert_eq!(sh.conductor.location(), &View::CreatePost);
}

#[tokio::test]
async fn like_shows_at_once_and_survives_confirmation() {
    let (transport, session) = authenticated_session();
    let (nav, _visits) = ReturnNavigator::channel();
    let feed = FeedController::new(ApiGateway::new(transport.clone()), session, Arc::new(nav));

    transport
        .reply(Method::Get, "/post/getallpost", 200, feed_reply())
        .await;
    let confirm = transport
        .defer(Method::Patch, "/post/toggle-like/p1")
        .await;
    feed.load().await.unwrap();

    let p1 = PostId::from("p1");
    let handle = feed.likes().toggle(&p1).unwrap();

    let shown = feed.likes().view(&p1).unwrap();
    assert_eq!((shown.is_liked(), shown.count), (true, 3));

    confirm.respond(200, json!({ "success": true }));
    assert_eq!(handle.await.unwrap(), Resolution::Confirmed);

    let shown = feed.likes().view(&p1).unwrap();
    assert_eq!((shown.is_liked(), shown.count), (true, 3));
}

#[tokio::test]
async fn failed_like_reverts_to_the_snapshot() {
    let (transport, session) = authenticated_session();
    let (nav, _visits) = ReturnNavigator::channel();
    let feed = FeedController::new(ApiGateway::new(transport.clone()), session, Arc::new(nav));

    transport
        .reply(Method::Get, "/post/getallpost", 200, feed_reply())
        .await;
    transport
        .fail(Method::Patch, "/post/toggle-like/p1", "connection refused")
        .await;
    feed.load().await.unwrap();

    let p1 = PostId::from("p1");
    let resolution = feed.likes().toggle(&p1).unwrap().await.unwrap();

    assert!(matches!(resolution, Resolution::RolledBack { .. }));
    let shown = feed.likes().view(&p1).unwrap();
    assert_eq!((shown.is_liked(), shown.count), (false, 2));
    assert_eq!(
        feed.likes().notice().as_deref(),
        Some("Could not update like status: connection refused")
    );
}

#[tokio::test]
async fn double_toggle_nets_out() {
    let (transport, session) = authenticated_session();
    let (nav, _visits) = ReturnNavigator::channel();
    let feed = FeedController::new(ApiGateway::new(transport.clone()), session, Arc::new(nav));

    transport
        .reply(Method::Get, "/post/getallpost", 200, feed_reply())
        .await;
    let first = transport.defer(Method::Patch, "/post/toggle-like/p1").await;
    let second = transport.defer(Method::Patch, "/post/toggle-like/p1").await;
    feed.load().await.unwrap();

    let p1 = PostId::from("p1");
    let h1 = feed.likes().toggle(&p1).unwrap();
    transport.wait_for_requests(2).await;
    let h2 = feed.likes().toggle(&p1).unwrap();
    transport.wait_for_requests(3).await;

    // the newer intent resolves first; the older one must not touch it
    second.respond(200, json!({ "success": true }));
    assert_eq!(h2.await.unwrap(), Resolution::Confirmed);
    first.respond(200, json!({ "success": true }));
    assert_eq!(h1.await.unwrap(), Resolution::Superseded);

    let shown = feed.likes().view(&p1).unwrap();
    assert_eq!((shown.is_liked(), shown.count), (false, 2));
    assert!(!shown.state.is_pending());
}

#[tokio::test]
async fn only_the_latest_target_is_applied() {
    let (transport, session) = authenticated_session();
    let (nav, _visits) = ReturnNavigator::channel();
    let post = PostController::new(
        ApiGateway::new(transport.clone()),
        session,
        Arc::new(nav),
        Arc::new(ScriptedConfirm::default()),
    );

    let a = transport.defer(Method::Get, "/post/getpostbyID/A").await;
    let b = transport.defer(Method::Get, "/post/getpostbyID/B").await;

    let load_a = tokio::spawn(post.load(PostId::from("A")));
    transport.wait_for_requests(1).await;
    let load_b = tokio::spawn(post.load(PostId::from("B")));
    transport.wait_for_requests(2).await;

    b.respond(200, detail_reply("B", "u1"));
    assert!(load_b.await.unwrap().is_ok());
    a.respond(200, detail_reply("A", "u1"));
    assert_eq!(load_a.await.unwrap(), Err(ClientError::Stale));

    assert_eq!(
        post.snapshot().post.map(|p| p.id),
        Some(PostId::from("B"))
    );
}

#[tokio::test]
async fn non_owner_is_not_offered_delete() {
    let mut sh = shell(vec![true]);
    sh.login().await;

    sh.transport
        .reply(Method::Get, "/post/getpostbyID/p1", 200, detail_reply("p1", "u2"))
        .await;
    let out = sh
        .run(ShellCmd::Show {
            id: "p1".to_string(),
        })
        .await;

    let actions = out[0]
        .fields
        .iter()
        .find(|(name, _)| name == "actions:")
        .map(|(_, v)| v.as_str());
    assert_eq!(actions, Some("like"));

    let out = sh
        .run(ShellCmd::Delete {
            id: "p1".to_string(),
        })
        .await;
    assert_eq!(titles(&out), vec!["error occurred"]);
    assert_eq!(out[0].description, "only the author can modify this post.");

    assert!(sh.confirm.asked().is_empty());
    assert!(sh
        .transport
        .sent()
        .await
        .iter()
        .all(|r| r.method != Method::Delete));
}

#[tokio::test]
async fn owner_deletes_after_confirming() {
    let mut sh = shell(vec![true]);
    sh.login().await;

    sh.transport
        .reply(Method::Get, "/post/getpostbyID/p1", 200, detail_reply("p1", "u1"))
        .await;
    sh.transport
        .reply(Method::Delete, "/post/deletpost/p1", 200, json!({ "success": true }))
        .await;

    let out = sh
        .run(ShellCmd::Delete {
            id: "p1".to_string(),
        })
        .await;

    assert_eq!(titles(&out), vec!["deleted post", "at /"]);
    assert_eq!(out[1].description, "Post successfully deleted!");
    assert_eq!(sh.confirm.asked().len(), 1);
}

#[tokio::test]
async fn non_owner_cannot_edit() {
    let mut sh = shell(vec![]);
    sh.login().await;

    sh.transport
        .reply(Method::Get, "/post/getpostbyID/p1", 200, detail_reply("p1", "u2"))
        .await;

    let out = sh
        .run(ShellCmd::Edit {
            id: "p1".to_string(),
            title: "taken over".to_string(),
            content: "body".to_string(),
        })
        .await;

    assert_eq!(titles(&out), vec!["error occurred"]);
    assert_eq!(out[0].description, "only the author can modify this post.");
    assert!(sh
        .transport
        .sent()
        .await
        .iter()
        .all(|r| r.method != Method::Put));
}

#[tokio::test]
async fn register_installs_the_returned_session() {
    let mut sh = shell(vec![]);
    sh.transport
        .reply(Method::Post, "/users/register", 201, login_reply())
        .await;

    let out = sh
        .run(ShellCmd::Register {
            username: "alice".to_string(),
            full_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await;

    assert_eq!(titles(&out), vec!["registered", "at /"]);
    assert_eq!(sh.storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
    assert_eq!(
        sh.conductor.session().current_session().token(),
        Some(&Token::new("tok1"))
    );
}

