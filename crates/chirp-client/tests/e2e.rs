use std::sync::Arc;

use chirp_api::{AppStateInner, AuthConfig};
use chirp_client::{ApiClient, AuthPhase, FeedScreen, MemoryTokenStore, Session, TokenStore};
use chirp_db::Database;

/// Serve the real API on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let db = Database::open_in_memory().unwrap();
    let state = Arc::new(AppStateInner {
        db,
        auth: AuthConfig::dev("e2e-secret"),
    });
    let app = chirp_api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn register_post_and_read_the_feed() {
    let base = spawn_server().await;

    let mut session = Session::new(ApiClient::new(base), MemoryTokenStore::default());

    let health = session.api().health().await.unwrap();
    assert!(health.success);

    session.register("alice", "secret1").await.unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.phase(), &AuthPhase::Idle);
    assert_eq!(session.current_user().unwrap().username, "alice");

    let created = session.api().create_post("hello world").await.unwrap();
    assert_eq!(created.post.content, "hello world");
    assert_eq!(created.post.username, "alice");

    let mut feed = FeedScreen::new();
    feed.refresh(session.api()).await.unwrap();
    assert_eq!(feed.posts().len(), 1);
    assert_eq!(feed.posts()[0].content, "hello world");

    // A second post is prepended optimistically, no re-fetch needed.
    let second = session.api().create_post("again").await.unwrap();
    feed.prepend(second.post);
    assert_eq!(feed.posts()[0].content, "again");
}

#[tokio::test]
async fn failed_login_surfaces_the_server_message() {
    let base = spawn_server().await;

    let mut session = Session::new(ApiClient::new(base), MemoryTokenStore::default());
    let err = session.login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(
        session.phase(),
        &AuthPhase::Failed("Invalid credentials".to_string())
    );
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn restore_accepts_a_real_token_and_discards_a_mock_one() {
    let base = spawn_server().await;

    // Log in once so a real token lands in the store.
    let store = MemoryTokenStore::default();
    let mut session = Session::new(ApiClient::new(base.clone()), store);
    session.register("alice", "secret1").await.unwrap();
    let real_token = session.api().token().unwrap().to_string();

    // A fresh session restores from the stored token alone.
    let store = MemoryTokenStore::default();
    store.save(&real_token);
    let mut restored = Session::new(ApiClient::new(base.clone()), store);
    assert!(restored.restore().await);
    assert_eq!(restored.current_user().unwrap().username, "alice");

    // A wallet-mock placeholder token is rejected server-side and silently
    // dropped; the session falls back to logged-out.
    let store = MemoryTokenStore::default();
    store.save("wallet_token_1700000000000");
    let mut mock = Session::new(ApiClient::new(base), store);
    assert!(!mock.restore().await);
    assert!(!mock.is_logged_in());
    assert!(mock.api().token().is_none());
}

#[tokio::test]
async fn logout_then_login_again() {
    let base = spawn_server().await;

    let mut session = Session::new(ApiClient::new(base), MemoryTokenStore::default());
    session.register("alice", "secret1").await.unwrap();

    session.logout();
    assert!(!session.is_logged_in());
    assert!(session.api().token().is_none());

    session.login("alice", "secret1").await.unwrap();
    assert!(session.is_logged_in());

    let me = session.api().verify().await.unwrap();
    assert_eq!(me.user.username, "alice");
}

#[tokio::test]
async fn per_user_feed_through_the_client() {
    let base = spawn_server().await;

    let mut alice = Session::new(ApiClient::new(base.clone()), MemoryTokenStore::default());
    alice.register("alice", "secret1").await.unwrap();
    let alice_id = alice.current_user().unwrap().id;

    let mut bob = Session::new(ApiClient::new(base), MemoryTokenStore::default());
    bob.register("bobby", "secret2").await.unwrap();

    alice.api().create_post("alice speaks").await.unwrap();
    bob.api().create_post("bobby speaks").await.unwrap();

    let feed = bob.api().posts_by_user(alice_id).await.unwrap();
    assert_eq!(feed.posts.len(), 1);
    assert_eq!(feed.posts[0].username, "alice");
}
