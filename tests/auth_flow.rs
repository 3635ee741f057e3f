//! Registration, login, logout and the identity gate, driven over HTTP.

mod common;

use axum::http::{header, StatusCode};
use common::{body_text, location, session_cookie, TestApp};
use recipebox::auth::repo_types::User;

#[tokio::test]
async fn register_redirects_to_login_without_session() {
    let t = TestApp::new().await;

    let res = t.register("Alice", "alice@example.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));
    assert!(session_cookie(&res).is_none());
    assert_eq!(User::count(&t.db).await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_email_rerenders_form_and_keeps_first_user() {
    let t = TestApp::new().await;
    t.register("Alice", "alice@example.com", "pw1").await;

    let res = t.register("Mallory", "alice@example.com", "other").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("Email already exists"));
    assert!(html.contains(r#"action="/register""#));

    assert_eq!(User::count(&t.db).await.unwrap(), 1);
    let alice = User::find_by_email(&t.db, "alice@example.com").await.unwrap().unwrap();
    assert_eq!(alice.name, "Alice");

    // The original password still works.
    let res = t.login("alice@example.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn email_comparison_ignores_case_and_whitespace() {
    let t = TestApp::new().await;
    t.register("Alice", "alice@example.com", "pw1").await;

    let res = t.register("Alice2", "%20ALICE@Example.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Email already exists"));
    assert_eq!(User::count(&t.db).await.unwrap(), 1);
}

#[tokio::test]
async fn invalid_email_is_reported_inline() {
    let t = TestApp::new().await;

    let res = t.register("Alice", "not-an-email", "pw1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid email"));
    assert_eq!(User::count(&t.db).await.unwrap(), 0);
}

#[tokio::test]
async fn login_unknown_email_says_user_not_found() {
    let t = TestApp::new().await;

    let res = t.login("nobody@example.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_none());
    assert!(body_text(res).await.contains("User not found"));
}

#[tokio::test]
async fn login_wrong_password_never_creates_session() {
    let t = TestApp::new().await;
    t.register("Alice", "alice@example.com", "pw1").await;

    for attempt in ["pw2", "PW1", ""] {
        let res = t.login("alice@example.com", attempt).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(res).await.contains("Wrong password"));
    }
}

#[tokio::test]
async fn session_resolves_to_same_user_on_every_request() {
    let t = TestApp::new().await;
    t.register("Bob", "bob@example.com", "pw1").await;
    let (_alice, cookie) = t.signed_in("Alice", "alice@example.com").await;

    for _ in 0..3 {
        let res = t.get("/create", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains(r#"<span class="who">Alice</span>"#));
        assert!(!html.contains("Bob"));
    }
}

#[tokio::test]
async fn login_redirects_to_dashboard() {
    let t = TestApp::new().await;
    t.register("Alice", "alice@example.com", "pw1").await;

    let res = t.login("alice@example.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/"));
    let set_cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn logout_removes_cookie_and_redirects_to_login() {
    let t = TestApp::new().await;
    let (_, cookie) = t.signed_in("Alice", "alice@example.com").await;

    let res = t.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));
    let removal = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(removal.starts_with("session="));
    assert!(removal.contains("Max-Age=0"));
}

#[tokio::test]
async fn gate_sends_guests_to_login() {
    let t = TestApp::new().await;
    let id = uuid::Uuid::new_v4();

    let responses = [
        t.get("/create", None).await,
        t.post_multipart("/create", &[], None).await,
        t.get(&format!("/edit/{id}"), None).await,
        t.post_multipart(&format!("/edit/{id}"), &[], None).await,
        t.post_form(&format!("/delete/{id}"), "", None).await,
    ];
    for res in responses {
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res).as_deref(), Some("/login"));
    }
}

#[tokio::test]
async fn forged_session_cookie_is_treated_as_guest() {
    let t = TestApp::new().await;
    t.signed_in("Alice", "alice@example.com").await;

    let res = t.get("/create", Some("session=eyJhbGciOiJIUzI1NiJ9.e30.bad")).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));

    let res = t.get("/", Some("session=garbage")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains(r#"href="/login""#));
}

#[tokio::test]
async fn auth_pages_render_for_guests() {
    let t = TestApp::new().await;

    let login = body_text(t.get("/login", None).await).await;
    assert!(login.contains(r#"action="/login""#));
    let register = body_text(t.get("/register", None).await).await;
    assert!(register.contains(r#"name="name""#));
}
