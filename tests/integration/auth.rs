use rocket::http::Status;
use crate::common::{create_user, db, follow_redirect, login, post_form, test_client};
use warbler::models::user;

// --- Signup ---

#[test]
fn test_signup_form() {
    let client = test_client();
    let res = client.get("/signup").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Join Warbler today."));
}

#[test]
fn test_signup_logs_in() {
    let client = test_client();
    let res = post_form(
        &client,
        "/signup",
        &[("username", "testuser"), ("email", "test@test.com"), ("password", "testuser")],
    );
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("@testuser"));

    let stored = user::find_by_username(&db(&client).conn(), "testuser")
        .unwrap()
        .unwrap();
    assert_eq!(stored.email, "test@test.com");
    assert_ne!(stored.password, "testuser");
}

#[test]
fn test_signup_duplicate_username() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = post_form(
        &client,
        "/signup",
        &[("username", "testuser"), ("email", "new@test.com"), ("password", "password")],
    );
    assert_eq!(res.status(), Status::Ok);
    let html = res.into_string().unwrap();
    assert!(html.contains("Username already taken"));
    assert!(html.contains("new@test.com"));
}

#[test]
fn test_signup_short_password() {
    let client = test_client();
    let res = post_form(
        &client,
        "/signup",
        &[("username", "shorty"), ("email", "shorty@test.com"), ("password", "abc")],
    );
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Password must be at least 6 characters"));
    assert!(user::find_by_username(&db(&client).conn(), "shorty").unwrap().is_none());
}

#[test]
fn test_signup_missing_fields() {
    let client = test_client();
    let res = post_form(&client, "/signup", &[("password", "password")]);
    assert_eq!(res.status(), Status::Ok);
    let html = res.into_string().unwrap();
    assert!(html.contains("Username is required"));
    assert!(html.contains("E-mail is required"));
}

// --- Login / Logout ---

#[test]
fn test_login_greets_user() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = post_form(
        &client,
        "/login",
        &[("username", "testuser"), ("password", "testuserpassword")],
    );
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Hello, testuser!"));
}

#[test]
fn test_login_wrong_password() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = post_form(
        &client,
        "/login",
        &[("username", "testuser"), ("password", "wrongpassword")],
    );
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Invalid credentials."));

    // Still anonymous
    let res = client.get("/messages/new").dispatch();
    assert_eq!(res.status(), Status::SeeOther);
}

#[test]
fn test_login_unknown_user() {
    let client = test_client();
    let res = post_form(
        &client,
        "/login",
        &[("username", "nobody"), ("password", "password")],
    );
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Invalid credentials."));
}

#[test]
fn test_logged_in_user_skips_forms() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    assert_eq!(client.get("/login").dispatch().status(), Status::SeeOther);
    assert_eq!(client.get("/signup").dispatch().status(), Status::SeeOther);
}

#[test]
fn test_logout() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    let res = client.get("/logout").dispatch();
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("You have successfully logged out."));

    let res = client.get("/messages/new").dispatch();
    let (_, html) = follow_redirect(&client, res);
    assert!(html.contains("Access unauthorized"));
}
