use rocket::http::Status;
use crate::common::{
    create_message, create_user, db, follow_redirect, login, post_form, test_client,
};
use warbler::models::{follows, message, user};

#[test]
fn test_edit_profile_form() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    let res = client.get("/users/profile").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let html = res.into_string().unwrap();
    assert!(html.contains("Edit Your Profile."));
    assert!(html.contains("value=\"testuser\""));
    assert!(html.contains("testuser@test.com"));
}

#[test]
fn test_edit_profile_requires_login() {
    let client = test_client();
    let res = client.get("/users/profile").dispatch();
    let (_, html) = follow_redirect(&client, res);
    assert!(html.contains("Access unauthorized"));
}

#[test]
fn test_edit_profile() {
    let client = test_client();
    let me = create_user(&client, "testuser");
    login(&client, "testuser");

    let res = post_form(
        &client,
        "/users/profile",
        &[
            ("username", "testuser"),
            ("email", "testuser@test.com"),
            ("image_url", "/static/images/new.png"),
            ("bio", "Birds all day"),
            ("location", "Lisbon"),
            ("password", "testuserpassword"),
        ],
    );
    assert_eq!(
        res.headers().get_one("Location"),
        Some(format!("/users/{}", me.id).as_str())
    );
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Birds all day"));
    assert!(html.contains("Lisbon"));

    let updated = user::find(&db(&client).conn(), me.id).unwrap().unwrap();
    assert_eq!(updated.image_url, "/static/images/new.png");
    assert_eq!(updated.header_image_url, me.header_image_url);
}

#[test]
fn test_edit_profile_wrong_password() {
    let client = test_client();
    let me = create_user(&client, "testuser");
    login(&client, "testuser");

    let res = post_form(
        &client,
        "/users/profile",
        &[("username", "renamed"), ("password", "not-my-password")],
    );
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Wrong password."));

    let unchanged = user::find(&db(&client).conn(), me.id).unwrap().unwrap();
    assert_eq!(unchanged.username, "testuser");
}

#[test]
fn test_edit_profile_taken_username() {
    let client = test_client();
    create_user(&client, "testuser");
    create_user(&client, "irinazay");
    login(&client, "testuser");

    let res = post_form(
        &client,
        "/users/profile",
        &[("username", "irinazay"), ("password", "testuserpassword")],
    );
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Username already taken"));
}

#[test]
fn test_delete_user() {
    let client = test_client();
    let me = create_user(&client, "testuser");
    let other = create_user(&client, "irinazay");
    create_message(&client, me.id, "soon gone");
    follows::follow(&db(&client).conn(), other.id, me.id).unwrap();
    login(&client, "testuser");

    let res = client.post("/users/delete").dispatch();
    assert_eq!(res.headers().get_one("Location"), Some("/signup"));
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Your account has been deleted."));

    let html = client.get("/users").dispatch().into_string().unwrap();
    assert!(!html.contains("@testuser"));
    assert!(html.contains("@irinazay"));

    let conn = db(&client).conn();
    assert!(message::list_by_owner(&conn, me.id).unwrap().is_empty());
    assert_eq!(user::stats(&conn, other.id).unwrap().following, 0);
}

#[test]
fn test_delete_user_requires_login() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = client.post("/users/delete").dispatch();
    let (_, html) = follow_redirect(&client, res);
    assert!(html.contains("Access unauthorized"));
    assert!(user::find_by_username(&db(&client).conn(), "testuser").unwrap().is_some());
}
