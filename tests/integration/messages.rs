use rocket::http::Status;
use crate::common::{
    create_message, create_user, db, follow_redirect, login, message_count, post_form, test_client,
};
use warbler::models::{message, user};

#[test]
fn test_add_message() {
    let client = test_client();
    let u = create_user(&client, "testuser");
    login(&client, "testuser");

    let res = post_form(&client, "/messages/new", &[("text", "Hello")]);
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(
        res.headers().get_one("Location"),
        Some(format!("/users/{}", u.id).as_str())
    );

    let msgs = message::list_by_owner(&db(&client).conn(), u.id).unwrap();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].text, "Hello");
}

#[test]
fn test_add_unauthorized() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = post_form(&client, "/messages/new", &[("text", "Hello")]);
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Access unauthorized"));
    assert_eq!(message_count(&client), 0);
}

#[test]
fn test_add_message_too_long() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    let long = "x".repeat(141);
    let res = post_form(&client, "/messages/new", &[("text", &long)]);
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Message must be 1-140 characters"));
    assert_eq!(message_count(&client), 0);
}

#[test]
fn test_new_message_form() {
    let client = test_client();
    create_user(&client, "testuser");

    let res = client.get("/messages/new").dispatch();
    let (_, html) = follow_redirect(&client, res);
    assert!(html.contains("Access unauthorized"));

    login(&client, "testuser");
    let res = client.get("/messages/new").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Add my message!"));
}

#[test]
fn test_message_show() {
    let client = test_client();
    let u = create_user(&client, "testuser");
    let id = create_message(&client, u.id, "This is a test message");
    login(&client, "testuser");

    let res = client.get(format!("/messages/{id}")).dispatch();
    assert_eq!(res.status(), Status::Ok);
    let html = res.into_string().unwrap();
    assert!(html.contains("This is a test message"));
    assert!(html.contains("@testuser"));
    assert!(html.contains(&format!("/messages/{id}/delete")));
}

#[test]
fn test_message_show_anonymous() {
    let client = test_client();
    let u = create_user(&client, "testuser");
    let id = create_message(&client, u.id, "Public words");

    let res = client.get(format!("/messages/{id}")).dispatch();
    assert_eq!(res.status(), Status::Ok);
    let html = res.into_string().unwrap();
    assert!(html.contains("Public words"));
    assert!(!html.contains("/delete"));
}

#[test]
fn test_invalid_message_show() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    let res = client.get("/messages/11111").dispatch();
    assert_eq!(res.status(), Status::NotFound);
}

#[test]
fn test_message_delete() {
    let client = test_client();
    let u = create_user(&client, "testuser");
    let id = create_message(&client, u.id, "This is a message");
    login(&client, "testuser");

    let res = client.post(format!("/messages/{id}/delete")).dispatch();
    let (status, _) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(message::find(&db(&client).conn(), id).unwrap().is_none());
}

#[test]
fn test_unauthorized_message_delete() {
    let client = test_client();
    let owner = create_user(&client, "testuser");
    create_user(&client, "unauthorized-user");
    let id = create_message(&client, owner.id, "This is a test message");
    login(&client, "unauthorized-user");

    let res = client.post(format!("/messages/{id}/delete")).dispatch();
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Access unauthorized"));
    assert!(message::find(&db(&client).conn(), id).unwrap().is_some());
}

#[test]
fn test_message_delete_no_authentication() {
    let client = test_client();
    let owner = create_user(&client, "testuser");
    let id = create_message(&client, owner.id, "This is a test message");

    let res = client.post(format!("/messages/{id}/delete")).dispatch();
    let (status, html) = follow_redirect(&client, res);
    assert_eq!(status, Status::Ok);
    assert!(html.contains("Access unauthorized"));
    assert!(message::find(&db(&client).conn(), id).unwrap().is_some());
}

#[test]
fn test_admin_can_delete_any_message() {
    let client = test_client();
    let owner = create_user(&client, "testuser");
    let admin = create_user(&client, "moderator");
    user::set_admin(&db(&client).conn(), admin.id, true).unwrap();
    let id = create_message(&client, owner.id, "Rule-breaking warble");
    login(&client, "moderator");

    let res = client.post(format!("/messages/{id}/delete")).dispatch();
    assert_eq!(res.status(), Status::SeeOther);
    assert!(message::find(&db(&client).conn(), id).unwrap().is_none());
}

#[test]
fn test_delete_missing_message() {
    let client = test_client();
    create_user(&client, "testuser");
    login(&client, "testuser");

    let res = client.post("/messages/55555/delete").dispatch();
    assert_eq!(res.status(), Status::NotFound);
}

#[test]
fn test_add_message_keeps_whitespace() {
    let client = test_client();
    let u = create_user(&client, "testuser");
    login(&client, "testuser");

    let res = post_form(&client, "/messages/new", &[("text", "  spaced out ")]);
    assert_eq!(res.status(), Status::SeeOther);

    let msgs = message::list_by_owner(&db(&client).conn(), u.id).unwrap();
    assert_eq!(msgs[0].text, "  spaced out ");
}
