// ABOUTME: Integration tests for user accounts
// ABOUTME: Unique email/username enforcement, avatar, and password hash updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use plateful::database::test_utils::create_test_db;
use plateful::errors::ErrorCode;
use plateful::models::User;
use uuid::Uuid;

fn build_user(email: &str, username: &str) -> User {
    User::new(
        email.to_owned(),
        username.to_owned(),
        "Test".to_owned(),
        "User".to_owned(),
        "hash".to_owned(),
    )
}

#[tokio::test]
async fn test_create_and_fetch_user() {
    let db = create_test_db().await.unwrap();
    let user = build_user("alice@example.com", "alice");
    let id = db.create_user(&user).await.unwrap();

    let by_id = db.get_user_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");
    assert!(by_id.avatar.is_none());

    let by_email = db.get_user_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, id);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let db = create_test_db().await.unwrap();
    db.create_user(&build_user("alice@example.com", "alice"))
        .await
        .unwrap();

    let err = db
        .create_user(&build_user("alice@example.com", "alice2"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyExists);
    assert!(err.message.contains("email"));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let db = create_test_db().await.unwrap();
    db.create_user(&build_user("alice@example.com", "alice"))
        .await
        .unwrap();

    let err = db
        .create_user(&build_user("alice2@example.com", "alice"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyExists);
    assert!(err.message.contains("username"));
}

#[tokio::test]
async fn test_list_users_ordered_by_username() {
    let db = create_test_db().await.unwrap();
    db.create_user(&build_user("carol@example.com", "carol"))
        .await
        .unwrap();
    db.create_user(&build_user("alice@example.com", "alice"))
        .await
        .unwrap();
    db.create_user(&build_user("bob@example.com", "bob"))
        .await
        .unwrap();

    let usernames: Vec<String> = db
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(usernames, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_set_and_clear_avatar() {
    let db = create_test_db().await.unwrap();
    let id = db
        .create_user(&build_user("alice@example.com", "alice"))
        .await
        .unwrap();

    db.update_avatar(id, Some("users/avatars/alice.png"))
        .await
        .unwrap();
    let user = db.get_user_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.avatar.as_deref(), Some("users/avatars/alice.png"));

    db.update_avatar(id, None).await.unwrap();
    let user = db.get_user_by_id(id).await.unwrap().unwrap();
    assert!(user.avatar.is_none());
}

#[tokio::test]
async fn test_avatar_update_for_missing_user() {
    let db = create_test_db().await.unwrap();
    let err = db
        .update_avatar(Uuid::new_v4(), Some("users/avatars/ghost.png"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_update_password_hash() {
    let db = create_test_db().await.unwrap();
    let id = db
        .create_user(&build_user("alice@example.com", "alice"))
        .await
        .unwrap();

    db.update_password_hash(id, "new-hash").await.unwrap();
    let user = db.get_user_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");
}

#[tokio::test]
async fn test_delete_missing_user() {
    let db = create_test_db().await.unwrap();
    let err = db.delete_user(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}
