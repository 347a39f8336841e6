// ABOUTME: Integration tests for recipe CRUD and the quantified ingredient list
// ABOUTME: Validation rules, newest-first ordering, and atomic line replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, Utc};
use plateful::database::test_utils::create_test_db;
use plateful::database::Database;
use plateful::errors::ErrorCode;
use plateful::models::{IngredientAmount, Recipe, User};
use uuid::Uuid;

async fn seed_user(db: &Database, username: &str) -> Uuid {
    let user = User::new(
        format!("{username}@example.com"),
        username.to_owned(),
        "Test".to_owned(),
        "User".to_owned(),
        "hash".to_owned(),
    );
    db.create_user(&user).await.unwrap()
}

async fn seed_ingredient(db: &Database, name: &str) -> i64 {
    db.find_or_create_ingredient(name, "g").await.unwrap().id
}

fn build_recipe(author_id: Uuid, name: &str) -> Recipe {
    Recipe::new(
        author_id,
        name.to_owned(),
        "recipes/images/test.png".to_owned(),
        "Test instructions".to_owned(),
        30,
    )
}

#[tokio::test]
async fn test_create_and_get_recipe() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let id = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap();

    let fetched = db.get_recipe(id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Bread");
    assert_eq!(fetched.author_id, author);
    assert_eq!(fetched.cooking_time, 30);

    let lines = db.get_recipe_ingredients(id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].ingredient.name, "Flour");
    assert_eq!(lines[0].amount, 500);
}

#[tokio::test]
async fn test_create_rejects_zero_cooking_time() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let mut recipe = build_recipe(author, "Bread");
    recipe.cooking_time = 0;

    let err = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_create_rejects_zero_amount() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let err = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 0 }])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_create_rejects_empty_ingredient_list() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;

    let recipe = build_recipe(author, "Bread");
    let err = db.create_recipe(&recipe, &[]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_create_rejects_duplicate_ingredient() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let err = db
        .create_recipe(
            &recipe,
            &[
                IngredientAmount { id: flour, amount: 100 },
                IngredientAmount { id: flour, amount: 200 },
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_create_rejects_unknown_ingredient() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;

    let recipe = build_recipe(author, "Bread");
    let err = db
        .create_recipe(&recipe, &[IngredientAmount { id: 999, amount: 100 }])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_list_recipes_newest_first() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let base = Utc::now();
    for (offset, name) in [(2, "Oldest"), (1, "Middle"), (0, "Newest")] {
        let mut recipe = build_recipe(author, name);
        recipe.created_at = base - Duration::hours(offset);
        db.create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 100 }])
            .await
            .unwrap();
    }

    let names: Vec<String> = db
        .list_recipes(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn test_list_recipes_filtered_by_author() {
    let db = create_test_db().await.unwrap();
    let alice = seed_user(&db, "alice").await;
    let bob = seed_user(&db, "bob").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let amounts = [IngredientAmount { id: flour, amount: 100 }];
    db.create_recipe(&build_recipe(alice, "Bread"), &amounts)
        .await
        .unwrap();
    db.create_recipe(&build_recipe(bob, "Cake"), &amounts)
        .await
        .unwrap();

    let listed = db.list_recipes(Some(alice)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Bread");

    assert_eq!(db.count_recipes_by_author(bob).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_by_author_respects_limit() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    for i in 0..4 {
        db.create_recipe(
            &build_recipe(author, &format!("Recipe {i}")),
            &[IngredientAmount { id: flour, amount: 100 }],
        )
        .await
        .unwrap();
    }

    assert_eq!(
        db.list_recipes_by_author(author, Some(2)).await.unwrap().len(),
        2
    );
    assert_eq!(
        db.list_recipes_by_author(author, None).await.unwrap().len(),
        4
    );
}

#[tokio::test]
async fn test_update_replaces_ingredient_lines() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;
    let sugar = seed_ingredient(&db, "Sugar").await;

    let recipe = build_recipe(author, "Bread");
    let id = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap();

    db.update_recipe(
        id,
        "Sweet bread",
        "recipes/images/sweet.png",
        "Mix, sweeten, bake",
        45,
        &[IngredientAmount { id: sugar, amount: 50 }],
    )
    .await
    .unwrap();

    let fetched = db.get_recipe(id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Sweet bread");
    assert_eq!(fetched.cooking_time, 45);

    let lines = db.get_recipe_ingredients(id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].ingredient.name, "Sugar");
    assert_eq!(lines[0].amount, 50);
}

#[tokio::test]
async fn test_update_preserves_author_and_created_at() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let id = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap();
    let before = db.get_recipe(id).await.unwrap().unwrap();

    db.update_recipe(
        id,
        "Bread v2",
        &recipe.image,
        &recipe.text,
        60,
        &[IngredientAmount { id: flour, amount: 600 }],
    )
    .await
    .unwrap();

    let after = db.get_recipe(id).await.unwrap().unwrap();
    assert_eq!(after.author_id, before.author_id);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn test_update_missing_recipe() {
    let db = create_test_db().await.unwrap();
    seed_user(&db, "alice").await;
    let db_flour = seed_ingredient(&db, "Flour").await;

    let err = db
        .update_recipe(
            Uuid::new_v4(),
            "Ghost",
            "recipes/images/ghost.png",
            "Does not exist",
            10,
            &[IngredientAmount { id: db_flour, amount: 1 }],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_delete_recipe_removes_ingredient_lines() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let id = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap();

    db.delete_recipe(id).await.unwrap();

    assert!(db.get_recipe(id).await.unwrap().is_none());
    assert!(db.get_recipe_ingredients(id).await.unwrap().is_empty());

    let err = db.delete_recipe(id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_deleting_author_removes_recipes() {
    let db = create_test_db().await.unwrap();
    let author = seed_user(&db, "alice").await;
    let flour = seed_ingredient(&db, "Flour").await;

    let recipe = build_recipe(author, "Bread");
    let id = db
        .create_recipe(&recipe, &[IngredientAmount { id: flour, amount: 500 }])
        .await
        .unwrap();

    db.delete_user(author).await.unwrap();
    assert!(db.get_recipe(id).await.unwrap().is_none());
}
