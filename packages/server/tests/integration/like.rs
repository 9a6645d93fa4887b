use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use server::entity::like;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn toggling_reports_the_new_state() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    let on = app
        .post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    assert_eq!(on.status, 200, "{}", on.text);
    assert_eq!(on.body["liked"], true);

    let off = app
        .post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    assert_eq!(off.status, 200);
    assert_eq!(off.body["liked"], false);
}

#[tokio::test]
async fn a_double_toggle_restores_the_original_state() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    let rows = || async {
        like::Entity::find()
            .filter(like::Column::FountainId.eq(fountain as i32))
            .count(&app.db)
            .await
            .unwrap()
    };

    assert_eq!(rows().await, 0);
    app.post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    app.post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    assert_eq!(rows().await, 0);

    // And from the liked side.
    app.post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    assert_eq!(rows().await, 1);
    app.post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    app.post_with_token(&routes::fountain_like(fountain), &json!({}), &token)
        .await;
    assert_eq!(rows().await, 1);
}

#[tokio::test]
async fn the_like_count_is_one_per_distinct_user() {
    let app = TestApp::spawn().await;
    let alice = app.register_and_sign_in("alice").await;
    let bob = app.register_and_sign_in("bob").await;
    let building = app.create_building(&alice, "Library West").await;
    let fountain = app.create_fountain(&alice, building).await;

    for token in [&alice, &bob] {
        let res = app
            .post_with_token(&routes::fountain_like(fountain), &json!({}), token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["liked"], true);
    }

    let res = app.get_with_token(&routes::fountain(fountain), &alice).await;
    assert_eq!(res.body["like_count"], 2);
}

#[tokio::test]
async fn liking_an_unknown_fountain_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;

    let res = app
        .post_with_token(&routes::fountain_like(999_999), &json!({}), &token)
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn liking_requires_authentication() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    let res = app
        .post_without_token(&routes::fountain_like(fountain), &json!({}))
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
