use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn a_review_is_scoped_to_the_bearer_identity() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    let me = app.get_with_token(routes::ME, &token).await;
    let my_id = me.body["id"].as_i64().unwrap();

    let res = app
        .post_with_token(
            &routes::fountain_reviews(fountain),
            &json!({
                "comment": "crisp and cold",
                "taste": 5,
                "temperature": 5,
                "flow": 4,
                "filter_status": 2,
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["user_id"], my_id);
    assert_eq!(res.body["fountain_id"], fountain);
    assert_eq!(res.body["taste"], 5);
    assert_eq!(res.body["filter_status"], 2);
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    for (taste, temperature, flow, filter_status) in
        [(0, 3, 3, 1), (3, 6, 3, 1), (3, 3, -2, 1), (3, 3, 3, 3)]
    {
        let res = app
            .post_with_token(
                &routes::fountain_reviews(fountain),
                &json!({
                    "comment": "",
                    "taste": taste,
                    "temperature": temperature,
                    "flow": flow,
                    "filter_status": filter_status,
                }),
                &token,
            )
            .await;

        assert_eq!(
            res.status, 400,
            "accepted ({taste}, {temperature}, {flow}, {filter_status})"
        );
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn reviews_list_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    for comment in ["oldest", "middle", "newest"] {
        let res = app
            .post_with_token(
                &routes::fountain_reviews(fountain),
                &json!({
                    "comment": comment,
                    "taste": 3,
                    "temperature": 3,
                    "flow": 3,
                    "filter_status": 1,
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201);
    }

    let res = app
        .get_with_token(&routes::fountain_reviews(fountain), &token)
        .await;

    assert_eq!(res.status, 200);
    let comments: Vec<&str> = res
        .body
        .as_array()
        .expect("array body")
        .iter()
        .map(|r| r["comment"].as_str().unwrap())
        .collect();
    assert_eq!(comments, ["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn reviewing_an_unknown_fountain_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;

    let res = app
        .post_with_token(
            &routes::fountain_reviews(999_999),
            &json!({
                "comment": "ghost fountain",
                "taste": 3,
                "temperature": 3,
                "flow": 3,
                "filter_status": 1,
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn reviewing_requires_authentication() {
    let app = TestApp::spawn().await;
    let token = app.register_and_sign_in("alice").await;
    let building = app.create_building(&token, "Library West").await;
    let fountain = app.create_fountain(&token, building).await;

    let res = app
        .post_without_token(
            &routes::fountain_reviews(fountain),
            &json!({
                "comment": "anon",
                "taste": 3,
                "temperature": 3,
                "flow": 3,
                "filter_status": 1,
            }),
        )
        .await;

    assert_eq!(res.status, 401);
}
