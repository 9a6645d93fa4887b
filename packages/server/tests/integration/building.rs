use serde_json::json;

use crate::common::{TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn the_building_list_is_public() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::BUILDINGS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }

    #[tokio::test]
    async fn each_building_appears_once_with_its_exact_fountain_count() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;

        let library = app.create_building(&token, "Library West").await;
        let union = app.create_building(&token, "Reitz Union").await;

        for _ in 0..3 {
            app.create_fountain(&token, library).await;
        }

        // Review and like volume must not distort the counts.
        let fountain = app.create_fountain(&token, union).await;
        for user in ["bob", "carol", "dave"] {
            let other = app.register_and_sign_in(user).await;
            let res = app
                .post_with_token(
                    &routes::fountain_reviews(fountain),
                    &json!({
                        "comment": "fine",
                        "taste": 4,
                        "temperature": 4,
                        "flow": 4,
                        "filter_status": 2,
                    }),
                    &other,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
            let res = app
                .post_with_token(&routes::fountain_like(fountain), &json!({}), &other)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app.get_without_token(routes::BUILDINGS).await;
        assert_eq!(res.status, 200);

        let buildings = res.body.as_array().expect("array body");
        assert_eq!(buildings.len(), 2);

        let count_for = |name: &str| {
            buildings
                .iter()
                .find(|b| b["name"] == name)
                .unwrap_or_else(|| panic!("{name} missing from listing"))["fountain_count"]
                .as_i64()
                .unwrap()
        };
        assert_eq!(count_for("Library West"), 3);
        assert_eq!(count_for("Reitz Union"), 1);
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn creating_a_building_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::BUILDINGS,
                &json!({
                    "name": "Library West",
                    "longitude": -82.35,
                    "latitude": 29.65,
                    "floor_count": 6,
                }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn a_blank_name_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;

        let res = app
            .post_with_token(
                routes::BUILDINGS,
                &json!({
                    "name": "   ",
                    "longitude": -82.35,
                    "latitude": 29.65,
                    "floor_count": 6,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn out_of_range_coordinates_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;

        let res = app
            .post_with_token(
                routes::BUILDINGS,
                &json!({
                    "name": "Nowhere Hall",
                    "longitude": -482.35,
                    "latitude": 29.65,
                    "floor_count": 6,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn the_detail_view_requires_authentication() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;
        let id = app.create_building(&token, "Library West").await;

        let res = app.get_without_token(&routes::building(id)).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn the_detail_view_includes_the_fountain_count() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;
        let id = app.create_building(&token, "Library West").await;
        app.create_fountain(&token, id).await;
        app.create_fountain(&token, id).await;

        let res = app.get_with_token(&routes::building(id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Library West");
        assert_eq!(res.body["fountain_count"], 2);
    }

    #[tokio::test]
    async fn an_unknown_building_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;

        let res = app.get_with_token(&routes::building(999_999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod fountains_listing {
    use super::*;

    #[tokio::test]
    async fn fountains_carry_aggregates_and_the_callers_liked_flag() {
        let app = TestApp::spawn().await;
        let alice = app.register_and_sign_in("alice").await;
        let bob = app.register_and_sign_in("bob").await;

        let building = app.create_building(&alice, "Library West").await;
        let liked_fountain = app.create_fountain(&alice, building).await;
        let plain_fountain = app.create_fountain(&alice, building).await;

        let res = app
            .post_with_token(
                &routes::fountain_reviews(liked_fountain),
                &json!({
                    "comment": "cold!",
                    "taste": 5,
                    "temperature": 5,
                    "flow": 4,
                    "filter_status": 2,
                }),
                &bob,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        for token in [&alice, &bob] {
            let res = app
                .post_with_token(&routes::fountain_like(liked_fountain), &json!({}), token)
                .await;
            assert_eq!(res.status, 200);
        }

        let res = app
            .get_with_token(&routes::building_fountains(building), &alice)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let fountains = res.body.as_array().expect("array body");
        assert_eq!(fountains.len(), 2);

        let item = |id: i64| {
            fountains
                .iter()
                .find(|f| f["id"] == id)
                .unwrap_or_else(|| panic!("fountain {id} missing"))
        };

        let liked = item(liked_fountain);
        assert_eq!(liked["review_count"], 1);
        assert_eq!(liked["like_count"], 2);
        assert_eq!(liked["liked"], true);

        let plain = item(plain_fountain);
        assert_eq!(plain["review_count"], 0);
        assert_eq!(plain["like_count"], 0);
        assert_eq!(plain["liked"], false);
    }

    #[tokio::test]
    async fn an_unknown_building_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.register_and_sign_in("alice").await;

        let res = app
            .get_with_token(&routes::building_fountains(999_999), &token)
            .await;

        assert_eq!(res.status, 404);
    }
}
