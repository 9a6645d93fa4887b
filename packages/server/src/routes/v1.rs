use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/buildings", building_routes())
        .nest("/fountains", fountain_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::sign_in))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::update_profile))
        .routes(routes!(handlers::auth::generate_forgot))
        .routes(routes!(handlers::auth::validate_forgot))
        .routes(routes!(handlers::auth::reset_password))
}

fn building_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::building::list_buildings,
            handlers::building::create_building
        ))
        .routes(routes!(handlers::building::get_building))
        .routes(routes!(handlers::building::list_building_fountains))
}

fn fountain_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::fountain::create_fountain))
        .routes(routes!(
            handlers::fountain::get_fountain,
            handlers::fountain::update_fountain,
            handlers::fountain::delete_fountain
        ))
        .routes(routes!(
            handlers::fountain::list_fountain_reviews,
            handlers::fountain::create_fountain_review
        ))
        .routes(routes!(handlers::fountain::toggle_like))
}
