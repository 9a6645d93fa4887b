use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{building, fountain};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::fountain::load_fountain_aggregates;
use crate::models::building::{
    BuildingListItem, BuildingResponse, CreateBuildingRequest, validate_create_building,
};
use crate::models::fountain::FountainListItem;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Buildings",
    operation_id = "listBuildings",
    summary = "List all buildings with fountain counts",
    description = "Public map listing. Each building appears exactly once with its fountain count computed by a grouped LEFT JOIN; review and like volume never affect the count.",
    responses(
        (status = 200, description = "Buildings", body = [BuildingListItem]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_buildings(
    State(state): State<AppState>,
) -> Result<Json<Vec<BuildingListItem>>, AppError> {
    let data = building::Entity::find()
        .left_join(fountain::Entity)
        .select_only()
        .column(building::Column::Id)
        .column(building::Column::Name)
        .column(building::Column::Longitude)
        .column(building::Column::Latitude)
        .column(building::Column::FloorCount)
        .column(building::Column::CreatedAt)
        .column_as(fountain::Column::Id.count(), "fountain_count")
        .group_by(building::Column::Id)
        .order_by_asc(building::Column::Name)
        .into_model::<BuildingListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Buildings",
    operation_id = "createBuilding",
    summary = "Create a building",
    request_body = CreateBuildingRequest,
    responses(
        (status = 201, description = "Building created", body = BuildingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_building(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBuildingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_building(&payload)?;

    let new_building = building::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        longitude: Set(payload.longitude),
        latitude: Set(payload.latitude),
        floor_count: Set(payload.floor_count),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_building.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(BuildingResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Buildings",
    operation_id = "getBuilding",
    summary = "Get a building with its fountain count",
    params(("id" = i32, Path, description = "Building ID")),
    responses(
        (status = 200, description = "Building detail", body = BuildingListItem),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Building not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_building(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BuildingListItem>, AppError> {
    let model = find_building(&state.db, id).await?;

    let fountain_count = fountain::Entity::find()
        .filter(fountain::Column::BuildingId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(BuildingListItem {
        id: model.id,
        name: model.name,
        longitude: model.longitude,
        latitude: model.latitude,
        floor_count: model.floor_count,
        fountain_count: fountain_count as i64,
        created_at: model.created_at,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/fountains",
    tag = "Buildings",
    operation_id = "listBuildingFountains",
    summary = "List a building's fountains with aggregates",
    description = "Returns the building's fountains, each with review count, distinct-liker count, and whether the requesting user has liked it.",
    params(("id" = i32, Path, description = "Building ID")),
    responses(
        (status = 200, description = "Fountains", body = [FountainListItem]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Building not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_building_fountains(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<FountainListItem>>, AppError> {
    find_building(&state.db, id).await?;

    let fountains = fountain::Entity::find()
        .filter(fountain::Column::BuildingId.eq(id))
        .order_by_asc(fountain::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = fountains.iter().map(|f| f.id).collect();
    let aggregates = load_fountain_aggregates(&state.db, &ids, auth_user.user_id).await?;

    Ok(Json(
        fountains
            .into_iter()
            .map(|f| aggregates.decorate(f))
            .collect(),
    ))
}

async fn find_building<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<building::Model, AppError> {
    building::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Building {id} not found")))
}
