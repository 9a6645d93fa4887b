use std::collections::{HashMap, HashSet};

use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{building, fountain, like, review};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::fountain::{
    CreateFountainRequest, FountainDetailResponse, FountainListItem, FountainResponse,
    LikeResponse, UpdateFountainRequest, validate_create_fountain, validate_update_fountain,
};
use crate::models::review::{CreateReviewRequest, ReviewResponse, validate_create_review};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Fountains",
    operation_id = "createFountain",
    summary = "Create a fountain on a building",
    request_body = CreateFountainRequest,
    responses(
        (status = 201, description = "Fountain created", body = FountainResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Building not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(building_id = payload.building_id))]
pub async fn create_fountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFountainRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_fountain(&payload)?;

    if building::Entity::find_by_id(payload.building_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "Building {} not found",
            payload.building_id
        )));
    }

    let new_fountain = fountain::ActiveModel {
        building_id: Set(payload.building_id),
        longitude: Set(payload.longitude),
        latitude: Set(payload.latitude),
        has_bottle_filler: Set(payload.has_bottle_filler),
        floor: Set(payload.floor),
        description: Set(payload.description.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_fountain.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(FountainResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Fountains",
    operation_id = "getFountain",
    summary = "Get a fountain with aggregates and reviews",
    description = "Returns the fountain, its building's name, the review and distinct-liker counts, whether the requesting user has liked it, and the review list (newest first).",
    params(("id" = i32, Path, description = "Fountain ID")),
    responses(
        (status = 200, description = "Fountain detail", body = FountainDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_fountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FountainDetailResponse>, AppError> {
    let model = find_fountain(&state.db, id).await?;

    let building_name = building::Entity::find_by_id(model.building_id)
        .one(&state.db)
        .await?
        .map(|b| b.name)
        .unwrap_or_default();

    let reviews = review::Entity::find()
        .filter(review::Column::FountainId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .all(&state.db)
        .await?;

    let like_count = like::Entity::find()
        .filter(like::Column::FountainId.eq(id))
        .count(&state.db)
        .await?;

    let liked = like::Entity::find_by_id((auth_user.user_id, id))
        .one(&state.db)
        .await?
        .is_some();

    Ok(Json(FountainDetailResponse {
        fountain: FountainResponse::from(model),
        building_name,
        review_count: reviews.len() as i64,
        like_count: like_count as i64,
        liked,
        reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Fountains",
    operation_id = "updateFountain",
    summary = "Update a fountain",
    description = "Updates location, floor, bottle filler flag, or description. Absent fields are left unchanged.",
    params(("id" = i32, Path, description = "Fountain ID")),
    request_body = UpdateFountainRequest,
    responses(
        (status = 200, description = "Fountain updated", body = FountainResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_fountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFountainRequest>,
) -> Result<Json<FountainResponse>, AppError> {
    validate_update_fountain(&payload)?;

    let existing = find_fountain(&state.db, id).await?;
    if payload == UpdateFountainRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: fountain::ActiveModel = existing.into();
    if let Some(longitude) = payload.longitude {
        active.longitude = Set(longitude);
    }
    if let Some(latitude) = payload.latitude {
        active.latitude = Set(latitude);
    }
    if let Some(has_bottle_filler) = payload.has_bottle_filler {
        active.has_bottle_filler = Set(has_bottle_filler);
    }
    if let Some(floor) = payload.floor {
        active.floor = Set(floor);
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Fountains",
    operation_id = "deleteFountain",
    summary = "Delete a fountain",
    description = "Deletes the fountain together with its reviews and likes in one transaction.",
    params(("id" = i32, Path, description = "Fountain ID")),
    responses(
        (status = 204, description = "Fountain deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_fountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_fountain(&txn, id).await?;

    review::Entity::delete_many()
        .filter(review::Column::FountainId.eq(id))
        .exec(&txn)
        .await?;
    like::Entity::delete_many()
        .filter(like::Column::FountainId.eq(id))
        .exec(&txn)
        .await?;
    fountain::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "listFountainReviews",
    summary = "List a fountain's reviews, newest first",
    params(("id" = i32, Path, description = "Fountain ID")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_fountain_reviews(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    find_fountain(&state.db, id).await?;

    let reviews = review::Entity::find()
        .filter(review::Column::FountainId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "createFountainReview",
    summary = "Review a fountain",
    description = "Creates a review scoped to the bearer identity. Ratings must be 1-5 and filter status 0-2. Reviews are immutable once created.",
    params(("id" = i32, Path, description = "Fountain ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn create_fountain_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_review(&payload)?;
    find_fountain(&state.db, id).await?;

    let new_review = review::ActiveModel {
        user_id: Set(auth_user.user_id),
        fountain_id: Set(id),
        comment: Set(payload.comment),
        taste: Set(payload.taste),
        temperature: Set(payload.temperature),
        flow: Set(payload.flow),
        filter_status: Set(payload.filter_status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_review.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Fountains",
    operation_id = "toggleLike",
    summary = "Toggle the current user's like on a fountain",
    description = "Deletes the like row if it exists, inserts it otherwise, inside a transaction with a row lock so rapid toggles stay consistent. Responds with the state after the toggle.",
    params(("id" = i32, Path, description = "Fountain ID")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Fountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn toggle_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let txn = state.db.begin().await?;

    find_fountain(&txn, id).await?;

    let existing = like::Entity::find_by_id((auth_user.user_id, id))
        .lock_exclusive()
        .one(&txn)
        .await?;

    let liked = match existing {
        Some(row) => {
            row.delete(&txn).await?;
            false
        }
        None => {
            let insert = like::ActiveModel {
                user_id: Set(auth_user.user_id),
                fountain_id: Set(id),
                created_at: Set(chrono::Utc::now()),
            }
            .insert(&txn)
            .await;
            match insert {
                Ok(_) => {}
                // A concurrent toggle won the insert; the row exists either way.
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {}
                Err(e) => return Err(e.into()),
            }
            true
        }
    };

    txn.commit().await?;
    Ok(Json(LikeResponse { liked }))
}

/// Per-fountain query-time aggregates for a set of fountains.
pub(crate) struct FountainAggregates {
    review_counts: HashMap<i32, i64>,
    like_counts: HashMap<i32, i64>,
    liked_by_user: HashSet<i32>,
}

impl FountainAggregates {
    pub(crate) fn decorate(&self, model: fountain::Model) -> FountainListItem {
        let id = model.id;
        FountainListItem {
            fountain: FountainResponse::from(model),
            review_count: self.review_counts.get(&id).copied().unwrap_or(0),
            like_count: self.like_counts.get(&id).copied().unwrap_or(0),
            liked: self.liked_by_user.contains(&id),
        }
    }
}

/// Load review counts, distinct-liker counts, and the requesting user's liked
/// set for the given fountains in three grouped queries.
pub(crate) async fn load_fountain_aggregates<C: ConnectionTrait>(
    conn: &C,
    fountain_ids: &[i32],
    user_id: i32,
) -> Result<FountainAggregates, AppError> {
    let review_counts = review::Entity::find()
        .select_only()
        .column(review::Column::FountainId)
        .column_as(review::Column::Id.count(), "count")
        .filter(review::Column::FountainId.is_in(fountain_ids.iter().copied()))
        .group_by(review::Column::FountainId)
        .into_tuple::<(i32, i64)>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    let like_counts = like::Entity::find()
        .select_only()
        .column(like::Column::FountainId)
        .column_as(like::Column::UserId.count(), "count")
        .filter(like::Column::FountainId.is_in(fountain_ids.iter().copied()))
        .group_by(like::Column::FountainId)
        .into_tuple::<(i32, i64)>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    let liked_by_user = like::Entity::find()
        .filter(like::Column::UserId.eq(user_id))
        .filter(like::Column::FountainId.is_in(fountain_ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.fountain_id)
        .collect();

    Ok(FountainAggregates {
        review_counts,
        like_counts,
        liked_by_user,
    })
}

pub(crate) async fn find_fountain<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<fountain::Model, AppError> {
    fountain::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fountain {id} not found")))
}
