use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::fountain;
use crate::error::AppError;

use super::building::{validate_coordinates, validate_latitude, validate_longitude};
use super::review::ReviewResponse;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateFountainRequest {
    pub building_id: i32,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub has_bottle_filler: bool,
    pub floor: i32,
    #[serde(default)]
    pub description: String,
}

pub fn validate_create_fountain(payload: &CreateFountainRequest) -> Result<(), AppError> {
    validate_coordinates(payload.longitude, payload.latitude)?;
    validate_floor(payload.floor)
}

fn validate_floor(floor: i32) -> Result<(), AppError> {
    if floor < 1 {
        return Err(AppError::Validation("Floor must be >= 1".into()));
    }
    Ok(())
}

/// PUT body; absent fields are left unchanged.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateFountainRequest {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub has_bottle_filler: Option<bool>,
    pub floor: Option<i32>,
    pub description: Option<String>,
}

pub fn validate_update_fountain(payload: &UpdateFountainRequest) -> Result<(), AppError> {
    if let Some(longitude) = payload.longitude {
        validate_longitude(longitude)?;
    }
    if let Some(latitude) = payload.latitude {
        validate_latitude(latitude)?;
    }
    if let Some(floor) = payload.floor {
        validate_floor(floor)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FountainResponse {
    pub id: i32,
    pub building_id: i32,
    pub longitude: f64,
    pub latitude: f64,
    pub has_bottle_filler: bool,
    pub floor: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<fountain::Model> for FountainResponse {
    fn from(model: fountain::Model) -> Self {
        Self {
            id: model.id,
            building_id: model.building_id,
            longitude: model.longitude,
            latitude: model.latitude,
            has_bottle_filler: model.has_bottle_filler,
            floor: model.floor,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

/// One fountain in a building listing, with query-time aggregates.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FountainListItem {
    #[serde(flatten)]
    pub fountain: FountainResponse,
    pub review_count: i64,
    /// Distinct likers; one like per user per fountain.
    pub like_count: i64,
    /// Whether the requesting user has liked this fountain.
    pub liked: bool,
}

/// Full fountain detail: base fields, the containing building's name,
/// aggregates, and the review list (newest first).
#[derive(Serialize, utoipa::ToSchema)]
pub struct FountainDetailResponse {
    #[serde(flatten)]
    pub fountain: FountainResponse,
    pub building_name: String,
    pub review_count: i64,
    pub like_count: i64,
    pub liked: bool,
    pub reviews: Vec<ReviewResponse>,
}

/// Response body for the like toggle; reports the state after the toggle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
}
