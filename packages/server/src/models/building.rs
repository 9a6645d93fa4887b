use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::building;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBuildingRequest {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub floor_count: i32,
}

pub fn validate_create_building(payload: &CreateBuildingRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() || payload.name.chars().count() > 256 {
        return Err(AppError::Validation("Name must be 1-256 characters".into()));
    }
    validate_coordinates(payload.longitude, payload.latitude)?;
    if payload.floor_count < 1 {
        return Err(AppError::Validation("Floor count must be >= 1".into()));
    }
    Ok(())
}

pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<(), AppError> {
    validate_longitude(longitude)?;
    validate_latitude(latitude)
}

pub fn validate_longitude(longitude: f64) -> Result<(), AppError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Validation(
            "Longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}

pub fn validate_latitude(latitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Validation(
            "Latitude must be between -90 and 90".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BuildingResponse {
    pub id: i32,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub floor_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<building::Model> for BuildingResponse {
    fn from(model: building::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            longitude: model.longitude,
            latitude: model.latitude,
            floor_count: model.floor_count,
            created_at: model.created_at,
        }
    }
}

/// One building in the map listing, with its fountain count computed by a
/// grouped LEFT JOIN.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct BuildingListItem {
    pub id: i32,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub floor_count: i32,
    pub fountain_count: i64,
    pub created_at: DateTime<Utc>,
}
