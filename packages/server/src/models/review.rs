use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::review;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    pub comment: String,
    /// 1-5.
    pub taste: i32,
    /// 1-5.
    pub temperature: i32,
    /// 1-5.
    pub flow: i32,
    /// 0 = needs replacement, 1 = ok, 2 = good.
    pub filter_status: i32,
}

pub fn validate_create_review(payload: &CreateReviewRequest) -> Result<(), AppError> {
    for (value, dimension) in [
        (payload.taste, "Taste"),
        (payload.temperature, "Temperature"),
        (payload.flow, "Flow"),
    ] {
        if !(1..=5).contains(&value) {
            return Err(AppError::Validation(format!(
                "{dimension} must be between 1 and 5"
            )));
        }
    }
    if !(review::FILTER_NEEDS_REPLACEMENT..=review::FILTER_GOOD).contains(&payload.filter_status) {
        return Err(AppError::Validation(
            "Filter status must be 0 (needs replacement), 1 (ok), or 2 (good)".into(),
        ));
    }
    if payload.comment.chars().count() > 2048 {
        return Err(AppError::Validation(
            "Comment must be at most 2048 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub user_id: i32,
    pub fountain_id: i32,
    pub comment: String,
    pub taste: i32,
    pub temperature: i32,
    pub flow: i32,
    pub filter_status: i32,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewResponse {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            fountain_id: model.fountain_id,
            comment: model.comment,
            taste: model.taste,
            temperature: model.temperature,
            flow: model.flow,
            filter_status: model.filter_status,
            created_at: model.created_at,
        }
    }
}
