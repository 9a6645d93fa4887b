use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Email address, unique per account.
    #[schema(example = "alice@ufl.edu")]
    pub email: String,
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Display name.
    #[schema(example = "Alice Wonder")]
    pub name: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&payload.email)?;
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.chars().count() <= 254
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if !valid {
        return Err(AppError::Validation("Email address is not valid".into()));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for sign-in. Either `email` or `username` identifies the
/// account; both present prefers `email`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    #[schema(example = "alice@ufl.edu")]
    pub email: Option<String>,
    #[schema(example = "alice_wonder")]
    pub username: Option<String>,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_sign_in_request(payload: &SignInRequest) -> Result<(), AppError> {
    // A blank email counts as absent, so the username can still identify
    // the account.
    let has_identifier = [payload.email.as_deref(), payload.username.as_deref()]
        .into_iter()
        .flatten()
        .any(|s| !s.trim().is_empty());
    if !has_identifier {
        return Err(AppError::Validation(
            "Either email or username must be provided".into(),
        ));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful sign-in response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignInResponse {
    /// JWT bearer token carrying the public profile fields.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// A user's public profile, returned by register, profile update, and `me`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    /// User ID.
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice@ufl.edu")]
    pub email: String,
    #[schema(example = "alice_wonder")]
    pub username: String,
    #[schema(example = "Alice Wonder")]
    pub name: String,
}

impl From<user::Model> for ProfileResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
        }
    }
}

/// Request body for profile update. Absent fields are left unchanged.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    /// New password; rehashed before storage.
    pub password: Option<String>,
}

pub fn validate_update_profile_request(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(ref email) = payload.email {
        validate_email(email)?;
    }
    if let Some(ref username) = payload.username {
        validate_username(username)?;
    }
    if let Some(ref password) = payload.password {
        validate_password(password)?;
    }
    if let Some(ref name) = payload.name
        && name.trim().is_empty()
    {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    Ok(())
}

/// Request body for the first forgot-password step.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct GenerateForgotRequest {
    #[schema(example = "alice@ufl.edu")]
    pub email: String,
}

/// Request body for the second forgot-password step.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ValidateForgotRequest {
    #[schema(example = "alice@ufl.edu")]
    pub email: String,
    /// The 6-digit code from the generate step.
    #[schema(example = "048213")]
    pub code: String,
}

/// Request body for the final forgot-password step.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    /// A previously validated 6-digit code.
    #[schema(example = "048213")]
    pub code: String,
    /// Replacement password (8-128 characters).
    pub password: String,
}

/// Generic acknowledgement body for the forgot-password endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Code generated")]
    pub message: &'static str,
}
