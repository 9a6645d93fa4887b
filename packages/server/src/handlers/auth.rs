use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    GenerateForgotRequest, MessageResponse, ProfileResponse, RegisterRequest, ResetPasswordRequest,
    SignInRequest, SignInResponse, UpdateProfileRequest, ValidateForgotRequest,
    validate_register_request, validate_sign_in_request, validate_update_profile_request,
    validate_password,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Map a unique-constraint violation on the user table to the field that
/// collided. Used when a concurrent insert slips past the pre-checks.
fn taken_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Unique constraint caught on user write: {detail}");
            if detail.contains("email") {
                AppError::EmailTaken
            } else {
                AppError::UsernameTaken
            }
        }
        _ => AppError::from(err),
    }
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new user",
    description = "Creates a user account. The password is hashed before storage. A duplicate email or username is rejected with 400.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ProfileResponse),
        (status = 400, description = "Validation error or taken email/username (VALIDATION_ERROR, EMAIL_TAKEN, USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();

    if user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::EmailTaken);
    }
    if user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::UsernameTaken);
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(email),
        username: Set(username),
        password: Set(hash),
        name: Set(payload.name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(taken_error)?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/sign-in",
    tag = "Auth",
    operation_id = "signIn",
    summary = "Sign in with email or username",
    description = "Verifies the password and issues a time-limited bearer token carrying the user's public profile fields.",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Missing identifier or password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unknown account or wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    validate_sign_in_request(&payload)?;

    let mut select = user::Entity::find();
    select = match (payload.email.as_deref(), payload.username.as_deref()) {
        (Some(email), _) if !email.trim().is_empty() => {
            select.filter(user::Column::Email.eq(email.trim().to_lowercase()))
        }
        (_, Some(username)) => select.filter(user::Column::Username.eq(username.trim())),
        _ => unreachable!("validated above"),
    };

    let user = select
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.username,
        &user.email,
        &user.name,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(SignInResponse { token }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Get the current user's profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    // Read from the database rather than echoing token claims, so a profile
    // edit is visible before the token is reissued.
    let user = find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(ProfileResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Auth",
    operation_id = "updateProfile",
    summary = "Update the current user's profile",
    description = "Updates any of email, username, name, and password for the bearer identity. Absent fields are left unchanged; a new password is rehashed.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation error or taken email/username (VALIDATION_ERROR, EMAIL_TAKEN, USERNAME_TAKEN)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_MALFORMED)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    validate_update_profile_request(&payload)?;

    let existing = find_user(&state.db, auth_user.user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(ref email) = payload.email {
        let email = email.trim().to_lowercase();
        if user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .filter(user::Column::Id.ne(auth_user.user_id))
            .one(&state.db)
            .await?
            .is_some()
        {
            return Err(AppError::EmailTaken);
        }
        active.email = Set(email);
    }
    if let Some(ref username) = payload.username {
        let username = username.trim().to_string();
        if user::Entity::find()
            .filter(user::Column::Username.eq(&username))
            .filter(user::Column::Id.ne(auth_user.user_id))
            .one(&state.db)
            .await?
            .is_some()
        {
            return Err(AppError::UsernameTaken);
        }
        active.username = Set(username);
    }
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref password) = payload.password {
        let hash = hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
        active.password = Set(hash);
    }

    let user = active.update(&state.db).await.map_err(taken_error)?;
    Ok(Json(ProfileResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/forgot/generate",
    tag = "Auth",
    operation_id = "generateForgotCode",
    summary = "Generate a password-reset code",
    description = "Stores a 6-digit code for the email in a process-lifetime map. Responds 200 whether or not the account exists, to avoid account enumeration.",
    request_body = GenerateForgotRequest,
    responses(
        (status = 200, description = "Acknowledged", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn generate_forgot(
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenerateForgotRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }

    let account_exists = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();

    if account_exists {
        let code = state.reset_codes.generate(&email);
        // Email delivery is out of scope; the code is surfaced in the server
        // log for the operator.
        tracing::info!("Password reset code for {email}: {code}");
    } else {
        tracing::debug!("Reset code requested for unknown email {email}");
    }

    Ok(Json(MessageResponse {
        message: "Code generated",
    }))
}

#[utoipa::path(
    post,
    path = "/forgot/validate",
    tag = "Auth",
    operation_id = "validateForgotCode",
    summary = "Validate a password-reset code",
    description = "Checks the 6-digit code for the email. A code validates successfully exactly once per lifetime.",
    request_body = ValidateForgotRequest,
    responses(
        (status = 200, description = "Code validated", body = MessageResponse),
        (status = 400, description = "Wrong, expired, or already-validated code (RESET_CODE_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn validate_forgot(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ValidateForgotRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    if !state.reset_codes.validate(&email, payload.code.trim()) {
        return Err(AppError::ResetCodeInvalid);
    }
    Ok(Json(MessageResponse {
        message: "Code validated",
    }))
}

#[utoipa::path(
    post,
    path = "/forgot/reset",
    tag = "Auth",
    operation_id = "resetPassword",
    summary = "Reset a password with a validated code",
    description = "Accepts a new password keyed off a previously validated code and consumes the code.",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid code or password (RESET_CODE_INVALID, VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_password(&payload.password)?;

    let email = state
        .reset_codes
        .consume(payload.code.trim())
        .ok_or(AppError::ResetCodeInvalid)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(AppError::ResetCodeInvalid)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = user.into();
    active.password = Set(hash);
    active.update(&state.db).await?;

    Ok(Json(MessageResponse {
        message: "Password reset",
    }))
}

async fn find_user<C: ConnectionTrait>(conn: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}
