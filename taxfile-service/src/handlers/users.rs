use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::dtos::{AllUsersResponse, CreateUserRequest, UserResponse};
use crate::models::CreateUser;
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    request.validate()?;

    if state.db.user_exists(&request.user_id).await? {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "User with ID {} already exists",
            request.user_id
        )));
    }

    let user = state
        .db
        .create_user(&CreateUser {
            user_id: request.user_id,
            first_name: request.first_name,
            last_name: request.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<AllUsersResponse>, AppError> {
    let users = state.db.list_users().await?;
    tracing::debug!(count = users.len(), "Listed users");

    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    let total_users = users.len();

    Ok(Json(AllUsersResponse { users, total_users }))
}

#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User with ID {} not found", user_id)))?;

    Ok(Json(user.into()))
}
