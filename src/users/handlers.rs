use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, error, info, instrument};

use crate::{
    config::UpdateMode,
    error::{ApiError, ApiResult},
    extractors::{Params, Payload, UserId},
    paging::Paging,
    state::AppState,
    users::{
        dto::{DataResponse, UserListResponse},
        repo_types::{User, UserCreation, UserUpdate},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload<UserCreation>,
) -> ApiResult<Json<DataResponse<i64>>> {
    let id = state.users.insert(&payload).await.map_err(|e| {
        error!(error = %e, username = %payload.username, "insert user failed");
        ApiError::from(e)
    })?;

    info!(user_id = id, "user created");
    Ok(Json(DataResponse::new(id)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> ApiResult<Json<DataResponse<User>>> {
    let user = state.users.find_by_id(id).await.map_err(|e| {
        debug!(error = %e, user_id = id, "get user failed");
        ApiError::from(e)
    })?;
    Ok(Json(DataResponse::new(user)))
}

/// Count and page fetch are separate statements; a concurrent write between
/// them can make `total` disagree with the returned rows.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Params(mut paging): Params<Paging>,
) -> ApiResult<Json<UserListResponse>> {
    paging.process();

    // The fetch runs even when the count fails; the first failure is reported.
    let total = state.users.count_active().await;
    if let Err(e) = &total {
        error!(error = %e, "count users failed");
    }
    let rows = state.users.list_active(paging.window()).await;
    if let Err(e) = &rows {
        error!(error = %e, page = paging.page, limit = paging.limit, "list users failed");
    }

    paging.total = total?;
    let data = rows?;
    Ok(Json(UserListResponse { data, paging }))
}

#[instrument(skip(state, changes))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    Payload(changes): Payload<UserUpdate>,
) -> ApiResult<Json<DataResponse<bool>>> {
    let changes = match state.config.update_mode {
        UpdateMode::Compat => changes.without_zero_values(),
        UpdateMode::Strict => changes,
    };

    state.users.update(id, &changes).await.map_err(|e| {
        error!(error = %e, user_id = id, "update user failed");
        ApiError::from(e)
    })?;

    info!(user_id = id, "user updated");
    Ok(Json(DataResponse::new(true)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> ApiResult<Json<DataResponse<bool>>> {
    state.users.soft_delete(id).await.map_err(|e| {
        error!(error = %e, user_id = id, "soft delete user failed");
        ApiError::from(e)
    })?;

    info!(user_id = id, "user soft-deleted");
    Ok(Json(DataResponse::new(true)))
}
