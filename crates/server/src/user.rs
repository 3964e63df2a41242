//! Endpoints of the authenticated user and user lookups.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use api_types::user::{UserEmailUpdate, UserNameUpdate, UserSearch, UserView};
use engine::{Page, User};

use crate::{ServerError, server::{AuthUser, ServerState}};

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub async fn current(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(user_view(user)))
}

pub async fn get(
    Extension(_): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(id).await?;
    Ok(Json(user_view(user)))
}

pub async fn search(
    Extension(_): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<UserSearch>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let page = Page::new(query.page_id, query.page_size)?;
    let users = state
        .engine
        .users_by_name(&query.name, page)
        .await?
        .into_iter()
        .map(user_view)
        .collect();
    Ok(Json(users))
}

pub async fn update_name(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNameUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .update_user_name(&payload.name, user_id)
        .await?;
    Ok(Json(user_view(user)))
}

pub async fn update_email(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<UserEmailUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .update_user_email(&payload.email, user_id)
        .await?;
    Ok(Json(user_view(user)))
}

/// Deletes the caller together with every account they own.
pub async fn delete(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
