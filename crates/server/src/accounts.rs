//! Account endpoints. Every permission decision is taken by the engine.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use api_types::{
    CountResponse,
    account::{
        AccessRuleView, AccountNew, AccountRename, AccountView, ManagerGrant, RoleListQuery,
        RoleQuery,
    },
    user::UserView,
};
use engine::{AccessRule, Account, Page};

use crate::{
    ServerError, role_from_api, role_to_api,
    server::{AuthUser, ServerState},
    user::user_view,
};

fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        created_at: account.created_at,
    }
}

fn access_rule_view(rule: AccessRule) -> AccessRuleView {
    AccessRuleView {
        id: rule.id,
        user_id: rule.user_id,
        account_id: rule.account_id,
        role: role_to_api(rule.role),
    }
}

pub async fn create(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state.engine.create_account(&payload.name, user_id).await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn get(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(account_id, user_id).await?;
    Ok(Json(account_view(account)))
}

pub async fn list_by_role(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<RoleListQuery>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let page = Page::new(query.page_id, query.page_size)?;
    let accounts = state
        .engine
        .accounts_by_role(role_from_api(query.role), page, user_id)
        .await?
        .into_iter()
        .map(account_view)
        .collect();
    Ok(Json(accounts))
}

pub async fn count_by_role(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<CountResponse>, ServerError> {
    let count = state
        .engine
        .count_accounts_by_role(role_from_api(query.role), user_id)
        .await?;
    Ok(Json(CountResponse { count }))
}

pub async fn rename(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Json(payload): Json<AccountRename>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .rename_account(account_id, &payload.name, user_id)
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn delete(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(account_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn users(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Query(query): Query<RoleListQuery>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let page = Page::new(query.page_id, query.page_size)?;
    let users = state
        .engine
        .account_users(account_id, role_from_api(query.role), page, user_id)
        .await?
        .into_iter()
        .map(user_view)
        .collect();
    Ok(Json(users))
}

pub async fn count_users(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<CountResponse>, ServerError> {
    let count = state
        .engine
        .count_account_users(account_id, role_from_api(query.role), user_id)
        .await?;
    Ok(Json(CountResponse { count }))
}

pub async fn grant_manager(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Json(payload): Json<ManagerGrant>,
) -> Result<(StatusCode, Json<AccessRuleView>), ServerError> {
    let rule = state
        .engine
        .grant_manager(account_id, payload.user_id, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(access_rule_view(rule))))
}

pub async fn revoke_manager(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((account_id, member_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .revoke_manager(account_id, member_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
