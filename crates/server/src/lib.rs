use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{AuthUser, ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod records;
mod server;
mod user;

pub mod types {
    pub mod account {
        pub use api_types::account::{
            AccessRuleView, AccountNew, AccountRename, AccountView, ManagerGrant, RoleListQuery,
            RoleQuery,
        };
    }

    pub mod record {
        pub use api_types::record::{AmountSum, RecordBody, RecordKind, RecordListQuery, RecordView};
    }

    pub mod user {
        pub use api_types::user::{UserEmailUpdate, UserNameUpdate, UserSearch, UserView};
    }

    pub use api_types::{CountResponse, Role};
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) | EngineError::Rollback { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_storage() {
        tracing::error!("storage error: {err}");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

fn role_from_api(role: api_types::Role) -> engine::Role {
    match role {
        api_types::Role::Manager => engine::Role::Manager,
        api_types::Role::Owner => engine::Role::Owner,
    }
}

fn role_to_api(role: engine::Role) -> api_types::Role {
    match role {
        engine::Role::Manager => api_types::Role::Manager,
        engine::Role::Owner => api_types::Role::Owner,
    }
}
