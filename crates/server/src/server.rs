use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use std::{sync::Arc, time::Duration};

use crate::{accounts, records, user};
use engine::Engine;

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Id of the authenticated user, set by the auth middleware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// `TypedHeader` for the authenticated user id.
///
/// The credential layer in front of the service verifies the caller and
/// forwards its numeric id in "x-user-id".
#[derive(Debug)]
struct UserIdHeader(i64);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(axum::http::HeaderValue::from(self.0)));
    }
}

/// Missing and malformed ids are both rejected with 401.
async fn auth(
    user_header: Result<TypedHeader<UserIdHeader>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Ok(TypedHeader(UserIdHeader(user_id))) = user_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

/// Builds the service with its middleware stack.
///
/// Requests running longer than `request_timeout` are answered with 408; the
/// handler future is dropped, which rolls back any open transaction.
pub fn router(state: ServerState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/user", get(user::current).delete(user::delete))
        .route("/user/name", patch(user::update_name))
        .route("/user/email", patch(user::update_email))
        .route("/users", get(user::search))
        .route("/users/{id}", get(user::get))
        .route(
            "/accounts",
            post(accounts::create).get(accounts::list_by_role),
        )
        .route("/accounts/count", get(accounts::count_by_role))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::rename)
                .delete(accounts::delete),
        )
        .route("/accounts/{id}/users", get(accounts::users))
        .route("/accounts/{id}/users/count", get(accounts::count_users))
        .route("/accounts/{id}/managers", post(accounts::grant_manager))
        .route(
            "/accounts/{id}/managers/{user_id}",
            axum::routing::delete(accounts::revoke_manager),
        )
        .route(
            "/accounts/{id}/records",
            get(records::list).post(records::create),
        )
        .route("/accounts/{id}/records/count", get(records::count))
        .route("/accounts/{id}/records/sum", get(records::sum))
        .route(
            "/records/{id}",
            get(records::get)
                .patch(records::update)
                .delete(records::delete),
        )
        .route_layer(middleware::from_fn(auth))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str, request_timeout: Duration) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener, request_timeout).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine), request_timeout)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    request_timeout: Duration,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener, request_timeout).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
