//! Record endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use api_types::{
    CountResponse,
    record::{AmountSum, RecordBody, RecordKind, RecordListQuery, RecordView},
};
use engine::{Page, Record, RecordAuthor, RecordFields};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

fn kind_from_api(kind: RecordKind) -> engine::RecordKind {
    match kind {
        RecordKind::Food => engine::RecordKind::Food,
        RecordKind::Shopping => engine::RecordKind::Shopping,
        RecordKind::Commuting => engine::RecordKind::Commuting,
        RecordKind::Amusement => engine::RecordKind::Amusement,
        RecordKind::Studying => engine::RecordKind::Studying,
        RecordKind::Office => engine::RecordKind::Office,
        RecordKind::Gift => engine::RecordKind::Gift,
    }
}

fn kind_to_api(kind: engine::RecordKind) -> RecordKind {
    match kind {
        engine::RecordKind::Food => RecordKind::Food,
        engine::RecordKind::Shopping => RecordKind::Shopping,
        engine::RecordKind::Commuting => RecordKind::Commuting,
        engine::RecordKind::Amusement => RecordKind::Amusement,
        engine::RecordKind::Studying => RecordKind::Studying,
        engine::RecordKind::Office => RecordKind::Office,
        engine::RecordKind::Gift => RecordKind::Gift,
    }
}

fn record_view(record: Record) -> RecordView {
    RecordView {
        id: record.id,
        name: record.name,
        kind: kind_to_api(record.kind),
        date: record.date,
        amount: record.amount.to_string(),
        account_id: record.account_id,
        create_user_id: record.create_user_id,
        last_modified_user_id: record.last_modified_user_id,
        created_at: record.created_at,
    }
}

fn record_fields(body: RecordBody) -> Result<RecordFields, ServerError> {
    Ok(RecordFields {
        name: body.name,
        kind: kind_from_api(body.kind),
        date: body.date,
        amount: body.amount.parse()?,
    })
}

pub async fn create(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Json(payload): Json<RecordBody>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let fields = record_fields(payload)?;
    let record = state
        .engine
        .create_record(account_id, fields, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(record_view(record))))
}

pub async fn get(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(record_id): Path<i64>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state.engine.record(record_id, user_id).await?;
    Ok(Json(record_view(record)))
}

/// Lists the records of an account, optionally only those created or last
/// modified by a given user.
pub async fn list(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<Vec<RecordView>>, ServerError> {
    let page = Page::new(query.page_id, query.page_size)?;
    let author = match (query.created_by, query.modified_by) {
        (Some(_), Some(_)) => {
            return Err(ServerError::Generic(
                "created_by and modified_by are mutually exclusive".to_string(),
            ));
        }
        (Some(id), None) => Some(RecordAuthor::Creator(id)),
        (None, Some(id)) => Some(RecordAuthor::LastModifier(id)),
        (None, None) => None,
    };

    let records = match author {
        Some(author) => {
            state
                .engine
                .records_by_author(account_id, author, page, user_id)
                .await?
        }
        None => state.engine.records(account_id, page, user_id).await?,
    };
    Ok(Json(records.into_iter().map(record_view).collect()))
}

pub async fn count(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
) -> Result<Json<CountResponse>, ServerError> {
    let count = state.engine.count_records(account_id, user_id).await?;
    Ok(Json(CountResponse { count }))
}

pub async fn sum(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(account_id): Path<i64>,
) -> Result<Json<AmountSum>, ServerError> {
    let sum = state
        .engine
        .records_amount_sum(account_id, user_id)
        .await?;
    Ok(Json(AmountSum {
        sum: sum.to_string(),
    }))
}

pub async fn update(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(record_id): Path<i64>,
    Json(payload): Json<RecordBody>,
) -> Result<Json<RecordView>, ServerError> {
    let fields = record_fields(payload)?;
    let record = state
        .engine
        .update_record(record_id, fields, user_id)
        .await?;
    Ok(Json(record_view(record)))
}

pub async fn delete(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(record_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_record(record_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
