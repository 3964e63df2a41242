use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod records;
mod users;

pub use access::Access;

/// Longest name accepted for users, accounts and records.
pub const MAX_NAME_LEN: usize = 15;

/// Run a block inside a DB transaction, committing on success and rolling back
/// on error.
///
/// The block may use `?`. When the rollback itself fails the caller gets
/// [`EngineError::Rollback`] carrying both errors. If the enclosing future is
/// dropped before completion the transaction is dropped uncommitted and the
/// store rolls it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = async {
            let value: $crate::ResultEngine<_> = $body;
            value
        }
        .await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => match $tx.rollback().await {
                Ok(()) => Err(err),
                Err(rollback) => {
                    tracing::error!("rollback failed after {err}: {rollback}");
                    Err($crate::EngineError::Rollback {
                        source: Box::new(err),
                        rollback,
                    })
                }
            },
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every account, record and user operation.
///
/// The engine holds no state besides the connection: every call re-reads what
/// it needs inside its own transaction.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(trimmed.to_lowercase())
        }
        _ => Err(EngineError::InvalidInput(format!("invalid email: {trimmed}"))),
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
