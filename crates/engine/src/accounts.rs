//! An `Account` is a shared ledger. Exactly one user owns it, any number of
//! users may manage it.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, entity::prelude::*};

use crate::ResultEngine;

/// A shared ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::access_rules::Entity")]
    AccessRules,
    #[sea_orm(has_many = "super::records::Entity")]
    Records,
}

impl Related<super::access_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessRules.def()
    }
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub(crate) async fn delete_by_ids<C: ConnectionTrait>(db: &C, ids: &[i64]) -> ResultEngine<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let res = Entity::delete_many()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
