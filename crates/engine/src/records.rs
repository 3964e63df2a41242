//! Ledger records: dated, typed, amount-bearing entries under an account.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, entity::prelude::*};

use crate::{Amount, EngineError, RecordKind, ResultEngine};

/// A single ledger entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub kind: RecordKind,
    pub date: NaiveDate,
    pub amount: Amount,
    pub account_id: i64,
    pub create_user_id: i64,
    pub last_modified_user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// The user-editable part of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub kind: RecordKind,
    pub date: NaiveDate,
    pub amount: Amount,
}

/// Which user column a listing filters on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordAuthor {
    Creator(i64),
    LastModifier(i64),
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub kind: i32,
    pub date: Date,
    /// Exact decimal text, see [`Amount`].
    pub amount: String,
    pub account_id: i64,
    pub create_user_id: i64,
    pub last_modified_user_id: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Record {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: RecordKind::try_from(model.kind)?,
            date: model.date,
            amount: model.amount.parse()?,
            account_id: model.account_id,
            create_user_id: model.create_user_id,
            last_modified_user_id: model.last_modified_user_id,
            created_at: model.created_at,
        })
    }
}

impl RecordFields {
    /// Writes the editable columns into `model`.
    pub(crate) fn apply(&self, model: &mut ActiveModel) {
        model.name = ActiveValue::Set(self.name.clone());
        model.kind = ActiveValue::Set(self.kind.as_i32());
        model.date = ActiveValue::Set(self.date);
        model.amount = ActiveValue::Set(self.amount.to_string());
    }
}

pub(crate) async fn delete_by_account_id<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
) -> ResultEngine<u64> {
    let res = Entity::delete_many()
        .filter(Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub(crate) async fn delete_by_account_ids<C: ConnectionTrait>(
    db: &C,
    account_ids: &[i64],
) -> ResultEngine<u64> {
    if account_ids.is_empty() {
        return Ok(0);
    }
    let res = Entity::delete_many()
        .filter(Column::AccountId.is_in(account_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
