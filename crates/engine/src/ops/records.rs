use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Amount, EngineError, Page, Record, RecordAuthor, RecordFields, ResultEngine, Role, records,
};

use super::{Engine, normalize_required_name, with_tx};

fn normalize_fields(fields: RecordFields) -> ResultEngine<RecordFields> {
    Ok(RecordFields {
        name: normalize_required_name(&fields.name, "record")?,
        ..fields
    })
}

impl Engine {
    /// Adds a record to an account (manager or owner).
    ///
    /// The acting user is stamped both as creator and as last modifier.
    pub async fn create_record(
        &self,
        account_id: i64,
        fields: RecordFields,
        user_id: i64,
    ) -> ResultEngine<Record> {
        let fields = normalize_fields(fields)?;
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Manager)
                .await?;

            let mut active = records::ActiveModel {
                id: ActiveValue::NotSet,
                account_id: ActiveValue::Set(account_id),
                create_user_id: ActiveValue::Set(user_id),
                last_modified_user_id: ActiveValue::Set(user_id),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            fields.apply(&mut active);
            let model = active.insert(&db_tx).await?;
            let record = Record::try_from(model)?;

            tracing::debug!(
                record_id = record.id,
                account_id,
                kind = %record.kind,
                "record created"
            );
            Ok(record)
        })
    }

    /// Updates the editable fields of a record (manager or owner of its
    /// account) and stamps the acting user as last modifier.
    pub async fn update_record(
        &self,
        record_id: i64,
        fields: RecordFields,
        user_id: i64,
    ) -> ResultEngine<Record> {
        let fields = normalize_fields(fields)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_record_role(&db_tx, record_id, user_id, Role::Manager)
                .await?;

            let mut active: records::ActiveModel = model.into();
            fields.apply(&mut active);
            active.last_modified_user_id = ActiveValue::Set(user_id);
            let model = active.update(&db_tx).await?;
            Record::try_from(model)
        })
    }

    /// Deletes a record (manager or owner of its account).
    pub async fn delete_record(&self, record_id: i64, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_record_role(&db_tx, record_id, user_id, Role::Manager)
                .await?;
            records::Entity::delete_by_id(record_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Returns a single record.
    pub async fn record(&self, record_id: i64, user_id: i64) -> ResultEngine<Record> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_record_role(&db_tx, record_id, user_id, Role::Manager)
                .await?;
            Record::try_from(model)
        })
    }

    /// Lists the records of an account, ordered by id.
    ///
    /// An account that does not exist has no records.
    pub async fn records(
        &self,
        account_id: i64,
        page: Page,
        user_id: i64,
    ) -> ResultEngine<Vec<Record>> {
        with_tx!(self, |db_tx| {
            if !self.account_readable(&db_tx, account_id, user_id).await? {
                return Ok(Vec::new());
            }
            let models = records::Entity::find()
                .filter(records::Column::AccountId.eq(account_id))
                .order_by_asc(records::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Record::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Lists the records of an account created or last modified by a given
    /// user, ordered by id.
    pub async fn records_by_author(
        &self,
        account_id: i64,
        author: RecordAuthor,
        page: Page,
        user_id: i64,
    ) -> ResultEngine<Vec<Record>> {
        with_tx!(self, |db_tx| {
            if !self.account_readable(&db_tx, account_id, user_id).await? {
                return Ok(Vec::new());
            }
            let author_filter = match author {
                RecordAuthor::Creator(id) => records::Column::CreateUserId.eq(id),
                RecordAuthor::LastModifier(id) => records::Column::LastModifiedUserId.eq(id),
            };
            let models = records::Entity::find()
                .filter(records::Column::AccountId.eq(account_id))
                .filter(author_filter)
                .order_by_asc(records::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Record::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Counts the records of an account.
    pub async fn count_records(&self, account_id: i64, user_id: i64) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            if !self.account_readable(&db_tx, account_id, user_id).await? {
                return Ok(0);
            }
            Ok(records::Entity::find()
                .filter(records::Column::AccountId.eq(account_id))
                .count(&db_tx)
                .await?)
        })
    }

    /// Exact sum of the amounts of an account.
    ///
    /// Amounts are summed as decimals in the engine, never by the store, so
    /// the result does not depend on how the backend treats numeric text.
    pub async fn records_amount_sum(&self, account_id: i64, user_id: i64) -> ResultEngine<Amount> {
        with_tx!(self, |db_tx| {
            if !self.account_readable(&db_tx, account_id, user_id).await? {
                return Ok(Amount::ZERO);
            }
            let amounts: Vec<String> = records::Entity::find()
                .select_only()
                .column(records::Column::Amount)
                .filter(records::Column::AccountId.eq(account_id))
                .into_tuple()
                .all(&db_tx)
                .await?;
            let parsed = amounts
                .iter()
                .map(|amount| amount.parse::<Amount>())
                .collect::<ResultEngine<Vec<_>>>()?;
            Amount::total(parsed).ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "amounts of account {account_id} overflow their sum"
                ))
            })
        })
    }
}
