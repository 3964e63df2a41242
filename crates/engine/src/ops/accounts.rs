use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Account, AccessRule, EngineError, Page, ResultEngine, Role, User, access_rules, accounts,
    records, users,
};

use super::{Access, Engine, access::check_access, normalize_required_name, with_tx};

impl Engine {
    /// Creates an account and makes `user_id` its owner.
    ///
    /// The account row and the owner rule are committed together, so an
    /// account is never observable without an owner.
    pub async fn create_account(&self, name: &str, user_id: i64) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let model = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            access_rules::create(&db_tx, user_id, model.id, Role::Owner).await?;

            tracing::debug!(account_id = model.id, user_id, "account created");
            Ok(Account::from(model))
        })
    }

    /// Renames an account (owner-only).
    pub async fn rename_account(
        &self,
        account_id: i64,
        name: &str,
        user_id: i64,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_role(&db_tx, account_id, user_id, Role::Owner)
                .await?;
            let mut active: accounts::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            let model = active.update(&db_tx).await?;
            Ok(Account::from(model))
        })
    }

    /// Deletes an account and everything under it (owner-only).
    ///
    /// Records go first, then access rules, then the account row, all in one
    /// transaction.
    pub async fn delete_account(&self, account_id: i64, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Owner)
                .await?;

            let deleted_records = records::delete_by_account_id(&db_tx, account_id).await?;
            let deleted_rules = access_rules::delete_by_account_id(&db_tx, account_id).await?;
            accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(
                account_id,
                deleted_records,
                deleted_rules,
                "account deleted"
            );
            Ok(())
        })
    }

    /// Grants the manager role on an account to `member_id` (owner-only).
    ///
    /// A user can hold a single rule per account: granting again, or granting
    /// to the owner, is a conflict.
    pub async fn grant_manager(
        &self,
        account_id: i64,
        member_id: i64,
        user_id: i64,
    ) -> ResultEngine<AccessRule> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Owner)
                .await?;
            self.require_user(&db_tx, member_id).await?;

            if let Some(existing) =
                access_rules::find_by_user_and_account(&db_tx, member_id, account_id).await?
            {
                return Err(EngineError::Conflict(format!(
                    "user {member_id} already has {} role on account {account_id}",
                    existing.role
                )));
            }

            let rule = access_rules::create(&db_tx, member_id, account_id, Role::Manager).await?;
            tracing::debug!(account_id, member_id, "manager granted");
            Ok(rule)
        })
    }

    /// Revokes the manager role of `member_id` (owner-only).
    ///
    /// Only manager rules can be revoked here: an owner rule is left intact
    /// and the call fails with a conflict.
    pub async fn revoke_manager(
        &self,
        account_id: i64,
        member_id: i64,
        user_id: i64,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Owner)
                .await?;

            let rule = access_rules::find_by_user_and_account(&db_tx, member_id, account_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("access rule not exists".to_string()))?;
            if rule.role != Role::Manager {
                return Err(EngineError::Conflict(
                    "cannot revoke the account owner".to_string(),
                ));
            }

            access_rules::delete_by_id(&db_tx, rule.id).await?;
            tracing::debug!(account_id, member_id, "manager revoked");
            Ok(())
        })
    }

    /// Returns an account the user can read.
    pub async fn account(&self, account_id: i64, user_id: i64) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_role(&db_tx, account_id, user_id, Role::Manager)
                .await?;
            Ok(Account::from(model))
        })
    }

    /// Lists the accounts on which `user_id` holds exactly `role`, ordered by
    /// id.
    pub async fn accounts_by_role(
        &self,
        role: Role,
        page: Page,
        user_id: i64,
    ) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let ids =
                access_rules::account_ids_by_user_and_role(&db_tx, user_id, role, Some(page))
                    .await?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let models = accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(ids))
                .order_by_asc(accounts::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Account::from).collect::<Vec<_>>())
        })
    }

    /// Counts the accounts on which `user_id` holds exactly `role`.
    pub async fn count_accounts_by_role(&self, role: Role, user_id: i64) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            access_rules::count_by_user_and_role(&db_tx, user_id, role).await
        })
    }

    /// Lists the users holding exactly `role` on an account the caller can
    /// read, ordered by id.
    pub async fn account_users(
        &self,
        account_id: i64,
        role: Role,
        page: Page,
        user_id: i64,
    ) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Manager)
                .await?;
            let ids =
                access_rules::user_ids_by_account_and_role(&db_tx, account_id, role, page).await?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let models = users::Entity::find()
                .filter(users::Column::Id.is_in(ids))
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(User::from).collect::<Vec<_>>())
        })
    }

    /// Counts the users holding exactly `role` on an account the caller can
    /// read.
    pub async fn count_account_users(
        &self,
        account_id: i64,
        role: Role,
        user_id: i64,
    ) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Manager)
                .await?;
            access_rules::count_by_account_and_role(&db_tx, account_id, role).await
        })
    }

    /// Evaluates the gate for another member of an account the caller can
    /// read.
    pub async fn member_access(
        &self,
        account_id: i64,
        member_id: i64,
        required: Role,
        user_id: i64,
    ) -> ResultEngine<Access> {
        with_tx!(self, |db_tx| {
            self.require_account_role(&db_tx, account_id, user_id, Role::Manager)
                .await?;
            check_access(&db_tx, member_id, account_id, required).await
        })
    }
}
