//! The access gate.
//!
//! Every permission decision in the engine goes through [`check_access`].
//! Lifecycle operations call the `require_*` helpers below, which first load
//! the target (absent -> `KeyNotFound`) and then ask the gate
//! (insufficient role -> `Forbidden`). Store failures propagate as
//! `Database` and are never turned into a denial.

use sea_orm::{ConnectionTrait, DatabaseTransaction, prelude::*};

use crate::{AccessRule, EngineError, ResultEngine, Role, access_rules, accounts, records, users};

use super::Engine;

/// Outcome of the access gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

impl Access {
    /// Decision for the rule found for a `(user, account)` pair, if any.
    pub(crate) fn evaluate(rule: Option<&AccessRule>, required: Role) -> Self {
        match rule {
            Some(rule) if rule.role.satisfies(required) => Access::Allowed,
            _ => Access::Denied,
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Access::Allowed
    }
}

pub(super) async fn check_access<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    account_id: i64,
    required: Role,
) -> ResultEngine<Access> {
    let rule = access_rules::find_by_user_and_account(db, user_id, account_id).await?;
    Ok(Access::evaluate(rule.as_ref(), required))
}

/// Generates a `require_*` method loading an entity by id or failing with
/// `KeyNotFound`.
macro_rules! impl_require_by_id {
    ($require_fn:ident, $entity:path, $model:path, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: i64,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(require_user, users::Entity, users::Model, "user not exists");

    impl_require_by_id!(
        require_account,
        accounts::Entity,
        accounts::Model,
        "account not exists"
    );

    impl_require_by_id!(
        require_record,
        records::Entity,
        records::Model,
        "record not exists"
    );

    /// Decides whether `user_id` holds at least `required` on `account_id`.
    ///
    /// A missing rule is `Denied`, not an error.
    pub async fn authorize(
        &self,
        user_id: i64,
        account_id: i64,
        required: Role,
    ) -> ResultEngine<Access> {
        check_access(&self.database, user_id, account_id, required).await
    }

    pub(super) async fn require_role(
        &self,
        db: &DatabaseTransaction,
        account_id: i64,
        user_id: i64,
        required: Role,
    ) -> ResultEngine<()> {
        match check_access(db, user_id, account_id, required).await? {
            Access::Allowed => Ok(()),
            Access::Denied => Err(EngineError::Forbidden(format!(
                "{required} role required on account {account_id}"
            ))),
        }
    }

    /// Loads the account and checks `required` on it.
    pub(super) async fn require_account_role(
        &self,
        db: &DatabaseTransaction,
        account_id: i64,
        user_id: i64,
        required: Role,
    ) -> ResultEngine<accounts::Model> {
        let model = self.require_account(db, account_id).await?;
        self.require_role(db, account_id, user_id, required).await?;
        Ok(model)
    }

    /// Loads the record and checks `required` on the account owning it.
    pub(super) async fn require_record_role(
        &self,
        db: &DatabaseTransaction,
        record_id: i64,
        user_id: i64,
        required: Role,
    ) -> ResultEngine<records::Model> {
        let model = self.require_record(db, record_id).await?;
        self.require_role(db, model.account_id, user_id, required)
            .await?;
        Ok(model)
    }

    /// Like [`Engine::require_account_role`], but an account that does not
    /// exist yields `Ok(false)`: there is nothing under it to protect.
    pub(super) async fn account_readable(
        &self,
        db: &DatabaseTransaction,
        account_id: i64,
        user_id: i64,
    ) -> ResultEngine<bool> {
        if accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .is_none()
        {
            return Ok(false);
        }
        self.require_role(db, account_id, user_id, Role::Manager)
            .await?;
        Ok(true)
    }
}
