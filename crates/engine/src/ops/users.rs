use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    EngineError, Page, ResultEngine, Role, User, access_rules, accounts, records, users,
};

use super::{Engine, normalize_email, normalize_required_name, with_tx};

async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<i64>,
) -> ResultEngine<()> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?;
    match existing {
        Some(model) if Some(model.id) != except => Err(EngineError::Conflict(format!(
            "email {email} already registered"
        ))),
        _ => Ok(()),
    }
}

impl Engine {
    /// Registers a new user. The password must already be hashed.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            ensure_email_free(&db_tx, &email, None).await?;
            let user = users::create(&db_tx, name, email, hashed_password.to_string()).await?;

            tracing::debug!(user_id = user.id, "user created");
            Ok(user)
        })
    }

    pub async fn user(&self, user_id: i64) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            Ok(User::from(model))
        })
    }

    /// Looks a user up by email, as the credential layer does on login.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .map(User::from)
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
        })
    }

    /// Users whose name is exactly `name`, ordered by id.
    pub async fn users_by_name(&self, name: &str, page: Page) -> ResultEngine<Vec<User>> {
        let name = normalize_required_name(name, "user")?;
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .filter(users::Column::Name.eq(name.as_str()))
                .order_by_asc(users::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(User::from).collect::<Vec<_>>())
        })
    }

    pub async fn update_user_name(&self, name: &str, user_id: i64) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            Ok(User::from(active.update(&db_tx).await?))
        })
    }

    /// Changes the email of a user. Another user holding the address is a
    /// conflict.
    pub async fn update_user_email(&self, email: &str, user_id: i64) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            ensure_email_free(&db_tx, &email, Some(user_id)).await?;
            let mut active: users::ActiveModel = model.into();
            active.email = ActiveValue::Set(email);
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_insert(err, "email already registered"))?;
            Ok(User::from(model))
        })
    }

    pub async fn update_user_password(
        &self,
        hashed_password: &str,
        user_id: i64,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.into();
            active.hashed_password = ActiveValue::Set(hashed_password.to_string());
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a user and every account they own.
    ///
    /// Order: records of owned accounts, rules of owned accounts, the user's
    /// remaining rules (manager grants elsewhere), owned accounts, the user.
    /// Records the user wrote on accounts they only manage are kept.
    pub async fn delete_user(&self, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let owned =
                access_rules::account_ids_by_user_and_role(&db_tx, user_id, Role::Owner, None)
                    .await?;
            let deleted_records = records::delete_by_account_ids(&db_tx, &owned).await?;
            let mut deleted_rules = access_rules::delete_by_account_ids(&db_tx, &owned).await?;
            deleted_rules += access_rules::delete_by_user_id(&db_tx, user_id).await?;
            let deleted_accounts = accounts::delete_by_ids(&db_tx, &owned).await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(
                user_id,
                deleted_accounts,
                deleted_records,
                deleted_rules,
                "user deleted"
            );
            Ok(())
        })
    }
}
