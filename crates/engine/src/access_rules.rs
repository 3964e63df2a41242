//! Access rules: the `(user, account) -> role` mapping.
//!
//! This is the only source of truth for "who may do what to which account".
//! The functions below are single store calls and carry no authorization
//! logic; the gate in `ops::access` and the lifecycle operations decide when
//! they are safe to run. A `(user, account)` pair has at most one rule, which
//! the `UNIQUE(user_id, account_id)` index enforces.

use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    entity::prelude::*,
};

use crate::{EngineError, Page, ResultEngine, Role};

/// A grant of `role` to `user_id` over `account_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRule {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "access_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub role: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for AccessRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            account_id: model.account_id,
            role: Role::try_from(model.role)?,
        })
    }
}

pub(crate) async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    account_id: i64,
    role: Role,
) -> ResultEngine<AccessRule> {
    let model = ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user_id),
        account_id: ActiveValue::Set(account_id),
        role: ActiveValue::Set(role.as_i32()),
    }
    .insert(db)
    .await
    .map_err(|err| EngineError::from_insert(err, "access rule already exists"))?;
    AccessRule::try_from(model)
}

/// Absence of a grant is `Ok(None)`, not an error.
pub(crate) async fn find_by_user_and_account<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    account_id: i64,
) -> ResultEngine<Option<AccessRule>> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::AccountId.eq(account_id))
        .one(db)
        .await?
        .map(AccessRule::try_from)
        .transpose()
}

pub(crate) async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> ResultEngine<()> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("access rule not exists".to_string()));
    }
    Ok(())
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

pub(crate) async fn delete_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> ResultEngine<u64> {
    let res = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
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

/// Ids of the accounts on which `user_id` holds exactly `role`, ordered by
/// account id. `None` returns every match.
pub(crate) async fn account_ids_by_user_and_role<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    role: Role,
    page: Option<Page>,
) -> ResultEngine<Vec<i64>> {
    let mut query = Entity::find()
        .select_only()
        .column(Column::AccountId)
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Role.eq(role.as_i32()))
        .order_by_asc(Column::AccountId);
    if let Some(page) = page {
        query = query.offset(page.offset()).limit(page.limit());
    }
    Ok(query.into_tuple::<i64>().all(db).await?)
}

pub(crate) async fn count_by_user_and_role<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    role: Role,
) -> ResultEngine<u64> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Role.eq(role.as_i32()))
        .count(db)
        .await?)
}

/// Ids of the users holding exactly `role` on `account_id`, ordered by user
/// id.
pub(crate) async fn user_ids_by_account_and_role<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    role: Role,
    page: Page,
) -> ResultEngine<Vec<i64>> {
    Ok(Entity::find()
        .select_only()
        .column(Column::UserId)
        .filter(Column::AccountId.eq(account_id))
        .filter(Column::Role.eq(role.as_i32()))
        .order_by_asc(Column::UserId)
        .offset(page.offset())
        .limit(page.limit())
        .into_tuple::<i64>()
        .all(db)
        .await?)
}

pub(crate) async fn count_by_account_and_role<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    role: Role,
) -> ResultEngine<u64> {
    Ok(Entity::find()
        .filter(Column::AccountId.eq(account_id))
        .filter(Column::Role.eq(role.as_i32()))
        .count(db)
        .await?)
}
