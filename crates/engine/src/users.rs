//! Users table.
//!
//! Credentials are hashed and verified outside the engine; the hash is only
//! stored and handed back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, entity::prelude::*};

use crate::{EngineError, ResultEngine};

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::access_rules::Entity")]
    AccessRules,
}

impl Related<super::access_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            hashed_password: model.hashed_password,
            created_at: model.created_at,
        }
    }
}

/// Inserts a user. A taken email is a [`EngineError::Conflict`] even when
/// no earlier lookup caught it.
pub(crate) async fn create<C: ConnectionTrait>(
    db: &C,
    name: String,
    email: String,
    hashed_password: String,
) -> ResultEngine<User> {
    let model = ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name),
        email: ActiveValue::Set(email),
        hashed_password: ActiveValue::Set(hashed_password),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(|err| EngineError::from_insert(err, "email already registered"))?;
    Ok(User::from(model))
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, PaginatorTrait};

    use migration::MigratorTrait;

    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_conflict_at_insert() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let ann = create(
            &db,
            "ann".to_string(),
            "ann@example.org".to_string(),
            "hashed".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(ann.email, "ann@example.org");

        let err = create(
            &db,
            "other".to_string(),
            "ann@example.org".to_string(),
            "hashed".to_string(),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Conflict("email already registered".to_string())
        );
        assert_eq!(Entity::find().count(&db).await.unwrap(), 1);
    }
}
