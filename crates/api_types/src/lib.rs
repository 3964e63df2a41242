use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user on an account.
///
/// - `manager`: can read the account and write its records.
/// - `owner`: can additionally rename or delete it and manage managers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Owner,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNameUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserEmailUpdate {
        pub email: String,
    }

    /// Query of `GET /users`: exact name match, paged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSearch {
        pub name: String,
        pub page_id: u64,
        pub page_size: u64,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i64,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }

    /// Query of the paged role listings (`GET /accounts`,
    /// `GET /accounts/{id}/users`).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleListQuery {
        pub role: Role,
        pub page_id: u64,
        pub page_size: u64,
    }

    /// Query of the role counters.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleQuery {
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ManagerGrant {
        pub user_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccessRuleView {
        pub id: i64,
        pub user_id: i64,
        pub account_id: i64,
        pub role: Role,
    }
}

pub mod record {
    use super::*;

    /// Category of a record.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RecordKind {
        Food,
        Shopping,
        Commuting,
        Amusement,
        Studying,
        Office,
        Gift,
    }

    /// Body of record creation and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordBody {
        pub name: String,
        pub kind: RecordKind,
        pub date: NaiveDate,
        /// Exact decimal, e.g. `"12.50"`. Never a JSON number.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: i64,
        pub name: String,
        pub kind: RecordKind,
        pub date: NaiveDate,
        pub amount: String,
        pub account_id: i64,
        pub create_user_id: i64,
        pub last_modified_user_id: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Query of `GET /accounts/{id}/records`.
    ///
    /// At most one of `created_by` and `modified_by` may be set.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordListQuery {
        pub page_id: u64,
        pub page_size: u64,
        pub created_by: Option<i64>,
        pub modified_by: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AmountSum {
        pub sum: String,
    }
}
