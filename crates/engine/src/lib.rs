//! Shared bookkeeping accounts.
//!
//! Users own accounts, grant other users the manager role on them, and
//! record expenses (name, kind, date, exact decimal amount) under them. Every
//! operation goes through [`Engine`], which runs it in a single store
//! transaction after checking the acting user against the access gate.

pub use access_rules::AccessRule;
pub use accounts::Account;
pub use amount::Amount;
pub use error::EngineError;
pub use ops::{Access, Engine, EngineBuilder, MAX_NAME_LEN};
pub use page::{MAX_PAGE_SIZE, MIN_PAGE_SIZE, Page};
pub use record_kind::RecordKind;
pub use records::{Record, RecordAuthor, RecordFields};
pub use role::Role;
pub use users::User;

mod access_rules;
mod accounts;
mod amount;
mod error;
mod ops;
mod page;
mod record_kind;
mod records;
mod role;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
