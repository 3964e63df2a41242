//! Roles a user can hold over an account.

use crate::EngineError;

/// Two-tier capability ordering used by every gate check.
///
/// `Manager < Owner`. Checks are always "at least" comparisons, see
/// [`Role::satisfies`]. The discriminant is the value persisted in
/// `access_rules.role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum Role {
    /// Can read the account and create, update or delete its records.
    Manager = 1,
    /// Can additionally rename or delete the account and manage managers.
    Owner = 2,
}

impl Role {
    /// Value stored in the database.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns `true` if holding `self` is enough for `required`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Manager => f.write_str("manager"),
            Role::Owner => f.write_str("owner"),
        }
    }
}

impl From<Role> for i32 {
    fn from(value: Role) -> Self {
        value.as_i32()
    }
}

impl TryFrom<i32> for Role {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Manager),
            2 => Ok(Role::Owner),
            other => Err(EngineError::InvalidInput(format!(
                "invalid account role: {other}"
            ))),
        }
    }
}
