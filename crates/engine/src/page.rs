//! Pagination for list operations.

use crate::{EngineError, ResultEngine};

pub const MIN_PAGE_SIZE: u64 = 5;
pub const MAX_PAGE_SIZE: u64 = 20;

/// A 1-indexed page of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    number: u64,
    size: u64,
}

impl Page {
    /// Builds a page, `number >= 1` and `size` within
    /// [`MIN_PAGE_SIZE`]..=[`MAX_PAGE_SIZE`].
    ///
    /// The store binds offsets as signed integers, so a page starting past
    /// `i64::MAX` rows is rejected too.
    pub fn new(number: u64, size: u64) -> ResultEngine<Self> {
        if number == 0 {
            return Err(EngineError::InvalidInput(
                "page number starts at 1".to_string(),
            ));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) {
            return Err(EngineError::InvalidInput(format!(
                "page size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )));
        }
        let offset = (number - 1).checked_mul(size);
        if !offset.is_some_and(|offset| i64::try_from(offset).is_ok()) {
            return Err(EngineError::InvalidInput(format!(
                "page {number} is out of range"
            )));
        }
        Ok(Self { number, size })
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.number - 1) * self.size
    }

    /// Rows to fetch.
    #[must_use]
    pub const fn limit(self) -> u64 {
        self.size
    }
}
