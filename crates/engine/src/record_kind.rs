use crate::EngineError;

/// Category of a ledger record.
///
/// The discriminant is the value persisted in `records.kind`, so variants
/// must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RecordKind {
    Food = 1,
    Shopping = 2,
    Commuting = 3,
    Amusement = 4,
    Studying = 5,
    Office = 6,
    Gift = 7,
}

impl RecordKind {
    /// Every kind, in stored order.
    pub const ALL: [RecordKind; 7] = [
        RecordKind::Food,
        RecordKind::Shopping,
        RecordKind::Commuting,
        RecordKind::Amusement,
        RecordKind::Studying,
        RecordKind::Office,
        RecordKind::Gift,
    ];

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordKind::Food => "food",
            RecordKind::Shopping => "shopping",
            RecordKind::Commuting => "commuting",
            RecordKind::Amusement => "amusement",
            RecordKind::Studying => "studying",
            RecordKind::Office => "office",
            RecordKind::Gift => "gift",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for RecordKind {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_i32() == value)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid record kind: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_are_one_based() {
        for (idx, kind) in RecordKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.as_i32(), idx as i32 + 1);
            assert_eq!(RecordKind::try_from(kind.as_i32()).unwrap(), kind);
        }
    }

    #[test]
    fn reject_out_of_range() {
        assert!(RecordKind::try_from(0).is_err());
        assert!(RecordKind::try_from(8).is_err());
    }
}
