use alloc::string::String;

/// Errors reported by [`CuckooTable`](crate::CuckooTable).
///
/// Duplicate inserts and lookups or removals of absent keys are not errors;
/// they are reported through the return values of the respective operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CuckooError {
    /// A displacement walk stalled while the table was already at its maximum
    /// capacity exponent and had used up its rehash budget.
    ///
    /// The table is left valid and holds every entry except the one carried
    /// here. That entry is not necessarily the one passed to `insert`: the
    /// walk may have displaced a previously stored entry into homelessness.
    #[error(
        "table capacity exhausted at 2^{max_exponent} slots; entry {key} => {value} could not be placed"
    )]
    CapacityExhausted {
        /// Key of the entry left without a slot.
        key: u32,
        /// Value of the entry left without a slot.
        value: u32,
        /// The capacity exponent the table could not grow beyond.
        max_exponent: u32,
    },

    /// The table configuration is inconsistent.
    #[error("invalid table configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// The operating system's random source could not seed the table.
    #[error("failed to draw seed material from the OS random source: {reason}")]
    Entropy {
        /// Error reported by the random source.
        reason: String,
    },
}

impl CuckooError {
    /// Returns `true` for [`CuckooError::CapacityExhausted`].
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, Self::CapacityExhausted { .. })
    }

    /// The `(key, value)` pair a capacity-exhausted insert could not place.
    pub fn unplaced_entry(&self) -> Option<(u32, u32)> {
        match *self {
            Self::CapacityExhausted { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn exhausted_reports_entry() {
        let err = CuckooError::CapacityExhausted {
            key: 9,
            value: 81,
            max_exponent: 16,
        };
        assert!(err.is_capacity_exhausted());
        assert_eq!(err.unplaced_entry(), Some((9, 81)));
        assert_eq!(
            err.to_string(),
            "table capacity exhausted at 2^16 slots; entry 9 => 81 could not be placed"
        );
    }

    #[test]
    fn other_errors_carry_no_entry() {
        let err = CuckooError::InvalidConfig {
            reason: "min_exponent must be at least 1".into(),
        };
        assert!(!err.is_capacity_exhausted());
        assert_eq!(err.unplaced_entry(), None);
        assert!(err.to_string().contains("min_exponent"));
    }
}
