use alloc::format;

use crate::CuckooError;

/// Smallest capacity exponent of the reference configurations (1024 slots).
pub const MIN_EXPONENT: u32 = 10;

/// Largest capacity exponent of the reference configurations (65536 slots).
pub const MAX_EXPONENT: u32 = 16;

/// In-place rehashes attempted at one capacity before the table grows.
pub const MAX_REHASHES: u32 = 3;

/// Largest exponent any configuration may use. Slot indices are taken from
/// 32-bit digests, so a table can never be wider than `2^31` slots.
///
/// Slots are allocated up front at 12 bytes each, so a table at this limit
/// needs 24 GiB. Allocation failure aborts the process instead of reporting
/// [`CuckooError::CapacityExhausted`].
pub const EXPONENT_LIMIT: u32 = 31;

/// Largest rehash budget any configuration may use. Every rehash rebuilds
/// the whole table, so a stalled insert costs up to this many full rebuilds
/// at the maximum capacity before it fails.
pub const REHASH_LIMIT: u32 = 32;

/// Number of candidate slots per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Two candidates, both taken from one seeded digest.
    Two,
    /// Three candidates, taken from two independently seeded digests.
    Three,
}

impl Arity {
    /// The number of candidate slots, 2 or 3.
    pub fn ways(self) -> usize {
        match self {
            Arity::Two => 2,
            Arity::Three => 3,
        }
    }

    /// Occupancy above which displacement walks stop being reliable.
    ///
    /// Removals shrink the table once the load factor drops below half of
    /// this value.
    pub fn default_max_load_factor(self) -> f64 {
        match self {
            Arity::Two => 0.5,
            Arity::Three => 0.9,
        }
    }
}

/// Capacity bounds and load-factor policy of a table.
///
/// # Examples
///
/// ```rust
/// use cuckoo_table::Arity;
/// use cuckoo_table::TableConfig;
///
/// let config = TableConfig::three_way().with_exponent_bounds(8, 20);
/// assert_eq!(config.arity, Arity::Three);
/// assert!(config.validate().is_ok());
///
/// assert!(TableConfig::two_way().with_max_load_factor(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Candidate slots per key.
    pub arity: Arity,
    /// Exponent a new table starts at and never shrinks below.
    pub min_exponent: u32,
    /// Exponent the table may not grow beyond.
    pub max_exponent: u32,
    /// Highest load factor kept after an insert; half of it is the shrink
    /// threshold.
    pub max_load_factor: f64,
    /// Rehashes attempted at the current capacity before growing.
    pub max_rehashes: u32,
}

impl TableConfig {
    /// The reference configuration for `arity`: 1024 to 65536 slots, the
    /// arity's default load factor, three rehashes before growing.
    pub fn for_arity(arity: Arity) -> Self {
        TableConfig {
            arity,
            min_exponent: MIN_EXPONENT,
            max_exponent: MAX_EXPONENT,
            max_load_factor: arity.default_max_load_factor(),
            max_rehashes: MAX_REHASHES,
        }
    }

    /// Reference 2-way configuration, maximum load factor 0.5.
    pub fn two_way() -> Self {
        Self::for_arity(Arity::Two)
    }

    /// Reference 3-way configuration, maximum load factor 0.9.
    pub fn three_way() -> Self {
        Self::for_arity(Arity::Three)
    }

    /// Sets the capacity exponent range, `2^min` to `2^max` slots.
    ///
    /// The slot array is allocated eagerly on every rebuild: a table at
    /// exponent `e` holds `2^e` slots of 12 bytes each. See
    /// [`EXPONENT_LIMIT`].
    pub fn with_exponent_bounds(mut self, min_exponent: u32, max_exponent: u32) -> Self {
        self.min_exponent = min_exponent;
        self.max_exponent = max_exponent;
        self
    }

    /// Sets the maximum load factor.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Sets how many in-place rehashes are attempted before growing, at most
    /// [`REHASH_LIMIT`].
    pub fn with_max_rehashes(mut self, max_rehashes: u32) -> Self {
        self.max_rehashes = max_rehashes;
        self
    }

    /// Checks that the exponent range and load factor are usable.
    pub fn validate(&self) -> Result<(), CuckooError> {
        let reason = if self.min_exponent == 0 {
            format!("min_exponent must be at least 1, got {}", self.min_exponent)
        } else if self.min_exponent > self.max_exponent {
            format!(
                "min_exponent {} exceeds max_exponent {}",
                self.min_exponent, self.max_exponent
            )
        } else if self.max_exponent > EXPONENT_LIMIT {
            format!(
                "max_exponent {} exceeds the limit of {EXPONENT_LIMIT}",
                self.max_exponent
            )
        } else if !(self.max_load_factor > 0.0 && self.max_load_factor <= 1.0) {
            format!(
                "max_load_factor must be in (0, 1], got {}",
                self.max_load_factor
            )
        } else if self.max_rehashes > REHASH_LIMIT {
            format!(
                "max_rehashes {} exceeds the limit of {REHASH_LIMIT}",
                self.max_rehashes
            )
        } else {
            return Ok(());
        };

        Err(CuckooError::InvalidConfig { reason })
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::two_way()
    }
}
