//! The cuckoo table engine.
//!
//! Every key has a fixed set of candidate slots derived from seeded digests of
//! the key (see [`crate::hash`]). A stored entry always sits in one of its
//! candidates, so lookups and removals probe at most three slots.
//!
//! Inserting walks a displacement chain: the carried entry takes a slot, and
//! whatever occupied it moves on to its next candidate. A walk that runs for
//! `capacity` steps without reaching an empty slot has stalled. Stalls are
//! resolved by rebuilding the table with fresh seeds (a rehash), and once the
//! rehash budget for the current capacity is spent, by rebuilding at twice the
//! capacity (a grow). Removals that leave the table sparse rebuild it at half
//! the capacity (a shrink).

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::mem;

use rand::RngCore;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::StdRng;

use crate::Arity;
use crate::CuckooError;
use crate::TableConfig;
use crate::hash::IndexFields;
use crate::hash::murmur3_32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: u32,
    value: u32,
}

/// Seeds of the candidate digests. 2-way tables only use `primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seeds {
    primary: u32,
    secondary: u32,
}

impl Seeds {
    fn draw<R: RngCore>(arity: Arity, rng: &mut R) -> Self {
        let primary = rng.next_u32();
        let secondary = match arity {
            Arity::Two => 0,
            Arity::Three => rng.next_u32(),
        };
        Seeds { primary, secondary }
    }
}

/// Candidate slot indices of one key, in displacement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidates {
    Two([usize; 2]),
    Three([usize; 3]),
}

impl Candidates {
    #[inline(always)]
    fn slots(&self) -> &[usize] {
        match self {
            Candidates::Two(slots) => slots,
            Candidates::Three(slots) => slots,
        }
    }

    #[inline(always)]
    fn first(&self) -> usize {
        self.slots()[0]
    }

    /// Where an entry evicted from `index` moves to.
    ///
    /// The order is a fixed rotation over the candidates (h1 -> h2 -> h3 ->
    /// h1), not a free choice among the ones it does not currently occupy.
    #[inline(always)]
    fn next_after(&self, index: usize) -> usize {
        match *self {
            Candidates::Two([h1, h2]) => {
                if index == h1 {
                    h2
                } else {
                    h1
                }
            }
            Candidates::Three([h1, h2, h3]) => {
                if index == h1 {
                    h2
                } else if index == h2 {
                    h3
                } else {
                    h1
                }
            }
        }
    }
}

/// A rebuild ran out of capacity before every entry was placed.
struct Exhausted;

/// Table state saved across a rebuild so a failed rebuild can be undone.
struct Snapshot {
    slots: Vec<Option<Entry>>,
    seeds: Seeds,
    exponent: u32,
    len: usize,
    rehash_count: u32,
}

/// Cumulative counters describing how hard a table has had to work.
///
/// Attempts are counted even when the rebuild they started was rolled back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Displacement walks that hit their step bound.
    pub stalls: u64,
    /// Rebuilds at the same capacity with fresh seeds.
    pub rehashes: u64,
    /// Rebuilds at twice the capacity.
    pub grows: u64,
    /// Rebuilds at half the capacity.
    pub shrinks: u64,
    /// All rebuilds, including ones nested inside other rebuilds.
    pub reorganizations: u64,
    /// Entries evicted from their slot by a displacement walk.
    pub displacements: u64,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stalls: {}, rehashes: {}, grows: {}, shrinks: {}, reorganizations: {}, displacements: {}",
            self.stalls,
            self.rehashes,
            self.grows,
            self.shrinks,
            self.reorganizations,
            self.displacements
        )
    }
}

/// A `u32 -> u32` cuckoo hash table.
///
/// The table starts at `2^min_exponent` slots and keeps its capacity between
/// the configured exponent bounds. Seeds for the candidate digests come from
/// the table's RNG and are redrawn on every rebuild; the default RNG is a
/// [`StdRng`] seeded from the operating system.
///
/// The table is not synchronized. Callers sharing one across threads must
/// guard it with a lock.
///
/// ## Example
///
/// ```rust
/// use cuckoo_table::Arity;
/// use cuckoo_table::CuckooTable;
///
/// let mut table = CuckooTable::new(Arity::Two);
/// assert_eq!(table.insert(42, 7), Ok(true));
/// assert_eq!(table.get(42), Some(7));
///
/// // Inserting a present key is a no-op.
/// assert_eq!(table.insert(42, 99), Ok(false));
/// assert_eq!(table.get(42), Some(7));
///
/// assert_eq!(table.remove(42), Some(7));
/// assert_eq!(table.get(42), None);
/// ```
#[derive(Clone)]
pub struct CuckooTable<R = StdRng> {
    slots: Vec<Option<Entry>>,
    config: TableConfig,
    seeds: Seeds,
    exponent: u32,
    len: usize,
    rehash_count: u32,
    rng: R,
    stats: TableStats,
}

impl<R> Debug for CuckooTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooTable")
            .field("arity", &self.config.arity)
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .field("exponent", &self.exponent)
            .field("rehash_count", &self.rehash_count)
            .field("seeds", &self.seeds)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl CuckooTable<StdRng> {
    /// Creates an empty table with the reference configuration for `arity`.
    ///
    /// # Panics
    ///
    /// Panics if the operating system's random source is unavailable. Use
    /// [`CuckooTable::with_config`] to handle that case.
    pub fn new(arity: Arity) -> Self {
        Self::from_parts(TableConfig::for_arity(arity), StdRng::from_os_rng())
    }

    /// Creates an empty table with a custom configuration, seeded from the
    /// operating system's random source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_table::CuckooTable;
    /// use cuckoo_table::TableConfig;
    ///
    /// let table = CuckooTable::with_config(TableConfig::three_way().with_exponent_bounds(6, 12))?;
    /// assert_eq!(table.capacity(), 64);
    /// # Ok::<(), cuckoo_table::CuckooError>(())
    /// ```
    pub fn with_config(config: TableConfig) -> Result<Self, CuckooError> {
        config.validate()?;

        let mut seed = [0u8; 32];
        let mut os = OsRng;
        os.try_fill_bytes(&mut seed)
            .map_err(|err| CuckooError::Entropy {
                reason: err.to_string(),
            })?;

        Ok(Self::from_parts(config, StdRng::from_seed(seed)))
    }
}

impl Default for CuckooTable<StdRng> {
    fn default() -> Self {
        Self::new(Arity::Two)
    }
}

impl<R: RngCore> CuckooTable<R> {
    /// Creates an empty table that draws its seeds from `rng`.
    ///
    /// Supplying a seeded RNG makes slot placement reproducible.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_table::CuckooTable;
    /// use cuckoo_table::TableConfig;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut table =
    ///     CuckooTable::with_config_and_rng(TableConfig::two_way(), StdRng::seed_from_u64(7))?;
    /// table.insert(1, 2)?;
    /// assert_eq!(table.get(1), Some(2));
    /// # Ok::<(), cuckoo_table::CuckooError>(())
    /// ```
    pub fn with_config_and_rng(config: TableConfig, rng: R) -> Result<Self, CuckooError> {
        config.validate()?;
        Ok(Self::from_parts(config, rng))
    }

    fn from_parts(config: TableConfig, mut rng: R) -> Self {
        let seeds = Seeds::draw(config.arity, &mut rng);
        CuckooTable {
            slots: vec![None; 1usize << config.min_exponent],
            config,
            seeds,
            exponent: config.min_exponent,
            len: 0,
            rehash_count: 0,
            rng,
            stats: TableStats::default(),
        }
    }

    /// Returns the value stored for `key`, if any.
    #[inline]
    pub fn get(&self, key: u32) -> Option<u32> {
        self.candidates(key)
            .slots()
            .iter()
            .find_map(|&index| match self.slots[index] {
                Some(entry) if entry.key == key => Some(entry.value),
                _ => None,
            })
    }

    /// Returns `true` if `key` is stored in the table.
    #[inline]
    pub fn contains_key(&self, key: u32) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `key => value` unless `key` is already present.
    ///
    /// Returns `Ok(true)` if the entry was added and `Ok(false)` if the key
    /// was already stored, in which case the stored value is left untouched.
    ///
    /// # Errors
    ///
    /// [`CuckooError::CapacityExhausted`] if a stall could not be resolved
    /// without growing past the maximum exponent. The table stays valid and
    /// keeps every other entry; see the error for the entry that was dropped.
    pub fn insert(&mut self, key: u32, value: u32) -> Result<bool, CuckooError> {
        if self.contains_key(key) {
            return Ok(false);
        }

        let entry = Entry { key, value };
        if self.exceeds_max_load(self.len + 1)
            && self.exponent < self.config.max_exponent
            && self.grow().is_err()
        {
            return Err(self.exhausted(entry));
        }

        self.place(entry)
            .map_err(|homeless| self.exhausted(homeless))?;
        Ok(true)
    }

    /// Removes `key` and returns its value. Removing an absent key does
    /// nothing.
    ///
    /// When the load factor falls below half the configured maximum, the
    /// table is rebuilt at half its capacity, but never below
    /// `2^min_exponent` slots.
    pub fn remove(&mut self, key: u32) -> Option<u32> {
        let mut removed = None;
        // A key occupies one slot, but every candidate is cleared in case it
        // shows up more than once.
        for &index in self.candidates(key).slots() {
            if matches!(self.slots[index], Some(entry) if entry.key == key) {
                removed = self.slots[index].take().map(|entry| entry.value);
                self.len -= 1;
            }
        }

        if removed.is_some()
            && self.load_factor() < self.config.max_load_factor / 2.0
            && self.shrink().is_err()
        {
            log_warn!(
                "shrink below {} slots rolled back, keeping current capacity",
                self.capacity()
            );
        }

        removed
    }

    /// Occupied slots divided by capacity.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, `2^exponent`.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The current capacity exponent.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Candidate slots per key.
    pub fn arity(&self) -> Arity {
        self.config.arity
    }

    /// The configuration the table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Rehashes performed at the current capacity since it last changed.
    pub fn rehash_count(&self) -> u32 {
        self.rehash_count
    }

    /// Cumulative work counters.
    pub fn stats(&self) -> TableStats {
        self.stats
    }

    #[inline]
    fn candidates(&self, key: u32) -> Candidates {
        let first = IndexFields::split(murmur3_32(key, self.seeds.primary), self.exponent);
        match self.config.arity {
            Arity::Two => Candidates::Two([first.high, first.low]),
            Arity::Three => {
                // second.low is derived with the rest but is never a candidate.
                let second =
                    IndexFields::split(murmur3_32(key, self.seeds.secondary), self.exponent);
                Candidates::Three([first.high, first.low, second.high])
            }
        }
    }

    fn exceeds_max_load(&self, len: usize) -> bool {
        len as f64 > self.config.max_load_factor * self.capacity() as f64
    }

    fn exhausted(&self, entry: Entry) -> CuckooError {
        log_warn!(
            "capacity exhausted at {} slots with {} entries; {} => {} left unplaced",
            self.capacity(),
            self.len,
            entry.key,
            entry.value
        );
        CuckooError::CapacityExhausted {
            key: entry.key,
            value: entry.value,
            max_exponent: self.config.max_exponent,
        }
    }

    /// Stores `entry`, rebuilding the table as often as needed.
    ///
    /// On failure the table holds everything it held before except the
    /// returned entry.
    fn place(&mut self, entry: Entry) -> Result<(), Entry> {
        let mut carried = entry;
        loop {
            match self.displace(carried) {
                Ok(()) => {
                    self.len += 1;
                    return Ok(());
                }
                Err(homeless) => {
                    self.stats.stalls += 1;
                    if self.resolve_stall().is_err() {
                        return Err(homeless);
                    }
                    carried = homeless;
                }
            }
        }
    }

    /// Runs one bounded displacement walk starting at the entry's first
    /// candidate. Returns the entry left homeless if the walk stalls.
    #[inline]
    fn displace(&mut self, entry: Entry) -> Result<(), Entry> {
        let mut carried = entry;
        let mut index = self.candidates(carried.key).first();

        for _ in 0..self.capacity() {
            let Some(evicted) = self.slots[index].replace(carried) else {
                return Ok(());
            };

            self.stats.displacements += 1;
            index = self.candidates(evicted.key).next_after(index);
            carried = evicted;
        }

        Err(carried)
    }

    #[cold]
    fn resolve_stall(&mut self) -> Result<(), Exhausted> {
        if self.rehash_count < self.config.max_rehashes {
            self.rehash()
        } else {
            self.grow()
        }
    }

    #[cold]
    fn rehash(&mut self) -> Result<(), Exhausted> {
        self.stats.rehashes += 1;
        self.reorganize(self.exponent, self.rehash_count + 1)
    }

    #[cold]
    fn grow(&mut self) -> Result<(), Exhausted> {
        if self.exponent >= self.config.max_exponent {
            return Err(Exhausted);
        }

        self.stats.grows += 1;
        log_debug!(
            "growing from {} to {} slots with {} entries",
            self.capacity(),
            self.capacity() * 2,
            self.len
        );
        self.reorganize(self.exponent + 1, 0)
    }

    #[cold]
    fn shrink(&mut self) -> Result<(), Exhausted> {
        if self.exponent <= self.config.min_exponent {
            return Ok(());
        }

        self.stats.shrinks += 1;
        log_debug!(
            "shrinking from {} to {} slots with {} entries",
            self.capacity(),
            self.capacity() / 2,
            self.len
        );
        self.reorganize(self.exponent - 1, 0)
    }

    /// Rebuilds the table at `2^exponent` slots with fresh seeds, replaying
    /// every entry in the old slot order.
    ///
    /// Replayed inserts may stall and trigger nested rebuilds. If any of them
    /// runs out of capacity, the table is restored to its state before this
    /// call.
    fn reorganize(&mut self, exponent: u32, rehash_count: u32) -> Result<(), Exhausted> {
        self.stats.reorganizations += 1;
        log_debug!(
            "reorganizing {} entries: {} -> {} slots, rehash {}",
            self.len,
            self.capacity(),
            1usize << exponent,
            rehash_count
        );

        let previous = Snapshot {
            slots: mem::replace(&mut self.slots, vec![None; 1usize << exponent]),
            seeds: self.seeds,
            exponent: self.exponent,
            len: self.len,
            rehash_count: self.rehash_count,
        };
        self.seeds = Seeds::draw(self.config.arity, &mut self.rng);
        self.exponent = exponent;
        self.len = 0;
        self.rehash_count = rehash_count;

        let failed = previous
            .slots
            .iter()
            .flatten()
            .any(|&entry| self.place(entry).is_err());

        if failed {
            log_debug!(
                "reorganize to {} slots failed, restoring {} slots",
                1usize << exponent,
                previous.slots.len()
            );
            self.slots = previous.slots;
            self.seeds = previous.seeds;
            self.exponent = previous.exponent;
            self.len = previous.len;
            self.rehash_count = previous.rehash_count;
            return Err(Exhausted);
        }

        Ok(())
    }
}
