//! Seeded 32-bit hashing and slot index derivation.
//!
//! [`murmur3_32`] is MurmurHash3 (x86, 32-bit) specialized to a single 4-byte
//! block: the key is the only block, there is no tail, and the length folded
//! into the finalizer is always 4. The constants are fixed; every candidate
//! slot the table computes depends on them.
//!
//! See <https://github.com/aappleby/smhasher/wiki/MurmurHash3>.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const BLOCK_LEN: u32 = 4;

/// Hashes a single `u32` key with the given seed.
///
/// The function is pure: the same `(key, seed)` pair always yields the same
/// digest, and unrelated seeds yield unrelated digests for the same key.
///
/// # Examples
///
/// ```rust
/// use cuckoo_table::hash::murmur3_32;
///
/// assert_eq!(murmur3_32(0, 0), 0x2362_f9de);
/// assert_ne!(murmur3_32(7, 1), murmur3_32(7, 2));
/// ```
#[inline]
pub fn murmur3_32(key: u32, seed: u32) -> u32 {
    let mut k = key.wrapping_mul(C1);
    k = k.rotate_left(15);
    k = k.wrapping_mul(C2);

    let mut h = seed ^ k;
    h = h.rotate_left(13);
    h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);

    h ^= BLOCK_LEN;
    fmix32(h)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// The two slot indices carried by one digest for a table of `2^bits` slots.
///
/// `high` is the top `bits` bits of the digest and `low` the bottom `bits`
/// bits. Both are always `< 2^bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexFields {
    /// `digest >> (32 - bits)`
    pub high: usize,
    /// `digest & (2^bits - 1)`
    pub low: usize,
}

impl IndexFields {
    /// Splits `digest` into index fields for a table of `2^bits` slots.
    ///
    /// `bits` must be in `1..=31`; table configuration validation guarantees
    /// this for every exponent a table can reach.
    #[inline(always)]
    pub fn split(digest: u32, bits: u32) -> Self {
        debug_assert!((1..=31).contains(&bits));
        IndexFields {
            high: (digest >> (32 - bits)) as usize,
            low: (digest & ((1u32 << bits) - 1)) as usize,
        }
    }
}
