//! Hash containers used by the schema registry.
//!
//! `TypeId` keys go through [`NoOpHashState`], since a `TypeId` is already
//! a well distributed hash. String keys use [`FixedHashState`], a `foldhash`
//! state with a fixed seed.

use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5C4E_D1A6_03B2_F7E9);

/// Hash state for string-keyed indices.
///
/// Results only depend on the input, so iteration order of a given map is
/// stable between runs.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHashState

/// A hasher that passes a single `u64` straight through.
///
/// `TypeId` hashes itself with one `write_u64`, which is what this is for.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Keys are expected to call `write_u64`, this is the fallback.
        for byte in bytes.iter().rev() {
            // Rotating keeps `write_u32(n)` equal to `write_u64(n)`.
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`]s, for keys that already are a hash.
///
/// Only [`TypeIdMap`] uses it.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Aliases

pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;
pub type HashSet<K> = hashbrown::HashSet<K, FixedHashState>;
pub type TypeIdMap<V> = hashbrown::HashMap<TypeId, V, NoOpHashState>;

// -----------------------------------------------------------------------------
// Tests
