use std::hash::Hasher;

use crate::records::RecordId;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomized per process, so per-record roller seeds are
/// derived with this instead.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Seed for a record's roller, stable across runs and platforms.
pub fn record_seed(base_seed: u64, record: RecordId) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(&base_seed.to_le_bytes());
    hasher.write(&record.0.to_le_bytes());
    hasher.finish()
}
