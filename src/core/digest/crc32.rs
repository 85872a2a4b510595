//! Zip-compatible CRC-32.
//!
//! Table-driven, reflected polynomial 0xedb88320, seed 0xffffffff, final
//! complement, big-endian output bytes. Suitable for interop with archive
//! formats and legacy manifests only; it is not secure for new uses.

use std::sync::LazyLock;

/// Default CRC-32 polynomial (reflected), as used by zip and friends.
pub const DEFAULT_POLYNOMIAL: u32 = 0xedb8_8320;

/// Default CRC-32 seed value.
pub const DEFAULT_SEED: u32 = 0xffff_ffff;

/// Lookup table for the default polynomial. Built once on first use and
/// shared read-only between every default-configured instance.
static DEFAULT_TABLE: LazyLock<[u32; 256]> = LazyLock::new(|| build_table(DEFAULT_POLYNOMIAL));

fn build_table(polynomial: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut entry = i as u32;
        for _ in 0..8 {
            entry = if entry & 1 == 1 {
                (entry >> 1) ^ polynomial
            } else {
                entry >> 1
            };
        }
        *slot = entry;
    }
    table
}

enum Table {
    Shared(&'static [u32; 256]),
    Owned(Box<[u32; 256]>),
}

impl Table {
    fn get(&self) -> &[u32; 256] {
        match self {
            Table::Shared(table) => table,
            Table::Owned(table) => table,
        }
    }
}

/// Incremental CRC-32 state
pub struct Crc32 {
    table: Table,
    seed: u32,
    hash: u32,
}

impl Crc32 {
    /// CRC-32 with the default polynomial and seed.
    pub fn new() -> Self {
        Self {
            table: Table::Shared(&DEFAULT_TABLE),
            seed: DEFAULT_SEED,
            hash: DEFAULT_SEED,
        }
    }

    /// CRC-32 over a custom polynomial and seed. The default polynomial
    /// reuses the shared table; anything else gets a private one.
    pub fn with_parameters(polynomial: u32, seed: u32) -> Self {
        let table = if polynomial == DEFAULT_POLYNOMIAL {
            Table::Shared(&DEFAULT_TABLE)
        } else {
            Table::Owned(Box::new(build_table(polynomial)))
        };
        Self {
            table,
            seed,
            hash: seed,
        }
    }

    /// Reset the running checksum to the seed.
    pub fn reset(&mut self) {
        self.hash = self.seed;
    }

    /// Feed bytes into the running checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        let table = self.table.get();
        for &byte in bytes {
            self.hash = (self.hash >> 8) ^ table[((self.hash ^ byte as u32) & 0xff) as usize];
        }
    }

    /// The final checksum value.
    pub fn value(&self) -> u32 {
        !self.hash
    }

    /// The final checksum as big-endian bytes, the order zip tooling and
    /// hex renderings expect.
    pub fn finalize(&self) -> [u8; 4] {
        self.value().to_be_bytes()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value_matches_the_standard() {
        // The canonical CRC-32 check input
        let mut crc = Crc32::new();
        crc.update(b"123456789");
        assert_eq!(crc.value(), 0xcbf4_3926);
        assert_eq!(crc.finalize(), [0xcb, 0xf4, 0x39, 0x26]);
    }

    #[test]
    fn empty_input_yields_zero() {
        let crc = Crc32::new();
        assert_eq!(crc.value(), 0);
    }

    #[test]
    fn incremental_equals_one_shot() {
        let mut split = Crc32::new();
        split.update(b"1234");
        split.update(b"56789");

        let mut whole = Crc32::new();
        whole.update(b"123456789");

        assert_eq!(split.value(), whole.value());
    }

    #[test]
    fn reset_restores_the_seed() {
        let mut crc = Crc32::new();
        crc.update(b"garbage");
        crc.reset();
        crc.update(b"123456789");
        assert_eq!(crc.value(), 0xcbf4_3926);
    }

    #[test]
    fn custom_parameters_with_default_polynomial_match_default() {
        let mut custom = Crc32::with_parameters(DEFAULT_POLYNOMIAL, DEFAULT_SEED);
        custom.update(b"123456789");
        assert_eq!(custom.value(), 0xcbf4_3926);
    }

    #[test]
    fn custom_polynomial_differs() {
        // CRC-32C (Castagnoli) polynomial must not collide with the
        // default on the check input
        let mut castagnoli = Crc32::with_parameters(0x82f6_3b78, DEFAULT_SEED);
        castagnoli.update(b"123456789");
        assert_ne!(castagnoli.value(), 0xcbf4_3926);
    }
}
