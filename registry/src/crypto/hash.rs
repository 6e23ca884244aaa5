//! # Hashing Utilities
//!
//! BLAKE3 is the registry's only digest. It hashes signed-message bytes into
//! the 32-byte digests that signatures cover, derives addresses from public
//! keys, and commits the evicted-address set at recovery time. One hash
//! function, used everywhere, because two hash functions means someone will
//! eventually feed the wrong one to a comparison.

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest as a fixed-size array. The `blake3` crate picks
/// up SIMD automatically; for the sub-kilobyte inputs this registry hashes,
/// single-threaded throughput is the whole story.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into one hasher produces the same digest
/// as hashing the concatenation, minus the temporary buffer. This is how the
/// evicted-address set commitment is computed: each 32-byte address is one
/// part, in enumeration order.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake3_deterministic() {
        let a = blake3_hash(b"tessera");
        let b = blake3_hash(b"tessera");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn blake3_case_sensitive() {
        assert_ne!(blake3_hash(b"tessera"), blake3_hash(b"Tessera"));
    }

    #[test]
    fn multi_matches_concatenation() {
        let multi = blake3_hash_multi(&[b"hello", b" world"]);
        let single = blake3_hash(b"hello world");
        assert_eq!(multi, single);
    }

    #[test]
    fn multi_empty_is_empty_hash() {
        assert_eq!(blake3_hash_multi(&[]), blake3_hash(b""));
    }
}
