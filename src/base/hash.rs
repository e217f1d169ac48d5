//! Stable, non-cryptographic identity hashing.
//!
//! Ids must be a pure function of their canonical key so that re-parsing the
//! same text reproduces the same ids. FNV-1a 64-bit is used throughout:
//! - node ids hash the structural path (`root/PartDef:Car#0`)
//! - edge ids hash `(kind, source, target, label)`
//! - patch ids hash `(op, target, payload)`
//! - snapshot hashes cover whole source texts

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

/// Prefix used for serialized content hashes.
pub const CONTENT_HASH_PREFIX: &str = "fnv1a64:";

/// FNV-1a 64-bit over arbitrary bytes.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash a sequence of key parts.
///
/// Parts are separated by a unit-separator byte so that `("ab", "c")` and
/// `("a", "bc")` never collide structurally.
pub fn hash_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            hash ^= 0x1f;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        for b in part.as_bytes() {
            hash ^= (*b) as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Build a prefixed id such as `n_0123456789abcdef`.
pub fn stable_id<'a>(prefix: &str, parts: impl IntoIterator<Item = &'a str>) -> String {
    format!("{prefix}_{:016x}", hash_parts(parts))
}

/// Snapshot hash of a whole text (`"fnv1a64:<16 hex digits>"`).
pub fn content_hash(text: &str) -> String {
    format!("{CONTENT_HASH_PREFIX}{:016x}", fnv1a64(text.as_bytes()))
}
