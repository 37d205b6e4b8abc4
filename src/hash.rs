use fnv::FnvHasher;
use std::hash::Hasher;

/// Hash whatever `f` writes with FNV-1a 64.
///
/// Unlike `DefaultHasher`, the output is fixed for a given byte sequence on
/// every platform and toolchain. Callers must feed explicitly-ordered bytes
/// (e.g. `to_le_bytes`), since the integer `write_*` defaults use native order.
pub fn stable_hash_with(f: impl FnOnce(&mut FnvHasher)) -> u64 {
    let mut hasher = FnvHasher::default();
    f(&mut hasher);
    hasher.finish()
}

pub fn stable_hash_i64s(values: &[i64]) -> u64 {
    stable_hash_with(|hasher| {
        for value in values {
            hasher.write(&value.to_le_bytes());
        }
    })
}
