//! Stable string hashing.
//!
//! Image seeds and placeholder colours must not change between runs, so the
//! randomised std hasher is not an option.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a of the UTF-8 bytes of `text`.
#[must_use]
pub fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
