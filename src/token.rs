use sha2::{Digest, Sha256, Sha512};

/// Length of a SHA-256 digest rendered as lowercase hex.
pub const HEX256_LEN: usize = 64;
/// Length of a SHA-512 digest rendered as lowercase hex.
pub const HEX512_LEN: usize = 128;

/// Hash `input` (UTF-8 bytes) with both digest algorithms and render each as
/// lowercase hex: 64 characters for SHA-256, 128 for SHA-512.
pub fn digest(input: &str) -> (String, String) {
    let hex256 = hex::encode(Sha256::digest(input.as_bytes()));
    let hex512 = hex::encode(Sha512::digest(input.as_bytes()));
    (hex256, hex512)
}

/// Derive a token from the two hex digests of the same input.
///
/// The token is a prefix of the 256-bit digest followed by a suffix of the
/// 512-bit digest. Truncation collisions in one algorithm are unlikely to
/// coincide with truncation collisions in the other, so the combined token
/// collides less often than a single slice of the same total length.
///
/// `slice_len` is clamped independently against each digest's bounds, so the
/// resulting length is `clamp(n, 1, 64) + clamp(n, 1, 128)`.
pub fn build_token(hex256: &str, hex512: &str, slice_len: usize) -> String {
    let prefix_len = slice_len.clamp(1, HEX256_LEN);
    let suffix_len = slice_len.clamp(1, HEX512_LEN);

    let mut token = String::with_capacity(prefix_len + suffix_len);
    token.push_str(&hex256[..prefix_len]);
    token.push_str(&hex512[hex512.len() - suffix_len..]);
    token
}

/// Full derivation: URL in, token out. Deterministic, so re-submitting the
/// same URL with the same `slice_len` always yields the same token.
pub fn token_for(url: &str, slice_len: usize) -> String {
    let (hex256, hex512) = digest(url);
    build_token(&hex256, &hex512, slice_len)
}
