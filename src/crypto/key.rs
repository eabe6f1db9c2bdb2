// EB Env Backup: Digest-derived key material
//
// Adapts a secret of any length to the fixed AES-256 key size by hashing it
// once with MD5 and using the lowercase hex rendering of the 128-bit digest as
// the 32 key bytes. No salt and no iteration count: this is not a password
// KDF and offers no brute-force resistance beyond the digest itself. Every
// existing backup was written with this derivation, so changing it is a
// breaking format revision.

use md5::{Digest, Md5};
use zeroize::{Zeroize, Zeroizing};

/// Length of the derived AES-256 key in bytes (hex of a 16-byte digest).
pub const KEY_LEN: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Derive the cipher key for `secret`. Deterministic.
pub fn derive_key(secret: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut digest: [u8; 16] = Md5::digest(secret).into();

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    for (i, byte) in digest.iter().enumerate() {
        key[2 * i] = HEX_DIGITS[(byte >> 4) as usize];
        key[2 * i + 1] = HEX_DIGITS[(byte & 0x0f) as usize];
    }
    digest.zeroize();
    key
}
