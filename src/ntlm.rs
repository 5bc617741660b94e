//! NTLM key derivation: MD4 over the UTF-16LE encoding of a password.
//!
//! The resulting 16-byte digest is both the NTLM credential hash and the
//! base key for RC4-HMAC decryption.
use md4::{Digest, Md4};

/// Size of a derived NT key in bytes.
pub const KEY_SIZE: usize = 16;

/// A derived NT key (MD4 digest).
pub type NtKey = [u8; KEY_SIZE];

/// NT hash of the empty password.
pub const NULL_NT_KEY: NtKey = [
    0x31, 0xd6, 0xcf, 0xe0, 0xd1, 0x6a, 0xe9, 0x31, 0xb7, 0x3c, 0x59, 0xd7, 0xe0, 0xc0, 0x89, 0xc0,
];

/// Reusable NTLM hasher. Each worker owns one; the UTF-16 encode buffer is
/// reused across candidates.
pub struct NtlmHasher {
    md4: Md4,
    utf16_buf: Vec<u8>,
}

impl Default for NtlmHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl NtlmHasher {
    pub fn new() -> Self {
        Self {
            md4: Md4::new(),
            utf16_buf: Vec::with_capacity(64),
        }
    }

    /// Derive the NT key for `password` into `out`.
    ///
    /// Each code point is truncated to a single 16-bit code unit, without
    /// surrogate-pair encoding. Passwords containing characters outside the
    /// basic multilingual plane therefore hash to a value that no real
    /// UTF-16LE encoder would produce; this is a known limitation shared
    /// with the derivation this mirrors.
    pub fn derive(&mut self, password: &str, out: &mut NtKey) {
        self.utf16_buf.clear();
        for c in password.chars() {
            self.utf16_buf.extend_from_slice(&(c as u16).to_le_bytes());
        }
        self.md4.update(&self.utf16_buf);
        out.copy_from_slice(&self.md4.finalize_reset());
    }

    /// Convenience wrapper returning the key by value.
    pub fn key_for(&mut self, password: &str) -> NtKey {
        let mut out = [0u8; KEY_SIZE];
        self.derive(password, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_vector() {
        let mut hasher = NtlmHasher::new();
        let key = hasher.key_for("hello world");
        assert_eq!(hex::encode(key), "e1cf2a4200eecdf14a4691bbf1ba255a");
    }

    #[test]
    fn empty_password_is_null_hash() {
        let mut hasher = NtlmHasher::new();
        assert_eq!(hasher.key_for(""), NULL_NT_KEY);
    }

    #[test]
    fn buffer_reuse_does_not_bleed_between_candidates() {
        let mut hasher = NtlmHasher::new();
        let _ = hasher.key_for("a much longer candidate password first");
        let reused = hasher.key_for("hello world");
        assert_eq!(hex::encode(reused), "e1cf2a4200eecdf14a4691bbf1ba255a");
    }

    #[test]
    fn non_ascii_password_uses_code_units() {
        // "pässword" encodes 0xE4 as a single LE code unit.
        let mut hasher = NtlmHasher::new();
        let direct = hasher.key_for("p\u{e4}ssword");
        let mut manual = Vec::new();
        for c in "p\u{e4}ssword".chars() {
            manual.extend_from_slice(&(c as u16).to_le_bytes());
        }
        let expected: NtKey = Md4::digest(&manual).into();
        assert_eq!(direct, expected);
    }
}
