//! Keyed HMAC-MD5, the integrity and key-derivation primitive of etype 23.
//!
//! The construction is the standard one over a 64-byte block: keys longer
//! than a block are pre-hashed with MD5, then inner/outer pads are built by
//! XOR against the 0x36/0x5c patterns. An [`HmacMd5`] owns all of its
//! scratch so a worker can call it millions of times without allocating;
//! both pads are rewritten from the base patterns on every call, so a short
//! key never sees stale bytes from a longer previous key.
use md5::{Digest, Md5};

/// MD5 block size in bytes.
pub const BLOCK_SIZE: usize = 64;
/// HMAC-MD5 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Reusable HMAC-MD5 state.
pub struct HmacMd5 {
    inner: Md5,
    outer: Md5,
    ipad: [u8; BLOCK_SIZE],
    opad: [u8; BLOCK_SIZE],
}

impl Default for HmacMd5 {
    fn default() -> Self {
        Self::new()
    }
}

impl HmacMd5 {
    pub fn new() -> Self {
        Self {
            inner: Md5::new(),
            outer: Md5::new(),
            ipad: [0u8; BLOCK_SIZE],
            opad: [0u8; BLOCK_SIZE],
        }
    }

    /// Compute `HMAC-MD5(key, message)` into `out`.
    pub fn authenticate(&mut self, key: &[u8], message: &[u8], out: &mut [u8; TAG_SIZE]) {
        self.ipad = [0x36; BLOCK_SIZE];
        self.opad = [0x5c; BLOCK_SIZE];

        let mut hashed_key = [0u8; TAG_SIZE];
        let key = if key.len() > BLOCK_SIZE {
            self.outer.update(key);
            hashed_key.copy_from_slice(&self.outer.finalize_reset());
            &hashed_key[..]
        } else {
            key
        };

        for (i, &k) in key.iter().enumerate() {
            self.ipad[i] ^= k;
            self.opad[i] ^= k;
        }

        self.inner.update(self.ipad);
        self.inner.update(message);
        let inner_tag = self.inner.finalize_reset();

        self.outer.update(self.opad);
        self.outer.update(inner_tag);
        out.copy_from_slice(&self.outer.finalize_reset());
    }

    /// Convenience wrapper returning the tag by value.
    pub fn tag(&mut self, key: &[u8], message: &[u8]) -> [u8; TAG_SIZE] {
        let mut out = [0u8; TAG_SIZE];
        self.authenticate(key, message, &mut out);
        out
    }
}
