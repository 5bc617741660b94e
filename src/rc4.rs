//! RC4 stream cipher used as the confidentiality layer of Kerberos etype 23.
//!
//! The keystream is symmetric, so [`apply`] both encrypts and decrypts. The
//! key schedule starts from a compile-time identity permutation that every
//! call copies into its own stack scratch; the table itself is never mutated.

/// Identity permutation seeding the RC4 key schedule.
const IDENTITY: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    table
};

/// Maximum RC4 key length in bytes.
pub const MAX_KEY_LEN: usize = 256;

fn key_schedule(key: &[u8]) -> [u8; 256] {
    assert!(
        !key.is_empty() && key.len() <= MAX_KEY_LEN,
        "rc4 key length must be in 1..=256, got {}",
        key.len()
    );
    let mut state = IDENTITY;
    let mut j = 0u8;
    let mut k = 0usize;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[k]);
        state.swap(i, j as usize);
        k += 1;
        if k == key.len() {
            k = 0;
        }
    }
    state
}

/// XOR `src` with the keystream for `key` into `dst`. Lengths must match.
pub fn apply(key: &[u8], src: &[u8], dst: &mut [u8]) {
    assert_eq!(
        src.len(),
        dst.len(),
        "rc4 destination length must equal source length"
    );
    let mut state = key_schedule(key);
    let mut x = 0u8;
    let mut y = 0u8;
    for (d, &s) in dst.iter_mut().zip(src) {
        x = x.wrapping_add(1);
        let xv = state[x as usize];
        y = y.wrapping_add(xv);
        let yv = state[y as usize];
        state[x as usize] = yv;
        state[y as usize] = xv;
        *d = s ^ state[xv.wrapping_add(yv) as usize];
    }
}

/// In-place variant of [`apply`], used on the oracle's hot path so the
/// ciphertext scratch buffer doubles as the plaintext buffer.
pub fn apply_in_place(key: &[u8], data: &mut [u8]) {
    let mut state = key_schedule(key);
    let mut x = 0u8;
    let mut y = 0u8;
    for b in data.iter_mut() {
        x = x.wrapping_add(1);
        let xv = state[x as usize];
        y = y.wrapping_add(xv);
        let yv = state[y as usize];
        state[x as usize] = yv;
        state[y as usize] = xv;
        *b ^= state[xv.wrapping_add(yv) as usize];
    }
}

/// Produce `len` raw keystream bytes for `key`.
pub fn keystream(key: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    apply_in_place(key, &mut out);
    out
}
