//! Error taxonomy for the cracking library.
//!
//! A checksum mismatch is the expected negative result of an attempt and is
//! not an error; everything in here is either an input problem caught before
//! the engine starts or a fault that aborts a running search.
use thiserror::Error;

use crate::oracle::MIN_CIPHERTEXT_LEN;

#[derive(Debug, Error)]
pub enum CrackError {
    /// Target ciphertext too short to hold checksum + confounder. Indicates
    /// the target data itself is unusable, so a running search aborts.
    #[error(
        "malformed ciphertext for target '{label}': {len} bytes, need at least {MIN_CIPHERTEXT_LEN}"
    )]
    MalformedCiphertext { label: String, len: usize },

    /// NTLM hash string that is not 32 hex digits.
    #[error("invalid NTLM hash '{0}': expected 32 hex digits")]
    InvalidNtHash(String),

    /// AS-REP hash string not in the hashcat `$krb5asrep$23$...` form.
    #[error("invalid AS-REP hash: expected $krb5asrep$23$<user@realm>:<checksum>$<cipher>")]
    InvalidAsRepHash,

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
