//! Kerberos RC4-HMAC (etype 23, RFC 4757) decrypt-and-verify oracle.
//!
//! For a candidate key the oracle derives K1 from the message-type usage
//! number, seeds an RC4 key K3 from the stored checksum field, decrypts the
//! confounder+data region, and recomputes the checksum over the plaintext.
//! A checksum match is the sole cracking signal; a mismatch is the normal,
//! overwhelmingly common outcome and stays allocation-free. The oracle owns
//! all of its scratch and is meant to be owned by a single worker.
use crate::hmac_md5::{HmacMd5, TAG_SIZE};
use crate::ntlm::NtKey;
use crate::rc4;

/// Length of the stored checksum field.
pub const CHECKSUM_SIZE: usize = TAG_SIZE;
/// Length of the random confounder prefix inside the plaintext.
pub const CONFOUNDER_SIZE: usize = 8;
/// Minimum ciphertext length: checksum field plus confounder.
pub const MIN_CIPHERTEXT_LEN: usize = CHECKSUM_SIZE + CONFOUNDER_SIZE;

/// Kerberos message whose encrypted part is under attack. The variant
/// selects the key-usage number mixed into K1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// TGS-REP encrypted part (usage 2).
    TgsRep,
    /// AS-REP encrypted part (usage 8).
    AsRep,
}

impl MessageType {
    pub fn usage(self) -> u32 {
        match self {
            MessageType::TgsRep => 2,
            MessageType::AsRep => 8,
        }
    }

    fn usage_le(self) -> [u8; 4] {
        self.usage().to_le_bytes()
    }
}

/// Outcome of one decryption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleResult {
    /// Checksum verified; the candidate key is correct. Carries the
    /// application data and the discarded confounder.
    Decrypted {
        data: Vec<u8>,
        confounder: [u8; CONFOUNDER_SIZE],
    },
    /// Wrong key. The expected negative result.
    ChecksumMismatch,
    /// Ciphertext too short to contain checksum + confounder.
    MalformedInput,
}

/// Reusable decryption oracle. One per worker.
pub struct Rc4HmacOracle {
    hmac: HmacMd5,
    plaintext: Vec<u8>,
    k1: [u8; TAG_SIZE],
    k3: [u8; TAG_SIZE],
    checksum: [u8; TAG_SIZE],
}

impl Default for Rc4HmacOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rc4HmacOracle {
    pub fn new() -> Self {
        Self {
            hmac: HmacMd5::new(),
            plaintext: Vec::new(),
            k1: [0u8; TAG_SIZE],
            k3: [0u8; TAG_SIZE],
            checksum: [0u8; TAG_SIZE],
        }
    }

    /// Attempt to decrypt `ciphertext` under `key`.
    pub fn decrypt(
        &mut self,
        key: &NtKey,
        message_type: MessageType,
        ciphertext: &[u8],
    ) -> OracleResult {
        if ciphertext.len() < MIN_CIPHERTEXT_LEN {
            return OracleResult::MalformedInput;
        }
        let (stored_checksum, encrypted) = ciphertext.split_at(CHECKSUM_SIZE);

        self.hmac
            .authenticate(key, &message_type.usage_le(), &mut self.k1);
        self.hmac
            .authenticate(&self.k1, stored_checksum, &mut self.k3);

        self.plaintext.clear();
        self.plaintext.extend_from_slice(encrypted);
        rc4::apply_in_place(&self.k3, &mut self.plaintext);

        self.hmac
            .authenticate(&self.k1, &self.plaintext, &mut self.checksum);

        if self.checksum[..] != *stored_checksum {
            return OracleResult::ChecksumMismatch;
        }

        let mut confounder = [0u8; CONFOUNDER_SIZE];
        confounder.copy_from_slice(&self.plaintext[..CONFOUNDER_SIZE]);
        OracleResult::Decrypted {
            data: self.plaintext[CONFOUNDER_SIZE..].to_vec(),
            confounder,
        }
    }
}

/// Inverse of [`Rc4HmacOracle::decrypt`]: build an etype-23 encrypted blob
/// from a confounder and application data. Used to construct verifiable
/// fixtures for tests and for the end-to-end harness.
pub fn encrypt(
    key: &NtKey,
    message_type: MessageType,
    confounder: &[u8; CONFOUNDER_SIZE],
    data: &[u8],
) -> Vec<u8> {
    let mut hmac = HmacMd5::new();
    let k1 = hmac.tag(key, &message_type.usage_le());

    let mut plaintext = Vec::with_capacity(CONFOUNDER_SIZE + data.len());
    plaintext.extend_from_slice(confounder);
    plaintext.extend_from_slice(data);

    let checksum = hmac.tag(&k1, &plaintext);
    let k3 = hmac.tag(&k1, &checksum);
    rc4::apply_in_place(&k3, &mut plaintext);

    let mut out = Vec::with_capacity(CHECKSUM_SIZE + plaintext.len());
    out.extend_from_slice(&checksum);
    out.extend_from_slice(&plaintext);
    out
}
