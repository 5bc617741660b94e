//! Target-specification parsing: the three input forms the engine accepts.
//!
//! Kirbi/ASN.1 ticket containers are decoded by external tooling; this
//! module only consumes their output — raw encrypted-part blobs — plus the
//! hashcat AS-REP string form and bare NTLM hex hashes.
use std::fs;
use std::path::Path;

use crate::engine::Target;
use crate::error::CrackError;
use crate::ntlm::{KEY_SIZE, NtKey};
use crate::oracle::MessageType;

/// Parse a bare NTLM hash: exactly 32 hex digits.
pub fn parse_nt_hash(s: &str) -> Result<NtKey, CrackError> {
    let s = s.trim();
    if s.len() != KEY_SIZE * 2 {
        return Err(CrackError::InvalidNtHash(s.to_string()));
    }
    let bytes = hex::decode(s).map_err(|_| CrackError::InvalidNtHash(s.to_string()))?;
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Extract the raw ciphertext from a hashcat-format AS-REP hash:
/// `$krb5asrep$23$<user@realm>:<checksum-hex>$<cipher-hex>`. The checksum
/// and cipher hex fields concatenate into the encrypted blob the oracle
/// consumes.
pub fn parse_as_rep_hash(s: &str) -> Result<Vec<u8>, CrackError> {
    let rest = s
        .trim()
        .strip_prefix("$krb5asrep$23$")
        .ok_or(CrackError::InvalidAsRepHash)?;
    let (ident_and_checksum, cipher) = rest.split_once('$').ok_or(CrackError::InvalidAsRepHash)?;
    if cipher.contains('$') {
        return Err(CrackError::InvalidAsRepHash);
    }
    let (_, checksum) = ident_and_checksum
        .split_once(':')
        .ok_or(CrackError::InvalidAsRepHash)?;
    let mut blob = hex::decode(checksum)?;
    blob.extend_from_slice(&hex::decode(cipher)?);
    Ok(blob)
}

/// Load one ticket target per file. Each file holds the raw encrypted part
/// of a TGS-REP; the filename becomes the target label.
pub fn load_ticket_targets<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Target>, CrackError> {
    let mut targets = Vec::with_capacity(paths.len());
    for (id, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let ciphertext = fs::read(path)?;
        targets.push(Target::ticket(
            id,
            path.display().to_string(),
            MessageType::TgsRep,
            ciphertext,
        ));
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_nt_hash() {
        let key = parse_nt_hash("e1cf2a4200eecdf14a4691bbf1ba255a").unwrap();
        assert_eq!(hex::encode(key), "e1cf2a4200eecdf14a4691bbf1ba255a");
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(parse_nt_hash("abcd").is_err());
        assert!(parse_nt_hash("zzcf2a4200eecdf14a4691bbf1ba255a").is_err());
        assert!(parse_nt_hash("").is_err());
    }

    #[test]
    fn parses_as_rep_hash_into_checksum_plus_cipher() {
        let blob =
            parse_as_rep_hash("$krb5asrep$23$user@EXAMPLE.COM:00112233445566778899aabbccddeeff$cafebabe")
                .unwrap();
        assert_eq!(blob.len(), 20);
        assert_eq!(hex::encode(&blob[..16]), "00112233445566778899aabbccddeeff");
        assert_eq!(hex::encode(&blob[16..]), "cafebabe");
    }

    #[test]
    fn rejects_malformed_as_rep_strings() {
        assert!(parse_as_rep_hash("$krb5tgs$23$x:aa$bb").is_err());
        assert!(parse_as_rep_hash("$krb5asrep$23$missing-dollar").is_err());
        assert!(parse_as_rep_hash("$krb5asrep$23$no-colon$aabb").is_err());
        assert!(parse_as_rep_hash("$krb5asrep$23$x:aa$bb$cc").is_err());
        assert!(parse_as_rep_hash("$krb5asrep$23$x:nothex$aabb").is_err());
    }

    #[test]
    fn ticket_targets_are_labeled_by_path_and_keyed_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, [0u8; 32]).unwrap();
        fs::write(&b, [1u8; 40]).unwrap();
        let targets = load_ticket_targets(&[&a, &b]).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].id, 0);
        assert_eq!(targets[1].id, 1);
        assert!(targets[1].label.ends_with("b.bin"));
    }

    #[test]
    fn missing_ticket_file_is_an_io_error() {
        let err = load_ticket_targets(&[Path::new("/no/such/ticket.bin")]).unwrap_err();
        assert!(matches!(err, CrackError::Io(_)));
    }
}
