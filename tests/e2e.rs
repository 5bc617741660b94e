use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

use kerbcrack::ntlm::NtlmHasher;
use kerbcrack::oracle::{self, MessageType};

const CONFOUNDER: [u8; 8] = [0xaa, 0xbb, 0xcc, 0xdd, 0x11, 0x22, 0x33, 0x44];

fn write_wordlist(path: &std::path::Path, words: &[&str]) {
    let mut f = fs::File::create(path).unwrap();
    for w in words {
        writeln!(f, "{w}").unwrap();
    }
}

fn ticket_blob(password: &str, message_type: MessageType) -> Vec<u8> {
    let key = NtlmHasher::new().key_for(password);
    oracle::encrypt(&key, message_type, &CONFOUNDER, b"synthetic enc-part")
}

#[test]
fn ntlm_mode_cracks_a_known_hash() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["alpha", "hello world", "bravo"]);

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("ntlm")
        .arg("--hash")
        .arg("e1cf2a4200eecdf14a4691bbf1ba255a")
        .arg("-w")
        .arg(&wl)
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("found password for NTLM hash: hello world"))
        .stdout(predicate::str::contains("Successfully cracked all 1 targets"));
}

#[test]
fn asrep_mode_cracks_a_hashcat_format_hash() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["nope", "Spring2024!", "also-nope"]);

    let blob = ticket_blob("Spring2024!", MessageType::AsRep);
    let hash = format!(
        "$krb5asrep$23$user@EXAMPLE.COM:{}${}",
        hex::encode(&blob[..16]),
        hex::encode(&blob[16..])
    );

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("asrep")
        .arg("--hash")
        .arg(&hash)
        .arg("-w")
        .arg(&wl)
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("found password for AS-REP hash: Spring2024!"));
}

#[test]
fn tgs_mode_cracks_some_tickets_and_reports_the_rest() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["wrong-1", "ServiceAcct#1", "wrong-2"]);

    let cracked = tmp.path().join("cracked.bin");
    let uncracked = tmp.path().join("uncracked.bin");
    fs::write(&cracked, ticket_blob("ServiceAcct#1", MessageType::TgsRep)).unwrap();
    fs::write(&uncracked, ticket_blob("NotInTheList", MessageType::TgsRep)).unwrap();

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("tgs")
        .arg("-f")
        .arg(&cracked)
        .arg("-f")
        .arg(&uncracked)
        .arg("-w")
        .arg(&wl)
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cracking 2 tickets..."))
        .stdout(predicate::str::contains("ServiceAcct#1"))
        .stdout(predicate::str::contains("Cracked 1/2 targets"))
        .stdout(predicate::str::contains("uncracked:"));
}

#[test]
fn lazy_and_eager_modes_agree() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["x", "y", "hello world", "z"]);

    for flags in [&[][..], &["--lazy"][..]] {
        let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
        cmd.arg("ntlm")
            .arg("--hash")
            .arg("e1cf2a4200eecdf14a4691bbf1ba255a")
            .arg("-w")
            .arg(&wl)
            .args(flags)
            .arg("--color")
            .arg("never");
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("hello world"));
    }
}

#[test]
fn missing_wordlist_fails_before_the_engine_starts() {
    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("ntlm")
        .arg("--hash")
        .arg("e1cf2a4200eecdf14a4691bbf1ba255a");
    cmd.assert().failure();
}

#[test]
fn missing_ticket_file_fails() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["word"]);

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("tgs")
        .arg("-f")
        .arg(tmp.path().join("no-such-ticket.bin"))
        .arg("-w")
        .arg(&wl);
    cmd.assert().failure();
}

#[test]
fn invalid_hash_strings_fail() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["word"]);

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("ntlm").arg("--hash").arg("nothex").arg("-w").arg(&wl);
    cmd.assert().failure();

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("asrep")
        .arg("--hash")
        .arg("$krb5asrep$17$wrong-etype")
        .arg("-w")
        .arg(&wl);
    cmd.assert().failure();
}

#[test]
fn runt_ticket_blob_is_rejected_with_a_diagnostic() {
    let tmp = tempdir().unwrap();
    let wl = tmp.path().join("words.txt");
    write_wordlist(&wl, &["word"]);
    let runt = tmp.path().join("runt.bin");
    fs::write(&runt, [0u8; 12]).unwrap();

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("tgs").arg("-f").arg(&runt).arg("-w").arg(&wl);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed ciphertext"));
}

#[test]
fn benchmark_mode_reports_rates_without_a_wordlist() {
    let tmp = tempdir().unwrap();
    let ticket = tmp.path().join("ticket.bin");
    fs::write(&ticket, ticket_blob("whatever", MessageType::TgsRep)).unwrap();

    let mut cmd = Command::cargo_bin("kerbcrack").unwrap();
    cmd.arg("tgs")
        .arg("-f")
        .arg(&ticket)
        .arg("--benchmark")
        .arg("-t")
        .arg("1")
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("keys/s"))
        .stdout(predicate::str::contains("Total:"));
}
