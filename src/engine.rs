//! Crack engine: drives a pool of worker threads over one candidate stream
//! and a shared set of targets.
//!
//! Each worker pulls candidate chunks from the bounded queue, derives the NT
//! key once per candidate, and tests it against a snapshot of the currently
//! live targets. Targets are keyed by a stable id in an associative map and
//! claimed by removing that id under the write lock, so concurrent cracks of
//! different targets never interfere and the same target is reported at most
//! once. Global cancellation fires when the target set empties or when a
//! worker hits an unrecoverable fault; exhaustion of the wordlist with
//! targets still live is the third, non-cancelling way a run ends.
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::error::CrackError;
use crate::ntlm::{NtKey, NtlmHasher};
use crate::oracle::{MIN_CIPHERTEXT_LEN, MessageType, OracleResult, Rc4HmacOracle};
use crate::wordlist::{self, LoadPolicy, WordlistOptions};

/// What a target actually is under the hood.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// Encrypted part of a Kerberos reply, attacked through the oracle.
    Ticket {
        message_type: MessageType,
        ciphertext: Vec<u8>,
    },
    /// Raw NT hash, attacked by direct key equality.
    NtHash(NtKey),
}

/// One item under attack, identified by a stable id assigned at load time.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: usize,
    pub label: String,
    pub artifact: Artifact,
}

impl Target {
    pub fn ticket(
        id: usize,
        label: impl Into<String>,
        message_type: MessageType,
        ciphertext: Vec<u8>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            artifact: Artifact::Ticket {
                message_type,
                ciphertext,
            },
        }
    }

    pub fn nt_hash(id: usize, label: impl Into<String>, key: NtKey) -> Self {
        Self {
            id,
            label: label.into(),
            artifact: Artifact::NtHash(key),
        }
    }
}

/// A successfully cracked target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackHit {
    pub target_id: usize,
    pub label: String,
    pub password: String,
}

/// Why a run stopped. The fatal-fault terminal state is expressed as
/// `Err(CrackError)` from [`crack`] rather than a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every target was cracked; the run cancelled itself early.
    AllCracked,
    /// The wordlist ran dry with at least one target still live.
    Exhausted,
}

/// Final report of a completed (non-failed) run.
#[derive(Debug, Clone)]
pub struct CrackReport {
    pub outcome: Outcome,
    pub hits: Vec<CrackHit>,
    /// Labels of targets still uncracked, in id order.
    pub unresolved: Vec<String>,
    /// Candidate keys derived across all workers.
    pub attempts: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub workers: usize,
    pub policy: LoadPolicy,
    pub chunk_size: usize,
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            policy: LoadPolicy::Eager,
            chunk_size: wordlist::DEFAULT_CHUNK_SIZE,
            queue_capacity: wordlist::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Available hardware parallelism, falling back to one.
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Shared run state. The target map is the only mutable domain the workers
/// contend on: many lookups, rare removals.
struct Shared {
    targets: RwLock<HashMap<usize, Arc<Target>>>,
    hits: Mutex<Vec<CrackHit>>,
    fault: Mutex<Option<CrackError>>,
    attempts: AtomicU64,
}

/// Run a search without live hit reporting.
pub fn crack(
    wordlist_path: &Path,
    targets: Vec<Target>,
    config: &EngineConfig,
) -> Result<CrackReport, CrackError> {
    crack_with_observer(wordlist_path, targets, config, &|_| {})
}

/// Run a search, invoking `on_hit` from the claiming worker as each target
/// falls. Returns `Err` only for fatal faults (unusable target data or a
/// wordlist read failure), which abort the whole run.
pub fn crack_with_observer(
    wordlist_path: &Path,
    targets: Vec<Target>,
    config: &EngineConfig,
    on_hit: &(dyn Fn(&CrackHit) + Sync),
) -> Result<CrackReport, CrackError> {
    // Unusable target data is a configuration error; reject it before
    // spawning anything.
    for t in &targets {
        if let Artifact::Ticket { ciphertext, .. } = &t.artifact {
            if ciphertext.len() < MIN_CIPHERTEXT_LEN {
                return Err(CrackError::MalformedCiphertext {
                    label: t.label.clone(),
                    len: ciphertext.len(),
                });
            }
        }
    }

    let started = Instant::now();
    let total = targets.len();
    let cancel = CancelFlag::new();

    let options = WordlistOptions {
        policy: config.policy,
        chunk_size: config.chunk_size,
        queue_capacity: config.queue_capacity,
    };
    let (chunks, producer) = wordlist::stream(wordlist_path, &options, cancel.clone())?;

    let mut id_order: Vec<(usize, String)> =
        targets.iter().map(|t| (t.id, t.label.clone())).collect();
    id_order.sort_by_key(|(id, _)| *id);

    let shared = Shared {
        targets: RwLock::new(targets.into_iter().map(|t| (t.id, Arc::new(t))).collect()),
        hits: Mutex::new(Vec::new()),
        fault: Mutex::new(None),
        attempts: AtomicU64::new(0),
    };

    let workers = config.workers.max(1);
    debug!("starting {workers} workers against {total} targets");
    thread::scope(|scope| {
        let shared = &shared;
        let cancel = &cancel;
        for _ in 0..workers {
            let rx = chunks.clone();
            scope.spawn(move || worker_loop(rx, shared, cancel, on_hit));
        }
        // The spawned clones keep the queue alive; release ours so a
        // finished pool disconnects the producer.
        drop(chunks);
    });

    let producer_result = producer.join();
    if let Some(fault) = shared.fault.lock().expect("fault lock poisoned").take() {
        return Err(fault);
    }
    producer_result?;

    let remaining = shared.targets.into_inner().expect("target lock poisoned");
    let unresolved: Vec<String> = id_order
        .into_iter()
        .filter(|(id, _)| remaining.contains_key(id))
        .map(|(_, label)| label)
        .collect();
    let outcome = if unresolved.is_empty() {
        Outcome::AllCracked
    } else {
        Outcome::Exhausted
    };
    if !unresolved.is_empty() {
        warn!(
            "wordlist exhausted with {} targets unresolved",
            unresolved.len()
        );
    }

    Ok(CrackReport {
        outcome,
        hits: shared.hits.into_inner().expect("hit lock poisoned"),
        unresolved,
        attempts: shared.attempts.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    })
}

fn worker_loop(
    chunks: Receiver<Vec<String>>,
    shared: &Shared,
    cancel: &CancelFlag,
    on_hit: &(dyn Fn(&CrackHit) + Sync),
) {
    let mut hasher = NtlmHasher::new();
    let mut oracle = Rc4HmacOracle::new();
    let mut key: NtKey = [0u8; 16];
    let mut attempts = 0u64;
    let mut live: Vec<Arc<Target>> = Vec::new();

    'chunks: while let Ok(chunk) = chunks.recv() {
        if cancel.is_cancelled() {
            break;
        }
        for candidate in &chunk {
            if cancel.is_cancelled() {
                break 'chunks;
            }
            hasher.derive(candidate, &mut key);
            attempts += 1;

            // Fresh snapshot of the live targets for this candidate.
            live.clear();
            live.extend(
                shared
                    .targets
                    .read()
                    .expect("target lock poisoned")
                    .values()
                    .cloned(),
            );
            for target in &live {
                let cracked = match &target.artifact {
                    Artifact::NtHash(expected) => key == *expected,
                    Artifact::Ticket {
                        message_type,
                        ciphertext,
                    } => match oracle.decrypt(&key, *message_type, ciphertext) {
                        OracleResult::Decrypted { .. } => true,
                        OracleResult::ChecksumMismatch => false,
                        OracleResult::MalformedInput => {
                            fail(
                                shared,
                                cancel,
                                CrackError::MalformedCiphertext {
                                    label: target.label.clone(),
                                    len: ciphertext.len(),
                                },
                            );
                            break 'chunks;
                        }
                    },
                };
                if cracked {
                    claim(shared, cancel, target, candidate, on_hit);
                }
            }
        }
    }

    shared.attempts.fetch_add(attempts, Ordering::Relaxed);
}

/// Claim a crack by removing the target from the shared map. The removal is
/// the arbiter: whichever worker's `remove` returns the entry owns the
/// report, so a target racing between snapshots is never reported twice.
fn claim(
    shared: &Shared,
    cancel: &CancelFlag,
    target: &Target,
    candidate: &str,
    on_hit: &(dyn Fn(&CrackHit) + Sync),
) {
    let all_cracked = {
        let mut map = shared.targets.write().expect("target lock poisoned");
        if map.remove(&target.id).is_none() {
            return;
        }
        map.is_empty()
    };

    let hit = CrackHit {
        target_id: target.id,
        label: target.label.clone(),
        password: candidate.to_string(),
    };
    info!(
        "cracked target '{}' with candidate '{}'",
        hit.label, hit.password
    );
    on_hit(&hit);
    shared.hits.lock().expect("hit lock poisoned").push(hit);

    if all_cracked {
        debug!("all targets cracked, cancelling run");
        cancel.cancel();
    }
}

fn fail(shared: &Shared, cancel: &CancelFlag, error: CrackError) {
    warn!("fatal fault, cancelling run: {error}");
    let mut slot = shared.fault.lock().expect("fault lock poisoned");
    if slot.is_none() {
        *slot = Some(error);
    }
    cancel.cancel();
}
