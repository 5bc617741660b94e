//! Throughput benchmark: measures the oracle against synthetic random keys
//! instead of searching a wordlist. Diagnostic harness only; it reuses the
//! worker-owned primitives but lives outside the crack engine.
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::engine::{Artifact, Target};
use crate::ntlm::NtlmHasher;
use crate::oracle::Rc4HmacOracle;

/// Candidates derived per timing batch.
const BATCH: usize = 30;
/// How long each worker hammers each target.
const MEASURE_FOR: Duration = Duration::from_secs(1);

/// One worker's measurement against one target.
#[derive(Debug, Clone)]
pub struct BenchSample {
    pub worker: usize,
    pub label: String,
    pub keys_per_sec: u64,
}

#[derive(Debug, Clone)]
pub struct BenchReport {
    pub samples: Vec<BenchSample>,
    /// Summed per-worker rates, averaged over the target count.
    pub aggregate_keys_per_sec: u64,
}

fn synthetic_candidates() -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..BATCH)
        .map(|_| {
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect()
        })
        .collect()
}

/// Measure derive+decrypt throughput with `workers` parallel threads, each
/// running every target for about a second.
pub fn run(targets: &[Target], workers: usize) -> BenchReport {
    let workers = workers.max(1);
    let samples = Mutex::new(Vec::with_capacity(workers * targets.len()));

    thread::scope(|scope| {
        for worker in 0..workers {
            let samples = &samples;
            scope.spawn(move || {
                let candidates = synthetic_candidates();
                let mut hasher = NtlmHasher::new();
                let mut oracle = Rc4HmacOracle::new();
                let mut key = [0u8; 16];
                for target in targets {
                    let Artifact::Ticket {
                        message_type,
                        ciphertext,
                    } = &target.artifact
                    else {
                        continue;
                    };
                    let mut batches = 0u64;
                    let mut elapsed = Duration::ZERO;
                    while elapsed < MEASURE_FOR {
                        batches += 1;
                        let start = Instant::now();
                        for candidate in &candidates {
                            hasher.derive(candidate, &mut key);
                            let _ = oracle.decrypt(&key, *message_type, ciphertext);
                        }
                        elapsed += start.elapsed();
                    }
                    let keys_per_sec = (BATCH as u64 * batches * 1_000_000_000)
                        / elapsed.as_nanos().max(1) as u64;
                    debug!(
                        "bench worker {worker}: {} at {keys_per_sec} keys/s",
                        target.label
                    );
                    samples.lock().expect("bench lock poisoned").push(BenchSample {
                        worker,
                        label: target.label.clone(),
                        keys_per_sec,
                    });
                }
            });
        }
    });

    let mut samples = samples.into_inner().expect("bench lock poisoned");
    samples.sort_by_key(|s| s.worker);
    let ticket_count = targets
        .iter()
        .filter(|t| matches!(t.artifact, Artifact::Ticket { .. }))
        .count()
        .max(1) as u64;
    let total: u64 = samples.iter().map(|s| s.keys_per_sec).sum();
    BenchReport {
        samples,
        aggregate_keys_per_sec: total / ticket_count,
    }
}
