//! Candidate password source: an ordered, chunked, cancellable stream read
//! from a wordlist file onto a bounded queue.
//!
//! Two materialization policies exist. `Eager` maps the whole file and
//! splits it on newlines in memory, which is the fast path; `Lazy` scans
//! line by line through a buffered reader, bounding memory on very large
//! wordlists. Both yield the identical candidate sequence: CRLF line
//! endings trimmed, interior empty lines kept (the empty password is a
//! legitimate candidate), a trailing empty fragment after the last newline
//! dropped, and non-UTF-8 bytes replaced lossily.
//!
//! Chunk boundaries are purely a throughput knob; consumers must not read
//! meaning into them.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, bounded};
use log::debug;
use memmap2::Mmap;

use crate::cancel::CancelFlag;
use crate::error::CrackError;

/// Default number of candidates per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 32;
/// Default queue capacity, in chunks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// How long a blocked producer waits before re-checking cancellation.
const SEND_TICK: Duration = Duration::from_millis(20);

/// Wordlist materialization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Map the whole file and split it in memory.
    #[default]
    Eager,
    /// Scan line by line without buffering the whole file.
    Lazy,
}

#[derive(Debug, Clone)]
pub struct WordlistOptions {
    pub policy: LoadPolicy,
    pub chunk_size: usize,
    pub queue_capacity: usize,
}

impl Default for WordlistOptions {
    fn default() -> Self {
        Self {
            policy: LoadPolicy::Eager,
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Handle to the producer thread. Joining reports any read fault hit
/// mid-stream.
pub struct Producer {
    handle: JoinHandle<Result<(), CrackError>>,
}

impl Producer {
    pub fn join(self) -> Result<(), CrackError> {
        match self.handle.join() {
            Ok(res) => res,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Open `path` and start producing candidate chunks onto a bounded queue.
///
/// The file is opened (and, for the eager policy, mapped) before the
/// producer thread starts, so unreadable paths fail here rather than
/// mid-search. Production stops when the stream is exhausted, when `cancel`
/// fires, or when every receiver has been dropped; a partially filled chunk
/// is flushed before a normal close.
pub fn stream(
    path: &Path,
    options: &WordlistOptions,
    cancel: CancelFlag,
) -> Result<(Receiver<Vec<String>>, Producer), CrackError> {
    let chunk_size = options.chunk_size.max(1);
    let (tx, rx) = bounded(options.queue_capacity.max(1));

    let file = File::open(path)?;
    let handle = match options.policy {
        LoadPolicy::Eager => {
            let mmap = if file.metadata()?.len() == 0 {
                None
            } else {
                Some(unsafe { Mmap::map(&file)? })
            };
            thread::spawn(move || produce_eager(mmap, chunk_size, tx, cancel))
        }
        LoadPolicy::Lazy => thread::spawn(move || produce_lazy(file, chunk_size, tx, cancel)),
    };

    Ok((rx, Producer { handle }))
}

fn produce_eager(
    mmap: Option<Mmap>,
    chunk_size: usize,
    tx: Sender<Vec<String>>,
    cancel: CancelFlag,
) -> Result<(), CrackError> {
    let Some(mmap) = mmap else {
        return Ok(());
    };
    let data: &[u8] = &mmap;
    let mut chunk = Vec::with_capacity(chunk_size);
    let mut pos = 0;
    while pos < data.len() {
        let end = match memchr::memchr(b'\n', &data[pos..]) {
            Some(off) => pos + off,
            None => data.len(),
        };
        chunk.push(candidate_from_bytes(&data[pos..end]));
        pos = end + 1;
        if chunk.len() == chunk_size
            && !send_chunk(&tx, &cancel, std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size)))
        {
            return Ok(());
        }
    }
    flush(&tx, &cancel, chunk);
    Ok(())
}

fn produce_lazy(
    file: File,
    chunk_size: usize,
    tx: Sender<Vec<String>>,
    cancel: CancelFlag,
) -> Result<(), CrackError> {
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut chunk = Vec::with_capacity(chunk_size);
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        let had_newline = line.last() == Some(&b'\n');
        if had_newline {
            line.pop();
        }
        chunk.push(candidate_from_bytes(&line));
        if chunk.len() == chunk_size
            && !send_chunk(&tx, &cancel, std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size)))
        {
            return Ok(());
        }
        if !had_newline {
            break;
        }
    }
    flush(&tx, &cancel, chunk);
    Ok(())
}

fn flush(tx: &Sender<Vec<String>>, cancel: &CancelFlag, chunk: Vec<String>) {
    if !chunk.is_empty() {
        let _ = send_chunk(tx, cancel, chunk);
    }
}

/// Send one chunk, waking up periodically to observe cancellation even
/// while the queue is full. Returns false when production should stop.
fn send_chunk(tx: &Sender<Vec<String>>, cancel: &CancelFlag, mut chunk: Vec<String>) -> bool {
    loop {
        if cancel.is_cancelled() {
            debug!("wordlist producer observed cancellation");
            return false;
        }
        match tx.send_timeout(chunk, SEND_TICK) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(back)) => chunk = back,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

fn candidate_from_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
