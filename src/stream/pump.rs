//! Pump threads: copy bytes from the output/error pipes into the console.
//!
//! A pump waits until its pipe has data *before* taking the shared pump
//! lock, then drains everything that is immediately available while holding
//! it. Whichever stream was written first usually wins the lock, so output
//! and error text interleave roughly in the order the host produced them and
//! a burst from one stream is never split by the other.
//!
//! Pumps never touch the console surface. Each chunk is sent to the UI
//! request queue as a [`ConsoleRequest::Append`] and applied there.

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::console::ConsoleRequest;
use crate::error::Result;
use crate::stream::PipeReader;

/// Default read size per chunk.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Which host-facing stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Output,
    Error,
}

impl StreamKind {
    fn thread_name(self) -> &'static str {
        match self {
            StreamKind::Output => "tui-console-out-pump",
            StreamKind::Error => "tui-console-err-pump",
        }
    }
}

/// A running pump thread.
#[derive(Debug)]
pub struct Pump {
    kind: StreamKind,
    handle: Option<JoinHandle<()>>,
}

impl Pump {
    /// Spawn a pump for `reader`.
    ///
    /// - `lock`: shared between all pumps of one console
    /// - `sink`: the console's UI request queue
    /// - `buffer_size`: maximum bytes per chunk
    pub fn spawn(
        kind: StreamKind,
        reader: PipeReader,
        lock: Arc<Mutex<()>>,
        sink: mpsc::UnboundedSender<ConsoleRequest>,
        buffer_size: usize,
    ) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(kind.thread_name().into())
            .spawn(move || pump_loop(kind, reader, lock, sink, buffer_size))?;

        Ok(Self {
            kind,
            handle: Some(handle),
        })
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Whether the pump thread has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the pump thread to exit. The pipe must already be closed.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(kind = ?self.kind, "pump thread panicked");
            }
        }
    }
}

fn pump_loop(
    kind: StreamKind,
    mut reader: PipeReader,
    lock: Arc<Mutex<()>>,
    sink: mpsc::UnboundedSender<ConsoleRequest>,
    buffer_size: usize,
) {
    tracing::debug!(?kind, pipe = reader.name(), "pump started");
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut decoder = Utf8Decoder::default();

    'outer: while reader.wait_readable() {
        let _guard = lock.lock();
        while reader.available() > 0 {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.decode(&buf[..n]);
                    if !text.is_empty() && sink.send(ConsoleRequest::Append { kind, text }).is_err()
                    {
                        tracing::debug!(?kind, "console gone, stopping pump");
                        break 'outer;
                    }
                }
                Err(e) => {
                    tracing::warn!(?kind, error = %e, "pump read failed");
                    break 'outer;
                }
            }
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        let _ = sink.send(ConsoleRequest::Append { kind, text: rest });
    }
    tracing::debug!(?kind, "pump stopped");
}

/// Incremental UTF-8 decoder.
///
/// Multibyte sequences split across reads are held back until the rest of
/// the sequence arrives. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode `bytes`, returning all text that is complete so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // incomplete sequence at the end
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still pending (lossily).
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
