//! Stream bridge: in-memory byte pipes connecting the console to its host.
//!
//! A pipe has a writable end ([`PipeWriter`]) and a readable end
//! ([`PipeReader`]). Both ends are cheap clones over the same shared buffer,
//! so the console can keep one end while handing copies to the host. Reads
//! block until data arrives or the pipe is closed; writes never block and
//! wake any waiting reader immediately.

pub mod pump;

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Buffer contents and lifecycle flag of one pipe.
#[derive(Debug, Default)]
struct PipeState {
    buf: VecDeque<u8>,
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    name: &'static str,
    state: Mutex<PipeState>,
    readable: Condvar,
}

/// Create a new in-memory pipe. `name` is used in log messages and errors.
pub fn pipe(name: &'static str) -> (PipeWriter, PipeReader) {
    let shared = Arc::new(Shared {
        name,
        state: Mutex::new(PipeState::default()),
        readable: Condvar::new(),
    });
    (
        PipeWriter {
            shared: shared.clone(),
        },
        PipeReader { shared },
    )
}

/// Writable end of a pipe.
#[derive(Debug, Clone)]
pub struct PipeWriter {
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// Close the pipe. Readers drain what is buffered and then see EOF;
    /// further writes fail with `BrokenPipe`.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        state.closed = true;
        self.shared.readable.notify_all();
    }

    /// Whether the pipe has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} pipe is closed", self.shared.name),
            ));
        }
        if data.is_empty() {
            return Ok(0);
        }
        state.buf.extend(data);
        self.shared.readable.notify_all();
        Ok(data.len())
    }

    // Writes wake readers as soon as they land, so there is nothing to flush.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Readable end of a pipe.
#[derive(Debug, Clone)]
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl PipeReader {
    /// Block until at least one byte is buffered, without consuming it.
    ///
    /// Returns `false` once the pipe is closed and fully drained.
    pub fn wait_readable(&self) -> bool {
        let mut state = self.shared.state.lock();
        loop {
            if !state.buf.is_empty() {
                return true;
            }
            if state.closed {
                return false;
            }
            self.shared.readable.wait(&mut state);
        }
    }

    /// Number of bytes that can be read without blocking.
    pub fn available(&self) -> usize {
        self.shared.state.lock().buf.len()
    }

    /// Close the pipe from the reading side.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        state.closed = true;
        self.shared.readable.notify_all();
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock();
        while state.buf.is_empty() {
            if state.closed {
                return Ok(0);
            }
            self.shared.readable.wait(&mut state);
        }
        let n = out.len().min(state.buf.len());
        for (slot, byte) in out.iter_mut().zip(state.buf.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
