//! Requests marshalled onto the thread that owns the console.

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use ratatui::style::Style;
use tokio::sync::mpsc;

use crate::error::{ConsoleError, Result};
use crate::stream::pump::StreamKind;

/// Style selector for printed text. Resolved when the request is applied, so
/// style setters called in between take effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrintStyle {
    /// The style currently used for typed input.
    Typing,
    /// The console's error style.
    Error,
    Styled(Style),
}

/// Work for the UI thread.
#[derive(Debug)]
pub enum ConsoleRequest {
    /// A chunk drained from the output or error pipe.
    Append { kind: StreamKind, text: String },
    Print {
        text: String,
        style: PrintStyle,
        ack: Option<std_mpsc::Sender<()>>,
    },
    SetCommand {
        command: String,
        ack: Option<std_mpsc::Sender<()>>,
    },
    Clear { ack: Option<std_mpsc::Sender<()>> },
}

/// Cloneable, `Send` handle for driving a console from other threads.
///
/// Calls block until the console's owner has applied them (see
/// [`Console::process_requests`](crate::console::Console::process_requests)).
/// Called on the owning thread itself they only enqueue, since waiting there
/// would never finish. The owner is the thread that last drove the console
/// (created it, processed requests, handled a key or asked for a handle).
#[derive(Debug, Clone)]
pub struct ConsoleHandle {
    tx: mpsc::UnboundedSender<ConsoleRequest>,
    owner: Arc<Mutex<ThreadId>>,
}

impl ConsoleHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<ConsoleRequest>,
        owner: Arc<Mutex<ThreadId>>,
    ) -> Self {
        Self { tx, owner }
    }

    /// Print in the current typing style.
    pub fn print(&self, content: impl Into<String>) -> Result<()> {
        let text = content.into();
        self.submit(|ack| ConsoleRequest::Print {
            text,
            style: PrintStyle::Typing,
            ack,
        })
    }

    pub fn print_styled(&self, content: impl Into<String>, style: Style) -> Result<()> {
        let text = content.into();
        self.submit(|ack| ConsoleRequest::Print {
            text,
            style: PrintStyle::Styled(style),
            ack,
        })
    }

    /// Print in the error style.
    pub fn error(&self, content: impl Into<String>) -> Result<()> {
        let text = content.into();
        self.submit(|ack| ConsoleRequest::Print {
            text,
            style: PrintStyle::Error,
            ack,
        })
    }

    /// Inject and accept a command line.
    pub fn set_command(&self, command: impl Into<String>) -> Result<()> {
        let command = command.into();
        self.submit(|ack| ConsoleRequest::SetCommand { command, ack })
    }

    pub fn clear(&self) -> Result<()> {
        self.submit(|ack| ConsoleRequest::Clear { ack })
    }

    fn submit(
        &self,
        build: impl FnOnce(Option<std_mpsc::Sender<()>>) -> ConsoleRequest,
    ) -> Result<()> {
        if thread::current().id() == *self.owner.lock() {
            return self
                .tx
                .send(build(None))
                .map_err(|_| ConsoleError::ChannelClosed("console requests"));
        }

        let (ack_tx, ack_rx) = std_mpsc::channel();
        self.tx
            .send(build(Some(ack_tx)))
            .map_err(|_| ConsoleError::ChannelClosed("console requests"))?;
        // A dropped console drops the request and its sender, which ends the wait.
        ack_rx
            .recv()
            .map_err(|_| ConsoleError::ChannelClosed("console requests"))
    }
}
