//! The console: a styled text surface with a live command line, command
//! history, and three byte streams connecting it to the host application.
//!
//! The part of the text from `command_start` to the end is the command line
//! the user is editing. Everything before it is history and is never changed
//! by editing keys. Accepting a line (Enter or [`Console::set_command`])
//! writes it, newline-terminated, to the input stream. Text written to the
//! output and error streams is pumped back into the surface.
//!
//! A `Console` is mutated only by the thread that owns it (the UI thread).
//! Other threads go through a [`ConsoleHandle`]; pump threads and handles
//! enqueue [`ConsoleRequest`]s that the owner applies in
//! [`Console::process_requests`]. The console may be moved to another
//! thread; ownership follows it on the next `process_requests`,
//! `handle_key` or `handle` call.

pub mod history;
mod keys;
pub mod request;
pub mod surface;

use std::io::{BufReader, Write};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use ratatui::style::Style;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::error::{ConsoleError, Result};
use crate::stream::pump::{Pump, StreamKind, DEFAULT_BUFFER_SIZE};
use crate::stream::{pipe, PipeReader, PipeWriter};
use crate::theme::{resolve_theme, ConsoleStyles};

pub use history::{CommandHistory, HistoryCursor};
pub use request::{ConsoleHandle, ConsoleRequest, PrintStyle};
pub use surface::{StyledText, TextSurface, WrappedText};

/// Construction options.
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Maximum bytes a pump reads per chunk.
    pub pump_buffer_size: usize,
    /// Maximum number of history entries (`None` = unlimited).
    pub history_limit: Option<usize>,
    pub styles: ConsoleStyles,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            pump_buffer_size: DEFAULT_BUFFER_SIZE,
            history_limit: None,
            styles: ConsoleStyles::default(),
        }
    }
}

impl ConsoleOptions {
    /// Options derived from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pump_buffer_size: config.pump_buffer_size(),
            history_limit: config.history_limit(),
            styles: resolve_theme(&config.theme).styles,
        }
    }
}

/// Console widget state.
pub struct Console<S: TextSurface = StyledText> {
    surface: S,
    /// Offset where the live command line begins.
    command_start: usize,
    history: CommandHistory,
    styles: ConsoleStyles,
    clipboard: String,
    focused: bool,
    /// Rows scrolled back from the bottom (0 = following new text).
    scroll_offset: usize,
    /// Height of the last rendered viewport, used for paging.
    viewport_height: usize,

    input: PipeWriter,
    input_reader: PipeReader,
    output: PipeWriter,
    error: PipeWriter,
    pumps: Vec<Pump>,

    requests_rx: mpsc::UnboundedReceiver<ConsoleRequest>,
    handle: ConsoleHandle,
    /// Thread currently driving the console, shared with every handle.
    owner: Arc<Mutex<ThreadId>>,
}

impl Console<StyledText> {
    /// Create a console with default options, backed by [`StyledText`].
    ///
    /// The calling thread becomes the console's UI thread.
    pub fn new() -> Result<Self> {
        Self::with_options(StyledText::new(), ConsoleOptions::default())
    }

    /// Create a console configured from the application config.
    pub fn with_config(config: &AppConfig) -> Result<Self> {
        Self::with_options(StyledText::new(), ConsoleOptions::from_config(config))
    }
}

impl<S: TextSurface> Console<S> {
    /// Create a console on top of `surface`, spawning the two pump threads.
    pub fn with_options(mut surface: S, options: ConsoleOptions) -> Result<Self> {
        let (input, input_reader) = pipe("input");
        let (output, output_reader) = pipe("output");
        let (error, error_reader) = pipe("error");
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();

        let lock = Arc::new(Mutex::new(()));
        let mut pumps = Vec::with_capacity(2);
        for (kind, reader) in [
            (StreamKind::Error, error_reader),
            (StreamKind::Output, output_reader),
        ] {
            match Pump::spawn(
                kind,
                reader,
                lock.clone(),
                requests_tx.clone(),
                options.pump_buffer_size,
            ) {
                Ok(pump) => pumps.push(pump),
                Err(e) => {
                    tracing::warn!(error = %e, ?kind, "failed to start console pump");
                    for w in [&input, &output, &error] {
                        w.close();
                    }
                    for mut pump in pumps {
                        pump.join();
                    }
                    return Err(e);
                }
            }
        }

        surface.set_style(options.styles.input);
        let command_start = surface.len();
        let owner = Arc::new(Mutex::new(thread::current().id()));
        let handle = ConsoleHandle::new(requests_tx, owner.clone());

        Ok(Self {
            surface,
            command_start,
            history: CommandHistory::new(options.history_limit),
            styles: options.styles,
            clipboard: String::new(),
            focused: true,
            scroll_offset: 0,
            viewport_height: 0,
            input,
            input_reader,
            output,
            error,
            pumps,
            requests_rx,
            handle,
            owner,
        })
    }

    // ── Streams ─────────────────────────────────────────────────────────

    /// Byte stream of accepted command lines, each terminated by `\n`.
    pub fn input_stream(&self) -> PipeReader {
        self.input_reader.clone()
    }

    /// Buffered reader over the input stream, for line-oriented hosts.
    ///
    /// Each call wraps a fresh buffer; keep one reader per consumer.
    pub fn input_reader(&self) -> BufReader<PipeReader> {
        BufReader::new(self.input_reader.clone())
    }

    /// Bytes written here are shown in the output style.
    pub fn output_stream(&self) -> PipeWriter {
        self.output.clone()
    }

    /// Bytes written here are shown in the error style.
    pub fn error_stream(&self) -> PipeWriter {
        self.error.clone()
    }

    /// Handle for printing and injecting commands from other threads.
    ///
    /// The calling thread becomes the console's owner.
    pub fn handle(&self) -> ConsoleHandle {
        self.claim_thread();
        self.handle.clone()
    }

    /// Make the current thread the owner, so handle calls made here enqueue
    /// instead of waiting on themselves.
    pub(crate) fn claim_thread(&self) {
        let current = thread::current().id();
        let mut owner = self.owner.lock();
        if *owner != current {
            tracing::debug!(from = ?*owner, to = ?current, "console moved to another thread");
            *owner = current;
        }
    }

    // ── Styles ──────────────────────────────────────────────────────────

    /// Style for text the user types.
    pub fn set_in_style(&mut self, style: Style) {
        self.styles.input = style;
        self.surface.set_style(style);
    }

    /// Style for text arriving on the output stream.
    pub fn set_out_style(&mut self, style: Style) {
        self.styles.output = style;
    }

    /// Style for text arriving on the error stream and for [`Console::error`].
    pub fn set_err_style(&mut self, style: Style) {
        self.styles.error = style;
    }

    pub fn styles(&self) -> &ConsoleStyles {
        &self.styles
    }

    // ── Printing ────────────────────────────────────────────────────────

    /// Print in the current typing style. Printed text is never treated as
    /// part of a command.
    pub fn print(&mut self, content: &str) {
        let style = self.surface.style();
        self.print_styled(content, style);
    }

    /// Print in the error style.
    pub fn error(&mut self, content: &str) {
        self.print_styled(content, self.styles.error);
    }

    /// Append `content` in `style`, then start a new command line after it.
    pub fn print_styled(&mut self, content: &str, style: Style) {
        let previous = self.surface.style();
        self.surface.set_style(style);
        self.surface.append(content);
        self.start_command_line();
        self.surface.set_style(previous);
        self.scroll_offset = 0;
    }

    /// Erase everything displayed. History and streams are kept.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.command_start = 0;
        self.history.reset();
        self.scroll_offset = 0;
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Inject `command` as if the user typed it and pressed Enter.
    ///
    /// Any partially typed command line is replaced.
    pub fn set_command(&mut self, command: &str) -> Result<()> {
        let len = self.surface.len();
        self.surface.replace(self.command_start, len, command);
        self.accept_line()
    }

    /// Accept the live command line: record it, end the line on screen and
    /// send it to the input stream.
    pub fn accept_line(&mut self) -> Result<()> {
        let command = self.command_text();
        self.history.push(&command);
        self.surface.append("\n");
        self.history.reset();
        self.start_command_line();
        self.scroll_offset = 0;
        self.send_input(&command)
    }

    /// The live command line.
    pub fn command_text(&self) -> String {
        match self.surface.text(self.command_start, self.surface.len()) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "no command text");
                String::new()
            }
        }
    }

    pub fn command_start(&self) -> usize {
        self.command_start
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Show the previous (older) history entry.
    pub fn history_prev(&mut self) {
        let live = self.command_text();
        if let Some(line) = self.history.prev(&live) {
            self.show_command(&line);
        }
    }

    /// Show the next (newer) history entry, ending at the saved live line.
    pub fn history_next(&mut self) {
        if let Some(line) = self.history.next() {
            self.show_command(&line);
        }
    }

    /// Erase the live command line and stop browsing history.
    pub fn clear_line(&mut self) {
        let len = self.surface.len();
        self.surface.replace(self.command_start, len, "");
        self.history.reset();
    }

    fn show_command(&mut self, line: &str) {
        let len = self.surface.len();
        self.surface.replace(self.command_start, len, line);
        let len = self.surface.len();
        self.surface.set_caret(len);
    }

    fn start_command_line(&mut self) {
        self.command_start = self.surface.len();
        self.surface.set_caret(self.command_start);
    }

    fn send_input(&mut self, command: &str) -> Result<()> {
        let line = format!("{command}\n");
        let result = self
            .input
            .write_all(line.as_bytes())
            .and_then(|()| self.input.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write command to input stream");
            return Err(ConsoleError::ChannelClosed("input"));
        }
        Ok(())
    }

    // ── Text editing ────────────────────────────────────────────────────

    /// Insert text as if typed. The caret is moved into the command line
    /// first if it sits in history.
    pub fn type_text(&mut self, text: &str) {
        self.enter_command_line();
        self.surface.replace_selection(text);
        self.scroll_offset = 0;
    }

    /// Insert `text` as if pasted from an external clipboard.
    pub fn paste_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.type_text(text);
        }
    }

    /// Copy the selection to the console clipboard.
    pub fn copy(&mut self) {
        if let Some((from, to)) = self.surface.selection() {
            if let Ok(text) = self.surface.text(from, to) {
                self.clipboard = text;
            }
        }
    }

    /// Cut the selection. A selection reaching into history is only copied.
    pub fn cut(&mut self) {
        let Some((from, _)) = self.surface.selection() else {
            return;
        };
        self.copy();
        if from >= self.command_start {
            self.surface.replace_selection("");
        }
    }

    /// Paste the console clipboard into the command line.
    pub fn paste(&mut self) {
        let text = self.clipboard.clone();
        self.paste_text(&text);
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Select `[from, to)`, e.g. from a mouse drag.
    pub fn select(&mut self, from: usize, to: usize) {
        self.surface.select(from, to);
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.surface.selection()
    }

    /// Make sure typing lands in the command line: drop a selection that
    /// reaches into history and pull the caret out of history.
    fn enter_command_line(&mut self) {
        if let Some((from, _)) = self.surface.selection() {
            if from < self.command_start {
                let caret = self.surface.caret();
                self.surface.set_caret(caret);
            }
        }
        if self.surface.caret() < self.command_start {
            let len = self.surface.len();
            self.surface.set_caret(len);
        }
    }

    // ── Surface / view ──────────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn text(&self) -> String {
        self.surface.text(0, self.surface.len()).unwrap_or_default()
    }

    pub fn caret(&self) -> usize {
        self.surface.caret()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Scroll back towards older text.
    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
    }

    /// Scroll forward towards the newest text.
    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Record the visible height so paging keys move by one screen.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Clamp the scroll offset to the rendered content. Called while rendering.
    pub fn clamp_scroll(&mut self, total_rows: usize) {
        let max = total_rows.saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max);
    }

    // ── Requests ────────────────────────────────────────────────────────

    /// Apply every queued request. Returns how many were applied.
    ///
    /// The host calls this from its event loop on the UI thread.
    pub fn process_requests(&mut self) -> usize {
        self.claim_thread();
        let mut applied = 0;
        while let Ok(request) = self.requests_rx.try_recv() {
            self.apply_request(request);
            applied += 1;
        }
        applied
    }

    /// Apply a single request.
    pub fn apply_request(&mut self, request: ConsoleRequest) {
        match request {
            ConsoleRequest::Append { kind, text } => {
                let style = match kind {
                    StreamKind::Output => self.styles.output,
                    StreamKind::Error => self.styles.error,
                };
                self.print_styled(&text, style);
            }
            ConsoleRequest::Print { text, style, ack } => {
                let style = match style {
                    PrintStyle::Typing => self.surface.style(),
                    PrintStyle::Error => self.styles.error,
                    PrintStyle::Styled(style) => style,
                };
                self.print_styled(&text, style);
                acknowledge(ack);
            }
            ConsoleRequest::SetCommand { command, ack } => {
                if let Err(e) = self.set_command(&command) {
                    tracing::warn!(error = %e, "injected command not delivered");
                }
                acknowledge(ack);
            }
            ConsoleRequest::Clear { ack } => {
                self.clear();
                acknowledge(ack);
            }
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Close all three streams and wait for the pumps to finish.
    ///
    /// Text still buffered in the output/error pipes is queued before the
    /// pumps exit; call [`Console::process_requests`] afterwards to show it.
    /// Readers of the input stream see EOF. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.pumps.is_empty() {
            return;
        }
        tracing::debug!("shutting down console streams");
        self.input.close();
        self.output.close();
        self.error.close();
        for mut pump in self.pumps.drain(..) {
            pump.join();
        }
    }

    /// Whether [`Console::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.pumps.is_empty()
    }
}

impl<S: TextSurface> Drop for Console<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: TextSurface> std::fmt::Debug for Console<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("len", &self.surface.len())
            .field("command_start", &self.command_start)
            .field("history_len", &self.history.len())
            .field("history_cursor", &self.history.cursor())
            .field("focused", &self.focused)
            .field("scroll_offset", &self.scroll_offset)
            .field("pumps_running", &self.pumps.len())
            .finish()
    }
}

fn acknowledge(ack: Option<std::sync::mpsc::Sender<()>>) {
    if let Some(ack) = ack {
        // the caller may have given up waiting
        let _ = ack.send(());
    }
}
