//! A scrolling text console for ratatui applications.
//!
//! [`Console`] shows styled text with a live command line at the end.
//! Accepted lines go to an input byte stream. Bytes written to the output
//! and error streams are pumped back into the console on background
//! threads, each in its own style. [`components::console::ConsoleWidget`]
//! draws it.

pub mod components;
pub mod config;
pub mod console;
pub mod error;
pub mod stream;
pub mod theme;

pub use console::{Console, ConsoleHandle, ConsoleOptions, StyledText, TextSurface};
pub use error::{ConsoleError, Result};
pub use stream::{pipe, PipeReader, PipeWriter};
