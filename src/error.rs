use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Console error types.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// I/O errors from the console pipes, pump threads or the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or event loop errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A console channel was closed (after shutdown, or the UI side is gone).
    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    /// A text range outside the console surface.
    #[error("Invalid offset {offset} (text length {len})")]
    InvalidOffset { offset: usize, len: usize },

    /// Configuration file problems.
    #[error("Config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ConsoleError = io_err.into();
        assert!(matches!(err, ConsoleError::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_terminal_error_display() {
        let err = ConsoleError::Terminal("failed to enter raw mode".into());
        assert_eq!(err.to_string(), "Terminal error: failed to enter raw mode");
    }

    #[test]
    fn test_channel_closed_display() {
        let err = ConsoleError::ChannelClosed("input");
        assert_eq!(err.to_string(), "Channel closed: input");
    }

    #[test]
    fn test_invalid_offset_display() {
        let err = ConsoleError::InvalidOffset { offset: 12, len: 4 };
        assert_eq!(err.to_string(), "Invalid offset 12 (text length 4)");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConsoleError::Config("config file x.toml not found".into());
        assert_eq!(err.to_string(), "Config error: config file x.toml not found");
    }
}
