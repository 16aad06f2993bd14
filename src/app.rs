use ratatui::style::Style;
use ratatui::text::{Line, Span};

use tui_console::config::AppConfig;
use tui_console::theme::{resolve_theme, ConsoleTheme};
use tui_console::{Console, Result};

/// Main application state.
pub struct App {
    pub console: Console,
    pub theme: ConsoleTheme,
    pub config: AppConfig,
    pub should_quit: bool,
}

impl App {
    /// Build the console from `config`. Must run on the UI thread.
    pub fn new(config: AppConfig) -> Result<Self> {
        let console = Console::with_config(&config)?;
        let theme = resolve_theme(&config.theme);
        Ok(Self {
            console,
            theme,
            config,
            should_quit: false,
        })
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Panel title, with a dimmed marker while scrolled back.
    pub fn title(&self) -> Line<'static> {
        match self.console.scroll_offset() {
            0 => Line::from(format!(" {} ", self.config.title())),
            rows => Line::from(vec![
                Span::raw(format!(" {} ", self.config.title())),
                Span::styled(format!("[+{rows}]"), Style::default().fg(self.theme.dim_fg)),
                Span::raw(" "),
            ]),
        }
    }
}
