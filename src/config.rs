//! Console configuration read from TOML files, with CLI overrides.
//!
//! Sources merge field by field. Priority, highest first:
//! 1. CLI flags (`--config`, `--theme`, `--mouse`)
//! 2. `$TUI_CONSOLE_CONFIG` environment variable (path to config file)
//! 3. Project-local `.tui-console.toml` in the current working directory
//! 4. Global `~/.config/tui-console/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::stream::pump::DEFAULT_BUFFER_SIZE;

// ── Section configs ──────────────────────────────────────────────────────────

/// Settings for the host application around the console.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable mouse support (wheel scrolling).
    pub mouse: Option<bool>,
    /// Event loop tick interval in milliseconds.
    pub tick_rate_ms: Option<u64>,
    /// Title shown on the console panel border.
    pub title: Option<String>,
}

/// Console behaviour settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum bytes a pump reads from the output/error pipe per chunk.
    pub pump_buffer_size: Option<usize>,
    /// Maximum number of remembered commands (unset = unlimited, 0 = none).
    pub history_limit: Option<usize>,
    /// Draw the caret when the console is focused.
    pub show_cursor: Option<bool>,
}

/// Color settings for a custom palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub input_fg: Option<String>,
    pub output_fg: Option<String>,
    pub error_fg: Option<String>,
    pub background: Option<String>,
    pub border_fg: Option<String>,
    pub border_focused_fg: Option<String>,
    pub cursor_bg: Option<String>,
}

/// `[theme]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark" (default), "light" or "custom".
    pub scheme: Option<String>,
    /// Hex colors used when `scheme = "custom"`.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Everything that can be configured. Every field is optional so a partial
/// file only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub console: ConsoleConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default tick interval (~60 fps).
pub const DEFAULT_TICK_RATE_MS: u64 = 16;
/// Default panel title.
pub const DEFAULT_TITLE: &str = "Console";

// ── Config file locator ──────────────────────────────────────────────────────

/// Default config locations, highest priority first. `--config` is not
/// included.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TUI_CONSOLE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".tui-console.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tui-console").join("config.toml"));
    }

    paths
}

/// Parse one config file. A missing file is `None`; a malformed one is
/// logged and also `None`.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Layer `other` over `self`; set fields in `other` win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: other.general.mouse.or(self.general.mouse),
                tick_rate_ms: other.general.tick_rate_ms.or(self.general.tick_rate_ms),
                title: other.general.title.clone().or(self.general.title),
            },
            console: ConsoleConfig {
                pump_buffer_size: other
                    .console
                    .pump_buffer_size
                    .or(self.console.pump_buffer_size),
                history_limit: other.console.history_limit.or(self.console.history_limit),
                show_cursor: other.console.show_cursor.or(self.console.show_cursor),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Resolve the effective config: default locations, then the explicit
    /// `--config` file, then flag overrides.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // lowest priority first
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(false)
    }

    pub fn tick_rate_ms(&self) -> u64 {
        self.general.tick_rate_ms.unwrap_or(DEFAULT_TICK_RATE_MS).max(1)
    }

    pub fn title(&self) -> &str {
        self.general.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Pump chunk size in bytes (at least 1).
    pub fn pump_buffer_size(&self) -> usize {
        self.console
            .pump_buffer_size
            .unwrap_or(DEFAULT_BUFFER_SIZE)
            .max(1)
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.console.history_limit
    }

    pub fn show_cursor(&self) -> bool {
        self.console.show_cursor.unwrap_or(true)
    }

    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
