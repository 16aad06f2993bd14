//! Theme data model: built-in palettes and resolution from config.
//!
//! The theme system provides two built-in palettes (dark and light) and
//! supports custom color overrides from the config file.

use ratatui::style::{Color, Modifier, Style};

use crate::config::{ThemeColorsConfig, ThemeConfig};

// ── Runtime theme ────────────────────────────────────────────────────────────

/// Styles for the three kinds of console text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsoleStyles {
    /// Text the user types.
    pub input: Style,
    /// Text from the output stream.
    pub output: Style,
    /// Text from the error stream and `error()`.
    pub error: Style,
}

impl Default for ConsoleStyles {
    /// Plain input, blue output, bold italic red errors.
    fn default() -> Self {
        Self {
            input: Style::default(),
            output: Style::default().fg(Color::Blue),
            error: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        }
    }
}

/// All runtime colors used by the console panel.
///
/// Constructed from a config-level `ThemeConfig` via `resolve_theme()`.
#[derive(Debug, Clone)]
pub struct ConsoleTheme {
    pub styles: ConsoleStyles,

    // Chrome
    pub background: Color,
    pub border_fg: Color,
    pub border_focused_fg: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
    pub selection_bg: Color,
    pub dim_fg: Color,
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ConsoleTheme {
    ConsoleTheme {
        styles: ConsoleStyles {
            input: Style::default().fg(Color::Rgb(205, 214, 244)), // #cdd6f4 (text)
            output: Style::default().fg(Color::Rgb(137, 180, 250)), // #89b4fa (blue)
            error: Style::default()
                .fg(Color::Rgb(243, 139, 168)) // #f38ba8 (red)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        },
        background: Color::Reset,
        border_fg: Color::Rgb(88, 91, 112),          // #585b70 (surface2)
        border_focused_fg: Color::Rgb(137, 180, 250), // #89b4fa (blue)
        cursor_fg: Color::Rgb(30, 30, 46),           // #1e1e2e (base)
        cursor_bg: Color::Rgb(205, 214, 244),        // #cdd6f4 (text)
        selection_bg: Color::Rgb(69, 71, 90),        // #45475a (surface1)
        dim_fg: Color::Rgb(108, 112, 134),           // #6c7086 (overlay0)
    }
}

/// Light theme using the Catppuccin Latte palette.
pub fn light_theme() -> ConsoleTheme {
    ConsoleTheme {
        styles: ConsoleStyles {
            input: Style::default().fg(Color::Rgb(76, 79, 105)), // #4c4f69 (text)
            output: Style::default().fg(Color::Rgb(30, 102, 245)), // #1e66f5 (blue)
            error: Style::default()
                .fg(Color::Rgb(210, 15, 57)) // #d20f39 (red)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        },
        background: Color::Reset,
        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)
        border_focused_fg: Color::Rgb(30, 102, 245),
        cursor_fg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        cursor_bg: Color::Rgb(76, 79, 105),
        selection_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        dim_fg: Color::Rgb(156, 160, 176),       // #9ca0b0 (overlay0)
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Parse a hex color string, falling back to the provided default on error.
fn parse_or(hex_opt: Option<&str>, fallback: Color) -> Color {
    hex_opt.and_then(parse_hex_color).unwrap_or(fallback)
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ConsoleTheme` from config.
///
/// - `"dark"` (default): dark Catppuccin palette
/// - `"light"`: light Catppuccin palette
/// - `"custom"`: start from dark palette, then override with custom hex values
pub fn resolve_theme(config: &ThemeConfig) -> ConsoleTheme {
    let scheme = config.scheme.as_deref().unwrap_or("dark");
    match scheme {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(), // "dark" or any unrecognized value
    }
}

/// Apply custom hex color overrides on top of an existing theme.
///
/// Stream colors only replace the foreground; modifiers are kept.
fn apply_custom_colors(theme: &mut ConsoleTheme, custom: &ThemeColorsConfig) {
    let styles = &mut theme.styles;
    for (hex, style) in [
        (&custom.input_fg, &mut styles.input),
        (&custom.output_fg, &mut styles.output),
        (&custom.error_fg, &mut styles.error),
    ] {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *style = style.fg(color);
        }
    }
    theme.background = parse_or(custom.background.as_deref(), theme.background);
    theme.border_fg = parse_or(custom.border_fg.as_deref(), theme.border_fg);
    theme.border_focused_fg =
        parse_or(custom.border_focused_fg.as_deref(), theme.border_focused_fg);
    theme.cursor_bg = parse_or(custom.cursor_bg.as_deref(), theme.cursor_bg);
}

// ── Tests ────────────────────────────────────────────────────────────────────
