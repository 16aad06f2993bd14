mod app;
mod event;
mod handler;
mod shell;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tui_console::config::{AppConfig, GeneralConfig, ThemeConfig};
use tui_console::{ConsoleError, Result};

use crate::app::App;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Interactive demo of the console widget, driven by a tiny shell.
#[derive(Parser, Debug)]
#[command(name = "console-demo", version, about)]
struct Cli {
    /// Path to a config file (overrides the default locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color scheme: dark, light or custom
    #[arg(long)]
    theme: Option<String>,

    /// Enable mouse wheel scrolling
    #[arg(long)]
    mouse: bool,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Config overrides derived from flags. Unset flags leave file values alone.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.mouse.then_some(true),
                ..Default::default()
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                custom: None,
            },
            ..Default::default()
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tui_console=debug,console_demo=debug")),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    if let Some(path) = cli.config.as_deref().filter(|p| !p.is_file()) {
        return Err(ConsoleError::Config(format!(
            "config file {} not found",
            path.display()
        )));
    }
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    tracing::info!(theme = config.theme_scheme(), "starting console demo");

    install_panic_hook();

    let mut app = App::new(config)?;
    let shell = shell::spawn(&app.console)?;
    let mut tui = Tui::new(app.config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(app.config.tick_rate_ms()));

    loop {
        app.console.process_requests();
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Paste(text) => handler::handle_paste(&mut app, &text),
            Event::Focus(focused) => handler::handle_focus(&mut app, focused),
            Event::Tick | Event::Resize(_, _) => {}
        }

        if shell.is_finished() {
            app.quit();
        }
        if app.should_quit {
            break;
        }
    }

    tui.restore()?;

    // Dropping the console closes the input stream and fails pending handle calls.
    drop(app);
    if shell.join().is_err() {
        tracing::warn!("shell thread panicked");
    }
    Ok(())
}
