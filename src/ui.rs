use ratatui::{
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use tui_console::components::console::ConsoleWidget;
use tui_console::TextSurface;

use crate::app::App;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Size the viewport before building the title so the scroll marker is clamped.
    let inner = Block::default().borders(Borders::ALL).inner(area);
    app.console.set_viewport_height(inner.height as usize);
    let rows = app
        .console
        .surface()
        .layout(inner.width as usize)
        .lines
        .len();
    app.console.clamp_scroll(rows);

    let border_fg = if app.console.is_focused() {
        app.theme.border_focused_fg
    } else {
        app.theme.border_fg
    };
    let block = Block::default()
        .title(app.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_fg));

    let widget =
        ConsoleWidget::new(&app.console, &app.theme, app.config.show_cursor()).block(block);
    frame.render_widget(widget, area);
}
