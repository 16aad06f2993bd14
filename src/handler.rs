use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: usize = 3;

/// Handle a key event. Ctrl+Q quits; everything else goes to the console.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Release
        && key.code == KeyCode::Char('q')
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        app.quit();
        return;
    }
    if !app.console.handle_key(key) {
        tracing::trace!(?key, "key not handled");
    }
}

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.console.scroll_up(WHEEL_ROWS),
        MouseEventKind::ScrollDown => app.console.scroll_down(WHEEL_ROWS),
        _ => {}
    }
}

pub fn handle_paste(app: &mut App, text: &str) {
    app.console.paste_text(text);
}

/// Terminal focus follows the window focus.
pub fn handle_focus(app: &mut App, focused: bool) {
    app.console.set_focused(focused);
}
