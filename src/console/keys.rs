//! Keyboard handling for the console.
//!
//! Keys that would move the caret into history, or edit text before the
//! command start, are swallowed.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::surface::TextSurface;
use super::Console;

impl<S: TextSurface> Console<S> {
    /// Handle a key press. Returns `true` if the console consumed the key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        self.claim_thread();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Enter => {
                if let Err(e) = self.accept_line() {
                    tracing::warn!(error = %e, "command not delivered");
                }
            }
            KeyCode::Up => self.history_prev(),
            KeyCode::Down => self.history_next(),
            KeyCode::Left => self.move_left(shift),
            KeyCode::Right => self.move_right(shift),
            KeyCode::Home => self.move_to(self.command_start, shift),
            KeyCode::End => self.move_to(self.surface.len(), shift),
            KeyCode::Tab => self.type_text("\t"),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::PageUp => self.scroll_up(self.viewport_height.max(1)),
            KeyCode::PageDown => self.scroll_down(self.viewport_height.max(1)),
            KeyCode::Char('u') if ctrl => self.clear_line(),
            KeyCode::Char('c') if ctrl => self.copy(),
            KeyCode::Char('x') if ctrl => self.cut(),
            KeyCode::Char('v') if ctrl => self.paste(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                let mut buf = [0u8; 4];
                self.type_text(c.encode_utf8(&mut buf));
            }
            _ => return false,
        }
        true
    }

    fn move_left(&mut self, extend: bool) {
        let caret = self.surface.caret();
        if caret <= self.command_start {
            return;
        }
        self.move_to(caret - 1, extend);
    }

    fn move_right(&mut self, extend: bool) {
        let caret = self.surface.caret();
        if caret >= self.surface.len() {
            return;
        }
        self.move_to(caret + 1, extend);
    }

    fn move_to(&mut self, pos: usize, extend: bool) {
        if extend {
            self.surface.extend_selection(pos);
        } else {
            self.surface.set_caret(pos);
        }
    }

    /// Delete the selection if it lies in the command line. A selection
    /// reaching into history is left alone. Returns `true` if a selection
    /// was present.
    fn delete_selection(&mut self) -> bool {
        match self.surface.selection() {
            Some((from, _)) if from >= self.command_start => {
                self.surface.replace_selection("");
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        let caret = self.surface.caret();
        if caret <= self.command_start {
            return;
        }
        self.surface.replace(caret - 1, caret, "");
    }

    fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        let caret = self.surface.caret();
        if caret <= self.command_start || caret >= self.surface.len() {
            return;
        }
        self.surface.replace(caret, caret + 1, "");
    }
}

#[cfg(test)]
mod tests {
    use crate::console::{Console, HistoryCursor, TextSurface};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    fn press(c: &mut Console, code: KeyCode) -> bool {
        c.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: &mut Console, ch: char) -> bool {
        c.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn shift(c: &mut Console, code: KeyCode) -> bool {
        c.handle_key(KeyEvent::new(code, KeyModifiers::SHIFT))
    }

    fn type_keys(c: &mut Console, s: &str) {
        for ch in s.chars() {
            press(c, KeyCode::Char(ch));
        }
    }

    fn prompt(text: &str) -> Console {
        let mut c = Console::new().unwrap();
        c.print(text);
        c
    }

    #[test]
    fn test_enter_accepts_typed_line() {
        let mut c = prompt("$ ");
        let mut reader = c.input_reader();
        type_keys(&mut c, "ls -l");
        assert!(press(&mut c, KeyCode::Enter));

        let mut line = String::new();
        std::io::BufRead::read_line(&mut reader, &mut line).unwrap();
        assert_eq!(line, "ls -l\n");
        assert_eq!(c.text(), "$ ls -l\n");
        assert_eq!(c.command_start(), c.surface().len());
    }

    #[test]
    fn test_enter_with_caret_mid_line_sends_whole_line() {
        let mut c = prompt("> ");
        type_keys(&mut c, "abc");
        press(&mut c, KeyCode::Left);
        press(&mut c, KeyCode::Left);
        press(&mut c, KeyCode::Enter);
        assert_eq!(c.history().last(), Some("abc"));
    }

    #[test]
    fn test_left_stops_at_command_start() {
        let mut c = prompt("> ");
        type_keys(&mut c, "ab");
        for _ in 0..5 {
            assert!(press(&mut c, KeyCode::Left));
        }
        assert_eq!(c.caret(), 2);
        type_keys(&mut c, "x");
        assert_eq!(c.text(), "> xab");
    }

    #[test]
    fn test_backspace_never_eats_history() {
        let mut c = prompt("> ");
        type_keys(&mut c, "ab");
        for _ in 0..5 {
            press(&mut c, KeyCode::Backspace);
        }
        assert_eq!(c.text(), "> ");
    }

    #[test]
    fn test_delete_at_command_start_is_swallowed() {
        let mut c = prompt("> ");
        type_keys(&mut c, "abc");
        press(&mut c, KeyCode::Home);
        assert_eq!(c.caret(), 2);
        assert!(press(&mut c, KeyCode::Delete));
        assert_eq!(c.text(), "> abc");

        press(&mut c, KeyCode::Right);
        press(&mut c, KeyCode::Delete);
        assert_eq!(c.text(), "> ac");
        press(&mut c, KeyCode::Delete);
        press(&mut c, KeyCode::Delete);
        assert_eq!(c.text(), "> a");
    }

    #[test]
    fn test_delete_with_caret_in_history_is_swallowed() {
        let mut c = prompt("history ");
        type_keys(&mut c, "cmd");
        c.select(1, 1);
        assert!(press(&mut c, KeyCode::Delete));
        assert!(press(&mut c, KeyCode::Backspace));
        assert_eq!(c.text(), "history cmd");
    }

    #[test]
    fn test_backspace_deletes_selection_in_command_line() {
        let mut c = prompt("> ");
        type_keys(&mut c, "hello");
        shift(&mut c, KeyCode::Left);
        shift(&mut c, KeyCode::Left);
        assert_eq!(c.selection(), Some((5, 7)));
        press(&mut c, KeyCode::Backspace);
        assert_eq!(c.command_text(), "hel");
    }

    #[test]
    fn test_selection_into_history_is_not_deleted() {
        let mut c = prompt("> ");
        type_keys(&mut c, "ab");
        c.select(0, 4);
        press(&mut c, KeyCode::Backspace);
        assert_eq!(c.text(), "> ab");
    }

    #[test]
    fn test_home_and_end() {
        let mut c = prompt("prompt> ");
        type_keys(&mut c, "abc");
        press(&mut c, KeyCode::Home);
        assert_eq!(c.caret(), 8);
        press(&mut c, KeyCode::End);
        assert_eq!(c.caret(), 11);
        shift(&mut c, KeyCode::Home);
        assert_eq!(c.selection(), Some((8, 11)));
    }

    #[test]
    fn test_right_stops_at_end() {
        let mut c = prompt("> ");
        type_keys(&mut c, "a");
        press(&mut c, KeyCode::Right);
        press(&mut c, KeyCode::Right);
        assert_eq!(c.caret(), 3);
    }

    #[test]
    fn test_up_down_browse_history() {
        let mut c = prompt("");
        for cmd in ["a", "b", "c"] {
            type_keys(&mut c, cmd);
            press(&mut c, KeyCode::Enter);
        }
        type_keys(&mut c, "draft");
        let start = c.command_start();

        for expected in ["c", "b", "a", "a"] {
            press(&mut c, KeyCode::Up);
            assert_eq!(c.command_text(), expected);
        }
        assert_eq!(&c.text()[..start], "a\nb\nc\n");
        for _ in 0..3 {
            press(&mut c, KeyCode::Down);
        }
        assert_eq!(c.command_text(), "draft");
        assert!(press(&mut c, KeyCode::Down));
        assert_eq!(c.command_text(), "draft");
    }

    #[test]
    fn test_ctrl_u_clears_line_and_stops_browsing() {
        let mut c = prompt("$ ");
        c.set_command("old").unwrap();
        press(&mut c, KeyCode::Up);
        assert_eq!(c.history().cursor(), HistoryCursor::Browsing(1));
        assert!(ctrl(&mut c, 'u'));
        assert_eq!(c.command_text(), "");
        assert_eq!(c.history().cursor(), HistoryCursor::Editing);
        assert!(c.text().starts_with("$ old\n"));
    }

    #[test]
    fn test_ctrl_x_in_history_copies_only() {
        let mut c = prompt("log line\n");
        c.select(0, 3);
        ctrl(&mut c, 'x');
        assert_eq!(c.clipboard(), "log");
        assert_eq!(c.text(), "log line\n");
        ctrl(&mut c, 'v');
        assert_eq!(c.command_text(), "log");
    }

    #[test]
    fn test_ctrl_c_copies_selection() {
        let mut c = prompt("> ");
        type_keys(&mut c, "word");
        c.select(2, 6);
        ctrl(&mut c, 'c');
        assert_eq!(c.clipboard(), "word");
        assert_eq!(c.command_text(), "word");
    }

    #[test]
    fn test_modified_chars_and_function_keys_are_ignored() {
        let mut c = prompt("> ");
        assert!(!c.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)));
        assert!(!ctrl(&mut c, 'z'));
        assert!(!press(&mut c, KeyCode::F(1)));
        assert!(!press(&mut c, KeyCode::Esc));
        assert_eq!(c.text(), "> ");
    }

    #[test]
    fn test_shifted_chars_are_typed() {
        let mut c = prompt("");
        c.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(c.command_text(), "A");
    }

    #[test]
    fn test_tab_is_typed_into_command_line() {
        let mut c = prompt("$ ");
        let mut reader = c.input_reader();
        type_keys(&mut c, "a");
        assert!(press(&mut c, KeyCode::Tab));
        type_keys(&mut c, "b");
        assert_eq!(c.command_text(), "a\tb");
        press(&mut c, KeyCode::Enter);

        let mut line = String::new();
        std::io::BufRead::read_line(&mut reader, &mut line).unwrap();
        assert_eq!(line, "a\tb\n");
        assert!(!press(&mut c, KeyCode::BackTab));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut c = prompt("");
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(!c.handle_key(key));
        assert_eq!(c.text(), "");
    }

    #[test]
    fn test_page_keys_scroll_by_viewport() {
        let mut c = prompt("");
        c.set_viewport_height(10);
        press(&mut c, KeyCode::PageUp);
        assert_eq!(c.scroll_offset(), 10);
        press(&mut c, KeyCode::PageDown);
        assert_eq!(c.scroll_offset(), 0);
    }
}
