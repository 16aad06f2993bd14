//! Console panel widget: wrapped, styled text with selection and caret.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::console::{Console, TextSurface};
use crate::theme::ConsoleTheme;

/// Widget that renders a [`Console`].
///
/// The newest rows stay at the bottom; `Console::scroll_offset` rows of
/// scrollback are skipped from the end.
pub struct ConsoleWidget<'a, S: TextSurface> {
    console: &'a Console<S>,
    theme: &'a ConsoleTheme,
    block: Option<Block<'a>>,
    show_cursor: bool,
}

impl<'a, S: TextSurface> ConsoleWidget<'a, S> {
    pub fn new(console: &'a Console<S>, theme: &'a ConsoleTheme, show_cursor: bool) -> Self {
        Self {
            console,
            theme,
            block: None,
            show_cursor,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a, S: TextSurface> Widget for ConsoleWidget<'a, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        buf.set_style(inner, Style::default().bg(self.theme.background));

        let wrapped = self.console.surface().layout(inner.width as usize);
        let height = inner.height as usize;
        let total = wrapped.lines.len();
        let offset = self
            .console
            .scroll_offset()
            .min(total.saturating_sub(height));
        let first = total.saturating_sub(height + offset);
        let visible = first..first + height;

        for (i, line) in wrapped.lines.iter().skip(first).take(height).enumerate() {
            let y = inner.y + i as u16;
            let mut x = inner.x;
            for span in &line.spans {
                let remaining = inner.right().saturating_sub(x) as usize;
                if remaining == 0 {
                    break;
                }
                let (next_x, _) = buf.set_stringn(x, y, &span.content, remaining, span.style);
                x = next_x;
            }
        }

        for &(row, start, end) in &wrapped.selection {
            if !visible.contains(&row) {
                continue;
            }
            let y = inner.y + (row - first) as u16;
            for col in start..end.min(inner.width as usize) {
                if let Some(cell) = buf.cell_mut((inner.x + col as u16, y)) {
                    cell.set_bg(self.theme.selection_bg);
                }
            }
        }

        if self.show_cursor && self.console.is_focused() {
            let (row, col) = wrapped.caret;
            if visible.contains(&row) && col < inner.width as usize {
                let pos = (inner.x + col as u16, inner.y + (row - first) as u16);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_style(
                        Style::default()
                            .fg(self.theme.cursor_fg)
                            .bg(self.theme.cursor_bg)
                            .add_modifier(Modifier::BOLD),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;
    use ratatui::widgets::Borders;

    fn row_text(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| {
                buf.cell((x, y))
                    .map(|c| c.symbol().chars().next().unwrap_or(' '))
                    .unwrap_or(' ')
            })
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn render(console: &Console, show_cursor: bool, area: Rect) -> Buffer {
        let theme = theme::dark_theme();
        let mut buf = Buffer::empty(area);
        ConsoleWidget::new(console, &theme, show_cursor).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_console_widget_renders_text() {
        let mut console = Console::new().unwrap();
        console.print("Hello World\n$ ");
        let buf = render(&console, false, Rect::new(0, 0, 40, 5));
        assert_eq!(row_text(&buf, 0, 40), "Hello World");
        assert_eq!(row_text(&buf, 1, 40), "$");
    }

    #[test]
    fn test_console_widget_wraps_long_lines() {
        let mut console = Console::new().unwrap();
        console.print("abcdefgh");
        let buf = render(&console, false, Rect::new(0, 0, 5, 3));
        assert_eq!(row_text(&buf, 0, 5), "abcde");
        assert_eq!(row_text(&buf, 1, 5), "fgh");
    }

    #[test]
    fn test_console_widget_follows_newest_rows() {
        let mut console = Console::new().unwrap();
        console.print("1\n2\n3\n4\n5");
        let buf = render(&console, false, Rect::new(0, 0, 10, 2));
        assert_eq!(row_text(&buf, 0, 10), "4");
        assert_eq!(row_text(&buf, 1, 10), "5");
    }

    #[test]
    fn test_console_widget_scrollback() {
        let mut console = Console::new().unwrap();
        console.print("1\n2\n3\n4\n5");
        console.scroll_up(2);
        let buf = render(&console, false, Rect::new(0, 0, 10, 2));
        assert_eq!(row_text(&buf, 0, 10), "2");
        assert_eq!(row_text(&buf, 1, 10), "3");

        console.scroll_up(100);
        let buf = render(&console, false, Rect::new(0, 0, 10, 2));
        assert_eq!(row_text(&buf, 0, 10), "1");
    }

    #[test]
    fn test_console_widget_cursor_cell() {
        let mut console = Console::new().unwrap();
        console.print("> ");
        let theme = theme::dark_theme();
        let buf = render(&console, true, Rect::new(0, 0, 10, 2));
        let cell = buf.cell((2, 0)).unwrap();
        assert_eq!(cell.bg, theme.cursor_bg);

        console.set_focused(false);
        let buf = render(&console, true, Rect::new(0, 0, 10, 2));
        assert_ne!(buf.cell((2, 0)).unwrap().bg, theme.cursor_bg);
    }

    #[test]
    fn test_console_widget_selection_background() {
        let mut console = Console::new().unwrap();
        console.print("select me");
        console.select(0, 6);
        let theme = theme::dark_theme();
        let buf = render(&console, false, Rect::new(0, 0, 20, 2));
        assert_eq!(buf.cell((0, 0)).unwrap().bg, theme.selection_bg);
        assert_eq!(buf.cell((5, 0)).unwrap().bg, theme.selection_bg);
        assert_ne!(buf.cell((6, 0)).unwrap().bg, theme.selection_bg);
    }

    #[test]
    fn test_console_widget_with_block() {
        let mut console = Console::new().unwrap();
        console.print("inside");
        let theme = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        ConsoleWidget::new(&console, &theme, false)
            .block(Block::default().borders(Borders::ALL))
            .render(area, &mut buf);
        assert!(row_text(&buf, 1, 20).starts_with("│inside"));
    }

    #[test]
    fn test_console_widget_keeps_wide_chars() {
        let mut console = Console::new().unwrap();
        console.print("你好世界");
        let buf = render(&console, false, Rect::new(0, 0, 4, 3));
        let symbol = |x, y| buf.cell((x, y)).unwrap().symbol().to_string();
        assert_eq!(symbol(0, 0), "你");
        assert_eq!(symbol(2, 0), "好");
        assert_eq!(symbol(0, 1), "世");
        assert_eq!(symbol(2, 1), "界");
    }

    #[test]
    fn test_console_widget_cursor_after_wide_char() {
        let mut console = Console::new().unwrap();
        console.print("你> ");
        let theme = theme::dark_theme();
        let buf = render(&console, true, Rect::new(0, 0, 10, 2));
        assert_eq!(buf.cell((4, 0)).unwrap().bg, theme.cursor_bg);
    }

    #[test]
    fn test_console_widget_zero_area() {
        let console = Console::new().unwrap();
        let area = Rect::new(0, 0, 0, 0);
        let _ = render(&console, true, area);
    }
}
