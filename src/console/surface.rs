//! Text surface: the styled, editable text the console displays.
//!
//! The console only talks to its surface through [`TextSurface`], so any text
//! view that can insert, select, move a caret and switch the typing style can
//! back a console. [`StyledText`] is the built-in implementation used with
//! ratatui.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::error::{ConsoleError, Result};

/// Capabilities the console needs from a text view.
///
/// Offsets are character indices. Ranges are half-open `[from, to)`.
pub trait TextSurface {
    /// Number of characters in the surface.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text in `[from, to)`.
    fn text(&self, from: usize, to: usize) -> Result<String>;

    /// Select `[from, to)`. The caret ends up at `to`, the anchor at `from`.
    fn select(&mut self, from: usize, to: usize);

    /// Move the caret to `pos` while keeping (or starting) a selection anchored
    /// at the previous caret.
    fn extend_selection(&mut self, pos: usize);

    /// Current selection as an ordered, non-empty range.
    fn selection(&self) -> Option<(usize, usize)>;

    /// Replace the selection (or insert at the caret) with `content` in the
    /// current typing style. The caret moves to the end of the new text.
    fn replace_selection(&mut self, content: &str);

    fn caret(&self) -> usize;

    /// Move the caret and drop any selection.
    fn set_caret(&mut self, pos: usize);

    /// Style applied to inserted text.
    fn style(&self) -> Style;

    fn set_style(&mut self, style: Style);

    /// Remove all text.
    fn clear(&mut self);

    /// Wrap the content into rows of at most `width` terminal cells. Wide
    /// characters take two cells; tabs advance to the next tab stop.
    fn layout(&self, width: usize) -> WrappedText;

    /// Append `content` at the end of the text.
    fn append(&mut self, content: &str) {
        let len = self.len();
        self.select(len, len);
        self.replace_selection(content);
    }

    /// Replace `[from, to)` with `content`.
    fn replace(&mut self, from: usize, to: usize, content: &str) {
        self.select(from, to);
        self.replace_selection(content);
    }
}

/// Tab stops are every `TAB_WIDTH` cells.
pub const TAB_WIDTH: usize = 8;

/// Display rows produced by [`TextSurface::layout`].
#[derive(Debug, Clone, Default)]
pub struct WrappedText {
    pub lines: Vec<Line<'static>>,
    /// Caret position as (row, cell column) within `lines`.
    pub caret: (usize, usize),
    /// Selected cells as (row, cell start, cell end) per row.
    pub selection: Vec<(usize, usize, usize)>,
}

/// A single character with its style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub style: Style,
}

/// In-memory styled text buffer.
#[derive(Debug, Clone, Default)]
pub struct StyledText {
    cells: Vec<StyledChar>,
    caret: usize,
    /// Selection anchor; the caret is the other end.
    anchor: Option<usize>,
    style: Style,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full plain text.
    pub fn plain_text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }

    /// Style of the character at `pos`, if any.
    pub fn style_at(&self, pos: usize) -> Option<Style> {
        self.cells.get(pos).map(|c| c.style)
    }

    fn clamp(&self, pos: usize) -> usize {
        pos.min(self.cells.len())
    }
}

impl TextSurface for StyledText {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn text(&self, from: usize, to: usize) -> Result<String> {
        let len = self.cells.len();
        if from > len {
            return Err(ConsoleError::InvalidOffset { offset: from, len });
        }
        if to > len || to < from {
            return Err(ConsoleError::InvalidOffset { offset: to, len });
        }
        Ok(self.cells[from..to].iter().map(|c| c.ch).collect())
    }

    fn select(&mut self, from: usize, to: usize) {
        let from = self.clamp(from);
        let to = self.clamp(to);
        self.anchor = (from != to).then_some(from);
        self.caret = to;
    }

    fn extend_selection(&mut self, pos: usize) {
        let pos = self.clamp(pos);
        if self.anchor.is_none() {
            self.anchor = Some(self.caret);
        }
        self.caret = pos;
        if self.anchor == Some(pos) {
            self.anchor = None;
        }
    }

    fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        let (from, to) = (anchor.min(self.caret), anchor.max(self.caret));
        (from < to).then_some((from, to))
    }

    fn replace_selection(&mut self, content: &str) {
        let (from, to) = self.selection().unwrap_or((self.caret, self.caret));
        let style = self.style;
        let inserted: Vec<StyledChar> = content.chars().map(|ch| StyledChar { ch, style }).collect();
        let count = inserted.len();
        self.cells.splice(from..to, inserted);
        self.anchor = None;
        self.caret = from + count;
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, pos: usize) {
        self.caret = self.clamp(pos);
        self.anchor = None;
    }

    fn style(&self) -> Style {
        self.style
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.caret = 0;
        self.anchor = None;
    }

    fn layout(&self, width: usize) -> WrappedText {
        let width = width.max(1);
        let selection = self.selection();
        let mut rows: Vec<Vec<StyledChar>> = vec![Vec::new()];
        // display cells used by the last row
        let mut used = 0;
        let mut caret = None;
        let mut selected = Vec::new();

        for (i, cell) in self.cells.iter().enumerate() {
            let cells = match cell.ch {
                '\n' => 0,
                '\t' => {
                    if used >= width {
                        rows.push(Vec::new());
                        used = 0;
                    }
                    (TAB_WIDTH - used % TAB_WIDTH).min(width - used)
                }
                ch => {
                    let cells = ch.width().unwrap_or(0);
                    if used > 0 && used + cells > width {
                        rows.push(Vec::new());
                        used = 0;
                    }
                    cells
                }
            };
            let row = rows.len() - 1;
            if i == self.caret {
                caret = Some((row, used));
            }
            if cell.ch == '\n' {
                rows.push(Vec::new());
                used = 0;
                continue;
            }
            if cells > 0 && matches!(selection, Some((from, to)) if i >= from && i < to) {
                selected.push((row, used, used + cells));
            }
            if cell.ch == '\t' {
                rows[row].extend(std::iter::repeat(StyledChar { ch: ' ', ..*cell }).take(cells));
            } else {
                rows[row].push(*cell);
            }
            used += cells;
        }

        let caret = caret.unwrap_or_else(|| {
            let last = rows.len() - 1;
            if used >= width {
                rows.push(Vec::new());
                (last + 1, 0)
            } else {
                (last, used)
            }
        });

        WrappedText {
            lines: rows.iter().map(|row| row_to_line(row)).collect(),
            caret,
            selection: merge_selection(selected),
        }
    }
}

/// Group consecutive cells with the same style into spans.
fn row_to_line(row: &[StyledChar]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = None;
    for cell in row {
        if current_style != Some(cell.style) {
            if let Some(style) = current_style {
                spans.push(Span::styled(std::mem::take(&mut current), style));
            }
            current_style = Some(cell.style);
        }
        current.push(cell.ch);
    }
    if let Some(style) = current_style {
        spans.push(Span::styled(current, style));
    }
    Line::from(spans)
}

fn merge_selection(cells: Vec<(usize, usize, usize)>) -> Vec<(usize, usize, usize)> {
    let mut merged: Vec<(usize, usize, usize)> = Vec::new();
    for (row, start, end) in cells {
        match merged.last_mut() {
            Some(last) if last.0 == row && last.2 == start => last.2 = end,
            _ => merged.push((row, start, end)),
        }
    }
    merged
}
