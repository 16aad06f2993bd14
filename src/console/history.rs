//! Command history with Up/Down browsing.

/// Where the user is while walking the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryCursor {
    /// Editing the live command line.
    #[default]
    Editing,
    /// Showing the k-th most recent entry (1 = newest).
    Browsing(usize),
}

/// Accepted commands, oldest first.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: HistoryCursor,
    /// Live command line saved when browsing starts.
    pending: String,
    limit: Option<usize>,
}

impl CommandHistory {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record an accepted command. Empty commands are not recorded, and a
    /// limit of 0 records nothing.
    ///
    /// Does not touch the browsing cursor.
    pub fn push(&mut self, command: &str) {
        if command.is_empty() {
            return;
        }
        self.entries.push(command.to_string());
        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            self.entries.drain(..excess);
        }
    }

    /// Step to an older entry. `live` is the current command line, saved when
    /// browsing starts. Returns the line to display, or `None` if nothing
    /// changes.
    pub fn prev(&mut self, live: &str) -> Option<String> {
        let n = self.entries.len();
        let k = match self.cursor {
            _ if n == 0 => return None,
            HistoryCursor::Editing => {
                self.pending = live.to_string();
                1
            }
            HistoryCursor::Browsing(k) if k < n => k + 1,
            HistoryCursor::Browsing(_) => return None,
        };
        self.cursor = HistoryCursor::Browsing(k);
        Some(self.entries[n - k].clone())
    }

    /// Step to a newer entry, ending at the saved live line.
    pub fn next(&mut self) -> Option<String> {
        match self.cursor {
            HistoryCursor::Editing => None,
            HistoryCursor::Browsing(1) => {
                self.cursor = HistoryCursor::Editing;
                Some(std::mem::take(&mut self.pending))
            }
            HistoryCursor::Browsing(k) => {
                let k = k - 1;
                self.cursor = HistoryCursor::Browsing(k);
                self.entries.get(self.entries.len().saturating_sub(k)).cloned()
            }
        }
    }

    /// Stop browsing and forget the saved live line.
    pub fn reset(&mut self) {
        self.cursor = HistoryCursor::Editing;
        self.pending.clear();
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> CommandHistory {
        let mut h = CommandHistory::new(None);
        for c in ["a", "b", "c"] {
            h.push(c);
        }
        h
    }

    #[test]
    fn test_empty_commands_are_not_recorded() {
        let mut h = CommandHistory::new(None);
        h.push("");
        assert!(h.is_empty());
        h.push("ls");
        assert_eq!(h.last(), Some("ls"));
    }

    #[test]
    fn test_prev_walks_newest_to_oldest() {
        let mut h = abc();
        assert_eq!(h.prev("live").as_deref(), Some("c"));
        assert_eq!(h.prev("ignored").as_deref(), Some("b"));
        assert_eq!(h.prev("ignored").as_deref(), Some("a"));
        assert_eq!(h.cursor(), HistoryCursor::Browsing(3));
    }

    #[test]
    fn test_prev_at_oldest_is_noop() {
        let mut h = abc();
        for _ in 0..3 {
            h.prev("");
        }
        assert_eq!(h.prev(""), None);
        assert_eq!(h.cursor(), HistoryCursor::Browsing(3));
    }

    #[test]
    fn test_next_returns_to_saved_live_line() {
        let mut h = abc();
        for _ in 0..3 {
            h.prev("draft");
        }
        assert_eq!(h.next().as_deref(), Some("b"));
        assert_eq!(h.next().as_deref(), Some("c"));
        assert_eq!(h.next().as_deref(), Some("draft"));
        assert_eq!(h.cursor(), HistoryCursor::Editing);
        assert_eq!(h.next(), None);
    }

    #[test]
    fn test_prev_on_empty_history_is_noop() {
        let mut h = CommandHistory::new(None);
        assert_eq!(h.prev("x"), None);
        assert_eq!(h.cursor(), HistoryCursor::Editing);
    }

    #[test]
    fn test_push_while_browsing_keeps_order() {
        let mut h = abc();
        h.prev("");
        h.prev("");
        h.push("d");
        assert_eq!(h.entries(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_reset_forgets_pending() {
        let mut h = abc();
        h.prev("draft");
        h.reset();
        assert_eq!(h.cursor(), HistoryCursor::Editing);
        assert_eq!(h.prev("").as_deref(), Some("c"));
        assert_eq!(h.next().as_deref(), Some(""));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = CommandHistory::new(Some(2));
        for c in ["a", "b", "c"] {
            h.push(c);
        }
        assert_eq!(h.entries(), ["b", "c"]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_zero_limit_keeps_no_history() {
        let mut h = CommandHistory::new(Some(0));
        h.push("ls");
        assert!(h.is_empty());
        assert_eq!(h.prev("live"), None);
        assert_eq!(h.cursor(), HistoryCursor::Editing);
    }
}
