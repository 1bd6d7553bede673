use rust_decimal::Decimal;

/// Amount with thousand separators and at least two decimal places. Extra
/// precision is kept rather than rounded away.
/// e.g. `1234567.8` → `"1,234,567.80"`, `0.125` → `"0.125"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let mut abs = val.abs();
    if abs.scale() < 2 {
        abs.rescale(2);
    }
    let formatted = abs.to_string();
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max - 1).collect();
    format!("{truncated}…")
}

/// Cursor into a scrolled list: the selected row and the first visible row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

impl ListCursor {
    pub(crate) fn down(&mut self, len: usize, page: usize) {
        if self.index + 1 < len {
            self.index += 1;
            let page = page.max(1);
            if self.index >= self.scroll + page {
                self.scroll = self.index + 1 - page;
            }
        }
    }

    pub(crate) fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
        self.scroll = self.scroll.min(self.index);
    }

    pub(crate) fn top(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn bottom(&mut self, len: usize, page: usize) {
        if len > 0 {
            self.index = len - 1;
            self.scroll = self.index.saturating_sub(page.max(1) - 1);
        }
    }

    /// Pull the cursor back inside a list that may have shrunk.
    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.top();
        } else if self.index >= len {
            self.index = len - 1;
            self.scroll = self.scroll.min(self.index);
        }
    }
}
