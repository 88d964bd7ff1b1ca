//! Highlight and scroll position for the user list.
//!
//! The renderer only draws the rows in `[offset, offset + visible)`. It
//! reports how many rows fit each frame via [`ListCursor::ensure_visible`],
//! which scrolls just enough to keep the highlight on screen.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    highlighted: usize,
    offset: usize,
    visible: usize,
}

impl ListCursor {
    #[must_use]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rows that fit the viewport as of the last frame (at least 1).
    #[must_use]
    pub fn page(&self) -> usize {
        self.visible.max(1)
    }

    pub fn reset(&mut self) {
        self.highlighted = 0;
        self.offset = 0;
    }

    pub fn set(&mut self, index: usize, len: usize) {
        self.highlighted = clamp_index(index, len);
        self.scroll_to_highlight();
    }

    pub fn up(&mut self, len: usize, by: usize) {
        self.set(self.highlighted.saturating_sub(by), len);
    }

    pub fn down(&mut self, len: usize, by: usize) {
        self.set(self.highlighted.saturating_add(by), len);
    }

    pub fn home(&mut self, len: usize) {
        self.set(0, len);
    }

    pub fn end(&mut self, len: usize) {
        self.set(len.saturating_sub(1), len);
    }

    /// Record the viewport height and clamp the window around the highlight.
    pub fn ensure_visible(&mut self, visible: usize, len: usize) {
        self.visible = visible;
        self.highlighted = clamp_index(self.highlighted, len);
        self.offset = self.offset.min(len.saturating_sub(visible.max(1)));
        self.scroll_to_highlight();
    }

    fn scroll_to_highlight(&mut self) {
        let page = self.page();
        if self.highlighted < self.offset {
            self.offset = self.highlighted;
        } else if self.highlighted >= self.offset + page {
            self.offset = self.highlighted + 1 - page;
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
