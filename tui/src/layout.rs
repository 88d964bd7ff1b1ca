//! Screen geometry shared by drawing and mouse hit-testing.
//!
//! Every rect here is a pure function of the terminal area, so a click can be
//! mapped back to what the previous frame drew at that cell.

use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};
use unicode_width::UnicodeWidthStr;

use roster_engine::{App, Phase};

/// Lines per user row: name, email, company.
pub const ROW_HEIGHT: u16 = 3;
/// Blank line between rows.
const ROW_GAP: u16 = 1;
const ROW_STRIDE: u16 = ROW_HEIGHT + ROW_GAP;

pub const RETRY_LABEL: &str = "[ Retry ]";
/// Lines reserved above the retry button for the wrapped error message.
const MESSAGE_LINES: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    #[must_use]
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(1),    // Body
                Constraint::Length(1), // Footer
            ])
            .split(area);
        Self {
            header: chunks[0],
            body: chunks[1],
            footer: chunks[2],
        }
    }

    /// Inside the list border, minus the scrollbar column.
    #[must_use]
    pub fn list_rows(&self) -> Rect {
        let inner = self.list_inner();
        Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        }
    }

    /// Inside the list border.
    #[must_use]
    pub fn list_inner(&self) -> Rect {
        self.body.inner(Margin {
            horizontal: 1,
            vertical: 1,
        })
    }

    #[must_use]
    pub fn error(&self) -> ErrorLayout {
        ErrorLayout::new(self.body)
    }
}

/// Number of whole rows that fit `rows_area` (at least 1).
#[must_use]
pub fn visible_rows(rows_area: Rect) -> usize {
    usize::from((rows_area.height + ROW_GAP) / ROW_STRIDE).max(1)
}

/// Rect of the `slot`-th visible row, clipped to `rows_area`.
#[must_use]
pub fn row_rect(rows_area: Rect, slot: usize) -> Option<Rect> {
    let offset = u16::try_from(slot).ok()?.checked_mul(ROW_STRIDE)?;
    let y = rows_area.y.checked_add(offset)?;
    if y >= rows_area.bottom() {
        return None;
    }
    Some(Rect {
        x: rows_area.x,
        y,
        width: rows_area.width,
        height: ROW_HEIGHT.min(rows_area.bottom() - y),
    })
}

/// List index under `position`, if it lands on a drawn row.
#[must_use]
pub fn row_at(rows_area: Rect, offset: usize, len: usize, position: Position) -> Option<usize> {
    if !rows_area.contains(position) {
        return None;
    }
    let relative = position.y - rows_area.y;
    if relative % ROW_STRIDE >= ROW_HEIGHT {
        return None;
    }
    let slot = usize::from(relative / ROW_STRIDE);
    if slot >= visible_rows(rows_area) {
        return None;
    }
    let index = offset + slot;
    (index < len).then_some(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLayout {
    pub message: Rect,
    pub button: Rect,
    pub hint: Rect,
}

impl ErrorLayout {
    fn new(body: Rect) -> Self {
        let mid = body.y + body.height / 2;
        let message_top = mid.saturating_sub(MESSAGE_LINES).max(body.y);
        let message = Rect {
            x: body.x,
            y: message_top,
            width: body.width,
            height: mid - message_top,
        };

        let label_width = RETRY_LABEL.width() as u16;
        let button_width = label_width.min(body.width);
        let button_y = (mid + 1).min(body.bottom().saturating_sub(1)).max(body.y);
        let button = Rect {
            x: body.x + (body.width - button_width) / 2,
            y: button_y,
            width: button_width,
            height: u16::from(body.height > 0),
        };

        let hint_y = button_y + 2;
        let hint = Rect {
            x: body.x,
            y: hint_y,
            width: body.width,
            height: u16::from(hint_y < body.bottom()),
        };

        Self {
            message,
            button,
            hint,
        }
    }
}

/// What a left click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Row(usize),
    Retry,
}

/// Map a click at (`column`, `row`) in a terminal of size `area` to a target.
#[must_use]
pub fn hit_test(area: Rect, app: &App, column: u16, row: u16) -> Option<Hit> {
    let layout = ScreenLayout::new(area);
    let position = Position::new(column, row);
    match app.phase() {
        Phase::Loading => None,
        Phase::Failed => layout
            .error()
            .button
            .contains(position)
            .then_some(Hit::Retry),
        Phase::Loaded => row_at(
            layout.list_rows(),
            app.cursor().offset(),
            app.users().len(),
            position,
        )
        .map(Hit::Row),
    }
}
