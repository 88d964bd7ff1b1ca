//! TUI rendering for Roster using ratatui.

mod format;
mod input;
mod layout;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use layout::{Hit, RETRY_LABEL, ROW_HEIGHT, ScreenLayout, hit_test, visible_rows};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use roster_engine::{App, Phase, RowView, sanitize_display_line};

use self::format::{truncate_to_width, user_count_label};
use self::layout::{ErrorLayout, row_rect};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let layout = ScreenLayout::new(frame.area());

    draw_header(frame, app, layout.header, &palette, &glyphs);
    match app.phase() {
        Phase::Loading => draw_loading(frame, app, layout.body, &palette),
        Phase::Failed => draw_error(frame, app, layout.error(), &palette, &glyphs),
        Phase::Loaded => draw_list(frame, app, &layout, &palette, &glyphs),
    }
    draw_footer(frame, app, layout.footer, &palette, &glyphs);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("Roster", styles::title(palette)),
        Span::styled(
            format!(" {} ", glyphs.separator),
            Style::default().fg(palette.bg_border),
        ),
    ];

    let count = (app.phase() == Phase::Loaded).then(|| user_count_label(app.users().len()));
    let reserved = 10 + count.as_ref().map_or(0, |c| c.width() + 3);
    let source = sanitize_display_line(&app.source_label()).into_owned();
    let source = truncate_to_width(
        &source,
        usize::from(area.width).saturating_sub(reserved),
        glyphs.ellipsis,
    );
    spans.push(Span::styled(source, Style::default().fg(palette.text_muted)));

    if let Some(count) = count {
        spans.push(Span::styled(
            format!(" {} ", glyphs.separator),
            Style::default().fg(palette.bg_border),
        ));
        spans.push(Span::styled(count, Style::default().fg(palette.success)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_loading(frame: &mut Frame, app: &App, body: Rect, palette: &Palette) {
    let spinner = spinner_frame(app.tick_count(), app.ui_options());
    let line = Line::from(vec![
        Span::styled(spinner, Style::default().fg(palette.primary)),
        Span::styled(" Loading users...", Style::default().fg(palette.text_secondary)),
    ]);
    let row = Rect {
        y: body.y + body.height / 2,
        height: body.height.min(1),
        ..body
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}

fn draw_error(
    frame: &mut Frame,
    app: &App,
    error: ErrorLayout,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let message = app
        .error_message()
        .map(|m| sanitize_display_line(m).into_owned())
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(
            format!("{} ", glyphs.error),
            Style::default().fg(palette.error),
        ),
        Span::styled(
            format!("Error: {message}"),
            Style::default().fg(palette.text_primary),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        error.message,
    );

    frame.render_widget(
        Paragraph::new(RETRY_LABEL).style(styles::retry_button(palette)),
        error.button,
    );

    let hint = Line::from(vec![
        Span::styled("press ", styles::key_hint(palette)),
        Span::styled("r", styles::key_highlight(palette)),
        Span::styled(" or ", styles::key_hint(palette)),
        Span::styled("Enter", styles::key_highlight(palette)),
        Span::styled(" to try again", styles::key_hint(palette)),
    ]);
    frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), error.hint);
}

fn draw_list(
    frame: &mut Frame,
    app: &mut App,
    layout: &ScreenLayout,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let total = app.users().len();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.text_muted))
        .title_top(Line::from(vec![Span::styled(
            format!(" Users ({total}) "),
            styles::title(palette),
        )]));
    frame.render_widget(block, layout.body);

    let rows_area = layout.list_rows();
    if total == 0 {
        let row = Rect {
            y: rows_area.y + rows_area.height / 2,
            height: rows_area.height.min(1),
            ..rows_area
        };
        frame.render_widget(
            Paragraph::new(Span::styled("No users", Style::default().fg(palette.text_muted)))
                .alignment(Alignment::Center),
            row,
        );
        return;
    }

    let visible = visible_rows(rows_area);
    app.set_visible_rows(visible);
    let cursor = app.cursor();

    for (slot, row) in app.rows_in(cursor.offset(), visible).iter().enumerate() {
        let Some(rect) = row_rect(rows_area, slot) else {
            break;
        };
        draw_row(frame, row, rect, palette, glyphs);
    }

    if total > visible {
        let mut state = ScrollbarState::new(total.saturating_sub(visible))
            .position(cursor.offset())
            .viewport_content_length(visible);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .style(Style::default().fg(palette.text_muted));
        frame.render_stateful_widget(scrollbar, layout.list_inner(), &mut state);
    }
}

fn draw_row(frame: &mut Frame, row: &RowView, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    const INDENT: &str = "  ";

    let width = usize::from(area.width).saturating_sub(INDENT.len());
    let marker = if row.highlighted { glyphs.pointer } else { " " };
    let badge = if row.selected {
        format!(" {}", glyphs.selected)
    } else {
        String::new()
    };
    let title_width = width.saturating_sub(badge.width());

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(palette.primary)),
            Span::styled(
                truncate_to_width(&row.title, title_width, glyphs.ellipsis),
                styles::row_title(palette),
            ),
            Span::styled(badge, Style::default().fg(palette.success)),
        ]),
        Line::from(vec![
            Span::raw(INDENT),
            Span::styled(
                truncate_to_width(&row.subtitle, width, glyphs.ellipsis),
                styles::row_subtitle(palette),
            ),
        ]),
        Line::from(vec![
            Span::raw(INDENT),
            Span::styled(
                truncate_to_width(&row.company, width, glyphs.ellipsis),
                styles::row_company(palette),
            ),
        ]),
    ];

    let mut paragraph = Paragraph::new(lines);
    if row.highlighted {
        paragraph = paragraph.style(Style::default().bg(palette.bg_highlight));
    }
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let key = |k: &'static str| Span::styled(k, styles::key_highlight(palette));
    let text = |t: &'static str| Span::styled(t, styles::key_hint(palette));
    let move_keys = if app.ui_options().ascii_only {
        "j/k"
    } else {
        "↑/↓"
    };

    let mut hints = vec![Span::raw(" ")];
    match app.phase() {
        Phase::Loading => {}
        Phase::Failed => hints.extend([key("r"), text(" retry  ")]),
        Phase::Loaded => hints.extend([
            key(move_keys),
            text(" move  "),
            key("Enter"),
            text(" select  "),
        ]),
    }
    hints.extend([key("q"), text(" quit")]);

    let selection = app
        .selected()
        .map(|user| format!("Selected: {} ", sanitize_display_line(&user.name)));
    let selection_width = selection
        .as_ref()
        .map_or(0, |s| s.width().min(usize::from(area.width) / 2)) as u16;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(selection_width)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(hints)), chunks[0]);
    if let Some(selection) = selection {
        let selection =
            truncate_to_width(&selection, usize::from(selection_width), glyphs.ellipsis);
        frame.render_widget(
            Paragraph::new(Span::styled(selection, Style::default().fg(palette.success)))
                .alignment(Alignment::Right),
            chunks[1],
        );
    }
}
