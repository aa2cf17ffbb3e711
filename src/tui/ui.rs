//! Common UI styles and widgets for the admin console

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::screen::Tone;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn info() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn active_border() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive_border() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn tone(tone: Tone) -> Style {
        match tone {
            Tone::Success => Self::success(),
            Tone::Error => Self::error(),
            Tone::Info => Self::inactive(),
        }
    }
}

/// Byte offset of a character position, for cursor-based editing on
/// values that may hold multi-byte text.
pub fn byte_index(value: &str, cursor: usize) -> usize {
    value
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

pub fn insert_char(value: &mut String, cursor: usize, c: char) -> usize {
    let at = byte_index(value, cursor);
    value.insert(at, c);
    cursor + 1
}

/// Remove the character before the cursor, returning the new cursor.
pub fn remove_char_before(value: &mut String, cursor: usize) -> usize {
    if cursor == 0 {
        return 0;
    }
    let at = byte_index(value, cursor - 1);
    value.remove(at);
    cursor - 1
}

pub fn remove_char_at(value: &mut String, cursor: usize) {
    if cursor < value.chars().count() {
        let at = byte_index(value, cursor);
        value.remove(at);
    }
}

/// One-line bordered input. The value lives in the draft; this only
/// knows how to draw it and to place the terminal cursor when focused.
pub struct InputField<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub locked: bool,
    pub cursor: usize,
}

impl<'a> InputField<'a> {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border = if self.focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border);

        let showing_placeholder = self.value.is_empty() && !self.placeholder.is_empty();
        let text = if showing_placeholder {
            self.placeholder
        } else {
            self.value
        };
        let style = if self.locked || showing_placeholder {
            Styles::inactive()
        } else {
            Style::default()
        };

        f.render_widget(Paragraph::new(text).style(style).block(block), area);

        if self.focused && !self.locked {
            let prefix = &self.value[..byte_index(self.value, self.cursor)];
            let cursor_x = area.x + 1 + prefix.width() as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, area.y + 1);
            }
        }
    }
}

/// Pad or truncate a cell to a fixed display width (Unicode-aware).
/// Truncated text ends in an ellipsis.
pub fn fit_cell(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let display_width = text.width();
    if display_width <= width {
        return format!("{}{}", text, " ".repeat(width - display_width));
    }
    let target = width - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > target {
            break;
        }
        out.push(c);
        used += w;
    }
    format!("{}…{}", out, " ".repeat(width - used - 1))
}

/// Center a rectangle within another rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
