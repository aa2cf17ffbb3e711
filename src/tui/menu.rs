//! Main menu screen listing the six master-data resources

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::ResourceKind;

use super::ui::Styles;

struct MenuEntry {
    kind: ResourceKind,
    description: &'static str,
    shortcut: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    None,
    Open(ResourceKind),
    Quit,
}

/// Main menu screen state
pub struct MenuScreen {
    state: ListState,
    entries: Vec<MenuEntry>,
}

fn describe(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Location => "Shelving locations: floor, section and shelf",
        ResourceKind::Category => "Book categories and their lifecycle status",
        ResourceKind::AcquisitionType => "How titles enter the collection",
        ResourceKind::Vendor => "Vendors with their category and acquisition links",
        ResourceKind::Publisher => "Publishers, codes and availability",
        ResourceKind::Author => "Authors and their biographical details",
    }
}

impl Default for MenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuScreen {
    pub fn new() -> Self {
        let entries = ResourceKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| MenuEntry {
                kind,
                description: describe(kind),
                shortcut: char::from(b'1' + i as u8),
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(0));

        Self { state, entries }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuCommand {
        match key.code {
            KeyCode::Up => {
                let selected = self.state.selected().unwrap_or(0);
                let next = if selected == 0 {
                    self.entries.len() - 1
                } else {
                    selected - 1
                };
                self.state.select(Some(next));
                MenuCommand::None
            }
            KeyCode::Down => {
                let selected = self.state.selected().unwrap_or(0);
                self.state.select(Some((selected + 1) % self.entries.len()));
                MenuCommand::None
            }
            KeyCode::Enter => match self.state.selected().and_then(|i| self.entries.get(i)) {
                Some(entry) => MenuCommand::Open(entry.kind),
                None => MenuCommand::None,
            },
            KeyCode::Char('q') => MenuCommand::Quit,
            KeyCode::Char(c) => {
                for entry in &self.entries {
                    if entry.shortcut == c {
                        return MenuCommand::Open(entry.kind);
                    }
                }
                MenuCommand::None
            }
            _ => MenuCommand::None,
        }
    }

    /// Draw the main menu screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Menu
                Constraint::Length(4), // Instructions
            ])
            .split(area);

        self.draw_title(f, chunks[0]);
        self.draw_menu(f, chunks[1]);
        self.draw_instructions(f, chunks[2]);
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let title = Paragraph::new("Library Master Data Console")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_menu(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if Some(i) == self.state.selected() {
                    Styles::selected()
                } else {
                    Style::default()
                };

                let content = vec![
                    Line::from(vec![
                        Span::styled(format!("[{}] ", entry.shortcut), Styles::info()),
                        Span::styled(entry.kind.title(), style.add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::styled(
                        format!("    {}", entry.description),
                        if Some(i) == self.state.selected() {
                            style
                        } else {
                            Styles::inactive()
                        },
                    )),
                ];

                ListItem::new(content)
            })
            .collect();

        let menu = List::new(items)
            .block(
                Block::default()
                    .title("Resources")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(menu, area, &mut self.state);
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let instructions = vec![
            Line::from(vec![
                Span::styled("Navigation: ", Styles::info()),
                Span::raw("↑/↓ to move, "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to open, "),
                Span::styled("1-6", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" for direct access"),
            ]),
            Line::from(vec![
                Span::styled("Global: ", Styles::info()),
                Span::styled("F1", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" for help, "),
                Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to quit"),
            ]),
        ];

        let widget = Paragraph::new(instructions).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(widget, area);
    }
}
