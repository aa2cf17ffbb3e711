//! Checkbox picker over a reference list fetched from another resource.
//!
//! The picker owns the fetched options and the highlight cursor, nothing
//! else. Which ids are checked lives in the parent draft; toggling goes
//! through the parent so the form stays the single owner of the
//! selection.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::resources::{PickerSpec, RefOption};

use super::ui::Styles;

#[derive(Debug, Clone)]
pub enum PickerState {
    Loading,
    Failed(String),
    Ready(Vec<RefOption>),
}

pub struct OptionPicker {
    pub spec: &'static PickerSpec,
    state: PickerState,
    /// Set once the first fetch has been spawned. Failures stay on
    /// screen; there is no automatic retry.
    requested: bool,
    highlight: usize,
    list: ListState,
}

impl OptionPicker {
    pub fn new(spec: &'static PickerSpec) -> Self {
        Self {
            spec,
            state: PickerState::Loading,
            requested: false,
            highlight: 0,
            list: ListState::default(),
        }
    }

    pub fn needs_load(&self) -> bool {
        !self.requested
    }

    pub fn mark_requested(&mut self) {
        self.requested = true;
    }

    pub fn apply(&mut self, outcome: Result<Vec<RefOption>, ApiError>) {
        self.state = match outcome {
            Ok(options) => PickerState::Ready(options),
            Err(err) => PickerState::Failed(err.to_string()),
        };
        self.highlight = 0;
        self.list.select(None);
    }

    pub fn options(&self) -> &[RefOption] {
        match &self.state {
            PickerState::Ready(options) => options,
            _ => &[],
        }
    }

    pub fn highlighted_id(&self) -> Option<i64> {
        self.options().get(self.highlight).map(|o| o.id)
    }

    /// Move the highlight up. Returns false at the top edge (or with no
    /// options at all) so the caller can move form focus instead.
    pub fn move_up(&mut self) -> bool {
        if self.highlight == 0 || self.options().is_empty() {
            return false;
        }
        self.highlight -= 1;
        true
    }

    /// Move the highlight down. Returns false at the bottom edge.
    pub fn move_down(&mut self) -> bool {
        let len = self.options().len();
        if len == 0 || self.highlight + 1 >= len {
            return false;
        }
        self.highlight += 1;
        true
    }

    /// Rows this picker wants on screen, borders included.
    pub fn desired_height(&self) -> u16 {
        let rows = match &self.state {
            PickerState::Ready(options) => options.len().max(1),
            _ => 1,
        };
        rows.min(6) as u16 + 2
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, selected: &[i64], focused: bool) {
        let border = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title(format!("{} (Selected: {})", self.spec.label, selected.len()))
            .borders(Borders::ALL)
            .border_style(border);

        match &self.state {
            PickerState::Loading => {
                let line = Line::styled("Loading...", Styles::inactive());
                f.render_widget(Paragraph::new(line).block(block), area);
            }
            PickerState::Failed(message) => {
                let line = Line::styled(message.clone(), Styles::error());
                f.render_widget(Paragraph::new(line).block(block), area);
            }
            PickerState::Ready(options) if options.is_empty() => {
                let text = format!("No {} available.", self.spec.label.to_lowercase());
                let line = Line::styled(text, Styles::inactive());
                f.render_widget(Paragraph::new(line).block(block), area);
            }
            PickerState::Ready(options) => {
                let items: Vec<ListItem> = options
                    .iter()
                    .map(|option| {
                        let mark = if selected.contains(&option.id) { 'x' } else { ' ' };
                        ListItem::new(format!("[{}] {}", mark, option.label))
                    })
                    .collect();
                let highlight = if focused {
                    Styles::selected()
                } else {
                    Styles::inactive()
                };
                let list = List::new(items).block(block).highlight_style(highlight);
                self.list.select(Some(self.highlight));
                f.render_stateful_widget(list, area, &mut self.list);
            }
        }
    }
}
