//! Generic terminal pane over one resource screen.
//!
//! One implementation drives all six resources: the field list, table
//! columns and pickers come from the [`Resource`] constants. The pane
//! owns only widget state (focus, cursors, highlighted row); everything
//! that matters lives in the wrapped [`ResourceScreen`]. Keys that need
//! the network come back to the caller as a [`PaneCommand`].

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::resources::{FieldKind, FieldRole, Flag, Resource, ViewPayload};
use crate::screen::{Mode, ResourceScreen};

use super::picker::OptionPicker;
use super::ui::{self, InputField, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Table,
}

/// Effectful keys bubble up to the app loop, which owns the client and
/// the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneCommand {
    None,
    ToMenu,
    Quit,
    /// Run a view; `filtered` carries the draft values as filters.
    View { filtered: bool },
    Insert,
    Update,
    ConfirmDelete,
}

pub struct ResourcePane<R: Resource> {
    screen: ResourceScreen<R>,
    focus: Focus,
    /// Focused slot in the form ring: fields first, then pickers.
    slot: usize,
    /// Char-index cursor per field.
    cursors: Vec<usize>,
    pickers: Vec<OptionPicker>,
    /// Highlighted row, relative to the visible page.
    row: usize,
    table: ListState,
}

impl<R: Resource> Default for ResourcePane<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourcePane<R> {
    pub fn new() -> Self {
        Self {
            screen: ResourceScreen::new(),
            focus: Focus::Form,
            slot: 0,
            cursors: vec![0; R::FIELDS.len()],
            pickers: R::PICKERS.iter().map(OptionPicker::new).collect(),
            row: 0,
            table: ListState::default(),
        }
    }

    pub fn screen(&self) -> &ResourceScreen<R> {
        &self.screen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn pickers_mut(&mut self) -> &mut [OptionPicker] {
        &mut self.pickers
    }

    pub fn tick(&mut self, now: Instant) {
        self.screen.tick(now);
    }

    // Operation plumbing. The begin half hands the app loop a body to
    // send; the apply half feeds the completion back and keeps widget
    // state consistent with the new screen state.

    pub fn begin_fetch(&mut self, filtered: bool) -> Option<(u64, R::Request)> {
        self.screen.begin_fetch(filtered)
    }

    pub fn begin_write(&mut self, flag: Flag) -> Option<R::Request> {
        self.screen.begin_write(flag)
    }

    pub fn begin_confirmed_delete(&self) -> Option<R::Request> {
        self.screen.begin_confirmed_delete()
    }

    pub fn apply_fetch(&mut self, generation: u64, outcome: Result<ViewPayload<R>, ApiError>) {
        if self.screen.apply_fetch(generation, outcome) {
            self.row = 0;
        }
    }

    pub fn apply_write(&mut self, flag: Flag, outcome: Result<Option<String>, ApiError>) -> bool {
        let chain = self.screen.apply_write(flag, outcome);
        self.sync_cursors();
        chain
    }

    pub fn apply_delete(&mut self, outcome: Result<Option<String>, ApiError>) -> bool {
        let chain = self.screen.apply_delete(outcome);
        self.sync_cursors();
        chain
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PaneCommand {
        if self.screen.mode() == Mode::ConfirmingDelete {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    PaneCommand::ConfirmDelete
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.screen.cancel_delete();
                    PaneCommand::None
                }
                _ => PaneCommand::None,
            };
        }

        match key.code {
            KeyCode::F(2) => return PaneCommand::Insert,
            KeyCode::F(3) => return PaneCommand::Update,
            KeyCode::F(4) => {
                self.clear_form();
                return PaneCommand::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Form => self.form_key(key),
            Focus::Table => self.table_key(key),
        }
    }

    fn form_key(&mut self, key: KeyEvent) -> PaneCommand {
        match key.code {
            KeyCode::Enter => return PaneCommand::View { filtered: true },
            KeyCode::Esc => {
                self.focus = Focus::Table;
                return PaneCommand::None;
            }
            KeyCode::Tab => {
                self.next_slot();
                return PaneCommand::None;
            }
            KeyCode::BackTab => {
                self.prev_slot();
                return PaneCommand::None;
            }
            _ => {}
        }

        if let Some(p) = self.slot.checked_sub(R::FIELDS.len()) {
            match key.code {
                KeyCode::Up => {
                    if !self.pickers[p].move_up() {
                        self.prev_slot();
                    }
                }
                KeyCode::Down => {
                    if !self.pickers[p].move_down() {
                        self.next_slot();
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(id) = self.pickers[p].highlighted_id() {
                        self.screen.toggle_selection(p, id);
                    }
                }
                _ => {}
            }
            return PaneCommand::None;
        }

        let idx = self.slot;
        let kind = self.screen.draft().spec(idx).map(|s| s.kind);
        if let Some(FieldKind::Choice(choices)) = kind {
            match key.code {
                KeyCode::Up => self.prev_slot(),
                KeyCode::Down => self.next_slot(),
                KeyCode::Char(' ') | KeyCode::Right => self.cycle_choice(idx, choices, 1),
                KeyCode::Left => self.cycle_choice(idx, choices, -1),
                _ => {}
            }
            return PaneCommand::None;
        }

        match key.code {
            KeyCode::Up => self.prev_slot(),
            KeyCode::Down => self.next_slot(),
            KeyCode::Left => {
                self.cursors[idx] = self.cursors[idx].saturating_sub(1);
            }
            KeyCode::Right => {
                let len = self.screen.draft().value(idx).chars().count();
                self.cursors[idx] = (self.cursors[idx] + 1).min(len);
            }
            KeyCode::Home => self.cursors[idx] = 0,
            KeyCode::End => {
                self.cursors[idx] = self.screen.draft().value(idx).chars().count();
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.screen.field_mut(idx) {
                    let cursor = self.cursors[idx].min(value.chars().count());
                    self.cursors[idx] = ui::insert_char(value, cursor, c);
                }
            }
            KeyCode::Backspace => {
                if let Some(value) = self.screen.field_mut(idx) {
                    let cursor = self.cursors[idx].min(value.chars().count());
                    self.cursors[idx] = ui::remove_char_before(value, cursor);
                }
            }
            KeyCode::Delete => {
                if let Some(value) = self.screen.field_mut(idx) {
                    let cursor = self.cursors[idx].min(value.chars().count());
                    ui::remove_char_at(value, cursor);
                }
            }
            _ => {}
        }
        PaneCommand::None
    }

    fn table_key(&mut self, key: KeyEvent) -> PaneCommand {
        match key.code {
            KeyCode::Char('q') => PaneCommand::Quit,
            KeyCode::Esc => PaneCommand::ToMenu,
            KeyCode::Char('r') => PaneCommand::View { filtered: false },
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = Focus::Form;
                PaneCommand::None
            }
            KeyCode::Up => {
                self.row = self.row.saturating_sub(1);
                PaneCommand::None
            }
            KeyCode::Down => {
                let visible = self.screen.visible().len();
                if visible > 0 && self.row + 1 < visible {
                    self.row += 1;
                }
                PaneCommand::None
            }
            KeyCode::PageUp => {
                self.screen.prev_page();
                self.row = 0;
                PaneCommand::None
            }
            KeyCode::PageDown => {
                self.screen.next_page();
                self.row = 0;
                PaneCommand::None
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                let absolute = self.screen.pager().absolute(self.row);
                if self.screen.select_for_edit(absolute) {
                    self.sync_cursors();
                    self.focus = Focus::Form;
                    self.slot = self.first_open_slot();
                }
                PaneCommand::None
            }
            KeyCode::Char('d') => {
                let absolute = self.screen.pager().absolute(self.row);
                self.screen.request_delete(absolute);
                PaneCommand::None
            }
            _ => PaneCommand::None,
        }
    }

    fn clear_form(&mut self) {
        self.screen.clear();
        self.sync_cursors();
        self.slot = 0;
    }

    fn slot_count(&self) -> usize {
        R::FIELDS.len() + self.pickers.len()
    }

    /// The id field is read-only while an existing record is loaded, so
    /// the focus ring skips it.
    fn slot_locked(&self, slot: usize) -> bool {
        self.screen.mode() == Mode::Editing
            && R::FIELDS.get(slot).map(|s| s.role) == Some(FieldRole::Id)
    }

    fn next_slot(&mut self) {
        let total = self.slot_count();
        for _ in 0..total {
            self.slot = (self.slot + 1) % total;
            if !self.slot_locked(self.slot) {
                break;
            }
        }
    }

    fn prev_slot(&mut self) {
        let total = self.slot_count();
        for _ in 0..total {
            self.slot = (self.slot + total - 1) % total;
            if !self.slot_locked(self.slot) {
                break;
            }
        }
    }

    fn first_open_slot(&self) -> usize {
        (0..self.slot_count())
            .find(|&s| !self.slot_locked(s))
            .unwrap_or(0)
    }

    fn cycle_choice(&mut self, idx: usize, choices: &'static [&'static str], step: i32) {
        if choices.is_empty() {
            return;
        }
        if let Some(value) = self.screen.field_mut(idx) {
            let next = match choices.iter().position(|&c| c == value.as_str()) {
                Some(i) if step > 0 => (i + 1) % choices.len(),
                Some(i) => (i + choices.len() - 1) % choices.len(),
                None => 0,
            };
            *value = choices[next].to_string();
        }
    }

    fn sync_cursors(&mut self) {
        for idx in 0..R::FIELDS.len() {
            self.cursors[idx] = self.screen.draft().value(idx).chars().count();
        }
    }

    /// Draw the pane
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Form and table
                Constraint::Length(3), // Status and pagination
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(38), Constraint::Min(0)])
            .split(chunks[0]);

        self.draw_form(f, body[0]);
        self.draw_table(f, body[1]);
        self.draw_bottom_info(f, chunks[1]);

        if self.screen.mode() == Mode::ConfirmingDelete {
            self.draw_confirm(f, area);
        }
    }

    fn draw_form(&mut self, f: &mut Frame, area: Rect) {
        let mut constraints: Vec<Constraint> =
            R::FIELDS.iter().map(|_| Constraint::Length(3)).collect();
        for picker in &self.pickers {
            constraints.push(Constraint::Length(picker.desired_height()));
        }
        constraints.push(Constraint::Min(0));

        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, spec) in R::FIELDS.iter().enumerate() {
            let locked = self.slot_locked(idx);
            let value = self.screen.draft().value(idx);
            let label = match spec.kind {
                FieldKind::Choice(_) => format!("{} (Space to change)", spec.label),
                _ => spec.label.to_string(),
            };
            let placeholder = if spec.role == FieldRole::Id { "(auto)" } else { "" };
            InputField {
                label: &label,
                value,
                placeholder,
                focused: self.focus == Focus::Form && self.slot == idx,
                locked,
                cursor: self.cursors[idx].min(value.chars().count()),
            }
            .render(f, slots[idx]);
        }

        for (p, picker) in self.pickers.iter_mut().enumerate() {
            let focused =
                self.focus == Focus::Form && self.slot == R::FIELDS.len() + p;
            let selected = self.screen.draft().selection(p);
            picker.render(f, slots[R::FIELDS.len() + p], selected, focused);
        }
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        let border = if self.focus == Focus::Table {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title(format!("{} Records", R::KIND.title()))
            .borders(Borders::ALL)
            .border_style(border);

        if self.screen.records().is_empty() {
            let empty = Paragraph::new("No data found")
                .style(Styles::inactive())
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let header = ListItem::new(Line::from(Span::styled(
            R::COLUMNS
                .iter()
                .map(|c| ui::fit_cell(c.title, c.width))
                .collect::<Vec<_>>()
                .join(" │ "),
            Styles::title(),
        )));

        let table_focused = self.focus == Focus::Table;
        let highlighted = self.row;
        let items: Vec<ListItem> = std::iter::once(header)
            .chain(self.screen.visible().iter().enumerate().map(|(i, record)| {
                let style = if table_focused && i == highlighted {
                    Styles::selected()
                } else {
                    Style::default()
                };
                let content = record
                    .cells()
                    .iter()
                    .zip(R::COLUMNS)
                    .map(|(cell, col)| ui::fit_cell(cell, col.width))
                    .collect::<Vec<_>>()
                    .join(" │ ");
                ListItem::new(Line::from(Span::styled(content, style)))
            }))
            .collect();

        // header occupies list index 0, rows follow
        self.table.select(Some(self.row + 1));
        let list = List::new(items).block(block);
        f.render_stateful_widget(list, area, &mut self.table);
    }

    fn draw_bottom_info(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let (text, style) = match self.screen.status() {
            Some(status) => (status.text.clone(), Styles::tone(status.tone)),
            None => (
                match self.focus {
                    Focus::Form => {
                        "Enter: View | F2: Insert | F3: Update | F4: Clear | Esc: Table"
                            .to_string()
                    }
                    Focus::Table => {
                        "Enter/e: Edit | d: Delete | r: Refresh | Esc: Menu | q: Quit"
                            .to_string()
                    }
                },
                Styles::info(),
            ),
        };
        let status = Paragraph::new(text).style(style).block(
            Block::default()
                .title("Status")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(status, chunks[0]);

        let total = self.screen.records().len();
        let pagination = Paragraph::new(format!("◀ {} ▶", self.screen.pager().label(total)))
            .style(Styles::info())
            .block(
                Block::default()
                    .title("PageUp/PageDown")
                    .borders(Borders::ALL)
                    .border_style(Styles::inactive_border()),
            );
        f.render_widget(pagination, chunks[1]);
    }

    fn draw_confirm(&self, f: &mut Frame, area: Rect) {
        let popup_area = ui::centered_rect(50, 50, area);

        let mut lines = vec![
            Line::from(format!("Delete this {} record?", R::KIND.title())),
            Line::from(""),
        ];
        if let Some(target) = self.screen.delete_target() {
            for (col, cell) in R::COLUMNS.iter().zip(target.cells()) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", col.title), Styles::title()),
                    Span::raw(cell),
                ]));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "Enter/y: Confirm | Esc/n: Cancel",
            Styles::info(),
        ));

        let dialog = Paragraph::new(lines).block(
            Block::default()
                .title("Confirm Delete")
                .borders(Borders::ALL)
                .border_style(Styles::error()),
        );

        f.render_widget(Clear, popup_area);
        f.render_widget(dialog, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Status, Vendor};
    use crate::resources::vendor::CATEGORY_PICKER;
    use crate::resources::RefOption;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn type_text<R: Resource>(pane: &mut ResourcePane<R>, text: &str) {
        for c in text.chars() {
            pane.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn seeded_pane(n: usize) -> ResourcePane<Category> {
        let mut pane = ResourcePane::<Category>::new();
        let (generation, _) = pane.begin_fetch(false).unwrap();
        pane.apply_fetch(
            generation,
            Ok(ViewPayload {
                message: None,
                records: (0..n)
                    .map(|i| Category {
                        id: Some(i as i64 + 1),
                        name: format!("Category {}", i + 1),
                        status: Status::Active,
                    })
                    .collect(),
            }),
        );
        pane
    }

    #[test]
    fn typing_lands_in_the_focused_field() {
        let mut pane = ResourcePane::<Category>::new();
        pane.handle_key(key(KeyCode::Tab));
        type_text(&mut pane, "Reference");
        assert_eq!(pane.screen().draft().get("name"), "Reference");

        pane.handle_key(key(KeyCode::Backspace));
        assert_eq!(pane.screen().draft().get("name"), "Referenc");

        // cursor editing in the middle of the value
        pane.handle_key(key(KeyCode::Home));
        pane.handle_key(key(KeyCode::Delete));
        assert_eq!(pane.screen().draft().get("name"), "eferenc");
    }

    #[test]
    fn enter_and_function_keys_become_commands() {
        let mut pane = ResourcePane::<Category>::new();
        assert_eq!(
            pane.handle_key(key(KeyCode::Enter)),
            PaneCommand::View { filtered: true }
        );
        assert_eq!(pane.handle_key(key(KeyCode::F(2))), PaneCommand::Insert);
        assert_eq!(pane.handle_key(key(KeyCode::F(3))), PaneCommand::Update);

        type_text(&mut pane, "junk");
        pane.handle_key(key(KeyCode::F(4)));
        assert_eq!(pane.screen().draft().get("id"), "");
    }

    #[test]
    fn choice_fields_cycle_instead_of_typing() {
        let mut pane = ResourcePane::<Category>::new();
        pane.handle_key(key(KeyCode::Tab));
        pane.handle_key(key(KeyCode::Tab)); // status
        assert_eq!(pane.screen().draft().get("status"), "Active");

        pane.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(pane.screen().draft().get("status"), "Inactive");
        pane.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(pane.screen().draft().get("status"), "Active");
        pane.handle_key(key(KeyCode::Left));
        assert_eq!(pane.screen().draft().get("status"), "Inactive");

        // plain typing does not touch a choice field
        pane.handle_key(key(KeyCode::Char('x')));
        assert_eq!(pane.screen().draft().get("status"), "Inactive");
    }

    #[test]
    fn esc_walks_form_to_table_to_menu() {
        let mut pane = ResourcePane::<Category>::new();
        assert_eq!(pane.focus(), Focus::Form);
        assert_eq!(pane.handle_key(key(KeyCode::Esc)), PaneCommand::None);
        assert_eq!(pane.focus(), Focus::Table);
        assert_eq!(pane.handle_key(key(KeyCode::Esc)), PaneCommand::ToMenu);
        assert_eq!(pane.handle_key(key(KeyCode::Char('q'))), PaneCommand::Quit);
    }

    #[test]
    fn table_selection_tracks_pages() {
        let mut pane = seeded_pane(12);
        pane.handle_key(key(KeyCode::Esc)); // to table

        pane.handle_key(key(KeyCode::Down));
        pane.handle_key(key(KeyCode::Down));
        pane.handle_key(key(KeyCode::PageDown));
        // page turns park the highlight on the first row
        assert_eq!(pane.screen().pager().page(), 2);

        // editing the first row of page two loads record 6
        pane.handle_key(key(KeyCode::Enter));
        assert_eq!(pane.screen().mode(), Mode::Editing);
        assert_eq!(pane.screen().draft().get("id"), "6");
        assert_eq!(pane.focus(), Focus::Form);
        // focus skips the locked id field
        assert_eq!(pane.slot, 1);
        pane.handle_key(key(KeyCode::BackTab));
        pane.handle_key(key(KeyCode::BackTab));
        assert_ne!(pane.slot, 0);
    }

    #[test]
    fn delete_flow_asks_before_committing() {
        let mut pane = seeded_pane(2);
        pane.handle_key(key(KeyCode::Esc));
        pane.handle_key(key(KeyCode::Down));
        pane.handle_key(key(KeyCode::Char('d')));
        assert_eq!(pane.screen().mode(), Mode::ConfirmingDelete);

        // anything but confirm/cancel is swallowed by the dialog
        assert_eq!(pane.handle_key(key(KeyCode::Char('q'))), PaneCommand::None);
        assert_eq!(pane.screen().mode(), Mode::ConfirmingDelete);

        assert_eq!(pane.handle_key(key(KeyCode::Char('n'))), PaneCommand::None);
        assert_eq!(pane.screen().mode(), Mode::Idle);

        pane.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            pane.handle_key(key(KeyCode::Char('y'))),
            PaneCommand::ConfirmDelete
        );
        assert_eq!(pane.screen().delete_target().unwrap().id, Some(2));
    }

    #[test]
    fn refresh_comes_from_the_table() {
        let mut pane = seeded_pane(1);
        pane.handle_key(key(KeyCode::Esc));
        assert_eq!(
            pane.handle_key(key(KeyCode::Char('r'))),
            PaneCommand::View { filtered: false }
        );
    }

    #[test]
    fn picker_slot_toggles_selections() {
        let mut pane = ResourcePane::<Vendor>::new();
        pane.pickers_mut()[CATEGORY_PICKER].apply(Ok(vec![
            RefOption {
                id: 4,
                label: "Fiction (Active)".into(),
            },
            RefOption {
                id: 9,
                label: "Reference (Active)".into(),
            },
        ]));

        // tab past the five fields onto the category picker
        for _ in 0..5 {
            pane.handle_key(key(KeyCode::Tab));
        }
        pane.handle_key(key(KeyCode::Char(' ')));
        assert!(pane.screen().draft().is_selected(CATEGORY_PICKER, 4));

        pane.handle_key(key(KeyCode::Down));
        pane.handle_key(key(KeyCode::Char(' ')));
        assert!(pane.screen().draft().is_selected(CATEGORY_PICKER, 9));

        pane.handle_key(key(KeyCode::Char(' ')));
        assert!(!pane.screen().draft().is_selected(CATEGORY_PICKER, 9));

        // moving past the bottom edge advances the ring
        pane.handle_key(key(KeyCode::Down));
        assert_eq!(pane.slot, 6);
    }

    #[test]
    fn editing_keeps_the_id_out_of_reach() {
        let mut pane = seeded_pane(1);
        pane.handle_key(key(KeyCode::Esc));
        pane.handle_key(key(KeyCode::Char('e')));
        assert_eq!(pane.screen().mode(), Mode::Editing);

        // typing at the id slot is ignored even if forced there
        pane.slot = 0;
        pane.handle_key(key(KeyCode::Char('7')));
        assert_eq!(pane.screen().draft().get("id"), "1");
    }
}
