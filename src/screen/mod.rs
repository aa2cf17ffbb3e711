//! Headless per-resource screen state.
//!
//! [`ResourceScreen`] owns everything one resource screen knows: the
//! draft form, the fetched records, the page cursor, the delete
//! confirmation state and the transient status line. It has no opinion
//! about rendering or transport; the terminal panes feed keys into it
//! and the async tasks feed completions back through the `apply_*`
//! methods.

pub mod pager;

use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::ApiError;
use crate::resources::{DraftPolicy, DraftState, FieldRole, Flag, Resource, ViewPayload};

use pager::Pager;

/// How long a status line stays up before it clears itself.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Composing a new record or idly browsing.
    Idle,
    /// Draft holds an existing record selected from the table.
    Editing,
    /// A delete is waiting for confirmation.
    ConfirmingDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
    set_at: Instant,
}

pub struct ResourceScreen<R: Resource> {
    draft: DraftState,
    records: Vec<R>,
    pager: Pager,
    mode: Mode,
    /// Mode to restore when a delete confirmation is dismissed.
    resume: Mode,
    delete_target: Option<R>,
    status: Option<StatusLine>,
    /// Generation of the most recently issued fetch. Completions that
    /// carry an older generation lost the race and are dropped.
    issued_fetch: u64,
}

impl<R: Resource> Default for ResourceScreen<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceScreen<R> {
    pub fn new() -> Self {
        Self {
            draft: DraftState::for_resource::<R>(),
            records: Vec::new(),
            pager: Pager::new(R::PAGE_SIZE),
            mode: Mode::Idle,
            resume: Mode::Idle,
            delete_target: None,
            status: None,
            issued_fetch: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Records on the current page.
    pub fn visible(&self) -> &[R] {
        self.pager.slice(&self.records)
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.records.len());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }

    /// Mutable access to a draft field. Returns `None` while the field
    /// is locked, which is the id field whenever an existing record is
    /// being edited.
    pub fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        let locked = self.mode == Mode::Editing
            && self
                .draft
                .spec(index)
                .map(|s| s.role == FieldRole::Id)
                .unwrap_or(false);
        if locked {
            None
        } else {
            self.draft.value_mut(index)
        }
    }

    pub fn toggle_selection(&mut self, picker: usize, id: i64) {
        self.draft.toggle(picker, id);
    }

    /// Reset the draft and drop back to idle. Records, cursor and the
    /// status line are untouched.
    pub fn clear(&mut self) {
        self.draft.reset();
        self.delete_target = None;
        self.mode = Mode::Idle;
    }

    /// Copy a record (by absolute index) into the draft for editing.
    pub fn select_for_edit(&mut self, index: usize) -> bool {
        match self.records.get(index).cloned() {
            Some(record) => {
                record.populate_draft(&mut self.draft);
                self.mode = Mode::Editing;
                true
            }
            None => false,
        }
    }

    /// Mark a record (by absolute index) for deletion and open the
    /// confirmation dialog.
    pub fn request_delete(&mut self, index: usize) -> bool {
        match self.records.get(index).cloned() {
            Some(record) => {
                self.delete_target = Some(record);
                self.resume = match self.mode {
                    Mode::ConfirmingDelete => Mode::Idle,
                    other => other,
                };
                self.mode = Mode::ConfirmingDelete;
                true
            }
            None => false,
        }
    }

    pub fn delete_target(&self) -> Option<&R> {
        self.delete_target.as_ref()
    }

    /// Dismiss the confirmation dialog; nothing else changes.
    pub fn cancel_delete(&mut self) {
        if self.mode == Mode::ConfirmingDelete {
            self.delete_target = None;
            self.mode = self.resume;
        }
    }

    /// Body for the confirmed delete. The target stays marked until
    /// [`Self::apply_delete`] reports success, so a failed delete keeps
    /// the dialog open.
    pub fn begin_confirmed_delete(&self) -> Option<R::Request> {
        self.delete_target.as_ref().map(|t| t.delete_request())
    }

    /// Build the body for an insert or update from the current draft.
    /// Validation problems land on the status line and nothing is sent.
    pub fn begin_write(&mut self, flag: Flag) -> Option<R::Request> {
        if flag == Flag::Insert && self.mode == Mode::Editing {
            self.set_status(
                Tone::Error,
                "Editing an existing record. Update it or clear the form first.",
            );
            return None;
        }
        match R::build_request(flag, &self.draft) {
            Ok(request) => Some(request),
            Err(err) => {
                self.fail(flag, &err);
                None
            }
        }
    }

    /// Build a view request and stamp it with a fresh generation.
    /// `use_draft_filters` distinguishes the operator pressing View
    /// (draft values become filters) from the implicit view-all that
    /// follows a successful write.
    pub fn begin_fetch(&mut self, use_draft_filters: bool) -> Option<(u64, R::Request)> {
        let filters = if use_draft_filters {
            self.draft.clone()
        } else {
            DraftState::unset_for::<R>()
        };
        match R::build_request(Flag::View, &filters) {
            Ok(request) => {
                self.issued_fetch += 1;
                Some((self.issued_fetch, request))
            }
            Err(err) => {
                self.fail(Flag::View, &err);
                None
            }
        }
    }

    /// Apply a completed insert or update. Returns true when the caller
    /// should chain the implicit view-all re-fetch.
    pub fn apply_write(&mut self, flag: Flag, outcome: Result<Option<String>, ApiError>) -> bool {
        match outcome {
            Ok(message) => {
                let text = message.unwrap_or_else(|| flag.done_message().to_string());
                self.set_status(Tone::Success, text);
                self.draft.reset();
                self.mode = Mode::Idle;
                true
            }
            Err(err) => {
                self.fail(flag, &err);
                if R::DRAFT_POLICY == DraftPolicy::Clear {
                    self.draft.reset();
                    self.mode = Mode::Idle;
                }
                false
            }
        }
    }

    /// Apply a completed fetch. Stale generations are dropped so only
    /// the most recently issued fetch can replace the records. Returns
    /// true when the records changed.
    pub fn apply_fetch(
        &mut self,
        generation: u64,
        outcome: Result<ViewPayload<R>, ApiError>,
    ) -> bool {
        if generation != self.issued_fetch {
            debug!(
                resource = R::KIND.as_str(),
                generation,
                current = self.issued_fetch,
                "dropping stale fetch result"
            );
            return false;
        }
        match outcome {
            Ok(payload) => {
                self.records = payload.records;
                self.pager.reset();
                let text = payload
                    .message
                    .unwrap_or_else(|| Flag::View.done_message().to_string());
                self.set_status(Tone::Success, text);
                true
            }
            Err(err) => {
                // keep whatever was on screen
                self.fail(Flag::View, &err);
                false
            }
        }
    }

    /// Apply a completed delete. Success closes the dialog and resets
    /// the draft; failure leaves the dialog up with an error status.
    /// Returns true when the caller should chain the view-all re-fetch.
    pub fn apply_delete(&mut self, outcome: Result<Option<String>, ApiError>) -> bool {
        match outcome {
            Ok(message) => {
                let text = message.unwrap_or_else(|| Flag::Delete.done_message().to_string());
                self.set_status(Tone::Success, text);
                self.delete_target = None;
                self.draft.reset();
                self.mode = Mode::Idle;
                true
            }
            Err(err) => {
                self.fail(Flag::Delete, &err);
                false
            }
        }
    }

    fn fail(&mut self, flag: Flag, err: &ApiError) {
        // validation text stands on its own; everything else gets the
        // operation prefix
        let text = if err.is_local() {
            err.to_string()
        } else {
            format!("{} failed: {}", flag.verb(), err)
        };
        self.set_status(Tone::Error, text);
    }

    pub fn set_status(&mut self, tone: Tone, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            tone,
            set_at: Instant::now(),
        });
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Expire the status line once it has been up for [`STATUS_TTL`].
    /// Setting a new status restarts the clock.
    pub fn tick(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now.duration_since(status.set_at) >= STATUS_TTL {
                self.status = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Publisher, Status, Vendor};
    use crate::resources::vendor::CATEGORY_PICKER;

    fn categories(n: usize) -> ViewPayload<Category> {
        ViewPayload {
            message: None,
            records: (0..n)
                .map(|i| Category {
                    id: Some(i as i64 + 1),
                    name: format!("Category {}", i + 1),
                    status: Status::Active,
                })
                .collect(),
        }
    }

    fn fetch_all(screen: &mut ResourceScreen<Category>, payload: ViewPayload<Category>) {
        let (generation, _body) = screen.begin_fetch(false).unwrap();
        assert!(screen.apply_fetch(generation, Ok(payload)));
    }

    #[test]
    fn fetch_replaces_records_and_resets_the_cursor() {
        let mut screen = ResourceScreen::<Category>::new();
        fetch_all(&mut screen, categories(12));
        assert_eq!(screen.records().len(), 12);
        assert_eq!(screen.visible().len(), 5);
        assert_eq!(screen.pager().label(12), "Page 1 of 3");

        screen.next_page();
        screen.next_page();
        assert_eq!(screen.visible().len(), 2);

        // fetching the same data again is idempotent apart from the cursor
        let before = screen.records().to_vec();
        fetch_all(&mut screen, categories(12));
        assert_eq!(screen.records(), before.as_slice());
        assert_eq!(screen.pager().page(), 1);
    }

    #[test]
    fn stale_fetch_results_are_dropped() {
        let mut screen = ResourceScreen::<Category>::new();
        let (first, _) = screen.begin_fetch(false).unwrap();
        let (second, _) = screen.begin_fetch(false).unwrap();
        assert!(first < second);

        // first fetch limps home after the second was issued
        assert!(!screen.apply_fetch(first, Ok(categories(3))));
        assert!(screen.records().is_empty());

        assert!(screen.apply_fetch(second, Ok(categories(7))));
        assert_eq!(screen.records().len(), 7);

        // and a duplicate of the old one changes nothing
        assert!(!screen.apply_fetch(first, Ok(categories(3))));
        assert_eq!(screen.records().len(), 7);
    }

    #[test]
    fn fetch_failure_keeps_the_current_records() {
        let mut screen = ResourceScreen::<Category>::new();
        fetch_all(&mut screen, categories(4));

        let (generation, _) = screen.begin_fetch(false).unwrap();
        let err = ApiError::Backend {
            status: 500,
            message: "boom".into(),
        };
        assert!(!screen.apply_fetch(generation, Err(err)));
        assert_eq!(screen.records().len(), 4);
        let status = screen.status().unwrap();
        assert_eq!(status.tone, Tone::Error);
        assert_eq!(status.text, "View failed: boom");
    }

    #[test]
    fn update_without_an_id_never_leaves_the_screen() {
        let mut screen = ResourceScreen::<Category>::new();
        assert!(screen.begin_write(Flag::Update).is_none());
        let status = screen.status().unwrap();
        assert_eq!(status.tone, Tone::Error);
        assert_eq!(status.text, "CategoryID required for update.");
    }

    #[test]
    fn successful_write_resets_the_draft_and_chains_a_refetch() {
        let mut screen = ResourceScreen::<Category>::new();
        if let Some(name) = screen.field_mut(1) {
            name.push_str("Reference");
        }
        assert!(screen.begin_write(Flag::Insert).is_some());
        assert!(screen.apply_write(Flag::Insert, Ok(Some("Saved.".into()))));
        assert_eq!(screen.status().unwrap().text, "Saved.");
        assert_eq!(screen.status().unwrap().tone, Tone::Success);
        assert_eq!(screen.draft().get("name"), "");
        assert_eq!(screen.mode(), Mode::Idle);
    }

    #[test]
    fn write_success_without_a_message_uses_the_fallback() {
        let mut screen = ResourceScreen::<Category>::new();
        assert!(screen.apply_write(Flag::Insert, Ok(None)));
        assert_eq!(screen.status().unwrap().text, "Inserted.");
    }

    #[test]
    fn failed_write_preserves_the_draft_when_the_policy_says_so() {
        let mut screen = ResourceScreen::<Category>::new();
        if let Some(name) = screen.field_mut(1) {
            name.push_str("Reference");
        }
        let err = ApiError::Backend {
            status: 500,
            message: "duplicate name".into(),
        };
        assert!(!screen.apply_write(Flag::Insert, Err(err)));
        assert_eq!(screen.status().unwrap().text, "Insert failed: duplicate name");
        // preserve policy keeps the operator's typing
        assert_eq!(screen.draft().get("name"), "Reference");
    }

    #[test]
    fn failed_write_clears_the_draft_when_the_policy_says_so() {
        let mut screen = ResourceScreen::<Publisher>::new();
        if let Some(name) = screen.field_mut(1) {
            name.push_str("Orbit");
        }
        let err = ApiError::Backend {
            status: 500,
            message: "boom".into(),
        };
        assert!(!screen.apply_write(Flag::Insert, Err(err)));
        assert_eq!(screen.draft().get("name"), "");
        assert_eq!(screen.mode(), Mode::Idle);
    }

    #[test]
    fn editing_locks_the_id_field_and_gates_insert() {
        let mut screen = ResourceScreen::<Category>::new();
        fetch_all(&mut screen, categories(3));
        assert!(screen.select_for_edit(2));
        assert_eq!(screen.mode(), Mode::Editing);
        assert_eq!(screen.draft().get("id"), "3");
        assert_eq!(screen.draft().get("name"), "Category 3");

        // id is read-only while editing, the rest stays writable
        assert!(screen.field_mut(0).is_none());
        assert!(screen.field_mut(1).is_some());

        assert!(screen.begin_write(Flag::Insert).is_none());
        assert_eq!(screen.status().unwrap().tone, Tone::Error);

        screen.clear();
        assert_eq!(screen.mode(), Mode::Idle);
        assert_eq!(screen.draft().get("id"), "");
        assert!(screen.field_mut(0).is_some());
    }

    #[test]
    fn delete_needs_a_mark_and_a_confirmation() {
        let mut screen = ResourceScreen::<Category>::new();
        // nothing marked, nothing to send
        assert!(screen.begin_confirmed_delete().is_none());
        assert!(!screen.request_delete(0));

        fetch_all(&mut screen, categories(2));
        assert!(screen.request_delete(1));
        assert_eq!(screen.mode(), Mode::ConfirmingDelete);
        assert_eq!(screen.delete_target().unwrap().id, Some(2));

        // cancel restores the previous mode and touches nothing else
        screen.cancel_delete();
        assert_eq!(screen.mode(), Mode::Idle);
        assert!(screen.delete_target().is_none());
        assert_eq!(screen.records().len(), 2);

        assert!(screen.request_delete(0));
        assert!(screen.begin_confirmed_delete().is_some());
        assert!(screen.apply_delete(Ok(None)));
        assert_eq!(screen.status().unwrap().text, "Deleted.");
        assert_eq!(screen.mode(), Mode::Idle);
        assert!(screen.delete_target().is_none());
    }

    #[test]
    fn failed_delete_keeps_the_dialog_open() {
        let mut screen = ResourceScreen::<Category>::new();
        fetch_all(&mut screen, categories(1));
        assert!(screen.request_delete(0));
        let err = ApiError::Backend {
            status: 409,
            message: "in use".into(),
        };
        assert!(!screen.apply_delete(Err(err)));
        assert_eq!(screen.mode(), Mode::ConfirmingDelete);
        assert!(screen.delete_target().is_some());
        assert_eq!(screen.status().unwrap().text, "Delete failed: in use");
    }

    #[test]
    fn status_expires_and_new_messages_restart_the_clock() {
        let mut screen = ResourceScreen::<Category>::new();
        let start = Instant::now();
        screen.set_status(Tone::Info, "first");
        screen.tick(start + Duration::from_secs(2));
        assert!(screen.status().is_some());

        // a replacement two seconds in lives three more seconds
        screen.set_status(Tone::Info, "second");
        screen.tick(start + Duration::from_secs(4));
        assert_eq!(screen.status().unwrap().text, "second");

        screen.tick(start + Duration::from_secs(60));
        assert!(screen.status().is_none());
    }

    #[test]
    fn vendor_selection_toggle_is_symmetric() {
        let mut screen = ResourceScreen::<Vendor>::new();
        let before = screen.draft().clone();
        screen.toggle_selection(CATEGORY_PICKER, 2);
        assert!(screen.draft().is_selected(CATEGORY_PICKER, 2));
        screen.toggle_selection(CATEGORY_PICKER, 2);
        assert_eq!(screen.draft(), &before);
    }

    #[test]
    fn insert_then_view_lands_the_new_row_on_page_one() {
        let mut screen = ResourceScreen::<Category>::new();
        if let Some(name) = screen.field_mut(1) {
            name.push_str("Reference");
        }
        let body = screen.begin_write(Flag::Insert).unwrap();
        assert_eq!(
            serde_json::to_value(body).unwrap()["flag"],
            serde_json::json!("INSERT")
        );
        assert!(screen.apply_write(Flag::Insert, Ok(None)));

        // the chained view-all carries no filters from the old draft
        let (generation, view_body) = screen.begin_fetch(false).unwrap();
        let view_json = serde_json::to_value(view_body).unwrap();
        assert_eq!(view_json["categoryName"], serde_json::json!(null));
        assert_eq!(view_json["status"], serde_json::json!(null));

        let payload = ViewPayload {
            message: Some("Fetched.".into()),
            records: vec![Category {
                id: Some(101),
                name: "Reference".into(),
                status: Status::Active,
            }],
        };
        assert!(screen.apply_fetch(generation, Ok(payload)));
        assert_eq!(screen.visible().len(), 1);
        assert_eq!(screen.visible()[0].id, Some(101));
        assert_eq!(screen.pager().label(screen.records().len()), "Page 1 of 1");
    }
}
