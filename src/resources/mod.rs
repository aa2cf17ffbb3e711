//! Resource abstraction shared by all six master-data screens.
//!
//! Every resource speaks the same flag-discriminated POST protocol to a
//! single endpoint, but each one has its own field names, casing quirks
//! and response envelope. The [`Resource`] trait pins those differences
//! down per resource so the screen state machine, the HTTP client and
//! the terminal panes can stay generic.

pub mod acquisition;
pub mod author;
pub mod category;
pub mod location;
pub mod publisher;
pub mod vendor;

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiError;
use crate::models::ResourceKind;

/// Lifecycle values offered by the status selects.
pub const STATUS_CHOICES: &[&str] = &["Active", "Inactive"];

/// Operation discriminator carried in every request body. The backend
/// routes on this, not on the HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flag {
    Insert,
    Update,
    View,
    Delete,
}

impl Flag {
    pub fn verb(&self) -> &'static str {
        match self {
            Flag::Insert => "Insert",
            Flag::Update => "Update",
            Flag::View => "View",
            Flag::Delete => "Delete",
        }
    }

    /// Status-line text used when the backend reports success without
    /// a message of its own.
    pub fn done_message(&self) -> &'static str {
        match self {
            Flag::Insert => "Inserted.",
            Flag::Update => "Updated.",
            Flag::View => "Fetched.",
            Flag::Delete => "Deleted.",
        }
    }
}

/// What happens to the draft form when a write is rejected.
///
/// Screens that keep the draft let the operator fix the input and retry;
/// screens that clear it drop back to a pristine form either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPolicy {
    Preserve,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
    /// ISO `YYYY-MM-DD` input.
    Date,
    /// One of a fixed set of values, cycled rather than typed.
    Choice(&'static [&'static str]),
}

/// Semantic role of a field, used for identifier handling and for
/// mapping CLI filter options onto the right field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Id,
    Name,
    Status,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub role: FieldRole,
    pub default: &'static str,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        role: FieldRole,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            role,
            default: "",
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }
}

/// Column of the result table, with a display width in characters.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub width: usize,
}

impl Column {
    pub const fn new(title: &'static str, width: usize) -> Self {
        Self { title, width }
    }
}

/// A multi-select of reference records (e.g. the category list on the
/// vendor screen), fetched from another resource.
#[derive(Debug, Clone, Copy)]
pub struct PickerSpec {
    pub label: &'static str,
    pub source: ResourceKind,
}

/// One selectable entry in a picker: reference id plus display label.
#[derive(Debug, Clone, PartialEq)]
pub struct RefOption {
    pub id: i64,
    pub label: String,
}

/// Decoded response to any operation: optional human-readable message
/// plus zero or more records (writes usually return an empty list).
#[derive(Debug, Clone)]
pub struct ViewPayload<R> {
    pub message: Option<String>,
    pub records: Vec<R>,
}

pub trait Resource: Clone + Send + Sync + Sized + 'static {
    /// Wire shape of the request body for this resource.
    type Request: Serialize + Send + Sync + 'static;

    const KIND: ResourceKind;
    /// Path under the API base URL, e.g. `api/Master/Category`.
    const ENDPOINT: &'static str;
    const PAGE_SIZE: usize;
    const DRAFT_POLICY: DraftPolicy;
    const FIELDS: &'static [FieldSpec];
    const COLUMNS: &'static [Column];
    const PICKERS: &'static [PickerSpec] = &[];

    /// Persisted identifier, if the backend sent one.
    fn id(&self) -> Option<i64>;

    /// Table cells, aligned with [`Self::COLUMNS`].
    fn cells(&self) -> Vec<String>;

    /// Copy this record into the draft form for editing.
    fn populate_draft(&self, draft: &mut DraftState);

    /// Build the request body for an insert, update or view from the
    /// draft. Fails with [`ApiError::Validation`] before anything is
    /// sent when the draft cannot express the operation.
    fn build_request(flag: Flag, draft: &DraftState) -> Result<Self::Request, ApiError>;

    /// Build the delete body from the record being removed.
    fn delete_request(&self) -> Self::Request;

    /// Decode a response body into records plus message.
    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError>;

    /// How this record appears when offered as a picker option on some
    /// other screen. `None` means it cannot be referenced.
    fn option_entry(&self) -> Option<RefOption> {
        None
    }
}

/// Form values being edited, parallel to a resource's field specs, plus
/// one id set per picker.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    fields: &'static [FieldSpec],
    values: Vec<String>,
    selections: Vec<Vec<i64>>,
}

impl DraftState {
    /// Pristine draft with every field at its declared default.
    pub fn for_resource<R: Resource>() -> Self {
        Self {
            fields: R::FIELDS,
            values: R::FIELDS.iter().map(|f| f.default.to_string()).collect(),
            selections: vec![Vec::new(); R::PICKERS.len()],
        }
    }

    /// Draft with every field empty and nothing selected. Used as the
    /// filter set of a view-all fetch, where defaults must not leak in.
    pub fn unset_for<R: Resource>() -> Self {
        Self {
            fields: R::FIELDS,
            values: vec![String::new(); R::FIELDS.len()],
            selections: vec![Vec::new(); R::PICKERS.len()],
        }
    }

    /// Reset all values to their defaults and drop all selections.
    pub fn reset(&mut self) {
        for (value, spec) in self.values.iter_mut().zip(self.fields) {
            value.clear();
            value.push_str(spec.default);
        }
        for sel in &mut self.selections {
            sel.clear();
        }
    }

    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    pub fn picker_count(&self) -> usize {
        self.selections.len()
    }

    pub fn spec(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Raw value of a named field; empty string if the name is unknown.
    pub fn get(&self, name: &str) -> &str {
        self.index_of(name)
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// Trimmed value, `None` when blank. This is the filter semantic:
    /// blank fields stay out of a view request entirely.
    pub fn trimmed(&self, name: &str) -> Option<&str> {
        let v = self.get(name).trim();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    }

    /// Owned copy of the raw value. Writes send fields verbatim, empty
    /// strings included.
    pub fn owned(&self, name: &str) -> String {
        self.get(name).to_string()
    }

    /// Owned copy of the trimmed value, `None` when blank.
    pub fn opt(&self, name: &str) -> Option<String> {
        self.trimmed(name).map(str::to_string)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(i) = self.index_of(name) {
            self.values[i] = value.into();
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn value_mut(&mut self, index: usize) -> Option<&mut String> {
        self.values.get_mut(index)
    }

    pub fn selection(&self, picker: usize) -> &[i64] {
        self.selections.get(picker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_selection(&mut self, picker: usize, ids: Vec<i64>) {
        if let Some(sel) = self.selections.get_mut(picker) {
            *sel = ids;
        }
    }

    pub fn is_selected(&self, picker: usize, id: i64) -> bool {
        self.selection(picker).contains(&id)
    }

    /// Add the id if absent, remove it if present.
    pub fn toggle(&mut self, picker: usize, id: i64) {
        if let Some(sel) = self.selections.get_mut(picker) {
            if let Some(pos) = sel.iter().position(|&x| x == id) {
                sel.remove(pos);
            } else {
                sel.push(id);
            }
        }
    }
}

/// Identifier handling shared by the adapters.
///
/// Inserts never send an id. Views treat the id field as an optional
/// filter and quietly drop anything non-numeric. Updates require a
/// parseable id and fail locally otherwise.
pub(crate) fn request_id(
    draft: &DraftState,
    field: &str,
    display: &str,
    flag: Flag,
) -> Result<Option<i64>, ApiError> {
    match flag {
        Flag::Insert => Ok(None),
        Flag::View => Ok(draft.trimmed(field).and_then(|v| v.parse().ok())),
        Flag::Update | Flag::Delete => {
            let raw = draft
                .trimmed(field)
                .ok_or_else(|| ApiError::validation(format!("{display} required for update.")))?;
            raw.parse().map(Some).map_err(|_| {
                ApiError::validation(format!("{display} must be a number."))
            })
        }
    }
}

/// Normalize a backend message: trimmed, and `None` when blank.
pub(crate) fn clean_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
