//! Wire adapter for `api/Master/Author`.
//!
//! Birth dates cross the wire as ISO strings; responses may carry a
//! trailing time component (`1970-01-01T00:00:00`) which is dropped on
//! the way in. Rows come back under `authorResponseList`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{Author, ResourceKind};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, Resource, ViewPayload,
};

#[derive(Debug, Serialize)]
pub struct AuthorRequest {
    flag: Flag,
    #[serde(rename = "authorID")]
    author_id: Option<i64>,
    #[serde(rename = "authorName")]
    author_name: Option<String>,
    nationality: Option<String>,
    #[serde(rename = "birthDate")]
    birth_date: Option<NaiveDate>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorEnvelope {
    #[serde(rename = "MESSAGE", alias = "message", default)]
    message: Option<String>,
    #[serde(rename = "authorResponseList", default)]
    records: Vec<AuthorWire>,
}

#[derive(Debug, Deserialize)]
struct AuthorWire {
    #[serde(rename = "authorID", default)]
    id: Option<i64>,
    #[serde(rename = "authorName", default)]
    name: String,
    #[serde(default)]
    nationality: String,
    #[serde(rename = "birthDate", default)]
    birth_date: Option<String>,
    #[serde(default)]
    status: String,
}

/// Drop any time component and parse the date part. Anything that does
/// not look like a date becomes `None` rather than losing the row.
fn parse_wire_date(raw: Option<String>) -> Option<NaiveDate> {
    let raw = raw?;
    let date_part = raw.split('T').next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn draft_date(draft: &DraftState, flag: Flag) -> Result<Option<NaiveDate>, ApiError> {
    match draft.trimmed("birth_date") {
        None => Ok(None),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            // a bad filter is dropped, a bad write is refused
            Err(_) if flag == Flag::View => Ok(None),
            Err(_) => Err(ApiError::validation("Birth Date must be YYYY-MM-DD.")),
        },
    }
}

impl Resource for Author {
    type Request = AuthorRequest;

    const KIND: ResourceKind = ResourceKind::Author;
    const ENDPOINT: &'static str = "api/Master/Author";
    const PAGE_SIZE: usize = 5;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Clear;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Author ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("name", "Author Name", FieldKind::Text, FieldRole::Name),
        FieldSpec::new("nationality", "Nationality", FieldKind::Text, FieldRole::Data),
        FieldSpec::new(
            "birth_date",
            "Birth Date (YYYY-MM-DD)",
            FieldKind::Date,
            FieldRole::Data,
        ),
        FieldSpec::new("status", "Status", FieldKind::Text, FieldRole::Status),
    ];

    const COLUMNS: &'static [Column] = &[
        Column::new("ID", 6),
        Column::new("Author Name", 24),
        Column::new("Nationality", 14),
        Column::new("Birth Date", 12),
        Column::new("Status", 10),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.map(|i| i.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.nationality.clone(),
            self.birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.status.clone(),
        ]
    }

    fn populate_draft(&self, draft: &mut DraftState) {
        draft.set("id", self.id.map(|i| i.to_string()).unwrap_or_default());
        draft.set("name", self.name.clone());
        draft.set("nationality", self.nationality.clone());
        draft.set(
            "birth_date",
            self.birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );
        draft.set("status", self.status.clone());
    }

    fn build_request(flag: Flag, draft: &DraftState) -> Result<AuthorRequest, ApiError> {
        let author_id = request_id(draft, "id", "AuthorID", flag)?;
        let birth_date = draft_date(draft, flag)?;
        Ok(match flag {
            Flag::View => AuthorRequest {
                flag,
                author_id,
                author_name: draft.opt("name"),
                nationality: draft.opt("nationality"),
                birth_date,
                status: draft.opt("status"),
            },
            _ => AuthorRequest {
                flag,
                author_id,
                author_name: Some(draft.owned("name")),
                nationality: Some(draft.owned("nationality")),
                birth_date,
                status: Some(draft.owned("status")),
            },
        })
    }

    fn delete_request(&self) -> AuthorRequest {
        AuthorRequest {
            flag: Flag::Delete,
            author_id: self.id,
            author_name: if self.name.is_empty() {
                None
            } else {
                Some(self.name.clone())
            },
            nationality: None,
            birth_date: None,
            status: None,
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: AuthorEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .records
            .into_iter()
            .map(|w| Author {
                id: w.id,
                name: w.name,
                nationality: w.nationality,
                birth_date: parse_wire_date(w.birth_date),
                status: w.status,
            })
            .collect();
        Ok(ViewPayload {
            message: clean_message(envelope.message),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_serializes_the_date_as_iso() {
        let mut draft = DraftState::for_resource::<Author>();
        draft.set("name", "Ursula K. Le Guin");
        draft.set("nationality", "American");
        draft.set("birth_date", "1929-10-21");
        draft.set("status", "Deceased");
        let req = Author::build_request(Flag::Insert, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "flag": "INSERT",
                "authorID": null,
                "authorName": "Ursula K. Le Guin",
                "nationality": "American",
                "birthDate": "1929-10-21",
                "status": "Deceased"
            })
        );
    }

    #[test]
    fn bad_date_blocks_a_write_but_not_a_view() {
        let mut draft = DraftState::for_resource::<Author>();
        draft.set("birth_date", "yesterday");
        let err = Author::build_request(Flag::Insert, &draft).unwrap_err();
        assert!(err.is_local());
        assert_eq!(err.to_string(), "Birth Date must be YYYY-MM-DD.");

        let req = Author::build_request(Flag::View, &draft).unwrap();
        assert_eq!(serde_json::to_value(req).unwrap()["birthDate"], json!(null));
    }

    #[test]
    fn update_requires_the_id() {
        let draft = DraftState::for_resource::<Author>();
        let err = Author::build_request(Flag::Update, &draft).unwrap_err();
        assert_eq!(err.to_string(), "AuthorID required for update.");
    }

    #[test]
    fn response_dates_lose_their_time_component() {
        let body = json!({
            "MESSAGE": "Fetched",
            "authorResponseList": [
                { "authorID": 5, "authorName": "Ursula K. Le Guin",
                  "nationality": "American", "birthDate": "1929-10-21T00:00:00",
                  "status": "Deceased" },
                { "authorID": 6, "authorName": "Anonymous", "birthDate": "unknown" }
            ]
        });
        let payload = Author::parse_response(body).unwrap();
        assert_eq!(
            payload.records[0].birth_date,
            NaiveDate::from_ymd_opt(1929, 10, 21)
        );
        assert_eq!(payload.records[1].birth_date, None);
    }

    #[test]
    fn populate_round_trips_through_the_draft() {
        let author = Author {
            id: Some(5),
            name: "Ursula K. Le Guin".into(),
            nationality: "American".into(),
            birth_date: NaiveDate::from_ymd_opt(1929, 10, 21),
            status: "Deceased".into(),
        };
        let mut draft = DraftState::for_resource::<Author>();
        author.populate_draft(&mut draft);
        assert_eq!(draft.get("id"), "5");
        assert_eq!(draft.get("birth_date"), "1929-10-21");

        let req = Author::build_request(Flag::Update, &draft).unwrap();
        let body = serde_json::to_value(req).unwrap();
        assert_eq!(body["authorID"], json!(5));
        assert_eq!(body["birthDate"], json!("1929-10-21"));
    }
}
