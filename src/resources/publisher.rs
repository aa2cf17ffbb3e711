//! Wire adapter for `api/Master/Publisher`.
//!
//! Availability crosses the wire as a real boolean; the form works in
//! `True`/`False` strings and the adapter converts at the edge. Rows
//! come back under `Variables`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{Publisher, ResourceKind};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, Resource, ViewPayload,
};

const AVAILABILITY_CHOICES: &[&str] = &["True", "False"];

#[derive(Debug, Serialize)]
pub struct PublisherRequest {
    flag: Flag,
    #[serde(rename = "publisherId")]
    publisher_id: Option<i64>,
    #[serde(rename = "publisherName")]
    publisher_name: Option<String>,
    #[serde(rename = "publisherCode")]
    publisher_code: Option<String>,
    #[serde(rename = "isAvailable")]
    is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PublisherEnvelope {
    #[serde(rename = "MESSAGE", alias = "message", default)]
    message: Option<String>,
    #[serde(rename = "Variables", default)]
    records: Vec<PublisherWire>,
}

#[derive(Debug, Deserialize)]
struct PublisherWire {
    #[serde(rename = "publisherId", default)]
    id: Option<i64>,
    #[serde(rename = "publisherName", default)]
    name: String,
    #[serde(rename = "publisherCode", default)]
    code: String,
    #[serde(rename = "isAvailable", default)]
    available: Option<bool>,
}

fn as_bool(value: &str) -> bool {
    value == "True"
}

impl Resource for Publisher {
    type Request = PublisherRequest;

    const KIND: ResourceKind = ResourceKind::Publisher;
    const ENDPOINT: &'static str = "api/Master/Publisher";
    const PAGE_SIZE: usize = 5;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Clear;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Publisher ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("name", "Publisher Name", FieldKind::Text, FieldRole::Name),
        FieldSpec::new("code", "Publisher Code", FieldKind::Text, FieldRole::Data),
        FieldSpec::new(
            "available",
            "Is Available",
            FieldKind::Choice(AVAILABILITY_CHOICES),
            FieldRole::Data,
        )
        .with_default("True"),
    ];

    const COLUMNS: &'static [Column] = &[
        Column::new("ID", 6),
        Column::new("Publisher Name", 26),
        Column::new("Code", 12),
        Column::new("Available", 10),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.map(|i| i.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.code.clone(),
            if self.available { "True" } else { "False" }.to_string(),
        ]
    }

    fn populate_draft(&self, draft: &mut DraftState) {
        draft.set("id", self.id.map(|i| i.to_string()).unwrap_or_default());
        draft.set("name", self.name.clone());
        draft.set("code", self.code.clone());
        draft.set("available", if self.available { "True" } else { "False" });
    }

    fn build_request(flag: Flag, draft: &DraftState) -> Result<PublisherRequest, ApiError> {
        let publisher_id = request_id(draft, "id", "PublisherID", flag)?;
        Ok(match flag {
            Flag::View => PublisherRequest {
                flag,
                publisher_id,
                publisher_name: draft.opt("name"),
                publisher_code: draft.opt("code"),
                is_available: draft.trimmed("available").map(as_bool),
            },
            _ => PublisherRequest {
                flag,
                publisher_id,
                publisher_name: Some(draft.owned("name")),
                publisher_code: Some(draft.owned("code")),
                is_available: Some(as_bool(draft.get("available"))),
            },
        })
    }

    fn delete_request(&self) -> PublisherRequest {
        PublisherRequest {
            flag: Flag::Delete,
            publisher_id: self.id,
            publisher_name: if self.name.is_empty() {
                None
            } else {
                Some(self.name.clone())
            },
            publisher_code: None,
            is_available: None,
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: PublisherEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .records
            .into_iter()
            .map(|w| Publisher {
                id: w.id,
                name: w.name,
                code: w.code,
                available: w.available.unwrap_or(false),
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
    fn insert_converts_availability_to_a_boolean() {
        let mut draft = DraftState::for_resource::<Publisher>();
        draft.set("name", "Orbit");
        draft.set("code", "ORB");
        draft.set("available", "False");
        let req = Publisher::build_request(Flag::Insert, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "flag": "INSERT",
                "publisherId": null,
                "publisherName": "Orbit",
                "publisherCode": "ORB",
                "isAvailable": false
            })
        );
    }

    #[test]
    fn view_all_leaves_availability_unset() {
        let draft = DraftState::unset_for::<Publisher>();
        let req = Publisher::build_request(Flag::View, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap()["isAvailable"],
            json!(null)
        );
    }

    #[test]
    fn user_view_sends_the_selected_availability() {
        let draft = DraftState::for_resource::<Publisher>();
        let req = Publisher::build_request(Flag::View, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap()["isAvailable"],
            json!(true)
        );
    }

    #[test]
    fn update_requires_the_id() {
        let draft = DraftState::for_resource::<Publisher>();
        let err = Publisher::build_request(Flag::Update, &draft).unwrap_err();
        assert_eq!(err.to_string(), "PublisherID required for update.");
    }

    #[test]
    fn parses_rows_under_capital_variables() {
        let body = json!({
            "MESSAGE": "Fetched ",
            "Variables": [
                { "publisherId": 9, "publisherName": "Orbit", "publisherCode": "ORB", "isAvailable": true },
                { "publisherId": 10, "publisherName": "Vintage", "publisherCode": "VIN" }
            ]
        });
        let payload = Publisher::parse_response(body).unwrap();
        assert_eq!(payload.message.as_deref(), Some("Fetched"));
        assert!(payload.records[0].available);
        // missing availability defaults to unavailable
        assert!(!payload.records[1].available);
    }

    #[test]
    fn delete_keeps_id_and_name() {
        let target = Publisher {
            id: Some(9),
            name: "Orbit".into(),
            code: "ORB".into(),
            available: true,
        };
        assert_eq!(
            serde_json::to_value(target.delete_request()).unwrap(),
            json!({
                "flag": "DELETE",
                "publisherId": 9,
                "publisherName": "Orbit",
                "publisherCode": null,
                "isAvailable": null
            })
        );
    }
}
