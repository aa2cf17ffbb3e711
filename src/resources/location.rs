//! Wire adapter for `api/Location/Location`.
//!
//! The location endpoint is the odd one out: its message key is
//! lower-case, rows come back under `variables`, and the display name
//! is derived by the backend from floor/section/shelf, so writes always
//! send `locationName: null`. Views filter on id and name only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{Location, ResourceKind};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, Resource, ViewPayload,
};

#[derive(Debug, Serialize)]
pub struct LocationRequest {
    flag: Flag,
    #[serde(rename = "locationId")]
    location_id: Option<i64>,
    floor: Option<String>,
    section: Option<String>,
    shelf: Option<String>,
    #[serde(rename = "locationName")]
    location_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationEnvelope {
    #[serde(rename = "message", alias = "MESSAGE", default)]
    message: Option<String>,
    #[serde(rename = "variables", default)]
    records: Vec<LocationWire>,
}

#[derive(Debug, Deserialize)]
struct LocationWire {
    #[serde(rename = "locationId", default)]
    id: Option<i64>,
    #[serde(default)]
    floor: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    shelf: String,
    #[serde(rename = "locationName", default)]
    name: String,
}

impl Resource for Location {
    type Request = LocationRequest;

    const KIND: ResourceKind = ResourceKind::Location;
    const ENDPOINT: &'static str = "api/Location/Location";
    const PAGE_SIZE: usize = 6;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Clear;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Location ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("floor", "Floor", FieldKind::Text, FieldRole::Data),
        FieldSpec::new("section", "Section", FieldKind::Text, FieldRole::Data),
        FieldSpec::new("shelf", "Shelf", FieldKind::Text, FieldRole::Data),
        FieldSpec::new("name", "Location Name", FieldKind::Text, FieldRole::Name),
    ];

    const COLUMNS: &'static [Column] = &[
        Column::new("ID", 6),
        Column::new("Floor", 10),
        Column::new("Section", 12),
        Column::new("Shelf", 10),
        Column::new("Location Name", 24),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.map(|i| i.to_string()).unwrap_or_default(),
            self.floor.clone(),
            self.section.clone(),
            self.shelf.clone(),
            self.name.clone(),
        ]
    }

    fn populate_draft(&self, draft: &mut DraftState) {
        draft.set("id", self.id.map(|i| i.to_string()).unwrap_or_default());
        draft.set("floor", self.floor.clone());
        draft.set("section", self.section.clone());
        draft.set("shelf", self.shelf.clone());
        draft.set("name", self.name.clone());
    }

    fn build_request(flag: Flag, draft: &DraftState) -> Result<LocationRequest, ApiError> {
        let location_id = request_id(draft, "id", "LocationID", flag)?;
        Ok(match flag {
            Flag::View => LocationRequest {
                flag,
                location_id,
                floor: None,
                section: None,
                shelf: None,
                location_name: draft.opt("name"),
            },
            _ => LocationRequest {
                flag,
                location_id,
                floor: Some(draft.owned("floor")),
                section: Some(draft.owned("section")),
                shelf: Some(draft.owned("shelf")),
                location_name: None,
            },
        })
    }

    fn delete_request(&self) -> LocationRequest {
        LocationRequest {
            flag: Flag::Delete,
            location_id: self.id,
            floor: None,
            section: None,
            shelf: None,
            location_name: if self.name.is_empty() {
                None
            } else {
                Some(self.name.clone())
            },
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: LocationEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .records
            .into_iter()
            .map(|w| Location {
                id: w.id,
                floor: w.floor,
                section: w.section,
                shelf: w.shelf,
                name: w.name,
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
    fn writes_never_send_the_display_name() {
        let mut draft = DraftState::for_resource::<Location>();
        draft.set("floor", "2");
        draft.set("section", "East");
        draft.set("shelf", "B4");
        draft.set("name", "typed by hand");
        let req = Location::build_request(Flag::Insert, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "flag": "INSERT",
                "locationId": null,
                "floor": "2",
                "section": "East",
                "shelf": "B4",
                "locationName": null
            })
        );
    }

    #[test]
    fn view_filters_on_id_and_name_only() {
        let mut draft = DraftState::unset_for::<Location>();
        draft.set("floor", "2");
        draft.set("name", "2-East-B4");
        let req = Location::build_request(Flag::View, &draft).unwrap();
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "flag": "VIEW",
                "locationId": null,
                "floor": null,
                "section": null,
                "shelf": null,
                "locationName": "2-East-B4"
            })
        );
    }

    #[test]
    fn update_requires_the_id() {
        let draft = DraftState::for_resource::<Location>();
        let err = Location::build_request(Flag::Update, &draft).unwrap_err();
        assert_eq!(err.to_string(), "LocationID required for update.");
    }

    #[test]
    fn delete_carries_id_and_name_from_the_record() {
        let target = Location {
            id: Some(12),
            floor: "2".into(),
            section: "East".into(),
            shelf: "B4".into(),
            name: "2-East-B4".into(),
        };
        assert_eq!(
            serde_json::to_value(target.delete_request()).unwrap(),
            json!({
                "flag": "DELETE",
                "locationId": 12,
                "floor": null,
                "section": null,
                "shelf": null,
                "locationName": "2-East-B4"
            })
        );
    }

    #[test]
    fn parses_the_lowercase_envelope() {
        let body = json!({
            "message": "Fetched",
            "variables": [
                { "locationId": 1, "floor": "1", "section": "North", "shelf": "A1", "locationName": "1-North-A1" }
            ]
        });
        let payload = Location::parse_response(body).unwrap();
        assert_eq!(payload.message.as_deref(), Some("Fetched"));
        assert_eq!(payload.records[0].name, "1-North-A1");
    }

    #[test]
    fn rows_with_missing_fields_still_parse() {
        let payload = Location::parse_response(json!({
            "variables": [ { "locationId": 2 } ]
        }))
        .unwrap();
        assert_eq!(payload.records[0].id, Some(2));
        assert_eq!(payload.records[0].floor, "");
    }
}
