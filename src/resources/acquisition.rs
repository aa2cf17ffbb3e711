//! Wire adapter for `api/Master/AcquisitionType`.
//!
//! Same protocol as the category endpoint but with Pascal-cased field
//! names and the row list keyed `AcquisitionType`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{AcquisitionType, ResourceKind, Status};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, RefOption, Resource, ViewPayload, STATUS_CHOICES,
};

#[derive(Debug, Serialize)]
pub struct AcquisitionTypeRequest {
    flag: Flag,
    #[serde(rename = "AcquisitionTypeID")]
    acquisition_type_id: Option<i64>,
    #[serde(rename = "AcquisitionTypeName")]
    acquisition_type_name: Option<String>,
    status: Option<String>,
}

// A later backend revision renamed the list and camel-cased the record
// fields; both spellings stay accepted.
#[derive(Debug, Deserialize)]
struct AcquisitionTypeEnvelope {
    #[serde(rename = "MESSAGE", alias = "message", default)]
    message: Option<String>,
    #[serde(rename = "AcquisitionType", alias = "acquisitionTypeResponse", default)]
    records: Vec<AcquisitionTypeWire>,
}

#[derive(Debug, Deserialize)]
struct AcquisitionTypeWire {
    #[serde(rename = "AcquisitionTypeID", alias = "acquisitionTypeID", default)]
    id: Option<i64>,
    #[serde(rename = "AcquisitionTypeName", alias = "acquisitionTypeName", default)]
    name: String,
    #[serde(default)]
    status: String,
}

impl Resource for AcquisitionType {
    type Request = AcquisitionTypeRequest;

    const KIND: ResourceKind = ResourceKind::AcquisitionType;
    const ENDPOINT: &'static str = "api/Master/AcquisitionType";
    const PAGE_SIZE: usize = 5;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Preserve;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "AcquisitionType ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("name", "AcquisitionType Name", FieldKind::Text, FieldRole::Name),
        FieldSpec::new(
            "status",
            "Status",
            FieldKind::Choice(STATUS_CHOICES),
            FieldRole::Status,
        )
        .with_default("Active"),
    ];

    const COLUMNS: &'static [Column] = &[
        Column::new("ID", 6),
        Column::new("AcquisitionType Name", 28),
        Column::new("Status", 10),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.map(|i| i.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.status.as_str().to_string(),
        ]
    }

    fn populate_draft(&self, draft: &mut DraftState) {
        draft.set("id", self.id.map(|i| i.to_string()).unwrap_or_default());
        draft.set("name", self.name.clone());
        draft.set("status", self.status.as_str());
    }

    fn build_request(flag: Flag, draft: &DraftState) -> Result<AcquisitionTypeRequest, ApiError> {
        let acquisition_type_id = request_id(draft, "id", "AcquisitionTypeID", flag)?;
        let (acquisition_type_name, status) = match flag {
            Flag::View => (draft.opt("name"), draft.opt("status")),
            _ => (Some(draft.owned("name")), Some(draft.owned("status"))),
        };
        Ok(AcquisitionTypeRequest {
            flag,
            acquisition_type_id,
            acquisition_type_name,
            status,
        })
    }

    fn delete_request(&self) -> AcquisitionTypeRequest {
        AcquisitionTypeRequest {
            flag: Flag::Delete,
            acquisition_type_id: self.id,
            acquisition_type_name: None,
            status: None,
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: AcquisitionTypeEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .records
            .into_iter()
            .map(|w| AcquisitionType {
                id: w.id,
                name: w.name,
                status: Status::parse(&w.status),
            })
            .collect();
        Ok(ViewPayload {
            message: clean_message(envelope.message),
            records,
        })
    }

    fn option_entry(&self) -> Option<RefOption> {
        self.id.map(|id| RefOption {
            id,
            label: format!("{} ({})", self.name, self.status.as_str()),
        })
    }
}
