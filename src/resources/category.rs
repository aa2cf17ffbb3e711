//! Wire adapter for `api/Master/Category`.
//!
//! Requests key the identifier as `categoryID`; the response envelope
//! returns rows under `category_Variables` and an upper-case `MESSAGE`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{Category, ResourceKind, Status};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, RefOption, Resource, ViewPayload, STATUS_CHOICES,
};

#[derive(Debug, Serialize)]
pub struct CategoryRequest {
    flag: Flag,
    #[serde(rename = "categoryID")]
    category_id: Option<i64>,
    #[serde(rename = "categoryName")]
    category_name: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryEnvelope {
    #[serde(rename = "MESSAGE", alias = "message", default)]
    message: Option<String>,
    #[serde(rename = "category_Variables", default)]
    records: Vec<CategoryWire>,
}

#[derive(Debug, Deserialize)]
struct CategoryWire {
    #[serde(rename = "categoryID", default)]
    id: Option<i64>,
    #[serde(rename = "categoryName", default)]
    name: String,
    #[serde(default)]
    status: String,
}

impl Resource for Category {
    type Request = CategoryRequest;

    const KIND: ResourceKind = ResourceKind::Category;
    const ENDPOINT: &'static str = "api/Master/Category";
    const PAGE_SIZE: usize = 5;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Preserve;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Category ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("name", "Category Name", FieldKind::Text, FieldRole::Name),
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
        Column::new("Category Name", 28),
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

    fn build_request(flag: Flag, draft: &DraftState) -> Result<CategoryRequest, ApiError> {
        let category_id = request_id(draft, "id", "CategoryID", flag)?;
        // writes send fields verbatim, views send only non-blank filters
        let (category_name, status) = match flag {
            Flag::View => (draft.opt("name"), draft.opt("status")),
            _ => (Some(draft.owned("name")), Some(draft.owned("status"))),
        };
        Ok(CategoryRequest {
            flag,
            category_id,
            category_name,
            status,
        })
    }

    fn delete_request(&self) -> CategoryRequest {
        CategoryRequest {
            flag: Flag::Delete,
            category_id: self.id,
            category_name: None,
            status: None,
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: CategoryEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .records
            .into_iter()
            .map(|w| Category {
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
