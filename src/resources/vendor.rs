//! Wire adapter for `api/Master/Vendor`.
//!
//! The vendor endpoint is relational: writes carry link arrays pairing
//! the vendor with category and acquisition-type ids, and view
//! responses return three parallel lists that have to be joined
//! client-side on `vendorID`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{ResourceKind, Vendor, VendorLink};

use super::{
    clean_message, request_id, Column, DraftPolicy, DraftState, FieldKind, FieldRole, FieldSpec,
    Flag, PickerSpec, Resource, ViewPayload,
};

/// Picker index for category links in the vendor draft.
pub const CATEGORY_PICKER: usize = 0;
/// Picker index for acquisition-type links in the vendor draft.
pub const ACQUISITION_PICKER: usize = 1;

#[derive(Debug, Serialize)]
pub struct VendorRequest {
    flag: Flag,
    #[serde(rename = "vendorID")]
    vendor_id: Option<i64>,
    #[serde(rename = "vendorName")]
    vendor_name: Option<String>,
    #[serde(rename = "contactPerson")]
    contact_person: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    #[serde(rename = "vendorCategoryTypesVendor")]
    category_links: Vec<CategoryLinkRequest>,
    #[serde(rename = "vendorAcquisitionTypeTypeVendor")]
    acquisition_links: Vec<AcquisitionLinkRequest>,
}

#[derive(Debug, Serialize)]
struct CategoryLinkRequest {
    #[serde(rename = "vendorID")]
    vendor_id: Option<i64>,
    #[serde(rename = "categoryID")]
    category_id: i64,
    #[serde(rename = "categoryName")]
    category_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AcquisitionLinkRequest {
    #[serde(rename = "vendorID")]
    vendor_id: Option<i64>,
    #[serde(rename = "acquisitionTypeID")]
    acquisition_type_id: i64,
    #[serde(rename = "acquisitionTypeName")]
    acquisition_type_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VendorEnvelope {
    #[serde(rename = "message", alias = "MESSAGE", default)]
    message: Option<String>,
    #[serde(rename = "vendorResponseList", default)]
    vendors: Vec<VendorWire>,
    #[serde(rename = "vendorCategoryTypeResponseList", default)]
    category_links: Vec<CategoryLinkWire>,
    #[serde(rename = "vendorAcquisitionTypeTypesResponseList", default)]
    acquisition_links: Vec<AcquisitionLinkWire>,
}

#[derive(Debug, Deserialize)]
struct VendorWire {
    #[serde(rename = "vendorID", default)]
    id: Option<i64>,
    #[serde(rename = "vendorName", default)]
    name: String,
    #[serde(rename = "contactPerson", default)]
    contact_person: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct CategoryLinkWire {
    #[serde(rename = "vendorID", default)]
    vendor_id: Option<i64>,
    #[serde(rename = "categoryID", default)]
    category_id: Option<i64>,
    #[serde(rename = "categoryName", default)]
    category_name: String,
}

#[derive(Debug, Deserialize)]
struct AcquisitionLinkWire {
    #[serde(rename = "vendorID", default)]
    vendor_id: Option<i64>,
    #[serde(rename = "acquisitionTypeID", default)]
    acquisition_type_id: Option<i64>,
    #[serde(rename = "acquisitionTypeName", default)]
    acquisition_type_name: String,
}

fn joined_names(links: &[VendorLink]) -> String {
    if links.is_empty() {
        "—".to_string()
    } else {
        links
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Resource for Vendor {
    type Request = VendorRequest;

    const KIND: ResourceKind = ResourceKind::Vendor;
    const ENDPOINT: &'static str = "api/Master/Vendor";
    const PAGE_SIZE: usize = 5;
    const DRAFT_POLICY: DraftPolicy = DraftPolicy::Preserve;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Vendor ID", FieldKind::Numeric, FieldRole::Id),
        FieldSpec::new("name", "Vendor Name", FieldKind::Text, FieldRole::Name),
        FieldSpec::new("contact", "Contact Person", FieldKind::Text, FieldRole::Data),
        FieldSpec::new("phone", "Phone", FieldKind::Text, FieldRole::Data),
        FieldSpec::new("address", "Address", FieldKind::Text, FieldRole::Data),
    ];

    const COLUMNS: &'static [Column] = &[
        Column::new("ID", 6),
        Column::new("Vendor", 18),
        Column::new("Contact Person", 16),
        Column::new("Phone", 12),
        Column::new("Address", 18),
        Column::new("Categories", 22),
        Column::new("Acquisitions", 22),
    ];

    const PICKERS: &'static [PickerSpec] = &[
        PickerSpec {
            label: "Category Types",
            source: ResourceKind::Category,
        },
        PickerSpec {
            label: "Acquisition Types",
            source: ResourceKind::AcquisitionType,
        },
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.map(|i| i.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.contact_person.clone(),
            self.phone.clone(),
            self.address.clone(),
            joined_names(&self.categories),
            joined_names(&self.acquisition_types),
        ]
    }

    fn populate_draft(&self, draft: &mut DraftState) {
        draft.set("id", self.id.map(|i| i.to_string()).unwrap_or_default());
        draft.set("name", self.name.clone());
        draft.set("contact", self.contact_person.clone());
        draft.set("phone", self.phone.clone());
        draft.set("address", self.address.clone());
        draft.set_selection(
            CATEGORY_PICKER,
            self.categories.iter().map(|l| l.id).collect(),
        );
        draft.set_selection(
            ACQUISITION_PICKER,
            self.acquisition_types.iter().map(|l| l.id).collect(),
        );
    }

    fn build_request(flag: Flag, draft: &DraftState) -> Result<VendorRequest, ApiError> {
        let vendor_id = request_id(draft, "id", "VendorID", flag)?;
        // link arrays describe the desired end state of a write; a view
        // carries none
        let (category_links, acquisition_links) = match flag {
            Flag::View => (Vec::new(), Vec::new()),
            _ => (
                draft
                    .selection(CATEGORY_PICKER)
                    .iter()
                    .map(|&category_id| CategoryLinkRequest {
                        vendor_id,
                        category_id,
                        category_name: None,
                    })
                    .collect(),
                draft
                    .selection(ACQUISITION_PICKER)
                    .iter()
                    .map(|&acquisition_type_id| AcquisitionLinkRequest {
                        vendor_id,
                        acquisition_type_id,
                        acquisition_type_name: None,
                    })
                    .collect(),
            ),
        };
        Ok(VendorRequest {
            flag,
            vendor_id,
            vendor_name: draft.opt("name"),
            contact_person: draft.opt("contact"),
            phone: draft.opt("phone"),
            address: draft.opt("address"),
            category_links,
            acquisition_links,
        })
    }

    fn delete_request(&self) -> VendorRequest {
        VendorRequest {
            flag: Flag::Delete,
            vendor_id: self.id,
            vendor_name: None,
            contact_person: None,
            phone: None,
            address: None,
            category_links: Vec::new(),
            acquisition_links: Vec::new(),
        }
    }

    fn parse_response(body: Value) -> Result<ViewPayload<Self>, ApiError> {
        let envelope: VendorEnvelope =
            serde_json::from_value(body).map_err(ApiError::UnexpectedFormat)?;
        let records = envelope
            .vendors
            .into_iter()
            .map(|w| {
                let categories = match w.id {
                    Some(vid) => envelope
                        .category_links
                        .iter()
                        .filter(|l| l.vendor_id == Some(vid))
                        .filter_map(|l| {
                            l.category_id.map(|id| VendorLink {
                                id,
                                name: l.category_name.clone(),
                            })
                        })
                        .collect(),
                    None => Vec::new(),
                };
                let acquisition_types = match w.id {
                    Some(vid) => envelope
                        .acquisition_links
                        .iter()
                        .filter(|l| l.vendor_id == Some(vid))
                        .filter_map(|l| {
                            l.acquisition_type_id.map(|id| VendorLink {
                                id,
                                name: l.acquisition_type_name.clone(),
                            })
                        })
                        .collect(),
                    None => Vec::new(),
                };
                Vendor {
                    id: w.id,
                    name: w.name,
                    contact_person: w.contact_person,
                    phone: w.phone,
                    address: w.address,
                    categories,
                    acquisition_types,
                }
            })
            .collect();
        Ok(ViewPayload {
            message: clean_message(envelope.message),
            records,
        })
    }
}
