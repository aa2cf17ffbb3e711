use chrono::NaiveDate;

/// The six master-data resources the console administers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Location,
    Category,
    AcquisitionType,
    Vendor,
    Publisher,
    Author,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Location,
        ResourceKind::Category,
        ResourceKind::AcquisitionType,
        ResourceKind::Vendor,
        ResourceKind::Publisher,
        ResourceKind::Author,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Location => "location",
            ResourceKind::Category => "category",
            ResourceKind::AcquisitionType => "acquisition-type",
            ResourceKind::Vendor => "vendor",
            ResourceKind::Publisher => "publisher",
            ResourceKind::Author => "author",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Location => "Location",
            ResourceKind::Category => "Category",
            ResourceKind::AcquisitionType => "Acquisition Type",
            ResourceKind::Vendor => "Vendor",
            ResourceKind::Publisher => "Publisher",
            ResourceKind::Author => "Author",
        }
    }
}

/// Lifecycle state reported by the backend for categories and
/// acquisition types. Unknown values are preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Active,
    Inactive,
    Other(String),
}

impl Status {
    pub fn parse(s: &str) -> Self {
        match s {
            "Active" => Status::Active,
            "Inactive" => Status::Inactive,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Other(s) => s,
        }
    }
}

/// Physical shelving location. The display name is derived by the
/// backend, so writes never carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: Option<i64>,
    pub floor: String,
    pub section: String,
    pub shelf: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionType {
    pub id: Option<i64>,
    pub name: String,
    pub status: Status,
}

/// Reference to a category or acquisition type linked to a vendor,
/// joined client-side from the link lists the backend returns.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorLink {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vendor {
    pub id: Option<i64>,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub address: String,
    pub categories: Vec<VendorLink>,
    pub acquisition_types: Vec<VendorLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Publisher {
    pub id: Option<i64>,
    pub name: String,
    pub code: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
    pub nationality: String,
    pub birth_date: Option<NaiveDate>,
    pub status: String,
}
