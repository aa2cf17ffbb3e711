use clap::{Parser, Subcommand};

use crate::models::ResourceKind;

#[derive(Parser)]
#[command(name = "libadmin")]
#[command(about = "Terminal administrative console for the library catalog master-data API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the full-screen console
    Tui,

    /// Fetch records and print them as a table
    View {
        /// Resource to fetch (location, category, acquisition-type, vendor, publisher, author)
        resource: String,

        /// Filter by identifier
        #[arg(long)]
        id: Option<i64>,

        /// Filter by name
        #[arg(long)]
        name: Option<String>,

        /// Filter by status, where the resource has one
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete one record by identifier
    Delete {
        /// Resource to delete from
        resource: String,

        /// Identifier of the record to delete
        #[arg(long)]
        id: i64,

        /// Actually perform the delete
        #[arg(long)]
        yes: bool,
    },
}

impl Commands {
    pub fn parse_resource(resource: &str) -> Result<ResourceKind, anyhow::Error> {
        match resource.to_lowercase().as_str() {
            "location" | "locations" => Ok(ResourceKind::Location),
            "category" | "categories" => Ok(ResourceKind::Category),
            "acquisition-type" | "acquisition_type" | "acquisitiontype" | "acquisition" => {
                Ok(ResourceKind::AcquisitionType)
            }
            "vendor" | "vendors" => Ok(ResourceKind::Vendor),
            "publisher" | "publishers" => Ok(ResourceKind::Publisher),
            "author" | "authors" => Ok(ResourceKind::Author),
            other => Err(anyhow::anyhow!(
                "Unknown resource: {}. Supported resources: location, category, acquisition-type, vendor, publisher, author",
                other
            )),
        }
    }
}
