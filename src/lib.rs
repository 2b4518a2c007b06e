// HVAC Sizing - Core Library
// Load calculation + equipment compatibility matching, exposed for the CLI,
// the API server, and tests

pub mod config;
pub mod db;
pub mod equipment;
pub mod error;
pub mod leads;
pub mod load;
pub mod matcher;
pub mod seed;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    catalog_stats, get_equipment_by_category, get_equipment_by_category_and_width, get_lead,
    insert_equipment, insert_lead, load_catalog_csv, read_catalog_csv, setup_database,
    verify_count, CategoryStat, ImportSummary,
};
pub use equipment::{Dimensions, EquipmentCategory, EquipmentRecord};
pub use error::SizingError;
pub use leads::{Lead, LeadRequest, LeadStore, MemoryLeadStore};
pub use load::{compute_capacity_band, CapacityBand, BAND_STEP_BTU, BTU_PER_TON};
pub use matcher::{
    find_compatible_bundles, match_bundles, CatalogSource, MatchPolicy, MissingFieldPolicy,
    SystemBundle, WidthSelection,
};
pub use seed::default_catalog;
pub use service::{calculate, compatible_systems, AreaBounds};

#[cfg(feature = "server")]
pub use api::{create_router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
