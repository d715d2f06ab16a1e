//! Configuration document access
//!
//! This module loads the calculator's YAML config and writes derived values
//! back into it. It includes:
//! - ConfigDocument: typed reads and in-place scalar writes with atomic save
//! - ConfigPath: dotted/indexed paths into the document
//! - Country, City, Career, Role: serde views of the collections

pub mod document;
mod layout;
pub mod model;
pub mod path;

pub use document::{ConfigDocument, Scalar};
pub use model::{Career, City, Country, Role};
pub use path::{ConfigPath, Segment};

/// Default location of the document, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Keys the refresh writes or reads at the top level
pub mod keys {
    pub const EUR_TO_USD_10_YEAR_AVG: &str = "eur_to_usd_10_year_avg";
    pub const AFFORDABILITY: &str = "affordability";
    pub const AFFORDABILITY_RATIO: &str = "affordability_ratio";
    pub const COUNTRIES: &str = "countries";
    pub const CITIES: &str = "cities";
    pub const CAREERS: &str = "careers";
}
