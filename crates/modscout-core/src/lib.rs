// Core logic: the item model, the keyword classifier and the report it feeds
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod partition;
pub mod report;

pub use classify::{CategoryRule, KeywordTable, OTHER_CATEGORY};
pub use config::{AssetRules, Config};
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use loader::{DroppedRecord, LoadedFavorites};
pub use models::{FavoritesDocument, Item, RawRecord, RunMetadata};
pub use partition::{Bucket, Partition};
pub use report::{CategoryGroup, Report, Summary};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
