//! Hinge Lens - turns a personal dating-app export into analysis-ready rows
//!
//! Hinge Lens reads the matches file of an export and produces one flat row
//! per interaction through a deterministic pipeline: export parsing →
//! interaction transformation → tabular output, with optional summary
//! statistics and flow aggregation on top.
//!
//! ## Modules
//!
//! - **Transformer**: raw interaction records to [`InteractionRow`]s
//! - **Summary**: export-wide counts, conversion rates and timing histograms
//! - **Flows**: node/link data for like → match flow diagrams

pub mod config;
pub mod error;
pub mod flows;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod table;
pub mod timestamp;
pub mod transformer;
pub mod types;

#[cfg(feature = "cli")]
pub mod logging;

// C ABI for cdylib/staticlib consumers
#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::AnalyzerConfig;
pub use error::ComputeError;
pub use pipeline::{summarize_export, transform_export, ExportProcessor, ExportReport};
pub use schema::{ExportAdapter, RawInteraction};
pub use summary::ExportSummary;
pub use table::InteractionTable;
pub use transformer::InteractionTransformer;
pub use types::{InteractionRow, LikeType, MatchType, COLUMN_NAMES};

/// Library version
pub const LENS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "hinge-lens";
