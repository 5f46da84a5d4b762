//! Domain layer - core types and rules.
//!
//! This layer contains pure domain models, epoch conversion and error types
//! without any I/O.

pub mod config;
pub mod epoch;
pub mod error;
pub mod models;

pub use config::{AppConfig, CollisionPolicy, ExportConfig, GroupPolicy};
pub use epoch::{StoreTimestamp, STORE_EPOCH_OFFSET};
pub use error::{AppError, Result};
pub use models::{ExportSummary, NoteRecord, RowFailure};
