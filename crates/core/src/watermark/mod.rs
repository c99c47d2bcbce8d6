//! Durable sync watermark.
//!
//! The watermark records how far the mirror has progressed: the start time of
//! the last fully successful run, and during bootstrap, the last package that
//! was confirmed synced so that an interrupted bootstrap can resume.

mod sqlite_store;
mod store;

pub use sqlite_store::SqliteWatermarkStore;
pub use store::{SyncMode, Watermark, WatermarkError, WatermarkStore};
