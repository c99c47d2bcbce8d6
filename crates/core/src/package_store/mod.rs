//! Local storage for mirrored package documents.

mod sqlite_store;
mod store;

pub use sqlite_store::SqlitePackageStore;
pub use store::{PackageRecord, PackageStore, PackageStoreError};
