mod error;
mod snapshot;
mod store;
mod types;


pub use error::RegistryError;
pub use snapshot::SnapshotFile;
pub use store::FilterStore;
pub use types::*;
