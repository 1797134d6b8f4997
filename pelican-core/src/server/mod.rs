mod persist;
mod pid;
pub mod setup;


pub use persist::SnapshotSaver;
pub use setup::{build_pingora_server, load_store, run, shutdown};
