pub mod filter;
pub mod worker;


pub use filter::{FilterCmd, RegistryArgs};
pub use worker::run_worker;
