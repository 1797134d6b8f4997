pub mod server;
pub mod tracing;

pub use self::server::{PASSWORD, TestServer, USERNAME};
pub use self::tracing::{CapturedEvent, captured_events, init_test_tracing};
