mod endpoint;
mod envelope;
mod gateway;
mod handler;

#[cfg(test)]
mod tests;

pub use endpoint::RegistryEndpoint;
pub use envelope::{ApiResponse, Envelope};
pub use gateway::RegistryGateway;
pub use handler::{ApiRequest, BANNER, RegistryHandler};
