pub mod aggregator;
pub mod api;
pub mod auth;
pub mod chart;
pub mod cli;
pub mod client;
pub mod conf;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod matcher;
pub mod server;
