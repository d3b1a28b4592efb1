// lampwatch-api: Async Rust client for the smart-lamp monitoring backend
//
// REST facade (device, monitor, control, lamp, user), the analysis
// dashboard surface, and the reconnecting realtime channel.

pub mod client;
pub mod dashboard;
pub mod error;
pub mod inflight;
pub mod models;
pub mod realtime;
pub mod resources;
pub mod transport;

pub use client::{ApiClient, Request};
pub use error::{Error, ErrorKind};
pub use inflight::InflightRegistry;
pub use transport::TransportConfig;
