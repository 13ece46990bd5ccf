//! `pricewatch-invoker` library crate.
//!
//! Loads the catalog, submits one crawl job per target through a
//! [`JobTransport`], and aggregates a per-job status report. The binary
//! entrypoint lives in `bin/invoker.rs`.

pub mod config;
pub mod handler;
pub mod lambda;
pub mod local;
pub mod orchestrator;
pub mod transport;

pub use lambda::LambdaTransport;
pub use local::LocalTransport;
pub use handler::InvokeHandler;
pub use orchestrator::{DispatchSettings, Orchestrator, RunError};
pub use transport::{JobTransport, TransportError, TransportResponse};
