//! Domain model for the price-watch pipeline.
//!
//! Holds the catalog of monitored targets, the job submission/report
//! records exchanged with the transport, the two execution-log entry
//! shapes, the price pattern, and the well-known object names. Nothing
//! in this crate performs I/O.

pub mod catalog;
pub mod error;
pub mod job;
pub mod log_entry;
pub mod naming;
pub mod price;
