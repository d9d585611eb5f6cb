//! Core of the Visitrail visit tracker.
//!
//! Holds the visit-history data model, the recorder that appends navigations
//! to it and the aggregator that turns a snapshot into ranked and
//! chronological views. Persistence is reached only through the traits in
//! [`visit::repository`]; concrete stores live in `visitrail-infrastructure`.

pub mod config;
pub mod error;
pub mod visit;

// Re-export common error type
pub use error::VisitrailError;
