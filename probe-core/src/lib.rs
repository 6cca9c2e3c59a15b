//! Core library for the point weather probe.
//!
//! This crate defines:
//! - Coordinate/time normalization and the canonical query identity
//! - The fixed catalog of selectable time slots
//! - The latest-wins query coordinator and its observable state machine
//! - The fetcher contract, plus the HTTP adapter for the location service
//! - Configuration handling for front-ends
//!
//! It is used by `probe-cli`, but any presentation surface (a map widget,
//! a GUI shell) can drive it through the same interface.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod slots;

pub use config::Config;
pub use coordinator::{Coordinator, Phase, QueryState};
pub use error::QueryError;
pub use fetcher::{ReadingsFetcher, http::HttpFetcher};
pub use model::{QueryKey, RawReadings, Readings};
pub use normalize::normalize;
pub use slots::{TimeSlot, all_slots, default_slot};
