use thiserror::Error;

/// Categorical outcome of a query that did not produce readings.
///
/// Only the category is user-visible; transport detail stays in debug
/// logging inside the adapter that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    #[error("invalid coordinate")]
    InvalidCoordinate,

    /// Transport-level failure: unreachable service, broken response, or a
    /// non-success status other than "no data".
    #[error("network failure")]
    Network,

    /// Service reachable but holding no reading for the requested key.
    #[error("no data for this location and time")]
    NoData,

    /// The query was superseded while in flight. Never surfaced to the
    /// user; the coordinator swallows it without touching state.
    #[error("cancelled")]
    Cancelled,
}
