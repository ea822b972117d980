//! Error types for projection and hypothesis queries

use thiserror::Error;

/// Errors from the local azimuthal-equidistant projection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Position is at or beyond the supported range of the projection.
    ///
    /// The truncated projection covers a single hemisphere; positions at or
    /// past a quarter of the earth's circumference from the reference
    /// (including the antipode) have no well-defined image.
    #[error("position {distance:.0} m from reference exceeds projection range of {max_range:.0} m")]
    OutOfRange { distance: f64, max_range: f64 },
}

/// Errors reported by a detect-and-avoid engine implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No aircraft is tracked at this index
    #[error("no aircraft tracked at index {0}")]
    UnknownIndex(usize),

    /// No aircraft is tracked with this identifier
    #[error("no aircraft tracked with id {0:?}")]
    UnknownId(String),

    /// The engine refused a state submission
    #[error("engine rejected state submission: {0}")]
    Rejected(String),
}

/// Errors from the hypothesis query protocol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HypothesisError {
    /// A hypothesis transaction was started while another is still open.
    ///
    /// Transactions must not interleave; the open transaction keeps its
    /// snapshot and restores normally.
    #[error("hypothesis transaction already in flight")]
    ReentrantQuery,

    /// The engine has no tracked ownship to evaluate against
    #[error("no ownship state is currently tracked")]
    NoOwnship,

    /// An engine query failed mid-transaction; the working set was restored
    #[error("engine query failed: {0}")]
    Query(#[source] EngineError),

    /// Re-submitting the original traffic picture failed.
    ///
    /// The working set is now inconsistent with what callers observed before
    /// the query; this is fatal and must be surfaced, never retried here.
    #[error("failed to restore traffic working set: {0}")]
    RestoreFailure(#[source] EngineError),
}
