#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure aggregation queries over a violation dataset.
//!
//! Every function here is a pure function of a [`Dataset`] (or a record
//! selection taken from one) and its explicit parameters. Nothing is
//! cached and nothing is mutated, so results are reproducible and the
//! same dataset can serve concurrent readers.
//!
//! Precondition violations are surfaced as explicit errors, never as
//! silent zeros or empty results.
//!
//! [`Dataset`]: violation_map_dataset::Dataset

pub mod queries;

use thiserror::Error;

/// Errors for query-level precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A frequency query was invoked on zero records. Callers must check
    /// the selection size first and present a "no data" state instead.
    #[error("frequency query invoked on an empty record selection")]
    EmptyGroup,

    /// A comparison was requested with fewer than two entities.
    #[error("comparison requires at least 2 entities, got {count}")]
    InsufficientSelection {
        /// How many entities the caller supplied.
        count: usize,
    },
}

/// A comparison entity matched zero records, so its percentages are
/// undefined. Reported per row; the caller decides whether to skip the
/// row or abort the whole comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no records match comparison entity {entity:?}")]
pub struct ZeroPopulationError {
    /// The dimension value that resolved to zero records.
    pub entity: String,
}
