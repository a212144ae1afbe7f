#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query result structures for violation analytics.
//!
//! These are the plain, non-persisted shapes the query layer hands to
//! presentation consumers. They are recomputed on every query; the
//! engine never caches them.

use serde::{Deserialize, Serialize};

/// Total/open/closed split for a record selection.
///
/// Statuses other than "Open" and "Closed" count toward `total` only;
/// they are neither merged into a bucket nor an error, so
/// `open + closed <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Number of records in the selection.
    pub total: u64,
    /// Records with status "Open".
    pub open: u64,
    /// Records with status "Closed".
    pub closed: u64,
}

/// Most and least frequent violation types in a selection.
///
/// Ties are broken by first-encountered order while counting, so the
/// result is deterministic for a given input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyExtremes {
    /// Violation type with the highest occurrence count.
    pub most_frequent_type: String,
    /// Occurrences of the most frequent type.
    pub most_frequent_count: u64,
    /// Violation type with the lowest occurrence count.
    pub least_frequent_type: String,
    /// Occurrences of the least frequent type.
    pub least_frequent_count: u64,
}

/// One row of the per-type open/closed breakdown.
///
/// Both columns are always present: a type with no open (or no closed)
/// occurrences reports 0 there, never an absent column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatusRow {
    /// The violation type this row aggregates.
    pub violation_type: String,
    /// Records of this type with status "Open".
    pub open: u64,
    /// Records of this type with status "Closed".
    pub closed: u64,
    /// All records of this type, other statuses included.
    pub total: u64,
}

/// A violation type and its occurrence count, for ranked listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    /// The violation type.
    pub violation_type: String,
    /// Number of records of this type.
    pub count: u64,
}

/// Per-entity summary row for a multi-entity comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    /// The compared dimension value (a city name, for example).
    pub entity: String,
    /// Records matching the entity.
    pub total: u64,
    /// Open share of the total, rounded to the nearest whole percent.
    pub percent_open: u8,
    /// Closed share of the total, rounded to the nearest whole percent.
    pub percent_closed: u8,
    /// The entity's most common violation type (first-encounter
    /// tie-break).
    pub most_common_type: String,
    /// Occurrences of the most common type.
    pub most_common_type_count: u64,
}
