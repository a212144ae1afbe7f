#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical building-violation record schema.
//!
//! This crate defines the cleaned record type produced by ingestion and
//! consumed by every query. Records are immutable once constructed: the
//! analytical workload is read-only, so there are no update or delete
//! operations anywhere in the system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Inspection status of a violation.
///
/// City data contains a handful of status strings beyond the two common
/// ones. Those are preserved verbatim in [`ViolationStatus::Other`]: they
/// count toward totals but are never folded into the open or closed
/// buckets, and they are not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ViolationStatus {
    /// The violation has not yet been resolved.
    Open,
    /// The violation has been resolved.
    Closed,
    /// Any other status string observed in the source data.
    #[strum(default)]
    Other(String),
}

impl ViolationStatus {
    /// Builds a status from the raw source string. "Open" and "Closed"
    /// map to their variants; any other observed value is preserved
    /// verbatim in [`ViolationStatus::Other`].
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| Self::Other(raw.to_string()))
    }

    /// `true` for [`ViolationStatus::Open`].
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// `true` for [`ViolationStatus::Closed`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl Serialize for ViolationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ViolationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&s))
    }
}

/// A grouping axis for filters and aggregations.
///
/// The engine supports a fixed, small set of dimensions known in advance;
/// it is not a general query language.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Dimension {
    /// City or region the violation was issued in.
    City,
    /// Municipal ward. Stored as a string category in the source data.
    Ward,
    /// Free-text violation category.
    ViolationType,
    /// Open/closed/other inspection status.
    Status,
}

/// One cleaned inspection violation.
///
/// Every record in a dataset satisfies the ingestion invariants:
/// `violation_type` is non-empty and never the literal placeholder `"."`,
/// and `city` and `status` are present. Numeric fields that failed to
/// parse are `None` rather than zero, because zero is a valid coordinate
/// and must not stand in for "missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    /// Unique case number from the source table (the primary key).
    pub case_number: String,
    /// Date component of the raw timestamp (text before the first space).
    pub date: String,
    /// Time-of-day component of the raw timestamp. Empty when the raw
    /// timestamp had no space.
    pub time: String,
    /// Inspection status.
    pub status: ViolationStatus,
    /// Violation code.
    pub code: Option<String>,
    /// Source "Value" field.
    pub value: Option<String>,
    /// Free-text violation category.
    pub violation_type: String,
    /// Street number of the violating property.
    pub street_number: Option<String>,
    /// High end of the street-number range, when the source gives one.
    pub street_number_high: Option<String>,
    /// Street name of the violating property.
    pub street_name: Option<String>,
    /// Street suffix, title-cased at ingestion ("ST" becomes "St") so
    /// display and grouping are consistent.
    pub street_suffix: Option<String>,
    /// City or region the violation was issued in.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: Option<String>,
    /// Zip code of the violating property.
    pub zip: Option<String>,
    /// Municipal ward, kept as the raw string category.
    pub ward: Option<String>,
    /// Mailing address of the responsible contact.
    pub contact_address: Option<String>,
    /// Second contact address line.
    pub second_contact_address: Option<String>,
    /// Contact city.
    pub contact_city: Option<String>,
    /// Contact state.
    pub contact_state: Option<String>,
    /// Contact zip code.
    pub contact_zip: Option<String>,
    /// External SAM (street address management) identifier.
    pub sam_id: Option<String>,
    /// Latitude (WGS84). `None` when missing or unparseable in the source.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` when missing or unparseable in the source.
    pub longitude: Option<f64>,
    /// Raw location string from the source, kept for reference.
    pub location: Option<String>,
}

impl ViolationRecord {
    /// Display form of the street address: street name followed by the
    /// title-cased suffix. `None` when the record has no street name.
    #[must_use]
    pub fn street_address(&self) -> Option<String> {
        let name = self.street_name.as_deref()?;
        Some(self.street_suffix.as_deref().map_or_else(
            || name.to_string(),
            |suffix| format!("{name} {suffix}"),
        ))
    }

    /// Typed parse of the date component. `None` when the component is
    /// absent or not a `YYYY-MM-DD` date.
    #[must_use]
    pub fn observed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Both coordinates, when the record carries them.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// The record's value along a grouping dimension, as a string.
    /// `None` when the record has no value for that dimension (a record
    /// with no ward, for example).
    #[must_use]
    pub fn dimension_value(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::City => Some(self.city.clone()),
            Dimension::Ward => self.ward.clone(),
            Dimension::ViolationType => Some(self.violation_type.clone()),
            Dimension::Status => Some(self.status.to_string()),
        }
    }
}
