#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion and cleaning for the raw building-violation table.
//!
//! Raw rows arrive as column-name to value mappings (the source is a
//! delimited table with a fixed 22-column header, case number as key).
//! [`load`] turns them into a cleaned, indexed [`Dataset`]: rows that
//! fail to parse are logged and skipped, rows that fail the cleaning
//! policy are dropped, and everything that survives is stored in input
//! order. Row-level defects never abort a load; only input-level defects
//! (an unreadable or empty header) surface as errors, and only from the
//! CSV adapter.

pub mod parsing;

use std::collections::BTreeMap;
use std::io::Read;

use thiserror::Error;
use violation_map_dataset::Dataset;
use violation_map_violation_models::{ViolationRecord, ViolationStatus};

use crate::parsing::{parse_coordinate, parse_location, split_date_time, title_case_suffix};

/// Column names of the raw source table.
pub mod columns {
    /// Unique case number, the table's key column.
    pub const CASE_NUMBER: &str = "Case Number";
    /// Raw timestamp, date and time-of-day separated by a space.
    pub const DATE_TIME: &str = "Date/Time";
    /// Inspection status.
    pub const STATUS: &str = "Status";
    /// Violation code.
    pub const CODE: &str = "Code";
    /// Source "Value" field.
    pub const VALUE: &str = "Value";
    /// Free-text violation category.
    pub const VIOLATION_TYPE: &str = "Violation Type";
    /// Street number of the violating property.
    pub const STREET_NUMBER: &str = "violation_stno";
    /// High end of the street-number range.
    pub const STREET_NUMBER_HIGH: &str = "violation_sthigh";
    /// Street name.
    pub const STREET_NAME: &str = "Street Name";
    /// Street suffix ("ST", "AVE", ...).
    pub const STREET_SUFFIX: &str = "Street Suffix";
    /// City or region.
    pub const CITY: &str = "City";
    /// State abbreviation.
    pub const STATE: &str = "State";
    /// Zip code.
    pub const ZIP: &str = "Zip Code";
    /// Municipal ward.
    pub const WARD: &str = "Ward";
    /// Contact mailing address.
    pub const CONTACT_ADDRESS: &str = "Contact Address";
    /// Second contact address line.
    pub const SECOND_CONTACT_ADDRESS: &str = "Second Contact Address";
    /// Contact city.
    pub const CONTACT_CITY: &str = "Contact City";
    /// Contact state.
    pub const CONTACT_STATE: &str = "Contact State";
    /// Contact zip code.
    pub const CONTACT_ZIP: &str = "Contact Zip";
    /// External SAM identifier.
    pub const SAM_ID: &str = "sam_id";
    /// Latitude column.
    pub const LATITUDE: &str = "Latitude";
    /// Longitude column.
    pub const LONGITUDE: &str = "Longitude";
    /// Raw location string, "(latitude, longitude)".
    pub const LOCATION: &str = "Location";
}

/// One raw row: column name to raw string value. Empty values mean the
/// cell was blank in the source.
pub type RawRow = BTreeMap<String, String>;

/// A raw row that cannot become a record at all (no case-number key).
///
/// Row-level and non-fatal: [`load`] logs it and continues with the next
/// row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row has no case number")]
pub struct MalformedRecordError;

/// Input-level defects in the raw table. Unlike row-level defects these
/// abort the load, because nothing meaningful can be read at all.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The CSV source could not be read or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row is empty (zero columns present).
    #[error("source table has an empty header")]
    EmptyHeader,

    /// The header lacks a required column.
    #[error("source table is missing the {column:?} column")]
    MissingColumn {
        /// The absent column name.
        column: &'static str,
    },
}

/// Builds a cleaned, indexed dataset from already-parsed raw rows.
///
/// Per row: parse, apply the cleaning policy (drop rows missing a
/// violation type, rows whose violation type is the literal placeholder
/// ".", rows missing a city, and rows missing a status), title-case the
/// street suffix, and split the raw timestamp into date and time
/// components. Surviving records keep their input order.
///
/// Row-level defects are absorbed: malformed rows are logged and
/// skipped, never fatal.
pub fn load<I>(rows: I) -> Dataset
where
    I: IntoIterator<Item = RawRow>,
{
    let mut records: Vec<ViolationRecord> = Vec::new();
    let mut malformed: u64 = 0;
    let mut dropped: u64 = 0;

    for (index, row) in rows.into_iter().enumerate() {
        match parse_record(&row) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => dropped += 1,
            Err(e) => {
                log::warn!("Skipping row {index}: {e}");
                malformed += 1;
            }
        }
    }

    log::info!(
        "Loaded {} records ({dropped} dropped by cleaning, {malformed} malformed)",
        records.len()
    );

    Dataset::new(records)
}

/// Reads raw rows from a CSV source supplied by the caller.
///
/// Only input-level defects are fatal: an unreadable header, an empty
/// header, or a header without the case-number column. Once the header
/// is validated, a defective data row (ragged field count, bad
/// encoding) is logged and skipped like every other row-level defect,
/// so one bad record never costs the rest of the file.
///
/// # Errors
///
/// Returns [`IngestError`] when the header cannot be read or is
/// defective.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(IngestError::EmptyHeader);
    }
    if !headers.iter().any(|name| name == columns::CASE_NUMBER) {
        return Err(IngestError::MissingColumn {
            column: columns::CASE_NUMBER,
        });
    }

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        match result {
            Ok(record) => {
                let row: RawRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                rows.push(row);
            }
            Err(e) => log::warn!("Skipping unreadable row {index}: {e}"),
        }
    }

    Ok(rows)
}

/// Reads a CSV source and loads it in one step.
///
/// # Errors
///
/// Returns [`IngestError`] on input-level defects; row-level defects are
/// absorbed as in [`load`].
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset, IngestError> {
    Ok(load(read_rows(reader)?))
}

/// A non-empty field value, `None` when the column is absent or blank.
fn field<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Parses one raw row. `Ok(None)` means the row was dropped by the
/// cleaning policy; `Err` means it could not become a record at all.
fn parse_record(row: &RawRow) -> Result<Option<ViolationRecord>, MalformedRecordError> {
    let Some(case_number) = field(row, columns::CASE_NUMBER) else {
        return Err(MalformedRecordError);
    };

    let violation_type = match field(row, columns::VIOLATION_TYPE) {
        Some(value) if value != "." => value.to_string(),
        _ => {
            log::debug!("Dropping case {case_number}: missing or placeholder violation type");
            return Ok(None);
        }
    };
    let Some(city) = field(row, columns::CITY) else {
        log::debug!("Dropping case {case_number}: missing city");
        return Ok(None);
    };
    let Some(status) = field(row, columns::STATUS) else {
        log::debug!("Dropping case {case_number}: missing status");
        return Ok(None);
    };

    let (date, time) = split_date_time(field(row, columns::DATE_TIME).unwrap_or_default());

    // Unparseable numerics stay None; zero is a valid coordinate and is
    // preserved. The raw location string is the fallback when both
    // coordinate columns are blank.
    let mut latitude = field(row, columns::LATITUDE).and_then(parse_coordinate);
    let mut longitude = field(row, columns::LONGITUDE).and_then(parse_coordinate);
    if latitude.is_none()
        && longitude.is_none()
        && let Some((lat, lng)) = field(row, columns::LOCATION).and_then(parse_location)
    {
        latitude = Some(lat);
        longitude = Some(lng);
    }

    Ok(Some(ViolationRecord {
        case_number: case_number.to_string(),
        date,
        time,
        status: ViolationStatus::from_raw(status),
        code: field(row, columns::CODE).map(str::to_string),
        value: field(row, columns::VALUE).map(str::to_string),
        violation_type,
        street_number: field(row, columns::STREET_NUMBER).map(str::to_string),
        street_number_high: field(row, columns::STREET_NUMBER_HIGH).map(str::to_string),
        street_name: field(row, columns::STREET_NAME).map(str::to_string),
        street_suffix: field(row, columns::STREET_SUFFIX).map(title_case_suffix),
        city: city.to_string(),
        state: field(row, columns::STATE).map(str::to_string),
        zip: field(row, columns::ZIP).map(str::to_string),
        ward: field(row, columns::WARD).map(str::to_string),
        contact_address: field(row, columns::CONTACT_ADDRESS).map(str::to_string),
        second_contact_address: field(row, columns::SECOND_CONTACT_ADDRESS).map(str::to_string),
        contact_city: field(row, columns::CONTACT_CITY).map(str::to_string),
        contact_state: field(row, columns::CONTACT_STATE).map(str::to_string),
        contact_zip: field(row, columns::CONTACT_ZIP).map(str::to_string),
        sam_id: field(row, columns::SAM_ID).map(str::to_string),
        latitude,
        longitude,
        location: field(row, columns::LOCATION).map(str::to_string),
    }))
}
