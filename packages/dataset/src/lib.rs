#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Immutable in-memory store for cleaned violation records.
//!
//! A [`Dataset`] is built once from the output of ingestion and never
//! changes afterwards. All query results are pure functions of the
//! dataset and the query parameters, so the same dataset can be read
//! from any number of threads with no locking.

use std::collections::{BTreeMap, HashMap};

use violation_map_violation_models::{Dimension, ViolationRecord};

/// The cleaned record collection plus grouping indices.
///
/// Records keep their original ingestion order. Secondary indices map a
/// dimension value to the positions of matching records, so exact-match
/// filters avoid a full scan for the indexed dimensions (city, ward,
/// violation type). Status is low-cardinality and is filtered by scan.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ViolationRecord>,
    by_case_number: HashMap<String, usize>,
    by_city: BTreeMap<String, Vec<usize>>,
    by_ward: BTreeMap<String, Vec<usize>>,
    by_violation_type: BTreeMap<String, Vec<usize>>,
}

impl Dataset {
    /// Builds a dataset from cleaned records, indexing them in order.
    #[must_use]
    pub fn new(records: Vec<ViolationRecord>) -> Self {
        let mut by_case_number = HashMap::with_capacity(records.len());
        let mut by_city: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_ward: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_violation_type: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (position, record) in records.iter().enumerate() {
            by_case_number.insert(record.case_number.clone(), position);
            by_city
                .entry(record.city.clone())
                .or_default()
                .push(position);
            if let Some(ward) = &record.ward {
                by_ward.entry(ward.clone()).or_default().push(position);
            }
            by_violation_type
                .entry(record.violation_type.clone())
                .or_default()
                .push(position);
        }

        Self {
            records,
            by_case_number,
            by_city,
            by_ward,
            by_violation_type,
        }
    }

    /// All records, in ingestion order.
    #[must_use]
    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    /// Total record count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the dataset holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks a record up by its case number (the primary key).
    #[must_use]
    pub fn get(&self, case_number: &str) -> Option<&ViolationRecord> {
        self.by_case_number
            .get(case_number)
            .map(|&position| &self.records[position])
    }

    /// Lazy, order-preserving filter over all records.
    pub fn records_where<P>(&self, predicate: P) -> impl Iterator<Item = &ViolationRecord>
    where
        P: Fn(&ViolationRecord) -> bool,
    {
        self.records.iter().filter(move |record| predicate(record))
    }

    /// Records whose value along `dimension` equals `value` exactly
    /// (case-sensitive), in ingestion order.
    ///
    /// City, ward, and violation type use the prebuilt indices; status
    /// falls back to a linear scan.
    #[must_use]
    pub fn by_dimension(&self, dimension: Dimension, value: &str) -> Vec<&ViolationRecord> {
        let index = match dimension {
            Dimension::City => &self.by_city,
            Dimension::Ward => &self.by_ward,
            Dimension::ViolationType => &self.by_violation_type,
            Dimension::Status => {
                return self
                    .records_where(|record| record.status.to_string() == value)
                    .collect();
            }
        };

        index.get(value).map_or_else(Vec::new, |positions| {
            positions.iter().map(|&p| &self.records[p]).collect()
        })
    }

    /// The sorted distinct values observed for a dimension, used to
    /// populate selection choices.
    ///
    /// Strings sort lexicographically. Ward is an integer-like category
    /// stored as text: when every observed ward parses as an integer the
    /// values sort numerically ("2" before "10"), otherwise the sort
    /// stays lexicographic.
    #[must_use]
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::City => self.by_city.keys().cloned().collect(),
            Dimension::ViolationType => self.by_violation_type.keys().cloned().collect(),
            Dimension::Ward => {
                let mut wards: Vec<String> = self.by_ward.keys().cloned().collect();
                sort_ward_values(&mut wards);
                wards
            }
            Dimension::Status => {
                let mut statuses: Vec<String> = Vec::new();
                for record in &self.records {
                    let status = record.status.to_string();
                    if !statuses.contains(&status) {
                        statuses.push(status);
                    }
                }
                statuses.sort();
                statuses
            }
        }
    }
}

/// Sorts ward values numerically when they all parse as integers, else
/// lexicographically.
fn sort_ward_values(wards: &mut [String]) {
    let numeric: Option<Vec<i64>> = wards.iter().map(|w| w.parse::<i64>().ok()).collect();
    if let Some(mut keyed) = numeric.map(|keys| {
        keys.into_iter()
            .zip(wards.iter().cloned())
            .collect::<Vec<_>>()
    }) {
        keyed.sort_by_key(|(key, _)| *key);
        for (slot, (_, ward)) in wards.iter_mut().zip(keyed) {
            *slot = ward;
        }
    } else {
        wards.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use violation_map_violation_models::ViolationStatus;

    fn record(case: &str, city: &str, ward: Option<&str>, vtype: &str) -> ViolationRecord {
        ViolationRecord {
            case_number: case.to_string(),
            date: "2023-04-18".to_string(),
            time: "09:12:00".to_string(),
            status: ViolationStatus::Open,
            code: None,
            value: None,
            violation_type: vtype.to_string(),
            street_number: None,
            street_number_high: None,
            street_name: None,
            street_suffix: None,
            city: city.to_string(),
            state: None,
            zip: None,
            ward: ward.map(str::to_string),
            contact_address: None,
            second_contact_address: None,
            contact_city: None,
            contact_state: None,
            contact_zip: None,
            sam_id: None,
            latitude: None,
            longitude: None,
            location: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("V1", "Boston", Some("2"), "Unsafe Structure"),
            record("V2", "Roxbury", Some("10"), "Illegal Dumping"),
            record("V3", "Boston", Some("2"), "Illegal Dumping"),
            record("V4", "Dorchester", None, "Unsafe Structure"),
        ])
    }

    #[test]
    fn get_finds_records_by_case_number() {
        let ds = dataset();
        assert_eq!(ds.get("V3").unwrap().city, "Boston");
        assert!(ds.get("V99").is_none());
    }

    #[test]
    fn by_dimension_is_exact_and_order_preserving() {
        let ds = dataset();
        let boston: Vec<&str> = ds
            .by_dimension(Dimension::City, "Boston")
            .iter()
            .map(|r| r.case_number.as_str())
            .collect();
        assert_eq!(boston, vec!["V1", "V3"]);
        assert!(ds.by_dimension(Dimension::City, "boston").is_empty());
    }

    #[test]
    fn by_dimension_scans_status() {
        let ds = dataset();
        assert_eq!(ds.by_dimension(Dimension::Status, "Open").len(), 4);
        assert!(ds.by_dimension(Dimension::Status, "Closed").is_empty());
    }

    #[test]
    fn distinct_cities_sort_lexicographically() {
        let ds = dataset();
        assert_eq!(
            ds.distinct_values(Dimension::City),
            vec!["Boston", "Dorchester", "Roxbury"]
        );
    }

    #[test]
    fn distinct_wards_sort_numerically_when_all_integer() {
        let ds = dataset();
        assert_eq!(ds.distinct_values(Dimension::Ward), vec!["2", "10"]);
    }

    #[test]
    fn distinct_wards_fall_back_to_lexicographic() {
        let ds = Dataset::new(vec![
            record("V1", "Boston", Some("10"), "Unsafe Structure"),
            record("V2", "Boston", Some("2A"), "Unsafe Structure"),
        ]);
        assert_eq!(ds.distinct_values(Dimension::Ward), vec!["10", "2A"]);
    }

    #[test]
    fn records_where_preserves_order() {
        let ds = dataset();
        let dumping: Vec<&str> = ds
            .records_where(|r| r.violation_type == "Illegal Dumping")
            .map(|r| r.case_number.as_str())
            .collect();
        assert_eq!(dumping, vec!["V2", "V3"]);
    }

    #[test]
    fn empty_dataset_reports_empty() {
        let ds = Dataset::new(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.len(), 0);
        assert!(ds.distinct_values(Dimension::City).is_empty());
    }
}
