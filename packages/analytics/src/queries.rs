//! The query functions: filters, status splits, frequency statistics,
//! grouped tables, and multi-entity comparisons.

use std::collections::HashMap;

use violation_map_analytics_models::{
    ComparisonRow, FrequencyExtremes, StatusCounts, TypeCount, TypeStatusRow,
};
use violation_map_dataset::Dataset;
use violation_map_violation_models::{Dimension, ViolationRecord};

use crate::{QueryError, ZeroPopulationError};

/// Records whose value along `dimension` equals `value` exactly.
///
/// Matching is case-sensitive: city `"Boston"` matches only `"Boston"`.
#[must_use]
pub fn filter_by<'a>(
    dataset: &'a Dataset,
    dimension: Dimension,
    value: &str,
) -> Vec<&'a ViolationRecord> {
    dataset.by_dimension(dimension, value)
}

/// Total/open/closed split for a selection.
///
/// Statuses other than "Open" and "Closed" count toward the total only.
#[must_use]
pub fn status_counts(records: &[&ViolationRecord]) -> StatusCounts {
    let open = records.iter().filter(|r| r.status.is_open()).count() as u64;
    let closed = records.iter().filter(|r| r.status.is_closed()).count() as u64;
    StatusCounts {
        total: records.len() as u64,
        open,
        closed,
    }
}

/// Most and least frequent violation types in a selection.
///
/// Ties go to the type encountered first while counting, which makes the
/// result deterministic for a given input order.
///
/// # Errors
///
/// Returns [`QueryError::EmptyGroup`] when `records` is empty; check the
/// selection size first and present a "no data" state instead of calling
/// this.
pub fn frequency_extremes(
    records: &[&ViolationRecord],
) -> Result<FrequencyExtremes, QueryError> {
    let frequencies = type_frequencies(records);
    let Some(first) = frequencies.first().cloned() else {
        return Err(QueryError::EmptyGroup);
    };

    let (mut most, mut least) = (first.clone(), first);
    for (violation_type, count) in frequencies.into_iter().skip(1) {
        if count > most.1 {
            most = (violation_type.clone(), count);
        }
        if count < least.1 {
            least = (violation_type, count);
        }
    }

    Ok(FrequencyExtremes {
        most_frequent_type: most.0,
        most_frequent_count: most.1,
        least_frequent_type: least.0,
        least_frequent_count: least.1,
    })
}

/// Per-type open/closed breakdown, sorted by total descending and
/// truncated to `limit` rows (`None` = unlimited).
///
/// Both status columns always exist: a type with only open (or only
/// closed, or only other-status) records still reports both counts,
/// zero-filled where nothing matched. Ties on total keep the order the
/// types were first encountered.
#[must_use]
pub fn grouped_status_table(
    records: &[&ViolationRecord],
    limit: Option<usize>,
) -> Vec<TypeStatusRow> {
    let mut rows: Vec<TypeStatusRow> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let position = *positions
            .entry(record.violation_type.clone())
            .or_insert_with(|| {
                rows.push(TypeStatusRow {
                    violation_type: record.violation_type.clone(),
                    open: 0,
                    closed: 0,
                    total: 0,
                });
                rows.len() - 1
            });
        let row = &mut rows[position];
        row.total += 1;
        if record.status.is_open() {
            row.open += 1;
        } else if record.status.is_closed() {
            row.closed += 1;
        }
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

/// Ranked violation-type counts, descending, truncated to `limit` rows
/// (`None` = unlimited). Ties keep first-encounter order.
#[must_use]
pub fn type_counts(records: &[&ViolationRecord], limit: Option<usize>) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = type_frequencies(records)
        .into_iter()
        .map(|(violation_type, count)| TypeCount {
            violation_type,
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(limit) = limit {
        counts.truncate(limit);
    }
    counts
}

/// Per-entity comparison across a dimension.
///
/// Each inner result is one entity's summary row; an entity that matches
/// zero records yields a [`ZeroPopulationError`] in its slot so the
/// caller can choose to skip the row or abort the comparison. Rows come
/// back in the order the values were supplied.
///
/// # Errors
///
/// Returns [`QueryError::InsufficientSelection`] when fewer than two
/// values are supplied.
pub fn compare_entities(
    dataset: &Dataset,
    dimension: Dimension,
    values: &[String],
) -> Result<Vec<Result<ComparisonRow, ZeroPopulationError>>, QueryError> {
    if values.len() < 2 {
        return Err(QueryError::InsufficientSelection {
            count: values.len(),
        });
    }

    Ok(values
        .iter()
        .map(|value| comparison_row(dataset, dimension, value))
        .collect())
}

fn comparison_row(
    dataset: &Dataset,
    dimension: Dimension,
    value: &str,
) -> Result<ComparisonRow, ZeroPopulationError> {
    let records = dataset.by_dimension(dimension, value);
    let counts = status_counts(&records);
    if counts.total == 0 {
        return Err(ZeroPopulationError {
            entity: value.to_string(),
        });
    }

    // Selection is non-empty at this point, so the extremes exist.
    let extremes = frequency_extremes(&records).map_err(|_| ZeroPopulationError {
        entity: value.to_string(),
    })?;

    Ok(ComparisonRow {
        entity: value.to_string(),
        total: counts.total,
        percent_open: whole_percent(counts.open, counts.total),
        percent_closed: whole_percent(counts.closed, counts.total),
        most_common_type: extremes.most_frequent_type,
        most_common_type_count: extremes.most_frequent_count,
    })
}

/// Records from the selection that carry both coordinates, in order.
#[must_use]
pub fn with_coordinates<'a>(records: &[&'a ViolationRecord]) -> Vec<&'a ViolationRecord> {
    records
        .iter()
        .filter(|r| r.coordinates().is_some())
        .copied()
        .collect()
}

/// Mean latitude/longitude of the coordinate-bearing records, for
/// centering a map view. `None` when no record carries coordinates.
#[must_use]
pub fn coordinate_center(records: &[&ViolationRecord]) -> Option<(f64, f64)> {
    let points: Vec<(f64, f64)> = records.iter().filter_map(|r| r.coordinates()).collect();
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), (la, ln)| (lat + la, lng + ln));
    Some((lat_sum / count, lng_sum / count))
}

/// Distinct street addresses in the selection, in first-encounter order.
/// Records without a street name are skipped.
#[must_use]
pub fn street_names(records: &[&ViolationRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        if let Some(address) = record.street_address() {
            if !names.contains(&address) {
                names.push(address);
            }
        }
    }
    names
}

/// Counts violation types in first-encounter order.
fn type_frequencies(records: &[&ViolationRecord]) -> Vec<(String, u64)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        let entry = counts.entry(record.violation_type.clone()).or_insert(0);
        if *entry == 0 {
            order.push(record.violation_type.clone());
        }
        *entry += 1;
    }
    order
        .into_iter()
        .map(|violation_type| {
            let count = counts.get(&violation_type).copied().unwrap_or_default();
            (violation_type, count)
        })
        .collect()
}

/// `part / total * 100`, rounded to the nearest whole number.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn whole_percent(part: u64, total: u64) -> u8 {
    ((part as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use violation_map_violation_models::ViolationStatus;

    fn record(case: &str, city: &str, status: &str, vtype: &str) -> ViolationRecord {
        ViolationRecord {
            case_number: case.to_string(),
            date: "2023-04-18".to_string(),
            time: "09:12:00".to_string(),
            status: ViolationStatus::from_raw(status),
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
            ward: None,
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

    fn refs(records: &[ViolationRecord]) -> Vec<&ViolationRecord> {
        records.iter().collect()
    }

    #[test]
    fn single_type_dataset_counts_and_extremes() {
        // 5 records, 3 open and 2 closed, all "Illegal Dumping".
        let records = vec![
            record("V1", "Boston", "Open", "Illegal Dumping"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Illegal Dumping"),
            record("V4", "Boston", "Closed", "Illegal Dumping"),
            record("V5", "Boston", "Closed", "Illegal Dumping"),
        ];
        let selection = refs(&records);

        let counts = status_counts(&selection);
        assert_eq!(
            counts,
            StatusCounts {
                total: 5,
                open: 3,
                closed: 2
            }
        );

        let extremes = frequency_extremes(&selection).unwrap();
        assert_eq!(extremes.most_frequent_type, "Illegal Dumping");
        assert_eq!(extremes.most_frequent_count, 5);
        assert_eq!(extremes.least_frequent_type, "Illegal Dumping");
        assert_eq!(extremes.least_frequent_count, 5);
    }

    #[test]
    fn other_statuses_count_toward_total_only() {
        let records = vec![
            record("V1", "Boston", "Open", "Unsafe Structure"),
            record("V2", "Boston", "VioLHrg", "Unsafe Structure"),
            record("V3", "Boston", "Closed", "Unsafe Structure"),
        ];
        let counts = status_counts(&refs(&records));
        assert_eq!(counts.total, 3);
        assert_eq!(counts.open, 1);
        assert_eq!(counts.closed, 1);
        assert!(counts.open + counts.closed <= counts.total);
    }

    #[test]
    fn frequency_extremes_rejects_empty_selection() {
        assert_eq!(
            frequency_extremes(&[]).unwrap_err(),
            QueryError::EmptyGroup
        );
    }

    #[test]
    fn frequency_ties_break_by_first_encounter() {
        let records = vec![
            record("V1", "Boston", "Open", "Unsafe Structure"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Unsafe Structure"),
            record("V4", "Boston", "Open", "Illegal Dumping"),
        ];
        let extremes = frequency_extremes(&refs(&records)).unwrap();
        // Both types count 2; "Unsafe Structure" was seen first.
        assert_eq!(extremes.most_frequent_type, "Unsafe Structure");
        assert_eq!(extremes.least_frequent_type, "Unsafe Structure");
        assert_eq!(extremes.most_frequent_count, 2);
        assert_eq!(extremes.least_frequent_count, 2);
    }

    #[test]
    fn frequency_extremes_is_deterministic() {
        let records = vec![
            record("V1", "Boston", "Open", "Failure To Obtain Permit"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Illegal Dumping"),
            record("V4", "Boston", "Open", "Unsafe Structure"),
        ];
        let selection = refs(&records);
        let first = frequency_extremes(&selection).unwrap();
        let second = frequency_extremes(&selection).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.most_frequent_type, "Illegal Dumping");
        assert_eq!(first.least_frequent_type, "Failure To Obtain Permit");
        assert_eq!(first.least_frequent_count, 1);
    }

    #[test]
    fn grouped_table_keeps_zero_columns() {
        // 4 open, 0 closed: the closed column is present and zero, not
        // omitted.
        let records = vec![
            record("V1", "Boston", "Open", "Illegal Dumping"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Illegal Dumping"),
            record("V4", "Boston", "Open", "Illegal Dumping"),
        ];
        let table = grouped_status_table(&refs(&records), None);
        assert_eq!(
            table,
            vec![TypeStatusRow {
                violation_type: "Illegal Dumping".to_string(),
                open: 4,
                closed: 0,
                total: 4
            }]
        );
    }

    #[test]
    fn grouped_table_zero_fills_when_no_status_is_open_or_closed() {
        // No record is "Open" or "Closed" anywhere: columns still exist,
        // zero-filled, and the row total still counts everything.
        let records = vec![
            record("V1", "Boston", "VioLHrg", "Illegal Dumping"),
            record("V2", "Boston", "VioLHrg", "Illegal Dumping"),
        ];
        let table = grouped_status_table(&refs(&records), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].open, 0);
        assert_eq!(table[0].closed, 0);
        assert_eq!(table[0].total, 2);
    }

    #[test]
    fn grouped_table_sorts_descending_and_limits() {
        let records = vec![
            record("V1", "Boston", "Open", "Unsafe Structure"),
            record("V2", "Boston", "Closed", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Illegal Dumping"),
            record("V4", "Boston", "Open", "Failure To Obtain Permit"),
            record("V5", "Boston", "Closed", "Illegal Dumping"),
        ];
        let selection = refs(&records);

        let table = grouped_status_table(&selection, None);
        assert_eq!(table[0].violation_type, "Illegal Dumping");
        assert_eq!(table[0].open, 1);
        assert_eq!(table[0].closed, 2);
        assert_eq!(table[0].total, 3);
        // The two singletons tie; first-encounter order holds.
        assert_eq!(table[1].violation_type, "Unsafe Structure");
        assert_eq!(table[2].violation_type, "Failure To Obtain Permit");

        let top_one = grouped_status_table(&selection, Some(1));
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].violation_type, "Illegal Dumping");
    }

    #[test]
    fn type_counts_ranks_and_limits() {
        let records = vec![
            record("V1", "Boston", "Open", "Unsafe Structure"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Open", "Illegal Dumping"),
            record("V4", "Boston", "Open", "Failure To Obtain Permit"),
        ];
        let selection = refs(&records);

        let ranked = type_counts(&selection, None);
        assert_eq!(ranked[0].violation_type, "Illegal Dumping");
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].violation_type, "Unsafe Structure");

        let top = type_counts(&selection, Some(2));
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn comparison_requires_two_entities() {
        let dataset = Dataset::new(vec![record("V1", "Boston", "Open", "Illegal Dumping")]);
        let result = compare_entities(&dataset, Dimension::City, &["Boston".to_string()]);
        assert_eq!(
            result.unwrap_err(),
            QueryError::InsufficientSelection { count: 1 }
        );
    }

    #[test]
    fn comparison_rows_have_bounded_percentages() {
        let dataset = Dataset::new(vec![
            record("V1", "Boston", "Open", "Illegal Dumping"),
            record("V2", "Boston", "Open", "Illegal Dumping"),
            record("V3", "Boston", "Closed", "Unsafe Structure"),
            record("V4", "Roxbury", "VioLHrg", "Illegal Dumping"),
        ]);
        let rows = compare_entities(
            &dataset,
            Dimension::City,
            &["Boston".to_string(), "Roxbury".to_string()],
        )
        .unwrap();

        let boston = rows[0].as_ref().unwrap();
        assert_eq!(boston.entity, "Boston");
        assert_eq!(boston.total, 3);
        assert_eq!(boston.percent_open, 67);
        assert_eq!(boston.percent_closed, 33);
        assert_eq!(boston.most_common_type, "Illegal Dumping");
        assert_eq!(boston.most_common_type_count, 2);

        let roxbury = rows[1].as_ref().unwrap();
        assert_eq!(roxbury.total, 1);
        assert_eq!(roxbury.percent_open, 0);
        assert_eq!(roxbury.percent_closed, 0);

        for row in rows.iter().flatten() {
            assert!(row.percent_open <= 100);
            assert!(row.percent_closed <= 100);
        }
    }

    #[test]
    fn comparison_reports_zero_population_per_row() {
        let dataset = Dataset::new(vec![record("V1", "Boston", "Open", "Illegal Dumping")]);
        let rows = compare_entities(
            &dataset,
            Dimension::City,
            &["Boston".to_string(), "Atlantis".to_string()],
        )
        .unwrap();

        assert!(rows[0].is_ok());
        let err = rows[1].as_ref().unwrap_err();
        assert_eq!(err.entity, "Atlantis");
    }

    #[test]
    fn filter_by_is_case_sensitive() {
        let dataset = Dataset::new(vec![record("V1", "Boston", "Open", "Illegal Dumping")]);
        assert_eq!(filter_by(&dataset, Dimension::City, "Boston").len(), 1);
        assert!(filter_by(&dataset, Dimension::City, "BOSTON").is_empty());
    }

    #[test]
    fn coordinate_helpers_skip_missing_points() {
        let mut with_point = record("V1", "Boston", "Open", "Illegal Dumping");
        with_point.latitude = Some(42.0);
        with_point.longitude = Some(-71.0);
        let mut zero_point = record("V2", "Boston", "Open", "Illegal Dumping");
        zero_point.latitude = Some(0.0);
        zero_point.longitude = Some(-71.0);
        let without_point = record("V3", "Boston", "Open", "Illegal Dumping");

        let records = vec![with_point, zero_point, without_point];
        let selection = refs(&records);

        // Zero is a valid coordinate, so both located records survive.
        let located = with_coordinates(&selection);
        assert_eq!(located.len(), 2);

        let (lat, lng) = coordinate_center(&selection).unwrap();
        assert!((lat - 21.0).abs() < f64::EPSILON);
        assert!((lng - -71.0).abs() < f64::EPSILON);

        assert!(coordinate_center(&refs(&records[2..])).is_none());
    }

    #[test]
    fn street_names_deduplicate_in_first_encounter_order() {
        let mut a = record("V1", "Boston", "Open", "Illegal Dumping");
        a.street_name = Some("Tremont".to_string());
        a.street_suffix = Some("St".to_string());
        let mut b = record("V2", "Boston", "Open", "Illegal Dumping");
        b.street_name = Some("Beacon".to_string());
        b.street_suffix = Some("St".to_string());
        let mut c = record("V3", "Boston", "Open", "Illegal Dumping");
        c.street_name = Some("Tremont".to_string());
        c.street_suffix = Some("St".to_string());
        let unnamed = record("V4", "Boston", "Open", "Illegal Dumping");

        let records = vec![a, b, c, unnamed];
        assert_eq!(
            street_names(&refs(&records)),
            vec!["Tremont St".to_string(), "Beacon St".to_string()]
        );
    }
}
