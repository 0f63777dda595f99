//! Sample table loading, pKa reformatting, and the registry/pKa merge.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use super::ScheduleError;

/// One sample bound for a schedule import file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    /// Sample identifier emitted on every instrument line
    pub sample_id: String,
    /// Preformatted pKa string, e.g. `"ACID,2.05,BASE,6.75"`
    pub pkas: String,
    /// Well position on the tray
    pub well: String,
    /// Molecular weight
    pub mw: String,
    /// Formula weight, required only by mass-dosing protocols
    pub fw: Option<String>,
    /// Sample mass in mg, required only by mass-dosing protocols
    pub mg: Option<String>,
}

/// Validated sample table consumed by the schedule generator.
#[derive(Debug, Default)]
pub struct ScheduleTable {
    rows: Vec<ScheduleRow>,
}

impl ScheduleTable {
    /// Load a merged sample/pKa CSV. Column headers are matched
    /// case-insensitively; a missing required column or any row with an
    /// empty pKa string is a hard error here, never a silent drop.
    pub fn from_csv<P: AsRef<Path>>(path: P, sample_id_col: &str) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let file_label = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let column = |name: &str| -> Result<usize, ScheduleError> {
            headers
                .iter()
                .position(|h| h == &name.to_lowercase())
                .ok_or_else(|| ScheduleError::MissingColumn {
                    column: name.to_string(),
                    file: file_label.clone(),
                })
        };

        let id_idx = column(sample_id_col)?;
        let pkas_idx = column("reformatted_pkas")?;
        let well_idx = column("well")?;
        let mw_idx = column("mw")?;
        let fw_idx = headers.iter().position(|h| h == "fw");
        let mg_idx = headers.iter().position(|h| h == "mg");

        let cell = |record: &csv::StringRecord, idx: usize| -> String {
            record.get(idx).unwrap_or_default().trim().to_string()
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(ScheduleRow {
                sample_id: cell(&record, id_idx),
                pkas: cell(&record, pkas_idx),
                well: cell(&record, well_idx),
                mw: cell(&record, mw_idx),
                fw: fw_idx.map(|i| cell(&record, i)).filter(|v| !v.is_empty()),
                mg: mg_idx.map(|i| cell(&record, i)).filter(|v| !v.is_empty()),
            });
        }
        Self::from_rows(rows)
    }

    /// Build a table from already-merged rows, enforcing the no-empty-pKas
    /// invariant.
    pub fn from_rows(rows: Vec<ScheduleRow>) -> Result<Self, ScheduleError> {
        let missing: Vec<String> = rows
            .iter()
            .filter(|row| row.pkas.is_empty())
            .map(|row| row.sample_id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ScheduleError::MissingPkas {
                count: missing.len(),
                samples: missing,
            });
        }
        Ok(Self { rows })
    }

    /// The validated rows, in input order.
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no samples.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contiguous tray-sized slices in input order; the last may be short.
    pub fn trays(&self, capacity: usize) -> impl Iterator<Item = &[ScheduleRow]> {
        self.rows.chunks(capacity)
    }
}

/// Convert long-format pKa rows (one row per pKa) into the short format
/// (one `id → "TYPE,value,TYPE,value"` entry per compound).
///
/// Each compound's pKas are sorted ascending by value regardless of input
/// row order; values are re-emitted as given in the input. Output entries
/// are ordered by compound id.
pub fn convert_long_pkas(rows: Vec<(String, String, String)>) -> Vec<(String, String)> {
    let mut sortable: Vec<(String, String, String, f64)> = rows
        .into_iter()
        .map(|(id, pka_type, value)| {
            let key = value.parse::<f64>().unwrap_or(f64::INFINITY);
            (id, pka_type, value, key)
        })
        .collect();
    sortable.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.3.partial_cmp(&b.3).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut result: Vec<(String, String)> = Vec::new();
    for (id, pka_type, value, _) in sortable {
        let pair = format!("{},{}", pka_type.to_uppercase(), value);
        match result.last_mut() {
            Some((last_id, pkas)) if *last_id == id => {
                pkas.push(',');
                pkas.push_str(&pair);
            }
            _ => result.push((id, pair)),
        }
    }
    result
}

/// Load a pKa CSV in either format into `id → formatted-pKa-string` pairs.
///
/// A `reformatted_pkas` column means the short format is used as-is;
/// otherwise `pka_type`/`pka_value` columns are expected and converted via
/// [`convert_long_pkas`].
pub fn load_pka_table<P: AsRef<Path>>(
    path: P,
    id_col: &str,
) -> Result<Vec<(String, String)>, ScheduleError> {
    let path = path.as_ref();
    let file_label = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let find = |name: &str| headers.iter().position(|h| h == &name.to_lowercase());
    let id_idx = find(id_col).ok_or_else(|| ScheduleError::MissingColumn {
        column: id_col.to_string(),
        file: file_label.clone(),
    })?;

    if let Some(pkas_idx) = find("reformatted_pkas") {
        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record?;
            pairs.push((
                record.get(id_idx).unwrap_or_default().trim().to_string(),
                record.get(pkas_idx).unwrap_or_default().trim().to_string(),
            ));
        }
        return Ok(pairs);
    }

    let type_idx = find("pka_type").ok_or_else(|| ScheduleError::MissingColumn {
        column: "pka_type".to_string(),
        file: file_label.clone(),
    })?;
    let value_idx = find("pka_value").ok_or_else(|| ScheduleError::MissingColumn {
        column: "pka_value".to_string(),
        file: file_label.clone(),
    })?;

    let mut long_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        long_rows.push((
            record.get(id_idx).unwrap_or_default().trim().to_string(),
            record.get(type_idx).unwrap_or_default().trim().to_string(),
            record.get(value_idx).unwrap_or_default().trim().to_string(),
        ));
    }
    Ok(convert_long_pkas(long_rows))
}

/// Options for [`merge_registry_pkas`].
#[derive(Debug, Clone)]
pub struct MergeOptions<'a> {
    /// Registry column joined against the pKa table (default `ID`)
    pub registry_id_col: &'a str,
    /// pKa table column holding compound ids (default `vendor_id`)
    pub pka_id_col: &'a str,
    /// Optional file restricting which registry samples are scheduled
    pub filter_file: Option<&'a Path>,
}

impl Default for MergeOptions<'_> {
    fn default() -> Self {
        Self {
            registry_id_col: "ID",
            pka_id_col: "vendor_id",
            filter_file: None,
        }
    }
}

/// Left-join a sample registry CSV to a pKa CSV.
///
/// The registry requires `ID` (or the configured id column),
/// `Registry Number`, `Batch Name`, `Well` and `MW` columns;
/// `batch_sample = "{Registry Number}-{Batch Name}"` is derived when absent.
/// Registry rows with no matching pKa entry are logged and dropped here —
/// this merge is the correct point for missing data, in contrast to
/// [`ScheduleTable`] loading which treats it as fatal.
pub fn merge_registry_pkas<P: AsRef<Path>, Q: AsRef<Path>>(
    registry_csv: P,
    pka_csv: Q,
    options: &MergeOptions<'_>,
) -> Result<ScheduleTable, ScheduleError> {
    let registry_path = registry_csv.as_ref();
    let file_label = registry_path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(registry_path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| -> Result<usize, ScheduleError> {
        headers
            .iter()
            .position(|h| h == &name.to_lowercase())
            .ok_or_else(|| ScheduleError::MissingColumn {
                column: name.to_string(),
                file: file_label.clone(),
            })
    };

    let id_idx = column(options.registry_id_col)?;
    let registry_number_idx = column("Registry Number")?;
    let batch_name_idx = column("Batch Name")?;
    let well_idx = column("Well")?;
    let mw_idx = column("MW")?;
    let batch_sample_idx = headers.iter().position(|h| h == "batch_sample");
    let fw_idx = headers.iter().position(|h| h == "fw");
    let mg_idx = headers.iter().position(|h| h == "mg");

    let pka_map: HashMap<String, String> = load_pka_table(pka_csv, options.pka_id_col)?
        .into_iter()
        .collect();
    let filter = options
        .filter_file
        .map(load_filter_ids)
        .transpose()?;

    let cell = |record: &csv::StringRecord, idx: usize| -> String {
        record.get(idx).unwrap_or_default().trim().to_string()
    };

    let mut rows = Vec::new();
    let mut dropped = Vec::new();
    for record in reader.records() {
        let record = record?;
        let id = cell(&record, id_idx);
        if let Some(keep) = &filter {
            if !keep.contains(&id) {
                continue;
            }
        }
        let Some(pkas) = pka_map.get(&id).filter(|p| !p.is_empty()) else {
            dropped.push(id);
            continue;
        };
        let sample_id = match batch_sample_idx {
            Some(idx) => cell(&record, idx),
            None => format!(
                "{}-{}",
                cell(&record, registry_number_idx),
                cell(&record, batch_name_idx)
            ),
        };
        rows.push(ScheduleRow {
            sample_id,
            pkas: pkas.clone(),
            well: cell(&record, well_idx),
            mw: cell(&record, mw_idx),
            fw: fw_idx.map(|i| cell(&record, i)).filter(|v| !v.is_empty()),
            mg: mg_idx.map(|i| cell(&record, i)).filter(|v| !v.is_empty()),
        });
    }

    if !dropped.is_empty() {
        warn!(
            "{} rows have missing pKa data and will be dropped: {dropped:?}",
            dropped.len()
        );
    }
    ScheduleTable::from_rows(rows)
}

/// Read sample ids from a filter file: the first CSV column, one id per
/// line, header-less.
fn load_filter_ids(path: &Path) -> Result<HashSet<String>, ScheduleError> {
    let file = File::open(path)?;
    let mut ids = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let id = line.split(',').next().unwrap_or_default().trim();
        if !id.is_empty() {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pkas_sort_ascending_by_value() {
        let rows = vec![
            ("cpd1".to_string(), "base".to_string(), "6.75".to_string()),
            ("cpd1".to_string(), "acid".to_string(), "2.05".to_string()),
        ];
        let converted = convert_long_pkas(rows);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].0, "cpd1");
        assert_eq!(converted[0].1, "ACID,2.05,BASE,6.75");
    }

    #[test]
    fn long_pkas_group_by_compound() {
        let rows = vec![
            ("cpd2".to_string(), "acid".to_string(), "4.1".to_string()),
            ("cpd1".to_string(), "base".to_string(), "9.3".to_string()),
            ("cpd2".to_string(), "base".to_string(), "8.0".to_string()),
        ];
        let converted = convert_long_pkas(rows);
        assert_eq!(
            converted,
            vec![
                ("cpd1".to_string(), "BASE,9.3".to_string()),
                ("cpd2".to_string(), "ACID,4.1,BASE,8.0".to_string()),
            ]
        );
    }

    #[test]
    fn empty_pkas_fail_table_validation() {
        let rows = vec![
            ScheduleRow {
                sample_id: "s1".to_string(),
                pkas: "BASE,8.1".to_string(),
                well: "A1".to_string(),
                mw: "321.4".to_string(),
                fw: None,
                mg: None,
            },
            ScheduleRow {
                sample_id: "s2".to_string(),
                pkas: String::new(),
                well: "A2".to_string(),
                mw: "290.1".to_string(),
                fw: None,
                mg: None,
            },
        ];
        let err = ScheduleTable::from_rows(rows).unwrap_err();
        match err {
            ScheduleError::MissingPkas { count, samples } => {
                assert_eq!(count, 1);
                assert_eq!(samples, vec!["s2".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trays_partition_in_order() {
        let rows: Vec<ScheduleRow> = (0..10)
            .map(|i| ScheduleRow {
                sample_id: format!("s{i}"),
                pkas: "ACID,4.5".to_string(),
                well: format!("A{i}"),
                mw: "100".to_string(),
                fw: None,
                mg: None,
            })
            .collect();
        let table = ScheduleTable::from_rows(rows).unwrap();
        let trays: Vec<&[ScheduleRow]> = table.trays(4).collect();
        assert_eq!(trays.len(), 3);
        assert_eq!(trays[0].len(), 4);
        assert_eq!(trays[2].len(), 2);
        let flattened: Vec<&str> = trays
            .iter()
            .flat_map(|t| t.iter().map(|r| r.sample_id.as_str()))
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        assert_eq!(flattened, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
