//! Tabular persistence of model series
//!
//! A run is stored as three whitespace-separated text tables without a
//! header, one row per timestep:
//!
//! | file         | columns                                   |
//! |--------------|-------------------------------------------|
//! | `box1.out`   | `Ta Ts To Ft Fs Feva MSE` (tropics)       |
//! | `box2.out`   | `Ta Ts To Ft Fs Feva MSE` (extra-tropics) |
//! | `global.out` | `time Fa Fo Psia Psio MTspt CO2`          |
//!
//! Column order is positional and downstream tools depend on it.
//! Values are written in shortest round-trip scientific notation so a reload
//! reproduces the in-memory series exactly, including NaN and infinities.

use crate::errors::{TwoBoxError, TwoBoxResult};
use crate::state::{BoxState, GlobalState, Region, BOX_COLUMNS, GLOBAL_COLUMNS};
use crate::timeseries::{FloatValue, Series};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the global table.
pub const GLOBAL_FILE: &str = "global.out";

/// Path of the table holding a box.
pub fn box_path(dir: &Path, region: Region) -> PathBuf {
    dir.join(format!("{}.out", region.file_stem()))
}

/// Path of the global table.
pub fn global_path(dir: &Path) -> PathBuf {
    dir.join(GLOBAL_FILE)
}

/// Write the first `rows` entries of each series as a table.
pub fn write_table(path: &Path, columns: &[&Series], rows: usize) -> TwoBoxResult<()> {
    for (i, series) in columns.iter().enumerate() {
        if series.len() < rows {
            return Err(TwoBoxError::LengthMismatch {
                name: format!("{} column {}", path.display(), i),
                expected: rows,
                actual: series.len(),
            });
        }
    }

    let table_error = |source| TwoBoxError::Table {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)
        .map_err(table_error)?;

    for row in 0..rows {
        writer
            .write_record(columns.iter().map(|series| format!("{:e}", series[row])))
            .map_err(table_error)?;
    }
    writer.flush().map_err(|source| TwoBoxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read a table with exactly `n_columns` columns.
pub fn read_table(path: &Path, n_columns: usize) -> TwoBoxResult<Vec<Series>> {
    let table_error = |source| TwoBoxError::Table {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(table_error)?;

    let mut values: Vec<Vec<FloatValue>> = vec![Vec::new(); n_columns];
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(table_error)?;
        // Runs of spaces split into empty fields
        let fields: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();
        if fields.len() != n_columns {
            return Err(TwoBoxError::Error(format!(
                "'{}' row {} has {} columns, expected {}",
                path.display(),
                row,
                fields.len(),
                n_columns
            )));
        }
        for (column, field) in fields.into_iter().enumerate() {
            let value = field
                .parse::<FloatValue>()
                .map_err(|_| TwoBoxError::InvalidValue {
                    path: path.to_path_buf(),
                    row,
                    column,
                    value: field.to_string(),
                })?;
            values[column].push(value);
        }
    }
    Ok(values.into_iter().map(Series::from_vec).collect())
}

/// Persist the completed prefix (`rows` timesteps) of a run into `dir`.
///
/// The directory is created when missing.
pub fn save(
    dir: &Path,
    rows: usize,
    tropics: &BoxState,
    extratropics: &BoxState,
    global: &GlobalState,
) -> TwoBoxResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| TwoBoxError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for state in [tropics, extratropics] {
        write_table(&box_path(dir, state.region), &state.columns(), rows)?;
    }
    write_table(&global_path(dir), &global.columns(), rows)?;

    debug!(directory = %dir.display(), rows, "Saved time series");
    Ok(())
}

/// A run reloaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRun {
    pub tropics: BoxState,
    pub extratropics: BoxState,
    pub global: GlobalState,
}

impl SavedRun {
    pub fn box_state(&self, region: Region) -> &BoxState {
        match region {
            Region::Tropics => &self.tropics,
            Region::ExtraTropics => &self.extratropics,
        }
    }

    /// Number of persisted timesteps.
    pub fn len(&self) -> usize {
        self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }
}

fn into_columns(path: &Path, columns: Vec<Series>) -> TwoBoxResult<[Series; 7]> {
    let found = columns.len();
    columns.try_into().map_err(|_| {
        TwoBoxError::Error(format!(
            "'{}' has {} columns, expected 7",
            path.display(),
            found
        ))
    })
}

/// Load a run saved by [`save`].
///
/// Emission temperatures are not persisted and are supplied by the caller,
/// tropics first. All three tables must have the same number of rows.
pub fn load(dir: &Path, te: [FloatValue; 2]) -> TwoBoxResult<SavedRun> {
    let mut boxes = Vec::with_capacity(2);
    for region in Region::ALL {
        let path = box_path(dir, region);
        let columns = into_columns(&path, read_table(&path, BOX_COLUMNS.len())?)?;
        boxes.push(BoxState::from_columns(region, te[region.index()], columns)?);
    }
    let path = global_path(dir);
    let global = GlobalState::from_columns(into_columns(
        &path,
        read_table(&path, GLOBAL_COLUMNS.len())?,
    )?)?;

    for state in &boxes {
        if state.len() != global.len() {
            return Err(TwoBoxError::LengthMismatch {
                name: box_path(dir, state.region).display().to_string(),
                expected: global.len(),
                actual: state.len(),
            });
        }
    }

    let extratropics = boxes.pop();
    let tropics = boxes.pop();
    match (tropics, extratropics) {
        (Some(tropics), Some(extratropics)) => Ok(SavedRun {
            tropics,
            extratropics,
            global,
        }),
        _ => Err(TwoBoxError::Error("Both boxes must be loaded".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_run() -> (BoxState, BoxState, GlobalState) {
        let mut tropics = BoxState::new(Region::Tropics, 267.7, 3);
        let mut extratropics = BoxState::new(Region::ExtraTropics, 239.7, 3);
        let global = GlobalState::new(3, 86400.0, array![280.0, 290.0, 300.0, 310.0]).unwrap();

        tropics.ta = array![260.0, 259.617_827_362_831_63, 259.250_746_109_055_3, 258.9];
        tropics.fs = array![-90.833_044_082_318_34, -89.1, 0.1 + 0.2, FloatValue::NAN];
        extratropics.ts = array![280.0, 1.0e-300, FloatValue::INFINITY, -0.0];
        (tropics, extratropics, global)
    }

    #[test]
    fn test_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let (tropics, extratropics, global) = sample_run();

        save(dir.path(), 4, &tropics, &extratropics, &global).unwrap();
        let run = load(dir.path(), [267.7, 239.7]).unwrap();

        assert_eq!(run.len(), 4);
        assert_eq!(run.tropics.ta, tropics.ta);
        assert_eq!(run.extratropics.ts, extratropics.ts);
        assert_eq!(run.global, global);
        assert_eq!(run.tropics.fs[2], 0.1 + 0.2);
        assert!(run.tropics.fs[3].is_nan());
    }

    #[test]
    fn test_save_prefix_and_create_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("control");
        let (tropics, extratropics, global) = sample_run();

        save(&nested, 2, &tropics, &extratropics, &global).unwrap();
        let run = load(&nested, [267.7, 239.7]).unwrap();

        assert_eq!(run.len(), 2);
        assert_eq!(run.global.co2, array![280.0, 290.0]);
        assert_eq!(run.tropics.te, 267.7);
    }

    #[test]
    fn test_save_beyond_series_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (tropics, extratropics, global) = sample_run();

        let result = save(dir.path(), 5, &tropics, &extratropics, &global);
        assert!(matches!(result, Err(TwoBoxError::LengthMismatch { .. })));
    }

    #[test]
    fn test_reads_padded_scientific_notation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.out");
        std::fs::write(
            &path,
            "2.600000000000000000e+02 3.000000000000000000e+02\nnan -inf\n",
        )
        .unwrap();

        let columns = read_table(&path, 2).unwrap();
        assert_eq!(columns[0][0], 260.0);
        assert_eq!(columns[1][0], 300.0);
        assert!(columns[0][1].is_nan());
        assert_eq!(columns[1][1], FloatValue::NEG_INFINITY);
    }

    #[test]
    fn test_reads_repeated_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.out");
        std::fs::write(&path, "1.0  2.0\n  3.0 4.0  \n5.0   6.0\n").unwrap();

        let columns = read_table(&path, 2).unwrap();
        assert_eq!(columns[0].to_vec(), vec![1.0, 3.0, 5.0]);
        assert_eq!(columns[1].to_vec(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_short_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.out");
        std::fs::write(&path, "1.0 2.0\n3.0\n").unwrap();

        assert!(matches!(read_table(&path, 2), Err(TwoBoxError::Error(_))));
    }

    #[test]
    fn test_invalid_value_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.out");
        std::fs::write(&path, "1.0 2.0\n3.0 warm\n").unwrap();

        let err = read_table(&path, 2).unwrap_err();
        assert!(matches!(
            err,
            TwoBoxError::InvalidValue {
                row: 1,
                column: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatched_tables_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (tropics, extratropics, global) = sample_run();
        save(dir.path(), 4, &tropics, &extratropics, &global).unwrap();

        // Truncate the extra-tropical table
        let path = box_path(dir.path(), Region::ExtraTropics);
        write_table(&path, &extratropics.columns(), 3).unwrap();

        let err = load(dir.path(), [267.7, 239.7]).unwrap_err();
        assert!(matches!(
            err,
            TwoBoxError::LengthMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path(), [267.7, 239.7]).unwrap_err();
        assert!(matches!(err, TwoBoxError::Table { .. }));
    }
}
