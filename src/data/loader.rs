use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int32Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;

use super::model::{Domain, EnrolmentRecord, FieldValue, NaplanResultRecord, RecurrentIncomeRecord};
use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Supported on-disk layouts of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Preferred first.
    pub const SEARCH_ORDER: [TableFormat; 2] = [TableFormat::Csv, TableFormat::Parquet];

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }

    /// Dispatch by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "parquet" | "pq" => Ok(TableFormat::Parquet),
            _ => Err(StoreError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Find `<name>.csv` or `<name>.parquet` inside `dir`.
pub fn locate_table(dir: &Path, name: &str) -> Result<PathBuf> {
    TableFormat::SEARCH_ORDER
        .iter()
        .map(|format| dir.join(format!("{name}.{}", format.extension())))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| StoreError::MissingFile {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        })
}

pub fn load_naplan_results(path: &Path) -> Result<Vec<NaplanResultRecord>> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_typed_csv(path, &NaplanResultRecord::COLUMNS),
        TableFormat::Parquet => {
            let mut rows = Vec::new();
            for (offset, batch) in read_parquet(path, &NaplanResultRecord::COLUMNS)?.1 {
                let schools = string_column(&batch, path, "school_name", offset)?;
                let domains = string_column(&batch, path, "domain", offset)?;
                let years = int_column(&batch, path, "results_year", offset)?;
                let levels = string_column(&batch, path, "year_level", offset)?;
                let avgs = float_column(&batch, path, "avg", offset)?;

                for (i, school_name) in schools.into_iter().enumerate() {
                    let domain = domains[i].parse::<Domain>().map_err(|e| StoreError::InvalidValue {
                        path: path.to_path_buf(),
                        row: offset + i + 1,
                        column: "domain".to_string(),
                        message: format!("{e}"),
                    })?;
                    rows.push(NaplanResultRecord {
                        school_name,
                        domain,
                        results_year: years[i],
                        year_level: levels[i].clone(),
                        avg: avgs[i],
                    });
                }
            }
            Ok(rows)
        }
    }
}

pub fn load_recurrent_income(path: &Path) -> Result<Vec<RecurrentIncomeRecord>> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_typed_csv(path, &RecurrentIncomeRecord::COLUMNS),
        TableFormat::Parquet => {
            let mut rows = Vec::new();
            for (offset, batch) in read_parquet(path, &RecurrentIncomeRecord::COLUMNS)?.1 {
                let schools = string_column(&batch, path, "school_name", offset)?;
                let years = int_column(&batch, path, "year", offset)?;
                let sources = string_column(&batch, path, "Net recurrent income", offset)?;
                let amounts = float_column(&batch, path, "$ per student", offset)?;

                for (i, school_name) in schools.into_iter().enumerate() {
                    rows.push(RecurrentIncomeRecord {
                        school_name,
                        year: years[i],
                        income_source: sources[i].clone(),
                        per_student: amounts[i],
                    });
                }
            }
            Ok(rows)
        }
    }
}

/// Enrolments only require `school_name`; an optional `year` column is
/// parsed, and every other column is kept as a [`FieldValue`].
pub fn load_enrolments(path: &Path) -> Result<Vec<EnrolmentRecord>> {
    let (headers, cells) = match TableFormat::from_path(path)? {
        TableFormat::Csv => read_raw_csv(path)?,
        TableFormat::Parquet => read_raw_parquet(path)?,
    };

    let school_idx = headers
        .iter()
        .position(|h| h == "school_name")
        .ok_or_else(|| missing_column(path, "school_name"))?;
    let year_idx = headers.iter().position(|h| h == "year");

    let mut rows = Vec::with_capacity(cells.len());
    for (row_no, row) in cells.into_iter().enumerate() {
        let year = match year_idx.map(|i| row[i].trim()) {
            None | Some("") => None,
            Some(raw) => Some(parse_year(raw).ok_or_else(|| StoreError::InvalidValue {
                path: path.to_path_buf(),
                row: row_no + 1,
                column: "year".to_string(),
                message: format!("'{raw}' is not a year"),
            })?),
        };

        let mut fields = BTreeMap::new();
        for (col_idx, value) in row.iter().enumerate() {
            if col_idx == school_idx || Some(col_idx) == year_idx {
                continue;
            }
            fields.insert(headers[col_idx].clone(), FieldValue::guess(value));
        }

        rows.push(EnrolmentRecord {
            school_name: row[school_idx].clone(),
            year,
            fields,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_typed_csv<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let mut reader = csv_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    check_columns(path, headers.iter(), required)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<T>().enumerate() {
        let record = result.map_err(|e| row_error(path, row_no, &headers, e))?;
        rows.push(record);
    }
    Ok(rows)
}

fn read_raw_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv_reader(path)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        cells.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok((headers, cells))
}

/// Turn a per-row deserialization failure into an error naming the column.
fn row_error(path: &Path, row_no: usize, headers: &csv::StringRecord, err: csv::Error) -> StoreError {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        let column = de
            .field()
            .and_then(|i| headers.get(i as usize))
            .unwrap_or("?")
            .to_string();
        return StoreError::InvalidValue {
            path: path.to_path_buf(),
            row: row_no + 1,
            column,
            message: de.kind().to_string(),
        };
    }
    StoreError::Csv {
        path: path.to_path_buf(),
        source: err,
    }
}

fn check_columns<'a>(
    path: &Path,
    present: impl IntoIterator<Item = &'a str>,
    required: &[&str],
) -> Result<()> {
    let present: Vec<&str> = present.into_iter().collect();
    match required.iter().find(|col| !present.contains(*col)) {
        Some(col) => Err(missing_column(path, col)),
        None => Ok(()),
    }
}

fn missing_column(path: &Path, column: &str) -> StoreError {
    StoreError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(whole_year))
}

/// `value` as an `i32`, if it is finite, integral and in range.
fn whole_year(value: f64) -> Option<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i32)
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read the file schema and every record batch, each batch paired with the
/// index of its first row.
fn read_parquet(path: &Path, required: &[&str]) -> Result<(SchemaRef, Vec<(usize, RecordBatch)>)> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |source: parquet::errors::ParquetError| StoreError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let schema = builder.schema().clone();
    check_columns(
        path,
        schema.fields().iter().map(|f| f.name().as_str()),
        required,
    )?;
    let reader = builder.build().map_err(parquet_err)?;

    let mut batches = Vec::new();
    let mut offset = 0;
    for batch in reader {
        let batch = batch.map_err(|source| StoreError::Arrow {
            path: path.to_path_buf(),
            source,
        })?;
        let n_rows = batch.num_rows();
        batches.push((offset, batch));
        offset += n_rows;
    }
    Ok((schema, batches))
}

/// Headers come from the file schema, so a table with no rows still has columns.
fn read_raw_parquet(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let (schema, batches) = read_parquet(path, &[])?;
    let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let mut cells = Vec::new();
    for (_, batch) in &batches {
        let columns = headers
            .iter()
            .map(|name| cast_column(batch, path, name, &DataType::Utf8))
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            cells.push(
                columns
                    .iter()
                    .map(|col| {
                        let strings = col.as_string::<i32>();
                        if strings.is_null(row) {
                            String::new()
                        } else {
                            strings.value(row).to_string()
                        }
                    })
                    .collect(),
            );
        }
    }
    Ok((headers, cells))
}

fn cast_column(batch: &RecordBatch, path: &Path, name: &str, to: &DataType) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| missing_column(path, name))?;
    cast(batch.column(idx), to).map_err(|source| StoreError::Arrow {
        path: path.to_path_buf(),
        source,
    })
}

fn null_value(path: &Path, row: usize, column: &str) -> StoreError {
    StoreError::InvalidValue {
        path: path.to_path_buf(),
        row,
        column: column.to_string(),
        message: "null value".to_string(),
    }
}

fn string_column(batch: &RecordBatch, path: &Path, name: &str, offset: usize) -> Result<Vec<String>> {
    let array = cast_column(batch, path, name, &DataType::Utf8)?;
    let strings = array.as_string::<i32>();
    (0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                Err(null_value(path, offset + i + 1, name))
            } else {
                Ok(strings.value(i).to_string())
            }
        })
        .collect()
}

/// Whole-number column. Float columns must hold integral values; anything
/// with a fractional part is rejected rather than truncated.
fn int_column(batch: &RecordBatch, path: &Path, name: &str, offset: usize) -> Result<Vec<i32>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| missing_column(path, name))?;
    if batch.column(idx).data_type().is_floating() {
        return float_column(batch, path, name, offset)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                whole_year(value).ok_or_else(|| StoreError::InvalidValue {
                    path: path.to_path_buf(),
                    row: offset + i + 1,
                    column: name.to_string(),
                    message: format!("'{value}' is not a whole number"),
                })
            })
            .collect();
    }

    let array = cast_column(batch, path, name, &DataType::Int32)?;
    let ints = array.as_primitive::<Int32Type>();
    (0..ints.len())
        .map(|i| {
            if ints.is_null(i) {
                Err(null_value(path, offset + i + 1, name))
            } else {
                Ok(ints.value(i))
            }
        })
        .collect()
}

fn float_column(batch: &RecordBatch, path: &Path, name: &str, offset: usize) -> Result<Vec<f64>> {
    let array = cast_column(batch, path, name, &DataType::Float64)?;
    let floats = array.as_primitive::<Float64Type>();
    (0..floats.len())
        .map(|i| {
            if floats.is_null(i) {
                Err(null_value(path, offset + i + 1, name))
            } else {
                Ok(floats.value(i))
            }
        })
        .collect()
}
