use autotab_core::{Column, DType, DataFrame, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{IoError, IoResult};

/// Cell contents treated as missing.
pub const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A",
];

const BOOL_TRUE: &[&str] = &["True", "true", "TRUE"];
const BOOL_FALSE: &[&str] = &["False", "false", "FALSE"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Read a CSV file with a header row into a typed frame.
pub fn read_csv(path: impl AsRef<Path>) -> IoResult<DataFrame> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(&bytes)
}

/// Parse comma-separated bytes with a header row into a typed frame.
///
/// Each column's dtype is inferred from all of its cells: integers,
/// floats, booleans, ISO-8601 datetimes, and text, in that order of
/// preference. Rows shorter than the header are padded with missing
/// cells; longer rows are rejected, as are infinite or overflowing
/// numbers in a numeric column.
pub fn read_csv_bytes(bytes: &[u8]) -> IoResult<DataFrame> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IoError::MissingHeader);
    }
    let headers = dedupe_headers(&raw_headers);
    let n_cols = headers.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
    let mut lines: Vec<u64> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() > n_cols {
            return Err(IoError::RaggedRow {
                line,
                expected: n_cols,
                got: record.len(),
            });
        }
        for (j, column) in cells.iter_mut().enumerate() {
            let cell = record.get(j).filter(|c| !NA_VALUES.contains(c));
            column.push(cell.map(str::to_string));
        }
        lines.push(line);
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw, &lines))
        .collect::<IoResult<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// Rename repeated headers to `name.1`, `name.2`, ... keeping the first as is.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut k = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}.{}", name, k);
            k += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn infer_column(name: String, raw: Vec<Option<String>>, lines: &[u64]) -> IoResult<Column> {
    let present: Vec<&str> = raw.iter().flatten().map(String::as_str).collect();
    let has_missing = present.len() < raw.len();

    if present.is_empty() {
        let values = vec![Value::Null; raw.len()];
        return Ok(Column::new(name, DType::Float, values));
    }

    if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        let dtype = if has_missing { DType::Float } else { DType::Int };
        let values = parse_numbers(&name, &raw, lines)?;
        return Ok(Column::new(name, dtype, values));
    }

    if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        let values = parse_numbers(&name, &raw, lines)?;
        return Ok(Column::new(name, DType::Float, values));
    }

    if !has_missing && present.iter().all(|s| parse_bool(s).is_some()) {
        let values = present
            .iter()
            .map(|s| Value::Bool(parse_bool(s) == Some(true)))
            .collect();
        return Ok(Column::new(name, DType::Bool, values));
    }

    let dtype = if present.iter().all(|s| is_datetime(s)) {
        DType::Datetime
    } else {
        DType::Text
    };
    let values = raw
        .into_iter()
        .map(|c| c.map(Value::Text).unwrap_or(Value::Null))
        .collect();
    Ok(Column::new(name, dtype, values))
}

fn parse_numbers(name: &str, raw: &[Option<String>], lines: &[u64]) -> IoResult<Vec<Value>> {
    raw.iter()
        .zip(lines)
        .map(|(c, &line)| match c.as_deref().map(|s| s.trim().parse::<f64>()) {
            Some(Ok(v)) if v.is_finite() => Ok(Value::Number(v)),
            Some(Ok(_)) => Err(IoError::NonFiniteNumber {
                column: name.to_string(),
                line,
            }),
            Some(Err(_)) | None => Ok(Value::Null),
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if BOOL_TRUE.contains(&s) {
        Some(true)
    } else if BOOL_FALSE.contains(&s) {
        Some(false)
    } else {
        None
    }
}

fn is_datetime(s: &str) -> bool {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_inference() {
        let csv = "id,price,name,flag,when,gappy\n\
                   1,2.5,apple,True,2024-01-02,3\n\
                   2,3,pear,false,2024-02-03 10:00:00,\n";
        let df = read_csv_bytes(csv.as_bytes()).unwrap();
        let dtypes: Vec<DType> = df.columns().iter().map(|c| c.dtype()).collect();
        assert_eq!(
            dtypes,
            vec![DType::Int, DType::Float, DType::Text, DType::Bool, DType::Datetime, DType::Float]
        );
        assert_eq!(df.column("flag").unwrap().values()[1], Value::Bool(false));
        assert_eq!(df.column("gappy").unwrap().values()[1], Value::Null);
    }

    #[test]
    fn test_missing_markers() {
        let csv = "a,b\nNA,x\n1,\nnull,NaN\n";
        let df = read_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(df.column("a").unwrap().null_count(), 2);
        assert_eq!(df.column("a").unwrap().dtype(), DType::Float);
        assert_eq!(df.column("b").unwrap().null_count(), 2);
    }

    #[test]
    fn test_all_missing_column_is_float() {
        let df = read_csv_bytes(b"a,b\n1,\n2,\n").unwrap();
        assert_eq!(df.column("b").unwrap().dtype(), DType::Float);
    }

    #[test]
    fn test_bool_with_gap_is_text() {
        let df = read_csv_bytes(b"f,g\nTrue,1\nNA,2\n").unwrap();
        assert_eq!(df.column("f").unwrap().dtype(), DType::Text);
    }

    #[test]
    fn test_duplicate_headers() {
        let df = read_csv_bytes(b"a,a,a\n1,2,3\n").unwrap();
        assert_eq!(df.column_names(), vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn test_short_rows_padded_long_rows_rejected() {
        let df = read_csv_bytes(b"a,b\n1\n2,3\n").unwrap();
        assert_eq!(df.column("b").unwrap().values()[0], Value::Null);
        let err = read_csv_bytes(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, IoError::RaggedRow { got: 3, .. }));
    }

    #[test]
    fn test_infinite_numbers_rejected() {
        let err = read_csv_bytes(b"x,y\n1,2\n1e400,3\n").unwrap_err();
        match err {
            IoError::NonFiniteNumber { column, line } => {
                assert_eq!(column, "x");
                assert_eq!(line, 3);
            }
            other => panic!("expected non-finite error, got {:?}", other),
        }
        assert!(matches!(
            read_csv_bytes(b"x\n-inf\n2\n"),
            Err(IoError::NonFiniteNumber { .. })
        ));
        let df = read_csv_bytes(b"x\ninf\nabc\n").unwrap();
        assert_eq!(df.column("x").unwrap().dtype(), DType::Text);
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(read_csv_bytes(b""), Err(IoError::MissingHeader)));
    }

    #[test]
    fn test_read_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,x\n2,y\n").unwrap();
        let df = read_csv(&path).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert!(matches!(
            read_csv(dir.path().join("missing.csv")),
            Err(IoError::Io(_))
        ));
    }
}
