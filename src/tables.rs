use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;

use crate::error::{EtlError, Result};

pub trait TableRow: Sized {
    const TABLE: &'static str;
    const HEADER: &'static [&'static str];
    /// Columns that must exist when the table is read back from disk.
    const REQUIRED: &'static [&'static str] = &[];

    fn from_record(row: &RecordView<'_>) -> Self;
    fn to_record(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            index.entry(name.trim().to_string()).or_insert(idx);
        }
        Self { index }
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn missing<'a>(&self, wanted: &[&'a str]) -> Vec<&'a str> {
        wanted.iter().copied().filter(|c| !self.has(c)).collect()
    }

    pub fn view<'a>(&'a self, record: &'a StringRecord) -> RecordView<'a> {
        RecordView {
            columns: self,
            record,
        }
    }
}

pub struct RecordView<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl RecordView<'_> {
    pub fn raw(&self, name: &str) -> Option<&str> {
        let idx = *self.columns.index.get(name)?;
        let value = self.record.get(idx)?.trim();
        if is_null_token(value) {
            None
        } else {
            Some(value)
        }
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.raw(name).map(str::to_string)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.raw(name).and_then(parse_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.raw(name).and_then(parse_float)
    }

    pub fn id(&self, name: &str) -> Option<u32> {
        self.int(name).and_then(|v| u32::try_from(v).ok())
    }
}

fn is_null_token(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
}

/// Integers arrive as `3`, `3.0` or ` 3 `; fractional values truncate toward zero.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() || f.abs() > i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

pub fn parse_float(raw: &str) -> Option<f64> {
    let f = raw.trim().trim_end_matches('%').parse::<f64>().ok()?;
    f.is_finite().then_some(f)
}

pub fn fmt_opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

pub fn read_table<T: TableRow>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(EtlError::SourceMissing {
            path: path.to_path_buf(),
        });
    }
    let csv_err = |source| EtlError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let columns = Columns::from_headers(reader.headers().map_err(csv_err)?);
    let missing = columns.missing(T::REQUIRED);
    if !missing.is_empty() {
        return Err(EtlError::MissingColumns {
            table: T::TABLE,
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(T::from_record(&columns.view(&record)));
    }
    tracing::debug!(table = T::TABLE, rows = rows.len(), path = %path.display(), "read table");
    Ok(rows)
}

pub fn encode_table<T: TableRow>(rows: &[T]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> Result<Vec<u8>> {
    let bytes = encode_table(rows).map_err(|source| EtlError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| EtlError::Csv {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
    }
    fs::write(path, &bytes).map_err(|err| EtlError::Csv {
        path: path.to_path_buf(),
        source: err.into(),
    })?;
    tracing::debug!(table = T::TABLE, rows = rows.len(), path = %path.display(), "wrote table");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::{Columns, parse_float, parse_int};
    use csv::StringRecord;

    #[test]
    fn parse_int_accepts_float_text() {
        assert_eq!(parse_int("3"), Some(3));
        assert_eq!(parse_int("3.0"), Some(3));
        assert_eq!(parse_int(" 7.9 "), Some(7));
        assert_eq!(parse_int("-2"), Some(-2));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("inf"), None);
    }

    #[test]
    fn parse_float_handles_percent_suffix() {
        assert_eq!(parse_float("61.5"), Some(61.5));
        assert_eq!(parse_float("40%"), Some(40.0));
        assert_eq!(parse_float("NaN"), None);
    }

    #[test]
    fn record_view_treats_blank_and_nan_as_null() {
        let headers = StringRecord::from(vec!["a", "b", "c"]);
        let cols = Columns::from_headers(&headers);
        let rec = StringRecord::from(vec!["", "nan", "5"]);
        let view = cols.view(&rec);
        assert_eq!(view.int("a"), None);
        assert_eq!(view.float("b"), None);
        assert_eq!(view.int("c"), Some(5));
        assert_eq!(view.text("missing"), None);
    }
}
