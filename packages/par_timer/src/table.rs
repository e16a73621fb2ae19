//! The tabular view of a timer that exporters and data-frame style consumers rely on.
//!
//! The column names, their order and their types are a compatibility contract. They do not
//! change with the number of rows, including when there are none.

use std::fmt;

use crate::Record;

/// Type of the values in one column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ColumnType {
    /// UTF-8 text.
    String,

    /// 64-bit floating point number.
    Float64,

    /// 64-bit signed integer.
    Int64,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Float64 => write!(f, "Float64"),
            Self::Int64 => write!(f, "Int64"),
        }
    }
}

/// Name and type of every column, in order.
pub const COLUMNS: [(&str, ColumnType); 7] = [
    ("name", ColumnType::String),
    ("time", ColumnType::Float64),
    ("gctime", ColumnType::Float64),
    ("n_allocs", ColumnType::Int64),
    ("bytes", ColumnType::Int64),
    ("thread_id", ColumnType::Int64),
    ("pid", ColumnType::Int64),
];

/// One cell of the table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value<'a> {
    /// A [`ColumnType::String`] cell.
    String(&'a str),

    /// A [`ColumnType::Float64`] cell.
    Float64(f64),

    /// A [`ColumnType::Int64`] cell.
    Int64(i64),
}

impl Value<'_> {
    /// The type of the column this value belongs in.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::String(_) => ColumnType::String,
            Self::Float64(_) => ColumnType::Float64,
            Self::Int64(_) => ColumnType::Int64,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{value}"),
            Self::Float64(value) => write!(f, "{value}"),
            Self::Int64(value) => write!(f, "{value}"),
        }
    }
}

impl Record {
    /// Returns the cells of this record in [`COLUMNS`] order.
    ///
    /// # Examples
    ///
    /// ```
    /// use par_timer::{COLUMNS, Timer};
    ///
    /// let timer = Timer::new();
    /// timer.record("row", || ());
    ///
    /// let rows = timer.rows();
    /// for ((column, column_type), value) in COLUMNS.iter().zip(rows[0].values()) {
    ///     assert_eq!(value.column_type(), *column_type);
    ///     println!("{column} = {value}");
    /// }
    /// ```
    #[must_use]
    pub fn values(&self) -> [Value<'_>; 7] {
        [
            Value::String(self.name()),
            Value::Float64(self.time_seconds()),
            Value::Float64(self.gc_time_seconds()),
            Value::Int64(self.alloc_count()),
            Value::Int64(self.bytes_allocated()),
            Value::Int64(self.thread_id()),
            Value::Int64(self.process_id()),
        ]
    }
}

/// Column-oriented copy of a timer's records.
///
/// Produced by [`Timer::columns()`](crate::Timer::columns), which synchronizes first. Every
/// column has one entry per row.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Columns {
    /// The `name` column.
    pub name: Vec<String>,

    /// The `time` column, in seconds.
    pub time: Vec<f64>,

    /// The `gctime` column, in seconds.
    pub gctime: Vec<f64>,

    /// The `n_allocs` column.
    pub n_allocs: Vec<i64>,

    /// The `bytes` column.
    pub bytes: Vec<i64>,

    /// The `thread_id` column.
    pub thread_id: Vec<i64>,

    /// The `pid` column.
    pub pid: Vec<i64>,
}

impl Columns {
    pub(crate) fn from_rows(rows: &[Record]) -> Self {
        let mut columns = Self {
            name: Vec::with_capacity(rows.len()),
            time: Vec::with_capacity(rows.len()),
            gctime: Vec::with_capacity(rows.len()),
            n_allocs: Vec::with_capacity(rows.len()),
            bytes: Vec::with_capacity(rows.len()),
            thread_id: Vec::with_capacity(rows.len()),
            pid: Vec::with_capacity(rows.len()),
        };

        for row in rows {
            columns.name.push(row.name().to_string());
            columns.time.push(row.time_seconds());
            columns.gctime.push(row.gc_time_seconds());
            columns.n_allocs.push(row.alloc_count());
            columns.bytes.push(row.bytes_allocated());
            columns.thread_id.push(row.thread_id());
            columns.pid.push(row.process_id());
        }

        columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.name.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns the values of the column with the given name, or `None` for an unknown name.
    ///
    /// # Examples
    ///
    /// ```
    /// use par_timer::{Timer, Value};
    ///
    /// let timer = Timer::new();
    /// timer.record("a", || ());
    ///
    /// let columns = timer.columns();
    /// let names = columns.column("name").unwrap();
    /// assert_eq!(names, [Value::String("a")]);
    /// assert!(columns.column("nonexistent").is_none());
    /// ```
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<Value<'_>>> {
        let values = match name {
            "name" => self.name.iter().map(|v| Value::String(v.as_str())).collect(),
            "time" => self.time.iter().copied().map(Value::Float64).collect(),
            "gctime" => self.gctime.iter().copied().map(Value::Float64).collect(),
            "n_allocs" => self.n_allocs.iter().copied().map(Value::Int64).collect(),
            "bytes" => self.bytes.iter().copied().map(Value::Int64).collect(),
            "thread_id" => self.thread_id.iter().copied().map(Value::Int64).collect(),
            "pid" => self.pid.iter().copied().map(Value::Int64).collect(),
            _ => return None,
        };

        Some(values)
    }
}
