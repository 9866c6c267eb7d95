//! In-process engine over [`ColumnBuffer`] chunks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eyre::{bail, ensure, Result};
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::column::{ColumnBuffer, ColumnBuilder};
use crate::config::{CodecConfig, STANDARD_VECTOR_SIZE};
use crate::engine::{
    NativeAppender, NativeChunk, NativeEngine, NativeResult, NativeStatement, NativeValue,
    NativeVector,
};
use crate::types::LogicalType;

const DEFAULT_SCHEMA: &str = "main";

type QueryFactory = Box<dyn Fn() -> std::result::Result<MemoryResult, String> + Send + Sync>;

/// Live native resources handed out by an engine.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    chunks: AtomicUsize,
    results: AtomicUsize,
}

impl ResourceTracker {
    pub fn live_chunks(&self) -> usize {
        self.chunks.load(Ordering::Acquire)
    }

    pub fn live_results(&self) -> usize {
        self.results.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Table {
    columns: Vec<(String, LogicalType)>,
    rows: Vec<Vec<NativeValue>>,
}

pub struct MemoryEngine {
    tables: RwLock<HashMap<String, Table>>,
    queries: RwLock<HashMap<String, QueryFactory>>,
    chunk_capacity: usize,
    config: Arc<CodecConfig>,
    tracker: Arc<ResourceTracker>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::with_chunk_capacity(STANDARD_VECTOR_SIZE)
    }

    pub fn with_chunk_capacity(chunk_capacity: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            queries: RwLock::new(HashMap::new()),
            chunk_capacity: chunk_capacity.max(1),
            config: Arc::new(CodecConfig::default()),
            tracker: Arc::new(ResourceTracker::default()),
        }
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Creates a table. `name` may be qualified as `schema.table`.
    pub fn create_table<N: Into<String>>(
        &self,
        name: &str,
        columns: impl IntoIterator<Item = (N, LogicalType)>,
    ) -> Result<()> {
        let columns: Vec<(String, LogicalType)> =
            columns.into_iter().map(|(n, t)| (n.into(), t)).collect();
        ensure!(!columns.is_empty(), "table {} needs at least one column", name);
        let key = qualified(name);
        let mut tables = self.tables.write();
        if tables.contains_key(&key) {
            bail!("table {} already exists", key);
        }
        tables.insert(
            key,
            Table {
                columns,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn row_count(&self, name: &str) -> Option<usize> {
        self.tables.read().get(&qualified(name)).map(|t| t.rows.len())
    }

    /// Answers `sql` with the result built by `factory` on every execution.
    pub fn register_query<F>(&self, sql: &str, factory: F)
    where
        F: Fn() -> std::result::Result<MemoryResult, String> + Send + Sync + 'static,
    {
        self.queries
            .write()
            .insert(normalize(sql), Box::new(factory));
    }

    fn scan(&self, table: &str) -> std::result::Result<MemoryResult, String> {
        let key = qualified(table);
        let tables = self.tables.read();
        let table = tables
            .get(&key)
            .ok_or_else(|| format!("Catalog Error: Table with name {} does not exist!", key))?;
        MemoryResult::from_rows(
            table.columns.clone(),
            &table.rows,
            self.chunk_capacity,
            self.config.clone(),
        )
        .map_err(|e| e.to_string())
    }

    fn track(&self, mut result: MemoryResult) -> MemoryResult {
        self.tracker.results.fetch_add(1, Ordering::AcqRel);
        result.tracker = Some(self.tracker.clone());
        result
    }
}

impl NativeEngine for MemoryEngine {
    fn query(&self, sql: &str) -> std::result::Result<Box<dyn NativeResult + '_>, String> {
        let key = normalize(sql);
        if let Some(factory) = self.queries.read().get(&key) {
            return Ok(Box::new(self.track(factory()?)));
        }
        match scan_target(&key) {
            Some(table) => Ok(Box::new(self.track(self.scan(table)?))),
            None => Err(format!("Parser Error: unsupported statement \"{}\"", sql.trim())),
        }
    }

    fn prepare(&self, sql: &str) -> std::result::Result<Box<dyn NativeStatement + '_>, String> {
        let parameter_count = sql.matches('?').count();
        if parameter_count == 0 {
            let key = normalize(sql);
            if !self.queries.read().contains_key(&key) && scan_target(&key).is_none() {
                return Err(format!("Parser Error: unsupported statement \"{}\"", sql.trim()));
            }
        }
        Ok(Box::new(MemoryStatement {
            engine: self,
            sql: sql.to_string(),
            parameters: vec![None; parameter_count],
        }))
    }

    fn appender(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> std::result::Result<Box<dyn NativeAppender + '_>, String> {
        let key = format!("{}.{}", schema.unwrap_or(DEFAULT_SCHEMA), table);
        let tables = self.tables.read();
        let columns = tables
            .get(&key)
            .map(|t| t.columns.iter().map(|(_, ty)| ty.clone()).collect::<Vec<_>>())
            .ok_or_else(|| format!("Catalog Error: Table with name {} does not exist!", key))?;
        Ok(Box::new(MemoryAppender {
            engine: self,
            table: key,
            columns,
            current: Vec::new(),
            pending: Vec::new(),
        }))
    }
}

fn qualified(name: &str) -> String {
    let name = name.trim();
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{}.{}", DEFAULT_SCHEMA, name)
    }
}

fn normalize(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim().to_string()
}

/// Table named by a `SELECT * FROM <table>` statement.
fn scan_target(sql: &str) -> Option<&str> {
    let mut words = sql.split_whitespace();
    if !keyword(words.next(), "select") || words.next() != Some("*") || !keyword(words.next(), "from")
    {
        return None;
    }
    let table = words.next()?;
    words.next().is_none().then_some(table)
}

fn keyword(word: Option<&str>, expected: &str) -> bool {
    word.is_some_and(|w| w.eq_ignore_ascii_case(expected))
}

/// Materialized result, handed out one chunk at a time.
pub struct MemoryResult {
    columns: Vec<(String, LogicalType)>,
    chunks: VecDeque<Vec<ColumnBuffer>>,
    tracker: Option<Arc<ResourceTracker>>,
}

impl MemoryResult {
    pub fn new<N: Into<String>>(
        columns: impl IntoIterator<Item = (N, LogicalType)>,
        chunks: Vec<Vec<ColumnBuffer>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            chunks: chunks.into(),
            tracker: None,
        }
    }

    /// Builds chunks of at most `capacity` rows from native row values.
    pub fn from_rows(
        columns: Vec<(String, LogicalType)>,
        rows: &[Vec<NativeValue>],
        capacity: usize,
        config: Arc<CodecConfig>,
    ) -> Result<Self> {
        let mut chunks = Vec::new();
        for batch in rows.chunks(capacity.max(1)) {
            let mut builders: Vec<ColumnBuilder> = columns
                .iter()
                .map(|(_, ty)| ColumnBuilder::with_config(ty.clone(), config.clone()))
                .collect();
            for row in batch {
                ensure!(
                    row.len() == builders.len(),
                    "row of {} values for {} columns",
                    row.len(),
                    builders.len()
                );
                for (builder, value) in builders.iter_mut().zip(row) {
                    builder.push(value)?;
                }
            }
            chunks.push(builders.into_iter().map(ColumnBuilder::finish).collect());
        }
        Ok(Self::new(columns, chunks))
    }

    pub fn remaining_chunks(&self) -> usize {
        self.chunks.len()
    }
}

impl NativeResult for MemoryResult {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|(n, _)| n.as_str())
    }

    fn column_type(&self, index: usize) -> Option<&LogicalType> {
        self.columns.get(index).map(|(_, t)| t)
    }

    fn fetch_chunk(&mut self) -> Option<Box<dyn NativeChunk>> {
        let columns = self.chunks.pop_front()?;
        if let Some(tracker) = &self.tracker {
            tracker.chunks.fetch_add(1, Ordering::AcqRel);
        }
        Some(Box::new(MemoryChunk {
            rows: columns.first().map_or(0, ColumnBuffer::len),
            columns,
            tracker: self.tracker.clone(),
        }))
    }
}

impl Drop for MemoryResult {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.results.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

pub struct MemoryChunk {
    columns: Vec<ColumnBuffer>,
    rows: usize,
    tracker: Option<Arc<ResourceTracker>>,
}

impl NativeChunk for MemoryChunk {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn vector(&self, index: usize) -> Option<&dyn NativeVector> {
        self.columns.get(index).map(|c| c as &dyn NativeVector)
    }
}

impl Drop for MemoryChunk {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.chunks.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Statement with `?` placeholders. Executing it echoes the bound values as
/// a one-row result with columns `$1..$n`; a statement without placeholders
/// runs as a query.
struct MemoryStatement<'e> {
    engine: &'e MemoryEngine,
    sql: String,
    parameters: Vec<Option<NativeValue>>,
}

impl NativeStatement for MemoryStatement<'_> {
    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn bind(&mut self, position: usize, value: NativeValue) -> std::result::Result<(), String> {
        let count = self.parameters.len();
        let slot = position
            .checked_sub(1)
            .and_then(|i| self.parameters.get_mut(i))
            .ok_or_else(|| {
                format!(
                    "Binder Error: parameter {} out of range, statement has {}",
                    position, count
                )
            })?;
        *slot = Some(value);
        Ok(())
    }

    fn execute(&mut self) -> std::result::Result<Box<dyn NativeResult + '_>, String> {
        if self.parameters.is_empty() {
            return self.engine.query(&self.sql);
        }
        let mut columns = Vec::with_capacity(self.parameters.len());
        let mut row = Vec::with_capacity(self.parameters.len());
        for (i, parameter) in self.parameters.iter().enumerate() {
            let value = parameter
                .clone()
                .ok_or_else(|| format!("Invalid Input Error: parameter ${} is not bound", i + 1))?;
            columns.push((format!("${}", i + 1), native_logical_type(&value)));
            row.push(value);
        }
        let result = MemoryResult::from_rows(columns, &[row], 1, self.engine.config.clone())
            .map_err(|e| e.to_string())?;
        Ok(Box::new(self.engine.track(result)))
    }
}

fn native_logical_type(value: &NativeValue) -> LogicalType {
    match value {
        NativeValue::Null => LogicalType::SqlNull,
        NativeValue::Boolean(_) => LogicalType::Boolean,
        NativeValue::TinyInt(_) => LogicalType::TinyInt,
        NativeValue::SmallInt(_) => LogicalType::SmallInt,
        NativeValue::Integer(_) => LogicalType::Integer,
        NativeValue::BigInt(_) => LogicalType::BigInt,
        NativeValue::UTinyInt(_) => LogicalType::UTinyInt,
        NativeValue::USmallInt(_) => LogicalType::USmallInt,
        NativeValue::UInteger(_) => LogicalType::UInteger,
        NativeValue::UBigInt(_) => LogicalType::UBigInt,
        NativeValue::Float(_) => LogicalType::Float,
        NativeValue::Double(_) => LogicalType::Double,
        NativeValue::Varchar(_) => LogicalType::Varchar,
        NativeValue::Blob(_) => LogicalType::Blob,
        NativeValue::Date(_) => LogicalType::Date,
        NativeValue::Time(_) => LogicalType::Time,
        NativeValue::TimeTz(_) => LogicalType::TimeTz,
        NativeValue::Timestamp(_) => LogicalType::Timestamp,
        NativeValue::TimestampTz(_) => LogicalType::TimestampTz,
        NativeValue::TimestampNs(_) => LogicalType::TimestampNs,
        NativeValue::Interval { .. } => LogicalType::Interval,
        NativeValue::HugeInt { .. } => LogicalType::HugeInt,
        NativeValue::UHugeInt { .. } => LogicalType::UHugeInt,
        NativeValue::Uuid { .. } => LogicalType::Uuid,
    }
}

/// Row appender. Completed rows become visible on `flush` or drop.
struct MemoryAppender<'e> {
    engine: &'e MemoryEngine,
    table: String,
    columns: Vec<LogicalType>,
    current: Vec<NativeValue>,
    pending: Vec<Vec<NativeValue>>,
}

impl NativeAppender for MemoryAppender<'_> {
    fn append(&mut self, value: NativeValue) -> std::result::Result<(), String> {
        let column = self.current.len();
        let ty = self.columns.get(column).ok_or_else(|| {
            format!(
                "Invalid Input Error: Too many appends for chunk, table {} has {} columns",
                self.table,
                self.columns.len()
            )
        })?;
        let mut scratch = ColumnBuilder::with_config(ty.clone(), self.engine.config.clone());
        scratch
            .push(&value)
            .map_err(|e| format!("Conversion Error: column {}: {}", column + 1, e))?;
        self.current.push(value);
        Ok(())
    }

    fn end_row(&mut self) -> std::result::Result<(), String> {
        if self.current.len() != self.columns.len() {
            return Err(format!(
                "Invalid Input Error: Call to EndRow before all columns have been appended to ({} of {})",
                self.current.len(),
                self.columns.len()
            ));
        }
        self.pending.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn flush(&mut self) -> std::result::Result<(), String> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut tables = self.engine.tables.write();
        let table = tables
            .get_mut(&self.table)
            .ok_or_else(|| format!("Catalog Error: Table with name {} does not exist!", self.table))?;
        table.rows.append(&mut self.pending);
        Ok(())
    }
}

impl Drop for MemoryAppender<'_> {
    fn drop(&mut self) {
        if let Err(message) = self.flush() {
            tracing::warn!(table = %self.table, %message, "appender flush on drop failed");
        }
    }
}
