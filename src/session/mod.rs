//! # Session
//!
//! Caller-facing surface over a [`NativeEngine`]: queries return a
//! [`ResultSet`], prepared statements bind encoded values by position, and
//! appenders push encoded values column by column.
//!
//! ```text
//! Session ──query────> ResultSet
//!    │
//!    ├──prepare──> PreparedStatement ──bind(pos, value, type)──> execute ──> ResultSet
//!    │
//!    └──appender─> Appender ──append(value, type)── end_row ── flush
//! ```
//!
//! Values go through the [`ValueEncoder`]. When no target type is given it is
//! inferred from the value. Engine failures surface as `CodecError::Engine`
//! carrying the engine's own message.

use std::sync::Arc;

use eyre::Result;

use crate::codec::ValueEncoder;
use crate::config::CodecConfig;
use crate::engine::{NativeAppender, NativeEngine, NativeStatement};
use crate::error::CodecError;
use crate::result::ResultSet;
use crate::types::{TypeId, Value};

fn engine_error(operation: &str, message: String) -> eyre::Report {
    tracing::debug!(operation, %message, "engine reported an error");
    CodecError::engine(operation, message).into()
}

pub struct Session<E: NativeEngine> {
    engine: E,
    config: Arc<CodecConfig>,
    encoder: ValueEncoder,
}

impl<E: NativeEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, CodecConfig::default())
    }

    pub fn with_config(engine: E, config: CodecConfig) -> Self {
        let config = Arc::new(config);
        Self {
            engine,
            encoder: ValueEncoder::new(config.clone()),
            config,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encoder(&self) -> &ValueEncoder {
        &self.encoder
    }

    pub fn query(&self, sql: &str) -> Result<ResultSet<'_>> {
        let native = self
            .engine
            .query(sql)
            .map_err(|m| engine_error("query", m))?;
        Ok(ResultSet::new(native, self.config.clone()))
    }

    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<'_>> {
        let native = self
            .engine
            .prepare(sql)
            .map_err(|m| engine_error("prepare", m))?;
        Ok(PreparedStatement {
            native,
            encoder: &self.encoder,
            config: self.config.clone(),
        })
    }

    /// Opens an appender on `table`, in `schema` or the engine's default.
    pub fn appender(&self, schema: Option<&str>, table: &str) -> Result<Appender<'_>> {
        let native = self
            .engine
            .appender(schema, table)
            .map_err(|m| engine_error("appender create", m))?;
        Ok(Appender {
            native,
            encoder: &self.encoder,
            column: 0,
            rows: 0,
        })
    }
}

pub struct PreparedStatement<'s> {
    native: Box<dyn NativeStatement + 's>,
    encoder: &'s ValueEncoder,
    config: Arc<CodecConfig>,
}

impl PreparedStatement<'_> {
    pub fn parameter_count(&self) -> usize {
        self.native.parameter_count()
    }

    /// Binds `value` to the 1-based `position`.
    pub fn bind(&mut self, position: usize, value: &Value, target: Option<TypeId>) -> Result<()> {
        let native = self.encoder.encode(value, target)?;
        self.native
            .bind(position, native)
            .map_err(|m| engine_error("bind", m))
    }

    /// Binds `values` to positions 1..=n with inferred types.
    pub fn bind_all(&mut self, values: &[Value]) -> Result<()> {
        for (i, value) in values.iter().enumerate() {
            self.bind(i + 1, value, None)?;
        }
        Ok(())
    }

    pub fn execute(&mut self) -> Result<ResultSet<'_>> {
        let native = self
            .native
            .execute()
            .map_err(|m| engine_error("execute", m))?;
        Ok(ResultSet::new(native, self.config.clone()))
    }
}

pub struct Appender<'s> {
    native: Box<dyn NativeAppender + 's>,
    encoder: &'s ValueEncoder,
    column: usize,
    rows: u64,
}

impl Appender<'_> {
    /// Appends `value` to the next column of the current row.
    pub fn append(&mut self, value: &Value, target: Option<TypeId>) -> Result<()> {
        let native = self.encoder.encode(value, target)?;
        self.native
            .append(native)
            .map_err(|m| engine_error("append", m))?;
        self.column += 1;
        Ok(())
    }

    pub fn end_row(&mut self) -> Result<()> {
        self.native
            .end_row()
            .map_err(|m| engine_error("end row", m))?;
        self.column = 0;
        self.rows += 1;
        Ok(())
    }

    /// Appends a whole row with inferred types and ends it.
    pub fn append_row(&mut self, values: &[Value]) -> Result<()> {
        for value in values {
            self.append(value, None)?;
        }
        self.end_row()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.native.flush().map_err(|m| engine_error("flush", m))?;
        tracing::trace!(rows = self.rows, "appender flushed");
        Ok(())
    }

    /// Rows ended so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Columns appended to the row in progress.
    pub fn pending_columns(&self) -> usize {
        self.column
    }
}
