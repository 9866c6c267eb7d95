//! Result cursor and its row and column-batch iterators.

use std::sync::Arc;

use eyre::Result;

use super::{DataChunk, Row};
use crate::config::CodecConfig;
use crate::engine::NativeResult;
use crate::error::CodecError;
use crate::types::{LogicalType, Value};
use crate::vector::ColumnDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    /// Chunks may remain.
    Open,
    /// The engine reported the end of the result. The native result is
    /// still alive until the set is closed or dropped.
    Exhausted,
    /// The native result has been destroyed.
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultStats {
    pub chunks_fetched: u64,
    pub rows_yielded: u64,
}

/// Query result consumed one chunk at a time.
pub struct ResultSet<'e> {
    native: Option<Box<dyn NativeResult + 'e>>,
    state: ResultState,
    names: Arc<[String]>,
    config: Arc<CodecConfig>,
    stats: ResultStats,
}

impl<'e> ResultSet<'e> {
    pub fn new(native: Box<dyn NativeResult + 'e>, config: Arc<CodecConfig>) -> Self {
        let names: Arc<[String]> = (0..native.column_count())
            .map(|i| native.column_name(i).unwrap_or_default().to_string())
            .collect();
        Self {
            native: Some(native),
            state: ResultState::Open,
            names,
            config,
            stats: ResultStats::default(),
        }
    }

    pub fn state(&self) -> ResultState {
        self.state
    }

    pub fn stats(&self) -> ResultStats {
        self.stats
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Declared type of a column. None once the result is closed.
    pub fn column_type(&self, index: usize) -> Option<&LogicalType> {
        self.native.as_ref()?.column_type(index)
    }

    /// Fetches the next chunk. Ok(None) once the result is exhausted.
    pub fn fetch_chunk(&mut self) -> Result<Option<DataChunk<'static>>> {
        match self.state {
            ResultState::Closed => {
                return Err(CodecError::lifecycle("fetching a chunk from a closed result").into())
            }
            ResultState::Exhausted => return Ok(None),
            ResultState::Open => {}
        }
        let Some(native) = self.native.as_mut() else {
            return Err(CodecError::lifecycle("result has no native handle").into());
        };
        match native.fetch_chunk() {
            Some(chunk) => {
                self.stats.chunks_fetched += 1;
                let chunk = DataChunk::owned(chunk);
                if chunk.column_count() != self.names.len() {
                    return Err(CodecError::malformed(format!(
                        "chunk of {} columns in a result of {}",
                        chunk.column_count(),
                        self.names.len()
                    ))
                    .into());
                }
                tracing::trace!(
                    chunk = self.stats.chunks_fetched,
                    rows = chunk.row_count(),
                    "fetched chunk"
                );
                Ok(Some(chunk))
            }
            None => {
                self.state = ResultState::Exhausted;
                tracing::debug!(
                    chunks = self.stats.chunks_fetched,
                    rows = self.stats.rows_yielded,
                    "result exhausted"
                );
                Ok(None)
            }
        }
    }

    /// Rows in engine order. Iteration is forward-only: rows already yielded
    /// are not produced again by a later call.
    pub fn rows(&mut self) -> RowIter<'_, 'e> {
        RowIter {
            result: self,
            current: None,
            done: false,
        }
    }

    /// Decoded columns, one batch per chunk.
    pub fn column_batches(&mut self) -> ColumnBatches<'_, 'e> {
        ColumnBatches {
            result: self,
            done: false,
        }
    }

    /// Destroys the native result. Further fetches fail.
    pub fn close(&mut self) {
        if self.native.take().is_some() {
            tracing::debug!(
                chunks = self.stats.chunks_fetched,
                rows = self.stats.rows_yielded,
                "result closed"
            );
        }
        self.state = ResultState::Closed;
    }
}

impl Drop for ResultSet<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

struct CurrentChunk {
    chunk: DataChunk<'static>,
    decoders: Vec<ColumnDecoder>,
    rows: usize,
    next_row: usize,
}

impl CurrentChunk {
    fn open(chunk: DataChunk<'static>) -> Result<Self> {
        Ok(Self {
            decoders: chunk.decoders()?,
            rows: chunk.row_count(),
            next_row: 0,
            chunk,
        })
    }

    fn decode_row(&self, row: usize, config: &CodecConfig) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(self.decoders.len());
        for (index, decoder) in self.decoders.iter().enumerate() {
            values.push(decoder.decode(self.chunk.native_vector(index)?, row, config)?);
        }
        Ok(values)
    }
}

/// Row cursor over a [`ResultSet`]. Holds at most one chunk, released before
/// the next one is fetched and when the iterator is dropped.
pub struct RowIter<'r, 'e> {
    result: &'r mut ResultSet<'e>,
    current: Option<CurrentChunk>,
    done: bool,
}

impl Iterator for RowIter<'_, '_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(current) = &mut self.current {
                if current.next_row < current.rows {
                    let row = current.next_row;
                    current.next_row += 1;
                    return match current.decode_row(row, &self.result.config) {
                        Ok(values) => {
                            self.result.stats.rows_yielded += 1;
                            Some(Ok(Row::new(self.result.names.clone(), values)))
                        }
                        Err(e) => {
                            self.done = true;
                            self.current = None;
                            Some(Err(e))
                        }
                    };
                }
                self.current = None;
            }

            let opened = self
                .result
                .fetch_chunk()
                .and_then(|chunk| chunk.map(CurrentChunk::open).transpose());
            match opened {
                Ok(Some(current)) => self.current = Some(current),
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Every column of one chunk, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch {
    names: Arc<[String]>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl ColumnBatch {
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&[Value]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[Value]> {
        let index = self.names.iter().position(|n| n == name)?;
        self.column(index)
    }

    pub fn into_columns(self) -> Vec<Vec<Value>> {
        self.columns
    }
}

pub struct ColumnBatches<'r, 'e> {
    result: &'r mut ResultSet<'e>,
    done: bool,
}

impl ColumnBatches<'_, '_> {
    fn decode(&mut self, chunk: DataChunk<'static>) -> Result<ColumnBatch> {
        let rows = chunk.row_count();
        let config = &self.result.config;
        let columns = chunk
            .vectors(config)?
            .iter()
            .map(|vector| vector.values())
            .collect::<Result<Vec<_>>>()?;
        self.result.stats.rows_yielded += rows as u64;
        Ok(ColumnBatch {
            names: self.result.names.clone(),
            columns,
            rows,
        })
    }
}

impl Iterator for ColumnBatches<'_, '_> {
    type Item = Result<ColumnBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let batch = match self.result.fetch_chunk() {
            Ok(Some(chunk)) => self.decode(chunk),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if batch.is_err() {
            self.done = true;
        }
        Some(batch)
    }
}
