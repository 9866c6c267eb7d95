//! Chunk handle, owned or borrowed.

use eyre::Result;

use crate::config::CodecConfig;
use crate::engine::{NativeChunk, NativeVector};
use crate::error::CodecError;
use crate::vector::{check_validity, ColumnDecoder, Vector};

/// A chunk fetched from a result owns its native handle and releases it on
/// drop. A borrowed chunk belongs to someone else.
pub enum DataChunk<'a> {
    Owned(Box<dyn NativeChunk + 'a>),
    Borrowed(&'a dyn NativeChunk),
}

impl<'a> DataChunk<'a> {
    pub fn owned(native: Box<dyn NativeChunk + 'a>) -> Self {
        DataChunk::Owned(native)
    }

    pub fn borrowed(native: &'a dyn NativeChunk) -> Self {
        DataChunk::Borrowed(native)
    }

    pub fn native(&self) -> &dyn NativeChunk {
        match self {
            DataChunk::Owned(native) => native.as_ref(),
            DataChunk::Borrowed(native) => *native,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, DataChunk::Owned(_))
    }

    pub fn row_count(&self) -> usize {
        self.native().row_count()
    }

    pub fn column_count(&self) -> usize {
        self.native().column_count()
    }

    pub fn native_vector(&self, index: usize) -> Result<&dyn NativeVector> {
        self.native().vector(index).ok_or_else(|| {
            CodecError::malformed(format!(
                "chunk of {} columns has no vector {}",
                self.column_count(),
                index
            ))
            .into()
        })
    }

    /// Resolves one decoder per column.
    pub fn decoders(&self) -> Result<Vec<ColumnDecoder>> {
        (0..self.column_count())
            .map(|i| {
                let native = self.native_vector(i)?;
                check_validity(native, self.row_count())?;
                ColumnDecoder::resolve(native)
            })
            .collect()
    }

    pub fn vector<'c>(&'c self, index: usize, config: &'c CodecConfig) -> Result<Vector<'c>> {
        Vector::new(self.native_vector(index)?, self.row_count(), config)
    }

    pub fn vectors<'c>(&'c self, config: &'c CodecConfig) -> Result<Vec<Vector<'c>>> {
        (0..self.column_count())
            .map(|i| self.vector(i, config))
            .collect()
    }
}

impl Drop for DataChunk<'_> {
    fn drop(&mut self) {
        if self.is_owned() {
            tracing::trace!(rows = self.row_count(), "releasing chunk");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::engine::{NativeEngine, NativeValue};
    use crate::types::{LogicalType, Value};

    fn engine() -> MemoryEngine {
        let engine = MemoryEngine::new();
        engine
            .create_table("t", [("s", LogicalType::Varchar)])
            .unwrap();
        let mut appender = engine.appender(None, "t").unwrap();
        appender.append(NativeValue::Varchar("kept".into())).unwrap();
        appender.end_row().unwrap();
        appender.flush().unwrap();
        drop(appender);
        engine
    }

    #[test]
    fn borrowed_chunk_is_not_released_on_drop() {
        let engine = engine();
        let mut result = engine.query("SELECT * FROM t").unwrap();
        let native = result.fetch_chunk().unwrap();
        assert_eq!(engine.tracker().live_chunks(), 1);

        let config = CodecConfig::default();
        let borrowed = DataChunk::borrowed(native.as_ref());
        assert!(!borrowed.is_owned());
        assert_eq!(borrowed.decoders().unwrap().len(), 1);
        let vector = borrowed.vector(0, &config).unwrap();
        assert_eq!(vector.value_at(0).unwrap(), Value::from("kept"));
        drop(vector);
        drop(borrowed);
        assert_eq!(engine.tracker().live_chunks(), 1);

        let owned = DataChunk::owned(native);
        assert!(owned.is_owned());
        drop(owned);
        assert_eq!(engine.tracker().live_chunks(), 0);
    }

    #[test]
    fn missing_vector_is_malformed() {
        let engine = engine();
        let mut result = engine.query("SELECT * FROM t").unwrap();
        let chunk = DataChunk::owned(result.fetch_chunk().unwrap());
        assert!(chunk.native_vector(0).is_ok());
        assert!(chunk.native_vector(1).is_err());
    }
}
