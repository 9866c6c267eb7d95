use std::sync::Arc;

use eyre::{bail, Result};

use crate::types::Value;

/// One decoded row. Column names are shared by every row of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Value::Null))
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        match self.get(index) {
            Some(Value::Boolean(b)) => Ok(*b),
            Some(other) => bail!("expected BOOLEAN, got {}", other.kind()),
            None => bail!("column {} out of bounds", index),
        }
    }

    /// Any integer value that fits `i64`.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        match self.get(index) {
            Some(value) => match value.as_i64() {
                Some(i) => Ok(i),
                None => bail!("expected an integer fitting BIGINT, got {}", value.kind()),
            },
            None => bail!("column {} out of bounds", index),
        }
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        match self.get(index) {
            Some(value) => match value.as_f64() {
                Some(f) => Ok(f),
                None => bail!("expected FLOAT, DOUBLE or DECIMAL, got {}", value.kind()),
            },
            None => bail!("column {} out of bounds", index),
        }
    }

    pub fn get_str(&self, index: usize) -> Result<&str> {
        match self.get(index) {
            Some(value) => match value.as_str() {
                Some(s) => Ok(s),
                None => bail!("expected VARCHAR, got {}", value.kind()),
            },
            None => bail!("column {} out of bounds", index),
        }
    }

    pub fn get_bytes(&self, index: usize) -> Result<&[u8]> {
        match self.get(index) {
            Some(Value::Blob(b)) => Ok(b.as_bytes()),
            Some(other) => bail!("expected BLOB, got {}", other.kind()),
            None => bail!("column {} out of bounds", index),
        }
    }
}
