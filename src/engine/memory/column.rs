//! Column buffers in the engine's native layout.
//!
//! A [`ColumnBuilder`] writes one vector at a time: fixed-width slots, string
//! descriptors backed by a [`StringHeap`], list entries into a shared child,
//! and a validity bitmap. [`ColumnBuilder::finish`] freezes it into a
//! [`ColumnBuffer`], which implements [`NativeVector`].
//!
//! Null rows are filled with [`NULL_POISON`] bytes, so a decoder that reads
//! a slot without consulting the bitmap first sees garbage.

use std::sync::Arc;

use eyre::{bail, ensure, eyre, Result};
use hashbrown::HashMap;
use uuid::Uuid;
use zerocopy::IntoBytes;

use crate::abi::{HugeIntSlot, IntervalSlot, ListEntry, UHugeIntSlot};
use crate::codec::temporal::{micros_to_millis, micros_to_seconds};
use crate::codec::wide::{encode_bit, encode_varint, i128_to_hugeint, uuid_slot_halves};
use crate::codec::{describe, ValidityMask, ValueEncoder};
use crate::config::{CodecConfig, STRING_INLINE_LIMIT};
use crate::engine::{NativeValue, NativeVector};
use crate::types::{LogicalType, TypeId, Value};

pub const NULL_POISON: u8 = 0xA5;

/// Out-of-line string payloads, keyed by their address.
#[derive(Debug, Default)]
pub struct StringHeap {
    entries: HashMap<u64, Box<[u8]>>,
}

impl StringHeap {
    pub fn insert(&mut self, bytes: &[u8]) -> u64 {
        let boxed: Box<[u8]> = bytes.into();
        let pointer = boxed.as_ptr() as u64;
        self.entries.insert(pointer, boxed);
        pointer
    }

    pub fn get(&self, pointer: u64) -> Option<&[u8]> {
        self.entries.get(&pointer).map(|b| &b[..])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Scalar,
    List,
    Map,
    Array(usize),
    Struct,
    Union,
    Enum,
    Decimal(u8),
    Bit,
    Varint,
}

impl Shape {
    fn of(logical_type: &LogicalType) -> Self {
        match logical_type {
            LogicalType::List(_) => Shape::List,
            LogicalType::Map { .. } => Shape::Map,
            LogicalType::Array { size, .. } => Shape::Array(*size),
            LogicalType::Struct(_) => Shape::Struct,
            LogicalType::Union(_) => Shape::Union,
            LogicalType::Enum { .. } => Shape::Enum,
            LogicalType::Decimal { scale, .. } => Shape::Decimal(*scale),
            LogicalType::Bit => Shape::Bit,
            LogicalType::Varint => Shape::Varint,
            _ => Shape::Scalar,
        }
    }
}

pub struct ColumnBuilder {
    logical_type: LogicalType,
    storage_type: TypeId,
    shape: Shape,
    slot_size: usize,
    data: Vec<u8>,
    validity: ValidityMask,
    children: Vec<ColumnBuilder>,
    heap: StringHeap,
    encoder: ValueEncoder,
}

impl ColumnBuilder {
    pub fn new(logical_type: LogicalType) -> Self {
        Self::with_config(logical_type, Arc::new(CodecConfig::default()))
    }

    pub fn with_config(logical_type: LogicalType, config: Arc<CodecConfig>) -> Self {
        let children = logical_type
            .children()
            .into_iter()
            .map(|(_, child)| ColumnBuilder::with_config(child, config.clone()))
            .collect();
        let storage_type = logical_type.storage_type();
        Self {
            shape: Shape::of(&logical_type),
            slot_size: match storage_type {
                TypeId::Struct | TypeId::Union | TypeId::Array => 0,
                other => other.slot_size().unwrap_or(0),
            },
            storage_type,
            logical_type,
            data: Vec::new(),
            validity: ValidityMask::new(),
            children,
            heap: StringHeap::default(),
            encoder: ValueEncoder::new(config),
        }
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    fn push_slot(&mut self, bytes: &[u8]) -> Result<()> {
        ensure!(
            bytes.len() == self.slot_size,
            "{}-byte value for a {} column with {}-byte slots",
            bytes.len(),
            self.logical_type,
            self.slot_size
        );
        self.data.extend_from_slice(bytes);
        self.validity.push(true);
        Ok(())
    }

    pub fn push_null(&mut self) -> Result<()> {
        match self.shape {
            Shape::Struct | Shape::Union => {
                for child in &mut self.children {
                    child.push_null()?;
                }
            }
            Shape::Array(size) => {
                let child = self.only_child()?;
                for _ in 0..size {
                    child.push_null()?;
                }
            }
            _ => {}
        }
        self.data.resize(self.data.len() + self.slot_size, NULL_POISON);
        self.validity.push(false);
        Ok(())
    }

    fn only_child(&mut self) -> Result<&mut ColumnBuilder> {
        let ty = &self.logical_type;
        self.children
            .first_mut()
            .ok_or_else(|| eyre!("{} column has no child vector", ty))
    }

    /// Appends a native scalar as the engine's value constructors would.
    pub fn push(&mut self, value: &NativeValue) -> Result<()> {
        if value.is_null() {
            return self.push_null();
        }
        match (self.storage_type, value) {
            (TypeId::Boolean, NativeValue::Boolean(b)) => self.push_slot(&[*b as u8]),
            (TypeId::TinyInt, NativeValue::TinyInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::SmallInt, NativeValue::SmallInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::Integer, NativeValue::Integer(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::BigInt, NativeValue::BigInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::UTinyInt, NativeValue::UTinyInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::USmallInt, NativeValue::USmallInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::UInteger, NativeValue::UInteger(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::UBigInt, NativeValue::UBigInt(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::Float, NativeValue::Float(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::Double, NativeValue::Double(v)) => self.push_slot(&v.to_le_bytes()),
            (TypeId::Varchar, NativeValue::Varchar(s)) => self.push_bytes(s.as_bytes()),
            (TypeId::Blob | TypeId::Bit | TypeId::Varint, NativeValue::Blob(b)) => {
                self.push_bytes(b)
            }
            (TypeId::Date, NativeValue::Date(days)) => self.push_slot(&days.to_le_bytes()),
            (TypeId::Time, NativeValue::Time(micros)) => self.push_slot(&micros.to_le_bytes()),
            (TypeId::TimeTz, NativeValue::TimeTz(bits)) => self.push_slot(&bits.to_le_bytes()),
            (TypeId::Timestamp, NativeValue::Timestamp(micros))
            | (TypeId::TimestampTz, NativeValue::Timestamp(micros))
            | (TypeId::TimestampTz, NativeValue::TimestampTz(micros)) => {
                self.push_slot(&micros.to_le_bytes())
            }
            (TypeId::TimestampS, NativeValue::Timestamp(micros)) => {
                self.push_slot(&micros_to_seconds(*micros).to_le_bytes())
            }
            (TypeId::TimestampMs, NativeValue::Timestamp(micros)) => {
                self.push_slot(&micros_to_millis(*micros).to_le_bytes())
            }
            (TypeId::TimestampNs, NativeValue::TimestampNs(nanos)) => {
                self.push_slot(&nanos.to_le_bytes())
            }
            (
                TypeId::Interval,
                NativeValue::Interval {
                    months,
                    days,
                    micros,
                },
            ) => self.push_slot(IntervalSlot::new(*months, *days, *micros).as_bytes()),
            (TypeId::HugeInt, NativeValue::HugeInt { lower, upper }) => {
                self.push_slot(HugeIntSlot::new(*lower, *upper).as_bytes())
            }
            (TypeId::UHugeInt, NativeValue::UHugeInt { lower, upper }) => {
                self.push_slot(UHugeIntSlot::new(*lower, *upper).as_bytes())
            }
            (TypeId::Uuid, NativeValue::Uuid { lower, upper }) => {
                let (lower, upper) = uuid_slot_halves(&Uuid::from_u64_pair(*upper, *lower));
                self.push_slot(HugeIntSlot::new(lower, upper).as_bytes())
            }
            (_, NativeValue::Double(v)) => match self.shape {
                Shape::Decimal(scale) => {
                    let scaled = (v * 10f64.powi(scale as i32)).round();
                    ensure!(scaled.is_finite(), "{} does not fit {}", v, self.logical_type);
                    self.push_decimal(scaled as i128)
                }
                _ => Err(self.native_mismatch(value)),
            },
            (_, NativeValue::Varchar(label)) => match self.shape {
                Shape::Enum => self.push_label(label),
                _ => Err(self.native_mismatch(value)),
            },
            (_, value) => Err(self.native_mismatch(value)),
        }
    }

    fn native_mismatch(&self, value: &NativeValue) -> eyre::Report {
        eyre!(
            "cannot store {} value in a {} column",
            value.type_id(),
            self.logical_type
        )
    }

    /// Appends any [`Value`] whose shape matches the column type, recursing
    /// into nested children. UNION rows go through [`push_union`](Self::push_union).
    pub fn push_value(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return self.push_null();
        }
        match self.shape {
            Shape::List => {
                let items = value.as_list().ok_or_else(|| self.mismatch(value))?;
                let child = self.only_child()?;
                let offset = child.len();
                for item in items {
                    child.push_value(item)?;
                }
                self.push_entry(offset, items.len())
            }
            Shape::Map => {
                let Value::Map(entries) = value else {
                    return Err(self.mismatch(value));
                };
                let child = self.only_child()?;
                let offset = child.len();
                for (key, val) in entries {
                    child.push_fields(&[key, val])?;
                }
                self.push_entry(offset, entries.len())
            }
            Shape::Array(size) => {
                let items = value.as_list().ok_or_else(|| self.mismatch(value))?;
                ensure!(
                    items.len() == size,
                    "{} elements for a {} column",
                    items.len(),
                    self.logical_type
                );
                let child = self.only_child()?;
                for item in items {
                    child.push_value(item)?;
                }
                self.validity.push(true);
                Ok(())
            }
            Shape::Struct => {
                let Value::Struct(fields) = value else {
                    return Err(self.mismatch(value));
                };
                let values: Vec<&Value> = fields.iter().map(|(_, v)| v).collect();
                self.push_fields(&values)
            }
            Shape::Union => bail!("UNION rows need an explicit member tag"),
            Shape::Enum => {
                let label = value.as_str().ok_or_else(|| self.mismatch(value))?;
                self.push_label(label)
            }
            Shape::Decimal(scale) => match value {
                Value::Decimal(d) if d.scale() == scale => self.push_decimal(d.value()),
                other => {
                    let native = self.encoder.encode(other, Some(TypeId::Decimal))?;
                    self.push(&native)
                }
            },
            Shape::Bit => {
                let bits = value.as_str().ok_or_else(|| self.mismatch(value))?;
                self.push_bytes(&encode_bit(bits)?)
            }
            Shape::Varint => {
                let (Value::Varint(wide) | Value::HugeInt(wide) | Value::UHugeInt(wide)) = value
                else {
                    return Err(self.mismatch(value));
                };
                let bytes = encode_varint(wide, self.encoder.config().numeric_backend())?;
                self.push_bytes(&bytes)
            }
            Shape::Scalar => {
                let native = self.encoder.encode(value, Some(self.logical_type.id()))?;
                self.push(&native)
            }
        }
    }

    /// Appends a UNION row whose active member is `tag`.
    pub fn push_union(&mut self, tag: u8, value: &Value) -> Result<()> {
        ensure!(
            matches!(self.shape, Shape::Union),
            "{} column is not a UNION",
            self.logical_type
        );
        let members = self.children.len().saturating_sub(1);
        ensure!(
            (tag as usize) < members,
            "tag {} for a UNION of {} members",
            tag,
            members
        );
        for (index, child) in self.children.iter_mut().enumerate() {
            if index == 0 {
                child.push(&NativeValue::UTinyInt(tag))?;
            } else if index == tag as usize + 1 {
                child.push_value(value)?;
            } else {
                child.push_null()?;
            }
        }
        self.validity.push(true);
        Ok(())
    }

    fn push_fields(&mut self, values: &[&Value]) -> Result<()> {
        ensure!(
            values.len() == self.children.len(),
            "{} fields for a {} column",
            values.len(),
            self.logical_type
        );
        for (child, value) in self.children.iter_mut().zip(values) {
            child.push_value(value)?;
        }
        self.validity.push(true);
        Ok(())
    }

    fn push_entry(&mut self, offset: usize, length: usize) -> Result<()> {
        let entry = ListEntry::new(offset as u64, length as u64);
        self.push_slot(entry.as_bytes())
    }

    fn push_label(&mut self, label: &str) -> Result<()> {
        let LogicalType::Enum { dictionary } = &self.logical_type else {
            bail!("{} column is not an ENUM", self.logical_type);
        };
        let index = dictionary
            .iter()
            .position(|entry| entry == label)
            .ok_or_else(|| eyre!("'{}' is not a member of {}", label, self.logical_type))?;
        self.push_enum_index(index as u32)
    }

    /// Appends a raw string cell.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        ensure!(
            matches!(
                self.storage_type,
                TypeId::Varchar | TypeId::Blob | TypeId::Bit | TypeId::Varint
            ),
            "{} column has no string slots",
            self.logical_type
        );
        let pointer = if bytes.len() > STRING_INLINE_LIMIT {
            self.heap.insert(bytes)
        } else {
            0
        };
        let descriptor = describe(bytes, pointer)?;
        self.push_slot(descriptor.as_bytes())
    }

    /// Appends the scaled integer of a DECIMAL cell in its storage width.
    pub fn push_decimal(&mut self, scaled: i128) -> Result<()> {
        let out_of_range = || eyre!("{} does not fit {}", scaled, self.logical_type);
        match self.storage_type {
            TypeId::SmallInt => {
                let v = i16::try_from(scaled).map_err(|_| out_of_range())?;
                self.push_slot(&v.to_le_bytes())
            }
            TypeId::Integer => {
                let v = i32::try_from(scaled).map_err(|_| out_of_range())?;
                self.push_slot(&v.to_le_bytes())
            }
            TypeId::BigInt => {
                let v = i64::try_from(scaled).map_err(|_| out_of_range())?;
                self.push_slot(&v.to_le_bytes())
            }
            TypeId::HugeInt => {
                let (lower, upper) = i128_to_hugeint(scaled);
                self.push_slot(HugeIntSlot::new(lower, upper).as_bytes())
            }
            other => bail!("{} is not a DECIMAL storage type", other),
        }
    }

    /// Appends the physical index of an ENUM cell in its storage width.
    pub fn push_enum_index(&mut self, index: u32) -> Result<()> {
        let out_of_range = || eyre!("index {} does not fit {}", index, self.logical_type);
        match self.storage_type {
            TypeId::UTinyInt => {
                let v = u8::try_from(index).map_err(|_| out_of_range())?;
                self.push_slot(&[v])
            }
            TypeId::USmallInt => {
                let v = u16::try_from(index).map_err(|_| out_of_range())?;
                self.push_slot(&v.to_le_bytes())
            }
            TypeId::UInteger => self.push_slot(&index.to_le_bytes()),
            other => bail!("{} is not an ENUM storage type", other),
        }
    }

    fn mismatch(&self, value: &Value) -> eyre::Report {
        eyre!("cannot store {} value in a {} column", value.kind(), self.logical_type)
    }

    pub fn finish(self) -> ColumnBuffer {
        let list_size = match self.shape {
            Shape::List | Shape::Map => self.children.first().map_or(0, |c| c.len()),
            _ => 0,
        };
        ColumnBuffer {
            len: self.validity.len(),
            validity: self.validity.into_words(),
            logical_type: self.logical_type,
            storage_type: self.storage_type,
            data: self.data,
            children: self.children.into_iter().map(ColumnBuilder::finish).collect(),
            list_size,
            heap: self.heap,
        }
    }
}

/// Frozen column vector.
#[derive(Debug)]
pub struct ColumnBuffer {
    logical_type: LogicalType,
    storage_type: TypeId,
    data: Vec<u8>,
    validity: Option<Vec<u64>>,
    children: Vec<ColumnBuffer>,
    list_size: usize,
    heap: StringHeap,
    len: usize,
}

impl ColumnBuffer {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn heap(&self) -> &StringHeap {
        &self.heap
    }
}

impl NativeVector for ColumnBuffer {
    fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    fn storage_type(&self) -> TypeId {
        self.storage_type
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn validity(&self) -> Option<&[u64]> {
        self.validity.as_deref()
    }

    fn child(&self, index: usize) -> Option<&dyn NativeVector> {
        self.children.get(index).map(|c| c as &dyn NativeVector)
    }

    fn list_size(&self) -> usize {
        self.list_size
    }

    fn string_heap(&self, pointer: u64, _len: usize) -> Option<&[u8]> {
        self.heap.get(pointer)
    }
}
