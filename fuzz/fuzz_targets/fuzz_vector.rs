//! Fuzz testing for the vector decoder.
//!
//! Builds a native vector tree of an arbitrary logical type over arbitrary
//! data, validity and heap bytes, then decodes every row both per row and as a
//! batch. Malformed buffers must surface as errors, never as panics.

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

use quackcodec::engine::NativeVector;
use quackcodec::{CodecConfig, LogicalType, TypeId, Vector};

const MAX_ROWS: usize = 64;

#[derive(Debug, Arbitrary, Clone)]
enum FuzzType {
    Boolean,
    TinyInt,
    Integer,
    BigInt,
    UBigInt,
    Double,
    Timestamp,
    TimestampS,
    TimestampNs,
    Date,
    Time,
    TimeTz,
    Interval,
    HugeInt,
    UHugeInt,
    Uuid,
    Varchar,
    Blob,
    Bit,
    Varint,
    Decimal(u8),
    Enum(u8),
    List(Box<FuzzType>),
    Array(Box<FuzzType>, u8),
    Struct(Vec<FuzzType>),
    Map(Box<FuzzType>, Box<FuzzType>),
    Union(Vec<FuzzType>),
}

impl FuzzType {
    fn logical(&self, depth: usize) -> LogicalType {
        if depth > 4 {
            return LogicalType::Integer;
        }
        match self {
            FuzzType::Boolean => LogicalType::Boolean,
            FuzzType::TinyInt => LogicalType::TinyInt,
            FuzzType::Integer => LogicalType::Integer,
            FuzzType::BigInt => LogicalType::BigInt,
            FuzzType::UBigInt => LogicalType::UBigInt,
            FuzzType::Double => LogicalType::Double,
            FuzzType::Timestamp => LogicalType::Timestamp,
            FuzzType::TimestampS => LogicalType::TimestampS,
            FuzzType::TimestampNs => LogicalType::TimestampNs,
            FuzzType::Date => LogicalType::Date,
            FuzzType::Time => LogicalType::Time,
            FuzzType::TimeTz => LogicalType::TimeTz,
            FuzzType::Interval => LogicalType::Interval,
            FuzzType::HugeInt => LogicalType::HugeInt,
            FuzzType::UHugeInt => LogicalType::UHugeInt,
            FuzzType::Uuid => LogicalType::Uuid,
            FuzzType::Varchar => LogicalType::Varchar,
            FuzzType::Blob => LogicalType::Blob,
            FuzzType::Bit => LogicalType::Bit,
            FuzzType::Varint => LogicalType::Varint,
            FuzzType::Decimal(width) => {
                let width = [4u8, 9, 18, 38][*width as usize % 4];
                LogicalType::Decimal {
                    width,
                    scale: width / 2,
                }
            }
            FuzzType::Enum(size) => {
                LogicalType::enumeration((0..=*size as usize % 8).map(|i| format!("e{}", i)))
            }
            FuzzType::List(child) => LogicalType::list(child.logical(depth + 1)),
            FuzzType::Array(child, size) => {
                LogicalType::array(child.logical(depth + 1), *size as usize % 4 + 1)
            }
            FuzzType::Struct(fields) => LogicalType::structure(
                fields
                    .iter()
                    .take(4)
                    .enumerate()
                    .map(|(i, f)| (format!("f{}", i), f.logical(depth + 1))),
            ),
            FuzzType::Map(key, value) => {
                LogicalType::map(key.logical(depth + 1), value.logical(depth + 1))
            }
            FuzzType::Union(members) if members.is_empty() => LogicalType::Integer,
            FuzzType::Union(members) => LogicalType::union(
                members
                    .iter()
                    .take(4)
                    .enumerate()
                    .map(|(i, m)| (format!("m{}", i), m.logical(depth + 1))),
            ),
        }
    }
}

struct FuzzVector {
    ty: LogicalType,
    storage: TypeId,
    data: Vec<u8>,
    validity: Option<Vec<u64>>,
    children: Vec<FuzzVector>,
    list_size: usize,
    heap: Vec<u8>,
}

impl FuzzVector {
    fn build(ty: LogicalType, u: &mut Unstructured<'_>) -> arbitrary::Result<Self> {
        let children = ty
            .children()
            .into_iter()
            .map(|(_, child)| FuzzVector::build(child, u))
            .collect::<arbitrary::Result<Vec<_>>>()?;
        let list_size = u.int_in_range(0..=MAX_ROWS * 4)?;
        let validity: Option<Vec<u64>> = u.arbitrary()?;
        let data_len = u.int_in_range(0..=MAX_ROWS * 16)?;
        let data = u.bytes(data_len)?.to_vec();
        let heap_len = u.int_in_range(0..=256)?;
        let heap = u.bytes(heap_len)?.to_vec();
        let storage = if u.ratio(1, 64)? {
            TypeId::Varchar
        } else {
            ty.storage_type()
        };
        Ok(Self {
            ty,
            storage,
            data,
            validity,
            children,
            list_size,
            heap,
        })
    }
}

impl NativeVector for FuzzVector {
    fn logical_type(&self) -> &LogicalType {
        &self.ty
    }

    fn storage_type(&self) -> TypeId {
        self.storage
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

    fn string_heap(&self, pointer: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(pointer).ok()?;
        self.heap.get(start..)?.get(..len)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(fuzz_type) = FuzzType::arbitrary(&mut u) else {
        return;
    };
    let Ok(rows) = u.int_in_range(0..=MAX_ROWS) else {
        return;
    };
    let Ok(vector) = FuzzVector::build(fuzz_type.logical(0), &mut u) else {
        return;
    };

    let config = CodecConfig::default();
    let Ok(decoded) = Vector::new(&vector, rows, &config) else {
        return;
    };

    if let Ok(values) = decoded.values() {
        assert_eq!(values.len(), rows);
    }
    for row in 0..=rows {
        let _ = decoded.value_at(row);
    }
});
