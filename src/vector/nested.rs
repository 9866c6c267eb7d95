//! LIST, MAP, ARRAY, STRUCT and UNION decoding.
//!
//! LIST and MAP rows are `(offset, length)` windows into one shared child
//! vector. The range decoders compute every window of the requested rows
//! first, merge them into disjoint spans, decode each span once, and slice
//! it per row. Child rows no window references are never read.
//!
//! ARRAY and STRUCT range decoders split the requested rows into runs of
//! non-null rows and decode the children of each run only.

use std::ops::Range;

use eyre::Result;

use super::ColumnDecoder;
use crate::abi::ListEntry;
use crate::codec::is_valid;
use crate::codec::scalar::read_u8;
use crate::config::CodecConfig;
use crate::engine::NativeVector;
use crate::error::CodecError;
use crate::types::Value;

fn child_vector(vector: &dyn NativeVector, index: usize) -> Result<&dyn NativeVector> {
    vector.child(index).ok_or_else(|| {
        CodecError::malformed(format!(
            "{} vector has no child {}",
            vector.logical_type(),
            index
        ))
        .into()
    })
}

fn list_window(vector: &dyn NativeVector, row: usize) -> Result<Range<usize>> {
    let entry = ListEntry::at(vector.data(), row)?;
    let start = usize::try_from(entry.offset()).ok();
    let end = start
        .zip(usize::try_from(entry.length()).ok())
        .and_then(|(start, len)| start.checked_add(len));
    match (start, end) {
        (Some(start), Some(end)) if end <= vector.list_size() => Ok(start..end),
        _ => Err(CodecError::malformed(format!(
            "list entry ({}, {}) at row {} exceeds a child of {} rows",
            entry.offset(),
            entry.length(),
            row,
            vector.list_size()
        ))
        .into()),
    }
}

pub(super) fn decode_list(
    child: &ColumnDecoder,
    vector: &dyn NativeVector,
    row: usize,
    config: &CodecConfig,
) -> Result<Value> {
    let window = list_window(vector, row)?;
    let items = child.decode_rows(child_vector(vector, 0)?, window, config)?;
    Ok(Value::List(items))
}

pub(super) fn decode_map(
    entry: &ColumnDecoder,
    vector: &dyn NativeVector,
    row: usize,
    config: &CodecConfig,
) -> Result<Value> {
    let window = list_window(vector, row)?;
    let entries = entry.decode_rows(child_vector(vector, 0)?, window, config)?;
    into_map(entries)
}

pub(super) fn decode_list_rows(
    child: &ColumnDecoder,
    vector: &dyn NativeVector,
    rows: Range<usize>,
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    decode_windows(child, vector, rows, config, |items| Ok(Value::List(items)))
}

pub(super) fn decode_map_rows(
    entry: &ColumnDecoder,
    vector: &dyn NativeVector,
    rows: Range<usize>,
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    decode_windows(entry, vector, rows, config, into_map)
}

fn decode_windows(
    child: &ColumnDecoder,
    vector: &dyn NativeVector,
    rows: Range<usize>,
    config: &CodecConfig,
    wrap: impl Fn(Vec<Value>) -> Result<Value>,
) -> Result<Vec<Value>> {
    let mut windows = Vec::with_capacity(rows.len());
    for row in rows {
        if !is_valid(vector.validity(), row) {
            windows.push(None);
            continue;
        }
        windows.push(Some(list_window(vector, row)?));
    }

    let mut spans: Vec<Range<usize>> = windows
        .iter()
        .flatten()
        .filter(|w| !w.is_empty())
        .cloned()
        .collect();
    spans.sort_by_key(|w| w.start);
    let mut segments: Vec<(Range<usize>, Vec<Value>)> = Vec::new();
    for span in spans {
        match segments.last_mut() {
            Some((range, _)) if span.start <= range.end => range.end = range.end.max(span.end),
            _ => segments.push((span, Vec::new())),
        }
    }
    let items = child_vector(vector, 0)?;
    for (range, values) in &mut segments {
        *values = child.decode_rows(items, range.clone(), config)?;
    }

    windows
        .into_iter()
        .map(|window| match window {
            None => Ok(Value::Null),
            Some(w) if w.is_empty() => wrap(Vec::new()),
            Some(w) => {
                let index = segments.partition_point(|(range, _)| range.end <= w.start);
                let slice = segments.get(index).and_then(|(range, values)| {
                    values.get(w.start - range.start..w.end - range.start)
                });
                match slice {
                    Some(slice) => wrap(slice.to_vec()),
                    None => Err(CodecError::malformed(format!(
                        "list window {}..{} outside the decoded child",
                        w.start, w.end
                    ))
                    .into()),
                }
            }
        })
        .collect()
}

/// Folds decoded `STRUCT(key, value)` entries into map pairs. A repeated key
/// keeps its first position and takes the last value.
fn into_map(entries: Vec<Value>) -> Result<Value> {
    let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = match entry {
            Value::Struct(fields) => fields,
            other => {
                return Err(CodecError::malformed(format!("MAP entry is {}", other.kind())).into())
            }
        };
        let mut fields = fields.into_iter().map(|(_, v)| v);
        let (Some(key), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(CodecError::malformed("MAP entry is not a key/value pair").into());
        };
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }
    Ok(Value::Map(pairs))
}

fn array_range(size: usize, rows: &Range<usize>) -> Result<Range<usize>> {
    let start = rows.start.checked_mul(size);
    let end = rows.end.checked_mul(size);
    start
        .zip(end)
        .map(|(start, end)| start..end)
        .ok_or_else(|| CodecError::malformed(format!("ARRAY[{}] row range overflows", size)).into())
}

pub(super) fn decode_array(
    child: &ColumnDecoder,
    size: usize,
    vector: &dyn NativeVector,
    row: usize,
    config: &CodecConfig,
) -> Result<Value> {
    let range = array_range(size, &(row..row + 1))?;
    let items = child.decode_rows(child_vector(vector, 0)?, range, config)?;
    Ok(Value::Array(items))
}

pub(super) fn decode_array_rows(
    child: &ColumnDecoder,
    size: usize,
    vector: &dyn NativeVector,
    rows: Range<usize>,
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    let items = child_vector(vector, 0)?;
    let mut values = vec![Value::Null; rows.len()];
    for run in valid_runs(vector, rows.clone()) {
        let mut decoded = child
            .decode_rows(items, array_range(size, &run)?, config)?
            .into_iter();
        for row in run {
            values[row - rows.start] = Value::Array(decoded.by_ref().take(size).collect());
        }
    }
    Ok(values)
}

/// Maximal runs of non-null rows. Children of null rows are never decoded.
fn valid_runs(vector: &dyn NativeVector, rows: Range<usize>) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = Vec::new();
    for row in rows {
        if !is_valid(vector.validity(), row) {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.end == row => run.end = row + 1,
            _ => runs.push(row..row + 1),
        }
    }
    runs
}

pub(super) fn decode_struct(
    fields: &[(String, ColumnDecoder)],
    vector: &dyn NativeVector,
    row: usize,
    config: &CodecConfig,
) -> Result<Value> {
    let mut values = Vec::with_capacity(fields.len());
    for (index, (name, decoder)) in fields.iter().enumerate() {
        let value = decoder.decode(child_vector(vector, index)?, row, config)?;
        values.push((name.clone(), value));
    }
    Ok(Value::Struct(values))
}

pub(super) fn decode_struct_rows(
    fields: &[(String, ColumnDecoder)],
    vector: &dyn NativeVector,
    rows: Range<usize>,
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    let mut values = vec![Value::Null; rows.len()];
    for run in valid_runs(vector, rows.clone()) {
        let mut columns = Vec::with_capacity(fields.len());
        for (index, (_, decoder)) in fields.iter().enumerate() {
            let column = decoder.decode_rows(child_vector(vector, index)?, run.clone(), config)?;
            columns.push(column.into_iter());
        }
        for row in run {
            let mut record = Vec::with_capacity(fields.len());
            for ((name, _), column) in fields.iter().zip(columns.iter_mut()) {
                record.push((name.clone(), column.next().unwrap_or(Value::Null)));
            }
            values[row - rows.start] = Value::Struct(record);
        }
    }
    Ok(values)
}

/// Returns the value of the member selected by the row's tag.
pub(super) fn decode_union(
    members: &[ColumnDecoder],
    vector: &dyn NativeVector,
    row: usize,
    config: &CodecConfig,
) -> Result<Value> {
    let tags = child_vector(vector, 0)?;
    if !is_valid(tags.validity(), row) {
        return Err(CodecError::malformed(format!("UNION row {} has a NULL tag", row)).into());
    }
    let tag = read_u8(tags.data(), row)? as usize;
    let member = members.get(tag).ok_or_else(|| {
        CodecError::malformed(format!(
            "UNION tag {} selects none of {} members",
            tag,
            members.len()
        ))
    })?;
    member.decode(child_vector(vector, tag + 1)?, row, config)
}
