//! Generic Value Decoder. Dispatches on `MATLAB_class`; nothing here ever
//! fails the enclosing call — every failure mode downgrades to a
//! less-specific `Value` variant instead.

use crate::access::{Handle, NodeKind};
use crate::config::Mat73Config;
use crate::numeric::{reorient, to_numeric_array};
use crate::text::decode_utf16le_bytes;
use crate::timeseries::read_timeseries;
use crate::value::Value;

/// Translates the node at `path` into a [`Value`] by inspecting its
/// `MATLAB_class` attribute.
pub fn decode(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    if handle.is_empty_flagged(path).unwrap_or(false) {
        return Value::Empty;
    }

    let class = handle.matlab_class(path).unwrap_or(None);
    match class.as_deref() {
        None => decode_unclassed(handle, path, cfg),
        Some("char") | Some("string") => decode_text(handle, path),
        Some("cell") => decode_cell(handle, path, cfg),
        Some("struct") => decode_struct(handle, path, cfg),
        Some("timeseries") => decode_timeseries(handle, path, cfg),
        Some("double") | Some("single") | Some("logical") | Some("int8") | Some("int16")
        | Some("int32") | Some("int64") | Some("uint8") | Some("uint16") | Some("uint32")
        | Some("uint64") => decode_numeric(handle, path),
        Some(_other) => decode_raw(handle, path),
    }
}

/// A group with no `MATLAB_class` attribute defaults to `struct`; a dataset
/// with no attribute falls through to the raw escape hatch.
fn decode_unclassed(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    match handle.kind(path) {
        NodeKind::Group => decode_struct(handle, path, cfg),
        NodeKind::Dataset => decode_raw(handle, path),
        NodeKind::Missing => Value::RawBytes(Vec::new()),
    }
}

fn decode_text(handle: &Handle, path: &str) -> Value {
    match handle.read_dataset_raw_bytes(path) {
        Ok(bytes) => Value::String(decode_utf16le_bytes(&bytes)),
        Err(e) => {
            log::warn!("failed to read char/string dataset '{path}': {e}");
            Value::String(String::new())
        }
    }
}

fn decode_numeric(handle: &Handle, path: &str) -> Value {
    let Ok(info) = handle.dataset_info(path) else {
        log::warn!("failed to read dataset_info for numeric path '{path}'");
        return Value::RawBytes(Vec::new());
    };
    let Ok(elements) = handle.read_dataset_elements(path) else {
        log::warn!("failed to read elements for numeric path '{path}'");
        return Value::RawBytes(Vec::new());
    };
    let (shape, elements) = reorient(&info.shape, elements);
    if elements.is_empty() {
        return Value::Empty;
    }
    if shape.len() <= 1 && elements.len() == 1 {
        return Value::Scalar(elements.as_f64_vec()[0]);
    }
    Value::NumericArray(to_numeric_array(shape, elements))
}

fn decode_cell(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    let Ok((refs, _shape)) = handle.read_references(path) else {
        log::warn!("failed to read cell references at '{path}'");
        return Value::CellArray(Vec::new());
    };
    let items = refs
        .iter()
        .map(|r| match handle.deref(r) {
            Ok(target) => decode(handle, &target, cfg),
            Err(e) => {
                log::warn!("malformed cell entry in '{path}': {e}");
                Value::Empty
            }
        })
        .collect();
    Value::CellArray(items)
}

fn decode_struct(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    match handle.kind(path) {
        NodeKind::Group => {
            let Ok(children) = handle.group_member_names(path) else {
                return Value::Struct(Vec::new());
            };
            let fields = children
                .into_iter()
                .map(|name| {
                    let child_path = format!("{path}/{name}");
                    let value = decode(handle, &child_path, cfg);
                    (name, value)
                })
                .collect();
            Value::Struct(fields)
        }
        NodeKind::Dataset => decode_struct_as_reference(handle, path, cfg),
        NodeKind::Missing => Value::Struct(Vec::new()),
    }
}

/// Some structs are stored as a dataset of references rather than a group;
/// `ds[0,0]` names the backing group. A `(0,0)`-shaped reference array has
/// no such element and decodes to `Empty`.
fn decode_struct_as_reference(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    let Ok((refs, shape)) = handle.read_references(path) else {
        return Value::Struct(Vec::new());
    };
    if shape.iter().product::<usize>() == 0 {
        return Value::Empty;
    }
    let Some(first) = refs.first() else {
        return Value::Empty;
    };
    match handle.deref(first) {
        Ok(target) => decode_struct(handle, &target, cfg),
        Err(e) => {
            log::warn!("dangling struct reference at '{path}': {e}");
            Value::Struct(Vec::new())
        }
    }
}

fn decode_timeseries(handle: &Handle, path: &str, cfg: &Mat73Config) -> Value {
    match read_timeseries(handle, path, cfg) {
        Ok(payload) => Value::Timeseries {
            time: payload.time,
            data: payload.data,
        },
        Err(e) => {
            log::warn!("timeseries reconstruction failed for '{path}' at stage '{}': {}", e.stage, e.detail);
            decode_raw(handle, path)
        }
    }
}

fn decode_raw(handle: &Handle, path: &str) -> Value {
    match handle.read_dataset_raw_bytes(path) {
        Ok(bytes) => Value::RawBytes(bytes),
        Err(e) => {
            log::warn!("failed to read raw bytes for '{path}': {e}");
            Value::RawBytes(Vec::new())
        }
    }
}

