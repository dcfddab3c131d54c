//! Timeseries Reconstructor — the hardest component. Given a path to a
//! dataset whose `MATLAB_class` is `timeseries`, computes which MCOS slot
//! holds its Time payload and which holds its Data payload.
//!
//! Stages 1, 3, 5, and 6 are pure functions ([`metadata`], [`allocate`]) so
//! the allocation algorithm is unit-testable without an HDF5 file; this
//! module wires them to the access layer for Stages 2, 4, and 7, which do
//! need to walk the file.

mod allocate;
mod metadata;

use crate::access::{Handle, NodeKind};
use crate::config::Mat73Config;
use crate::error::ReconstructionError;
use crate::numeric::{reorient, to_numeric_array};
use crate::value::NumericArray;

const MCOS_PATH: &str = "#subsystem#/MCOS";

/// The reconstructed `{Time, Data}` pair backing a MATLAB `timeseries`
/// object.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesPayload {
    pub time: Vec<f64>,
    pub data: NumericArray,
}

fn fail(stage: &'static str, detail: impl std::fmt::Display) -> ReconstructionError {
    ReconstructionError::new(stage, detail.to_string())
}

/// Entry point for `mat73::decode`.
pub fn read_timeseries(
    handle: &Handle,
    path: &str,
    cfg: &Mat73Config,
) -> Result<TimeseriesPayload, ReconstructionError> {
    if handle.kind(MCOS_PATH) != NodeKind::Dataset {
        return Err(fail("mcos-lookup", "no /#subsystem#/MCOS dataset in file"));
    }
    let (refs, mcos_shape) =
        handle.read_references(MCOS_PATH).map_err(|e| fail("mcos-lookup", e))?;
    let cols = *mcos_shape
        .get(1)
        .ok_or_else(|| fail("mcos-lookup", "MCOS dataset is not 2-D"))?;
    if cols == 0 {
        return Err(fail("mcos-lookup", "MCOS has no slots"));
    }
    // First row of the MCOS dataset is the canonical slot vector.
    let slots = &refs[0..cols];

    let structure = probe_metadata(handle, slots).unwrap_or_else(|_| metadata::TimeseriesStructure::assume_both());
    if !structure.has_time {
        return Err(fail("metadata-probe", "blob has no Time_ property"));
    }

    let ts_list = enumerate_timeseries(handle).map_err(|e| fail("enumeration", e))?;
    let sorted = allocate::sort_by_ordinal(ts_list);

    let candidates = candidate_time_slots(handle, slots).map_err(|e| fail("slot-scan", e))?;
    let selected =
        allocate::select_time_slots(&candidates, sorted.len(), structure.columns_per_ts(), cfg);
    let allocation = allocate::allocate_time_slots(&sorted, &selected);

    let time_slot = allocation
        .iter()
        .find(|(name, _)| *name == path)
        .ok_or_else(|| fail("allocation", format!("'{path}' was not enumerated as a timeseries")))?
        .1
        .ok_or_else(|| fail("allocation", format!("no Time slot allocated for '{path}'")))?;

    let time_ref = slots
        .get(time_slot)
        .ok_or_else(|| fail("allocation", "allocated Time slot is out of range"))?;
    let time_path = handle.deref(time_ref).map_err(|e| fail("allocation", e))?;
    let time_info = handle
        .dataset_info(&time_path)
        .map_err(|e| fail("data-pairing", e))?;
    let n_samples = *time_info
        .shape
        .get(1)
        .ok_or_else(|| fail("data-pairing", "Time payload is not shaped (1, N)"))?;
    let time = handle
        .read_dataset_elements(&time_path)
        .map_err(|e| fail("data-pairing", e))?
        .as_f64_vec();

    let data_slot = find_data_slot(handle, slots, time_slot, n_samples, cfg)?;
    let data_path = handle.deref(&slots[data_slot]).map_err(|e| fail("data-pairing", e))?;
    let data_info = handle
        .dataset_info(&data_path)
        .map_err(|e| fail("data-pairing", e))?;
    let data_elements = handle
        .read_dataset_elements(&data_path)
        .map_err(|e| fail("data-pairing", e))?;
    let (data_shape, data_elements) = reorient(&data_info.shape, data_elements);
    let data = to_numeric_array(data_shape, data_elements);

    Ok(TimeseriesPayload { time, data })
}

/// Stage 1, wired to the file: dereferences slot 0 and reads it as the
/// metadata blob.
fn probe_metadata(
    handle: &Handle,
    slots: &[hdf5::types::Reference],
) -> Result<metadata::TimeseriesStructure, String> {
    let slot0 = slots.first().ok_or("MCOS has no metadata slot")?;
    let path = handle.deref(slot0).map_err(|e| e.to_string())?;
    let blob = handle
        .read_dataset_raw_bytes(&path)
        .map_err(|e| e.to_string())?;
    Ok(metadata::probe(&blob))
}

/// Stage 2 — depth-first enumeration of every `timeseries`-classed dataset
/// in the file, collecting `(composite_path, reference_index)`.
pub(crate) fn enumerate_timeseries(handle: &Handle) -> Result<Vec<(String, i64)>, crate::error::Mat73Error> {
    let mut out = Vec::new();
    let root = handle.root_names()?;
    walk_for_timeseries(handle, None, &root, &mut out)?;
    Ok(out)
}

fn walk_for_timeseries(
    handle: &Handle,
    prefix: Option<&str>,
    names: &[String],
    out: &mut Vec<(String, i64)>,
) -> Result<(), crate::error::Mat73Error> {
    for name in names {
        let composite = match prefix {
            Some(p) => format!("{p}/{name}"),
            None => name.clone(),
        };
        match handle.kind(&composite) {
            NodeKind::Dataset => {
                if handle.matlab_class(&composite)?.as_deref() == Some("timeseries") {
                    let ref_idx = read_reference_index(handle, &composite)?;
                    out.push((composite, ref_idx));
                }
            }
            NodeKind::Group => {
                let children = handle.group_member_names(&composite)?;
                walk_for_timeseries(handle, Some(&composite), &children, out)?;
            }
            NodeKind::Missing => {}
        }
    }
    Ok(())
}

/// Reads the reference/ordinal integer at element `[0, 4]` of a timeseries'
/// top-level tuple. HDF5-native indexing, not reoriented — this is a small
/// fixed-shape record, not a MATLAB array.
fn read_reference_index(handle: &Handle, path: &str) -> Result<i64, crate::error::Mat73Error> {
    // Row 0 of a row-major (HDF5-native) 2-D buffer starts at flat offset 0,
    // so element [0, 4] is just flat index 4 regardless of column count.
    let flat = handle.read_dataset_elements(path)?.as_f64_vec();
    Ok(flat.get(4).copied().unwrap_or(0.0) as i64)
}

/// Stage 4 — scans MCOS slots 1..K for ones matching the canonical Time
/// payload signature: a non-empty, float64, (1, N>=2) dataset.
fn candidate_time_slots(
    handle: &Handle,
    slots: &[hdf5::types::Reference],
) -> Result<Vec<usize>, String> {
    let mut candidates = Vec::new();
    for (idx, reference) in slots.iter().enumerate().skip(1) {
        if is_null_reference(reference) {
            continue;
        }
        let Ok(path) = handle.deref(reference) else {
            continue;
        };
        if handle.kind(&path) != NodeKind::Dataset {
            continue;
        }
        if handle.is_empty_flagged(&path).unwrap_or(false) {
            continue;
        }
        let Ok(info) = handle.dataset_info(&path) else {
            continue;
        };
        if info.element_kind != Some(crate::value::ElementKind::F64) {
            continue;
        }
        if info.shape.len() == 2 && info.shape[0] == 1 && info.shape[1] >= 2 {
            candidates.push(idx);
        }
    }
    Ok(candidates)
}

/// Stage 7 — scans up to `cfg.data_search_window` slots after the Time slot
/// for a float64 dataset with an axis matching `n_samples`.
fn find_data_slot(
    handle: &Handle,
    slots: &[hdf5::types::Reference],
    time_slot: usize,
    n_samples: usize,
    cfg: &Mat73Config,
) -> Result<usize, ReconstructionError> {
    let last = (time_slot + cfg.data_search_window).min(slots.len().saturating_sub(1));
    for idx in (time_slot + 1)..=last {
        let reference = &slots[idx];
        if is_null_reference(reference) {
            continue;
        }
        let Ok(path) = handle.deref(reference) else {
            continue;
        };
        if handle.kind(&path) != NodeKind::Dataset {
            continue;
        }
        let Ok(info) = handle.dataset_info(&path) else {
            continue;
        };
        if info.element_kind != Some(crate::value::ElementKind::F64) {
            continue;
        }
        if info.shape.contains(&n_samples) {
            return Ok(idx);
        }
    }
    Err(fail(
        "data-pairing",
        format!("no Data payload found within {} slots of Time slot {time_slot}", cfg.data_search_window),
    ))
}

fn is_null_reference(reference: &hdf5::types::Reference) -> bool {
    *reference == hdf5::types::Reference::default()
}
