//! Builders for synthetic `.mat`-shaped HDF5 files covering the decoder's
//! scenario families. Each builder writes a fresh file under a `TempDir`
//! (kept alive by the returned [`Fixture`]) and returns its path.

use hdf5::types::{Reference, VarLenAscii};
use hdf5::{Dataset, File, Group};
use tempfile::TempDir;
use testresult::TestResult;

use std::path::{Path, PathBuf};

/// A generated `.mat` file plus the `TempDir` that owns its storage; drop
/// order keeps the directory alive for as long as `path` is valid.
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

fn scratch_file() -> TestResult<(TempDir, File, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fixture.mat");
    let file = File::create(&path)?;
    Ok((dir, file, path))
}

fn finish(dir: TempDir, file: File, path: PathBuf) -> TestResult<Fixture> {
    drop(file);
    Ok(Fixture { _dir: dir, path })
}

fn set_matlab_class(ds: &Dataset, class: &str) -> hdf5::Result<()> {
    let value = VarLenAscii::from_ascii(class).expect("ascii class name");
    let attr = ds
        .new_attr::<VarLenAscii>()
        .shape([1, 1])
        .create("MATLAB_class")?;
    attr.write_raw(&[value])
}

fn set_matlab_empty(ds: &Dataset) -> hdf5::Result<()> {
    let attr = ds.new_attr::<u8>().shape(1).create("MATLAB_empty")?;
    attr.write_raw(&[1u8])
}

/// Writes `values` as the canonical (1, N) Time/Data payload shape.
fn write_payload_vector(container: &Group, path: &str, values: &[f64]) -> hdf5::Result<Dataset> {
    let ds = container
        .new_dataset::<f64>()
        .shape((1, values.len()))
        .create(path)?;
    ds.write_raw(values)?;
    Ok(ds)
}

/// Writes the small fixed-shape tuple a `timeseries`-classed top-level
/// dataset actually is; only element `[0, 4]` (the ordinal) is meaningful
/// to the reconstructor.
fn write_timeseries_tuple(container: &Group, path: &str, ref_idx: i64) -> hdf5::Result<Dataset> {
    let mut tuple = vec![0.0f64; 5];
    tuple[4] = ref_idx as f64;
    let ds = container.new_dataset::<f64>().shape((1, 5)).create(path)?;
    ds.write_raw(&tuple)?;
    set_matlab_class(&ds, "timeseries")?;
    Ok(ds)
}

/// Writes the MCOS metadata blob (slot 0): a binary buffer whose only
/// meaningful content is the `Time_`/`Data_` ASCII runs.
fn write_metadata_blob(container: &Group, path: &str, has_time: bool, has_data: bool) -> hdf5::Result<Dataset> {
    let mut bytes = vec![0u8, 0x01, 0x02, 0x03];
    if has_time {
        bytes.extend_from_slice(b"Time_");
        bytes.extend_from_slice(&[0xff, 0x00]);
    }
    if has_data {
        bytes.extend_from_slice(b"Data_");
        bytes.extend_from_slice(&[0xff, 0x00]);
    }
    bytes.extend_from_slice(b"Name");
    let ds = container.new_dataset::<u8>().shape(bytes.len()).create(path)?;
    ds.write_raw(&bytes)?;
    Ok(ds)
}

/// One timeseries to embed in a generated file: its composite path (may
/// contain `/` for a struct-nested timeseries), its ordinal, and its
/// Time/Data payloads. `data = None` means no Data payload is placed in
/// MCOS for it at all.
pub struct TimeseriesSpec {
    pub path: &'static str,
    pub ref_idx: i64,
    pub time: Vec<f64>,
    pub data: Option<Vec<f64>>,
}

/// Builds a file containing the given timeseries (optionally nested under
/// pre-created struct groups — callers must create those groups themselves
/// via [`create_struct_group`] before calling this). MCOS is laid out with
/// each spec's Time (then Data, if present) slot in `specs` order, matching
/// the invariant that ordinal order coincides with MCOS payload order.
pub fn build_timeseries_file(specs: &[TimeseriesSpec]) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;
    populate_timeseries(&file, specs)?;
    finish(dir, file, path)
}

/// Pre-creates a struct-classed group at `path`, for callers that want a
/// timeseries nested inside one.
pub fn create_struct_group(file: &File, path: &str) -> hdf5::Result<()> {
    let group = file.create_group(path)?;
    let value = VarLenAscii::from_ascii("struct").expect("ascii class name");
    let attr = group
        .new_attr::<VarLenAscii>()
        .shape([1, 1])
        .create("MATLAB_class")?;
    attr.write_raw(&[value])
}

/// Like [`build_timeseries_file`], but pre-creates a struct group at
/// `struct_path` first, for a timeseries nested inside one.
pub fn build_nested_timeseries_file(
    struct_path: &str,
    specs: &[TimeseriesSpec],
) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;
    create_struct_group(&file, struct_path)?;
    populate_timeseries(&file, specs)?;
    finish(dir, file, path)
}

/// Shared MCOS-building step: writes each spec's top-level tuple, the
/// metadata blob, and the Time/(optional Data) payloads, in spec order, so
/// ordinal order coincides with MCOS payload order.
fn populate_timeseries(file: &File, specs: &[TimeseriesSpec]) -> TestResult<()> {
    let has_data = specs.iter().any(|s| s.data.is_some());
    for spec in specs {
        write_timeseries_tuple(file, spec.path, spec.ref_idx)?;
    }

    let subsystem = file.create_group("#subsystem#")?;
    let meta = write_metadata_blob(&subsystem, "meta", true, has_data)?;
    let mut refs = vec![meta.reference()?];
    for (i, spec) in specs.iter().enumerate() {
        let time_ds = write_payload_vector(&subsystem, &format!("time_{i}"), &spec.time)?;
        refs.push(time_ds.reference()?);
        if let Some(data) = &spec.data {
            let data_ds = write_payload_vector(&subsystem, &format!("data_{i}"), data)?;
            refs.push(data_ds.reference()?);
        }
    }

    let ncols = refs.len();
    let mut flat = refs.clone();
    flat.extend(std::iter::repeat(Reference::default()).take(ncols));
    let mcos = subsystem
        .new_dataset::<Reference>()
        .shape((2, ncols))
        .create("MCOS")?;
    mcos.write_raw(&flat)?;
    Ok(())
}

/// A top-level 2-D numeric array declared in MATLAB shape
/// `(matlab_rows, matlab_cols)`, stored HDF5-natively as its axis reversal.
/// `matlab_data` is row-major over `(matlab_rows, matlab_cols)`.
pub fn build_2d_numeric_file(
    name: &str,
    matlab_rows: usize,
    matlab_cols: usize,
    matlab_data: &[f64],
) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;

    let hdf5_data = transpose2d(matlab_rows, matlab_cols, matlab_data);
    let ds = file
        .new_dataset::<f64>()
        .shape((matlab_cols, matlab_rows))
        .create(name)?;
    ds.write_raw(&hdf5_data)?;
    set_matlab_class(&ds, "double")?;

    finish(dir, file, path)
}

fn transpose2d(rows: usize, cols: usize, data: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

/// A top-level heterogeneous cell array `{"hello", [1.0, 2.0, 3.0], {42}}`.
pub fn build_heterogeneous_cell_file(name: &str) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;

    let units: Vec<u16> = "hello".encode_utf16().collect();
    let str_ds = file.new_dataset::<u16>().shape(units.len()).create("cell_str")?;
    str_ds.write_raw(&units)?;
    set_matlab_class(&str_ds, "char")?;

    let num_ds = file
        .new_dataset::<f64>()
        .shape(3)
        .create("cell_num")?;
    num_ds.write_raw(&[1.0, 2.0, 3.0])?;
    set_matlab_class(&num_ds, "double")?;

    let scalar_ds = file.new_dataset::<f64>().shape(1).create("cell_scalar")?;
    scalar_ds.write_raw(&[42.0])?;
    set_matlab_class(&scalar_ds, "double")?;

    let nested_cell_refs = [scalar_ds.reference()?];
    let nested_cell = file
        .new_dataset::<Reference>()
        .shape(1)
        .create("cell_nested")?;
    nested_cell.write_raw(&nested_cell_refs)?;
    set_matlab_class(&nested_cell, "cell")?;

    let top_refs = [str_ds.reference()?, num_ds.reference()?, nested_cell.reference()?];
    let top = file.new_dataset::<Reference>().shape(3).create(name)?;
    top.write_raw(&top_refs)?;
    set_matlab_class(&top, "cell")?;

    finish(dir, file, path)
}

/// A top-level numeric dataset flagged `MATLAB_empty`, the way MATLAB writes
/// e.g. `zeros(0, 3)`: a placeholder non-zero shape on disk with the real
/// (empty) shape recoverable only from the attribute.
pub fn build_empty_numeric_file(name: &str) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;

    let ds = file.new_dataset::<f64>().shape((1, 1)).create(name)?;
    ds.write_raw(&[0.0])?;
    set_matlab_class(&ds, "double")?;
    set_matlab_empty(&ds)?;

    finish(dir, file, path)
}

/// A top-level struct stored as a `(0, 0)`-shaped reference dataset, the way
/// MATLAB writes an empty struct array (`struct([])`) rather than a group.
pub fn build_empty_struct_reference_file(name: &str) -> TestResult<Fixture> {
    let (dir, file, path) = scratch_file()?;

    let ds = file.new_dataset::<Reference>().shape((0, 0)).create(name)?;
    set_matlab_class(&ds, "struct")?;

    finish(dir, file, path)
}

/// The path of an already-built fixture, for callers that just want to open
/// it via `mat73::read_variable`.
pub fn path(fixture: &Fixture) -> &Path {
    &fixture.path
}
