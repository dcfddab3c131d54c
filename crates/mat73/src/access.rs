//! Thin, typed facade over `hdf5-metno`. Nothing above this module touches
//! the `hdf5` crate's types directly; every other module goes through
//! [`Handle`].

use std::io::Read as _;
use std::path::{Path, PathBuf};

use hdf5::types::{FixedAscii, FixedUnicode, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};

use crate::error::Mat73Error;
use crate::value::{ElementKind, Elements};

/// The fixed 8-byte signature every valid HDF5 file starts with.
const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// Classification of a path within the file: a group, a dataset, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset,
    Missing,
}

/// Shape, element type, and attribute names of a dataset. `element_kind` is
/// `None` for non-numeric datasets (references, strings, opaque blobs).
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub shape: Vec<usize>,
    pub element_kind: Option<ElementKind>,
    pub attr_names: Vec<String>,
}

/// A read-only, scoped-to-one-call handle on an open `.mat` file. Acquired by
/// [`Handle::open`], dropped (closing the file) at the end of the caller's
/// `read_variable`/`list_variables` invocation — there is no caching or
/// reopening inside any helper.
pub struct Handle {
    file: hdf5::File,
    path: PathBuf,
}

impl Handle {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Mat73Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Mat73Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if !has_hdf5_signature(path)? {
            return Err(Mat73Error::NotHDF5 {
                path: path.to_path_buf(),
            });
        }
        let file = hdf5::File::open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level names, in the file's stored order, excluding names starting
    /// with `'#'` — those are MATLAB's internal bookkeeping groups, never
    /// user variables.
    pub fn root_names(&self) -> Result<Vec<String>, Mat73Error> {
        Ok(self
            .file
            .member_names()?
            .into_iter()
            .filter(|n| !n.starts_with('#'))
            .collect())
    }

    /// The complement of [`Handle::root_names`]: internal bookkeeping groups
    /// such as `#subsystem#`.
    pub fn internal_names(&self) -> Result<Vec<String>, Mat73Error> {
        Ok(self
            .file
            .member_names()?
            .into_iter()
            .filter(|n| n.starts_with('#'))
            .collect())
    }

    pub fn kind(&self, path: &str) -> NodeKind {
        if self.file.dataset(path).is_ok() {
            NodeKind::Dataset
        } else if self.file.group(path).is_ok() {
            NodeKind::Group
        } else {
            NodeKind::Missing
        }
    }

    /// Immediate child names of a group, in the file's stored order. The
    /// composite path for a nested child is built by the caller from these
    /// names; this layer never re-derives or caches it.
    pub fn group_member_names(&self, path: &str) -> Result<Vec<String>, Mat73Error> {
        Ok(self.file.group(path)?.member_names()?)
    }

    pub fn dataset_info(&self, path: &str) -> Result<DatasetInfo, Mat73Error> {
        let ds = self.file.dataset(path)?;
        let element_kind = element_kind_of_dataset(&ds)?;
        Ok(DatasetInfo {
            shape: ds.shape(),
            element_kind,
            attr_names: ds.attr_names()?,
        })
    }

    /// Typed, flat, row-major (HDF5 native axis order — *not* MATLAB
    /// orientation) element read. Dispatch by [`ElementKind`] happens here so
    /// that callers never see an `hdf5::Datatype` directly.
    pub fn read_dataset_elements(&self, path: &str) -> Result<Elements, Mat73Error> {
        let ds = self.file.dataset(path)?;
        read_elements(&ds)
    }

    /// Escape hatch for classes the decoder doesn't recognize, and for the
    /// top-level dataset of a timeseries whose reconstruction failed.
    pub fn read_dataset_raw_bytes(&self, path: &str) -> Result<Vec<u8>, Mat73Error> {
        let ds = self.file.dataset(path)?;
        if let Ok(raw) = ds.read_raw::<u8>() {
            return Ok(raw);
        }
        Ok(elements_to_le_bytes(&read_elements(&ds)?))
    }

    /// Reads a dataset of object references along with its shape.
    pub fn read_references(
        &self,
        path: &str,
    ) -> Result<(Vec<hdf5::types::Reference>, Vec<usize>), Mat73Error> {
        let ds = self.file.dataset(path)?;
        let refs = ds.read_raw::<hdf5::types::Reference>()?;
        Ok((refs, ds.shape()))
    }

    /// Resolves an object reference to its absolute path, so callers can feed
    /// it back through [`Handle::kind`] / [`Handle::dataset_info`] /
    /// [`Handle::read_dataset_elements`] like any other path — no implicit
    /// re-open happens here.
    pub fn deref(&self, reference: &hdf5::types::Reference) -> Result<String, Mat73Error> {
        reference
            .name(&self.file)
            .map_err(|e| Mat73Error::BadReference {
                detail: e.to_string(),
            })
    }

    pub fn attr_names(&self, path: &str) -> Result<Vec<String>, Mat73Error> {
        match self.kind(path) {
            NodeKind::Dataset => Ok(self.file.dataset(path)?.attr_names()?),
            NodeKind::Group => Ok(self.file.group(path)?.attr_names()?),
            NodeKind::Missing => Ok(Vec::new()),
        }
    }

    /// Reads the `MATLAB_class` attribute, if present, on a dataset or group.
    /// The access layer does not interpret the value — it is returned
    /// verbatim for the decoder to dispatch on.
    pub fn matlab_class(&self, path: &str) -> Result<Option<String>, Mat73Error> {
        match self.kind(path) {
            NodeKind::Dataset => read_string_attr_opt(&self.file.dataset(path)?, "MATLAB_class"),
            NodeKind::Group => read_string_attr_opt(&self.file.group(path)?, "MATLAB_class"),
            NodeKind::Missing => Ok(None),
        }
    }

    /// Reads the `MATLAB_empty` attribute as a non-zero-is-empty flag,
    /// defaulting to `false` when absent.
    pub fn is_empty_flagged(&self, path: &str) -> Result<bool, Mat73Error> {
        match self.kind(path) {
            NodeKind::Dataset => read_empty_flag(&self.file.dataset(path)?),
            _ => Ok(false),
        }
    }
}

/// Reads the first 8 bytes of `path` and compares them against the HDF5
/// magic, so a file that simply isn't HDF5 is told apart from one that is
/// but fails to open for some other reason (permissions, truncation mid-read,
/// a locked file). A short read (file smaller than the signature) also means
/// "not HDF5" rather than an I/O failure.
fn has_hdf5_signature(path: &Path) -> Result<bool, Mat73Error> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = [0u8; 8];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(buf == HDF5_SIGNATURE),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(Mat73Error::IoError(e)),
    }
}

fn element_kind_of_dataset(ds: &hdf5::Dataset) -> Result<Option<ElementKind>, Mat73Error> {
    Ok(type_descriptor_to_kind(&ds.dtype()?.to_descriptor()?))
}

fn type_descriptor_to_kind(td: &TypeDescriptor) -> Option<ElementKind> {
    match td {
        TypeDescriptor::Boolean => Some(ElementKind::Bool),
        TypeDescriptor::Integer(IntSize::U1) => Some(ElementKind::I8),
        TypeDescriptor::Integer(IntSize::U2) => Some(ElementKind::I16),
        TypeDescriptor::Integer(IntSize::U4) => Some(ElementKind::I32),
        TypeDescriptor::Integer(IntSize::U8) => Some(ElementKind::I64),
        TypeDescriptor::Unsigned(IntSize::U1) => Some(ElementKind::U8),
        TypeDescriptor::Unsigned(IntSize::U2) => Some(ElementKind::U16),
        TypeDescriptor::Unsigned(IntSize::U4) => Some(ElementKind::U32),
        TypeDescriptor::Unsigned(IntSize::U8) => Some(ElementKind::U64),
        TypeDescriptor::Float(hdf5::types::FloatSize::U4) => Some(ElementKind::F32),
        TypeDescriptor::Float(hdf5::types::FloatSize::U8) => Some(ElementKind::F64),
        _ => None,
    }
}

fn read_elements(ds: &hdf5::Dataset) -> Result<Elements, Mat73Error> {
    let kind = element_kind_of_dataset(ds)?.ok_or_else(|| Mat73Error::Hdf5(
        hdf5::Error::from(format!(
            "unsupported element type for dataset {}",
            ds.name()
        )),
    ))?;
    Ok(match kind {
        ElementKind::Bool => Elements::Bool(ds.read_raw::<bool>()?),
        ElementKind::I8 => Elements::I8(ds.read_raw::<i8>()?),
        ElementKind::I16 => Elements::I16(ds.read_raw::<i16>()?),
        ElementKind::I32 => Elements::I32(ds.read_raw::<i32>()?),
        ElementKind::I64 => Elements::I64(ds.read_raw::<i64>()?),
        ElementKind::U8 => Elements::U8(ds.read_raw::<u8>()?),
        ElementKind::U16 => Elements::U16(ds.read_raw::<u16>()?),
        ElementKind::U32 => Elements::U32(ds.read_raw::<u32>()?),
        ElementKind::U64 => Elements::U64(ds.read_raw::<u64>()?),
        ElementKind::F32 => Elements::F32(ds.read_raw::<f32>()?),
        ElementKind::F64 => Elements::F64(ds.read_raw::<f64>()?),
    })
}

/// Serializes an already-typed element buffer to little-endian bytes, for
/// the `RawBytes` escape hatch when a dataset's element type isn't itself
/// byte-sized.
fn elements_to_le_bytes(elements: &Elements) -> Vec<u8> {
    match elements {
        Elements::Bool(v) => v.iter().map(|&b| u8::from(b)).collect(),
        Elements::I8(v) => v.iter().map(|&x| x.to_le_bytes()[0]).collect(),
        Elements::I16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::I32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::I64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::U8(v) => v.clone(),
        Elements::U16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::U32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::U64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::F32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Elements::F64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
    }
}

/// Mirrors the teacher's `read_any_attribute_to_string`, narrowed to the
/// string-only variants `MATLAB_class` ever uses, and made attribute-optional
/// since most of our callers need to handle "no such attribute" gracefully.
fn read_string_attr_opt<T: AttrHolder>(obj: &T, name: &str) -> Result<Option<String>, Mat73Error> {
    if !obj.attr_names()?.contains(&name.to_owned()) {
        return Ok(None);
    }
    let attr = obj.attr(name)?;
    let value = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenAscii => {
            let v: VarLenAscii = attr.read_scalar()?;
            v.as_str().to_owned()
        }
        TypeDescriptor::VarLenUnicode => {
            let v: VarLenUnicode = attr.read_scalar()?;
            v.as_str().to_owned()
        }
        TypeDescriptor::FixedAscii(_) => {
            let v: FixedAscii = attr.read_scalar()?;
            v.as_str().trim_end_matches('\0').to_owned()
        }
        TypeDescriptor::FixedUnicode(_) => {
            let v: FixedUnicode = attr.read_scalar()?;
            v.as_str().trim_end_matches('\0').to_owned()
        }
        other => {
            return Err(Mat73Error::Hdf5(hdf5::Error::from(format!(
                "unsupported attribute type for '{name}': {other}"
            ))));
        }
    };
    Ok(Some(value))
}

fn read_empty_flag<T: AttrHolder>(obj: &T) -> Result<bool, Mat73Error> {
    if !obj.attr_names()?.contains(&"MATLAB_empty".to_owned()) {
        return Ok(false);
    }
    let attr = obj.attr("MATLAB_empty")?;
    let value: u64 = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(IntSize::U1) | TypeDescriptor::Unsigned(IntSize::U1) => {
            u64::from(attr.read_scalar::<u8>()?)
        }
        TypeDescriptor::Integer(IntSize::U2) | TypeDescriptor::Unsigned(IntSize::U2) => {
            u64::from(attr.read_scalar::<u16>()?)
        }
        TypeDescriptor::Integer(IntSize::U4) | TypeDescriptor::Unsigned(IntSize::U4) => {
            u64::from(attr.read_scalar::<u32>()?)
        }
        TypeDescriptor::Integer(IntSize::U8) | TypeDescriptor::Unsigned(IntSize::U8) => {
            attr.read_scalar::<u64>()?
        }
        TypeDescriptor::Boolean => u64::from(attr.read_scalar::<bool>()?),
        _ => 0,
    };
    Ok(value != 0)
}

/// Local trait bridging `Dataset` and `Group`'s shared attribute surface,
/// since both expose `attr_names`/`attr` but don't share a public supertrait
/// for it in `hdf5-metno`.
trait AttrHolder {
    fn attr_names(&self) -> hdf5::Result<Vec<String>>;
    fn attr(&self, name: &str) -> hdf5::Result<hdf5::Attribute>;
}

impl AttrHolder for hdf5::Dataset {
    fn attr_names(&self) -> hdf5::Result<Vec<String>> {
        hdf5::Dataset::attr_names(self)
    }
    fn attr(&self, name: &str) -> hdf5::Result<hdf5::Attribute> {
        hdf5::Dataset::attr(self, name)
    }
}

impl AttrHolder for hdf5::Group {
    fn attr_names(&self) -> hdf5::Result<Vec<String>> {
        hdf5::Group::attr_names(self)
    }
    fn attr(&self, name: &str) -> hdf5::Result<hdf5::Attribute> {
        hdf5::Group::attr(self, name)
    }
}
