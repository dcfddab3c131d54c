use std::collections::BTreeMap;

/// Syntactic classification of a numeric array's elements, derived purely
/// from the MATLAB class string. `logical` becomes `Bool`; complex numbers
/// are out of scope and never reach this type — a complex-typed dataset
/// decodes to [`Value::RawBytes`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// One decoded, row-major numeric array, already reoriented into MATLAB's
/// declared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub shape: Vec<usize>,
    pub kind: ElementKind,
    pub elements: Elements,
}

/// Element storage, kept as typed vectors rather than a single `Vec<f64>` so
/// that integer/bool arrays round-trip without precision loss. All variants
/// are stored in row-major order matching `NumericArray::shape`.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Elements {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best-effort conversion to `f64`, used by the timeseries reconstructor
    /// (which only ever deals in `float64` payloads) and by tests that want
    /// to spot-check values regardless of the source kind.
    pub fn as_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::Bool(v) => v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
            Self::I8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::I64(v) => v.iter().map(|&x| x as f64).collect(),
            Self::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::U16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::U32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::U64(v) => v.iter().map(|&x| x as f64).collect(),
            Self::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::F64(v) => v.clone(),
        }
    }
}

/// The decoder's universal return type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Scalar(f64),
    NumericArray(NumericArray),
    String(String),
    CellArray(Vec<Value>),
    /// Field order preserved as encountered in the file, not sorted.
    Struct(Vec<(String, Value)>),
    Timeseries { time: Vec<f64>, data: NumericArray },
    /// Escape hatch for classes not otherwise recognized, and for a
    /// top-level `timeseries` dataset whose reconstruction failed.
    RawBytes(Vec<u8>),
}

impl Value {
    /// Field lookup for [`Value::Struct`], by field name order being
    /// irrelevant to the caller at this point.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Convenience view as an ordered map, for callers that don't care about
    /// field order (the decoder itself always preserves it).
    pub fn struct_fields(&self) -> Option<BTreeMap<&str, &Value>> {
        match self {
            Self::Struct(fields) => {
                Some(fields.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
            _ => None,
        }
    }
}
