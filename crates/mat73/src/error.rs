use std::path::PathBuf;

/// Error taxonomy for `mat73`.
///
/// Two axes, per the file-level/variable-level/decoder-level/stage-level split:
/// file- and variable-level errors are fatal to the enclosing call, decoder-level
/// issues on a specific value are downgraded ([`crate::value::Value::RawBytes`]
/// or a lossy decode) rather than returned here, and a reconstruction failure is
/// only ever surfaced through this type when it escapes `decode` entirely (i.e.
/// when the caller asked for the timeseries directly via
/// [`crate::timeseries::read_timeseries`]).
#[derive(Debug, thiserror::Error)]
pub enum Mat73Error {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("not an HDF5 file: {path}")]
    NotHDF5 { path: PathBuf },

    #[error("variable '{name}' not found, available: [{}]", available.join(", "))]
    VariableNotFound { name: String, available: Vec<String> },

    #[error("timeseries reconstruction failed at stage '{stage}': {detail}")]
    ReconstructionFailed { stage: &'static str, detail: String },

    #[error("dangling HDF5 reference: {detail}")]
    BadReference { detail: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

/// Failure of [`crate::timeseries::read_timeseries`] alone, named by the stage
/// at which the reconstruction gave up. Kept distinct from
/// [`Mat73Error`] so the generic decoder can catch it and downgrade to
/// `RawBytes` without growing a dependency on the full error enum's other
/// variants.
#[derive(Debug, thiserror::Error)]
#[error("stage '{stage}': {detail}")]
pub struct ReconstructionError {
    pub stage: &'static str,
    pub detail: String,
}

impl ReconstructionError {
    pub(crate) fn new(stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

impl From<ReconstructionError> for Mat73Error {
    fn from(e: ReconstructionError) -> Self {
        Mat73Error::ReconstructionFailed {
            stage: e.stage,
            detail: e.detail,
        }
    }
}
