//! Synthetic MATLAB v7.3 fixture builders (real `.mat` files can't be
//! checked in, since there is no MATLAB toolchain in this workspace to
//! produce one). Every builder here writes an HDF5 tree via `hdf5-metno`'s
//! write API that reproduces the MATLAB v7.3 conventions `mat73` reads:
//! `MATLAB_class`/`MATLAB_empty` attributes, the `/#subsystem#/MCOS` layout,
//! and axis order as MATLAB (not HDF5) declares it.
//!
//! Mirrors the role of the teacher's `test_file_defs` (named constructors
//! for test data), adapted to generation since there are no binaries to
//! check in.

pub mod fixtures;

pub use fixtures::*;
pub use testresult::TestResult;
