//! Reads MATLAB v7.3 `.mat` files (HDF5 containers with MATLAB-specific
//! conventions) and reconstructs typed, native values: numeric arrays,
//! strings, cell arrays, structs, and MCOS-encoded `timeseries` objects.
//!
//! Entry points are [`read_variable`] and [`list_variables`]; everything
//! else is an implementation detail reachable only through those two calls
//! or, for callers that need the lower-level pieces, the public submodules.

pub mod access;
pub mod config;
pub mod decode;
pub mod error;
pub mod list;
pub mod numeric;
pub mod text;
pub mod timeseries;
pub mod value;

use std::collections::BTreeMap;
use std::path::Path;

pub use config::Mat73Config;
pub use error::Mat73Error;
pub use value::{ElementKind, Elements, NumericArray, Value};

/// Reads one top-level variable, with the default [`Mat73Config`].
pub fn read_variable(path: impl AsRef<Path>, name: &str) -> Result<Value, Mat73Error> {
    read_variable_with_config(path, name, &Mat73Config::default())
}

/// Reads one top-level variable. Opens the file, resolves `name` against
/// the root names, decodes it, and closes the file before returning.
pub fn read_variable_with_config(
    path: impl AsRef<Path>,
    name: &str,
    cfg: &Mat73Config,
) -> Result<Value, Mat73Error> {
    let handle = access::Handle::open(path)?;
    if handle.kind(name) == access::NodeKind::Missing {
        let mut available = handle.root_names()?;
        available.sort();
        return Err(Mat73Error::VariableNotFound {
            name: name.to_owned(),
            available,
        });
    }
    Ok(decode::decode(&handle, name, cfg))
}

/// Enumerates top-level non-internal variables with their MATLAB class and
/// shape.
pub fn list_variables(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>, Mat73Error> {
    let handle = access::Handle::open(path)?;
    list::list_variables(&handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mat73_test_util::{
        TimeseriesSpec, build_2d_numeric_file, build_empty_numeric_file,
        build_empty_struct_reference_file, build_heterogeneous_cell_file,
        build_nested_timeseries_file, build_timeseries_file,
    };
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn linspace(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    #[test_log::test]
    fn single_timeseries_reconstructs_time_and_data() -> TestResult {
        let time = linspace(1000, 0.01);
        let data: Vec<f64> = time.iter().map(|t| t.sin()).collect();
        let fixture = build_timeseries_file(&[TimeseriesSpec {
            path: "sig",
            ref_idx: 0,
            time: time.clone(),
            data: Some(data.clone()),
        }])?;

        let value = read_variable(&fixture.path, "sig")?;
        let Value::Timeseries { time: got_time, data: got_data } = value else {
            panic!("expected Timeseries, got {value:?}");
        };
        assert_eq!(got_time.len(), 1000);
        assert!((got_time[0]).abs() < 1e-9);
        assert!((got_time[999] - 9.99).abs() < 1e-9);
        assert_eq!(got_data.elements.as_f64_vec(), data);
        Ok(())
    }

    #[test_log::test]
    fn multiple_timeseries_each_decode_correctly() -> TestResult {
        let alpha_time = linspace(100, 1.0);
        let alpha_data = vec![1.0; 100];
        let beta_time = linspace(200, 1.0);
        let beta_data: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let gamma_time = linspace(50, 1.0);
        let gamma_data = vec![2.0; 50];

        let fixture = build_timeseries_file(&[
            TimeseriesSpec { path: "alpha", ref_idx: 10, time: alpha_time, data: Some(alpha_data.clone()) },
            TimeseriesSpec { path: "beta", ref_idx: 20, time: beta_time, data: Some(beta_data.clone()) },
            TimeseriesSpec { path: "gamma", ref_idx: 30, time: gamma_time, data: Some(gamma_data.clone()) },
        ])?;

        for (name, expected_len, expected_data) in [
            ("alpha", 100, &alpha_data),
            ("beta", 200, &beta_data),
            ("gamma", 50, &gamma_data),
        ] {
            let Value::Timeseries { time, data } = read_variable(&fixture.path, name)? else {
                panic!("expected Timeseries for '{name}'");
            };
            assert_eq!(time.len(), expected_len);
            assert_eq!(&data.elements.as_f64_vec(), expected_data);
        }
        Ok(())
    }

    #[test_log::test]
    fn nested_timeseries_inside_struct() -> TestResult {
        let u_time = linspace(500, 0.1);
        let u_data = u_time.clone();
        let v_time = linspace(500, 0.1);
        let v_data: Vec<f64> = v_time.iter().map(|t| t * 2.0).collect();

        let fixture = build_nested_timeseries_file(
            "pkg",
            &[
                TimeseriesSpec { path: "pkg/u", ref_idx: 1, time: u_time, data: Some(u_data.clone()) },
                TimeseriesSpec { path: "pkg/v", ref_idx: 2, time: v_time, data: Some(v_data.clone()) },
            ],
        )?;

        let Value::Struct(fields) = read_variable(&fixture.path, "pkg")? else {
            panic!("expected Struct");
        };
        let u = fields.iter().find(|(n, _)| n == "u").map(|(_, v)| v).expect("field u");
        let v = fields.iter().find(|(n, _)| n == "v").map(|(_, v)| v).expect("field v");
        let Value::Timeseries { data: u_data_got, .. } = u else { panic!("u is not a timeseries") };
        let Value::Timeseries { data: v_data_got, .. } = v else { panic!("v is not a timeseries") };
        assert_eq!(u_data_got.elements.as_f64_vec(), u_data);
        assert_eq!(v_data_got.elements.as_f64_vec(), v_data);
        Ok(())
    }

    #[test_log::test]
    fn two_d_numeric_array_matches_matlab_orientation() -> TestResult {
        let matlab_data = vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]; // row-major over (3, 2)
        let fixture = build_2d_numeric_file("arr2d", 3, 2, &matlab_data)?;

        let Value::NumericArray(array) = read_variable(&fixture.path, "arr2d")? else {
            panic!("expected NumericArray");
        };
        assert_eq!(array.shape, vec![3, 2]);
        assert_eq!(array.elements.as_f64_vec(), matlab_data);
        Ok(())
    }

    #[test_log::test]
    fn heterogeneous_cell_array_preserves_order_and_types() -> TestResult {
        let fixture = build_heterogeneous_cell_file("my_cell")?;

        let Value::CellArray(items) = read_variable(&fixture.path, "my_cell")? else {
            panic!("expected CellArray");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], Value::String(s) if s == "hello"));
        assert!(matches!(&items[1], Value::NumericArray(a) if a.shape == vec![3]));
        match &items[2] {
            Value::CellArray(inner) => {
                assert_eq!(inner.len(), 1);
                assert!(matches!(inner[0], Value::Scalar(v) if (v - 42.0).abs() < 1e-9));
            }
            other => panic!("expected nested CellArray, got {other:?}"),
        }
        Ok(())
    }

    #[test_log::test]
    fn variable_not_found_lists_available_names() -> TestResult {
        let fixture = build_2d_numeric_file("arr2d", 2, 2, &[1.0, 2.0, 3.0, 4.0])?;
        let err = read_variable(&fixture.path, "nonexistent").unwrap_err();
        match err {
            Mat73Error::VariableNotFound { name, available } => {
                assert_eq!(name, "nonexistent");
                assert!(!available.is_empty());
                let mut sorted = available.clone();
                sorted.sort();
                assert_eq!(available, sorted);
            }
            other => panic!("expected VariableNotFound, got {other:?}"),
        }
        Ok(())
    }

    #[test_log::test]
    fn timeseries_without_data_payload_falls_back_to_raw_bytes() -> TestResult {
        let time = linspace(300, 1.0);
        let fixture = build_timeseries_file(&[TimeseriesSpec {
            path: "nodata",
            ref_idx: 0,
            time,
            data: None,
        }])?;

        let value = read_variable(&fixture.path, "nodata")?;
        assert!(matches!(value, Value::RawBytes(_)));
        Ok(())
    }

    #[test_log::test]
    fn listing_reports_class_and_shape() -> TestResult {
        let fixture = build_2d_numeric_file("arr2d", 3, 2, &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0])?;
        let listing = list_variables(&fixture.path)?;
        assert_eq!(listing.get("arr2d").map(String::as_str), Some("double (3\u{d7}2)"));
        Ok(())
    }

    #[test_log::test]
    fn matlab_empty_flagged_numeric_dataset_decodes_to_empty() -> TestResult {
        let fixture = build_empty_numeric_file("empty_arr")?;
        let value = read_variable(&fixture.path, "empty_arr")?;
        assert_eq!(value, Value::Empty);
        Ok(())
    }

    #[test_log::test]
    fn zero_by_zero_struct_reference_dataset_decodes_to_empty() -> TestResult {
        let fixture = build_empty_struct_reference_file("empty_struct")?;
        let value = read_variable(&fixture.path, "empty_struct")?;
        assert_eq!(value, Value::Empty);
        Ok(())
    }
}
