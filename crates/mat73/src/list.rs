//! Enumerates top-level variables for display, without decoding their
//! contents.

use std::collections::BTreeMap;

use crate::access::{Handle, NodeKind};
use crate::error::Mat73Error;

/// One top-level variable's name, MATLAB class, and shape (in MATLAB
/// orientation — axes reversed from HDF5). `shape` is `None` for classes
/// with no array shape of their own (cells, structs, groups).
pub fn list_top_level(handle: &Handle) -> Result<Vec<(String, String, Option<Vec<usize>>)>, Mat73Error> {
    let names = handle.root_names()?;
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let class = handle
            .matlab_class(&name)?
            .unwrap_or_else(|| "struct".to_owned());
        let shape = match handle.kind(&name) {
            NodeKind::Dataset => {
                let info = handle.dataset_info(&name)?;
                Some(matlab_orientation(&info.shape))
            }
            NodeKind::Group | NodeKind::Missing => None,
        };
        out.push((name, class, shape));
    }
    Ok(out)
}

/// Reverses HDF5 axis order to MATLAB's declared order, without touching
/// element data (this is the shape-only counterpart of
/// [`crate::numeric::reorient`], used purely for display).
fn matlab_orientation(hdf5_shape: &[usize]) -> Vec<usize> {
    hdf5_shape.iter().rev().copied().collect()
}

/// Formats a class/shape pair the way MATLAB convention does, e.g.
/// `"double (20x50)"` for a 2-D array, or just the class name when there is
/// no shape.
fn format_class_with_shape(class: &str, shape: Option<&[usize]>) -> String {
    match shape {
        Some(dims) if !dims.is_empty() => {
            let joined = dims
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\u{d7}");
            format!("{class} ({joined})")
        }
        _ => class.to_owned(),
    }
}

/// Public callable surface: name -> `"class (shapexshape)"`, alphabetically
/// ordered by construction via `BTreeMap`.
pub fn list_variables(handle: &Handle) -> Result<BTreeMap<String, String>, Mat73Error> {
    Ok(list_top_level(handle)?
        .into_iter()
        .map(|(name, class, shape)| {
            let formatted = format_class_with_shape(&class, shape.as_deref());
            (name, formatted)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_reverses_axes() {
        assert_eq!(matlab_orientation(&[20, 50]), vec![50, 20]);
    }

    #[test]
    fn formats_class_with_shape() {
        assert_eq!(
            format_class_with_shape("double", Some(&[50, 20])),
            "double (50\u{d7}20)"
        );
    }

    #[test]
    fn formats_class_without_shape() {
        assert_eq!(format_class_with_shape("struct", None), "struct");
    }
}
