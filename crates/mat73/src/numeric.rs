//! Numeric array path of the generic decoder: MATLAB declares arrays
//! column-major, HDF5 stores them row-major with axes reversed, so a read
//! needs reorienting before its shape matches what MATLAB reports.

use ndarray::{ArrayD, IxDyn};

use crate::value::{Elements, NumericArray};

/// Reorients a raw, HDF5-native (row-major, axes as reported by the file)
/// element buffer into MATLAB's declared shape.
///
/// - `ndim == 1`: returned as-is.
/// - All but at most one axis singleton: every singleton axis is squeezed;
///   the buffer order is untouched since there is nothing to transpose.
/// - Otherwise: axes are reversed and the buffer is permuted accordingly —
///   equivalent to interpreting the HDF5 buffer as MATLAB's column-major
///   storage and re-emitting it row-major.
pub fn reorient(hdf5_shape: &[usize], elements: Elements) -> (Vec<usize>, Elements) {
    if hdf5_shape.len() <= 1 {
        return (hdf5_shape.to_vec(), elements);
    }

    let singleton_axes = hdf5_shape.iter().filter(|&&d| d == 1).count();
    if singleton_axes + 1 >= hdf5_shape.len() {
        let total: usize = hdf5_shape.iter().product();
        return (vec![total], elements);
    }

    let matlab_shape: Vec<usize> = hdf5_shape.iter().rev().copied().collect();
    let elements = transpose_reverse_axes(hdf5_shape, elements);
    (matlab_shape, elements)
}

/// Builds a [`NumericArray`] from a reoriented shape/elements pair. Callers
/// are expected to have already run [`reorient`].
pub fn to_numeric_array(shape: Vec<usize>, elements: Elements) -> NumericArray {
    NumericArray {
        shape,
        kind: elements_kind(&elements),
        elements,
    }
}

fn elements_kind(elements: &Elements) -> crate::value::ElementKind {
    use crate::value::ElementKind as K;
    match elements {
        Elements::Bool(_) => K::Bool,
        Elements::I8(_) => K::I8,
        Elements::I16(_) => K::I16,
        Elements::I32(_) => K::I32,
        Elements::I64(_) => K::I64,
        Elements::U8(_) => K::U8,
        Elements::U16(_) => K::U16,
        Elements::U32(_) => K::U32,
        Elements::U64(_) => K::U64,
        Elements::F32(_) => K::F32,
        Elements::F64(_) => K::F64,
    }
}

/// Full axis-order reversal (MATLAB column-major → HDF5 row-major
/// equivalent of `data.T` in the original Python reader), done by handing
/// the buffer to `ndarray` rather than walking strides by hand.
fn reverse_axes<T: Clone>(old_shape: &[usize], data: Vec<T>) -> Vec<T> {
    let array = ArrayD::from_shape_vec(IxDyn(old_shape), data)
        .expect("element count must match the shape reported by the HDF5 dataset");
    let (data, _offset) = array
        .reversed_axes()
        .as_standard_layout()
        .into_owned()
        .into_raw_vec_and_offset();
    data
}

macro_rules! transpose_variant {
    ($shape:expr, $variant:ident, $data:expr) => {
        Elements::$variant(reverse_axes($shape, $data))
    };
}

fn transpose_reverse_axes(shape: &[usize], elements: Elements) -> Elements {
    match elements {
        Elements::Bool(d) => transpose_variant!(shape, Bool, d),
        Elements::I8(d) => transpose_variant!(shape, I8, d),
        Elements::I16(d) => transpose_variant!(shape, I16, d),
        Elements::I32(d) => transpose_variant!(shape, I32, d),
        Elements::I64(d) => transpose_variant!(shape, I64, d),
        Elements::U8(d) => transpose_variant!(shape, U8, d),
        Elements::U16(d) => transpose_variant!(shape, U16, d),
        Elements::U32(d) => transpose_variant!(shape, U32, d),
        Elements::U64(d) => transpose_variant!(shape, U64, d),
        Elements::F32(d) => transpose_variant!(shape, F32, d),
        Elements::F64(d) => transpose_variant!(shape, F64, d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_d_is_untouched() {
        let (shape, elements) = reorient(&[5], Elements::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(shape, vec![5]);
        assert_eq!(elements.as_f64_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn vector_with_singleton_axes_is_squeezed() {
        // HDF5 shape (1, 7) -> MATLAB 1x7 row vector -> squeezed to 1-D.
        let data: Vec<f64> = (0..7).map(f64::from).collect();
        let (shape, elements) = reorient(&[1, 7], Elements::F64(data.clone()));
        assert_eq!(shape, vec![7]);
        assert_eq!(elements.as_f64_vec(), data);
    }

    #[test]
    fn two_d_array_is_transposed() {
        // HDF5 shape (2, 3), row-major:
        // [[0,1,2],[3,4,5]] -> MATLAB (3, 2): [[0,3],[1,4],[2,5]]
        let data = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let (shape, elements) = reorient(&[2, 3], Elements::F64(data));
        assert_eq!(shape, vec![3, 2]);
        assert_eq!(
            elements.as_f64_vec(),
            vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]
        );
    }

    #[test]
    fn three_d_array_axes_fully_reversed() {
        // HDF5 shape (2, 2, 2), values 0..8 in row-major order.
        let data: Vec<f64> = (0..8).map(f64::from).collect();
        let (shape, elements) = reorient(&[2, 2, 2], Elements::F64(data));
        assert_eq!(shape, vec![2, 2, 2]);
        // old[i,j,k] -> new[k,j,i]; new flat (k,j,i row-major) element (0,0,0)=old(0,0,0)=0,
        // (0,0,1)=old(1,0,0)=4, (0,1,0)=old(0,1,0)=2, (0,1,1)=old(1,1,0)=6, ...
        assert_eq!(
            elements.as_f64_vec(),
            vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]
        );
    }
}
