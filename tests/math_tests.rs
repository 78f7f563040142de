use neural_ff::approx::{ApproxEquality, approx_eq_within};
use neural_ff::math::{add_col, add_row, multiply, remove_col, remove_row, transpose};
use neural_ff::tensors::TensorBuf;
use neural_ff::{Error, ErrorKind, rng::seeded_rng, tensor};
use rand::Rng;

#[test]
fn test_multiply_known_values() {
    let a = tensor!([[4.0, 3.0], [2.0, 1.0]]);
    let b = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    let c = multiply(&a, &b).unwrap();
    assert_eq!(c, tensor!([[13.0, 20.0], [5.0, 8.0]]));
}

#[test]
fn test_multiply_rectangular() {
    let a = tensor!([[1.0, 2.0, 3.0]]);
    let b = tensor!([[1.0], [1.0], [2.0]]);
    let c = multiply(&a, &b).unwrap();
    assert_eq!(c.shape(), &[1, 1]);
    assert_eq!(c.data(), &[9.0]);
}

#[test]
fn test_transpose_known_values() {
    let t = transpose(&tensor!([[5.0, 4.0, 3.0], [2.0, 1.0, 0.0]])).unwrap();
    assert_eq!(t, tensor!([[5.0, 2.0], [4.0, 1.0], [3.0, 0.0]]));
}

#[test]
fn test_transpose_twice_is_identity() {
    let mut rng = seeded_rng(Some(11));
    for _ in 0..20 {
        let (r, c): (usize, usize) = (rng.random_range(1..8), rng.random_range(1..8));
        let m = TensorBuf::random([r, c], 0.0, 1.0, &mut rng).unwrap();
        assert_eq!(transpose(&transpose(&m).unwrap()).unwrap(), m);
    }
}

#[test]
fn test_product_transpose_identity() {
    let mut rng = seeded_rng(Some(12));
    for _ in 0..20 {
        let (m, k, n): (usize, usize, usize) = (
            rng.random_range(1..10),
            rng.random_range(1..10),
            rng.random_range(1..10),
        );
        let a = TensorBuf::random([m, k], 0.0, 1.0, &mut rng).unwrap();
        let b = TensorBuf::random([k, n], 0.0, 1.0, &mut rng).unwrap();

        let lhs = transpose(&multiply(&a, &b).unwrap()).unwrap();
        let rhs = multiply(&transpose(&b).unwrap(), &transpose(&a).unwrap()).unwrap();
        assert!(approx_eq_within(&*lhs, &*rhs, ApproxEquality::Relative));
    }
}

#[test]
fn test_add_col_known_values() {
    let m = add_col(&tensor!([[5.0, 4.0, 3.0, 2.0, 1.0]]), 1.0).unwrap();
    assert_eq!(m, tensor!([[5.0, 4.0, 3.0, 2.0, 1.0, 1.0]]));
}

#[test]
fn test_add_remove_are_inverse() {
    let mut rng = seeded_rng(Some(13));
    for _ in 0..20 {
        let (r, c): (usize, usize) = (rng.random_range(1..6), rng.random_range(1..6));
        let m = TensorBuf::random([r, c], 0.0, 1.0, &mut rng).unwrap();

        let with_col = add_col(&m, 7.0).unwrap();
        assert_eq!(with_col.shape(), &[r, c + 1]);
        assert!((0..r).all(|i| with_col.at(&[i, c]).unwrap() == 7.0));
        assert_eq!(remove_col(&with_col).unwrap(), m);

        let with_row = add_row(&m, -2.0).unwrap();
        assert_eq!(with_row.shape(), &[r + 1, c]);
        assert!((0..c).all(|j| with_row.at(&[r, j]).unwrap() == -2.0));
        assert_eq!(remove_row(&with_row).unwrap(), m);
    }
}

#[test]
fn test_structural_ops_leave_input_untouched() {
    let m = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    let before = m.clone();
    let _ = add_col(&m, 0.0).unwrap();
    let _ = add_row(&m, 0.0).unwrap();
    let _ = remove_col(&m).unwrap();
    let _ = remove_row(&m).unwrap();
    let _ = transpose(&m).unwrap();
    assert_eq!(m, before);
}

#[test]
fn test_rejects_non_matrices() {
    let vector = tensor!([1.0, 2.0]);
    let cube = TensorBuf::zeros([2, 2, 2]).unwrap();

    for err in [
        multiply(&vector, &vector).unwrap_err(),
        transpose(&cube).unwrap_err(),
        add_col(&vector, 1.0).unwrap_err(),
        remove_row(&cube).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(matches!(err, Error::NotAMatrix { .. }));
    }
}

#[test]
fn test_inner_dimension_mismatch() {
    let a = TensorBuf::zeros([2, 3]).unwrap();
    let b = TensorBuf::zeros([2, 3]).unwrap();
    let err = multiply(&a, &b).unwrap_err();
    assert!(matches!(err, Error::InnerDimMismatch { .. }));
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_remove_from_empty_dimension() {
    let no_cols = TensorBuf::zeros([3, 0]).unwrap();
    assert!(matches!(remove_col(&no_cols).unwrap_err(), Error::EmptyDimension { .. }));

    let no_rows = TensorBuf::zeros([0, 3]).unwrap();
    assert!(matches!(remove_row(&no_rows).unwrap_err(), Error::EmptyDimension { .. }));

    // a zero-width matrix still gains a column
    assert_eq!(add_col(&no_cols, 1.0).unwrap().data(), &[1.0, 1.0, 1.0]);
}
