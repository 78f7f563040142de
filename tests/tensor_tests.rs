use neural_ff::tensors::{Tensor, TensorBuf};
use neural_ff::{Error, ErrorKind, rng::seeded_rng, tensor};
use rand::Rng;

fn random_shape(rng: &mut impl Rng) -> Vec<usize> {
    let rank = rng.random_range(0..=4);
    (0..rank).map(|_| rng.random_range(1..=5)).collect()
}

#[test]
fn test_zero_tensor_layout() {
    let mut rng = seeded_rng(Some(1));
    for _ in 0..100 {
        let shape = random_shape(&mut rng);
        let t = TensorBuf::zeros(shape.clone()).unwrap();

        assert_eq!(t.rank(), shape.len());
        assert_eq!(t.strides().len(), shape.len());
        assert_eq!(t.size(), shape.iter().product::<usize>());
        assert!(t.data().iter().all(|&v| v == 0.0));
        if let Some(&last) = t.strides().last() {
            assert_eq!(last, 1);
        }
    }
}

#[test]
fn test_set_then_get_round_trips() {
    let mut rng = seeded_rng(Some(2));
    for _ in 0..50 {
        let shape = random_shape(&mut rng);
        let mut t = TensorBuf::zeros(shape.clone()).unwrap();
        let index: Vec<usize> = shape.iter().map(|&d| rng.random_range(0..d)).collect();
        let value: f32 = rng.random_range(-10.0..10.0);

        t.set_at(&index, value).unwrap();
        assert_eq!(t.at(&index).unwrap(), value);
        assert_eq!(t.data().iter().filter(|&&v| v != 0.0).count(), usize::from(value != 0.0));

        let offset = t.offset(&index).unwrap();
        let expected: usize = index.iter().zip(t.strides()).map(|(i, s)| i * s).sum();
        assert_eq!(offset, expected);
        assert_eq!(t.data()[offset], value);

        // one step along the last axis is one step in the buffer
        if let (Some(&last), Some(&dim)) = (index.last(), shape.last()) {
            if last + 1 < dim {
                let mut next = index.clone();
                *next.last_mut().unwrap() += 1;
                assert_eq!(t.offset(&next).unwrap(), offset + 1);
            }
        }
    }
}

#[test]
fn test_last_axis_is_contiguous() {
    let t = TensorBuf::zeros([4, 32, 32, 3]).unwrap();
    assert_eq!(t.strides(), &[3072, 96, 3, 1]);
    let a = t.offset(&[1, 2, 3, 0]).unwrap();
    let b = t.offset(&[1, 2, 3, 1]).unwrap();
    assert_eq!(b, a + 1);
    assert_eq!(t.shape_str(), "4x32x32x3");
}

#[test]
fn test_index_errors() {
    let t = TensorBuf::zeros([2, 3]).unwrap();

    let err = t.at(&[1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
    assert!(matches!(err, Error::IndexRank { expected: 2, got: 1, .. }));

    let err = t.at(&[1, 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
    assert!(matches!(err, Error::IndexOutOfBounds { axis: 1, coord: 3, size: 3, .. }));
}

#[test]
fn test_with_data_is_resized() {
    let long = TensorBuf::with_data([2], vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(long.data(), &[1.0, 2.0]);

    let short = TensorBuf::with_data([3], vec![1.0]).unwrap();
    assert_eq!(short.data(), &[1.0, 0.0, 0.0]);
}

#[test]
fn test_shape_overflow() {
    let err = TensorBuf::zeros([usize::MAX, 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_constant_and_set_all() {
    let mut t = TensorBuf::constant([2, 2], 3.5).unwrap();
    assert!(t.data().iter().all(|&v| v == 3.5));
    t.set_all(-1.0);
    assert!(t.data().iter().all(|&v| v == -1.0));
    assert_eq!(TensorBuf::ones([3]).unwrap().data(), &[1.0; 3]);
}

#[test]
fn test_random_is_reproducible() {
    let a = TensorBuf::random([3, 4], -0.01, 0.01, &mut seeded_rng(Some(9))).unwrap();
    let b = TensorBuf::random([3, 4], -0.01, 0.01, &mut seeded_rng(Some(9))).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_random_statistics() {
    let t = TensorBuf::random([10_000], -0.01, 0.01, &mut seeded_rng(Some(3))).unwrap();
    let n = t.size() as f32;
    let mean = t.data().iter().sum::<f32>() / n;
    let var = t.data().iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    assert!((mean + 0.01).abs() < 1e-3, "mean {mean}");
    assert!((var.sqrt() - 0.01).abs() < 1e-3, "std {}", var.sqrt());
}

#[test]
fn test_random_rejects_bad_std_dev() {
    let mut rng = seeded_rng(Some(0));
    for std_dev in [-1.0, -f32::MIN_POSITIVE, f32::NAN, f32::INFINITY] {
        let err = TensorBuf::random([2], 0.0, std_dev, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidDistribution { .. }), "std_dev {std_dev}");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    // zero spread is a valid, degenerate distribution
    let flat = TensorBuf::random([3], 0.5, 0.0, &mut rng).unwrap();
    assert_eq!(flat.data(), &[0.5; 3]);
}

#[test]
fn test_shared_and_owned_do_not_alias() {
    let shared: Tensor = tensor!([1.0, 2.0, 3.0]).freeze();
    let alias = shared.clone();
    assert!(Tensor::ptr_eq(&shared, &alias));

    let mut copy = shared.to_mutable();
    copy.set_at(&[0], 10.0).unwrap();
    assert_eq!(shared.at(&[0]).unwrap(), 1.0);

    // still shared, so this copies too
    let mut taken = alias.into_mutable();
    taken.set_at(&[1], 20.0).unwrap();
    assert_eq!(shared.at(&[1]).unwrap(), 2.0);

    let unique = shared.into_mutable();
    assert_eq!(unique.data(), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[[1.0, 2.0], [3.0, 4.0]], [[5.0, 6.0], [7.0, 8.0]]]);
    assert_eq!(t.shape(), &[2, 2, 2]);
    assert_eq!(t.at(&[1, 0, 1]).unwrap(), 6.0);

    let s = tensor!(4.0);
    assert_eq!(s.rank(), 0);
    assert_eq!(s.at(&[]).unwrap(), 4.0);
}

#[test]
fn test_ragged_macro_panics() {
    let result = std::panic::catch_unwind(|| tensor!([[1.0, 2.0], [3.0]]));
    assert!(result.is_err());
}
