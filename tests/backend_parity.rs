//! The rayon and serial backends share their per-element arithmetic, so
//! every result must match bit for bit.

use neural_ff::backend::{Backend, get_backend, set_backend};
use neural_ff::loss::SquaredError;
use neural_ff::math::{multiply, transpose};
use neural_ff::model::{Network, TrainConfig};
use neural_ff::ops::dispatch;
use neural_ff::rng::seeded_rng;
use neural_ff::tensors::{Tensor, TensorBuf};
use std::sync::{Mutex, PoisonError};

// the backend is process-wide; tests in this file take turns
static BACKEND_LOCK: Mutex<()> = Mutex::new(());

fn on<T>(backend: Backend, f: impl FnOnce() -> T) -> T {
    let _guard = BACKEND_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    set_backend(backend);
    let out = f();
    set_backend(Backend::default());
    out
}

#[test]
fn test_default_backend_is_cpu() {
    assert_eq!(Backend::default(), Backend::Cpu);
    assert_eq!(on(Backend::Serial, get_backend), Backend::Serial);
    assert_eq!(on(Backend::Cpu, get_backend), Backend::Cpu);
}

#[test]
fn test_gemm_and_transpose_parity() {
    let mut rng = seeded_rng(Some(21));
    let a = TensorBuf::random([37, 53], 0.0, 1.0, &mut rng).unwrap();
    let b = TensorBuf::random([53, 29], 0.0, 1.0, &mut rng).unwrap();

    let serial = on(Backend::Serial, || multiply(&a, &b).unwrap());
    let cpu = on(Backend::Cpu, || multiply(&a, &b).unwrap());
    assert_eq!(serial, cpu);

    let serial = on(Backend::Serial, || transpose(&a).unwrap());
    let cpu = on(Backend::Cpu, || transpose(&a).unwrap());
    assert_eq!(serial, cpu);
}

#[test]
fn test_gemm_parity_few_rows_wide_output() {
    let mut rng = seeded_rng(Some(25));
    // single-example forward and input-gradient products, plus a ragged last block
    for (m, k, n) in [(1usize, 785usize, 300usize), (1, 300, 785), (3, 100, 1000), (15, 7, 65)] {
        let a = TensorBuf::random([m, k], 0.0, 1.0, &mut rng).unwrap();
        let b = TensorBuf::random([k, n], 0.0, 1.0, &mut rng).unwrap();

        let serial = on(Backend::Serial, || multiply(&a, &b).unwrap());
        let cpu = on(Backend::Cpu, || multiply(&a, &b).unwrap());
        assert_eq!(serial.shape(), &[m, n]);
        assert_eq!(serial, cpu, "{m}x{k} * {k}x{n}");
    }
}

#[test]
fn test_gemm_column_blocks_known_values() {
    // 1 x 2 times 2 x 130: every column j is 1 * j + 2 * (j + 1)
    let a = TensorBuf::with_data([1, 2], vec![1.0, 2.0]).unwrap();
    let b_data: Vec<f32> = (0..130).chain(1..131).map(|v| v as f32).collect();
    let b = TensorBuf::with_data([2, 130], b_data).unwrap();

    let expected: Vec<f32> = (0..130).map(|j| (3 * j + 2) as f32).collect();
    let cpu = on(Backend::Cpu, || multiply(&a, &b).unwrap());
    assert_eq!(cpu.data(), expected.as_slice());
}

#[test]
fn test_elementwise_parity() {
    let mut rng = seeded_rng(Some(22));
    let x = TensorBuf::random([1000], 0.0, 1.0, &mut rng).unwrap();
    let g = TensorBuf::random([1000], 0.0, 1.0, &mut rng).unwrap();

    let run = |backend| {
        on(backend, || {
            let mut relu = vec![0.0; 1000];
            dispatch::relu(x.data(), &mut relu);
            let mut back = vec![0.0; 1000];
            dispatch::relu_backward(x.data(), g.data(), &mut back);
            let mut w = x.data().to_vec();
            dispatch::add_assign(&mut w, g.data());
            dispatch::div_assign(&mut w, 3.0);
            dispatch::sub_scaled(&mut w, g.data(), 0.1);
            (relu, back, w)
        })
    };
    assert_eq!(run(Backend::Serial), run(Backend::Cpu));
}

#[test]
fn test_training_parity() {
    let cfg = TrainConfig {
        hidden: 16,
        seed: Some(23),
        ..TrainConfig::default()
    };
    let input: Tensor = TensorBuf::random([1, 8], 0.0, 1.0, &mut seeded_rng(Some(24)))
        .unwrap()
        .freeze();

    let run = |backend| {
        on(backend, || {
            let mut net = Network::two_layer(8, 1, &cfg, &mut seeded_rng(cfg.seed)).unwrap();
            let errors: Vec<f32> = (0..5)
                .map(|_| net.train_step(&input, 3.0, SquaredError, 0.01).unwrap())
                .collect();
            let out = net.forward(&input).unwrap().output().clone();
            (errors, out)
        })
    };
    assert_eq!(run(Backend::Serial), run(Backend::Cpu));
}
