//! Trains a 784 → hidden → 1 network to regress the MNIST digit class.
//!
//! Usage: `cargo run --release --example train_mnist -- [data_dir] [epochs] [learning_rate]`
//!
//! `data_dir` must hold the four IDX files (optionally `.gz` with the `gzip`
//! feature). Set `RUST_LOG=info` to see the running error.

use std::env;
use std::error::Error;

use neural_ff::data::{MnistLoader, Split};
use neural_ff::loss::SquaredError;
use neural_ff::model::{Network, TrainConfig};
use neural_ff::rng::seeded_rng;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "data".to_owned());
    let mut cfg = TrainConfig::default();
    if let Some(epochs) = args.next() {
        cfg.epochs = epochs.parse()?;
    }
    if let Some(lr) = args.next() {
        cfg.learning_rate = lr.parse()?;
    }

    let train = MnistLoader::open(&data_dir, Split::Train)?;
    let inputs = train.image_height() * train.image_width();

    let mut rng = seeded_rng(cfg.seed);
    let mut net = Network::two_layer(inputs, 1, &cfg, &mut rng)?;
    log::info!(
        "training {inputs} -> {} -> 1 for {} epochs at lr {}",
        cfg.hidden,
        cfg.epochs,
        cfg.learning_rate
    );

    for epoch in 0..cfg.epochs {
        let mut window = 0.0;
        for (i, example) in train.iter().enumerate() {
            let target = example.label.at(&[0, 0])?;
            window += net.train_step(&example.input.freeze(), target, SquaredError, cfg.learning_rate)?;

            if (i + 1) % cfg.report_every == 0 {
                log::info!(
                    "epoch {epoch} [{}/{}] avg error {:.4}",
                    i + 1,
                    train.len(),
                    window / cfg.report_every as f32
                );
                window = 0.0;
            }
        }
    }

    let test = MnistLoader::open(&data_dir, Split::Test)?;
    let mut total = 0.0;
    let mut correct = 0usize;
    for example in test.iter() {
        let target = example.label.at(&[0, 0])?;
        let prediction = net.forward(&example.input.freeze())?.output().at(&[0, 0])?;
        total += SquaredError.forward(prediction, target);
        if (prediction.round() - target).abs() < f32::EPSILON {
            correct += 1;
        }
    }
    let n = test.len().max(1) as f32;
    println!(
        "test: avg error {:.4}, rounded accuracy {:.2}%",
        total / n,
        100.0 * correct as f32 / n
    );
    Ok(())
}
