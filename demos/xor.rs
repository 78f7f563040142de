use neural_ff::loss::SquaredError;
use neural_ff::model::{Network, TrainConfig};
use neural_ff::rng::seeded_rng;
use neural_ff::TensorBuf;

fn main() -> neural_ff::Result<()> {
    env_logger::init();

    // XOR truth table
    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let targets = [0.0, 1.0, 1.0, 0.0];

    let cfg = TrainConfig {
        hidden: 8,
        learning_rate: 0.05,
        epochs: 2000,
        init_mean: 0.0,
        init_std_dev: 0.5,
        seed: Some(42),
        ..TrainConfig::default()
    };
    let mut rng = seeded_rng(cfg.seed);
    let mut net = Network::two_layer(2, 1, &cfg, &mut rng)?;

    let samples = inputs
        .iter()
        .map(|&[a, b]| TensorBuf::with_data([1, 2], vec![a, b]).map(TensorBuf::freeze))
        .collect::<neural_ff::Result<Vec<_>>>()?;

    for epoch in 0..cfg.epochs {
        let mut loss = 0.0;
        for (x, &y) in samples.iter().zip(&targets) {
            loss += net.train_step(x, y, SquaredError, cfg.learning_rate)?;
        }
        if epoch % 200 == 0 {
            println!("epoch {epoch}: loss {:.5}", loss / 4.0);
        }
    }

    for (x, &y) in samples.iter().zip(&targets) {
        let out = net.forward(x)?.output().at(&[0, 0])?;
        println!("{:?} -> {out:.3} (target {y})", x.data());
    }
    Ok(())
}
