use std::time::{Duration, Instant};

use clap::Parser;
use ffnet::{Example, Network, TrainingConfig};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Train a sigmoid network on the 4-point XOR problem
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Hidden layer width
    #[arg(long, default_value_t = 8)]
    hidden: usize,

    /// Training epochs
    #[arg(long, default_value_t = 4000)]
    epochs: u32,

    /// Mini-batch size
    #[arg(long, default_value_t = 4)]
    batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 3.0)]
    eta: f64,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

/// XOR with one-hot targets: class 0 is (1, 0), class 1 is (0, 1).
fn xor_examples() -> Vec<Example> {
    [
        ([0.0, 0.0], 0),
        ([0.0, 1.0], 1),
        ([1.0, 0.0], 1),
        ([1.0, 1.0], 0),
    ]
    .into_iter()
    .map(|(input, class)| {
        let mut target = DVector::zeros(2);
        target[class] = 1.0;

        Example::new(DVector::from_row_slice(&input), target)
    })
    .collect()
}

fn train_network(args: &Args, rng: &mut StdRng) -> ffnet::Result<()> {
    let examples = xor_examples();
    let mut network = Network::new(&[2, args.hidden, 2], rng)?;

    let config = TrainingConfig {
        epochs: args.epochs,
        mini_batch_size: args.batch_size,
        eta: args.eta,
    };

    let print_freq = Duration::from_millis(200);
    let mut last_print = Instant::now() - print_freq;

    network.train_sgd(&examples, Some(&examples), &config, rng, |report| {
        if last_print.elapsed() > print_freq || report.epoch == config.epochs {
            println!(
                "Epoch {}/{} score: {}/{}",
                report.epoch,
                config.epochs,
                report.score.unwrap_or_default(),
                examples.len()
            );
            last_print = Instant::now();
        }
    })?;

    println!(
        "Final cost: {:.6}",
        network.quadratic_cost(&examples)?
    );

    for ex in &examples {
        let out = network.feed_forward(&ex.input)?;

        println!(
            "({}, {}) -> class {} (target {})",
            ex.input[0],
            ex.input[1],
            out.argmax().0,
            ex.target.argmax().0
        );
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Err(e) = train_network(&args, &mut rng) {
        eprintln!("Training failed: {}", e);
        std::process::exit(1);
    }
}
