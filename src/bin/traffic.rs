use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sample_app::traffic::{self, TrafficPlan};

#[derive(Parser)]
#[command(name = "traffic")]
#[command(about = "Generate synthetic traffic against the sample service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000/work")]
    url: String,

    /// Number of requests to send.
    #[arg(short = 'n', long, default_value_t = 500)]
    requests: usize,

    /// Probability that a request asks for a simulated failure.
    #[arg(long, default_value_t = 1.0 / 3.0, value_parser = traffic::parse_fail_ratio)]
    fail_ratio: f64,

    #[arg(long, default_value_t = 50)]
    min_pause_ms: u64,

    #[arg(long, default_value_t = 200)]
    max_pause_ms: u64,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let plan = TrafficPlan {
        url: cli.url,
        requests: cli.requests,
        fail_ratio: cli.fail_ratio,
        min_pause: Duration::from_millis(cli.min_pause_ms),
        max_pause: Duration::from_millis(cli.max_pause_ms),
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let client = reqwest::Client::new();

    let summary = traffic::run(&client, &plan, &mut rng, |i, outcome| {
        println!("{i}: {outcome}");
    })
    .await;

    println!("{summary}");
    Ok(())
}
