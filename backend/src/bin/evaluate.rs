use std::path::PathBuf;
use std::time::Duration;

use backend::evaluation::{discover_samples, run_evaluation, write_results, PredictClient};
use clap::Parser;

/// Post-deploy accuracy check: sends every image to `/predict` and writes
/// a per-file CSV report.
#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Either `<data>/Cat` + `<data>/Dog`, or a flat directory of images.
    #[arg(long, default_value = "eval_data")]
    data: PathBuf,

    /// `filename,label` CSV for a flat directory.
    #[arg(long)]
    labels: Option<PathBuf>,

    #[arg(long, default_value = "eval_results.csv")]
    out: PathBuf,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let samples = discover_samples(&args.data, args.labels.as_deref())?;
    let client = PredictClient::new(&args.base_url, Duration::from_secs(args.timeout))?;

    let (rows, summary) = run_evaluation(&samples, |path| client.predict(path))?;

    match summary.accuracy() {
        Some(acc) => println!(
            "Post-deploy accuracy over {} images: {:.4}",
            summary.labeled, acc
        ),
        None => println!("Classified {} unlabeled images", summary.total),
    }

    write_results(&args.out, &rows)?;
    println!("Results written to {}", args.out.display());
    Ok(())
}
