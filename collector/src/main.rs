use anyhow::Context;
use capture::DuoWavCapturer;
use clap::Parser;
use generator::{SyntheticCapturer, SyntheticProfile};
use phasecore::interface::Capturer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use workflow::config::Settings;
use workflow::runner::{RunReport, Runner};
use workflow::stations::load_stations;

mod capture;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Measures the phase offset between the two tuners of a dual-channel receiver"
)]
struct Args {
    /// Settings file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Station list with `frequency_mhz,label` rows
    #[arg(long, default_value = "stations.csv")]
    stations: PathBuf,
    /// Result log; new records are appended
    #[arg(long, default_value = "results.csv")]
    results: PathBuf,
    /// Where the capture tool writes each artifact
    #[arg(long, default_value = "duo.wav")]
    artifact: PathBuf,
    /// Dry run with synthetic captures instead of the capture tool
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Seed for the station shuffle; a fresh order is drawn when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn run<C: Capturer>(
    settings: Settings,
    capturer: C,
    args: &Args,
    rng: &mut StdRng,
) -> anyhow::Result<RunReport> {
    let stations = load_stations(&args.stations)?;
    if stations.is_empty() {
        log::warn!("station list {} is empty", args.stations.display());
    }
    let mut runner = Runner::new(settings, capturer, &args.results);
    let outcome = runner.execute(stations, rng);
    log::debug!("runner stopped in {:?} state", runner.state());
    outcome
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = Settings::load(&args.settings)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = if args.synthetic {
        let capturer = SyntheticCapturer::new(SyntheticProfile::default(), &args.artifact);
        run(settings, capturer, &args, &mut rng)
    } else {
        let capturer = DuoWavCapturer::new(settings.duowav_path.clone(), &args.artifact);
        run(settings, capturer, &args, &mut rng)
    }
    .context("collection run aborted")?;

    for result in &report.results {
        println!("{} MHz -> {:.4} deg", result.frequency, result.logged_angle());
    }
    println!(
        "Appended {} records to {} ({} earlier records kept)",
        report.results.len(),
        args.results.display(),
        report.prior_records
    );

    Ok(())
}
