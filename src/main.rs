//! oiebench CLI: compare an Open IE system's output against the gold
//! reference and write its precision/recall curve.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use oiebench::readers::{GoldReader, PredictedFormat};
use oiebench::{Benchmark, Config, MatchPolicy, Report};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Open IE benchmark: precision/recall curve against a gold standard.
#[derive(Parser, Debug)]
#[command(name = "oiebench", version)]
#[command(group(
    ArgGroup::new("predicted")
        .required(true)
        .multiple(false)
        .args(["clausie", "ollie", "openie4"])
))]
struct Args {
    /// The gold reference Open IE file.
    #[arg(long, value_name = "GOLD_OIE")]
    gold: PathBuf,

    /// The output file, into which the precision recall curve will be written.
    #[arg(long, value_name = "OUTPUT_FILE")]
    out: PathBuf,

    /// Read ClausIE format from file.
    #[arg(long, value_name = "CLAUSIE_OIE")]
    clausie: Option<PathBuf>,

    /// Read OLLIE tabbed format from file.
    #[arg(long, value_name = "OLLIE_OIE")]
    ollie: Option<PathBuf>,

    /// Read Open IE 4 format from file.
    #[arg(long, value_name = "OPENIE4_OIE")]
    openie4: Option<PathBuf>,

    /// Matching policy (overrides the config file).
    #[arg(long, value_enum)]
    matcher: Option<MatchPolicy>,

    /// Also write a JSON summary of the run to this path.
    #[arg(long, value_name = "SUMMARY_JSON")]
    summary: Option<PathBuf>,
}

impl Args {
    fn predicted(&self) -> Option<(PredictedFormat, &Path)> {
        if let Some(p) = self.clausie.as_deref() {
            return Some((PredictedFormat::Clausie, p));
        }
        if let Some(p) = self.ollie.as_deref() {
            return Some((PredictedFormat::Ollie, p));
        }
        self.openie4
            .as_deref()
            .map(|p| (PredictedFormat::OpenieFour, p))
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    reader: &'a str,
    matcher: String,
    #[serde(flatten)]
    report: &'a Report,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.benchmark.log_level.as_str()),
    )
    .init();
    log::debug!("{:?}", args);

    let (format, predicted_path) = args
        .predicted()
        .context("One predicted-format flag is required")?;
    let reader = format.reader();
    let predicted = reader
        .read(predicted_path)
        .with_context(|| format!("Failed to read {}", predicted_path.display()))?;

    let benchmark = Benchmark::load(&GoldReader, &args.gold)
        .with_context(|| format!("Failed to read gold file {}", args.gold.display()))?;

    let policy = args.matcher.unwrap_or(config.matcher.policy);
    let matcher = config.build_matcher(Some(policy));

    log::info!(
        "Writing PR curve of {} to {}",
        reader.name(),
        args.out.display()
    );
    let report = benchmark
        .compare(predicted, matcher.as_ref(), &args.out)
        .with_context(|| format!("Benchmark of {} failed", reader.name()))?;

    println!("\nMaximal F1 score: {}\n", oiebench::benchmark::format_float(report.max_f1));

    if let Some(ref summary_path) = args.summary {
        let summary = Summary {
            reader: reader.name(),
            matcher: policy.to_string(),
            report: &report,
        };
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(summary_path, json)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        log::info!("Summary written to {}", summary_path.display());
    }

    Ok(())
}
