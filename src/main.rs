#![warn(clippy::pedantic)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use voigtian::config::Config;
use voigtian::scan::scan;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Format {
    Table,
    Json,
}

/// Scan a line shape described by a TOML configuration over its observable.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file.
    config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Assign a workspace variable before scanning, _e.g._ `--set MH=300`.
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, f64)>,

    /// Override the number of grid points.
    #[arg(short, long)]
    points: Option<usize>,
}

fn parse_assignment(text: &str) -> Result<(String, f64)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got `{text}`"))?;
    let value = value
        .trim()
        .parse()
        .with_context(|| format!("`{value}` is not a number"))?;
    Ok((name.trim().to_owned(), value))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    if let Some(points) = args.points {
        config.scan.points = points;
        config.validate()?;
    }
    let (mut ws, pdf) = config.build().context("building the model")?;
    for (name, value) in &args.assignments {
        let stored = ws
            .set_value_of(name, *value)
            .with_context(|| format!("setting `{name}`"))?;
        tracing::info!(%name, stored, "assigned");
    }

    let observable = &config.observable;
    let result = scan(
        pdf.as_ref(),
        &ws,
        observable.min..=observable.max,
        config.scan.points,
        config.scan.normalize,
    )?;
    if let Some(peak) = result.max() {
        tracing::info!(x = peak.x, density = peak.density, "maximum on grid");
    }

    let mut stdout = std::io::stdout().lock();
    match args.format {
        Format::Table => stdout.write_all(result.to_table().as_bytes())?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut stdout, &result)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
