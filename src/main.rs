use clap::{Parser, Subcommand};
use go2pack::config::PackerConfig;
use go2pack::tree::{self, BatchReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "go2pack", about = "Pack game assets into GO2 containers and back")]
struct Cli {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the key secret
    #[arg(long, global = true, env = "GO2_SECRET", hide_env_values = true)]
    secret: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode every asset under the source tree into the packaged tree
    Encode {
        #[arg(short, long)]
        source: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Manifest path (default gamedata.json)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Decode every .go2 container under the packaged tree into the source tree
    Decode {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PackerConfig::from_file(path)?,
        None       => PackerConfig::default(),
    };
    if let Some(secret) = cli.secret {
        config.secret = secret;
    }

    let report = match cli.command {

        // ── Encode ───────────────────────────────────────────────────────────
        Commands::Encode { source, output, manifest } => {
            if let Some(p) = source   { config.source_dir = p; }
            if let Some(p) = output   { config.packaged_dir = p; }
            if let Some(p) = manifest { config.manifest_path = p; }
            config.validate()?;

            let registry = config.registry()?;
            let (manifest, report) = tree::encode_tree(&registry, &config.source_dir, &config.packaged_dir)?;
            manifest.write_to(&config.manifest_path)?;
            info!(files = manifest.files.len(), path = %config.manifest_path.display(), "manifest written");
            report
        }

        // ── Decode ───────────────────────────────────────────────────────────
        Commands::Decode { input, output } => {
            if let Some(p) = input  { config.packaged_dir = p; }
            if let Some(p) = output { config.source_dir = p; }
            config.validate()?;

            let registry = config.registry()?;
            tree::decode_tree(&registry, &config.packaged_dir, &config.source_dir)?
        }
    };

    Ok(summarize(&report))
}

fn summarize(report: &BatchReport) -> ExitCode {
    info!(
        succeeded = report.succeeded.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "done"
    );
    if report.is_clean() {
        return ExitCode::SUCCESS;
    }
    for (path, e) in &report.failed {
        error!(path = %path.display(), "{e}");
    }
    ExitCode::FAILURE
}
