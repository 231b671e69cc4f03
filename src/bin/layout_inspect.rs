use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilelayout::kernel::{KernelConfig, KernelTraits};
use tilelayout::logging::{self, LogFormat, LogLevel, LoggingConfig};
use tilelayout::memory::LayoutPlan;

#[derive(Parser, Debug)]
#[command(name = "layout-inspect", version)]
#[command(about = "Print SMEM/TMEM buffer layouts for a kernel configuration", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides TILELAYOUT_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (human or json); overrides TILELAYOUT_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble both pools from a kernel configuration
    Kernel {
        /// JSON kernel configuration; defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan a raw JSON array of chunk descriptors
    Plan {
        /// JSON file with [{"size_bytes", "alignment", "reuse_first_chunk"}, ...]
        #[arg(long)]
        chunks: PathBuf,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Commands::Kernel { config, json } => {
            let kernel_config = match config {
                Some(path) => KernelConfig::from_json_file(&path)
                    .with_context(|| format!("loading kernel config {}", path.display()))?,
                None => KernelConfig::default(),
            };
            let traits = KernelTraits::new(&kernel_config).context("planning kernel layout")?;
            let report = traits.report()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Commands::Plan { chunks, json } => {
            let plan = LayoutPlan::from_json_file(&chunks)
                .with_context(|| format!("planning chunk list {}", chunks.display()))?;
            let report = plan.report()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let mut config = LoggingConfig::from_env();

    if let Some(level) = &cli.log_level {
        config.level =
            LogLevel::parse(level).with_context(|| format!("unknown log level '{}'", level))?;
    }
    if let Some(format) = &cli.log_format {
        config.format =
            LogFormat::parse(format).with_context(|| format!("unknown log format '{}'", format))?;
    }

    logging::init_with_config(&config)?;
    Ok(())
}
