//! Coffer - file storage with operator-approved access.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coffer_config_and_utils::{init_logging, Config, Paths};

/// Coffer command-line interface.
#[derive(Parser)]
#[command(name = "coffer")]
#[command(about = "File storage service with operator-approved access")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for blobs, logs and config. Defaults to ~/.coffer
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Socket address to listen on. Overrides the config file.
    #[arg(long, global = true)]
    bind: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Write the effective configuration to config.json
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
        config.validate()?;
    }

    match cli.command {
        Some(Commands::Serve) | None => {
            paths.ensure_dirs()?;
            init_logging(&config.log_level, Some(paths.log_file()));
            coffer_server::run_server(config, paths).await?;
        }
        Some(Commands::InitConfig) => {
            config.save(&paths)?;
            println!("Wrote {}", paths.config_file().display());
        }
    }

    Ok(())
}
