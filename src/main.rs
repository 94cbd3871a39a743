use clap::{Parser, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use pg_ftp_export::{Config, config::load_dotenv, run_export};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Export a PostgreSQL table to a JSON file and upload it to an FTP server
#[derive(Parser)]
#[command(name = "pg-ftp-export", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source connection settings from
    #[arg(short, long, default_value = ".env")]
    env: PathBuf,

    /// More verbose logging
    #[arg(long)]
    debug: bool,

    /// Local JSON file to write, overrides JSON_FILE
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Loaded before the logger so LOG_LEVEL may come from the file
    let env_loaded = load_dotenv(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    log::debug!("Starting program...");
    let env_loaded = match env_loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("The program terminated with an error: {:#}", e);
            return Err(e);
        }
    };
    if !env_loaded {
        log::debug!("No env file at {}", cli.env.display().bright_black());
    }

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };
    if let Some(output) = cli.output {
        config = config.with_export_file(output);
    }

    match run_export(&config).await {
        Ok(summary) => {
            log::info!(
                "Exported {} records to {}",
                summary.records.cyan(),
                summary.file.display().bright_black()
            );
            log::debug!("Export finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("The program terminated with an error: {}", e);
            Err(e.into())
        }
    }
}
