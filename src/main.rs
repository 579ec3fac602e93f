use anyhow::{bail, Context, Result};
use biosimilar_markets::config::{self, Config};
use biosimilar_markets::{export, logging, render};
use biosimilar_markets::{Dashboard, JsonDirReader, RestTableReader, TableReader};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "biosimilar-markets",
    version,
    about = "FDA biosimilar approval overview per reference-product market"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ./config.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Read `<table>.json` files from this directory instead of the backend.
    #[arg(long, value_name = "DIR", global = true)]
    fixtures: Option<PathBuf>,

    /// Log filter, e.g. "debug" (overrides RUST_LOG).
    #[arg(long = "log-level", value_name = "FILTER", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List reference products that have at least one biosimilar.
    Markets,

    /// Print the comparison table of one market.
    View {
        market: String,

        /// Also write the table model as JSON.
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },

    /// Write every market to one dated .xlsx workbook.
    Export {
        #[arg(long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;

    let config = match &cli.config {
        Some(path) => config::load_config(path).context("Failed to load config")?,
        None if Path::new("config.toml").exists() => {
            config::load_config(Path::new("config.toml")).context("Failed to load config.toml")?
        }
        None => Config::default(),
    };

    let reader: Box<dyn TableReader> = match &cli.fixtures {
        Some(dir) => Box::new(JsonDirReader::new(dir)),
        None => Box::new(RestTableReader::from_config(&config.backend)?),
    };

    let mut dashboard = Dashboard::new(config.view);
    dashboard.load(reader.as_ref(), &config.tables)?;

    match cli.command {
        Command::Markets => {
            if dashboard.tiles().is_empty() {
                println!("No markets: no reference product has a biosimilar yet");
            }
            for tile in dashboard.tiles() {
                println!("{}", tile);
            }
        }
        Command::View { market, json } => {
            dashboard.select_market(&market);
            if let Some(e) = dashboard.market_error() {
                bail!("{}", e);
            }
            let table = dashboard
                .table()
                .filter(|t| t.market == market)
                .context("No table built for the selected market")?;

            println!("{} Market FDA Approval Overview", table.market);
            println!("{}", render::comparison_table(table));
            println!("Legend: {}", render::legend());

            if let Some(path) = json {
                let json = serde_json::to_string_pretty(table)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("  -> {}", path.display());
            }
        }
        Command::Export { output } => {
            std::fs::create_dir_all(&output)?;
            let snapshot = dashboard.snapshot().context("Record sets not loaded")?;

            let mut tables = Vec::new();
            for tile in dashboard.tiles() {
                match snapshot.market_view(tile, dashboard.options()) {
                    Ok(table) => tables.push(table),
                    Err(e) => eprintln!("  Skipping {}: {}", tile, e),
                }
            }

            let path = output.join(export::dated_filename("biosimilar_markets", "xlsx"));
            export::write_workbook(&tables, &path)?;
            println!("\nExported {} market(s) -> {}", tables.len(), path.display());
        }
    }
    Ok(())
}
