use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pizzaboard::aggregate::{compute_all, Aggregates};
use pizzaboard::board::{Board, HttpSink, JsonFileSink, PresentationSink, StdoutSink};
use pizzaboard::config::{Config, Overrides};
use pizzaboard::data::load_tables;
use pizzaboard::report::Report;
use pizzaboard::views::format_views;

#[derive(Parser)]
#[command(name = "pizzaboard", about = "Pizza sales overview -- tables in, dashboard out")]
struct Cli {
    /// Config file (default: ./.pizzaboard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the four CSV tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference year for per-day averages (default: year of the latest order)
    #[arg(long, global = true)]
    year: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the board and write it as JSON
    Build {
        /// Output file, "-" for stdout
        #[arg(short, long, default_value = "board.json")]
        out: String,
    },

    /// Print a text summary of the aggregates
    Summary,

    /// Export every view as CSV
    Export {
        /// Destination directory
        #[arg(long, default_value = "export")]
        dir: PathBuf,
    },

    /// Build the board and POST it to a dashboard service
    Publish {
        /// Dashboard endpoint
        #[arg(long, env = "DASHBOARD_URL")]
        url: Option<String>,

        /// API token
        #[arg(long, env = "DASHBOARD_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Target workspace
        #[arg(long, env = "DASHBOARD_WORKSPACE")]
        workspace: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref())?;
    let mut overrides = Overrides {
        data_dir: cli.data_dir,
        reference_year: cli.year,
        ..Default::default()
    };

    match cli.command {
        Commands::Build { out } => {
            config.merge(&overrides);
            cmd_build(&config, &out)
        }
        Commands::Summary => {
            config.merge(&overrides);
            cmd_summary(&config)
        }
        Commands::Export { dir } => {
            config.merge(&overrides);
            cmd_export(&config, dir)
        }
        Commands::Publish {
            url,
            token,
            workspace,
        } => {
            overrides.url = url;
            overrides.workspace_id = workspace;
            config.merge(&overrides);
            cmd_publish(&config, token)
        }
    }
}

fn aggregate(config: &Config) -> Result<Aggregates> {
    let source = config.data.source();
    let tables = load_tables(&source)
        .with_context(|| format!("failed to load tables from {}", source.dir().display()))?;

    let year = config.aggregate.reference_year()?;
    let agg = compute_all(&tables, year).context("aggregation failed")?;
    Ok(agg)
}

fn build_board(config: &Config) -> Result<Board> {
    let agg = aggregate(config)?;
    let views = format_views(&agg, &config.board.header());
    Ok(Board::assemble(&config.board.name, &config.board.menu_path, views))
}

fn cmd_build(config: &Config, out: &str) -> Result<()> {
    let board = build_board(config)?;

    let sink: Box<dyn PresentationSink> = if out == "-" {
        Box::new(StdoutSink)
    } else {
        Box::new(JsonFileSink::new(out))
    };
    sink.publish(&board)
        .with_context(|| format!("{} sink failed", sink.name()))?;

    if out != "-" {
        println!(
            "Board '{}' ({} panels) written to {}",
            board.name,
            board.panels.len(),
            out
        );
    }
    Ok(())
}

fn cmd_summary(config: &Config) -> Result<()> {
    let agg = aggregate(config)?;
    Report::from_aggregates(&agg).print();
    Ok(())
}

fn cmd_export(config: &Config, dir: PathBuf) -> Result<()> {
    let agg = aggregate(config)?;
    let paths = Report::export_csv(&agg, &dir)
        .with_context(|| format!("failed to export CSV to {}", dir.display()))?;

    println!();
    println!("Exported {} files:", paths.len());
    for path in &paths {
        println!("  {}", path.display());
    }
    println!();
    Ok(())
}

fn cmd_publish(config: &Config, token: Option<String>) -> Result<()> {
    let url = match config.sink.url {
        Some(ref u) => u.clone(),
        None => bail!("no dashboard url: pass --url, set DASHBOARD_URL, or add [sink] url to the config"),
    };
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => bail!("no dashboard token: pass --token or set DASHBOARD_TOKEN"),
    };

    let board = build_board(config)?;
    let sink = HttpSink::new(
        &url,
        &token,
        config.sink.workspace_id.as_deref(),
        config.sink.timeout(),
    );
    sink.publish(&board)?;

    println!(
        "Board '{}' ({} panels) published to {}",
        board.name,
        board.panels.len(),
        url
    );
    Ok(())
}
