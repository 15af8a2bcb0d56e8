//! bulk-arb - Arbitrage cycle finder for the bulk item exchange
//!
//! Run with: cargo run -- trade chaos exalted fusing -c chaos=300
//!
//! Pipeline:
//! - The Cartographer fetches ranked listings for every ordered item pair
//! - The Brain enumerates simple cycles and walks each one with real stock limits
//! - Profitable loops are printed with the whispers to send

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod brain;
mod cartographer;
mod config;
mod error;
#[cfg(test)]
mod test_helpers;

use brain::{Analyzer, Capital, CycleEvaluator};
use cartographer::{ExchangeClient, ExchangeProvider, StaticProvider};
use config::{Config, OpportunityLog};

#[derive(Parser)]
#[command(name = "bulk-arb", version, about = "Checks for bulk trading loops with inefficient bid-ask spreads")]
struct Cli {
    /// Config file (default is $HOME/.bulk-arb.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for trading opportunities between bulk items
    Trade {
        /// Item ids to trade between (at least 2)
        #[arg(required = true)]
        items: Vec<String>,

        /// Starting capital, e.g. chaos=40,exalted=1
        #[arg(short, long, default_value = "")]
        capital: Capital,

        /// Override the minimum net gain percentage
        #[arg(long)]
        min_gain: Option<f64>,

        /// Also print the trading graph in Graphviz format
        #[arg(long)]
        dot: bool,

        /// Replay listings from a snapshot file instead of querying the exchange
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Save the fetched listings to a snapshot file
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },
    /// List supported bulk items
    List {
        /// Only items whose name contains this (case insensitive)
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Update the persisted configuration
    Configure {
        /// Softcore league name (capitalized)
        #[arg(long)]
        league: Option<String>,

        /// Trade in the hardcore league
        #[arg(long)]
        hardcore: Option<bool>,

        /// Filter out AFK players from trades
        #[arg(long)]
        exclude_afk: Option<bool>,

        /// Exclude this player's listings
        #[arg(long)]
        ignore_player: Option<String>,

        /// Prefer this player's listings at equal price
        #[arg(long)]
        favorite_player: Option<String>,

        /// Add or update a bulk item: id,name,stackSize
        #[arg(long, value_delimiter = ',')]
        set_item: Option<Vec<String>>,
    },
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔁 BULK-ARB - Bulk Exchange Arbitrage Finder").cyan().bold()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

/// Options of the `trade` command
struct TradeArgs {
    items: Vec<String>,
    capital: Capital,
    min_gain: Option<f64>,
    dot: bool,
    snapshot: Option<PathBuf>,
    save_snapshot: Option<PathBuf>,
}

async fn run_trade(mut config: Config, args: TradeArgs) -> Result<()> {
    let TradeArgs {
        items,
        capital,
        min_gain,
        dot,
        snapshot,
        save_snapshot,
    } = args;

    if let Some(gain) = min_gain {
        config.min_gain_pct = gain;
    }
    config.validate()?;
    config.validate_trade(&items, &capital)?;

    print_banner();
    config.print_summary();
    println!();

    // =============================================
    // THE CARTOGRAPHER
    // =============================================
    println!("{}", style("═══ THE CARTOGRAPHER ═══").blue().bold());
    println!();

    let league = config.league_name();
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let start = Instant::now();
    let graph = match &snapshot {
        Some(path) => {
            let provider = StaticProvider::from_snapshot(path, config.account_policy())?;
            Analyzer::build_graph(&provider, &items, &progress).await?
        }
        None => {
            let client = ExchangeClient::new(
                config.api_base_url.as_str(),
                league.as_str(),
                config.request_timeout(),
                config.min_stock,
                config.max_listings,
            )?;
            let provider = ExchangeProvider::new(client, config.account_policy());
            Analyzer::build_graph(&provider, &items, &progress).await?
        }
    };
    println!(
        "{} Fetched {} listings over {} pairs in {:?}",
        style("✓").green(),
        graph.listing_count(),
        graph.pair_count(),
        start.elapsed()
    );

    if let Some(path) = &save_snapshot {
        cartographer::save_snapshot(&graph, path)?;
        println!("{} Listings saved to: {}", style("💾").cyan(), path.display());
    }

    if dot {
        println!();
        println!("{}", graph.to_dot());
    }

    // =============================================
    // THE BRAIN
    // =============================================
    println!();
    println!("{}", style("═══ THE BRAIN ═══").magenta().bold());

    if capital.is_constrained() {
        info!("Starting capital: {:?}", capital);
    } else {
        info!("No starting capital: seeding each cycle from its best listing's stock");
    }

    let evaluator = CycleEvaluator::new(config.min_gain_pct);
    let threshold = evaluator.threshold();
    let analyzer = Analyzer::new(evaluator);
    let reports = analyzer.analyze(&graph, &capital);

    brain::print_reports(&reports, threshold);

    if let Some(path) = &config.report_log {
        for report in &reports {
            if let Err(e) = OpportunityLog::from_report(report, &league).append_to_file(path) {
                warn!("Failed to log opportunity: {}", e);
            }
        }
        if !reports.is_empty() {
            println!("{} Opportunities logged to: {}", style("📝").cyan(), path);
        }
    }

    Ok(())
}

fn run_list(config: &Config, name: &str) {
    for (id, item) in config.search_items(name) {
        println!(
            "{:<12} {:<28} stack {}",
            style(id).cyan(),
            item.name,
            item.stack_size
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn run_configure(
    mut config: Config,
    path: &std::path::Path,
    league: Option<String>,
    hardcore: Option<bool>,
    exclude_afk: Option<bool>,
    ignore_player: Option<String>,
    favorite_player: Option<String>,
    set_item: Option<Vec<String>>,
) -> Result<()> {
    let mut updated = false;

    if let Some(league) = league {
        let league = league.trim();
        if league.is_empty() {
            return Err(color_eyre::eyre::eyre!("invalid league name"));
        }
        config.league = league.to_string();
        updated = true;
    }
    if let Some(hardcore) = hardcore {
        config.hardcore = hardcore;
        updated = true;
    }
    if let Some(exclude_afk) = exclude_afk {
        config.exclude_afk = exclude_afk;
        updated = true;
    }
    if let Some(player) = ignore_player {
        config.ignore_player(&player)?;
        updated = true;
    }
    if let Some(player) = favorite_player {
        config.favorite_player(&player)?;
        updated = true;
    }
    if let Some(spec) = set_item {
        config.set_item(&spec)?;
        updated = true;
    }

    if updated {
        config.validate()?;
        config.save_to_file(path)?;
        println!("{} Config file updated.", style("✓").green());
    } else {
        config.print_summary();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bulk_arb=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let path = Config::resolve_path(cli.config.as_deref())?;
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("Could not open config file {}: {}", path.display(), e);
            return Err(e);
        }
    };

    match cli.command {
        Commands::Trade {
            items,
            capital,
            min_gain,
            dot,
            snapshot,
            save_snapshot,
        } => {
            let args = TradeArgs {
                items,
                capital,
                min_gain,
                dot,
                snapshot,
                save_snapshot,
            };
            run_trade(config, args).await?
        }
        Commands::List { name } => run_list(&config, &name),
        Commands::Configure {
            league,
            hardcore,
            exclude_afk,
            ignore_player,
            favorite_player,
            set_item,
        } => run_configure(
            config,
            &path,
            league,
            hardcore,
            exclude_afk,
            ignore_player,
            favorite_player,
            set_item,
        )?,
    }

    Ok(())
}
