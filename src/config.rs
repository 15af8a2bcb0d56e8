//! Configuration for bulk-arb
//!
//! Persisted as TOML, by default at `$HOME/.bulk-arb.toml`. The file is
//! created with defaults on first use and rewritten by `configure`.

use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::brain::{Capital, CycleReport, DEFAULT_MIN_GAIN_PCT};
use crate::cartographer::{AccountPolicy, Commodity, DEFAULT_API_URL, MAX_FETCH_IDS};
use crate::error::ConfigError;

/// Default config file name, under the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".bulk-arb.toml";

// ============================================
// SUPPORTED ITEMS
// ============================================

/// An item the bulk exchange trades in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub name: String,
    pub stack_size: u16,
}

impl BulkItem {
    pub fn new(name: impl Into<String>, stack_size: u16) -> Self {
        Self {
            name: name.into(),
            stack_size,
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Exchange Settings ==========
    /// Softcore league name (capitalized)
    pub league: String,

    /// Trade in the hardcore variant of `league`
    pub hardcore: bool,

    /// Trade API root
    pub api_base_url: String,

    /// HTTP timeout per request
    pub request_timeout_secs: u64,

    // ========== Account Filters ==========
    /// Skip listings from away accounts
    pub exclude_afk: bool,

    /// Accounts whose listings are dropped
    pub ignored_players: Vec<String>,

    /// Accounts preferred at equal ratio
    pub favorite_players: Vec<String>,

    // ========== Analysis ==========
    /// Minimum net gain over a loop, in percent
    pub min_gain_pct: f64,

    /// Listings fetched per pair (the API serves at most 20)
    pub max_listings: usize,

    /// Minimum stock a listing must hold to be returned by the exchange
    pub min_stock: u64,

    /// Append profitable cycles here as JSON lines
    pub report_log: Option<String>,

    // ========== Items ==========
    /// Supported items, by exchange id
    pub bulk_items: BTreeMap<Commodity, BulkItem>,
}

impl Config {
    /// Resolve the config path: explicit flag, then `BULK_ARB_CONFIG`, then home
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = env::var("BULK_ARB_CONFIG") {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path.trim()));
            }
        }
        let home = dirs::home_dir().ok_or_else(|| eyre!("Failed to detect home directory"))?;
        Ok(home.join(DEFAULT_CONFIG_FILE))
    }

    /// Load from `path`, writing defaults there first if it does not exist.
    /// Environment overrides apply on top.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if path.is_file() {
            debug!("Using config file: {}", path.display());
            Self::from_file(path)?
        } else {
            info!("Initializing default config file: {}", path.display());
            let config = Self::default();
            config.save_to_file(path)?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// `LEAGUE`, `HARDCORE` and `MIN_GAIN_PCT` override the file
    fn apply_env(&mut self) {
        if let Ok(league) = env::var("LEAGUE") {
            if !league.trim().is_empty() {
                self.league = league.trim().to_string();
            }
        }
        if let Some(hardcore) = env::var("HARDCORE").ok().and_then(|v| v.parse().ok()) {
            self.hardcore = hardcore;
        }
        if let Some(gain) = env::var("MIN_GAIN_PCT").ok().and_then(|v| v.parse().ok()) {
            self.min_gain_pct = gain;
        }
    }

    /// League name as the trade API expects it
    pub fn league_name(&self) -> String {
        if self.hardcore {
            format!("Hardcore {}", self.league)
        } else {
            self.league.clone()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn account_policy(&self) -> AccountPolicy {
        AccountPolicy::new(
            self.ignored_players.iter().cloned(),
            self.favorite_players.iter().cloned(),
            self.exclude_afk,
        )
    }

    /// Sanity checks before talking to the exchange
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.league.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "league",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.min_gain_pct.is_finite() || self.min_gain_pct < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_gain_pct",
                reason: format!("{} is not a non-negative percentage", self.min_gain_pct),
            });
        }
        if self.max_listings == 0 || self.max_listings > MAX_FETCH_IDS {
            return Err(ConfigError::InvalidValue {
                field: "max_listings",
                reason: format!("must be between 1 and {}", MAX_FETCH_IDS),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// No duplicates, every item supported. `context` prefixes the error.
    pub fn validate_items<'a, I>(&self, items: I, context: &'static str) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item) {
                return Err(ConfigError::DuplicateItems { context });
            }
            if !self.bulk_items.contains_key(item) {
                return Err(ConfigError::UnsupportedItem {
                    context,
                    item: item.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Arguments of `trade`: at least two distinct supported items, capital
    /// only in supported items
    pub fn validate_trade(&self, items: &[Commodity], capital: &Capital) -> Result<(), ConfigError> {
        if items.len() < 2 {
            return Err(ConfigError::TooFewItems);
        }
        self.validate_items(items.iter().map(String::as_str), "Invalid arguments: ")?;
        self.validate_items(capital.commodities(), "Invalid capital: ")
    }

    /// Supported items whose name contains `needle` (case-insensitive, blank matches all)
    pub fn search_items(&self, needle: &str) -> Vec<(&str, &BulkItem)> {
        let needle = needle.trim().to_lowercase();
        self.bulk_items
            .iter()
            .filter(|(_, item)| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .map(|(id, item)| (id.as_str(), item))
            .collect()
    }

    pub fn ignore_player(&mut self, player: &str) -> Result<(), ConfigError> {
        add_unique(&mut self.ignored_players, player)
    }

    pub fn favorite_player(&mut self, player: &str) -> Result<(), ConfigError> {
        add_unique(&mut self.favorite_players, player)
    }

    /// Add or update an item from `id,name,stackSize`
    pub fn set_item(&mut self, spec: &[String]) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            field: "set-item",
            reason: "must provide id,name,stackSize".to_string(),
        };

        let [id, name, stack] = spec else {
            return Err(invalid());
        };
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return Err(invalid());
        }
        let stack_size: u16 = stack.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "set-item",
            reason: format!("unable to parse stack size '{}'", stack.trim()),
        })?;

        self.bulk_items
            .insert(id.to_string(), BulkItem::new(name, stack_size));
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 BULK-ARB - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ League:            {:^40} ║", self.league_name());
        println!("║ Exclude AFK:       {:^40} ║", if self.exclude_afk { "✓ Yes" } else { "✗ No" });
        println!("║ Ignored Players:   {:^40} ║", self.ignored_players.len());
        println!("║ Favorite Players:  {:^40} ║", self.favorite_players.len());
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ ANALYSIS                                                   ║");
        println!("║ • Min Net Gain:    {:<39.2}% ║", self.min_gain_pct);
        println!("║ • Listings/Pair:   {:^40} ║", self.max_listings);
        println!("║ • Min Stock:       {:^40} ║", self.min_stock);
        println!("║ • Report Log:      {:^40} ║",
            if self.report_log.is_some() { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("║ • Supported Items: {:^40} ║", self.bulk_items.len());
        println!("╚════════════════════════════════════════════════════════════╝");
    }

    fn default_bulk_items() -> BTreeMap<Commodity, BulkItem> {
        [
            ("alch", "Orb of Alchemy", 10),
            ("alt", "Orb of Alteration", 20),
            ("blessed", "Blessed Orb", 20),
            ("chance", "Orb of Chance", 20),
            ("chaos", "Chaos Orb", 10),
            ("chisel", "Cartographer's Chisel", 20),
            ("chrome", "Chromatic Orb", 20),
            ("divine", "Divine Orb", 10),
            ("exalted", "Exalted Orb", 10),
            ("fusing", "Orb of Fusing", 20),
            ("gcp", "Gemcutter's Prism", 20),
            ("jewellers", "Jeweller's Orb", 20),
            ("regal", "Regal Orb", 10),
            ("regret", "Orb of Regret", 40),
            ("scour", "Orb of Scouring", 30),
            ("vaal", "Vaal Orb", 10),
        ]
        .into_iter()
        .map(|(id, name, stack)| (id.to_string(), BulkItem::new(name, stack)))
        .collect()
    }
}

fn add_unique(list: &mut Vec<String>, player: &str) -> Result<(), ConfigError> {
    let player = player.trim();
    if player.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "player",
            reason: "invalid player name".to_string(),
        });
    }
    if list.iter().any(|p| p == player) {
        return Err(ConfigError::AlreadyListed(player.to_string()));
    }
    list.push(player.to_string());
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            league: "Standard".to_string(),
            hardcore: false,
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            exclude_afk: true,
            ignored_players: vec![],
            favorite_players: vec![],
            min_gain_pct: DEFAULT_MIN_GAIN_PCT,
            max_listings: MAX_FETCH_IDS,
            min_stock: 1,
            report_log: None,
            bulk_items: Self::default_bulk_items(),
        }
    }
}

// ============================================
// OPPORTUNITY LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One leg of a logged opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedLeg {
    pub account: String,
    pub message: String,
    pub paid: u64,
    pub paid_unit: String,
    pub received: u64,
    pub received_unit: String,
    pub stock: u64,
    pub ratio: f64,
}

/// Logs profitable cycles found during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityLog {
    pub timestamp: DateTime<Utc>,
    pub league: String,
    pub path: Vec<String>,
    pub initial_amount: u64,
    pub gain_pct: f64,
    pub legs: Vec<LoggedLeg>,
}

impl OpportunityLog {
    pub fn from_report(report: &CycleReport, league: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            league: league.to_string(),
            path: report.cycle.path().into_iter().map(String::from).collect(),
            initial_amount: report.initial_amount,
            gain_pct: report.gain_pct(),
            legs: report
                .trades
                .iter()
                .map(|t| LoggedLeg {
                    account: t.listing.account.clone(),
                    message: t.message.clone(),
                    paid: t.size.price,
                    paid_unit: t.listing.price_unit.clone(),
                    received: t.size.item,
                    received_unit: t.listing.item_unit.clone(),
                    stock: t.listing.stock,
                    ratio: t.listing.ratio,
                })
                .collect(),
        }
    }

    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
