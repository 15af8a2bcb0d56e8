//! Listing Providers
//!
//! A provider answers "what can I get for `from` if I want `to`?" with a
//! filtered, ranked sequence of listings. The graph and the brain trust this
//! order and never re-sort.

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, trace};

use super::{Listing, TradingGraph, TradingPair};

/// Source of ranked listings for a trading pair
#[allow(async_fn_in_trait)]
pub trait ListingProvider {
    async fn listings(&self, pair: &TradingPair) -> Result<Vec<Listing>>;
}

/// Which counter-parties to skip and which to prefer
#[derive(Debug, Clone, Default)]
pub struct AccountPolicy {
    ignored: HashSet<String>,
    favorites: HashSet<String>,
    exclude_afk: bool,
}

impl AccountPolicy {
    pub fn new<I, F>(ignored: I, favorites: F, exclude_afk: bool) -> Self
    where
        I: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        Self {
            ignored: ignored.into_iter().collect(),
            favorites: favorites.into_iter().collect(),
            exclude_afk,
        }
    }

    pub fn is_favorite(&self, account: &str) -> bool {
        self.favorites.contains(account)
    }

    /// Drop unwanted listings, then order by desirability:
    /// best ratio, favorites on equal ratio, deeper stock, account name.
    pub fn rank(&self, listings: Vec<Listing>) -> Vec<Listing> {
        let before = listings.len();
        let mut kept: Vec<Listing> = listings
            .into_iter()
            .filter(|l| !self.ignored.contains(&l.account))
            .filter(|l| !(self.exclude_afk && l.afk))
            .collect();

        if kept.len() < before {
            trace!("Dropped {} listings by account policy", before - kept.len());
        }

        kept.sort_by(|a, b| {
            b.ratio
                .partial_cmp(&a.ratio)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.is_favorite(&b.account).cmp(&self.is_favorite(&a.account)))
                .then_with(|| b.stock.cmp(&a.stock))
                .then_with(|| a.account.cmp(&b.account))
        });

        kept
    }
}

/// In-memory provider, for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    listings: HashMap<TradingPair, Vec<Listing>>,
    policy: AccountPolicy,
}

impl StaticProvider {
    pub fn new(policy: AccountPolicy) -> Self {
        Self {
            listings: HashMap::new(),
            policy,
        }
    }

    pub fn insert(&mut self, pair: TradingPair, listings: Vec<Listing>) {
        self.listings.insert(pair, listings);
    }

    /// Load listings previously written by [`save_snapshot`]
    pub fn from_snapshot(path: &Path, policy: AccountPolicy) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading snapshot {}", path.display()))?;
        let entries: Vec<SnapshotEntry> = serde_json::from_str(&content)
            .wrap_err_with(|| format!("parsing snapshot {}", path.display()))?;

        let mut provider = Self::new(policy);
        for entry in entries {
            provider.insert(entry.pair, entry.listings);
        }
        info!(
            "Loaded {} pairs from snapshot {}",
            provider.listings.len(),
            path.display()
        );
        Ok(provider)
    }
}

/// One pair of a listing snapshot file
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    pair: TradingPair,
    listings: Vec<Listing>,
}

/// Write every pair of `graph` as a JSON snapshot that
/// [`StaticProvider::from_snapshot`] can replay offline
pub fn save_snapshot(graph: &TradingGraph, path: &Path) -> Result<()> {
    let entries: Vec<SnapshotEntry> = graph
        .pairs()
        .map(|(pair, listings)| SnapshotEntry {
            pair: pair.clone(),
            listings: listings.to_vec(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json).wrap_err_with(|| format!("writing snapshot {}", path.display()))?;
    info!("Saved {} pairs to snapshot {}", entries.len(), path.display());
    Ok(())
}

impl ListingProvider for StaticProvider {
    async fn listings(&self, pair: &TradingPair) -> Result<Vec<Listing>> {
        let raw = self.listings.get(pair).cloned().unwrap_or_default();
        Ok(self.policy.rank(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::io::Write;

    fn offer(account: &str, item: u64, stock: u64, afk: bool) -> Listing {
        let mut l = listing(account, 1, "exalted", item, "chaos", stock);
        l.afk = afk;
        l
    }

    #[test]
    fn test_rank_orders_by_ratio_then_favorite_then_stock() {
        let policy = AccountPolicy::new(vec![], vec!["friend".to_string()], false);
        let ranked = policy.rank(vec![
            offer("cheap", 150, 100, false),
            offer("deep", 160, 50, false),
            offer("shallow", 160, 5, false),
            offer("friend", 160, 1, false),
        ]);

        let accounts: Vec<_> = ranked.iter().map(|l| l.account.as_str()).collect();
        assert_eq!(accounts, vec!["friend", "deep", "shallow", "cheap"]);
    }

    #[test]
    fn test_rank_filters_ignored_and_afk() {
        let policy = AccountPolicy::new(vec!["scammer".to_string()], vec![], true);
        let ranked = policy.rank(vec![
            offer("scammer", 200, 10, false),
            offer("sleeping", 190, 10, true),
            offer("awake", 150, 10, false),
        ]);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].account, "awake");

        let lenient = AccountPolicy::new(vec![], vec![], false);
        assert_eq!(lenient.rank(vec![offer("sleeping", 190, 10, true)]).len(), 1);
    }

    #[test]
    fn test_static_provider_returns_ranked_listings() {
        let mut provider = StaticProvider::new(AccountPolicy::default());
        let p = pair("exalted", "chaos");
        provider.insert(
            p.clone(),
            vec![offer("low", 150, 10, false), offer("high", 165, 10, false)],
        );

        let listings = tokio_test::block_on(provider.listings(&p)).unwrap();
        assert_eq!(listings[0].account, "high");

        let missing = tokio_test::block_on(provider.listings(&pair("chaos", "exalted"))).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_snapshot_replays_graph() {
        let mut graph = TradingGraph::new();
        graph
            .set(
                pair("exalted", "chaos"),
                vec![offer("low", 150, 10, false), offer("high", 165, 10, false)],
            )
            .unwrap();
        graph.set(pair("chaos", "exalted"), vec![]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        save_snapshot(&graph, &path).unwrap();

        let policy = AccountPolicy::new(vec!["high".to_string()], vec![], false);
        let provider = StaticProvider::from_snapshot(&path, policy).unwrap();

        let listings = tokio_test::block_on(provider.listings(&pair("exalted", "chaos"))).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].account, "low");
        assert_eq!(listings[0].ratio, 150.0);
    }

    #[test]
    fn test_snapshot_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = StaticProvider::from_snapshot(&path, AccountPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("reading snapshot"));
    }

    #[test]
    fn test_snapshot_with_same_commodity_pair_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{ "pair": {{ "from": "chaos", "to": "exalted" }}, "listings": [] }},
                {{ "pair": {{ "from": "chaos", "to": "chaos" }}, "listings": [] }}
            ]"#
        )
        .unwrap();

        let err = StaticProvider::from_snapshot(file.path(), AccountPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("parsing snapshot"));
        assert!(err
            .chain()
            .any(|cause| cause.to_string().contains("invalid trading pair: chaos -> chaos")));
    }
}
