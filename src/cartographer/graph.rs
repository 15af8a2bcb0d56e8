//! Trading Graph
//!
//! Stores the listings of every observed ordered commodity pair, plus the
//! outgoing pairs of each commodity in the order they were first set.
//! Built once per run, read-only while the brain walks it.

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::{Commodity, Listing, TradingPair};
use crate::error::GraphError;

/// The trading graph
#[derive(Debug, Clone, Default)]
pub struct TradingGraph {
    pair_listings: HashMap<TradingPair, Vec<Listing>>,
    adjacency: HashMap<Commodity, Vec<TradingPair>>,
    /// Source commodities in first-seen order
    sources: Vec<Commodity>,
}

impl TradingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `listings` for `pair`, replacing whatever was there.
    ///
    /// Fails without touching the graph when both ends are the same commodity.
    pub fn set(&mut self, pair: TradingPair, listings: Vec<Listing>) -> Result<(), GraphError> {
        if pair.from() == pair.to() {
            return Err(GraphError::InvalidPair {
                commodity: pair.from().to_string(),
            });
        }

        if !self.pair_listings.contains_key(&pair) {
            let outgoing = self.adjacency.entry(pair.from().to_string()).or_default();
            if outgoing.is_empty() {
                self.sources.push(pair.from().to_string());
            }
            outgoing.push(pair.clone());
            trace!("New edge {}", pair);
        }

        debug!("Set {} listings for {}", listings.len(), pair);
        self.pair_listings.insert(pair, listings);
        Ok(())
    }

    /// Listings for `pair`; `None` if the pair was never set
    pub fn get(&self, pair: &TradingPair) -> Option<&[Listing]> {
        self.pair_listings.get(pair).map(Vec::as_slice)
    }

    /// Outgoing pairs of `commodity`, in insertion order
    pub fn outgoing(&self, commodity: &str) -> &[TradingPair] {
        self.adjacency
            .get(commodity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Commodities with at least one outgoing pair, in first-seen order
    pub fn sources(&self) -> &[Commodity] {
        &self.sources
    }

    /// Every set pair with its listings, grouped by source in first-seen order
    pub fn pairs(&self) -> impl Iterator<Item = (&TradingPair, &[Listing])> {
        self.sources
            .iter()
            .flat_map(|source| self.outgoing(source))
            .map(|pair| (pair, self.get(pair).unwrap_or_default()))
    }

    pub fn pair_count(&self) -> usize {
        self.pair_listings.len()
    }

    pub fn listing_count(&self) -> usize {
        self.pair_listings.values().map(Vec::len).sum()
    }

    /// Distinct commodities appearing on either end of a pair
    pub fn commodity_count(&self) -> usize {
        let mut seen: Vec<&str> = self
            .pair_listings
            .keys()
            .flat_map(|pair| [pair.from(), pair.to()])
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Graphviz rendering. Edges are labelled with the best listing ratio;
    /// pairs without listings are drawn with an empty label.
    pub fn to_dot(&self) -> String {
        let mut graph: DiGraph<String, String> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for (pair, listings) in self.pairs() {
            let from = *nodes
                .entry(pair.from())
                .or_insert_with(|| graph.add_node(pair.from().to_string()));
            let to = *nodes
                .entry(pair.to())
                .or_insert_with(|| graph.add_node(pair.to().to_string()));

            let label = listings
                .first()
                .map(|best| format!("{:.4}", best.ratio))
                .unwrap_or_default();
            graph.add_edge(from, to, label);
        }

        format!("{}", Dot::new(&graph))
    }
}
