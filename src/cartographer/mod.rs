//! The Cartographer (Listing Ingest)
//!
//! Fetches ranked listings for every ordered commodity pair and maps them
//! into the trading graph.

mod exchange;
mod graph;
mod listing;
mod provider;

pub use exchange::{ExchangeClient, ExchangeProvider, DEFAULT_API_URL, MAX_FETCH_IDS};
pub use graph::TradingGraph;
pub use listing::{Commodity, Listing, TradingPair};
pub use provider::{save_snapshot, AccountPolicy, ListingProvider, StaticProvider};
