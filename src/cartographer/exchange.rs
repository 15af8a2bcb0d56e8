//! Bulk Exchange Client
//!
//! Two-step lookup against the trade API:
//! 1. `POST /exchange/{league}` registers a have/want query and returns listing ids
//! 2. `GET /fetch/{ids}?query={id}&exchange` returns the listing details
//!
//! Requests are issued one at a time. Rate limits are the caller's problem.

use eyre::{eyre, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AccountPolicy, Listing, ListingProvider, TradingPair};

// ============================================
// CONSTANTS
// ============================================

/// Default trade API root
pub const DEFAULT_API_URL: &str = "https://www.pathofexile.com/api/trade";

/// The fetch endpoint refuses more ids than this per request
pub const MAX_FETCH_IDS: usize = 20;

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct ExchangeSearch {
    id: String,
    #[serde(default)]
    result: Vec<String>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    result: Vec<Option<TradeDetail>>,
}

#[derive(Debug, Deserialize)]
struct TradeDetail {
    listing: ListingDetail,
}

#[derive(Debug, Deserialize)]
struct ListingDetail {
    price: PriceDetail,
    account: AccountDetail,
    #[serde(default)]
    whisper: String,
}

#[derive(Debug, Deserialize)]
struct PriceDetail {
    exchange: AmountDetail,
    item: StockedAmountDetail,
}

#[derive(Debug, Deserialize)]
struct AmountDetail {
    currency: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct StockedAmountDetail {
    currency: String,
    amount: f64,
    #[serde(default)]
    stock: u64,
}

#[derive(Debug, Deserialize)]
struct AccountDetail {
    name: String,
    online: Option<OnlineDetail>,
}

#[derive(Debug, Deserialize)]
struct OnlineDetail {
    status: Option<String>,
}

impl TradeDetail {
    /// Price rounds up, item rounds down. Anything below one whole unit is dropped.
    fn into_listing(self) -> Option<Listing> {
        let price = self.listing.price;
        let price_amount = price.exchange.amount.ceil();
        let item_amount = price.item.amount.floor();

        if !(price_amount >= 1.0 && item_amount >= 1.0) {
            return None;
        }

        let afk = self
            .listing
            .account
            .online
            .and_then(|o| o.status)
            .is_some_and(|s| s == "afk");

        Some(Listing::new(
            self.listing.account.name,
            afk,
            self.listing.whisper,
            price_amount as u64,
            price.exchange.currency,
            item_amount as u64,
            price.item.currency,
            price.item.stock,
        ))
    }
}

// ============================================
// EXCHANGE CLIENT
// ============================================

pub struct ExchangeClient {
    http_client: Client,
    base_url: String,
    league: String,
    min_stock: u64,
    max_listings: usize,
}

impl ExchangeClient {
    pub fn new(
        base_url: impl Into<String>,
        league: impl Into<String>,
        timeout: Duration,
        min_stock: u64,
        max_listings: usize,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bulk-arb/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            league: league.into(),
            min_stock,
            max_listings: max_listings.min(MAX_FETCH_IDS),
        })
    }

    /// Register a have/want query; returns the query id and listing ids
    async fn search(&self, pair: &TradingPair) -> Result<ExchangeSearch> {
        let url = format!("{}/exchange/{}", self.base_url, self.league);
        let body = json!({
            "exchange": {
                "status": { "option": "online" },
                "have": [pair.from()],
                "want": [pair.to()],
                "minimum": self.min_stock,
            }
        });

        let response = self.http_client.post(&url).json(&body).send().await?;
        if response.status() != StatusCode::OK {
            return Err(eyre!("exchange search for {} failed with {}", pair, response.status()));
        }

        let search: ExchangeSearch = response.json().await?;
        debug!("{}: {} listings on the exchange", pair, search.total);
        Ok(search)
    }

    /// Fetch listing details for up to `MAX_FETCH_IDS` ids
    async fn fetch(&self, query_id: &str, ids: &[String]) -> Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_FETCH_IDS {
            return Err(eyre!("bulk trade API has a max limit of {} ids", MAX_FETCH_IDS));
        }

        let url = format!("{}/fetch/{}", self.base_url, ids.join(","));
        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query_id), ("exchange", "")])
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(eyre!("listing fetch failed with {}", response.status()));
        }

        let fetched: FetchResponse = response.json().await?;
        Ok(convert_details(fetched))
    }

    /// Best `max_listings` listings for the pair, in exchange order
    pub async fn listings(&self, pair: &TradingPair) -> Result<Vec<Listing>> {
        let search = self.search(pair).await?;
        let ids: Vec<String> = search.result.into_iter().take(self.max_listings).collect();
        self.fetch(&search.id, &ids).await
    }
}

fn convert_details(fetched: FetchResponse) -> Vec<Listing> {
    let total = fetched.result.len();
    let listings: Vec<Listing> = fetched
        .result
        .into_iter()
        .flatten()
        .filter_map(TradeDetail::into_listing)
        .collect();

    if listings.len() < total {
        warn!("Skipped {} listings with fractional or empty amounts", total - listings.len());
    }
    listings
}

/// Exchange client plus account policy
pub struct ExchangeProvider {
    client: ExchangeClient,
    policy: AccountPolicy,
}

impl ExchangeProvider {
    pub fn new(client: ExchangeClient, policy: AccountPolicy) -> Self {
        Self { client, policy }
    }
}

impl ListingProvider for ExchangeProvider {
    async fn listings(&self, pair: &TradingPair) -> Result<Vec<Listing>> {
        let raw = self.client.listings(pair).await?;
        Ok(self.policy.rank(raw))
    }
}
