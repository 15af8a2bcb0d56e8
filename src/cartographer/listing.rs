//! Listings and trading pairs
//!
//! A listing is one counter-party offer on the bulk exchange: "give me
//! `price_amount` of `price_unit`, I give you `item_amount` of `item_unit`,
//! and I have `stock` of it to sell".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GraphError;

/// Opaque item identifier (e.g. "chaos", "exalted")
pub type Commodity = String;

/// Directed edge `from -> to`. Both ends are always distinct, including
/// when read back from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PairFields")]
pub struct TradingPair {
    from: Commodity,
    to: Commodity,
}

impl TradingPair {
    pub fn new(from: impl Into<Commodity>, to: impl Into<Commodity>) -> Result<Self, GraphError> {
        let from = from.into();
        let to = to.into();
        if from == to {
            return Err(GraphError::InvalidPair { commodity: from });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}

#[derive(Deserialize)]
struct PairFields {
    from: Commodity,
    to: Commodity,
}

impl TryFrom<PairFields> for TradingPair {
    type Error = GraphError;

    fn try_from(fields: PairFields) -> Result<Self, Self::Error> {
        Self::new(fields.from, fields.to)
    }
}

#[cfg(test)]
impl TradingPair {
    /// A degenerate pair that `new` would refuse
    pub(crate) fn with_same_ends(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// One candidate trade for a trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ListingFields")]
pub struct Listing {
    /// Counter-party account name
    pub account: String,

    /// Counter-party is flagged as away
    pub afk: bool,

    /// Contact template; `{0}` is the quantity offered, `{1}` the quantity requested
    pub whisper: String,

    /// Amount of the `from` commodity asked for
    pub price_amount: u64,
    pub price_unit: Commodity,

    /// Amount of the `to` commodity handed over
    pub item_amount: u64,
    pub item_unit: Commodity,

    /// Total `to` commodity the counter-party holds
    pub stock: u64,

    /// item_amount / price_amount
    pub ratio: f64,
}

impl Listing {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account: impl Into<String>,
        afk: bool,
        whisper: impl Into<String>,
        price_amount: u64,
        price_unit: impl Into<Commodity>,
        item_amount: u64,
        item_unit: impl Into<Commodity>,
        stock: u64,
    ) -> Self {
        let ratio = if price_amount == 0 {
            0.0
        } else {
            item_amount as f64 / price_amount as f64
        };

        Self {
            account: account.into(),
            afk,
            whisper: whisper.into(),
            price_amount,
            price_unit: price_unit.into(),
            item_amount,
            item_unit: item_unit.into(),
            stock,
            ratio,
        }
    }

    /// Fill the whisper template with the quantities actually traded
    pub fn contact_message(&self, item: u64, price: u64) -> String {
        self.whisper
            .replace("{0}", &item.to_string())
            .replace("{1}", &price.to_string())
    }
}

/// Stored listing fields; the ratio is always recomputed on load
#[derive(Deserialize)]
struct ListingFields {
    account: String,
    #[serde(default)]
    afk: bool,
    #[serde(default)]
    whisper: String,
    price_amount: u64,
    price_unit: Commodity,
    item_amount: u64,
    item_unit: Commodity,
    stock: u64,
}

impl From<ListingFields> for Listing {
    fn from(f: ListingFields) -> Self {
        Listing::new(
            f.account,
            f.afk,
            f.whisper,
            f.price_amount,
            f.price_unit,
            f.item_amount,
            f.item_unit,
            f.stock,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_rejects_same_commodity() {
        let err = TradingPair::new("chaos", "chaos").unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidPair {
                commodity: "chaos".to_string()
            }
        );
        assert_eq!(err.to_string(), "invalid trading pair: chaos -> chaos");
    }

    #[test]
    fn test_swapped_pairs_are_distinct() {
        let forward = TradingPair::new("chaos", "exalted").unwrap();
        let backward = TradingPair::new("exalted", "chaos").unwrap();
        assert_ne!(forward, backward);
        assert_eq!(forward.from(), backward.to());
    }

    #[test]
    fn test_ratio_is_item_over_price() {
        let listing = Listing::new("seller", false, "", 150, "chaos", 1, "exalted", 5);
        assert!((listing.ratio - 1.0 / 150.0).abs() < 1e-12);

        let free = Listing::new("seller", false, "", 0, "chaos", 1, "exalted", 5);
        assert_eq!(free.ratio, 0.0);
    }

    #[test]
    fn test_contact_message_fills_placeholders() {
        let listing = Listing::new(
            "seller",
            false,
            "@seller Hi, I'd like to buy your {0} Exalted Orb for my {1} Chaos Orb",
            150,
            "chaos",
            1,
            "exalted",
            5,
        );
        assert_eq!(
            listing.contact_message(2, 300),
            "@seller Hi, I'd like to buy your 2 Exalted Orb for my 300 Chaos Orb"
        );
    }

    #[test]
    fn test_deserialized_pair_rejects_same_commodity() {
        let ok: TradingPair = serde_json::from_str(r#"{"from":"chaos","to":"exalted"}"#).unwrap();
        assert_eq!(ok, TradingPair::new("chaos", "exalted").unwrap());

        let err = serde_json::from_str::<TradingPair>(r#"{"from":"chaos","to":"chaos"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid trading pair: chaos -> chaos"));
    }

    #[test]
    fn test_deserialized_listing_recomputes_ratio() {
        let listing: Listing = serde_json::from_str(
            r#"{
                "account": "seller",
                "afk": false,
                "whisper": "",
                "price_amount": 1,
                "price_unit": "exalted",
                "item_amount": 160,
                "item_unit": "chaos",
                "stock": 3,
                "ratio": 9999.0
            }"#,
        )
        .unwrap();
        assert_eq!(listing.ratio, 160.0);
        assert_eq!(listing, Listing::new("seller", false, "", 1, "exalted", 160, "chaos", 3));
    }
}
