//! Starting capital
//!
//! What the trader already holds. An empty capital means "no constraint":
//! any commodity may start a cycle and the first leg is seeded from the
//! best listing's stock.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::cartographer::Commodity;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capital {
    holdings: BTreeMap<Commodity, u64>,
}

impl Capital {
    pub fn new(holdings: BTreeMap<Commodity, u64>) -> Self {
        Self { holdings }
    }

    pub fn is_constrained(&self) -> bool {
        !self.holdings.is_empty()
    }

    /// Balance of `commodity`; `None` when not held at all
    pub fn balance(&self, commodity: &str) -> Option<u64> {
        self.holdings.get(commodity).copied()
    }

    pub fn contains(&self, commodity: &str) -> bool {
        self.holdings.contains_key(commodity)
    }

    pub fn commodities(&self) -> impl Iterator<Item = &str> {
        self.holdings.keys().map(String::as_str)
    }
}

impl FromIterator<(Commodity, u64)> for Capital {
    fn from_iter<T: IntoIterator<Item = (Commodity, u64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Parses `chaos=40,exalted=1`. An empty string is unconstrained capital.
impl FromStr for Capital {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut holdings = BTreeMap::new();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || ConfigError::InvalidCapital {
                entry: entry.to_string(),
            };

            let (item, amount) = entry.split_once('=').ok_or_else(invalid)?;
            let item = item.trim();
            if item.is_empty() {
                return Err(invalid());
            }
            let amount: u64 = amount.trim().parse().map_err(|_| invalid())?;

            if holdings.insert(item.to_string(), amount).is_some() {
                return Err(ConfigError::DuplicateItems {
                    context: "Invalid capital: ",
                });
            }
        }

        Ok(Self { holdings })
    }
}
