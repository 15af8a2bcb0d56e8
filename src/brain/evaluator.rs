//! Cycle Evaluation
//!
//! Walks a cycle leg by leg as if the trades were placed in sequence:
//! each leg takes the first listing we can afford, sized to whole units,
//! and hands its proceeds to the next leg. The cycle is profitable when
//! every leg trades and the compounded ratio clears the gain threshold.

use serde::Serialize;
use tracing::{debug, trace};

use super::sizer::{size_transaction, TradeSize};
use super::{Capital, Cycle};
use crate::cartographer::{Listing, TradingGraph, TradingPair};

/// Yield of a loop that neither gains nor loses
pub const BREAK_EVEN_PCT: f64 = 100.0;

/// Minimum net gain over the whole loop, in percent
pub const DEFAULT_MIN_GAIN_PCT: f64 = 1.0;

/// One realized leg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub pair: TradingPair,
    pub listing: Listing,
    pub size: TradeSize,
    /// Whisper with the traded quantities filled in
    pub message: String,
}

impl Trade {
    /// Sized to nothing: stock or funds below one reduced unit
    pub fn is_empty(&self) -> bool {
        self.size.item == 0
    }

    pub fn summary(&self) -> String {
        let summary = format!(
            "pay {} {} for {} {} | listing {}:{} | stock {} | ratio {:.4}",
            self.size.price,
            self.listing.price_unit,
            self.size.item,
            self.listing.item_unit,
            self.listing.price_amount,
            self.listing.item_amount,
            self.listing.stock,
            self.listing.ratio
        );
        if self.is_empty() {
            format!("{} | below one trade unit", summary)
        } else {
            summary
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Profitable,
    /// Every leg traded but the loop does not clear the threshold
    BelowThreshold,
    /// No listing on leg `leg` was affordable
    Unaffordable { leg: usize },
}

/// Result of walking one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: Cycle,
    /// Amount of the start commodity the walk began with
    pub initial_amount: u64,
    /// Amount held after the last realized leg
    pub final_amount: u64,
    pub trades: Vec<Trade>,
    /// Compounded yield, 100 = break-even
    pub yield_pct: f64,
    pub outcome: Outcome,
}

impl CycleReport {
    pub fn is_profitable(&self) -> bool {
        self.outcome == Outcome::Profitable
    }

    pub fn gain_pct(&self) -> f64 {
        self.yield_pct - BREAK_EVEN_PCT
    }
}

pub struct CycleEvaluator {
    min_gain_pct: f64,
}

impl CycleEvaluator {
    pub fn new(min_gain_pct: f64) -> Self {
        Self { min_gain_pct }
    }

    /// Yield a loop must strictly exceed
    pub fn threshold(&self) -> f64 {
        BREAK_EVEN_PCT + self.min_gain_pct
    }

    /// Amount of the start commodity to walk the cycle with
    fn initial_amount(cycle: &Cycle, graph: &TradingGraph, capital: &Capital) -> u64 {
        if capital.is_constrained() {
            return capital.balance(cycle.start()).unwrap_or(0);
        }

        graph
            .get(&cycle.pairs()[0])
            .and_then(|listings| listings.first())
            .map_or(0, |best| best.stock)
    }

    pub fn evaluate(&self, cycle: &Cycle, graph: &TradingGraph, capital: &Capital) -> CycleReport {
        let initial_amount = Self::initial_amount(cycle, graph, capital);
        let mut current = initial_amount;
        let mut yield_pct = BREAK_EVEN_PCT;
        let mut trades = Vec::with_capacity(cycle.len());

        for (leg, pair) in cycle.pairs().iter().enumerate() {
            let affordable = graph
                .get(pair)
                .unwrap_or_default()
                .iter()
                .find(|l| l.price_amount <= current);

            let Some(listing) = affordable else {
                trace!("{}: leg {} ({}) unaffordable with {}", cycle, leg, pair, current);
                break;
            };

            let size = size_transaction(
                listing.price_amount,
                listing.item_amount,
                listing.stock,
                current,
            );
            current = size.item;
            yield_pct *= listing.ratio;

            trades.push(Trade {
                pair: pair.clone(),
                listing: listing.clone(),
                size,
                message: listing.contact_message(size.item, size.price),
            });
        }

        let outcome = if trades.len() < cycle.len() {
            Outcome::Unaffordable { leg: trades.len() }
        } else if yield_pct > self.threshold() {
            Outcome::Profitable
        } else {
            Outcome::BelowThreshold
        };

        debug!(
            "{} | start {} | yield {:.3}% | {:?}",
            cycle, initial_amount, yield_pct, outcome
        );

        CycleReport {
            cycle: cycle.clone(),
            initial_amount,
            final_amount: current,
            trades,
            yield_pct,
            outcome,
        }
    }
}

impl Default for CycleEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAIN_PCT)
    }
}
