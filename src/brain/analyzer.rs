//! Analysis Driver
//!
//! Builds the trading graph from a listing provider, then enumerates and
//! evaluates every simple cycle through each eligible starting commodity.

use eyre::Result;
use indicatif::ProgressBar;
use tracing::{debug, info};

use super::{Capital, CycleEnumerator, CycleEvaluator, CycleReport};
use crate::cartographer::{Commodity, ListingProvider, TradingGraph, TradingPair};

pub struct Analyzer {
    evaluator: CycleEvaluator,
}

impl Analyzer {
    pub fn new(evaluator: CycleEvaluator) -> Self {
        Self { evaluator }
    }

    /// Query `provider` for every ordered pair of `items`, one request at a time.
    ///
    /// The first provider or graph error aborts the build.
    pub async fn build_graph<P: ListingProvider>(
        provider: &P,
        items: &[Commodity],
        progress: &ProgressBar,
    ) -> Result<TradingGraph> {
        let mut graph = TradingGraph::new();
        progress.set_length((items.len() * items.len().saturating_sub(1)) as u64);

        for from in items {
            for to in items {
                if from == to {
                    continue;
                }
                let pair = TradingPair::new(from.as_str(), to.as_str())?;
                progress.set_message(pair.to_string());

                let listings = provider.listings(&pair).await?;
                graph.set(pair, listings)?;
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        info!(
            "Graph built: {} commodities, {} pairs, {} listings",
            graph.commodity_count(),
            graph.pair_count(),
            graph.listing_count()
        );
        Ok(graph)
    }

    /// Where cycles may start: every source commodity, or only the held ones
    /// when capital is constrained. Graph order either way.
    pub fn starting_commodities<'g>(graph: &'g TradingGraph, capital: &Capital) -> Vec<&'g str> {
        graph
            .sources()
            .iter()
            .map(String::as_str)
            .filter(|c| !capital.is_constrained() || capital.contains(c))
            .collect()
    }

    /// Profitable cycle reports, in discovery order
    pub fn analyze(&self, graph: &TradingGraph, capital: &Capital) -> Vec<CycleReport> {
        let enumerator = CycleEnumerator::new(graph);
        let mut profitable = Vec::new();
        let mut evaluated = 0;

        for start in Self::starting_commodities(graph, capital) {
            let cycles = enumerator.cycles_from(start);
            evaluated += cycles.len();

            for cycle in &cycles {
                let report = self.evaluator.evaluate(cycle, graph, capital);
                if report.is_profitable() {
                    debug!("Profitable: {} ({:+.2}%)", cycle, report.gain_pct());
                    profitable.push(report);
                }
            }
        }

        info!(
            "Evaluated {} cycles, {} above {:.2}% yield",
            evaluated,
            profitable.len(),
            self.evaluator.threshold()
        );
        profitable
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(CycleEvaluator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::{AccountPolicy, Listing, StaticProvider};
    use crate::test_helpers::*;

    fn capital(entries: &[(&str, u64)]) -> Capital {
        entries.iter().map(|(c, a)| (c.to_string(), *a)).collect()
    }

    #[test]
    fn test_analyze_reports_profitable_loop() {
        let graph = graph(&[
            ("chaos", "exalted", 150, 1, 5),
            ("exalted", "chaos", 1, 160, 3),
        ]);
        let reports = Analyzer::default().analyze(&graph, &capital(&[("chaos", 150)]));

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].cycle.to_string(), "chaos → exalted → chaos");
        assert!((reports[0].gain_pct() - 6.6667).abs() < 1e-3);
    }

    #[test]
    fn test_analyze_silent_when_nothing_profitable() {
        let graph = graph(&[
            ("chaos", "exalted", 150, 1, 5),
            ("exalted", "chaos", 1, 160, 3),
        ]);
        assert!(Analyzer::default()
            .analyze(&graph, &capital(&[("chaos", 100)]))
            .is_empty());
    }

    #[test]
    fn test_starting_commodities() {
        let graph = topology(&[("a", "b"), ("b", "c"), ("c", "a")]);

        assert_eq!(
            Analyzer::starting_commodities(&graph, &Capital::default()),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            Analyzer::starting_commodities(&graph, &capital(&[("c", 1), ("z", 9)])),
            vec!["c"]
        );
    }

    #[test]
    fn test_analyze_is_repeatable() {
        let graph = graph(&[
            ("a", "b", 10, 11, 1000),
            ("b", "c", 10, 11, 1000),
            ("c", "a", 10, 11, 1000),
            ("b", "a", 10, 9, 1000),
        ]);
        let analyzer = Analyzer::default();
        let capital = capital(&[("a", 100), ("b", 100)]);

        let first = analyzer.analyze(&graph, &capital);
        assert_eq!(first.len(), 2);
        assert_eq!(first, analyzer.analyze(&graph, &capital));
    }

    #[test]
    fn test_build_graph_queries_every_ordered_pair() {
        let mut provider = StaticProvider::new(AccountPolicy::default());
        provider.insert(pair("chaos", "exalted"), vec![listing("a", 150, "chaos", 1, "exalted", 5)]);
        provider.insert(pair("exalted", "chaos"), vec![listing("b", 1, "exalted", 160, "chaos", 3)]);

        let items = vec!["chaos".to_string(), "exalted".to_string(), "fusing".to_string()];
        let graph = tokio_test::block_on(Analyzer::build_graph(
            &provider,
            &items,
            &ProgressBar::hidden(),
        ))
        .unwrap();

        assert_eq!(graph.pair_count(), 6);
        assert_eq!(graph.get(&pair("chaos", "exalted")).map(<[Listing]>::len), Some(1));
        assert_eq!(graph.get(&pair("fusing", "chaos")), Some(&[][..]));
        assert_eq!(graph.sources().len(), 3);
    }

    struct FailingProvider;

    impl ListingProvider for FailingProvider {
        async fn listings(&self, pair: &TradingPair) -> Result<Vec<Listing>> {
            Err(eyre::eyre!("exchange unavailable for {}", pair))
        }
    }

    #[test]
    fn test_build_graph_propagates_provider_errors() {
        let items = vec!["chaos".to_string(), "exalted".to_string()];
        let err = tokio_test::block_on(Analyzer::build_graph(
            &FailingProvider,
            &items,
            &ProgressBar::hidden(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("exchange unavailable"));
    }
}
