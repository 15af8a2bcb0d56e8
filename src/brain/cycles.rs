//! Simple Cycle Enumeration
//!
//! Exhaustive DFS over the trading graph. Every simple cycle through the
//! start commodity is returned, not just the shortest ones: the evaluator
//! needs to see all of them because stock and price limits make a longer
//! loop profitable where a shorter one is not.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::cartographer::{TradingGraph, TradingPair};

/// A closed walk of trading pairs with no repeated intermediate commodity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cycle {
    pairs: Vec<TradingPair>,
}

impl Cycle {
    /// Wrap `pairs` if they form a simple closed cycle
    pub fn new(pairs: Vec<TradingPair>) -> Option<Self> {
        let cycle = Self { pairs };
        cycle.is_valid().then_some(cycle)
    }

    pub fn pairs(&self) -> &[TradingPair] {
        &self.pairs
    }

    pub fn start(&self) -> &str {
        self.pairs[0].from()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Commodities visited, start repeated at the end
    pub fn path(&self) -> Vec<&str> {
        let mut path: Vec<&str> = self.pairs.iter().map(|p| p.from()).collect();
        if let Some(first) = path.first().copied() {
            path.push(first);
        }
        path
    }

    /// - non-empty
    /// - each pair starts where the previous one ended
    /// - the last pair returns to the start
    /// - no commodity is entered twice
    pub fn is_valid(&self) -> bool {
        let Some(first) = self.pairs.first() else {
            return false;
        };

        let chained = self.pairs.windows(2).all(|w| w[0].to() == w[1].from());
        let closed = self.pairs[self.pairs.len() - 1].to() == first.from();

        let mut seen = HashSet::new();
        let simple = self.pairs.iter().all(|p| seen.insert(p.from()));

        chained && closed && simple
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().join(" → "))
    }
}

/// Per-call traversal state, threaded through the recursion
struct Traversal<'a> {
    start: &'a str,
    visited: HashSet<&'a str>,
    current_path: Vec<&'a TradingPair>,
    cycles: Vec<Cycle>,
}

/// DFS cycle finder over a read-only graph
pub struct CycleEnumerator<'a> {
    graph: &'a TradingGraph,
}

impl<'a> CycleEnumerator<'a> {
    pub fn new(graph: &'a TradingGraph) -> Self {
        Self { graph }
    }

    /// Every simple cycle starting and ending at `start`, in discovery order
    /// (depth first, edges tried in adjacency order)
    pub fn cycles_from(&self, start: &'a str) -> Vec<Cycle> {
        let mut traversal = Traversal {
            start,
            visited: HashSet::new(),
            current_path: Vec::new(),
            cycles: Vec::new(),
        };

        self.explore(start, &mut traversal);

        debug!("{} simple cycles through {}", traversal.cycles.len(), start);
        traversal.cycles
    }

    fn explore(&self, commodity: &'a str, traversal: &mut Traversal<'a>) {
        if traversal.visited.contains(commodity) {
            if commodity == traversal.start {
                let pairs = traversal.current_path.iter().map(|&p| p.clone()).collect();
                traversal.cycles.extend(Cycle::new(pairs));
            }
            return;
        }

        traversal.visited.insert(commodity);
        for pair in self.graph.outgoing(commodity) {
            traversal.current_path.push(pair);
            self.explore(pair.to(), traversal);
            traversal.current_path.pop();
        }
        traversal.visited.remove(commodity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn paths(cycles: &[Cycle]) -> Vec<String> {
        cycles.iter().map(|c| c.path().join("-")).collect()
    }

    #[test]
    fn test_two_leg_cycle() {
        let graph = topology(&[("chaos", "exalted"), ("exalted", "chaos")]);
        let cycles = CycleEnumerator::new(&graph).cycles_from("chaos");

        assert_eq!(paths(&cycles), vec!["chaos-exalted-chaos"]);
        assert_eq!(
            cycles[0].pairs(),
            &[pair("chaos", "exalted"), pair("exalted", "chaos")]
        );
    }

    #[test]
    fn test_complete_graph_discovery_order() {
        let graph = topology(&[
            ("a", "b"),
            ("a", "c"),
            ("b", "a"),
            ("b", "c"),
            ("c", "a"),
            ("c", "b"),
        ]);
        let cycles = CycleEnumerator::new(&graph).cycles_from("a");

        assert_eq!(
            paths(&cycles),
            vec!["a-b-a", "a-b-c-a", "a-c-a", "a-c-b-a"]
        );
    }

    #[test]
    fn test_cycles_are_simple_chained_and_closed() {
        let commodities = ["a", "b", "c", "d"];
        let mut edges = Vec::new();
        for from in commodities {
            for to in commodities {
                if from != to {
                    edges.push((from, to));
                }
            }
        }
        let graph = topology(&edges);
        let cycles = CycleEnumerator::new(&graph).cycles_from("a");

        // 3 two-leg, 6 three-leg, 6 four-leg
        assert_eq!(cycles.len(), 15);
        for cycle in &cycles {
            assert!(cycle.is_valid(), "invalid cycle {cycle}");
            assert_eq!(cycle.start(), "a");
        }
    }

    #[test]
    fn test_inner_loop_not_reported() {
        // b <-> c loop is reachable from a but never returns to a
        let graph = topology(&[("a", "b"), ("b", "c"), ("c", "b")]);
        let cycles = CycleEnumerator::new(&graph).cycles_from("a");
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_unknown_start_yields_nothing() {
        let graph = topology(&[("a", "b"), ("b", "a")]);
        assert!(CycleEnumerator::new(&graph).cycles_from("z").is_empty());
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let graph = topology(&[("a", "b"), ("b", "c"), ("c", "a"), ("b", "a"), ("c", "b")]);
        let enumerator = CycleEnumerator::new(&graph);
        assert_eq!(enumerator.cycles_from("a"), enumerator.cycles_from("a"));
    }

    #[test]
    fn test_cycle_validation() {
        assert!(Cycle::new(vec![]).is_none());
        assert!(Cycle::new(vec![pair("a", "b"), pair("c", "a")]).is_none());
        assert!(Cycle::new(vec![pair("a", "b"), pair("b", "c")]).is_none());
        // visits b twice
        assert!(Cycle::new(vec![
            pair("a", "b"),
            pair("b", "c"),
            pair("c", "b"),
            pair("b", "a"),
        ])
        .is_none());

        let cycle = Cycle::new(vec![pair("a", "b"), pair("b", "c"), pair("c", "a")]).unwrap();
        assert_eq!(cycle.to_string(), "a → b → c → a");
        assert_eq!(cycle.len(), 3);
    }
}
