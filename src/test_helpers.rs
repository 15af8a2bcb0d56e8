use crate::cartographer::{Listing, TradingGraph, TradingPair};

pub fn pair(from: &str, to: &str) -> TradingPair {
    TradingPair::new(from, to).unwrap()
}

pub fn listing(
    account: &str,
    price: u64,
    price_unit: &str,
    item: u64,
    item_unit: &str,
    stock: u64,
) -> Listing {
    Listing::new(
        account,
        false,
        format!("@{account} buy {{0}} {item_unit} for {{1}} {price_unit}"),
        price,
        price_unit,
        item,
        item_unit,
        stock,
    )
}

/// One listing per pair: (from, to, price, item, stock)
pub fn graph(edges: &[(&str, &str, u64, u64, u64)]) -> TradingGraph {
    let mut graph = TradingGraph::new();
    for (i, (from, to, price, item, stock)) in edges.iter().enumerate() {
        let account = format!("seller{i}");
        graph
            .set(
                pair(from, to),
                vec![listing(&account, *price, from, *item, to, *stock)],
            )
            .unwrap();
    }
    graph
}

/// Edges with no listings, for pure topology tests
pub fn topology(edges: &[(&str, &str)]) -> TradingGraph {
    let mut graph = TradingGraph::new();
    for (from, to) in edges {
        graph.set(pair(from, to), vec![]).unwrap();
    }
    graph
}
