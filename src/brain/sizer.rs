//! Transaction Sizing
//!
//! A listing of `P` price for `I` items can only be taken in whole multiples
//! of its reduced ratio `P/g : I/g`. Sizing picks the largest multiple that
//! fits both the counter-party's stock and our funds.

use serde::Serialize;

/// Amounts actually exchanged in one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeSize {
    /// Paid, in the listing's price unit
    pub price: u64,
    /// Received, in the listing's item unit
    pub item: u64,
}

/// Greatest common divisor (Euclid)
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Largest integral trade against a listing.
///
/// `available` must already cover `price_amount`. Zero-priced or zero-item
/// listings size to nothing.
pub fn size_transaction(price_amount: u64, item_amount: u64, stock: u64, available: u64) -> TradeSize {
    if price_amount == 0 || item_amount == 0 {
        return TradeSize { price: 0, item: 0 };
    }

    let g = gcd(price_amount, item_amount);
    let unit_price = price_amount / g;
    let unit_item = item_amount / g;

    let by_stock = stock / unit_item;
    let by_funds = available / unit_price;
    let n = by_stock.min(by_funds);

    TradeSize {
        price: n * unit_price,
        item: n * unit_item,
    }
}
