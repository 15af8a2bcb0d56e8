//! The Brain
//!
//! Responsible for:
//! - Enumerating every simple trading cycle through a starting commodity
//! - Sizing each leg to whole units within stock and funds
//! - Keeping only loops that clear the gain threshold

mod analyzer;
mod capital;
mod cycles;
mod evaluator;
mod report;
mod sizer;

pub use analyzer::Analyzer;
pub use capital::Capital;
pub use cycles::{Cycle, CycleEnumerator};
pub use evaluator::{CycleEvaluator, CycleReport, DEFAULT_MIN_GAIN_PCT};
pub use report::print_reports;
