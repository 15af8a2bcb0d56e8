//! Console output for profitable cycles
//!
//! Per leg: the whisper to send and what the trade looks like. Then the
//! net gain over the whole loop.

use console::style;

use super::CycleReport;

/// Render one report as plain lines (no styling), leg by leg
pub fn format_report(report: &CycleReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.trades.len() * 2 + 1);
    for (leg, trade) in report.trades.iter().enumerate() {
        if trade.is_empty() {
            lines.push(format!("{}. (nothing to send for {})", leg + 1, trade.pair));
        } else {
            lines.push(format!("{}. {}", leg + 1, trade.message));
        }
        lines.push(format!("   {}", trade.summary()));
    }
    lines.push(format!("Net gain: {:+.2}%", report.gain_pct()));
    lines
}

pub fn print_reports(reports: &[CycleReport], threshold: f64) {
    println!();
    println!("{}", style("═══ CYCLE ANALYSIS ═══").yellow().bold());
    println!();

    if reports.is_empty() {
        println!(
            "{}",
            style(format!("No cycles above {:.2}% yield.", threshold)).yellow()
        );
        return;
    }

    println!(
        "{}",
        style(format!("Found {} PROFITABLE cycles!", reports.len()))
            .green()
            .bold()
    );

    for (i, report) in reports.iter().enumerate() {
        println!();
        println!(
            "{}. {} | start {} {}",
            i + 1,
            style(&report.cycle).cyan(),
            report.initial_amount,
            report.cycle.start()
        );
        for line in format_report(report) {
            println!("   {}", line);
        }
    }
    println!();
}
