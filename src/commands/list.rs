use crate::commands::Out;
use crate::model::Transaction;
use crate::tracker::Tracker;
use chrono::{Local, TimeZone};
use std::fmt::Display;

const HEADERS: [&str; 6] = ["#", "Date", "Type", "Category", "Description", "Amount"];

/// Shows every transaction as a table, followed by the summary line.
pub fn list(tracker: &Tracker) -> Out<Vec<Transaction>> {
    let transactions = tracker.transactions();
    let table = if transactions.is_empty() {
        "No transactions yet.".to_string()
    } else {
        render_table(transactions, &Local)
    };
    let message = format!("{table}\n\n{}", tracker.summarize());
    Out::new(message, transactions.to_vec())
}

/// Renders `transactions` as a plain-text table with one-based row numbers. Timestamps are shown
/// in `tz`.
pub fn render_table<Tz>(transactions: &[Transaction], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rows: Vec<[String; 6]> = transactions
        .iter()
        .enumerate()
        .map(|(ix, t)| {
            [
                (ix + 1).to_string(),
                t.format_timestamp(tz),
                t.r#type().to_string(),
                t.category().to_string(),
                t.description().to_string(),
                t.amount().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(String::from);
    let rule = widths.map(|w| "-".repeat(w));
    std::iter::once(&header)
        .chain(std::iter::once(&rule))
        .chain(rows.iter())
        .map(|row| format_row(row, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The row number and amount columns are right-aligned, the rest left-aligned.
fn format_row(row: &[String; 6], widths: &[usize; 6]) -> String {
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, &width))| match col {
            0 | 5 => format!("{cell:>width$}"),
            _ => format!("{cell:<width$}"),
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}
