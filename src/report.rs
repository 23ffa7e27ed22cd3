//! Shareable expense reports.

use crate::error::Res;
use crate::model::{Amount, Expense};
use anyhow::{anyhow, Context};
use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

/// The header row of the CSV report.
pub const CSV_HEADER: &str = "Title,Amount,Category,Date,Description";

/// Which expenses a report covers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    /// Every expense.
    #[default]
    All,
    /// Expenses dated within the last 7 days.
    Week,
    /// Expenses dated within the last 30 days.
    Month,
}

serde_plain::derive_display_from_serialize!(ReportRange);
serde_plain::derive_fromstr_from_deserialize!(ReportRange);

impl ReportRange {
    /// How far back the range reaches, `None` for `All`.
    pub fn days(&self) -> Option<u64> {
        match self {
            ReportRange::All => None,
            ReportRange::Week => Some(7),
            ReportRange::Month => Some(30),
        }
    }

    /// The human-readable name used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            ReportRange::All => "All Time",
            ReportRange::Week => "Last 7 Days",
            ReportRange::Month => "Last 30 Days",
        }
    }

    /// The expenses dated on or after `today` minus the range.
    pub fn filter<'a>(&self, expenses: &'a [Expense], today: NaiveDate) -> Vec<&'a Expense> {
        let since = self
            .days()
            .and_then(|days| today.checked_sub_days(Days::new(days)));
        expenses
            .iter()
            .filter(|e| since.map_or(true, |since| e.date() >= since))
            .collect()
    }
}

/// The shape of a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Totals overall and per category.
    #[default]
    Summary,
    /// Every expense, numbered, followed by the total.
    Detailed,
    /// One CSV row per expense.
    Csv,
}

serde_plain::derive_display_from_serialize!(ReportFormat);
serde_plain::derive_fromstr_from_deserialize!(ReportFormat);

impl ReportFormat {
    /// The file name used when a report is saved without an explicit path.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ReportFormat::Summary => "expense-summary.txt",
            ReportFormat::Detailed => "expense-report.txt",
            ReportFormat::Csv => "expenses.csv",
        }
    }
}

/// Renders the expenses that fall in `range` as of `today`.
pub fn render(
    format: ReportFormat,
    range: ReportRange,
    expenses: &[Expense],
    today: NaiveDate,
    currency: &str,
) -> Res<String> {
    let selected = range.filter(expenses, today);
    match format {
        ReportFormat::Summary => summary(&selected, range, currency),
        ReportFormat::Detailed => detailed(&selected, range, currency),
        ReportFormat::Csv => csv(&selected),
    }
}

/// Total, count and per-category totals. Categories appear in the order they are first seen.
pub fn summary(expenses: &[&Expense], range: ReportRange, currency: &str) -> Res<String> {
    let total = total(expenses)?;
    let mut by_category: Vec<(&str, Amount)> = Vec::new();
    for expense in expenses {
        match by_category.iter_mut().find(|(c, _)| *c == expense.category()) {
            Some((category, sum)) => {
                *sum = sum
                    .checked_add(expense.amount())
                    .with_context(|| format!("The total for '{category}' is too large"))?
            }
            None => by_category.push((expense.category(), expense.amount())),
        }
    }

    let mut text = format!("💰 Expense Report ({})\n\n", range.label());
    let _ = writeln!(text, "Total Expenses: {currency}{total}");
    let _ = writeln!(text, "Number of Expenses: {}\n", expenses.len());
    text.push_str("📊 By Category:\n");
    for (category, sum) in by_category {
        let pct = percentage(sum.value(), total.value())
            .with_context(|| format!("Unable to compute the share of '{category}'"))?;
        let _ = writeln!(text, "• {category}: {currency}{sum} ({pct}%)");
    }
    Ok(text)
}

/// Every expense, numbered from 1, followed by the total.
pub fn detailed(expenses: &[&Expense], range: ReportRange, currency: &str) -> Res<String> {
    let total = total(expenses)?;
    let mut text = String::from("💰 Detailed Expense Report\n");
    let _ = writeln!(text, "Period: {}\n", range.label());
    for (ix, expense) in expenses.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", ix + 1, expense.title());
        let _ = writeln!(text, "   Amount: {currency}{}", expense.amount());
        let _ = writeln!(text, "   Category: {}", expense.category());
        let _ = writeln!(text, "   Date: {}", expense.date());
        if let Some(note) = expense.description().filter(|d| !d.is_empty()) {
            let _ = writeln!(text, "   Note: {note}");
        }
        text.push('\n');
    }
    text.push_str("\n━━━━━━━━━━━━━━━━━━━\n");
    let _ = writeln!(text, "Total: {currency}{total}");
    Ok(text)
}

/// A header row followed by one row per expense, every field quoted.
pub fn csv(expenses: &[&Expense]) -> Res<String> {
    let mut buf = Vec::from(CSV_HEADER.as_bytes());
    buf.push(b'\n');
    let mut wtr = ::csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(::csv::QuoteStyle::Always)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(buf);
    for expense in expenses {
        wtr.write_record([
            expense.title().to_string(),
            expense.amount().to_string(),
            expense.category().to_string(),
            expense.date().to_string(),
            expense.description().unwrap_or_default().to_string(),
        ])
        .with_context(|| format!("Unable to write '{}' as CSV", expense.title()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish the CSV report: {e}"))?;
    String::from_utf8(bytes).context("The CSV report is not valid UTF-8")
}

/// The sum of the amounts of `expenses`.
///
/// # Errors
/// If the sum is too large for a `Decimal`.
pub fn total(expenses: &[&Expense]) -> Res<Amount> {
    Amount::checked_sum(expenses.iter().map(|e| e.amount())).with_context(|| {
        format!(
            "The total of {} expenses is too large to compute",
            expenses.len()
        )
    })
}

/// `part / total` as a percentage with one decimal place. Zero when `total` is zero, `None` if
/// the result is too large for a `Decimal`.
fn percentage(part: Decimal, total: Decimal) -> Option<Decimal> {
    if total.is_zero() {
        return Some(Decimal::new(0, 1));
    }
    let mut pct = part
        .checked_div(total)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(1);
    Some(pct)
}
