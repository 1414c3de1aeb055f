// 📊 Ledger Aggregator
// Day / month totals over raw worksheet rows. Never fails: bad rows are skipped.

use crate::record::{COL_AMOUNT, COL_CATEGORY, COL_DAY, COL_MONTH, COL_WHO, COL_YEAR, MIN_ROW_LEN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// TYPES
// ============================================================================

/// Local calendar date the totals are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl TargetDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        TargetDate { year, month, day }
    }
}

impl From<chrono::NaiveDate> for TargetDate {
    fn from(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        TargetDate::new(date.year(), date.month(), date.day())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub day: i64,
    pub month: i64,
}

/// Month total for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: i64,
}

// ============================================================================
// ROW FILTERING
// ============================================================================

/// A data row reduced to what the sums need
struct RowView<'a> {
    year: i32,
    month: u32,
    day: u32,
    amount: i64,
    category: &'a str,
}

/// Validate a row and apply the person filter; `None` means skip
fn view<'a>(row: &'a [String], person: Option<&str>) -> Option<RowView<'a>> {
    if row.len() < MIN_ROW_LEN {
        debug!(len = row.len(), "skipping short row");
        return None;
    }

    let Ok(amount) = row[COL_AMOUNT].trim().parse::<i64>() else {
        debug!(amount = %row[COL_AMOUNT], "skipping row with non-numeric amount");
        return None;
    };

    if let Some(filter) = person {
        let who = row.get(COL_WHO).map(|s| s.trim()).unwrap_or("");
        if who.to_lowercase() != filter.trim().to_lowercase() {
            return None;
        }
    }

    // Integer comparison: "9" and "09" are the same month
    let year = row[COL_YEAR].trim().parse::<i32>().ok()?;
    let month = row[COL_MONTH].trim().parse::<u32>().ok()?;
    let day = row[COL_DAY].trim().parse::<u32>().ok()?;

    Some(RowView {
        year,
        month,
        day,
        amount,
        category: row.get(COL_CATEGORY).map(|s| s.trim()).unwrap_or(""),
    })
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Sum data rows (no header) into day and month totals.
///
/// Order-independent; zero rows yields `(0, 0)`.
pub fn aggregate(rows: &[Vec<String>], target: TargetDate, person: Option<&str>) -> Totals {
    let mut totals = Totals::default();

    for row in rows {
        let Some(r) = view(row, person) else {
            continue;
        };

        if r.year != target.year || r.month != target.month {
            continue;
        }

        let is_today = r.day == target.day;
        let month = totals.month.checked_add(r.amount);
        let day = if is_today {
            totals.day.checked_add(r.amount)
        } else {
            Some(totals.day)
        };

        match (month, day) {
            (Some(month), Some(day)) => {
                totals.month = month;
                totals.day = day;
            }
            _ => debug!(amount = r.amount, "skipping row that would overflow the total"),
        }
    }

    totals
}

/// Same as [`aggregate`] over a full worksheet whose first row is the header
pub fn aggregate_sheet(rows: &[Vec<String>], target: TargetDate, person: Option<&str>) -> Totals {
    aggregate(rows.get(1..).unwrap_or(&[]), target, person)
}

/// Month totals per category, largest first (ties by name)
pub fn category_breakdown(
    rows: &[Vec<String>],
    target: TargetDate,
    person: Option<&str>,
) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<&str, i64> = HashMap::new();

    for row in rows {
        let Some(r) = view(row, person) else {
            continue;
        };
        if r.year == target.year && r.month == target.month {
            let total = by_category.entry(r.category).or_insert(0);
            match total.checked_add(r.amount) {
                Some(sum) => *total = sum,
                None => debug!(
                    amount = r.amount,
                    category = r.category,
                    "skipping row that would overflow the category total"
                ),
            }
        }
    }

    let mut breakdown: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();

    breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    breakdown
}
