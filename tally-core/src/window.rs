use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar-month billing window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window for the month `index` months away from `today`'s month
    /// (0 = current, -1 = previous). Day-of-month is irrelevant; the
    /// window always spans the full calendar month, with year rollover
    /// in both directions.
    pub fn containing(today: NaiveDate, index: i32) -> Self {
        let (year, month) = shift_month(today.year(), today.month(), index);
        let start = first_of_month(year, month);
        // Last day = day before the first of the following month.
        let (next_year, next_month) = shift_month(year, month, 1);
        let end = first_of_month(next_year, next_month)
            .pred_opt()
            .unwrap_or(start);
        Self { start, end }
    }

    /// Whether `date` falls inside the window (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Shift a (year, month) pair by `delta` months, rolling the year over
/// past December and before January.
fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year as i64 * 12 + (month as i64 - 1) + delta as i64;
    let y = zero_based.div_euclid(12) as i32;
    let m = zero_based.rem_euclid(12) as u32 + 1;
    (y, m)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // month is always in 1..=12 here (shift_month normalizes)
    NaiveDate::from_ymd_opt(year, month, 1).expect("normalized month")
}
