//! Fiscal period calendar.
//!
//! Thirteen four-week periods cover the fiscal year that starts on
//! 2024-12-29. Both ends of each range are inclusive and consecutive
//! ranges touch without overlapping.

use chrono::{NaiveDate, NaiveDateTime};

use crate::util::UNKNOWN;

/// One named, inclusive date range of the fiscal calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub label: &'static str,
    pub start: (i32, u32, u32),
    pub end: (i32, u32, u32),
}

impl Period {
    pub fn start_date(&self) -> NaiveDate {
        ymd(self.start)
    }

    pub fn end_date(&self) -> NaiveDate {
        ymd(self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }

    /// Human-readable range, e.g. `Dec 29, 2024 - Jan 25, 2025`.
    pub fn describe(&self) -> String {
        format!(
            "{} - {}",
            self.start_date().format("%b %-d, %Y"),
            self.end_date().format("%b %-d, %Y")
        )
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    // The table below only holds valid calendar dates.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

pub const PERIODS: [Period; 13] = [
    Period { label: "Period 1", start: (2024, 12, 29), end: (2025, 1, 25) },
    Period { label: "Period 2", start: (2025, 1, 26), end: (2025, 2, 22) },
    Period { label: "Period 3", start: (2025, 2, 23), end: (2025, 3, 22) },
    Period { label: "Period 4", start: (2025, 3, 23), end: (2025, 4, 19) },
    Period { label: "Period 5", start: (2025, 4, 20), end: (2025, 5, 17) },
    Period { label: "Period 6", start: (2025, 5, 18), end: (2025, 6, 14) },
    Period { label: "Period 7", start: (2025, 6, 15), end: (2025, 7, 12) },
    Period { label: "Period 8", start: (2025, 7, 13), end: (2025, 8, 9) },
    Period { label: "Period 9", start: (2025, 8, 10), end: (2025, 9, 6) },
    Period { label: "Period 10", start: (2025, 9, 7), end: (2025, 10, 4) },
    Period { label: "Period 11", start: (2025, 10, 5), end: (2025, 11, 1) },
    Period { label: "Period 12", start: (2025, 11, 2), end: (2025, 11, 29) },
    Period { label: "Period 13", start: (2025, 11, 30), end: (2025, 12, 27) },
];

/// Map a timestamp to its period label, or `"Unknown"` when the timestamp
/// is missing or falls outside the fiscal year.
pub fn period_for(ts: Option<NaiveDateTime>) -> &'static str {
    let Some(ts) = ts else {
        return UNKNOWN;
    };
    let date = ts.date();
    PERIODS
        .iter()
        .find(|p| p.contains(date))
        .map(|p| p.label)
        .unwrap_or(UNKNOWN)
}

/// Sort key giving chronological order: periods 1..=13 first, then anything
/// else (e.g. `"Unknown"`).
pub fn period_rank(label: &str) -> usize {
    PERIODS
        .iter()
        .position(|p| p.label == label)
        .unwrap_or(PERIODS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(12, 30, 0))
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        assert_eq!(period_for(at(2024, 12, 29)), "Period 1");
        assert_eq!(period_for(at(2025, 1, 25)), "Period 1");
        assert_eq!(period_for(at(2025, 1, 26)), "Period 2");
        assert_eq!(period_for(at(2025, 12, 27)), "Period 13");
    }

    #[test]
    fn every_day_of_each_period_maps_to_it() {
        for p in PERIODS.iter() {
            let mut d = p.start_date();
            while d <= p.end_date() {
                assert_eq!(period_for(d.and_hms_opt(23, 59, 59)), p.label);
                d = d.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn periods_are_contiguous_and_disjoint() {
        for pair in PERIODS.windows(2) {
            assert!(pair[0].start_date() <= pair[0].end_date());
            assert_eq!(pair[0].end_date().succ_opt().unwrap(), pair[1].start_date());
        }
        for (i, a) in PERIODS.iter().enumerate() {
            for b in PERIODS.iter().skip(i + 1) {
                assert!(a.end_date() < b.start_date());
            }
        }
    }

    #[test]
    fn outside_or_missing_is_unknown() {
        assert_eq!(period_for(None), "Unknown");
        assert_eq!(period_for(at(2024, 12, 28)), "Unknown");
        assert_eq!(period_for(at(2025, 12, 28)), "Unknown");
    }

    #[test]
    fn rank_orders_numerically() {
        assert!(period_rank("Period 2") < period_rank("Period 10"));
        assert_eq!(period_rank("Unknown"), 13);
        assert_eq!(PERIODS[0].describe(), "Dec 29, 2024 - Jan 25, 2025");
    }
}
