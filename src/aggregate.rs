//! Metrics over the current filtered view.
//!
//! Every function here is a pure read: same view in, same output out.
//! Groupings keep first-encountered order, and sorts are stable, so ties
//! always resolve the same way.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

use crate::calendar::period_rank;
use crate::config::ProductionTotals;
use crate::reasons::{log_uncategorized, Category};
use crate::types::Record;
use crate::util::{percentage, UNKNOWN};

pub const OTHER_LABEL: &str = "Other";

/// Attributes a view can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupBy {
    Reason,
    Line,
    ConsolidatedLine,
    Sku,
    Period,
    Category,
}

impl GroupBy {
    pub fn key(self, record: &Record) -> String {
        match self {
            GroupBy::Reason => record.reject_reason.clone(),
            GroupBy::Line => record.source.clone(),
            GroupBy::ConsolidatedLine => record.consolidated_line(),
            GroupBy::Sku => record.sku.clone(),
            GroupBy::Period => record.period().to_string(),
            GroupBy::Category => record.category().label().to_string(),
        }
    }
}

/// Top-n table with the remainder folded into one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopN {
    pub entries: Vec<(String, usize)>,
    /// Present only when there were more than `n` distinct values.
    pub other: Option<usize>,
}

impl TopN {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum::<usize>() + self.other.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateRange {
    NoData,
    Span {
        first: NaiveDateTime,
        last: NaiveDateTime,
    },
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::NoData => f.write_str("No Data"),
            DateRange::Span { first, last } => write!(
                f,
                "{} - {}",
                first.format("%m/%d/%Y"),
                last.format("%m/%d/%Y")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakHours {
    pub worst_hour: u32,
    pub worst_count: usize,
    pub best_hour: u32,
    pub best_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineGroup {
    pub group: String,
    pub count: usize,
    /// Raw source identifiers folded into this group, most rejections first.
    pub members: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub count: usize,
    pub top_reasons: Vec<(String, usize)>,
    pub by_line: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRate {
    pub line: String,
    pub rejections: usize,
    pub production: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionRates {
    pub lines: Vec<LineRate>,
    pub overall: LineRate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_rejections: usize,
    pub top_reason: String,
    pub date_range: DateRange,
}

/// The records that survived the current filter selections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FromIterator<&'a Record> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> FilteredView<'a> {
    /// An unfiltered view over every record.
    pub fn all(records: &'a [Record]) -> Self {
        records.iter().collect()
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.quantity)).sum()
    }

    /// Counts per key, most frequent first, ties in first-encountered order.
    pub fn counts_by(&self, by: GroupBy) -> Vec<(String, usize)> {
        sorted_desc(count_in_order(self.records.iter().map(|r| by.key(r))))
    }

    pub fn top_n_by(&self, by: GroupBy, n: usize) -> TopN {
        let mut counts = self.counts_by(by);
        let other = if counts.len() > n {
            Some(counts.split_off(n).iter().map(|(_, c)| c).sum::<usize>())
        } else {
            None
        };
        TopN {
            entries: counts,
            other,
        }
    }

    /// Percentage of all rejections covered by the `n` most frequent values.
    pub fn top_n_share(&self, by: GroupBy, n: usize) -> f64 {
        let top: usize = self.top_n_by(by, n).entries.iter().map(|(_, c)| c).sum();
        percentage(top as f64, self.total_count() as f64)
    }

    pub fn date_range(&self) -> DateRange {
        let mut stamps = self.records.iter().filter_map(|r| r.reject_datetime);
        let Some(first) = stamps.next() else {
            return DateRange::NoData;
        };
        let (first, last) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        DateRange::Span { first, last }
    }

    /// Rejections per hour 0-23, hours without rejections omitted.
    pub fn hour_of_day_distribution(&self) -> Vec<(u32, usize)> {
        let mut hours = count_in_order(
            self.records
                .iter()
                .filter_map(|r| r.reject_datetime.map(|t| t.hour())),
        );
        hours.sort_by_key(|(h, _)| *h);
        hours
    }

    pub fn peak_hours(&self) -> Option<PeakHours> {
        let hours = self.hour_of_day_distribution();
        let (mut worst, mut best) = (*hours.first()?, *hours.first()?);
        for &(h, c) in &hours {
            if c > worst.1 {
                worst = (h, c);
            }
            if c < best.1 {
                best = (h, c);
            }
        }
        Some(PeakHours {
            worst_hour: worst.0,
            worst_count: worst.1,
            best_hour: best.0,
            best_count: best.1,
        })
    }

    /// Rejections per weekday, Monday first, days without rejections omitted.
    pub fn day_of_week_distribution(&self) -> Vec<(Weekday, usize)> {
        let mut days = count_in_order(
            self.records
                .iter()
                .filter_map(|r| r.reject_datetime.map(|t| t.weekday())),
        );
        days.sort_by_key(|(d, _)| d.num_days_from_monday());
        days
    }

    /// Rejections per fiscal period in calendar order.
    pub fn period_trend(&self) -> Vec<(String, usize)> {
        let mut periods = count_in_order(self.records.iter().map(|r| r.period().to_string()));
        periods.sort_by_key(|(p, _)| period_rank(p));
        periods
    }

    /// Rejections per category, every category listed. Reasons that matched
    /// no keyword are logged.
    pub fn category_breakdown(&self) -> Vec<(Category, usize)> {
        let categories = count_in_order(self.records.iter().map(|r| r.category()));
        let uncategorized: Vec<(String, usize)> = self
            .in_category(Category::Uncategorized)
            .counts_by(GroupBy::Reason);
        log_uncategorized(&uncategorized);

        Category::ALL
            .iter()
            .map(|&c| {
                let count = categories
                    .iter()
                    .find(|(k, _)| *k == c)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (c, count)
            })
            .collect()
    }

    pub fn category_detail(&self, category: Category, n: usize) -> CategoryDetail {
        let subset = self.in_category(category);
        CategoryDetail {
            category,
            count: subset.len(),
            top_reasons: subset.top_n_by(GroupBy::Reason, n).entries,
            by_line: subset.counts_by(GroupBy::Line),
        }
    }

    /// Rejections per consolidated line with the raw sources behind each.
    pub fn consolidated_line_breakdown(&self) -> Vec<LineGroup> {
        let mut members: HashMap<String, Vec<&'a Record>> = HashMap::new();
        let groups = self.counts_by(GroupBy::ConsolidatedLine);
        for &r in &self.records {
            members.entry(r.consolidated_line()).or_default().push(r);
        }
        groups
            .into_iter()
            .map(|(group, count)| {
                let sub: FilteredView<'a> = members
                    .remove(&group)
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                LineGroup {
                    members: sub.counts_by(GroupBy::Line),
                    group,
                    count,
                }
            })
            .collect()
    }

    /// Rejection rate per line against fixed production volumes. Every line
    /// in `totals` is reported, including lines with no rejections.
    pub fn rejection_rate(&self, totals: &ProductionTotals) -> RejectionRates {
        let counts: HashMap<String, usize> = self
            .counts_by(GroupBy::ConsolidatedLine)
            .into_iter()
            .collect();
        let lines = totals
            .iter()
            .map(|cap| {
                let rejections = counts.get(&cap.line).copied().unwrap_or(0);
                LineRate {
                    line: cap.line.clone(),
                    rejections,
                    production: cap.total,
                    rate: percentage(rejections as f64, cap.total as f64),
                }
            })
            .collect();
        let production = totals.sum();
        let rejections = self.total_count();
        RejectionRates {
            lines,
            overall: LineRate {
                line: "Overall".to_string(),
                rejections,
                production,
                rate: percentage(rejections as f64, production as f64),
            },
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            total_rejections: self.total_count(),
            top_reason: self
                .counts_by(GroupBy::Reason)
                .into_iter()
                .next()
                .map(|(reason, _)| reason)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            date_range: self.date_range(),
        }
    }

    fn in_category(&self, category: Category) -> FilteredView<'a> {
        self.records
            .iter()
            .copied()
            .filter(|r| r.category() == category)
            .collect()
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn count_in_order<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for k in keys {
        match index.get(&k) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }
    counts
}

fn sorted_desc<K>(mut counts: Vec<(K, usize)>) -> Vec<(K, usize)> {
    // Stable: equal counts keep first-encountered order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
