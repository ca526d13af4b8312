use crate::aggregate::{weekday_name, FilteredView, GroupBy, OTHER_LABEL};
use crate::config::{AnalyzerConfig, ProductionTotals};
use crate::filter::{Dimension, FilterState};
use crate::output;
use crate::reasons::Category;
use crate::types::{
    CategoryRow, CountRow, LineGroupRow, RejectionRateRow, SummaryStats, TimeSlotRow,
};
use crate::util::{format_int, format_number, percentage};
use std::error::Error;
use std::path::Path;

/// Per-category pages written alongside the categories report: top reasons
/// and rejections per raw line.
const CATEGORY_PAGES: [(Category, &str, &str); 2] = [
    (
        Category::Dimensional,
        "report_dimensional_reasons.csv",
        "report_dimensional_lines.csv",
    ),
    (
        Category::TagTrackingSystem,
        "report_tag_tracking_reasons.csv",
        "report_tag_tracking_lines.csv",
    ),
];

/// Report pages, each with a fixed output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    TopReasons,
    PeriodTrend,
    ConsolidatedLines,
    RejectionRates,
    TimeOfDay,
    Categories,
    TopProducts,
}

impl ReportKind {
    pub const ALL: [ReportKind; 7] = [
        ReportKind::TopReasons,
        ReportKind::PeriodTrend,
        ReportKind::ConsolidatedLines,
        ReportKind::RejectionRates,
        ReportKind::TimeOfDay,
        ReportKind::Categories,
        ReportKind::TopProducts,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::TopReasons => "report_top_reasons.csv",
            ReportKind::PeriodTrend => "report_period_trend.csv",
            ReportKind::ConsolidatedLines => "report_consolidated_lines.csv",
            ReportKind::RejectionRates => "report_rejection_rates.csv",
            ReportKind::TimeOfDay => "report_time_of_day.csv",
            ReportKind::Categories => "report_categories.csv",
            ReportKind::TopProducts => "report_top_products.csv",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::TopReasons => "Top Rejection Reasons",
            ReportKind::PeriodTrend => "Period Rejection Trends",
            ReportKind::ConsolidatedLines => "Rejections by Consolidated Production Line",
            ReportKind::RejectionRates => "Rejection Rate by Production Line",
            ReportKind::TimeOfDay => "Rejections by Hour of Day and Day of Week",
            ReportKind::Categories => "Rejection Categories",
            ReportKind::TopProducts => "Top Products by Rejection Count",
        }
    }

    /// Build this report from `view`, write it under `out_dir` and print a
    /// preview of the first `preview_rows` rows.
    pub fn emit(
        self,
        view: &FilteredView<'_>,
        config: &AnalyzerConfig,
        out_dir: &Path,
        preview_rows: usize,
    ) -> Result<(), Box<dyn Error>> {
        let path = out_dir.join(self.file_name());
        match self {
            ReportKind::TopReasons => {
                let rows = top_reasons_report(view, config.top_reasons);
                output::publish(&path, self.title(), None, &rows, preview_rows)
            }
            ReportKind::PeriodTrend => {
                let rows = period_trend_report(view);
                output::publish(&path, self.title(), None, &rows, preview_rows)
            }
            ReportKind::ConsolidatedLines => {
                let rows = consolidated_lines_report(view);
                output::publish(&path, self.title(), None, &rows, preview_rows)
            }
            ReportKind::RejectionRates => {
                let rows = rejection_rate_report(view, &config.production);
                output::publish(&path, self.title(), None, &rows, preview_rows)
            }
            ReportKind::TimeOfDay => {
                let note = view.peak_hours().map(|p| {
                    format!(
                        "Worst hour {}:00 ({}), best hour {}:00 ({})",
                        p.worst_hour, p.worst_count, p.best_hour, p.best_count
                    )
                });
                let rows = time_of_day_report(view);
                output::publish(&path, self.title(), note.as_deref(), &rows, preview_rows)
            }
            ReportKind::Categories => {
                let rows = category_report(view, config.top_category_reasons);
                output::publish(&path, self.title(), None, &rows, preview_rows)?;
                for (category, reasons_file, lines_file) in CATEGORY_PAGES {
                    let rows =
                        category_reasons_report(view, category, config.top_category_reasons);
                    let title = format!("Top {} Reasons", category.label());
                    output::publish(&out_dir.join(reasons_file), &title, None, &rows, preview_rows)?;

                    let rows = category_lines_report(view, category);
                    let title = format!("{} Rejects by Production Line", category.label());
                    output::publish(&out_dir.join(lines_file), &title, None, &rows, preview_rows)?;
                }
                Ok(())
            }
            ReportKind::TopProducts => {
                let note = format!(
                    "Top {} account for {}% of all rejections",
                    config.top_products,
                    format_number(view.top_n_share(GroupBy::Sku, config.top_products), 3)
                );
                let rows = top_products_report(view, config.top_products);
                output::publish(&path, self.title(), Some(&note), &rows, preview_rows)
            }
        }
    }
}

fn count_rows(rows: Vec<(String, usize)>, total: usize) -> Vec<CountRow> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, (value, count))| CountRow {
            rank: (idx + 1).to_string(),
            value,
            rejections: format_int(count),
            share: format_number(percentage(count as f64, total as f64), 2),
        })
        .collect()
}

pub fn top_reasons_report(view: &FilteredView<'_>, n: usize) -> Vec<CountRow> {
    let top = view.top_n_by(GroupBy::Reason, n);
    let total = view.total_count();
    let mut rows = count_rows(top.entries, total);
    if let Some(other) = top.other {
        // The remainder bucket is not ranked.
        rows.push(CountRow {
            rank: "-".to_string(),
            value: OTHER_LABEL.to_string(),
            rejections: format_int(other),
            share: format_number(percentage(other as f64, total as f64), 2),
        });
    }
    rows
}

pub fn top_products_report(view: &FilteredView<'_>, n: usize) -> Vec<CountRow> {
    count_rows(view.top_n_by(GroupBy::Sku, n).entries, view.total_count())
}

pub fn period_trend_report(view: &FilteredView<'_>) -> Vec<CountRow> {
    count_rows(view.period_trend(), view.total_count())
}

pub fn consolidated_lines_report(view: &FilteredView<'_>) -> Vec<LineGroupRow> {
    let mut rows = Vec::new();
    for group in view.consolidated_line_breakdown() {
        for (source, count) in &group.members {
            rows.push(LineGroupRow {
                consolidated_line: group.group.clone(),
                source: source.clone(),
                source_rejections: format_int(*count),
                group_rejections: format_int(group.count),
            });
        }
    }
    rows
}

pub fn rejection_rate_report(
    view: &FilteredView<'_>,
    totals: &ProductionTotals,
) -> Vec<RejectionRateRow> {
    let rates = view.rejection_rate(totals);
    rates
        .lines
        .iter()
        .chain(std::iter::once(&rates.overall))
        .map(|r| RejectionRateRow {
            line: r.line.clone(),
            rejections: format_int(r.rejections),
            production: format_int(r.production),
            rejection_rate: format!("{}%", format_number(r.rate, 2)),
        })
        .collect()
}

pub fn time_of_day_report(view: &FilteredView<'_>) -> Vec<TimeSlotRow> {
    let hours = view
        .hour_of_day_distribution()
        .into_iter()
        .map(|(hour, count)| TimeSlotRow {
            kind: "Hour".to_string(),
            slot: format!("{:02}:00", hour),
            rejections: format_int(count),
        });
    let days = view
        .day_of_week_distribution()
        .into_iter()
        .map(|(day, count)| TimeSlotRow {
            kind: "Weekday".to_string(),
            slot: weekday_name(day).to_string(),
            rejections: format_int(count),
        });
    hours.chain(days).collect()
}

pub fn category_report(view: &FilteredView<'_>, n: usize) -> Vec<CategoryRow> {
    let total = view.total_count();
    view.category_breakdown()
        .into_iter()
        .map(|(category, count)| {
            let detail = view.category_detail(category, n);
            CategoryRow {
                category: category.label().to_string(),
                rejections: format_int(count),
                share: format_number(percentage(count as f64, total as f64), 2),
                top_reason: detail
                    .top_reasons
                    .first()
                    .map(|(reason, _)| reason.clone())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

/// Reasons within one category, for the dimensional and tag/tracking pages.
pub fn category_reasons_report(
    view: &FilteredView<'_>,
    category: Category,
    n: usize,
) -> Vec<CountRow> {
    let detail = view.category_detail(category, n);
    count_rows(detail.top_reasons, detail.count)
}

/// Rejections per raw line within one category.
pub fn category_lines_report(view: &FilteredView<'_>, category: Category) -> Vec<CountRow> {
    let detail = view.category_detail(category, 0);
    count_rows(detail.by_line, detail.count)
}

pub fn generate_summary(
    view: &FilteredView<'_>,
    filter: &FilterState,
    totals: &ProductionTotals,
) -> SummaryStats {
    let dashboard = view.dashboard();
    let filters = filter.summary();
    let selected = |d: Dimension| {
        filters
            .iter()
            .find(|s| s.dimension == d)
            .map_or(0, |s| s.selected)
    };
    SummaryStats {
        total_rejections: dashboard.total_rejections,
        total_quantity: view.total_quantity(),
        top_reason: dashboard.top_reason,
        date_range: dashboard.date_range.to_string(),
        overall_rejection_rate: view.rejection_rate(totals).overall.rate,
        selected_periods: selected(Dimension::Period),
        selected_lines: selected(Dimension::Line),
        selected_skus: selected(Dimension::Sku),
        filters,
    }
}
