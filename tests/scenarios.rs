use chrono::{Duration, NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use reject_report::aggregate::GroupBy;
use reject_report::calendar::PERIODS;
use reject_report::config::{LineCapacity, ProductionTotals};
use reject_report::filter::{Dimension, FilterState};
use reject_report::loader::load_from_reader;
use reject_report::reasons::{categorize, Category};
use reject_report::session::Session;
use reject_report::sku::SkuMaster;
use reject_report::store::RecordStore;
use reject_report::types::Record;

fn at(y: i32, m: u32, d: u32, h: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, 0, 0))
}

fn record(ts: Option<NaiveDateTime>, source: &str, reason: &str, sku: &str) -> Record {
    Record {
        reject_datetime: ts,
        source: source.to_string(),
        reject_reason: reason.to_string(),
        lpn: "Unknown".to_string(),
        sku: sku.to_string(),
        log_text: "Unknown".to_string(),
        quantity: 1,
    }
}

fn eol_and_ibc() -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..6 {
        records.push(record(at(2025, 4, 1 + i, 8), "EOL01", "Height out of tolerance", "A"));
    }
    for i in 0..4 {
        records.push(record(at(2025, 4, 10 + i, 9), "IBC01_SHAPE", "Width too large", "B"));
    }
    records
}

#[test]
fn inbound_conveyor_is_hidden_by_default() {
    let records = eol_and_ibc();
    let state = FilterState::initialize(&records);
    assert!(!state.selection(Dimension::Line).is_selected("IBC01_SHAPE"));

    let view = state.combine(&records);
    assert_eq!(view.len(), 6);
    assert!(view.records().iter().all(|r| r.source == "EOL01"));

    let groups = view.consolidated_line_breakdown();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group, "Aquafina/Propel 1");
    assert_eq!(groups[0].count, 6);
}

#[test]
fn reason_scenarios() {
    assert_eq!(
        categorize(Some("Duplicated LPN detected")),
        Category::TagTrackingSystem
    );
    assert_eq!(categorize(Some("Height out of tolerance")), Category::Dimensional);
}

#[test]
fn reset_periods_shows_everything() {
    // Ten records spread over all thirteen periods' start dates.
    let records: Vec<Record> = PERIODS
        .iter()
        .take(10)
        .map(|p| {
            record(
                p.start_date().and_hms_opt(12, 0, 0),
                "EOL03",
                "Label missing",
                "C",
            )
        })
        .collect();
    let mut state = FilterState::initialize(&records);
    state.reset(Dimension::Period);
    assert_eq!(state.combine(&records).len(), 10);
}

#[test]
fn all_selected_equals_none_selected_for_every_dimension() {
    let mut records = eol_and_ibc();
    records.push(record(None, "PAL_5", "Operator removed", "Unknown"));
    records.push(record(at(2026, 2, 1, 3), "EOL06", "Barcode unreadable", "D"));

    for d in Dimension::ALL {
        let mut all = FilterState::initialize(&records);
        all.select_all(d);
        let mut none = all.clone();
        none.reset(d);
        assert_eq!(all.combine(&records), none.combine(&records), "dimension {d}");
    }
}

#[test]
fn top_n_sizes_and_sums() {
    let mut records = Vec::new();
    for (i, reason) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
        for _ in 0..=i {
            records.push(record(at(2025, 5, 1, 10), "EOL02", reason, "S"));
        }
    }
    let state = FilterState::initialize(&records);
    let view = state.combine(&records);
    for n in 0..10 {
        let top = view.top_n_by(GroupBy::Reason, n);
        assert_eq!(top.entries.len(), n.min(7));
        assert_eq!(top.other.is_some(), 7 > n);
        assert_eq!(top.total(), view.total_count());
    }
    assert_eq!(view.top_n_by(GroupBy::Reason, 1).entries[0], ("g".to_string(), 7));
}

#[test]
fn rejection_rate_covers_every_line() {
    let records = eol_and_ibc();
    let state = FilterState::initialize(&records);
    let view = state.combine(&records);
    let rates = view.rejection_rate(&ProductionTotals::default());
    assert_eq!(rates.lines.len(), 6);
    assert_eq!(rates.lines[0].rejections, 6);
    assert!(rates.lines[1..].iter().all(|l| l.rejections == 0 && l.rate == 0.0));

    let empty = ProductionTotals::from(Vec::<LineCapacity>::new());
    let rates = view.rejection_rate(&empty);
    assert!(rates.lines.is_empty());
    assert_eq!(rates.overall.rate, 0.0);
}

#[test]
fn period_labels_cover_each_range() {
    for p in PERIODS.iter() {
        let days = (p.end_date() - p.start_date()).num_days();
        for offset in 0..=days {
            let ts = (p.start_date() + Duration::days(offset)).and_hms_opt(0, 0, 1);
            assert_eq!(reject_report::calendar::period_for(ts), p.label);
        }
    }
    assert_eq!(reject_report::calendar::period_for(None), "Unknown");
}

#[test]
fn export_to_reports_end_to_end() {
    let export = "\
Reject datetime,Source,Reject reason,Lpn,Sku,Log text
2025-01-05 06:10:00,EOL01,Height out of tolerance,L1,1001.0,
2025-01-06 06:20:00,EOL01,Height out of tolerance,L2,1001.0,
2025-01-07 07:00:00,EOL05,Duplicated LPN detected,L3,2002,
2025-01-08 07:30:00,IBC01_SHAPE,Width too large,L4,2002,
not-a-date,EOL05,Timeout waiting for PLC,L5,,
";
    let master = SkuMaster::from_pairs([("1001", "Aquafina 24pk")]);
    let (store, report) = load_from_reader(export.as_bytes(), &master).unwrap();
    assert_eq!(report.total_rows, 5);
    assert_eq!(report.invalid_timestamps, 1);

    let mut session = Session::new();
    session.load(store);
    assert_eq!(session.view().len(), 4);

    session.solo(Dimension::Sku, "Aquafina 24pk");
    let view = session.view();
    assert_eq!(view.len(), 2);
    assert_eq!(view.dashboard().date_range.to_string(), "01/05/2025 - 01/06/2025");

    session.reset(Dimension::Sku);
    session.select_all(Dimension::Line);
    let view = session.view();
    assert_eq!(view.len(), 5);
    assert_eq!(
        view.category_breakdown(),
        vec![
            (Category::Dimensional, 3),
            (Category::TagTrackingSystem, 2),
            (Category::Uncategorized, 0),
        ]
    );
}

#[test]
fn store_is_untouched_by_filtering() {
    let records = eol_and_ibc();
    let store: RecordStore = records.clone().into_iter().collect();
    let mut session = Session::new();
    session.load(store);
    session.solo(Dimension::Line, "IBC01_SHAPE");
    assert_eq!(session.view().len(), 4);
    assert_eq!(session.store().unwrap().records(), records.as_slice());
}
