//! Multi-select filter state over the three slicing dimensions.
//!
//! Each dimension keeps an ordered list of choices with a `selected` flag.
//! An empty selection applies no restriction for that dimension; a
//! non-empty one keeps only records whose value is selected. Dimensions are
//! combined with AND.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::FilteredView;
use crate::calendar::PERIODS;
use crate::error::UnknownDimension;
use crate::lines::is_inbound_conveyor;
use crate::types::Record;
use crate::util::UNKNOWN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Period,
    Line,
    Sku,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Period, Dimension::Line, Dimension::Sku];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Period => "periods",
            Dimension::Line => "lines",
            Dimension::Sku => "skus",
        }
    }

    /// The record attribute this dimension filters on. Lines filter on the
    /// raw source, not the consolidated group.
    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Dimension::Period => record.period(),
            Dimension::Line => &record.source,
            Dimension::Sku => &record.sku,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "period" | "periods" => Ok(Dimension::Period),
            "line" | "lines" => Ok(Dimension::Line),
            "sku" | "skus" => Ok(Dimension::Sku),
            _ => Err(UnknownDimension(s.to_string())),
        }
    }
}

/// One selectable value. Disabled choices are listed but absent from the
/// dataset; they stay unselected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub selected: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    choices: Vec<Choice>,
}

impl Selection {
    fn push(&mut self, value: impl Into<String>, selected: bool, enabled: bool) {
        self.choices.push(Choice {
            value: value.into(),
            selected: selected && enabled,
            enabled,
        });
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c.value == value && c.selected)
    }

    pub fn selected_values(&self) -> HashSet<&str> {
        self.choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.choices.iter().filter(|c| c.selected).count()
    }

    pub fn enabled_count(&self) -> usize {
        self.choices.iter().filter(|c| c.enabled).count()
    }

    fn select_all(&mut self) {
        for c in &mut self.choices {
            c.selected = c.enabled;
        }
    }

    fn reset(&mut self) {
        for c in &mut self.choices {
            c.selected = false;
        }
    }

    /// Disabled values may be soloed; the view then comes back empty.
    fn solo(&mut self, value: &str) {
        if !self.choices.iter().any(|c| c.value == value) {
            return;
        }
        for c in &mut self.choices {
            c.selected = c.value == value;
        }
    }

    fn toggle(&mut self, value: &str) {
        if let Some(c) = self
            .choices
            .iter_mut()
            .find(|c| c.enabled && c.value == value)
        {
            c.selected = !c.selected;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub dimension: Dimension,
    pub selected: usize,
    pub enabled: usize,
    pub listed: usize,
}

/// Selection state for one loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    initialized: bool,
    periods: Selection,
    lines: Selection,
    skus: Selection,
}

impl FilterState {
    /// Build fresh selections from the values present in `records`.
    ///
    /// All thirteen periods are listed (absent ones disabled), with an extra
    /// `Unknown` entry when some records fall outside the calendar. Every
    /// present value starts selected except inbound-conveyor lines.
    pub fn initialize(records: &[Record]) -> Self {
        let present_periods: HashSet<&str> = records.iter().map(Record::period).collect();
        let mut periods = Selection::default();
        for p in PERIODS.iter() {
            let present = present_periods.contains(p.label);
            periods.push(p.label, present, present);
        }
        if present_periods.contains(UNKNOWN) {
            periods.push(UNKNOWN, true, true);
        }

        let mut lines = Selection::default();
        for line in sorted_distinct(records, Dimension::Line) {
            let selected = !is_inbound_conveyor(&line);
            lines.push(line, selected, true);
        }

        let mut skus = Selection::default();
        for sku in sorted_distinct(records, Dimension::Sku) {
            skus.push(sku, true, true);
        }

        Self {
            initialized: true,
            periods,
            lines,
            skus,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn selection(&self, dimension: Dimension) -> &Selection {
        match dimension {
            Dimension::Period => &self.periods,
            Dimension::Line => &self.lines,
            Dimension::Sku => &self.skus,
        }
    }

    fn selection_mut(&mut self, dimension: Dimension) -> Option<&mut Selection> {
        if !self.initialized {
            return None;
        }
        Some(match dimension {
            Dimension::Period => &mut self.periods,
            Dimension::Line => &mut self.lines,
            Dimension::Sku => &mut self.skus,
        })
    }

    pub fn select_all(&mut self, dimension: Dimension) {
        if let Some(sel) = self.selection_mut(dimension) {
            sel.select_all();
        }
    }

    pub fn reset(&mut self, dimension: Dimension) {
        if let Some(sel) = self.selection_mut(dimension) {
            sel.reset();
        }
    }

    pub fn solo(&mut self, dimension: Dimension, value: &str) {
        if let Some(sel) = self.selection_mut(dimension) {
            sel.solo(value);
        }
    }

    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        if let Some(sel) = self.selection_mut(dimension) {
            sel.toggle(value);
        }
    }

    /// Apply the three selections to `records`.
    pub fn combine<'a>(&self, records: &'a [Record]) -> FilteredView<'a> {
        self.retained_indices(records)
            .into_iter()
            .map(|i| &records[i])
            .collect()
    }

    /// Positions in `records` of the rows that pass every active dimension.
    pub fn retained_indices(&self, records: &[Record]) -> Vec<usize> {
        let active: Vec<(Dimension, HashSet<&str>)> = Dimension::ALL
            .iter()
            .map(|&d| (d, self.selection(d).selected_values()))
            .filter(|(_, selected)| !selected.is_empty())
            .collect();

        let kept: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                active
                    .iter()
                    .all(|(d, selected)| selected.contains(d.value_of(r)))
            })
            .map(|(i, _)| i)
            .collect();
        log::debug!(
            "Filtered data: {} rows (original: {} rows)",
            kept.len(),
            records.len()
        );
        kept
    }

    pub fn summary(&self) -> Vec<SelectionSummary> {
        Dimension::ALL
            .iter()
            .map(|&d| {
                let sel = self.selection(d);
                SelectionSummary {
                    dimension: d,
                    selected: sel.selected_count(),
                    enabled: sel.enabled_count(),
                    listed: sel.choices().len(),
                }
            })
            .collect()
    }
}

fn sorted_distinct(records: &[Record], dimension: Dimension) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .map(|r| dimension.value_of(r))
        .collect::<HashSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    values.sort();
    values
}
