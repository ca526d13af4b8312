use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::calendar::period_for;
use crate::filter::SelectionSummary;
use crate::lines::consolidate_line;
use crate::reasons::{categorize, Category};

/// One row of the rejected-units export, exactly as the CSV reader sees it.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Reject datetime")]
    pub reject_datetime: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "Reject reason")]
    pub reject_reason: Option<String>,
    #[serde(rename = "Lpn", default)]
    pub lpn: Option<String>,
    #[serde(rename = "Sku", default)]
    pub sku: Option<String>,
    #[serde(rename = "Log text", default)]
    pub log_text: Option<String>,
}

/// One rejected unit after cleaning. Derived attributes are computed on
/// demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub reject_datetime: Option<NaiveDateTime>,
    pub source: String,
    pub reject_reason: String,
    pub lpn: String,
    pub sku: String,
    pub log_text: String,
    pub quantity: u32,
}

impl Record {
    pub fn period(&self) -> &'static str {
        period_for(self.reject_datetime)
    }

    pub fn consolidated_line(&self) -> String {
        consolidate_line(Some(&self.source))
    }

    pub fn category(&self) -> Category {
        categorize(Some(&self.reject_reason))
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Rejections")]
    #[tabled(rename = "Rejections")]
    pub rejections: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LineGroupRow {
    #[serde(rename = "ConsolidatedLine")]
    #[tabled(rename = "ConsolidatedLine")]
    pub consolidated_line: String,
    #[serde(rename = "Source")]
    #[tabled(rename = "Source")]
    pub source: String,
    #[serde(rename = "SourceRejections")]
    #[tabled(rename = "SourceRejections")]
    pub source_rejections: String,
    #[serde(rename = "GroupRejections")]
    #[tabled(rename = "GroupRejections")]
    pub group_rejections: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RejectionRateRow {
    #[serde(rename = "Line")]
    #[tabled(rename = "Line")]
    pub line: String,
    #[serde(rename = "Rejections")]
    #[tabled(rename = "Rejections")]
    pub rejections: String,
    #[serde(rename = "Production")]
    #[tabled(rename = "Production")]
    pub production: String,
    #[serde(rename = "RejectionRate")]
    #[tabled(rename = "RejectionRate")]
    pub rejection_rate: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimeSlotRow {
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Slot")]
    #[tabled(rename = "Slot")]
    pub slot: String,
    #[serde(rename = "Rejections")]
    #[tabled(rename = "Rejections")]
    pub rejections: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Rejections")]
    #[tabled(rename = "Rejections")]
    pub rejections: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "TopReason")]
    #[tabled(rename = "TopReason")]
    pub top_reason: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_rejections: usize,
    pub total_quantity: u64,
    pub top_reason: String,
    pub date_range: String,
    pub overall_rejection_rate: f64,
    pub selected_periods: usize,
    pub selected_lines: usize,
    pub selected_skus: usize,
    pub filters: Vec<SelectionSummary>,
}
