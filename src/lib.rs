//! Rejected-units analysis: load a rejection export, slice it by period,
//! production line and product, and summarize what is left.
//!
//! Data flows one way:
//! [`store::RecordStore`] → [`filter::FilterState::combine`] →
//! [`aggregate::FilteredView`] → reports. [`session::Session`] ties the
//! pieces together and recomputes the view after every filter change.
pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod error;
pub mod filter;
pub mod lines;
pub mod loader;
pub mod output;
pub mod reasons;
pub mod reports;
pub mod session;
pub mod sku;
pub mod store;
pub mod types;
pub mod util;
