//! One analysis session: the loaded records, their filter state, and the
//! filtered view derived from both.
//!
//! Every mutation recomputes the view before returning, so readers never
//! observe a stale view.

use std::fmt;
use std::str::FromStr;

use crate::aggregate::FilteredView;
use crate::filter::{Dimension, FilterState};
use crate::store::RecordStore;

/// A user-facing filter action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    SelectAll(Dimension),
    Reset(Dimension),
    Solo(Dimension, String),
    Toggle(Dimension, String),
}

impl FromStr for FilterCommand {
    type Err = String;

    /// Parses `all <dim>`, `reset <dim>`, `solo <dim> <value>` and
    /// `toggle <dim> <value>`. The value is the rest of the line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, char::is_whitespace);
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let dimension: Dimension = parts
            .next()
            .ok_or_else(|| format!("missing dimension in '{}'", s.trim()))?
            .parse()
            .map_err(|e| format!("{}", e))?;
        let value = parts.next().map(str::trim).filter(|v| !v.is_empty());

        match (verb.as_str(), value) {
            ("all" | "select-all", None) => Ok(FilterCommand::SelectAll(dimension)),
            ("reset", None) => Ok(FilterCommand::Reset(dimension)),
            ("solo", Some(v)) => Ok(FilterCommand::Solo(dimension, v.to_string())),
            ("toggle", Some(v)) => Ok(FilterCommand::Toggle(dimension, v.to_string())),
            ("solo" | "toggle", None) => Err(format!("'{}' needs a value", verb)),
            _ => Err(format!("unrecognized filter command '{}'", s.trim())),
        }
    }
}

impl fmt::Display for FilterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCommand::SelectAll(d) => write!(f, "all {}", d),
            FilterCommand::Reset(d) => write!(f, "reset {}", d),
            FilterCommand::Solo(d, v) => write!(f, "solo {} {}", d, v),
            FilterCommand::Toggle(d, v) => write!(f, "toggle {} {}", d, v),
        }
    }
}

#[derive(Debug)]
struct Loaded {
    store: RecordStore,
    filter: FilterState,
    visible: Vec<usize>,
}

impl Loaded {
    fn refresh(&mut self) {
        self.visible = self.filter.retained_indices(self.store.records());
    }
}

#[derive(Debug, Default)]
pub struct Session {
    loaded: Option<Loaded>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was loaded with `store` and fresh default selections.
    pub fn load(&mut self, store: RecordStore) {
        let filter = FilterState::initialize(store.records());
        let mut loaded = Loaded {
            store,
            filter,
            visible: Vec::new(),
        };
        loaded.refresh();
        self.loaded = Some(loaded);
    }

    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn store(&self) -> Option<&RecordStore> {
        self.loaded.as_ref().map(|l| &l.store)
    }

    pub fn filter(&self) -> Option<&FilterState> {
        self.loaded.as_ref().map(|l| &l.filter)
    }

    /// Current filtered view; empty when nothing is loaded.
    pub fn view(&self) -> FilteredView<'_> {
        match &self.loaded {
            Some(l) => {
                let records = l.store.records();
                l.visible.iter().map(|&i| &records[i]).collect()
            }
            None => FilteredView::default(),
        }
    }

    /// Apply one filter action and recompute the view. No-op before a
    /// dataset is loaded.
    pub fn apply(&mut self, command: &FilterCommand) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        match command {
            FilterCommand::SelectAll(d) => loaded.filter.select_all(*d),
            FilterCommand::Reset(d) => loaded.filter.reset(*d),
            FilterCommand::Solo(d, v) => loaded.filter.solo(*d, v),
            FilterCommand::Toggle(d, v) => loaded.filter.toggle(*d, v),
        }
        loaded.refresh();
    }

    pub fn select_all(&mut self, dimension: Dimension) {
        self.apply(&FilterCommand::SelectAll(dimension));
    }

    pub fn reset(&mut self, dimension: Dimension) {
        self.apply(&FilterCommand::Reset(dimension));
    }

    pub fn solo(&mut self, dimension: Dimension, value: &str) {
        self.apply(&FilterCommand::Solo(dimension, value.to_string()));
    }

    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        self.apply(&FilterCommand::Toggle(dimension, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn rec(source: &str, sku: &str) -> Record {
        Record {
            reject_datetime: chrono::NaiveDate::from_ymd_opt(2025, 5, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0)),
            source: source.to_string(),
            reject_reason: "Label unreadable".to_string(),
            lpn: "Unknown".to_string(),
            sku: sku.to_string(),
            log_text: "Unknown".to_string(),
            quantity: 1,
        }
    }

    fn store() -> RecordStore {
        vec![rec("EOL01", "A"), rec("EOL05", "B"), rec("IBC01_SHAPE", "A")]
            .into_iter()
            .collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "solo lines EOL01 LEFT".parse::<FilterCommand>(),
            Ok(FilterCommand::Solo(Dimension::Line, "EOL01 LEFT".to_string()))
        );
        assert_eq!(
            "reset periods".parse::<FilterCommand>(),
            Ok(FilterCommand::Reset(Dimension::Period))
        );
        assert_eq!(
            "all skus".parse::<FilterCommand>(),
            Ok(FilterCommand::SelectAll(Dimension::Sku))
        );
        assert!("toggle skus".parse::<FilterCommand>().is_err());
        assert!("solo colours x".parse::<FilterCommand>().is_err());
        assert!("frobnicate lines".parse::<FilterCommand>().is_err());
        assert_eq!(
            FilterCommand::Toggle(Dimension::Sku, "A".to_string()).to_string(),
            "toggle skus A"
        );
    }

    #[test]
    fn unloaded_session_is_inert() {
        let mut session = Session::new();
        session.reset(Dimension::Line);
        session.solo(Dimension::Sku, "A");
        assert!(!session.is_loaded());
        assert!(session.view().is_empty());
        assert!(session.filter().is_none());
    }

    #[test]
    fn every_mutation_refreshes_the_view() {
        let mut session = Session::new();
        session.load(store());
        assert_eq!(session.view().len(), 2);

        session.select_all(Dimension::Line);
        assert_eq!(session.view().len(), 3);

        session.solo(Dimension::Sku, "B");
        assert_eq!(session.view().len(), 1);
        assert_eq!(session.view().records()[0].source, "EOL05");

        session.toggle(Dimension::Sku, "B");
        assert_eq!(session.view().len(), 3);

        session.clear();
        assert!(session.view().is_empty());
        assert!(session.store().is_none());
    }
}
