//! Production line consolidation.
//!
//! Raw `Source` identifiers name individual stations (`EOL01_SCAN`,
//! `PAL_LINE_4`, ...). Rates and breakdowns are reported per production
//! line, so every identifier is folded into one canonical group here.

use crate::util::UNKNOWN;

pub const IBC_GROUP: &str = "IBC (Inbound Conveyor)";

const IBC_MARKER: &str = "IBC";

/// Canonical groups indexed by line number - 1.
pub const LINE_GROUPS: [&str; 6] = [
    "Aquafina/Propel 1",
    "Aquafina/Propel 2",
    "Can Line 3",
    "Can Line 4",
    "Bottle Line 5",
    "Bottle Line 6",
];

/// Fold a raw line identifier into its canonical group.
///
/// Precedence: inbound-conveyor marker, then `EOL0N` / `EOL_0N` tokens,
/// then a trailing digit 1-6. Anything else comes back upper-cased.
pub fn consolidate_line(source: Option<&str>) -> String {
    let Some(source) = source else {
        return UNKNOWN.to_string();
    };
    let s = source.to_uppercase();

    // IBC identifiers often end in a digit, so this has to win.
    if s.contains(IBC_MARKER) {
        return IBC_GROUP.to_string();
    }

    for (idx, group) in LINE_GROUPS.iter().enumerate() {
        let n = idx + 1;
        if s.contains(&format!("EOL0{n}")) || s.contains(&format!("EOL_0{n}")) {
            return group.to_string();
        }
    }

    if let Some(n) = s.chars().last().and_then(|c| c.to_digit(10)) {
        if (1..=6).contains(&n) {
            return LINE_GROUPS[n as usize - 1].to_string();
        }
    }

    s
}

/// True when a raw identifier belongs to the inbound-conveyor path.
pub fn is_inbound_conveyor(source: &str) -> bool {
    consolidate_line(Some(source)) == IBC_GROUP
}
