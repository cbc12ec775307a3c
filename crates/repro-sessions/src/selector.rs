use std::fmt;
use std::str::FromStr;

use facet::Facet;
use repro_types::SessionRecord;

use crate::load::HEARTBEAT_MARKER;

/// Substring of `application_name` carried by sessions the database opens
/// for its own tooling; those never make the candidate list.
pub const DRIVER_APPLICATION: &str = "cockroach";

/// What to do when more than one session carries the marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    First,
    /// Later rows in the listing overwrite earlier ones.
    #[default]
    Last,
    /// Select nothing when the listing is ambiguous.
    Reject,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown tie-break `{other}` (expected first, last or reject)"
            )),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Reject => "reject",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOptions {
    pub marker: String,
    pub driver_application: String,
    pub tie_break: TieBreak,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            marker: HEARTBEAT_MARKER.to_owned(),
            driver_application: DRIVER_APPLICATION.to_owned(),
            tie_break: TieBreak::default(),
        }
    }
}

#[derive(Facet, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// `None` when no session matched, or when the match was ambiguous under
    /// [`TieBreak::Reject`].
    pub target: Option<String>,
    /// Every session carrying the marker, in listing order.
    pub matched: Vec<String>,
    /// Sessions not opened by the database's own tooling, in listing order.
    pub candidates: Vec<String>,
}

impl Selection {
    pub fn cancel_statements(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|id| cancel_statement(id))
            .collect()
    }
}

pub fn select_target(records: &[SessionRecord], options: &SelectOptions) -> Selection {
    let mut selection = Selection::default();

    for record in records {
        if record.last_active_query.contains(&options.marker) {
            selection.matched.push(record.session_id.clone());
        }
        if !record
            .application_name
            .contains(&options.driver_application)
        {
            selection.candidates.push(record.session_id.clone());
        }
    }

    selection.target = match options.tie_break {
        TieBreak::First => selection.matched.first().cloned(),
        TieBreak::Last => selection.matched.last().cloned(),
        TieBreak::Reject if selection.matched.len() == 1 => selection.matched.first().cloned(),
        TieBreak::Reject => None,
    };
    selection
}

/// A ready-to-paste cancel statement for `session_id`.
pub fn cancel_statement(session_id: &str) -> String {
    format!("CANCEL SESSION '{}';", session_id.replace('\'', "''"))
}
