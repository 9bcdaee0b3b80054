use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fantasy league as seen by every downstream consumer.
///
/// `roster_counts` maps a starting position bucket (QB, RB, FLEX, SF, ...) to
/// the number of starting slots; the sum of the counts is the league's
/// starting-lineup size. `ppr` and `tep` are the scoring modifiers relevant to
/// league classification (points per reception, tight-end reception bonus).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub league_id: String,
    pub name: String,
    pub size: u32,
    pub roster_counts: HashMap<String, u32>,
    pub ppr: f64,
    pub tep: f64,
    pub draft_id: String,
}

impl League {
    pub fn new(
        league_id: impl Into<String>,
        name: impl Into<String>,
        size: u32,
        draft_id: impl Into<String>,
    ) -> Self {
        Self {
            league_id: league_id.into(),
            name: name.into(),
            size,
            roster_counts: HashMap::new(),
            ppr: 0.0,
            tep: 0.0,
            draft_id: draft_id.into(),
        }
    }

    /// Total number of starting-lineup slots.
    pub fn starting_lineup_size(&self) -> u32 {
        self.roster_counts.values().sum()
    }
}

impl PartialEq for League {
    fn eq(&self, other: &Self) -> bool {
        self.league_id == other.league_id
    }
}

impl Eq for League {}
