//! Streaming average-draft-position statistics.
//!
//! Picks arrive one at a time from any number of league drafts; each player's
//! running count/sum/min/max is updated in place, never recomputed from
//! scratch.

use std::collections::HashMap;

use crate::domain::Player;

/// Running draft-position statistics for one player.
#[derive(Debug, Clone)]
pub struct AdpRecord {
    pub player: Player,
    count: u32,
    sum: u64,
    min_pick: u32,
    max_pick: u32,
}

impl AdpRecord {
    fn new(player: Player) -> Self {
        Self {
            player,
            count: 0,
            sum: 0,
            min_pick: u32::MAX,
            max_pick: 0,
        }
    }

    fn add_position(&mut self, pick: u32) {
        self.count += 1;
        self.sum += u64::from(pick);
        self.min_pick = self.min_pick.min(pick);
        self.max_pick = self.max_pick.max(pick);
    }

    pub fn times_drafted(&self) -> u32 {
        self.count
    }

    /// Mean pick position across every draft seen so far.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / f64::from(self.count)
    }

    pub fn min_pick(&self) -> u32 {
        self.min_pick
    }

    pub fn max_pick(&self) -> u32 {
        self.max_pick
    }
}

/// Accumulates draft picks across leagues and ranks players by mean pick.
#[derive(Debug, Default)]
pub struct AdpAggregator {
    records: HashMap<String, AdpRecord>,
    // Insertion order; breaks mean ties deterministically via stable sort.
    order: Vec<String>,
}

impl AdpAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pick(&mut self, player: &Player, pick: u32) {
        let record = self
            .records
            .entry(player.player_id.clone())
            .or_insert_with(|| {
                self.order.push(player.player_id.clone());
                AdpRecord::new(player.clone())
            });
        record.add_position(pick);
    }

    pub fn get(&self, player_id: &str) -> Option<&AdpRecord> {
        self.records.get(player_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted ascending by mean pick position; players first seen
    /// earlier win ties.
    pub fn ranked(&self) -> Vec<&AdpRecord> {
        let mut ranked: Vec<&AdpRecord> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        ranked.sort_by(|a, b| {
            a.mean()
                .partial_cmp(&b.mean())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Render a raw pick position as "round.pick" for a league of `league_size`
/// teams.
///
/// A position that lands exactly on a round boundary is the last pick of the
/// previous round, not pick zero of the next: position 42 in a 14-team league
/// is 3.14, not 4.0.
pub fn format_round_pick(position: f64, league_size: u32) -> String {
    let pick_overall = position.round() as u32;

    let mut round = pick_overall / league_size + 1;
    let mut pick = pick_overall % league_size;
    if pick == 0 {
        pick = league_size;
        round -= 1;
    }

    format!("{}.{}", round, pick)
}
