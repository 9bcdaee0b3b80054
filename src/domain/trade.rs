use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::league::League;
use super::player::Player;
use super::team::Team;

/// One team's side of a trade: what it gained and what it gave up.
///
/// Draft picks are carried pre-rendered as "year round" or "year round.slot"
/// strings. FAAB amounts accumulate, so a multi-line-item trade sums
/// correctly.
///
/// Not every platform can fill both sides: Fleaflicker only reports
/// additions, so its details carry empty loss lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDetail {
    pub team: Team,
    pub added_players: Vec<Player>,
    pub lost_players: Vec<Player>,
    pub added_picks: Vec<String>,
    pub lost_picks: Vec<String>,
    pub faab_added: u32,
    pub faab_lost: u32,
}

impl TradeDetail {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            added_players: Vec::new(),
            lost_players: Vec::new(),
            added_picks: Vec::new(),
            lost_picks: Vec::new(),
            faab_added: 0,
            faab_lost: 0,
        }
    }

    pub fn add_player(&mut self, player: Player) {
        self.added_players.push(player);
    }

    pub fn lose_player(&mut self, player: Player) {
        self.lost_players.push(player);
    }

    pub fn add_pick(&mut self, year: &str, round: u32) {
        self.added_picks.push(format!("{} {}", year, round));
    }

    pub fn add_pick_with_slot(&mut self, year: &str, round: u32, slot: u32) {
        self.added_picks.push(format!("{} {}.{}", year, round, slot));
    }

    pub fn lose_pick(&mut self, year: &str, round: u32) {
        self.lost_picks.push(format!("{} {}", year, round));
    }

    pub fn lose_pick_with_slot(&mut self, year: &str, round: u32, slot: u32) {
        self.lost_picks.push(format!("{} {}.{}", year, round, slot));
    }

    pub fn add_faab(&mut self, amount: u32) {
        self.faab_added += amount;
    }

    pub fn lose_faab(&mut self, amount: u32) {
        self.faab_lost += amount;
    }

    pub fn is_empty(&self) -> bool {
        self.added_players.is_empty()
            && self.lost_players.is_empty()
            && self.added_picks.is_empty()
            && self.lost_picks.is_empty()
            && self.faab_added == 0
            && self.faab_lost == 0
    }
}

/// A completed trade between two or more teams in a league.
///
/// `trade_id` is the platform's native transaction id when one exists, or
/// empty when the platform has none; `identity()` is what the delivery
/// pipeline dedups on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub league: League,
    pub time: DateTime<Utc>,
    pub details: Vec<TradeDetail>,
}

impl Trade {
    pub fn new(
        trade_id: impl Into<String>,
        league: League,
        time: DateTime<Utc>,
        details: Vec<TradeDetail>,
    ) -> Self {
        Self {
            trade_id: trade_id.into(),
            league,
            time,
            details,
        }
    }

    /// Stable identity for dedup: the native id when the platform provides
    /// one, otherwise a hash of league and timestamp.
    pub fn identity(&self) -> String {
        if !self.trade_id.is_empty() {
            return self.trade_id.clone();
        }

        let mut hasher = Sha256::new();
        hasher.update(self.league.league_id.as_bytes());
        hasher.update(self.time.timestamp_millis().to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// Display names of every manager involved, in detail order.
    pub fn participant_names(&self) -> Vec<&str> {
        self.details
            .iter()
            .map(|d| d.team.manager.name.as_str())
            .collect()
    }
}
