//! Starting-lineup inactive detection.
//!
//! Classifies each starter as reportable or not using the bye-week table, the
//! player's own injury designation, and the caller's exclusion filters.

use crate::domain::Player;

use super::bye_weeks;

/// Exclusion filters applied before any status check.
///
/// Names and team abbreviations in the ignore lists are never reported; a
/// non-empty `only_teams` restricts reporting to those NFL teams.
#[derive(Debug, Clone, Default)]
pub struct RosterFilters {
    pub ignore_players: Vec<String>,
    pub ignore_teams: Vec<String>,
    pub only_teams: Vec<String>,
}

impl RosterFilters {
    fn excludes(&self, player: &Player) -> bool {
        if self.ignore_players.iter().any(|n| *n == player.name) {
            return true;
        }
        if self.ignore_teams.iter().any(|t| *t == player.team) {
            return true;
        }
        if !self.only_teams.is_empty() && !self.only_teams.iter().any(|t| *t == player.team) {
            return true;
        }
        false
    }
}

/// Return the starters that should be reported as inactive for `week`.
///
/// A player on a bye-week team is reported with status "BYE" no matter what
/// their own designation says; everyone else is reported iff their
/// designation marks them inactive.
pub fn classify_starters(starters: &[Player], week: u8, filters: &RosterFilters) -> Vec<Player> {
    let on_bye = bye_weeks::teams_on_bye(week);
    let mut flagged = Vec::new();

    for player in starters {
        if filters.excludes(player) {
            continue;
        }

        if on_bye.contains(&player.team.as_str()) {
            let mut benched = player.clone();
            benched.status = "BYE".to_string();
            flagged.push(benched);
        } else if player.is_inactive() {
            flagged.push(player.clone());
        }
    }

    flagged
}
