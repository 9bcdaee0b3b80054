use serde::{Deserialize, Serialize};

use super::league::League;
use super::team::Team;

/// A team's score for a single week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub league: League,
    pub team: Team,
    pub week: u8,
    pub points: f64,
}

impl WeeklyScore {
    pub fn new(league: League, team: Team, week: u8, points: f64) -> Self {
        Self {
            league,
            team,
            week,
            points,
        }
    }
}

/// A team's cumulative points-for across the season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScore {
    pub league: League,
    pub team: Team,
    pub points: f64,
}

impl SeasonScore {
    pub fn new(league: League, team: Team, points: f64) -> Self {
        Self {
            league,
            team,
            points,
        }
    }
}
