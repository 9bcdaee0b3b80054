use serde::{Deserialize, Serialize};

/// An NFL player in an upstream platform's catalog.
///
/// `team` is the NFL team abbreviation ("KC", "DET", ...). `status` is the
/// platform's injury designation; empty means healthy. The inactive-roster
/// detector overwrites `status` with "BYE" for players on a bye-week team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub status: String,
}

impl Player {
    pub fn new(
        player_id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        position: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            team: team.into(),
            position: position.into(),
            status: status.into(),
        }
    }

    /// Whether this player should be treated as unable to play.
    ///
    /// "Questionable" players practice and usually suit up, so they are not
    /// reported.
    pub fn is_inactive(&self) -> bool {
        !self.status.is_empty() && self.status != "Questionable"
    }
}
