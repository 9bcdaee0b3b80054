use serde::{Deserialize, Serialize};

use super::user::User;

/// One roster slot in a league, owned by a manager.
///
/// Identity is the roster/team id alone: two teams with the same id compare
/// equal regardless of manager or link, which is what lets adapter-built
/// copies of the same roster collapse into one map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub manager: User,
    pub roster_link: String,
}

impl Team {
    pub fn new(team_id: impl Into<String>, manager: User, roster_link: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            manager,
            roster_link: roster_link.into(),
        }
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.team_id == other.team_id
    }
}

impl Eq for Team {}

impl std::hash::Hash for Team {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.team_id.hash(state);
    }
}
