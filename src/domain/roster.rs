use serde::{Deserialize, Serialize};

use super::player::Player;
use super::team::Team;
use super::transaction::Transaction;

/// A team whose starting lineup contains at least one inactive player for the
/// week, optionally annotated with the manager's most recent roster move to
/// show whether they have been paying attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactiveRoster {
    pub team: Team,
    pub inactive_players: Vec<Player>,
    pub last_transaction: Option<Transaction>,
}

impl InactiveRoster {
    pub fn new(team: Team, inactive_players: Vec<Player>) -> Self {
        Self {
            team,
            inactive_players,
            last_transaction: None,
        }
    }

    pub fn with_last_transaction(mut self, transaction: Transaction) -> Self {
        self.last_transaction = Some(transaction);
        self
    }
}
