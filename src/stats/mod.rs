pub mod adp;
pub mod bye_weeks;
pub mod inactives;
pub mod reconcile;

pub use adp::{format_round_pick, AdpAggregator, AdpRecord};
pub use inactives::{classify_starters, RosterFilters};
pub use reconcile::last_transaction_per_team;
