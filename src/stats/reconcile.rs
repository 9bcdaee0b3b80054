//! Most-recent-transaction reconciliation.
//!
//! Finds each team's latest roster move across a season's worth of
//! transactions in a single pass over the sorted list, rather than scanning
//! per team.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Team, Transaction, TransactionKind};

/// Sentinel timestamp for teams with no transactions all season.
pub const NO_TRANSACTION_EPOCH_SECS: i64 = 946_684_800;

pub fn sentinel_time() -> DateTime<Utc> {
    Utc.timestamp_opt(NO_TRANSACTION_EPOCH_SECS, 0)
        .single()
        .unwrap_or_default()
}

/// Assign each team its most recent transaction.
///
/// Transactions are sorted descending by timestamp and walked once; every
/// involved team that has no assignment yet takes the current transaction.
/// The walk stops as soon as all of `teams` are assigned, so the common case
/// touches far fewer records than the full season list. Teams with nothing
/// all season are backfilled with a sentinel dated 1999-12-31 and kind
/// `None`.
pub fn last_transaction_per_team(
    teams: &[Team],
    mut transactions: Vec<Transaction>,
) -> HashMap<Team, Transaction> {
    let mut latest: HashMap<Team, Transaction> = HashMap::with_capacity(teams.len());

    transactions.sort_by(|a, b| b.time.cmp(&a.time));

    for transaction in transactions {
        if !latest.contains_key(&transaction.team) {
            latest.insert(transaction.team.clone(), transaction);
        }

        if latest.len() >= teams.len() {
            break;
        }
    }

    for team in teams {
        if !latest.contains_key(team) {
            latest.insert(
                team.clone(),
                Transaction::new(sentinel_time(), TransactionKind::None, team.clone()),
            );
        }
    }

    latest
}
