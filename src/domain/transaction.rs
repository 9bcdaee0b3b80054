use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::Team;

/// Kind of roster move a transaction represents.
///
/// Both upstreams report free-form strings; everything is folded into this
/// closed set and unrecognized values land on `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Add,
    Drop,
    Trade,
    Waiver,
    None,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Drop => "Drop",
            Self::Trade => "Trade",
            Self::Waiver => "Waiver",
            Self::None => "None",
        }
    }

    /// Fold a platform transaction-type string into the closed set.
    ///
    /// Sleeper uses `trade`, `free_agent`, `waiver`; Fleaflicker uses
    /// `TRANSACTION_ADD`-style constants.
    pub fn parse(raw: &str) -> Self {
        let tag = raw
            .trim()
            .strip_prefix("TRANSACTION_")
            .unwrap_or(raw.trim())
            .to_ascii_lowercase();

        match tag.as_str() {
            "trade" => Self::Trade,
            "waiver" | "claim" => Self::Waiver,
            "add" | "free_agent" => Self::Add,
            "drop" | "cut" => Self::Drop,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single roster move by one team, used both standalone and as the
/// `last_transaction` annotation on an inactive roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub time: DateTime<Utc>,
    pub kind: TransactionKind,
    pub team: Team,
}

impl Transaction {
    pub fn new(time: DateTime<Utc>, kind: TransactionKind, team: Team) -> Self {
        Self { time, kind, team }
    }
}
