//! Persisted record of delivered trades.
//!
//! The ledger is a newline-delimited append-only file, one record per
//! delivered trade: the trade identity, the league name, the formatted
//! timestamp, and the participating managers. Only the identity is ever read
//! back; the rest exists so a human can audit what was posted and when.
//!
//! Single-writer by design. Persistence failures degrade to the in-memory
//! mirror for the current tick (logged, with a known duplicate risk on the
//! next process start), they never abort delivery.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::Trade;

pub struct TradeLedger {
    path: PathBuf,
    delivered: RwLock<HashSet<String>>,
}

impl TradeLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delivered: RwLock::new(HashSet::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the ledger file into the in-memory mirror. A missing file is
    /// an empty ledger; an unreadable one keeps whatever the mirror already
    /// holds.
    pub async fn refresh(&self) {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e,
                    "ledger unreadable, continuing with in-memory state");
                return;
            }
        };

        let mut delivered = self.delivered.write().await;
        for line in raw.lines() {
            if let Some(identity) = identity_from_line(line) {
                delivered.insert(identity.to_string());
            }
        }
    }

    pub async fn contains(&self, identity: &str) -> bool {
        self.delivered.read().await.contains(identity)
    }

    /// Record a delivered trade: append to the file and mirror in memory.
    /// The mirror is updated even when the append fails, so the current tick
    /// never double-delivers.
    pub async fn record(&self, trade: &Trade) {
        let identity = trade.identity();

        if let Err(e) = self.append_line(&file_line(trade, &identity)) {
            warn!(path = %self.path.display(), error = %e,
                "ledger append failed, delivery recorded in memory only");
        }

        self.delivered.write().await.insert(identity);
    }

    pub async fn len(&self) -> usize {
        self.delivered.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.delivered.read().await.is_empty()
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

fn file_line(trade: &Trade, identity: &str) -> String {
    let mut fields = vec![
        identity.to_string(),
        trade.league.name.clone(),
        trade.time.format("%m/%d/%Y - %H:%M:%S").to_string(),
    ];
    fields.extend(trade.participant_names().iter().map(|s| s.to_string()));
    fields.join(",")
}

fn identity_from_line(line: &str) -> Option<&str> {
    let identity = line.split(',').next().unwrap_or("").trim();
    if identity.is_empty() {
        None
    } else {
        Some(identity)
    }
}
