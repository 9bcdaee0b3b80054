//! Platform adapter layer.
//!
//! Everything above this module works on the platform-independent entity
//! model; the two concrete adapters normalize their upstream's payloads into
//! it and nothing platform-specific leaks past this boundary.

pub mod factory;
pub mod fleaflicker;
pub(crate) mod http;
pub mod sleeper;

pub use factory::build_platform;
pub use fleaflicker::Fleaflicker;
pub use sleeper::Sleeper;

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DraftedPlayer, InactiveRoster, League, SeasonScore, Team, Trade, Transaction, User, WeeklyScore,
};
use crate::error::{HuddleError, Result};
use crate::stats::RosterFilters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Sleeper,
    Fleaflicker,
}

impl Default for PlatformKind {
    fn default() -> Self {
        Self::Sleeper
    }
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleeper => "sleeper",
            Self::Fleaflicker => "fleaflicker",
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sleeper" => Ok(Self::Sleeper),
            "fleaflicker" | "flea" => Ok(Self::Fleaflicker),
            _ => Err("invalid platform; expected sleeper|fleaflicker"),
        }
    }
}

pub fn parse_platform_kind(raw: &str) -> Result<PlatformKind> {
    PlatformKind::from_str(raw).map_err(|e| HuddleError::Validation(e.to_string()))
}

/// League-name predicate: a case-insensitive substring and an optional
/// regular expression, both of which must match.
#[derive(Debug, Clone, Default)]
pub struct LeagueFilter {
    pub substring: String,
    pub pattern: Option<Regex>,
}

impl LeagueFilter {
    pub fn new(substring: impl Into<String>, pattern: Option<&str>) -> Result<Self> {
        let pattern = match pattern {
            Some(raw) if !raw.is_empty() && raw != ".*" => Some(
                Regex::new(raw)
                    .map_err(|e| HuddleError::Validation(format!("bad league filter: {}", e)))?,
            ),
            _ => None,
        };

        Ok(Self {
            substring: substring.into(),
            pattern,
        })
    }

    pub fn matches(&self, league_name: &str) -> bool {
        if !self.substring.is_empty()
            && !league_name
                .to_lowercase()
                .contains(&self.substring.to_lowercase())
        {
            return false;
        }

        match &self.pattern {
            Some(pattern) => pattern.is_match(league_name),
            None => true,
        }
    }
}

/// Capability set every upstream platform adapter provides.
///
/// Adapters are read-only clients; the only state they carry is their
/// per-instance lookup caches, populated as a side effect of
/// `leagues_for_user` and consumed by the later calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FantasyPlatform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Resolve an account identifier to a user. Fails with `NotFound` when
    /// the upstream cannot resolve it.
    async fn resolve_user(&self, identifier: &str) -> Result<User>;

    /// Leagues the user belongs to in `year` whose names pass `filter`.
    /// Populates the roster-to-user cache for each returned league.
    async fn leagues_for_user(
        &self,
        user: &User,
        year: u16,
        filter: &LeagueFilter,
        include_pre_draft: bool,
    ) -> Result<Vec<League>>;

    async fn drafted_players(&self, league: &League, year: u16) -> Result<Vec<DraftedPlayer>>;

    /// All completed trades in the league for `year`, with every player,
    /// pick, and FAAB movement attributed to a team side. Platforms that only
    /// report additions leave the loss side empty.
    async fn trades(&self, league: &League, year: u16) -> Result<Vec<Trade>>;

    async fn weekly_scores(&self, league: &League, week: u8, year: u16)
        -> Result<Vec<WeeklyScore>>;

    async fn season_scores(&self, league: &League, year: u16) -> Result<Vec<SeasonScore>>;

    async fn last_transaction_per_team(
        &self,
        league: &League,
        year: u16,
    ) -> Result<HashMap<Team, Transaction>>;

    async fn inactive_rosters(
        &self,
        league: &League,
        week: u8,
        year: u16,
        filters: &RosterFilters,
    ) -> Result<Vec<InactiveRoster>>;
}
