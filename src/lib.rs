pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod platform;
pub mod stats;

pub use config::AppConfig;
pub use domain::{
    Draft, DraftType, DraftedPlayer, InactiveRoster, League, Player, SeasonScore, Team, Trade,
    TradeDetail, Transaction, TransactionKind, User, WeeklyScore,
};
pub use error::{HuddleError, Result};
pub use notify::{Notifier, WebhookNotifier};
pub use pipeline::{DeliveryManager, FeedStatusStore, FeedWorker, TradeLedger};
pub use platform::{
    build_platform, parse_platform_kind, FantasyPlatform, LeagueFilter, PlatformKind,
};
pub use stats::{AdpAggregator, RosterFilters};
