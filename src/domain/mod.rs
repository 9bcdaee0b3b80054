pub mod draft;
pub mod league;
pub mod player;
pub mod roster;
pub mod score;
pub mod team;
pub mod trade;
pub mod transaction;
pub mod user;

pub use draft::{Draft, DraftType, DraftedPlayer};
pub use league::League;
pub use player::Player;
pub use roster::InactiveRoster;
pub use score::{SeasonScore, WeeklyScore};
pub use team::Team;
pub use trade::{Trade, TradeDetail};
pub use transaction::{Transaction, TransactionKind};
pub use user::User;
