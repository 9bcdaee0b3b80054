use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::player::Player;
use crate::error::{HuddleError, Result};

/// How a draft assigns pick order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftType {
    Snake,
    Linear,
    Auction,
}

impl DraftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Linear => "linear",
            Self::Auction => "auction",
        }
    }
}

impl std::fmt::Display for DraftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DraftType {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "snake" => Ok(Self::Snake),
            "linear" => Ok(Self::Linear),
            "auction" => Ok(Self::Auction),
            _ => Err("invalid draft type; expected snake|linear|auction"),
        }
    }
}

/// A player together with the overall pick number they were drafted at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftedPlayer {
    pub player: Player,
    pub pick_number: u32,
}

/// Draft topology for one league season.
///
/// `team_to_slot` maps a team id to its base draft slot, a bijection over
/// `1..=league_size`. `reversal_round == 0` means the draft has no reversal
/// point; 0 stays reserved for "disabled".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub year: String,
    pub draft_id: String,
    pub draft_type: DraftType,
    pub reversal_round: u32,
    pub league_size: u32,
    pub team_to_slot: HashMap<String, u32>,
}

impl Draft {
    /// Compute the slot a team picks at within the given round.
    ///
    /// Snake drafts alternate direction every round. Leagues with a
    /// "third-round reversal" snap into a one-time, non-alternating reversal
    /// at `reversal_round` and hold that ordering from then on, which is the
    /// second flip applied below.
    ///
    /// Auction drafts have no pick order; asking for one is a caller bug and
    /// surfaces as an error the caller must treat as fatal.
    pub fn pick_slot(&self, team_id: &str, round: u32) -> Result<u32> {
        let base = *self.team_to_slot.get(team_id).ok_or_else(|| {
            HuddleError::DataInconsistency(format!(
                "team {} has no slot in draft {}",
                team_id, self.draft_id
            ))
        })?;

        match self.draft_type {
            DraftType::Linear => Ok(base),
            DraftType::Snake => {
                let mut proposed = if round % 2 == 0 {
                    self.league_size - base + 1
                } else {
                    base
                };

                if self.reversal_round != 0 && round >= self.reversal_round {
                    proposed = self.league_size - proposed + 1;
                }

                Ok(proposed)
            }
            DraftType::Auction => Err(HuddleError::Validation(format!(
                "draft {} is an auction; picks have no slot",
                self.draft_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(draft_type: DraftType, reversal_round: u32, size: u32) -> Draft {
        let team_to_slot = (1..=size).map(|n| (format!("t{}", n), n)).collect();
        Draft {
            year: "2024".to_string(),
            draft_id: "d1".to_string(),
            draft_type,
            reversal_round,
            league_size: size,
            team_to_slot,
        }
    }

    #[test]
    fn linear_slot_never_moves() {
        let d = draft(DraftType::Linear, 0, 10);
        for round in 1..=5 {
            assert_eq!(d.pick_slot("t3", round).unwrap(), 3);
        }
    }

    #[test]
    fn snake_alternates_without_reversal() {
        let d = draft(DraftType::Snake, 0, 10);
        assert_eq!(d.pick_slot("t3", 1).unwrap(), 3);
        assert_eq!(d.pick_slot("t3", 2).unwrap(), 8);
        assert_eq!(d.pick_slot("t3", 3).unwrap(), 3);
        assert_eq!(d.pick_slot("t3", 4).unwrap(), 8);
    }

    #[test]
    fn third_round_reversal_flips_a_second_time() {
        let d = draft(DraftType::Snake, 3, 10);
        // Rounds before the reversal point behave like a plain snake.
        assert_eq!(d.pick_slot("t3", 1).unwrap(), 3);
        assert_eq!(d.pick_slot("t3", 2).unwrap(), 8);
        // From the reversal round on, the snake value is flipped once more.
        assert_eq!(d.pick_slot("t3", 3).unwrap(), 8);
        assert_eq!(d.pick_slot("t3", 4).unwrap(), 3);
    }

    #[test]
    fn auction_slots_are_an_error() {
        let d = draft(DraftType::Auction, 0, 10);
        assert!(matches!(
            d.pick_slot("t3", 1),
            Err(HuddleError::Validation(_))
        ));
    }

    #[test]
    fn unknown_team_is_a_data_inconsistency() {
        let d = draft(DraftType::Snake, 0, 10);
        assert!(matches!(
            d.pick_slot("t99", 1),
            Err(HuddleError::DataInconsistency(_))
        ));
    }
}
