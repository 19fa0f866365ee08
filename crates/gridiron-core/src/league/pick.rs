// Draft picks: owned by teams, tradable, regenerated each offseason.

use serde::{Deserialize, Serialize};

use super::TeamId;

pub const DRAFT_ROUNDS: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: u32,
    /// Draft round, 1 through 7.
    pub round: u8,
    /// Draft year the pick is used in.
    pub year: i32,
    /// Team the pick was originally issued to.
    pub original_owner: TeamId,
    /// Team currently holding the pick.
    pub owner: TeamId,
}

impl Pick {
    pub fn is_own(&self) -> bool {
        self.original_owner == self.owner
    }
}
