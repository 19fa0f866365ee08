// Tunable league constants: cap numbers, depth targets, scheduling retries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::player::Position;

/// Constants the subsystems read instead of hard-coding numbers.
///
/// Money is in millions of dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueSettings {
    /// League-wide base salary cap before rollover.
    pub salary_cap_base: f64,
    /// Largest amount of unused space that may roll into the next season.
    pub max_rollover: f64,
    /// Guaranteed share of base salary for players without an explicit value.
    pub guaranteed_pct_default: f64,
    /// Multiplier applied to a released player's salary when re-entering
    /// the free-agent pool.
    pub free_agent_discount: f64,
    /// League minimum annual salary.
    pub min_salary: f64,
    /// Target roster count per position.
    pub depth_needs: BTreeMap<Position, usize>,
    /// How many future draft years of picks each team holds.
    pub pick_years: u8,
    /// Schedule generation attempts before giving up.
    pub schedule_attempts: u32,
}

impl LeagueSettings {
    /// Roster target for a position, falling back to the built-in default.
    pub fn depth_target(&self, pos: Position) -> usize {
        self.depth_needs
            .get(&pos)
            .copied()
            .unwrap_or_else(|| pos.default_depth())
    }

    /// Most players a team may carry at `pos`: one and a half times the target.
    pub fn position_limit(&self, pos: Position) -> usize {
        self.depth_target(pos) * 3 / 2
    }
}

impl Default for LeagueSettings {
    fn default() -> Self {
        LeagueSettings {
            salary_cap_base: 255.4,
            max_rollover: 25.0,
            guaranteed_pct_default: 0.5,
            free_agent_discount: 0.6,
            min_salary: 0.8,
            depth_needs: Position::ALL
                .iter()
                .map(|&p| (p, p.default_depth()))
                .collect(),
            pick_years: 3,
            schedule_attempts: 25,
        }
    }
}
