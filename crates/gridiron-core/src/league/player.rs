// Players, positions and the contract fields the cap ledger reads.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerId = u32;

/// Football positions used for roster depth and cap validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    Cornerback,
    Safety,
    Kicker,
    Punter,
}

impl Position {
    pub const ALL: [Position; 11] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::OffensiveLine,
        Position::DefensiveLine,
        Position::Linebacker,
        Position::Cornerback,
        Position::Safety,
        Position::Kicker,
        Position::Punter,
    ];

    /// Parse a position abbreviation into a Position enum.
    ///
    /// Accepts the usual roster abbreviations, case-insensitively. "OT"/"G"/"C"
    /// collapse into the offensive line, "DE"/"DT" into the defensive line and
    /// "FS"/"SS" into safety.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" | "HB" | "FB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "OL" | "OT" | "G" | "C" => Some(Position::OffensiveLine),
            "DL" | "DE" | "DT" => Some(Position::DefensiveLine),
            "LB" => Some(Position::Linebacker),
            "CB" => Some(Position::Cornerback),
            "S" | "FS" | "SS" => Some(Position::Safety),
            "K" => Some(Position::Kicker),
            "P" => Some(Position::Punter),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::OffensiveLine => "OL",
            Position::DefensiveLine => "DL",
            Position::Linebacker => "LB",
            Position::Cornerback => "CB",
            Position::Safety => "S",
            Position::Kicker => "K",
            Position::Punter => "P",
        }
    }

    /// Default roster depth target for the position.
    pub fn default_depth(&self) -> usize {
        match self {
            Position::Quarterback => 3,
            Position::RunningBack => 4,
            Position::WideReceiver => 6,
            Position::TightEnd => 3,
            Position::OffensiveLine => 9,
            Position::DefensiveLine => 8,
            Position::Linebacker => 6,
            Position::Cornerback => 6,
            Position::Safety => 4,
            Position::Kicker | Position::Punter => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// An honour attached to a player, e.g. a championship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub season: i32,
    pub name: String,
}

/// A player with the contract fields used for cap accounting.
///
/// Money is in millions. `years` counts the seasons left including the
/// current one and never exceeds `years_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub pos: Position,
    pub ovr: u8,
    pub age: u8,
    pub years: u8,
    pub years_total: u8,
    pub base_annual: f64,
    pub signing_bonus: f64,
    /// Share of `base_annual` that stays on the books after a release.
    /// `None` uses the league default.
    #[serde(default)]
    pub guaranteed_pct: Option<f64>,
    #[serde(default)]
    pub awards: Vec<Award>,
}

impl Player {
    /// Create a player without a contract.
    pub fn new(id: PlayerId, name: impl Into<String>, pos: Position, ovr: u8, age: u8) -> Self {
        Player {
            id,
            name: name.into(),
            pos,
            ovr,
            age,
            years: 0,
            years_total: 0,
            base_annual: 0.0,
            signing_bonus: 0.0,
            guaranteed_pct: None,
            awards: Vec::new(),
        }
    }

    /// Builder-style helper that attaches a fresh contract.
    pub fn with_contract(mut self, years: u8, base_annual: f64, signing_bonus: f64) -> Self {
        self.set_contract(years, base_annual, signing_bonus);
        self
    }

    /// Replace the contract with a fresh one of `years` seasons.
    pub fn set_contract(&mut self, years: u8, base_annual: f64, signing_bonus: f64) {
        self.years = years;
        self.years_total = years;
        self.base_annual = base_annual.max(0.0);
        self.signing_bonus = signing_bonus.max(0.0);
    }

    /// Clear every contract field.
    pub fn zero_contract(&mut self) {
        self.years = 0;
        self.years_total = 0;
        self.base_annual = 0.0;
        self.signing_bonus = 0.0;
        self.guaranteed_pct = None;
    }

    pub fn is_under_contract(&self) -> bool {
        self.years > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positions() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("OT"), Some(Position::OffensiveLine));
        assert_eq!(Position::from_str_pos("DE"), Some(Position::DefensiveLine));
        assert_eq!(Position::from_str_pos(" fs "), Some(Position::Safety));
        assert_eq!(Position::from_str_pos("LS"), None);
    }

    #[test]
    fn display_round_trips_through_parser() {
        for pos in Position::ALL {
            assert_eq!(Position::from_str_pos(pos.display_str()), Some(pos));
        }
    }

    #[test]
    fn default_depth_fills_a_roster() {
        let total: usize = Position::ALL.iter().map(|p| p.default_depth()).sum();
        assert_eq!(total, 51);
    }

    #[test]
    fn contract_helpers() {
        let mut p = Player::new(1, "Test", Position::Kicker, 70, 28).with_contract(3, 2.0, 1.5);
        assert!(p.is_under_contract());
        assert_eq!(p.years_total, 3);
        p.zero_contract();
        assert!(!p.is_under_contract());
        assert_eq!(p.base_annual, 0.0);
        assert_eq!(p.signing_bonus, 0.0);
    }
}
