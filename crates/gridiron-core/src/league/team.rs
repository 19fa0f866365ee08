// Teams, conferences and season records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::pick::Pick;
use super::player::{Player, PlayerId, Position};
use super::TeamId;

pub const DIVISIONS_PER_CONFERENCE: usize = 4;
pub const TEAMS_PER_DIVISION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conference {
    Afc,
    Nfc,
}

impl Conference {
    pub const BOTH: [Conference; 2] = [Conference::Afc, Conference::Nfc];

    pub fn index(self) -> usize {
        match self {
            Conference::Afc => 0,
            Conference::Nfc => 1,
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conference::Afc => write!(f, "AFC"),
            Conference::Nfc => write!(f, "NFC"),
        }
    }
}

/// Overall won-lost-tied record with points for and against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub w: u32,
    pub l: u32,
    pub t: u32,
    pub pf: u32,
    pub pa: u32,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.w + self.l + self.t
    }

    pub fn point_diff(&self) -> i64 {
        self.pf as i64 - self.pa as i64
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.t > 0 {
            write!(f, "{}-{}-{}", self.w, self.l, self.t)
        } else {
            write!(f, "{}-{}", self.w, self.l)
        }
    }
}

/// A franchise: identity, roster, picks and cap books.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Index of the team in `League::teams`.
    pub id: TeamId,
    pub name: String,
    pub abbrev: String,
    pub conf: Conference,
    /// Division within the conference, 0 through 3.
    pub div: usize,
    pub record: Record,
    pub roster: Vec<Player>,
    pub picks: Vec<Pick>,
    pub cap_total: f64,
    pub cap_used: f64,
    pub cap_room: f64,
    /// Dead money charged to the current season.
    pub dead_cap: f64,
    /// Dead money per season.
    pub dead_cap_book: BTreeMap<i32, f64>,
    /// Unused space carried over from the previous season.
    pub cap_rollover: f64,
}

impl Team {
    /// Create an empty team. Division indexes outside 0..4 are clamped.
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        abbrev: impl Into<String>,
        conf: Conference,
        div: usize,
    ) -> Self {
        Team {
            id,
            name: name.into(),
            abbrev: abbrev.into(),
            conf,
            div: div.min(DIVISIONS_PER_CONFERENCE - 1),
            record: Record::default(),
            roster: Vec::new(),
            picks: Vec::new(),
            cap_total: 0.0,
            cap_used: 0.0,
            cap_room: 0.0,
            dead_cap: 0.0,
            dead_cap_book: BTreeMap::new(),
            cap_rollover: 0.0,
        }
    }

    /// Team strength used by the game simulators: mean overall of the roster.
    pub fn rating(&self) -> f64 {
        if self.roster.is_empty() {
            return 50.0;
        }
        let sum: u32 = self.roster.iter().map(|p| p.ovr as u32).sum();
        sum as f64 / self.roster.len() as f64
    }

    pub fn position_count(&self, pos: Position) -> usize {
        self.roster.iter().filter(|p| p.pos == pos).count()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == id)
    }

    /// Remove a player from the roster, returning it.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.roster.iter().position(|p| p.id == id)?;
        Some(self.roster.remove(idx))
    }

    /// Dead money on the books for `season`.
    pub fn dead_for(&self, season: i32) -> f64 {
        self.dead_cap_book.get(&season).copied().unwrap_or(0.0)
    }

    pub fn same_division(&self, other: &Team) -> bool {
        self.conf == other.conf && self.div == other.div
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.abbrev)
    }
}
