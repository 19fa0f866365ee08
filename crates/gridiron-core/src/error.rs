// Error types for the league core.

use thiserror::Error;

use crate::league::{PlayerId, Position, TeamId};

/// Structural failures while building a season schedule.
///
/// These indicate a broken league shape or an unlucky placement order; callers
/// decide whether to retry with a new seed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("league must have 32 teams in 2 conferences of 4 divisions of 4, got {teams} teams")]
    UnsupportedLeague { teams: usize },

    #[error("could not place game {away} @ {home} in any week")]
    Unplaceable { home: TeamId, away: TeamId },

    #[error("no valid schedule after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<SchedulingError>,
    },
}

/// Failures of user-facing cap transactions. The `Display` text is the
/// message shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapError {
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("player {player} is not on team {team}")]
    PlayerNotOnRoster { team: TeamId, player: PlayerId },

    #[error("player {0} is not in the free-agent pool")]
    NotAFreeAgent(PlayerId),

    #[error("signing exceeds the cap by ${overage:.1}M")]
    OverCap { overage: f64 },

    #[error("too many players at {pos}: {count} would exceed the limit of {limit}")]
    PositionFull {
        pos: Position,
        count: usize,
        limit: usize,
    },
}

/// Failures of the playoff state machine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayoffError {
    #[error("playoffs are already in progress")]
    AlreadyStarted,

    #[error("playoffs have not started")]
    NotStarted,

    #[error("regular season incomplete: {played} of {total} weeks played")]
    SeasonIncomplete { played: usize, total: usize },

    #[error("malformed playoff seeds: {0}")]
    MalformedSeeds(String),
}

/// Umbrella error for operations that cross subsystems.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LeagueError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Cap(#[from] CapError),

    #[error(transparent)]
    Playoff(#[from] PlayoffError),

    #[error("unknown pick {0}")]
    UnknownPick(u32),
}
