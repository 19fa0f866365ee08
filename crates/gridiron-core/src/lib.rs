// Library root: the league model and the season subsystems that run on it.

pub mod cap;
pub mod error;
pub mod league;
pub mod offseason;
pub mod playoffs;
pub mod schedule;
pub mod sim;
pub mod standings;

pub use error::{CapError, LeagueError, PlayoffError, SchedulingError};
pub use league::{League, LeagueSettings};
