// Season schedule: matchup generation, week placement and byes.

mod matchups;
mod placement;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SchedulingError;
use crate::league::{Conference, League, TeamId, DIVISIONS_PER_CONFERENCE, TEAMS_PER_DIVISION};

pub use matchups::{
    generate_matchups, Buckets, Matchup, Rotation, HOST_GRID_CANON, INTER_ROT_8, INTRA_ROT_8,
};

/// Weeks in a regular season.
pub const SEASON_WEEKS: usize = 18;

/// Teams the scheduler supports.
pub const LEAGUE_TEAMS: usize = 2 * DIVISIONS_PER_CONFERENCE * TEAMS_PER_DIVISION;

/// One entry of a week: a game or a bye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    Game { home: TeamId, away: TeamId },
    Bye { team: TeamId },
}

impl Slot {
    pub fn involves(&self, team: TeamId) -> bool {
        match *self {
            Slot::Game { home, away } => home == team || away == team,
            Slot::Bye { team: t } => t == team,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub slots: Vec<Slot>,
}

impl Week {
    /// `(home, away)` for every game of the week.
    pub fn games(&self) -> impl Iterator<Item = (TeamId, TeamId)> + '_ {
        self.slots.iter().filter_map(|s| match *s {
            Slot::Game { home, away } => Some((home, away)),
            Slot::Bye { .. } => None,
        })
    }

    pub fn byes(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.slots.iter().filter_map(|s| match *s {
            Slot::Bye { team } => Some(team),
            Slot::Game { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub weeks: Vec<Week>,
}

impl Schedule {
    pub fn game_count(&self) -> usize {
        self.weeks.iter().map(|w| w.games().count()).sum()
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

fn bucket_teams(league: &League) -> Result<Buckets, SchedulingError> {
    let unsupported = || SchedulingError::UnsupportedLeague {
        teams: league.teams.len(),
    };
    if league.teams.len() != LEAGUE_TEAMS {
        return Err(unsupported());
    }

    let mut buckets: Buckets = Default::default();
    for conf in Conference::BOTH {
        for div in 0..DIVISIONS_PER_CONFERENCE {
            let ids = league.division_teams(conf, div);
            if ids.len() != TEAMS_PER_DIVISION {
                return Err(unsupported());
            }
            buckets[conf.index()][div] = ids;
        }
    }
    Ok(buckets)
}

/// Build one schedule for the league's current season.
pub fn make_schedule<R: Rng + ?Sized>(
    league: &League,
    rng: &mut R,
) -> Result<Schedule, SchedulingError> {
    let buckets = bucket_teams(league)?;
    let rotation = Rotation::for_year(league.season, league.base_year);

    let mut games = generate_matchups(&buckets, &rotation);
    games.shuffle(rng);

    let mut placement = placement::Placement::new(games, league.teams.len(), SEASON_WEEKS);
    placement.place_all()?;

    let weeks = placement
        .into_weeks()
        .into_iter()
        .map(|games| {
            let mut busy = vec![false; league.teams.len()];
            let mut slots: Vec<Slot> = games
                .iter()
                .map(|g| {
                    busy[g.home] = true;
                    busy[g.away] = true;
                    Slot::Game {
                        home: g.home,
                        away: g.away,
                    }
                })
                .collect();
            slots.extend(
                busy.iter()
                    .enumerate()
                    .filter(|(_, b)| !**b)
                    .map(|(team, _)| Slot::Bye { team }),
            );
            Week { slots }
        })
        .collect();

    Ok(Schedule { weeks })
}

/// Build a schedule, retrying placement failures with derived seeds up to
/// `settings.schedule_attempts` times.
pub fn make_schedule_with_retries(league: &League, seed: u64) -> Result<Schedule, SchedulingError> {
    let attempts = league.settings.schedule_attempts.max(1);
    let mut last = None;

    for attempt in 0..attempts {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(attempt)));
        match make_schedule(league, &mut rng) {
            Ok(schedule) => {
                info!(
                    "Built {} schedule: {} games in {} weeks (attempt {})",
                    league.season,
                    schedule.game_count(),
                    schedule.weeks.len(),
                    attempt + 1
                );
                return Ok(schedule);
            }
            Err(e @ SchedulingError::UnsupportedLeague { .. }) => return Err(e),
            Err(e) => {
                warn!("Schedule attempt {} failed: {}", attempt + 1, e);
                last = Some(e);
            }
        }
    }

    Err(SchedulingError::Exhausted {
        attempts,
        last: Box::new(last.unwrap_or(SchedulingError::UnsupportedLeague {
            teams: league.teams.len(),
        })),
    })
}
