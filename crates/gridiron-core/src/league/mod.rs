// League aggregate: owns teams, schedule, results and playoff state.

pub(crate) mod generate;
pub mod pick;
pub mod player;
pub mod settings;
pub mod team;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LeagueError, SchedulingError};
use crate::playoffs::PlayoffState;
use crate::schedule::{self, Schedule};
use crate::sim::GameResult;

pub use pick::{Pick, DRAFT_ROUNDS};
pub use player::{Award, Player, PlayerId, Position};
pub use settings::LeagueSettings;
pub use team::{Conference, Record, Team, DIVISIONS_PER_CONFERENCE, TEAMS_PER_DIVISION};

/// Index of a team in `League::teams`.
pub type TeamId = usize;

/// A Super Bowl winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
    pub season: i32,
    pub team: TeamId,
}

/// The complete state of a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    /// Current season (calendar year the season starts in).
    pub season: i32,
    /// Season the rotation tables count from.
    pub base_year: i32,
    pub settings: LeagueSettings,
    pub teams: Vec<Team>,
    pub schedule: Schedule,
    /// One entry per schedule week; empty until the week is simulated.
    pub results_by_week: Vec<Vec<GameResult>>,
    /// Index of the next week to simulate.
    pub week: usize,
    pub playoffs: Option<PlayoffState>,
    /// Unsigned players. `None` when the league runs without a pool.
    pub free_agents: Option<Vec<Player>>,
    /// Each team's finishing position (0-3) in its division last season.
    pub last_ranks: Vec<usize>,
    pub champions: Vec<Champion>,
    next_player_id: PlayerId,
    next_pick_id: u32,
}

impl League {
    /// Create a league from a set of teams. Team ids are renumbered to match
    /// their index, and the previous-season division ranks default to the
    /// order teams appear in within their division.
    pub fn new(settings: LeagueSettings, season: i32, mut teams: Vec<Team>) -> Self {
        for (idx, team) in teams.iter_mut().enumerate() {
            team.id = idx;
            for pick in &mut team.picks {
                pick.owner = idx;
            }
        }

        let next_player_id = teams
            .iter()
            .flat_map(|t| t.roster.iter().map(|p| p.id))
            .max()
            .map_or(1, |id| id + 1);
        let next_pick_id = teams
            .iter()
            .flat_map(|t| t.picks.iter().map(|p| p.id))
            .max()
            .map_or(1, |id| id + 1);

        let mut league = League {
            season,
            base_year: season,
            settings,
            teams,
            schedule: Schedule::default(),
            results_by_week: Vec::new(),
            week: 0,
            playoffs: None,
            free_agents: None,
            last_ranks: Vec::new(),
            champions: Vec::new(),
            next_player_id,
            next_pick_id,
        };
        league.last_ranks = league.default_ranks();
        league
    }

    fn default_ranks(&self) -> Vec<usize> {
        self.teams
            .iter()
            .map(|t| {
                self.teams
                    .iter()
                    .filter(|o| o.same_division(t) && o.id < t.id)
                    .count()
            })
            .collect()
    }

    /// Look up a team by ID.
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Get a mutable reference to a team by ID.
    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(id)
    }

    /// Teams of one division, ordered by last season's finish.
    pub fn division_teams(&self, conf: Conference, div: usize) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self
            .teams
            .iter()
            .filter(|t| t.conf == conf && t.div == div)
            .map(|t| t.id)
            .collect();
        ids.sort_by_key(|&id| (self.last_ranks.get(id).copied().unwrap_or(usize::MAX), id));
        ids
    }

    pub fn conference_teams(&self, conf: Conference) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| t.conf == conf)
            .map(|t| t.id)
            .collect()
    }

    /// Allocate a fresh player id.
    pub fn next_player_id(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    /// Give every team its own seven picks for draft `year`.
    pub fn issue_picks(&mut self, year: i32) {
        for team_idx in 0..self.teams.len() {
            for round in 1..=DRAFT_ROUNDS {
                let id = self.next_pick_id;
                self.next_pick_id += 1;
                self.teams[team_idx].picks.push(Pick {
                    id,
                    round,
                    year,
                    original_owner: team_idx,
                    owner: team_idx,
                });
            }
        }
    }

    /// Move a pick to another team.
    pub fn trade_pick(&mut self, pick_id: u32, to: TeamId) -> Result<(), LeagueError> {
        if to >= self.teams.len() {
            return Err(crate::error::CapError::UnknownTeam(to).into());
        }
        let from = self
            .teams
            .iter()
            .position(|t| t.picks.iter().any(|p| p.id == pick_id))
            .ok_or(LeagueError::UnknownPick(pick_id))?;
        if from == to {
            return Ok(());
        }
        let idx = self.teams[from]
            .picks
            .iter()
            .position(|p| p.id == pick_id)
            .ok_or(LeagueError::UnknownPick(pick_id))?;
        let mut pick = self.teams[from].picks.remove(idx);
        pick.owner = to;
        self.teams[to].picks.push(pick);
        info!("Pick {} moved from team {} to team {}", pick_id, from, to);
        Ok(())
    }

    /// Build a new schedule for the current season and clear the results.
    pub fn reschedule(&mut self, seed: u64) -> Result<(), SchedulingError> {
        let schedule = schedule::make_schedule_with_retries(self, seed)?;
        self.install_schedule(schedule);
        Ok(())
    }

    /// Replace the schedule and clear results back to week one.
    pub fn install_schedule(&mut self, schedule: Schedule) {
        self.results_by_week = vec![Vec::new(); schedule.weeks.len()];
        self.schedule = schedule;
        self.week = 0;
    }

    /// Number of weeks simulated so far.
    pub fn weeks_played(&self) -> usize {
        self.week
    }

    /// Whether every scheduled week has been simulated.
    pub fn regular_season_complete(&self) -> bool {
        !self.schedule.weeks.is_empty() && self.week >= self.schedule.weeks.len()
    }
}
