// Week-by-week regular season simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cap;
use crate::league::{League, Team, TeamId};
use crate::schedule::Slot;
use crate::standings::Standings;

/// Outcome of one schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameResult {
    Game {
        home: TeamId,
        away: TeamId,
        score_home: u32,
        score_away: u32,
    },
    Bye {
        team: TeamId,
    },
}

impl GameResult {
    /// Winning team, or `None` for a tie or a bye.
    pub fn winner(&self) -> Option<TeamId> {
        match *self {
            GameResult::Game {
                home,
                away,
                score_home,
                score_away,
            } => match score_home.cmp(&score_away) {
                std::cmp::Ordering::Greater => Some(home),
                std::cmp::Ordering::Less => Some(away),
                std::cmp::Ordering::Equal => None,
            },
            GameResult::Bye { .. } => None,
        }
    }
}

/// Produces a final score for a regular-season game.
pub trait GameSimulator {
    /// Returns `(home_score, away_score)`.
    fn simulate(&self, home: &Team, away: &Team, rng: &mut dyn rand::RngCore) -> (u32, u32);
}

/// Probability that the home side wins given a strength edge `x`.
pub fn home_win_probability(x: f64) -> f64 {
    1.0 / (1.0 + (-x / 8.0).exp())
}

/// Scores from a win probability: a shared base in 10..=24 plus each side's
/// share of 14 points.
pub fn scores_from_probability<R: Rng + ?Sized>(p_home: f64, rng: &mut R) -> (u32, u32) {
    let base: u32 = rng.gen_range(10..=24);
    let home = base + (p_home * 14.0).round() as u32;
    let away = base + ((1.0 - p_home) * 14.0).round() as u32;
    (home, away)
}

/// Rating-driven simulator: the better roster is favored on a logistic curve.
/// Regular-season ties stand.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingSimulator;

impl GameSimulator for RatingSimulator {
    fn simulate(&self, home: &Team, away: &Team, rng: &mut dyn rand::RngCore) -> (u32, u32) {
        let p = home_win_probability(home.rating() - away.rating());
        scores_from_probability(p, rng)
    }
}

/// Simulate the league's current week, record results and rebuild records
/// and cap books. Does nothing once the regular season is complete.
pub fn simulate_week<R: Rng>(league: &mut League, sim: &dyn GameSimulator, rng: &mut R) -> usize {
    let week = league.week;
    let Some(slots) = league.schedule.weeks.get(week).map(|w| w.slots.clone()) else {
        debug!("No week {} to simulate", week);
        return 0;
    };

    let mut results = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Game { home, away } => {
                let (Some(h), Some(a)) = (league.team(home), league.team(away)) else {
                    warn!("Skipping game {} @ {} in week {}: unknown team", away, home, week + 1);
                    continue;
                };
                let (score_home, score_away) = sim.simulate(h, a, rng);
                results.push(GameResult::Game {
                    home,
                    away,
                    score_home,
                    score_away,
                });
            }
            Slot::Bye { team } => results.push(GameResult::Bye { team }),
        }
    }

    let games = results
        .iter()
        .filter(|r| matches!(r, GameResult::Game { .. }))
        .count();
    if league.results_by_week.len() <= week {
        league.results_by_week.resize(week + 1, Vec::new());
    }
    league.results_by_week[week] = results;

    Standings::compute(league).apply_records(league);
    cap::recalc_all(league);
    league.week += 1;

    debug!("Week {} of {} simulated: {} games", week + 1, league.season, games);
    games
}

/// Simulate every remaining week of the regular season.
pub fn simulate_regular_season<R: Rng>(league: &mut League, sim: &dyn GameSimulator, rng: &mut R) {
    while !league.regular_season_complete() && league.week < league.schedule.weeks.len() {
        simulate_week(league, sim, rng);
    }
    info!("Regular season {} complete", league.season);
}
