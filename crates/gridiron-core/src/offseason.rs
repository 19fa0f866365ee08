// Season rollover: final ranks, cap carry-over, contracts, the draft and a
// fresh schedule.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cap::{self, round1};
use crate::error::{LeagueError, SchedulingError};
use crate::league::generate::draft_prospect;
use crate::league::{
    Conference, League, Player, Position, Record, TeamId, DIVISIONS_PER_CONFERENCE,
};
use crate::schedule::{self, Schedule};
use crate::standings::{Standings, TieBreakScope};

/// Players at or past this age retire instead of entering free agency.
pub const RETIREMENT_AGE: u8 = 36;

/// What happened during one offseason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffseasonReport {
    /// The season the league rolled into.
    pub season: i32,
    pub expired: usize,
    pub retired: usize,
    pub drafted: usize,
    pub signed: usize,
}

/// Close out the current season and prepare the next one.
///
/// Next season's schedule is built first; if that fails the league is left
/// untouched.
pub fn run_offseason<R: Rng>(league: &mut League, rng: &mut R) -> Result<OffseasonReport, LeagueError> {
    let standings = Standings::compute(league);
    let ranks = final_division_ranks(league, &standings);
    let new_season = league.season + 1;
    let schedule = next_schedule(league, ranks, new_season, rng.gen())?;

    cap::recalc_all(league);
    for team in 0..league.teams.len() {
        cap::process_cap_rollover(league, team)?;
    }

    let mut report = OffseasonReport {
        season: new_season,
        ..OffseasonReport::default()
    };

    expire_contracts(league, &mut report);

    // Worst team picks first in every round.
    let mut order = standings.rank(&(0..league.teams.len()).collect::<Vec<_>>(), TieBreakScope::League);
    order.reverse();

    league.season = new_season;
    for team in &mut league.teams {
        team.dead_cap_book.retain(|&season, _| season >= new_season);
    }
    cap::recalc_all(league);

    report.drafted = run_draft(league, rng, &order);
    for team in &mut league.teams {
        team.picks.retain(|p| p.year > new_season);
    }
    league.issue_picks(new_season + league.settings.pick_years as i32);

    report.signed = fill_depth_charts(league, &order);

    for team in &mut league.teams {
        team.record = Record::default();
    }
    cap::recalc_all(league);
    league.install_schedule(schedule);

    info!(
        "Offseason complete, now {}: {} expired, {} retired, {} drafted, {} signed",
        new_season, report.expired, report.retired, report.drafted, report.signed
    );
    Ok(report)
}

/// Build `season`'s schedule from the final `ranks`. The ranks are kept on
/// success; the league's season is never changed here.
fn next_schedule(
    league: &mut League,
    ranks: Vec<usize>,
    season: i32,
    seed: u64,
) -> Result<Schedule, SchedulingError> {
    let previous_ranks = std::mem::replace(&mut league.last_ranks, ranks);
    let current_season = std::mem::replace(&mut league.season, season);
    let built = schedule::make_schedule_with_retries(league, seed);
    league.season = current_season;
    if built.is_err() {
        league.last_ranks = previous_ranks;
    }
    built
}

/// Each team's 0-based finish within its division.
fn final_division_ranks(league: &League, standings: &Standings) -> Vec<usize> {
    let mut ranks = league.last_ranks.clone();
    ranks.resize(league.teams.len(), 0);
    for conf in Conference::BOTH {
        for div in 0..DIVISIONS_PER_CONFERENCE {
            for (rank, id) in standings
                .division_standings(league, conf, div)
                .into_iter()
                .enumerate()
            {
                ranks[id] = rank;
            }
        }
    }
    ranks
}

/// Age every player a year and run down contracts. Expired players move to
/// the free-agent pool when there is one.
fn expire_contracts(league: &mut League, report: &mut OffseasonReport) {
    let discount = league.settings.free_agent_discount;
    let min_salary = league.settings.min_salary;
    let mut released: Vec<Player> = Vec::new();

    for team in &mut league.teams {
        let mut kept = Vec::with_capacity(team.roster.len());
        for mut player in team.roster.drain(..) {
            player.age = player.age.saturating_add(1);
            player.years = player.years.saturating_sub(1);
            if player.is_under_contract() {
                kept.push(player);
            } else {
                released.push(player);
            }
        }
        team.roster = kept;
    }

    let Some(pool) = league.free_agents.as_mut() else {
        report.expired = released.len();
        return;
    };

    for player in pool.iter_mut() {
        player.age = player.age.saturating_add(1);
    }
    let before = pool.len();
    pool.retain(|p| p.age < RETIREMENT_AGE);
    report.retired += before - pool.len();

    for mut player in released {
        report.expired += 1;
        if player.age >= RETIREMENT_AGE {
            report.retired += 1;
            debug!("{} retires at {}", player.name, player.age);
            continue;
        }
        let asking = round1((player.base_annual * discount).max(min_salary));
        player.zero_contract();
        player.set_contract(1, asking, 0.0);
        pool.push(player);
    }
}

/// Position a team most needs: the largest shortfall against its depth
/// target, ties in `Position::ALL` order.
fn neediest_position(league: &League, team: TeamId) -> Position {
    let t = &league.teams[team];
    Position::ALL
        .iter()
        .copied()
        .max_by_key(|&pos| {
            let target = league.settings.depth_target(pos) as i64;
            let have = t.position_count(pos) as i64;
            // max_by_key keeps the last maximum; reverse index to prefer the first.
            let idx = Position::ALL.iter().position(|p| *p == pos).unwrap_or(0) as i64;
            (target - have, -idx)
        })
        .unwrap_or(Position::Linebacker)
}

/// Use every pick of the new season's class. Returns the number of rookies
/// who joined a roster.
fn run_draft<R: Rng + ?Sized>(league: &mut League, rng: &mut R, order: &[TeamId]) -> usize {
    let year = league.season;
    let mut drafted = 0;

    for round in 1..=crate::league::DRAFT_ROUNDS {
        for &slot_team in order {
            // The pick originally belonging to `slot_team`, wherever it is now.
            let owner = league.teams.iter().find_map(|t| {
                t.picks
                    .iter()
                    .find(|p| p.year == year && p.round == round && p.original_owner == slot_team)
                    .map(|p| p.owner)
            });
            let Some(owner) = owner else {
                continue;
            };

            let pos = neediest_position(league, owner);
            let rookie = draft_prospect(league, rng, pos, round);
            let name = rookie.name.clone();
            match cap::sign_player(league, owner, rookie.clone()) {
                Ok(_) => {
                    drafted += 1;
                    debug!("Round {}: team {} drafts {} ({})", round, owner, name, pos);
                }
                Err(e) => {
                    debug!("Team {} cannot sign draftee {}: {}", owner, name, e);
                    if let Some(pool) = league.free_agents.as_mut() {
                        pool.push(rookie);
                    }
                }
            }
        }
    }
    drafted
}

/// Sign the best affordable free agents into open depth-chart spots.
fn fill_depth_charts(league: &mut League, order: &[TeamId]) -> usize {
    if league.free_agents.is_none() {
        return 0;
    }
    let mut signed = 0;

    for &team in order {
        for pos in Position::ALL {
            loop {
                let target = league.settings.depth_target(pos);
                if league.teams[team].position_count(pos) >= target {
                    break;
                }
                let mut candidates: Vec<Player> = league
                    .free_agents
                    .as_ref()
                    .map(|pool| pool.iter().filter(|p| p.pos == pos).cloned().collect())
                    .unwrap_or_default();
                candidates.sort_by(|a, b| b.ovr.cmp(&a.ovr).then(a.id.cmp(&b.id)));

                let pick = candidates
                    .into_iter()
                    .find(|p| cap::validate_signing(league, team, p).is_ok());
                let Some(player) = pick else {
                    break;
                };
                if cap::sign_player(league, team, player).is_err() {
                    break;
                }
                signed += 1;
            }
        }
    }
    signed
}
