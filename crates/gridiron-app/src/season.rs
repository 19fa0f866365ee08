// Season runner: regular season, playoffs and offseason, one summary per year.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use gridiron_core::league::{League, Record, TeamId};
use gridiron_core::playoffs;
use gridiron_core::sim::{self, GameSimulator};
use gridiron_core::standings::{Standings, TieBreakScope};
use gridiron_core::LeagueError;
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// What a finished season looked like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub season: i32,
    pub champion: TeamId,
    pub champion_name: String,
    /// Team with the league's best regular-season record.
    pub best_team: String,
    pub best_record: Record,
    pub games_played: usize,
    /// One line per playoff game.
    pub playoff_results: Vec<String>,
}

/// Play the league's current season to completion. The league is left at the
/// start of the next season.
pub fn run_season<R: Rng>(
    league: &mut League,
    sim: &dyn GameSimulator,
    rng: &mut R,
) -> Result<SeasonSummary, LeagueError> {
    let season = league.season;
    sim::simulate_regular_season(league, sim, rng);

    let standings = Standings::compute(league);
    let all: Vec<TeamId> = (0..league.teams.len()).collect();
    let best = standings
        .rank(&all, TieBreakScope::League)
        .first()
        .copied()
        .unwrap_or(0);
    let best_team = league.team(best).map(|t| t.name.clone()).unwrap_or_default();
    let best_record = standings.record(best);
    let games_played = league
        .results_by_week
        .iter()
        .flatten()
        .filter(|r| matches!(r, sim::GameResult::Game { .. }))
        .count();

    playoffs::start_playoffs(league)?;
    let mut playoff_results = Vec::new();
    while league.playoffs.is_some() {
        let games = playoffs::simulate_playoff_round(league, rng)?;
        playoff_results.extend(games.iter().map(|g| playoffs::describe_game(league, g)));
    }

    let champion = league
        .champions
        .last()
        .filter(|c| c.season == season)
        .map(|c| c.team)
        .unwrap_or(best);
    let champion_name = league
        .team(champion)
        .map(|t| t.name.clone())
        .unwrap_or_default();

    info!(
        "Season {}: {} won the title; best record {} ({})",
        season, champion_name, best_team, best_record
    );

    Ok(SeasonSummary {
        season,
        champion,
        champion_name,
        best_team,
        best_record,
        games_played,
        playoff_results,
    })
}

/// Play `seasons` seasons back to back.
pub fn run_seasons<R: Rng>(
    league: &mut League,
    sim: &dyn GameSimulator,
    seasons: u32,
    rng: &mut R,
) -> Result<Vec<SeasonSummary>, LeagueError> {
    (0..seasons).map(|_| run_season(league, sim, rng)).collect()
}

#[derive(Serialize)]
struct Snapshot<'a> {
    written_at: DateTime<Utc>,
    summaries: &'a [SeasonSummary],
    league: &'a League,
}

/// Write the league and the season summaries as pretty JSON.
pub fn write_snapshot(path: &Path, league: &League, summaries: &[SeasonSummary]) -> anyhow::Result<()> {
    let snapshot = Snapshot {
        written_at: Utc::now(),
        summaries,
        league,
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create snapshot {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &snapshot)
        .context("failed to serialize league snapshot")?;
    info!("Snapshot written to {}", path.display());
    Ok(())
}
