// Playoff seeding and the single-elimination bracket.
//
// Seven teams per conference: four division winners seeded 1-4, three wild
// cards seeded 5-7. Seed 1 sits out the wild-card round.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LeagueError, PlayoffError};
use crate::league::{Award, Champion, Conference, League, Team, TeamId, DIVISIONS_PER_CONFERENCE};
use crate::offseason;
use crate::sim::{home_win_probability, scores_from_probability};
use crate::standings::{Standings, TieBreakScope};

pub const SEEDS_PER_CONFERENCE: usize = 7;

/// Award name given to every player on the title team.
pub const CHAMPION_AWARD: &str = "Super Bowl Champion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffRound {
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

impl PlayoffRound {
    pub fn next(self) -> Option<PlayoffRound> {
        match self {
            PlayoffRound::WildCard => Some(PlayoffRound::Divisional),
            PlayoffRound::Divisional => Some(PlayoffRound::Conference),
            PlayoffRound::Conference => Some(PlayoffRound::SuperBowl),
            PlayoffRound::SuperBowl => None,
        }
    }

    /// Teams still alive per conference when this round starts.
    fn alive_per_conference(self) -> usize {
        match self {
            PlayoffRound::WildCard => SEEDS_PER_CONFERENCE,
            PlayoffRound::Divisional => 4,
            PlayoffRound::Conference => 2,
            PlayoffRound::SuperBowl => 1,
        }
    }
}

impl fmt::Display for PlayoffRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoffRound::WildCard => write!(f, "Wild Card"),
            PlayoffRound::Divisional => write!(f, "Divisional"),
            PlayoffRound::Conference => write!(f, "Conference Championship"),
            PlayoffRound::SuperBowl => write!(f, "Super Bowl"),
        }
    }
}

/// A team and its seed (1-7) within its conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub seed: u8,
    pub team: TeamId,
}

/// One scheduled playoff game. `conf` is `None` for the Super Bowl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub conf: Option<Conference>,
    pub home: Seed,
    pub away: Seed,
}

/// A played playoff game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffGame {
    pub round: PlayoffRound,
    pub series: Series,
    pub score_home: u32,
    pub score_away: u32,
}

impl PlayoffGame {
    pub fn winner(&self) -> TeamId {
        if self.score_home > self.score_away {
            self.series.home.team
        } else {
            self.series.away.team
        }
    }

    pub fn loser(&self) -> TeamId {
        if self.score_home > self.score_away {
            self.series.away.team
        } else {
            self.series.home.team
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffState {
    pub round: PlayoffRound,
    /// Seeded teams, `[conference][seed - 1]`.
    pub seeds: [[TeamId; SEEDS_PER_CONFERENCE]; 2],
    /// Teams still alive per conference.
    pub alive: [Vec<Seed>; 2],
    /// Games of the current round.
    pub series: Vec<Series>,
    /// Every game played so far.
    pub games: Vec<PlayoffGame>,
    /// One line per played game.
    pub results: Vec<String>,
    pub champion: Option<TeamId>,
}

impl PlayoffState {
    fn validate(&self, teams: usize) -> Result<(), PlayoffError> {
        let expected = self.round.alive_per_conference();
        for (idx, pool) in self.alive.iter().enumerate() {
            if pool.len() != expected {
                return Err(PlayoffError::MalformedSeeds(format!(
                    "{} has {} teams alive in the {} round, expected {}",
                    Conference::BOTH[idx],
                    pool.len(),
                    self.round,
                    expected
                )));
            }
            if let Some(bad) = pool.iter().find(|s| s.team >= teams) {
                return Err(PlayoffError::MalformedSeeds(format!(
                    "unknown team {}",
                    bad.team
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Seven seeds for one conference.
pub fn seed_conference(
    league: &League,
    standings: &Standings,
    conf: Conference,
) -> Result<[TeamId; SEEDS_PER_CONFERENCE], PlayoffError> {
    let mut leaders = Vec::with_capacity(DIVISIONS_PER_CONFERENCE);
    for div in 0..DIVISIONS_PER_CONFERENCE {
        let ids = league.division_teams(conf, div);
        let leader = standings
            .rank(&ids, TieBreakScope::Leaders)
            .first()
            .copied()
            .ok_or_else(|| PlayoffError::MalformedSeeds(format!("{conf} division {div} is empty")))?;
        leaders.push(leader);
    }
    let leaders = standings.rank(&leaders, TieBreakScope::Conference);

    let others: Vec<TeamId> = league
        .conference_teams(conf)
        .into_iter()
        .filter(|id| !leaders.contains(id))
        .collect();
    let wild_cards = standings.rank(&others, TieBreakScope::Conference);

    let ordered: Vec<TeamId> = leaders
        .into_iter()
        .chain(wild_cards.into_iter().take(SEEDS_PER_CONFERENCE - DIVISIONS_PER_CONFERENCE))
        .collect();
    ordered.try_into().map_err(|v: Vec<TeamId>| {
        PlayoffError::MalformedSeeds(format!("{conf} produced {} seeds", v.len()))
    })
}

fn round_pairings(
    round: PlayoffRound,
    alive: &[Vec<Seed>; 2],
    standings: &Standings,
) -> Result<Vec<Series>, PlayoffError> {
    let mut series = Vec::new();

    if round == PlayoffRound::SuperBowl {
        let (Some(&afc), Some(&nfc)) = (alive[0].first(), alive[1].first()) else {
            return Err(PlayoffError::MalformedSeeds(
                "missing conference champion".to_string(),
            ));
        };
        let (home, away) = if standings.compare(afc.team, nfc.team, TieBreakScope::League).is_le() {
            (afc, nfc)
        } else {
            (nfc, afc)
        };
        series.push(Series {
            conf: None,
            home,
            away,
        });
        return Ok(series);
    }

    for conf in Conference::BOTH {
        let mut pool = alive[conf.index()].clone();
        pool.sort_by_key(|s| s.seed);
        let pair = |home: Seed, away: Seed| Series {
            conf: Some(conf),
            home,
            away,
        };
        match (round, pool.as_slice()) {
            (PlayoffRound::WildCard, [_, s2, s3, s4, s5, s6, s7]) => {
                series.push(pair(*s2, *s7));
                series.push(pair(*s3, *s6));
                series.push(pair(*s4, *s5));
            }
            (PlayoffRound::Divisional, [top, a, b, low]) => {
                series.push(pair(*top, *low));
                if standings.compare(a.team, b.team, TieBreakScope::Conference).is_le() {
                    series.push(pair(*a, *b));
                } else {
                    series.push(pair(*b, *a));
                }
            }
            (PlayoffRound::Conference, [high, low]) => series.push(pair(*high, *low)),
            _ => {
                return Err(PlayoffError::MalformedSeeds(format!(
                    "{conf} cannot be paired for the {round} round with {} teams",
                    pool.len()
                )))
            }
        }
    }
    Ok(series)
}

/// Seed the bracket from the final regular-season standings.
pub fn start_playoffs(league: &mut League) -> Result<(), PlayoffError> {
    if league.playoffs.is_some() {
        return Err(PlayoffError::AlreadyStarted);
    }
    if !league.regular_season_complete() {
        return Err(PlayoffError::SeasonIncomplete {
            played: league.weeks_played(),
            total: league.schedule.weeks.len(),
        });
    }

    let standings = Standings::compute(league);
    let seeds = [
        seed_conference(league, &standings, Conference::Afc)?,
        seed_conference(league, &standings, Conference::Nfc)?,
    ];
    let alive = seeds.map(|conf_seeds| {
        conf_seeds
            .iter()
            .enumerate()
            .map(|(idx, &team)| Seed {
                seed: idx as u8 + 1,
                team,
            })
            .collect::<Vec<_>>()
    });
    let series = round_pairings(PlayoffRound::WildCard, &alive, &standings)?;

    info!(
        "{} playoffs seeded: AFC {:?}, NFC {:?}",
        league.season, seeds[0], seeds[1]
    );
    league.playoffs = Some(PlayoffState {
        round: PlayoffRound::WildCard,
        seeds,
        alive,
        series,
        games: Vec::new(),
        results: Vec::new(),
        champion: None,
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// Play one playoff game. Strength is the roster rating plus a tenth of the
/// season point differential; playoff games cannot end tied, so a level
/// score goes to the home side by a field goal.
pub fn sim_playoff_game<R: Rng + ?Sized>(
    home: &Team,
    away: &Team,
    standings: &Standings,
    rng: &mut R,
) -> (u32, u32) {
    let pd = |id: TeamId| standings.stats(id).map_or(0, |s| s.point_diff()) as f64;
    let x = (home.rating() - away.rating()) + 0.1 * (pd(home.id) - pd(away.id));
    let p = home_win_probability(x);
    let (mut score_home, score_away) = scores_from_probability(p, rng);
    if score_home == score_away {
        score_home += 3;
    }
    (score_home, score_away)
}

/// One-line result, e.g. `AFC Wild Card: (7) MIA 17 at (2) BUF 27`.
pub fn describe_game(league: &League, game: &PlayoffGame) -> String {
    let abbrev = |id: TeamId| league.team(id).map_or("???", |t| t.abbrev.as_str());
    let label = match game.series.conf {
        Some(conf) => format!("{conf} {}", game.round),
        None => game.round.to_string(),
    };
    format!(
        "{}: ({}) {} {} at ({}) {} {}",
        label,
        game.series.away.seed,
        abbrev(game.series.away.team),
        game.score_away,
        game.series.home.seed,
        abbrev(game.series.home.team),
        game.score_home
    )
}

/// Play the current round and advance the bracket. After the Super Bowl the
/// champion is recorded, the playoff state is cleared and the offseason runs.
/// Returns the games played.
pub fn simulate_playoff_round<R: Rng>(
    league: &mut League,
    rng: &mut R,
) -> Result<Vec<PlayoffGame>, LeagueError> {
    let standings = Standings::compute(league);
    let state = league.playoffs.as_ref().ok_or(PlayoffError::NotStarted)?;
    state.validate(league.teams.len())?;
    let round = state.round;

    let mut games = Vec::with_capacity(state.series.len());
    for series in &state.series {
        let (Some(home), Some(away)) = (league.team(series.home.team), league.team(series.away.team))
        else {
            return Err(PlayoffError::MalformedSeeds(format!(
                "unknown team in {} vs {}",
                series.home.team, series.away.team
            ))
            .into());
        };
        let (score_home, score_away) = sim_playoff_game(home, away, &standings, rng);
        games.push(PlayoffGame {
            round,
            series: *series,
            score_home,
            score_away,
        });
    }
    let lines: Vec<String> = games.iter().map(|g| describe_game(league, g)).collect();
    for line in &lines {
        info!("{}", line);
    }

    let Some(state) = league.playoffs.as_mut() else {
        return Err(PlayoffError::NotStarted.into());
    };
    state.games.extend(games.iter().copied());
    state.results.extend(lines);
    for pool in state.alive.iter_mut() {
        pool.retain(|s| !games.iter().any(|g| g.loser() == s.team));
    }

    match round.next() {
        Some(next) => {
            state.round = next;
            state.series = round_pairings(next, &state.alive, &standings)?;
        }
        None => {
            let Some(champion) = games.first().map(PlayoffGame::winner) else {
                warn!("Super Bowl produced no game");
                return Err(PlayoffError::MalformedSeeds("no Super Bowl game".to_string()).into());
            };
            state.champion = Some(champion);
            crown_champion(league, champion);
            league.playoffs = None;
            offseason::run_offseason(league, rng)?;
        }
    }

    Ok(games)
}

fn crown_champion(league: &mut League, team: TeamId) {
    let season = league.season;
    if let Some(t) = league.team_mut(team) {
        for player in &mut t.roster {
            player.awards.push(Award {
                season,
                name: CHAMPION_AWARD.to_string(),
            });
        }
        info!("{} win the {} Super Bowl", t.name, season);
    }
    league.champions.push(Champion { season, team });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{LeagueSettings, Team};
    use crate::sim::GameResult;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn league() -> League {
        let mut teams = Vec::new();
        for conf in Conference::BOTH {
            for div in 0..4 {
                for r in 0..4 {
                    teams.push(Team::new(0, format!("{conf} {div}-{r}"), format!("T{div}{r}"), conf, div));
                }
            }
        }
        League::new(LeagueSettings::default(), 2025, teams)
    }

    fn game(home: TeamId, away: TeamId, score_home: u32, score_away: u32) -> GameResult {
        GameResult::Game {
            home,
            away,
            score_home,
            score_away,
        }
    }

    #[test]
    fn division_leaders_take_top_four_seeds() {
        let mut lg = league();
        lg.results_by_week = vec![vec![
            // Division 0: team 0 unbeaten, team 1 second with a strong record.
            game(0, 16, 20, 10),
            game(0, 17, 20, 10),
            game(0, 18, 20, 10),
            game(0, 19, 20, 10),
            game(0, 1, 20, 10),
            game(1, 20, 20, 10),
            game(1, 21, 20, 10),
            game(1, 22, 20, 10),
            // Division 1 leader is only 1-1.
            game(4, 23, 20, 10),
            game(4, 24, 10, 20),
            // Division 2 leader 1-0, division 3 leader 2-1.
            game(8, 25, 20, 10),
            game(12, 26, 20, 10),
            game(12, 27, 20, 10),
            game(12, 28, 10, 20),
        ]];
        let st = Standings::compute(&lg);
        let seeds = seed_conference(&lg, &st, Conference::Afc).unwrap();
        assert_eq!(seeds, [0, 8, 12, 4, 1, 2, 3]);
    }

    #[test]
    fn wild_card_pairings_follow_seeds() {
        let lg = league();
        let st = Standings::compute(&lg);
        let alive = [0, 1].map(|c| {
            (1..=7)
                .map(|s| Seed {
                    seed: s,
                    team: c * 16 + s as usize,
                })
                .collect::<Vec<_>>()
        });
        let series = round_pairings(PlayoffRound::WildCard, &alive, &st).unwrap();
        assert_eq!(series.len(), 6);
        let afc: Vec<(u8, u8)> = series
            .iter()
            .filter(|s| s.conf == Some(Conference::Afc))
            .map(|s| (s.home.seed, s.away.seed))
            .collect();
        assert_eq!(afc, vec![(2, 7), (3, 6), (4, 5)]);
    }

    #[test]
    fn divisional_round_top_seed_hosts_lowest() {
        let mut lg = league();
        // Seed 4 (team 4) has the better record of the two middle seeds.
        lg.results_by_week = vec![vec![game(4, 20, 30, 0)]];
        let st = Standings::compute(&lg);
        let pool = vec![
            Seed { seed: 1, team: 0 },
            Seed { seed: 3, team: 8 },
            Seed { seed: 4, team: 4 },
            Seed { seed: 6, team: 5 },
        ];
        let alive = [pool.clone(), pool.iter().map(|s| Seed { seed: s.seed, team: s.team + 16 }).collect()];
        let series = round_pairings(PlayoffRound::Divisional, &alive, &st).unwrap();
        assert_eq!((series[0].home.seed, series[0].away.seed), (1, 6));
        assert_eq!((series[1].home.team, series[1].away.team), (4, 8));
    }

    #[test]
    fn conference_round_higher_seed_hosts() {
        let mut lg = league();
        // The lower seed has the better record; seeding still decides.
        lg.results_by_week = vec![vec![game(2, 30, 30, 0), game(24, 5, 27, 3)]];
        let st = Standings::compute(&lg);
        let alive = [
            vec![Seed { seed: 5, team: 2 }, Seed { seed: 2, team: 9 }],
            vec![Seed { seed: 3, team: 24 }, Seed { seed: 1, team: 16 }],
        ];
        let series = round_pairings(PlayoffRound::Conference, &alive, &st).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].conf, Some(Conference::Afc));
        assert_eq!((series[0].home.team, series[0].away.team), (9, 2));
        assert_eq!(series[1].conf, Some(Conference::Nfc));
        assert_eq!((series[1].home.seed, series[1].away.seed), (1, 3));
    }

    #[test]
    fn super_bowl_host_is_the_better_team() {
        let mut lg = league();
        lg.results_by_week = vec![vec![game(16, 5, 27, 3)]];
        let st = Standings::compute(&lg);
        let alive = [vec![Seed { seed: 1, team: 0 }], vec![Seed { seed: 4, team: 16 }]];

        let series = round_pairings(PlayoffRound::SuperBowl, &alive, &st).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].conf, None);
        assert_eq!((series[0].home.team, series[0].away.team), (16, 0));

        // Same champions, but now the AFC side has the better season.
        lg.results_by_week = vec![vec![game(0, 20, 27, 3), game(21, 16, 27, 3)]];
        let st = Standings::compute(&lg);
        let series = round_pairings(PlayoffRound::SuperBowl, &alive, &st).unwrap();
        assert_eq!((series[0].home.team, series[0].away.team), (0, 16));

        let missing = [vec![Seed { seed: 1, team: 0 }], Vec::new()];
        assert!(matches!(
            round_pairings(PlayoffRound::SuperBowl, &missing, &st),
            Err(PlayoffError::MalformedSeeds(_))
        ));
    }

    #[test]
    fn level_playoff_games_go_to_the_home_side() {
        let lg = league();
        let st = Standings::compute(&lg);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            let (h, a) = sim_playoff_game(&lg.teams[0], &lg.teams[1], &st, &mut rng);
            assert_eq!(h, a + 3);
        }
    }

    #[test]
    fn lifecycle_errors() {
        let mut lg = League::generate(LeagueSettings::default(), 2025, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(
            start_playoffs(&mut lg),
            Err(PlayoffError::SeasonIncomplete {
                played: 0,
                total: 18
            })
        );
        assert_eq!(
            simulate_playoff_round(&mut lg, &mut rng),
            Err(LeagueError::Playoff(PlayoffError::NotStarted))
        );

        crate::sim::simulate_regular_season(&mut lg, &crate::sim::RatingSimulator, &mut rng);
        start_playoffs(&mut lg).unwrap();
        assert_eq!(start_playoffs(&mut lg), Err(PlayoffError::AlreadyStarted));

        if let Some(state) = lg.playoffs.as_mut() {
            state.alive[1].pop();
        }
        assert!(matches!(
            simulate_playoff_round(&mut lg, &mut rng),
            Err(LeagueError::Playoff(PlayoffError::MalformedSeeds(_)))
        ));
    }

    #[test]
    fn bracket_runs_to_a_champion() {
        let mut lg = League::generate(LeagueSettings::default(), 2025, 4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        crate::sim::simulate_regular_season(&mut lg, &crate::sim::RatingSimulator, &mut rng);
        start_playoffs(&mut lg).unwrap();

        let played: Vec<usize> = (0..4)
            .map(|_| simulate_playoff_round(&mut lg, &mut rng).unwrap().len())
            .collect();
        assert_eq!(played, vec![6, 4, 2, 1]);
        assert!(lg.playoffs.is_none());
        assert_eq!(lg.champions.len(), 1);
        assert_eq!(lg.champions[0].season, 2025);
        assert_eq!(lg.season, 2026);

        let champ = &lg.teams[lg.champions[0].team];
        assert!(champ
            .roster
            .iter()
            .filter(|p| p.awards.iter().any(|a| a.name == CHAMPION_AWARD && a.season == 2025))
            .count()
            > 0);
    }
}
