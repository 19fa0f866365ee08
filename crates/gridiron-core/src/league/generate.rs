// League factory: 32 teams with rosters, contracts and picks.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use super::{Conference, League, LeagueSettings, Player, Position, Team, TEAMS_PER_DIVISION};
use crate::cap::{self, round1};
use crate::error::SchedulingError;

const TEAM_NAMES: [(&str, &str); 32] = [
    ("Boston Harriers", "BOS"),
    ("Buffalo Stampede", "BUF"),
    ("Miami Marlins", "MIA"),
    ("Newark Ironmen", "NWK"),
    ("Baltimore Ravens", "BAL"),
    ("Cincinnati Tigers", "CIN"),
    ("Cleveland Forge", "CLE"),
    ("Pittsburgh Steel", "PIT"),
    ("Houston Comets", "HOU"),
    ("Indianapolis Racers", "IND"),
    ("Jacksonville Sharks", "JAX"),
    ("Nashville Sound", "NSH"),
    ("Denver Peaks", "DEN"),
    ("Kansas City Scouts", "KC"),
    ("Las Vegas Aces", "LV"),
    ("San Diego Surf", "SD"),
    ("Dallas Wranglers", "DAL"),
    ("New York Empire", "NY"),
    ("Philadelphia Liberty", "PHI"),
    ("Washington Sentinels", "WAS"),
    ("Chicago Bruisers", "CHI"),
    ("Detroit Motors", "DET"),
    ("Green Bay Lumberjacks", "GB"),
    ("Minneapolis North Stars", "MIN"),
    ("Atlanta Firebirds", "ATL"),
    ("Charlotte Knights", "CHA"),
    ("New Orleans Krewe", "NO"),
    ("Tampa Bay Cannons", "TB"),
    ("Phoenix Scorpions", "PHX"),
    ("Los Angeles Stars", "LA"),
    ("San Francisco Fog", "SF"),
    ("Seattle Sound", "SEA"),
];

const FIRST_NAMES: [&str; 16] = [
    "Marcus", "Tyler", "Jalen", "Derek", "Andre", "Cole", "Isaiah", "Brandon",
    "Trey", "Malik", "Owen", "Darius", "Evan", "Jordan", "Caleb", "Nate",
];

const LAST_NAMES: [&str; 16] = [
    "Johnson", "Williams", "Carter", "Brooks", "Hayes", "Reed", "Coleman", "Price",
    "Bennett", "Foster", "Sanders", "Hughes", "Ward", "Powell", "Barnes", "Fisher",
];

/// Size of the free-agent pool created with a new league.
const FREE_AGENT_POOL_SIZE: usize = 60;

impl League {
    /// Generate a complete 32-team league for `season`, deterministic for a
    /// given `seed`, and build its first schedule.
    pub fn generate(
        settings: LeagueSettings,
        season: i32,
        seed: u64,
    ) -> Result<League, SchedulingError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let teams: Vec<Team> = TEAM_NAMES
            .iter()
            .enumerate()
            .map(|(idx, (name, abbrev))| {
                let per_conf = TEAM_NAMES.len() / 2;
                let conf = if idx < per_conf {
                    Conference::Afc
                } else {
                    Conference::Nfc
                };
                let div = (idx % per_conf) / TEAMS_PER_DIVISION;
                Team::new(idx, *name, *abbrev, conf, div)
            })
            .collect();

        let mut league = League::new(settings, season, teams);

        for team_idx in 0..league.teams.len() {
            for pos in Position::ALL {
                for _ in 0..league.settings.depth_target(pos) {
                    let player = random_player(&mut league, &mut rng, pos);
                    league.teams[team_idx].roster.push(player);
                }
            }
        }

        let mut pool = Vec::with_capacity(FREE_AGENT_POOL_SIZE);
        for _ in 0..FREE_AGENT_POOL_SIZE {
            let pos = *Position::ALL.choose(&mut rng).unwrap_or(&Position::Linebacker);
            let mut player = random_player(&mut league, &mut rng, pos);
            let asking = round1((player.base_annual * league.settings.free_agent_discount)
                .max(league.settings.min_salary));
            player.set_contract(1, asking, 0.0);
            pool.push(player);
        }
        league.free_agents = Some(pool);

        for year in 1..=league.settings.pick_years as i32 {
            league.issue_picks(season + year);
        }

        cap::recalc_all(&mut league);

        league.reschedule(rng.gen())?;
        info!(
            "Generated league for season {} with {} teams",
            season,
            league.teams.len()
        );
        Ok(league)
    }
}

/// A random player at `pos` with a contract priced off the overall rating.
fn random_player<R: Rng + ?Sized>(league: &mut League, rng: &mut R, pos: Position) -> Player {
    let id = league.next_player_id();
    let name = format!(
        "{} {}",
        FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
        LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
    );
    let ovr: u8 = rng.gen_range(45..=90);
    let age: u8 = rng.gen_range(22..=34);
    let years: u8 = rng.gen_range(1..=5);

    let over = (ovr as f64 - 55.0).max(0.0);
    let base = round1(league.settings.min_salary + over * over * 0.008);
    let bonus = round1(base * years as f64 * 0.2);

    let mut player = Player::new(id, name, pos, ovr, age).with_contract(years, base, bonus);
    if ovr >= 80 {
        player.guaranteed_pct = Some(round1(rng.gen_range(0.3..0.7)));
    }
    player
}

/// A drafted rookie at `pos`: young, raw and on a four-year deal whose value
/// falls with the round.
pub(crate) fn draft_prospect<R: Rng + ?Sized>(
    league: &mut League,
    rng: &mut R,
    pos: Position,
    round: u8,
) -> Player {
    let id = league.next_player_id();
    let name = format!(
        "{} {}",
        FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
        LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
    );
    let round = round.clamp(1, 7);
    let ceiling = 80 - (round - 1) * 4;
    let ovr: u8 = rng.gen_range(40..=ceiling);
    let age: u8 = rng.gen_range(21..=23);

    let base = round1(league.settings.min_salary + (8 - round) as f64 * 0.3);
    let bonus = round1(base * 0.5);
    Player::new(id, name, pos, ovr, age).with_contract(4, base, bonus)
}
