// Season matchup generation: divisional, rotation and same-place games.

use std::collections::HashMap;

use crate::league::TeamId;

/// Partner division inside the conference for each year of the 8-year cycle.
/// Every row pairs the four divisions off without fixed points.
pub const INTRA_ROT_8: [[usize; 4]; 8] = [
    [1, 0, 3, 2],
    [2, 3, 0, 1],
    [3, 2, 1, 0],
    [1, 0, 3, 2],
    [2, 3, 0, 1],
    [3, 2, 1, 0],
    [1, 0, 3, 2],
    [2, 3, 0, 1],
];

/// Offset k such that AFC division d meets NFC division (d + k) % 4.
pub const INTER_ROT_8: [usize; 8] = [0, 1, 2, 3, 0, 1, 2, 3];

/// Host grid for a four-by-four division crossover: `true` when the row
/// team (rank i of the row division) hosts the column team (rank j).
/// Every row and every column holds two hosts.
pub const HOST_GRID_CANON: [[bool; 4]; 4] = [
    [true, false, true, false],
    [false, true, false, true],
    [true, false, true, false],
    [false, true, false, true],
];

/// Teams bucketed as `[conference][division]`, each ordered by last season's rank.
pub type Buckets = [[Vec<TeamId>; 4]; 2];

/// Position of a season in the rotation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub year: i32,
    /// `(year - base_year) mod 8`.
    pub idx: usize,
    pub intra_flip: bool,
    pub inter_flip: bool,
}

impl Rotation {
    pub fn for_year(year: i32, base_year: i32) -> Self {
        let idx = (year - base_year).rem_euclid(8) as usize;
        Rotation {
            year,
            idx,
            intra_flip: idx % 2 == 1,
            inter_flip: idx >= 4,
        }
    }

    /// Partner division of `div` in the intra-conference rotation.
    pub fn intra_partner(&self, div: usize) -> usize {
        INTRA_ROT_8[self.idx][div]
    }

    /// NFC division AFC division `div` plays in the inter-conference rotation.
    pub fn inter_target(&self, div: usize) -> usize {
        (div + INTER_ROT_8[self.idx]) % 4
    }

    /// NFC division AFC division `div` draws for the seventeenth game.
    pub fn seventeenth_target(&self, div: usize) -> usize {
        (div + INTER_ROT_8[self.idx] + 1 + self.idx % 3) % 4
    }

    /// The two same-conference divisions `div` meets on a same-place basis,
    /// in ascending order.
    pub fn extra_divisions(&self, div: usize) -> [usize; 2] {
        let partner = self.intra_partner(div);
        let mut extras = [0usize; 2];
        let mut n = 0;
        for d in 0..4 {
            if d != div && d != partner {
                extras[n] = d;
                n += 1;
            }
        }
        extras
    }
}

/// One game to be placed on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub home: TeamId,
    pub away: TeamId,
    pub divisional: bool,
}

impl Matchup {
    fn new(home: TeamId, away: TeamId, divisional: bool) -> Self {
        Matchup {
            home,
            away,
            divisional,
        }
    }

    pub fn key(&self) -> (TeamId, TeamId) {
        (self.home.min(self.away), self.home.max(self.away))
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

/// Build the full list of season games for the bucketed league.
pub fn generate_matchups(buckets: &Buckets, rot: &Rotation) -> Vec<Matchup> {
    let mut games = Vec::with_capacity(272);

    // Divisional home and away.
    for conf in buckets {
        for div in conf {
            for i in 0..div.len() {
                for j in (i + 1)..div.len() {
                    games.push(Matchup::new(div[i], div[j], true));
                    games.push(Matchup::new(div[j], div[i], true));
                }
            }
        }
    }

    // Intra-conference rotation.
    for conf in buckets {
        for d in 0..4 {
            let p = rot.intra_partner(d);
            if d < p {
                cross_divisions(&mut games, &conf[d], &conf[p], rot.intra_flip);
            }
        }
    }

    // Inter-conference rotation.
    for d in 0..4 {
        cross_divisions(
            &mut games,
            &buckets[0][d],
            &buckets[1][rot.inter_target(d)],
            rot.inter_flip,
        );
    }

    // Same-place games against the two remaining divisions of the conference.
    let year = rot.year as i64;
    for conf in buckets {
        for d in 0..4 {
            for (k, &other) in rot.extra_divisions(d).iter().enumerate() {
                if d > other {
                    continue;
                }
                for r in 0..conf[d].len().min(conf[other].len()) {
                    let (a, b) = (conf[d][r], conf[other][r]);
                    if (year + k as i64 + r as i64).rem_euclid(2) == 0 {
                        games.push(Matchup::new(a, b, false));
                    } else {
                        games.push(Matchup::new(b, a, false));
                    }
                }
            }
        }
    }

    // Seventeenth game: same place, cross conference.
    let afc_hosts = year.rem_euclid(2) == 0;
    for d in 0..4 {
        let afc = &buckets[0][d];
        let nfc = &buckets[1][rot.seventeenth_target(d)];
        for r in 0..afc.len().min(nfc.len()) {
            if afc_hosts {
                games.push(Matchup::new(afc[r], nfc[r], false));
            } else {
                games.push(Matchup::new(nfc[r], afc[r], false));
            }
        }
    }

    dedupe(games)
}

fn cross_divisions(games: &mut Vec<Matchup>, rows: &[TeamId], cols: &[TeamId], flip: bool) {
    for (i, &row) in rows.iter().enumerate().take(4) {
        for (j, &col) in cols.iter().enumerate().take(4) {
            if HOST_GRID_CANON[i][j] != flip {
                games.push(Matchup::new(row, col, false));
            } else {
                games.push(Matchup::new(col, row, false));
            }
        }
    }
}

/// Drop repeated pairings: divisional pairs keep both legs, any other pair
/// keeps its first occurrence.
fn dedupe(games: Vec<Matchup>) -> Vec<Matchup> {
    let mut seen: HashMap<(TeamId, TeamId), usize> = HashMap::new();
    games
        .into_iter()
        .filter(|g| {
            let count = seen.entry(g.key()).or_insert(0);
            let allowed = if g.divisional { 2 } else { 1 };
            if *count < allowed {
                *count += 1;
                true
            } else {
                false
            }
        })
        .collect()
}
