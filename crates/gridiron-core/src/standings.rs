// Standings aggregation and the tie-break cascade.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::league::{Conference, League, Record, TeamId};
use crate::sim::GameResult;

/// Which games count toward the divisional step of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreakScope {
    /// Teams of one division.
    Division,
    /// Division winners being ordered for seeding.
    Leaders,
    Conference,
    League,
}

impl TieBreakScope {
    fn uses_division_record(self) -> bool {
        matches!(self, TieBreakScope::Division | TieBreakScope::Leaders)
    }
}

/// Won-lost-tied split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub w: u32,
    pub l: u32,
    pub t: u32,
}

impl Split {
    pub fn games(&self) -> u32 {
        self.w + self.l + self.t
    }

    /// `(w + t/2) / games`, zero before any game is played.
    pub fn pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (self.w as f64 + 0.5 * self.t as f64) / games as f64
    }

    fn add(&mut self, ord: Ordering) {
        match ord {
            Ordering::Greater => self.w += 1,
            Ordering::Less => self.l += 1,
            Ordering::Equal => self.t += 1,
        }
    }
}

/// Aggregated season numbers for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team: TeamId,
    pub conf: Option<Conference>,
    pub div: usize,
    pub overall: Split,
    pub division: Split,
    pub conference: Split,
    pub pf: u32,
    pub pa: u32,
    /// Wins minus losses against each opponent.
    pub h2h: BTreeMap<TeamId, i32>,
}

impl TeamStats {
    pub fn win_pct(&self) -> f64 {
        self.overall.pct()
    }

    pub fn point_diff(&self) -> i64 {
        self.pf as i64 - self.pa as i64
    }

    pub fn h2h_vs(&self, opp: TeamId) -> i32 {
        self.h2h.get(&opp).copied().unwrap_or(0)
    }

    fn record_game(&mut self, opp: TeamId, scored: u32, allowed: u32, same_div: bool, same_conf: bool) {
        let ord = scored.cmp(&allowed);
        self.overall.add(ord);
        if same_div {
            self.division.add(ord);
        }
        if same_conf {
            self.conference.add(ord);
        }
        self.pf += scored;
        self.pa += allowed;
        let delta = match ord {
            Ordering::Greater => 1,
            Ordering::Less => -1,
            Ordering::Equal => 0,
        };
        *self.h2h.entry(opp).or_insert(0) += delta;
    }
}

/// Standings for every team in a league, indexed by team id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standings {
    stats: Vec<TeamStats>,
}

// ---------------------------------------------------------------------------
// Comparison steps. Each returns `Less` when `a` ranks ahead.
// ---------------------------------------------------------------------------

fn compare_win_pct(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.win_pct().total_cmp(&a.win_pct())
}

fn compare_head_to_head(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.h2h_vs(a.team).cmp(&a.h2h_vs(b.team))
}

fn compare_division_pct(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.division.pct().total_cmp(&a.division.pct())
}

fn compare_conference_pct(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.conference.pct().total_cmp(&a.conference.pct())
}

fn compare_point_diff(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.point_diff().cmp(&a.point_diff())
}

fn compare_points_for(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.pf.cmp(&a.pf)
}

impl Standings {
    /// Aggregate every recorded result of the league's current season.
    pub fn compute(league: &League) -> Self {
        let mut stats: Vec<TeamStats> = league
            .teams
            .iter()
            .map(|t| TeamStats {
                team: t.id,
                conf: Some(t.conf),
                div: t.div,
                ..TeamStats::default()
            })
            .collect();

        for (week, results) in league.results_by_week.iter().enumerate() {
            for result in results {
                let GameResult::Game {
                    home,
                    away,
                    score_home,
                    score_away,
                } = *result
                else {
                    continue;
                };
                let (Some(h), Some(a)) = (league.team(home), league.team(away)) else {
                    warn!(
                        "Ignoring result {} @ {} in week {}: unknown team",
                        away,
                        home,
                        week + 1
                    );
                    continue;
                };
                if home == away {
                    warn!("Ignoring result in week {}: team {} plays itself", week + 1, home);
                    continue;
                }
                let same_div = h.same_division(a);
                let same_conf = h.conf == a.conf;
                stats[home].record_game(away, score_home, score_away, same_div, same_conf);
                stats[away].record_game(home, score_away, score_home, same_div, same_conf);
            }
        }

        Standings { stats }
    }

    pub fn stats(&self, team: TeamId) -> Option<&TeamStats> {
        self.stats.get(team)
    }

    /// Season record of a team in the `Team::record` shape.
    pub fn record(&self, team: TeamId) -> Record {
        self.stats(team)
            .map(|s| Record {
                w: s.overall.w,
                l: s.overall.l,
                t: s.overall.t,
                pf: s.pf,
                pa: s.pa,
            })
            .unwrap_or_default()
    }

    /// Pairwise tie-break. `Less` means `a` ranks ahead of `b`.
    pub fn compare(&self, a: TeamId, b: TeamId, scope: TieBreakScope) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (Some(sa), Some(sb)) = (self.stats(a), self.stats(b)) else {
            // Unknown teams sink to the bottom.
            return match (self.stats(a), self.stats(b)) {
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                _ => a.cmp(&b),
            };
        };

        compare_win_pct(sa, sb)
            .then_with(|| compare_head_to_head(sa, sb))
            .then_with(|| {
                if scope.uses_division_record() {
                    compare_division_pct(sa, sb)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| compare_conference_pct(sa, sb))
            .then_with(|| compare_point_diff(sa, sb))
            .then_with(|| compare_points_for(sa, sb))
            .then_with(|| a.cmp(&b))
    }

    /// Order `ids` best first.
    ///
    /// Each team is scored by how many of the other teams `compare` puts it
    /// ahead of. Whenever `compare` is transitive on `ids` those scores are
    /// all distinct and the result is exactly `compare`'s order. Teams left
    /// level sit in a head-to-head cycle and fall back to the scalar keys
    /// (division pct where the scope uses it, conference pct, point
    /// differential, points for, team id).
    pub fn rank(&self, ids: &[TeamId], scope: TieBreakScope) -> Vec<TeamId> {
        let mut known: Vec<&TeamStats> = Vec::with_capacity(ids.len());
        let mut unknown: Vec<TeamId> = Vec::new();
        for &id in ids {
            match self.stats(id) {
                Some(s) if !known.iter().any(|k| k.team == id) => known.push(s),
                Some(_) => {}
                None => unknown.push(id),
            }
        }

        let wins: BTreeMap<TeamId, usize> = known
            .iter()
            .map(|a| {
                let beaten = known
                    .iter()
                    .filter(|b| self.compare(a.team, b.team, scope) == Ordering::Less)
                    .count();
                (a.team, beaten)
            })
            .collect();
        let wins_of = |s: &TeamStats| wins.get(&s.team).copied().unwrap_or(0);

        known.sort_by(|a, b| {
            wins_of(*b)
                .cmp(&wins_of(*a))
                .then_with(|| {
                    if scope.uses_division_record() {
                        compare_division_pct(a, b)
                    } else {
                        Ordering::Equal
                    }
                })
                .then_with(|| compare_conference_pct(a, b))
                .then_with(|| compare_point_diff(a, b))
                .then_with(|| compare_points_for(a, b))
                .then_with(|| a.team.cmp(&b.team))
        });

        let mut ordered: Vec<TeamId> = known.iter().map(|s| s.team).collect();
        unknown.sort_unstable();
        ordered.extend(unknown);
        ordered
    }

    /// A division ordered best first.
    pub fn division_standings(&self, league: &League, conf: Conference, div: usize) -> Vec<TeamId> {
        let ids: Vec<TeamId> = league
            .teams
            .iter()
            .filter(|t| t.conf == conf && t.div == div)
            .map(|t| t.id)
            .collect();
        self.rank(&ids, TieBreakScope::Division)
    }

    pub fn division_leader(&self, league: &League, conf: Conference, div: usize) -> Option<TeamId> {
        self.division_standings(league, conf, div).first().copied()
    }

    /// Write the overall numbers into every `Team::record`.
    pub fn apply_records(&self, league: &mut League) {
        for team in &mut league.teams {
            team.record = self.record(team.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{LeagueSettings, Team};
    use proptest::prelude::*;

    fn league() -> League {
        let mut teams = Vec::new();
        for conf in Conference::BOTH {
            for div in 0..4 {
                for r in 0..4 {
                    teams.push(Team::new(0, format!("{conf} {div}-{r}"), "TST", conf, div));
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

    fn with_results(results: Vec<GameResult>) -> (League, Standings) {
        let mut lg = league();
        lg.results_by_week = vec![results];
        let st = Standings::compute(&lg);
        (lg, st)
    }

    #[test]
    fn compute_splits_and_head_to_head() {
        // 0,1 share a division; 4 is same conference; 16 is the other conference.
        let (_, st) = with_results(vec![
            game(0, 1, 20, 10),
            game(4, 0, 14, 14),
            game(16, 0, 3, 30),
            GameResult::Bye { team: 2 },
        ]);
        let s = st.stats(0).unwrap();
        assert_eq!(s.overall, Split { w: 2, l: 0, t: 1 });
        assert_eq!(s.division, Split { w: 1, l: 0, t: 0 });
        assert_eq!(s.conference, Split { w: 1, l: 0, t: 1 });
        assert_eq!((s.pf, s.pa), (64, 27));
        assert_eq!(s.h2h_vs(1), 1);
        assert_eq!(st.stats(1).unwrap().h2h_vs(0), -1);
        assert_eq!(s.h2h_vs(4), 0);
        assert!((s.win_pct() - 2.5 / 3.0).abs() < 1e-12);
        assert_eq!(st.stats(2).unwrap().overall.games(), 0);
    }

    #[test]
    fn unknown_teams_are_ignored() {
        let (_, st) = with_results(vec![game(0, 77, 10, 0), game(5, 5, 1, 0)]);
        assert_eq!(st.stats(0).unwrap().overall.games(), 0);
        assert_eq!(st.stats(5).unwrap().overall.games(), 0);
    }

    #[test]
    fn head_to_head_breaks_equal_percentages() {
        let (_, st) = with_results(vec![
            game(0, 1, 10, 7),
            game(1, 2, 50, 0),
            game(2, 0, 50, 0),
        ]);
        // 0 and 1 are 1-1; 0 beat 1.
        assert_eq!(st.compare(0, 1, TieBreakScope::Division), Ordering::Less);
        assert_eq!(st.compare(1, 0, TieBreakScope::Division), Ordering::Greater);
    }

    #[test]
    fn division_record_only_counts_in_division_scopes() {
        // 0 and 4: both 1-1, no head-to-head; 0 won its division game.
        let (_, st) = with_results(vec![
            game(0, 1, 10, 7),
            game(20, 0, 10, 7),
            game(4, 20, 10, 7),
            game(4, 5, 7, 10),
        ]);
        assert_eq!(st.compare(0, 4, TieBreakScope::Division), Ordering::Less);
        // Conference pct is 1-0 for 0 and 0-1 for 4 in the conference scope.
        assert_eq!(st.compare(0, 4, TieBreakScope::Conference), Ordering::Less);
        // With equal conference records, point differential decides.
        let (_, st) = with_results(vec![game(0, 16, 10, 7), game(4, 17, 30, 7)]);
        assert_eq!(st.compare(0, 4, TieBreakScope::League), Ordering::Greater);
    }

    #[test]
    fn team_id_is_last_resort() {
        let (_, st) = with_results(vec![]);
        assert_eq!(st.compare(3, 9, TieBreakScope::League), Ordering::Less);
        assert_eq!(st.rank(&[9, 3, 5], TieBreakScope::League), vec![3, 5, 9]);
    }

    #[test]
    fn rank_resolves_head_to_head_cycles() {
        // 0 > 1 > 2 > 0, all 1-1. Each beats one other on `compare`, so point
        // differential decides.
        let (_, st) = with_results(vec![
            game(0, 1, 30, 0),
            game(1, 2, 10, 7),
            game(2, 0, 10, 7),
        ]);
        assert_eq!(st.rank(&[2, 1, 0], TieBreakScope::Division), vec![0, 2, 1]);
        assert_eq!(st.rank(&[0, 1, 2], TieBreakScope::Division), vec![0, 2, 1]);
    }

    #[test]
    fn rank_follows_compare_on_three_way_tie() {
        // 0, 1 and 4 all finish 1-1. 0 beat 1 directly; 1 went 1-1 in the
        // conference while 4 never played a conference game.
        let (_, st) = with_results(vec![
            game(0, 1, 20, 10),
            game(17, 0, 24, 3),
            game(1, 8, 17, 14),
            game(4, 16, 35, 0),
            game(18, 4, 13, 10),
        ]);
        let scope = TieBreakScope::Conference;
        assert_eq!(st.compare(0, 1, scope), Ordering::Less);
        assert_eq!(st.compare(1, 4, scope), Ordering::Less);
        assert_eq!(st.compare(0, 4, scope), Ordering::Less);
        assert_eq!(st.rank(&[4, 1, 0], scope), vec![0, 1, 4]);
        assert_eq!(st.rank(&[1, 0, 4], scope), vec![0, 1, 4]);
    }

    #[test]
    fn division_helpers_and_records() {
        let (mut lg, st) = with_results(vec![game(3, 0, 28, 3), game(2, 1, 3, 21)]);
        let order = st.division_standings(&lg, Conference::Afc, 0);
        assert_eq!(order, vec![3, 1, 2, 0]);
        assert_eq!(st.division_leader(&lg, Conference::Afc, 0), Some(3));
        st.apply_records(&mut lg);
        assert_eq!(lg.teams[3].record.w, 1);
        assert_eq!(lg.teams[0].record.l, 1);
        assert_eq!(lg.teams[0].record.pa, 28);
    }

    fn arb_results() -> impl Strategy<Value = Vec<(usize, usize, u32, u32)>> {
        prop::collection::vec((0usize..8, 0usize..8, 0u32..40, 0u32..40), 0..40)
    }

    proptest! {
        #[test]
        fn compare_is_antisymmetric(raw in arb_results(), a in 0usize..8, b in 0usize..8) {
            let results = raw
                .into_iter()
                .map(|(h, aw, sh, sa)| game(h, aw, sh, sa))
                .collect();
            let (_, st) = with_results(results);
            for scope in [TieBreakScope::Division, TieBreakScope::Leaders, TieBreakScope::Conference, TieBreakScope::League] {
                prop_assert_eq!(st.compare(a, b, scope), st.compare(b, a, scope).reverse());
            }
        }

        #[test]
        fn rank_agrees_with_transitive_compare(raw in arb_results()) {
            let results = raw
                .into_iter()
                .map(|(h, aw, sh, sa)| game(h, aw, sh, sa))
                .collect();
            let (_, st) = with_results(results);
            let ids: Vec<TeamId> = (0..8).collect();
            let scope = TieBreakScope::Conference;
            let ahead = |a: TeamId, b: TeamId| st.compare(a, b, scope) == Ordering::Less;
            let transitive = ids.iter().all(|&a| {
                ids.iter().all(|&b| {
                    ids.iter().all(|&c| !(ahead(a, b) && ahead(b, c)) || ahead(a, c))
                })
            });
            if transitive {
                let ranked = st.rank(&ids, scope);
                for i in 0..ranked.len() {
                    for j in i + 1..ranked.len() {
                        prop_assert!(
                            ahead(ranked[i], ranked[j]),
                            "{} should rank ahead of {}",
                            ranked[i],
                            ranked[j]
                        );
                    }
                }
            }
        }

        #[test]
        fn rank_is_permutation_invariant(raw in arb_results(), seed in any::<u64>()) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;
            let results = raw
                .into_iter()
                .map(|(h, aw, sh, sa)| game(h, aw, sh, sa))
                .collect();
            let (_, st) = with_results(results);
            let ids: Vec<TeamId> = (0..8).collect();
            let mut shuffled = ids.clone();
            shuffled.shuffle(&mut rand_chacha::ChaCha8Rng::seed_from_u64(seed));
            let ranked = st.rank(&ids, TieBreakScope::Conference);
            prop_assert_eq!(st.rank(&shuffled, TieBreakScope::Conference), ranked.clone());
            let mut sorted = ranked;
            sorted.sort_unstable();
            prop_assert_eq!(sorted, ids);
        }
    }
}
