// Week placement: pack matchups into weeks so no team plays twice in a week.
//
// Games are placed first-fit. When no week is free for both teams, a
// blocking game is moved to another week (single hop), and failing that the
// two-week alternating chain through the away team (or the home team) is
// swapped, which frees a common week whenever the chain does not connect the
// two teams.

use tracing::debug;

use super::matchups::Matchup;
use crate::error::SchedulingError;
use crate::league::TeamId;

/// How a game ended up in its week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placed {
    Direct,
    Swapped,
    Chained,
}

pub(crate) struct Placement {
    games: Vec<Matchup>,
    /// Week assigned to each game.
    week_of: Vec<Option<usize>>,
    /// `by_team[team][week]` is the game that team plays that week.
    by_team: Vec<Vec<Option<usize>>>,
    weeks: usize,
}

impl Placement {
    pub(crate) fn new(games: Vec<Matchup>, teams: usize, weeks: usize) -> Self {
        let n = games.len();
        Placement {
            games,
            week_of: vec![None; n],
            by_team: vec![vec![None; weeks]; teams],
            weeks,
        }
    }

    fn is_free(&self, team: TeamId, week: usize) -> bool {
        self.by_team[team][week].is_none()
    }

    fn assign(&mut self, game: usize, week: usize) {
        let m = self.games[game];
        self.by_team[m.home][week] = Some(game);
        self.by_team[m.away][week] = Some(game);
        self.week_of[game] = Some(week);
    }

    fn unassign(&mut self, game: usize) {
        if let Some(week) = self.week_of[game].take() {
            let m = self.games[game];
            self.by_team[m.home][week] = None;
            self.by_team[m.away][week] = None;
        }
    }

    /// Place every game in order.
    pub(crate) fn place_all(&mut self) -> Result<(), SchedulingError> {
        for game in 0..self.games.len() {
            match self.try_place(game) {
                Some(Placed::Direct) => {}
                Some(how) => debug!("Placed game {} via {:?}", game, how),
                None => {
                    let m = self.games[game];
                    return Err(SchedulingError::Unplaceable {
                        home: m.home,
                        away: m.away,
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn try_place(&mut self, game: usize) -> Option<Placed> {
        let Matchup { home, away, .. } = self.games[game];

        if let Some(week) = (0..self.weeks).find(|&w| self.is_free(home, w) && self.is_free(away, w)) {
            self.assign(game, week);
            return Some(Placed::Direct);
        }

        if self.single_hop(game, home, away) {
            return Some(Placed::Swapped);
        }

        if self.chain_swap(game, home, away) {
            return Some(Placed::Chained);
        }

        None
    }

    /// Free a week blocked for exactly one of the two teams by moving the
    /// blocking game to a week both of its teams have open.
    fn single_hop(&mut self, game: usize, home: TeamId, away: TeamId) -> bool {
        for week in 0..self.weeks {
            let blocker = match (self.by_team[home][week], self.by_team[away][week]) {
                (Some(g), None) | (None, Some(g)) => g,
                _ => continue,
            };
            let b = self.games[blocker];
            let target = (0..self.weeks)
                .find(|&w| w != week && self.is_free(b.home, w) && self.is_free(b.away, w));
            if let Some(target) = target {
                self.unassign(blocker);
                self.assign(blocker, target);
                self.assign(game, week);
                return true;
            }
        }
        false
    }

    /// Swap weeks `a` and `b` along the alternating chain that starts at
    /// `start` with its week-`a` game. Refuses when the chain reaches `avoid`.
    fn swap_chain(&mut self, start: TeamId, avoid: TeamId, a: usize, b: usize) -> bool {
        let mut chain = Vec::new();
        let mut cur = start;
        let mut week = a;
        while let Some(g) = self.by_team[cur][week] {
            if chain.len() > self.games.len() {
                return false;
            }
            chain.push(g);
            let m = self.games[g];
            cur = if m.home == cur { m.away } else { m.home };
            if cur == avoid {
                return false;
            }
            week = if week == a { b } else { a };
        }

        let moves: Vec<(usize, usize)> = chain
            .iter()
            .map(|&g| {
                let w = self.week_of[g].unwrap_or(a);
                (g, if w == a { b } else { a })
            })
            .collect();
        for &(g, _) in &moves {
            self.unassign(g);
        }
        for (g, w) in moves {
            self.assign(g, w);
        }
        true
    }

    fn chain_swap(&mut self, game: usize, home: TeamId, away: TeamId) -> bool {
        let home_free: Vec<usize> = (0..self.weeks).filter(|&w| self.is_free(home, w)).collect();
        let away_free: Vec<usize> = (0..self.weeks).filter(|&w| self.is_free(away, w)).collect();

        for &a in &home_free {
            for &b in &away_free {
                // Away team gives up its week-a game; home team stays free in a.
                if self.swap_chain(away, home, a, b) {
                    self.assign(game, a);
                    return true;
                }
                // Home team gives up its week-b game; away team stays free in b.
                if self.swap_chain(home, away, b, a) {
                    self.assign(game, b);
                    return true;
                }
            }
        }
        false
    }

    /// Games grouped by week, in placement order.
    pub(crate) fn into_weeks(self) -> Vec<Vec<Matchup>> {
        let mut weeks = vec![Vec::new(); self.weeks];
        for (game, week) in self.week_of.iter().enumerate() {
            if let Some(w) = week {
                weeks[*w].push(self.games[game]);
            }
        }
        weeks
    }
}
