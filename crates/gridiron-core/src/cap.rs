// Salary cap ledger: cap hits, dead money, releases, signings and rollover.
//
// Every amount is in millions and is rounded to one decimal after each
// arithmetic step, not just on output. Rounding is half-up toward positive
// infinity so repeated ledgers reproduce the same cents.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CapError;
use crate::league::{League, LeagueSettings, Player, PlayerId, Team, TeamId};

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to one decimal place, halves rounding up.
pub fn round1(x: f64) -> f64 {
    (x * 10.0 + 0.5).floor() / 10.0
}

// ---------------------------------------------------------------------------
// Cap hits and recalculation
// ---------------------------------------------------------------------------

/// Cap charge of `player` in the season `rel_season` years from now.
///
/// Zero once the contract has run out.
pub fn cap_hit_for(player: &Player, rel_season: u8) -> f64 {
    if player.years == 0 || rel_season >= player.years {
        return 0.0;
    }
    let proration = if player.years_total > 0 {
        player.signing_bonus / player.years_total as f64
    } else {
        0.0
    };
    round1(player.base_annual + proration)
}

fn recalc_team(team: &mut Team, settings: &LeagueSettings, season: i32) {
    let salaries: f64 = team.roster.iter().map(|p| cap_hit_for(p, 0)).sum();
    let dead = team.dead_for(season);
    team.dead_cap = dead;
    team.cap_used = round1(salaries + dead);
    team.cap_total = round1(settings.salary_cap_base + team.cap_rollover);
    team.cap_room = round1(team.cap_total - team.cap_used);
}

/// Recompute a team's cap totals for the current season.
///
/// Nothing calls this automatically; every roster or contract mutation must
/// be followed by a recalculation.
pub fn recalc_cap(league: &mut League, team: TeamId) -> Result<(), CapError> {
    let season = league.season;
    let settings = &league.settings;
    let t = league
        .teams
        .get_mut(team)
        .ok_or(CapError::UnknownTeam(team))?;
    recalc_team(t, settings, season);
    Ok(())
}

/// Recompute every team's cap.
pub fn recalc_all(league: &mut League) {
    let season = league.season;
    let settings = &league.settings;
    for team in &mut league.teams {
        recalc_team(team, settings, season);
    }
}

// ---------------------------------------------------------------------------
// Dead money
// ---------------------------------------------------------------------------

/// Add dead money to `season`'s book. Negative amounts are ignored so book
/// entries never drop below zero. Returns the new book value.
pub fn add_dead(team: &mut Team, season: i32, amount: f64) -> f64 {
    let entry = team.dead_cap_book.entry(season).or_insert(0.0);
    *entry = round1(*entry + amount.max(0.0));
    *entry
}

/// Dead money produced by a release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub player: PlayerId,
    /// Charged to the current season.
    pub dead_current: f64,
    /// Charged to the following season (post-June-1 split only).
    pub dead_next: f64,
}

/// Release a player, accelerating the remaining bonus proration and the
/// guaranteed part of the salary into dead money.
///
/// A post-June-1 release of a player with more than one year left charges
/// one year of proration plus the guarantee now and pushes the rest of the
/// proration into next season. Otherwise all of it lands this season.
///
/// The released player re-enters the free-agent pool, when the league has
/// one, on a discounted one-year deal.
pub fn release_with_proration(
    league: &mut League,
    team: TeamId,
    player: PlayerId,
    post_june_1: bool,
) -> Result<ReleaseOutcome, CapError> {
    let season = league.season;
    let guaranteed_default = league.settings.guaranteed_pct_default;
    let discount = league.settings.free_agent_discount;
    let min_salary = league.settings.min_salary;

    let t = league
        .teams
        .get_mut(team)
        .ok_or(CapError::UnknownTeam(team))?;
    let mut released = t
        .remove_player(player)
        .ok_or(CapError::PlayerNotOnRoster { team, player })?;

    let per_year = if released.years_total > 0 {
        round1(released.signing_bonus / released.years_total as f64)
    } else {
        0.0
    };
    let remaining = round1(per_year * released.years as f64);
    let pct = released.guaranteed_pct.unwrap_or(guaranteed_default);
    let guaranteed = if released.years > 0 {
        round1(released.base_annual * pct)
    } else {
        0.0
    };

    let (dead_current, dead_next) = if post_june_1 && released.years > 1 {
        (round1(per_year + guaranteed), round1(remaining - per_year))
    } else {
        (round1(remaining + guaranteed), 0.0)
    };

    add_dead(t, season, dead_current);
    if dead_next > 0.0 {
        add_dead(t, season + 1, dead_next);
    }

    let asking = round1((released.base_annual * discount).max(min_salary));
    released.zero_contract();
    info!(
        "Team {} released {} (dead money {:.1} now, {:.1} next season)",
        team, released.name, dead_current, dead_next
    );

    if let Some(pool) = league.free_agents.as_mut() {
        released.set_contract(1, asking, 0.0);
        debug!("{} re-enters free agency asking {:.1}", released.name, asking);
        pool.push(released);
    }

    recalc_cap(league, team)?;

    Ok(ReleaseOutcome {
        player,
        dead_current,
        dead_next,
    })
}

// ---------------------------------------------------------------------------
// Signings
// ---------------------------------------------------------------------------

/// Check whether `team` can sign `player`. Returns the player's cap hit.
pub fn validate_signing(league: &League, team: TeamId, player: &Player) -> Result<f64, CapError> {
    let t = league.team(team).ok_or(CapError::UnknownTeam(team))?;
    let hit = cap_hit_for(player, 0);

    let projected = round1(t.cap_used + hit);
    if projected > t.cap_total {
        return Err(CapError::OverCap {
            overage: round1(projected - t.cap_total),
        });
    }

    let count = t.position_count(player.pos) + 1;
    let limit = league.settings.position_limit(player.pos);
    if count > limit {
        return Err(CapError::PositionFull {
            pos: player.pos,
            count,
            limit,
        });
    }

    Ok(hit)
}

/// Validate and add `player` to `team`, removing the player from the free-agent
/// pool if present there. Returns the cap hit.
pub fn sign_player(league: &mut League, team: TeamId, player: Player) -> Result<f64, CapError> {
    let hit = validate_signing(league, team, &player)?;

    if let Some(pool) = league.free_agents.as_mut() {
        pool.retain(|p| p.id != player.id);
    }

    info!("Team {} signed {} (cap hit {:.1})", team, player.name, hit);
    league.teams[team].roster.push(player);
    recalc_cap(league, team)?;
    Ok(hit)
}

/// Sign a player out of the free-agent pool on the asking contract.
pub fn sign_free_agent(
    league: &mut League,
    team: TeamId,
    player: PlayerId,
) -> Result<f64, CapError> {
    let candidate = league
        .free_agents
        .as_ref()
        .and_then(|pool| pool.iter().find(|p| p.id == player))
        .cloned()
        .ok_or(CapError::NotAFreeAgent(player))?;
    sign_player(league, team, candidate)
}

// ---------------------------------------------------------------------------
// Rollover
// ---------------------------------------------------------------------------

/// Carry unused space into next season's rollover, capped at the league
/// maximum. Returns the new rollover.
pub fn process_cap_rollover(league: &mut League, team: TeamId) -> Result<f64, CapError> {
    let max_rollover = league.settings.max_rollover;
    let t = league
        .teams
        .get_mut(team)
        .ok_or(CapError::UnknownTeam(team))?;
    let unused = round1(t.cap_total - t.cap_used).max(0.0);
    t.cap_rollover = round1(unused.min(max_rollover));
    debug!("Team {} rolls over {:.1}", team, t.cap_rollover);
    Ok(t.cap_rollover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{Conference, Position};
    use proptest::prelude::*;

    fn league_with_team() -> League {
        let teams = vec![
            Team::new(0, "Test", "TST", Conference::Afc, 0),
            Team::new(1, "Other", "OTH", Conference::Afc, 0),
        ];
        let mut league = League::new(LeagueSettings::default(), 2025, teams);
        recalc_all(&mut league);
        league
    }

    fn contracted(id: PlayerId, pos: Position, years_total: u8, years: u8, base: f64, bonus: f64) -> Player {
        let mut p = Player::new(id, format!("Player {id}"), pos, 70, 27).with_contract(years_total, base, bonus);
        p.years = years;
        p
    }

    #[test]
    fn round1_rounds_half_up() {
        assert_eq!(round1(2.25), 2.3);
        assert_eq!(round1(7.0), 7.0);
        assert_eq!(round1(3.14159), 3.1);
    }

    #[test]
    fn cap_hit_includes_proration() {
        let p = contracted(1, Position::Quarterback, 4, 2, 10.0, 8.0);
        assert_eq!(cap_hit_for(&p, 0), 12.0);
        assert_eq!(cap_hit_for(&p, 1), 12.0);
        assert_eq!(cap_hit_for(&p, 2), 0.0);
    }

    #[test]
    fn cap_hit_zero_without_years() {
        let p = contracted(1, Position::Quarterback, 4, 0, 10.0, 8.0);
        assert_eq!(cap_hit_for(&p, 0), 0.0);
        let unsigned = Player::new(2, "FA", Position::Kicker, 60, 30);
        assert_eq!(cap_hit_for(&unsigned, 0), 0.0);
    }

    #[test]
    fn recalc_includes_dead_money_and_rollover() {
        let mut league = league_with_team();
        league.teams[0].roster.push(contracted(1, Position::Quarterback, 4, 2, 10.0, 8.0));
        league.teams[0].cap_rollover = 4.6;
        add_dead(&mut league.teams[0], 2025, 3.3);
        add_dead(&mut league.teams[0], 2026, 9.0);
        recalc_cap(&mut league, 0).unwrap();

        let t = &league.teams[0];
        assert_eq!(t.cap_used, 15.3);
        assert_eq!(t.dead_cap, 3.3);
        assert_eq!(t.cap_total, 260.0);
        assert_eq!(t.cap_room, 244.7);
    }

    #[test]
    fn recalc_unknown_team() {
        let mut league = league_with_team();
        assert_eq!(recalc_cap(&mut league, 9), Err(CapError::UnknownTeam(9)));
    }

    #[test]
    fn add_dead_accumulates_and_ignores_negative() {
        let mut league = league_with_team();
        let t = &mut league.teams[0];
        assert_eq!(add_dead(t, 2025, 1.25), 1.3);
        assert_eq!(add_dead(t, 2025, 2.0), 3.3);
        assert_eq!(add_dead(t, 2025, -10.0), 3.3);
        assert_eq!(t.dead_for(2025), 3.3);
        assert_eq!(t.dead_for(2030), 0.0);
    }

    #[test]
    fn post_june_1_release_splits_dead_money() {
        let mut league = league_with_team();
        league.free_agents = Some(Vec::new());
        let mut p = contracted(7, Position::WideReceiver, 4, 2, 10.0, 8.0);
        p.guaranteed_pct = Some(0.5);
        league.teams[0].roster.push(p);
        recalc_cap(&mut league, 0).unwrap();

        let out = release_with_proration(&mut league, 0, 7, true).unwrap();
        assert_eq!(out.dead_current, 7.0);
        assert_eq!(out.dead_next, 2.0);

        let t = &league.teams[0];
        assert_eq!(t.dead_for(2025), 7.0);
        assert_eq!(t.dead_for(2026), 2.0);
        assert_eq!(t.cap_used, 7.0);
        assert!(t.player(7).is_none());

        let pool = league.free_agents.as_ref().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].years, 1);
        assert_eq!(pool[0].base_annual, 6.0);
        assert_eq!(pool[0].signing_bonus, 0.0);
    }

    #[test]
    fn pre_june_1_release_accelerates_everything() {
        let mut league = league_with_team();
        league.teams[0].roster.push(contracted(7, Position::WideReceiver, 4, 2, 10.0, 8.0));

        let out = release_with_proration(&mut league, 0, 7, false).unwrap();
        assert_eq!(out.dead_current, 9.0);
        assert_eq!(out.dead_next, 0.0);
        assert_eq!(league.teams[0].dead_for(2026), 0.0);
        assert!(league.free_agents.is_none());
    }

    #[test]
    fn post_june_1_final_year_release_is_not_split() {
        let mut league = league_with_team();
        league.teams[0].roster.push(contracted(7, Position::WideReceiver, 4, 1, 10.0, 8.0));

        let out = release_with_proration(&mut league, 0, 7, true).unwrap();
        assert_eq!(out.dead_current, 7.0);
        assert_eq!(out.dead_next, 0.0);
    }

    #[test]
    fn release_unknown_player_is_an_error() {
        let mut league = league_with_team();
        let err = release_with_proration(&mut league, 0, 99, false).unwrap_err();
        assert_eq!(err, CapError::PlayerNotOnRoster { team: 0, player: 99 });
        assert_eq!(err.to_string(), "player 99 is not on team 0");
        assert!(release_with_proration(&mut league, 5, 1, false).is_err());
    }

    #[test]
    fn validate_signing_reports_overage() {
        let mut league = league_with_team();
        league.teams[0].roster.push(contracted(1, Position::Quarterback, 1, 1, 250.0, 0.0));
        recalc_cap(&mut league, 0).unwrap();

        let target = contracted(2, Position::Linebacker, 2, 2, 6.0, 2.0);
        match validate_signing(&league, 0, &target) {
            Err(CapError::OverCap { overage }) => assert_eq!(overage, 1.6),
            other => panic!("expected OverCap, got {other:?}"),
        }
    }

    #[test]
    fn validate_signing_enforces_position_limit() {
        let mut league = league_with_team();
        for id in 1..=4 {
            league.teams[0].roster.push(contracted(id, Position::Quarterback, 1, 1, 1.0, 0.0));
        }
        recalc_cap(&mut league, 0).unwrap();

        let fifth = contracted(5, Position::Quarterback, 1, 1, 1.0, 0.0);
        assert_eq!(
            validate_signing(&league, 0, &fifth),
            Err(CapError::PositionFull {
                pos: Position::Quarterback,
                count: 5,
                limit: 4
            })
        );

        let kicker = contracted(6, Position::Kicker, 2, 2, 1.0, 0.4);
        assert_eq!(validate_signing(&league, 0, &kicker), Ok(1.2));
    }

    #[test]
    fn sign_free_agent_moves_player_out_of_pool() {
        let mut league = league_with_team();
        league.free_agents = Some(vec![contracted(40, Position::Safety, 1, 1, 2.5, 0.0)]);

        let hit = sign_free_agent(&mut league, 1, 40).unwrap();
        assert_eq!(hit, 2.5);
        assert!(league.free_agents.as_ref().unwrap().is_empty());
        assert_eq!(league.teams[1].cap_used, 2.5);
        assert!(league.teams[1].player(40).is_some());

        assert_eq!(
            sign_free_agent(&mut league, 1, 40),
            Err(CapError::NotAFreeAgent(40))
        );
    }

    #[test]
    fn rollover_is_capped() {
        let mut league = league_with_team();
        assert_eq!(process_cap_rollover(&mut league, 0).unwrap(), 25.0);

        league.teams[1].roster.push(contracted(1, Position::Quarterback, 1, 1, 245.0, 0.0));
        recalc_cap(&mut league, 1).unwrap();
        assert_eq!(process_cap_rollover(&mut league, 1).unwrap(), 10.4);
    }

    #[test]
    fn rollover_never_negative() {
        let mut league = league_with_team();
        league.teams[0].roster.push(contracted(1, Position::Quarterback, 1, 1, 300.0, 0.0));
        recalc_cap(&mut league, 0).unwrap();
        assert!(league.teams[0].cap_room < 0.0);
        assert_eq!(process_cap_rollover(&mut league, 0).unwrap(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_cap_room_is_rounded_difference(
            bases in proptest::collection::vec(0.5f64..30.0, 0..40),
            rollover in 0.0f64..25.0,
            dead in 0.0f64..40.0,
        ) {
            let mut league = league_with_team();
            for (i, base) in bases.iter().enumerate() {
                league.teams[0].roster.push(contracted(i as PlayerId + 1, Position::Linebacker, 3, 3, *base, base / 2.0));
            }
            league.teams[0].cap_rollover = round1(rollover);
            add_dead(&mut league.teams[0], 2025, dead);
            recalc_cap(&mut league, 0).unwrap();
            let t = &league.teams[0];
            prop_assert_eq!(t.cap_room, round1(t.cap_total - t.cap_used));
        }

        #[test]
        fn prop_dead_book_sums_additions(amounts in proptest::collection::vec(-5.0f64..20.0, 1..20)) {
            let mut league = league_with_team();
            let mut expected = 0.0;
            for a in &amounts {
                expected = round1(expected + a.max(0.0));
                add_dead(&mut league.teams[0], 2025, *a);
            }
            prop_assert!(league.teams[0].dead_for(2025) >= 0.0);
            prop_assert_eq!(league.teams[0].dead_for(2025), expected);
        }
    }
}
