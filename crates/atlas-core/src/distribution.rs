// Initial team assignment.
//
// Elites are placed first, heaviest first, onto the team with the lowest
// dispersion cost (team total plus a penalty per high-value player already
// there), restricted to elite-free teams while any have room. Everyone else
// goes greedily onto the lightest team with room. Each placement is recorded
// in a ledger with the comparison that decided it.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, Stage};
use crate::config::BalanceConfig;
use crate::error::InputError;
use crate::team::{Team, TeamMember};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPhase {
    /// Carried over from a caller-supplied assignment.
    Existing,
    Elite,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementStep {
    pub step: usize,
    pub player_id: String,
    pub points: u32,
    pub is_elite: bool,
    pub phase: PlacementPhase,
    pub team_id: String,
    pub reasoning: String,
    /// Team totals in team order after this placement.
    pub team_totals_after: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedPlayer {
    pub player_id: String,
    pub display_name: String,
    pub points: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub teams: Vec<Team>,
    pub ledger: Vec<PlacementStep>,
    pub excluded: Vec<ExcludedPlayer>,
}

// ---------------------------------------------------------------------------
// Placement state
// ---------------------------------------------------------------------------

struct Placer<'a> {
    config: &'a BalanceConfig,
    teams: Vec<Team>,
    ledger: Vec<PlacementStep>,
}

impl<'a> Placer<'a> {
    fn new(config: &'a BalanceConfig) -> Self {
        Placer {
            config,
            teams: Team::empty_set(config.teams.count),
            ledger: Vec::new(),
        }
    }

    fn capacity(&self) -> usize {
        self.config.teams.capacity
    }

    fn record(&mut self, member: &TeamMember, phase: PlacementPhase, idx: usize, reasoning: String) {
        self.ledger.push(PlacementStep {
            step: self.ledger.len() + 1,
            player_id: member.player_id.clone(),
            points: member.points,
            is_elite: member.is_elite,
            phase,
            team_id: self.teams[idx].id.clone(),
            reasoning,
            team_totals_after: self.teams.iter().map(|t| t.total_points).collect(),
        });
    }

    fn dispersion_cost(&self, team: &Team) -> u32 {
        let high_value = team.count_at_least(self.config.thresholds.high_value) as u32;
        team.total_points + self.config.orchestrator.elite_dispersion_penalty * high_value
    }

    fn place_elite(&mut self, member: TeamMember) {
        let capacity = self.capacity();
        let open: Vec<usize> = (0..self.teams.len())
            .filter(|&i| self.teams[i].has_room(capacity))
            .collect();
        let elite_free: Vec<usize> = open
            .iter()
            .copied()
            .filter(|&i| self.teams[i].elite_count() == 0)
            .collect();
        let candidates = if elite_free.is_empty() { open } else { elite_free };

        let mut costs: Vec<(usize, u32)> = candidates
            .iter()
            .map(|&i| (i, self.dispersion_cost(&self.teams[i])))
            .collect();
        costs.sort_by_key(|&(i, cost)| (cost, self.teams[i].ordinal));
        let Some(&(chosen, cost)) = costs.first() else {
            return;
        };

        let others: Vec<String> = costs
            .iter()
            .skip(1)
            .map(|&(i, c)| format!("{} {c}", self.teams[i].name))
            .collect();
        let reasoning = if others.is_empty() {
            format!("Elite placed on {} (cost {cost}, only candidate)", self.teams[chosen].name)
        } else {
            format!(
                "Elite placed on {} with lowest dispersion cost {cost} (vs {})",
                self.teams[chosen].name,
                others.join(", ")
            )
        };
        self.teams[chosen].add(member.clone());
        self.record(&member, PlacementPhase::Elite, chosen, reasoning);
    }

    fn place_regular(&mut self, member: TeamMember) {
        let capacity = self.capacity();
        let mut open: Vec<usize> = (0..self.teams.len())
            .filter(|&i| self.teams[i].has_room(capacity))
            .collect();
        open.sort_by_key(|&i| {
            let t = &self.teams[i];
            (t.total_points, t.len(), t.ordinal)
        });
        let Some(&chosen) = open.first() else {
            return;
        };
        let runner_up = open
            .get(1)
            .map(|&i| format!(" (next lightest {} at {})", self.teams[i].name, self.teams[i].total_points))
            .unwrap_or_default();
        let reasoning = format!(
            "Placed on lightest team with room {} at {} pts{runner_up}",
            self.teams[chosen].name, self.teams[chosen].total_points
        );
        self.teams[chosen].add(member.clone());
        self.record(&member, PlacementPhase::Regular, chosen, reasoning);
    }

    fn place_existing(&mut self, member: TeamMember, idx: usize) {
        let reasoning = format!("Kept on {} from existing assignment", self.teams[idx].name);
        self.teams[idx].add(member.clone());
        self.record(&member, PlacementPhase::Existing, idx, reasoning);
    }

    /// Elite pass then regular pass, each heaviest first with input order
    /// breaking ties.
    fn place_all(&mut self, mut players: Vec<TeamMember>) {
        players.sort_by(|a, b| b.points.cmp(&a.points));
        let (elites, regulars): (Vec<_>, Vec<_>) = players.into_iter().partition(|m| m.is_elite);
        for m in elites {
            self.place_elite(m);
        }
        for m in regulars {
            self.place_regular(m);
        }
    }

    fn finish(self, excluded: Vec<ExcludedPlayer>) -> Distribution {
        Distribution {
            teams: self.teams,
            ledger: self.ledger,
            excluded,
        }
    }
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Keep the first `seats` players in input order; later registrations are
/// reported as excluded.
fn split_excess(
    mut players: Vec<TeamMember>,
    seats: usize,
    total_players: usize,
    audit: &mut AuditLog,
) -> (Vec<TeamMember>, Vec<ExcludedPlayer>) {
    if players.len() <= seats {
        return (players, Vec::new());
    }
    let overflow = players.split_off(seats);
    let excluded: Vec<ExcludedPlayer> = overflow
        .into_iter()
        .map(|m| ExcludedPlayer {
            reason: format!(
                "All seats filled: {total_players} players for the available seats; registered after the cutoff"
            ),
            player_id: m.player_id,
            display_name: m.display_name,
            points: m.points,
        })
        .collect();
    audit.anomaly(
        Stage::Distribution,
        format!("{} player(s) excluded for lack of seats", excluded.len()),
    );
    (players, excluded)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Assign players to fresh teams.
pub fn distribute(
    players: Vec<TeamMember>,
    config: &BalanceConfig,
    audit: &mut AuditLog,
) -> Distribution {
    let total = players.len();
    let (kept, excluded) = split_excess(players, config.teams.seats(), total, audit);
    let mut placer = Placer::new(config);
    placer.place_all(kept);
    audit.milestone(
        Stage::Distribution,
        format!("Placed {} players on {} teams", placer.ledger.len(), placer.teams.len()),
    );
    placer.finish(excluded)
}

/// Rebuild teams from an earlier assignment (team-ordered lists of player
/// ids), then place anyone not named in it with the usual passes.
pub fn distribute_from_existing(
    players: Vec<TeamMember>,
    assignment: &[Vec<String>],
    config: &BalanceConfig,
    audit: &mut AuditLog,
) -> Result<Distribution, InputError> {
    if assignment.len() != config.teams.count {
        return Err(InputError::InvalidAssignment(format!(
            "expected {} teams, got {}",
            config.teams.count,
            assignment.len()
        )));
    }

    let mut placer = Placer::new(config);
    let mut remaining = players;
    for (idx, ids) in assignment.iter().enumerate() {
        if ids.len() > config.teams.capacity {
            return Err(InputError::InvalidAssignment(format!(
                "team {} has {} players, capacity is {}",
                idx + 1,
                ids.len(),
                config.teams.capacity
            )));
        }
        for id in ids {
            let pos = remaining
                .iter()
                .position(|m| &m.player_id == id)
                .ok_or_else(|| {
                    if placer.teams.iter().any(|t| t.contains(id)) {
                        InputError::InvalidAssignment(format!("player `{id}` assigned twice"))
                    } else {
                        InputError::InvalidAssignment(format!("unknown player `{id}`"))
                    }
                })?;
            let member = remaining.remove(pos);
            placer.place_existing(member, idx);
        }
    }

    let placed = placer.ledger.len();
    let free_seats = config.teams.seats() - placed;
    let total = placed + remaining.len();
    let (kept, excluded) = split_excess(remaining, free_seats, total, audit);
    audit.info(
        Stage::Distribution,
        format!("Kept {placed} players from existing assignment; placing {} new", kept.len()),
    );
    placer.place_all(kept);
    Ok(placer.finish(excluded))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
