// Post-assignment swap search.
//
// Each pass looks at the strongest and weakest teams and tries strategies in
// a fixed order. The first candidate that is valid and cuts the spread by more
// than the minimum improvement is executed; at most one per pass. Every
// candidate is evaluated on a copy and recorded as an attempt, so a rejected
// candidate never touches the live teams.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, Stage};
use crate::config::BalanceConfig;
use crate::team::{spread, strongest, weakest, Team};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStrategy {
    /// Strongest player on the strongest team for the weakest on the weakest.
    CriticalSingle,
    /// Any one-for-one exchange between a heavier and a lighter team.
    Pairwise,
    /// One player relocated from the strongest team to the weakest.
    Secondary,
    /// Strongest<->middle and middle<->weakest exchanges as one move.
    Cascading,
    /// Two-for-two exchange between the strongest and weakest teams.
    Fallback,
}

impl SwapStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            SwapStrategy::CriticalSingle => "critical single swap",
            SwapStrategy::Pairwise => "pairwise swap",
            SwapStrategy::Secondary => "secondary relocation",
            SwapStrategy::Cascading => "cascading swap",
            SwapStrategy::Fallback => "two-for-two fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMove {
    pub player_id: String,
    pub display_name: String,
    pub points: u32,
    pub from_team: String,
    pub to_team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    Executed,
    /// Invalid, or does not reduce the spread at all.
    Rejected,
    /// Valid and improving, but not by more than the minimum improvement,
    /// or beaten by a better candidate of the same strategy.
    Considered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceImpact {
    pub spread_before: u32,
    pub spread_after: u32,
    /// The move brings the spread down to the trigger or below.
    pub violation_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSuggestion {
    pub pass: usize,
    pub strategy: SwapStrategy,
    pub moves: Vec<PlayerMove>,
    pub source_team: String,
    pub target_team: String,
    pub expected_improvement: i64,
    pub outcome: SwapOutcome,
    pub rejection_reason: Option<String>,
    pub reasoning: String,
    pub balance_impact: BalanceImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapFinalOutcome {
    /// Spread was already within the trigger.
    NotNeeded,
    Improved,
    NoImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapAnalysis {
    pub initial_spread: u32,
    pub final_spread: u32,
    pub passes: usize,
    pub executed_count: usize,
    pub final_outcome: SwapFinalOutcome,
    pub attempts: Vec<SwapSuggestion>,
}

impl SwapAnalysis {
    pub fn executed(&self) -> impl Iterator<Item = &SwapSuggestion> {
        self.attempts
            .iter()
            .filter(|a| a.outcome == SwapOutcome::Executed)
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct MoveSpec {
    player_id: String,
    from: usize,
    to: usize,
}

impl MoveSpec {
    fn new(player_id: &str, from: usize, to: usize) -> Self {
        MoveSpec {
            player_id: player_id.to_string(),
            from,
            to,
        }
    }
}

struct Evaluation {
    teams: Vec<Team>,
    spread_after: u32,
    invalid: Option<String>,
}

/// Apply `moves` to a copy of `teams`: all removals first, then all adds, so
/// exchanges work regardless of move order.
fn apply(teams: &[Team], moves: &[MoveSpec]) -> Vec<Team> {
    let mut next = teams.to_vec();
    let mut in_flight = Vec::with_capacity(moves.len());
    for mv in moves {
        if let Some(member) = next[mv.from].remove(&mv.player_id) {
            in_flight.push((member, mv.to));
        }
    }
    for (member, to) in in_flight {
        next[to].add(member);
    }
    next
}

fn evaluate(teams: &[Team], moves: &[MoveSpec], config: &BalanceConfig) -> Evaluation {
    let next = apply(teams, moves);
    let mut touched: Vec<usize> = moves.iter().flat_map(|m| [m.from, m.to]).collect();
    touched.sort_unstable();
    touched.dedup();

    let mut invalid = None;
    for &i in &touched {
        if next[i].len() > config.teams.capacity {
            invalid = Some(format!("{} would exceed capacity", next[i].name));
            break;
        }
        let (before, after) = (teams[i].elite_count(), next[i].elite_count());
        if after > 1 && after > before {
            invalid = Some(format!("{} would hold {after} elite players", next[i].name));
            break;
        }
    }
    Evaluation {
        spread_after: spread(&next),
        teams: next,
        invalid,
    }
}

fn player_moves(teams: &[Team], moves: &[MoveSpec]) -> Vec<PlayerMove> {
    moves
        .iter()
        .filter_map(|mv| {
            let member = teams[mv.from]
                .players
                .iter()
                .find(|m| m.player_id == mv.player_id)?;
            Some(PlayerMove {
                player_id: member.player_id.clone(),
                display_name: member.display_name.clone(),
                points: member.points,
                from_team: teams[mv.from].id.clone(),
                to_team: teams[mv.to].id.clone(),
            })
        })
        .collect()
}

fn describe(moves: &[PlayerMove]) -> String {
    moves
        .iter()
        .map(|m| format!("{} ({}) {} -> {}", m.display_name, m.points, m.from_team, m.to_team))
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Pass state
// ---------------------------------------------------------------------------

struct Pass<'a> {
    config: &'a BalanceConfig,
    teams: &'a [Team],
    number: usize,
    before: u32,
    source: usize,
    target: usize,
}

/// How a strategy picks among its acceptable candidates.
#[derive(Clone, Copy)]
enum Pick {
    /// Walk candidates in order; the first acceptable one executes.
    First,
    /// Evaluate all; the acceptable one with the lowest spread executes,
    /// earlier candidates winning ties.
    Best,
}

impl<'a> Pass<'a> {
    /// Outcome of an evaluated candidate on its own merits.
    fn classify(&self, eval: &Evaluation) -> (SwapOutcome, Option<String>) {
        let improvement = self.before as i64 - eval.spread_after as i64;
        let min = self.config.orchestrator.min_swap_improvement as i64;
        match &eval.invalid {
            Some(reason) => (SwapOutcome::Rejected, Some(reason.clone())),
            None if improvement <= 0 => (
                SwapOutcome::Rejected,
                Some(format!("spread would not drop ({} -> {})", self.before, eval.spread_after)),
            ),
            None if improvement <= min => (
                SwapOutcome::Considered,
                Some(format!("spread reduction {improvement} does not exceed {min}")),
            ),
            None => (SwapOutcome::Executed, None),
        }
    }

    fn record(
        &self,
        strategy: SwapStrategy,
        moves: &[MoveSpec],
        eval: &Evaluation,
        (outcome, rejection_reason): (SwapOutcome, Option<String>),
        attempts: &mut Vec<SwapSuggestion>,
    ) {
        let moves_out = player_moves(self.teams, moves);
        let reasoning = format!(
            "{}: {}; spread {} -> {}",
            strategy.label(),
            describe(&moves_out),
            self.before,
            eval.spread_after
        );
        attempts.push(SwapSuggestion {
            pass: self.number,
            strategy,
            moves: moves_out,
            source_team: self.teams[self.source].id.clone(),
            target_team: self.teams[self.target].id.clone(),
            expected_improvement: self.before as i64 - eval.spread_after as i64,
            outcome,
            rejection_reason,
            reasoning,
            balance_impact: BalanceImpact {
                spread_before: self.before,
                spread_after: eval.spread_after,
                violation_resolved: eval.spread_after <= self.config.orchestrator.swap_trigger_spread,
            },
        });
    }

    /// Evaluate a strategy's candidates, recording each one evaluated.
    /// Returns the new teams if a candidate was executed.
    fn try_strategy(
        &self,
        strategy: SwapStrategy,
        candidates: Vec<Vec<MoveSpec>>,
        pick: Pick,
        attempts: &mut Vec<SwapSuggestion>,
    ) -> Option<Vec<Team>> {
        match pick {
            Pick::First => {
                for moves in candidates {
                    let eval = evaluate(self.teams, &moves, self.config);
                    let verdict = self.classify(&eval);
                    let accepted = verdict.0 == SwapOutcome::Executed;
                    self.record(strategy, &moves, &eval, verdict, attempts);
                    if accepted {
                        return Some(eval.teams);
                    }
                }
                None
            }
            Pick::Best => {
                let evaluated: Vec<(Vec<MoveSpec>, Evaluation)> = candidates
                    .into_iter()
                    .map(|moves| {
                        let eval = evaluate(self.teams, &moves, self.config);
                        (moves, eval)
                    })
                    .collect();
                let chosen = evaluated
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, eval))| self.classify(eval).0 == SwapOutcome::Executed)
                    .min_by_key(|(i, (_, eval))| (eval.spread_after, *i))
                    .map(|(i, _)| i);

                let mut accepted = None;
                for (i, (moves, eval)) in evaluated.into_iter().enumerate() {
                    let mut verdict = self.classify(&eval);
                    if verdict.0 == SwapOutcome::Executed && Some(i) != chosen {
                        verdict = (
                            SwapOutcome::Considered,
                            Some(format!("another {} was executed instead", strategy.label())),
                        );
                    }
                    self.record(strategy, &moves, &eval, verdict, attempts);
                    if Some(i) == chosen {
                        accepted = Some(eval.teams);
                    }
                }
                accepted
            }
        }
    }

    fn critical_single(&self) -> Option<Vec<MoveSpec>> {
        let (s, w) = (&self.teams[self.source], &self.teams[self.target]);
        let top = s.players.iter().reduce(|a, b| if b.points > a.points { b } else { a })?;
        let bottom = w.players.iter().reduce(|a, b| if b.points < a.points { b } else { a })?;
        (top.points > bottom.points).then(|| {
            vec![
                MoveSpec::new(&top.player_id, self.source, self.target),
                MoveSpec::new(&bottom.player_id, self.target, self.source),
            ]
        })
    }

    /// One-for-one exchanges across every heavier/lighter team pair, widest
    /// gap first.
    fn pairwise(&self) -> Vec<Vec<MoveSpec>> {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for i in 0..self.teams.len() {
            for j in 0..self.teams.len() {
                if self.teams[i].total_points > self.teams[j].total_points {
                    pairs.push((i, j));
                }
            }
        }
        pairs.sort_by_key(|&(i, j)| {
            (
                std::cmp::Reverse(self.teams[i].total_points - self.teams[j].total_points),
                self.teams[i].ordinal,
                self.teams[j].ordinal,
            )
        });

        let mut out = Vec::new();
        for (i, j) in pairs {
            for a in &self.teams[i].players {
                for b in &self.teams[j].players {
                    if a.points > b.points {
                        out.push(vec![
                            MoveSpec::new(&a.player_id, i, j),
                            MoveSpec::new(&b.player_id, j, i),
                        ]);
                    }
                }
            }
        }
        out
    }

    fn secondary(&self) -> Vec<Vec<MoveSpec>> {
        if !self.teams[self.target].has_room(self.config.teams.capacity) {
            return Vec::new();
        }
        self.teams[self.source]
            .players
            .iter()
            .map(|a| vec![MoveSpec::new(&a.player_id, self.source, self.target)])
            .collect()
    }

    fn cascading(&self) -> Vec<Vec<MoveSpec>> {
        let Some(middle) = self.middle_team() else {
            return Vec::new();
        };
        let (s, m, w) = (
            &self.teams[self.source],
            &self.teams[middle],
            &self.teams[self.target],
        );
        let mut out = Vec::new();
        for a in &s.players {
            for x in m.players.iter().filter(|x| a.points > x.points) {
                for y in m.players.iter().filter(|y| y.player_id != x.player_id) {
                    for z in w.players.iter().filter(|z| y.points > z.points) {
                        out.push(vec![
                            MoveSpec::new(&a.player_id, self.source, middle),
                            MoveSpec::new(&x.player_id, middle, self.source),
                            MoveSpec::new(&y.player_id, middle, self.target),
                            MoveSpec::new(&z.player_id, self.target, middle),
                        ]);
                    }
                }
            }
        }
        out
    }

    /// The team other than source and target closest to the average total.
    fn middle_team(&self) -> Option<usize> {
        let n = self.teams.len();
        if n < 3 {
            return None;
        }
        let avg = self.teams.iter().map(|t| t.total_points as f64).sum::<f64>() / n as f64;
        (0..n)
            .filter(|&i| i != self.source && i != self.target)
            .min_by(|&a, &b| {
                let da = (self.teams[a].total_points as f64 - avg).abs();
                let db = (self.teams[b].total_points as f64 - avg).abs();
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(self.teams[a].ordinal.cmp(&self.teams[b].ordinal))
            })
    }

    fn fallback(&self) -> Vec<Vec<MoveSpec>> {
        let (s, w) = (&self.teams[self.source], &self.teams[self.target]);
        let mut out = Vec::new();
        for i in 0..s.players.len() {
            for j in (i + 1)..s.players.len() {
                let give = s.players[i].points.saturating_add(s.players[j].points);
                for k in 0..w.players.len() {
                    for l in (k + 1)..w.players.len() {
                        if give > w.players[k].points.saturating_add(w.players[l].points) {
                            out.push(vec![
                                MoveSpec::new(&s.players[i].player_id, self.source, self.target),
                                MoveSpec::new(&s.players[j].player_id, self.source, self.target),
                                MoveSpec::new(&w.players[k].player_id, self.target, self.source),
                                MoveSpec::new(&w.players[l].player_id, self.target, self.source),
                            ]);
                        }
                    }
                }
            }
        }
        out
    }

    /// Run every strategy in order until one is accepted.
    fn run(&self, attempts: &mut Vec<SwapSuggestion>) -> Option<Vec<Team>> {
        let critical = self.critical_single();
        if let Some(moves) = &critical {
            let candidates = vec![moves.clone()];
            if let Some(next) = self.try_strategy(SwapStrategy::CriticalSingle, candidates, Pick::First, attempts) {
                return Some(next);
            }
        }

        let pairwise: Vec<Vec<MoveSpec>> = self
            .pairwise()
            .into_iter()
            .filter(|m| Some(m) != critical.as_ref())
            .collect();
        if let Some(next) = self.try_strategy(SwapStrategy::Pairwise, pairwise, Pick::First, attempts) {
            return Some(next);
        }

        let strategies = [
            (SwapStrategy::Secondary, self.secondary()),
            (SwapStrategy::Cascading, self.cascading()),
            (SwapStrategy::Fallback, self.fallback()),
        ];
        for (strategy, candidates) in strategies {
            if let Some(next) = self.try_strategy(strategy, candidates, Pick::Best, attempts) {
                return Some(next);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Refine `teams` in place while the spread exceeds the trigger.
pub fn search(teams: &mut Vec<Team>, config: &BalanceConfig, audit: &mut AuditLog) -> SwapAnalysis {
    let trigger = config.orchestrator.swap_trigger_spread;
    let initial_spread = spread(teams);
    let mut attempts = Vec::new();
    let mut passes = 0;
    let mut executed_count = 0;

    if initial_spread <= trigger {
        audit.info(
            Stage::SwapSearch,
            format!("Spread {initial_spread} within {trigger}; swap search skipped"),
        );
        return SwapAnalysis {
            initial_spread,
            final_spread: initial_spread,
            passes,
            executed_count,
            final_outcome: SwapFinalOutcome::NotNeeded,
            attempts,
        };
    }

    while passes < config.orchestrator.max_swap_passes && spread(teams) > trigger {
        let (Some(source), Some(target)) = (strongest(teams), weakest(teams)) else {
            break;
        };
        if source == target {
            break;
        }
        passes += 1;
        let pass = Pass {
            config,
            teams,
            number: passes,
            before: spread(teams),
            source,
            target,
        };
        match pass.run(&mut attempts) {
            Some(next) => {
                *teams = next;
                executed_count += 1;
                audit.info(
                    Stage::SwapSearch,
                    format!("Pass {passes}: swap executed, spread now {}", spread(teams)),
                );
            }
            None => {
                audit.info(Stage::SwapSearch, format!("Pass {passes}: no acceptable swap"));
                break;
            }
        }
    }

    let final_spread = spread(teams);
    let final_outcome = if executed_count > 0 {
        SwapFinalOutcome::Improved
    } else {
        SwapFinalOutcome::NoImprovement
    };
    audit.milestone(
        Stage::SwapSearch,
        format!(
            "Swap search: {executed_count} swap(s) over {passes} pass(es), spread {initial_spread} -> {final_spread}"
        ),
    );
    SwapAnalysis {
        initial_spread,
        final_spread,
        passes,
        executed_count,
        final_outcome,
        attempts,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::TeamMember;

    fn team(ordinal: usize, players: &[(&str, u32)]) -> Team {
        let mut t = Team::new(ordinal);
        for &(id, points) in players {
            t.add(TeamMember {
                player_id: id.to_string(),
                display_name: id.to_string(),
                points,
                is_elite: points >= 400,
            });
        }
        t
    }

    #[test]
    fn small_spread_needs_no_search() {
        let mut teams = vec![team(1, &[("a", 300)]), team(2, &[("b", 200)])];
        let before = teams.clone();
        let a = search(&mut teams, &BalanceConfig::default(), &mut AuditLog::new());
        assert_eq!(a.final_outcome, SwapFinalOutcome::NotNeeded);
        assert!(a.attempts.is_empty());
        assert_eq!(teams, before);
    }

    #[test]
    fn critical_single_swap_executes() {
        let mut teams = vec![
            team(1, &[("a", 390), ("b", 300)]),
            team(2, &[("c", 100), ("d", 150)]),
        ];
        let a = search(&mut teams, &BalanceConfig::default(), &mut AuditLog::new());
        assert_eq!(a.initial_spread, 440);
        assert_eq!(a.final_outcome, SwapFinalOutcome::Improved);
        let first = &a.attempts[0];
        assert_eq!(first.strategy, SwapStrategy::CriticalSingle);
        assert_eq!(first.outcome, SwapOutcome::Executed);
        assert!(teams[1].contains("a"));
        assert!(teams[0].contains("c"));
        assert!(a.final_spread < a.initial_spread);
    }

    #[test]
    fn executed_swaps_strictly_beat_threshold() {
        let mut teams = vec![
            team(1, &[("a", 330), ("b", 310), ("c", 290)]),
            team(2, &[("d", 150), ("e", 140), ("f", 130)]),
            team(3, &[("g", 210), ("h", 200), ("i", 190)]),
        ];
        let a = search(&mut teams, &BalanceConfig::default(), &mut AuditLog::new());
        for s in a.executed() {
            assert!(s.expected_improvement > 50);
            assert!(s.balance_impact.spread_after < s.balance_impact.spread_before);
        }
        assert!(a.executed_count >= 1);
    }

    #[test]
    fn elite_stacking_move_is_rejected_and_teams_untouched() {
        // The critical swap would put both elites on team 2.
        let mut teams = vec![
            team(1, &[("e1", 500), ("r1", 390)]),
            team(2, &[("e2", 410), ("r2", 100)]),
        ];
        let before = teams.clone();
        let a = search(&mut teams, &BalanceConfig::default(), &mut AuditLog::new());
        let critical = &a.attempts[0];
        assert_eq!(critical.strategy, SwapStrategy::CriticalSingle);
        assert_eq!(critical.outcome, SwapOutcome::Rejected);
        assert!(critical.rejection_reason.as_deref().unwrap().contains("elite"));
        // e1 <-> e2 keeps one elite per team and cuts the spread to 200.
        assert_eq!(a.executed_count, 1);
        assert_ne!(teams, before);
        assert!(teams.iter().all(|t| t.elite_count() <= 1));
    }

    #[test]
    fn non_convergence_reports_no_improvement() {
        let mut teams = vec![team(1, &[("a", 500)]), team(2, &[("b", 410)]), team(3, &[])];
        let mut c = BalanceConfig::default();
        c.teams.capacity = 1;
        c.orchestrator.swap_trigger_spread = 100;
        let before = teams.clone();
        let a = search(&mut teams, &c, &mut AuditLog::new());
        assert_eq!(a.final_outcome, SwapFinalOutcome::NoImprovement);
        assert_eq!(a.executed_count, 0);
        assert_eq!(teams, before);
    }

    #[test]
    fn every_evaluated_candidate_is_recorded() {
        // Full 2x2 teams: one critical swap, three further pairwise swaps and
        // one two-for-two exchange. Nothing clears the raised bar.
        let mut teams = vec![
            team(1, &[("a", 300), ("b", 250)]),
            team(2, &[("c", 100), ("d", 50)]),
        ];
        let mut c = BalanceConfig::default();
        c.teams.capacity = 2;
        c.orchestrator.min_swap_improvement = 10_000;
        let before = teams.clone();
        let a = search(&mut teams, &c, &mut AuditLog::new());

        assert_eq!(a.passes, 1);
        assert_eq!(a.attempts.len(), 5);
        let count = |s: SwapStrategy| a.attempts.iter().filter(|x| x.strategy == s).count();
        assert_eq!(count(SwapStrategy::CriticalSingle), 1);
        assert_eq!(count(SwapStrategy::Pairwise), 3);
        assert_eq!(count(SwapStrategy::Fallback), 1);
        let considered = a
            .attempts
            .iter()
            .filter(|x| x.outcome == SwapOutcome::Considered)
            .count();
        assert_eq!(considered, 4);
        let fallback = a.attempts.last().unwrap();
        assert_eq!(fallback.outcome, SwapOutcome::Rejected);
        assert!(a.attempts.iter().all(|x| x.rejection_reason.is_some() && !x.reasoning.is_empty()));
        assert_eq!(teams, before);
    }

    #[test]
    fn best_relocation_wins_and_runners_up_are_considered() {
        // Team 2 has room, so every player on team 1 is a relocation candidate.
        let mut teams = vec![
            team(1, &[("a", 390), ("b", 260), ("c", 120)]),
            team(2, &[("d", 390)]),
        ];
        let mut c = BalanceConfig::default();
        c.teams.capacity = 4;
        c.orchestrator.swap_trigger_spread = 0;
        // No one-for-one swap lowers team 1, so relocation decides the pass.
        c.orchestrator.min_swap_improvement = 200;
        let a = search(&mut teams, &c, &mut AuditLog::new());

        let relocations: Vec<&SwapSuggestion> = a
            .attempts
            .iter()
            .filter(|x| x.pass == 1 && x.strategy == SwapStrategy::Secondary)
            .collect();
        assert_eq!(relocations.len(), 3);
        let executed: Vec<&str> = relocations
            .iter()
            .filter(|x| x.outcome == SwapOutcome::Executed)
            .map(|x| x.moves[0].player_id.as_str())
            .collect();
        assert_eq!(executed, vec!["b"]);
        assert!(teams[1].contains("b"));
    }

    #[test]
    fn relocation_fills_empty_seat() {
        let mut teams = vec![
            team(1, &[("a", 300), ("b", 280), ("c", 120)]),
            team(2, &[("d", 110)]),
        ];
        let mut c = BalanceConfig::default();
        c.teams.capacity = 3;
        let a = search(&mut teams, &c, &mut AuditLog::new());
        assert!(a.executed().any(|s| s.strategy == SwapStrategy::Secondary
            || s.strategy == SwapStrategy::CriticalSingle
            || s.strategy == SwapStrategy::Pairwise));
        assert!(a.final_spread < a.initial_spread);
        assert!(teams.iter().all(|t| t.len() <= 3));
    }
}
