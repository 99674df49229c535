// Runs the whole pipeline over one immutable snapshot and assembles the report.
//
// weights -> player analysis -> adjustments -> distribution -> composition ->
// forced redistribution -> swap search -> final composition -> validation.
// Nothing here performs I/O or reads the clock.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::composition::analyze_composition;
use crate::analysis::player::{analyze_player, PlayerAnalysis};
use crate::audit::{AuditLog, Stage};
use crate::config::BalanceConfig;
use crate::decision::{
    DecisionAction, DecisionLog, ExecutionPlan, Priority, RunSummary, ValidationCheck,
};
use crate::distribution::{distribute, distribute_from_existing, Distribution};
use crate::error::InputError;
use crate::player::PlayerRecord;
use crate::redistribute::force_redistribute;
use crate::report::BalanceReport;
use crate::swap;
use crate::team::{spread, Team, TeamMember};
use crate::weight::WeightResolver;

const REDISTRIBUTION_CONFIDENCE: u32 = 90;

/// Everything one run needs. `as_of` stands in for "now" in every
/// time-based rule; without it those rules are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceInput {
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub config: BalanceConfig,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    /// Team-ordered player ids from an earlier run, for rebalancing.
    #[serde(default)]
    pub existing_assignment: Option<Vec<Vec<String>>>,
}

impl BalanceInput {
    pub fn new(players: Vec<PlayerRecord>, config: BalanceConfig) -> Self {
        BalanceInput {
            players,
            config,
            as_of: None,
            existing_assignment: None,
        }
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

fn check_input(input: &BalanceInput) -> Result<(), InputError> {
    input.config.validate()?;
    if input.players.is_empty() {
        return Err(InputError::NoPlayers);
    }
    let shape = &input.config.teams;
    if shape.seats() == 0 {
        return Err(InputError::ZeroCapacity {
            team_count: shape.count,
            team_capacity: shape.capacity,
        });
    }
    let mut seen = BTreeSet::new();
    for p in &input.players {
        if !seen.insert(p.id.as_str()) {
            return Err(InputError::DuplicatePlayer(p.id.clone()));
        }
    }
    Ok(())
}

fn adjustment_priority(applied: i64) -> Priority {
    match applied.unsigned_abs() {
        50.. => Priority::High,
        20..=49 => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Turn confident analyses into adjustment decisions and return the effective
/// weight per player, in input order.
fn apply_adjustments(
    analyses: &[PlayerAnalysis],
    config: &BalanceConfig,
    decisions: &mut DecisionLog,
    audit: &mut AuditLog,
) -> Vec<TeamMember> {
    let o = &config.orchestrator;
    analyses
        .iter()
        .map(|a| {
            let original = a.original_points();
            let requested = a.total_delta();
            let mut points = original;

            if requested != 0 && a.confidence >= o.confidence_threshold {
                let max = (original as f64 * o.max_adjustment_pct / 100.0).round() as i64;
                let applied = requested.clamp(-max, max);
                points = (original as i64 + applied).max(1) as u32;

                let mut reasoning: Vec<String> = a.flags.iter().map(|f| f.reasoning.clone()).collect();
                if applied != requested {
                    reasoning.push(format!(
                        "Clamped from {requested:+} to {applied:+} ({}% of {original})",
                        o.max_adjustment_pct
                    ));
                }
                decisions.push(
                    adjustment_priority(applied),
                    a.confidence,
                    applied,
                    DecisionAction::PlayerAdjustment {
                        player_id: a.player_id.clone(),
                        original_points: original,
                        adjusted_points: points,
                        requested_delta: requested,
                        applied_delta: applied,
                    },
                    reasoning.join("; "),
                );
                audit.info(
                    Stage::Analysis,
                    format!("{}: weight {original} -> {points} (confidence {})", a.player_id, a.confidence),
                );
            } else if requested != 0 {
                audit.info(
                    Stage::Analysis,
                    format!(
                        "{}: proposed {requested:+} not applied, confidence {} below {}",
                        a.player_id, a.confidence, o.confidence_threshold
                    ),
                );
            }

            TeamMember {
                player_id: a.player_id.clone(),
                display_name: a.display_name.clone(),
                points,
                is_elite: points >= config.thresholds.elite,
            }
        })
        .collect()
}

fn validate_teams(
    teams: &[Team],
    distribution_total: usize,
    player_count: usize,
    excluded: usize,
    config: &BalanceConfig,
) -> Vec<ValidationCheck> {
    let capacity = config.teams.capacity;
    let mut checks = Vec::new();

    let over: Vec<&str> = teams
        .iter()
        .filter(|t| t.len() > capacity)
        .map(|t| t.name.as_str())
        .collect();
    checks.push(ValidationCheck {
        name: "capacity".into(),
        passed: over.is_empty(),
        detail: if over.is_empty() {
            format!("every team within {capacity} players")
        } else {
            format!("over capacity: {}", over.join(", "))
        },
    });

    let mut seen = BTreeSet::new();
    let dupes: Vec<&str> = teams
        .iter()
        .flat_map(|t| t.players.iter())
        .filter(|m| !seen.insert(m.player_id.as_str()))
        .map(|m| m.player_id.as_str())
        .collect();
    checks.push(ValidationCheck {
        name: "uniqueness".into(),
        passed: dupes.is_empty(),
        detail: if dupes.is_empty() {
            "no player assigned twice".into()
        } else {
            format!("assigned twice: {}", dupes.join(", "))
        },
    });

    let expected = player_count.min(config.teams.seats());
    let counted = distribution_total == expected && distribution_total + excluded == player_count;
    checks.push(ValidationCheck {
        name: "assignment_count".into(),
        passed: counted,
        detail: format!("{distribution_total} placed, {excluded} excluded, {player_count} players"),
    });

    let max_elite = teams.iter().map(Team::elite_count).max().unwrap_or(0);
    let elite_free = teams.iter().filter(|t| t.elite_count() == 0).count();
    let dispersed = max_elite <= 1 || elite_free == 0;
    checks.push(ValidationCheck {
        name: "elite_dispersion".into(),
        passed: dispersed,
        detail: format!("max {max_elite} elite per team, {elite_free} elite-free team(s)"),
    });

    let final_spread = spread(teams);
    let trigger = config.orchestrator.swap_trigger_spread;
    checks.push(ValidationCheck {
        name: "final_spread".into(),
        passed: final_spread <= trigger,
        detail: format!("spread {final_spread} (limit {trigger})"),
    });
    checks
}

/// Run the full pipeline with a fresh audit log.
pub fn balance(input: &BalanceInput) -> Result<BalanceReport, InputError> {
    run(input, AuditLog::new())
}

/// Run the full pipeline, appending to `audit` (which may already hold
/// ingestion entries). Fatal input problems return before any work is done.
pub fn run(input: &BalanceInput, mut audit: AuditLog) -> Result<BalanceReport, InputError> {
    check_input(input)?;
    let config = &input.config;
    audit.milestone(
        Stage::Ingestion,
        format!(
            "Balancing {} players into {} teams of {} ({:?} weighting)",
            input.players.len(),
            config.teams.count,
            config.teams.capacity,
            config.weighting.mode
        ),
    );

    let resolver = WeightResolver::new(config, input.as_of);
    let analyses: Vec<PlayerAnalysis> = input
        .players
        .iter()
        .map(|p| {
            let weight = resolver.resolve(p, &mut audit);
            analyze_player(p, &weight, config, input.as_of)
        })
        .collect();

    let mut decisions = DecisionLog::new();
    let members = apply_adjustments(&analyses, config, &mut decisions, &mut audit);

    let Distribution {
        mut teams,
        ledger,
        excluded,
    } = match &input.existing_assignment {
        Some(assignment) => distribute_from_existing(members, assignment, config, &mut audit)?,
        None => distribute(members, config, &mut audit),
    };

    let initial_balance = analyze_composition(&teams, &config.thresholds);
    audit.info(
        Stage::Composition,
        format!(
            "Initial spread {} ({:?})",
            initial_balance.global.spread, initial_balance.global.quality_tier
        ),
    );

    let redistributions = force_redistribute(&mut teams, config.teams.capacity, &mut audit);
    for r in &redistributions {
        decisions.push(
            Priority::Critical,
            REDISTRIBUTION_CONFIDENCE,
            r.spread_before as i64 - r.spread_after as i64,
            DecisionAction::TeamRedistribution {
                player_id: r.player_id.clone(),
                from_team: r.from_team.clone(),
                to_team: r.to_team.clone(),
                exchanged_with: r.exchanged_with.clone(),
            },
            r.reasoning.clone(),
        );
    }

    let swap_analysis = swap::search(&mut teams, config, &mut audit);
    for s in swap_analysis.executed() {
        let improvement = s.expected_improvement;
        let confidence = (60 + improvement / 10).clamp(0, 95) as u32;
        let priority = if s.balance_impact.violation_resolved {
            Priority::High
        } else {
            Priority::Medium
        };
        decisions.push(
            priority,
            confidence,
            improvement,
            DecisionAction::PlayerSwap {
                strategy: s.strategy,
                moves: s.moves.clone(),
                spread_before: s.balance_impact.spread_before,
                spread_after: s.balance_impact.spread_after,
            },
            s.reasoning.clone(),
        );
    }

    if decisions.is_empty() {
        decisions.push(
            Priority::Low,
            100,
            0,
            DecisionAction::NoAction {
                reason: "initial distribution needs no changes".into(),
            },
            format!("Spread {} with no stacked elites", spread(&teams)),
        );
    }

    let balance_analysis = analyze_composition(&teams, &config.thresholds);
    let placed: usize = teams.iter().map(Team::len).sum();
    let validation = validate_teams(&teams, placed, input.players.len(), excluded.len(), config);
    for check in validation.iter().filter(|c| !c.passed) {
        audit.anomaly(Stage::Validation, format!("{} failed: {}", check.name, check.detail));
    }
    let execution_plan = ExecutionPlan::build(&decisions, validation);
    let decisions = decisions.into_inner();
    let summary = RunSummary::from_decisions(analyses.len(), &decisions);

    audit.milestone(
        Stage::Validation,
        format!(
            "Final spread {} ({:?}), {} decision(s)",
            balance_analysis.global.spread,
            balance_analysis.global.quality_tier,
            decisions.len()
        ),
    );

    Ok(BalanceReport {
        teams,
        balance_analysis,
        initial_balance: Some(initial_balance),
        player_analyses: analyses,
        decisions,
        execution_plan,
        swap_analysis,
        redistributions,
        summary,
        excluded,
        placement_ledger: ledger,
        audit: audit.into_entries(),
        notes: Vec::new(),
    })
}
