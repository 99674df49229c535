// Decisions, the execution plan that orders them, and the run summary.

use serde::{Deserialize, Serialize};

use crate::swap::{PlayerMove, SwapStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    PlayerAdjustment,
    TeamRedistribution,
    PlayerSwap,
    NoAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// What a decision does, with everything needed to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionAction {
    PlayerAdjustment {
        player_id: String,
        original_points: u32,
        adjusted_points: u32,
        requested_delta: i64,
        applied_delta: i64,
    },
    TeamRedistribution {
        player_id: String,
        from_team: String,
        to_team: String,
        exchanged_with: Option<String>,
    },
    PlayerSwap {
        strategy: SwapStrategy,
        moves: Vec<PlayerMove>,
        spread_before: u32,
        spread_after: u32,
    },
    NoAction {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Sequential id: D001, D002, ...
    pub id: String,
    pub kind: DecisionKind,
    pub priority: Priority,
    /// 0-100.
    pub confidence: u32,
    /// Signed point effect: applied delta for adjustments, spread reduction otherwise.
    pub impact: i64,
    pub action: DecisionAction,
    pub reasoning: String,
}

/// Issues decision ids in emission order.
#[derive(Debug, Default)]
pub struct DecisionLog {
    decisions: Vec<Decision>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        priority: Priority,
        confidence: u32,
        impact: i64,
        action: DecisionAction,
        reasoning: String,
    ) -> String {
        let id = format!("D{:03}", self.decisions.len() + 1);
        let kind = match &action {
            DecisionAction::PlayerAdjustment { .. } => DecisionKind::PlayerAdjustment,
            DecisionAction::TeamRedistribution { .. } => DecisionKind::TeamRedistribution,
            DecisionAction::PlayerSwap { .. } => DecisionKind::PlayerSwap,
            DecisionAction::NoAction { .. } => DecisionKind::NoAction,
        };
        self.decisions.push(Decision {
            id: id.clone(),
            kind,
            priority,
            confidence,
            impact,
            action,
            reasoning,
        });
        id
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn ids_of(&self, kind: DecisionKind) -> Vec<String> {
        self.decisions
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn into_inner(self) -> Vec<Decision> {
        self.decisions
    }

    pub fn as_slice(&self) -> &[Decision] {
        &self.decisions
    }
}

// ---------------------------------------------------------------------------
// Execution plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    Adjustments,
    CriticalRedistributions,
    Swaps,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub order: usize,
    pub phase: PlanPhase,
    pub decision_ids: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub steps: Vec<ExecutionStep>,
    pub validation: Vec<ValidationCheck>,
}

impl ExecutionPlan {
    /// Group decisions by phase in application order. Empty phases are
    /// skipped; validation is always the last step.
    pub fn build(log: &DecisionLog, validation: Vec<ValidationCheck>) -> Self {
        let phases = [
            (PlanPhase::Adjustments, DecisionKind::PlayerAdjustment, "Apply player weight adjustments"),
            (
                PlanPhase::CriticalRedistributions,
                DecisionKind::TeamRedistribution,
                "Move stacked elite players to elite-free teams",
            ),
            (PlanPhase::Swaps, DecisionKind::PlayerSwap, "Apply balancing swaps in pass order"),
        ];
        let mut steps = Vec::new();
        for (phase, kind, description) in phases {
            let ids = log.ids_of(kind);
            if ids.is_empty() {
                continue;
            }
            steps.push(ExecutionStep {
                order: steps.len() + 1,
                phase,
                description: format!("{description} ({})", ids.len()),
                decision_ids: ids,
            });
        }
        let passed = validation.iter().filter(|c| c.passed).count();
        steps.push(ExecutionStep {
            order: steps.len() + 1,
            phase: PlanPhase::Validation,
            decision_ids: Vec::new(),
            description: format!("Validate final teams: {passed}/{} checks passed", validation.len()),
        });
        ExecutionPlan { steps, validation }
    }

    pub fn all_checks_passed(&self) -> bool {
        self.validation.iter().all(|c| c.passed)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub players_analyzed: usize,
    pub players_adjusted: usize,
    pub redistributions: usize,
    pub swaps: usize,
    pub total_expected_improvement: i64,
    /// Mean confidence over actionable decisions; 0 when there are none.
    pub mean_confidence: f64,
}

impl RunSummary {
    pub fn from_decisions(players_analyzed: usize, decisions: &[Decision]) -> Self {
        let count = |k: DecisionKind| decisions.iter().filter(|d| d.kind == k).count();
        let actionable: Vec<&Decision> = decisions
            .iter()
            .filter(|d| d.kind != DecisionKind::NoAction)
            .collect();
        let mean_confidence = if actionable.is_empty() {
            0.0
        } else {
            actionable.iter().map(|d| d.confidence as f64).sum::<f64>() / actionable.len() as f64
        };
        RunSummary {
            players_analyzed,
            players_adjusted: count(DecisionKind::PlayerAdjustment),
            redistributions: count(DecisionKind::TeamRedistribution),
            swaps: count(DecisionKind::PlayerSwap),
            total_expected_improvement: decisions
                .iter()
                .filter(|d| matches!(d.kind, DecisionKind::TeamRedistribution | DecisionKind::PlayerSwap))
                .map(|d| d.impact)
                .sum(),
            mean_confidence,
        }
    }
}
