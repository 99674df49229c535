// The run report and its stored, versioned form.
//
// Stored reports are either the current `{ "version": 2, "report": ... }`
// envelope or the legacy unversioned team list. Decoding looks at the version
// field once; `migrate` lifts a legacy report into the current shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::composition::{analyze_composition, BalanceAnalysis};
use crate::analysis::player::PlayerAnalysis;
use crate::audit::AuditEntry;
use crate::config::BalanceConfig;
use crate::decision::{Decision, ExecutionPlan, RunSummary};
use crate::distribution::{ExcludedPlayer, PlacementStep};
use crate::redistribute::Redistribution;
use crate::swap::{SwapAnalysis, SwapFinalOutcome};
use crate::team::{spread, Team, TeamMember};

pub const CURRENT_REPORT_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to decode stored report: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported report version {0}")]
    UnsupportedVersion(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub teams: Vec<Team>,
    pub balance_analysis: BalanceAnalysis,
    /// Composition right after distribution, before any corrective move.
    pub initial_balance: Option<BalanceAnalysis>,
    pub player_analyses: Vec<PlayerAnalysis>,
    pub decisions: Vec<Decision>,
    pub execution_plan: ExecutionPlan,
    pub swap_analysis: SwapAnalysis,
    pub redistributions: Vec<Redistribution>,
    pub summary: RunSummary,
    pub excluded: Vec<ExcludedPlayer>,
    pub placement_ledger: Vec<PlacementStep>,
    pub audit: Vec<AuditEntry>,
    /// Caller-level remarks, such as an evidence fallback.
    pub notes: Vec<String>,
}

impl BalanceReport {
    /// Team-ordered player ids, the shape accepted back as an existing assignment.
    pub fn assignment(&self) -> Vec<Vec<String>> {
        self.teams
            .iter()
            .map(|t| t.players.iter().map(|m| m.player_id.clone()).collect())
            .collect()
    }

    /// Serialize in the current stored format.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        let envelope = EnvelopeRef {
            version: CURRENT_REPORT_VERSION,
            report: self,
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }
}

// ---------------------------------------------------------------------------
// Legacy format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPlayer {
    pub id: String,
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTeam {
    pub name: String,
    pub players: Vec<LegacyPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyReport {
    pub teams: Vec<LegacyTeam>,
    #[serde(default)]
    pub spread: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    report: BalanceReport,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    report: &'a BalanceReport,
}

// ---------------------------------------------------------------------------
// Stored report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StoredReport {
    V1(LegacyReport),
    V2(BalanceReport),
}

impl StoredReport {
    pub fn from_json(text: &str) -> Result<Self, ReportError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("version").map(|v| v.as_u64()) {
            None => Ok(StoredReport::V1(serde_json::from_value(value)?)),
            Some(Some(2)) => {
                let envelope: Envelope = serde_json::from_value(value)?;
                Ok(StoredReport::V2(envelope.report))
            }
            Some(Some(n)) => Err(ReportError::UnsupportedVersion(n)),
            Some(None) => Err(ReportError::UnsupportedVersion(0)),
        }
    }

    /// Serialize in the current format. Legacy reports are migrated first.
    pub fn to_json_pretty(self, config: &BalanceConfig) -> Result<String, ReportError> {
        self.migrate(config).to_json_pretty()
    }

    pub fn version(&self) -> u32 {
        match self {
            StoredReport::V1(_) => 1,
            StoredReport::V2(_) => CURRENT_REPORT_VERSION,
        }
    }

    /// Lift any stored report to the current shape. Legacy teams are rebuilt
    /// with elite flags from `config` and composition is re-run; there are no
    /// decisions to recover.
    pub fn migrate(self, config: &BalanceConfig) -> BalanceReport {
        let legacy = match self {
            StoredReport::V2(report) => return report,
            StoredReport::V1(legacy) => legacy,
        };

        let teams: Vec<Team> = legacy
            .teams
            .iter()
            .enumerate()
            .map(|(i, lt)| {
                let mut team = Team::new(i + 1);
                team.name = lt.name.clone();
                for p in &lt.players {
                    team.add(TeamMember {
                        player_id: p.id.clone(),
                        display_name: p.name.clone(),
                        points: p.points,
                        is_elite: p.points >= config.thresholds.elite,
                    });
                }
                team
            })
            .collect();

        let current_spread = spread(&teams);
        let mut notes = vec!["Migrated from version 1 report".to_string()];
        if let Some(stored) = legacy.spread.filter(|&s| s != current_spread) {
            notes.push(format!(
                "Stored spread {stored} differs from recomputed {current_spread}"
            ));
        }

        BalanceReport {
            balance_analysis: analyze_composition(&teams, &config.thresholds),
            initial_balance: None,
            player_analyses: Vec::new(),
            decisions: Vec::new(),
            execution_plan: ExecutionPlan::default(),
            swap_analysis: SwapAnalysis {
                initial_spread: current_spread,
                final_spread: current_spread,
                passes: 0,
                executed_count: 0,
                final_outcome: SwapFinalOutcome::NotNeeded,
                attempts: Vec::new(),
            },
            redistributions: Vec::new(),
            summary: RunSummary {
                players_analyzed: teams.iter().map(Team::len).sum(),
                ..RunSummary::default()
            },
            excluded: Vec::new(),
            placement_ledger: Vec::new(),
            audit: Vec::new(),
            notes,
            teams,
        }
    }
}
