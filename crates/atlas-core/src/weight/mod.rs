// Weight resolution: turns a player record into one effective skill weight
// with provenance.
//
// First-match chain: manual override -> evidence (when enabled) -> current
// rank -> peak rank -> default. Every branch ends at or above the floor.

pub mod evidence;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, Stage};
use crate::config::BalanceConfig;
use crate::player::PlayerRecord;
use crate::rank::RankEntry;

/// Which rule produced a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    ManualOverride,
    EvidenceBased,
    CurrentRank,
    PeakRank,
    Default,
}

impl WeightSource {
    pub fn label(&self) -> &'static str {
        match self {
            WeightSource::ManualOverride => "manual_override",
            WeightSource::EvidenceBased => "evidence_based",
            WeightSource::CurrentRank => "current_rank",
            WeightSource::PeakRank => "peak_rank",
            WeightSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightResult {
    pub player_id: String,
    pub points: u32,
    pub source: WeightSource,
    pub reasoning: Vec<String>,
    pub is_elite: bool,
}

/// Resolves weights for one run. Holds the run's config and reference time.
pub struct WeightResolver<'a> {
    config: &'a BalanceConfig,
    as_of: Option<DateTime<Utc>>,
}

impl<'a> WeightResolver<'a> {
    pub fn new(config: &'a BalanceConfig, as_of: Option<DateTime<Utc>>) -> Self {
        WeightResolver { config, as_of }
    }

    pub fn resolve(&self, player: &PlayerRecord, audit: &mut AuditLog) -> WeightResult {
        let (points, source, mut reasoning) = self.resolve_chain(player, audit);

        let floor = self.config.weighting.floor_points;
        let points = if points < floor {
            reasoning.push(format!("Raised to floor of {floor} pts"));
            floor
        } else {
            points
        };

        WeightResult {
            player_id: player.id.clone(),
            points,
            source,
            reasoning,
            is_elite: points >= self.config.thresholds.elite,
        }
    }

    fn resolve_chain(
        &self,
        player: &PlayerRecord,
        audit: &mut AuditLog,
    ) -> (u32, WeightSource, Vec<String>) {
        let default = self.config.weighting.default_points;

        if let Some(ov) = player.manual_override.as_ref().filter(|o| o.enabled) {
            let mut reasoning = Vec::new();
            let points = match (ov.weight, &ov.rank) {
                (Some(w), _) => {
                    reasoning.push(format!("Manual override: fixed weight {w} pts"));
                    w
                }
                (None, Some(RankEntry::Ranked(rank))) => {
                    reasoning.push(format!(
                        "Manual override: rank {rank} ({} pts)",
                        rank.points()
                    ));
                    rank.points()
                }
                (None, other) => {
                    if let Some(RankEntry::Unrecognized(raw)) = other {
                        audit.anomaly(
                            Stage::Weighting,
                            format!("{}: unrecognized override rank \"{raw}\"", player.id),
                        );
                    }
                    reasoning.push(format!(
                        "Manual override without usable weight or rank: default {default} pts"
                    ));
                    default
                }
            };
            if let Some(reason) = &ov.reason {
                reasoning.push(format!("Override reason: {reason}"));
            }
            return (points, WeightSource::ManualOverride, reasoning);
        }

        let mut reasoning = Vec::new();
        if self.config.weighting.mode.uses_evidence() {
            match evidence::evaluate(player, self.config, self.as_of) {
                Ok(w) => return (w.points, WeightSource::EvidenceBased, w.reasoning),
                Err(e) => {
                    audit.anomaly(
                        Stage::Weighting,
                        format!("{}: evidence weighting failed ({e}); using rank lookup", player.id),
                    );
                    reasoning.push(format!(
                        "Evidence-based weighting unavailable ({e}); fell back to rank lookup"
                    ));
                }
            }
        }

        match &player.current_rank {
            Some(RankEntry::Ranked(rank)) => {
                reasoning.push(format!("Current rank {rank} ({} pts)", rank.points()));
                return (rank.points(), WeightSource::CurrentRank, reasoning);
            }
            Some(RankEntry::Unrecognized(raw)) => {
                return self.resolution_failure(player, "current rank", raw, reasoning, audit);
            }
            Some(RankEntry::Unranked) | None => {}
        }

        let current_label = match player.current_rank {
            Some(RankEntry::Unranked) => "Unranked",
            _ => "not on record",
        };
        match &player.peak_rank {
            Some(RankEntry::Ranked(rank)) => {
                reasoning.push(format!(
                    "Current rank {current_label}; peak rank {rank} ({} pts)",
                    rank.points()
                ));
                (rank.points(), WeightSource::PeakRank, reasoning)
            }
            Some(RankEntry::Unrecognized(raw)) => {
                self.resolution_failure(player, "peak rank", raw, reasoning, audit)
            }
            Some(RankEntry::Unranked) | None => {
                reasoning.push(format!(
                    "No usable rank data (current {current_label}, no peak); default {default} pts"
                ));
                (default, WeightSource::Default, reasoning)
            }
        }
    }

    fn resolution_failure(
        &self,
        player: &PlayerRecord,
        field: &str,
        raw: &str,
        mut reasoning: Vec<String>,
        audit: &mut AuditLog,
    ) -> (u32, WeightSource, Vec<String>) {
        let default = self.config.weighting.default_points;
        audit.anomaly(
            Stage::Weighting,
            format!("{}: unrecognized {field} \"{raw}\"; default weight applied", player.id),
        );
        reasoning.push(format!(
            "Unrecognized {field} \"{raw}\"; default weight {default} pts applied"
        ));
        (default, WeightSource::Default, reasoning)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
