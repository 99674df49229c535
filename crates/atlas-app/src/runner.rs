// One balancing run for a tournament: load players, fold in evidence, run
// the engine, persist teams and the versioned report.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use atlas_core::audit::{AuditLog, Stage};
use atlas_core::config::WeightingMode;
use atlas_core::player::PlayerRecord;
use atlas_core::{BalanceInput, BalanceReport};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::evidence::{merge_evidence, EvidenceSource};
use crate::repository::Repository;

pub struct Runner<R> {
    repo: R,
    evidence: EvidenceSource,
    config: AppConfig,
}

impl<R: Repository> Runner<R> {
    pub fn new(repo: R, evidence: EvidenceSource, config: AppConfig) -> Self {
        Runner {
            repo,
            evidence,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn run(&self, tournament_id: &str, as_of: DateTime<Utc>) -> anyhow::Result<BalanceReport> {
        let imported = self
            .repo
            .get_players(tournament_id)
            .await
            .with_context(|| format!("loading players for `{tournament_id}`"))?;

        let mut audit = AuditLog::new();
        for w in &imported.warnings {
            audit.anomaly(Stage::Ingestion, w.clone());
        }

        let mut players = imported.players;
        let mut balance = self.config.balance.clone();
        let mut notes = Vec::new();

        let fallback = self.apply_evidence(tournament_id, &mut players, &mut audit).await;
        if let Some(reason) = &fallback {
            if balance.weighting.mode.uses_evidence() {
                balance.weighting.mode = WeightingMode::Standard;
                notes.push(format!("{reason}; weighting fell back to standard mode"));
            } else {
                notes.push(reason.clone());
            }
        }

        let existing_assignment = if self.config.run.rebalance {
            self.previous_assignment(tournament_id, &players, &mut audit).await?
        } else {
            None
        };

        let input = BalanceInput {
            players,
            config: balance,
            as_of: Some(as_of),
            existing_assignment,
        };
        let mut report = atlas_core::run(&input, audit).context("balancing failed")?;
        report.notes.extend(notes);
        if let Some(reason) = &fallback {
            let line =
                format!("External evidence unavailable ({reason}); weighted from player record only");
            for analysis in &mut report.player_analyses {
                analysis.weight.reasoning.insert(0, line.clone());
            }
        }

        self.repo
            .save_teams(tournament_id, &report.teams)
            .await
            .context("saving teams")?;
        self.repo
            .save_report(tournament_id, &report)
            .await
            .context("saving report")?;

        info!(
            "Balanced `{}`: {} teams, spread {} ({:?}), {} decisions, {} excluded",
            tournament_id,
            report.teams.len(),
            report.balance_analysis.global.spread,
            report.balance_analysis.global.quality_tier,
            report.decisions.len(),
            report.excluded.len()
        );
        Ok(report)
    }

    /// Fetch evidence under the configured timeout and merge it. Returns a
    /// note when an active provider failed or timed out.
    async fn apply_evidence(
        &self,
        tournament_id: &str,
        players: &mut [PlayerRecord],
        audit: &mut AuditLog,
    ) -> Option<String> {
        let limit = Duration::from_millis(self.config.run.evidence_timeout_ms);
        let reason = match tokio::time::timeout(limit, self.evidence.fetch(tournament_id)).await {
            Ok(Ok(None)) => return None,
            Ok(Ok(Some(evidence))) => {
                let count = evidence.len();
                for w in merge_evidence(players, evidence) {
                    audit.anomaly(Stage::Ingestion, w);
                }
                audit.info(Stage::Ingestion, format!("Merged evidence for {count} players"));
                return None;
            }
            Ok(Err(e)) => format!("Evidence provider failed ({e})"),
            Err(_) => format!("Evidence provider timed out after {}ms", limit.as_millis()),
        };
        warn!("{reason}");
        audit.anomaly(Stage::Ingestion, reason.clone());
        Some(reason)
    }

    /// The stored assignment, pruned to players still registered. `None`
    /// when nothing is stored or the team count has changed.
    async fn previous_assignment(
        &self,
        tournament_id: &str,
        players: &[PlayerRecord],
        audit: &mut AuditLog,
    ) -> anyhow::Result<Option<Vec<Vec<String>>>> {
        let Some(stored) = self
            .repo
            .load_report(tournament_id)
            .await
            .context("loading previous report")?
        else {
            audit.info(Stage::Ingestion, "No previous report; drafting fresh teams");
            return Ok(None);
        };

        let version = stored.version();
        let assignment = stored.migrate(&self.config.balance).assignment();
        if assignment.len() != self.config.balance.teams.count {
            audit.anomaly(
                Stage::Ingestion,
                format!(
                    "Previous report has {} teams, configured for {}; drafting fresh teams",
                    assignment.len(),
                    self.config.balance.teams.count
                ),
            );
            return Ok(None);
        }

        let known: BTreeSet<&str> = players.iter().map(|p| p.id.as_str()).collect();
        let capacity = self.config.balance.teams.capacity;
        let mut dropped = 0;
        let pruned: Vec<Vec<String>> = assignment
            .into_iter()
            .map(|team| {
                let before = team.len();
                let kept: Vec<String> = team
                    .into_iter()
                    .filter(|id| known.contains(id.as_str()))
                    .take(capacity)
                    .collect();
                dropped += before - kept.len();
                kept
            })
            .collect();

        audit.info(
            Stage::Ingestion,
            format!("Rebalancing from version {version} report ({dropped} stale seats dropped)"),
        );
        Ok(Some(pruned))
    }
}
