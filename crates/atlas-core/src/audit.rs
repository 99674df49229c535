// Per-run audit collector.
//
// Every stage writes its noteworthy events here in addition to `tracing`, so
// the report carries its own explanation and runs never share logger state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pipeline stage that produced an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingestion,
    Weighting,
    Analysis,
    Distribution,
    Composition,
    Redistribution,
    SwapSearch,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    Info,
    Anomaly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: usize,
    pub stage: Stage,
    pub level: AuditLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        debug!(?stage, "{message}");
        self.push(stage, AuditLevel::Info, message);
    }

    /// Record something unexpected in the input that was degraded around.
    pub fn anomaly(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        warn!(?stage, "{message}");
        self.push(stage, AuditLevel::Anomaly, message);
    }

    /// A stage boundary worth seeing at info level in the log file.
    pub fn milestone(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        info!(?stage, "{message}");
        self.push(stage, AuditLevel::Info, message);
    }

    fn push(&mut self, stage: Stage, level: AuditLevel, message: String) {
        self.entries.push(AuditEntry {
            seq: self.entries.len() + 1,
            stage,
            level,
            message,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.level == AuditLevel::Anomaly)
    }

    pub fn into_entries(self) -> Vec<AuditEntry> {
        self.entries
    }
}
