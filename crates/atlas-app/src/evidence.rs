// External performance evidence: match and tournament history that may be
// fresher than what the player file carries.

use std::path::PathBuf;

use async_trait::async_trait;
use atlas_core::player::{parse_timestamp, PlayerRecord};
use atlas_core::rank::RankEntry;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("evidence unavailable: {0}")]
    Unavailable(String),
    #[error("invalid evidence data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Evidence for one player. Absent fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerEvidence {
    #[serde(alias = "id", alias = "playerId")]
    pub player_id: String,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    #[serde(alias = "tournamentsWon")]
    pub tournaments_won: Option<u32>,
    #[serde(alias = "tournamentsPlayed")]
    pub tournaments_played: Option<u32>,
    #[serde(alias = "lastTournamentWinAt")]
    pub last_tournament_win_at: Option<String>,
    #[serde(alias = "peakRank")]
    pub peak_rank: Option<String>,
    #[serde(alias = "lastRankUpdateAt")]
    pub last_rank_update_at: Option<String>,
}

#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    async fn fetch(&self, tournament_id: &str) -> Result<Vec<PlayerEvidence>, ProviderError>;
}

/// Reads `evidence/<tournament>.json` under the repository root.
#[derive(Debug, Clone)]
pub struct FileEvidenceProvider {
    dir: PathBuf,
}

impl FileEvidenceProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FileEvidenceProvider {
            dir: data_dir.into().join("evidence"),
        }
    }
}

#[async_trait]
impl EvidenceProvider for FileEvidenceProvider {
    async fn fetch(&self, tournament_id: &str) -> Result<Vec<PlayerEvidence>, ProviderError> {
        let path = self.dir.join(format!("{tournament_id}.json"));
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{}: {e}", path.display())))?;
        let evidence: Vec<PlayerEvidence> = serde_json::from_str(&text)?;
        debug!("read evidence for {} players from {}", evidence.len(), path.display());
        Ok(evidence)
    }
}

/// Evidence source selected from configuration.
pub enum EvidenceSource {
    Active(Box<dyn EvidenceProvider>),
    /// Evidence is switched off; players are weighted from their own records.
    Disabled,
}

impl EvidenceSource {
    pub fn from_config(enabled: bool, data_dir: impl Into<PathBuf>) -> Self {
        if enabled {
            EvidenceSource::Active(Box::new(FileEvidenceProvider::new(data_dir)))
        } else {
            EvidenceSource::Disabled
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EvidenceSource::Active(_))
    }

    /// `Ok(None)` when disabled.
    pub async fn fetch(&self, tournament_id: &str) -> Result<Option<Vec<PlayerEvidence>>, ProviderError> {
        match self {
            EvidenceSource::Active(provider) => provider.fetch(tournament_id).await.map(Some),
            EvidenceSource::Disabled => Ok(None),
        }
    }
}

/// Fold evidence into the matching records. Counts replace the record's
/// values; a peak only replaces a lower or missing one. Returns warnings for
/// evidence that could not be applied.
pub fn merge_evidence(players: &mut [PlayerRecord], evidence: Vec<PlayerEvidence>) -> Vec<String> {
    let mut warnings = Vec::new();
    for ev in evidence {
        let Some(player) = players.iter_mut().find(|p| p.id == ev.player_id) else {
            warnings.push(format!("evidence for unknown player `{}` ignored", ev.player_id));
            continue;
        };

        if let Some(wins) = ev.wins {
            player.wins = wins;
        }
        if let Some(losses) = ev.losses {
            player.losses = losses;
        }
        if let Some(won) = ev.tournaments_won {
            player.tournaments_won = won;
        }
        if let Some(played) = ev.tournaments_played {
            player.tournaments_played = played;
        }
        player.tournaments_played = player.tournaments_played.max(player.tournaments_won);

        let mut field_warnings = Vec::new();
        if let Some(ts) = parse_timestamp(
            "last_tournament_win_at",
            ev.last_tournament_win_at.as_deref(),
            &mut field_warnings,
        ) {
            player.last_tournament_win_at = Some(ts);
        }
        if let Some(ts) = parse_timestamp(
            "last_rank_update_at",
            ev.last_rank_update_at.as_deref(),
            &mut field_warnings,
        ) {
            player.last_rank_update_at = Some(ts);
        }

        if let Some(raw) = ev.peak_rank.as_deref() {
            if let Some(peak) = RankEntry::from_raw(raw) {
                match (peak.points(), player.peak_points()) {
                    (Some(new), Some(old)) if new <= old => {}
                    (Some(_), _) => player.peak_rank = Some(peak),
                    (None, _) => field_warnings.push(format!("ignored peak rank `{}`", raw.trim())),
                }
            }
        }

        warnings.extend(
            field_warnings
                .into_iter()
                .map(|w| format!("evidence for {}: {w}", player.id)),
        );
    }
    warnings
}
