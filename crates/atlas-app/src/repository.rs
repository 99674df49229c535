// Tournament storage. The engine never touches storage; the runner reads
// players and writes results through this trait.
//
// File layout under the repository root:
//   players/<tournament>.json | players/<tournament>.csv
//   teams/<tournament>.json
//   reports/<tournament>.json

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use atlas_core::report::ReportError;
use atlas_core::team::Team;
use atlas_core::{BalanceReport, StoredReport};
use thiserror::Error;
use tracing::{debug, info};

use crate::import::{import, ImportError, Imported, PlayerFormat};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid tournament id `{0}`")]
    InvalidId(String),
    #[error("no player file for tournament `{0}`")]
    PlayersNotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to import {path}: {source}")]
    Import { path: PathBuf, source: ImportError },
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to encode teams: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_players(&self, tournament_id: &str) -> Result<Imported, RepositoryError>;
    async fn save_teams(&self, tournament_id: &str, teams: &[Team]) -> Result<(), RepositoryError>;
    async fn save_report(&self, tournament_id: &str, report: &BalanceReport) -> Result<(), RepositoryError>;
    /// The last stored report, in whatever version it was written. `None` if absent.
    async fn load_report(&self, tournament_id: &str) -> Result<Option<StoredReport>, RepositoryError>;
}

/// Rejects ids that would escape the repository root or name a directory.
fn check_id(tournament_id: &str) -> Result<(), RepositoryError> {
    let bad = tournament_id.trim().is_empty()
        || tournament_id.contains(['/', '\\'])
        || tournament_id.contains("..");
    if bad {
        return Err(RepositoryError::InvalidId(tournament_id.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileRepository { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, dir: &str, tournament_id: &str, ext: &str) -> PathBuf {
        self.root.join(dir).join(format!("{tournament_id}.{ext}"))
    }

    async fn write(&self, path: PathBuf, contents: String) -> Result<(), RepositoryError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RepositoryError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| RepositoryError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, RepositoryError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RepositoryError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait]
impl Repository for FileRepository {
    async fn get_players(&self, tournament_id: &str) -> Result<Imported, RepositoryError> {
        check_id(tournament_id)?;
        for ext in ["json", "csv"] {
            let path = self.path("players", tournament_id, ext);
            let Some(text) = Self::read_optional(&path).await? else {
                continue;
            };
            let format = PlayerFormat::from_path(&path).unwrap_or(PlayerFormat::Json);
            let imported = import(&text, format).map_err(|source| RepositoryError::Import {
                path: path.clone(),
                source,
            })?;
            info!(
                "Loaded {} players from {} ({} warnings)",
                imported.players.len(),
                path.display(),
                imported.warnings.len()
            );
            return Ok(imported);
        }
        Err(RepositoryError::PlayersNotFound(tournament_id.to_string()))
    }

    async fn save_teams(&self, tournament_id: &str, teams: &[Team]) -> Result<(), RepositoryError> {
        check_id(tournament_id)?;
        let json = serde_json::to_string_pretty(teams)?;
        self.write(self.path("teams", tournament_id, "json"), json).await
    }

    async fn save_report(&self, tournament_id: &str, report: &BalanceReport) -> Result<(), RepositoryError> {
        check_id(tournament_id)?;
        let json = report.to_json_pretty()?;
        self.write(self.path("reports", tournament_id, "json"), json).await
    }

    async fn load_report(&self, tournament_id: &str) -> Result<Option<StoredReport>, RepositoryError> {
        check_id(tournament_id)?;
        let path = self.path("reports", tournament_id, "json");
        match Self::read_optional(&path).await? {
            Some(text) => Ok(Some(StoredReport::from_json(&text)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_that_escape_the_root_are_rejected() {
        for id in ["", "  ", "../etc", "a/b", "a\\b", ".."] {
            assert!(check_id(id).is_err(), "{id:?} should be rejected");
        }
        for id in ["spring-cup", "cup_2026", "weekly.7"] {
            assert!(check_id(id).is_ok(), "{id:?} should be accepted");
        }
    }

    #[test]
    fn paths_follow_layout() {
        let repo = FileRepository::new("/data");
        assert_eq!(
            repo.path("reports", "cup", "json"),
            PathBuf::from("/data/reports/cup.json")
        );
    }
}
