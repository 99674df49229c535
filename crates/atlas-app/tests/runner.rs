use std::path::PathBuf;

use async_trait::async_trait;
use atlas_app::config::AppConfig;
use atlas_app::evidence::{EvidenceProvider, EvidenceSource, PlayerEvidence, ProviderError};
use atlas_app::repository::{FileRepository, Repository, RepositoryError};
use atlas_app::runner::Runner;
use atlas_core::config::WeightingMode;
use atlas_core::weight::WeightSource;
use atlas_core::StoredReport;
use chrono::{TimeZone, Utc};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PLAYERS: &str = r#"[
    {"id": "r1", "name": "Returner", "peak": "Radiant", "tournaments_won": 1},
    {"id": "g1", "name": "Gold One", "rank": "Gold 1"},
    {"id": "g2", "name": "Gold Two", "rank": "Gold 2"},
    {"id": "p1", "name": "Plat One", "rank": "Platinum 1"},
    {"id": "d1", "name": "Diamond One", "rank": "Diamond 1"},
    {"id": "s1", "name": "Silver One", "rank": "Silver 3"}
]"#;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("atlas_app_test_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("players")).unwrap();
    dir
}

fn seed_players(root: &PathBuf, tournament: &str, contents: &str, ext: &str) {
    std::fs::write(root.join("players").join(format!("{tournament}.{ext}")), contents).unwrap();
}

fn app_config(root: &PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = root.clone();
    config.balance.teams.count = 2;
    config.balance.teams.capacity = 3;
    config.balance.weighting.mode = WeightingMode::EvidenceBased;
    config.run.evidence_timeout_ms = 50;
    config
}

fn as_of() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

struct PendingProvider;

#[async_trait]
impl EvidenceProvider for PendingProvider {
    async fn fetch(&self, _tournament_id: &str) -> Result<Vec<PlayerEvidence>, ProviderError> {
        std::future::pending().await
    }
}

struct FailingProvider;

#[async_trait]
impl EvidenceProvider for FailingProvider {
    async fn fetch(&self, _tournament_id: &str) -> Result<Vec<PlayerEvidence>, ProviderError> {
        Err(ProviderError::Unavailable("stats service down".into()))
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_persists_teams_and_current_report() {
    let root = scratch("persist");
    seed_players(&root, "cup", PLAYERS, "json");
    let runner = Runner::new(FileRepository::new(&root), EvidenceSource::Disabled, app_config(&root));

    let report = runner.run("cup", as_of()).await.unwrap();

    assert_eq!(report.teams.len(), 2);
    assert!(report.teams.iter().all(|t| t.len() == 3));
    assert!(report.notes.is_empty());
    assert!(root.join("teams/cup.json").exists());
    assert!(report
        .player_analyses
        .iter()
        .all(|a| !a.weight.reasoning[0].starts_with("External evidence")));

    let stored = runner.repository().load_report("cup").await.unwrap().unwrap();
    assert_eq!(stored.version(), 2);
    match stored {
        StoredReport::V2(back) => assert_eq!(back.assignment(), report.assignment()),
        other => panic!("expected current report, got version {}", other.version()),
    }
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn evidence_timeout_falls_back_to_standard_weighting() {
    let root = scratch("timeout");
    seed_players(&root, "cup", PLAYERS, "json");
    let evidence = EvidenceSource::Active(Box::new(PendingProvider));
    let runner = Runner::new(FileRepository::new(&root), evidence, app_config(&root));

    let report = runner.run("cup", as_of()).await.unwrap();

    assert_eq!(report.notes.len(), 1);
    assert!(report.notes[0].contains("timed out"));
    assert!(report.notes[0].contains("standard"));
    // Standard weighting: no current rank, so the Radiant peak is used as-is.
    let returner = &report.player_analyses[0].weight;
    assert_eq!(returner.source, WeightSource::PeakRank);
    for analysis in &report.player_analyses {
        let first = &analysis.weight.reasoning[0];
        assert!(first.starts_with("External evidence unavailable"), "{first}");
        assert!(first.contains("timed out"));
    }
    assert!(report.audit.iter().any(|e| e.message.contains("timed out")));
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn evidence_failure_is_noted_not_fatal() {
    let root = scratch("failing");
    seed_players(&root, "cup", PLAYERS, "json");
    let evidence = EvidenceSource::Active(Box::new(FailingProvider));
    let runner = Runner::new(FileRepository::new(&root), evidence, app_config(&root));

    let report = runner.run("cup", as_of()).await.unwrap();

    assert_eq!(report.notes.len(), 1);
    assert!(report.notes[0].contains("stats service down"));
    assert!(report
        .player_analyses
        .iter()
        .all(|a| a.weight.reasoning[0].contains("stats service down")));
    assert_eq!(report.teams.iter().map(|t| t.len()).sum::<usize>(), 6);
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn file_evidence_is_merged_before_weighting() {
    let root = scratch("evidence");
    seed_players(&root, "cup", PLAYERS, "json");
    std::fs::create_dir_all(root.join("evidence")).unwrap();
    std::fs::write(
        root.join("evidence/cup.json"),
        r#"[{"id": "g1", "peakRank": "Immortal 1", "wins": 30, "losses": 10}, {"id": "nobody"}]"#,
    )
    .unwrap();
    let mut config = app_config(&root);
    config.run.evidence_enabled = true;
    let evidence = EvidenceSource::from_config(true, &root);
    let runner = Runner::new(FileRepository::new(&root), evidence, config);

    let report = runner.run("cup", as_of()).await.unwrap();

    assert!(report.notes.is_empty(), "{:?}", report.notes);
    let g1 = &report.player_analyses[1].weight;
    assert_eq!(g1.source, WeightSource::EvidenceBased);
    assert!(report.audit.iter().any(|e| e.message.contains("nobody")));
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn csv_warnings_reach_the_audit_trail() {
    let root = scratch("csv");
    seed_players(
        &root,
        "cup",
        "id,name,rank,wins\na,Ann,Gold 1,many\nb,Bo,Gold 2,4\n",
        "csv",
    );
    let runner = Runner::new(FileRepository::new(&root), EvidenceSource::Disabled, app_config(&root));

    let report = runner.run("cup", as_of()).await.unwrap();

    assert!(report
        .audit
        .iter()
        .any(|e| e.message.contains("non-numeric wins")));
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn rebalance_starts_from_legacy_report() {
    let root = scratch("legacy");
    seed_players(&root, "cup", PLAYERS, "json");
    std::fs::create_dir_all(root.join("reports")).unwrap();
    std::fs::write(
        root.join("reports/cup.json"),
        r#"{"teams": [
            {"name": "Alpha", "players": [{"id": "g1", "name": "Gold One", "points": 190}, {"id": "gone", "name": "Gone", "points": 200}]},
            {"name": "Bravo", "players": [{"id": "g2", "name": "Gold Two", "points": 195}]}
        ]}"#,
    )
    .unwrap();
    let mut config = app_config(&root);
    config.run.rebalance = true;
    let runner = Runner::new(FileRepository::new(&root), EvidenceSource::Disabled, config);

    let report = runner.run("cup", as_of()).await.unwrap();

    assert!(report
        .audit
        .iter()
        .any(|e| e.message.contains("version 1") && e.message.contains("1 stale")));
    assert_eq!(report.teams.iter().map(|t| t.len()).sum::<usize>(), 6);
    // The rewritten report is in the current format.
    let stored = runner.repository().load_report("cup").await.unwrap().unwrap();
    assert_eq!(stored.version(), 2);
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn missing_players_and_bad_ids_are_errors() {
    let root = scratch("missing");
    let repo = FileRepository::new(&root);

    assert!(matches!(
        repo.get_players("absent").await,
        Err(RepositoryError::PlayersNotFound(_))
    ));
    assert!(matches!(
        repo.get_players("../escape").await,
        Err(RepositoryError::InvalidId(_))
    ));

    let runner = Runner::new(repo, EvidenceSource::Disabled, app_config(&root));
    assert!(runner.run("absent", as_of()).await.is_err());
    let _ = std::fs::remove_dir_all(&root);
}
