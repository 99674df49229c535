// Player file import: JSON exports and CSV sheets into canonical records.
//
// JSON goes straight through `RawPlayerRecord`. CSV cells are read as text
// first so one bad number drops that cell with a warning instead of failing
// the whole sheet.

use std::path::Path;

use atlas_core::player::{normalize_all, NormalizeError, PlayerRecord, RawPlayerRecord};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid player JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid player CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFormat {
    Json,
    Csv,
}

impl PlayerFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(PlayerFormat::Json),
            "csv" => Some(PlayerFormat::Csv),
            _ => None,
        }
    }
}

/// Canonical players in file order, plus every value that was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct Imported {
    pub players: Vec<PlayerRecord>,
    pub warnings: Vec<String>,
}

pub fn import(text: &str, format: PlayerFormat) -> Result<Imported, ImportError> {
    let (raw, mut warnings) = match format {
        PlayerFormat::Json => (parse_json(text)?, Vec::new()),
        PlayerFormat::Csv => parse_csv(text)?,
    };

    let mut players = Vec::with_capacity(raw.len());
    for normalized in normalize_all(raw)? {
        let id = &normalized.record.id;
        warnings.extend(normalized.warnings.iter().map(|w| format!("player {id}: {w}")));
        players.push(normalized.record);
    }
    Ok(Imported { players, warnings })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum PlayerFile {
    List(Vec<RawPlayerRecord>),
    Wrapped { players: Vec<RawPlayerRecord> },
}

/// Accepts a bare array or an object with a `players` array.
pub fn parse_json(text: &str) -> Result<Vec<RawPlayerRecord>, ImportError> {
    Ok(match serde_json::from_str(text)? {
        PlayerFile::List(players) | PlayerFile::Wrapped { players } => players,
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(alias = "player_id", alias = "playerId", alias = "discord_id")]
    id: Option<String>,
    #[serde(alias = "name", alias = "username", alias = "displayName", alias = "ign")]
    display_name: Option<String>,
    #[serde(alias = "rank", alias = "currentRank")]
    current_rank: Option<String>,
    #[serde(alias = "peak", alias = "highest_rank", alias = "peakRank")]
    peak_rank: Option<String>,
    override_weight: Option<String>,
    override_rank: Option<String>,
    override_reason: Option<String>,
    #[serde(alias = "tournament_wins")]
    tournaments_won: Option<String>,
    #[serde(alias = "last_tournament_win")]
    last_tournament_win_at: Option<String>,
    #[serde(alias = "tournaments")]
    tournaments_played: Option<String>,
    wins: Option<String>,
    losses: Option<String>,
    #[serde(alias = "rank_updated_at")]
    last_rank_update_at: Option<String>,
}

fn text(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn count(row: usize, field: &str, cell: Option<String>, warnings: &mut Vec<String>) -> Option<u32> {
    let cell = text(cell)?;
    match cell.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warnings.push(format!("row {row}: ignored non-numeric {field} `{cell}`"));
            None
        }
    }
}

impl CsvRow {
    fn into_raw(self, row: usize, warnings: &mut Vec<String>) -> RawPlayerRecord {
        RawPlayerRecord {
            id: text(self.id),
            display_name: text(self.display_name),
            current_rank: text(self.current_rank),
            peak_rank: text(self.peak_rank),
            manual_override: None,
            override_weight: count(row, "override_weight", self.override_weight, warnings),
            override_rank: text(self.override_rank),
            override_reason: text(self.override_reason),
            tournaments_won: count(row, "tournaments_won", self.tournaments_won, warnings),
            last_tournament_win_at: text(self.last_tournament_win_at),
            tournaments_played: count(row, "tournaments_played", self.tournaments_played, warnings),
            wins: count(row, "wins", self.wins, warnings),
            losses: count(row, "losses", self.losses, warnings),
            last_rank_update_at: text(self.last_rank_update_at),
        }
    }
}

/// Parse a headed CSV sheet. Row numbers in warnings are 1-based data rows.
pub fn parse_csv(text: &str) -> Result<(Vec<RawPlayerRecord>, Vec<String>), ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut warnings = Vec::new();
    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        out.push(row?.into_raw(i + 1, &mut warnings));
    }
    Ok((out, warnings))
}
