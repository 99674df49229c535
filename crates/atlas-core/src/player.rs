// Player snapshot types and input normalization.
//
// Upstream data arrives in several shapes (bot exports, web forms, CSV
// sheets) with different names for the same field. `RawPlayerRecord` absorbs
// every known alias; `normalize` turns it into the canonical `PlayerRecord`
// once, so nothing downstream branches on field-name variants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::rank::RankEntry;

// ---------------------------------------------------------------------------
// Canonical schema
// ---------------------------------------------------------------------------

/// An operator-set weight that bypasses rank-based resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualOverride {
    pub rank: Option<RankEntry>,
    pub weight: Option<u32>,
    pub enabled: bool,
    pub reason: Option<String>,
}

/// Immutable per-run snapshot of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub display_name: String,
    pub current_rank: Option<RankEntry>,
    pub peak_rank: Option<RankEntry>,
    pub manual_override: Option<ManualOverride>,
    pub tournaments_won: u32,
    pub last_tournament_win_at: Option<DateTime<Utc>>,
    pub tournaments_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub last_rank_update_at: Option<DateTime<Utc>>,
}

impl PlayerRecord {
    /// A bare record with only identity set; used by importers and tests.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        PlayerRecord {
            id: id.into(),
            display_name: display_name.into(),
            current_rank: None,
            peak_rank: None,
            manual_override: None,
            tournaments_won: 0,
            last_tournament_win_at: None,
            tournaments_played: 0,
            wins: 0,
            losses: 0,
            last_rank_update_at: None,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Win rate in [0, 1], or `None` with no recorded games.
    pub fn win_rate(&self) -> Option<f64> {
        let games = self.wins as f64 + self.losses as f64;
        (games > 0.0).then(|| self.wins as f64 / games)
    }

    /// Tournament win rate in [0, 1], or `None` if no tournaments were played.
    pub fn tournament_win_rate(&self) -> Option<f64> {
        (self.tournaments_played > 0)
            .then(|| self.tournaments_won as f64 / self.tournaments_played as f64)
    }

    pub fn current_points(&self) -> Option<u32> {
        self.current_rank.as_ref().and_then(RankEntry::points)
    }

    pub fn peak_points(&self) -> Option<u32> {
        self.peak_rank.as_ref().and_then(RankEntry::points)
    }

    /// Whole days from `ts` to `as_of`, when both are known.
    pub fn days_between(ts: Option<DateTime<Utc>>, as_of: Option<DateTime<Utc>>) -> Option<i64> {
        match (ts, as_of) {
            (Some(ts), Some(as_of)) => Some((as_of - ts).num_days()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loose input schema
// ---------------------------------------------------------------------------

/// Raw player input as produced by any upstream source. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPlayerRecord {
    #[serde(alias = "player_id", alias = "playerId", alias = "discord_id", alias = "discordId")]
    pub id: Option<String>,
    #[serde(
        alias = "displayName",
        alias = "name",
        alias = "username",
        alias = "ign"
    )]
    pub display_name: Option<String>,
    #[serde(alias = "currentRank", alias = "rank")]
    pub current_rank: Option<String>,
    #[serde(alias = "peakRank", alias = "peak", alias = "highest_rank", alias = "highestRank")]
    pub peak_rank: Option<String>,
    #[serde(alias = "manualOverride", alias = "override")]
    pub manual_override: Option<RawManualOverride>,
    /// Flat override columns used by CSV sheets.
    #[serde(alias = "overrideWeight")]
    pub override_weight: Option<u32>,
    #[serde(alias = "overrideRank")]
    pub override_rank: Option<String>,
    #[serde(alias = "overrideReason")]
    pub override_reason: Option<String>,
    #[serde(alias = "tournamentsWon", alias = "tournament_wins", alias = "tournamentWins")]
    pub tournaments_won: Option<u32>,
    #[serde(alias = "lastTournamentWinAt", alias = "last_tournament_win", alias = "lastTournamentWin")]
    pub last_tournament_win_at: Option<String>,
    #[serde(alias = "tournamentsPlayed", alias = "tournaments")]
    pub tournaments_played: Option<u32>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    #[serde(alias = "lastRankUpdateAt", alias = "rank_updated_at", alias = "rankUpdatedAt")]
    pub last_rank_update_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawManualOverride {
    pub rank: Option<String>,
    #[serde(alias = "points")]
    pub weight: Option<u32>,
    #[serde(alias = "active")]
    pub enabled: Option<bool>,
    pub reason: Option<String>,
}

/// Why a raw record could not be normalized at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("record {index} has no player id")]
    MissingId { index: usize },
    #[error("duplicate player id `{id}`")]
    DuplicateId { id: String },
}

/// Outcome of normalizing one record: the canonical record plus any field
/// values that were dropped because they could not be interpreted.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: PlayerRecord,
    pub warnings: Vec<String>,
}

/// RFC 3339 or a bare `YYYY-MM-DD` date; anything else is dropped with a warning.
pub fn parse_timestamp(field: &str, raw: Option<&str>, warnings: &mut Vec<String>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    warnings.push(format!("ignored unparseable {field} `{raw}`"));
    None
}

impl RawPlayerRecord {
    /// Normalize into the canonical schema. `index` is only used for error text.
    pub fn normalize(self, index: usize) -> Result<Normalized, NormalizeError> {
        let id = self
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(NormalizeError::MissingId { index })?;
        let mut warnings = Vec::new();

        let display_name = self
            .display_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());

        // Nested override object wins; flat CSV columns build one otherwise.
        let manual_override = match self.manual_override {
            Some(raw) => Some(ManualOverride {
                rank: raw.rank.as_deref().and_then(RankEntry::from_raw),
                weight: raw.weight,
                enabled: raw.enabled.unwrap_or(true),
                reason: raw.reason.filter(|r| !r.trim().is_empty()),
            }),
            None if self.override_weight.is_some() || self.override_rank.is_some() => {
                Some(ManualOverride {
                    rank: self.override_rank.as_deref().and_then(RankEntry::from_raw),
                    weight: self.override_weight,
                    enabled: true,
                    reason: self.override_reason.filter(|r| !r.trim().is_empty()),
                })
            }
            None => None,
        };

        let last_tournament_win_at = parse_timestamp(
            "last_tournament_win_at",
            self.last_tournament_win_at.as_deref(),
            &mut warnings,
        );
        let last_rank_update_at = parse_timestamp(
            "last_rank_update_at",
            self.last_rank_update_at.as_deref(),
            &mut warnings,
        );

        let tournaments_won = self.tournaments_won.unwrap_or(0);
        let mut tournaments_played = self.tournaments_played.unwrap_or(0);
        if tournaments_played < tournaments_won {
            warnings.push(format!(
                "tournaments_played ({tournaments_played}) below tournaments_won ({tournaments_won}); raised to match"
            ));
            tournaments_played = tournaments_won;
        }

        Ok(Normalized {
            record: PlayerRecord {
                id,
                display_name,
                current_rank: self.current_rank.as_deref().and_then(RankEntry::from_raw),
                peak_rank: self.peak_rank.as_deref().and_then(RankEntry::from_raw),
                manual_override,
                tournaments_won,
                last_tournament_win_at,
                tournaments_played,
                wins: self.wins.unwrap_or(0),
                losses: self.losses.unwrap_or(0),
                last_rank_update_at,
            },
            warnings,
        })
    }
}

/// Normalize a whole batch, rejecting missing or duplicate ids. Order is preserved.
pub fn normalize_all(raw: Vec<RawPlayerRecord>) -> Result<Vec<Normalized>, NormalizeError> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let normalized = record.normalize(index)?;
        if !seen.insert(normalized.record.id.clone()) {
            return Err(NormalizeError::DuplicateId {
                id: normalized.record.id,
            });
        }
        out.push(normalized);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{Rank, RankTier};

    fn raw_from_json(json: &str) -> RawPlayerRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn camel_case_aliases_normalize() {
        let raw = raw_from_json(
            r#"{
                "playerId": "p1",
                "displayName": "Ace",
                "currentRank": "Diamond 2",
                "peakRank": "Immortal 1",
                "tournamentsWon": 2,
                "tournamentsPlayed": 5,
                "lastTournamentWinAt": "2026-08-01T12:00:00Z",
                "wins": 40,
                "losses": 20,
                "favoriteAgent": "Jett"
            }"#,
        );
        let n = raw.normalize(0).unwrap();
        let r = n.record;
        assert_eq!(r.id, "p1");
        assert_eq!(r.display_name, "Ace");
        assert_eq!(
            r.current_rank,
            Some(RankEntry::Ranked(Rank::new(RankTier::Diamond, 2).unwrap()))
        );
        assert_eq!(r.peak_points(), Some(350));
        assert_eq!(r.tournaments_won, 2);
        assert!(r.last_tournament_win_at.is_some());
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn snake_case_and_short_aliases_normalize_identically() {
        let a = raw_from_json(r#"{"id":"x","name":"X","rank":"gold2","peak":"plat1"}"#)
            .normalize(0)
            .unwrap()
            .record;
        let b = raw_from_json(
            r#"{"player_id":"x","username":"X","current_rank":"Gold 2","highest_rank":"Platinum 1"}"#,
        )
        .normalize(0)
        .unwrap()
        .record;
        assert_eq!(a, b);
    }

    #[test]
    fn flat_override_columns_build_override() {
        let r = raw_from_json(r#"{"id":"x","override_weight":999,"override_reason":"coach call"}"#)
            .normalize(0)
            .unwrap()
            .record;
        let o = r.manual_override.unwrap();
        assert!(o.enabled);
        assert_eq!(o.weight, Some(999));
        assert_eq!(o.reason.as_deref(), Some("coach call"));
    }

    #[test]
    fn bad_timestamp_becomes_warning() {
        let n = raw_from_json(r#"{"id":"x","lastRankUpdateAt":"last tuesday"}"#)
            .normalize(0)
            .unwrap();
        assert!(n.record.last_rank_update_at.is_none());
        assert_eq!(n.warnings.len(), 1);
    }

    #[test]
    fn date_only_timestamp_accepted() {
        let n = raw_from_json(r#"{"id":"x","lastRankUpdateAt":"2026-01-02"}"#)
            .normalize(0)
            .unwrap();
        assert!(n.record.last_rank_update_at.is_some());
    }

    #[test]
    fn missing_id_is_error() {
        let err = raw_from_json(r#"{"name":"nobody"}"#).normalize(3).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId { index: 3 });
    }

    #[test]
    fn duplicate_ids_rejected() {
        let batch = vec![
            raw_from_json(r#"{"id":"a"}"#),
            raw_from_json(r#"{"id":"a"}"#),
        ];
        assert_eq!(
            normalize_all(batch).unwrap_err(),
            NormalizeError::DuplicateId { id: "a".into() }
        );
    }

    #[test]
    fn win_rates() {
        let mut r = PlayerRecord::new("a", "A");
        assert_eq!(r.win_rate(), None);
        r.wins = 3;
        r.losses = 1;
        assert_eq!(r.win_rate(), Some(0.75));
        r.tournaments_played = 4;
        r.tournaments_won = 2;
        assert_eq!(r.tournament_win_rate(), Some(0.5));

        r.wins = u32::MAX;
        r.losses = u32::MAX;
        assert_eq!(r.games(), u32::MAX);
        assert_eq!(r.win_rate(), Some(0.5));
    }
}
