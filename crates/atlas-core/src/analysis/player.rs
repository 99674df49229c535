// Per-player analysis: a fixed, ordered set of independent checks that may
// each propose a signed adjustment to the resolved weight.
//
// The analyzer never changes weights itself. It produces adjusted points and a
// confidence score; the orchestrator decides whether to act on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::config::BalanceConfig;
use crate::player::PlayerRecord;
use crate::weight::WeightResult;

const BASE_CONFIDENCE: u32 = 50;
const MAX_CONFIDENCE: u32 = 95;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    TournamentChampion,
    RankMismatch,
    Undervalued,
    InactivityDecay,
    ConsistentPerformer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFlag {
    pub kind: FlagKind,
    pub severity: Severity,
    /// Signed point adjustment proposed by this check.
    pub delta: i32,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalysis {
    pub player_id: String,
    pub display_name: String,
    pub weight: WeightResult,
    pub adjusted_points: u32,
    pub flags: Vec<AnalysisFlag>,
    /// 0-100, capped at 95.
    pub confidence: u32,
}

impl PlayerAnalysis {
    pub fn original_points(&self) -> u32 {
        self.weight.points
    }

    pub fn total_delta(&self) -> i64 {
        self.adjusted_points as i64 - self.weight.points as i64
    }
}

// ---------------------------------------------------------------------------
// Shared predicates
// ---------------------------------------------------------------------------

/// Win rate when the sample is large enough to trust.
fn reliable_win_rate(player: &PlayerRecord, config: &BalanceConfig) -> Option<f64> {
    if player.games() >= config.analysis.min_games_for_win_rate {
        player.win_rate()
    } else {
        None
    }
}

/// Current rank on record and no meaningful drop from peak.
fn is_stable(player: &PlayerRecord, config: &BalanceConfig) -> bool {
    match (player.current_points(), player.peak_points()) {
        (Some(current), Some(peak)) => peak.saturating_sub(current) <= config.analysis.stable_gap,
        (Some(_), None) => true,
        _ => false,
    }
}

fn won_recently(player: &PlayerRecord, config: &BalanceConfig, as_of: Option<DateTime<Utc>>) -> bool {
    PlayerRecord::days_between(player.last_tournament_win_at, as_of)
        .is_some_and(|d| d <= config.analysis.recent_win_days)
}

// ---------------------------------------------------------------------------
// Checks, in evaluation order
// ---------------------------------------------------------------------------

fn check_champion(player: &PlayerRecord, config: &BalanceConfig) -> Option<AnalysisFlag> {
    let a = &config.analysis;
    let wins = player.tournaments_won;
    if wins == 0 {
        return None;
    }
    let per_win = i32::try_from(wins).unwrap_or(i32::MAX);
    let mut delta = a.champion_points_per_win.saturating_mul(per_win);
    let mut parts = vec![format!("{wins} tournament win(s) x {}", a.champion_points_per_win)];

    if let Some(peak) = player.peak_points() {
        if peak >= config.thresholds.elite {
            delta = delta.saturating_add(a.champion_elite_peak_bonus);
            parts.push(format!("+{} elite peak", a.champion_elite_peak_bonus));
        }
        if let Some(current) = player.current_points() {
            if peak.saturating_sub(current) > a.champion_fallen_gap {
                delta = delta.saturating_add(a.champion_fallen_bonus);
                parts.push(format!(
                    "+{} current rank more than {} pts below peak",
                    a.champion_fallen_bonus, a.champion_fallen_gap
                ));
            }
        }
    }

    Some(AnalysisFlag {
        kind: FlagKind::TournamentChampion,
        severity: if wins >= 3 { Severity::High } else { Severity::Medium },
        delta,
        reasoning: format!("Tournament champion: {} = +{delta} pts", parts.join(", ")),
    })
}

fn check_rank_mismatch(
    player: &PlayerRecord,
    config: &BalanceConfig,
    as_of: Option<DateTime<Utc>>,
) -> Option<AnalysisFlag> {
    let a = &config.analysis;
    let (current, peak) = (player.current_points()?, player.peak_points()?);
    let gap = peak.checked_sub(current)?;
    if gap < a.mismatch_min_gap {
        return None;
    }
    let mut delta = ((gap as f64 * a.mismatch_factor).round() as i32).min(a.mismatch_cap);
    let mut reasoning = format!("Rank mismatch: peak is {gap} pts above current, +{delta} pts");
    if won_recently(player, config, as_of) {
        delta += a.mismatch_recent_win_bonus;
        reasoning.push_str(&format!(
            "; +{} for a tournament win within {} days",
            a.mismatch_recent_win_bonus, a.recent_win_days
        ));
    }
    Some(AnalysisFlag {
        kind: FlagKind::RankMismatch,
        severity: if gap >= 250 { Severity::High } else { Severity::Medium },
        delta,
        reasoning,
    })
}

fn check_undervalued(player: &PlayerRecord, config: &BalanceConfig) -> Option<AnalysisFlag> {
    let a = &config.analysis;
    let win_rate = reliable_win_rate(player, config);
    let mut indicators: Vec<(String, i32)> = Vec::new();

    if let Some(rate) = win_rate.filter(|r| *r > 0.70) {
        indicators.push((format!("win rate {:.0}%", rate * 100.0), 20));
    }
    if let Some(rate) = player.tournament_win_rate().filter(|r| *r > 0.30) {
        indicators.push((format!("tournament win rate {:.0}%", rate * 100.0), 25));
    }
    if is_stable(player, config) && win_rate.is_some_and(|r| r > 0.50) {
        indicators.push(("stable rank with winning record".to_string(), 10));
    }

    let score: i32 = indicators.iter().map(|(_, s)| s).sum();
    if indicators.len() < a.undervalued_min_indicators || score < a.undervalued_min_score {
        return None;
    }
    let delta = score.min(a.undervalued_cap);
    let names: Vec<&str> = indicators.iter().map(|(n, _)| n.as_str()).collect();
    Some(AnalysisFlag {
        kind: FlagKind::Undervalued,
        severity: if score >= 45 { Severity::High } else { Severity::Medium },
        delta,
        reasoning: format!(
            "Undervalued: {} (score {score}) = +{delta} pts",
            names.join(", ")
        ),
    })
}

fn check_inactivity(
    player: &PlayerRecord,
    base: u32,
    config: &BalanceConfig,
    as_of: Option<DateTime<Utc>>,
) -> Option<AnalysisFlag> {
    let a = &config.analysis;
    if base < config.thresholds.high_tier || player.tournaments_won > 0 {
        return None;
    }
    let days = PlayerRecord::days_between(player.last_rank_update_at, as_of)?;
    if days <= a.inactivity_days {
        return None;
    }
    let decay = ((base as f64 * a.inactivity_pct).round() as i32).min(a.inactivity_cap);
    Some(AnalysisFlag {
        kind: FlagKind::InactivityDecay,
        severity: Severity::Low,
        delta: -decay,
        reasoning: format!(
            "Inactivity decay: high-tier rank not updated for {days} days and no tournament wins, -{decay} pts"
        ),
    })
}

fn check_consistency(player: &PlayerRecord, config: &BalanceConfig) -> Option<AnalysisFlag> {
    let rate = reliable_win_rate(player, config)?;
    if !is_stable(player, config) || rate <= 0.60 {
        return None;
    }
    let bonus = config.analysis.consistency_bonus;
    Some(AnalysisFlag {
        kind: FlagKind::ConsistentPerformer,
        severity: Severity::Low,
        delta: bonus,
        reasoning: format!(
            "Consistent performer: stable rank with {:.0}% win rate, +{bonus} pts",
            rate * 100.0
        ),
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Analyze one player against their resolved weight.
pub fn analyze_player(
    player: &PlayerRecord,
    weight: &WeightResult,
    config: &BalanceConfig,
    as_of: Option<DateTime<Utc>>,
) -> PlayerAnalysis {
    let base = weight.points;
    let flags: Vec<AnalysisFlag> = [
        check_champion(player, config),
        check_rank_mismatch(player, config, as_of),
        check_undervalued(player, config),
        check_inactivity(player, base, config, as_of),
        check_consistency(player, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    let delta: i64 = flags.iter().map(|f| f.delta as i64).sum();
    let floor = config.analysis.adjusted_floor as i64;
    let adjusted_points = (base as i64 + delta).max(floor) as u32;

    let mut confidence = BASE_CONFIDENCE;
    if player.peak_points().is_some() {
        confidence += 15;
    }
    if player.tournaments_won > 0 {
        confidence += 20;
    }
    if player.games() > 0 {
        confidence += 10;
    }
    if PlayerRecord::days_between(player.last_rank_update_at, as_of)
        .is_some_and(|d| d <= config.analysis.recent_activity_days)
    {
        confidence += 10;
    }
    confidence += flags.iter().map(|f| f.severity.confidence_increment()).sum::<u32>();

    PlayerAnalysis {
        player_id: player.id.clone(),
        display_name: player.display_name.clone(),
        weight: weight.clone(),
        adjusted_points,
        flags,
        confidence: confidence.min(MAX_CONFIDENCE),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
