// Evidence-based and adaptive weighting.
//
// Builds a weight from current rank, peak rank, tournament history and (in
// adaptive mode) how stale the rank data is. Each step appends one line of
// reasoning, in the order the evidence was considered.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{BalanceConfig, WeightingConfig, WeightingMode};
use crate::player::PlayerRecord;
use crate::rank::{Rank, RankEntry, TIER_WIDTH};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvidenceError {
    #[error("no usable current or peak rank")]
    NoRankEvidence,
    #[error("unrecognized {field} \"{value}\"")]
    UnrecognizedRank { field: &'static str, value: String },
}

/// Result of the evidence path, before the resolver wraps it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceWeight {
    pub points: u32,
    pub reasoning: Vec<String>,
}

// ---------------------------------------------------------------------------
// Component formulas
// ---------------------------------------------------------------------------

/// Unranked penalty for a player whose peak is known but who currently has
/// no rank. Higher peaks decay further.
pub fn unranked_penalty_pct(peak_points: u32, elite_threshold: u32) -> f64 {
    if peak_points >= elite_threshold {
        20.0
    } else if peak_points >= 300 {
        15.0
    } else {
        10.0
    }
}

/// Underranked bonus percentage for a peak-over-base drop in points.
///
/// Zero below `underranked_min_gap`; otherwise the cumulative step for the
/// number of full tiers dropped, capped at `underranked_cap_pct`.
pub fn underranked_bonus_pct(drop: u32, cfg: &WeightingConfig) -> f64 {
    if drop < cfg.underranked_min_gap || cfg.underranked_steps.is_empty() {
        return 0.0;
    }
    let full_tiers = ((drop / TIER_WIDTH) as usize).max(1);
    let idx = full_tiers.min(cfg.underranked_steps.len()) - 1;
    cfg.underranked_steps[idx].min(cfg.underranked_cap_pct)
}

/// Underranked bonus in points for `base` given the peak.
pub fn underranked_bonus(base: u32, peak: u32, cfg: &WeightingConfig) -> u32 {
    let drop = peak.saturating_sub(base);
    let pct = underranked_bonus_pct(drop, cfg);
    (base as f64 * pct / 100.0).round() as u32
}

/// Tournament bonus in points plus its reasoning lines.
pub fn tournament_bonus(
    player: &PlayerRecord,
    base: u32,
    peak: Option<u32>,
    config: &BalanceConfig,
    as_of: Option<DateTime<Utc>>,
) -> (u32, Vec<String>) {
    let cfg = &config.weighting;
    let mut lines = Vec::new();
    let wins = player.tournaments_won;
    if wins == 0 {
        lines.push("Tournament history: no wins on record".to_string());
        return (0, lines);
    }

    let raw = cfg.tournament_points_per_win.saturating_mul(wins) as f64;
    lines.push(format!(
        "Tournament wins: {wins} x {} pts = {raw} pts",
        cfg.tournament_points_per_win
    ));
    let mut total = raw;

    if let Some(peak) = peak {
        if peak >= config.thresholds.elite && base < peak {
            let boost = raw * cfg.tournament_elite_boost_pct / 100.0;
            total += boost;
            lines.push(format!(
                "Tournament elite boost: +{}% for peak {peak} pts above current rating",
                cfg.tournament_elite_boost_pct
            ));
        }
    }

    match PlayerRecord::days_between(player.last_tournament_win_at, as_of) {
        Some(days) if days <= cfg.tournament_recent_days => {
            let boost = raw * cfg.tournament_recent_boost_pct / 100.0;
            total += boost;
            lines.push(format!(
                "Tournament recency boost: +{}% (last win {days} days ago)",
                cfg.tournament_recent_boost_pct
            ));
        }
        Some(days) => lines.push(format!(
            "Tournament last win {days} days ago; no recency boost"
        )),
        None => lines.push("Tournament recency unknown; no recency boost".to_string()),
    }

    let mut bonus = total.round() as u32;
    if bonus > cfg.tournament_bonus_cap {
        lines.push(format!(
            "Tournament bonus capped at {} pts (from {bonus})",
            cfg.tournament_bonus_cap
        ));
        bonus = cfg.tournament_bonus_cap;
    }
    lines.push(format!("Tournament bonus: +{bonus} pts"));
    (bonus, lines)
}

/// Current/peak blend factor for adaptive mode.
///
/// Starts at `base_blend`, gains up to `blend_confidence_boost` in proportion
/// to the rank gap, loses up to `decay_max_penalty` of itself once the rank
/// data is older than `time_weight_days`, and never exceeds `max_blend`.
pub fn adaptive_blend(gap: u32, days_since_update: Option<i64>, cfg: &WeightingConfig) -> (f64, Vec<String>) {
    let mut lines = Vec::new();
    let gap_ratio = (gap as f64 / cfg.blend_gap_scale).min(1.0);
    let mut blend = cfg.base_blend + cfg.blend_confidence_boost * gap_ratio;
    lines.push(format!(
        "Adaptive blend: base {:.3} + gap boost {:.3} = {:.3}",
        cfg.base_blend,
        cfg.blend_confidence_boost * gap_ratio,
        blend
    ));

    match days_since_update {
        Some(days) if days > cfg.time_weight_days => {
            let over = (days - cfg.time_weight_days) as f64;
            let penalty = cfg.decay_max_penalty * (1.0 - (-over / cfg.decay_time_constant_days).exp());
            blend *= 1.0 - penalty;
            lines.push(format!(
                "Time decay: rank data {days} days old, blend reduced by {:.1}% to {:.3}",
                penalty * 100.0,
                blend
            ));
        }
        Some(days) => lines.push(format!(
            "Time decay: rank data {days} days old, within {} day window",
            cfg.time_weight_days
        )),
        None => lines.push("Time decay: rank update time unknown, not applied".to_string()),
    }

    if blend > cfg.max_blend {
        blend = cfg.max_blend;
        lines.push(format!("Blend capped at {:.3}", cfg.max_blend));
    }
    (blend, lines)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn recognized<'a>(
    entry: &'a Option<RankEntry>,
    field: &'static str,
) -> Result<Option<&'a RankEntry>, EvidenceError> {
    match entry {
        Some(RankEntry::Unrecognized(value)) => Err(EvidenceError::UnrecognizedRank {
            field,
            value: value.clone(),
        }),
        Some(e) => Ok(Some(e)),
        None => Ok(None),
    }
}

/// Compute the evidence-based weight for one player.
pub fn evaluate(
    player: &PlayerRecord,
    config: &BalanceConfig,
    as_of: Option<DateTime<Utc>>,
) -> Result<EvidenceWeight, EvidenceError> {
    let cfg = &config.weighting;
    let current = recognized(&player.current_rank, "current rank")?;
    let peak_entry = recognized(&player.peak_rank, "peak rank")?;
    let peak: Option<Rank> = peak_entry.and_then(RankEntry::rank);

    let mut reasoning = Vec::new();
    let base: u32;
    let mut adjustment: u32 = 0;

    match (current, peak) {
        (Some(RankEntry::Ranked(cur)), _) => {
            base = cur.points();
            reasoning.push(format!("Current rank {cur} ({base} pts) used as base"));
            match peak {
                Some(pk) if pk.points() > base => {
                    let gap = pk.points() - base;
                    if cfg.mode == WeightingMode::Adaptive {
                        let days = PlayerRecord::days_between(player.last_rank_update_at, as_of);
                        let (blend, lines) = adaptive_blend(gap, days, cfg);
                        reasoning.extend(lines);
                        adjustment = (blend * gap as f64).round() as u32;
                        reasoning.push(format!(
                            "Peak rank {pk} ({} pts) blended in: +{adjustment} pts",
                            pk.points()
                        ));
                    } else {
                        adjustment = underranked_bonus(base, pk.points(), cfg);
                        if adjustment > 0 {
                            reasoning.push(format!(
                                "Underranked: peak rank {pk} ({} pts) is {gap} pts above current, +{:.0}% = +{adjustment} pts",
                                pk.points(),
                                underranked_bonus_pct(gap, cfg)
                            ));
                        } else {
                            reasoning.push(format!(
                                "Peak rank {pk} ({} pts) only {gap} pts above current; no underranked bonus",
                                pk.points()
                            ));
                        }
                    }
                }
                Some(pk) => reasoning.push(format!(
                    "Peak rank {pk} ({} pts) does not exceed current rank",
                    pk.points()
                )),
                None => reasoning.push("No peak rank on record".to_string()),
            }
        }
        (Some(RankEntry::Unranked), Some(pk)) => {
            let pct = unranked_penalty_pct(pk.points(), config.thresholds.elite);
            base = (pk.points() as f64 * (1.0 - pct / 100.0)).round() as u32;
            reasoning.push(format!(
                "Current rank Unranked; peak rank {pk} ({} pts) reduced by {pct:.0}% unranked penalty to {base} pts",
                pk.points()
            ));
        }
        (None, Some(pk)) => {
            base = pk.points();
            reasoning.push(format!(
                "No current rank on record; peak rank {pk} ({base} pts) used as base"
            ));
        }
        _ => return Err(EvidenceError::NoRankEvidence),
    }

    let peak_points = peak.map(|p| p.points());
    let (bonus, lines) = tournament_bonus(player, base, peak_points, config, as_of);
    reasoning.extend(lines);

    let mut points = base + adjustment + bonus;
    if points < cfg.floor_points {
        reasoning.push(format!("Raised to floor of {} pts", cfg.floor_points));
        points = cfg.floor_points;
    }
    reasoning.push(format!("Evidence-based weight: {points} pts"));

    Ok(EvidenceWeight { points, reasoning })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
