// Balancing configuration: one object carrying every threshold and constant
// the pipeline uses, so no module keeps its own copy of the elite threshold.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub teams: TeamShape,
    pub thresholds: Thresholds,
    pub weighting: WeightingConfig,
    pub analysis: AnalysisConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Number of teams and seats per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamShape {
    pub count: usize,
    pub capacity: usize,
}

impl Default for TeamShape {
    fn default() -> Self {
        TeamShape {
            count: 2,
            capacity: 5,
        }
    }
}

impl TeamShape {
    pub fn seats(&self) -> usize {
        self.count * self.capacity
    }
}

/// Point thresholds shared by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Weight at or above which a player is elite.
    pub elite: u32,
    /// "High tier" boundary used by inactivity decay and composition tiers.
    pub high_tier: u32,
    /// Players at or above this weight count as high-value during elite dispersion.
    pub high_value: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            elite: 400,
            high_tier: 350,
            high_value: 250,
        }
    }
}

/// Which resolver branch handles players without a manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMode {
    /// Plain rank-table lookup.
    #[default]
    Standard,
    /// Rank table plus underranked and tournament bonuses.
    EvidenceBased,
    /// Evidence-based with a time-decayed current/peak blend.
    Adaptive,
}

impl WeightingMode {
    pub fn uses_evidence(&self) -> bool {
        !matches!(self, WeightingMode::Standard)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingConfig {
    pub mode: WeightingMode,
    pub default_points: u32,
    pub floor_points: u32,
    /// Minimum peak - base gap before the underranked bonus applies.
    pub underranked_min_gap: u32,
    /// Cumulative bonus percentages for 1, 2, 3, 4, 5+ full tiers dropped.
    pub underranked_steps: Vec<f64>,
    pub underranked_cap_pct: f64,
    pub tournament_points_per_win: u32,
    pub tournament_elite_boost_pct: f64,
    pub tournament_recent_boost_pct: f64,
    pub tournament_recent_days: i64,
    pub tournament_bonus_cap: u32,
    pub time_weight_days: i64,
    pub decay_max_penalty: f64,
    pub decay_time_constant_days: f64,
    pub base_blend: f64,
    pub blend_confidence_boost: f64,
    /// Rank gap (points) at which the confidence boost is fully applied.
    pub blend_gap_scale: f64,
    pub max_blend: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        WeightingConfig {
            mode: WeightingMode::Standard,
            default_points: 150,
            floor_points: 100,
            underranked_min_gap: 75,
            underranked_steps: vec![10.0, 18.0, 25.0, 30.0, 35.0],
            underranked_cap_pct: 35.0,
            tournament_points_per_win: 15,
            tournament_elite_boost_pct: 20.0,
            tournament_recent_boost_pct: 50.0,
            tournament_recent_days: 90,
            tournament_bonus_cap: 60,
            time_weight_days: 60,
            decay_max_penalty: 0.25,
            decay_time_constant_days: 120.0,
            base_blend: 0.3,
            blend_confidence_boost: 0.15,
            blend_gap_scale: 200.0,
            max_blend: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub champion_points_per_win: i32,
    pub champion_elite_peak_bonus: i32,
    pub champion_fallen_bonus: i32,
    pub champion_fallen_gap: u32,
    pub mismatch_min_gap: u32,
    pub mismatch_factor: f64,
    pub mismatch_cap: i32,
    pub mismatch_recent_win_bonus: i32,
    pub recent_win_days: i64,
    pub min_games_for_win_rate: u32,
    pub undervalued_min_indicators: usize,
    pub undervalued_min_score: i32,
    pub undervalued_cap: i32,
    pub inactivity_days: i64,
    pub inactivity_pct: f64,
    pub inactivity_cap: i32,
    pub consistency_bonus: i32,
    pub stable_gap: u32,
    pub adjusted_floor: u32,
    pub recent_activity_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            champion_points_per_win: 15,
            champion_elite_peak_bonus: 10,
            champion_fallen_bonus: 20,
            champion_fallen_gap: 100,
            mismatch_min_gap: 150,
            mismatch_factor: 0.3,
            mismatch_cap: 75,
            mismatch_recent_win_bonus: 25,
            recent_win_days: 90,
            min_games_for_win_rate: 10,
            undervalued_min_indicators: 2,
            undervalued_min_score: 25,
            undervalued_cap: 50,
            inactivity_days: 30,
            inactivity_pct: 0.10,
            inactivity_cap: 35,
            consistency_bonus: 10,
            stable_gap: 50,
            adjusted_floor: 50,
            recent_activity_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Minimum analysis confidence (0-100) before an adjustment is applied.
    pub confidence_threshold: u32,
    /// Largest adjustment allowed, as a percentage of the resolved weight.
    pub max_adjustment_pct: f64,
    /// Spread above which swap search runs.
    pub swap_trigger_spread: u32,
    /// A swap must reduce spread by strictly more than this.
    pub min_swap_improvement: u32,
    pub max_swap_passes: usize,
    /// Elite dispersion penalty per high-value player already on a team.
    pub elite_dispersion_penalty: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            confidence_threshold: 75,
            max_adjustment_pct: 30.0,
            swap_trigger_spread: 200,
            min_swap_improvement: 50,
            max_swap_passes: 10,
            elite_dispersion_penalty: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl BalanceConfig {
    /// Check every field that would make the pipeline meaningless. Team shape
    /// is not checked here: a zero seat count is an input error of the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if t.elite == 0 {
            return Err(invalid("thresholds.elite", "must be greater than 0"));
        }
        if t.high_tier > t.elite {
            return Err(invalid(
                "thresholds.high_tier",
                format!("must not exceed thresholds.elite ({}), got {}", t.elite, t.high_tier),
            ));
        }

        let w = &self.weighting;
        if w.floor_points == 0 {
            return Err(invalid("weighting.floor_points", "must be greater than 0"));
        }
        if w.default_points < w.floor_points {
            return Err(invalid(
                "weighting.default_points",
                format!("must be >= weighting.floor_points ({})", w.floor_points),
            ));
        }
        if w.underranked_steps.is_empty() {
            return Err(invalid("weighting.underranked_steps", "must not be empty"));
        }
        if w.underranked_steps.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(invalid(
                "weighting.underranked_steps",
                "must be non-decreasing",
            ));
        }
        let fractions: &[(&str, f64)] = &[
            ("weighting.decay_max_penalty", w.decay_max_penalty),
            ("weighting.base_blend", w.base_blend),
            ("weighting.blend_confidence_boost", w.blend_confidence_boost),
            ("weighting.max_blend", w.max_blend),
        ];
        for (name, val) in fractions {
            if !(0.0..=1.0).contains(val) {
                return Err(invalid(
                    name,
                    format!("must be between 0.0 and 1.0 inclusive, got {val}"),
                ));
            }
        }
        if w.decay_time_constant_days <= 0.0 {
            return Err(invalid(
                "weighting.decay_time_constant_days",
                format!("must be > 0, got {}", w.decay_time_constant_days),
            ));
        }
        if w.blend_gap_scale <= 0.0 {
            return Err(invalid(
                "weighting.blend_gap_scale",
                format!("must be > 0, got {}", w.blend_gap_scale),
            ));
        }

        let o = &self.orchestrator;
        if o.confidence_threshold > 100 {
            return Err(invalid(
                "orchestrator.confidence_threshold",
                format!("must be at most 100, got {}", o.confidence_threshold),
            ));
        }
        if !(0.0..=100.0).contains(&o.max_adjustment_pct) {
            return Err(invalid(
                "orchestrator.max_adjustment_pct",
                format!("must be between 0 and 100, got {}", o.max_adjustment_pct),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
