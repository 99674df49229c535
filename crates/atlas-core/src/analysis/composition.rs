// Team composition scoring and global balance classification.
//
// Each team is scored from a baseline of 70: issues subtract a fifth of their
// point impact, strengths add a third of their benefit. The global view
// combines spread and elite stacking into a quality tier and overall score.

use serde::{Deserialize, Serialize};

use super::Severity;
use crate::config::Thresholds;
use crate::team::{spread, Team};

const BASE_TEAM_SCORE: f64 = 70.0;
const UPPER_TIER_POINTS: u32 = 250;
const MID_TIER_POINTS: u32 = 150;
const EXTREME_VARIANCE: f64 = 10_000.0;
const CONSISTENT_VARIANCE: f64 = 2_500.0;

// ---------------------------------------------------------------------------
// Skill tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    Elite,
    High,
    Upper,
    Mid,
    Low,
}

impl SkillTier {
    pub fn of(points: u32, thresholds: &Thresholds) -> Self {
        if points >= thresholds.elite {
            SkillTier::Elite
        } else if points >= thresholds.high_tier {
            SkillTier::High
        } else if points >= UPPER_TIER_POINTS {
            SkillTier::Upper
        } else if points >= MID_TIER_POINTS {
            SkillTier::Mid
        } else {
            SkillTier::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub elite: usize,
    pub high: usize,
    pub upper: usize,
    pub mid: usize,
    pub low: usize,
}

impl TierCounts {
    fn add(&mut self, tier: SkillTier) {
        match tier {
            SkillTier::Elite => self.elite += 1,
            SkillTier::High => self.high += 1,
            SkillTier::Upper => self.upper += 1,
            SkillTier::Mid => self.mid += 1,
            SkillTier::Low => self.low += 1,
        }
    }

    pub fn distinct(&self) -> usize {
        [self.elite, self.high, self.upper, self.mid, self.low]
            .iter()
            .filter(|&&n| n > 0)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Issues and strengths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    SkillStacking,
    EliteConcentration,
    ExtremeVariance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub point_impact: u32,
    pub description: String,
    pub fix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthKind {
    BalancedDistribution,
    SkillDiversity,
    ConsistentLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionStrength {
    pub kind: StrengthKind,
    pub benefit: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamComposition {
    pub team_id: String,
    pub team_name: String,
    pub total_points: u32,
    pub elite_count: usize,
    pub tiers: TierCounts,
    pub variance: f64,
    pub score: u32,
    pub issues: Vec<CompositionIssue>,
    pub strengths: Vec<CompositionStrength>,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Global balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Critical,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBalance {
    pub average_points: f64,
    pub min_points: u32,
    pub max_points: u32,
    pub spread: u32,
    /// Elite count per team, in team order.
    pub elite_distribution: Vec<usize>,
    pub quality_tier: QualityTier,
    pub overall_score: u32,
    pub critical_issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAnalysis {
    pub teams: Vec<TeamComposition>,
    pub global: GlobalBalance,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Population variance of team member points; 0 for fewer than two players.
pub fn point_variance(team: &Team) -> f64 {
    let n = team.players.len();
    if n < 2 {
        return 0.0;
    }
    let mean = team.total_points as f64 / n as f64;
    team.players
        .iter()
        .map(|m| {
            let d = m.points as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64
}

fn analyze_team(team: &Team, average: f64, thresholds: &Thresholds) -> TeamComposition {
    let mut tiers = TierCounts::default();
    for m in &team.players {
        tiers.add(SkillTier::of(m.points, thresholds));
    }
    let elite_count = team.elite_count();
    let variance = point_variance(team);
    let mut issues = Vec::new();
    let mut strengths = Vec::new();

    if elite_count > 1 {
        issues.push(CompositionIssue {
            kind: IssueKind::SkillStacking,
            severity: if elite_count > 2 { Severity::Critical } else { Severity::High },
            point_impact: 40 * (elite_count as u32 - 1),
            description: format!("{}: {elite_count} elite players stacked", team.name),
            fix: format!("Move {} elite player(s) off {}", elite_count - 1, team.name),
        });
    }
    if !team.is_empty() {
        let top = tiers.elite + tiers.high;
        if top as f64 / team.len() as f64 > 0.6 {
            issues.push(CompositionIssue {
                kind: IssueKind::EliteConcentration,
                severity: Severity::High,
                point_impact: 30,
                description: format!(
                    "{}: {top} of {} players are elite or high tier",
                    team.name,
                    team.len()
                ),
                fix: format!("Exchange a high-tier player on {} for a mid-tier one", team.name),
            });
        }
    }
    if variance > EXTREME_VARIANCE {
        issues.push(CompositionIssue {
            kind: IssueKind::ExtremeVariance,
            severity: Severity::Medium,
            point_impact: 25,
            description: format!("{}: point variance {variance:.0} is extreme", team.name),
            fix: format!("Narrow the skill range on {}", team.name),
        });
    }

    if average > 0.0 && (team.total_points as f64 - average).abs() <= average * 0.10 {
        strengths.push(CompositionStrength {
            kind: StrengthKind::BalancedDistribution,
            benefit: 15,
            description: format!(
                "{}: total {} within 10% of the average {average:.1}",
                team.name, team.total_points
            ),
        });
    }
    if tiers.distinct() >= 3 {
        strengths.push(CompositionStrength {
            kind: StrengthKind::SkillDiversity,
            benefit: 10,
            description: format!("{}: {} skill tiers represented", team.name, tiers.distinct()),
        });
    }
    if team.len() >= 2 && variance < CONSISTENT_VARIANCE {
        strengths.push(CompositionStrength {
            kind: StrengthKind::ConsistentLevel,
            benefit: 10,
            description: format!("{}: consistent skill level (variance {variance:.0})", team.name),
        });
    }

    let penalty: f64 = issues.iter().map(|i| i.point_impact as f64 / 5.0).sum();
    let bonus: f64 = strengths.iter().map(|s| s.benefit as f64 / 3.0).sum();
    let score = (BASE_TEAM_SCORE - penalty + bonus).clamp(0.0, 100.0).round() as u32;
    let recommendations = issues.iter().map(|i| i.fix.clone()).collect();

    TeamComposition {
        team_id: team.id.clone(),
        team_name: team.name.clone(),
        total_points: team.total_points,
        elite_count,
        tiers,
        variance,
        score,
        issues,
        strengths,
        recommendations,
    }
}

fn classify(spread: u32, elite_distribution: &[usize]) -> QualityTier {
    let max_elite = elite_distribution.iter().copied().max().unwrap_or(0);
    let stacked = elite_distribution.iter().filter(|&&e| e > 1).count();
    if max_elite > 2 || stacked > 1 {
        QualityTier::Critical
    } else if max_elite > 1 || spread > 200 {
        QualityTier::Poor
    } else if spread <= 50 {
        QualityTier::Excellent
    } else if spread <= 100 {
        QualityTier::Good
    } else {
        QualityTier::Acceptable
    }
}

/// Score every team and the assignment as a whole.
pub fn analyze_composition(teams: &[Team], thresholds: &Thresholds) -> BalanceAnalysis {
    let average = if teams.is_empty() {
        0.0
    } else {
        teams.iter().map(|t| t.total_points as f64).sum::<f64>() / teams.len() as f64
    };
    let compositions: Vec<TeamComposition> = teams
        .iter()
        .map(|t| analyze_team(t, average, thresholds))
        .collect();

    let elite_distribution: Vec<usize> = compositions.iter().map(|c| c.elite_count).collect();
    let spread = spread(teams);
    let quality_tier = classify(spread, &elite_distribution);

    let stacking_penalty: f64 = elite_distribution
        .iter()
        .filter(|&&e| e > 1)
        .map(|&e| 25.0 * (e as f64 - 1.0))
        .sum();
    let global_component = (100.0 - (spread as f64 / 5.0).min(40.0) - stacking_penalty).max(0.0);
    let mean_team_score = if compositions.is_empty() {
        0.0
    } else {
        compositions.iter().map(|c| c.score as f64).sum::<f64>() / compositions.len() as f64
    };
    let overall_score = ((global_component + mean_team_score) / 2.0).round() as u32;

    let mut critical_issues: Vec<String> = compositions
        .iter()
        .flat_map(|c| c.issues.iter())
        .filter(|i| i.severity == Severity::Critical)
        .map(|i| i.description.clone())
        .collect();
    let stacked = elite_distribution.iter().filter(|&&e| e > 1).count();
    if stacked > 1 {
        critical_issues.push(format!("{stacked} teams have stacked elite players"));
    }

    BalanceAnalysis {
        global: GlobalBalance {
            average_points: average,
            min_points: teams.iter().map(|t| t.total_points).min().unwrap_or(0),
            max_points: teams.iter().map(|t| t.total_points).max().unwrap_or(0),
            spread,
            elite_distribution,
            quality_tier,
            overall_score,
            critical_issues,
        },
        teams: compositions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
