use atlas_core::analysis::composition::QualityTier;
use atlas_core::audit::AuditLog;
use atlas_core::config::{BalanceConfig, WeightingMode};
use atlas_core::decision::DecisionKind;
use atlas_core::player::{ManualOverride, PlayerRecord};
use atlas_core::rank::RankEntry;
use atlas_core::swap::{self, SwapOutcome};
use atlas_core::team::{spread, Team, TeamMember};
use atlas_core::weight::WeightSource;
use atlas_core::{balance, BalanceInput};
use chrono::{TimeZone, Utc};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const LADDER: &[&str] = &[
    "Iron 2", "Bronze 3", "Silver 1", "Silver 3", "Gold 2", "Platinum 1", "Platinum 3",
    "Diamond 2", "Ascendant 1", "Ascendant 3", "Immortal 1", "Immortal 2", "Gold 3",
    "Bronze 1", "Diamond 3", "Silver 2",
];

fn ranked(id: &str, rank: &str) -> PlayerRecord {
    let mut p = PlayerRecord::new(id, format!("Player {id}"));
    p.current_rank = RankEntry::from_raw(rank);
    p
}

fn fixed(id: &str, weight: u32) -> PlayerRecord {
    let mut p = PlayerRecord::new(id, format!("Player {id}"));
    p.manual_override = Some(ManualOverride {
        rank: None,
        weight: Some(weight),
        enabled: true,
        reason: None,
    });
    p
}

fn roster(n: usize) -> Vec<PlayerRecord> {
    (0..n)
        .map(|i| ranked(&format!("p{i:02}"), LADDER[i % LADDER.len()]))
        .collect()
}

fn config(count: usize, capacity: usize) -> BalanceConfig {
    let mut c = BalanceConfig::default();
    c.teams.count = count;
    c.teams.capacity = capacity;
    c
}

fn member(id: &str, points: u32, elite: u32) -> TeamMember {
    TeamMember {
        player_id: id.to_string(),
        display_name: id.to_string(),
        points,
        is_elite: points >= elite,
    }
}

// ---------------------------------------------------------------------------
// Assignment invariants
// ---------------------------------------------------------------------------

#[test]
fn every_player_placed_once_or_excluded() {
    for (n, count, capacity) in [(10, 2, 5), (7, 2, 5), (16, 3, 5), (9, 4, 2), (1, 3, 3)] {
        let report = balance(&BalanceInput::new(roster(n), config(count, capacity))).unwrap();
        let placed: Vec<&str> = report
            .teams
            .iter()
            .flat_map(|t| t.players.iter().map(|m| m.player_id.as_str()))
            .collect();
        let unique: BTreeSet<&str> = placed.iter().copied().collect();

        assert_eq!(placed.len(), n.min(count * capacity), "n={n} k={count} c={capacity}");
        assert_eq!(unique.len(), placed.len(), "double assignment for n={n}");
        assert_eq!(placed.len() + report.excluded.len(), n);
        assert!(report.teams.iter().all(|t| t.len() <= capacity));
        assert!(report.execution_plan.validation.iter().any(|c| c.name == "uniqueness" && c.passed));
    }
}

#[test]
fn excluded_players_carry_reasons() {
    let report = balance(&BalanceInput::new(roster(12), config(2, 5))).unwrap();
    assert_eq!(report.excluded.len(), 2);
    assert_eq!(report.excluded[0].player_id, "p10");
    assert_eq!(report.excluded[1].player_id, "p11");
    assert!(report.excluded.iter().all(|e| !e.reason.is_empty()));
}

#[test]
fn elites_never_share_while_elite_free_team_exists() {
    let mut players = vec![fixed("e1", 480), fixed("e2", 450), fixed("e3", 420)];
    players.extend(roster(9));
    let report = balance(&BalanceInput::new(players, config(3, 4))).unwrap();
    for t in &report.teams {
        assert_eq!(t.elite_count(), 1, "{} has {} elites", t.name, t.elite_count());
    }
    assert!(report.execution_plan.validation.iter().any(|c| c.name == "elite_dispersion" && c.passed));
}

#[test]
fn identical_input_gives_identical_report() {
    let mut c = config(3, 5);
    c.weighting.mode = WeightingMode::Adaptive;
    let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let mut players = roster(15);
    players[3].peak_rank = RankEntry::from_raw("Radiant");
    players[3].tournaments_won = 2;
    players[3].tournaments_played = 3;
    players[7].last_rank_update_at = Some(as_of - chrono::Duration::days(200));
    let input = BalanceInput::new(players, c).as_of(as_of);

    let first = serde_json::to_string(&balance(&input).unwrap()).unwrap();
    let second = serde_json::to_string(&balance(&input).unwrap()).unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Weighting scenarios through the full run
// ---------------------------------------------------------------------------

#[test]
fn manual_override_weight_is_used_exactly() {
    let players = vec![fixed("pro", 999), ranked("a", "Gold 1")];
    let report = balance(&BalanceInput::new(players, config(2, 5))).unwrap();
    let pro = &report.player_analyses[0];
    assert_eq!(pro.weight.points, 999);
    assert_eq!(pro.weight.source, WeightSource::ManualOverride);
}

#[test]
fn radiant_peak_champion_resolves_to_515() {
    let mut c = config(2, 5);
    c.weighting.mode = WeightingMode::EvidenceBased;
    let mut p = PlayerRecord::new("r", "Radiant Returner");
    p.peak_rank = RankEntry::from_raw("Radiant");
    p.tournaments_won = 1;
    let report = balance(&BalanceInput::new(vec![p, ranked("a", "Gold 1")], c)).unwrap();

    let w = &report.player_analyses[0].weight;
    assert_eq!(w.points, 515);
    assert_eq!(w.source, WeightSource::EvidenceBased);
    let text = w.reasoning.join(" ");
    assert!(text.contains("Radiant"));
    assert!(text.contains("Tournament"));
}

#[test]
fn malformed_rank_degrades_to_default_and_is_audited() {
    let players = vec![ranked("x", "Mythic 9"), ranked("a", "Gold 1")];
    let report = balance(&BalanceInput::new(players, config(2, 5))).unwrap();
    let x = &report.player_analyses[0].weight;
    assert_eq!(x.points, 150);
    assert_eq!(x.source, WeightSource::Default);
    assert!(report
        .audit
        .iter()
        .any(|e| e.message.contains("Mythic 9")));
}

// ---------------------------------------------------------------------------
// Distribution and swap scenarios
// ---------------------------------------------------------------------------

#[test]
fn ten_player_scenario_ends_within_50() {
    let mut players = Vec::new();
    for i in 0..4 {
        players.push(ranked(&format!("gold{i}"), "Gold"));
    }
    players.push(ranked("imm-a", "Immortal 1"));
    players.push(ranked("imm-b", "Immortal 1"));
    for i in 0..4 {
        players.push(ranked(&format!("silver{i}"), "Silver 1"));
    }
    let report = balance(&BalanceInput::new(players, config(2, 5))).unwrap();

    let weight = |id: &str| {
        report
            .player_analyses
            .iter()
            .find(|a| a.player_id == id)
            .map(|a| a.weight.clone())
            .unwrap()
    };
    assert_eq!(weight("gold0").points, 130);
    assert_eq!(weight("imm-a").points, 210);
    let silver = weight("silver0");
    assert_eq!(silver.reasoning[0], "Current rank Silver 1 (55 pts)");
    assert_eq!(silver.points, 100);

    let holder = |id: &str| report.teams.iter().position(|t| t.contains(id));
    assert_ne!(holder("imm-a"), holder("imm-b"));
    assert!(report.balance_analysis.global.spread <= 50);
    assert!(spread(&report.teams) <= 50);
    assert!(report.teams.iter().all(|t| t.len() == 5));
}

#[test]
fn lopsided_teams_are_improved_by_swaps() {
    let mut teams = vec![Team::new(1), Team::new(2)];
    for (id, pts) in [("a", 390), ("b", 380), ("c", 300), ("d", 290), ("e", 280)] {
        teams[0].add(member(id, pts, 400));
    }
    for (id, pts) in [("f", 110), ("g", 105), ("h", 105), ("i", 100), ("j", 100)] {
        teams[1].add(member(id, pts, 400));
    }
    let before = spread(&teams);
    let analysis = swap::search(&mut teams, &config(2, 5), &mut AuditLog::new());
    assert_eq!(analysis.initial_spread, before);
    assert!(analysis.final_spread < before);
    for s in analysis.attempts.iter().filter(|s| s.outcome == SwapOutcome::Executed) {
        assert!(s.balance_impact.spread_before - s.balance_impact.spread_after > 50);
    }
    assert!(analysis.passes <= 10);
}

#[test]
fn stacked_input_assignment_is_redistributed() {
    // Rebalance an earlier assignment that put both elites together.
    let players = vec![
        fixed("e1", 450),
        fixed("e2", 420),
        ranked("a", "Gold 1"),
        ranked("b", "Gold 2"),
    ];
    let mut input = BalanceInput::new(players, config(2, 2));
    input.existing_assignment = Some(vec![
        vec!["e1".into(), "e2".into()],
        vec!["a".into(), "b".into()],
    ]);
    let report = balance(&input).unwrap();

    let initial = report.initial_balance.as_ref().unwrap();
    assert_eq!(initial.global.elite_distribution, vec![2, 0]);
    assert_eq!(report.redistributions.len(), 1);
    assert!(report
        .decisions
        .iter()
        .any(|d| d.kind == DecisionKind::TeamRedistribution));
    assert!(report.teams.iter().all(|t| t.elite_count() == 1));
    assert_ne!(report.balance_analysis.global.quality_tier, QualityTier::Critical);
}
