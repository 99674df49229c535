// Forced elite redistribution: breaks up elite stacks before swap search.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, Stage};
use crate::team::{spread, Team};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redistribution {
    pub player_id: String,
    pub display_name: String,
    pub points: u32,
    pub from_team: String,
    pub to_team: String,
    /// Non-elite sent back when the receiving team had no free seat.
    pub exchanged_with: Option<String>,
    pub spread_before: u32,
    pub spread_after: u32,
    pub reasoning: String,
}

/// Move the lowest-weight elite off each stacked team, in team order, onto
/// the lightest elite-free team. Relocates when the receiver has room,
/// otherwise exchanges with the receiver's heaviest player. Stops when no
/// stack or no elite-free team remains.
pub fn force_redistribute(teams: &mut [Team], capacity: usize, audit: &mut AuditLog) -> Vec<Redistribution> {
    let mut out = Vec::new();
    loop {
        let Some(src) = teams.iter().position(|t| t.elite_count() > 1) else {
            break;
        };
        let Some(dst) = teams
            .iter()
            .enumerate()
            .filter(|(_, t)| t.elite_count() == 0)
            .min_by_key(|(_, t)| (t.total_points, t.ordinal))
            .map(|(i, _)| i)
        else {
            audit.anomaly(
                Stage::Redistribution,
                format!("{} stays stacked: no elite-free team remains", teams[src].name),
            );
            break;
        };

        let Some(elite) = teams[src]
            .players
            .iter()
            .filter(|m| m.is_elite)
            .reduce(|a, b| if b.points < a.points { b } else { a })
            .cloned()
        else {
            break;
        };

        let spread_before = spread(teams);
        let exchanged = if teams[dst].has_room(capacity) {
            None
        } else {
            teams[dst]
                .players
                .iter()
                .reduce(|a, b| if b.points > a.points { b } else { a })
                .cloned()
        };
        if !teams[dst].has_room(capacity) && exchanged.is_none() {
            break;
        }

        let Some(moved) = teams[src].remove(&elite.player_id) else {
            break;
        };
        if let Some(back) = &exchanged {
            if let Some(member) = teams[dst].remove(&back.player_id) {
                teams[src].add(member);
            }
        }
        teams[dst].add(moved);
        let spread_after = spread(teams);

        let reasoning = match &exchanged {
            Some(back) => format!(
                "{} ({}) moved from stacked {} to elite-free {}, exchanged for {} ({})",
                elite.display_name, elite.points, teams[src].name, teams[dst].name,
                back.display_name, back.points
            ),
            None => format!(
                "{} ({}) moved from stacked {} to elite-free {}",
                elite.display_name, elite.points, teams[src].name, teams[dst].name
            ),
        };
        audit.info(Stage::Redistribution, reasoning.clone());
        out.push(Redistribution {
            player_id: elite.player_id,
            display_name: elite.display_name,
            points: elite.points,
            from_team: teams[src].id.clone(),
            to_team: teams[dst].id.clone(),
            exchanged_with: exchanged.map(|m| m.player_id),
            spread_before,
            spread_after,
            reasoning,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::TeamMember;

    fn team(ordinal: usize, players: &[(&str, u32)]) -> Team {
        let mut t = Team::new(ordinal);
        for &(id, points) in players {
            t.add(TeamMember {
                player_id: id.to_string(),
                display_name: id.to_string(),
                points,
                is_elite: points >= 400,
            });
        }
        t
    }

    #[test]
    fn relocates_when_room() {
        let mut teams = vec![team(1, &[("a", 500), ("b", 420)]), team(2, &[("c", 200)])];
        let moves = force_redistribute(&mut teams, 3, &mut AuditLog::new());
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].player_id, "b");
        assert!(moves[0].exchanged_with.is_none());
        assert!(teams[1].contains("b"));
        assert!(teams.iter().all(|t| t.elite_count() == 1));
    }

    #[test]
    fn exchanges_with_heaviest_when_full() {
        let mut teams = vec![
            team(1, &[("a", 500), ("b", 420)]),
            team(2, &[("c", 200), ("d", 300)]),
        ];
        let moves = force_redistribute(&mut teams, 2, &mut AuditLog::new());
        assert_eq!(moves[0].exchanged_with.as_deref(), Some("d"));
        assert!(teams[0].contains("d"));
        assert!(teams[1].contains("b"));
        assert_eq!(teams[0].len(), 2);
    }

    #[test]
    fn stops_without_elite_free_team() {
        let mut teams = vec![
            team(1, &[("a", 500), ("b", 420)]),
            team(2, &[("c", 450)]),
        ];
        let mut audit = AuditLog::new();
        let moves = force_redistribute(&mut teams, 3, &mut audit);
        assert!(moves.is_empty());
        assert_eq!(audit.anomalies().count(), 1);
    }
}
