// Team containers and the point arithmetic shared by every balancing stage.

use serde::{Deserialize, Serialize};

/// A placed player, carrying the effective weight used for balancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub player_id: String,
    pub display_name: String,
    pub points: u32,
    pub is_elite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    /// 1-based position; ties between teams always break toward the lower ordinal.
    pub ordinal: usize,
    pub name: String,
    pub players: Vec<TeamMember>,
    pub total_points: u32,
}

impl Team {
    pub fn new(ordinal: usize) -> Self {
        Team {
            id: format!("team-{ordinal}"),
            ordinal,
            name: format!("Team {ordinal}"),
            players: Vec::new(),
            total_points: 0,
        }
    }

    /// Build `count` empty teams with ordinals 1..=count.
    pub fn empty_set(count: usize) -> Vec<Team> {
        (1..=count).map(Team::new).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_room(&self, capacity: usize) -> bool {
        self.players.len() < capacity
    }

    pub fn add(&mut self, member: TeamMember) {
        self.total_points = self.total_points.saturating_add(member.points);
        self.players.push(member);
    }

    /// Remove a player by id, keeping the order of the rest.
    pub fn remove(&mut self, player_id: &str) -> Option<TeamMember> {
        let idx = self.players.iter().position(|m| m.player_id == player_id)?;
        let member = self.players.remove(idx);
        self.total_points = self.total_points.saturating_sub(member.points);
        Some(member)
    }

    pub fn elite_count(&self) -> usize {
        self.players.iter().filter(|m| m.is_elite).count()
    }

    /// Number of members with points at or above `threshold`.
    pub fn count_at_least(&self, threshold: u32) -> usize {
        self.players.iter().filter(|m| m.points >= threshold).count()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|m| m.player_id == player_id)
    }
}

/// Max team total minus min team total. Zero for fewer than two teams.
pub fn spread(teams: &[Team]) -> u32 {
    let max = teams.iter().map(|t| t.total_points).max().unwrap_or(0);
    let min = teams.iter().map(|t| t.total_points).min().unwrap_or(0);
    max - min
}

/// Index of the heaviest team; ties go to the lowest ordinal.
pub fn strongest(teams: &[Team]) -> Option<usize> {
    teams
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.total_points
                .cmp(&b.total_points)
                .then(b.ordinal.cmp(&a.ordinal))
        })
        .map(|(i, _)| i)
}

/// Index of the lightest team; ties go to the lowest ordinal.
pub fn weakest(teams: &[Team]) -> Option<usize> {
    teams
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.total_points
                .cmp(&b.total_points)
                .then(a.ordinal.cmp(&b.ordinal))
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, points: u32, is_elite: bool) -> TeamMember {
        TeamMember {
            player_id: id.to_string(),
            display_name: id.to_uppercase(),
            points,
            is_elite,
        }
    }

    #[test]
    fn add_and_remove_track_totals() {
        let mut t = Team::new(1);
        t.add(member("a", 300, false));
        t.add(member("b", 450, true));
        assert_eq!(t.total_points, 750);
        assert_eq!(t.elite_count(), 1);
        assert_eq!(t.count_at_least(300), 2);

        let removed = t.remove("a").unwrap();
        assert_eq!(removed.points, 300);
        assert_eq!(t.total_points, 450);
        assert!(t.remove("missing").is_none());
    }

    #[test]
    fn strongest_and_weakest_break_ties_by_ordinal() {
        let mut teams = Team::empty_set(3);
        teams[1].add(member("a", 200, false));
        teams[2].add(member("b", 200, false));
        assert_eq!(strongest(&teams), Some(1));
        assert_eq!(weakest(&teams), Some(0));
        assert_eq!(spread(&teams), 200);
        assert_eq!(teams[2].id, "team-3");
        assert_eq!(teams[2].name, "Team 3");
    }

    #[test]
    fn spread_of_nothing_is_zero() {
        assert_eq!(spread(&[]), 0);
    }
}
