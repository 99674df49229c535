// Competitive rank ladder and the static rank -> base-point table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one rank tier in points, used to count "tiers dropped".
pub const TIER_WIDTH: u32 = 50;

/// Top-level rank tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankTier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Ascendant,
    Immortal,
    Radiant,
}

impl RankTier {
    /// Parse a tier name (already lowercased, separators stripped).
    fn from_key(s: &str) -> Option<Self> {
        match s {
            "iron" => Some(RankTier::Iron),
            "bronze" => Some(RankTier::Bronze),
            "silver" => Some(RankTier::Silver),
            "gold" => Some(RankTier::Gold),
            "platinum" | "plat" => Some(RankTier::Platinum),
            "diamond" | "dia" => Some(RankTier::Diamond),
            "ascendant" | "asc" => Some(RankTier::Ascendant),
            "immortal" | "imm" => Some(RankTier::Immortal),
            "radiant" => Some(RankTier::Radiant),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            RankTier::Iron => "Iron",
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Platinum => "Platinum",
            RankTier::Diamond => "Diamond",
            RankTier::Ascendant => "Ascendant",
            RankTier::Immortal => "Immortal",
            RankTier::Radiant => "Radiant",
        }
    }

    /// Whether the tier is split into divisions 1-3.
    pub fn has_divisions(&self) -> bool {
        !matches!(self, RankTier::Radiant)
    }
}

/// A concrete rank: tier plus division (division is 0 for Radiant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank {
    pub tier: RankTier,
    pub division: u8,
}

impl Rank {
    pub fn new(tier: RankTier, division: u8) -> Option<Self> {
        if tier.has_divisions() {
            (1..=3).contains(&division).then_some(Rank { tier, division })
        } else {
            (division == 0).then_some(Rank { tier, division: 0 })
        }
    }

    /// Base points for this rank. Low tiers sit under the weighting floor;
    /// the resolver lifts them.
    pub fn points(&self) -> u32 {
        let row: [u32; 3] = match self.tier {
            RankTier::Iron => [10, 20, 30],
            RankTier::Bronze => [35, 40, 45],
            RankTier::Silver => [55, 80, 105],
            RankTier::Gold => [130, 140, 150],
            RankTier::Platinum => [155, 160, 165],
            RankTier::Diamond => [170, 175, 180],
            RankTier::Ascendant => [185, 195, 205],
            RankTier::Immortal => [210, 300, 400],
            RankTier::Radiant => return 500,
        };
        row[usize::from(self.division.clamp(1, 3) - 1)]
    }

    /// Parse a rank name such as "Immortal 3", "immortal3", "IMMORTAL_3",
    /// "Gold" (division 1) or "Radiant".
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        if key.is_empty() {
            return None;
        }

        let digits_at = key
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(key.len());
        let (name, digits) = key.split_at(digits_at);
        let tier = RankTier::from_key(name)?;

        if digits.is_empty() {
            let division = if tier.has_divisions() { 1 } else { 0 };
            return Rank::new(tier, division);
        }
        let division: u8 = digits.parse().ok()?;
        Rank::new(tier, division)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tier.has_divisions() {
            write!(f, "{} {}", self.tier.display_str(), self.division)
        } else {
            write!(f, "{}", self.tier.display_str())
        }
    }
}

// ---------------------------------------------------------------------------
// Rank as it appears on a player record
// ---------------------------------------------------------------------------

/// A rank field after ingestion. Unrecognized strings are kept verbatim so the
/// resolver can report them instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RankEntry {
    Unranked,
    Ranked(Rank),
    Unrecognized(String),
}

impl RankEntry {
    /// Normalize a raw rank string. Empty strings mean "no data" and return `None`.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();
        if matches!(lowered.as_str(), "unranked" | "unrated" | "none" | "n/a") {
            return Some(RankEntry::Unranked);
        }
        Some(match Rank::parse(trimmed) {
            Some(rank) => RankEntry::Ranked(rank),
            None => RankEntry::Unrecognized(trimmed.to_string()),
        })
    }

    pub fn rank(&self) -> Option<Rank> {
        match self {
            RankEntry::Ranked(r) => Some(*r),
            _ => None,
        }
    }

    pub fn points(&self) -> Option<u32> {
        self.rank().map(|r| r.points())
    }

    pub fn is_unranked(&self) -> bool {
        matches!(self, RankEntry::Unranked)
    }
}

impl fmt::Display for RankEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankEntry::Unranked => write!(f, "Unranked"),
            RankEntry::Ranked(r) => write!(f, "{r}"),
            RankEntry::Unrecognized(s) => write!(f, "\"{s}\""),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separator_and_case_variants() {
        let expected = Rank::new(RankTier::Immortal, 3).unwrap();
        for s in ["Immortal 3", "immortal3", "IMMORTAL_3", "imm-3", " Immortal  3 "] {
            assert_eq!(Rank::parse(s), Some(expected), "failed on {s:?}");
        }
    }

    #[test]
    fn bare_tier_means_division_one() {
        assert_eq!(Rank::parse("Gold"), Rank::new(RankTier::Gold, 1));
        assert_eq!(Rank::parse("Radiant"), Rank::new(RankTier::Radiant, 0));
    }

    #[test]
    fn rejects_bad_divisions() {
        assert_eq!(Rank::parse("Gold 4"), None);
        assert_eq!(Rank::parse("Gold 0"), None);
        assert_eq!(Rank::parse("Radiant 1"), None);
        assert_eq!(Rank::parse("Mithril 2"), None);
    }

    #[test]
    fn table_is_strictly_increasing() {
        let tiers = [
            RankTier::Iron,
            RankTier::Bronze,
            RankTier::Silver,
            RankTier::Gold,
            RankTier::Platinum,
            RankTier::Diamond,
            RankTier::Ascendant,
            RankTier::Immortal,
        ];
        let mut last = 0;
        for tier in tiers {
            for div in 1..=3 {
                let pts = Rank::new(tier, div).unwrap().points();
                assert!(pts > last, "{tier:?} {div} should exceed {last}");
                last = pts;
            }
        }
        assert!(Rank::parse("Radiant").unwrap().points() > last);
    }

    #[test]
    fn known_anchor_points() {
        assert_eq!(Rank::parse("Radiant").unwrap().points(), 500);
        assert_eq!(Rank::parse("Immortal 3").unwrap().points(), 400);
        assert_eq!(Rank::parse("Immortal 1").unwrap().points(), 210);
        assert_eq!(Rank::parse("Gold").unwrap().points(), 130);
        assert_eq!(Rank::parse("Silver 1").unwrap().points(), 55);
        assert_eq!(Rank::parse("Iron 1").unwrap().points(), 10);
    }

    #[test]
    fn rank_entry_from_raw() {
        assert_eq!(RankEntry::from_raw("  "), None);
        assert_eq!(RankEntry::from_raw("UNRANKED"), Some(RankEntry::Unranked));
        assert_eq!(
            RankEntry::from_raw("Diamond 2"),
            Some(RankEntry::Ranked(Rank::new(RankTier::Diamond, 2).unwrap()))
        );
        assert_eq!(
            RankEntry::from_raw("Gold 7"),
            Some(RankEntry::Unrecognized("Gold 7".into()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let r = Rank::new(RankTier::Ascendant, 2).unwrap();
        assert_eq!(r.to_string(), "Ascendant 2");
        assert_eq!(Rank::parse(&r.to_string()), Some(r));
    }
}
