//! Spread layouts and the position mapper.
//!
//! Each spread type owns a closed, ordered list of named positions. Mapping
//! drawn runes onto a spread is index-aligned: the i-th rune occupies the
//! i-th position.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RuneError, RuneResult};
use crate::types::{DrawnRune, Orientation, Rune};

/// A named slot in a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSpec {
    /// Stable machine name stored with divinations (e.g. `past`)
    pub name: &'static str,
    /// Human-readable label (e.g. `The Past`)
    pub label: &'static str,
    pub description: &'static str,
}

const fn pos(name: &'static str, label: &'static str, description: &'static str) -> PositionSpec {
    PositionSpec {
        name,
        label,
        description,
    }
}

const THREE_RUNE: &[PositionSpec] = &[
    pos("past", "The Past", "Influences and events that shaped the situation"),
    pos("present", "The Present", "The current state of affairs"),
    pos("future", "The Future", "Where the current path is leading"),
];

const FIVE_RUNE_CROSS: &[PositionSpec] = &[
    pos("present", "The Present", "The heart of the matter as it stands now"),
    pos("past", "The Past", "What lies behind and still resonates"),
    pos("future", "The Future", "What is approaching"),
    pos("foundation", "The Foundation", "The hidden root beneath the question"),
    pos("potential", "The Potential", "The best outcome within reach"),
];

const SEVEN_RUNE_MAP: &[PositionSpec] = &[
    pos("self", "The Self", "Who you are in this situation"),
    pos("past", "The Past", "The road already travelled"),
    pos("present", "The Present", "Where you stand today"),
    pos("future", "The Future", "The road ahead"),
    pos("obstacles", "The Obstacles", "What blocks the way"),
    pos("allies", "The Allies", "Help that is available to you"),
    pos("outcome", "The Outcome", "Where the map leads if followed"),
];

const CELTIC_CROSS: &[PositionSpec] = &[
    pos("present", "The Present", "The situation at its core"),
    pos("challenge", "The Challenge", "What crosses you"),
    pos("foundation", "The Foundation", "The distant past and root causes"),
    pos("recent_past", "The Recent Past", "What is passing away"),
    pos("crown", "The Crown", "Conscious aims and what may be achieved"),
    pos("near_future", "The Near Future", "What is coming soon"),
    pos("self", "The Self", "Your attitude and stance"),
    pos("environment", "The Environment", "People and forces around you"),
    pos("hopes_fears", "Hopes and Fears", "What you long for and what you dread"),
    pos("outcome", "The Outcome", "The likely resolution"),
];

const LOVE_READING: &[PositionSpec] = &[
    pos("you", "You", "Your heart and what you bring"),
    pos("partner", "Your Partner", "Their heart and what they bring"),
    pos("connection", "The Connection", "The bond between you"),
    pos("challenge", "The Challenge", "What tests the relationship"),
    pos("outcome", "The Outcome", "Where the relationship is heading"),
];

const YES_NO: &[PositionSpec] = &[pos("answer", "The Answer", "The runes' reply")];

/// The spread layouts a reading can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadType {
    ThreeRune,
    FiveRuneCross,
    SevenRuneMap,
    CelticCross,
    LoveReading,
    YesNo,
}

impl SpreadType {
    pub const ALL: [SpreadType; 6] = [
        SpreadType::ThreeRune,
        SpreadType::FiveRuneCross,
        SpreadType::SevenRuneMap,
        SpreadType::CelticCross,
        SpreadType::LoveReading,
        SpreadType::YesNo,
    ];

    /// Storage tag (`three_rune`, `celtic_cross`, ...)
    pub fn tag(&self) -> &'static str {
        match self {
            SpreadType::ThreeRune => "three_rune",
            SpreadType::FiveRuneCross => "five_rune_cross",
            SpreadType::SevenRuneMap => "seven_rune_map",
            SpreadType::CelticCross => "celtic_cross",
            SpreadType::LoveReading => "love_reading",
            SpreadType::YesNo => "yes_no",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SpreadType::ThreeRune => "Three Rune Spread",
            SpreadType::FiveRuneCross => "Five Rune Cross",
            SpreadType::SevenRuneMap => "Seven Rune Map",
            SpreadType::CelticCross => "Celtic Cross",
            SpreadType::LoveReading => "Love Reading",
            SpreadType::YesNo => "Yes or No",
        }
    }

    pub fn positions(&self) -> &'static [PositionSpec] {
        match self {
            SpreadType::ThreeRune => THREE_RUNE,
            SpreadType::FiveRuneCross => FIVE_RUNE_CROSS,
            SpreadType::SevenRuneMap => SEVEN_RUNE_MAP,
            SpreadType::CelticCross => CELTIC_CROSS,
            SpreadType::LoveReading => LOVE_READING,
            SpreadType::YesNo => YES_NO,
        }
    }

    pub fn position_count(&self) -> usize {
        self.positions().len()
    }

    /// Look up a position by its stored name
    pub fn position(&self, name: &str) -> Option<&'static PositionSpec> {
        self.positions().iter().find(|p| p.name == name)
    }

    /// Spreads beyond three-rune and yes/no need an active subscription
    pub fn requires_premium(&self) -> bool {
        !matches!(self, SpreadType::ThreeRune | SpreadType::YesNo)
    }
}

impl std::fmt::Display for SpreadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SpreadType {
    type Err = RuneError;

    /// Accepts the storage tag or its kebab-case form (`celtic-cross`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SpreadType::ALL
            .into_iter()
            .find(|spread| spread.tag() == normalized)
            .ok_or_else(|| RuneError::Validation(format!("unknown spread type: {s}")))
    }
}

/// Pair each oriented rune with the position at the same index.
pub fn assign_positions(
    drawn: Vec<(Rune, Orientation)>,
    positions: &[PositionSpec],
) -> RuneResult<Vec<DrawnRune>> {
    if drawn.len() != positions.len() {
        return Err(RuneError::PositionMismatch {
            drawn: drawn.len(),
            positions: positions.len(),
        });
    }

    Ok(drawn
        .into_iter()
        .zip(positions.iter().copied())
        .map(|((rune, orientation), position)| DrawnRune {
            rune,
            position,
            orientation,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuneCatalog;

    #[test]
    fn test_position_counts() {
        assert_eq!(SpreadType::ThreeRune.position_count(), 3);
        assert_eq!(SpreadType::FiveRuneCross.position_count(), 5);
        assert_eq!(SpreadType::SevenRuneMap.position_count(), 7);
        assert_eq!(SpreadType::CelticCross.position_count(), 10);
        assert_eq!(SpreadType::LoveReading.position_count(), 5);
        assert_eq!(SpreadType::YesNo.position_count(), 1);
    }

    #[test]
    fn test_position_names_unique_within_spread() {
        for spread in SpreadType::ALL {
            let mut names: Vec<_> = spread.positions().iter().map(|p| p.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), spread.position_count(), "{spread}");
        }
    }

    #[test]
    fn test_three_rune_positions_in_order() {
        let names: Vec<_> = SpreadType::ThreeRune
            .positions()
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["past", "present", "future"]);
    }

    #[test]
    fn test_tag_roundtrip_through_from_str() {
        for spread in SpreadType::ALL {
            assert_eq!(spread.tag().parse::<SpreadType>().unwrap(), spread);
        }
        assert_eq!(
            "celtic-cross".parse::<SpreadType>().unwrap(),
            SpreadType::CelticCross
        );
        assert!("tarot".parse::<SpreadType>().is_err());
    }

    #[test]
    fn test_serde_tag_matches_storage_tag() {
        let json = serde_json::to_string(&SpreadType::CelticCross).unwrap();
        assert_eq!(json, "\"celtic_cross\"");
    }

    #[test]
    fn test_premium_gating() {
        assert!(!SpreadType::ThreeRune.requires_premium());
        assert!(!SpreadType::YesNo.requires_premium());
        assert!(SpreadType::CelticCross.requires_premium());
        assert!(SpreadType::LoveReading.requires_premium());
    }

    #[test]
    fn test_assign_positions_index_aligned() {
        let catalog = RuneCatalog::elder_futhark();
        let drawn: Vec<_> = catalog
            .runes()
            .iter()
            .take(3)
            .cloned()
            .map(|r| (r, Orientation::Upright))
            .collect();

        let placed = assign_positions(drawn, SpreadType::ThreeRune.positions()).unwrap();
        assert_eq!(placed[0].rune.id.as_str(), "fehu");
        assert_eq!(placed[0].position.name, "past");
        assert_eq!(placed[2].rune.id.as_str(), "thurisaz");
        assert_eq!(placed[2].position.name, "future");
    }

    #[test]
    fn test_assign_positions_length_mismatch() {
        let catalog = RuneCatalog::elder_futhark();
        let drawn = vec![(catalog.runes()[0].clone(), Orientation::Reversed)];
        let err = assign_positions(drawn, SpreadType::ThreeRune.positions()).unwrap_err();
        assert!(matches!(
            err,
            RuneError::PositionMismatch {
                drawn: 1,
                positions: 3
            }
        ));
    }
}
