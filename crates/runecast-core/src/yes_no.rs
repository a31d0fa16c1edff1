//! Mapping a single drawn rune to a yes / no / maybe answer.

use serde::{Deserialize, Serialize};

use crate::types::{DrawnRune, Orientation, RuneId};

/// Runes that lean toward "yes" when upright
const POSITIVE: &[&str] = &[
    "fehu", "uruz", "ansuz", "raidho", "kenaz", "gebo", "wunjo", "jera", "sowilo", "tiwaz",
    "berkano", "dagaz", "othala",
];

/// Runes that lean toward "no" when upright
const NEGATIVE: &[&str] = &["thurisaz", "hagalaz", "nauthiz", "isa"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNoAnswer {
    Yes,
    No,
    Maybe,
}

impl YesNoAnswer {
    pub fn for_rune(rune_id: &RuneId, orientation: Orientation) -> Self {
        let id = rune_id.as_str();
        let positive = POSITIVE.contains(&id);
        let negative = NEGATIVE.contains(&id);

        match (positive, negative, orientation) {
            (true, _, Orientation::Upright) => YesNoAnswer::Yes,
            (true, _, Orientation::Reversed) => YesNoAnswer::Maybe,
            (_, true, Orientation::Upright) => YesNoAnswer::No,
            (_, true, Orientation::Reversed) => YesNoAnswer::Maybe,
            (false, false, Orientation::Upright) => YesNoAnswer::Maybe,
            (false, false, Orientation::Reversed) => YesNoAnswer::No,
        }
    }

    pub fn for_drawn(drawn: &DrawnRune) -> Self {
        Self::for_rune(&drawn.rune.id, drawn.orientation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YesNoAnswer::Yes => "yes",
            YesNoAnswer::No => "no",
            YesNoAnswer::Maybe => "maybe",
        }
    }
}

impl std::fmt::Display for YesNoAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
