//! The Elder Futhark rune catalog.
//!
//! The catalog is read-only at runtime. A built-in copy of the 24 runes seeds
//! storage on first open; afterwards the engine fetches it once from the
//! persistence gateway and shares it behind an `Arc`.

use std::collections::HashSet;

use crate::error::{RuneError, RuneResult};
use crate::types::{Aett, Rune, RuneId};

/// Ordered, immutable collection of rune definitions
#[derive(Debug, Clone, PartialEq)]
pub struct RuneCatalog {
    runes: Vec<Rune>,
}

impl RuneCatalog {
    /// Build a catalog, ordering by futhark position.
    ///
    /// Duplicate identifiers are rejected.
    pub fn from_runes(mut runes: Vec<Rune>) -> RuneResult<Self> {
        let mut seen = HashSet::new();
        for rune in &runes {
            if !seen.insert(rune.id.clone()) {
                return Err(RuneError::Validation(format!(
                    "duplicate rune id in catalog: {}",
                    rune.id
                )));
            }
        }
        runes.sort_by_key(|r| r.position);
        Ok(Self { runes })
    }

    /// The standard 24-rune Elder Futhark
    pub fn elder_futhark() -> Self {
        let runes = ELDER_FUTHARK
            .iter()
            .enumerate()
            .map(|(i, def)| def.to_rune(i as u8 + 1))
            .collect();
        Self { runes }
    }

    pub fn runes(&self) -> &[Rune] {
        &self.runes
    }

    pub fn len(&self) -> usize {
        self.runes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    pub fn get(&self, id: &RuneId) -> Option<&Rune> {
        self.runes.iter().find(|r| &r.id == id)
    }

    /// Find a rune by id or display name, ignoring case
    pub fn find(&self, query: &str) -> Option<&Rune> {
        let query = query.trim();
        self.runes
            .iter()
            .find(|r| r.id.as_str().eq_ignore_ascii_case(query) || r.name.eq_ignore_ascii_case(query))
    }

    /// Like [`find`](Self::find) but fails with `RuneNotFound`
    pub fn require(&self, query: &str) -> RuneResult<&Rune> {
        self.find(query)
            .ok_or_else(|| RuneError::RuneNotFound(query.to_string()))
    }

    pub fn by_aett(&self, aett: Aett) -> impl Iterator<Item = &Rune> {
        self.runes.iter().filter(move |r| r.aett == Some(aett))
    }
}

struct RuneDef {
    name: &'static str,
    glyph: &'static str,
    phonetic: &'static str,
    meaning: &'static str,
    keywords: &'static [&'static str],
    upright: &'static str,
    reversed: Option<&'static str>,
    element: &'static str,
}

impl RuneDef {
    fn to_rune(&self, position: u8) -> Rune {
        let aett = match position {
            1..=8 => Aett::Freyr,
            9..=16 => Aett::Hagal,
            _ => Aett::Tyr,
        };
        Rune {
            id: RuneId::new(self.name),
            name: self.name.to_string(),
            glyph: self.glyph.to_string(),
            phonetic: self.phonetic.to_string(),
            meaning: self.meaning.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            upright: self.upright.to_string(),
            reversed: self.reversed.map(str::to_string),
            element: Some(self.element.to_string()),
            aett: Some(aett),
            position,
        }
    }
}

const ELDER_FUTHARK: [RuneDef; 24] = [
    RuneDef {
        name: "Fehu",
        glyph: "ᚠ",
        phonetic: "f",
        meaning: "Cattle, wealth",
        keywords: &["abundance", "prosperity", "energy"],
        upright: "Wealth earned and shared. Energy flows toward you; use it well.",
        reversed: Some("Loss or greed. Something of value is slipping away."),
        element: "Fire",
    },
    RuneDef {
        name: "Uruz",
        glyph: "ᚢ",
        phonetic: "u",
        meaning: "Aurochs, strength",
        keywords: &["strength", "health", "vitality"],
        upright: "Raw strength and endurance. A time of vigour and courage.",
        reversed: Some("Weakness or misdirected force. Rest before you push on."),
        element: "Earth",
    },
    RuneDef {
        name: "Thurisaz",
        glyph: "ᚦ",
        phonetic: "th",
        meaning: "Giant, thorn",
        keywords: &["defense", "conflict", "catalyst"],
        upright: "A gateway and a thorn. Pause before acting; protection is at hand.",
        reversed: Some("Danger or malice. Rash action invites harm."),
        element: "Fire",
    },
    RuneDef {
        name: "Ansuz",
        glyph: "ᚨ",
        phonetic: "a",
        meaning: "The god, breath",
        keywords: &["communication", "wisdom", "insight"],
        upright: "Messages and wise counsel. Listen closely to what is said.",
        reversed: Some("Misunderstanding or deceit. Check what you are told."),
        element: "Air",
    },
    RuneDef {
        name: "Raidho",
        glyph: "ᚱ",
        phonetic: "r",
        meaning: "Riding, journey",
        keywords: &["travel", "rhythm", "progress"],
        upright: "A journey, outer or inner, taken at the right pace.",
        reversed: Some("Delays and disruption. The road is blocked for now."),
        element: "Air",
    },
    RuneDef {
        name: "Kenaz",
        glyph: "ᚲ",
        phonetic: "k",
        meaning: "Torch",
        keywords: &["knowledge", "creativity", "clarity"],
        upright: "Illumination and craft. What was hidden comes to light.",
        reversed: Some("A fading light. Creative block or loss of direction."),
        element: "Fire",
    },
    RuneDef {
        name: "Gebo",
        glyph: "ᚷ",
        phonetic: "g",
        meaning: "Gift",
        keywords: &["partnership", "generosity", "balance"],
        upright: "A gift given and returned. Balance in partnership.",
        reversed: None,
        element: "Air",
    },
    RuneDef {
        name: "Wunjo",
        glyph: "ᚹ",
        phonetic: "w",
        meaning: "Joy",
        keywords: &["joy", "harmony", "fellowship"],
        upright: "Joy and belonging. A wish moves toward fulfilment.",
        reversed: Some("Sorrow or alienation. Harmony must be rebuilt."),
        element: "Earth",
    },
    RuneDef {
        name: "Hagalaz",
        glyph: "ᚺ",
        phonetic: "h",
        meaning: "Hail",
        keywords: &["disruption", "change", "trial"],
        upright: "Hail falls and melts. Disruption that clears the way for renewal.",
        reversed: None,
        element: "Ice",
    },
    RuneDef {
        name: "Nauthiz",
        glyph: "ᚾ",
        phonetic: "n",
        meaning: "Need",
        keywords: &["need", "constraint", "endurance"],
        upright: "Need and constraint. Patience and resourcefulness are required.",
        reversed: Some("Deprivation and stubbornness. Recognise what you truly need."),
        element: "Fire",
    },
    RuneDef {
        name: "Isa",
        glyph: "ᛁ",
        phonetic: "i",
        meaning: "Ice",
        keywords: &["stillness", "pause", "clarity"],
        upright: "Ice holds everything still. Wait; this is not the time to move.",
        reversed: None,
        element: "Ice",
    },
    RuneDef {
        name: "Jera",
        glyph: "ᛃ",
        phonetic: "j",
        meaning: "Year, harvest",
        keywords: &["harvest", "cycles", "reward"],
        upright: "The harvest arrives in its season. Effort is rewarded.",
        reversed: None,
        element: "Earth",
    },
    RuneDef {
        name: "Eihwaz",
        glyph: "ᛇ",
        phonetic: "ei",
        meaning: "Yew tree",
        keywords: &["endurance", "transformation", "protection"],
        upright: "The yew endures. Steadfastness through transformation.",
        reversed: None,
        element: "Earth",
    },
    RuneDef {
        name: "Perthro",
        glyph: "ᛈ",
        phonetic: "p",
        meaning: "Lot cup, mystery",
        keywords: &["fate", "mystery", "chance"],
        upright: "The lot cup. Fate turns and secrets are revealed.",
        reversed: Some("Stagnation or unwelcome surprise. Something stays hidden."),
        element: "Water",
    },
    RuneDef {
        name: "Algiz",
        glyph: "ᛉ",
        phonetic: "z",
        meaning: "Elk, protection",
        keywords: &["protection", "guardianship", "instinct"],
        upright: "Protection and higher guidance. Trust your instincts.",
        reversed: Some("Vulnerability. Guard yourself and heed warnings."),
        element: "Air",
    },
    RuneDef {
        name: "Sowilo",
        glyph: "ᛊ",
        phonetic: "s",
        meaning: "Sun",
        keywords: &["success", "vitality", "victory"],
        upright: "The sun shines. Success, health and clear purpose.",
        reversed: None,
        element: "Fire",
    },
    RuneDef {
        name: "Tiwaz",
        glyph: "ᛏ",
        phonetic: "t",
        meaning: "The god Tyr",
        keywords: &["justice", "honour", "sacrifice"],
        upright: "Justice and courage. Victory through honourable sacrifice.",
        reversed: Some("Injustice or a failure of nerve. Energy is scattered."),
        element: "Air",
    },
    RuneDef {
        name: "Berkano",
        glyph: "ᛒ",
        phonetic: "b",
        meaning: "Birch goddess",
        keywords: &["growth", "fertility", "renewal"],
        upright: "New beginnings and nurturing growth.",
        reversed: Some("Stalled growth or family worries."),
        element: "Earth",
    },
    RuneDef {
        name: "Ehwaz",
        glyph: "ᛖ",
        phonetic: "e",
        meaning: "Horse",
        keywords: &["movement", "trust", "teamwork"],
        upright: "Steady progress with a trusted partner.",
        reversed: Some("Restlessness or mistrust. A partnership falters."),
        element: "Earth",
    },
    RuneDef {
        name: "Mannaz",
        glyph: "ᛗ",
        phonetic: "m",
        meaning: "Humankind",
        keywords: &["self", "community", "awareness"],
        upright: "The self among others. Cooperation and self-knowledge.",
        reversed: Some("Isolation or self-deception. Look honestly at yourself."),
        element: "Air",
    },
    RuneDef {
        name: "Laguz",
        glyph: "ᛚ",
        phonetic: "l",
        meaning: "Water, lake",
        keywords: &["intuition", "flow", "emotion"],
        upright: "Water flows. Trust intuition and the deeper currents.",
        reversed: Some("Confusion and poor judgement. Emotions run unchecked."),
        element: "Water",
    },
    RuneDef {
        name: "Ingwaz",
        glyph: "ᛜ",
        phonetic: "ng",
        meaning: "The god Ing, seed",
        keywords: &["gestation", "completion", "potential"],
        upright: "A seed at rest. Completion and a new cycle waiting to begin.",
        reversed: None,
        element: "Earth",
    },
    RuneDef {
        name: "Dagaz",
        glyph: "ᛞ",
        phonetic: "d",
        meaning: "Day, dawn",
        keywords: &["breakthrough", "awakening", "hope"],
        upright: "Daybreak. A breakthrough and a clear new outlook.",
        reversed: None,
        element: "Fire",
    },
    RuneDef {
        name: "Othala",
        glyph: "ᛟ",
        phonetic: "o",
        meaning: "Heritage, estate",
        keywords: &["inheritance", "home", "legacy"],
        upright: "Home and heritage. What is handed down sustains you.",
        reversed: Some("Loss of roots or clinging to the past."),
        element: "Earth",
    },
];
