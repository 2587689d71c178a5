use crate::classify::DiagnosticInput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node id (or semantic alias) → chosen label, for one traversal.
pub type Answers = BTreeMap<String, String>;

pub const NOT_SPECIFIED: &str = "(not specified)";
pub const TRAIL_SEPARATOR: &str = " → ";

// ---------------------------------------------------------------------------
// Alias keys, in resolution order (first non-blank wins)
// ---------------------------------------------------------------------------

pub const URGENCY_KEYS: &[&str] = &["emergency_check", "urgency"];

pub const ROOM_KEYS: &[&str] = &["location", "room"];

pub const FIXTURE_KEYS: &[&str] = &[
    "fixture_kitchen",
    "fixture_bathroom",
    "fixture_basement",
    "fixture_laundry",
    "fixture_outside",
    "fixture",
];

pub const SYMPTOM_KEYS: &[&str] = &[
    "symptom_sink",
    "symptom_dishwasher",
    "symptom_disposal",
    "symptom_toilet",
    "symptom_shower",
    "symptom_tub",
    "symptom_floor_drain",
    "symptom_water_heater",
    "symptom_sump_pump",
    "symptom_gas_line",
    "symptom_main_line",
    "symptom_pipe",
    "symptom",
];

// ---------------------------------------------------------------------------
// NormalizedAnswers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAnswers {
    pub room: String,
    pub fixture: String,
    pub symptom: String,
    /// `"Yes"`, `"No"`, or empty when no urgency answer was given.
    pub urgency: String,
    pub emergency: bool,
    pub reported_trail: String,
}

impl NormalizedAnswers {
    pub fn diagnostic_input(&self) -> DiagnosticInput {
        DiagnosticInput {
            room: self.room.clone(),
            fixture: self.fixture.clone(),
            symptom: self.symptom.clone(),
            urgency: self.urgency.clone(),
        }
    }
}

/// First non-blank value among `keys`, trimmed. Empty when none match.
pub fn first_answer(answers: &Answers, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| answers.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub fn normalize(answers: &Answers) -> NormalizedAnswers {
    let raw_urgency = first_answer(answers, URGENCY_KEYS);
    let emergency = raw_urgency.eq_ignore_ascii_case("yes");
    let urgency = match (raw_urgency.is_empty(), emergency) {
        (true, _) => String::new(),
        (false, true) => "Yes".to_string(),
        (false, false) => "No".to_string(),
    };

    let room = first_answer(answers, ROOM_KEYS);
    let fixture = first_answer(answers, FIXTURE_KEYS);
    let symptom = first_answer(answers, SYMPTOM_KEYS);

    NormalizedAnswers {
        reported_trail: reported_trail(&room, &fixture, &symptom),
        room,
        fixture,
        symptom,
        urgency,
        emergency,
    }
}

pub fn reported_trail(room: &str, fixture: &str, symptom: &str) -> String {
    let parts: Vec<&str> = [room, fixture, symptom]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        parts.join(TRAIL_SEPARATOR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
