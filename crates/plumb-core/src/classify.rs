use crate::rules::default_rules;
use crate::types::{DiagnosticCode, DiagnosticSeverity};
use serde::{Deserialize, Serialize};

/// Fallback code when no rule applies.
pub const GENERAL_PLUMBING: &str = "GENERAL_PLUMBING";

pub const BASE_CONFIDENCE: f64 = 0.6;
pub const COMPLETE_INPUT_CONFIDENCE: f64 = 0.75;
pub const EMERGENCY_CONFIDENCE_BONUS: f64 = 0.05;

// ---------------------------------------------------------------------------
// DiagnosticInput / DiagnosticResult
// ---------------------------------------------------------------------------

/// Canonical classifier input. Empty fields mean "unspecified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticInput {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub fixture: String,
    #[serde(default)]
    pub symptom: String,
    /// `"Yes"` marks an emergency. Compared case-sensitively.
    #[serde(default)]
    pub urgency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub service_code: DiagnosticCode,
    pub severity: DiagnosticSeverity,
    /// Informational only; never consulted by the matcher.
    pub confidence: f64,
    pub explanation: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A (room, fixture[, symptom]) pattern. `None` matches anything.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub room: Option<&'static str>,
    pub fixture: &'static str,
    pub symptom: Option<&'static str>,
    pub code: &'static str,
    pub reason: &'static str,
}

impl Rule {
    pub fn matches(&self, input: &DiagnosticInput) -> bool {
        let same = |pattern: &str, value: &str| pattern.eq_ignore_ascii_case(value.trim());
        self.room.map_or(true, |r| same(r, &input.room))
            && same(self.fixture, &input.fixture)
            && self.symptom.map_or(true, |s| same(s, &input.symptom))
    }
}

/// Symptom keywords that add an observation without changing the code.
const SYMPTOM_NOTES: &[(&[&str], &str)] = &[
    (&["slow", "clog"], "Symptoms indicate a clogged or slow drain."),
    (&["leak"], "Symptoms indicate an active leak."),
    (&["backing up", "backup", "overflow"], "Symptoms indicate water backing up."),
    (&["no hot water"], "Symptoms indicate a loss of hot water."),
];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Severity and capability are decided independently: room, fixture and
    /// symptom never influence severity.
    pub fn classify(&self, input: &DiagnosticInput) -> DiagnosticResult {
        let mut explanation = Vec::new();

        let severity = if input.urgency == "Yes" {
            DiagnosticSeverity::Emergency
        } else {
            DiagnosticSeverity::NonEmergency
        };
        explanation.push(match severity {
            DiagnosticSeverity::Emergency => {
                "You indicated this is an emergency situation.".to_string()
            }
            DiagnosticSeverity::NonEmergency => {
                "You indicated this is not an emergency.".to_string()
            }
        });

        let service_code = match self.rules.iter().find(|r| r.matches(input)) {
            Some(rule) => {
                tracing::debug!(rule = rule.id, code = rule.code, "classification rule matched");
                explanation.push(rule.reason.to_string());
                DiagnosticCode::new(rule.code)
            }
            None => {
                explanation.push("No specific pattern matched; using general plumbing.".to_string());
                DiagnosticCode::new(GENERAL_PLUMBING)
            }
        };

        let symptom = input.symptom.to_lowercase();
        for (keywords, note) in SYMPTOM_NOTES {
            if keywords.iter().any(|k| symptom.contains(k)) {
                explanation.push((*note).to_string());
            }
        }

        explanation.push(format!("Mapped to service code: {service_code}"));

        let mut confidence = BASE_CONFIDENCE;
        if !input.room.is_empty() && !input.fixture.is_empty() && !input.symptom.is_empty() {
            confidence = COMPLETE_INPUT_CONFIDENCE;
        }
        if severity.is_emergency() {
            confidence += EMERGENCY_CONFIDENCE_BONUS;
        }

        DiagnosticResult {
            service_code,
            severity,
            confidence,
            explanation,
        }
    }
}

/// Classify with the default rule set.
pub fn classify(input: &DiagnosticInput) -> DiagnosticResult {
    Classifier::default().classify(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
