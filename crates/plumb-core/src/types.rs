use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity (interface boundary)
// ---------------------------------------------------------------------------

/// Three-level urgency used at the match boundary.
///
/// `Urgent` and `Emergency` impose the same emergency-capability gate in the
/// matcher; the distinction is kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Routine,
    Urgent,
    Emergency,
}

impl Severity {
    pub fn all() -> &'static [Severity] {
        &[Severity::Routine, Severity::Urgent, Severity::Emergency]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Routine => "routine",
            Severity::Urgent => "urgent",
            Severity::Emergency => "emergency",
        }
    }

    /// True when only emergency-capable providers may be matched.
    pub fn requires_emergency_capability(self) -> bool {
        !matches!(self, Severity::Routine)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = crate::error::PlumbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routine" => Ok(Severity::Routine),
            "urgent" => Ok(Severity::Urgent),
            "emergency" => Ok(Severity::Emergency),
            _ => Err(crate::error::PlumbError::InvalidSeverity(s.to_string())),
        }
    }
}

impl From<DiagnosticSeverity> for Severity {
    fn from(s: DiagnosticSeverity) -> Self {
        match s {
            DiagnosticSeverity::Emergency => Severity::Emergency,
            DiagnosticSeverity::NonEmergency => Severity::Routine,
        }
    }
}

// ---------------------------------------------------------------------------
// DiagnosticSeverity (classifier output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticSeverity {
    Emergency,
    NonEmergency,
}

impl DiagnosticSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticSeverity::Emergency => "EMERGENCY",
            DiagnosticSeverity::NonEmergency => "NON_EMERGENCY",
        }
    }

    pub fn is_emergency(self) -> bool {
        matches!(self, DiagnosticSeverity::Emergency)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Code vocabularies
// ---------------------------------------------------------------------------

/// A diagnosed problem type. Never handed to the matcher directly; see
/// [`crate::translate::translate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticCode(String);

impl DiagnosticCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A kind of work a provider advertises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityCode(String);

impl CapabilityCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_lowercase_literals_only() {
        assert_eq!("routine".parse::<Severity>().unwrap(), Severity::Routine);
        assert_eq!("urgent".parse::<Severity>().unwrap(), Severity::Urgent);
        assert_eq!("emergency".parse::<Severity>().unwrap(), Severity::Emergency);
        assert!("EMERGENCY".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn urgent_and_emergency_share_the_gate() {
        assert!(!Severity::Routine.requires_emergency_capability());
        assert!(Severity::Urgent.requires_emergency_capability());
        assert!(Severity::Emergency.requires_emergency_capability());
    }

    #[test]
    fn diagnostic_severity_serializes_screaming_case() {
        let json = serde_json::to_string(&DiagnosticSeverity::NonEmergency).unwrap();
        assert_eq!(json, "\"NON_EMERGENCY\"");
        assert_eq!(
            Severity::from(DiagnosticSeverity::Emergency),
            Severity::Emergency
        );
        assert_eq!(
            Severity::from(DiagnosticSeverity::NonEmergency),
            Severity::Routine
        );
    }

    #[test]
    fn codes_serialize_as_plain_strings() {
        let code = CapabilityCode::new("TOILET_REPAIR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"TOILET_REPAIR\"");
        let parsed: DiagnosticCode = serde_json::from_str("\"PIPE_REPAIR\"").unwrap();
        assert_eq!(parsed.as_str(), "PIPE_REPAIR");
    }
}
