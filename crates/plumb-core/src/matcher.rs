use crate::error::MatchRequestError;
use crate::provider::Provider;
use crate::types::{CapabilityCode, Severity};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

pub const DEFAULT_EMERGENCY_CAPABILITY: &str = "EMERGENCY_PLUMBING";

pub const EXACT_MATCH_POINTS: u32 = 100;
pub const ROUTINE_BONUS: u32 = 10;
pub const EMERGENCY_BONUS: u32 = 50;

// ---------------------------------------------------------------------------
// MatchRequest
// ---------------------------------------------------------------------------

/// A validated match request: at least one non-blank service code and a
/// known severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    service_codes: Vec<CapabilityCode>,
    severity: Severity,
}

impl MatchRequest {
    pub fn new(
        service_codes: Vec<CapabilityCode>,
        severity: Severity,
    ) -> Result<Self, MatchRequestError> {
        if service_codes.is_empty() {
            return Err(MatchRequestError::EmptyServiceCodes);
        }
        if let Some(i) = service_codes.iter().position(|c| c.as_str().trim().is_empty()) {
            return Err(MatchRequestError::BlankServiceCode(i));
        }
        let service_codes = service_codes
            .into_iter()
            .map(|c| CapabilityCode::new(c.as_str().trim()))
            .collect();
        Ok(Self {
            service_codes,
            severity,
        })
    }

    /// Validate an untyped JSON payload of the shape
    /// `{"serviceCodes": [..], "severity": "routine"|"urgent"|"emergency"}`.
    pub fn from_json(value: &Value) -> Result<Self, MatchRequestError> {
        let obj = value.as_object().ok_or(MatchRequestError::NotAnObject)?;

        let codes = obj
            .get("serviceCodes")
            .ok_or(MatchRequestError::MissingField("serviceCodes"))?;
        let codes = codes
            .as_array()
            .ok_or_else(|| MatchRequestError::ServiceCodesNotArray(json_kind(codes).to_string()))?;
        if codes.is_empty() {
            return Err(MatchRequestError::EmptyServiceCodes);
        }
        let mut service_codes = Vec::with_capacity(codes.len());
        for (index, code) in codes.iter().enumerate() {
            let s = code
                .as_str()
                .ok_or_else(|| MatchRequestError::NonStringServiceCode {
                    index,
                    found: json_kind(code).to_string(),
                })?;
            service_codes.push(CapabilityCode::new(s));
        }

        let severity = obj
            .get("severity")
            .ok_or(MatchRequestError::MissingField("severity"))?;
        let severity = severity
            .as_str()
            .ok_or_else(|| MatchRequestError::SeverityNotString(json_kind(severity).to_string()))?;
        let severity = severity
            .parse::<Severity>()
            .map_err(|_| MatchRequestError::InvalidSeverity(severity.to_string()))?;

        Self::new(service_codes, severity)
    }

    /// Parse and validate a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, MatchRequestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| MatchRequestError::InvalidJson(e.to_string()))?;
        Self::from_json(&value)
    }

    pub fn service_codes(&self) -> &[CapabilityCode] {
        &self.service_codes
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Deduplicated required capability set.
    pub fn required(&self) -> BTreeSet<CapabilityCode> {
        self.service_codes.iter().cloned().collect()
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Ranking / MatchResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub score: u32,
    pub exact_matches: usize,
    /// The full required set, echoed back.
    pub supported_services: Vec<CapabilityCode>,
    pub emergency_capable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub provider: Provider,
    /// Required capabilities this provider advertises, sorted by code.
    pub matched_services: Vec<CapabilityCode>,
    pub ranking: Ranking,
}

// ---------------------------------------------------------------------------
// Verdicts (audit trail)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    Included,
    NoRequiredServices,
    MissingServices,
    NotEmergencyCapable,
}

impl VerdictReason {
    pub fn message(self) -> &'static str {
        match self {
            VerdictReason::Included => {
                "Included: supports all required services and passes emergency gate"
            }
            VerdictReason::NoRequiredServices => "Excluded: no required services were given",
            VerdictReason::MissingServices => "Excluded: missing required services",
            VerdictReason::NotEmergencyCapable => "Excluded: not emergency-capable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderVerdict {
    pub id: String,
    pub name: String,
    pub included: bool,
    pub missing_services: Vec<CapabilityCode>,
    pub emergency_capable: bool,
    pub services: Vec<CapabilityCode>,
    pub verdict: VerdictReason,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDebug {
    pub required_services: Vec<CapabilityCode>,
    pub severity: Severity,
    pub all_providers: Vec<ProviderVerdict>,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Matcher {
    emergency_capability: CapabilityCode,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(CapabilityCode::new(DEFAULT_EMERGENCY_CAPABILITY))
    }
}

impl Matcher {
    pub fn new(emergency_capability: CapabilityCode) -> Self {
        Self {
            emergency_capability,
        }
    }

    pub fn emergency_capability(&self) -> &CapabilityCode {
        &self.emergency_capability
    }

    /// Verdict for one provider. Both `rank` and `explain` go through here.
    fn evaluate(
        &self,
        provider: &Provider,
        required: &BTreeSet<CapabilityCode>,
        severity: Severity,
    ) -> (VerdictReason, Vec<CapabilityCode>, bool) {
        let emergency_capable = provider.offers(&self.emergency_capability);
        let missing: Vec<CapabilityCode> = required
            .iter()
            .filter(|c| !provider.offers(c))
            .cloned()
            .collect();

        let reason = if required.is_empty() {
            VerdictReason::NoRequiredServices
        } else if !missing.is_empty() {
            VerdictReason::MissingServices
        } else if severity.requires_emergency_capability() && !emergency_capable {
            VerdictReason::NotEmergencyCapable
        } else {
            VerdictReason::Included
        };
        (reason, missing, emergency_capable)
    }

    fn score(&self, exact_matches: usize, severity: Severity, emergency_capable: bool) -> u32 {
        let mut score = EXACT_MATCH_POINTS * exact_matches as u32;
        if severity == Severity::Routine {
            score += ROUTINE_BONUS;
        }
        if severity.requires_emergency_capability() && emergency_capable {
            score += EMERGENCY_BONUS;
        }
        score
    }

    /// Filter `catalog` to providers covering every required capability
    /// (and the emergency gate for urgent/emergency), then order by score
    /// descending, provider id ascending, catalog position ascending.
    pub fn rank(
        &self,
        catalog: &[Provider],
        required: &BTreeSet<CapabilityCode>,
        severity: Severity,
    ) -> Vec<MatchResult> {
        if required.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, MatchResult)> = catalog
            .iter()
            .enumerate()
            .filter_map(|(index, provider)| {
                let (reason, _, emergency_capable) = self.evaluate(provider, required, severity);
                if reason != VerdictReason::Included {
                    tracing::debug!(provider = %provider.id, reason = reason.message(), "provider excluded");
                    return None;
                }

                let matched_services: Vec<CapabilityCode> = provider
                    .services
                    .iter()
                    .filter(|s| required.contains(*s))
                    .cloned()
                    .collect();
                let exact_matches = required.iter().filter(|c| provider.offers(c)).count();

                Some((
                    index,
                    MatchResult {
                        provider: provider.clone(),
                        matched_services,
                        ranking: Ranking {
                            score: self.score(exact_matches, severity, emergency_capable),
                            exact_matches,
                            supported_services: required.iter().cloned().collect(),
                            emergency_capable,
                        },
                    },
                ))
            })
            .collect();

        ranked.sort_by(|(ia, a), (ib, b)| {
            b.ranking
                .score
                .cmp(&a.ranking.score)
                .then_with(|| a.provider.id.cmp(&b.provider.id))
                .then_with(|| ia.cmp(ib))
        });

        ranked.into_iter().map(|(_, r)| r).collect()
    }

    /// One verdict per catalog provider, matched or not, in catalog order.
    pub fn explain(
        &self,
        catalog: &[Provider],
        required: &BTreeSet<CapabilityCode>,
        severity: Severity,
    ) -> Vec<ProviderVerdict> {
        catalog
            .iter()
            .map(|provider| {
                let (verdict, missing_services, emergency_capable) =
                    self.evaluate(provider, required, severity);
                ProviderVerdict {
                    id: provider.id.clone(),
                    name: provider.name.clone(),
                    included: verdict == VerdictReason::Included,
                    missing_services,
                    emergency_capable,
                    services: provider.services.iter().cloned().collect(),
                    verdict,
                    reason: verdict.message().to_string(),
                }
            })
            .collect()
    }

    pub fn rank_request(&self, catalog: &[Provider], request: &MatchRequest) -> Vec<MatchResult> {
        self.rank(catalog, &request.required(), request.severity())
    }

    pub fn debug_request(&self, catalog: &[Provider], request: &MatchRequest) -> MatchDebug {
        MatchDebug {
            required_services: request.service_codes().to_vec(),
            severity: request.severity(),
            all_providers: self.explain(catalog, &request.required(), request.severity()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
