use crate::types::{CapabilityCode, DiagnosticCode};

/// Capability codes providers advertise in the catalog.
pub const CAPABILITY_CODES: &[&str] = &[
    "EMERGENCY_PLUMBING",
    "DRAIN_CLEANING_FIXTURE",
    "DRAIN_CLEANING_MAIN",
    "SEWER_LINE_REPAIR",
    "SEWER_LINE_TRENCHLESS_REPAIR",
    "SEWER_CAMERA_INSPECTION",
    "WATER_HEATER_TANK_REPAIR",
    "WATER_HEATER_TANK_INSTALL",
    "WATER_HEATER_TANKLESS_REPAIR",
    "WATER_HEATER_TANKLESS_INSTALL",
    "LEAK_DETECTION",
    "GAS_LINE_REPAIR",
    "GAS_LINE_INSTALL",
    "SUMP_PUMP_REPAIR",
    "SUMP_PUMP_INSTALL",
    "TOILET_REPAIR",
    "TOILET_INSTALL",
    "FAUCET_FIXTURE_REPAIR",
    "FAUCET_FIXTURE_INSTALL",
    "REPIPING_PARTIAL",
    "REPIPING_WHOLE_HOME",
    "BACKFLOW_PREVENTION",
    "WATER_TREATMENT",
    "WELL_PUMP_REPAIR",
    "WELL_PUMP_REPLACEMENT",
];

/// Diagnostic codes whose spelling differs from the capability they need.
/// Codes already in [`CAPABILITY_CODES`] translate to themselves.
pub const DIAGNOSTIC_TO_CAPABILITY: &[(&str, &str)] = &[
    ("PIPE_REPAIR", "LEAK_DETECTION"),
    ("WATER_PRESSURE_DIAGNOSIS", "LEAK_DETECTION"),
    ("DRAIN_BLOCKAGE", "DRAIN_CLEANING_FIXTURE"),
    ("DISHWASHER_DRAIN_REPAIR", "DRAIN_CLEANING_FIXTURE"),
    ("APPLIANCE_LEAK_REPAIR", "LEAK_DETECTION"),
    ("WATER_SUPPLY_REPAIR", "LEAK_DETECTION"),
    ("DISPOSAL_REPAIR", "DRAIN_CLEANING_FIXTURE"),
    ("DISPOSAL_REPLACEMENT", "DRAIN_CLEANING_FIXTURE"),
    ("TOILET_CLOG_REMOVAL", "TOILET_REPAIR"),
    ("WAX_RING_REPLACEMENT", "TOILET_REPAIR"),
    ("EMERGENCY_TOILET_OVERFLOW", "TOILET_REPAIR"),
    ("FAUCET_REPAIR", "FAUCET_FIXTURE_REPAIR"),
    ("MAIN_LINE_DRAIN_CLEANING", "DRAIN_CLEANING_MAIN"),
    ("WATER_HEATER_DIAGNOSIS", "WATER_HEATER_TANK_REPAIR"),
    ("WATER_HEATER_REPAIR", "WATER_HEATER_TANK_REPAIR"),
    ("WATER_HEATER_REPLACEMENT", "WATER_HEATER_TANK_INSTALL"),
    ("WATER_HEATER_FLUSH", "WATER_HEATER_TANK_REPAIR"),
    ("HOSE_BIB_REPAIR", "FAUCET_FIXTURE_REPAIR"),
    ("MAIN_WATER_LINE_REPAIR", "LEAK_DETECTION"),
    ("SEWER_LINE_INSPECTION", "SEWER_CAMERA_INSPECTION"),
];

pub fn is_known_capability(code: &str) -> bool {
    CAPABILITY_CODES.contains(&code)
}

/// How a diagnostic code was reconciled with the capability vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    Mapped,
    Identity,
    /// Not in either table; passed through unchanged.
    Unmapped,
}

pub fn translate_with_origin(code: &DiagnosticCode) -> (CapabilityCode, Translation) {
    let raw = code.as_str();
    if let Some((_, cap)) = DIAGNOSTIC_TO_CAPABILITY.iter().find(|(d, _)| *d == raw) {
        return (CapabilityCode::new(*cap), Translation::Mapped);
    }
    if is_known_capability(raw) {
        return (CapabilityCode::new(raw), Translation::Identity);
    }
    tracing::debug!(code = raw, "unmapped diagnostic code passed through as capability");
    (CapabilityCode::new(raw), Translation::Unmapped)
}

/// Map a diagnostic code onto the provider capability vocabulary.
///
/// Never fails: unknown codes pass through unchanged, so they may match no
/// provider at all.
pub fn translate(code: &DiagnosticCode) -> CapabilityCode {
    translate_with_origin(code).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(code: &str) -> String {
        translate(&DiagnosticCode::new(code)).as_str().to_string()
    }

    #[test]
    fn capability_codes_map_to_themselves() {
        for code in CAPABILITY_CODES {
            assert_eq!(t(code), *code);
        }
    }

    #[test]
    fn diagnostic_codes_are_reconciled() {
        assert_eq!(t("PIPE_REPAIR"), "LEAK_DETECTION");
        assert_eq!(t("TOILET_CLOG_REMOVAL"), "TOILET_REPAIR");
        assert_eq!(t("SEWER_LINE_INSPECTION"), "SEWER_CAMERA_INSPECTION");
        assert_eq!(t("WATER_HEATER_REPLACEMENT"), "WATER_HEATER_TANK_INSTALL");
    }

    #[test]
    fn every_mapping_targets_a_known_capability() {
        for (from, to) in DIAGNOSTIC_TO_CAPABILITY {
            assert!(is_known_capability(to), "{from} -> {to}");
            assert!(!is_known_capability(from), "{from} shadows a capability code");
        }
    }

    #[test]
    fn unknown_codes_pass_through() {
        let (code, origin) = translate_with_origin(&DiagnosticCode::new("GENERAL_PLUMBING"));
        assert_eq!(code.as_str(), "GENERAL_PLUMBING");
        assert_eq!(origin, Translation::Unmapped);
    }

    #[test]
    fn every_rule_code_translates_to_a_known_capability() {
        for rule in crate::rules::default_rules() {
            let (cap, origin) = translate_with_origin(&DiagnosticCode::new(rule.code));
            assert_ne!(origin, Translation::Unmapped, "rule {}", rule.id);
            assert!(is_known_capability(cap.as_str()));
        }
    }
}
