use crate::types::Severity;
use serde::Serialize;

/// Estimated cost in whole US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub low: u32,
    pub high: u32,
}

/// Display metadata for a classification code. Never consulted by the
/// matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub severity: Severity,
    pub estimated_price: PriceRange,
    pub typical_duration: &'static str,
    pub description: &'static str,
}

const fn info(
    code: &'static str,
    label: &'static str,
    severity: Severity,
    low: u32,
    high: u32,
    typical_duration: &'static str,
    description: &'static str,
) -> ServiceInfo {
    ServiceInfo {
        code,
        label,
        severity,
        estimated_price: PriceRange { low, high },
        typical_duration,
        description,
    }
}

pub const SERVICES: &[ServiceInfo] = &[
    info(
        "DRAIN_CLEANING_FIXTURE",
        "Drain Cleaning (Fixture)",
        Severity::Routine,
        150,
        350,
        "1–2 hours",
        "A localized drain clog affecting a single fixture such as a sink, tub, or laundry standpipe.",
    ),
    info(
        "PIPE_REPAIR",
        "Pipe Repair",
        Severity::Urgent,
        250,
        800,
        "2–4 hours",
        "Repair of leaking or damaged supply or drain piping.",
    ),
    info(
        "TOILET_CLOG_REMOVAL",
        "Toilet Clog Removal",
        Severity::Routine,
        150,
        300,
        "1 hour",
        "Clearing a clogged toilet using professional augers or jetting tools.",
    ),
    info(
        "WATER_HEATER_REPAIR",
        "Water Heater Repair",
        Severity::Urgent,
        300,
        900,
        "2–3 hours",
        "Repairing heating elements, thermostats, or valves in a water heater.",
    ),
    info(
        "WATER_HEATER_REPLACEMENT",
        "Water Heater Replacement",
        Severity::Urgent,
        1200,
        3500,
        "4–6 hours",
        "Full replacement of a residential water heater including removal and installation.",
    ),
    info(
        "EMERGENCY_PLUMBING",
        "Emergency Plumbing Service",
        Severity::Emergency,
        500,
        2500,
        "Same-day emergency service",
        "Immediate response for flooding, burst pipes, or sewage backups.",
    ),
    info(
        "TOILET_REPAIR",
        "Toilet Repair",
        Severity::Routine,
        150,
        350,
        "1–2 hours",
        "Repair of internal toilet components such as the flapper, fill valve, or flush mechanism causing continuous running or poor flushing.",
    ),
];

pub fn lookup(code: &str) -> Option<&'static ServiceInfo> {
    SERVICES.iter().find(|s| s.code == code)
}

/// Human label for a code, falling back to the raw code.
pub fn label_for(code: &str) -> &str {
    lookup(code).map_or(code, |s| s.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_has_metadata() {
        let s = lookup("WATER_HEATER_REPLACEMENT").unwrap();
        assert_eq!(s.severity, Severity::Urgent);
        assert_eq!(s.estimated_price, PriceRange { low: 1200, high: 3500 });
    }

    #[test]
    fn unknown_code_falls_back_to_raw() {
        assert!(lookup("GENERAL_PLUMBING").is_none());
        assert_eq!(label_for("GENERAL_PLUMBING"), "GENERAL_PLUMBING");
        assert_eq!(label_for("TOILET_REPAIR"), "Toilet Repair");
    }

    #[test]
    fn price_ranges_are_ordered_and_codes_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for s in SERVICES {
            assert!(s.estimated_price.low <= s.estimated_price.high, "{}", s.code);
            assert!(seen.insert(s.code), "duplicate {}", s.code);
        }
    }
}
