use crate::classify::Rule;

// ---------------------------------------------------------------------------
// Helper macro for concise rule definitions
// ---------------------------------------------------------------------------

macro_rules! rule {
    (
        id: $id:expr,
        $(room: $room:expr,)?
        fixture: $fixture:expr,
        $(symptom: $symptom:expr,)?
        code: $code:expr,
        reason: $reason:expr $(,)?
    ) => {
        Rule {
            id: $id,
            room: {
                #[allow(unused_assignments, unused_mut)]
                let mut v: Option<&'static str> = None;
                $(v = Some($room);)?
                v
            },
            fixture: $fixture,
            symptom: {
                #[allow(unused_assignments, unused_mut)]
                let mut v: Option<&'static str> = None;
                $(v = Some($symptom);)?
                v
            },
            code: $code,
            reason: $reason,
        }
    };
}

// ---------------------------------------------------------------------------
// Default rules (first match wins; symptom-specific before fixture-wide)
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<Rule> {
    vec![
        // Sinks (kitchen and bathroom share the symptom node)
        rule! {
            id: "sink_leak",
            fixture: "Sink",
            symptom: "Leaking pipe or trap",
            code: "PIPE_REPAIR",
            reason: "Issue involves a leaking sink pipe or trap.",
        },
        rule! {
            id: "sink_pressure",
            fixture: "Sink",
            symptom: "Low water pressure",
            code: "WATER_PRESSURE_DIAGNOSIS",
            reason: "Issue involves low water pressure at a sink.",
        },
        rule! {
            id: "sink_backup",
            fixture: "Sink",
            symptom: "Water backing up",
            code: "DRAIN_BLOCKAGE",
            reason: "Issue involves water backing up into a sink.",
        },
        rule! {
            id: "bathroom_sink",
            room: "Bathroom",
            fixture: "Sink",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves a bathroom sink drain.",
        },
        rule! {
            id: "kitchen_sink",
            room: "Kitchen",
            fixture: "Sink",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves a kitchen sink drain.",
        },
        rule! {
            id: "sink",
            fixture: "Sink",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves a sink drain.",
        },
        // Dishwasher
        rule! {
            id: "dishwasher_leak",
            fixture: "Dishwasher",
            symptom: "Leaking",
            code: "APPLIANCE_LEAK_REPAIR",
            reason: "Issue involves a leaking dishwasher.",
        },
        rule! {
            id: "dishwasher_supply",
            fixture: "Dishwasher",
            symptom: "Water supply issue",
            code: "WATER_SUPPLY_REPAIR",
            reason: "Issue involves the dishwasher water supply.",
        },
        rule! {
            id: "dishwasher",
            fixture: "Dishwasher",
            code: "DISHWASHER_DRAIN_REPAIR",
            reason: "Issue involves a dishwasher drain.",
        },
        // Garbage disposal
        rule! {
            id: "disposal_leak",
            fixture: "Garbage disposal",
            symptom: "Leaking",
            code: "DISPOSAL_REPLACEMENT",
            reason: "A leaking disposal unit usually needs replacement.",
        },
        rule! {
            id: "disposal_dead",
            fixture: "Garbage disposal",
            symptom: "Completely dead",
            code: "DISPOSAL_REPLACEMENT",
            reason: "A dead disposal unit usually needs replacement.",
        },
        rule! {
            id: "disposal",
            fixture: "Garbage disposal",
            code: "DISPOSAL_REPAIR",
            reason: "Issue involves a garbage disposal.",
        },
        // Toilet
        rule! {
            id: "toilet_clog",
            fixture: "Toilet",
            symptom: "Clogged",
            code: "TOILET_CLOG_REMOVAL",
            reason: "Issue involves a clogged toilet.",
        },
        rule! {
            id: "toilet_base_leak",
            fixture: "Toilet",
            symptom: "Leaking at base",
            code: "WAX_RING_REPLACEMENT",
            reason: "A leak at the toilet base points to the wax ring.",
        },
        rule! {
            id: "toilet_overflow",
            fixture: "Toilet",
            symptom: "Overflowing",
            code: "EMERGENCY_TOILET_OVERFLOW",
            reason: "Issue involves an overflowing toilet.",
        },
        rule! {
            id: "bathroom_toilet",
            room: "Bathroom",
            fixture: "Toilet",
            code: "TOILET_REPAIR",
            reason: "Issue involves a bathroom toilet.",
        },
        rule! {
            id: "toilet",
            fixture: "Toilet",
            code: "TOILET_REPAIR",
            reason: "Issue involves a toilet.",
        },
        // Shower / tub
        rule! {
            id: "shower_no_hot_water",
            fixture: "Shower or Tub",
            symptom: "No hot water",
            code: "WATER_HEATER_DIAGNOSIS",
            reason: "No hot water at the shower points to the water heater.",
        },
        rule! {
            id: "shower_faucet",
            fixture: "Shower or Tub",
            symptom: "Leaking faucet",
            code: "FAUCET_REPAIR",
            reason: "Issue involves a leaking shower or tub faucet.",
        },
        rule! {
            id: "shower",
            fixture: "Shower or Tub",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves a shower or tub drain.",
        },
        // Basement
        rule! {
            id: "floor_drain",
            fixture: "Floor drain backup",
            code: "MAIN_LINE_DRAIN_CLEANING",
            reason: "A floor drain backup points to the main drain line.",
        },
        rule! {
            id: "sump_pump",
            fixture: "Sump pump issue",
            code: "SUMP_PUMP_REPAIR",
            reason: "Issue involves the sump pump.",
        },
        rule! {
            id: "water_heater_cold",
            fixture: "Water heater",
            symptom: "No hot water",
            code: "WATER_HEATER_REPAIR",
            reason: "The water heater is not producing hot water.",
        },
        rule! {
            id: "water_heater_leak",
            fixture: "Water heater",
            symptom: "Leaking tank",
            code: "WATER_HEATER_REPLACEMENT",
            reason: "A leaking tank usually means the water heater must be replaced.",
        },
        rule! {
            id: "water_heater_noise",
            fixture: "Water heater",
            symptom: "Strange noises",
            code: "WATER_HEATER_FLUSH",
            reason: "Noises from the tank usually indicate sediment build-up.",
        },
        rule! {
            id: "water_heater",
            fixture: "Water heater",
            code: "WATER_HEATER_DIAGNOSIS",
            reason: "Issue involves the water heater.",
        },
        // Laundry
        rule! {
            id: "washer_overflow",
            room: "Laundry Room",
            fixture: "Washer drain overflow",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves the washer drain.",
        },
        rule! {
            id: "laundry_supply",
            room: "Laundry Room",
            fixture: "Leaking supply lines",
            code: "WATER_SUPPLY_REPAIR",
            reason: "Issue involves the laundry supply lines.",
        },
        rule! {
            id: "standpipe",
            room: "Laundry Room",
            fixture: "Clogged standpipe",
            code: "DRAIN_CLEANING_FIXTURE",
            reason: "Issue involves a clogged laundry standpipe.",
        },
        // Outside
        rule! {
            id: "hose_bib",
            room: "Outside",
            fixture: "Hose bib leaking",
            code: "HOSE_BIB_REPAIR",
            reason: "Issue involves an outdoor hose bib.",
        },
        rule! {
            id: "main_water_line",
            room: "Outside",
            fixture: "Main water line issue",
            code: "MAIN_WATER_LINE_REPAIR",
            reason: "Issue involves the main water line.",
        },
        rule! {
            id: "sewer",
            room: "Outside",
            fixture: "Sewer smell or backup",
            code: "SEWER_LINE_INSPECTION",
            reason: "Sewer smell or backup calls for a sewer line inspection.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, Answers};
    use crate::tree::{DecisionTree, Step};
    use std::collections::BTreeSet;

    #[test]
    fn rule_ids_are_unique() {
        let rules = default_rules();
        let ids: BTreeSet<_> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn optional_fields_default_to_wildcards() {
        let rules = default_rules();
        let sink = rules.iter().find(|r| r.id == "sink").unwrap();
        assert!(sink.room.is_none());
        assert!(sink.symptom.is_none());
        let kitchen = rules.iter().find(|r| r.id == "kitchen_sink").unwrap();
        assert_eq!(kitchen.room, Some("Kitchen"));
    }

    /// Walk every path of the built-in tree and check that the rules agree
    /// with the code the tree records on the way to the severity node.
    #[test]
    fn rules_agree_with_builtin_tree() {
        let tree = DecisionTree::builtin();
        let classifier = crate::classify::Classifier::default();

        fn walk(
            tree: &DecisionTree,
            classifier: &crate::classify::Classifier,
            node: &str,
            answers: Answers,
            provisional: Option<String>,
            checked: &mut usize,
        ) {
            if node == tree.severity_node {
                let input = normalize(&answers).diagnostic_input();
                let result = classifier.classify(&input);
                assert_eq!(
                    Some(result.service_code.as_str().to_string()),
                    provisional,
                    "answers {answers:?}"
                );
                *checked += 1;
                return;
            }
            for opt in &tree.nodes[node].options {
                let mut next_answers = answers.clone();
                next_answers.insert(node.to_string(), opt.label.clone());
                match tree.advance(node, &opt.label).unwrap() {
                    Step::Continue { next, provisional: p } => walk(
                        tree,
                        classifier,
                        &next,
                        next_answers,
                        p.map(|c| c.as_str().to_string()).or(provisional.clone()),
                        checked,
                    ),
                    Step::Terminal { .. } => unreachable!("only the severity node terminates"),
                }
            }
        }

        let mut checked = 0;
        walk(&tree, &classifier, &tree.root, Answers::new(), None, &mut checked);
        assert!(checked > 20);
    }
}
