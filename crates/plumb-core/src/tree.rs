use crate::error::{PlumbError, Result};
use crate::types::DiagnosticCode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::sync::OnceLock;

pub const ROOT_NODE: &str = "location";
pub const SEVERITY_NODE: &str = "emergency_check";

/// Result codes emitted by the severity node.
pub const EMERGENCY_RESULT: &str = "EMERGENCY";
pub const NON_EMERGENCY_RESULT: &str = "NON_EMERGENCY";

// ---------------------------------------------------------------------------
// DecisionOption / DecisionNode
// ---------------------------------------------------------------------------

/// One answer a user can pick at a node.
///
/// An option either continues (`next_step`), terminates (`result` only), or
/// does both: a provisional classification recorded on the way to the
/// severity node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub id: String,
    pub question: String,
    pub options: Vec<DecisionOption>,
}

impl DecisionNode {
    pub fn option(&self, label: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Step (traversal output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Move to `next`. `provisional` is set when the option also carried a
    /// classification code.
    Continue {
        next: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        provisional: Option<DiagnosticCode>,
    },
    /// The branch ended.
    Terminal { result: String, emergency: bool },
}

// ---------------------------------------------------------------------------
// DecisionTree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_severity_node")]
    pub severity_node: String,
    pub nodes: BTreeMap<String, DecisionNode>,
}

fn default_root() -> String {
    ROOT_NODE.to_string()
}

fn default_severity_node() -> String {
    SEVERITY_NODE.to_string()
}

fn node_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"))
}

impl DecisionTree {
    pub fn node(&self, id: &str) -> Result<&DecisionNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| PlumbError::NodeNotFound(id.to_string()))
    }

    pub fn root_node(&self) -> Result<&DecisionNode> {
        self.node(&self.root)
    }

    /// Apply the option labelled `label` at node `node_id`.
    ///
    /// Unknown nodes, unknown labels, and dangling `next_step` references all
    /// fail with `InvalidTraversalState`.
    pub fn advance(&self, node_id: &str, label: &str) -> Result<Step> {
        let invalid = || PlumbError::InvalidTraversalState {
            node: node_id.to_string(),
            option: label.to_string(),
        };

        let node = self.nodes.get(node_id).ok_or_else(invalid)?;
        let option = node.option(label).ok_or_else(invalid)?;

        match (&option.next_step, &option.result) {
            (Some(next), result) => {
                if !self.nodes.contains_key(next) {
                    return Err(invalid());
                }
                Ok(Step::Continue {
                    next: next.clone(),
                    provisional: result.as_deref().map(DiagnosticCode::new),
                })
            }
            (None, Some(result)) => Ok(Step::Terminal {
                result: result.clone(),
                emergency: option.emergency.unwrap_or(false),
            }),
            (None, None) => Err(invalid()),
        }
    }

    /// Every structural problem in the tree. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.nodes.contains_key(&self.root) {
            problems.push(format!("root node '{}' does not exist", self.root));
        }

        match self.nodes.get(&self.severity_node) {
            None => problems.push(format!(
                "severity node '{}' does not exist",
                self.severity_node
            )),
            Some(node) => {
                for opt in &node.options {
                    if opt.next_step.is_some() || opt.result.is_none() {
                        problems.push(format!(
                            "severity node option '{}' must be terminal",
                            opt.label
                        ));
                    }
                }
            }
        }

        for (key, node) in &self.nodes {
            if key != &node.id {
                problems.push(format!("node key '{key}' does not match id '{}'", node.id));
            }
            if !node_id_re().is_match(key) {
                problems.push(format!("node id '{key}' must be lowercase snake_case"));
            }
            if node.options.is_empty() {
                problems.push(format!("node '{key}' has no options"));
            }

            let mut seen = BTreeSet::new();
            for opt in &node.options {
                if !seen.insert(opt.label.as_str()) {
                    problems.push(format!("node '{key}' repeats option '{}'", opt.label));
                }
                match (&opt.next_step, &opt.result) {
                    (None, None) => problems.push(format!(
                        "option '{}' at '{key}' has neither nextStep nor result",
                        opt.label
                    )),
                    (None, Some(_)) if key != &self.severity_node => problems.push(format!(
                        "option '{}' at '{key}' ends the branch before the severity node",
                        opt.label
                    )),
                    (Some(next), result) => {
                        if !self.nodes.contains_key(next) {
                            problems.push(format!(
                                "option '{}' at '{key}' references missing node '{next}'",
                                opt.label
                            ));
                        }
                        if next == &self.severity_node && result.is_none() {
                            problems.push(format!(
                                "option '{}' at '{key}' reaches the severity node without a classification",
                                opt.label
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }

        if self.nodes.contains_key(&self.root) {
            let reachable = self.reachable_from(&self.root);
            for key in self.nodes.keys() {
                if !reachable.contains(key.as_str()) {
                    problems.push(format!("node '{key}' is unreachable from the root"));
                }
            }
        }

        if let Some(cycle_at) = self.find_cycle() {
            problems.push(format!("nextStep cycle through node '{cycle_at}'"));
        }

        problems
    }

    /// Fail with `InvalidTree` when `validate` reports anything.
    pub fn ensure_valid(&self) -> Result<()> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PlumbError::InvalidTree(problems.join("; ")))
        }
    }

    fn reachable_from<'a>(&'a self, start: &'a str) -> BTreeSet<&'a str> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                for next in node.options.iter().filter_map(|o| o.next_step.as_deref()) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    fn find_cycle(&self) -> Option<String> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            tree: &'a DecisionTree,
            id: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
        ) -> Option<String> {
            match marks.get(id) {
                Some(Mark::Visiting) => return Some(id.to_string()),
                Some(Mark::Done) => return None,
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            if let Some(node) = tree.nodes.get(id) {
                for next in node.options.iter().filter_map(|o| o.next_step.as_deref()) {
                    if let Some(found) = visit(tree, next, marks) {
                        return Some(found);
                    }
                }
            }
            marks.insert(id, Mark::Done);
            None
        }

        let mut marks = BTreeMap::new();
        self.nodes
            .keys()
            .find_map(|id| visit(self, id.as_str(), &mut marks))
    }

    /// Parse a YAML tree without validating it.
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let tree = Self::parse(&data)?;
        tree.ensure_valid()?;
        Ok(tree)
    }

    /// The production wizard tree.
    pub fn builtin() -> Self {
        let nodes = vec![
            node(
                "location",
                "Where is the plumbing issue located?",
                vec![
                    next("Kitchen", "fixture_kitchen"),
                    next("Bathroom", "fixture_bathroom"),
                    next("Basement", "fixture_basement"),
                    next("Laundry Room", "fixture_laundry"),
                    next("Outside", "fixture_outside"),
                ],
            ),
            // Kitchen
            node(
                "fixture_kitchen",
                "Which kitchen fixture is having the issue?",
                vec![
                    next("Sink", "symptom_sink"),
                    next("Dishwasher", "symptom_dishwasher"),
                    next("Garbage disposal", "symptom_disposal"),
                ],
            ),
            node(
                "symptom_sink",
                "What is happening with the sink?",
                vec![
                    classified("Clogged or slow drain", "DRAIN_CLEANING_FIXTURE"),
                    classified("Leaking pipe or trap", "PIPE_REPAIR"),
                    classified("Low water pressure", "WATER_PRESSURE_DIAGNOSIS"),
                    classified("Water backing up", "DRAIN_BLOCKAGE"),
                ],
            ),
            node(
                "symptom_dishwasher",
                "What issue are you having with the dishwasher?",
                vec![
                    classified("Not draining", "DISHWASHER_DRAIN_REPAIR"),
                    classified("Leaking", "APPLIANCE_LEAK_REPAIR"),
                    classified("Water supply issue", "WATER_SUPPLY_REPAIR"),
                ],
            ),
            node(
                "symptom_disposal",
                "What is happening with the garbage disposal?",
                vec![
                    classified("Jammed or not spinning", "DISPOSAL_REPAIR"),
                    classified("Leaking", "DISPOSAL_REPLACEMENT"),
                    classified("Completely dead", "DISPOSAL_REPLACEMENT"),
                ],
            ),
            // Bathroom
            node(
                "fixture_bathroom",
                "Which bathroom fixture is having the issue?",
                vec![
                    next("Toilet", "symptom_toilet"),
                    next("Sink", "symptom_sink"),
                    next("Shower or Tub", "symptom_shower"),
                ],
            ),
            node(
                "symptom_toilet",
                "What is happening with the toilet?",
                vec![
                    classified("Clogged", "TOILET_CLOG_REMOVAL"),
                    classified("Running constantly", "TOILET_REPAIR"),
                    classified("Leaking at base", "WAX_RING_REPLACEMENT"),
                    classified("Overflowing", "EMERGENCY_TOILET_OVERFLOW"),
                ],
            ),
            node(
                "symptom_shower",
                "What issue are you having with the shower or tub?",
                vec![
                    classified("Slow drain", "DRAIN_CLEANING_FIXTURE"),
                    classified("No hot water", "WATER_HEATER_DIAGNOSIS"),
                    classified("Leaking faucet", "FAUCET_REPAIR"),
                ],
            ),
            // Basement
            node(
                "fixture_basement",
                "What basement plumbing issue are you experiencing?",
                vec![
                    classified("Floor drain backup", "MAIN_LINE_DRAIN_CLEANING"),
                    classified("Sump pump issue", "SUMP_PUMP_REPAIR"),
                    next("Water heater", "symptom_water_heater"),
                ],
            ),
            node(
                "symptom_water_heater",
                "What issue are you having with the water heater?",
                vec![
                    classified("No hot water", "WATER_HEATER_REPAIR"),
                    classified("Leaking tank", "WATER_HEATER_REPLACEMENT"),
                    classified("Strange noises", "WATER_HEATER_FLUSH"),
                ],
            ),
            // Laundry
            node(
                "fixture_laundry",
                "What laundry area issue are you experiencing?",
                vec![
                    classified("Washer drain overflow", "DRAIN_CLEANING_FIXTURE"),
                    classified("Leaking supply lines", "WATER_SUPPLY_REPAIR"),
                    classified("Clogged standpipe", "DRAIN_CLEANING_FIXTURE"),
                ],
            ),
            // Outside
            node(
                "fixture_outside",
                "What outdoor plumbing issue are you experiencing?",
                vec![
                    classified("Hose bib leaking", "HOSE_BIB_REPAIR"),
                    classified("Main water line issue", "MAIN_WATER_LINE_REPAIR"),
                    classified("Sewer smell or backup", "SEWER_LINE_INSPECTION"),
                ],
            ),
            // Severity is always asked last.
            node(
                SEVERITY_NODE,
                "Is this an active emergency right now?",
                vec![
                    terminal("Yes", EMERGENCY_RESULT, true),
                    terminal("No", NON_EMERGENCY_RESULT, false),
                ],
            ),
        ];

        Self {
            root: ROOT_NODE.to_string(),
            severity_node: SEVERITY_NODE.to_string(),
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders for the built-in tree
// ---------------------------------------------------------------------------

fn node(id: &str, question: &str, options: Vec<DecisionOption>) -> DecisionNode {
    DecisionNode {
        id: id.to_string(),
        question: question.to_string(),
        options,
    }
}

fn next(label: &str, step: &str) -> DecisionOption {
    DecisionOption {
        label: label.to_string(),
        next_step: Some(step.to_string()),
        result: None,
        emergency: None,
    }
}

fn classified(label: &str, code: &str) -> DecisionOption {
    DecisionOption {
        label: label.to_string(),
        next_step: Some(SEVERITY_NODE.to_string()),
        result: Some(code.to_string()),
        emergency: None,
    }
}

fn terminal(label: &str, result: &str, emergency: bool) -> DecisionOption {
    DecisionOption {
        label: label.to_string(),
        next_step: None,
        result: Some(result.to_string()),
        emergency: Some(emergency),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tree_is_valid() {
        let tree = DecisionTree::builtin();
        assert_eq!(tree.validate(), Vec::<String>::new());
        assert_eq!(tree.root_node().unwrap().labels().len(), 5);
    }

    #[test]
    fn advance_follows_next_step() {
        let tree = DecisionTree::builtin();
        let step = tree.advance("location", "Kitchen").unwrap();
        assert_eq!(
            step,
            Step::Continue {
                next: "fixture_kitchen".to_string(),
                provisional: None
            }
        );
    }

    #[test]
    fn advance_records_provisional_code_before_severity() {
        let tree = DecisionTree::builtin();
        let step = tree.advance("symptom_sink", "Leaking pipe or trap").unwrap();
        assert_eq!(
            step,
            Step::Continue {
                next: SEVERITY_NODE.to_string(),
                provisional: Some(DiagnosticCode::new("PIPE_REPAIR"))
            }
        );
    }

    #[test]
    fn severity_node_terminates() {
        let tree = DecisionTree::builtin();
        assert_eq!(
            tree.advance(SEVERITY_NODE, "Yes").unwrap(),
            Step::Terminal {
                result: EMERGENCY_RESULT.to_string(),
                emergency: true
            }
        );
        assert_eq!(
            tree.advance(SEVERITY_NODE, "No").unwrap(),
            Step::Terminal {
                result: NON_EMERGENCY_RESULT.to_string(),
                emergency: false
            }
        );
    }

    #[test]
    fn unknown_node_is_invalid_traversal_state() {
        let tree = DecisionTree::builtin();
        let err = tree.advance("attic", "Leak").unwrap_err();
        assert!(matches!(err, PlumbError::InvalidTraversalState { ref node, .. } if node == "attic"));
    }

    #[test]
    fn unknown_option_is_invalid_traversal_state() {
        let tree = DecisionTree::builtin();
        let err = tree.advance("location", "Garage").unwrap_err();
        assert!(matches!(err, PlumbError::InvalidTraversalState { ref option, .. } if option == "Garage"));
    }

    #[test]
    fn dangling_next_step_is_rejected() {
        let mut tree = DecisionTree::builtin();
        tree.nodes
            .get_mut("location")
            .unwrap()
            .options
            .push(next("Attic", "fixture_attic"));

        assert!(tree
            .validate()
            .iter()
            .any(|p| p.contains("missing node 'fixture_attic'")));
        assert!(matches!(
            tree.advance("location", "Attic"),
            Err(PlumbError::InvalidTraversalState { .. })
        ));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut tree = DecisionTree::builtin();
        tree.nodes
            .get_mut("fixture_kitchen")
            .unwrap()
            .options
            .push(next("Start over", "location"));

        let problems = tree.validate();
        assert!(problems.iter().any(|p| p.contains("cycle")), "{problems:?}");
        assert!(matches!(tree.ensure_valid(), Err(PlumbError::InvalidTree(_))));
    }

    #[test]
    fn unreachable_node_is_rejected() {
        let mut tree = DecisionTree::builtin();
        tree.nodes.insert(
            "fixture_garage".to_string(),
            node(
                "fixture_garage",
                "Garage?",
                vec![classified("Leak", "PIPE_REPAIR")],
            ),
        );
        assert!(tree
            .validate()
            .iter()
            .any(|p| p.contains("'fixture_garage' is unreachable")));
    }

    #[test]
    fn early_terminal_outside_severity_node_is_rejected() {
        let mut tree = DecisionTree::builtin();
        tree.nodes
            .get_mut("fixture_outside")
            .unwrap()
            .options
            .push(terminal("Frozen pipe", "PIPE_REPAIR", true));
        assert!(tree
            .validate()
            .iter()
            .any(|p| p.contains("before the severity node")));
    }

    #[test]
    fn yaml_tree_loads_and_validates() {
        let yaml = r#"
root: location
severity_node: emergency_check
nodes:
  location:
    id: location
    question: Where?
    options:
      - label: Kitchen
        nextStep: emergency_check
        result: DRAIN_CLEANING_FIXTURE
  emergency_check:
    id: emergency_check
    question: Emergency?
    options:
      - label: "Yes"
        result: EMERGENCY
        emergency: true
      - label: "No"
        result: NON_EMERGENCY
"#;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tree.yaml");
        std::fs::write(&path, yaml).unwrap();

        let tree = DecisionTree::load(&path).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(
            tree.advance("emergency_check", "No").unwrap(),
            Step::Terminal {
                result: NON_EMERGENCY_RESULT.to_string(),
                emergency: false
            }
        );
    }

    #[test]
    fn invalid_yaml_tree_is_refused() {
        let yaml = r#"
nodes:
  location:
    id: location
    question: Where?
    options:
      - label: Kitchen
        nextStep: nowhere
"#;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tree.yaml");
        std::fs::write(&path, yaml).unwrap();

        assert!(matches!(
            DecisionTree::load(&path),
            Err(PlumbError::InvalidTree(_))
        ));
    }
}
