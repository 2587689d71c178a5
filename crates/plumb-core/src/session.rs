use crate::classify::{Classifier, DiagnosticResult, GENERAL_PLUMBING};
use crate::error::{PlumbError, Result};
use crate::matcher::MatchRequest;
use crate::normalize::{normalize, Answers, NormalizedAnswers, URGENCY_KEYS};
use crate::translate::translate;
use crate::tree::{DecisionNode, DecisionTree, Step};
use crate::types::{CapabilityCode, DiagnosticCode, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// One reported problem, produced by a completed traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    /// Display trail such as `Kitchen → Sink → Clogged or slow drain`.
    pub reported: String,
    pub emergency: bool,
    pub capability: CapabilityCode,
    pub diagnostic_code: DiagnosticCode,
    pub confidence: f64,
    pub explanation: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn new_issue_id() -> String {
    format!("issue_{}", uuid::Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// In-progress walk through the tree for a single issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub current: String,
    pub answers: Answers,
    pub provisional: Option<DiagnosticCode>,
}

impl Traversal {
    fn start(tree: &DecisionTree) -> Self {
        Self {
            current: tree.root.clone(),
            answers: Answers::new(),
            provisional: None,
        }
    }
}

/// What happened after a choice.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    /// Traversal continues at this node id.
    Next(String),
    /// The traversal finished and produced this issue.
    Completed(Issue),
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

/// Everything derived from a finished traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub normalized: NormalizedAnswers,
    pub result: DiagnosticResult,
    pub capability: CapabilityCode,
}

/// Classify the answers of a traversal that reached the severity node.
///
/// `emergency` is the terminal option's flag and overrides any urgency
/// answer already present. When the rules fall back to the general code,
/// the tree's `provisional` code is used instead.
pub fn diagnose(
    classifier: &Classifier,
    answers: &Answers,
    provisional: Option<&DiagnosticCode>,
    emergency: bool,
) -> Diagnosis {
    let mut answers = answers.clone();
    answers.insert(
        URGENCY_KEYS[0].to_string(),
        if emergency { "Yes" } else { "No" }.to_string(),
    );

    let normalized = normalize(&answers);
    let mut result = classifier.classify(&normalized.diagnostic_input());

    if result.service_code.as_str() == GENERAL_PLUMBING {
        if let Some(code) = provisional {
            result.explanation.pop();
            result
                .explanation
                .push(format!("Classified from the answers given: {code}."));
            result.explanation.push(format!("Mapped to service code: {code}"));
            result.service_code = code.clone();
        }
    }

    let capability = translate(&result.service_code);
    tracing::debug!(code = %result.service_code, capability = %capability, "traversal classified");

    Diagnosis {
        normalized,
        result,
        capability,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-user context: one traversal in progress plus the issues collected
/// so far. Nothing here is shared between sessions.
pub struct Session {
    id: uuid::Uuid,
    tree: Arc<DecisionTree>,
    classifier: Classifier,
    traversal: Traversal,
    issues: Vec<Issue>,
}

impl Session {
    pub fn new(tree: Arc<DecisionTree>) -> Self {
        Self::with_classifier(tree, Classifier::default())
    }

    pub fn with_classifier(tree: Arc<DecisionTree>, classifier: Classifier) -> Self {
        let traversal = Traversal::start(&tree);
        Self {
            id: uuid::Uuid::new_v4(),
            tree,
            classifier,
            traversal,
            issues: Vec::new(),
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    pub fn current_node(&self) -> Result<&DecisionNode> {
        self.tree.node(&self.traversal.current)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Pick `label` at the current node.
    ///
    /// An invalid choice restarts the traversal at the root before the
    /// error is returned; collected issues are kept.
    pub fn choose(&mut self, label: &str) -> Result<Choice> {
        let node_id = self.traversal.current.clone();
        let step = match self.tree.advance(&node_id, label) {
            Ok(step) => step,
            Err(e) => {
                if matches!(e, PlumbError::InvalidTraversalState { .. }) {
                    tracing::debug!(node = %node_id, option = label, "invalid choice, restarting traversal");
                    self.restart_traversal();
                }
                return Err(e);
            }
        };

        self.traversal
            .answers
            .insert(node_id, label.to_string());

        match step {
            Step::Continue { next, provisional } => {
                if provisional.is_some() {
                    self.traversal.provisional = provisional;
                }
                self.traversal.current = next.clone();
                Ok(Choice::Next(next))
            }
            Step::Terminal { emergency, .. } => {
                let issue = self.complete(emergency);
                self.issues.push(issue.clone());
                self.restart_traversal();
                Ok(Choice::Completed(issue))
            }
        }
    }

    fn complete(&self, emergency: bool) -> Issue {
        let d = diagnose(
            &self.classifier,
            &self.traversal.answers,
            self.traversal.provisional.as_ref(),
            emergency,
        );
        Issue {
            id: new_issue_id(),
            reported: d.normalized.reported_trail,
            emergency: d.result.severity.is_emergency(),
            capability: d.capability,
            diagnostic_code: d.result.service_code,
            confidence: d.result.confidence,
            explanation: d.result.explanation,
            created_at: Utc::now(),
        }
    }

    /// Drop the traversal in progress and go back to the root.
    pub fn restart_traversal(&mut self) {
        self.traversal = Traversal::start(&self.tree);
    }

    /// Flip an issue's emergency flag. Returns the new value.
    pub fn toggle_emergency(&mut self, issue_id: &str) -> Result<bool> {
        let issue = self
            .issues
            .iter_mut()
            .find(|i| i.id == issue_id)
            .ok_or_else(|| PlumbError::IssueNotFound(issue_id.to_string()))?;
        issue.emergency = !issue.emergency;
        Ok(issue.emergency)
    }

    pub fn remove_issue(&mut self, issue_id: &str) -> Result<Issue> {
        let pos = self
            .issues
            .iter()
            .position(|i| i.id == issue_id)
            .ok_or_else(|| PlumbError::IssueNotFound(issue_id.to_string()))?;
        Ok(self.issues.remove(pos))
    }

    /// Discard every issue and the traversal in progress.
    pub fn reset(&mut self) {
        self.issues.clear();
        self.restart_traversal();
    }

    pub fn overall_severity(&self) -> Severity {
        if self.issues.iter().any(|i| i.emergency) {
            Severity::Emergency
        } else {
            Severity::Routine
        }
    }

    /// Union of issue capabilities, first-seen order.
    pub fn required_capabilities(&self) -> Vec<CapabilityCode> {
        let mut seen = BTreeSet::new();
        self.issues
            .iter()
            .filter(|i| seen.insert(i.capability.clone()))
            .map(|i| i.capability.clone())
            .collect()
    }

    /// Fails with `MalformedMatchRequest` while no issue has been reported.
    pub fn match_request(&self) -> Result<MatchRequest> {
        Ok(MatchRequest::new(
            self.required_capabilities(),
            self.overall_severity(),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Rule;
    use crate::error::MatchRequestError;
    use crate::types::DiagnosticSeverity;

    fn session() -> Session {
        Session::new(Arc::new(DecisionTree::builtin()))
    }

    fn walk(s: &mut Session, labels: &[&str]) -> Issue {
        let (last, rest) = labels.split_last().unwrap();
        for label in rest {
            assert!(matches!(s.choose(label).unwrap(), Choice::Next(_)));
        }
        match s.choose(last).unwrap() {
            Choice::Completed(issue) => issue,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn kitchen_sink_clog_is_routine_drain_cleaning() {
        let mut s = session();
        let issue = walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "No"]);
        assert_eq!(issue.diagnostic_code.as_str(), "DRAIN_CLEANING_FIXTURE");
        assert_eq!(issue.capability.as_str(), "DRAIN_CLEANING_FIXTURE");
        assert!(!issue.emergency);
        assert_eq!(issue.reported, "Kitchen → Sink → Clogged or slow drain");
        assert!(issue.id.starts_with("issue_"));
        assert_eq!(s.overall_severity(), Severity::Routine);
        assert_eq!(s.traversal().current, "location");
        assert!(s.traversal().answers.is_empty());
    }

    #[test]
    fn yes_marks_issue_emergency() {
        let mut s = session();
        let issue = walk(&mut s, &["Bathroom", "Toilet", "Overflowing", "Yes"]);
        assert!(issue.emergency);
        assert_eq!(issue.capability.as_str(), "TOILET_REPAIR");
        assert_eq!(s.overall_severity(), Severity::Emergency);
    }

    #[test]
    fn invalid_choice_restarts_traversal() {
        let mut s = session();
        s.choose("Kitchen").unwrap();
        let err = s.choose("Chandelier").unwrap_err();
        assert!(matches!(err, PlumbError::InvalidTraversalState { .. }));
        assert_eq!(s.traversal().current, "location");
        assert!(s.traversal().answers.is_empty());
        assert!(s.traversal().provisional.is_none());
    }

    #[test]
    fn issues_survive_invalid_choice() {
        let mut s = session();
        walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "No"]);
        let _ = s.choose("Nowhere");
        assert_eq!(s.issues().len(), 1);
    }

    #[test]
    fn toggle_and_remove() {
        let mut s = session();
        let issue = walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "No"]);
        assert!(s.toggle_emergency(&issue.id).unwrap());
        assert_eq!(s.overall_severity(), Severity::Emergency);
        assert!(!s.toggle_emergency(&issue.id).unwrap());

        let removed = s.remove_issue(&issue.id).unwrap();
        assert_eq!(removed.id, issue.id);
        assert!(s.issues().is_empty());
        assert!(matches!(
            s.remove_issue(&issue.id),
            Err(PlumbError::IssueNotFound(_))
        ));
        assert!(matches!(
            s.toggle_emergency("issue_missing"),
            Err(PlumbError::IssueNotFound(_))
        ));
    }

    #[test]
    fn required_capabilities_dedupe_in_first_seen_order() {
        let mut s = session();
        walk(&mut s, &["Bathroom", "Toilet", "Clogged", "No"]);
        walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "No"]);
        walk(&mut s, &["Bathroom", "Toilet", "Running constantly", "No"]);
        let caps: Vec<_> = s
            .required_capabilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(caps, ["TOILET_REPAIR", "DRAIN_CLEANING_FIXTURE"]);
    }

    #[test]
    fn match_request_reflects_issues() {
        let mut s = session();
        assert!(matches!(
            s.match_request(),
            Err(PlumbError::MalformedMatchRequest(
                MatchRequestError::EmptyServiceCodes
            ))
        ));
        walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "Yes"]);
        let req = s.match_request().unwrap();
        assert_eq!(req.severity(), Severity::Emergency);
        assert_eq!(req.service_codes().len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = session();
        walk(&mut s, &["Kitchen", "Sink", "Clogged or slow drain", "No"]);
        s.choose("Bathroom").unwrap();
        s.reset();
        assert!(s.issues().is_empty());
        assert_eq!(s.traversal().current, "location");
    }

    #[test]
    fn tree_code_is_adopted_when_rules_fall_back() {
        let tree = Arc::new(DecisionTree::builtin());
        let mut s = Session::with_classifier(tree, Classifier::new(Vec::<Rule>::new()));
        let issue = walk(&mut s, &["Kitchen", "Sink", "Leaking pipe or trap", "No"]);
        assert_eq!(issue.diagnostic_code.as_str(), "PIPE_REPAIR");
        assert_eq!(issue.capability.as_str(), "LEAK_DETECTION");
        assert_eq!(
            issue.explanation.last().unwrap(),
            "Mapped to service code: PIPE_REPAIR"
        );
        assert!(issue
            .explanation
            .iter()
            .any(|e| e.starts_with("Classified from the answers given")));
    }

    #[test]
    fn custom_severity_node_keeps_emergency() {
        let yaml = r#"
root: location
severity_node: urgent_check
nodes:
  location:
    id: location
    question: Where?
    options:
      - label: Kitchen
        nextStep: urgent_check
        result: DRAIN_CLEANING_FIXTURE
  urgent_check:
    id: urgent_check
    question: Is water spreading?
    options:
      - label: "Yes"
        result: EMERGENCY
        emergency: true
      - label: "No"
        result: NON_EMERGENCY
"#;
        let tree = DecisionTree::parse(yaml).unwrap();
        tree.ensure_valid().unwrap();
        let mut s = Session::new(Arc::new(tree));
        let issue = walk(&mut s, &["Kitchen", "Yes"]);
        assert!(issue.emergency);
        assert_eq!(s.overall_severity(), Severity::Emergency);

        let issue = walk(&mut s, &["Kitchen", "No"]);
        assert!(!issue.emergency);
    }

    #[test]
    fn relabelled_severity_option_keeps_emergency() {
        let mut tree = DecisionTree::builtin();
        let check = tree.nodes.get_mut(crate::tree::SEVERITY_NODE).unwrap();
        check.options[0].label = "Yes, water is flooding".to_string();
        let mut s = Session::new(Arc::new(tree));
        let issue = walk(
            &mut s,
            &["Kitchen", "Sink", "Clogged or slow drain", "Yes, water is flooding"],
        );
        assert!(issue.emergency);
        assert_eq!(issue.capability.as_str(), "DRAIN_CLEANING_FIXTURE");
    }

    #[test]
    fn terminal_flag_overrides_stale_urgency_answer() {
        let answers: Answers = [
            ("location", "Kitchen"),
            ("fixture_kitchen", "Sink"),
            ("symptom_sink", "Clogged or slow drain"),
            ("urgency", "No"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let d = diagnose(&Classifier::default(), &answers, None, true);
        assert_eq!(d.result.severity, DiagnosticSeverity::Emergency);
        assert_eq!(d.normalized.urgency, "Yes");
        assert_eq!(d.capability.as_str(), "DRAIN_CLEANING_FIXTURE");

        let d = diagnose(&Classifier::default(), &answers, None, false);
        assert_eq!(d.result.severity, DiagnosticSeverity::NonEmergency);
    }

    #[test]
    fn severity_comes_from_classifier_not_fixture() {
        let mut s = session();
        let issue = walk(&mut s, &["Basement", "Water heater", "Leaking tank", "No"]);
        assert!(!issue.emergency);
        let sev: Severity = DiagnosticSeverity::NonEmergency.into();
        assert_eq!(sev, Severity::Routine);
    }
}
