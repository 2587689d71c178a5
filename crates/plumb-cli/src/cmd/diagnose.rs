use crate::output::print_json;
use anyhow::Context;
use plumb_core::catalog;
use plumb_core::matcher::Matcher;
use plumb_core::provider::ProviderCatalog;
use plumb_core::session::{Choice, Session};
use plumb_core::tree::DecisionNode;
use plumb_core::PlumbError;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let tree = Arc::new(super::load_tree(root, &config)?);
    let mut session = Session::new(tree);

    // Prompts go to stderr in JSON mode.
    let stdin = std::io::stdin();
    let outcome = if json {
        Wizard::new(&mut session, stdin.lock(), std::io::stderr()).run()?
    } else {
        Wizard::new(&mut session, stdin.lock(), std::io::stdout()).run()?
    };

    if outcome == Outcome::Quit {
        return Ok(());
    }

    let request = session.match_request()?;
    let catalog = ProviderCatalog::load(&config.catalog_path(root))
        .context("failed to load provider catalog")?;
    let providers =
        Matcher::new(config.emergency_capability()).rank_request(&catalog.providers, &request);

    if json {
        return print_json(&serde_json::json!({
            "session": session.id().to_string(),
            "issues": session.issues(),
            "severity": request.severity(),
            "serviceCodes": request.service_codes(),
            "providers": providers,
        }));
    }

    println!();
    super::matching::print_ranking(&providers, request.severity());
    Ok(())
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    Quit,
}

enum MenuChoice {
    Add,
    Match,
    Quit,
}

/// Line-oriented front end over a [`Session`].
pub struct Wizard<'a, R, W> {
    session: &'a mut Session,
    input: R,
    out: W,
}

/// Accept a 1-based option number or a label (case-insensitive). Anything
/// else is passed through so the session rejects it.
fn resolve_choice(node: &DecisionNode, line: &str) -> String {
    if let Ok(n) = line.parse::<usize>() {
        if let Some(o) = n.checked_sub(1).and_then(|i| node.options.get(i)) {
            return o.label.clone();
        }
    }
    node.options
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(line))
        .map_or_else(|| line.to_string(), |o| o.label.clone())
}

impl<'a, R: BufRead, W: Write> Wizard<'a, R, W> {
    pub fn new(session: &'a mut Session, input: R, out: W) -> Self {
        Self {
            session,
            input,
            out,
        }
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    fn prompt(&mut self) -> anyhow::Result<Option<String>> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        self.read_line()
    }

    pub fn run(&mut self) -> anyhow::Result<Outcome> {
        loop {
            if !self.traverse()? {
                return Ok(Outcome::Quit);
            }
            match self.menu()? {
                MenuChoice::Add => continue,
                MenuChoice::Match => return Ok(Outcome::Match),
                MenuChoice::Quit => return Ok(Outcome::Quit),
            }
        }
    }

    /// Walk the tree until one issue is recorded. False on end of input.
    fn traverse(&mut self) -> anyhow::Result<bool> {
        loop {
            let node = self.session.current_node()?.clone();
            writeln!(self.out, "\n{}", node.question)?;
            for (i, o) in node.options.iter().enumerate() {
                writeln!(self.out, "  {}) {}", i + 1, o.label)?;
            }

            let Some(line) = self.prompt()? else {
                return Ok(false);
            };
            let label = resolve_choice(&node, &line);

            match self.session.choose(&label) {
                Ok(Choice::Next(_)) => {}
                Ok(Choice::Completed(issue)) => {
                    writeln!(
                        self.out,
                        "\nRecorded: {} => {}{}",
                        issue.reported,
                        catalog::label_for(issue.diagnostic_code.as_str()),
                        if issue.emergency { " [EMERGENCY]" } else { "" }
                    )?;
                    return Ok(true);
                }
                Err(PlumbError::InvalidTraversalState { .. }) => {
                    writeln!(
                        self.out,
                        "'{line}' is not an option here. Starting this issue over."
                    )?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn print_issues(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "\nIssues:")?;
        if self.session.issues().is_empty() {
            writeln!(self.out, "  (none)")?;
        }
        for (i, issue) in self.session.issues().iter().enumerate() {
            writeln!(
                self.out,
                "  {}. {}  [{}]{}",
                i + 1,
                issue.reported,
                issue.capability,
                if issue.emergency { " EMERGENCY" } else { "" }
            )?;
        }
        writeln!(
            self.out,
            "Overall severity: {}",
            self.session.overall_severity()
        )?;
        Ok(())
    }

    fn issue_id(&self, arg: Option<&str>) -> Option<String> {
        let n: usize = arg?.parse().ok()?;
        self.session
            .issues()
            .get(n.checked_sub(1)?)
            .map(|i| i.id.clone())
    }

    fn menu(&mut self) -> anyhow::Result<MenuChoice> {
        loop {
            self.print_issues()?;
            writeln!(
                self.out,
                "[a]dd issue  [t]oggle emergency N  [r]emove N  [c]lear all  [m]atch  [q]uit"
            )?;
            let Some(line) = self.prompt()? else {
                return Ok(MenuChoice::Quit);
            };

            let mut parts = line.split_whitespace();
            let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
            let arg = parts.next();

            match cmd.as_str() {
                "a" | "add" => return Ok(MenuChoice::Add),
                "q" | "quit" => return Ok(MenuChoice::Quit),
                "m" | "match" => {
                    if self.session.issues().is_empty() {
                        writeln!(self.out, "Add at least one issue before matching.")?;
                    } else {
                        return Ok(MenuChoice::Match);
                    }
                }
                "t" | "toggle" => match self.issue_id(arg) {
                    Some(id) => {
                        let on = self.session.toggle_emergency(&id)?;
                        writeln!(
                            self.out,
                            "Issue marked {}.",
                            if on { "emergency" } else { "not an emergency" }
                        )?;
                    }
                    None => writeln!(self.out, "Usage: t N (issue number)")?,
                },
                "r" | "remove" => match self.issue_id(arg) {
                    Some(id) => {
                        self.session.remove_issue(&id)?;
                        writeln!(self.out, "Issue removed.")?;
                    }
                    None => writeln!(self.out, "Usage: r N (issue number)")?,
                },
                "c" | "clear" => {
                    self.session.reset();
                    writeln!(self.out, "All issues cleared.")?;
                }
                _ => writeln!(self.out, "Unknown command '{line}'.")?,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_core::tree::DecisionTree;
    use plumb_core::types::Severity;
    use std::io::Cursor;

    fn session() -> Session {
        Session::new(Arc::new(DecisionTree::builtin()))
    }

    fn drive(session: &mut Session, script: &str) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = Wizard::new(session, Cursor::new(script.to_string()), &mut out)
            .run()
            .unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn numbered_walk_records_issue_and_matches() {
        let mut s = session();
        let (outcome, out) = drive(&mut s, "1\n1\n1\n2\nm\n");
        assert_eq!(outcome, Outcome::Match);
        assert_eq!(s.issues().len(), 1);
        assert_eq!(s.issues()[0].capability.as_str(), "DRAIN_CLEANING_FIXTURE");
        assert!(!s.issues()[0].emergency);
        assert!(out.contains("Drain Cleaning (Fixture)"));
    }

    #[test]
    fn labels_are_accepted_case_insensitively() {
        let mut s = session();
        let (outcome, _) = drive(&mut s, "bathroom\ntoilet\nclogged\nyes\nq\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(s.issues()[0].emergency);
        assert_eq!(s.overall_severity(), Severity::Emergency);
    }

    #[test]
    fn invalid_choice_restarts_issue() {
        let mut s = session();
        let (_, out) = drive(&mut s, "1\n9\n1\n1\n1\n2\nq\n");
        assert!(out.contains("'9' is not an option here"));
        assert_eq!(s.issues().len(), 1);
        assert_eq!(s.issues()[0].reported, "Kitchen → Sink → Clogged or slow drain");
    }

    #[test]
    fn toggle_remove_and_empty_match() {
        let mut s = session();
        let (outcome, out) = drive(&mut s, "1\n1\n1\n2\nt 1\nr 1\nm\nt 5\nq\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(s.issues().is_empty());
        assert!(out.contains("Issue marked emergency."));
        assert!(out.contains("Add at least one issue before matching."));
        assert!(out.contains("Usage: t N"));
    }

    #[test]
    fn clear_discards_every_issue() {
        let mut s = session();
        let (outcome, out) = drive(&mut s, "1\n1\n1\n2\na\n2\n1\n2\n1\nc\nq\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(out.contains("All issues cleared."));
        assert!(s.issues().is_empty());
        assert_eq!(s.overall_severity(), Severity::Routine);
    }

    #[test]
    fn several_issues_accumulate() {
        let mut s = session();
        let (outcome, _) = drive(&mut s, "1\n1\n1\n2\na\n2\n1\n2\n1\nm\n");
        assert_eq!(outcome, Outcome::Match);
        let caps: Vec<_> = s
            .required_capabilities()
            .into_iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(caps, ["DRAIN_CLEANING_FIXTURE", "TOILET_REPAIR"]);
        assert_eq!(s.overall_severity(), Severity::Emergency);
    }

    #[test]
    fn end_of_input_quits() {
        let mut s = session();
        let (outcome, _) = drive(&mut s, "1\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(s.issues().is_empty());
    }
}
