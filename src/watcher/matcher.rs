//! Admission filter for change events.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use super::WatchError;
use super::event::{ChangeKind, EventRecord};

/// Pattern configuration for the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    /// An item must fully match at least one of these.
    pub patterns: Vec<String>,
    /// An item fully matching any of these is rejected.
    pub ignore_patterns: Vec<String>,
    pub case_sensitive: bool,
    pub ignore_directories: bool,
}

impl Default for MatchRule {
    fn default() -> Self {
        Self {
            patterns: vec![".*".to_string()],
            ignore_patterns: Vec::new(),
            case_sensitive: false,
            ignore_directories: false,
        }
    }
}

/// Decides whether a change event under the incoming root is a job submission.
#[derive(Debug, Clone)]
pub struct Matcher {
    root: PathBuf,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    ignore_directories: bool,
}

impl Matcher {
    /// Compile the rule's patterns with whole-string semantics.
    pub fn new(rule: &MatchRule, root: impl Into<PathBuf>) -> Result<Self, WatchError> {
        Ok(Self {
            root: root.into(),
            include: compile(&rule.patterns, rule.case_sensitive)?,
            exclude: compile(&rule.ignore_patterns, rule.case_sensitive)?,
            ignore_directories: rule.ignore_directories,
        })
    }

    pub fn admits(&self, event: &EventRecord) -> bool {
        if event.kind == ChangeKind::Deleted {
            return false;
        }
        // Metadata churn on the root itself is not an item
        if event.src_path == self.root {
            return false;
        }

        let candidates: Vec<&Path> = event
            .dest_path
            .as_deref()
            .into_iter()
            .chain(std::iter::once(event.src_path.as_path()))
            .collect();

        if candidates.iter().any(|p| matches_any(&self.exclude, p)) {
            return false;
        }
        if !candidates.iter().any(|p| matches_any(&self.include, p)) {
            return false;
        }

        !(self.ignore_directories && event.item_path().is_dir())
    }
}

fn compile(patterns: &[String], case_sensitive: bool) -> Result<Vec<Regex>, WatchError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(&format!("^(?:{pattern})$"))
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|source| WatchError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

fn matches_any(set: &[Regex], path: &Path) -> bool {
    let text = path.to_string_lossy();
    set.iter().any(|re| re.is_match(&text))
}
