use crate::edge::DependencyEdge;
use crate::engine::DecisionReason;
use crate::fingerprint::fingerprint_for_edge;
use crate::model::Rule;
use crate::policy::Verdict;
use nsguard_types::{Location, Severity, ids};
use serde_json::{Value, json};

#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    /// An edge classified `Disallowed` or `VisibilityViolation`.
    Dependency {
        edge: DependencyEdge,
        verdict: Verdict,
        rule: Option<Rule>,
        reason: DecisionReason,
        severity: Severity,
    },
    /// The issue cap was reached while edges were still pending.
    TooManyIssues { max_issue_count: usize },
    NoConfigFile,
    ConfigDisabled,
    ConfigError { message: String },
}

impl Issue {
    pub fn code(&self) -> &'static str {
        match self {
            Issue::Dependency {
                verdict: Verdict::VisibilityViolation,
                ..
            } => ids::CODE_VISIBILITY_VIOLATION,
            Issue::Dependency { .. } => ids::CODE_ILLEGAL_DEPENDENCY,
            Issue::TooManyIssues { .. } => ids::CODE_TOO_MANY_ISSUES,
            Issue::NoConfigFile => ids::CODE_NO_CONFIG_FILE,
            Issue::ConfigDisabled => ids::CODE_CONFIG_DISABLED,
            Issue::ConfigError { .. } => ids::CODE_CONFIG_ERROR,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::Dependency { severity, .. } => *severity,
            Issue::TooManyIssues { .. } => Severity::Warning,
            Issue::NoConfigFile | Issue::ConfigDisabled => Severity::Info,
            Issue::ConfigError { .. } => Severity::Error,
        }
    }

    pub fn edge(&self) -> Option<&DependencyEdge> {
        match self {
            Issue::Dependency { edge, .. } => Some(edge),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<Location> {
        self.edge().map(|e| e.location.to_location())
    }

    pub fn message(&self) -> String {
        match self {
            Issue::Dependency {
                edge,
                verdict: Verdict::VisibilityViolation,
                ..
            } => format!(
                "'{}' may only reference visible members of '{}', not '{}'",
                edge.from_namespace,
                edge.to_namespace,
                edge.to_type.as_deref().unwrap_or("?"),
            ),
            Issue::Dependency { edge, .. } => format!(
                "illegal namespace reference: '{}' -> '{}'",
                edge.from_namespace, edge.to_namespace
            ),
            Issue::TooManyIssues { max_issue_count } => {
                format!("too many issues; analysis stopped after {max_issue_count}")
            }
            Issue::NoConfigFile => "no config file found; nothing to check".to_string(),
            Issue::ConfigDisabled => "dependency checking is disabled by config".to_string(),
            Issue::ConfigError { message } => format!("config error: {message}"),
        }
    }

    pub fn fingerprint(&self) -> Option<String> {
        self.edge().map(|e| {
            fingerprint_for_edge(
                self.code(),
                e.from_namespace.as_str(),
                e.to_namespace.as_str(),
                e.location.path.as_str(),
            )
        })
    }

    /// Structured payload for hosts.
    pub fn data(&self) -> Value {
        match self {
            Issue::Dependency {
                edge, rule, reason, ..
            } => json!({
                "from": edge.from_namespace.as_str(),
                "to": edge.to_namespace.as_str(),
                "from_type": edge.from_type,
                "to_type": edge.to_type,
                "reason": reason.as_str(),
                "rule": rule.as_ref().map(|r| json!({
                    "from": r.source.as_str(),
                    "to": r.target.as_str(),
                    "verdict": r.verdict.as_str(),
                })),
            }),
            Issue::TooManyIssues { max_issue_count } => json!({ "max_issue_count": max_issue_count }),
            _ => Value::Null,
        }
    }
}

/// Bounded, ordered collector of issues for one analysis run.
#[derive(Clone, Debug)]
pub struct IssueReporter {
    max_issue_count: usize,
    issues: Vec<Issue>,
    recorded: usize,
    truncated: bool,
}

impl IssueReporter {
    pub fn new(max_issue_count: usize) -> Self {
        Self {
            max_issue_count,
            issues: Vec::new(),
            recorded: 0,
            truncated: false,
        }
    }

    pub fn max_issue_count(&self) -> usize {
        self.max_issue_count
    }

    /// Record an edge issue. Returns false once the cap is reached; after that further
    /// issues are dropped and the run counts as truncated.
    pub fn record(&mut self, issue: Issue) -> bool {
        if self.recorded >= self.max_issue_count {
            self.truncated = true;
            return false;
        }
        self.issues.push(issue);
        self.recorded += 1;
        self.recorded < self.max_issue_count
    }

    /// Flag that edges were left unevaluated because the cap was reached.
    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Run-level issue that replaces edge evaluation entirely.
    pub fn record_no_config(&mut self) {
        self.issues.push(Issue::NoConfigFile);
    }

    pub fn record_config_disabled(&mut self) {
        self.issues.push(Issue::ConfigDisabled);
    }

    pub fn record_config_error(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::ConfigError {
            message: message.into(),
        });
    }

    /// Take every issue in recording order, closing with `TooManyIssues` when truncated.
    pub fn drain(&mut self) -> Vec<Issue> {
        let mut out = std::mem::take(&mut self.issues);
        if self.truncated {
            out.push(Issue::TooManyIssues {
                max_issue_count: self.max_issue_count,
            });
        }
        self.recorded = 0;
        self.truncated = false;
        out
    }
}
