use crate::edge::DependencyEdge;
use crate::model::{Rule, RuleModel, RuleVerdict};
use crate::policy::{MissingVisibility, Verdict};
use crate::report::{Issue, IssueReporter};
use crate::trace::{NullSink, TraceEvent, TraceSink};

/// Why an edge got its verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionReason {
    SameNamespace,
    MatchedRule,
    ChildToParent,
    ParentToChild,
    Default,
}

impl DecisionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionReason::SameNamespace => "same_namespace",
            DecisionReason::MatchedRule => "matched_rule",
            DecisionReason::ChildToParent => "child_to_parent",
            DecisionReason::ParentToChild => "parent_to_child",
            DecisionReason::Default => "default",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision<'m> {
    pub verdict: Verdict,
    pub rule: Option<&'m Rule>,
    pub reason: DecisionReason,
}

/// Classifies edges against one immutable [`RuleModel`].
///
/// Holds no mutable state; share a model across threads and build one evaluator per run.
pub struct Evaluator<'m> {
    model: &'m RuleModel,
    trace: &'m dyn TraceSink,
}

impl<'m> Evaluator<'m> {
    pub fn new(model: &'m RuleModel) -> Self {
        Self::with_trace(model, &NullSink)
    }

    pub fn with_trace(model: &'m RuleModel, trace: &'m dyn TraceSink) -> Self {
        trace.trace(&TraceEvent::EvaluatorReady {
            rules: model.rules().len(),
        });
        Self { model, trace }
    }

    pub fn model(&self) -> &'m RuleModel {
        self.model
    }

    pub fn classify(&self, edge: &DependencyEdge) -> Verdict {
        self.evaluate(edge).verdict
    }

    pub fn evaluate(&self, edge: &DependencyEdge) -> Decision<'m> {
        let from = &edge.from_namespace;
        let to = &edge.to_namespace;

        if from == to {
            return Decision {
                verdict: Verdict::Allowed,
                rule: None,
                reason: DecisionReason::SameNamespace,
            };
        }

        let settings = self.model.settings();

        // Rules are sorted most specific first.
        if let Some(rule) = self
            .model
            .rules()
            .iter()
            .find(|r| r.source.matches(from) && r.target.matches(to))
        {
            let verdict = match rule.verdict {
                RuleVerdict::Allowed => Verdict::Allowed,
                RuleVerdict::Disallowed => Verdict::Disallowed,
                RuleVerdict::VisibleMembersOnly => match edge.to_type.as_deref() {
                    Some(name) if rule.visible_members.contains(name) => Verdict::Allowed,
                    Some(_) => Verdict::VisibilityViolation,
                    None => match settings.missing_visibility {
                        MissingVisibility::Disallow => Verdict::Disallowed,
                        MissingVisibility::Allow => Verdict::Allowed,
                    },
                },
            };
            return Decision {
                verdict,
                rule: Some(rule),
                reason: DecisionReason::MatchedRule,
            };
        }

        if settings.child_can_depend_on_parent_implicitly && to.is_ancestor_of(from) {
            return Decision {
                verdict: Verdict::Allowed,
                rule: None,
                reason: DecisionReason::ChildToParent,
            };
        }
        if settings.parent_can_depend_on_child_implicitly && from.is_ancestor_of(to) {
            return Decision {
                verdict: Verdict::Allowed,
                rule: None,
                reason: DecisionReason::ParentToChild,
            };
        }

        Decision {
            verdict: settings.default_verdict,
            rule: None,
            reason: DecisionReason::Default,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub edges_evaluated: usize,
    pub truncated: bool,
}

/// Classify a stream of edges, recording violations in edge order.
///
/// Excluded paths are dropped before classification. Stops as soon as the reporter's cap is
/// reached; if at least one more edge was pending, the reporter is marked truncated and a
/// `TooManyIssues` issue will close the drained list. Pending edges are never classified.
pub fn analyze<I>(
    evaluator: &Evaluator<'_>,
    edges: I,
    reporter: &mut IssueReporter,
) -> AnalysisSummary
where
    I: IntoIterator<Item = DependencyEdge>,
{
    let model = evaluator.model();
    let exclusions = model.exclusions();
    let severity = model.settings().issue_severity;

    let mut edges = edges
        .into_iter()
        .filter(|e| !exclusions.is_excluded(e.location.path.as_str()))
        .peekable();

    let mut summary = AnalysisSummary::default();

    while let Some(edge) = edges.next() {
        summary.edges_evaluated += 1;

        let decision = evaluator.evaluate(&edge);
        if decision.verdict == Verdict::Allowed {
            continue;
        }

        let issue = Issue::Dependency {
            verdict: decision.verdict,
            rule: decision.rule.cloned(),
            reason: decision.reason,
            severity,
            edge,
        };

        if !reporter.record(issue) {
            if edges.peek().is_some() {
                reporter.mark_truncated();
                summary.truncated = true;
                evaluator.trace.trace(&TraceEvent::AnalysisTruncated {
                    max_issue_count: reporter.max_issue_count(),
                });
            }
            break;
        }
    }

    summary
}
