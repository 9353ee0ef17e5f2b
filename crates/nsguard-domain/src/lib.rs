//! Pure policy evaluation (no IO).
//!
//! Input: a compiled [`model::RuleModel`] plus a lazy stream of dependency edges.
//! Output: verdicts per edge and a bounded, ordered list of issues.

#![forbid(unsafe_code)]

pub mod edge;
pub mod fingerprint;
pub mod model;
pub mod pattern;
pub mod policy;
pub mod report;
pub mod trace;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use edge::{DependencyEdge, DependencyEdgeSource, SourceLocation, StaticEdgeSource};
pub use engine::{AnalysisSummary, Decision, DecisionReason, Evaluator, analyze};
pub use model::{AmbiguityError, PathExclusions, Rule, RuleModel, RuleVerdict};
pub use pattern::{Namespace, NamespacePattern, PatternError, Specificity};
pub use policy::{MissingVisibility, PolicySettings, Verdict};
pub use report::{Issue, IssueReporter};
pub use trace::{NullSink, RecordingSink, TraceEvent, TraceKind, TraceSink, TracingSink};
