//! The `check` use case: refresh the policy, classify edges, produce a report.

use nsguard_domain::{
    AnalysisSummary, DependencyEdgeSource, Evaluator, Issue, IssueReporter, NullSink, TraceSink,
    policy::DEFAULT_MAX_ISSUE_COUNT,
};
use nsguard_repo::{ConfigLoadResult, ConfigProvider};
use nsguard_types::{ConfigStatus, NsguardReport, Severity, SourcePath};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::report::build_report;

/// Lowest issue severity that makes a run fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
}

impl FailOn {
    fn threshold(self) -> Severity {
        match self {
            FailOn::Error => Severity::Error,
            FailOn::Warning => Severity::Warning,
        }
    }
}

/// Input for the check use case.
pub struct CheckInput<'a> {
    /// Cached policy; refreshed (not reloaded) on every run.
    pub provider: &'a mut dyn ConfigProvider,
    /// Backend producing dependency edges.
    pub source: &'a dyn DependencyEdgeSource,
    /// Source files to check; empty means everything the source knows about.
    pub inputs: &'a [SourcePath],
    pub fail_on: FailOn,
    /// Receives evaluator events. Provider events go to the provider's own sink.
    pub trace: &'a dyn TraceSink,
}

impl<'a> CheckInput<'a> {
    pub fn new(
        provider: &'a mut dyn ConfigProvider,
        source: &'a dyn DependencyEdgeSource,
    ) -> Self {
        Self {
            provider,
            source,
            inputs: &[],
            fail_on: FailOn::default(),
            trace: &NullSink,
        }
    }
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub status: ConfigStatus,
    /// Drained issues in edge order, closed by `TooManyIssues` when truncated.
    pub issues: Vec<Issue>,
    pub summary: AnalysisSummary,
    pub report: NsguardReport,
    pub exit_code: i32,
}

/// Run one check. Never fails: a config failure becomes a `config_error` issue and
/// status `Error` so the host decides whether to stop the build.
pub fn run_check(input: CheckInput<'_>) -> CheckOutput {
    let started_at = OffsetDateTime::now_utc();
    let CheckInput {
        provider,
        source,
        inputs,
        fail_on,
        trace,
    } = input;

    let config_location = provider.config_location().to_string();
    let loaded = provider.refresh();
    let status = loaded.status();
    debug!(location = %config_location, ?status, "policy refreshed");

    let (issues, summary, rules) = match &loaded {
        ConfigLoadResult::Loaded(model) => {
            let evaluator = Evaluator::with_trace(model, trace);
            let mut reporter = IssueReporter::new(model.settings().max_issue_count);
            let edges = source.edges(inputs, model.exclusions());
            let summary = nsguard_domain::analyze(&evaluator, edges, &mut reporter);
            (reporter.drain(), summary, model.rules().len())
        }
        ConfigLoadResult::NoConfig => run_level(|r| r.record_no_config()),
        ConfigLoadResult::Disabled => run_level(|r| r.record_config_disabled()),
        ConfigLoadResult::Error(err) => run_level(|r| r.record_config_error(err.chain_message())),
    };

    let finished_at = OffsetDateTime::now_utc();
    let report = build_report(
        status,
        &issues,
        &summary,
        rules,
        Some(config_location.as_str()),
        started_at,
        finished_at,
    );
    let exit_code = exit_code(status, &issues, fail_on);

    info!(
        ?status,
        edges = summary.edges_evaluated,
        issues = issues.len(),
        truncated = summary.truncated,
        exit_code,
        "check finished"
    );

    CheckOutput {
        status,
        issues,
        summary,
        report,
        exit_code,
    }
}

/// A run that never reaches edge evaluation.
fn run_level(record: impl FnOnce(&mut IssueReporter)) -> (Vec<Issue>, AnalysisSummary, usize) {
    let mut reporter = IssueReporter::new(DEFAULT_MAX_ISSUE_COUNT);
    record(&mut reporter);
    (reporter.drain(), AnalysisSummary::default(), 0)
}

/// Map a run to a process exit code.
///
/// - `1`: the policy could not be loaded
/// - `2`: at least one issue at or above `fail_on`
/// - `0`: otherwise (including no config and disabled)
pub fn exit_code(status: ConfigStatus, issues: &[Issue], fail_on: FailOn) -> i32 {
    if status == ConfigStatus::Error {
        return 1;
    }
    let threshold = fail_on.threshold();
    if issues.iter().any(|i| i.severity() >= threshold) {
        2
    } else {
        0
    }
}
