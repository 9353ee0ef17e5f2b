use anyhow::Context;
use nsguard_domain::{AnalysisSummary, Issue};
use nsguard_types::{
    ConfigStatus, IssueRecord, NsguardData, NsguardReport, SCHEMA_REPORT_V1, SeverityCounts,
    ToolMeta,
};
use time::OffsetDateTime;

/// Flatten a domain issue for hosts.
pub fn issue_record(issue: &Issue) -> IssueRecord {
    IssueRecord {
        severity: issue.severity(),
        code: issue.code().to_string(),
        message: issue.message(),
        location: issue.location(),
        fingerprint: issue.fingerprint(),
        data: issue.data(),
    }
}

pub fn build_report(
    status: ConfigStatus,
    issues: &[Issue],
    summary: &AnalysisSummary,
    rules: usize,
    config_location: Option<&str>,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
) -> NsguardReport {
    let records: Vec<IssueRecord> = issues.iter().map(issue_record).collect();
    let issues_emitted = issues.iter().filter(|i| i.edge().is_some()).count();

    NsguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "nsguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        status,
        counts: SeverityCounts::from_issues(&records),
        data: NsguardData {
            config_location: config_location.map(str::to_string),
            rules: saturating_u32(rules),
            edges_evaluated: saturating_u32(summary.edges_evaluated),
            issues_emitted: saturating_u32(issues_emitted),
            truncated: summary.truncated,
        },
        issues: records,
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn serialize_report(report: &NsguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<NsguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    serde_json::from_value(value).context("parse nsguard report")
}

/// JSON schema of the report envelope.
pub fn report_schema_json() -> anyhow::Result<String> {
    let schema = schemars::schema_for!(NsguardReport);
    serde_json::to_string_pretty(&schema).context("serialize report schema")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsguard_domain::{DecisionReason, DependencyEdge, Verdict};
    use nsguard_types::Severity;

    fn dependency(to: &str) -> Issue {
        Issue::Dependency {
            edge: DependencyEdge::new("App", to, "src/app.cs").with_line(4),
            verdict: Verdict::Disallowed,
            rule: None,
            reason: DecisionReason::Default,
            severity: Severity::Warning,
        }
    }

    fn report_for(issues: &[Issue]) -> NsguardReport {
        let summary = AnalysisSummary {
            edges_evaluated: 3,
            truncated: true,
        };
        let now = OffsetDateTime::UNIX_EPOCH;
        build_report(ConfigStatus::Loaded, issues, &summary, 2, None, now, now)
    }

    #[test]
    fn report_counts_and_data_reflect_issues() {
        let issues = vec![
            dependency("Db"),
            dependency("Net"),
            Issue::TooManyIssues { max_issue_count: 2 },
        ];
        let report = report_for(&issues);

        assert_eq!(report.schema, SCHEMA_REPORT_V1);
        assert_eq!(report.counts.warning, 3);
        assert_eq!(report.data.issues_emitted, 2);
        assert_eq!(report.data.edges_evaluated, 3);
        assert!(report.data.truncated);
        assert_eq!(report.issues[0].location.as_ref().and_then(|l| l.line), Some(4));
        assert_eq!(report.issues[2].code, "too_many_issues");
    }

    #[test]
    fn serialized_report_parses_back() {
        let report = report_for(&[dependency("Db")]);
        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        let parsed = parse_report_json(&text).expect("parse");
        assert_eq!(parsed, report);
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let err = parse_report_json(r#"{"schema":"other.v9"}"#).unwrap_err();
        assert!(err.to_string().contains("other.v9"));
    }

    #[test]
    fn report_schema_lists_envelope_fields() {
        let schema = report_schema_json().expect("schema");
        for key in ["schema", "tool", "status", "issues", "data"] {
            assert!(schema.contains(key), "missing {key}");
        }
    }
}
