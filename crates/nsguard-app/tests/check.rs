//! End-to-end checks over fixture directories and temp trees.

use camino::{Utf8Path, Utf8PathBuf};
use nsguard_app::{
    CheckInput, FailOn, parse_report_json, report_schema_json, run_check, serialize_report,
};
use nsguard_domain::{DependencyEdge, Issue, RecordingSink, StaticEdgeSource, TraceKind};
use nsguard_repo::{FileConfigProvider, JsonLinesEdgeSource, MultiLevelConfigProvider};
use nsguard_test_util::{fixtures_dir, normalize_nondeterministic};
use nsguard_types::{ConfigStatus, SourcePath, ids};
use std::sync::Arc;
use tempfile::TempDir;

fn fixture(name: &str) -> Utf8PathBuf {
    fixtures_dir(env!("CARGO_MANIFEST_DIR")).join(name)
}

fn expected_report(dir: &Utf8Path) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join("expected.report.json"))
        .expect("should read expected report");
    serde_json::from_str(&text).expect("expected report should be JSON")
}

fn actual_report(output: &nsguard_app::CheckOutput) -> serde_json::Value {
    let bytes = serialize_report(&output.report).expect("serialize report");
    normalize_nondeterministic(serde_json::from_slice(&bytes).expect("report is JSON"))
}

#[test]
fn layered_rules_match_golden_report() {
    let dir = fixture("check_layers");
    let mut provider = FileConfigProvider::new(dir.join("nsguard.toml"));
    let source = JsonLinesEdgeSource::new(vec![dir.join("edges")]);

    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.status, ConfigStatus::Loaded);
    assert_eq!(output.exit_code, 2);
    assert!(output.summary.truncated);
    assert_eq!(
        actual_report(&output),
        expected_report(&dir),
        "report should match golden snapshot"
    );
}

#[test]
fn missing_config_produces_single_info_issue() {
    let dir = fixture("no_config");
    let mut provider = FileConfigProvider::new(dir.join("nsguard.toml"));
    let source = JsonLinesEdgeSource::new(vec![dir.join("edges")]);

    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.status, ConfigStatus::NoConfig);
    assert_eq!(output.exit_code, 0);
    assert_eq!(output.summary.edges_evaluated, 0);
    assert_eq!(actual_report(&output), expected_report(&dir));
}

#[test]
fn nested_declarations_merge_within_depth() {
    let dir = fixture("nested_inheritance");
    let mut provider = MultiLevelConfigProvider::new(dir.join("service"));
    let source = JsonLinesEdgeSource::new(vec![dir.join("service/edges")]);

    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.status, ConfigStatus::Loaded);
    let targets: Vec<(&str, &str)> = output
        .issues
        .iter()
        .filter_map(Issue::edge)
        .map(|e| (e.from_namespace.as_str(), e.to_namespace.as_str()))
        .collect();
    assert_eq!(
        targets,
        vec![("Service.Data", "Service.Api"), ("Service.Api", "Legacy")]
    );
    assert!(
        output
            .report
            .issues
            .iter()
            .all(|i| i.severity == nsguard_types::Severity::Error)
    );
    assert_eq!(output.summary.edges_evaluated, 4);
}

#[test]
fn broken_config_is_reported_not_raised() {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    std::fs::write(root.join("nsguard.toml"), "max_issue_count = 0").expect("write");

    let mut provider = FileConfigProvider::new(root.join("nsguard.toml"));
    let source = StaticEdgeSource::new(vec![DependencyEdge::new("A", "B", "a.cs")]);
    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.status, ConfigStatus::Error);
    assert_eq!(output.exit_code, 1);
    assert_eq!(output.report.issues.len(), 1);
    assert_eq!(output.report.issues[0].code, ids::CODE_CONFIG_ERROR);
    assert!(output.report.issues[0].message.contains("max_issue_count"));
}

#[test]
fn disabled_config_skips_evaluation() {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    std::fs::write(root.join("nsguard.toml"), "enabled = false").expect("write");

    let mut provider = FileConfigProvider::new(root.join("nsguard.toml"));
    let source = StaticEdgeSource::new(vec![DependencyEdge::new("A", "B", "a.cs")]);
    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.status, ConfigStatus::Disabled);
    assert_eq!(output.issues, vec![Issue::ConfigDisabled]);
    assert_eq!(output.exit_code, 0);
}

#[test]
fn exclusions_rooted_at_config_dir_drop_edges() {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    std::fs::write(root.join("nsguard.toml"), "excluded_files = [\"generated/**\"]")
        .expect("write");

    let generated = root.join("generated/x.cs");
    let handwritten = root.join("src/y.cs");
    let source = StaticEdgeSource::new(vec![
        DependencyEdge::new("A", "B", generated.as_str()),
        DependencyEdge::new("A", "C", handwritten.as_str()),
    ]);

    let mut provider = FileConfigProvider::new(root.join("nsguard.toml"));
    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.summary.edges_evaluated, 1);
    assert_eq!(output.issues.len(), 1);
    assert_eq!(
        output.issues[0].edge().map(|e| e.to_namespace.as_str()),
        Some("C")
    );
}

#[test]
fn relative_dump_paths_honor_config_exclusions() {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    std::fs::write(root.join("nsguard.toml"), "excluded_files = [\"generated/**\"]")
        .expect("write");
    nsguard_repo::write_edge_dump(
        &root.join("app.edges.jsonl"),
        &[
            DependencyEdge::new("A", "B", "generated/x.cs"),
            DependencyEdge::new("A", "C", "src/y.cs"),
        ],
    )
    .expect("write dump");

    let mut provider = FileConfigProvider::new(root.join("nsguard.toml"));
    let source = JsonLinesEdgeSource::new(vec![root.join("app.edges.jsonl")]);
    let output = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(output.summary.edges_evaluated, 1);
    let edge = output.issues[0].edge().expect("dependency issue");
    assert_eq!(edge.to_namespace.as_str(), "C");
    assert_eq!(edge.location.path.as_str(), "src/y.cs");
}

#[test]
fn inputs_and_fail_on_are_honored() {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    std::fs::write(root.join("nsguard.toml"), "").expect("write");

    let source = StaticEdgeSource::new(vec![
        DependencyEdge::new("A", "B", "a.cs"),
        DependencyEdge::new("A", "C", "b.cs"),
    ]);
    let inputs = [SourcePath::new("b.cs")];
    let sink = RecordingSink::new();

    let mut provider = FileConfigProvider::new(root.join("nsguard.toml"));
    let mut input = CheckInput::new(&mut provider, &source);
    input.inputs = &inputs;
    input.fail_on = FailOn::Warning;
    input.trace = &sink;
    let output = run_check(input);

    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.exit_code, 2);
    assert_eq!(sink.count(TraceKind::EvaluatorReady), 1);
}

#[test]
fn repeated_checks_reuse_cached_policy() {
    let dir = fixture("check_layers");
    let sink = Arc::new(RecordingSink::new());
    let mut provider = FileConfigProvider::with_trace(dir.join("nsguard.toml"), sink.clone());
    let source = JsonLinesEdgeSource::new(vec![dir.join("edges")]);

    let first = run_check(CheckInput::new(&mut provider, &source));
    let second = run_check(CheckInput::new(&mut provider, &source));

    assert_eq!(first.issues, second.issues);
    assert_eq!(sink.count(TraceKind::LoadAttempted), 1);
    assert_eq!(sink.count(TraceKind::ReloadSkipped), 1);
}

#[test]
fn report_validates_against_schema_and_parses_back() {
    let dir = fixture("check_layers");
    let mut provider = FileConfigProvider::new(dir.join("nsguard.toml"));
    let source = JsonLinesEdgeSource::new(vec![dir.join("edges")]);
    let output = run_check(CheckInput::new(&mut provider, &source));

    let schema: serde_json::Value =
        serde_json::from_str(&report_schema_json().expect("schema")).expect("schema JSON");
    let validator = jsonschema::validator_for(&schema).expect("schema compiles");

    let bytes = serialize_report(&output.report).expect("serialize");
    let instance: serde_json::Value = serde_json::from_slice(&bytes).expect("report JSON");
    assert!(validator.is_valid(&instance));

    let text = String::from_utf8(bytes).expect("utf8");
    assert_eq!(parse_report_json(&text).expect("parse"), output.report);
}
