//! Use case orchestration for nsguard.
//!
//! This crate provides the application layer: it wires a config provider, an edge source,
//! the evaluator and the issue reporter together and shapes the result for a host. Hosts
//! (build task, IDE integration, CLI) only handle their own I/O and presentation.

#![forbid(unsafe_code)]

mod check;
mod report;

pub use check::{CheckInput, CheckOutput, FailOn, exit_code, run_check};
pub use report::{
    build_report, issue_record, parse_report_json, report_schema_json, serialize_report,
};
