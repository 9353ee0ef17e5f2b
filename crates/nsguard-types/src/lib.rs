//! Stable DTOs and IDs used across the nsguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the host-facing report
//! - stable string codes for issue kinds
//! - canonical source path handling

#![forbid(unsafe_code)]

pub mod ids;
pub mod path;
pub mod report;

pub use path::SourcePath;
pub use report::{
    ConfigStatus, IssueRecord, Location, NsguardData, NsguardReport, SCHEMA_REPORT_V1, Severity,
    SeverityCounts, ToolMeta,
};
