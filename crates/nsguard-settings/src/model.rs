use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `nsguard.toml` schema v1.
///
/// This is a *user-facing* declaration: every scalar is optional so that nested declarations
/// only state what they override. Unknown keys are ignored for forward compatibility.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NsguardConfigV1 {
    /// Optional schema string for tooling (`nsguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `false` turns checking off for this location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Verdict when no rule matches: `allowed` or `disallowed` (default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// How many issues to report before stopping the analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_issue_count: Option<u32>,

    /// How many ancestor directories contribute declarations (0 = none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_can_depend_on_parent_implicitly: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_can_depend_on_child_implicitly: Option<bool>,

    /// What a visible-members rule does when the edge has no type name: `disallow` or `allow`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_visibility: Option<String>,

    /// Severity of dependency issues: `info`, `warning`, `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_severity: Option<String>,

    /// Source path globs to skip; relative globs are rooted at the declaring file's directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<RuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disallowed: Vec<RuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visible_members: Vec<VisibleMembersConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    /// Namespace pattern of the referencing side.
    pub from: String,
    /// Namespace pattern of the referenced side.
    pub to: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisibleMembersConfig {
    pub from: String,
    pub to: String,
    /// Type names in `to` that `from` may reference.
    #[serde(default)]
    pub types: Vec<String>,
}
