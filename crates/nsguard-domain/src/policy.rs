use nsguard_types::Severity;

pub const DEFAULT_MAX_ISSUE_COUNT: usize = 100;
pub const DEFAULT_INHERITANCE_DEPTH: usize = 0;

/// Classification outcome for one dependency edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Allowed,
    Disallowed,
    /// The edge matched a visible-members rule but referenced a member outside the list.
    VisibilityViolation,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Allowed => "allowed",
            Verdict::Disallowed => "disallowed",
            Verdict::VisibilityViolation => "visibility_violation",
        }
    }
}

/// What a visible-members rule does when the edge carries no target type name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingVisibility {
    #[default]
    Disallow,
    Allow,
}

/// Scalar settings of a compiled rule model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySettings {
    pub enabled: bool,
    /// Applied when no rule matches. Only `Allowed` or `Disallowed` are meaningful here.
    pub default_verdict: Verdict,
    pub max_issue_count: usize,
    pub inheritance_depth: usize,
    pub child_can_depend_on_parent_implicitly: bool,
    pub parent_can_depend_on_child_implicitly: bool,
    pub missing_visibility: MissingVisibility,
    /// Severity of edge-level issues.
    pub issue_severity: Severity,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_verdict: Verdict::Disallowed,
            max_issue_count: DEFAULT_MAX_ISSUE_COUNT,
            inheritance_depth: DEFAULT_INHERITANCE_DEPTH,
            child_can_depend_on_parent_implicitly: false,
            parent_can_depend_on_child_implicitly: false,
            missing_visibility: MissingVisibility::Disallow,
            issue_severity: Severity::Warning,
        }
    }
}
