//! Stable identifiers for issue kinds.
//!
//! Codes are short snake_case discriminators and never change once released.

// Edge-level issues
pub const CODE_ILLEGAL_DEPENDENCY: &str = "illegal_dependency";
pub const CODE_VISIBILITY_VIOLATION: &str = "visibility_violation";

// Run-level issues
pub const CODE_TOO_MANY_ISSUES: &str = "too_many_issues";
pub const CODE_NO_CONFIG_FILE: &str = "no_config_file";
pub const CODE_CONFIG_DISABLED: &str = "config_disabled";
pub const CODE_CONFIG_ERROR: &str = "config_error";

/// All known issue codes, in documentation order.
pub fn all_codes() -> &'static [&'static str] {
    &[
        CODE_ILLEGAL_DEPENDENCY,
        CODE_VISIBILITY_VIOLATION,
        CODE_TOO_MANY_ISSUES,
        CODE_NO_CONFIG_FILE,
        CODE_CONFIG_DISABLED,
        CODE_CONFIG_ERROR,
    ]
}
