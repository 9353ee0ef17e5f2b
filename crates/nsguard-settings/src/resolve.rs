use crate::error::ConfigError;
use crate::model::{NsguardConfigV1, RuleConfig, VisibleMembersConfig};
use camino::{Utf8Path, Utf8PathBuf};
use globset::Glob;
use nsguard_domain::{
    MissingVisibility, NamespacePattern, PathExclusions, PolicySettings, Rule, RuleModel,
    RuleVerdict, Verdict,
};
use nsguard_types::Severity;
use std::collections::BTreeSet;

pub const SCHEMA_CONFIG_V1: &str = "nsguard.config.v1";

/// Accumulates declarations from the top-most ancestor down to the nearest one.
///
/// Scalars from a later declaration override earlier ones. A rule whose `(from, to)` pair
/// already exists replaces it; every other rule is added. Exclusion globs accumulate.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    settings: PolicySettings,
    rules: Vec<Rule>,
    exclusions: Vec<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one declaration. Relative exclusion globs are rooted at `base_dir` when given.
    pub fn merge(
        mut self,
        cfg: &NsguardConfigV1,
        base_dir: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(schema) = cfg.schema.as_deref() {
            if schema != SCHEMA_CONFIG_V1 {
                return Err(ConfigError::InvalidValue {
                    field: "schema",
                    value: schema.to_string(),
                    expected: SCHEMA_CONFIG_V1,
                });
            }
        }

        self.merge_settings(cfg)?;

        let mut declared: BTreeSet<(String, String)> = BTreeSet::new();
        for rule in declared_rules(cfg)? {
            let key = (
                rule.source.as_str().to_string(),
                rule.target.as_str().to_string(),
            );
            if !declared.insert(key) {
                return Err(ConfigError::DuplicateRule {
                    from: rule.source.to_string(),
                    to: rule.target.to_string(),
                });
            }
            match self
                .rules
                .iter_mut()
                .find(|r| r.source == rule.source && r.target == rule.target)
            {
                Some(existing) => *existing = rule,
                None => self.rules.push(rule),
            }
        }

        for pattern in &cfg.excluded_files {
            let rooted = root_glob(pattern, base_dir);
            Glob::new(&rooted).map_err(|source| ConfigError::InvalidExclusion {
                pattern: pattern.clone(),
                source,
            })?;
            self.exclusions.push(rooted);
        }

        Ok(self)
    }

    /// Compile the merged declarations. Fails on ambiguity.
    pub fn build(self) -> Result<RuleModel, ConfigError> {
        let exclusions = PathExclusions::new(self.exclusions.clone()).map_err(|source| {
            ConfigError::InvalidExclusion {
                pattern: self.exclusions.join(", "),
                source,
            }
        })?;
        Ok(RuleModel::new(self.rules, self.settings, exclusions)?)
    }

    fn merge_settings(&mut self, cfg: &NsguardConfigV1) -> Result<(), ConfigError> {
        let s = &mut self.settings;
        if let Some(enabled) = cfg.enabled {
            s.enabled = enabled;
        }
        if let Some(v) = cfg.default.as_deref() {
            s.default_verdict = parse_default_verdict(v)?;
        }
        if let Some(max) = cfg.max_issue_count {
            if max == 0 {
                return Err(ConfigError::ZeroMaxIssueCount);
            }
            s.max_issue_count = max as usize;
        }
        if let Some(depth) = cfg.inheritance_depth {
            s.inheritance_depth = depth as usize;
        }
        if let Some(v) = cfg.child_can_depend_on_parent_implicitly {
            s.child_can_depend_on_parent_implicitly = v;
        }
        if let Some(v) = cfg.parent_can_depend_on_child_implicitly {
            s.parent_can_depend_on_child_implicitly = v;
        }
        if let Some(v) = cfg.missing_visibility.as_deref() {
            s.missing_visibility = parse_missing_visibility(v)?;
        }
        if let Some(v) = cfg.issue_severity.as_deref() {
            s.issue_severity = parse_severity(v)?;
        }
        Ok(())
    }
}

fn declared_rules(cfg: &NsguardConfigV1) -> Result<Vec<Rule>, ConfigError> {
    let mut out = Vec::with_capacity(
        cfg.allowed.len() + cfg.disallowed.len() + cfg.visible_members.len(),
    );
    for RuleConfig { from, to } in &cfg.allowed {
        out.push(Rule::new(parse_pattern(from)?, parse_pattern(to)?, RuleVerdict::Allowed));
    }
    for RuleConfig { from, to } in &cfg.disallowed {
        out.push(Rule::new(
            parse_pattern(from)?,
            parse_pattern(to)?,
            RuleVerdict::Disallowed,
        ));
    }
    for VisibleMembersConfig { from, to, types } in &cfg.visible_members {
        out.push(Rule::visible_members(
            parse_pattern(from)?,
            parse_pattern(to)?,
            types.iter().map(|t| t.trim().to_string()),
        ));
    }
    Ok(out)
}

/// Turn a compiled model back into a single declaration that rebuilds an equivalent model.
pub fn export_config(model: &RuleModel) -> NsguardConfigV1 {
    let s = model.settings();
    let mut cfg = NsguardConfigV1 {
        schema: Some(SCHEMA_CONFIG_V1.to_string()),
        enabled: Some(s.enabled),
        default: Some(s.default_verdict.as_str().to_string()),
        max_issue_count: Some(u32::try_from(s.max_issue_count).unwrap_or(u32::MAX)),
        inheritance_depth: Some(u32::try_from(s.inheritance_depth).unwrap_or(u32::MAX)),
        child_can_depend_on_parent_implicitly: Some(s.child_can_depend_on_parent_implicitly),
        parent_can_depend_on_child_implicitly: Some(s.parent_can_depend_on_child_implicitly),
        missing_visibility: Some(
            match s.missing_visibility {
                MissingVisibility::Disallow => "disallow",
                MissingVisibility::Allow => "allow",
            }
            .to_string(),
        ),
        issue_severity: Some(s.issue_severity.as_str().to_string()),
        excluded_files: model.exclusions().patterns().to_vec(),
        ..NsguardConfigV1::default()
    };

    for rule in model.rules() {
        let from = rule.source.as_str().to_string();
        let to = rule.target.as_str().to_string();
        match rule.verdict {
            RuleVerdict::Allowed => cfg.allowed.push(RuleConfig { from, to }),
            RuleVerdict::Disallowed => cfg.disallowed.push(RuleConfig { from, to }),
            RuleVerdict::VisibleMembersOnly => cfg.visible_members.push(VisibleMembersConfig {
                from,
                to,
                types: rule.visible_members.iter().cloned().collect(),
            }),
        }
    }
    cfg
}

fn root_glob(pattern: &str, base_dir: Option<&Utf8Path>) -> String {
    let normalized = pattern.replace('\\', "/");
    match base_dir {
        Some(dir) if !is_absolute_glob(&normalized) => {
            let joined: Utf8PathBuf = dir.join(&normalized);
            joined.as_str().replace('\\', "/")
        }
        _ => normalized,
    }
}

fn is_absolute_glob(pattern: &str) -> bool {
    pattern.starts_with('/') || Utf8Path::new(pattern).is_absolute()
}

fn parse_pattern(v: &str) -> Result<NamespacePattern, ConfigError> {
    NamespacePattern::parse(v.trim()).map_err(|source| ConfigError::InvalidPattern {
        pattern: v.to_string(),
        source,
    })
}

fn parse_default_verdict(v: &str) -> Result<Verdict, ConfigError> {
    match v {
        "allowed" => Ok(Verdict::Allowed),
        "disallowed" => Ok(Verdict::Disallowed),
        other => Err(ConfigError::InvalidValue {
            field: "default",
            value: other.to_string(),
            expected: "allowed|disallowed",
        }),
    }
}

fn parse_missing_visibility(v: &str) -> Result<MissingVisibility, ConfigError> {
    match v {
        "disallow" => Ok(MissingVisibility::Disallow),
        "allow" => Ok(MissingVisibility::Allow),
        other => Err(ConfigError::InvalidValue {
            field: "missing_visibility",
            value: other.to_string(),
            expected: "disallow|allow",
        }),
    }
}

fn parse_severity(v: &str) -> Result<Severity, ConfigError> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => Err(ConfigError::InvalidValue {
            field: "issue_severity",
            value: other.to_string(),
            expected: "info|warning|error",
        }),
    }
}
