use crate::edge::DependencyEdge;
use crate::model::{PathExclusions, Rule, RuleModel, RuleVerdict};
use crate::pattern::NamespacePattern;
use crate::policy::{PolicySettings, Verdict};

pub fn pattern(s: &str) -> NamespacePattern {
    NamespacePattern::parse(s).expect("valid test pattern")
}

pub fn allowed(from: &str, to: &str) -> Rule {
    Rule::new(pattern(from), pattern(to), RuleVerdict::Allowed)
}

pub fn disallowed(from: &str, to: &str) -> Rule {
    Rule::new(pattern(from), pattern(to), RuleVerdict::Disallowed)
}

pub fn visible(from: &str, to: &str, types: &[&str]) -> Rule {
    Rule::visible_members(pattern(from), pattern(to), types.iter().copied())
}

pub fn edge(from: &str, to: &str) -> DependencyEdge {
    DependencyEdge::new(from, to, "src/lib.cs").with_line(1)
}

pub fn settings_with_default(default_verdict: Verdict) -> PolicySettings {
    PolicySettings {
        default_verdict,
        ..PolicySettings::default()
    }
}

pub fn model_with(rules: Vec<Rule>, settings: PolicySettings) -> RuleModel {
    RuleModel::new(rules, settings, PathExclusions::none()).expect("unambiguous test rules")
}
