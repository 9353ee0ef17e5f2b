use crate::pattern::{NamespacePattern, Specificity};
use crate::policy::PolicySettings;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleVerdict {
    Allowed,
    Disallowed,
    VisibleMembersOnly,
}

impl RuleVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleVerdict::Allowed => "allowed",
            RuleVerdict::Disallowed => "disallowed",
            RuleVerdict::VisibleMembersOnly => "visible_members",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub source: NamespacePattern,
    pub target: NamespacePattern,
    pub verdict: RuleVerdict,
    /// Type names of `target` that stay reachable under `VisibleMembersOnly`.
    pub visible_members: BTreeSet<String>,
}

impl Rule {
    pub fn new(source: NamespacePattern, target: NamespacePattern, verdict: RuleVerdict) -> Self {
        Self {
            source,
            target,
            verdict,
            visible_members: BTreeSet::new(),
        }
    }

    pub fn visible_members<I, S>(source: NamespacePattern, target: NamespacePattern, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            target,
            verdict: RuleVerdict::VisibleMembersOnly,
            visible_members: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Source specificity first, then target specificity.
    pub fn specificity(&self) -> (Specificity, Specificity) {
        (self.source.specificity(), self.target.specificity())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.verdict.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rules '{first}' and '{second}' are equally specific and overlap")]
pub struct AmbiguityError {
    pub first: Rule,
    pub second: Rule,
}

/// Compiled source-path exclusion globs.
#[derive(Clone, Debug, Default)]
pub struct PathExclusions {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl PathExclusions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(patterns: Vec<String>) -> Result<Self, globset::Error> {
        if patterns.is_empty() {
            return Ok(Self::none());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(Glob::new(&pattern.replace('\\', "/"))?);
        }
        Ok(Self {
            set: Some(builder.build()?),
            patterns,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(path.replace('\\', "/")),
            None => false,
        }
    }
}

impl PartialEq for PathExclusions {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for PathExclusions {}

/// The compiled, immutable policy. Replace it on reload; never patch it.
///
/// Rules are kept sorted by descending specificity so the first match is the winner.
/// Construction rejects equally specific overlapping rules, so evaluation is always total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleModel {
    rules: Vec<Rule>,
    settings: PolicySettings,
    exclusions: PathExclusions,
}

impl RuleModel {
    pub fn new(
        rules: Vec<Rule>,
        settings: PolicySettings,
        exclusions: PathExclusions,
    ) -> Result<Self, AmbiguityError> {
        let mut ranked: Vec<((Specificity, Specificity), Rule)> =
            rules.into_iter().map(|r| (r.specificity(), r)).collect();

        for (i, (spec_a, a)) in ranked.iter().enumerate() {
            for (spec_b, b) in &ranked[i + 1..] {
                if spec_a == spec_b && a.source.overlaps(&b.source) && a.target.overlaps(&b.target)
                {
                    return Err(AmbiguityError {
                        first: a.clone(),
                        second: b.clone(),
                    });
                }
            }
        }

        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));

        Ok(Self {
            rules: ranked.into_iter().map(|(_, r)| r).collect(),
            settings,
            exclusions,
        })
    }

    /// A model with no rules: every edge gets the default verdict.
    pub fn empty(settings: PolicySettings) -> Self {
        Self {
            rules: Vec::new(),
            settings,
            exclusions: PathExclusions::none(),
        }
    }

    /// Rules in evaluation order (most specific first).
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    pub fn exclusions(&self) -> &PathExclusions {
        &self.exclusions
    }
}
