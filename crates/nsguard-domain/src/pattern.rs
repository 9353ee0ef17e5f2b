//! Namespaces and wildcard namespace patterns.
//!
//! A namespace is a dot-separated list of non-empty segments; the global namespace (`""` or
//! `"."`) has none. A pattern segment is a literal, `*` (exactly one segment) or `**` (zero or
//! more segments, first and/or last position only).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A concrete namespace name, e.g. `App.Core.Model`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let v = s.as_ref().trim();
        if v == "." {
            return Self::global();
        }
        Self(v.to_string())
    }

    pub fn global() -> Self {
        Self(String::new())
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> Vec<&str> {
        if self.is_global() {
            Vec::new()
        } else {
            self.0.split('.').collect()
        }
    }

    /// True when `self` is a proper ancestor of `other` (`A` is an ancestor of `A.B`).
    /// The global namespace is an ancestor of every other namespace.
    pub fn is_ancestor_of(&self, other: &Namespace) -> bool {
        let mine = self.segments();
        let theirs = other.segments();
        mine.len() < theirs.len() && theirs.starts_with(&mine)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<String> for Namespace {
    fn from(value: String) -> Self {
        Namespace::new(value)
    }
}

impl From<&str> for Namespace {
    fn from(value: &str) -> Self {
        Namespace::new(value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("namespace pattern '{pattern}' has an empty segment")]
    EmptySegment { pattern: String },

    #[error("namespace pattern '{pattern}' mixes '*' with other characters in segment '{segment}'")]
    PartialWildcard { pattern: String, segment: String },

    #[error("namespace pattern '{pattern}' uses '**' in an inner position")]
    InnerDoubleWildcard { pattern: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    One,
    Many,
}

impl Segment {
    fn rank(&self) -> SegmentRank {
        match self {
            Segment::Literal(_) => SegmentRank::Literal,
            Segment::One => SegmentRank::One,
            Segment::Many => SegmentRank::Many,
        }
    }
}

/// Compiled namespace pattern. Immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespacePattern {
    text: String,
    segments: Vec<Segment>,
}

impl NamespacePattern {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self {
                text: ".".to_string(),
                segments: Vec::new(),
            });
        }

        let raw: Vec<&str> = trimmed.split('.').collect();
        let last = raw.len() - 1;
        let mut segments = Vec::with_capacity(raw.len());
        for (i, seg) in raw.iter().enumerate() {
            let parsed = match *seg {
                "" => {
                    return Err(PatternError::EmptySegment {
                        pattern: trimmed.to_string(),
                    });
                }
                "*" => Segment::One,
                "**" if i == 0 || i == last => Segment::Many,
                "**" => {
                    return Err(PatternError::InnerDoubleWildcard {
                        pattern: trimmed.to_string(),
                    });
                }
                s if s.contains('*') => {
                    return Err(PatternError::PartialWildcard {
                        pattern: trimmed.to_string(),
                        segment: s.to_string(),
                    });
                }
                s => Segment::Literal(s.to_string()),
            };
            segments.push(parsed);
        }

        Ok(Self {
            text: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, namespace: &Namespace) -> bool {
        match_segments(&self.segments, &namespace.segments())
    }

    /// Whether some concrete namespace is matched by both patterns.
    pub fn overlaps(&self, other: &NamespacePattern) -> bool {
        overlap(&self.segments, &other.segments)
    }

    pub fn specificity(&self) -> Specificity {
        let leading_literals = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Literal(_)))
            .count();
        let wildcards = self
            .segments
            .iter()
            .filter(|s| !matches!(s, Segment::Literal(_)))
            .count();
        Specificity {
            leading_literals,
            wildcards,
            shape: self.segments.iter().map(Segment::rank).collect(),
        }
    }
}

impl fmt::Display for NamespacePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for NamespacePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamespacePattern::parse(s)
    }
}

fn match_segments(pattern: &[Segment], name: &[&str]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((Segment::Many, rest)) => (0..=name.len()).any(|skip| match_segments(rest, &name[skip..])),
        Some((Segment::One, rest)) => !name.is_empty() && match_segments(rest, &name[1..]),
        Some((Segment::Literal(lit), rest)) => {
            name.first().is_some_and(|n| *n == lit.as_str()) && match_segments(rest, &name[1..])
        }
    }
}

fn overlap(a: &[Segment], b: &[Segment]) -> bool {
    match (a.split_first(), b.split_first()) {
        (None, None) => true,
        (Some((Segment::Many, a_rest)), _) => {
            overlap(a_rest, b) || (!b.is_empty() && overlap(a, &b[1..]))
        }
        (_, Some((Segment::Many, b_rest))) => {
            overlap(a, b_rest) || (!a.is_empty() && overlap(&a[1..], b))
        }
        (None, _) | (_, None) => false,
        (Some((x, a_rest)), Some((y, b_rest))) => {
            let compatible = match (x, y) {
                (Segment::Literal(l), Segment::Literal(r)) => l == r,
                _ => true,
            };
            compatible && overlap(a_rest, b_rest)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum SegmentRank {
    Many,
    One,
    Literal,
}

/// Total order over patterns; greater means more specific.
///
/// Ordered by leading literal count (more wins), then wildcard count (fewer wins), then
/// position-wise segment kind (literal > `*` > `**`). `Equal` means identical shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Specificity {
    leading_literals: usize,
    wildcards: usize,
    shape: Vec<SegmentRank>,
}

impl Specificity {
    pub fn leading_literals(&self) -> usize {
        self.leading_literals
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.leading_literals
            .cmp(&other.leading_literals)
            .then_with(|| other.wildcards.cmp(&self.wildcards))
            .then_with(|| self.shape.cmp(&other.shape))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
