use crate::model::PathExclusions;
use crate::pattern::Namespace;
use nsguard_types::{Location, SourcePath};
use serde::{Deserialize, Serialize};

/// Where in the source a dependency was observed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: SourcePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl SourceLocation {
    pub fn to_location(&self) -> Location {
        Location {
            path: self.path.clone(),
            line: self.line,
            col: self.column,
        }
    }
}

/// A directed reference from a type in one namespace to a type in another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    #[serde(rename = "from")]
    pub from_namespace: Namespace,
    #[serde(rename = "to")]
    pub to_namespace: Namespace,

    /// Referencing type name, when the backend knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_type: Option<String>,

    /// Referenced type name; needed to honor visible-members rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_type: Option<String>,

    pub location: SourceLocation,
}

impl DependencyEdge {
    pub fn new(from: impl Into<Namespace>, to: impl Into<Namespace>, path: &str) -> Self {
        Self {
            from_namespace: from.into(),
            to_namespace: to.into(),
            from_type: None,
            to_type: None,
            location: SourceLocation {
                path: SourcePath::new(path),
                line: None,
                column: None,
            },
        }
    }

    pub fn with_to_type(mut self, name: impl Into<String>) -> Self {
        self.to_type = Some(name.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.location.line = Some(line);
        self
    }
}

/// Produces dependency edges for a set of inputs.
///
/// Implemented once per parser backend. The returned iterator is lazy and finite; calling
/// `edges` again restarts the sequence from the beginning. Implementations should skip
/// inputs whose path is excluded, but the analysis loop filters again regardless.
pub trait DependencyEdgeSource {
    fn edges<'a>(
        &'a self,
        inputs: &'a [SourcePath],
        exclusions: &'a PathExclusions,
    ) -> Box<dyn Iterator<Item = DependencyEdge> + 'a>;
}

/// In-memory edge source; inputs select edges by originating path (empty = all).
#[derive(Clone, Debug, Default)]
pub struct StaticEdgeSource {
    edges: Vec<DependencyEdge>,
}

impl StaticEdgeSource {
    pub fn new(edges: Vec<DependencyEdge>) -> Self {
        Self { edges }
    }
}

impl DependencyEdgeSource for StaticEdgeSource {
    fn edges<'a>(
        &'a self,
        inputs: &'a [SourcePath],
        exclusions: &'a PathExclusions,
    ) -> Box<dyn Iterator<Item = DependencyEdge> + 'a> {
        Box::new(
            self.edges
                .iter()
                .filter(move |e| inputs.is_empty() || inputs.contains(&e.location.path))
                .filter(move |e| !exclusions.is_excluded(e.location.path.as_str()))
                .cloned(),
        )
    }
}
