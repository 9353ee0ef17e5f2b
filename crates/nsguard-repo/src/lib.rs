//! Filesystem adapters: cached config providers and edge dump readers.
//!
//! This crate is allowed to do filesystem IO. It never watches files; change detection is a
//! cheap existence/mtime probe made on every `refresh`.

#![forbid(unsafe_code)]

mod edges;
mod provider;
mod state;

pub use edges::{EDGE_DUMP_SUFFIX, JsonLinesEdgeSource, to_json_lines, write_edge_dump};
pub use provider::{
    ConfigLoadError, ConfigLoadResult, ConfigProvider, FileConfigProvider,
    MultiLevelConfigProvider,
};

/// Fuzz-friendly API for exercising parsing without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use nsguard_domain::DependencyEdge;

    /// Parse one dump line. **Never panics** on any input.
    pub fn parse_edge_line(text: &str) -> Result<DependencyEdge, serde_json::Error> {
        serde_json::from_str(text.trim())
    }
}
