//! Edge dumps written by an external parser backend.
//!
//! One JSON object per line, in the shape of [`DependencyEdge`]. Dumps are read lazily,
//! file by file, so an analysis that stops at the issue cap never reads the rest.
//!
//! Exclusion globs are rooted at their config directory, so relative edge paths are
//! anchored at a base directory before matching. The base defaults to the directory of the
//! dump file; the edge itself keeps the path as written.

use camino::{Utf8Path, Utf8PathBuf};
use nsguard_domain::{
    DependencyEdge, DependencyEdgeSource, NullSink, PathExclusions, TraceEvent, TraceSink,
};
use nsguard_types::SourcePath;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::WalkDir;

/// Suffix of dump files picked up when a directory is given.
pub const EDGE_DUMP_SUFFIX: &str = ".edges.jsonl";

pub struct JsonLinesEdgeSource {
    dumps: Vec<Utf8PathBuf>,
    base_dir: Option<Utf8PathBuf>,
    trace: Arc<dyn TraceSink>,
}

impl JsonLinesEdgeSource {
    /// `dumps` may name files or directories; directories are searched recursively for
    /// `*.edges.jsonl` in file-name order.
    pub fn new(dumps: Vec<Utf8PathBuf>) -> Self {
        Self {
            dumps,
            base_dir: None,
            trace: Arc::new(NullSink),
        }
    }

    /// Anchor relative edge paths at `base_dir` instead of each dump's directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    fn dump_files(&self) -> Vec<Utf8PathBuf> {
        let mut out = Vec::new();
        for dump in &self.dumps {
            if !dump.is_dir() {
                out.push(dump.clone());
                continue;
            }
            for entry in WalkDir::new(dump).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        self.skip(dump.as_str(), &err.to_string());
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                match pathbuf_to_utf8(entry.path().to_path_buf()) {
                    Some(path) if path.as_str().ends_with(EDGE_DUMP_SUFFIX) => out.push(path),
                    Some(_) => {}
                    None => self.skip(&entry.path().to_string_lossy(), "path is not UTF-8"),
                }
            }
        }
        out
    }

    fn base_for(&self, file: &Utf8Path) -> Utf8PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => file.parent().map(Utf8Path::to_path_buf).unwrap_or_default(),
        }
    }

    fn read_dump(&self, file: Utf8PathBuf) -> Box<dyn Iterator<Item = DependencyEdge> + '_> {
        let handle = match std::fs::File::open(&file) {
            Ok(handle) => handle,
            Err(err) => {
                self.skip(file.as_str(), &err.to_string());
                return Box::new(std::iter::empty());
            }
        };

        let read_file = file.clone();
        Box::new(
            BufReader::new(handle)
                .split(b'\n')
                .enumerate()
                .map_while(move |(idx, line)| match line {
                    Ok(bytes) => Some((idx + 1, bytes)),
                    Err(err) => {
                        self.skip(&format!("{read_file}:{}", idx + 1), &err.to_string());
                        None
                    }
                })
                .filter_map(move |(line_no, bytes)| {
                    let line = match String::from_utf8(bytes) {
                        Ok(line) => line,
                        Err(err) => {
                            self.skip(&format!("{file}:{line_no}"), &err.to_string());
                            return None;
                        }
                    };
                    let text = line.trim();
                    if text.is_empty() {
                        return None;
                    }
                    match serde_json::from_str::<DependencyEdge>(text) {
                        Ok(edge) => Some(edge),
                        Err(err) => {
                            self.skip(&format!("{file}:{line_no}"), &err.to_string());
                            None
                        }
                    }
                }),
        )
    }

    fn skip(&self, input: &str, reason: &str) {
        self.trace.trace(&TraceEvent::EdgeSourceSkipped { input, reason });
    }
}

impl DependencyEdgeSource for JsonLinesEdgeSource {
    fn edges<'a>(
        &'a self,
        inputs: &'a [SourcePath],
        exclusions: &'a PathExclusions,
    ) -> Box<dyn Iterator<Item = DependencyEdge> + 'a> {
        Box::new(
            self.dump_files()
                .into_iter()
                .flat_map(move |file| {
                    let base = self.base_for(&file);
                    self.read_dump(file).filter(move |e| {
                        let anchored = e.location.path.resolve_against(&base);
                        !exclusions.is_excluded(anchored.as_str())
                    })
                })
                .filter(move |e| inputs.is_empty() || inputs.contains(&e.location.path)),
        )
    }
}

/// Render edges in the dump format.
pub fn to_json_lines(edges: &[DependencyEdge]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for edge in edges {
        out.push_str(&serde_json::to_string(edge)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write a dump file, creating parent directories.
pub fn write_edge_dump(path: &Utf8Path, edges: &[DependencyEdge]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = to_json_lines(edges).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
