//! File-backed config providers.
//!
//! A provider owns the load/refresh lifecycle of one effective rule model. `refresh` is the
//! hot path: when no backing file changed it hands back the cached result without touching
//! file contents.

use crate::state::{ConfigSourceState, Probe};
use camino::{Utf8Path, Utf8PathBuf};
use nsguard_domain::{
    AmbiguityError, NullSink, RuleModel, TraceEvent, TraceSink, policy::DEFAULT_INHERITANCE_DEPTH,
};
use nsguard_settings::{CONFIG_FILE_NAME, ConfigBuilder, ConfigError, NsguardConfigV1};
use nsguard_types::ConfigStatus;
use std::sync::Arc;

/// Outcome of a load or refresh.
///
/// Cloning is cheap; a refresh that finds nothing changed returns a clone that shares the
/// same `Arc` as the previous result.
#[derive(Clone, Debug)]
pub enum ConfigLoadResult {
    Loaded(Arc<RuleModel>),
    /// No backing file; nothing to check.
    NoConfig,
    /// The file exists but sets `enabled = false`.
    Disabled,
    Error(Arc<ConfigLoadError>),
}

impl ConfigLoadResult {
    pub fn status(&self) -> ConfigStatus {
        match self {
            ConfigLoadResult::Loaded(_) => ConfigStatus::Loaded,
            ConfigLoadResult::NoConfig => ConfigStatus::NoConfig,
            ConfigLoadResult::Disabled => ConfigStatus::Disabled,
            ConfigLoadResult::Error(_) => ConfigStatus::Error,
        }
    }

    pub fn model(&self) -> Option<&Arc<RuleModel>> {
        match self {
            ConfigLoadResult::Loaded(model) => Some(model),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ConfigLoadError> {
        match self {
            ConfigLoadResult::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Identity comparison: the same cached instance, not merely an equal one.
    pub fn is_same(&self, other: &ConfigLoadResult) -> bool {
        match (self, other) {
            (ConfigLoadResult::Loaded(a), ConfigLoadResult::Loaded(b)) => Arc::ptr_eq(a, b),
            (ConfigLoadResult::Error(a), ConfigLoadResult::Error(b)) => Arc::ptr_eq(a, b),
            (ConfigLoadResult::NoConfig, ConfigLoadResult::NoConfig)
            | (ConfigLoadResult::Disabled, ConfigLoadResult::Disabled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("cannot read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}")]
    Config {
        path: Utf8PathBuf,
        #[source]
        source: ConfigError,
    },
}

impl ConfigLoadError {
    pub fn path(&self) -> &Utf8Path {
        match self {
            ConfigLoadError::Read { path, .. } | ConfigLoadError::Config { path, .. } => path,
        }
    }

    pub fn ambiguity(&self) -> Option<&AmbiguityError> {
        match self {
            ConfigLoadError::Config { source, .. } => source.ambiguity(),
            ConfigLoadError::Read { .. } => None,
        }
    }

    /// The error and its causes joined with `: `.
    pub fn chain_message(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            out.push_str(": ");
            out.push_str(&e.to_string());
            cause = e.source();
        }
        out
    }
}

/// Lifecycle contract shared by every backing-source flavor.
///
/// Methods take `&mut self`: one provider serves one coordinating caller at a time. Wrap it
/// in a `Mutex` to share it.
pub trait ConfigProvider {
    /// Primary backing file (the nearest one for multi-level providers).
    fn config_location(&self) -> &Utf8Path;

    /// Unconditionally read, parse and build.
    fn load(&mut self) -> ConfigLoadResult;

    /// Return the cached result unless a backing file changed since the last load.
    fn refresh(&mut self) -> ConfigLoadResult;

    fn has_changed(&self) -> bool;
}

/// Read one declaration, updating its state. `Ok(None)` means the file does not exist.
fn read_declaration(
    state: &mut ConfigSourceState,
) -> Result<Option<NsguardConfigV1>, ConfigLoadError> {
    let probe = Probe::of(state.path());
    if !probe.exists {
        state.mark_missing();
        return Ok(None);
    }

    let text = std::fs::read_to_string(state.path()).map_err(|source| ConfigLoadError::Read {
        path: state.path().to_path_buf(),
        source,
    })?;
    let cfg = nsguard_settings::parse_config_toml(&text).map_err(|source| {
        ConfigLoadError::Config {
            path: state.path().to_path_buf(),
            source,
        }
    })?;

    state.mark_loaded(probe.modified);
    Ok(Some(cfg))
}

fn build_model(
    declarations: &[(Utf8PathBuf, NsguardConfigV1)],
    location: &Utf8Path,
) -> Result<RuleModel, ConfigLoadError> {
    let mut builder = ConfigBuilder::new();
    for (path, cfg) in declarations {
        builder = builder
            .merge(cfg, path.parent())
            .map_err(|source| ConfigLoadError::Config {
                path: path.clone(),
                source,
            })?;
    }
    builder.build().map_err(|source| ConfigLoadError::Config {
        path: location.to_path_buf(),
        source,
    })
}

/// Turn the outcome of a load into a result, emitting trace events and resetting state on
/// failure so the next refresh retries.
fn settle(
    outcome: Result<Option<RuleModel>, ConfigLoadError>,
    location: &Utf8Path,
    states: &mut [ConfigSourceState],
    trace: &dyn TraceSink,
) -> ConfigLoadResult {
    match outcome {
        Ok(None) => {
            trace.trace(&TraceEvent::NoConfigFound {
                location: location.as_str(),
            });
            ConfigLoadResult::NoConfig
        }
        Ok(Some(model)) => {
            trace.trace(&TraceEvent::LoadSucceeded {
                location: location.as_str(),
                rules: model.rules().len(),
            });
            if model.settings().enabled {
                ConfigLoadResult::Loaded(Arc::new(model))
            } else {
                ConfigLoadResult::Disabled
            }
        }
        Err(err) => {
            for state in states.iter_mut() {
                state.mark_missing();
            }
            if let Some(amb) = err.ambiguity() {
                trace.trace(&TraceEvent::AmbiguityDetected {
                    location: err.path().as_str(),
                    first: &amb.first.to_string(),
                    second: &amb.second.to_string(),
                });
            }
            trace.trace(&TraceEvent::LoadFailed {
                location: err.path().as_str(),
                error: &err,
            });
            ConfigLoadResult::Error(Arc::new(err))
        }
    }
}

/// The cached result when nothing changed; `None` when the caller must load.
fn reuse(
    last: &Option<ConfigLoadResult>,
    changed: bool,
    location: &Utf8Path,
    trace: &dyn TraceSink,
) -> Option<ConfigLoadResult> {
    let last = last.as_ref()?;
    if changed {
        trace.trace(&TraceEvent::ReloadTriggered {
            location: location.as_str(),
        });
        return None;
    }
    trace.trace(&TraceEvent::ReloadSkipped {
        location: location.as_str(),
    });
    Some(last.clone())
}

/// A single `nsguard.toml`, no inheritance.
pub struct FileConfigProvider {
    state: ConfigSourceState,
    last: Option<ConfigLoadResult>,
    trace: Arc<dyn TraceSink>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self::with_trace(path, Arc::new(NullSink))
    }

    pub fn with_trace(path: impl Into<Utf8PathBuf>, trace: Arc<dyn TraceSink>) -> Self {
        Self {
            state: ConfigSourceState::new(path.into()),
            last: None,
            trace,
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn config_location(&self) -> &Utf8Path {
        self.state.path()
    }

    fn load(&mut self) -> ConfigLoadResult {
        let location = self.state.path().to_path_buf();
        self.trace.trace(&TraceEvent::LoadAttempted {
            location: location.as_str(),
        });

        let outcome = read_declaration(&mut self.state).and_then(|cfg| match cfg {
            None => Ok(None),
            Some(cfg) => build_model(&[(location.clone(), cfg)], &location).map(Some),
        });

        let result = settle(
            outcome,
            &location,
            std::slice::from_mut(&mut self.state),
            self.trace.as_ref(),
        );
        self.last = Some(result.clone());
        result
    }

    fn refresh(&mut self) -> ConfigLoadResult {
        let changed = self.has_changed();
        match reuse(&self.last, changed, self.state.path(), self.trace.as_ref()) {
            Some(cached) => cached,
            None => self.load(),
        }
    }

    fn has_changed(&self) -> bool {
        self.state.has_changed()
    }
}

/// A directory's `nsguard.toml` merged over up to `inheritance_depth` ancestor declarations.
///
/// The depth is read from the nearest declaration. Every probed level is tracked, missing or
/// not, so creating or deleting an ancestor file triggers a reload.
pub struct MultiLevelConfigProvider {
    dir: Utf8PathBuf,
    file_name: String,
    location: Utf8PathBuf,
    /// Index 0 is the nearest level, then parents outward.
    levels: Vec<ConfigSourceState>,
    last: Option<ConfigLoadResult>,
    inheritance_depth: usize,
    contributing: Vec<Utf8PathBuf>,
    trace: Arc<dyn TraceSink>,
}

impl MultiLevelConfigProvider {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self::with_trace(dir, Arc::new(NullSink))
    }

    pub fn with_trace(dir: impl Into<Utf8PathBuf>, trace: Arc<dyn TraceSink>) -> Self {
        Self::with_file_name(dir, CONFIG_FILE_NAME, trace)
    }

    pub fn with_file_name(
        dir: impl Into<Utf8PathBuf>,
        file_name: &str,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        let dir = dir.into();
        let location = dir.join(file_name);
        Self {
            levels: vec![ConfigSourceState::new(location.clone())],
            dir,
            file_name: file_name.to_string(),
            location,
            last: None,
            inheritance_depth: DEFAULT_INHERITANCE_DEPTH,
            contributing: Vec::new(),
            trace,
        }
    }

    /// Depth declared by the nearest file at the last load.
    pub fn inheritance_depth(&self) -> usize {
        self.inheritance_depth
    }

    /// Files that contributed to the last load, farthest ancestor first.
    pub fn contributing_files(&self) -> &[Utf8PathBuf] {
        &self.contributing
    }

    fn load_levels(&mut self) -> Result<Option<RuleModel>, ConfigLoadError> {
        self.contributing.clear();
        let mut nearest = ConfigSourceState::new(self.location.clone());
        let Some(child) = read_declaration(&mut nearest)? else {
            self.levels = vec![nearest];
            self.inheritance_depth = DEFAULT_INHERITANCE_DEPTH;
            return Ok(None);
        };

        let depth = child
            .inheritance_depth
            .map(|d| d as usize)
            .unwrap_or(DEFAULT_INHERITANCE_DEPTH);

        let mut levels = vec![nearest];
        let mut declarations = Vec::new();
        for ancestor in self.dir.ancestors().skip(1).take(depth) {
            let mut state = ConfigSourceState::new(ancestor.join(&self.file_name));
            let cfg = read_declaration(&mut state);
            levels.push(state);
            if let Some(cfg) = cfg? {
                declarations.push((ancestor.join(&self.file_name), cfg));
            }
        }
        self.levels = levels;
        self.inheritance_depth = depth;

        declarations.reverse();
        declarations.push((self.location.clone(), child));
        self.contributing = declarations.iter().map(|(p, _)| p.clone()).collect();
        build_model(&declarations, &self.location).map(Some)
    }
}

impl ConfigProvider for MultiLevelConfigProvider {
    fn config_location(&self) -> &Utf8Path {
        &self.location
    }

    fn load(&mut self) -> ConfigLoadResult {
        let location = self.location.clone();
        self.trace.trace(&TraceEvent::LoadAttempted {
            location: location.as_str(),
        });

        let outcome = self.load_levels();
        let result = settle(outcome, &location, &mut self.levels, self.trace.as_ref());
        self.last = Some(result.clone());
        result
    }

    fn refresh(&mut self) -> ConfigLoadResult {
        let changed = self.has_changed();
        match reuse(&self.last, changed, &self.location, self.trace.as_ref()) {
            Some(cached) => cached,
            None => self.load(),
        }
    }

    fn has_changed(&self) -> bool {
        self.levels.iter().any(ConfigSourceState::has_changed)
    }
}
