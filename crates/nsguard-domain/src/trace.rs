//! Trace hooks for notable state transitions.
//!
//! A sink is passed explicitly to the config providers and the evaluator. There is no
//! process-wide logger state in this crate; `TracingSink` bridges to `tracing` for hosts that
//! install a subscriber.

use std::fmt;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceKind {
    LoadAttempted,
    LoadSucceeded,
    LoadFailed,
    NoConfigFound,
    ReloadSkipped,
    ReloadTriggered,
    AmbiguityDetected,
    EvaluatorReady,
    EdgeSourceSkipped,
    AnalysisTruncated,
}

#[derive(Clone, Copy, Debug)]
pub enum TraceEvent<'a> {
    LoadAttempted { location: &'a str },
    LoadSucceeded { location: &'a str, rules: usize },
    LoadFailed { location: &'a str, error: &'a (dyn std::error::Error + 'static) },
    NoConfigFound { location: &'a str },
    ReloadSkipped { location: &'a str },
    ReloadTriggered { location: &'a str },
    AmbiguityDetected { location: &'a str, first: &'a str, second: &'a str },
    EvaluatorReady { rules: usize },
    EdgeSourceSkipped { input: &'a str, reason: &'a str },
    AnalysisTruncated { max_issue_count: usize },
}

impl TraceEvent<'_> {
    pub fn kind(&self) -> TraceKind {
        match self {
            TraceEvent::LoadAttempted { .. } => TraceKind::LoadAttempted,
            TraceEvent::LoadSucceeded { .. } => TraceKind::LoadSucceeded,
            TraceEvent::LoadFailed { .. } => TraceKind::LoadFailed,
            TraceEvent::NoConfigFound { .. } => TraceKind::NoConfigFound,
            TraceEvent::ReloadSkipped { .. } => TraceKind::ReloadSkipped,
            TraceEvent::ReloadTriggered { .. } => TraceKind::ReloadTriggered,
            TraceEvent::AmbiguityDetected { .. } => TraceKind::AmbiguityDetected,
            TraceEvent::EvaluatorReady { .. } => TraceKind::EvaluatorReady,
            TraceEvent::EdgeSourceSkipped { .. } => TraceKind::EdgeSourceSkipped,
            TraceEvent::AnalysisTruncated { .. } => TraceKind::AnalysisTruncated,
        }
    }
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::LoadAttempted { location } => write!(f, "loading config {location}"),
            TraceEvent::LoadSucceeded { location, rules } => {
                write!(f, "loaded config {location} ({rules} rules)")
            }
            TraceEvent::LoadFailed { location, error } => {
                write!(f, "failed to load config {location}: {error}")
            }
            TraceEvent::NoConfigFound { location } => write!(f, "no config at {location}"),
            TraceEvent::ReloadSkipped { location } => {
                write!(f, "config {location} unchanged; reusing last result")
            }
            TraceEvent::ReloadTriggered { location } => {
                write!(f, "config {location} changed; reloading")
            }
            TraceEvent::AmbiguityDetected {
                location,
                first,
                second,
            } => write!(f, "ambiguous rules in {location}: '{first}' vs '{second}'"),
            TraceEvent::EvaluatorReady { rules } => write!(f, "evaluator ready with {rules} rules"),
            TraceEvent::EdgeSourceSkipped { input, reason } => {
                write!(f, "skipped edge input {input}: {reason}")
            }
            TraceEvent::AnalysisTruncated { max_issue_count } => {
                write!(f, "analysis stopped at max_issue_count={max_issue_count}")
            }
        }
    }
}

pub trait TraceSink: Send + Sync {
    fn trace(&self, event: &TraceEvent<'_>);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn trace(&self, _event: &TraceEvent<'_>) {}
}

/// Forwards events to the `tracing` ecosystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn trace(&self, event: &TraceEvent<'_>) {
        let kind = event.kind();
        match event {
            TraceEvent::LoadFailed { location, .. } => {
                tracing::warn!(?kind, location = %location, "{event}");
            }
            TraceEvent::AmbiguityDetected { location, .. } => {
                tracing::warn!(?kind, location = %location, "{event}");
            }
            TraceEvent::EdgeSourceSkipped { input, .. } => {
                tracing::warn!(?kind, input = %input, "{event}");
            }
            _ => tracing::debug!(?kind, "{event}"),
        }
    }
}

/// Collects rendered events; handy for hosts that show a trace pane, and for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(TraceKind, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<TraceKind> {
        self.lock().iter().map(|(k, _)| *k).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self, kind: TraceKind) -> usize {
        self.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(TraceKind, String)>> {
        // A poisoned sink still holds valid strings.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TraceSink for RecordingSink {
    fn trace(&self, event: &TraceEvent<'_>) {
        self.lock().push((event.kind(), event.to_string()));
    }
}
