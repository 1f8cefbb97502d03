//! Logger hierarchy and record dispatch
//!
//! Loggers are keyed by dotted name (`app.http.client`). A level set on a logger applies
//! to that logger only; the effective level of any logger is found by walking its
//! ancestors until one has an explicit level, falling back to the root.

use super::{
    error::Result,
    level_resolver::LevelOverrideMap,
    log_level::LogLevel,
    log_record::LogRecord,
    logger::Logger,
    pipeline::Pipeline,
    sink::Sink,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Root level before any configuration runs
pub const DEFAULT_ROOT_LEVEL: LogLevel = LogLevel::Warning;

/// Canonical logger name
///
/// `::` separators become `.` and surrounding dots are trimmed. The root logger is
/// the empty string; `"root"` is accepted as an alias.
pub fn normalize_name(name: &str) -> String {
    let dotted = name.trim().replace("::", ".");
    let trimmed = dotted.trim_matches('.');
    if trimmed == "root" {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Strict ancestors of a dotted name, nearest first, excluding the root
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent_of(name), |&current| parent_of(current))
}

fn parent_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

#[derive(Debug, Clone)]
struct LoggerNode {
    level: Option<LogLevel>,
    sinks: Vec<Arc<Sink>>,
    propagate: bool,
}

impl Default for LoggerNode {
    fn default() -> Self {
        Self {
            level: None,
            sinks: Vec::new(),
            propagate: true,
        }
    }
}

#[derive(Debug)]
struct RegistryState {
    root: LoggerNode,
    loggers: BTreeMap<String, LoggerNode>,
}

impl RegistryState {
    fn node(&self, name: &str) -> Option<&LoggerNode> {
        if name.is_empty() {
            Some(&self.root)
        } else {
            self.loggers.get(name)
        }
    }

    fn node_mut(&mut self, name: &str) -> &mut LoggerNode {
        if name.is_empty() {
            &mut self.root
        } else {
            self.loggers.entry(name.to_string()).or_default()
        }
    }

    fn root_level(&self) -> LogLevel {
        self.root.level.unwrap_or(DEFAULT_ROOT_LEVEL)
    }

    fn effective_level(&self, name: &str) -> LogLevel {
        if name.is_empty() {
            return self.root_level();
        }

        std::iter::once(name)
            .chain(ancestors(name))
            .find_map(|current| self.loggers.get(current).and_then(|node| node.level))
            .unwrap_or_else(|| self.root_level())
    }

    /// Sinks that accept `level`, from the logger up to the first non-propagating one
    fn collect_sinks(&self, name: &str, level: LogLevel) -> Vec<Arc<Sink>> {
        let mut collected = Vec::new();

        if !name.is_empty() {
            for current in std::iter::once(name).chain(ancestors(name)) {
                if let Some(node) = self.loggers.get(current) {
                    collected.extend(node.sinks.iter().filter(|s| s.accepts(level)).cloned());
                    if !node.propagate {
                        return collected;
                    }
                }
            }
        }

        collected.extend(
            self.root
                .sinks
                .iter()
                .filter(|s| s.accepts(level))
                .cloned(),
        );
        collected
    }
}

/// Owns the logger hierarchy, the sinks attached to it and the shared pipeline
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use structured_logger::core::{LoggerRegistry, LogLevel};
///
/// let registry = Arc::new(LoggerRegistry::new());
/// registry.set_level("uvicorn", LogLevel::Warning);
///
/// let access = registry.get_logger("uvicorn.access");
/// assert_eq!(access.effective_level(), LogLevel::Warning);
/// ```
pub struct LoggerRegistry {
    state: RwLock<RegistryState>,
    pipeline: RwLock<Arc<Pipeline>>,
}

impl LoggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                root: LoggerNode {
                    level: Some(DEFAULT_ROOT_LEVEL),
                    ..LoggerNode::default()
                },
                loggers: BTreeMap::new(),
            }),
            pipeline: RwLock::new(Arc::new(Pipeline::default())),
        }
    }

    /// Register `name` if unknown; returns the normalized name
    pub fn ensure_logger(&self, name: &str) -> String {
        let name = normalize_name(name);
        if name.is_empty() || self.state.read().loggers.contains_key(&name) {
            return name;
        }
        self.state.write().node_mut(&name);
        name
    }

    /// Handle for emitting records under `name`
    pub fn get_logger(self: &Arc<Self>, name: &str) -> Logger {
        let name = self.ensure_logger(name);
        Logger::new(name, Arc::clone(self))
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.state.read().node(&name).is_some()
    }

    /// Known loggers in sorted order, excluding the root
    pub fn logger_names(&self) -> Vec<String> {
        self.state.read().loggers.keys().cloned().collect()
    }

    pub fn set_level(&self, name: &str, level: LogLevel) {
        let name = normalize_name(name);
        self.state.write().node_mut(&name).level = Some(level);
    }

    /// Remove an explicit level so the logger inherits again
    ///
    /// The root always keeps a level; clearing it restores the default.
    pub fn clear_level(&self, name: &str) {
        let name = normalize_name(name);
        let mut state = self.state.write();
        if name.is_empty() {
            state.root.level = Some(DEFAULT_ROOT_LEVEL);
        } else if let Some(node) = state.loggers.get_mut(&name) {
            node.level = None;
        }
    }

    /// Explicit level of `name`, if one was set
    pub fn level(&self, name: &str) -> Option<LogLevel> {
        let name = normalize_name(name);
        self.state.read().node(&name).and_then(|node| node.level)
    }

    pub fn root_level(&self) -> LogLevel {
        self.state.read().root_level()
    }

    pub fn effective_level(&self, name: &str) -> LogLevel {
        let name = normalize_name(name);
        self.state.read().effective_level(&name)
    }

    pub fn is_enabled_for(&self, name: &str, level: LogLevel) -> bool {
        level >= self.effective_level(name)
    }

    pub fn set_propagate(&self, name: &str, propagate: bool) {
        let name = normalize_name(name);
        self.state.write().node_mut(&name).propagate = propagate;
    }

    pub fn propagates(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.state
            .read()
            .node(&name)
            .map_or(true, |node| node.propagate)
    }

    pub fn add_sink(&self, name: &str, sink: Arc<Sink>) {
        let name = normalize_name(name);
        self.state.write().node_mut(&name).sinks.push(sink);
    }

    /// Detach every sink from `name`, returning how many were removed
    pub fn clear_sinks(&self, name: &str) -> usize {
        let name = normalize_name(name);
        let mut state = self.state.write();
        if name.is_empty() {
            state.root.sinks.drain(..).count()
        } else {
            state
                .loggers
                .get_mut(&name)
                .map_or(0, |node| node.sinks.drain(..).count())
        }
    }

    pub fn sink_count(&self, name: &str) -> usize {
        let name = normalize_name(name);
        self.state.read().node(&name).map_or(0, |node| node.sinks.len())
    }

    /// Apply per-logger levels
    ///
    /// Every level is validated before anything changes, so an invalid entry leaves
    /// the hierarchy untouched. Each named logger gets its explicit level and
    /// propagates upward.
    pub fn apply_overrides(&self, overrides: &LevelOverrideMap) -> Result<()> {
        let parsed = overrides.parsed()?;

        let mut state = self.state.write();
        for (name, level) in parsed {
            let node = state.node_mut(&normalize_name(&name));
            node.level = Some(level);
            node.propagate = true;
        }
        Ok(())
    }

    /// Bring every known logger in line with the configured hierarchy
    ///
    /// Loggers created before configuration (typically by libraries) may carry their
    /// own sinks and levels. Each one loses its own sinks, propagates to its parent and
    /// adopts the level of its nearest ancestor that has an explicit level, even when
    /// it had an explicit level of its own. Loggers without such an ancestor keep
    /// their level. The root is never touched.
    pub fn reconcile(&self) {
        let mut state = self.state.write();
        let names: Vec<String> = state.loggers.keys().cloned().collect();

        // BTreeMap order visits parents before children, so a child sees the level its
        // parent was just given
        for name in names {
            let inherited = ancestors(&name)
                .find_map(|ancestor| state.loggers.get(ancestor).and_then(|node| node.level));

            if let Some(node) = state.loggers.get_mut(&name) {
                node.sinks.clear();
                node.propagate = true;
                if let Some(level) = inherited {
                    node.level = Some(level);
                }
            }
        }
    }

    /// Replace the processor pipeline used for every record
    pub fn set_pipeline(&self, pipeline: Pipeline) {
        *self.pipeline.write() = Arc::new(pipeline);
    }

    pub fn pipeline(&self) -> Arc<Pipeline> {
        Arc::clone(&self.pipeline.read())
    }

    /// Route a record to every sink that accepts it
    ///
    /// Records below the logger's effective level are dropped before the pipeline
    /// runs. The pipeline runs once and its event is shared by all accepting sinks.
    /// Returns the number of sinks that wrote the record.
    pub fn dispatch(&self, record: LogRecord) -> usize {
        let sinks = {
            let state = self.state.read();
            let name = normalize_name(&record.name);
            if record.level < state.effective_level(&name) {
                return 0;
            }
            state.collect_sinks(&name, record.level)
        };

        if sinks.is_empty() {
            return 0;
        }

        let event = self.pipeline().run(Arc::new(record));
        sinks.iter().filter(|sink| sink.handle(&event)).count()
    }

    /// Flush every sink in the hierarchy
    pub fn flush(&self) {
        let sinks: Vec<Arc<Sink>> = {
            let state = self.state.read();
            std::iter::once(&state.root)
                .chain(state.loggers.values())
                .flat_map(|node| node.sinks.iter().cloned())
                .collect()
        };
        for sink in sinks {
            sink.flush();
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("LoggerRegistry")
            .field("root_level", &state.root_level())
            .field("loggers", &state.loggers.len())
            .finish()
    }
}
