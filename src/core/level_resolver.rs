//! Per-logger level overrides from files, environment and callers
//!
//! Sources, highest priority first:
//! 1. an explicit, non-empty map passed by the caller
//! 2. the file named by `LOGGING_LEVELS_FILE` (`.json`, `.yaml` or `.yml`)
//! 3. inline JSON or YAML in `LOGGING_LEVELS`
//!
//! A source that fails to load prints a diagnostic and yields nothing, so a broken
//! file falls through to the inline variable. Nested mappings are flattened into
//! dotted logger names:
//!
//! ```yaml
//! uvicorn:
//!   error: INFO      # -> "uvicorn.error": "INFO"
//! httpx: warn        # -> "httpx": "WARNING"
//! ```

use super::error::{LoggerError, Result};
use super::log_level::{normalize_level_name, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable naming a JSON/YAML overrides file
pub const LEVELS_FILE_ENV: &str = "LOGGING_LEVELS_FILE";

/// Environment variable holding inline JSON/YAML overrides
pub const LEVELS_ENV: &str = "LOGGING_LEVELS";

/// Logger name → normalized level name
///
/// Level values are upper-cased with `WARN` folded into `WARNING` on insert, but
/// they are not validated until [`LevelOverrideMap::parsed`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct LevelOverrideMap(BTreeMap<String, String>);

impl LevelOverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logger: impl Into<String>, level: impl AsRef<str>) {
        self.0
            .insert(logger.into(), normalize_level_name(level.as_ref()));
    }

    #[must_use]
    pub fn with(mut self, logger: impl Into<String>, level: impl AsRef<str>) -> Self {
        self.insert(logger, level);
        self
    }

    pub fn get(&self, logger: &str) -> Option<&str> {
        self.0.get(logger).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate every level, failing on the first unknown name
    pub fn parsed(&self) -> Result<Vec<(String, LogLevel)>> {
        self.0
            .iter()
            .map(|(name, level)| {
                level
                    .parse::<LogLevel>()
                    .map(|parsed| (name.clone(), parsed))
                    .map_err(|_| LoggerError::invalid_level(name, level))
            })
            .collect()
    }
}

impl From<BTreeMap<String, String>> for LevelOverrideMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for LevelOverrideMap
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LevelOverrideMap::new();
        for (logger, level) in iter {
            map.insert(logger, level);
        }
        map
    }
}

/// Flatten a parsed mapping into dotted logger names
///
/// String leaves become entries; nested mappings recurse. Any other leaf is
/// reported and skipped without affecting its siblings.
pub fn flatten_levels(data: &Map<String, Value>) -> LevelOverrideMap {
    let mut out = LevelOverrideMap::new();
    flatten_into(data, "", &mut out);
    out
}

fn flatten_into(data: &Map<String, Value>, parent: &str, out: &mut LevelOverrideMap) {
    for (key, value) in data {
        let name = if parent.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", parent, key)
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &name, out),
            Value::String(level) => out.insert(name, level),
            other => eprintln!(
                "[LOGGER WARNING] Invalid logger level type for {}: {}",
                name,
                value_kind(other)
            ),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn expect_mapping(value: Value, source: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoggerError::config(
            source,
            format!("must contain a mapping, got {}", value_kind(&other)),
        )),
    }
}

/// Parse an overrides file, choosing the format by extension
pub fn parse_levels_file(path: &Path) -> Result<LevelOverrideMap> {
    if !path.exists() {
        return Err(LoggerError::config(
            "logger levels file",
            format!("not found: {}", path.display()),
        ));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        LoggerError::io_operation("reading logger levels file", path.display().to_string(), e)
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let parsed: Value = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml_ng::from_str(&content)?,
        other => {
            return Err(LoggerError::config(
                "logger levels file",
                format!("unsupported extension '.{}' (use .json, .yaml, or .yml)", other),
            ))
        }
    };

    let source = format!("logger levels file {}", path.display());
    Ok(flatten_levels(&expect_mapping(parsed, &source)?))
}

/// Parse inline overrides, trying JSON first and YAML second
pub fn parse_levels_str(text: &str) -> Result<LevelOverrideMap> {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => serde_yaml_ng::from_str(text)?,
    };
    Ok(flatten_levels(&expect_mapping(parsed, LEVELS_ENV)?))
}

/// Builds a [`LevelOverrideMap`] from environment-style sources
///
/// The lookup function stands in for the process environment so resolution can be
/// exercised without touching global state.
///
/// # Example
///
/// ```
/// use structured_logger::core::level_resolver::{LevelResolver, LEVELS_ENV};
///
/// let resolver = LevelResolver::with_lookup(|key: &str| {
///     (key == LEVELS_ENV).then(|| r#"{"a": "INFO", "b": "warn"}"#.to_string())
/// });
/// let levels = resolver.resolve(None);
/// assert_eq!(levels.get("b"), Some("WARNING"));
/// ```
pub struct LevelResolver<F = fn(&str) -> Option<String>> {
    lookup: F,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl LevelResolver {
    /// Resolve from the real process environment
    pub fn from_env() -> Self {
        Self { lookup: env_var }
    }
}

impl Default for LevelResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

impl<F> LevelResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    /// Overrides from the file variable, falling through to the inline variable
    ///
    /// Returns `None` when neither source is set or both fail to load.
    pub fn from_sources(&self) -> Option<LevelOverrideMap> {
        if let Some(file) = self.var(LEVELS_FILE_ENV) {
            match parse_levels_file(Path::new(&file)) {
                Ok(levels) => return Some(levels),
                Err(e) => eprintln!(
                    "[LOGGER WARNING] Failed to load logger levels file {}: {}",
                    file, e
                ),
            }
        }

        let inline = self.var(LEVELS_ENV)?;
        match parse_levels_str(&inline) {
            Ok(levels) => Some(levels),
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Failed to parse {} as JSON or YAML: {}",
                    LEVELS_ENV, e
                );
                None
            }
        }
    }

    /// Final override map: an explicit non-empty map wins outright
    pub fn resolve(&self, explicit: Option<&LevelOverrideMap>) -> LevelOverrideMap {
        match explicit {
            Some(levels) if !levels.is_empty() => levels.clone(),
            _ => self.from_sources().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn resolver(vars: Vec<(&'static str, String)>) -> LevelResolver<impl Fn(&str) -> Option<String>> {
        let vars: HashMap<&'static str, String> = vars.into_iter().collect();
        LevelResolver::with_lookup(move |key: &str| vars.get(key).cloned())
    }

    #[test]
    fn test_flatten_nested() {
        let levels = flatten_levels(&map(json!({"a": {"b": {"c": "INFO"}}})));
        assert_eq!(levels, LevelOverrideMap::new().with("a.b.c", "INFO"));
    }

    #[test]
    fn test_flatten_mixed_and_invalid_leaves() {
        let levels = flatten_levels(&map(json!({
            "uvicorn": {"error": "info", "access": 10},
            "httpx": "warn",
            "bad": [1, 2],
        })));

        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get("uvicorn.error"), Some("INFO"));
        assert_eq!(levels.get("httpx"), Some("WARNING"));
        assert_eq!(levels.get("uvicorn.access"), None);
    }

    #[test]
    fn test_inline_json() {
        let levels = parse_levels_str(r#"{"a":"INFO","b":"warn"}"#).unwrap();
        assert_eq!(
            levels,
            LevelOverrideMap::new().with("a", "INFO").with("b", "WARNING")
        );
    }

    #[test]
    fn test_inline_yaml_flat_and_nested() {
        let flat = parse_levels_str("uvicorn.error: INFO\nhttpx: WARN").unwrap();
        let nested = parse_levels_str("uvicorn:\n  error: INFO\nhttpx: WARN").unwrap();
        assert_eq!(flat, nested);
        assert_eq!(flat.get("httpx"), Some("WARNING"));
    }

    #[test]
    fn test_inline_wrong_shape() {
        assert!(matches!(
            parse_levels_str("INFO"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(parse_levels_str("[1, 2]").is_err());
        assert!(parse_levels_str("{unbalanced: [").is_err());
    }

    #[test]
    fn test_file_by_extension() {
        let dir = tempdir().unwrap();

        let json_path = dir.path().join("levels.json");
        std::fs::write(&json_path, r#"{"sqlx": {"query": "warn"}}"#).unwrap();
        assert_eq!(
            parse_levels_file(&json_path).unwrap().get("sqlx.query"),
            Some("WARNING")
        );

        let yaml_path = dir.path().join("levels.YML");
        std::fs::write(&yaml_path, "sqlx:\n  query: debug\n").unwrap();
        assert_eq!(
            parse_levels_file(&yaml_path).unwrap().get("sqlx.query"),
            Some("DEBUG")
        );

        let toml_path = dir.path().join("levels.toml");
        std::fs::write(&toml_path, "sqlx = 'debug'").unwrap();
        assert!(parse_levels_file(&toml_path).is_err());

        assert!(parse_levels_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_file_wins_over_inline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("levels.yaml");
        std::fs::write(&path, "from_file: ERROR").unwrap();

        let levels = resolver(vec![
            (LEVELS_FILE_ENV, path.display().to_string()),
            (LEVELS_ENV, r#"{"from_inline": "DEBUG"}"#.to_string()),
        ])
        .resolve(None);

        assert_eq!(levels, LevelOverrideMap::new().with("from_file", "ERROR"));
    }

    #[test]
    fn test_broken_file_falls_through_to_inline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("levels.json");
        std::fs::write(&path, "{ not valid json").unwrap();

        let levels = resolver(vec![
            (LEVELS_FILE_ENV, path.display().to_string()),
            (LEVELS_ENV, "from_inline: warn".to_string()),
        ])
        .resolve(None);

        assert_eq!(levels, LevelOverrideMap::new().with("from_inline", "WARNING"));
    }

    #[test]
    fn test_nothing_set_yields_empty() {
        assert!(resolver(vec![]).from_sources().is_none());
        assert!(resolver(vec![]).resolve(None).is_empty());
        assert!(resolver(vec![(LEVELS_ENV, "  ".to_string())])
            .from_sources()
            .is_none());
    }

    #[test]
    fn test_explicit_map_wins_when_non_empty() {
        let r = resolver(vec![(LEVELS_ENV, r#"{"env": "DEBUG"}"#.to_string())]);

        let explicit = LevelOverrideMap::new().with("explicit", "warn");
        assert_eq!(r.resolve(Some(&explicit)), explicit);

        // an empty explicit map does not suppress the environment
        let levels = r.resolve(Some(&LevelOverrideMap::new()));
        assert_eq!(levels.get("env"), Some("DEBUG"));
    }

    #[test]
    fn test_parsed_rejects_unknown_levels() {
        let ok = LevelOverrideMap::new().with("a", "info").with("b", "WARN");
        assert_eq!(
            ok.parsed().unwrap(),
            vec![
                ("a".to_string(), LogLevel::Info),
                ("b".to_string(), LogLevel::Warning)
            ]
        );

        let bad = LevelOverrideMap::new().with("a", "info").with("b", "LOUD");
        match bad.parsed() {
            Err(LoggerError::InvalidLevel { logger, level }) => {
                assert_eq!(logger, "b");
                assert_eq!(level, "LOUD");
            }
            other => panic!("expected InvalidLevel, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_normalizes() {
        let levels: LevelOverrideMap = serde_json::from_str(r#"{"x": "warn"}"#).unwrap();
        assert_eq!(levels.get("x"), Some("WARNING"));
    }
}
