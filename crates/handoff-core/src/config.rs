use crate::error::{HandoffError, Result};
use crate::paths;
use crate::types::{ConfigScope, ContinuationMethod, HandoffMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const KEY_METHOD: &str = "continuationMethod";
pub const KEY_MODE: &str = "handoffMode";
pub const KEY_CLIPBOARD_COMMAND: &str = "clipboardCommand";
pub const KEY_SESSION_COMMAND: &str = "sessionCommand";

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub path: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Settings from one or more config files. Every key is optional so that a
/// file with one bad value still contributes the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_method: Option<ContinuationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_mode: Option<HandoffMode>,
    /// argv used instead of clipboard tool detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_command: Option<Vec<String>>,
    /// argv that starts a fresh assistant session; the resume prompt is
    /// appended as the final argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_command: Option<Vec<String>>,
}

impl Preferences {
    pub fn method(&self) -> ContinuationMethod {
        self.continuation_method.unwrap_or_default()
    }

    pub fn mode(&self) -> HandoffMode {
        self.handoff_mode.unwrap_or_default()
    }

    /// Keys set in `self` win over keys set in `lower`.
    pub fn over(self, lower: Preferences) -> Preferences {
        Preferences {
            continuation_method: self.continuation_method.or(lower.continuation_method),
            handoff_mode: self.handoff_mode.or(lower.handoff_mode),
            clipboard_command: self.clipboard_command.or(lower.clipboard_command),
            session_command: self.session_command.or(lower.session_command),
        }
    }

    /// Decode key by key, collecting a warning for each value that does not
    /// parse instead of rejecting the whole file.
    pub fn from_object(obj: &Map<String, Value>, origin: &Path) -> (Self, Vec<ConfigWarning>) {
        let mut prefs = Preferences::default();
        let mut warnings = Vec::new();
        let mut warn = |key: &str, value: &Value| {
            warnings.push(ConfigWarning {
                path: origin.display().to_string(),
                message: format!("ignoring invalid value for '{key}': {value}"),
            });
        };

        if let Some(v) = obj.get(KEY_METHOD) {
            match v.as_str().map(str::parse::<ContinuationMethod>) {
                Some(Ok(m)) => prefs.continuation_method = Some(m),
                _ => warn(KEY_METHOD, v),
            }
        }
        if let Some(v) = obj.get(KEY_MODE) {
            match v.as_str().map(str::parse::<HandoffMode>) {
                Some(Ok(m)) => prefs.handoff_mode = Some(m),
                _ => warn(KEY_MODE, v),
            }
        }
        for (key, slot) in [
            (KEY_CLIPBOARD_COMMAND, &mut prefs.clipboard_command),
            (KEY_SESSION_COMMAND, &mut prefs.session_command),
        ] {
            if let Some(v) = obj.get(key) {
                match serde_json::from_value::<Vec<String>>(v.clone()) {
                    Ok(argv) if !argv.is_empty() => *slot = Some(argv),
                    _ => warn(key, v),
                }
            }
        }

        (prefs, warnings)
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore
// ---------------------------------------------------------------------------

/// Merged view of the project and global config files.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub preferences: Preferences,
    pub warnings: Vec<ConfigWarning>,
}

/// The two-file settings store: project config over global config.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    project: PathBuf,
    global: Option<PathBuf>,
}

impl PreferenceStore {
    /// Store for `root`. The global file is unavailable when no home
    /// directory can be determined.
    pub fn new(root: &Path) -> Self {
        Self {
            project: paths::project_config_path(root),
            global: paths::global_config_path().ok(),
        }
    }

    pub fn with_paths(project: PathBuf, global: Option<PathBuf>) -> Self {
        Self { project, global }
    }

    pub fn path(&self, scope: ConfigScope) -> Option<&Path> {
        match scope {
            ConfigScope::Project => Some(&self.project),
            ConfigScope::Global => self.global.as_deref(),
        }
    }

    /// Raw JSON object of one scope. `Ok(None)` when the file does not exist.
    fn read_object(&self, scope: ConfigScope) -> Result<Option<Map<String, Value>>> {
        let Some(path) = self.path(scope) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(obj) => Ok(Some(obj)),
            other => Err(HandoffError::InvalidConfig {
                path: path.display().to_string(),
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Preferences stored in a single scope.
    pub fn read_scope(&self, scope: ConfigScope) -> Result<Option<Loaded>> {
        let Some(obj) = self.read_object(scope)? else {
            return Ok(None);
        };
        let origin = self.path(scope).unwrap_or(Path::new(""));
        let (preferences, warnings) = Preferences::from_object(&obj, origin);
        Ok(Some(Loaded {
            preferences,
            warnings,
        }))
    }

    /// Merge both scopes. Fails if an existing file cannot be read or is not
    /// a JSON object; individual bad values only produce warnings.
    pub fn load(&self) -> Result<Loaded> {
        let mut preferences = Preferences::default();
        let mut warnings = Vec::new();
        for scope in [ConfigScope::Global, ConfigScope::Project] {
            if let Some(loaded) = self.read_scope(scope)? {
                preferences = loaded.preferences.over(preferences);
                warnings.extend(loaded.warnings);
            }
        }
        for w in &warnings {
            tracing::warn!(path = %w.path, "{}", w.message);
        }
        Ok(Loaded {
            preferences,
            warnings,
        })
    }

    /// Scope that receives implicit writes: an existing project file, else
    /// the global file, else a new project file.
    pub fn default_write_scope(&self) -> ConfigScope {
        if self.project.exists() {
            ConfigScope::Project
        } else if self.global.is_some() {
            ConfigScope::Global
        } else {
            ConfigScope::Project
        }
    }

    /// Set `key` to `value` in `scope`, leaving every other key untouched.
    pub fn set(&self, scope: ConfigScope, key: &str, value: Value) -> Result<PathBuf> {
        let path = self
            .path(scope)
            .ok_or(HandoffError::HomeNotFound)?
            .to_path_buf();
        let mut obj = self.read_object(scope)?.unwrap_or_default();
        obj.insert(key.to_string(), value);
        let data = serde_json::to_string_pretty(&Value::Object(obj))?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::debug!(path = %path.display(), key, "preference written");
        Ok(path)
    }

    pub fn set_method(&self, scope: ConfigScope, method: ContinuationMethod) -> Result<PathBuf> {
        self.set(scope, KEY_METHOD, Value::String(method.as_str().to_string()))
    }

    pub fn set_mode(&self, scope: ConfigScope, mode: HandoffMode) -> Result<PathBuf> {
        self.set(scope, KEY_MODE, Value::String(mode.as_str().to_string()))
    }

    /// Delete the scope's file. Returns whether a file was removed.
    pub fn reset(&self, scope: ConfigScope) -> Result<bool> {
        match self.path(scope) {
            Some(path) if path.exists() => {
                std::fs::remove_file(path)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
