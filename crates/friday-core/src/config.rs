use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FridayError, Result};

/// Top-level configuration for the Friday assistant.
///
/// Loaded from `~/.friday/config.toml` by default. Built once at process
/// start and handed to each component constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FridayConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub nlu: NluConfig,
    #[serde(default)]
    pub learning: LearningConfig,
}

impl FridayConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FridayConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or is invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would break the conversation invariants.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.context_memory_size == 0 {
            return Err(FridayError::Config(
                "conversation.context_memory_size must be at least 1".to_string(),
            ));
        }
        if self.conversation.max_conversation_turns == 0 {
            return Err(FridayError::Config(
                "conversation.max_conversation_turns must be at least 1".to_string(),
            ));
        }
        if self.conversation.conversation_expiry_secs == 0 {
            return Err(FridayError::Config(
                "conversation.conversation_expiry_secs must be at least 1".to_string(),
            ));
        }
        if self.nlu.max_utterance_chars == 0 {
            return Err(FridayError::Config(
                "nlu.max_utterance_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `FRIDAY_*` environment variable overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "FRIDAY_CONTEXT_MEMORY_SIZE") {
            self.conversation.context_memory_size = v;
        }
        if let Some(v) = parse_override(&lookup, "FRIDAY_CONVERSATION_EXPIRY") {
            self.conversation.conversation_expiry_secs = v;
        }
        if let Some(v) = parse_override(&lookup, "FRIDAY_MAX_CONVERSATION_TURNS") {
            self.conversation.max_conversation_turns = v;
        }
        if let Some(dir) = lookup("FRIDAY_DATA_DIR") {
            self.general.data_dir = dir;
        }
        if let Some(level) = lookup("FRIDAY_LOG_LEVEL") {
            self.general.log_level = level;
        }
    }

    /// Full path of the learning store file.
    pub fn learning_path(&self) -> PathBuf {
        self.general.resolved_data_dir().join(&self.learning.file_name)
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the learning store.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.friday".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneralConfig {
    /// `data_dir` with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        let dir = self.data_dir.as_str();
        if let Some(rest) = dir.strip_prefix("~/").or_else(|| dir.strip_prefix("~\\")) {
            #[cfg(target_os = "windows")]
            let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
            #[cfg(not(target_os = "windows"))]
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(rest)
        } else {
            PathBuf::from(dir)
        }
    }
}

/// Conversation window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Maximum entries retained in the conversation history.
    pub context_memory_size: usize,
    /// Seconds of inactivity before the context resets.
    pub conversation_expiry_secs: u64,
    /// Turn count at which follow-up listening is refused.
    pub max_conversation_turns: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            context_memory_size: 10,
            conversation_expiry_secs: 300,
            max_conversation_turns: 5,
        }
    }
}

/// Utterance analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    /// Utterances longer than this (in characters) are rejected as analysis failures.
    pub max_utterance_chars: usize,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            max_utterance_chars: 2000,
        }
    }
}

/// Learning store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// File name of the learning record inside `general.data_dir`.
    pub file_name: String,
    /// Maximum interaction records kept in the learning store.
    pub interaction_history_limit: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            file_name: "learning.json".to_string(),
            interaction_history_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = FridayConfig::default();
        assert_eq!(config.general.data_dir, "~/.friday");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.conversation.context_memory_size, 10);
        assert_eq!(config.conversation.conversation_expiry_secs, 300);
        assert_eq!(config.conversation.max_conversation_turns, 5);
        assert_eq!(config.nlu.max_utterance_chars, 2000);
        assert_eq!(config.learning.file_name, "learning.json");
        assert_eq!(config.learning.interaction_history_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[conversation]
context_memory_size = 4
conversation_expiry_secs = 60
max_conversation_turns = 3

[learning]
file_name = "brain.json"
interaction_history_limit = 20
"#;
        let file = create_temp_config(content);
        let config = FridayConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.conversation.context_memory_size, 4);
        assert_eq!(config.conversation.conversation_expiry_secs, 60);
        assert_eq!(config.conversation.max_conversation_turns, 3);
        assert_eq!(config.learning.file_name, "brain.json");
        assert_eq!(config.learning.interaction_history_limit, 20);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[conversation]
max_conversation_turns = 8
"#;
        let file = create_temp_config(content);
        let config = FridayConfig::load(file.path()).unwrap();
        assert_eq!(config.conversation.max_conversation_turns, 8);
        assert_eq!(config.conversation.context_memory_size, 10);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = FridayConfig::load(file.path()).unwrap();
        assert_eq!(config, FridayConfig::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[conversation\ncontext_memory_size = ");
        let result = FridayConfig::load(file.path());
        assert!(matches!(result, Err(FridayError::Config(_))));
    }

    #[test]
    fn test_load_rejects_zero_memory_size() {
        let file = create_temp_config("[conversation]\ncontext_memory_size = 0\n");
        let result = FridayConfig::load(file.path());
        assert!(matches!(result, Err(FridayError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = FridayConfig::load_or_default(Path::new("/nonexistent/friday/config.toml"));
        assert_eq!(config, FridayConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = FridayConfig::default();
        config.conversation.context_memory_size = 7;
        config.save(&path).unwrap();

        let reloaded = FridayConfig::load(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    // ---- Validation ----

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = FridayConfig::default();
        config.conversation.max_conversation_turns = 0;
        assert!(config.validate().is_err());

        let mut config = FridayConfig::default();
        config.conversation.conversation_expiry_secs = 0;
        assert!(config.validate().is_err());

        let mut config = FridayConfig::default();
        config.nlu.max_utterance_chars = 0;
        assert!(config.validate().is_err());
    }

    // ---- Environment overrides ----

    #[test]
    fn test_overrides_apply_conversation_options() {
        let mut config = FridayConfig::default();
        config.apply_overrides_from(lookup_from(&[
            ("FRIDAY_CONTEXT_MEMORY_SIZE", "3"),
            ("FRIDAY_CONVERSATION_EXPIRY", "45"),
            ("FRIDAY_MAX_CONVERSATION_TURNS", "2"),
            ("FRIDAY_DATA_DIR", "/var/lib/friday"),
            ("FRIDAY_LOG_LEVEL", "trace"),
        ]));
        assert_eq!(config.conversation.context_memory_size, 3);
        assert_eq!(config.conversation.conversation_expiry_secs, 45);
        assert_eq!(config.conversation.max_conversation_turns, 2);
        assert_eq!(config.general.data_dir, "/var/lib/friday");
        assert_eq!(config.general.log_level, "trace");
    }

    #[test]
    fn test_overrides_ignore_unparseable_values() {
        let mut config = FridayConfig::default();
        config.apply_overrides_from(lookup_from(&[("FRIDAY_CONTEXT_MEMORY_SIZE", "lots")]));
        assert_eq!(config.conversation.context_memory_size, 10);
    }

    #[test]
    fn test_overrides_absent_leave_config_untouched() {
        let mut config = FridayConfig::default();
        config.apply_overrides_from(|_| None);
        assert_eq!(config, FridayConfig::default());
    }

    // ---- Paths ----

    #[test]
    fn test_learning_path_joins_data_dir() {
        let mut config = FridayConfig::default();
        config.general.data_dir = "/tmp/friday-data".to_string();
        assert_eq!(
            config.learning_path(),
            PathBuf::from("/tmp/friday-data/learning.json")
        );
    }

    #[test]
    fn test_resolved_data_dir_expands_home() {
        let general = GeneralConfig::default();
        let resolved = general.resolved_data_dir();
        assert!(resolved.ends_with(".friday"));
        assert!(!resolved.to_string_lossy().starts_with('~'));
    }
}
