//! Configuration system for Roundtable
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (ROUNDTABLE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values
//!
//! The numeric weights are tunable defaults, not reverse-engineered constants.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundtableConfig {
    /// Context building and randomness
    pub engine: EngineSettings,

    /// Contribution scoring weights
    pub scoring: ScoringSettings,

    /// Next-speaker selection
    pub selection: SelectionSettings,

    /// Discourse-act probabilities
    pub classifier: ClassifierSettings,

    /// Response decoration probabilities
    pub enhancer: EnhancerSettings,

    /// Conversation state bookkeeping
    pub state: StateSettings,

    /// External content generation
    pub generation: GenerationSettings,

    /// Persona catalog and trigger table locations
    pub catalog: CatalogSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Context building and randomness
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Seed for the per-discussion RNG (None = seeded from entropy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Number of trailing history items the context builder reads
    pub history_window: usize,

    /// Number of trailing messages topics are extracted from
    pub topic_window: usize,

    /// Maximum length of the recent topics list
    pub max_recent_topics: usize,

    /// Overlap ratio below which the newest message counts as a topic shift
    pub topic_shift_overlap: f64,
}

/// Contribution scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Score added per matched expertise keyword
    pub keyword_weight: f64,

    /// Cap on the topical relevance term
    pub max_topical_relevance: f64,

    /// Score added per matched conversation moment
    pub moment_weight: f64,

    /// Cap on the moment match term
    pub max_moment_match: f64,

    /// Bonus for the active speaker continuing a short run
    pub continuity_bonus: f64,

    /// Penalty for personas among the recent contributors
    pub monopoly_penalty: f64,

    /// Continuity runs stop being encouraged at this count
    pub max_continuity: u32,

    /// Upper bound of the uniform jitter
    pub max_jitter: f64,
}

/// Next-speaker selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Scores at or below this value are not eligible to speak
    pub eligibility_threshold: f64,

    /// Number of top candidates the speaker is drawn from
    pub top_k: usize,
}

/// Discourse-act probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub agreement_probability: f64,
    pub concern_probability: f64,
    pub clarification_probability: f64,

    /// Empathy above this value enables agreement acts
    pub empathy_threshold: f64,
}

/// Response decoration probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerSettings {
    pub memory_probability: f64,
    pub emotional_probability: f64,

    /// Empathy above this value enables emotional reflections
    pub empathy_threshold: f64,

    /// Memory references need at least this many recent topics
    pub min_topics_for_memory: usize,
}

/// Conversation state bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSettings {
    /// Energy of a fresh discussion (0-1)
    pub initial_energy: f64,

    /// Energy nudge per turn
    pub energy_step: f64,

    /// Length of the recent contributors window
    pub recent_contributors: usize,
}

/// External content generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Timeout for a single generation call in seconds
    pub timeout_secs: u64,
}

/// Persona catalog and trigger table locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Persona catalog file (bundled catalog if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personas_file: Option<String>,

    /// Trigger table file (bundled table if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggers_file: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: None,
            history_window: 10,
            topic_window: 5,
            max_recent_topics: 5,
            topic_shift_overlap: 0.2,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            keyword_weight: 1.0,
            max_topical_relevance: 2.0,
            moment_weight: 0.5,
            max_moment_match: 1.5,
            continuity_bonus: 0.8,
            monopoly_penalty: 0.6,
            max_continuity: 3,
            max_jitter: 0.3,
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            eligibility_threshold: 1.0,
            top_k: 3,
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            agreement_probability: 0.3,
            concern_probability: 0.4,
            clarification_probability: 0.6,
            empathy_threshold: 0.7,
        }
    }
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            memory_probability: 0.4,
            emotional_probability: 0.5,
            empathy_threshold: 0.7,
            min_topics_for_memory: 3,
        }
    }
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            initial_energy: 0.5,
            energy_step: 0.05,
            recent_contributors: 5,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl RoundtableConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::config_not_found(path));
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("roundtable.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("roundtable").join("config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".roundtable").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    pub(crate) fn apply_env_overrides(&mut self) {
        // Engine settings
        if let Ok(val) = std::env::var("ROUNDTABLE_SEED") {
            if let Ok(n) = val.parse() {
                self.engine.seed = Some(n);
            }
        }
        if let Ok(val) = std::env::var("ROUNDTABLE_HISTORY_WINDOW") {
            if let Ok(n) = val.parse() {
                self.engine.history_window = n;
            }
        }

        // Selection settings
        if let Ok(val) = std::env::var("ROUNDTABLE_ELIGIBILITY_THRESHOLD") {
            if let Ok(n) = val.parse() {
                self.selection.eligibility_threshold = n;
            }
        }
        if let Ok(val) = std::env::var("ROUNDTABLE_TOP_K") {
            if let Ok(n) = val.parse() {
                self.selection.top_k = n;
            }
        }

        // Generation settings
        if let Ok(val) = std::env::var("ROUNDTABLE_GENERATION_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.generation.timeout_secs = n;
            }
        }

        // Catalog settings
        if let Ok(val) = std::env::var("ROUNDTABLE_PERSONAS_FILE") {
            self.catalog.personas_file = Some(val);
        }
        if let Ok(val) = std::env::var("ROUNDTABLE_TRIGGERS_FILE") {
            self.catalog.triggers_file = Some(val);
        }

        // Logging settings
        if let Ok(val) = std::env::var("ROUNDTABLE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("ROUNDTABLE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("ROUNDTABLE_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    pub(crate) fn expand_paths(&mut self) {
        if let Some(ref file) = self.catalog.personas_file {
            self.catalog.personas_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.catalog.triggers_file {
            self.catalog.triggers_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("classifier.agreement_probability", self.classifier.agreement_probability),
            ("classifier.concern_probability", self.classifier.concern_probability),
            ("classifier.clarification_probability", self.classifier.clarification_probability),
            ("classifier.empathy_threshold", self.classifier.empathy_threshold),
            ("enhancer.memory_probability", self.enhancer.memory_probability),
            ("enhancer.emotional_probability", self.enhancer.emotional_probability),
            ("enhancer.empathy_threshold", self.enhancer.empathy_threshold),
            ("engine.topic_shift_overlap", self.engine.topic_shift_overlap),
            ("state.initial_energy", self.state.initial_energy),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config_field_invalid(
                    field,
                    format!("{} must be between 0 and 1, got {}", field, value),
                ));
            }
        }

        let weights = [
            ("scoring.keyword_weight", self.scoring.keyword_weight),
            ("scoring.max_topical_relevance", self.scoring.max_topical_relevance),
            ("scoring.moment_weight", self.scoring.moment_weight),
            ("scoring.max_moment_match", self.scoring.max_moment_match),
            ("scoring.continuity_bonus", self.scoring.continuity_bonus),
            ("scoring.monopoly_penalty", self.scoring.monopoly_penalty),
            ("scoring.max_jitter", self.scoring.max_jitter),
            ("selection.eligibility_threshold", self.selection.eligibility_threshold),
        ];
        for (field, value) in weights {
            if !value.is_finite() {
                return Err(Error::config_field_invalid(
                    field,
                    format!("{} must be a finite number", field),
                ));
            }
        }
        if self.scoring.max_jitter < 0.0 {
            return Err(Error::config_field_invalid(
                "scoring.max_jitter",
                "scoring.max_jitter must not be negative",
            ));
        }

        if self.selection.top_k == 0 {
            return Err(Error::config_field_invalid(
                "selection.top_k",
                "selection.top_k must be at least 1",
            ));
        }
        if self.state.recent_contributors == 0 {
            return Err(Error::config_field_invalid(
                "state.recent_contributors",
                "state.recent_contributors must be at least 1",
            ));
        }
        if !(self.state.energy_step > 0.0 && self.state.energy_step <= 1.0) {
            return Err(Error::config_field_invalid(
                "state.energy_step",
                "state.energy_step must be in (0, 1]",
            ));
        }
        if self.engine.history_window == 0 || self.engine.topic_window == 0 {
            return Err(Error::config_field_invalid(
                "engine.history_window",
                "history and topic windows must be at least 1",
            ));
        }
        if self.generation.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "generation.timeout_secs",
                "generation.timeout_secs must be at least 1",
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Persona catalog path, if one is configured
    pub fn personas_path(&self) -> Option<&Path> {
        self.catalog.personas_file.as_deref().map(Path::new)
    }

    /// Trigger table path, if one is configured
    pub fn triggers_path(&self) -> Option<&Path> {
        self.catalog.triggers_file.as_deref().map(Path::new)
    }
}

/// Expand ~ and environment variables in paths
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".roundtable")
                .join("config.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Roundtable Configuration

[engine]
# Seed for reproducible discussions (omit to seed from entropy)
# seed = 42

# Trailing history items read when building the context
history_window = 10

# Trailing messages topics are extracted from
topic_window = 5

# Maximum number of recent topics kept
max_recent_topics = 5

# Overlap ratio below which the newest message counts as a topic shift
topic_shift_overlap = 0.2

[scoring]
keyword_weight = 1.0
max_topical_relevance = 2.0
moment_weight = 0.5
max_moment_match = 1.5
continuity_bonus = 0.8
monopoly_penalty = 0.6
max_continuity = 3
max_jitter = 0.3

[selection]
# Personas scoring at or below this have nothing to add
eligibility_threshold = 1.0

# The next speaker is drawn uniformly from the top-k candidates
top_k = 3

[classifier]
agreement_probability = 0.3
concern_probability = 0.4
clarification_probability = 0.6
empathy_threshold = 0.7

[enhancer]
memory_probability = 0.4
emotional_probability = 0.5
empathy_threshold = 0.7
min_topics_for_memory = 3

[state]
initial_energy = 0.5
energy_step = 0.05
recent_contributors = 5

[generation]
# Timeout for one content generation call in seconds
timeout_secs = 30

[catalog]
# Persona catalog and trigger table (bundled defaults if omitted)
# personas_file = "~/.roundtable/personas.toml"
# triggers_file = "~/.roundtable/triggers.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.roundtable/logs/roundtable.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RoundtableConfig::default();
        assert_eq!(config.selection.eligibility_threshold, 1.0);
        assert_eq!(config.selection.top_k, 3);
        assert_eq!(config.scoring.continuity_bonus, 0.8);
        assert_eq!(config.state.recent_contributors, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_override() {
        env::set_var("ROUNDTABLE_SEED", "7");
        env::set_var("ROUNDTABLE_TOP_K", "2");
        env::set_var("ROUNDTABLE_LOG_LEVEL", "debug");

        let mut config = RoundtableConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.selection.top_k, 2);
        assert_eq!(config.logging.level, "debug");

        env::remove_var("ROUNDTABLE_SEED");
        env::remove_var("ROUNDTABLE_TOP_K");
        env::remove_var("ROUNDTABLE_LOG_LEVEL");
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(RoundtableConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_probability_range() {
        let mut config = RoundtableConfig::default();
        config.classifier.concern_probability = 1.2;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { field: Some(ref f), .. } if f == "classifier.concern_probability"));
    }

    #[test]
    fn test_validation_top_k_zero() {
        let mut config = RoundtableConfig::default();
        config.selection.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_non_finite_weight() {
        let mut config = RoundtableConfig::default();
        config.scoring.continuity_bonus = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = RoundtableConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = RoundtableConfig::default();
        config.catalog.personas_file = Some("~/personas.toml".to_string());
        config.expand_paths();

        assert!(!config.catalog.personas_file.unwrap().contains('~'));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = RoundtableConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: RoundtableConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.selection.top_k, parsed.selection.top_k);
        assert_eq!(config.enhancer.memory_probability, parsed.enhancer.memory_probability);
    }

    #[test]
    fn test_generated_default_parses_and_validates() {
        let parsed: RoundtableConfig = toml::from_str(&generate_default_config()).unwrap();
        assert!(parsed.validate().is_ok());
        assert!(parsed.engine.seed.is_none());
    }

    #[test]
    fn test_parse_partial_config_file() {
        let config: RoundtableConfig = toml::from_str(
            r#"
[engine]
seed = 99

[selection]
eligibility_threshold = 1.25

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.engine.seed, Some(99));
        assert_eq!(config.engine.history_window, 10);
        assert_eq!(config.selection.eligibility_threshold, 1.25);
        assert_eq!(config.selection.top_k, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        let written = init_config(Some(path_str), false).unwrap();
        assert!(written.exists());
        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = RoundtableConfig::load(Some("/nonexistent/roundtable.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }
}
