//! Error types for Roundtable
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Retryable/fatal classification for hosts driving discussions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,
    Serialization = 204,

    // Catalog / trigger data errors (3xx)
    CatalogParse = 300,
    CatalogValidation = 301,
    TriggerTable = 302,
    UnknownRole = 303,

    // Content generation errors (4xx)
    GenerationFailed = 400,
    GenerationTimeout = 401,
    EmptyContent = 402,

    // Discussion bookkeeping errors (5xx)
    DiscussionNotFound = 500,
    UnknownPersona = 501,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Catalog errors
            400..=499 => 40, // Generation errors
            500..=599 => 50, // Discussion errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Catalog / Trigger Data Errors
    // ─────────────────────────────────────────────────────────────

    /// Persona catalog could not be parsed
    #[error("Failed to parse persona catalog: {message}")]
    CatalogParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Persona catalog parsed but is inconsistent
    #[error("Persona catalog invalid: {message}")]
    CatalogValidation {
        message: String,
        persona_id: Option<String>,
    },

    /// Trigger table could not be parsed or is inconsistent
    #[error("Trigger table invalid: {message}")]
    TriggerTable { message: String },

    /// Role string that maps to no known role
    #[error("Unknown persona role '{role}'")]
    UnknownRole { role: String },

    // ─────────────────────────────────────────────────────────────
    // Content Generation Errors
    // ─────────────────────────────────────────────────────────────

    /// External content generator returned an error
    #[error("Content generation failed for {persona_id}: {source}")]
    GenerationFailed {
        persona_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// External content generator did not answer in time
    #[error("Content generation for {persona_id} timed out after {timeout_secs}s")]
    GenerationTimeout { persona_id: String, timeout_secs: u64 },

    /// External content generator returned nothing usable
    #[error("Content generator returned empty text for {persona_id}")]
    EmptyContent { persona_id: String },

    // ─────────────────────────────────────────────────────────────
    // Discussion Errors
    // ─────────────────────────────────────────────────────────────

    /// No discussion registered under this id
    #[error("Discussion not found: {id}")]
    DiscussionNotFound { id: String },

    /// Persona id referenced that is not in the catalog
    #[error("Persona not found in catalog: {persona_id}")]
    UnknownPersona { persona_id: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::Serialization,
            Error::Json(_) => ErrorCode::Serialization,

            Error::CatalogParse { .. } => ErrorCode::CatalogParse,
            Error::CatalogValidation { .. } => ErrorCode::CatalogValidation,
            Error::TriggerTable { .. } => ErrorCode::TriggerTable,
            Error::UnknownRole { .. } => ErrorCode::UnknownRole,

            Error::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            Error::GenerationTimeout { .. } => ErrorCode::GenerationTimeout,
            Error::EmptyContent { .. } => ErrorCode::EmptyContent,

            Error::DiscussionNotFound { .. } => ErrorCode::DiscussionNotFound,
            Error::UnknownPersona { .. } => ErrorCode::UnknownPersona,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error is retryable.
    ///
    /// A failed turn leaves the discussion untouched, so any generation
    /// failure can simply be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::GenerationFailed { .. }
                | Error::GenerationTimeout { .. }
                | Error::EmptyContent { .. }
                | Error::Io(_)
                | Error::IoRead { .. }
                | Error::IoWrite { .. }
        )
    }

    /// Check if the error is fatal for the CLI (the process should exit)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::CatalogParse { .. }
                | Error::CatalogValidation { .. }
                | Error::TriggerTable { .. }
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'roundtable config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'roundtable config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values. Probabilities must lie between 0 and 1."
            ),

            Error::CatalogParse { .. } | Error::CatalogValidation { .. } => Some(
                "Run 'roundtable catalog validate --personas <file>' to check the persona catalog."
            ),
            Error::UnknownRole { .. } => Some(
                "Valid roles: facilitator, strategist, engineer, skeptic, researcher, designer, newcomer, generalist."
            ),
            Error::TriggerTable { .. } => Some(
                "Check the trigger table file. Role sections must be named after known roles."
            ),

            Error::GenerationFailed { .. } => Some(
                "The discussion state was left untouched. Retry the turn once the generator is healthy."
            ),
            Error::GenerationTimeout { .. } => Some(
                "Increase 'generation.timeout_secs' in config or check the content generator latency."
            ),

            Error::DiscussionNotFound { .. } => Some(
                "Create the discussion before running turns against it."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a catalog validation error
    pub fn catalog_invalid(message: impl Into<String>) -> Self {
        Error::CatalogValidation {
            message: message.into(),
            persona_id: None,
        }
    }

    /// Create a catalog validation error tied to one persona
    pub fn persona_invalid(persona_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CatalogValidation {
            message: message.into(),
            persona_id: Some(persona_id.into()),
        }
    }

    /// Create a trigger table error
    pub fn trigger_table(message: impl Into<String>) -> Self {
        Error::TriggerTable {
            message: message.into(),
        }
    }

    /// Wrap a content generator failure
    pub fn generation_failed(persona_id: impl Into<String>, source: anyhow::Error) -> Self {
        Error::GenerationFailed {
            persona_id: persona_id.into(),
            source,
        }
    }

    /// Create a discussion not found error
    pub fn discussion_not_found(id: impl fmt::Display) -> Self {
        Error::DiscussionNotFound { id: id.to_string() }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
