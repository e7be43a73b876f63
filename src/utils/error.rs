use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlipError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Conflicting configuration: {message}")]
    ConflictingConfigError { message: String },

    #[error("Invalid {field} option '{value}'. Choose from {choices}")]
    InvalidChoiceError {
        field: String,
        value: String,
        choices: String,
    },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Input file '{path}' not found.")]
    NotFoundError { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    NotFound,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlipError {
    pub fn config(message: impl Into<String>) -> Self {
        FlipError::ConfigError {
            message: message.into(),
        }
    }

    pub fn conflicting(message: impl Into<String>) -> Self {
        FlipError::ConflictingConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FlipError::ConfigError { .. }
            | FlipError::MissingConfigError { .. }
            | FlipError::ConflictingConfigError { .. }
            | FlipError::InvalidChoiceError { .. }
            | FlipError::InvalidConfigValueError { .. }
            | FlipError::TomlError(_) => ErrorCategory::Config,
            FlipError::NotFoundError { .. } => ErrorCategory::NotFound,
            FlipError::IoError(_) | FlipError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Config => ErrorSeverity::Medium,
            ErrorCategory::NotFound => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for this error. Usage errors share argparse's code 2.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FlipError::MissingConfigError { .. } | FlipError::ConfigError { .. } => {
                "Provide either --flip_probability, or --flux, --cross_section and --years together"
            }
            FlipError::ConflictingConfigError { .. } => {
                "Use either an explicit flip probability or the physical model flags, not both"
            }
            FlipError::InvalidChoiceError { .. } => "Pick one of the listed options",
            FlipError::InvalidConfigValueError { .. } => "Check the value against the stated constraint",
            FlipError::TomlError(_) => "Make sure the config file is valid TOML",
            FlipError::NotFoundError { .. } => "Check the input path exists and is readable",
            FlipError::IoError(_) => "Check disk space and permissions for the output directory",
            FlipError::SerializationError(_) => "Check the report path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FlipError::NotFoundError { path } => format!("Input file '{}' not found.", path),
            FlipError::IoError(e) => format!("Could not read or write file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlipError>;
