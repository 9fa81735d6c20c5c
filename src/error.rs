//! Error types for folkseq.
//!
//! Every pipeline stage reports failures through [`PipelineError`], tagged
//! with an [`ErrorCode`] so callers can tell a malformed input file from a
//! vocabulary miss without parsing messages.

use std::fmt;
use std::path::Path;

/// Error codes identifying which stage failed and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A notation file could not be parsed.
    /// Trigger: malformed `**kern` data, unsupported spine manipulation.
    ParseFailed,

    /// A note or rest duration cannot be represented.
    /// Trigger: duration outside the acceptable set, or not a multiple of the time step.
    UnsupportedDuration,

    /// No key annotation and the key could not be estimated.
    /// Trigger: score without pitched notes.
    MissingKeyEstimate,

    /// The encoder met an event it has no token for.
    /// Trigger: chords.
    UnsupportedEvent,

    /// A token has no entry in the vocabulary, or cannot be decoded.
    /// Trigger: corpus and mapping file out of sync.
    UnknownToken,

    /// Configuration value out of range.
    /// Trigger: zero sequence length, non-positive time step.
    InvalidConfig,

    /// Reading or writing a file failed.
    Io,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseFailed => "PARSE_FAILED",
            ErrorCode::UnsupportedDuration => "UNSUPPORTED_DURATION",
            ErrorCode::MissingKeyEstimate => "MISSING_KEY_ESTIMATE",
            ErrorCode::UnsupportedEvent => "UNSUPPORTED_EVENT",
            ErrorCode::UnknownToken => "UNKNOWN_TOKEN",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::Io => "IO",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseFailed => "Notation file could not be parsed",
            ErrorCode::UnsupportedDuration => "Duration cannot be encoded at the current time step",
            ErrorCode::MissingKeyEstimate => "Key could not be determined for transposition",
            ErrorCode::UnsupportedEvent => "Event type has no token representation",
            ErrorCode::UnknownToken => "Token is not part of the vocabulary",
            ErrorCode::InvalidConfig => "Configuration value is out of range",
            ErrorCode::Io => "File system operation failed",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::ParseFailed => {
                "Fix or remove the offending file, or rerun with --skip-invalid \
                 to log and skip unparseable files"
            }
            ErrorCode::UnsupportedDuration => {
                "Choose a time step that divides every acceptable duration \
                 (0.25 covers the default set)"
            }
            ErrorCode::MissingKeyEstimate => {
                "Add a key interpretation (e.g. *G:) to the file, or drop songs \
                 that contain only rests"
            }
            ErrorCode::UnsupportedEvent => {
                "Only monophonic melodies can be encoded; remove chords from the input"
            }
            ErrorCode::UnknownToken => {
                "Rebuild the mapping file from the current corpus \
                 (folkseq mapping) before generating sequences"
            }
            ErrorCode::InvalidConfig => {
                "Use a positive sequence length and a positive, finite time step"
            }
            ErrorCode::Io => "Check that the path exists and is readable/writable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for pipeline operations.
#[derive(Debug)]
pub struct PipelineError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PipelineError {
    /// Creates a new PipelineError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new PipelineError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a PARSE_FAILED error for a line of notation input.
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ParseFailed,
            format!("line {}: {}", line, reason.into()),
        )
    }

    /// Attaches the file a parse error came from.
    pub fn in_file(mut self, path: &Path) -> Self {
        self.message = format!("{}: {}", path.display(), self.message);
        self
    }

    /// Creates an UNSUPPORTED_DURATION error.
    pub fn unsupported_duration(quarter_length: f64, time_step: f64) -> Self {
        Self::new(
            ErrorCode::UnsupportedDuration,
            format!(
                "Duration {} is not a multiple of time step {}",
                quarter_length, time_step
            ),
        )
    }

    /// Creates a MISSING_KEY_ESTIMATE error.
    pub fn missing_key_estimate(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingKeyEstimate,
            format!("Cannot estimate key: {}", reason.into()),
        )
    }

    /// Creates an UNSUPPORTED_EVENT error.
    pub fn unsupported_event(what: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UnsupportedEvent,
            format!("Cannot encode {}", what.into()),
        )
    }

    /// Creates an UNKNOWN_TOKEN error.
    pub fn unknown_token(token: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UnknownToken,
            format!("Unknown token: {:?}", token.into()),
        )
    }

    /// Creates an INVALID_CONFIG error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfig,
            format!("Invalid configuration: {}", reason.into()),
        )
    }

    /// Creates an IO error naming the path and the failed action.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::Io,
            format!("Failed to {} {}: {}", action, path.display(), source),
            source,
        )
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
