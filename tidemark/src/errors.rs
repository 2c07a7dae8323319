use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

use crate::common::{Direction, Timestamp};

/// Error kinds for migration operations
///
/// Each kind names one category of failure so that callers can tell a planning
/// problem (nothing touched the database) from an execution problem (some steps
/// may have committed).
///
/// # Examples
///
/// ```rust,ignore
/// use tidemark::errors::{TidemarkError, ErrorKind, TidemarkResult};
///
/// fn example() -> TidemarkResult<()> {
///     Err(TidemarkError::new("Provider not registered", ErrorKind::ConfigurationError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Planning Errors - raised before any database work happens
    /// Invalid or incomplete configuration (conflicting versioning slots,
    /// unknown provider, duplicate version marker)
    ConfigurationError,
    /// A downgrade path would have to revert a migration that cannot be reverted
    IrreversibleMigration,

    // Execution Errors - raised while a batch is running
    /// A step's apply/revert logic or its compiled statements failed
    StepExecutionError,
    /// Reading or writing the applied-state records failed
    VersioningStoreError,

    // Provider Errors - normalized backend failures
    /// The backend rejected a statement or a connection
    ProviderError,
    /// The provider cannot express the requested command
    UnsupportedOperation,

    // Input Errors - invalid arguments to the command model
    /// Invalid input such as an empty table or column name
    ValidationError,
    /// The operation is not valid in the current state
    InvalidOperation,

    // Generic/Internal Errors - used as fallback
    /// Encoding or decoding of statements failed
    EncodingError,
    /// IO failure from a backend
    IOError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::IrreversibleMigration => write!(f, "Irreversible migration"),
            ErrorKind::StepExecutionError => write!(f, "Step execution error"),
            ErrorKind::VersioningStoreError => write!(f, "Versioning store error"),
            ErrorKind::ProviderError => write!(f, "Provider error"),
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Identity of the step that halted a batch.
///
/// Attached to errors of kind [`ErrorKind::StepExecutionError`], and to
/// [`ErrorKind::VersioningStoreError`] when a committed step could not be
/// recorded, so a caller can report the exact position a partially migrated
/// database was left in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStep {
    pub timestamp: Timestamp,
    pub name: String,
    pub direction: Direction,
}

impl Display for FailedStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' ({})", self.timestamp, self.name, self.direction)
    }
}

/// Custom migration error type.
///
/// `TidemarkError` carries the error message, its kind, an optional cause and
/// the backtrace captured at construction. Step failures also carry the
/// [`FailedStep`] they originated from.
///
/// # Examples
///
/// ```rust,ignore
/// use tidemark::errors::{TidemarkError, ErrorKind};
///
/// let cause = TidemarkError::new("no such table: Customers", ErrorKind::ProviderError);
/// let err = TidemarkError::new_with_cause("Migration failed", ErrorKind::StepExecutionError, cause);
/// ```
#[derive(Clone)]
pub struct TidemarkError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<TidemarkError>>,
    failed_step: Option<FailedStep>,
    backtrace: Arc<Backtrace>,
}

impl TidemarkError {
    /// Creates a new `TidemarkError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        TidemarkError {
            message: message.to_string(),
            error_kind,
            cause: None,
            failed_step: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `TidemarkError` wrapping a cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: TidemarkError) -> Self {
        TidemarkError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            failed_step: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a step execution error for the given step, wrapping the backend cause.
    pub fn step_failed(step: FailedStep, cause: TidemarkError) -> Self {
        let message = format!("Migration {} failed: {}", step, cause.message());
        TidemarkError {
            message,
            error_kind: ErrorKind::StepExecutionError,
            cause: Some(Box::new(cause)),
            failed_step: Some(step),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a versioning store error for a step that committed but whose
    /// outcome could not be recorded.
    pub fn step_not_recorded(step: FailedStep, cause: TidemarkError) -> Self {
        let message = format!(
            "Migration {} committed but could not be recorded: {}",
            step,
            cause.message()
        );
        TidemarkError {
            message,
            error_kind: ErrorKind::VersioningStoreError,
            cause: Some(Box::new(cause)),
            failed_step: Some(step),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&TidemarkError> {
        self.cause.as_deref()
    }

    /// The step that halted the batch, for step execution errors.
    pub fn failed_step(&self) -> Option<&FailedStep> {
        self.failed_step.as_ref()
    }
}

impl Display for TidemarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for TidemarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for TidemarkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for migration operations.
pub type TidemarkResult<T> = Result<T, TidemarkError>;

impl From<std::io::Error> for TidemarkError {
    fn from(err: std::io::Error) -> Self {
        TidemarkError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for TidemarkError {
    fn from(err: serde_json::Error) -> Self {
        TidemarkError::new(
            &format!("Statement encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::fmt::Error> for TidemarkError {
    fn from(err: std::fmt::Error) -> Self {
        TidemarkError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for TidemarkError {
    fn from(msg: String) -> Self {
        TidemarkError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for TidemarkError {
    fn from(msg: &str) -> Self {
        TidemarkError::new(msg, ErrorKind::InternalError)
    }
}
