use thiserror::Error;

use crate::domain::ComponentKind;

/// Error type for the binary and I/O layers.
///
/// Carries the process exit code alongside the message:
/// - `2`: invalid input (pack table, spectrum, CLI arguments)
/// - `3`: insufficient data (empty spectrum, empty model)
/// - `4`: numerical failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised while parsing a science pack or building a model from it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Row at line {line} ('{name}'): unrecognized component form '{form}'")]
    UnrecognizedComponentKind { line: usize, name: String, form: String },
    #[error("Row at line {line} ('{name}', {kind}): invalid `{field}`: {reason}")]
    MalformedParameterRow {
        line: usize,
        name: String,
        kind: ComponentKind,
        field: String,
        reason: String,
    },
    #[error("No sub-models were constructed and at least one is required")]
    EmptyModel,
    #[error("Invalid observations: {0}")]
    InvalidObservations(String),
    #[error("Missing required column: `{0}`")]
    MissingColumn(String),
    #[error("Parameter vector has {got} values, model has {expected} free parameters")]
    ParameterVectorLength { expected: usize, got: usize },
    #[error("Free parameter {index} ('{component}' {parameter}) is not finite")]
    NonFiniteParameter {
        index: usize,
        component: String,
        parameter: String,
    },
    #[error("Amplitude solve failed: {0}")]
    AmplitudeSolveFailed(String),
}

impl ModelError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::UnrecognizedComponentKind { .. }
            | ModelError::MalformedParameterRow { .. }
            | ModelError::MissingColumn(_)
            | ModelError::ParameterVectorLength { .. }
            | ModelError::NonFiniteParameter { .. } => 2,
            ModelError::EmptyModel | ModelError::InvalidObservations(_) => 3,
            ModelError::AmplitudeSolveFailed(_) => 4,
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
