/// Error types that can occur during stack construction and forward passes
///
/// # Variants
///
/// - `ConfigurationError` - indicates the stack was constructed with unusable dimensions (zero hidden size, input size or layer count)
/// - `InputValidationError` - indicates the input data provided does not meet the expected format, type, or validation rules
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    ConfigurationError(String),
    InputValidationError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}
