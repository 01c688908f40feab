use crate::error::ModelError;
use ndarray::ArrayView3;

/// Validates that a construction dimension is greater than 0
///
/// # Parameters
///
/// - `value` - The dimension value to validate
/// - `name` - The name of the dimension for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(crate) fn validate_dimension_greater_than_zero(
    value: usize,
    name: &str,
) -> Result<(), ModelError> {
    if value == 0 {
        return Err(ModelError::ConfigurationError(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Validates cell dimensions before parameter allocation
///
/// # Parameters
///
/// - `hidden_size` - The hidden dimension to validate
/// - `input_size` - The input dimension to validate
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(crate) fn validate_cell_dimensions(
    hidden_size: usize,
    input_size: usize,
) -> Result<(), ModelError> {
    validate_dimension_greater_than_zero(hidden_size, "hidden_size")?;
    validate_dimension_greater_than_zero(input_size, "input_size")?;
    Ok(())
}

/// Validates a batched input sequence before a forward pass
///
/// The sequence must contain at least one time step and its feature width
/// must match the width the stack was constructed for.
///
/// # Parameters
///
/// - `input` - The input view of shape (batch_size, seq_len, features)
/// - `input_size` - The feature width expected by the first layer
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(crate) fn validate_forward_input(
    input: &ArrayView3<f32>,
    input_size: usize,
) -> Result<(), ModelError> {
    let (_, seq_len, features) = input.dim();
    if seq_len == 0 {
        return Err(ModelError::InputValidationError(
            "input sequence must contain at least one time step".to_string(),
        ));
    }
    if features != input_size {
        return Err(ModelError::InputValidationError(format!(
            "input feature width is {} but the stack expects {}",
            features, input_size
        )));
    }
    Ok(())
}
