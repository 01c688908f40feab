use crate::error::ModelError;
use crate::validation::validate_cell_dimensions;
use ndarray::{Array1, Array2, ArrayView2};

/// Min input clipping value to prevent overflow in exp function
const INPUT_CLIP_MIN: f32 = -500.0;

/// Max input clipping value to prevent overflow in exp function
const INPUT_CLIP_MAX: f32 = 500.0;

/// Threshold for using parallel computation (number of elements)
const ACTIVATION_PARALLEL_THRESHOLD: usize = 1000;

/// Parameters of a single LSTM gate.
///
/// Stores the recurrent weights, input weights and bias used by one gate of a cell.
/// Both weight matrices are laid out with one row per hidden unit, so projections
/// right-multiply by the transposed matrix.
///
/// # Fields
///
/// - `recurrent_weight` - Weight matrix for recurrent connections with shape (hidden_size, hidden_size)
/// - `input_weight` - Weight matrix for input connections with shape (hidden_size, input_size)
/// - `bias` - Bias vector with shape (hidden_size)
pub struct Gate {
    pub recurrent_weight: Array2<f32>,
    pub input_weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Gate {
    /// Creates a gate with zero-filled parameters.
    ///
    /// Weights and bias start at zero; an external trainer replaces them
    /// through the owning cell's weight interface.
    ///
    /// # Parameters
    ///
    /// - `hidden_size` - Number of hidden units in this gate
    /// - `input_size` - Dimensionality of the input features
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new gate instance with zeroed parameters
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If `hidden_size` or `input_size` is 0
    pub fn new(hidden_size: usize, input_size: usize) -> Result<Self, ModelError> {
        validate_cell_dimensions(hidden_size, input_size)?;

        Ok(Self {
            recurrent_weight: Array2::zeros((hidden_size, hidden_size)),
            input_weight: Array2::zeros((hidden_size, input_size)),
            bias: Array1::zeros(hidden_size),
        })
    }
}

/// Computes gate pre-activation: h_prev @ recurrent_weight^T + x_t @ input_weight^T + bias
///
/// This is the computation shared by all four gates of a cell.
///
/// # Parameters
///
/// - `gate` - Gate parameters used for the computation
/// - `h_prev` - Previous hidden state with shape (batch, hidden_size)
/// - `x_t` - Input at the current timestep with shape (batch, input_size)
///
/// # Returns
///
/// - `Array2<f32>` - Pre-activation gate values with shape (batch, hidden_size)
///
/// # Panics
///
/// - If matrix dimensions are incompatible for multiplication
#[inline]
pub fn compute_gate_value(
    gate: &Gate,
    h_prev: &ArrayView2<f32>,
    x_t: &ArrayView2<f32>,
) -> Array2<f32> {
    h_prev.dot(&gate.recurrent_weight.t()) + x_t.dot(&gate.input_weight.t()) + &gate.bias
}

/// Applies stable sigmoid activation to an array
///
/// Uses clipping to prevent numerical overflow before computing sigmoid,
/// switching to parallel iteration for large arrays.
#[inline]
pub(crate) fn apply_sigmoid(mut arr: Array2<f32>) -> Array2<f32> {
    let sigmoid_fn = |x: f32| {
        let clipped_x = x.clamp(INPUT_CLIP_MIN, INPUT_CLIP_MAX);
        1.0 / (1.0 + (-clipped_x).exp())
    };

    if arr.len() >= ACTIVATION_PARALLEL_THRESHOLD {
        arr.par_mapv_inplace(sigmoid_fn);
    } else {
        arr.mapv_inplace(sigmoid_fn);
    }
    arr
}

/// Applies stable tanh activation to an array
///
/// Same clipping and parallelization strategy as `apply_sigmoid`.
#[inline]
pub(crate) fn apply_tanh(mut arr: Array2<f32>) -> Array2<f32> {
    let tanh_fn = |x: f32| {
        let clipped_x = x.clamp(INPUT_CLIP_MIN, INPUT_CLIP_MAX);
        clipped_x.tanh()
    };

    if arr.len() >= ACTIVATION_PARALLEL_THRESHOLD {
        arr.par_mapv_inplace(tanh_fn);
    } else {
        arr.mapv_inplace(tanh_fn);
    }
    arr
}
