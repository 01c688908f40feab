use crate::error::ModelError;
use crate::gate::{Gate, apply_sigmoid, apply_tanh, compute_gate_value};
use crate::layer_weight::{CellWeight, GateWeight};
use ndarray::{Array1, Array2, ArrayView2};

/// Threshold for using parallel computation in a cell forward step.
/// When batch_size * hidden_size < this value, sequential execution is used.
/// When batch_size * hidden_size >= this value, parallel execution is used.
///
/// Value is chosen based on empirical benchmarks where rayon's thread pool
/// overhead is amortized by computational gains from parallelization.
const CELL_PARALLEL_THRESHOLD: usize = 1024;

/// A single LSTM gating unit
///
/// The cell transforms one time step of a sequence: given the previous cell
/// state, the previous hidden state and the current input, it produces the new
/// cell state and new hidden state for one layer in one traversal direction.
///
/// The cell uses four gates to control information flow:
/// - Forget Gate: Scales the previous cell state
/// - Weighter Gate: Scales the proposed candidate values
/// - Candidate Gate: Proposes new candidate values for the cell state
/// - Memory Gate: Controls what part of the new cell state is emitted
///
/// The cell maintains no state of its own; both states are owned by the caller
/// and threaded through successive `forward` calls.
///
/// # Mathematical Operations
///
/// For each timestep t:
/// 1. f_t = σ(h_{t-1} · W_fh^T + x_t · W_fx^T + b_f)  (Forget gate)
/// 2. w_t = σ(h_{t-1} · W_wh^T + x_t · W_wx^T + b_w)  (Weighter gate)
/// 3. g_t = tanh(h_{t-1} · W_gh^T + x_t · W_gx^T + b_g)  (Candidate gate)
/// 4. m_t = σ(h_{t-1} · W_mh^T + x_t · W_mx^T + b_m)  (Memory gate)
/// 5. C_t = C_{t-1} ⊙ f_t + w_t ⊙ g_t  (Cell state update)
/// 6. h_t = tanh(C_t) ⊙ m_t  (Hidden state update)
///
/// Where σ is the sigmoid function, ⊙ is element-wise multiplication, and W, b
/// are parameters supplied by the caller.
///
/// # Fields
///
/// - `hidden_size` - Number of hidden units (determines state dimensionality)
/// - `input_size` - Dimensionality of input features consumed by this cell
/// - `forget_gate` - Gate scaling the previous cell state
/// - `weighter_gate` - Gate scaling the candidate values
/// - `candidate_gate` - Gate proposing new cell state values
/// - `memory_gate` - Gate controlling the emitted hidden state
///
/// # Example
/// ```rust
/// use lstm_stack::LstmCell;
/// use ndarray::Array2;
///
/// // One cell with 3 hidden units consuming 4 input features
/// let cell = LstmCell::new(3, 4).unwrap();
///
/// let cell_state = Array2::<f32>::zeros((2, 3));
/// let hidden_state = Array2::<f32>::zeros((2, 3));
/// let input = Array2::<f32>::zeros((2, 4));
///
/// let (new_cell_state, new_hidden_state) =
///     cell.forward(cell_state.view(), hidden_state.view(), input.view());
/// assert_eq!(new_cell_state.shape(), &[2, 3]);
/// assert_eq!(new_hidden_state.shape(), &[2, 3]);
/// ```
pub struct LstmCell {
    hidden_size: usize,
    input_size: usize,

    // Four gates: forget, weighter, candidate, memory
    forget_gate: Gate,
    weighter_gate: Gate,
    candidate_gate: Gate,
    memory_gate: Gate,
}

impl LstmCell {
    /// Creates a new cell with zero-filled parameters
    ///
    /// # Parameters
    ///
    /// - `hidden_size` - Number of hidden units (determines output dimensionality)
    /// - `input_size` - Dimensionality of input features (number of features per timestep)
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - A new `LstmCell` instance with:
    ///     - Four gates (forget, weighter, candidate, memory) initialized with zeroed weights
    ///     - No internal state (states are owned by the caller)
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If `hidden_size` or `input_size` is 0
    pub fn new(hidden_size: usize, input_size: usize) -> Result<Self, ModelError> {
        Ok(Self {
            hidden_size,
            input_size,
            forget_gate: Gate::new(hidden_size, input_size)?,
            weighter_gate: Gate::new(hidden_size, input_size)?,
            candidate_gate: Gate::new(hidden_size, input_size)?,
            memory_gate: Gate::new(hidden_size, input_size)?,
        })
    }

    /// Returns the number of hidden units
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Returns the input feature width this cell consumes
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the total number of parameters held by the four gates
    pub fn param_count(&self) -> usize {
        4 * (self.hidden_size * self.hidden_size
            + self.hidden_size * self.input_size
            + self.hidden_size)
    }

    /// Advances the recurrence by one time step
    ///
    /// Evaluates the four gates on the previous hidden state and the current
    /// input, then combines them into the new cell state and hidden state.
    /// The computation is pure: parameters are read-only and the caller keeps
    /// ownership of all states.
    ///
    /// # Parameters
    ///
    /// - `prev_cell_state` - Cell state from the previous timestep with shape (batch, hidden_size)
    /// - `prev_hidden_state` - Hidden state from the previous timestep with shape (batch, hidden_size)
    /// - `input` - Input at the current timestep with shape (batch, input_size)
    ///
    /// # Returns
    ///
    /// * `(Array2<f32>, Array2<f32>)` - The new cell state and new hidden state, each with shape (batch, hidden_size)
    ///
    /// # Panics
    ///
    /// - If the state or input shapes are incompatible with the cell's dimensions
    pub fn forward(
        &self,
        prev_cell_state: ArrayView2<f32>,
        prev_hidden_state: ArrayView2<f32>,
        input: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>) {
        // Determine whether to use parallel execution based on computational load
        let use_parallel = prev_cell_state.nrows() * self.hidden_size >= CELL_PARALLEL_THRESHOLD;

        // Compute all 4 gate pre-activations (parallel or sequential)
        let (f_raw, w_raw, g_raw, m_raw) = if use_parallel {
            let ((f_raw, w_raw), (g_raw, m_raw)) = rayon::join(
                || {
                    rayon::join(
                        || compute_gate_value(&self.forget_gate, &prev_hidden_state, &input),
                        || compute_gate_value(&self.weighter_gate, &prev_hidden_state, &input),
                    )
                },
                || {
                    rayon::join(
                        || compute_gate_value(&self.candidate_gate, &prev_hidden_state, &input),
                        || compute_gate_value(&self.memory_gate, &prev_hidden_state, &input),
                    )
                },
            );
            (f_raw, w_raw, g_raw, m_raw)
        } else {
            (
                compute_gate_value(&self.forget_gate, &prev_hidden_state, &input),
                compute_gate_value(&self.weighter_gate, &prev_hidden_state, &input),
                compute_gate_value(&self.candidate_gate, &prev_hidden_state, &input),
                compute_gate_value(&self.memory_gate, &prev_hidden_state, &input),
            )
        };

        // Apply activations to all 4 gates (parallel or sequential)
        let (f_t, w_t, g_t, m_t) = if use_parallel {
            let ((f_t, w_t), (g_t, m_t)) = rayon::join(
                || rayon::join(|| apply_sigmoid(f_raw), || apply_sigmoid(w_raw)),
                || rayon::join(|| apply_tanh(g_raw), || apply_sigmoid(m_raw)),
            );
            (f_t, w_t, g_t, m_t)
        } else {
            (
                apply_sigmoid(f_raw),
                apply_sigmoid(w_raw),
                apply_tanh(g_raw),
                apply_sigmoid(m_raw),
            )
        };

        // Update cell state: c_t = c_prev * f_t + w_t * g_t
        let new_cell_state = &prev_cell_state * &f_t + &w_t * &g_t;

        // Update hidden state: h_t = tanh(c_t) * m_t
        let new_hidden_state = apply_tanh(new_cell_state.clone()) * &m_t;

        (new_cell_state, new_hidden_state)
    }

    /// Sets the weights for all four gates of this cell.
    ///
    /// # Parameters
    ///
    /// Each gate requires three arrays:
    /// - `recurrent_weight` - Weight matrix connecting previous hidden states with shape (hidden_size, hidden_size)
    /// - `input_weight` - Weight matrix connecting inputs with shape (hidden_size, input_size)
    /// - `bias` - Bias vector with shape (hidden_size)
    ///
    /// The parameters are provided for each of the four gates in order:
    /// forget gate, weighter gate, candidate gate, memory gate
    pub fn set_weights(
        &mut self,
        forget_recurrent_weight: Array2<f32>,
        forget_input_weight: Array2<f32>,
        forget_bias: Array1<f32>,
        weighter_recurrent_weight: Array2<f32>,
        weighter_input_weight: Array2<f32>,
        weighter_bias: Array1<f32>,
        candidate_recurrent_weight: Array2<f32>,
        candidate_input_weight: Array2<f32>,
        candidate_bias: Array1<f32>,
        memory_recurrent_weight: Array2<f32>,
        memory_input_weight: Array2<f32>,
        memory_bias: Array1<f32>,
    ) {
        self.forget_gate.recurrent_weight = forget_recurrent_weight;
        self.forget_gate.input_weight = forget_input_weight;
        self.forget_gate.bias = forget_bias;

        self.weighter_gate.recurrent_weight = weighter_recurrent_weight;
        self.weighter_gate.input_weight = weighter_input_weight;
        self.weighter_gate.bias = weighter_bias;

        self.candidate_gate.recurrent_weight = candidate_recurrent_weight;
        self.candidate_gate.input_weight = candidate_input_weight;
        self.candidate_gate.bias = candidate_bias;

        self.memory_gate.recurrent_weight = memory_recurrent_weight;
        self.memory_gate.input_weight = memory_input_weight;
        self.memory_gate.bias = memory_bias;
    }

    /// Returns borrowed views of all four gates' parameters
    pub fn get_weights(&self) -> CellWeight<'_> {
        CellWeight {
            forget: GateWeight {
                recurrent_weight: &self.forget_gate.recurrent_weight,
                input_weight: &self.forget_gate.input_weight,
                bias: &self.forget_gate.bias,
            },
            weighter: GateWeight {
                recurrent_weight: &self.weighter_gate.recurrent_weight,
                input_weight: &self.weighter_gate.input_weight,
                bias: &self.weighter_gate.bias,
            },
            candidate: GateWeight {
                recurrent_weight: &self.candidate_gate.recurrent_weight,
                input_weight: &self.candidate_gate.input_weight,
                bias: &self.candidate_gate.bias,
            },
            memory: GateWeight {
                recurrent_weight: &self.memory_gate.recurrent_weight,
                input_weight: &self.memory_gate.input_weight,
                bias: &self.memory_gate.bias,
            },
        }
    }
}
