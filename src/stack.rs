use crate::cell::LstmCell;
use crate::error::ModelError;
use crate::layer_weight::StackLayerWeight;
use crate::validation::{validate_dimension_greater_than_zero, validate_forward_input};
use ndarray::{Array2, Array3, ArrayView3, Axis, s};

/// Traversal direction of a cell within a layer
///
/// # Variants
///
/// - `Forward` - the cell reads the sequence in ascending time order
/// - `Backward` - the cell reads the sequence in descending time order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Per-layer cell storage for the two stack modes
enum StackLayers {
    Unidirectional(Vec<LstmCell>),
    Bidirectional(Vec<[LstmCell; 2]>),
}

/// A multi-layer LSTM sequence encoder
///
/// The stack orchestrates cells across time steps and layers. Layer 0 consumes
/// the raw input features; each deeper layer consumes the hidden states
/// produced by the layer below. In bidirectional mode every layer holds two
/// independent cells, one per traversal direction, and their hidden sequences
/// are concatenated along the feature axis before feeding the layer above.
///
/// A forward pass starts from zeroed states, carries them through the sequence
/// and returns the hidden representation at the last time position: shape
/// (batch, hidden_size) for unidirectional stacks and (batch, 2 * hidden_size)
/// for bidirectional stacks.
///
/// Parameters start zeroed and belong to the caller: an external trainer
/// mutates them through [`LstmCell::set_weights`] or [`LstmStack::cell_mut`]
/// between passes. `forward` itself never mutates the stack.
///
/// # Fields
///
/// - `hidden_size` - Number of hidden units per cell
/// - `input_size` - Feature width of the raw input sequence
/// - `layers` - Per-layer cells, single or paired by direction
///
/// # Example
/// ```rust
/// use lstm_stack::LstmStack;
/// use ndarray::Array3;
///
/// // Two stacked layers with 8 hidden units consuming 4 features per timestep
/// let stack = LstmStack::new(8, 4, 2, false).unwrap();
///
/// // Batch of 2 sequences with 5 timesteps each
/// let input = Array3::<f32>::zeros((2, 5, 4));
/// let encoded = stack.forward(input.view()).unwrap();
/// assert_eq!(encoded.shape(), &[2, 8]);
/// ```
pub struct LstmStack {
    hidden_size: usize,
    input_size: usize,
    layers: StackLayers,
}

impl LstmStack {
    /// Creates a new stack of zero-initialized cells
    ///
    /// Every layer owns distinct parameter storage; no weights are shared
    /// between layers or directions.
    ///
    /// # Parameters
    ///
    /// - `hidden_size` - Number of hidden units per cell
    /// - `input_size` - Feature width of the input sequence consumed by layer 0
    /// - `num_layers` - Number of stacked layers
    /// - `bidirectional` - Whether every layer runs a forward and a backward cell
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - A new `LstmStack` instance
    ///
    /// # Errors
    ///
    /// - `ModelError::ConfigurationError` - If `hidden_size`, `input_size` or `num_layers` is 0
    pub fn new(
        hidden_size: usize,
        input_size: usize,
        num_layers: usize,
        bidirectional: bool,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(hidden_size, "hidden_size")?;
        validate_dimension_greater_than_zero(input_size, "input_size")?;
        validate_dimension_greater_than_zero(num_layers, "num_layers")?;

        // Layer 0 reads the raw input; deeper layers read the width produced
        // by the layer below (doubled when two directions are concatenated).
        let layers = if bidirectional {
            let mut layers = Vec::with_capacity(num_layers);
            for layer in 0..num_layers {
                let layer_input_size = if layer == 0 {
                    input_size
                } else {
                    2 * hidden_size
                };
                layers.push([
                    LstmCell::new(hidden_size, layer_input_size)?,
                    LstmCell::new(hidden_size, layer_input_size)?,
                ]);
            }
            StackLayers::Bidirectional(layers)
        } else {
            let mut layers = Vec::with_capacity(num_layers);
            for layer in 0..num_layers {
                let layer_input_size = if layer == 0 { input_size } else { hidden_size };
                layers.push(LstmCell::new(hidden_size, layer_input_size)?);
            }
            StackLayers::Unidirectional(layers)
        };

        Ok(Self {
            hidden_size,
            input_size,
            layers,
        })
    }

    /// Returns the number of hidden units per cell
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Returns the feature width expected by layer 0
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the number of stacked layers
    pub fn num_layers(&self) -> usize {
        match &self.layers {
            StackLayers::Unidirectional(cells) => cells.len(),
            StackLayers::Bidirectional(cells) => cells.len(),
        }
    }

    /// Returns whether every layer runs two directional cells
    pub fn bidirectional(&self) -> bool {
        matches!(self.layers, StackLayers::Bidirectional(_))
    }

    /// Returns the feature width of the encoding produced by `forward`
    pub fn output_size(&self) -> usize {
        if self.bidirectional() {
            2 * self.hidden_size
        } else {
            self.hidden_size
        }
    }

    /// Returns the total number of parameters across all cells
    pub fn param_count(&self) -> usize {
        match &self.layers {
            StackLayers::Unidirectional(cells) => {
                cells.iter().map(LstmCell::param_count).sum()
            }
            StackLayers::Bidirectional(cells) => cells
                .iter()
                .map(|[forward, backward]| forward.param_count() + backward.param_count())
                .sum(),
        }
    }

    /// Returns the cell at `layer` running in `direction`, if present
    ///
    /// Unidirectional stacks only hold `Direction::Forward` cells; asking a
    /// unidirectional stack for a backward cell returns `None`, as does an
    /// out-of-range layer index.
    pub fn cell(&self, layer: usize, direction: Direction) -> Option<&LstmCell> {
        match &self.layers {
            StackLayers::Unidirectional(cells) => match direction {
                Direction::Forward => cells.get(layer),
                Direction::Backward => None,
            },
            StackLayers::Bidirectional(cells) => cells.get(layer).map(|pair| match direction {
                Direction::Forward => &pair[0],
                Direction::Backward => &pair[1],
            }),
        }
    }

    /// Returns a mutable reference to the cell at `layer` running in `direction`, if present
    ///
    /// This is the mutation point for external trainers that update
    /// parameters between forward passes.
    pub fn cell_mut(&mut self, layer: usize, direction: Direction) -> Option<&mut LstmCell> {
        match &mut self.layers {
            StackLayers::Unidirectional(cells) => match direction {
                Direction::Forward => cells.get_mut(layer),
                Direction::Backward => None,
            },
            StackLayers::Bidirectional(cells) => {
                cells.get_mut(layer).map(|pair| match direction {
                    Direction::Forward => &mut pair[0],
                    Direction::Backward => &mut pair[1],
                })
            }
        }
    }

    /// Returns borrowed views of every layer's parameters, bottom layer first
    pub fn get_weights(&self) -> Vec<StackLayerWeight<'_>> {
        match &self.layers {
            StackLayers::Unidirectional(cells) => cells
                .iter()
                .map(|cell| StackLayerWeight::Unidirectional(cell.get_weights()))
                .collect(),
            StackLayers::Bidirectional(cells) => cells
                .iter()
                .map(|[forward, backward]| StackLayerWeight::Bidirectional {
                    forward: forward.get_weights(),
                    backward: backward.get_weights(),
                })
                .collect(),
        }
    }

    /// Encodes a batch of sequences into fixed-size hidden representations
    ///
    /// States are zeroed at the start of the pass, carried through the
    /// sequence one time step at a time and discarded afterwards; repeated
    /// calls with the same input and parameters produce identical results.
    ///
    /// # Parameters
    ///
    /// - `input` - Input sequences with shape (batch_size, seq_len, input_size)
    ///
    /// # Returns
    ///
    /// * `Result<Array2<f32>, ModelError>` - The final-position hidden state of
    ///   the top layer, with shape (batch_size, hidden_size) for unidirectional
    ///   stacks and (batch_size, 2 * hidden_size) for bidirectional stacks
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `seq_len` is 0 or the input
    ///   feature width does not match the width the stack was constructed for
    ///
    /// # Example
    /// ```rust
    /// use lstm_stack::LstmStack;
    /// use ndarray::Array3;
    ///
    /// let stack = LstmStack::new(8, 4, 2, true).unwrap();
    /// let input = Array3::<f32>::zeros((2, 5, 4));
    ///
    /// // Bidirectional stacks concatenate both directions' hidden states
    /// let encoded = stack.forward(input.view()).unwrap();
    /// assert_eq!(encoded.shape(), &[2, 16]);
    /// ```
    pub fn forward(&self, input: ArrayView3<f32>) -> Result<Array2<f32>, ModelError> {
        validate_forward_input(&input, self.input_size)?;

        match &self.layers {
            StackLayers::Unidirectional(cells) => Ok(self.forward_unidirectional(cells, input)),
            StackLayers::Bidirectional(cells) => Ok(self.forward_bidirectional(cells, input)),
        }
    }

    /// Time-major pass: advances every layer by one step before moving to the
    /// next time step, threading each layer's hidden state into the layer above.
    fn forward_unidirectional(&self, cells: &[LstmCell], input: ArrayView3<f32>) -> Array2<f32> {
        let (batch_size, seq_len, _) = input.dim();
        let num_layers = cells.len();

        // One running state pair per layer, zeroed at the start of the pass
        let mut cell_states =
            vec![Array2::<f32>::zeros((batch_size, self.hidden_size)); num_layers];
        let mut hidden_states =
            vec![Array2::<f32>::zeros((batch_size, self.hidden_size)); num_layers];

        for t in 0..seq_len {
            let mut x_t = input.index_axis(Axis(1), t).to_owned();
            for (layer, cell) in cells.iter().enumerate() {
                let (c_t, h_t) = cell.forward(
                    cell_states[layer].view(),
                    hidden_states[layer].view(),
                    x_t.view(),
                );
                cell_states[layer] = c_t;
                x_t = h_t.clone();
                hidden_states[layer] = h_t;
            }
        }

        hidden_states[num_layers - 1].clone()
    }

    /// Layer-major pass: every layer runs one full sweep per direction over the
    /// sequence produced by the layer below, then both hidden sequences are
    /// concatenated position by position to feed the layer above.
    fn forward_bidirectional(
        &self,
        cells: &[[LstmCell; 2]],
        input: ArrayView3<f32>,
    ) -> Array2<f32> {
        let (batch_size, seq_len, _) = input.dim();

        let mut layer_input = input.to_owned();
        for [forward_cell, backward_cell] in cells {
            let forward_outputs =
                self.run_directional_pass(forward_cell, layer_input.view(), Direction::Forward);
            let backward_outputs =
                self.run_directional_pass(backward_cell, layer_input.view(), Direction::Backward);

            let mut concatenated =
                Array3::<f32>::zeros((batch_size, seq_len, 2 * self.hidden_size));
            for t in 0..seq_len {
                concatenated
                    .slice_mut(s![.., t, ..self.hidden_size])
                    .assign(&forward_outputs[t]);
                concatenated
                    .slice_mut(s![.., t, self.hidden_size..])
                    .assign(&backward_outputs[t]);
            }
            layer_input = concatenated;
        }

        layer_input.index_axis(Axis(1), seq_len - 1).to_owned()
    }

    /// Sweeps one cell over the whole sequence in one traversal order
    ///
    /// Returns the hidden state produced at each input position, indexed by
    /// position regardless of traversal order: the backward cell's state at
    /// position t is derived from its state at position t + 1, starting from
    /// zero past the end of the sequence.
    fn run_directional_pass(
        &self,
        cell: &LstmCell,
        sequence: ArrayView3<f32>,
        direction: Direction,
    ) -> Vec<Array2<f32>> {
        let (batch_size, seq_len, _) = sequence.dim();

        let mut cell_state = Array2::<f32>::zeros((batch_size, self.hidden_size));
        let mut hidden_state = Array2::<f32>::zeros((batch_size, self.hidden_size));
        let mut outputs = vec![Array2::<f32>::zeros((batch_size, self.hidden_size)); seq_len];

        for step in 0..seq_len {
            let t = match direction {
                Direction::Forward => step,
                Direction::Backward => seq_len - 1 - step,
            };
            let x_t = sequence.index_axis(Axis(1), t);
            let (c_t, h_t) = cell.forward(cell_state.view(), hidden_state.view(), x_t);
            cell_state = c_t;
            outputs[t] = h_t.clone();
            hidden_state = h_t;
        }

        outputs
    }

    /// Prints a summary of the stack's structure
    ///
    /// Displays each layer's information and parameter statistics in a tabular format
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"lstm_stack\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        let layer_kind = if self.bidirectional() { "BiLSTM" } else { "LSTM" };
        let layer_params: Vec<usize> = match &self.layers {
            StackLayers::Unidirectional(cells) => {
                cells.iter().map(LstmCell::param_count).collect()
            }
            StackLayers::Bidirectional(cells) => cells
                .iter()
                .map(|[forward, backward]| forward.param_count() + backward.param_count())
                .collect(),
        };

        let mut total_params: usize = 0;
        for (i, layer_param_count) in layer_params.iter().enumerate() {
            // Generate name for each layer: first layer is named "Layer", then "Layer_1", "Layer_2", etc.
            let layer_name = if i == 0 {
                "Layer".to_string()
            } else {
                format!("Layer_{}", i)
            };
            total_params += layer_param_count;

            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", layer_name, layer_kind),
                format!("(None, {})", self.output_size()),
                layer_param_count
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        println!(" Total params: {} ({} B)", total_params, total_params * 4); // Using f32, each parameter is 4 bytes
    }
}
