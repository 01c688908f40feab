/// Borrowed weights for a single gate of a cell
///
/// # Fields
///
/// - `recurrent_weight` - Weight matrix for recurrent connections
/// - `input_weight` - Weight matrix for input features
/// - `bias` - Bias vector for the gate
pub struct GateWeight<'a> {
    pub recurrent_weight: &'a ndarray::Array2<f32>,
    pub input_weight: &'a ndarray::Array2<f32>,
    pub bias: &'a ndarray::Array1<f32>,
}

/// Borrowed weights for all four gates of a cell
///
/// Contains the weights of the four gates that control information flow in a cell:
/// forget gate, weighter gate, candidate gate, and memory gate.
///
/// # Fields
///
/// - `forget` - Weights for the forget gate, which scales the previous cell state
/// - `weighter` - Weights for the weighter gate, which scales the candidate values
/// - `candidate` - Weights for the candidate gate, which proposes new cell state values
/// - `memory` - Weights for the memory gate, which controls what to output
pub struct CellWeight<'a> {
    pub forget: GateWeight<'a>,
    pub weighter: GateWeight<'a>,
    pub candidate: GateWeight<'a>,
    pub memory: GateWeight<'a>,
}

/// Borrowed weights for one layer of a stack
///
/// Unidirectional layers hold a single cell; bidirectional layers hold one
/// cell per traversal direction.
///
/// # Variants
///
/// - `Unidirectional` - Weights of the layer's single forward cell
/// - `Bidirectional` - Weights of the layer's forward and backward cells
pub enum StackLayerWeight<'a> {
    Unidirectional(CellWeight<'a>),
    Bidirectional {
        forward: CellWeight<'a>,
        backward: CellWeight<'a>,
    },
}
