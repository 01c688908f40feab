use approx::assert_relative_eq;
use lstm_stack::{Direction, LstmCell, LstmStack};
use ndarray::prelude::*;
use rand::Rng;

/// Fills all four gates of a cell with small deterministic patterns,
/// scaled so pre-activations stay in the responsive range of the activations
fn set_patterned_weights(cell: &mut LstmCell, seed: f32) {
    let hidden = cell.hidden_size();
    let input = cell.input_size();
    let scale = seed / (hidden + input) as f32;

    let recurrent = |offset: f32| {
        Array2::from_shape_fn((hidden, hidden), |(r, c)| {
            scale * (((r * 3 + c * 5 + 1) % 11) as f32 - 5.0) + offset
        })
    };
    let input_weight = |offset: f32| {
        Array2::from_shape_fn((hidden, input), |(r, c)| {
            scale * (((r * 7 + c * 2 + 3) % 13) as f32 - 6.0) + offset
        })
    };
    let bias = |offset: f32| Array1::from_shape_fn(hidden, |r| scale * ((r % 5) as f32 - 2.0) + offset);

    cell.set_weights(
        recurrent(0.0),
        input_weight(0.0),
        bias(0.0),
        recurrent(0.01),
        input_weight(0.01),
        bias(0.01),
        recurrent(0.02),
        input_weight(0.02),
        bias(0.02),
        recurrent(0.03),
        input_weight(-0.03),
        bias(0.03),
    );
}

fn random_input(batch_size: usize, seq_len: usize, features: usize) -> Array3<f32> {
    let mut rng = rand::rng();
    Array3::from_shape_fn((batch_size, seq_len, features), |_| {
        rng.random_range(-1.0f32..1.0)
    })
}

/// Threads a single cell through a sequence in the requested traversal order.
/// Outputs are indexed by input position: the backward traversal derives the
/// state at position t from the state at position t + 1, starting from zero
/// past the end of the sequence.
fn unroll_direction(cell: &LstmCell, sequence: ArrayView3<f32>, backward: bool) -> Vec<Array2<f32>> {
    let (batch_size, seq_len, _) = sequence.dim();
    let hidden = cell.hidden_size();

    let mut cell_state = Array2::<f32>::zeros((batch_size, hidden));
    let mut hidden_state = Array2::<f32>::zeros((batch_size, hidden));
    let mut outputs = vec![Array2::<f32>::zeros((batch_size, hidden)); seq_len];
    for step in 0..seq_len {
        let t = if backward { seq_len - 1 - step } else { step };
        let (c_t, h_t) = cell.forward(
            cell_state.view(),
            hidden_state.view(),
            sequence.index_axis(Axis(1), t),
        );
        cell_state = c_t;
        outputs[t] = h_t.clone();
        hidden_state = h_t;
    }
    outputs
}

/// Joins the two directional hidden sequences position by position along the
/// feature axis, forward half first
fn concat_directions(
    forward: &[Array2<f32>],
    backward: &[Array2<f32>],
    hidden: usize,
) -> Array3<f32> {
    let batch_size = forward[0].nrows();
    let seq_len = forward.len();

    let mut merged = Array3::<f32>::zeros((batch_size, seq_len, 2 * hidden));
    for t in 0..seq_len {
        merged.slice_mut(s![.., t, ..hidden]).assign(&forward[t]);
        merged.slice_mut(s![.., t, hidden..]).assign(&backward[t]);
    }
    merged
}

#[test]
fn test_bidirectional_reference_configuration_shape() {
    let stack = LstmStack::new(128, 60, 2, true).unwrap();
    let input = random_input(5, 12, 60);

    // Both directions contribute hidden_size features each
    let encoded = stack.forward(input.view()).unwrap();
    println!("Encoded shape: {:?}", encoded.shape());
    assert_eq!(encoded.shape(), &[5, 256]);
    assert!(encoded.iter().all(|&v| v == 0.0));
}

#[test]
fn test_deeper_layers_consume_concatenated_width() {
    let stack = LstmStack::new(3, 5, 2, true).unwrap();

    assert_eq!(stack.cell(0, Direction::Forward).unwrap().input_size(), 5);
    assert_eq!(stack.cell(0, Direction::Backward).unwrap().input_size(), 5);
    assert_eq!(stack.cell(1, Direction::Forward).unwrap().input_size(), 6);
    assert_eq!(stack.cell(1, Direction::Backward).unwrap().input_size(), 6);

    let input = random_input(4, 7, 5);
    let encoded = stack.forward(input.view()).unwrap();
    assert_eq!(encoded.shape(), &[4, 6]);
}

#[test]
fn test_single_timestep_directions_agree() {
    // With one time step both directions see the same zero-state single step,
    // so identical parameters must produce identical halves
    let mut stack = LstmStack::new(3, 4, 1, true).unwrap();
    set_patterned_weights(stack.cell_mut(0, Direction::Forward).unwrap(), 0.4);
    set_patterned_weights(stack.cell_mut(0, Direction::Backward).unwrap(), 0.4);

    let input = random_input(2, 1, 4);
    let encoded = stack.forward(input.view()).unwrap();
    assert_eq!(encoded.shape(), &[2, 6]);

    let forward_half = encoded.slice(s![.., ..3]);
    let backward_half = encoded.slice(s![.., 3..]);
    assert_eq!(forward_half, backward_half);

    // And each half satisfies the single-step gate equations
    let x_0 = input.index_axis(Axis(1), 0).to_owned();
    let h_0 = Array2::<f32>::zeros((2, 3));
    let c_0 = Array2::<f32>::zeros((2, 3));

    let weights = stack.cell(0, Direction::Forward).unwrap().get_weights();
    let sigmoid = |a: Array2<f32>| a.mapv(|v| 1.0 / (1.0 + (-v).exp()));
    let affine = |gate: &lstm_stack::GateWeight| {
        h_0.dot(&gate.recurrent_weight.t()) + x_0.dot(&gate.input_weight.t()) + gate.bias
    };

    let forget = sigmoid(affine(&weights.forget));
    let weighter = sigmoid(affine(&weights.weighter));
    let candidate = affine(&weights.candidate).mapv(f32::tanh);
    let memory = sigmoid(affine(&weights.memory));

    let expected_cell = &c_0 * &forget + &weighter * &candidate;
    let expected_hidden = expected_cell.mapv(f32::tanh) * &memory;

    for (actual, expected) in forward_half.iter().zip(expected_hidden.iter()) {
        assert_relative_eq!(*actual, *expected, epsilon = 1e-6);
    }
}

#[test]
fn test_composition_matches_manual_directional_passes() {
    let mut stack = LstmStack::new(4, 3, 2, true).unwrap();
    set_patterned_weights(stack.cell_mut(0, Direction::Forward).unwrap(), 0.2);
    set_patterned_weights(stack.cell_mut(0, Direction::Backward).unwrap(), 0.25);
    set_patterned_weights(stack.cell_mut(1, Direction::Forward).unwrap(), 0.3);
    set_patterned_weights(stack.cell_mut(1, Direction::Backward).unwrap(), 0.35);

    let input = random_input(2, 5, 3);
    let encoded = stack.forward(input.view()).unwrap();

    // Rebuild both layers by hand: each layer sweeps the sequence once per
    // direction and feeds the concatenated hidden sequence upward
    let layer_0 = concat_directions(
        &unroll_direction(
            stack.cell(0, Direction::Forward).unwrap(),
            input.view(),
            false,
        ),
        &unroll_direction(
            stack.cell(0, Direction::Backward).unwrap(),
            input.view(),
            true,
        ),
        4,
    );
    let layer_1 = concat_directions(
        &unroll_direction(
            stack.cell(1, Direction::Forward).unwrap(),
            layer_0.view(),
            false,
        ),
        &unroll_direction(
            stack.cell(1, Direction::Backward).unwrap(),
            layer_0.view(),
            true,
        ),
        4,
    );

    let expected = layer_1.index_axis(Axis(1), 4).to_owned();
    assert_eq!(encoded, expected);
}

#[test]
fn test_directions_are_independent_cells() {
    // Only the forward cells carry weights; the zeroed backward cells must
    // leave their half of the encoding at exactly zero
    let mut stack = LstmStack::new(4, 3, 1, true).unwrap();
    set_patterned_weights(stack.cell_mut(0, Direction::Forward).unwrap(), 0.3);

    let input = random_input(3, 6, 3);
    let encoded = stack.forward(input.view()).unwrap();

    let forward_half = encoded.slice(s![.., ..4]);
    let backward_half = encoded.slice(s![.., 4..]);
    assert!(forward_half.iter().any(|&v| v != 0.0));
    assert!(backward_half.iter().all(|&v| v == 0.0));
}

#[test]
fn test_bidirectional_forward_is_deterministic() {
    let mut stack = LstmStack::new(5, 4, 2, true).unwrap();
    for layer in 0..2 {
        set_patterned_weights(
            stack.cell_mut(layer, Direction::Forward).unwrap(),
            0.2 + 0.1 * layer as f32,
        );
        set_patterned_weights(
            stack.cell_mut(layer, Direction::Backward).unwrap(),
            0.25 + 0.1 * layer as f32,
        );
    }

    let input = random_input(3, 7, 4);

    let first = stack.forward(input.view()).unwrap();
    let second = stack.forward(input.view()).unwrap();
    assert_eq!(first, second);
}
