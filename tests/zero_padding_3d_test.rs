use ndarray::{Array4, ArrayD};
use texpad::error::LayerError;
use texpad::layer::{DataFormat, Layer, Padding, ZeroPadding3D};
use texpad::tensor::Tensor;

#[test]
fn test_output_shape_grows_each_spatial_axis_independently() {
    let input = Tensor::from(Array4::<f32>::ones((2, 3, 4, 5)));
    let mut layer = ZeroPadding3D::new(
        Padding::Explicit([[1, 2], [0, 3], [4, 0]]),
        DataFormat::ChannelsLast,
    );

    let output = layer.apply(&input).unwrap();

    // Each spatial axis grows by its own (before + after); channels are untouched.
    assert_eq!(output.data().shape(), &[5, 6, 8, 5]);
}

#[test]
fn test_copied_region_matches_input_and_everything_else_is_zero() {
    let input_data = Array4::from_shape_fn((2, 3, 4, 2), |(i, j, k, c)| {
        (i * 100 + j * 10 + k) as f32 + c as f32 * 0.5
    });
    let input = Tensor::from(input_data.clone());
    let mut layer = ZeroPadding3D::new(
        Padding::Explicit([[1, 0], [2, 1], [0, 2]]),
        DataFormat::ChannelsLast,
    );

    let output = layer.apply(&input).unwrap();
    assert_eq!(output.data().shape(), &[3, 6, 6, 2]);

    for i in 0..3 {
        for j in 0..6 {
            for k in 0..6 {
                for c in 0..2 {
                    let value = output.data()[[i, j, k, c]];
                    let inside = i >= 1 && (2..5).contains(&j) && k < 4;
                    if inside {
                        assert_eq!(value, input_data[[i - 1, j - 2, k, c]]);
                    } else {
                        assert_eq!(value, 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn test_zero_padding_everywhere_is_an_identity_transform() {
    let input_data = Array4::from_shape_fn((3, 2, 4, 3), |(i, j, k, c)| {
        (i + 2 * j + 3 * k + 5 * c) as f32
    });
    let input = Tensor::from(input_data.clone());
    let mut layer = ZeroPadding3D::new(Padding::Uniform(0), DataFormat::ChannelsLast);

    let output = layer.apply(&input).unwrap();

    assert_eq!(output.data(), &input_data.into_dyn());
}

#[test]
fn test_scalar_padding_expands_to_the_explicit_pair_triple() {
    assert_eq!(
        Padding::Uniform(2).normalize().pairs(),
        [[2, 2], [2, 2], [2, 2]]
    );

    // Applying the scalar form and the explicit form is equivalent.
    let input = Tensor::from(Array4::from_shape_fn((2, 2, 3, 1), |(i, j, k, _)| {
        (i * 9 + j * 3 + k) as f32
    }));
    let mut scalar = ZeroPadding3D::new(Padding::Uniform(2), DataFormat::ChannelsLast);
    let mut explicit = ZeroPadding3D::new(
        Padding::Explicit([[2, 2], [2, 2], [2, 2]]),
        DataFormat::ChannelsLast,
    );

    let from_scalar = scalar.apply(&input).unwrap();
    let from_explicit = explicit.apply(&input).unwrap();
    assert_eq!(from_scalar.data(), from_explicit.data());
}

#[test]
fn test_symmetric_triple_padding_expands_per_axis() {
    assert_eq!(
        Padding::Spatial([1, 0, 2]).normalize().pairs(),
        [[1, 1], [0, 0], [2, 2]]
    );
}

#[test]
fn test_channels_first_matches_transposed_channels_last() {
    let channels_last = Tensor::from(Array4::from_shape_fn((2, 3, 4, 5), |(i, j, k, c)| {
        (i * 1000 + j * 100 + k * 10 + c) as f32
    }));
    let padding = Padding::Explicit([[1, 0], [2, 2], [0, 1]]);

    let mut last_layer = ZeroPadding3D::new(padding, DataFormat::ChannelsLast);
    let padded_last = last_layer.apply(&channels_last).unwrap();

    // Reorder the same data to channels-first, pad there, and compare after
    // reordering the result back.
    let channels_first = channels_last.permuted([3, 0, 1, 2]);
    let mut first_layer = ZeroPadding3D::new(padding, DataFormat::ChannelsFirst);
    let padded_first = first_layer.apply(&channels_first).unwrap();

    assert_eq!(
        padded_first.permuted([1, 2, 3, 0]).data(),
        padded_last.data()
    );
}

#[test]
fn test_pads_a_cube_of_ones_with_leading_and_trailing_slices() {
    let input = Tensor::from(Array4::from_elem((2, 2, 2, 1), 1.0f32));
    let mut layer = ZeroPadding3D::new(
        Padding::Explicit([[1, 0], [0, 1], [0, 0]]),
        DataFormat::ChannelsLast,
    );

    let output = layer.apply(&input).unwrap();
    assert_eq!(output.data().shape(), &[3, 3, 2, 1]);

    // The inserted slice at spatial index 0 along axis 0 is all zeros.
    for j in 0..3 {
        for k in 0..2 {
            assert_eq!(output.data()[[0, j, k, 0]], 0.0);
        }
    }
    // Indices 1-2 along axis 0 hold the input with a trailing zero row on axis 1.
    for i in 1..3 {
        for j in 0..3 {
            for k in 0..2 {
                let expected = if j < 2 { 1.0 } else { 0.0 };
                assert_eq!(output.data()[[i, j, k, 0]], expected);
            }
        }
    }
}

#[test]
fn test_rejects_inputs_that_are_not_rank_4() {
    let mut layer = ZeroPadding3D::new(Padding::default(), DataFormat::ChannelsLast);
    let input = Tensor::from(ArrayD::<f32>::zeros(vec![2, 2, 2]));

    match layer.apply(&input) {
        Err(LayerError::InputValidationError(_)) => {}
        other => panic!("expected an input validation error, got {:?}", other),
    }
}

#[test]
fn test_reports_layer_type_and_output_shape() {
    let mut layer = ZeroPadding3D::new(Padding::Uniform(1), DataFormat::ChannelsLast);
    assert_eq!(layer.layer_type(), "ZeroPadding3D");
    assert_eq!(layer.output_shape(), "Unknown");

    let input = Tensor::from(Array4::<f32>::zeros((2, 2, 2, 1)));
    layer.apply(&input).unwrap();
    assert_eq!(layer.output_shape(), "(4, 4, 4, 1)");
}
