use ndarray::{Array4, ArrayD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use texpad::engine::{Backend, ReferenceEngine};
use texpad::layer::{DataFormat, Layer, Padding, ZeroPadding3D};
use texpad::tensor::{Tensor, TextureLayout};

fn random_tensor(shape: (usize, usize, usize, usize), seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    Tensor::from(Array4::from_shape_fn(shape, |_| {
        rng.random_range(-1.0f32..1.0)
    }))
}

fn cpu_result(padding: Padding, data_format: DataFormat, input: &Tensor) -> ArrayD<f32> {
    let mut layer = ZeroPadding3D::new(padding, data_format);
    layer.apply(input).unwrap().data().clone()
}

fn texture_layer(padding: Padding, data_format: DataFormat) -> ZeroPadding3D {
    ZeroPadding3D::with_backend(
        padding,
        data_format,
        Backend::texture(Box::new(ReferenceEngine::new()), true),
    )
}

#[test]
fn test_texture_path_matches_cpu_path_channels_last() {
    let input = random_tensor((3, 4, 2, 5), 7);
    let padding = Padding::Explicit([[1, 0], [0, 2], [3, 1]]);

    let mut layer = texture_layer(padding, DataFormat::ChannelsLast);
    let output = layer.apply(&input).unwrap();

    assert_eq!(
        output.data(),
        &cpu_result(padding, DataFormat::ChannelsLast, &input)
    );
}

#[test]
fn test_texture_path_matches_cpu_path_channels_first() {
    let input = random_tensor((3, 2, 4, 5), 11);
    let padding = Padding::Spatial([2, 0, 1]);

    let mut layer = texture_layer(padding, DataFormat::ChannelsFirst);
    let output = layer.apply(&input).unwrap();

    assert_eq!(
        output.data(),
        &cpu_result(padding, DataFormat::ChannelsFirst, &input)
    );
}

#[test]
fn test_texture_path_follows_the_input_tensors_linear_encoding() {
    let mut engine = ReferenceEngine::new();
    let mut input = random_tensor((2, 3, 3, 4), 13);
    // Upload ahead of time, as an upstream pipeline stage would.
    input.upload(&mut engine, TextureLayout::Linear).unwrap();

    let padding = Padding::Uniform(1);
    let mut layer = ZeroPadding3D::with_backend(
        padding,
        DataFormat::ChannelsLast,
        Backend::texture(Box::new(engine), true),
    );
    let output = layer.apply(&input).unwrap();

    // The output pairs with the input's encoding strategy.
    assert_eq!(output.texture().unwrap().layout(), TextureLayout::Linear);
    assert_eq!(
        output.data(),
        &cpu_result(padding, DataFormat::ChannelsLast, &input)
    );
}

#[test]
fn test_repeated_calls_reuse_the_cached_textures() {
    let padding = Padding::Uniform(1);
    let mut layer = texture_layer(padding, DataFormat::ChannelsLast);

    let first_input = random_tensor((2, 3, 4, 2), 17);
    let first = layer.apply(&first_input).unwrap();
    let first_id = first.texture().unwrap().id();

    // Same shape, different data: the output texture is reused in place and the
    // result still tracks the new input.
    let second_input = random_tensor((2, 3, 4, 2), 19);
    let second = layer.apply(&second_input).unwrap();
    assert_eq!(second.texture().unwrap().id(), first_id);
    assert_eq!(
        second.data(),
        &cpu_result(padding, DataFormat::ChannelsLast, &second_input)
    );

    // A shape change invalidates the cache and allocates fresh textures.
    let reshaped_input = random_tensor((4, 2, 2, 3), 23);
    let reshaped = layer.apply(&reshaped_input).unwrap();
    assert_ne!(reshaped.texture().unwrap().id(), first_id);
    assert_eq!(
        reshaped.data(),
        &cpu_result(padding, DataFormat::ChannelsLast, &reshaped_input)
    );
}

#[test]
fn test_non_materialized_results_download_on_demand() {
    let padding = Padding::Explicit([[0, 1], [1, 0], [2, 2]]);
    let input = random_tensor((2, 2, 3, 3), 29);

    let mut layer = ZeroPadding3D::with_backend(
        padding,
        DataFormat::ChannelsLast,
        Backend::texture(Box::new(ReferenceEngine::new()), false),
    );
    let mut output = layer.apply(&input).unwrap();

    // The result stays device-resident until the caller asks for it.
    assert!(!output.is_materialized());
    assert!(output.texture().is_some());
    assert!(output.data().iter().all(|&v| v == 0.0));

    let engine = layer.engine_mut().unwrap();
    output.download(engine).unwrap();
    assert!(output.is_materialized());
    assert_eq!(
        output.data(),
        &cpu_result(padding, DataFormat::ChannelsLast, &input)
    );
}

#[test]
fn test_identity_padding_round_trips_through_the_texture_path() {
    let input = random_tensor((2, 2, 2, 2), 31);
    let mut layer = texture_layer(Padding::Uniform(0), DataFormat::ChannelsLast);

    let output = layer.apply(&input).unwrap();

    assert_eq!(output.data(), input.data());
}
