use approx::assert_abs_diff_eq;
use ndarray::Array4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use texpad::engine::{Backend, WgpuEngine};
use texpad::layer::{DataFormat, Layer, Padding, ZeroPadding3D};
use texpad::tensor::Tensor;

/// The wgpu tests only run where a GPU adapter exists; everywhere else they skip
/// rather than fail, since adapter availability is a property of the machine.
fn acquire_engine() -> Option<WgpuEngine> {
    match WgpuEngine::try_new() {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("skipping wgpu test: {}", e);
            None
        }
    }
}

fn random_tensor(shape: (usize, usize, usize, usize), seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    Tensor::from(Array4::from_shape_fn(shape, |_| {
        rng.random_range(-1.0f32..1.0)
    }))
}

#[test]
fn test_wgpu_texture_path_matches_cpu_path_for_both_data_formats() {
    if acquire_engine().is_none() {
        return;
    }

    let padding = Padding::Explicit([[1, 0], [0, 2], [1, 1]]);
    for data_format in [DataFormat::ChannelsLast, DataFormat::ChannelsFirst] {
        let engine = match acquire_engine() {
            Some(engine) => engine,
            None => return,
        };
        let input = random_tensor((3, 2, 4, 3), 43);

        let mut cpu_layer = ZeroPadding3D::new(padding, data_format);
        let expected = cpu_layer.apply(&input).unwrap();

        let mut gpu_layer = ZeroPadding3D::with_backend(
            padding,
            data_format,
            Backend::texture(Box::new(engine), true),
        );
        let actual = gpu_layer.apply(&input).unwrap();

        assert_eq!(actual.data().shape(), expected.data().shape());
        for (a, e) in actual.data().iter().zip(expected.data().iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 0.0);
        }
    }
}

#[test]
fn test_wgpu_cached_textures_survive_repeated_calls() {
    let engine = match acquire_engine() {
        Some(engine) => engine,
        None => return,
    };

    let padding = Padding::Uniform(1);
    let mut layer = ZeroPadding3D::with_backend(
        padding,
        DataFormat::ChannelsLast,
        Backend::texture(Box::new(engine), true),
    );

    let first_input = random_tensor((2, 3, 2, 2), 47);
    let first = layer.apply(&first_input).unwrap();
    let first_id = first.texture().unwrap().id();

    let second_input = random_tensor((2, 3, 2, 2), 53);
    let second = layer.apply(&second_input).unwrap();
    assert_eq!(second.texture().unwrap().id(), first_id);

    let mut cpu_layer = ZeroPadding3D::new(padding, DataFormat::ChannelsLast);
    let expected = cpu_layer.apply(&second_input).unwrap();
    assert_eq!(second.data(), expected.data());
}
