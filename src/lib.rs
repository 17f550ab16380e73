//! Zero-padding for rank-4 tensors with interchangeable CPU and GPU-texture execution
//! paths.
//!
//! The crate centers on one transformation: padding the three spatial axes of a
//! `[spatial0, spatial1, spatial2, channels]` (or channels-first) tensor with constant
//! zeros. The in-memory path zero-fills an output buffer and performs a single
//! rectangular region copy. The texture path encodes tensors as 2D GPU textures,
//! builds an index map that sends every output texel to a source texel or to a zero
//! sentinel, and delegates the gather to a pluggable [`engine::TextureEngine`]: a
//! wgpu compute backend, or a deterministic in-process reference engine for machines
//! without a GPU adapter. Derived GPU resources are cached per input shape and
//! configuration, and invalidated whenever either changes.
//!
//! # Example
//! ```rust
//! use texpad::layer::{DataFormat, Layer, Padding, ZeroPadding3D};
//! use texpad::tensor::Tensor;
//! use ndarray::Array4;
//!
//! let input = Tensor::from(Array4::<f32>::ones((2, 2, 2, 1)));
//! let mut layer = ZeroPadding3D::new(Padding::Uniform(1), DataFormat::ChannelsLast);
//! let output = layer.apply(&input).unwrap();
//! assert_eq!(output.data().shape(), &[4, 4, 4, 1]);
//! ```

/// Module `engine` defines the texture-engine interface the GPU path delegates to,
/// the execution-strategy selector, and the two bundled engine implementations.
///
/// # Core Components
///
/// - `TextureEngine` - compile programs, manage 2D textures, run gathers, read results
/// - `Backend` - explicit CPU-vs-texture strategy, resolvable once via `Backend::probe`
/// - `WgpuEngine` - WGSL compute shaders on wgpu; one shared device context
/// - `ReferenceEngine` - the built-in program set executed deterministically on the CPU
pub mod engine;

/// Module `error` contains the error types of the crate: `LayerError` for the layer
/// surface and `EngineError` for texture-engine collaborator failures.
pub mod error;

/// Module `layer` contains the layer capability interface and the zero-padding layer.
///
/// # Core Components
///
/// - `Layer` - the `{apply, layer_type, output_shape}` capability interface
/// - `ZeroPadding3D` - zero-padding of the three spatial axes of a rank-4 tensor
/// - `Padding` / `PaddingSpec` - shorthand forms and the canonical pair-triple
/// - `DataFormat` - channels-first vs channels-last axis order
pub mod layer;

/// A convenience module that re-exports the most commonly used types of this crate.
///
/// # Example
/// ```rust
/// use texpad::prelude::*;
///
/// // Quick access to all commonly used components
/// ```
pub mod prelude;

/// Module `tensor` contains the tensor value type and its 2D texture encodings.
///
/// # Core Components
///
/// - `Tensor` - dense `f32` buffer with an optional GPU texture mirror
/// - `TextureLayout` - linear-row vs square linearization strategies
/// - `Encoding` - a planned 2D grid with encode/decode and the per-element offset table
pub mod tensor;
