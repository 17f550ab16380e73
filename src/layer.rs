/// Axis-order selector for rank-4 tensors.
pub mod data_format;
/// Padding shorthand forms and the canonical padding specification.
pub mod padding_spec;
/// Zero-padding of the three spatial axes of a rank-4 tensor.
pub mod zero_padding_3d;

pub use data_format::DataFormat;
pub use padding_spec::{Padding, PaddingSpec};
pub use zero_padding_3d::ZeroPadding3D;

use crate::error::LayerError;
use crate::tensor::Tensor;

/// Defines the interface for tensor-transformation layers.
///
/// A layer is configured once at construction and then applied repeatedly; the same
/// instance is expected to reuse whatever internal caches it builds across calls with
/// identical input shapes. There is no shared base state between implementations; each
/// layer owns exactly the state its own strategy needs.
pub trait Layer {
    /// Applies the layer's transformation to an input tensor.
    ///
    /// # Parameters
    ///
    /// - `input` - The input tensor; layers state their rank requirements individually
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The transformed tensor, owned by the caller
    /// - `Err(LayerError)` - If the input fails validation or a collaborator fails
    fn apply(&mut self, input: &Tensor) -> Result<Tensor, LayerError>;

    /// Returns the type name of the layer (e.g. "ZeroPadding3D").
    fn layer_type(&self) -> &str {
        "Unknown"
    }

    /// Returns a description of the output shape of the layer.
    fn output_shape(&self) -> String {
        "Unknown".to_string()
    }
}
