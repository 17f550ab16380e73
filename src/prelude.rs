pub use crate::engine::{
    Backend, ProgramId, ReferenceEngine, TexelData, TexelFormat, TextureDesc, TextureEngine,
    TextureId, Uniform, WgpuEngine,
};
pub use crate::error::{EngineError, LayerError};
pub use crate::layer::{DataFormat, Layer, Padding, PaddingSpec, ZeroPadding3D};
pub use crate::tensor::{Encoding, Tensor, Texture2d, TextureLayout};
