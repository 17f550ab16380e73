/// 2D texture grid planning and the logical-to-texel conversions.
pub mod encoding;
/// Linearization strategies for storing tensors as 2D textures.
pub mod texture_layout;

pub use encoding::Encoding;
pub use texture_layout::TextureLayout;

use crate::engine::{TexelData, TexelFormat, TextureDesc, TextureEngine, TextureId};
use crate::error::EngineError;
use ndarray::{Array4, ArrayD, Ix4};

/// Bookkeeping for a tensor's GPU-resident texture mirror.
///
/// Records which texture holds the encoded data and how the logical buffer was
/// linearized into it, so the index-map machinery and any later download can reproduce
/// the exact same [`Encoding`]. Ids are only meaningful to the engine that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture2d {
    id: TextureId,
    layout: TextureLayout,
    rows: usize,
    cols: usize,
}

impl Texture2d {
    pub(crate) fn new(id: TextureId, layout: TextureLayout, rows: usize, cols: usize) -> Self {
        Texture2d {
            id,
            layout,
            rows,
            cols,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

/// A dense `f32` tensor with an optional GPU-resident texture mirror.
///
/// The host buffer is an [`ndarray::ArrayD`] and always carries the logical shape. The
/// texture mirror, when present, holds the same values in a 2D encoding on some
/// [`TextureEngine`]. A tensor produced by a non-materializing GPU invocation carries a
/// stale host buffer until [`Tensor::download`] is called; [`Tensor::is_materialized`]
/// tells the two states apart.
///
/// # Example
/// ```rust
/// use texpad::tensor::Tensor;
/// use ndarray::Array4;
///
/// let t = Tensor::from(Array4::<f32>::zeros((2, 3, 4, 5)));
/// assert_eq!(t.shape(), &[2, 3, 4, 5]);
/// assert!(t.is_materialized());
/// assert!(t.texture().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Tensor {
    data: ArrayD<f32>,
    texture: Option<Texture2d>,
    host_valid: bool,
}

impl Tensor {
    /// Creates a host-only tensor from an ndarray buffer.
    pub fn new(data: ArrayD<f32>) -> Self {
        Tensor {
            data,
            texture: None,
            host_valid: true,
        }
    }

    /// Creates a tensor whose host buffer and texture mirror hold the same values.
    pub fn with_texture(data: ArrayD<f32>, texture: Texture2d) -> Self {
        Tensor {
            data,
            texture: Some(texture),
            host_valid: true,
        }
    }

    /// Creates a device-resident tensor whose host buffer is stale.
    ///
    /// `data` fixes the logical shape; its values are placeholders until
    /// [`Tensor::download`] materializes the texture contents.
    pub fn device_only(data: ArrayD<f32>, texture: Texture2d) -> Self {
        Tensor {
            data,
            texture: Some(texture),
            host_valid: false,
        }
    }

    /// The host buffer. Stale when [`Tensor::is_materialized`] is false.
    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The GPU texture mirror, if this tensor has been uploaded or was produced on the
    /// GPU path.
    pub fn texture(&self) -> Option<&Texture2d> {
        self.texture.as_ref()
    }

    /// Whether the host buffer reflects the tensor's current values.
    pub fn is_materialized(&self) -> bool {
        self.host_valid
    }

    /// Encodes the host buffer with `layout` and uploads it to `engine`, recording the
    /// mirror on this tensor. A tensor that already has a mirror is returned as-is.
    ///
    /// # Returns
    ///
    /// - `Ok(Texture2d)` - The mirror bookkeeping for the uploaded texture
    /// - `Err(EngineError)` - If texture allocation or the write fails
    pub fn upload(
        &mut self,
        engine: &mut dyn TextureEngine,
        layout: TextureLayout,
    ) -> Result<Texture2d, EngineError> {
        if let Some(texture) = self.texture {
            return Ok(texture);
        }
        let encoding = Encoding::plan(self.data.shape(), layout);
        let id = engine.create_texture(TextureDesc {
            rows: encoding.rows(),
            cols: encoding.cols(),
            format: TexelFormat::F32,
        })?;
        engine.write_texture(id, TexelData::F32(&encoding.encode_f32(&self.data)))?;
        let texture = Texture2d::new(id, layout, encoding.rows(), encoding.cols());
        self.texture = Some(texture);
        Ok(texture)
    }

    /// Reads the texture mirror back and decodes it into the host buffer.
    ///
    /// A no-op when the host buffer is already current.
    ///
    /// # Returns
    ///
    /// - `Ok(&ArrayD<f32>)` - The materialized host buffer
    /// - `Err(EngineError)` - If this tensor has no mirror or the readback fails
    pub fn download(
        &mut self,
        engine: &mut dyn TextureEngine,
    ) -> Result<&ArrayD<f32>, EngineError> {
        if !self.host_valid {
            let texture = self.texture.ok_or_else(|| {
                EngineError::InvalidResource(
                    "tensor has no texture mirror to download".to_string(),
                )
            })?;
            let encoding = Encoding::plan(self.data.shape(), texture.layout());
            let texels = engine.read_texture(texture.id())?;
            self.data = encoding.decode_f32(&texels);
            self.host_valid = true;
        }
        Ok(&self.data)
    }

    /// Returns a new tensor with the axes rearranged into standard (row-major) layout.
    ///
    /// This is a value-semantic transposition: the receiver is untouched and the result
    /// owns a fresh contiguous buffer. The texture mirror does not carry over since the
    /// encoded texels no longer match. Requires a rank-4 tensor.
    pub fn permuted(&self, axes: [usize; 4]) -> Tensor {
        let view = self
            .data
            .view()
            .into_dimensionality::<Ix4>()
            .expect("permuted requires a rank-4 tensor");
        let rearranged = view.permuted_axes(axes).as_standard_layout().to_owned();
        Tensor::new(rearranged.into_dyn())
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(data: ArrayD<f32>) -> Self {
        Tensor::new(data)
    }
}

impl From<Array4<f32>> for Tensor {
    fn from(data: Array4<f32>) -> Self {
        Tensor::new(data.into_dyn())
    }
}
