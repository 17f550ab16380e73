use crate::engine::{
    Backend, ProgramId, TexelData, TexelFormat, TextureDesc, TextureEngine, TextureId, Uniform,
    programs,
};
use crate::error::LayerError;
use crate::layer::{DataFormat, Layer, Padding, PaddingSpec};
use crate::tensor::{Encoding, Tensor, Texture2d, TextureLayout};
use ndarray::{Array4, ArrayD, Ix4, s};

/// Zero-padding layer for rank-4 tensors (three spatial axes plus a channel axis).
///
/// Pads each spatial axis independently with constant zeros, leaving the channel axis
/// untouched. The layer runs on one of two interchangeable execution strategies fixed at
/// construction: a direct in-memory path that zero-fills the output and performs one
/// rectangular region copy, or a texture path that encodes tensors as 2D GPU textures
/// and delegates a precomputed index-map gather to a [`TextureEngine`].
///
/// On the texture path the layer owns every GPU resource it allocates: a staging
/// texture for host-only inputs, the index-map texture and the output texture. They are
/// cached and reused across calls keyed by `(input shape, padding, data format, texture
/// layout)` and rebuilt whenever the key changes, so a single instance can be reused
/// with differently-shaped inputs. The output texture is rewritten in place on every
/// call; a returned tensor's mirror therefore aliases the layer's output texture until
/// the next call, which is the intended reuse discipline for sequential pipelines.
///
/// # Data Structure
///
/// - Input tensor format: rank-4 tensor in the configured [`DataFormat`]
/// - Output tensor format: rank-4 tensor with each spatial extent grown by that axis'
///   `(before, after)` padding
///
/// # Example
/// ```rust
/// use texpad::layer::{DataFormat, Layer, Padding, ZeroPadding3D};
/// use texpad::tensor::Tensor;
/// use ndarray::Array4;
///
/// let input = Tensor::from(Array4::from_elem((2, 2, 2, 1), 1.0f32));
/// let mut layer = ZeroPadding3D::new(
///     Padding::Explicit([[1, 0], [0, 1], [0, 0]]),
///     DataFormat::ChannelsLast,
/// );
///
/// let output = layer.apply(&input).unwrap();
/// assert_eq!(output.data().shape(), &[3, 3, 2, 1]);
/// // The leading slice along spatial axis 0 is freshly inserted zeros.
/// assert_eq!(output.data()[[0, 0, 0, 0]], 0.0);
/// // The original values sit behind the inserted slice.
/// assert_eq!(output.data()[[1, 0, 0, 0]], 1.0);
/// ```
pub struct ZeroPadding3D {
    padding: PaddingSpec,
    data_format: DataFormat,
    backend: Backend,
    input_shape: Option<[usize; 4]>,
    program: Option<ProgramId>,
    cache: Option<TextureCache>,
}

/// Everything the texture path derives from one `(input, configuration)` combination.
/// A key mismatch releases and rebuilds all of it; reusing any of these resources
/// across differently-keyed calls would be a correctness bug, not a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    input_shape: [usize; 4],
    padding: PaddingSpec,
    data_format: DataFormat,
    layout: TextureLayout,
}

struct TextureCache {
    key: CacheKey,
    /// Layer-owned upload target for inputs without a texture mirror; created on first
    /// need and rewritten with the input's current data on every call.
    staging: Option<TextureId>,
    index_map: TextureId,
    output: TextureId,
    input_encoding: Encoding,
    output_encoding: Encoding,
}

impl ZeroPadding3D {
    /// Creates a zero-padding layer on the in-memory execution strategy.
    ///
    /// # Parameters
    ///
    /// - `padding` - Padding amounts in any accepted shorthand form; normalized to the
    ///   canonical pair-triple once, here
    /// - `data_format` - Which buffer axis carries the channels
    ///
    /// # Returns
    ///
    /// * `ZeroPadding3D` - A new instance of the ZeroPadding3D layer.
    pub fn new(padding: Padding, data_format: DataFormat) -> Self {
        Self::with_backend(padding, data_format, Backend::Cpu)
    }

    /// Creates a zero-padding layer on an explicit execution strategy.
    ///
    /// Use [`Backend::probe`] to resolve the strategy from the machine's capabilities
    /// once, or pass [`Backend::texture`] with an engine of your choosing.
    ///
    /// # Example
    /// ```rust,no_run
    /// use texpad::engine::Backend;
    /// use texpad::layer::{DataFormat, Padding, ZeroPadding3D};
    ///
    /// let layer = ZeroPadding3D::with_backend(
    ///     Padding::Uniform(2),
    ///     DataFormat::ChannelsFirst,
    ///     Backend::probe(true),
    /// );
    /// ```
    pub fn with_backend(padding: Padding, data_format: DataFormat, backend: Backend) -> Self {
        ZeroPadding3D {
            padding: padding.normalize(),
            data_format,
            backend,
            input_shape: None,
            program: None,
            cache: None,
        }
    }

    /// The normalized padding specification this layer was configured with.
    pub fn padding(&self) -> PaddingSpec {
        self.padding
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    /// Mutable access to the texture engine when this layer runs on the texture
    /// strategy, e.g. to download a non-materialized result tensor.
    pub fn engine_mut(&mut self) -> Option<&mut dyn TextureEngine> {
        match &mut self.backend {
            Backend::Texture { engine, .. } => Some(engine.as_mut()),
            Backend::Cpu => None,
        }
    }

    fn checked_shape(&self, input: &Tensor) -> Result<[usize; 4], LayerError> {
        let shape = input.shape();
        if shape.len() != 4 {
            return Err(LayerError::InputValidationError(format!(
                "input tensor must be rank 4: {} for ZeroPadding3D, got rank {}",
                self.data_format.axis_description(),
                shape.len()
            )));
        }
        Ok([shape[0], shape[1], shape[2], shape[3]])
    }

    /// Direct in-memory padding: zero-fill, then one rectangular region copy.
    fn pad_cpu(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        let data = input
            .data()
            .view()
            .into_dimensionality::<Ix4>()
            .expect("validated rank-4 input");

        // Operate in channels-last order; a channels-first input is viewed through a
        // transposition and the result transposed back, leaving the input untouched.
        let channels_last = match self.data_format {
            DataFormat::ChannelsLast => data,
            DataFormat::ChannelsFirst => data.permuted_axes([1, 2, 3, 0]),
        };
        let (s0, s1, s2, channels) = channels_last.dim();
        let p = self.padding;

        let mut output = Array4::<f32>::zeros((
            s0 + p.total(0),
            s1 + p.total(1),
            s2 + p.total(2),
            channels,
        ));
        output
            .slice_mut(s![
                p.before(0)..p.before(0) + s0,
                p.before(1)..p.before(1) + s1,
                p.before(2)..p.before(2) + s2,
                ..
            ])
            .assign(&channels_last);

        let output = match self.data_format {
            DataFormat::ChannelsLast => output,
            DataFormat::ChannelsFirst => {
                output.permuted_axes([3, 0, 1, 2]).as_standard_layout().to_owned()
            }
        };
        Ok(Tensor::new(output.into_dyn()))
    }

    /// Texture-path padding: build or reuse the cached index map and output texture,
    /// then delegate the gather to the engine.
    fn pad_texture(
        &mut self,
        input: &Tensor,
        input_shape: [usize; 4],
    ) -> Result<Tensor, LayerError> {
        let padding = self.padding;
        let data_format = self.data_format;
        let Backend::Texture {
            engine,
            materialize,
        } = &mut self.backend
        else {
            return Err(LayerError::ProcessingError(
                "texture path invoked on a CPU backend".to_string(),
            ));
        };
        let engine = engine.as_mut();
        let materialize = *materialize;

        // Pair with the input's existing encoding, or the upload default for host-only
        // inputs. The layout is part of the cache key: an input that changes encoding
        // strategy between calls forces a rebuild like any other shape change.
        let layout = input
            .texture()
            .map(|t| t.layout())
            .unwrap_or_default();
        let key = CacheKey {
            input_shape,
            padding,
            data_format,
            layout,
        };

        if self.cache.as_ref().map(|c| c.key != key).unwrap_or(true) {
            if let Some(old) = self.cache.take() {
                engine.release_texture(old.index_map);
                engine.release_texture(old.output);
                if let Some(staging) = old.staging {
                    engine.release_texture(staging);
                }
            }
            self.cache = Some(build_cache(engine, key)?);
        }
        let program = match self.program {
            Some(program) => program,
            None => {
                let program = engine.compile(programs::MAP_GATHER_NAME, programs::MAP_GATHER)?;
                self.program = Some(program);
                program
            }
        };
        let cache = self.cache.as_mut().ok_or_else(|| {
            LayerError::ProcessingError("texture cache unavailable after rebuild".to_string())
        })?;

        // Source texture: the input's own mirror, or the layer-owned staging texture
        // rewritten with the input's current data.
        let (source, source_cols) = match input.texture() {
            Some(texture) => (texture.id(), texture.cols()),
            None => {
                let staging = match cache.staging {
                    Some(staging) => staging,
                    None => {
                        let staging = engine.create_texture(TextureDesc {
                            rows: cache.input_encoding.rows(),
                            cols: cache.input_encoding.cols(),
                            format: TexelFormat::F32,
                        })?;
                        cache.staging = Some(staging);
                        staging
                    }
                };
                engine.write_texture(
                    staging,
                    TexelData::F32(&cache.input_encoding.encode_f32(input.data())),
                )?;
                (staging, cache.input_encoding.cols())
            }
        };

        engine.run(
            program,
            &[("source", source), ("index_map", cache.index_map)],
            cache.output,
            &[("source_cols", Uniform::U32(source_cols as u32))],
        )?;

        let texture = Texture2d::new(
            cache.output,
            layout,
            cache.output_encoding.rows(),
            cache.output_encoding.cols(),
        );
        if materialize {
            let texels = engine.read_texture(cache.output)?;
            Ok(Tensor::with_texture(
                cache.output_encoding.decode_f32(&texels),
                texture,
            ))
        } else {
            Ok(Tensor::device_only(
                ArrayD::zeros(cache.output_encoding.shape().to_vec()),
                texture,
            ))
        }
    }
}

impl Layer for ZeroPadding3D {
    fn apply(&mut self, input: &Tensor) -> Result<Tensor, LayerError> {
        let input_shape = self.checked_shape(input)?;
        self.input_shape = Some(input_shape);
        if self.backend.is_texture() {
            self.pad_texture(input, input_shape)
        } else {
            self.pad_cpu(input)
        }
    }

    fn layer_type(&self) -> &str {
        "ZeroPadding3D"
    }

    fn output_shape(&self) -> String {
        match self.input_shape {
            Some(shape) => {
                let out = self.padding.padded_shape(shape, self.data_format);
                format!("({}, {}, {}, {})", out[0], out[1], out[2], out[3])
            }
            None => String::from("Unknown"),
        }
    }
}

/// Builds the derived texture resources for one cache key: the index-map texture and
/// the zero-initialized output texture, both planned with the key's layout strategy.
fn build_cache(engine: &mut dyn TextureEngine, key: CacheKey) -> Result<TextureCache, LayerError> {
    let input_encoding = Encoding::plan(&key.input_shape, key.layout);
    let output_shape = key.padding.padded_shape(key.input_shape, key.data_format);
    let output_encoding = Encoding::plan(&output_shape, key.layout);

    let map = build_index_map(key, &input_encoding);
    let map_texels = output_encoding.encode_i32(&map.into_dyn());

    let index_map = engine.create_texture(TextureDesc {
        rows: output_encoding.rows(),
        cols: output_encoding.cols(),
        format: TexelFormat::I32,
    })?;
    engine.write_texture(index_map, TexelData::I32(&map_texels))?;
    let output = engine.create_texture(TextureDesc {
        rows: output_encoding.rows(),
        cols: output_encoding.cols(),
        format: TexelFormat::F32,
    })?;

    Ok(TextureCache {
        key,
        staging: None,
        index_map,
        output,
        input_encoding,
        output_encoding,
    })
}

/// Builds the output-shaped index tensor: sentinel everywhere, with the copy region
/// overwritten by the input encoding's per-element offset table, i.e. the identity
/// mapping of input elements into the input's 2D texture lifted into the padded
/// coordinates.
fn build_index_map(key: CacheKey, input_encoding: &Encoding) -> Array4<i32> {
    let out = key.padding.padded_shape(key.input_shape, key.data_format);
    let mut map = Array4::from_elem((out[0], out[1], out[2], out[3]), -1i32);
    let offsets = input_encoding
        .offsets()
        .into_dimensionality::<Ix4>()
        .expect("encoding planned for a rank-4 shape");
    let (b0, b1, b2) = (
        key.padding.before(0),
        key.padding.before(1),
        key.padding.before(2),
    );
    match key.data_format {
        DataFormat::ChannelsLast => {
            let [s0, s1, s2, _] = key.input_shape;
            map.slice_mut(s![b0..b0 + s0, b1..b1 + s1, b2..b2 + s2, ..])
                .assign(&offsets);
        }
        DataFormat::ChannelsFirst => {
            let [_, s0, s1, s2] = key.input_shape;
            map.slice_mut(s![.., b0..b0 + s0, b1..b1 + s1, b2..b2 + s2])
                .assign(&offsets);
        }
    }
    map
}
