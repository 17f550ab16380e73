/// Deterministic in-process engine executing the built-in program set on the CPU.
pub mod reference;
/// wgpu-backed compute engine.
pub mod wgpu_engine;

pub use reference::ReferenceEngine;
pub use wgpu_engine::WgpuEngine;

use crate::error::EngineError;

/// Sources of the programs shipped with this crate.
pub mod programs {
    /// Name under which the remap program is compiled on every engine.
    pub const MAP_GATHER_NAME: &str = "map_gather";

    /// The remap shader: for each output texel, fetch the source texel named by the
    /// index map, or write zero on the sentinel.
    pub const MAP_GATHER: &str = include_str!("engine/shaders/map_gather.wgsl");
}

/// Handle to a 2D texture owned by a [`TextureEngine`].
///
/// Ids are engine-scoped: a handle is only meaningful to the engine that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

impl TextureId {
    pub(crate) fn new(raw: u32) -> Self {
        TextureId(raw)
    }
}

/// Handle to a compiled program owned by a [`TextureEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(u32);

impl ProgramId {
    pub(crate) fn new(raw: u32) -> Self {
        ProgramId(raw)
    }
}

/// Per-texel storage format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    F32,
    I32,
}

/// Dimensions and format requested for a new texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub rows: usize,
    pub cols: usize,
    pub format: TexelFormat,
}

/// Borrowed texel data for a texture write; must match the texture's format and cover
/// exactly `rows * cols` texels.
#[derive(Debug, Clone, Copy)]
pub enum TexelData<'a> {
    F32(&'a [f32]),
    I32(&'a [i32]),
}

/// A scalar uniform passed to a program run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    U32(u32),
    I32(i32),
    F32(f32),
}

impl Uniform {
    /// The raw 32-bit pattern of the value, as packed into a uniform buffer.
    pub fn to_bits(self) -> u32 {
        match self {
            Uniform::U32(v) => v,
            Uniform::I32(v) => v as u32,
            Uniform::F32(v) => v.to_bits(),
        }
    }
}

/// Interface to a GPU-style program executor operating on 2D textures.
///
/// An engine compiles a program once and then runs it any number of times against named
/// input textures, one output texture, and named scalar uniforms. Programs bind
/// resources positionally: input textures sit at consecutive bindings starting at 0 in
/// call order, the output texture follows them, and a single uniform struct carrying the
/// scalar uniforms in call order comes last. The names serve as labels for diagnostics.
///
/// All execution is synchronous from the caller's point of view: when [`run`] or
/// [`read_texture`] returns, the work is complete. Engines are single-threaded
/// collaborators; callers own every resource they create and release textures
/// explicitly when re-keying caches.
///
/// [`run`]: TextureEngine::run
/// [`read_texture`]: TextureEngine::read_texture
pub trait TextureEngine {
    /// Compiles a program from source under the given name.
    fn compile(&mut self, name: &str, source: &str) -> Result<ProgramId, EngineError>;

    /// Allocates a zero-initialized texture.
    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureId, EngineError>;

    /// Overwrites the full contents of a texture.
    fn write_texture(
        &mut self,
        texture: TextureId,
        data: TexelData<'_>,
    ) -> Result<(), EngineError>;

    /// Runs a compiled program over every texel of the output texture.
    fn run(
        &mut self,
        program: ProgramId,
        inputs: &[(&str, TextureId)],
        output: TextureId,
        uniforms: &[(&str, Uniform)],
    ) -> Result<(), EngineError>;

    /// Reads a texture's full texel storage back to host memory (f32 textures only).
    fn read_texture(&mut self, texture: TextureId) -> Result<Vec<f32>, EngineError>;

    /// Releases a texture. Releasing an unknown id is a no-op.
    fn release_texture(&mut self, texture: TextureId);
}

/// Execution strategy for an operator, fixed at configuration time.
///
/// The choice between the in-memory path and the texture path is made explicitly here,
/// either by the caller or once via [`Backend::probe`]; operators never branch on
/// ambient capability flags at apply time.
pub enum Backend {
    /// Direct in-memory execution on the host.
    Cpu,
    /// Texture-based execution delegated to an engine. `materialize` controls whether
    /// results are read back to host memory after each run; leave it off when a
    /// downstream consumer will read the output texture directly, and call
    /// [`crate::tensor::Tensor::download`] to materialize later.
    Texture {
        engine: Box<dyn TextureEngine>,
        materialize: bool,
    },
}

impl Backend {
    /// Wraps an engine in a texture-path strategy.
    pub fn texture(engine: Box<dyn TextureEngine>, materialize: bool) -> Self {
        Backend::Texture {
            engine,
            materialize,
        }
    }

    /// Resolves the strategy once from the machine's capabilities: the wgpu engine when
    /// a GPU adapter is available, the CPU path otherwise.
    pub fn probe(materialize: bool) -> Self {
        match WgpuEngine::try_new() {
            Ok(engine) => {
                log::info!("texture backend selected: {}", engine.adapter_name());
                Backend::texture(Box::new(engine), materialize)
            }
            Err(e) => {
                log::warn!("no texture backend available ({}), falling back to CPU", e);
                Backend::Cpu
            }
        }
    }

    pub fn is_texture(&self) -> bool {
        matches!(self, Backend::Texture { .. })
    }
}
