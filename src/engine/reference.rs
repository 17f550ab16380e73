use crate::engine::{
    ProgramId, TexelData, TexelFormat, TextureDesc, TextureEngine, TextureId, Uniform, programs,
};
use crate::error::EngineError;
use ahash::AHashMap;
use rayon::prelude::*;

/// Threshold for deciding between parallel and sequential gather execution.
/// When the output texel count reaches this threshold, use parallel execution.
const GATHER_PARALLEL_THRESHOLD: usize = 1 << 16;

enum Texels {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

struct TextureSlot {
    desc: TextureDesc,
    texels: Texels,
}

/// A deterministic, in-process [`TextureEngine`].
///
/// The reference engine keeps every texture in host memory and executes the crate's
/// built-in program set directly on the CPU; [`compile`] resolves programs by their
/// registered name and rejects anything outside that set. It exists so the texture
/// execution path has a backend on machines without a GPU adapter, and so the GPU-path
/// semantics can be tested bit-for-bit against the in-memory path.
///
/// [`compile`]: TextureEngine::compile
pub struct ReferenceEngine {
    textures: AHashMap<TextureId, TextureSlot>,
    programs: AHashMap<ProgramId, String>,
    next_texture: u32,
    next_program: u32,
}

impl ReferenceEngine {
    pub fn new() -> Self {
        ReferenceEngine {
            textures: AHashMap::new(),
            programs: AHashMap::new(),
            next_texture: 0,
            next_program: 0,
        }
    }

    fn slot(&self, texture: TextureId) -> Result<&TextureSlot, EngineError> {
        self.textures.get(&texture).ok_or_else(|| {
            EngineError::InvalidResource(format!("unknown texture id {:?}", texture))
        })
    }

    fn run_map_gather(
        &mut self,
        inputs: &[(&str, TextureId)],
        output: TextureId,
        uniforms: &[(&str, Uniform)],
    ) -> Result<(), EngineError> {
        let &[(_, source_id), (_, map_id)] = inputs else {
            return Err(EngineError::InvalidResource(
                "map_gather expects exactly two input textures (source, index_map)".to_string(),
            ));
        };
        let source_cols = uniforms
            .iter()
            .find_map(|(name, value)| (*name == "source_cols").then_some(*value));
        let Some(Uniform::U32(source_cols)) = source_cols else {
            return Err(EngineError::InvalidResource(
                "map_gather expects a `source_cols` u32 uniform".to_string(),
            ));
        };
        let cols = source_cols as usize;
        if cols == 0 {
            return Err(EngineError::InvalidResource(
                "map_gather requires a non-zero source_cols".to_string(),
            ));
        }

        let gathered: Vec<f32> = {
            let source_slot = self.slot(source_id)?;
            let map_slot = self.slot(map_id)?;
            let Texels::F32(source) = &source_slot.texels else {
                return Err(EngineError::InvalidResource(
                    "map_gather source must be an f32 texture".to_string(),
                ));
            };
            let Texels::I32(map) = &map_slot.texels else {
                return Err(EngineError::InvalidResource(
                    "map_gather index map must be an i32 texture".to_string(),
                ));
            };
            if map.iter().any(|&offset| offset >= source.len() as i32) {
                return Err(EngineError::InvalidResource(
                    "index map names offsets beyond the source texture".to_string(),
                ));
            }

            // Mirror the shader's offset -> (row, col) arithmetic texel by texel.
            let gather = |&offset: &i32| -> f32 {
                if offset < 0 {
                    0.0
                } else {
                    let offset = offset as usize;
                    let (row, col) = (offset / cols, offset % cols);
                    source[row * cols + col]
                }
            };
            if map.len() >= GATHER_PARALLEL_THRESHOLD {
                map.par_iter().map(gather).collect()
            } else {
                map.iter().map(gather).collect()
            }
        };

        let out_slot = self.textures.get_mut(&output).ok_or_else(|| {
            EngineError::InvalidResource(format!("unknown texture id {:?}", output))
        })?;
        let Texels::F32(out) = &mut out_slot.texels else {
            return Err(EngineError::InvalidResource(
                "map_gather output must be an f32 texture".to_string(),
            ));
        };
        if out.len() != gathered.len() {
            return Err(EngineError::InvalidResource(format!(
                "index map covers {} texels but the output texture has {}",
                gathered.len(),
                out.len()
            )));
        }
        out.copy_from_slice(&gathered);
        Ok(())
    }
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        ReferenceEngine::new()
    }
}

impl TextureEngine for ReferenceEngine {
    fn compile(&mut self, name: &str, _source: &str) -> Result<ProgramId, EngineError> {
        if name != programs::MAP_GATHER_NAME {
            return Err(EngineError::Unsupported(format!(
                "reference engine has no built-in program named `{}`",
                name
            )));
        }
        let id = ProgramId::new(self.next_program);
        self.next_program += 1;
        self.programs.insert(id, name.to_string());
        Ok(id)
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureId, EngineError> {
        let texels = match desc.format {
            TexelFormat::F32 => Texels::F32(vec![0.0; desc.rows * desc.cols]),
            TexelFormat::I32 => Texels::I32(vec![0; desc.rows * desc.cols]),
        };
        let id = TextureId::new(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, TextureSlot { desc, texels });
        Ok(id)
    }

    fn write_texture(
        &mut self,
        texture: TextureId,
        data: TexelData<'_>,
    ) -> Result<(), EngineError> {
        let slot = self.textures.get_mut(&texture).ok_or_else(|| {
            EngineError::InvalidResource(format!("unknown texture id {:?}", texture))
        })?;
        let expected = slot.desc.rows * slot.desc.cols;
        match (&mut slot.texels, data) {
            (Texels::F32(texels), TexelData::F32(data)) if data.len() == expected => {
                texels.copy_from_slice(data);
                Ok(())
            }
            (Texels::I32(texels), TexelData::I32(data)) if data.len() == expected => {
                texels.copy_from_slice(data);
                Ok(())
            }
            _ => Err(EngineError::InvalidResource(
                "texture write does not match the texture's format and texel count".to_string(),
            )),
        }
    }

    fn run(
        &mut self,
        program: ProgramId,
        inputs: &[(&str, TextureId)],
        output: TextureId,
        uniforms: &[(&str, Uniform)],
    ) -> Result<(), EngineError> {
        let name = self
            .programs
            .get(&program)
            .ok_or_else(|| {
                EngineError::InvalidResource(format!("unknown program id {:?}", program))
            })?
            .clone();
        match name.as_str() {
            programs::MAP_GATHER_NAME => self.run_map_gather(inputs, output, uniforms),
            other => Err(EngineError::Unsupported(format!(
                "reference engine cannot run program `{}`",
                other
            ))),
        }
    }

    fn read_texture(&mut self, texture: TextureId) -> Result<Vec<f32>, EngineError> {
        match &self.slot(texture)?.texels {
            Texels::F32(texels) => Ok(texels.clone()),
            Texels::I32(_) => Err(EngineError::Unsupported(
                "integer textures do not support readback".to_string(),
            )),
        }
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }
}
