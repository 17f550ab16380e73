use crate::engine::{
    ProgramId, TexelData, TexelFormat, TextureDesc, TextureEngine, TextureId, Uniform,
};
use crate::error::EngineError;
use ahash::AHashMap;
use std::sync::{Arc, OnceLock, mpsc};
use wgpu::util::DeviceExt;

/// Row alignment wgpu requires for texture-to-buffer copies.
const ROW_ALIGNMENT: usize = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;

/// Workgroup footprint of the crate's compute shaders.
const WORKGROUP_DIM: u32 = 16;

struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
}

static CONTEXT: OnceLock<Result<Arc<WgpuContext>, EngineError>> = OnceLock::new();

fn context() -> Result<Arc<WgpuContext>, EngineError> {
    CONTEXT.get_or_init(init_context).clone()
}

fn init_context() -> Result<Arc<WgpuContext>, EngineError> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                EngineError::DeviceUnavailable("no compatible GPU adapter".to_string())
            })?;
        let adapter_info = adapter.get_info();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("texpad device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| EngineError::DeviceUnavailable(e.to_string()))?;
        log::info!(
            "acquired GPU device on {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );
        Ok(Arc::new(WgpuContext {
            device,
            queue,
            adapter_info,
        }))
    })
}

struct TextureSlot {
    texture: wgpu::Texture,
    desc: TextureDesc,
}

struct ProgramSlot {
    pipeline: wgpu::ComputePipeline,
}

/// A [`TextureEngine`] running WGSL compute shaders through wgpu.
///
/// All engine instances share one lazily-initialized device context; each instance owns
/// its own texture and program registries, so operators holding separate engines never
/// observe each other's resources. `f32` textures are `R32Float` (storage-capable for
/// program outputs), index maps are `R32Sint`. Texture reads go through a staging buffer
/// with wgpu's 256-byte row alignment and block until the copy completes, which keeps
/// the whole engine synchronous from the caller's point of view.
pub struct WgpuEngine {
    context: Arc<WgpuContext>,
    textures: AHashMap<TextureId, TextureSlot>,
    programs: AHashMap<ProgramId, ProgramSlot>,
    next_texture: u32,
    next_program: u32,
}

impl WgpuEngine {
    /// Acquires the shared device context, failing when no GPU adapter is available.
    pub fn try_new() -> Result<Self, EngineError> {
        Ok(WgpuEngine {
            context: context()?,
            textures: AHashMap::new(),
            programs: AHashMap::new(),
            next_texture: 0,
            next_program: 0,
        })
    }

    /// Human-readable description of the adapter behind this engine.
    pub fn adapter_name(&self) -> String {
        format!(
            "{} ({:?})",
            self.context.adapter_info.name, self.context.adapter_info.backend
        )
    }

    fn slot(&self, texture: TextureId) -> Result<&TextureSlot, EngineError> {
        self.textures.get(&texture).ok_or_else(|| {
            EngineError::InvalidResource(format!("unknown texture id {:?}", texture))
        })
    }
}

impl TextureEngine for WgpuEngine {
    fn compile(&mut self, name: &str, source: &str) -> Result<ProgramId, EngineError> {
        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(name),
            layout: None,
            module: &module,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(EngineError::CompileError(format!("{}: {}", name, error)));
        }
        let id = ProgramId::new(self.next_program);
        self.next_program += 1;
        self.programs.insert(id, ProgramSlot { pipeline });
        Ok(id)
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureId, EngineError> {
        let (format, usage) = match desc.format {
            TexelFormat::F32 => (
                wgpu::TextureFormat::R32Float,
                wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::COPY_SRC,
            ),
            TexelFormat::I32 => (
                wgpu::TextureFormat::R32Sint,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            ),
        };
        let texture = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("texpad texture"),
            size: wgpu::Extent3d {
                width: desc.cols as u32,
                height: desc.rows as u32,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let id = TextureId::new(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, TextureSlot { texture, desc });
        Ok(id)
    }

    fn write_texture(
        &mut self,
        texture: TextureId,
        data: TexelData<'_>,
    ) -> Result<(), EngineError> {
        let slot = self.slot(texture)?;
        let (bytes, format): (&[u8], TexelFormat) = match data {
            TexelData::F32(texels) => (bytemuck::cast_slice(texels), TexelFormat::F32),
            TexelData::I32(texels) => (bytemuck::cast_slice(texels), TexelFormat::I32),
        };
        if format != slot.desc.format || bytes.len() != slot.desc.rows * slot.desc.cols * 4 {
            return Err(EngineError::InvalidResource(
                "texture write does not match the texture's format and texel count".to_string(),
            ));
        }
        self.context.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &slot.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some((slot.desc.cols * 4) as u32),
                rows_per_image: Some(slot.desc.rows as u32),
            },
            wgpu::Extent3d {
                width: slot.desc.cols as u32,
                height: slot.desc.rows as u32,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn run(
        &mut self,
        program: ProgramId,
        inputs: &[(&str, TextureId)],
        output: TextureId,
        uniforms: &[(&str, Uniform)],
    ) -> Result<(), EngineError> {
        let pipeline = &self
            .programs
            .get(&program)
            .ok_or_else(|| {
                EngineError::InvalidResource(format!("unknown program id {:?}", program))
            })?
            .pipeline;
        let device = &self.context.device;

        let mut input_views = Vec::with_capacity(inputs.len());
        for (_, id) in inputs {
            input_views.push(
                self.slot(*id)?
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default()),
            );
        }
        let out_slot = self.slot(output)?;
        let out_desc = out_slot.desc;
        let out_view = out_slot
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Positional binding convention: inputs, then output, then the uniform struct.
        let uniform_buffer = (!uniforms.is_empty()).then(|| {
            let mut words: Vec<u32> = uniforms.iter().map(|(_, value)| value.to_bits()).collect();
            while words.len() % 4 != 0 {
                words.push(0);
            }
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("texpad uniforms"),
                contents: bytemuck::cast_slice(&words),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });
        let mut entries = Vec::with_capacity(inputs.len() + 2);
        for (binding, view) in input_views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: inputs.len() as u32,
            resource: wgpu::BindingResource::TextureView(&out_view),
        });
        if let Some(ref buffer) = uniform_buffer {
            entries.push(wgpu::BindGroupEntry {
                binding: (inputs.len() + 1) as u32,
                resource: buffer.as_entire_binding(),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texpad bind group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texpad dispatch"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("texpad pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                (out_desc.cols as u32).div_ceil(WORKGROUP_DIM),
                (out_desc.rows as u32).div_ceil(WORKGROUP_DIM),
                1,
            );
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_texture(&mut self, texture: TextureId) -> Result<Vec<f32>, EngineError> {
        let slot = self.slot(texture)?;
        if slot.desc.format != TexelFormat::F32 {
            return Err(EngineError::Unsupported(
                "integer textures do not support readback".to_string(),
            ));
        }
        let (rows, cols) = (slot.desc.rows, slot.desc.cols);
        let unpadded_row = cols * 4;
        let padded_row = unpadded_row.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT;
        let device = &self.context.device;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("texpad readback"),
            size: (padded_row * rows) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texpad readback copy"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &slot.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row as u32),
                    rows_per_image: Some(rows as u32),
                },
            },
            wgpu::Extent3d {
                width: cols as u32,
                height: rows as u32,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| {
                EngineError::InvalidResource("readback completion channel closed".to_string())
            })?
            .map_err(|e| EngineError::InvalidResource(format!("readback mapping failed: {}", e)))?;

        let mapped = buffer_slice.get_mapped_range();
        let mut texels = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let start = row * padded_row;
            texels.extend_from_slice(bytemuck::cast_slice(&mapped[start..start + unpadded_row]));
        }
        drop(mapped);
        staging.unmap();
        Ok(texels)
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }
}
