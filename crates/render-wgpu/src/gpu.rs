use crate::context::{SurfaceContext, physical_size};
use crate::pipelines::{NormalPipeline, NormalUniforms, ShaderPipeline, StageUniformBlock, Vertex};
use glam::Mat4;
use sketch_common::HostSize;
use sketch_render::{
    Camera, ColorSpace, Geometry, Material, Mesh, RenderError, Renderer, RendererOptions, Scene,
    ShaderMaterial, Texture,
};
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// sRGB transfer function inverse, for clear colors given in sRGB.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Clear color as the GPU expects it for the chosen output encoding.
fn clear_color(options: &RendererOptions, surface_is_srgb: bool) -> wgpu::Color {
    let [r, g, b, a] = options.clear_color;
    let convert = options.output == ColorSpace::Srgb && surface_is_srgb;
    let channel = |c: f64| if convert { srgb_to_linear(c) } else { c };
    wgpu::Color {
        r: channel(r),
        g: channel(g),
        b: channel(b),
        a,
    }
}

enum SlotKind {
    Normal,
    Shader {
        pipeline: usize,
        matcap: Arc<Texture>,
    },
}

/// GPU resources backing one scene mesh.
struct MeshSlot {
    geometry: Geometry,
    kind: SlotKind,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MeshSlot {
    fn matches(&self, mesh: &Mesh, pipeline: Option<usize>) -> bool {
        if self.geometry != mesh.geometry {
            return false;
        }
        match (&self.kind, &mesh.material, pipeline) {
            (SlotKind::Normal, Material::Normal, None) => true,
            (SlotKind::Shader { pipeline: a, matcap }, Material::Shader(material), Some(b)) => {
                *a == b && Arc::ptr_eq(matcap, &material.matcap)
            }
            _ => false,
        }
    }
}

/// wgpu-based render surface.
///
/// Meshes with `Material::Normal` share one pipeline; each distinct shader
/// program gets its own pipeline, compiled the first time a scene uses it.
pub struct WgpuRenderer {
    context: SurfaceContext,
    options: RendererOptions,
    clear: wgpu::Color,
    /// Logical size plus the pixel ratio last set by the controller.
    host: HostSize,
    normal: NormalPipeline,
    shader_pipelines: Vec<ShaderPipeline>,
    slots: Vec<MeshSlot>,
}

impl WgpuRenderer {
    /// Create a renderer drawing to `target` (typically an `Arc<Window>`),
    /// sized to `width` x `height` logical pixels at pixel ratio 1.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: &RendererOptions,
    ) -> Result<Self, RenderError> {
        let context = SurfaceContext::new(target, width, height, options).await?;
        let normal = NormalPipeline::new(&context.device, context.format(), context.sample_count());
        let clear = clear_color(options, context.format().is_srgb());

        Ok(Self {
            context,
            options: *options,
            clear,
            host: HostSize::new(width, height, 1.0),
            normal,
            shader_pipelines: Vec::new(),
            slots: Vec::new(),
        })
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    fn apply_size(&mut self) {
        if self.host.is_empty() {
            return;
        }
        let (width, height) = physical_size(self.host, self.context.max_dimension());
        self.context.resize(width, height);
    }

    fn shader_pipeline_for(&mut self, material: &ShaderMaterial) -> Result<usize, RenderError> {
        if let Some(index) = self
            .shader_pipelines
            .iter()
            .position(|p| p.matches(&material.shaders, material.side))
        {
            return Ok(index);
        }
        let pipeline = ShaderPipeline::new(
            &self.context.device,
            self.context.format(),
            self.context.sample_count(),
            &material.shaders,
            material.side,
        )?;
        self.shader_pipelines.push(pipeline);
        Ok(self.shader_pipelines.len() - 1)
    }

    fn create_slot(&self, mesh: &Mesh, pipeline: Option<usize>) -> MeshSlot {
        let device = &self.context.device;
        let data = mesh.geometry.build();
        let vertices: Vec<Vertex> = data.vertices.iter().map(Vertex::from).collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (kind, uniform_buffer, bind_group) = match (&mesh.material, pipeline) {
            (Material::Shader(material), Some(index)) => {
                let pipeline = &self.shader_pipelines[index];
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("stage_uniform_buffer"),
                    size: std::mem::size_of::<StageUniformBlock>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let matcap_view = self.upload_texture(&material.matcap);
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("stage_bind_group"),
                    layout: &pipeline.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&matcap_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
                        },
                    ],
                });
                let kind = SlotKind::Shader {
                    pipeline: index,
                    matcap: Arc::clone(&material.matcap),
                };
                (kind, uniform_buffer, bind_group)
            }
            _ => {
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("normal_uniform_buffer"),
                    size: std::mem::size_of::<NormalUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("normal_bind_group"),
                    layout: &self.normal.bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                (SlotKind::Normal, uniform_buffer, bind_group)
            }
        };

        tracing::debug!("uploaded mesh `{}` ({})", mesh.name, mesh.geometry);

        MeshSlot {
            geometry: mesh.geometry,
            kind,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    fn upload_texture(&self, texture: &Texture) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        };
        let gpu_texture = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("matcap_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texture.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width),
                rows_per_image: Some(texture.height),
            },
            size,
        );
        gpu_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Make sure every scene mesh has GPU resources and upload this frame's uniforms.
    fn prepare(&mut self, scene: &Scene, camera: &dyn Camera) -> Result<(), RenderError> {
        let view_proj = camera.view_projection();
        let view = camera.view_matrix();

        self.slots.truncate(scene.len());
        for (i, mesh) in scene.meshes().iter().enumerate() {
            let pipeline = match &mesh.material {
                Material::Normal => None,
                Material::Shader(material) => Some(self.shader_pipeline_for(material)?),
            };

            if !self.slots.get(i).is_some_and(|slot| slot.matches(mesh, pipeline)) {
                let slot = self.create_slot(mesh, pipeline);
                if i < self.slots.len() {
                    self.slots[i] = slot;
                } else {
                    self.slots.push(slot);
                }
            }

            let model = mesh.model_matrix();
            let slot = &self.slots[i];
            match &mesh.material {
                Material::Normal => self.write_normal_uniforms(slot, view_proj, view, model),
                Material::Shader(material) => {
                    self.write_stage_uniforms(slot, view_proj, model, material)
                }
            }
        }
        Ok(())
    }

    fn write_normal_uniforms(&self, slot: &MeshSlot, view_proj: Mat4, view: Mat4, model: Mat4) {
        let block = NormalUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        };
        self.context
            .queue
            .write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&block));
    }

    fn write_stage_uniforms(
        &self,
        slot: &MeshSlot,
        view_proj: Mat4,
        model: Mat4,
        material: &ShaderMaterial,
    ) {
        let u = &material.uniforms;
        let block = StageUniformBlock {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            resolution: u.resolution.to_array(),
            mouse: u.mouse.to_array(),
            time: u.time,
            _pad: 0.0,
        };
        self.context
            .queue
            .write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&block));
    }
}

impl Renderer for WgpuRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.host.width = width;
        self.host.height = height;
        self.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.host.device_pixel_ratio = ratio;
        self.apply_size();
    }

    /// Render one frame: every scene mesh, in scene order.
    fn render(&mut self, scene: &Scene, camera: &dyn Camera) -> Result<(), RenderError> {
        if self.host.is_empty() {
            return Ok(());
        }

        self.prepare(scene, camera)?;

        let Some(frame) = self.context.acquire()? else {
            return Ok(());
        };
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let (target, resolve_target) = self.context.color_targets(&frame_view);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.context.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for slot in &self.slots {
                let pipeline = match &slot.kind {
                    SlotKind::Normal => &self.normal.pipeline,
                    SlotKind::Shader { pipeline, .. } => &self.shader_pipelines[*pipeline].pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, slot.vertex_buffer.slice(..));
                pass.set_index_buffer(slot.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..slot.index_count, 0, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-12);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn clear_color_converted_only_for_srgb_surfaces() {
        let options = RendererOptions {
            clear_color: [0.5, 0.5, 0.5, 0.5],
            ..RendererOptions::default()
        };
        let on_srgb = clear_color(&options, true);
        assert!((on_srgb.r - 0.214).abs() < 1e-3);
        assert_eq!(on_srgb.a, 0.5);

        let on_linear = clear_color(&options, false);
        assert_eq!(on_linear.r, 0.5);

        let linear_output = RendererOptions {
            output: ColorSpace::Linear,
            ..options
        };
        assert_eq!(clear_color(&linear_output, true).g, 0.5);
    }
}
