use sketch_common::HostSize;
use sketch_render::{ColorSpace, RenderError, RendererOptions};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// `HostSize::physical`, clamped to `[1, max_dimension]` per axis so it is a
/// valid surface size.
pub(crate) fn physical_size(size: HostSize, max_dimension: u32) -> (u32, u32) {
    let (width, height) = size.physical();
    let max = max_dimension.max(1);
    (width.clamp(1, max), height.clamp(1, max))
}

/// Device, queue and window surface, plus the per-size render targets
/// (multisampled color when antialiasing, depth).
pub(crate) struct SurfaceContext {
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    msaa: Option<wgpu::TextureView>,
    depth: wgpu::TextureView,
}

impl SurfaceContext {
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: &RendererOptions,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Device(format!("create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Device("no adapter compatible with the surface".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("sketch_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(format!("request device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let want_srgb = options.output == ColorSpace::Srgb;
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb() == want_srgb)
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Device("surface reported no supported formats".into()))?;

        let sample_count = if options.antialias
            && adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(4)
        {
            4
        } else {
            1
        };

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = physical_size(HostSize::new(width, height, 1.0), max_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let msaa = Self::create_msaa(&device, &config, sample_count);
        let depth = Self::create_depth(&device, &config, sample_count);

        tracing::info!(
            "GPU initialized with {} backend ({:?}, {}x MSAA)",
            adapter.get_info().backend.to_str(),
            format,
            sample_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
            msaa,
            depth,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Resize the drawing buffer (physical pixels) and its render targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.size() {
            return;
        }
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.reconfigure();
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.msaa = Self::create_msaa(&self.device, &self.config, self.sample_count);
        self.depth = Self::create_depth(&self.device, &self.config, self.sample_count);
    }

    /// Acquire the next frame. `Ok(None)` means the frame should be skipped.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated; reconfiguring");
                self.reconfigure();
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timed out; skipping frame");
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(e) => Err(RenderError::Surface(e.to_string())),
        }
    }

    /// The color view to draw into and the view to resolve to, if multisampled.
    pub fn color_targets<'a>(
        &'a self,
        frame_view: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa {
            Some(msaa) => (msaa, Some(frame_view)),
            None => (frame_view, None),
        }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    fn create_msaa(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_color"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }

    fn create_depth(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_by_ratio() {
        assert_eq!(physical_size(HostSize::new(800, 600, 2.0), 8192), (1600, 1200));
        assert_eq!(physical_size(HostSize::new(801, 601, 1.5), 8192), (1202, 902));
    }

    #[test]
    fn physical_size_is_clamped() {
        assert_eq!(physical_size(HostSize::new(0, 0, 1.0), 8192), (1, 1));
        assert_eq!(physical_size(HostSize::new(5000, 100, 2.0), 8192), (8192, 200));
    }

    #[test]
    fn physical_size_agrees_with_host_size() {
        for size in [
            HostSize::new(1024, 768, 3.0),
            HostSize::new(333, 101, 1.25),
            HostSize::new(640, 480, f32::NAN),
        ] {
            assert_eq!(physical_size(size, 16384), size.physical());
        }
        assert_eq!(physical_size(HostSize::new(800, 600, 3.0), 8192), (1600, 1200));
    }
}
