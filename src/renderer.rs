use log::{info, warn};
use tracer_shared::{Camera, Scene};

use crate::buffers::BufferManager;
use crate::compute::ComputeRenderer;
use crate::error::RenderError;
use crate::program::{Programs, RAYTRACED_FORMAT};

/// Which GPU path produces the image
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Compute shader into a storage texture, then a blit
    Compute,
    /// Ray tracing in the fragment shader of a fullscreen triangle
    Fragment,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Compute => RenderMode::Fragment,
            RenderMode::Fragment => RenderMode::Compute,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Compute => "Compute",
            RenderMode::Fragment => "Fragment",
        }
    }
}

/// GPU resources and rendering pipelines
pub struct RenderState {
    pub surface: wgpu::Surface,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub mode: RenderMode,
    pub compute_supported: bool,
    pub programs: Programs,
    pub buffers: BufferManager,

    // Compute output and its consumers
    pub raytraced_texture: wgpu::Texture,
    pub sampler: wgpu::Sampler,
    pub compute_bind_group: Option<wgpu::BindGroup>,
    pub display_bind_group: wgpu::BindGroup,
    pub fragment_bind_group: wgpu::BindGroup,
}

/// Frame statistics
pub struct PerformanceState {
    pub start_time: std::time::Instant,
    pub frame_count: u64,
}

impl PerformanceState {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            frame_count: 0,
        }
    }

    /// Count a frame; returns the average FPS every `interval` frames
    pub fn tick(&mut self, interval: u64) -> Option<f32> {
        self.frame_count += 1;
        if interval == 0 || self.frame_count % interval != 0 {
            return None;
        }
        let elapsed = self.start_time.elapsed().as_secs_f32();
        Some(self.frame_count as f32 / elapsed.max(f32::EPSILON))
    }
}

pub fn create_raytraced_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Raytraced Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: RAYTRACED_FORMAT,
        usage,
        view_formats: &[],
    })
}

pub fn create_fragment_bind_group(
    device: &wgpu::Device,
    programs: &Programs,
    buffers: &BufferManager,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Fragment Bind Group"),
        layout: &programs.fragment_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffers.frame_buffer.as_entire_binding(),
        }],
    })
}

/// Draw the fullscreen triangle with `pipeline` into `view`
pub fn encode_fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: true,
            },
        })],
        depth_stencil_attachment: None,
    });

    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, bind_group, &[]);
    render_pass.draw(0..3, 0..1); // Draw fullscreen triangle
}

impl RenderState {
    pub async fn new(window: &winit::window::Window, requested_mode: RenderMode) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // The window outlives the surface: both live until the event loop exits
        let surface = unsafe { instance.create_surface(window) }?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        info!("Using adapter {} ({:?})", info.name, info.backend);

        let compute_supported = adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS);
        let mode = if requested_mode == RenderMode::Compute && !compute_supported {
            warn!("Compute shaders not supported, using fragment shader mode");
            RenderMode::Fragment
        } else {
            requested_mode
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders apply gamma themselves, so avoid a second sRGB encode
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        info!("Surface format {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let programs = Programs::new(&device, surface_format, compute_supported)?;
        let buffers = BufferManager::new(&device);

        let raytraced_texture = create_raytraced_texture(
            &device,
            config.width,
            config.height,
            Self::raytraced_usage(compute_supported),
        );

        // Texture and surface have the same size, so nearest sampling is an exact copy
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let fragment_bind_group = create_fragment_bind_group(&device, &programs, &buffers);
        let (compute_bind_group, display_bind_group) =
            Self::create_texture_bind_groups(&device, &programs, &buffers, &raytraced_texture, &sampler);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            mode,
            compute_supported,
            programs,
            buffers,
            raytraced_texture,
            sampler,
            compute_bind_group,
            display_bind_group,
            fragment_bind_group,
        })
    }

    fn raytraced_usage(compute_supported: bool) -> wgpu::TextureUsages {
        if compute_supported {
            wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING
        } else {
            wgpu::TextureUsages::TEXTURE_BINDING
        }
    }

    fn create_texture_bind_groups(
        device: &wgpu::Device,
        programs: &Programs,
        buffers: &BufferManager,
        texture: &wgpu::Texture,
        sampler: &wgpu::Sampler,
    ) -> (Option<wgpu::BindGroup>, wgpu::BindGroup) {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let compute_bind_group = programs.compute_pipeline.as_ref().map(|_| {
            ComputeRenderer::create_bind_group(
                device,
                &programs.compute_bind_group_layout,
                &buffers.frame_buffer,
                &view,
            )
        });

        let display_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Display Bind Group"),
            layout: &programs.display_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        (compute_bind_group, display_bind_group)
    }

    /// Reconfigure the surface and reallocate the compute output.
    /// Zero-sized requests (minimized window) are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.raytraced_texture = create_raytraced_texture(
            &self.device,
            new_size.width,
            new_size.height,
            Self::raytraced_usage(self.compute_supported),
        );
        self.recreate_bind_groups();
    }

    fn recreate_bind_groups(&mut self) {
        let (compute_bind_group, display_bind_group) = Self::create_texture_bind_groups(
            &self.device,
            &self.programs,
            &self.buffers,
            &self.raytraced_texture,
            &self.sampler,
        );
        self.compute_bind_group = compute_bind_group;
        self.display_bind_group = display_bind_group;
    }

    /// Switch between compute and fragment paths. Returns the active mode.
    pub fn toggle_mode(&mut self) -> RenderMode {
        let next = self.mode.toggled();
        if next == RenderMode::Compute && !self.compute_supported {
            warn!("Compute shaders not supported, staying in fragment shader mode");
        } else {
            self.mode = next;
        }
        self.mode
    }

    /// Upload the frame snapshot and draw it with the active path
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        self.buffers
            .update_frame(&self.queue, scene, camera, self.config.width, self.config.height);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        match (self.mode, &self.programs.compute_pipeline, &self.compute_bind_group) {
            (RenderMode::Compute, Some(pipeline), Some(bind_group)) => {
                ComputeRenderer::encode_compute_pass(
                    &mut encoder,
                    pipeline,
                    bind_group,
                    self.config.width,
                    self.config.height,
                );
                encode_fullscreen_pass(
                    &mut encoder,
                    &view,
                    &self.programs.display_pipeline,
                    &self.display_bind_group,
                );
            }
            _ => {
                encode_fullscreen_pass(
                    &mut encoder,
                    &view,
                    &self.programs.fragment_pipeline,
                    &self.fragment_bind_group,
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_toggle() {
        assert_eq!(RenderMode::Compute.toggled(), RenderMode::Fragment);
        assert_eq!(RenderMode::Fragment.toggled(), RenderMode::Compute);
        assert_eq!(RenderMode::Compute.label(), "Compute");
    }

    #[test]
    fn test_performance_tick_interval() {
        let mut perf = PerformanceState::new();
        assert_eq!(perf.tick(3), None);
        assert_eq!(perf.tick(3), None);
        assert!(perf.tick(3).is_some());
        assert_eq!(perf.frame_count, 3);
    }
}
