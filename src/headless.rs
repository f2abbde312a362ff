use log::{info, warn};
use tracer_shared::{quantize, Camera, Scene};

use crate::buffers::BufferManager;
use crate::compute::ComputeRenderer;
use crate::error::RenderError;
use crate::program::{Programs, RAYTRACED_FORMAT};
use crate::renderer::{create_fragment_bind_group, create_raytraced_texture, encode_fullscreen_pass, RenderMode};

const BYTES_PER_PIXEL: u32 = 4 * std::mem::size_of::<f32>() as u32;

/// Row pitch of the read-back buffer; copies require 256-byte aligned rows
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded + align - 1) / align * align
}

/// Reject sizes wgpu cannot allocate a texture for
fn check_size(width: u32, height: u32, max: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(RenderError::InvalidSize { width, height, max });
    }
    Ok(())
}

/// GPU renderer without a window, reading frames back to host memory
pub struct OffscreenRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    programs: Programs,
    buffers: BufferManager,
    pub compute_supported: bool,
}

impl OffscreenRenderer {
    pub async fn new() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        info!("Using adapter {} ({:?}) off-screen", info.name, info.backend);

        let compute_supported = adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Offscreen Device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let programs = Programs::new(&device, RAYTRACED_FORMAT, compute_supported)?;
        let buffers = BufferManager::new(&device);

        Ok(Self {
            device,
            queue,
            programs,
            buffers,
            compute_supported,
        })
    }

    /// Render one frame and return RGBA float pixels, rows top to bottom.
    /// Compute mode falls back to the fragment path when unsupported.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &Camera,
        width: u32,
        height: u32,
        mode: RenderMode,
    ) -> Result<Vec<f32>, RenderError> {
        check_size(width, height, self.device.limits().max_texture_dimension_2d)?;
        BufferManager::check_scene(scene)?;
        self.buffers.update_frame(&self.queue, scene, camera, width, height);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC;
        if self.compute_supported {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        let target = create_raytraced_texture(&self.device, width, height, usage);
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row = padded_bytes_per_row(width);
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });

        match (mode, &self.programs.compute_pipeline) {
            (RenderMode::Compute, Some(pipeline)) => {
                let bind_group = ComputeRenderer::create_bind_group(
                    &self.device,
                    &self.programs.compute_bind_group_layout,
                    &self.buffers.frame_buffer,
                    &view,
                );
                ComputeRenderer::encode_compute_pass(&mut encoder, pipeline, &bind_group, width, height);
            }
            (mode, _) => {
                if mode == RenderMode::Compute {
                    warn!("Compute shaders not supported, rendering with the fragment shader");
                }
                let bind_group = create_fragment_bind_group(&self.device, &self.programs, &self.buffers);
                encode_fullscreen_pass(&mut encoder, &view, &self.programs.fragment_pipeline, &bind_group);
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| RenderError::ReadBack(wgpu::BufferAsyncError))??;

        let row_bytes = (width * BYTES_PER_PIXEL) as usize;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded_row as usize) {
                pixels.extend_from_slice(bytemuck::cast_slice::<u8, f32>(&row[..row_bytes]));
            }
        }
        readback.unmap();

        Ok(pixels)
    }

    /// Render and quantize to packed RGB bytes the way the CPU path does
    pub fn render_rgb8(
        &self,
        scene: &Scene,
        camera: &Camera,
        width: u32,
        height: u32,
        mode: RenderMode,
    ) -> Result<Vec<u8>, RenderError> {
        let rgba = self.render(scene, camera, width, height, mode)?;
        Ok(rgba_to_rgb8(&rgba))
    }
}

pub fn rgba_to_rgb8(rgba: &[f32]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [quantize(px[0]), quantize(px[1]), quantize(px[2])])
        .collect()
}
