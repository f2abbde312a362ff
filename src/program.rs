use crate::error::RenderError;

const COMMON_SOURCE: &str = include_str!("../shaders/raytrace_common.wgsl");
const FRAGMENT_SOURCE: &str = include_str!("../shaders/raytrace_fragment.wgsl");
const COMPUTE_SOURCE: &str = include_str!("../shaders/raytrace_compute.wgsl");
const DISPLAY_SOURCE: &str = include_str!("../shaders/display.wgsl");

/// Format of the compute output and of off-screen targets
pub const RAYTRACED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Shader stages, named the way they appear in compile errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Display,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Display => "display",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }

    /// Full WGSL for the stage; the ray tracing stages get the common code prepended
    pub fn source(self) -> String {
        match self {
            ShaderStage::Display => DISPLAY_SOURCE.to_string(),
            ShaderStage::Fragment => [COMMON_SOURCE, FRAGMENT_SOURCE].join("\n"),
            ShaderStage::Compute => [COMMON_SOURCE, COMPUTE_SOURCE].join("\n"),
        }
    }
}

/// Run `create` inside a validation error scope and return the first error, if any.
fn with_validation_scope<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

/// Full diagnostic text of a captured error
fn error_log(err: wgpu::Error) -> String {
    match err {
        wgpu::Error::Validation { description, .. } => description,
        other => other.to_string(),
    }
}

/// Compile one stage; validation failures become [`RenderError::ShaderCompile`].
pub fn compile_shader(device: &wgpu::Device, stage: ShaderStage) -> Result<wgpu::ShaderModule, RenderError> {
    let source = stage.source();
    let (module, error) = with_validation_scope(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(stage.name()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    match error {
        Some(err) => Err(RenderError::ShaderCompile {
            stage: stage.name(),
            log: error_log(err),
        }),
        None => Ok(module),
    }
}

/// Create a pipeline; validation failures become [`RenderError::ProgramLink`].
fn link<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, RenderError> {
    let (pipeline, error) = with_validation_scope(device, create);
    match error {
        Some(err) => Err(RenderError::ProgramLink { log: error_log(err) }),
        None => Ok(pipeline),
    }
}

/// Compiled pipelines and their bind group layouts
pub struct Programs {
    pub fragment_pipeline: wgpu::RenderPipeline,
    pub display_pipeline: wgpu::RenderPipeline,
    /// `None` on adapters without compute shader support
    pub compute_pipeline: Option<wgpu::ComputePipeline>,

    pub fragment_bind_group_layout: wgpu::BindGroupLayout,
    pub display_bind_group_layout: wgpu::BindGroupLayout,
    pub compute_bind_group_layout: wgpu::BindGroupLayout,
}

impl Programs {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        compute_supported: bool,
    ) -> Result<Self, RenderError> {
        let fragment_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fragment Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let compute_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Compute Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: RAYTRACED_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        // Rgba32Float is not filterable without an optional feature
        let display_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Display Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let fragment_module = compile_shader(device, ShaderStage::Fragment)?;
        let display_module = compile_shader(device, ShaderStage::Display)?;

        let fragment_pipeline = link(device, || {
            create_fullscreen_pipeline(
                device,
                "Fragment Raytrace Pipeline",
                &fragment_module,
                &fragment_bind_group_layout,
                target_format,
            )
        })?;
        let display_pipeline = link(device, || {
            create_fullscreen_pipeline(
                device,
                "Display Pipeline",
                &display_module,
                &display_bind_group_layout,
                target_format,
            )
        })?;

        let compute_pipeline = if compute_supported {
            let compute_module = compile_shader(device, ShaderStage::Compute)?;
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Compute Pipeline Layout"),
                bind_group_layouts: &[&compute_bind_group_layout],
                push_constant_ranges: &[],
            });
            Some(link(device, || {
                device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Compute Raytrace Pipeline"),
                    layout: Some(&layout),
                    module: &compute_module,
                    entry_point: "cs_main",
                })
            })?)
        } else {
            None
        };

        Ok(Self {
            fragment_pipeline,
            display_pipeline,
            compute_pipeline,
            fragment_bind_group_layout,
            display_bind_group_layout,
            compute_bind_group_layout,
        })
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Render pipeline drawing a single fullscreen triangle with `vs_main`/`fs_main`
fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: "vs_main",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
