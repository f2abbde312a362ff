use tracer_shared::RaytracerConfig;

/// Compute shader dispatch for the ray tracer
pub struct ComputeRenderer;

impl ComputeRenderer {
    /// Workgroups needed to cover a `width` x `height` image
    pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
        let (group_x, group_y) = RaytracerConfig::WORKGROUP_SIZE;
        ((width + group_x - 1) / group_x, (height + group_y - 1) / group_y)
    }

    /// Record one full-image dispatch.
    ///
    /// Anything recorded after this on the same encoder sees the storage
    /// texture writes; wgpu places the barrier when the pass ends.
    pub fn encode_compute_pass(
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        width: u32,
        height: u32,
    ) {
        let (workgroups_x, workgroups_y) = Self::workgroup_count(width, height);

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Raytrace Compute Pass"),
        });
        compute_pass.set_pipeline(pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        compute_pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
    }

    pub fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        frame_buffer: &wgpu::Buffer,
        output_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compute Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
            ],
        })
    }
}
