//! The sandbox: the surface an embedding host drives once per frame.
//!
//! All mutable state lives in one [`Sandbox`] owned by the host. The host
//! calls [`update`](Sandbox::update) with a timestamp, then
//! [`render`](Sandbox::render) with a target view; shader slots, camera
//! matrices and controller poses are set through explicit setters between
//! frames. Everything runs synchronously on the calling thread.

use glam::{Mat4, Quat, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::clock::FrameClock;
use crate::diag::SharedErrorLog;
use crate::error::SandboxError;
use crate::gpu::{self, ring::StateRing, BindGroupLayouts, BlendMode, ParticleInstances, Pipelines};
use crate::pragma::PipelineConfig;
use crate::suite::{CompiledPrograms, ShaderSuite, Stage, UserSlot};
use crate::uniforms::{CommonUniforms, ControllerPose, CONTROLLER_COUNT};

/// Construction-time sandbox parameters.
///
/// Blend mode and clear color are fixed for the sandbox's lifetime; only
/// shader source and the pragma-driven grid change at runtime.
#[derive(Debug, Clone, Copy)]
pub struct SandboxConfig {
    /// Format of the target the shade pass draws into.
    pub target_format: wgpu::TextureFormat,
    /// How shaded particles combine with the framebuffer.
    pub blend_mode: BlendMode,
    /// Shade pass clear color.
    pub clear_color: wgpu::Color,
}

impl SandboxConfig {
    pub fn new(target_format: wgpu::TextureFormat) -> Self {
        Self {
            target_format,
            ..Self::default()
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            blend_mode: BlendMode::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

struct DepthTarget {
    view: wgpu::TextureView,
    size: [u32; 2],
}

/// A live particle shader sandbox.
pub struct Sandbox {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: SandboxConfig,

    suite: ShaderSuite,
    layouts: BindGroupLayouts,
    pipelines: Pipelines,

    uniforms: CommonUniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    view: Mat4,
    projection: Mat4,
    controllers: [ControllerPose; CONTROLLER_COUNT],

    ring: Option<StateRing>,
    instances: Option<ParticleInstances>,
    depth: Option<DepthTarget>,

    clock: FrameClock,
    errors: SharedErrorLog,
}

impl Sandbox {
    /// One-time setup: split the built-in templates, install and compile the
    /// default shader sources, and allocate the uniform buffer.
    ///
    /// State textures are allocated lazily on first render, once the
    /// pragma-declared grid resolution is known to be final. A default
    /// source that fails to compile is a defect in the crate itself and is
    /// surfaced as an error rather than swallowed.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: SandboxConfig,
    ) -> Result<Self, SandboxError> {
        let errors = SharedErrorLog::new();
        {
            let errors = errors.clone();
            device.on_uncaptured_error(Box::new(move |error| {
                errors.push(format!("uncaptured device error: {error}"));
            }));
        }

        let layouts = gpu::create_bind_group_layouts(device);

        let mut suite = ShaderSuite::new()?;
        let pipelines = {
            let programs = suite.try_compile().map_err(|e| {
                errors.push(e.to_string());
                e
            })?;
            gpu::create_pipelines(
                device,
                &layouts,
                programs,
                config.target_format,
                config.blend_mode,
            )
        };

        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.01, 1000.0);
        let mut uniforms = CommonUniforms::default();
        uniforms.set_view_projection(view, projection);

        let controllers = [
            ControllerPose {
                position: Vec3::new(-0.5, 1.0, 0.0),
                ..Default::default()
            },
            ControllerPose {
                position: Vec3::new(0.5, 1.0, 0.0),
                ..Default::default()
            },
        ];

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Common Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Common Uniform Bind Group"),
            layout: &layouts.uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            config,
            suite,
            layouts,
            pipelines,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            view,
            projection,
            controllers,
            ring: None,
            instances: None,
            depth: None,
            clock: FrameClock::new(),
            errors,
        })
    }

    /// Advance the simulation by one tick using clock-derived frame values.
    pub fn update(&mut self, time_seconds: f64) {
        self.clock.tick(time_seconds);
        self.refresh_tick_uniforms(self.clock.frames(), time_seconds, self.clock.delta());
    }

    /// Advance the simulation by one tick with host-supplied frame values.
    ///
    /// Used by hosts (such as XR runtimes) that own the authoritative frame
    /// id and delta; the internal clock still ticks for fps tracking.
    pub fn update_with(&mut self, frame_id: u32, time_seconds: f64, time_delta_seconds: f64) {
        self.clock.tick(time_seconds);
        self.refresh_tick_uniforms(frame_id, time_seconds, time_delta_seconds);
    }

    fn refresh_tick_uniforms(&mut self, frame_id: u32, time_seconds: f64, time_delta_seconds: f64) {
        for (index, pose) in self.controllers.iter().enumerate() {
            self.uniforms.controller_transform[index] = pose.transform().to_cols_array_2d();
            self.uniforms.controller_velocity[index] = pose.velocity.extend(0.0).to_array();
            self.uniforms.controller_buttons[index] = pose.buttons.to_array();
        }

        let grid = self.pipeline_config().grid_size;
        self.uniforms.grid_size = [grid[0] as i32, grid[1] as i32];
        self.uniforms.time = time_seconds as f32;
        self.uniforms.time_delta = time_delta_seconds as f32;
        self.uniforms.frame = frame_id;
    }

    /// Draw the current frame into `target` at the given viewport size.
    ///
    /// Runs the simulation pass into the next ring slot, then the shade pass
    /// into `target`. State textures are (re)allocated here when the grid
    /// resolution changed since the last frame.
    pub fn render(&mut self, target: &wgpu::TextureView, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let config = self.pipeline_config();
        self.ensure_state_targets(config.grid_size);
        self.ensure_depth_target(width, height);

        self.uniforms.grid_size = [config.grid_size[0] as i32, config.grid_size[1] as i32];
        self.uniforms.resolution = [width as f32, height as f32];
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let (Some(ring), Some(instances), Some(depth)) = (
            self.ring.as_mut(),
            self.instances.as_ref(),
            self.depth.as_ref(),
        ) else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Sandbox Encoder"),
            });

        // Simulation pass: rotate the ring, then write every particle's next
        // state. The attachments span exactly the particle grid, so the
        // fullscreen triangle touches each texel once.
        ring.advance();
        {
            let write_views = ring.write_views();
            let color_attachments: [Option<wgpu::RenderPassColorAttachment>; gpu::STATE_CHANNELS] =
                std::array::from_fn(|channel| {
                    Some(wgpu::RenderPassColorAttachment {
                        view: &write_views[channel],
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })
                });

            let mut simulate_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Simulation Pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            simulate_pass.set_pipeline(&self.pipelines.simulate);
            simulate_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            simulate_pass.set_bind_group(1, ring.simulation_inputs(), &[]);
            simulate_pass.draw(0..3, 0..1);
        }

        // Shade pass: one instance per particle from the freshly written state.
        {
            let mut shade_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shade Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            shade_pass.set_pipeline(&self.pipelines.shade);
            shade_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            shade_pass.set_bind_group(1, ring.shade_inputs(), &[]);
            shade_pass.set_vertex_buffer(0, instances.buffer.slice(..));
            shade_pass.draw(0..config.vertex_count, 0..instances.count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Current text of a user shader slot.
    pub fn user_source(&self, slot: UserSlot) -> &str {
        self.suite.user_source(slot)
    }

    /// Replace a user shader slot.
    ///
    /// Reassembles the affected module sources immediately; call
    /// [`try_compile`](Self::try_compile) to build programs from them.
    pub fn set_user_source(&mut self, slot: UserSlot, source: impl Into<String>) {
        self.suite.set_user_source(slot, source);
    }

    /// The assembled module source for a stage, for host-side display.
    pub fn assembled_source(&self, stage: Stage) -> &str {
        self.suite.assembled_source(stage)
    }

    /// Validate the current sources and swap in new pipelines.
    ///
    /// On failure the error lands in the error log and the previous
    /// pipelines keep serving; nothing is partially replaced.
    pub fn try_compile(&mut self) -> Result<(), SandboxError> {
        let programs = match self.suite.try_compile() {
            Ok(programs) => programs,
            Err(e) => {
                self.errors.push(e.to_string());
                return Err(e.into());
            }
        };

        self.pipelines = gpu::create_pipelines(
            &self.device,
            &self.layouts,
            programs,
            self.config.target_format,
            self.config.blend_mode,
        );
        Ok(())
    }

    /// The last successfully compiled program set, with reflection tables.
    pub fn compiled_programs(&self) -> Option<&CompiledPrograms> {
        self.suite.compiled()
    }

    /// The pragma-configured pipeline parameters currently in effect.
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.suite.compiled().map(|c| c.config).unwrap_or_default()
    }

    /// Set the view matrix from a column-major 16-element array.
    pub fn set_view_matrix(&mut self, values: &[f32; 16]) {
        self.view = Mat4::from_cols_array(values);
        self.uniforms.set_view_projection(self.view, self.projection);
    }

    /// Set the projection matrix from a column-major 16-element array.
    pub fn set_projection_matrix(&mut self, values: &[f32; 16]) {
        self.projection = Mat4::from_cols_array(values);
        self.uniforms.set_view_projection(self.view, self.projection);
    }

    /// Set both camera matrices at once.
    pub fn set_view_and_projection(&mut self, view: &[f32; 16], projection: &[f32; 16]) {
        self.view = Mat4::from_cols_array(view);
        self.projection = Mat4::from_cols_array(projection);
        self.uniforms.set_view_projection(self.view, self.projection);
    }

    /// Supply one tracked controller's pose; consumed into the uniform block
    /// on the next tick. Orientation is an `xyzw` quaternion.
    pub fn set_controller(
        &mut self,
        index: usize,
        position: [f32; 3],
        velocity: [f32; 3],
        orientation: [f32; 4],
        buttons: [f32; 4],
    ) {
        assert!(index < CONTROLLER_COUNT, "controller index out of range");
        self.controllers[index] = ControllerPose {
            position: Vec3::from_array(position),
            velocity: Vec3::from_array(velocity),
            orientation: Quat::from_array(orientation),
            buttons: Vec4::from_array(buttons),
        };
    }

    /// Average frame rate over the most recent completed one-second window.
    pub fn average_fps(&self) -> f64 {
        self.clock.average_fps()
    }

    /// Seconds since the first tick.
    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Seconds between the last two ticks.
    pub fn delta_seconds(&self) -> f64 {
        self.clock.delta()
    }

    /// Ticks completed so far.
    pub fn frame_count(&self) -> u32 {
        self.clock.frames()
    }

    /// Snapshot of the bounded error log, oldest entry first.
    pub fn error_log(&self) -> Vec<String> {
        self.errors.snapshot()
    }

    pub fn clear_error_log(&self) {
        self.errors.clear();
    }

    fn ensure_state_targets(&mut self, grid_size: [u32; 2]) {
        let stale = self
            .ring
            .as_ref()
            .map(|ring| ring.grid_size() != grid_size)
            .unwrap_or(true);
        if stale {
            tracing::debug!(
                "allocating particle state ring at {}x{}",
                grid_size[0],
                grid_size[1]
            );
            self.ring = Some(StateRing::new(&self.device, &self.layouts.state, grid_size));
            self.instances = Some(gpu::create_instance_texcoords(&self.device, grid_size));
        }
    }

    fn ensure_depth_target(&mut self, width: u32, height: u32) {
        let stale = self
            .depth
            .as_ref()
            .map(|depth| depth.size != [width, height])
            .unwrap_or(true);
        if stale {
            self.depth = Some(DepthTarget {
                view: gpu::create_depth_texture(&self.device, width, height),
                size: [width, height],
            });
        }
    }
}
