mod buffers;
mod cli;
mod compute;
mod error;
mod headless;
mod input;
mod logger;
mod program;
mod renderer;
mod scene;
mod screenshot;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, error, info, warn};
use winit::{
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};
use tracer_shared::RaytracerConfig;

use crate::buffers::BufferManager;
use crate::cli::{Args, HeadlessMode};
use crate::headless::OffscreenRenderer;
use crate::input::InputState;
use crate::renderer::{PerformanceState, RenderMode, RenderState};
use crate::scene::SceneState;

/// Everything the event loop owns
struct App {
    render: RenderState,
    scene: SceneState,
    input: InputState,
    perf: PerformanceState,
    output_dir: PathBuf,
    prefix: String,
}

impl App {
    fn handle_key(&mut self, key: VirtualKeyCode, control_flow: &mut ControlFlow) {
        match key {
            VirtualKeyCode::Space => {
                let mode = self.render.toggle_mode();
                info!("{} shader mode", mode.label());
            }
            VirtualKeyCode::S => self.take_screenshot(),
            VirtualKeyCode::R => {
                self.scene.reset_camera();
                info!("Camera reset");
            }
            VirtualKeyCode::Escape => control_flow.set_exit(),
            _ => {}
        }
    }

    fn take_screenshot(&self) {
        let size = self.render.size;
        if let Err(err) = screenshot::capture(
            &self.scene.scene,
            &self.scene.camera,
            size.width,
            size.height,
            &self.output_dir,
            &self.prefix,
        ) {
            error!("Screenshot failed: {}", err);
        }
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render.resize(size);
        self.scene.set_aspect(size.width, size.height);
    }
}

fn log_controls() {
    info!("Controls:");
    info!("  Left drag  orbit camera");
    info!("  Scroll     zoom");
    info!("  Space      toggle compute/fragment shader");
    info!("  S          save CPU screenshot");
    info!("  R          reset camera");
    info!("  Esc        quit");
}

fn main() {
    let args = Args::parse();
    logger::init_logger(args.log_level.into());

    pollster::block_on(run(args));
}

async fn run(args: Args) {
    if let Some(mode) = args.headless {
        if let Err(err) = run_headless(&args, mode).await {
            error!("{}", err);
            std::process::exit(1);
        }
        return;
    }

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(RaytracerConfig::WINDOW_TITLE)
        .with_inner_size(winit::dpi::PhysicalSize::new(args.width, args.height))
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(err) => {
            error!("Failed to create window: {}", err);
            std::process::exit(1);
        }
    };

    let size = window.inner_size();
    let scene = SceneState::new(size.width.max(1) as f32 / size.height.max(1) as f32);
    if let Err(err) = BufferManager::check_scene(&scene.scene) {
        error!("{}", err);
        std::process::exit(1);
    }

    let render = match RenderState::new(&window, args.mode).await {
        Ok(render) => render,
        Err(err) => {
            error!("Renderer setup failed: {}", err);
            std::process::exit(1);
        }
    };
    info!("{} shader mode", render.mode.label());
    log_controls();

    let mut app = App {
        render,
        scene,
        input: InputState::new(),
        perf: PerformanceState::new(),
        output_dir: args.output_dir,
        prefix: args.prefix,
    };

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::Resized(physical_size) => {
                    app.resize(*physical_size);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.resize(**new_inner_size);
                }
                WindowEvent::KeyboardInput {
                    input: KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                    ..
                } => app.handle_key(*key, control_flow),
                WindowEvent::MouseInput { button, state, .. } => {
                    app.input.handle_mouse_input(*button, *state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if let Some((delta_x, delta_y)) = app.input.handle_cursor_moved(*position) {
                        app.scene.orbit.rotate(delta_x, delta_y);
                        app.scene.update_camera();
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    app.scene.orbit.zoom(InputState::handle_mouse_wheel(*delta));
                    app.scene.update_camera();
                }
                _ => {}
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                match app.render.render(&app.scene.scene, &app.scene.camera) {
                    Ok(()) => {
                        if let Some(fps) = app.perf.tick(RaytracerConfig::PERFORMANCE_STATS_INTERVAL) {
                            debug!("FPS: {:.1} ({} mode)", fps, app.render.mode.label());
                        }
                    }
                    Err(wgpu::SurfaceError::Lost) => app.render.resize(app.render.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("Out of GPU memory");
                        control_flow.set_exit();
                    }
                    Err(e) => warn!("{:?}", e),
                }
            }
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    });
}

async fn run_headless(args: &Args, mode: HeadlessMode) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (args.width, args.height);
    let scene = SceneState::new(width.max(1) as f32 / height.max(1) as f32);

    let paths = match mode {
        HeadlessMode::Cpu => screenshot::capture(
            &scene.scene,
            &scene.camera,
            width,
            height,
            &args.output_dir,
            &args.prefix,
        )?,
        HeadlessMode::Compute | HeadlessMode::Fragment => {
            let render_mode = if mode == HeadlessMode::Compute {
                RenderMode::Compute
            } else {
                RenderMode::Fragment
            };
            let renderer = OffscreenRenderer::new().await?;
            let start = std::time::Instant::now();
            let pixels = renderer.render_rgb8(&scene.scene, &scene.camera, width, height, render_mode)?;
            info!("{} render finished in {:.2?}", render_mode.label(), start.elapsed());
            screenshot::save_image(&pixels, width, height, &args.output_dir, &args.prefix)?
        }
    };

    info!("Wrote {} file(s)", paths.len());
    Ok(())
}
