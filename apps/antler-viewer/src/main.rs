mod demo;
mod keymap;

use antler_common::EntityId;
use antler_input::KeySnapshot;
use antler_kernel::{EngineConfig, RenderStats, Scene};
use antler_render::RenderContext;
use antler_render_wgpu::{Projection, WgpuContext};
use antler_tools::SceneInspector;
use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as PhysicalCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "antler-viewer", about = "Antler scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration (YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Scene and per-frame state, created once the GPU is up.
struct ViewerState {
    config: EngineConfig,
    scene: Scene,
    camera: EntityId,
    spinner: EntityId,
    projection: Projection,
    keys: KeySnapshot,
    stats: RenderStats,
    last_frame: Instant,
    show_panel: bool,
    paused: bool,
}

impl ViewerState {
    fn new(config: EngineConfig, demo: demo::Demo, size: PhysicalSize<u32>) -> Self {
        let mut projection = Projection::default();
        projection.set_viewport(size.width, size.height);
        Self {
            config,
            scene: demo.scene,
            camera: demo.camera,
            spinner: demo.spinner,
            projection,
            keys: KeySnapshot::new(),
            stats: RenderStats::default(),
            last_frame: Instant::now(),
            show_panel: true,
            paused: false,
        }
    }

    fn handle_key(&mut self, key: PhysicalCode, pressed: bool) {
        if let Some(code) = keymap::key_code(key) {
            self.keys.set(code, pressed);
        }
        if !pressed {
            return;
        }
        match key {
            PhysicalCode::F1 => self.show_panel = !self.show_panel,
            PhysicalCode::F2 => self.paused = !self.paused,
            _ => {}
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let raw_ms = (now - self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;
        let elapsed_ms = self.config.frame.clamp_elapsed(raw_ms);

        if !self.paused {
            demo::spin(&mut self.scene, self.spinner, elapsed_ms);
        }
        self.scene.update(&self.keys, elapsed_ms);
    }

    fn render(&mut self, gpu: &mut WgpuContext) {
        let view = demo::camera_view(&self.scene, self.camera);
        let camera = self.projection.camera_context(view);
        self.stats = self.scene.render(&mut RenderContext::new(&camera, gpu));
        if self.stats.failed > 0 {
            tracing::debug!(failed = self.stats.failed, "entities failed to draw");
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);
        let stats = self.stats;

        egui::SidePanel::left("inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Antler");
                ui.separator();
                ui.label(format!("Frame: {}", summary.frame));
                ui.label(format!(
                    "Entities: {} ({} attached, {} roots)",
                    summary.total, summary.attached, summary.roots
                ));
                ui.label(format!(
                    "Renderable: {}  Depth: {}",
                    summary.renderable, summary.max_depth
                ));
                ui.label(format!(
                    "Drawn: {}  Failed: {}  Skipped: {}",
                    stats.drawn, stats.failed, stats.skipped
                ));
                ui.label(format!("Basis drift: {:.2e}", summary.max_basis_error));

                ui.separator();
                ui.heading("Camera");
                if let Some(camera) = self.scene.get_mut(self.camera) {
                    let p = camera.position;
                    let f = camera.forward();
                    let u = camera.up();
                    ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                    ui.label(format!("Forward: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
                    ui.label(format!("Up: ({:.2}, {:.2}, {:.2})", u.x, u.y, u.z));
                    ui.add(egui::Slider::new(&mut camera.move_speed, 0.5..=20.0).text("move speed"));
                    ui.add(
                        egui::Slider::new(&mut camera.rotate_speed, 0.1..=5.0).text("rotate speed"),
                    );
                }
                ui.checkbox(&mut self.paused, "Pause spinner (F2)");

                ui.separator();
                ui.heading("Entities");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for id in SceneInspector::list_entities(&self.scene) {
                        let depth = self.scene.depth(id).unwrap_or(0);
                        let Some(entity) = self.scene.get_mut(id) else {
                            continue;
                        };
                        let label = format!(
                            "{}{}",
                            "  ".repeat(depth),
                            entity.name().unwrap_or("unnamed")
                        );
                        let mut active = entity.is_active();
                        if ui.checkbox(&mut active, label).changed() {
                            entity.set_active(active);
                            tracing::info!(%id, active, "entity toggled");
                        }
                    }
                });

                ui.separator();
                ui.small("F1: Toggle panel | WASD/QE: Move | Arrows: Look");
            });
    }
}

struct ViewerApp {
    config: EngineConfig,
    state: Option<ViewerState>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    gpu: Option<WgpuContext>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl ViewerApp {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: None,
            window: None,
            surface: None,
            surface_config: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Antler")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("antler_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );

        let mut gpu = WgpuContext::new(device, queue, format, surface_config.width, surface_config.height);
        let demo = demo::build(&self.config, &mut gpu)?;
        let state = ViewerState::new(self.config.clone(), demo, size);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(gpu.device(), format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.surface_config = Some(surface_config);
        self.gpu = Some(gpu);
        self.state = Some(state);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(surface), Some(surface_config), Some(gpu)) =
            (&self.surface, &mut self.surface_config, &mut self.gpu)
        else {
            return;
        };
        surface_config.width = size.width.max(1);
        surface_config.height = size.height.max(1);
        surface.configure(gpu.device(), surface_config);
        gpu.resize(surface_config.width, surface_config.height);
        if let Some(state) = &mut self.state {
            state.projection.set_viewport(size.width, size.height);
        }
    }

    fn redraw(&mut self) {
        let (
            Some(state),
            Some(window),
            Some(surface),
            Some(surface_config),
            Some(gpu),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &mut self.state,
            &self.window,
            &self.surface,
            &self.surface_config,
            &mut self.gpu,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        state.update();

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(gpu.device(), surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        state.render(gpu);

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        egui_winit.handle_platform_output(window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [surface_config.width, surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        gpu.encode_frame(&mut encoder, &view);
        egui_renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to start viewer: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::Focused(false) => {
                if let Some(state) = &mut self.state {
                    state.keys.clear();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == PhysicalCode::Escape {
                    event_loop.exit();
                } else if let Some(state) = &mut self.state {
                    state.handle_key(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    tracing::info!("antler-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
