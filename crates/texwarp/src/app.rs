//! The interactive application.
//!
//! One window, two panes: the left pane is the CPU preview (source image,
//! wireframe, markers), the right pane shows the GPU warp output. Pointer
//! events feed the interaction controller; every accepted mutation triggers
//! exactly one render pass covering both panes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use texwarp_core::{InteractionController, MeshBuilder, PointSet, SurfaceRect, Topology};
use texwarp_render::{
    load_image, BlitRenderer, FrameCapture, RgbaTexture, WarpRenderer, WgpuBackend,
};

use crate::preview::PreviewRenderer;

/// Gap around and between the two panes, in pixels.
const PADDING: u32 = 10;
/// Preview pane size (square, like the drag canvas it replaces).
const PREVIEW_SIZE: u32 = 512;
/// On-screen size of the warp output pane.
const OUTPUT_W: u32 = 512;
const OUTPUT_H: u32 = 384;
/// Internal resolution of the warp output (and of saved captures).
const CAPTURE_W: u32 = 2048;
const CAPTURE_H: u32 = 1536;

const WINDOW_W: u32 = PADDING + PREVIEW_SIZE + PADDING + OUTPUT_W + PADDING;
const WINDOW_H: u32 = PADDING + PREVIEW_SIZE + PADDING;

/// Startup options parsed from the command line.
pub struct AppOptions {
    /// Initial source image, if any.
    pub image: Option<PathBuf>,
    /// Mesh topology to edit.
    pub topology: Topology,
    /// Where captures are written.
    pub output: PathBuf,
}

/// GPU-side state; absent until the window exists, and the warp part may be
/// absent on its own if pipeline setup failed.
struct Gpu {
    backend: WgpuBackend,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    blit: BlitRenderer,
    preview_texture: RgbaTexture,
    preview_bind_group: wgpu::BindGroup,
    warp: Option<Warp>,
}

/// The warp pipeline and everything it samples from.
struct Warp {
    renderer: WarpRenderer,
    capture: FrameCapture,
    capture_bind_group: wgpu::BindGroup,
    source_texture: RgbaTexture,
    source_bind_group: wgpu::BindGroup,
}

/// Application state and event handling.
pub struct App {
    options: AppOptions,
    points: PointSet,
    mesh_builder: MeshBuilder,
    controller: InteractionController,
    preview: PreviewRenderer,
    cursor: Vec2,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
}

impl App {
    /// Create the application in its pre-window state.
    pub fn new(options: AppOptions) -> anyhow::Result<Self> {
        let topology = options.topology;
        let preview = PreviewRenderer::new(PREVIEW_SIZE, PREVIEW_SIZE)
            .ok_or_else(|| anyhow::anyhow!("failed to allocate preview surface"))?;
        Ok(Self {
            options,
            points: topology.default_points(),
            mesh_builder: MeshBuilder::new(topology),
            controller: InteractionController::new(SurfaceRect::new(
                PADDING as f32,
                PADDING as f32,
                PREVIEW_SIZE as f32,
                PREVIEW_SIZE as f32,
            )),
            preview,
            cursor: Vec2::ZERO,
            window: None,
            gpu: None,
        })
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let backend = pollster::block_on(WgpuBackend::new())?;
        let surface = backend.create_surface(window)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8Unorm,
            width: WINDOW_W,
            height: WINDOW_H,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(backend.device(), &config);

        let blit = BlitRenderer::new(backend.device.clone(), config.format)?;

        let preview_texture =
            RgbaTexture::new(backend.device(), PREVIEW_SIZE, PREVIEW_SIZE, "Preview Texture");
        let preview_bind_group = blit.bind_group(preview_texture.view());

        // A warp pipeline failure keeps the preview path alive; the output
        // pane just stays dark.
        let warp = match WarpRenderer::new(
            backend.device.clone(),
            FrameCapture::FORMAT,
            &self.mesh_builder,
        ) {
            Ok(renderer) => {
                let capture = FrameCapture::new(backend.device(), CAPTURE_W, CAPTURE_H);
                let capture_bind_group = blit.bind_group(capture.view());
                let source_texture = RgbaTexture::placeholder(backend.device(), backend.queue());
                let source_bind_group = renderer.texture_bind_group(source_texture.view());
                Some(Warp {
                    renderer,
                    capture,
                    capture_bind_group,
                    source_texture,
                    source_bind_group,
                })
            }
            Err(e) => {
                error!("warp pipeline setup failed, preview only: {e}");
                None
            }
        };

        self.gpu = Some(Gpu {
            backend,
            surface,
            config,
            blit,
            preview_texture,
            preview_bind_group,
            warp,
        });

        if let Some(path) = self.options.image.take() {
            self.load_source(&path);
        }
        Ok(())
    }

    /// Load a source image and hand it to both render paths. On failure the
    /// previous texture stays in place.
    fn load_source(&mut self, path: &Path) {
        let image = match load_image(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("ignoring image load failure: {e}");
                return;
            }
        };

        self.preview.set_source(&image);
        if let Some(gpu) = &mut self.gpu {
            if let Some(warp) = &mut gpu.warp {
                warp.source_texture
                    .upload_image(gpu.backend.device(), gpu.backend.queue(), &image);
                // The texture may have been recreated for the new size.
                warp.source_bind_group = warp
                    .renderer
                    .texture_bind_group(warp.source_texture.view());
            }
        }
        self.request_redraw();
    }

    /// Write the current warp output to the configured capture path.
    fn save_capture(&self) {
        let Some(gpu) = &self.gpu else { return };
        let Some(warp) = &gpu.warp else {
            warn!("no warp pipeline, nothing to capture");
            return;
        };

        let image = match warp
            .capture
            .read_to_image(gpu.backend.device(), gpu.backend.queue())
        {
            Ok(image) => image,
            Err(e) => {
                error!("capture readback failed: {e}");
                return;
            }
        };
        match image.save(&self.options.output) {
            Ok(()) => info!(path = %self.options.output.display(), "capture saved"),
            Err(e) => error!("failed to save capture: {e}"),
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// The single render entry point: preview pane and warp output always
    /// update together from the same point set.
    fn render(&mut self) {
        let Some(gpu) = &mut self.gpu else { return };

        // 1. CPU preview, then upload for blitting.
        let pixmap = self.preview.render(&self.points, self.mesh_builder.topology());
        gpu.preview_texture.upload_pixels(
            gpu.backend.device(),
            gpu.backend.queue(),
            pixmap.data(),
            pixmap.width(),
            pixmap.height(),
        );

        let tex_coords = self.mesh_builder.tex_coords(&self.points);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("surface frame unavailable: {e}");
                gpu.surface.configure(gpu.backend.device(), &gpu.config);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            gpu.backend
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        // 2. Warp pass into the offscreen capture target.
        if let Some(warp) = &gpu.warp {
            warp.renderer.render_frame(
                gpu.backend.queue(),
                &mut encoder,
                warp.capture.view(),
                &tex_coords,
                &warp.source_bind_group,
            );
        }

        // 3. Composite both panes onto the window surface.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Surface Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.04,
                            g: 0.04,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_viewport(
                PADDING as f32,
                PADDING as f32,
                PREVIEW_SIZE as f32,
                PREVIEW_SIZE as f32,
                0.0,
                1.0,
            );
            gpu.blit.draw(&mut pass, &gpu.preview_bind_group);

            if let Some(warp) = &gpu.warp {
                pass.set_viewport(
                    (PADDING * 2 + PREVIEW_SIZE) as f32,
                    PADDING as f32,
                    OUTPUT_W as f32,
                    OUTPUT_H as f32,
                    0.0,
                    1.0,
                );
                gpu.blit.draw(&mut pass, &warp.capture_bind_group);
            }
        }

        gpu.backend.queue().submit(Some(encoder.finish()));
        frame.present();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("TexWarp")
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_W, WINDOW_H));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        if let Err(e) = self.init_gpu(window) {
            // Fatal: without a device there is nothing to present.
            error!("GPU initialization failed: {e}");
            event_loop.exit();
            return;
        }
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => event_loop.exit(),
                Key::Character(c) if c == "s" => self.save_capture(),
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                if self.controller.pointer_move(self.cursor, &mut self.points) {
                    self.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.controller.pointer_down(self.cursor, &self.points);
                }
                ElementState::Released => self.controller.pointer_up(),
            },
            WindowEvent::DroppedFile(path) => self.load_source(&path),
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }
}
