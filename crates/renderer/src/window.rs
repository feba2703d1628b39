//! The windowed frame loop.
//!
//! One winit event loop on one thread runs everything: input callbacks feed
//! the engine's pointer tracker and the control surface, and each redraw
//! performs the strict per-frame ordering — resize the drawable to the
//! display size, compose the uniform bundle, issue the draw call, schedule
//! the next iteration. Input processed between two redraws is therefore
//! always fully applied before the next compose.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use engine::{Gallery, ProgramRegistry, UniformBundle};
use tracing::{error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::gpu::context::GpuContext;
use crate::gpu::pipeline::{QuadGeometry, SceneCompiler, ScenePipeline};
use crate::{ControlSurface, GalleryConfig, SceneGallery};

/// Pointer id reserved for the mouse cursor; touch contacts shift up by one
/// so they never collide with it.
const MOUSE_POINTER: u64 = 0;

pub(crate) fn run_loop(
    config: GalleryConfig,
    params: engine::ParameterStore,
    plan: engine::UniformPlan,
    mut control: Box<dyn ControlSurface>,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.window_size.0, config.window_size.1))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create gallery window: {err}"))?;
    let window = Arc::new(window);

    let mut gpu = GpuContext::new(window.clone())?;
    let quad = QuadGeometry::new(&gpu.device);

    // Startup registration: every scene compiles or the gallery aborts.
    let mut registry: ProgramRegistry<ScenePipeline> = ProgramRegistry::new(&config.default_scene);
    {
        let mut compiler = SceneCompiler::new(&gpu);
        for scene in &config.scenes {
            registry
                .register(
                    &mut compiler,
                    &scene.name,
                    &config.vertex_source,
                    &scene.fragment,
                    scene.schema.clone(),
                )
                .with_context(|| format!("failed to compile scene '{}'", scene.name))?;
        }
    }
    if let Some(candidate) = &config.deep_link {
        registry.apply_deep_link_override(candidate);
    }
    info!(
        scenes = registry.names().count(),
        active = registry.active(),
        "gallery ready"
    );

    let mut gallery: SceneGallery = Gallery::new(registry, params, plan, config.target_fps);
    let run_start = Instant::now();
    let mut fatal: Option<anyhow::Error> = None;

    event_loop
        .run(|event, elwt| {
            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                    WindowEvent::Resized(new_size) => gpu.resize(new_size),
                    WindowEvent::CursorMoved { position, .. } => {
                        let (x, y) = normalize(position, window.inner_size());
                        gallery.tracker.pointer_move(MOUSE_POINTER, x, y);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        gallery.tracker.pointer_end(MOUSE_POINTER);
                    }
                    WindowEvent::Touch(Touch {
                        id,
                        location,
                        phase,
                        ..
                    }) => {
                        let (x, y) = normalize(location, window.inner_size());
                        let id = touch_pointer_id(id);
                        match phase {
                            TouchPhase::Started => gallery.tracker.pointer_start(id, x, y),
                            TouchPhase::Moved => gallery.tracker.pointer_move(id, x, y),
                            TouchPhase::Ended | TouchPhase::Cancelled => {
                                gallery.tracker.pointer_end(id)
                            }
                        }
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => {
                        if let Some(label) = key_label(&logical_key) {
                            control.on_key(&label, &mut gallery);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        // 1. Drawable follows the display size.
                        gpu.resize_to_display_size(window.inner_size());
                        // External per-frame parameter writes (animated values).
                        control.tick(&mut gallery, run_start.elapsed().as_secs_f32());
                        // 2. Compose this frame's bundle for the active scene.
                        let size = gpu.size();
                        let output = match gallery.frame(now, (size.width, size.height)) {
                            Ok(output) => output,
                            Err(err) => {
                                // Selection and plan both come from startup
                                // configuration; failing here is a bug.
                                fatal = Some(anyhow!(err).context("frame composition failed"));
                                elwt.exit();
                                return;
                            }
                        };
                        // 3. One draw call over the full viewport.
                        match draw_frame(&gpu, &quad, &output.program.handle, &output.uniforms) {
                            Ok(()) => {
                                drop(output);
                                gallery.mark_rendered(now);
                            }
                            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                                // Stale swapchain counts as resize bookkeeping,
                                // not a draw retry.
                                gpu.resize(window.inner_size());
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                warn!("surface timeout; skipping frame");
                            }
                            Err(err) => {
                                error!(error = %err, "draw call failed");
                                fatal = Some(anyhow!("draw call failed: {err}"));
                                elwt.exit();
                            }
                        }
                        // 4. The next iteration is scheduled from AboutToWait.
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    let now = Instant::now();
                    if gallery.ready_for_frame(now) {
                        elwt.set_control_flow(ControlFlow::Poll);
                        window.request_redraw();
                    } else if let Some(deadline) = gallery.next_deadline() {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop failed: {err}"))?;

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn draw_frame(
    gpu: &GpuContext,
    quad: &QuadGeometry,
    pipeline: &ScenePipeline,
    uniforms: &UniformBundle,
) -> Result<(), wgpu::SurfaceError> {
    let frame = gpu.acquire()?;
    pipeline.upload(&gpu.queue, uniforms);

    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pipeline.bind(&mut pass);
        pass.set_vertex_buffer(0, quad.slice());
        pass.draw(0..QuadGeometry::VERTEX_COUNT, 0..1);
    }
    gpu.queue.submit(Some(encoder.finish()));
    frame.present();
    Ok(())
}

/// Shifts touch ids off [`MOUSE_POINTER`]. Winit enumerates contacts from
/// zero, so the wrap at `u64::MAX` never happens in practice; it only keeps
/// the shift from overflowing.
fn touch_pointer_id(id: u64) -> u64 {
    id.wrapping_add(1)
}

fn normalize(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> (f32, f32) {
    let width = size.width.max(1) as f64;
    let height = size.height.max(1) as f64;
    ((position.x / width) as f32, (position.y / height) as f32)
}

fn key_label(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(NamedKey::Space) => Some("Space".into()),
        Key::Named(NamedKey::Tab) => Some("Tab".into()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".into()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".into()),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".into()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_ids_shift_past_the_mouse_slot() {
        assert_ne!(touch_pointer_id(0), MOUSE_POINTER);
        assert_eq!(touch_pointer_id(0), 1);
        assert_eq!(touch_pointer_id(9), 10);
        // Overflow wraps instead of panicking in debug builds.
        assert_eq!(touch_pointer_id(u64::MAX), 0);
    }
}
