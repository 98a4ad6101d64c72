/// Demo entry point: renders the occlusion depth buffer to a window and
/// reports how many candidates the culler removes each second.
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use softcull::*;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// A double-sided wall occluder centered at `center`, lying in the plane
/// facing the z axis, `half` units wide and tall.
fn make_wall(center: Vec3, half: f32) -> OccluderMesh {
    let positions = vec![
        center.x - half, center.y - half, center.z, //
        center.x + half, center.y - half, center.z, //
        center.x + half, center.y + half, center.z, //
        center.x - half, center.y + half, center.z,
    ];
    // Both windings so the wall occludes from either side of the plane.
    let indices = vec![0, 2, 1, 0, 3, 2, 0, 1, 2, 0, 2, 3];
    OccluderMesh::new(positions, indices, Mat4::IDENTITY)
}

fn make_scene() -> (Vec<OccluderMesh>, Vec<Candidate>) {
    let occluders = vec![
        make_wall(Vec3::new(0.0, 0.0, 0.0), 6.0),
        make_wall(Vec3::new(-10.0, 0.0, -4.0), 3.0),
    ];

    // A ring of candidates around the wall plus a few deliberately hidden
    // behind it; the culler should strip the hidden ones whenever the
    // camera faces the wall.
    let mut candidates = Vec::new();
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 14.0, 0.0, angle.sin() * 14.0);
        let model = Mat4::from_translation(position);
        if i % 2 == 0 {
            candidates.push(Candidate::aabb(model, Vec3::ZERO, Vec3::splat(1.0)));
        } else {
            candidates.push(Candidate::sphere(model, Vec3::ZERO, 1.0));
        }
    }
    for z in [-3.0f32, -5.0, -7.0] {
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, z));
        candidates.push(Candidate::aabb(model, Vec3::ZERO, Vec3::splat(0.8)));
    }
    // A player-like candidate that must never be culled.
    candidates.push(
        Candidate::sphere(Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0)), Vec3::ZERO, 0.5)
            .never_culled(),
    );

    (occluders, candidates)
}

fn main() {
    println!("=== softcull - CPU occlusion culling demo ===");
    println!("Grayscale view of the depth buffer; brighter is closer.");
    println!("  ESC - Exit");
    println!();

    let event_loop = EventLoop::new().unwrap();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("softcull depth buffer")
            .with_inner_size(winit::dpi::LogicalSize::new(960, 540))
            .build(&event_loop)
            .unwrap(),
    );

    let context = softbuffer::Context::new(window.clone()).unwrap();
    let mut surface = softbuffer::Surface::new(&context, window.clone()).unwrap();

    let window_size = window.inner_size();
    let mut width = window_size.width as usize;
    let mut height = window_size.height as usize;

    let mut camera = Camera::new(Vec3::new(0.0, 4.0, 20.0), width as f32 / height as f32);
    camera.near = 0.5;
    camera.far = 200.0;

    let mut renderer = Renderer::new(width, height, &camera).expect("valid window size");
    let (occluders, candidates) = make_scene();

    let start = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if new_size.width > 0 && new_size.height > 0 {
                            width = new_size.width as usize;
                            height = new_size.height as usize;
                            camera.set_aspect_ratio(width as f32 / height as f32);
                            renderer =
                                Renderer::new(width, height, &camera).expect("valid window size");
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                            if event.state == ElementState::Pressed {
                                elwt.exit();
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        // Orbit the camera around the scene center.
                        let angle = start.elapsed().as_secs_f32() * 0.4;
                        camera.position =
                            Vec3::new(angle.cos() * 20.0, 5.0, angle.sin() * 20.0);
                        camera.look_at(Vec3::ZERO, Vec3::Y);
                        renderer.update_camera(&camera).expect("near plane stays valid");

                        renderer.render(&occluders).expect("demo meshes are well formed");
                        let visible = renderer.cull(&candidates).len();

                        // Present the depth buffer as grayscale. The buffer's
                        // y axis points up, the window's points down.
                        let colors = renderer.depth_to_color();
                        surface
                            .resize(
                                NonZeroU32::new(width as u32).unwrap(),
                                NonZeroU32::new(height as u32).unwrap(),
                            )
                            .unwrap();
                        let mut buffer = surface.buffer_mut().unwrap();
                        for y in 0..height {
                            let src = (height - 1 - y) * width;
                            let dst = y * width;
                            buffer[dst..dst + width]
                                .copy_from_slice(&colors[src..src + width]);
                        }
                        buffer.present().unwrap();

                        frame_count += 1;
                        if fps_timer.elapsed().as_secs() >= 1 {
                            println!(
                                "FPS: {} | candidates: {} | visible: {} | culled: {}",
                                frame_count,
                                candidates.len(),
                                visible,
                                candidates.len() - visible
                            );
                            #[cfg(feature = "profiling")]
                            FUNCTION_COUNTERS.snapshot().print_report();
                            frame_count = 0;
                            fps_timer = Instant::now();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}
