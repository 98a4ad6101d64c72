/// Integration tests that exercise the full occlusion pipeline:
/// occluders -> depth buffer -> candidate culling. The fixed scene is an
/// 8x8 viewport with a 90 degree camera at the origin looking down -Z, so
/// the NDC square at z=-2 spans x,y in [-2, 2].
use glam::{Mat4, Vec3};
use softcull::*;

fn test_camera() -> Camera {
    let mut camera = Camera::new(Vec3::ZERO, 1.0);
    camera.fov = std::f32::consts::FRAC_PI_2;
    camera.near = 1.0;
    camera.far = 100.0;
    camera
}

fn make_renderer() -> Renderer {
    Renderer::new(8, 8, &test_camera()).expect("test camera is valid")
}

/// Wall filling the whole viewport when placed at depth `z` (half extent
/// matches the frustum cross-section at that depth).
fn full_screen_wall(z: f32) -> OccluderMesh {
    let s = -z;
    OccluderMesh::new(
        vec![
            -s, -s, z, //
            s, -s, z, //
            s, s, z, //
            -s, s, z,
        ],
        vec![0, 2, 1, 0, 3, 2],
        Mat4::IDENTITY,
    )
}

fn box_at(z: f32, extents: Vec3) -> Candidate {
    Candidate::aabb(Mat4::from_translation(Vec3::new(0.0, 0.0, z)), Vec3::ZERO, extents)
}

#[test]
fn empty_scene_leaves_depth_clear_and_culls_nothing() {
    let mut renderer = make_renderer();
    renderer.render(&[]).unwrap();
    assert!(renderer.depth().iter().all(|&d| d == 0.0));

    let candidates = [box_at(-5.0, Vec3::splat(0.5))];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);

    assert!(renderer.cull(&[]).is_empty());
}

#[test]
fn full_screen_occluder_writes_its_depth_everywhere() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let d = renderer.depth()[y * 8 + x];
            assert!(
                (d - 0.5).abs() < 1e-4,
                "pixel ({}, {}) stored {}, expected 0.5",
                x,
                y,
                d
            );
        }
    }
}

#[test]
fn candidate_behind_occluder_is_culled() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    let candidates = [box_at(-5.0, Vec3::splat(0.5))];
    let visible = renderer.cull(&candidates);
    assert!(visible.is_empty(), "box at depth 0.2 behind wall at 0.5");
}

#[test]
fn candidate_in_front_of_occluder_stays_visible() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    let candidates = [box_at(-1.5, Vec3::splat(0.2))];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1, "probe depth ~0.77 beats stored 0.5");
}

#[test]
fn sphere_candidates_follow_the_same_rules() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    let behind = Candidate::sphere(
        Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
        Vec3::ZERO,
        1.0,
    );
    let in_front = Candidate::sphere(
        Mat4::from_translation(Vec3::new(0.0, 0.0, -1.6)),
        Vec3::ZERO,
        0.1,
    );
    let candidates = [behind, in_front];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);
    assert!(std::ptr::eq(visible[0], &candidates[1]));
}

#[test]
fn occluder_crossing_the_near_plane_is_split_and_rendered() {
    let mut renderer = make_renderer();

    // One vertex in front of the near plane; the clipper splits the
    // triangle and everything rendered stays in the valid depth range.
    let crossing = OccluderMesh::new(
        vec![
            -2.0, -2.0, -2.0, //
            2.0, -2.0, -2.0, //
            0.0, 2.0, -0.5,
        ],
        vec![0, 2, 1],
        Mat4::IDENTITY,
    );
    renderer.render(std::slice::from_ref(&crossing)).unwrap();

    let written: Vec<f32> = renderer.depth().iter().copied().filter(|&d| d > 0.0).collect();
    assert!(!written.is_empty(), "clipped triangle must still rasterize");
    for d in written {
        assert!(d <= 1.0 + 1e-5, "depth {} exceeds 1/near", d);
    }
}

#[test]
fn reversed_winding_writes_nothing() {
    let mut renderer = make_renderer();

    let wall = full_screen_wall(-2.0);
    let reversed = OccluderMesh::new(wall.positions.clone(), vec![0, 1, 2, 0, 2, 3], wall.model);
    renderer.render(std::slice::from_ref(&reversed)).unwrap();

    assert!(renderer.depth().iter().all(|&d| d == 0.0));
}

#[test]
fn written_footprint_stays_inside_the_true_one() {
    let mut renderer = make_renderer();

    // Quarter-size wall at z=-2: projects onto pixels [1.75, 5.25], which
    // shrinks to [2, 5] under conservative rounding.
    let small_wall = OccluderMesh::new(
        vec![
            -1.0, -1.0, -2.0, //
            1.0, -1.0, -2.0, //
            1.0, 1.0, -2.0, //
            -1.0, 1.0, -2.0,
        ],
        vec![0, 2, 1, 0, 3, 2],
        Mat4::IDENTITY,
    );
    renderer.render(std::slice::from_ref(&small_wall)).unwrap();

    for y in 0..8usize {
        for x in 0..8usize {
            let d = renderer.depth()[y * 8 + x];
            let inside = (2..=5).contains(&x) && (2..=5).contains(&y);
            if !inside {
                assert_eq!(d, 0.0, "pixel ({}, {}) outside the eroded footprint", x, y);
            }
        }
    }
}

#[test]
fn adding_occluders_never_lowers_depth() {
    let mut renderer = make_renderer();

    renderer.render(&[full_screen_wall(-4.0)]).unwrap();
    let depth_a: Vec<f32> = renderer.depth().to_vec();

    renderer
        .render(&[full_screen_wall(-4.0), full_screen_wall(-2.0)])
        .unwrap();
    for (i, (&a, &b)) in depth_a.iter().zip(renderer.depth().iter()).enumerate() {
        assert!(b >= a, "pixel {} regressed from {} to {}", i, a, b);
    }
}

#[test]
fn submission_order_does_not_change_the_result() {
    let mut renderer = make_renderer();

    let near = full_screen_wall(-2.0);
    let far = full_screen_wall(-6.0);

    renderer
        .render(&[full_screen_wall(-2.0), full_screen_wall(-6.0)])
        .unwrap();
    let forward: Vec<f32> = renderer.depth().to_vec();

    renderer.render(&[far, near]).unwrap();
    assert_eq!(renderer.depth(), forward.as_slice());
}

#[test]
fn occluder_does_not_cull_its_own_bounding_box() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    // A bound wrapping the wall sticks out in front of it, so its nearest
    // face probes deeper than the wall wrote.
    let candidates = [box_at(-2.0, Vec3::new(2.0, 2.0, 0.3))];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);
}

#[test]
fn never_cull_candidates_survive_full_occlusion() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    let candidates = [box_at(-5.0, Vec3::splat(0.5)).never_culled()];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);
}

#[test]
fn candidate_crossing_the_near_plane_is_never_culled() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    // The box straddles the near plane even though the wall covers it.
    let candidates = [box_at(-1.2, Vec3::splat(0.5))];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);
}

#[test]
fn cull_preserves_input_order() {
    let mut renderer = make_renderer();
    renderer.render(&[full_screen_wall(-2.0)]).unwrap();

    let candidates = [
        box_at(-1.5, Vec3::splat(0.2)),          // visible
        box_at(-5.0, Vec3::splat(0.5)),          // culled
        Candidate::sphere(
            Mat4::from_translation(Vec3::new(0.0, 0.0, -1.6)),
            Vec3::ZERO,
            0.1,
        ), // visible
        box_at(-7.0, Vec3::splat(0.5)).never_culled(), // always visible
    ];
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 3);
    assert!(std::ptr::eq(visible[0], &candidates[0]));
    assert!(std::ptr::eq(visible[1], &candidates[2]));
    assert!(std::ptr::eq(visible[2], &candidates[3]));
}

#[test]
fn camera_update_changes_what_gets_culled() {
    let mut camera = test_camera();
    let mut renderer = Renderer::new(8, 8, &camera).unwrap();

    let wall = full_screen_wall(-2.0);
    let candidates = [box_at(-5.0, Vec3::splat(0.5))];

    renderer.render(std::slice::from_ref(&wall)).unwrap();
    assert!(renderer.cull(&candidates).is_empty());

    // Turn the camera around: wall and box both end up behind it. A volume
    // on the camera side of the near plane is never culled.
    camera.yaw = std::f32::consts::PI;
    renderer.update_camera(&camera).unwrap();
    renderer.render(std::slice::from_ref(&wall)).unwrap();
    let visible = renderer.cull(&candidates);
    assert_eq!(visible.len(), 1);
}
