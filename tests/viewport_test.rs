use star_donuts::{
    clock::ManualClock,
    frame_loop::{FrameLoop, RunFlag},
    render::Renderer,
    viewport::{MAX_PIXEL_RATIO, Viewport, handle_resize},
};

use crate::common::test_utils::{CountingControls, RecordingRenderer, scene_context};

mod common;

#[test]
fn resize_updates_camera_and_renderer() {
    let mut ctx = scene_context(21);
    let mut renderer = RecordingRenderer::new();

    handle_resize(&mut ctx, &mut renderer, Viewport::new(1920, 1080, 3.0), MAX_PIXEL_RATIO).unwrap();

    let (_, camera) = ctx.scene.camera(ctx.camera).unwrap();
    assert_eq!(camera.aspect, 1920.0 / 1080.0);
    assert_eq!(renderer.size(), (1920, 1080));
    assert_eq!(renderer.pixel_ratio(), 2.0);
    assert_eq!(ctx.viewport, Viewport::new(1920, 1080, 3.0));
}

#[test]
fn resize_refreshes_the_projection() {
    let mut ctx = scene_context(22);
    let mut renderer = RecordingRenderer::new();
    let before = ctx.scene.camera(ctx.camera).unwrap().1.projection_matrix();

    handle_resize(&mut ctx, &mut renderer, Viewport::new(400, 800, 1.0), MAX_PIXEL_RATIO).unwrap();

    let after = ctx.scene.camera(ctx.camera).unwrap().1.projection_matrix();
    assert_ne!(before, after);
}

#[test]
fn low_density_displays_keep_their_ratio() {
    let mut ctx = scene_context(23);
    let mut renderer = RecordingRenderer::new();
    handle_resize(&mut ctx, &mut renderer, Viewport::new(640, 480, 1.25), MAX_PIXEL_RATIO).unwrap();
    assert_eq!(renderer.pixel_ratio(), 1.25);
}

#[test]
fn resize_is_idempotent() {
    let mut ctx = scene_context(24);
    let mut renderer = RecordingRenderer::new();
    let viewport = Viewport::new(1024, 768, 2.0);

    handle_resize(&mut ctx, &mut renderer, viewport, MAX_PIXEL_RATIO).unwrap();
    let camera_once = ctx.scene.camera(ctx.camera).unwrap().1.clone();
    let size_once = (renderer.size(), renderer.pixel_ratio());

    handle_resize(&mut ctx, &mut renderer, viewport, MAX_PIXEL_RATIO).unwrap();
    assert_eq!(ctx.scene.camera(ctx.camera).unwrap().1, &camera_once);
    assert_eq!((renderer.size(), renderer.pixel_ratio()), size_once);
}

#[test]
fn zero_sized_window_is_clamped() {
    let mut ctx = scene_context(25);
    let mut renderer = RecordingRenderer::new();
    handle_resize(&mut ctx, &mut renderer, Viewport::new(0, 0, 1.0), MAX_PIXEL_RATIO).unwrap();

    let (_, camera) = ctx.scene.camera(ctx.camera).unwrap();
    assert!(camera.aspect.is_finite());
    assert_eq!(renderer.size_calls.last(), Some(&(1, 1)));
}

#[test]
fn resize_leaves_animation_alone() {
    let mut ctx = scene_context(26);
    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    clock.set(1.5);
    frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    let donuts: Vec<_> = ctx
        .animated
        .iter()
        .map(|id| ctx.scene.node(id).unwrap().transform)
        .collect();

    handle_resize(&mut ctx, &mut renderer, Viewport::new(300, 300, 1.0), MAX_PIXEL_RATIO).unwrap();
    let after: Vec<_> = ctx
        .animated
        .iter()
        .map(|id| ctx.scene.node(id).unwrap().transform)
        .collect();
    assert_eq!(donuts, after);

    // the next frame draws with the new aspect
    frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    assert_eq!(renderer.aspects.last(), Some(&1.0));
}
