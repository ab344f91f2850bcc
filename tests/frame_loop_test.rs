use cgmath::Rad;
use star_donuts::{
    clock::ManualClock,
    frame_loop::{FrameLoop, RunFlag, TickOutcome},
};

use crate::common::test_utils::{CountingControls, FailingRenderer, RecordingRenderer, scene_context};

mod common;

#[test]
fn tick_sets_x_and_z_rotation_to_elapsed_time() {
    let mut ctx = scene_context(11);
    let before: Vec<_> = ctx
        .animated
        .iter()
        .map(|id| ctx.scene.node(id).unwrap().transform)
        .collect();

    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    clock.set(2.5);
    assert_eq!(
        frame_loop.tick(&mut ctx, &mut controls, &mut renderer),
        TickOutcome::Rendered
    );

    for (id, before) in ctx.animated.iter().zip(before) {
        let t = ctx.scene.node(id).unwrap().transform;
        assert_eq!(t.rotation.x, Rad(2.5));
        assert_eq!(t.rotation.z, Rad(2.5));
        assert_eq!(t.rotation.y, before.rotation.y);
        assert_eq!(t.position, before.position);
        assert_eq!(t.scale, before.scale);
    }
}

#[test]
fn rotation_is_absolute_not_accumulated() {
    let mut ctx = scene_context(12);
    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    for _ in 0..10 {
        clock.advance(0.1);
        frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    }
    let id = ctx.animated.iter().next().unwrap();
    let rotation = ctx.scene.node(id).unwrap().transform.rotation;
    assert!((rotation.x.0 - 1.0).abs() < 1e-5);
    assert_eq!(rotation.x, rotation.z);
}

#[test]
fn each_tick_updates_controls_then_renders_once() {
    let mut ctx = scene_context(13);
    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    for _ in 0..3 {
        clock.advance(1.0 / 60.0);
        assert!(frame_loop.tick(&mut ctx, &mut controls, &mut renderer).reschedule());
    }
    assert_eq!(controls.updates, 3);
    assert_eq!(renderer.renders(), 3);
    assert_eq!(frame_loop.ticks(), 3);
    assert_eq!(frame_loop.failed_ticks(), 0);
}

#[test]
fn render_failure_is_logged_and_the_loop_continues() {
    let mut ctx = scene_context(14);
    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = FailingRenderer {
        ok_renders: 1,
        ..Default::default()
    };
    let mut controls = CountingControls::default();

    let outcomes: Vec<_> = (0..4)
        .map(|_| {
            clock.advance(0.5);
            frame_loop.tick(&mut ctx, &mut controls, &mut renderer)
        })
        .collect();

    assert_eq!(outcomes[0], TickOutcome::Rendered);
    assert!(outcomes[1..].iter().all(|o| *o == TickOutcome::Failed));
    assert!(outcomes.iter().all(TickOutcome::reschedule));
    assert_eq!(renderer.attempts, 4);
    assert_eq!(frame_loop.failed_ticks(), 3);

    // animation kept going despite the failed draws
    let id = ctx.animated.iter().next().unwrap();
    assert_eq!(ctx.scene.node(id).unwrap().transform.rotation.x, Rad(2.0));
}

#[test]
fn missing_animated_node_fails_the_tick_but_not_the_loop() {
    let mut ctx = scene_context(15);
    let victim = ctx.animated.iter().nth(10).unwrap();
    ctx.scene.remove(victim);

    let mut frame_loop = FrameLoop::new(ManualClock::new(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    let outcome = frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    assert_eq!(outcome, TickOutcome::Failed);
    assert!(outcome.reschedule());
    assert_eq!(renderer.renders(), 0);
}

#[test]
fn stopped_flag_ends_the_loop_before_touching_the_scene() {
    let mut ctx = scene_context(16);
    let clock = ManualClock::new();
    let flag = RunFlag::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), flag.clone());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    clock.set(1.0);
    frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    flag.stop();
    clock.set(3.0);

    let outcome = frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    assert_eq!(outcome, TickOutcome::Stopped);
    assert!(!outcome.reschedule());
    assert_eq!(renderer.renders(), 1);
    assert_eq!(frame_loop.ticks(), 1);

    let id = ctx.animated.iter().next().unwrap();
    assert_eq!(ctx.scene.node(id).unwrap().transform.rotation.x, Rad(1.0));
}

#[test]
fn time_never_runs_backwards() {
    let mut ctx = scene_context(17);
    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();

    clock.set(4.0);
    frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    clock.set(1.0);
    frame_loop.tick(&mut ctx, &mut controls, &mut renderer);

    let id = ctx.animated.iter().next().unwrap();
    assert_eq!(ctx.scene.node(id).unwrap().transform.rotation.z, Rad(4.0));
}
