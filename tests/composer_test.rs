use std::f32::consts::TAU;

use cgmath::Vector3;
use rand::{SeedableRng, rngs::StdRng};
use star_donuts::{
    composer::compose,
    config::SceneConfig,
    data_structures::scene_graph::{NodeKind, Scene},
    frame_loop::{FrameLoop, RunFlag, TickOutcome},
    clock::ManualClock,
};

use crate::common::test_utils::{
    BROKEN_FONT, CountingControls, RecordingRenderer, fixture_font, fixtures, scene_context,
    text_config,
};

mod common;

fn count_kind(scene: &Scene, pred: impl Fn(&NodeKind) -> bool) -> usize {
    scene.nodes().filter(|(_, node)| pred(&node.kind)).count()
}

#[test]
fn composes_lights_camera_and_one_hundred_donuts() {
    let ctx = scene_context(1);
    let scene = &ctx.scene;

    assert_eq!(ctx.animated.len(), 100);
    assert_eq!(count_kind(scene, |k| matches!(k, NodeKind::AmbientLight(_))), 1);
    assert_eq!(count_kind(scene, |k| matches!(k, NodeKind::PointLight(_))), 1);
    assert_eq!(count_kind(scene, |k| matches!(k, NodeKind::Camera(_))), 1);
    assert_eq!(count_kind(scene, |k| matches!(k, NodeKind::Mesh(_))), 100);
    assert!(ctx.text.is_none());

    let (transform, camera) = scene.camera(ctx.camera).unwrap();
    assert_eq!(transform.position, Vector3::new(1.0, 1.0, 2.0));
    assert_eq!(camera.aspect, 800.0 / 600.0);

    let point = scene
        .nodes()
        .find(|(_, n)| matches!(n.kind, NodeKind::PointLight(_)))
        .map(|(_, n)| n.transform.position);
    assert_eq!(point, Some(Vector3::new(0.0, 3.0, 4.0)));
}

#[test]
fn donuts_share_one_geometry_and_material() {
    let ctx = scene_context(2);
    let meshes: Vec<_> = ctx
        .animated
        .iter()
        .map(|id| match ctx.scene.node(id).unwrap().kind {
            NodeKind::Mesh(mesh) => mesh,
            _ => panic!("animated node is not a mesh"),
        })
        .collect();
    assert!(meshes.windows(2).all(|w| w[0] == w[1]));
    assert_ne!(meshes[0].material, ctx.text_material);
}

#[test]
fn donut_properties_stay_in_their_ranges() {
    for seed in 0..10 {
        let ctx = scene_context(seed);
        for id in ctx.animated.iter() {
            let t = ctx.scene.node(id).unwrap().transform;
            for c in [t.position.x, t.position.y, t.position.z] {
                assert!((-5.0..=5.0).contains(&c), "position {} out of range", c);
            }
            assert!((0.0..TAU).contains(&t.rotation.x.0));
            assert!((0.0..TAU).contains(&t.rotation.y.0));
            assert!((0.0..1.0).contains(&t.scale.x));
            assert!(t.scale.x == t.scale.y && t.scale.y == t.scale.z);
        }
    }
}

#[test]
fn same_seed_gives_same_field() {
    let a = scene_context(42);
    let b = scene_context(42);
    let transforms = |ctx: &star_donuts::context::SceneContext| {
        ctx.animated
            .iter()
            .map(|id| ctx.scene.node(id).unwrap().transform)
            .collect::<Vec<_>>()
    };
    assert_eq!(transforms(&a), transforms(&b));
}

#[test]
fn donut_count_follows_config() {
    let mut config = SceneConfig::default();
    config.donuts.count = 0;
    let mut scene = Scene::new();
    let composition = compose(&mut scene, &config, 1.0, &mut StdRng::seed_from_u64(0));
    assert!(composition.animated.is_empty());
    assert_eq!(scene.len(), 3);
}

#[tokio::test]
async fn failed_font_load_leaves_the_rest_of_the_scene() {
    let mut ctx = scene_context(3);
    let font = fixtures().load_font(BROKEN_FONT).await;
    assert!(font.is_err());

    assert_eq!(ctx.attach_text(font, &text_config()), None);
    assert_eq!(ctx.scene.len(), 103);
    assert_eq!(ctx.animated.len(), 100);
    assert!(ctx.text.is_none());

    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();
    for _ in 0..10 {
        clock.advance(1.0 / 60.0);
        assert_eq!(
            frame_loop.tick(&mut ctx, &mut controls, &mut renderer),
            TickOutcome::Rendered
        );
    }
    assert_eq!(renderer.renders(), 10);
    assert_eq!(ctx.scene.len(), 103);
}

#[tokio::test]
async fn missing_font_file_leaves_the_rest_of_the_scene() {
    let mut ctx = scene_context(3);
    let font = fixtures().load_font("font/nope.typeface.json").await;
    assert_eq!(ctx.attach_text(font, &text_config()), None);
    assert_eq!(ctx.scene.len(), 103);
}

#[tokio::test]
async fn loaded_font_adds_one_centred_text_node() {
    let mut ctx = scene_context(4);
    let text = ctx
        .attach_text(Ok(fixture_font().await), &text_config())
        .expect("text node");

    assert_eq!(ctx.scene.len(), 104);
    assert!(!ctx.animated.contains(text));

    let node = ctx.scene.node(text).unwrap();
    let NodeKind::Mesh(mesh) = node.kind else {
        panic!("text is not a mesh");
    };
    assert_eq!(mesh.material, ctx.text_material);

    let (min, max) = ctx.scene.geometry(mesh.geometry).unwrap().bounding_box().unwrap();
    let centre = (min + max) * 0.5;
    assert!(centre.x.abs() < 1e-4 && centre.y.abs() < 1e-4 && centre.z.abs() < 1e-4);
    assert!(max.x - min.x > 1.0, "title should be wider than one em");
}

#[tokio::test]
async fn text_is_attached_only_once() {
    let mut ctx = scene_context(5);
    let first = ctx.attach_text(Ok(fixture_font().await), &text_config());
    let second = ctx.attach_text(Ok(fixture_font().await), &text_config());
    assert_eq!(first, second);
    assert_eq!(ctx.scene.len(), 104);
}

#[tokio::test]
async fn ticks_never_move_the_text() {
    let mut ctx = scene_context(6);
    let text = ctx
        .attach_text(Ok(fixture_font().await), &text_config())
        .unwrap();
    let before = ctx.scene.node(text).unwrap().transform;

    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone(), RunFlag::new());
    let mut renderer = RecordingRenderer::new();
    let mut controls = CountingControls::default();
    for _ in 0..5 {
        clock.advance(0.7);
        frame_loop.tick(&mut ctx, &mut controls, &mut renderer);
    }

    assert_eq!(renderer.renders(), 5);
    assert_eq!(ctx.scene.node(text).unwrap().transform, before);
}
