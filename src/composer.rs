//! Builds the demo scene.
//!
//! [`compose`] runs once at startup and fills the scene with lights, the
//! camera and the donut field. The title text depends on a font that arrives
//! later, so it is added separately by [`attach_text`] once the font load has
//! settled, whichever way it went.

use std::f32::consts::TAU;

use cgmath::Vector3;
use rand::Rng;

use crate::{
    camera::PerspectiveCamera,
    config::{SceneConfig, TextConfig},
    data_structures::{
        geometry::Geometry,
        instance::Transform,
        scene_graph::{MaterialId, MeshRef, Node, NodeId, NodeKind, Scene},
    },
    text::{Font, text_geometry},
};

/// The nodes the frame loop rotates every tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimatedMeshSet {
    nodes: Vec<NodeId>,
}

impl AnimatedMeshSet {
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }
}

#[derive(Debug)]
pub struct Composition {
    pub animated: AnimatedMeshSet,
    pub camera: NodeId,
    /// Material the title text is drawn with once the font has loaded.
    pub text_material: MaterialId,
}

/// One donut scattered inside the configured cube, with random x/y rotation
/// and a random uniform scale in `[0, 1)`.
pub fn random_donut_transform(rng: &mut impl Rng, spread: f32) -> Transform {
    let mut transform = Transform::new();
    transform.position = Vector3::new(
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
    );
    transform.rotation.x = cgmath::Rad(rng.random_range(0.0..TAU));
    transform.rotation.y = cgmath::Rad(rng.random_range(0.0..TAU));
    transform.set_uniform_scale(rng.random::<f32>());
    transform
}

/// Fill `scene` with the lights, the camera and the donut field.
///
/// `aspect` is the initial viewport aspect ratio of the camera.
pub fn compose(
    scene: &mut Scene,
    config: &SceneConfig,
    aspect: f32,
    rng: &mut impl Rng,
) -> Composition {
    let lights = &config.lights;
    scene.add(Node::new("ambient light", NodeKind::AmbientLight(lights.ambient)));
    scene.add(
        Node::new("point light", NodeKind::PointLight(lights.point))
            .with_transform(Transform::from(lights.point_position)),
    );

    let camera_config = &config.camera;
    let mut camera = PerspectiveCamera::new(
        camera_config.fov,
        aspect,
        camera_config.near,
        camera_config.far,
    );
    camera.target = camera_config.target;
    let camera = scene.add(
        Node::new("camera", NodeKind::Camera(camera))
            .with_transform(Transform::from(camera_config.position)),
    );

    let torus = scene.add_geometry(Geometry::torus(&config.donuts.torus));
    let donut_material = scene.add_material(config.donut_material.clone());
    let text_material = scene.add_material(config.text_material.clone());

    let mesh = MeshRef {
        geometry: torus,
        material: donut_material,
    };
    let nodes = (0..config.donuts.count)
        .map(|i| {
            let transform = random_donut_transform(rng, config.donuts.spread);
            scene.add(Node::new(&format!("donut {}", i), NodeKind::Mesh(mesh)).with_transform(transform))
        })
        .collect();

    log::info!(
        "composed scene: {} donuts, {} nodes",
        config.donuts.count,
        scene.len()
    );

    Composition {
        animated: AnimatedMeshSet { nodes },
        camera,
        text_material,
    }
}

/// Continuation of the font load: add the centred title on success, log and
/// carry on without it on failure.
///
/// The text node is never part of the animated set.
pub fn attach_text(
    scene: &mut Scene,
    font: anyhow::Result<Font>,
    config: &TextConfig,
    material: MaterialId,
) -> Option<NodeId> {
    let font = match font {
        Ok(font) => font,
        Err(e) => {
            log::error!("Font {} could not be loaded, continuing without text: {:#}", config.font, e);
            return None;
        }
    };

    let mut geometry = text_geometry(&font, &config.content, &config.params);
    if geometry.vertices.is_empty() {
        log::warn!("text {:?} produced no geometry", config.content);
        return None;
    }
    geometry.center();

    let geometry = scene.add_geometry(geometry);
    let node = scene.add(Node::new(
        "text",
        NodeKind::Mesh(MeshRef { geometry, material }),
    ));
    log::info!("added text {:?}", config.content);
    Some(node)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn donut_transforms_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let t = random_donut_transform(&mut rng, 10.0);
            for c in [t.position.x, t.position.y, t.position.z] {
                assert!((-5.0..=5.0).contains(&c));
            }
            assert!((0.0..TAU).contains(&t.rotation.x.0));
            assert!((0.0..TAU).contains(&t.rotation.y.0));
            assert_eq!(t.rotation.z.0, 0.0);
            assert!((0.0..1.0).contains(&t.scale.x));
            assert_eq!(t.scale.x, t.scale.y);
            assert_eq!(t.scale.y, t.scale.z);
        }
    }
}
