//! The scene graph: a flat root holding lights, the camera and mesh nodes.
//!
//! Nodes are stored in slots and addressed by [`NodeId`]. A removed node leaves
//! an empty slot behind, so ids handed out earlier never start pointing at a
//! different node. Geometries and materials live in registries of their own;
//! a mesh node only stores the ids of the ones it uses, which makes sharing
//! one geometry or material between many nodes free.

use anyhow::{Context, bail};

use crate::{
    camera::PerspectiveCamera,
    data_structures::{
        geometry::Geometry,
        instance::Transform,
        light::{AmbientLight, PointLight},
        material::MaterialDesc,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshRef {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    AmbientLight(AmbientLight),
    PointLight(PointLight),
    Camera(PerspectiveCamera),
    Mesh(MeshRef),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            kind,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    geometries: Vec<Geometry>,
    materials: Vec<MaterialDesc>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.get_mut(id.0).and_then(Option::take)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// All attached nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|node| (NodeId(idx), node)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &Geometry)> {
        self.geometries
            .iter()
            .enumerate()
            .map(|(idx, geometry)| (GeometryId(idx), geometry))
    }

    pub fn add_material(&mut self, material: MaterialDesc) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&MaterialDesc> {
        self.materials.get(id.0)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &MaterialDesc)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, material)| (MaterialId(idx), material))
    }

    /// The transform and projection of a camera node.
    pub fn camera(&self, id: NodeId) -> anyhow::Result<(&Transform, &PerspectiveCamera)> {
        let node = self
            .node(id)
            .with_context(|| format!("camera node {:?} is not in the scene", id))?;
        match &node.kind {
            NodeKind::Camera(camera) => Ok((&node.transform, camera)),
            _ => bail!("node {:?} ({}) is not a camera", id, node.name),
        }
    }

    pub fn camera_mut(
        &mut self,
        id: NodeId,
    ) -> anyhow::Result<(&mut Transform, &mut PerspectiveCamera)> {
        let node = self
            .node_mut(id)
            .with_context(|| format!("camera node {:?} is not in the scene", id))?;
        match &mut node.kind {
            NodeKind::Camera(camera) => Ok((&mut node.transform, camera)),
            _ => bail!("node {:?} ({}) is not a camera", id, node.name),
        }
    }
}
