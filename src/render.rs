//! Drawing the scene.
//!
//! The frame loop and the resize handler only talk to the [`Renderer`] trait.
//! [`GpuRenderer`] is the wgpu implementation. It keeps GPU copies of the
//! scene's shared geometries and materials and draws mesh nodes in instanced
//! batches, one draw call per (geometry, material) pair.
//!
//! Sizes follow the web convention: `set_size` takes the logical size and the
//! drawing buffer is that size times the pixel ratio.

use std::collections::{BTreeMap, HashMap};

use anyhow::bail;

use crate::{
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        material::Material,
        model::{DrawModel, Mesh},
        scene_graph::{GeometryId, MaterialId, NodeId, NodeKind, Scene},
        texture::Texture,
    },
};

pub trait Renderer {
    /// Draw `scene` as seen from the camera node `camera`.
    fn render(&mut self, scene: &Scene, camera: NodeId) -> anyhow::Result<()>;

    /// Logical output size.
    fn set_size(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, pixel_ratio: f64);

    fn size(&self) -> (u32, u32);

    fn pixel_ratio(&self) -> f64;
}

/// Drawing-buffer size for a logical size and pixel ratio.
pub fn drawing_buffer_size(size: (u32, u32), pixel_ratio: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * pixel_ratio).round() as u32).max(1);
    (scale(size.0), scale(size.1))
}

#[derive(Debug)]
struct InstanceBatch {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBatch {
    fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            count: 0,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[InstanceRaw]) {
        if instances.len() > self.capacity {
            *self = Self::new(device, instances.len().next_power_of_two());
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        self.count = instances.len() as u32;
    }
}

#[derive(Debug)]
pub struct GpuRenderer {
    ctx: Context,
    meshes: HashMap<GeometryId, Mesh>,
    materials: HashMap<MaterialId, Material>,
    /// Decoded maps by asset path.
    textures: HashMap<String, Texture>,
    batches: HashMap<(GeometryId, MaterialId), InstanceBatch>,
    size: (u32, u32),
    pixel_ratio: f64,
    surface_dirty: bool,
}

impl GpuRenderer {
    pub fn new(ctx: Context) -> Self {
        let size = (ctx.config.width, ctx.config.height);
        Self {
            ctx,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            batches: HashMap::new(),
            size,
            pixel_ratio: 1.0,
            surface_dirty: true,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Make a decoded map available under its asset path. Materials using it
    /// switch over from the fallback on the next frame.
    pub fn set_texture(&mut self, path: &str, image: &image::DynamicImage) -> anyhow::Result<()> {
        let texture = Texture::from_image(&self.ctx.device, &self.ctx.queue, image, Some(path))?;
        self.textures.insert(path.to_string(), texture);
        Ok(())
    }

    fn reconfigure_surface(&mut self) {
        let (width, height) = drawing_buffer_size(self.size, self.pixel_ratio);
        self.ctx.configure_surface(width, height);
        self.surface_dirty = false;
    }

    fn sync_resources(&mut self, scene: &Scene) -> anyhow::Result<()> {
        for (id, geometry) in scene.geometries() {
            if geometry.indices.is_empty() || self.meshes.contains_key(&id) {
                continue;
            }
            self.meshes
                .insert(id, Mesh::from_geometry(&self.ctx.device, geometry));
        }

        for (id, desc) in scene.materials() {
            let map = desc.map.as_ref().and_then(|path| self.textures.get(path));
            match self.materials.get_mut(&id) {
                Some(material) => {
                    if let (true, Some(map)) = (material.uses_fallback, map) {
                        material.set_map(&self.ctx.device, map, &self.ctx.material_layout)?;
                        log::info!("material {} switched to its map", material.name);
                    }
                }
                None => {
                    let material = Material::new(
                        &self.ctx.device,
                        desc,
                        map.unwrap_or(&self.ctx.fallback_texture),
                        map.is_none(),
                        &self.ctx.material_layout,
                    )?;
                    self.materials.insert(id, material);
                }
            }
        }
        Ok(())
    }

    fn collect_instances(
        scene: &Scene,
    ) -> anyhow::Result<BTreeMap<(GeometryId, MaterialId), Vec<InstanceRaw>>> {
        let mut batches: BTreeMap<_, Vec<InstanceRaw>> = BTreeMap::new();
        for (id, node) in scene.nodes() {
            let NodeKind::Mesh(mesh) = &node.kind else {
                continue;
            };
            if !node.transform.is_finite() {
                bail!("node {:?} ({}) has a non-finite transform", id, node.name);
            }
            batches
                .entry((mesh.geometry, mesh.material))
                .or_default()
                .push(node.transform.to_raw());
        }
        Ok(batches)
    }
}

impl Renderer for GpuRenderer {
    fn render(&mut self, scene: &Scene, camera: NodeId) -> anyhow::Result<()> {
        let (transform, projection) = scene.camera(camera)?;
        if !transform.is_finite() {
            bail!("camera has a non-finite transform");
        }
        let instances = Self::collect_instances(scene)?;

        if self.surface_dirty {
            self.reconfigure_surface();
        }
        self.sync_resources(scene)?;

        self.ctx
            .camera
            .write(&self.ctx.queue, transform.position, projection);
        self.ctx.light.write(&self.ctx.queue, scene);

        self.batches.retain(|key, _| instances.contains_key(key));
        for (key, raw) in &instances {
            let batch = self
                .batches
                .entry(*key)
                .or_insert_with(|| InstanceBatch::new(&self.ctx.device, raw.len()));
            batch.upload(&self.ctx.device, &self.ctx.queue, raw);
        }

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated and skip this frame
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.reconfigure_surface();
                return Ok(());
            }
            Err(e) => bail!("unable to acquire the next frame: {}", e),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.ctx.pipeline);
            for ((geometry, material), batch) in &self.batches {
                let (Some(mesh), Some(material)) =
                    (self.meshes.get(geometry), self.materials.get(material))
                else {
                    continue;
                };
                if batch.count == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, batch.buffer.slice(..));
                render_pass.draw_mesh_instanced(
                    mesh,
                    &material.bind_group,
                    0..batch.count,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.ctx.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size != self.size {
            self.size = size;
            self.surface_dirty = true;
        }
    }

    fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        if pixel_ratio != self.pixel_ratio {
            self.pixel_ratio = pixel_ratio;
            self.surface_dirty = true;
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_buffer_scales_with_ratio() {
        assert_eq!(drawing_buffer_size((800, 600), 2.0), (1600, 1200));
        assert_eq!(drawing_buffer_size((333, 1), 1.5), (500, 2));
        assert_eq!(drawing_buffer_size((1, 1), 0.1), (1, 1));
    }
}
