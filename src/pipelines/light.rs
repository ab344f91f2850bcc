use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::{NodeKind, Scene};

/// Lights as seen by the shader: summed ambient light and one point light.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Ambient colour premultiplied by its intensity.
    ambient: [f32; 3],
    point_decay: f32,
    point_position: [f32; 3],
    point_distance: f32,
    /// Point light colour premultiplied by its intensity.
    point_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: f32,
}

impl LightUniform {
    /// Collect the lights of `scene`. Ambient lights add up; the first point
    /// light wins. Without a point light the point term is black.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut uniform: Self = bytemuck::Zeroable::zeroed();
        let mut has_point = false;
        for (_, node) in scene.nodes() {
            match &node.kind {
                NodeKind::AmbientLight(light) => {
                    for (c, l) in uniform.ambient.iter_mut().zip(light.color) {
                        *c += l * light.intensity;
                    }
                }
                NodeKind::PointLight(light) if !has_point => {
                    has_point = true;
                    uniform.point_position = node.transform.position.into();
                    uniform.point_color = light.color.map(|c| c * light.intensity);
                    uniform.point_distance = light.distance;
                    uniform.point_decay = light.decay;
                }
                _ => (),
            }
        }
        uniform
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform: LightUniform = bytemuck::Zeroable::zeroed();
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Upload the lights of `scene`, skipping the write when nothing changed.
    pub fn write(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        let uniform = LightUniform::from_scene(scene);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}

fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;
    use crate::data_structures::{
        instance::Transform,
        light::{AmbientLight, PointLight},
        scene_graph::Node,
    };

    #[test]
    fn collects_scene_lights() {
        let mut scene = Scene::new();
        scene.add(Node::new("ambient", NodeKind::AmbientLight(AmbientLight::new(0xffffff, 0.5))));
        scene.add(
            Node::new("point", NodeKind::PointLight(PointLight::new(0xff0000, 30.0)))
                .with_transform(Transform::from(Vector3::new(0.0, 3.0, 4.0))),
        );

        let uniform = LightUniform::from_scene(&scene);
        assert_eq!(uniform.ambient, [0.5, 0.5, 0.5]);
        assert_eq!(uniform.point_position, [0.0, 3.0, 4.0]);
        assert_eq!(uniform.point_color, [30.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_is_padded_to_16_bytes() {
        assert_eq!(std::mem::size_of::<LightUniform>() % 16, 0);
    }
}
