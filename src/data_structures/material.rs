//! Physically based material parameters and their GPU bindings.
//!
//! A [`MaterialDesc`] is plain data owned by the scene. Mesh nodes refer to it
//! by id, so every node sharing a material is shaded identically. The renderer
//! turns each description into a [`Material`]: a uniform buffer plus a bind
//! group that pairs it with the base colour map (or a white fallback until
//! the map has been decoded).

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    /// Asset path of the base colour map.
    pub map: Option<String>,
    pub metalness: f32,
    pub roughness: f32,
    pub iridescence: f32,
    pub iridescence_ior: f32,
    /// Thin-film thickness range in nanometres.
    pub iridescence_thickness_range: [f32; 2],
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: "material".to_string(),
            map: None,
            metalness: 0.0,
            roughness: 1.0,
            iridescence: 0.0,
            iridescence_ior: 1.3,
            iridescence_thickness_range: [100.0, 400.0],
        }
    }
}

impl MaterialDesc {
    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            metalness: self.metalness,
            roughness: self.roughness,
            iridescence: self.iridescence,
            iridescence_ior: self.iridescence_ior,
            thickness_range: self.iridescence_thickness_range,
            _padding: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    metalness: f32,
    roughness: f32,
    iridescence: f32,
    iridescence_ior: f32,
    thickness_range: [f32; 2],
    // Uniform structs are padded to 16 bytes
    _padding: [f32; 2],
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub map: Option<String>,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    /// `true` while the bind group still points at the fallback texture.
    pub uses_fallback: bool,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        desc: &MaterialDesc,
        map: &Texture,
        uses_fallback: bool,
        layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", desc.name)),
            contents: bytemuck::cast_slice(&[desc.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(device, &desc.name, map, &uniform_buffer, layout)?;
        Ok(Self {
            name: desc.name.clone(),
            map: desc.map.clone(),
            uniform_buffer,
            bind_group,
            uses_fallback,
        })
    }

    /// Rebind the material to a newly decoded base colour map.
    pub fn set_map(
        &mut self,
        device: &wgpu::Device,
        map: &Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<()> {
        self.bind_group = mk_bind_group(device, &self.name, map, &self.uniform_buffer, layout)?;
        self.uses_fallback = false;
        Ok(())
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    name: &str,
    map: &Texture,
    uniform_buffer: &wgpu::Buffer,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<wgpu::BindGroup> {
    let Some(sampler) = map.sampler.as_ref() else {
        anyhow::bail!("texture bound to material {name} has no sampler");
    };
    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&map.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
        label: Some(name),
    }))
}
