//! GPU resource creation helpers.

use crate::constants::formats;
use crate::constants::shadow::NUM_CASCADES;
use crate::uniforms::align_to;

/// Texture together with its default view.
pub struct TextureTarget {
    /// The texture.
    pub texture: wgpu::Texture,
    /// Full view of the texture.
    pub view: wgpu::TextureView,
}

/// Create a 2D render target.
pub fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    size: [u32; 2],
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> TextureTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    TextureTarget { texture, view }
}

/// Usage of per-view textures that callers may sample afterwards.
pub fn view_texture_usage() -> wgpu::TextureUsages {
    wgpu::TextureUsages::RENDER_ATTACHMENT
        | wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_SRC
}

/// Cascade array with one sampling view and one render view per layer.
pub struct ShadowTextures {
    /// Depth array texture.
    pub texture: wgpu::Texture,
    /// `D2Array` view used by forward shading.
    pub array_view: wgpu::TextureView,
    /// Single-layer views used as caster pass attachments.
    pub layer_views: Vec<wgpu::TextureView>,
    /// Width and height of each layer.
    pub resolution: u32,
}

/// Create the cascade array. A resolution of 1 yields the placeholder bound
/// when shadows are disabled.
pub fn create_shadow_textures(device: &wgpu::Device, resolution: u32) -> ShadowTextures {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shadow Cascade Texture"),
        size: wgpu::Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: NUM_CASCADES as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: formats::DEPTH,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Shadow Cascade Array View"),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        array_layer_count: Some(NUM_CASCADES as u32),
        ..Default::default()
    });

    let layer_views = (0..NUM_CASCADES as u32)
        .map(|layer| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(&format!("Shadow Cascade {layer} View")),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: layer,
                array_layer_count: Some(1),
                ..Default::default()
            })
        })
        .collect();

    ShadowTextures {
        texture,
        array_view,
        layer_views,
        resolution,
    }
}

/// Comparison sampler for percentage-closer filtering.
pub fn create_shadow_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Shadow Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    })
}

/// Layout of group 0: scene uniforms, cascade array and comparison sampler.
pub fn create_scene_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Scene Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
    })
}

/// Bind group for group 0.
pub fn create_scene_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene_buffer: &wgpu::Buffer,
    cascades: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(cascades),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Layout with a single texture at binding 0, read with `textureLoad`.
pub fn create_texture_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    sample_type: wgpu::TextureSampleType,
    multisampled: bool,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{label} Bind Group Layout")),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled,
            },
            count: None,
        }],
    })
}

/// Bind group for [`create_texture_bind_group_layout`].
pub fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(view),
        }],
    })
}

/// Uniform buffer holding one element per slot at an aligned stride,
/// addressed with dynamic offsets.
pub struct DynamicUniformBuffer {
    /// The buffer.
    pub buffer: wgpu::Buffer,
    /// Distance between slots in bytes.
    pub stride: u64,
    /// Size of one element in bytes.
    pub element_size: u64,
    /// Slots the buffer holds.
    pub capacity: usize,
    label: &'static str,
}

impl DynamicUniformBuffer {
    /// Allocate room for `capacity` elements of `element_size` bytes.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        element_size: u64,
        capacity: usize,
    ) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(element_size, alignment);
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            stride,
            element_size,
            capacity,
            label,
        }
    }

    /// Make room for `count` elements. Returns true if the buffer was
    /// reallocated and bind groups referencing it must be rebuilt.
    pub fn reserve(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        let capacity = count.next_power_of_two();
        tracing::debug!(
            "Growing {} from {} to {} slots",
            self.label,
            self.capacity,
            capacity
        );
        *self = Self::new(device, self.label, self.element_size, capacity);
        true
    }

    /// Dynamic offset of `slot`.
    pub fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (self.stride * slot as u64) as wgpu::DynamicOffset
    }

    /// Size of the binding seen by the shader.
    pub fn binding_size(&self) -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(self.element_size)
    }

    /// Upload `elements` starting at slot 0.
    pub fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, elements: &[T]) {
        if elements.is_empty() {
            return;
        }
        queue.write_buffer(&self.buffer, 0, &pack_strided(elements, self.stride as usize));
    }
}

/// Lay `elements` out at `stride` bytes apart.
pub fn pack_strided<T: bytemuck::Pod>(elements: &[T], stride: usize) -> Vec<u8> {
    let size = std::mem::size_of::<T>();
    let mut bytes = vec![0u8; stride * elements.len()];
    for (i, element) in elements.iter().enumerate() {
        let start = i * stride;
        bytes[start..start + size].copy_from_slice(bytemuck::bytes_of(element));
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_strided() {
        let bytes = pack_strided(&[1u32, 2, 3], 8);
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[0..4], &1u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &[0; 4]);
        assert_eq!(&bytes[8..12], &2u32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &3u32.to_ne_bytes());
    }
}
