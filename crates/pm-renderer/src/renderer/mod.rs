//! Forward PBR render system.
//!
//! Owns the mesh, material and light components, every GPU target and the
//! cascaded shadow state. [`PbrRenderSystem::render_frame`] consumes a
//! [`RenderPayload`] and executes the [`FramePlan`] built from the settings.

mod gpu_resources;
mod render_pass;
mod shadow_pass;
mod storage;

pub use storage::{Draw, RenderComponents};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use bytemuck::Zeroable;
use glam::Vec3;
use pm_core::{ComponentSource, Entity, PolyTypeId, System, TypeRegistry};
use wgpu::util::DeviceExt;

use crate::cascades::StableCascadedShadows;
use crate::components::{MaterialComponent, MeshComponent};
use crate::constants::lighting::MAX_POINT_LIGHTS;
use crate::constants::{buffers, formats};
use crate::frustum::Frustum;
use crate::light::{DirectionalLight, DirectionalLightComponent, PointLightComponent, pack_point_lights};
use crate::material::{FrameLayouts, MaterialId, ShadowBinding, TargetFormats};
use crate::payload::RenderPayload;
use crate::pipeline::{PipelineConfig, create_uniform_bind_group, uniform_bind_group_layout};
use crate::plan::{FramePlan, Pass};
use crate::profiling::CpuProfiler;
use crate::render_queue::RenderQueue;
use crate::settings::RendererSettings;
use crate::uniforms::{ObjectUniform, PointLightUniform, SceneUniform, ViewUniform};
use crate::vertex::MeshVertex;
use crate::view::{ViewData, merged_center_view};

use gpu_resources::{DynamicUniformBuffer, ShadowTextures, TextureTarget};
use render_pass::{FrameBindings, ObjectBindings, ViewAttachments};
use shadow_pass::ShadowPass;

const PREPASS_SHADER: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/depth_prepass.wgsl")
);

/// Targets and uniforms of one camera.
struct ViewTargets {
    color: TextureTarget,
    depth: TextureTarget,
    post: Option<TextureTarget>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    tonemap_bind_group: Option<wgpu::BindGroup>,
}

/// Cascade array, or a one-texel stand-in bound when shadows are off.
enum ShadowState {
    Enabled(ShadowPass),
    Disabled(ShadowTextures),
}

impl ShadowState {
    fn array_view(&self) -> &wgpu::TextureView {
        match self {
            ShadowState::Enabled(pass) => &pass.textures().array_view,
            ShadowState::Disabled(fallback) => &fallback.array_view,
        }
    }

    fn pass(&self) -> Option<&ShadowPass> {
        match self {
            ShadowState::Enabled(pass) => Some(pass),
            ShadowState::Disabled(_) => None,
        }
    }
}

/// Shared multisampled attachments, resolved into each view in turn.
struct MsaaTargets {
    color: TextureTarget,
    depth: TextureTarget,
    depth_resolve_pipeline: wgpu::RenderPipeline,
    depth_resolve_bind_group: wgpu::BindGroup,
}

/// Render system drawing the payload's render set into one texture per
/// camera.
pub struct PbrRenderSystem {
    settings: RendererSettings,
    components: RenderComponents,
    layouts: FrameLayouts,
    formats: TargetFormats,
    views: Vec<ViewTargets>,
    msaa: Option<MsaaTargets>,
    shadow: ShadowState,
    cascades: StableCascadedShadows,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    objects: DynamicUniformBuffer,
    object_bind_group: wgpu::BindGroup,
    prepass_pipeline: Option<wgpu::RenderPipeline>,
    tonemap_pipeline: Option<wgpu::RenderPipeline>,
    profiler: CpuProfiler,
    started: Instant,
}

impl PbrRenderSystem {
    /// Allocate every target the settings call for.
    ///
    /// # Panics
    ///
    /// Panics if the settings are invalid.
    pub fn new(device: &wgpu::Device, types: &mut TypeRegistry, settings: RendererSettings) -> Self {
        if let Err(err) = settings.validate() {
            panic!("invalid renderer settings: {err}");
        }

        let [width, height] = settings.render_size;
        tracing::info!(
            "Creating PBR renderer: {} view(s) at {}x{}, msaa x{}",
            settings.camera_count,
            width,
            height,
            settings.msaa_samples
        );

        let components = RenderComponents::new(types);
        let sample_count = settings.msaa_samples;
        let target_formats = TargetFormats {
            color: formats::COLOR,
            depth: formats::DEPTH,
            sample_count,
            depth_prepass: settings.use_depth_prepass,
        };

        let layouts = FrameLayouts {
            scene: Arc::new(gpu_resources::create_scene_bind_group_layout(device)),
            view: Arc::new(uniform_bind_group_layout(
                device,
                "View",
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                false,
            )),
            object: Arc::new(uniform_bind_group_layout(
                device,
                "Object",
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                true,
            )),
        };

        let objects = DynamicUniformBuffer::new(
            device,
            "Object Uniform Buffer",
            std::mem::size_of::<ObjectUniform>() as u64,
            buffers::INITIAL_OBJECT_CAPACITY,
        );
        let object_bind_group = create_object_bind_group(device, &layouts, &objects);

        let shadow = if settings.shadows_enabled {
            ShadowState::Enabled(ShadowPass::new(device, settings.shadow.resolution, &layouts.object))
        } else {
            ShadowState::Disabled(gpu_resources::create_shadow_textures(device, 1))
        };

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&SceneUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_sampler = gpu_resources::create_shadow_sampler(device);
        let scene_bind_group = gpu_resources::create_scene_bind_group(
            device,
            &layouts.scene,
            &scene_buffer,
            shadow.array_view(),
            &shadow_sampler,
        );

        let tonemap_layout = settings.tonemap_enabled.then(|| {
            gpu_resources::create_texture_bind_group_layout(
                device,
                "Tonemap",
                wgpu::TextureSampleType::Float { filterable: false },
                false,
            )
        });
        let tonemap_pipeline = tonemap_layout.as_ref().map(|layout| {
            let bind_group_layouts = [layout];
            PipelineConfig::new(
                "Tonemap",
                include_str!("../shaders/tonemap.wgsl"),
                Some(formats::POST),
                None,
                &bind_group_layouts,
            )
            .with_cull_mode(None)
            .build(device)
        });

        let views = (0..settings.camera_count)
            .map(|i| create_view_targets(device, &settings, &layouts, tonemap_layout.as_ref(), i))
            .collect();

        let msaa = settings
            .multisampled()
            .then(|| create_msaa_targets(device, &settings));

        let prepass_pipeline = settings.use_depth_prepass.then(|| {
            let bind_group_layouts = [
                layouts.scene.as_ref(),
                layouts.view.as_ref(),
                layouts.object.as_ref(),
            ];
            PipelineConfig::new(
                "Depth Prepass",
                PREPASS_SHADER,
                None,
                Some(formats::DEPTH),
                &bind_group_layouts,
            )
            .with_vertex_layouts(vec![MeshVertex::layout()])
            .with_sample_count(sample_count)
            .build(device)
        });

        let profiler = CpuProfiler::new(settings.performance_profiling);
        let cascades = StableCascadedShadows::from_config(&settings.shadow);

        Self {
            settings,
            components,
            layouts,
            formats: target_formats,
            views,
            msaa,
            shadow,
            cascades,
            scene_buffer,
            scene_bind_group,
            objects,
            object_bind_group,
            prepass_pipeline,
            tonemap_pipeline,
            profiler,
            started: Instant::now(),
        }
    }

    /// Render one frame.
    ///
    /// # Panics
    ///
    /// Panics if the payload does not carry one view per camera, or if more
    /// point lights are active than the scene uniform holds.
    pub fn render_frame(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, payload: &RenderPayload) {
        assert_eq!(
            payload.views.len(),
            self.settings.camera_count as usize,
            "payload carries {} views, renderer expects {}",
            payload.views.len(),
            self.settings.camera_count
        );

        let sun = self.components.sunlight(payload.sunlight);
        let plan = FramePlan::build(&self.settings, sun.is_some());
        tracing::trace!("Frame plan: {}", plan);
        if self.shadow.pass().is_some() && sun.is_none() {
            tracing::debug!("No sunlight; skipping shadow pass");
        }

        let (point_lights, point_light_count) =
            pack_point_lights(self.components.point_lights_with(&payload.point_lights));

        let cull_view = culling_view(&payload.views);

        let draws = self.components.collect_draws(&payload.render_set);
        self.upload_objects(device, queue, &draws);

        let shadows_active = plan.contains(Pass::Shadow);
        if let (true, Some(sun)) = (shadows_active, sun) {
            self.cascades.update_cascades(
                cull_view.view_matrix,
                cull_view.near_clip,
                cull_view.far_clip,
                cull_view.aspect(),
                cull_view.vfov(),
                sun.direction,
            );
            if let Some(shadow) = self.shadow.pass() {
                shadow.update(queue, &self.cascades);
            }
        }

        self.upload_scene(queue, sun, point_lights, point_light_count, shadows_active);
        self.update_materials(queue, payload, &draws, shadows_active);

        let frustums = culling_frustums(&payload.views);
        let render_queue = build_render_queue(cull_view.pose.position, &frustums, &draws);
        tracing::trace!(
            "Queued {} of {} draws",
            render_queue.len(),
            draws.len()
        );

        let mut encoder = create_encoder(device);
        for &pass in plan.passes() {
            self.profiler.begin(pass.label());
            match pass {
                Pass::Shadow => {
                    if let Some(shadow) = self.shadow.pass() {
                        shadow.encode(&mut encoder, &draws, &self.object_bindings());
                    }
                    flush(device, queue, &mut encoder);
                }
                Pass::ViewUniforms(i) => {
                    flush(device, queue, &mut encoder);
                    let view = &payload.views[i];
                    let eye = view.pose.position;
                    let uniform = ViewUniform::new(view.view_matrix, view.view_proj_matrix, eye);
                    queue.write_buffer(&self.views[i].uniform_buffer, 0, bytemuck::bytes_of(&uniform));
                    if let Some(skybox) = &payload.skybox {
                        skybox.prepare(queue, view);
                    }
                }
                Pass::Clear(i) => {
                    render_pass::clear(&mut encoder, self.attachments(i), payload.clear_color);
                }
                Pass::DepthPrepass(i) => {
                    if let Some(pipeline) = &self.prepass_pipeline {
                        render_pass::depth_prepass(
                            &mut encoder,
                            self.attachments(i),
                            pipeline,
                            &self.frame_bindings(i),
                            &render_queue,
                            &draws,
                        );
                    }
                }
                Pass::Skybox(i) => {
                    if let Some(skybox) = &payload.skybox {
                        render_pass::skybox(&mut encoder, self.attachments(i), skybox.as_ref());
                    }
                }
                Pass::Forward(i) => {
                    render_pass::forward(
                        &mut encoder,
                        self.attachments(i),
                        &self.frame_bindings(i),
                        &render_queue,
                        &draws,
                    );
                }
                Pass::Resolve(i) => {
                    if let Some(msaa) = &self.msaa {
                        let target = &self.views[i];
                        render_pass::resolve_color(&mut encoder, &msaa.color.view, &target.color.view);
                        render_pass::fullscreen(
                            &mut encoder,
                            "Depth Resolve Pass",
                            &msaa.depth_resolve_pipeline,
                            &msaa.depth_resolve_bind_group,
                            None,
                            Some(&target.depth.view),
                        );
                    }
                }
                Pass::Tonemap(i) => {
                    let target = &self.views[i];
                    if let (Some(pipeline), Some(bind_group), Some(post)) = (
                        &self.tonemap_pipeline,
                        &target.tonemap_bind_group,
                        &target.post,
                    ) {
                        render_pass::fullscreen(
                            &mut encoder,
                            "Tonemap Pass",
                            pipeline,
                            bind_group,
                            Some(&post.view),
                            None,
                        );
                    }
                }
            }
            self.profiler.end(pass.label());
        }
        queue.submit(Some(encoder.finish()));
    }

    /// Texture callers display for view `index`: the tonemapped texture when
    /// tonemapping, else the HDR view color.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a camera index.
    pub fn get_color_texture(&self, index: usize) -> &wgpu::Texture {
        let target = self.view_targets(index);
        match &target.post {
            Some(post) => &post.texture,
            None => &target.color.texture,
        }
    }

    /// Resolved depth of view `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a camera index.
    pub fn get_depth_texture(&self, index: usize) -> &wgpu::Texture {
        &self.view_targets(index).depth.texture
    }

    /// Cascades from the last frame that rendered shadows.
    pub fn shadow_cascades(&self) -> &StableCascadedShadows {
        &self.cascades
    }

    /// Settings the renderer was built with.
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Formats material pipelines must target.
    pub fn target_formats(&self) -> TargetFormats {
        self.formats
    }

    /// Layouts of groups 0 to 2 for material pipelines.
    pub fn frame_layouts(&self) -> &FrameLayouts {
        &self.layouts
    }

    /// Per-pass CPU timings.
    pub fn profiler(&self) -> &CpuProfiler {
        &self.profiler
    }

    /// Mutable profiler, e.g. to reset it.
    pub fn profiler_mut(&mut self) -> &mut CpuProfiler {
        &mut self.profiler
    }

    /// Component storage.
    pub fn components(&self) -> &RenderComponents {
        &self.components
    }

    /// Mutable component storage.
    pub fn components_mut(&mut self) -> &mut RenderComponents {
        &mut self.components
    }

    fn view_targets(&self, index: usize) -> &ViewTargets {
        assert!(
            index < self.views.len(),
            "view index {index} out of range ({} views)",
            self.views.len()
        );
        &self.views[index]
    }

    fn attachments(&self, index: usize) -> ViewAttachments<'_> {
        match &self.msaa {
            Some(msaa) => ViewAttachments {
                color: &msaa.color.view,
                depth: &msaa.depth.view,
            },
            None => ViewAttachments {
                color: &self.views[index].color.view,
                depth: &self.views[index].depth.view,
            },
        }
    }

    fn object_bindings(&self) -> ObjectBindings<'_> {
        ObjectBindings {
            bind_group: &self.object_bind_group,
            buffer: &self.objects,
        }
    }

    fn frame_bindings(&self, index: usize) -> FrameBindings<'_> {
        FrameBindings {
            scene: &self.scene_bind_group,
            view: &self.views[index].bind_group,
            objects: self.object_bindings(),
        }
    }

    fn upload_objects(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, draws: &[Draw]) {
        if self.objects.reserve(device, draws.len()) {
            self.object_bind_group = create_object_bind_group(device, &self.layouts, &self.objects);
        }
        let uniforms: Vec<ObjectUniform> = draws
            .iter()
            .map(|draw| ObjectUniform::new(draw.renderable.model_matrix(), draw.receive_shadow))
            .collect();
        self.objects.write(queue, &uniforms);
    }

    fn upload_scene(
        &self,
        queue: &wgpu::Queue,
        sun: Option<DirectionalLight>,
        point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
        point_light_count: u32,
        shadows_active: bool,
    ) {
        let resolution = self.settings.resolution();
        let mut scene = SceneUniform {
            point_lights,
            resolution: resolution.to_array(),
            inv_resolution: resolution.recip().to_array(),
            time: self.started.elapsed().as_secs_f32(),
            active_point_lights: point_light_count,
            sunlight_active: u32::from(sun.is_some()),
            shadows_active: u32::from(shadows_active),
            ..Default::default()
        };
        if let Some(sun) = sun {
            scene.directional_light = sun.uniform();
        }
        if shadows_active {
            for (i, cascade) in self.cascades.cascades().iter().enumerate() {
                scene.cascade_matrices[i] = cascade.shadow_matrix.to_cols_array_2d();
                scene.cascade_planes[i] = [
                    cascade.split.x,
                    cascade.split.y,
                    cascade.light_near,
                    cascade.light_far,
                ];
            }
        }
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&scene));
    }

    /// Upload each distinct material once, with the shadow and IBL hooks.
    fn update_materials(&self, queue: &wgpu::Queue, payload: &RenderPayload, draws: &[Draw], shadows_active: bool) {
        let binding = ShadowBinding {
            cascade_count: self.cascades.cascades().len() as u32,
            resolution: self.cascades.resolution,
        };
        let mut updated: HashSet<MaterialId> = HashSet::new();
        for draw in draws {
            let material = &draw.material;
            if !updated.insert(material.id()) {
                continue;
            }
            material.update_uniforms(queue);
            if !material.receives_lighting() {
                continue;
            }
            if shadows_active {
                material.update_shadow_uniforms(queue, &binding);
            }
            if let Some(ibl) = &payload.ibl {
                material.update_ibl_uniforms(queue, ibl);
            }
        }
    }
}

/// View 0, or the merged center view of a stereo pair. Cascades are fitted
/// to it and queue distances are measured from its eye.
fn culling_view(views: &[ViewData]) -> ViewData {
    match views {
        [left, right] => merged_center_view(left, right),
        _ => views[0],
    }
}

/// Frusta the shared render queue is culled against: the merged center view
/// for a stereo pair, otherwise one per view.
fn culling_frustums(views: &[ViewData]) -> Vec<Frustum> {
    match views {
        [left, right] => vec![Frustum::from_view_proj(
            merged_center_view(left, right).view_proj_matrix,
        )],
        _ => views
            .iter()
            .map(|view| Frustum::from_view_proj(view.view_proj_matrix))
            .collect(),
    }
}

/// Material-major queue of the draws visible from any of `frustums`, sorted
/// by distance from `eye`.
///
/// A draw with zero radius is never culled.
fn build_render_queue(eye: Vec3, frustums: &[Frustum], draws: &[Draw]) -> RenderQueue {
    let mut queue = RenderQueue::new();
    for (slot, draw) in draws.iter().enumerate() {
        let position = draw.renderable.position();
        let visible = draw.radius <= 0.0
            || frustums
                .iter()
                .any(|frustum| frustum.intersects_sphere(position, draw.radius));
        if !visible {
            continue;
        }
        queue.push(eye, draw.renderable.entity, slot, draw.material.id(), position);
    }
    queue.sort_material_major();
    queue
}

fn create_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("PBR Render Encoder"),
    })
}

/// Submit recorded work so uniform writes that follow apply only to later
/// passes.
fn flush(device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) {
    let recorded = std::mem::replace(encoder, create_encoder(device));
    queue.submit(Some(recorded.finish()));
}

fn create_object_bind_group(
    device: &wgpu::Device,
    layouts: &FrameLayouts,
    objects: &DynamicUniformBuffer,
) -> wgpu::BindGroup {
    create_uniform_bind_group(
        device,
        &layouts.object,
        &objects.buffer,
        objects.binding_size(),
        "Object",
    )
}

fn create_view_targets(
    device: &wgpu::Device,
    settings: &RendererSettings,
    layouts: &FrameLayouts,
    tonemap_layout: Option<&wgpu::BindGroupLayout>,
    index: u32,
) -> ViewTargets {
    let size = settings.render_size;
    let usage = gpu_resources::view_texture_usage();
    let color = gpu_resources::create_target(
        device,
        &format!("View {index} Color"),
        formats::COLOR,
        size,
        1,
        usage,
    );
    let depth = gpu_resources::create_target(
        device,
        &format!("View {index} Depth"),
        formats::DEPTH,
        size,
        1,
        usage,
    );
    let post = settings.tonemap_enabled.then(|| {
        gpu_resources::create_target(
            device,
            &format!("View {index} Post"),
            formats::POST,
            size,
            1,
            usage,
        )
    });
    let tonemap_bind_group = tonemap_layout.map(|layout| {
        gpu_resources::create_texture_bind_group(device, layout, &color.view, &format!("View {index} Tonemap"))
    });

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("View {index} Uniform Buffer")),
        contents: bytemuck::bytes_of(&ViewUniform::zeroed()),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = create_uniform_bind_group(
        device,
        &layouts.view,
        &uniform_buffer,
        None,
        &format!("View {index}"),
    );

    tracing::debug!("Allocated targets for view {}", index);

    ViewTargets {
        color,
        depth,
        post,
        uniform_buffer,
        bind_group,
        tonemap_bind_group,
    }
}

fn create_msaa_targets(device: &wgpu::Device, settings: &RendererSettings) -> MsaaTargets {
    let size = settings.render_size;
    let samples = settings.msaa_samples;
    let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    let color = gpu_resources::create_target(device, "MSAA Color", formats::COLOR, size, samples, usage);
    let depth = gpu_resources::create_target(device, "MSAA Depth", formats::DEPTH, size, samples, usage);

    let layout = gpu_resources::create_texture_bind_group_layout(
        device,
        "Depth Resolve",
        wgpu::TextureSampleType::Depth,
        true,
    );
    let depth_resolve_bind_group =
        gpu_resources::create_texture_bind_group(device, &layout, &depth.view, "Depth Resolve");
    let bind_group_layouts = [&layout];
    let depth_resolve_pipeline = PipelineConfig::new(
        "Depth Resolve",
        include_str!("../shaders/depth_resolve.wgsl"),
        None,
        Some(formats::DEPTH),
        &bind_group_layouts,
    )
    .with_cull_mode(None)
    .with_depth(true, wgpu::CompareFunction::Always)
    .with_frag_depth()
    .build(device);

    tracing::info!("Allocated x{} multisampled targets", samples);

    MsaaTargets {
        color,
        depth,
        depth_resolve_pipeline,
        depth_resolve_bind_group,
    }
}

impl<D> System<D> for PbrRenderSystem
where
    D: ComponentSource<MeshComponent>
        + ComponentSource<MaterialComponent>
        + ComponentSource<PointLightComponent>
        + ComponentSource<DirectionalLightComponent>,
{
    fn name(&self) -> &str {
        "pbr_render"
    }

    fn subscriptions(&self) -> Vec<PolyTypeId> {
        self.components.subscriptions()
    }

    fn create(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool {
        self.components.create(entity, type_id, data)
    }

    fn destroy(&mut self, entity: Entity) {
        self.components.destroy(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pm_core::Pose;

    use crate::material::{Drawable, Material};
    use crate::payload::Renderable;

    struct NullMesh;

    impl Drawable for NullMesh {
        fn draw(&self, _pass: &mut wgpu::RenderPass<'_>) {}
    }

    struct NullMaterial(u64);

    impl Material for NullMaterial {
        fn id(&self) -> MaterialId {
            MaterialId(self.0)
        }
        fn update_uniforms(&self, _queue: &wgpu::Queue) {}
        fn bind(&self, _pass: &mut wgpu::RenderPass<'_>) {}
    }

    fn draw(entity: u64, material: u64, position: Vec3, radius: f32) -> Draw {
        Draw {
            renderable: Renderable {
                entity: Entity(entity),
                world_pose: Pose::from_translation(position),
                scale: Vec3::ONE,
            },
            mesh: Arc::new(NullMesh),
            material: Arc::new(NullMaterial(material)),
            cast_shadow: true,
            receive_shadow: true,
            radius,
        }
    }

    fn camera() -> ViewData {
        ViewData::perspective(0, Pose::IDENTITY, 1.0, 1.0, 0.1, 100.0)
    }

    fn queue_for(views: &[ViewData], draws: &[Draw]) -> RenderQueue {
        build_render_queue(culling_view(views).pose.position, &culling_frustums(views), draws)
    }

    #[test]
    fn test_render_queue_culls_outside_frustum() {
        let draws = vec![
            draw(0, 1, Vec3::new(0.0, 0.0, -5.0), 1.0),
            draw(1, 1, Vec3::new(0.0, 0.0, 5.0), 1.0),
            draw(2, 1, Vec3::new(0.0, 0.0, 5.0), 0.0),
        ];
        let queue = queue_for(&[camera()], &draws);
        assert_eq!(queue.entities(), vec![Entity(0), Entity(2)]);
    }

    #[test]
    fn test_render_queue_material_major() {
        let draws = vec![
            draw(0, 2, Vec3::new(0.0, 0.0, -3.0), 1.0),
            draw(1, 1, Vec3::new(0.0, 0.0, -9.0), 1.0),
            draw(2, 1, Vec3::new(0.0, 0.0, -4.0), 1.0),
        ];
        let queue = queue_for(&[camera()], &draws);
        assert_eq!(queue.entities(), vec![Entity(2), Entity(1), Entity(0)]);
        assert_eq!(queue.entries()[0].slot, 2);
    }

    #[test]
    fn test_culling_view_merges_stereo_pair() {
        let left = ViewData::perspective(0, Pose::from_translation(Vec3::new(-0.03, 0.0, 0.0)), 1.0, 1.0, 0.1, 100.0);
        let right = ViewData::perspective(1, Pose::from_translation(Vec3::new(0.03, 0.0, 0.0)), 1.0, 1.0, 0.1, 100.0);

        let mono = culling_view(std::slice::from_ref(&left));
        assert!(mono.pose.position.abs_diff_eq(left.pose.position, 1e-6));

        let merged = culling_view(&[left, right]);
        assert!(merged.pose.position.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert_eq!(culling_frustums(&[left, right]).len(), 1);
    }

    #[test]
    fn test_render_queue_keeps_draws_seen_by_any_view() {
        let behind = Pose::new(glam::Quat::from_rotation_y(std::f32::consts::PI), Vec3::ZERO);
        let views = [
            camera(),
            ViewData::perspective(1, behind, 1.0, 1.0, 0.1, 100.0),
            ViewData::perspective(2, Pose::from_translation(Vec3::new(50.0, 0.0, 0.0)), 1.0, 1.0, 0.1, 100.0),
        ];
        let draws = vec![
            draw(5, 1, Vec3::new(0.0, 0.0, 5.0), 1.0),
            draw(6, 1, Vec3::new(0.0, 0.0, -5.0), 1.0),
            draw(7, 1, Vec3::new(0.0, 200.0, 0.0), 1.0),
        ];
        let queue = queue_for(&views, &draws);
        assert_eq!(queue.entities(), vec![Entity(5), Entity(6)]);
        assert_eq!(culling_frustums(&views).len(), 3);
    }
}
