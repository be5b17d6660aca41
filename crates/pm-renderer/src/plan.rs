//! Pass sequencing for one frame.
//!
//! [`FramePlan::build`] turns the renderer settings into the ordered list of
//! passes [`PbrRenderSystem::render_frame`](crate::PbrRenderSystem::render_frame)
//! executes. Keeping the order as data makes it testable without a GPU.

use std::fmt;

use crate::settings::RendererSettings;

/// One step of a frame. View steps carry the view index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Render shadow casters into every cascade.
    Shadow,
    /// Upload the per-view uniform block.
    ViewUniforms(usize),
    /// Clear the view's color and depth targets.
    Clear(usize),
    /// Depth-only pass over the render queue.
    DepthPrepass(usize),
    /// Background.
    Skybox(usize),
    /// Shaded geometry.
    Forward(usize),
    /// Resolve the multisampled target into the view textures.
    Resolve(usize),
    /// Tonemap the view's color into its post texture.
    Tonemap(usize),
}

impl Pass {
    /// Profiler label.
    pub fn label(&self) -> &'static str {
        match self {
            Pass::Shadow => "shadow",
            Pass::ViewUniforms(_) => "view_uniforms",
            Pass::Clear(_) => "clear",
            Pass::DepthPrepass(_) => "depth_prepass",
            Pass::Skybox(_) => "skybox",
            Pass::Forward(_) => "forward",
            Pass::Resolve(_) => "resolve",
            Pass::Tonemap(_) => "tonemap",
        }
    }

    /// View index, or `None` for frame-wide passes.
    pub fn view(&self) -> Option<usize> {
        match *self {
            Pass::Shadow => None,
            Pass::ViewUniforms(i)
            | Pass::Clear(i)
            | Pass::DepthPrepass(i)
            | Pass::Skybox(i)
            | Pass::Forward(i)
            | Pass::Resolve(i)
            | Pass::Tonemap(i) => Some(i),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view() {
            Some(i) => write!(f, "{}[{}]", self.label(), i),
            None => f.write_str(self.label()),
        }
    }
}

/// Ordered passes for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    passes: Vec<Pass>,
}

impl FramePlan {
    /// Build the pass list.
    ///
    /// The shadow pass runs once before any view and only with a sun. Each
    /// view is cleared, optionally depth-prepassed, shaded and resolved in
    /// turn. Tonemapping runs after every view is complete.
    pub fn build(settings: &RendererSettings, has_sunlight: bool) -> Self {
        let views = settings.camera_count as usize;
        let mut passes = Vec::with_capacity(1 + views * 7);

        if settings.shadows_enabled && has_sunlight {
            passes.push(Pass::Shadow);
        }

        for i in 0..views {
            passes.push(Pass::ViewUniforms(i));
            passes.push(Pass::Clear(i));
            if settings.use_depth_prepass {
                passes.push(Pass::DepthPrepass(i));
            }
            passes.push(Pass::Skybox(i));
            passes.push(Pass::Forward(i));
            if settings.multisampled() {
                passes.push(Pass::Resolve(i));
            }
        }

        if settings.tonemap_enabled {
            passes.extend((0..views).map(Pass::Tonemap));
        }

        Self { passes }
    }

    /// Passes in execution order.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Whether `pass` is part of the plan.
    pub fn contains(&self, pass: Pass) -> bool {
        self.passes.contains(&pass)
    }

    /// Number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Returns true if the plan has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl fmt::Display for FramePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pass) in self.passes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{pass}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RendererSettings {
        RendererSettings {
            render_size: [64, 64],
            camera_count: 1,
            msaa_samples: 4,
            shadows_enabled: true,
            use_depth_prepass: true,
            tonemap_enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_mono_order() {
        let plan = FramePlan::build(&settings(), true);
        assert_eq!(
            plan.passes(),
            &[
                Pass::Shadow,
                Pass::ViewUniforms(0),
                Pass::Clear(0),
                Pass::DepthPrepass(0),
                Pass::Skybox(0),
                Pass::Forward(0),
                Pass::Resolve(0),
                Pass::Tonemap(0),
            ]
        );
    }

    #[test]
    fn test_shadow_requires_sun() {
        let plan = FramePlan::build(&settings(), false);
        assert!(!plan.contains(Pass::Shadow));

        let mut s = settings();
        s.shadows_enabled = false;
        assert!(!FramePlan::build(&s, true).contains(Pass::Shadow));
    }

    #[test]
    fn test_minimal_plan() {
        let s = RendererSettings {
            msaa_samples: 1,
            shadows_enabled: false,
            use_depth_prepass: false,
            tonemap_enabled: false,
            ..settings()
        };
        let plan = FramePlan::build(&s, true);
        assert_eq!(
            plan.passes(),
            &[Pass::ViewUniforms(0), Pass::Clear(0), Pass::Skybox(0), Pass::Forward(0)]
        );
    }

    #[test]
    fn test_stereo_views_run_in_sequence() {
        let s = RendererSettings {
            camera_count: 2,
            ..settings()
        };
        let plan = FramePlan::build(&s, true);
        assert_eq!(plan.passes()[0], Pass::Shadow);

        let forward_0 = plan.passes().iter().position(|p| *p == Pass::Forward(0));
        let uniforms_1 = plan.passes().iter().position(|p| *p == Pass::ViewUniforms(1));
        let tonemap_0 = plan.passes().iter().position(|p| *p == Pass::Tonemap(0));
        let resolve_1 = plan.passes().iter().position(|p| *p == Pass::Resolve(1));
        assert!(forward_0 < uniforms_1);
        assert!(resolve_1 < tonemap_0);
        assert_eq!(plan.passes().last(), Some(&Pass::Tonemap(1)));
        assert_eq!(plan.len(), 1 + 2 * 6 + 2);
    }

    #[test]
    fn test_display() {
        let s = RendererSettings {
            msaa_samples: 1,
            use_depth_prepass: false,
            tonemap_enabled: false,
            ..settings()
        };
        let plan = FramePlan::build(&s, true);
        assert_eq!(
            plan.to_string(),
            "shadow -> view_uniforms[0] -> clear[0] -> skybox[0] -> forward[0]"
        );
    }
}
