//! Renderer settings
//!
//! Settings fix which GPU resources the render system allocates. They are
//! read once at construction; changing them means building a new renderer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{shadow, viewport};

/// Errors from validating or (de)serializing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Render size must be positive, got {0}x{1}")]
    InvalidRenderSize(u32, u32),
    #[error("Camera count must be at least 1")]
    InvalidCameraCount,
    #[error("Unsupported MSAA sample count: {0}")]
    InvalidSampleCount(u32),
    #[error("Shadow resolution must be positive")]
    InvalidShadowResolution,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Cascaded shadow configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CascadeConfig {
    /// Width and height of each cascade layer.
    pub resolution: u32,
    /// Split placement: 0 is linear, 1 is logarithmic.
    pub split_lambda: f32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            resolution: shadow::DEFAULT_RESOLUTION,
            split_lambda: shadow::DEFAULT_SPLIT_LAMBDA,
        }
    }
}

/// Render system configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RendererSettings {
    /// Width and height of every per-view target.
    pub render_size: [u32; 2],
    /// Number of views rendered per frame (1 mono, 2 stereo).
    pub camera_count: u32,
    /// MSAA sample count (1 disables multisampling).
    pub msaa_samples: u32,
    /// Allocate and render the cascaded shadow map.
    pub shadows_enabled: bool,
    /// Run a depth-only pass before shading.
    pub use_depth_prepass: bool,
    /// Tonemap the resolved color into a display texture.
    pub tonemap_enabled: bool,
    /// Record CPU timings for each stage.
    #[serde(default)]
    pub performance_profiling: bool,
    /// Cascade parameters.
    #[serde(default)]
    pub shadow: CascadeConfig,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            render_size: viewport::RENDER_SIZE,
            camera_count: 1,
            msaa_samples: viewport::SAMPLE_COUNT,
            shadows_enabled: true,
            use_depth_prepass: false,
            tonemap_enabled: true,
            performance_profiling: false,
            shadow: CascadeConfig::default(),
        }
    }
}

impl RendererSettings {
    /// Settings for a two-view stereo renderer.
    pub fn stereo(render_size: [u32; 2]) -> Self {
        Self {
            render_size,
            camera_count: 2,
            ..Default::default()
        }
    }

    /// Check the settings for values the renderer cannot allocate.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let [w, h] = self.render_size;
        if w == 0 || h == 0 {
            return Err(SettingsError::InvalidRenderSize(w, h));
        }
        if self.camera_count == 0 {
            return Err(SettingsError::InvalidCameraCount);
        }
        if !matches!(self.msaa_samples, 1 | 2 | 4 | 8) {
            return Err(SettingsError::InvalidSampleCount(self.msaa_samples));
        }
        if self.shadows_enabled && self.shadow.resolution == 0 {
            return Err(SettingsError::InvalidShadowResolution);
        }
        Ok(())
    }

    /// Returns true when rendering goes through a multisampled target.
    pub fn multisampled(&self) -> bool {
        self.msaa_samples > 1
    }

    /// Render size as a float vector.
    pub fn resolution(&self) -> glam::Vec2 {
        glam::Vec2::new(self.render_size[0] as f32, self.render_size[1] as f32)
    }

    /// Parse settings from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize settings to pretty RON text.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load settings from a RON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Save settings to a RON file.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
