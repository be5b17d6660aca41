//! Light sources.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use pm_core::{Component, Entity};

use crate::constants::lighting::MAX_POINT_LIGHTS;
use crate::uniforms::{DirectionalLightUniform, PointLightUniform};

/// Omnidirectional light with a finite range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Distance at which the contribution reaches zero.
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            radius: 4.0,
        }
    }
}

impl PointLight {
    /// Shader representation.
    pub fn uniform(&self) -> PointLightUniform {
        PointLightUniform {
            position: self.position.to_array(),
            radius: self.radius,
            color: self.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Infinitely distant light (the sun).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Direction the light travels.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub amount: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            amount: 1.0,
        }
    }
}

impl DirectionalLight {
    /// Create a light travelling along `direction`.
    pub fn new(direction: Vec3, color: Vec3, amount: f32) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y),
            color,
            amount,
        }
    }

    /// Shader representation.
    pub fn uniform(&self) -> DirectionalLightUniform {
        DirectionalLightUniform {
            direction: self.direction.normalize_or(Vec3::NEG_Y).to_array(),
            amount: self.amount,
            color: self.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Point light attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Disabled lights are skipped when packing.
    pub enabled: bool,
    /// Light parameters.
    pub data: PointLight,
}

impl Component for PointLightComponent {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            enabled: true,
            data: PointLight::default(),
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

/// Directional light attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Disabled lights are ignored.
    pub enabled: bool,
    /// Light parameters.
    pub data: DirectionalLight,
}

impl Component for DirectionalLightComponent {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            enabled: true,
            data: DirectionalLight::default(),
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

/// Pack lights into the fixed-size uniform array.
///
/// Returns the array and the number of valid entries.
///
/// # Panics
///
/// Panics if more than [`MAX_POINT_LIGHTS`] lights are given.
pub fn pack_point_lights<'a>(
    lights: impl IntoIterator<Item = &'a PointLight>,
) -> ([PointLightUniform; MAX_POINT_LIGHTS], u32) {
    let mut packed = [PointLightUniform::default(); MAX_POINT_LIGHTS];
    let mut count = 0;
    for light in lights {
        assert!(
            count < MAX_POINT_LIGHTS,
            "too many point lights (max {MAX_POINT_LIGHTS})"
        );
        packed[count] = light.uniform();
        count += 1;
    }
    (packed, count as u32)
}
