//! View frustum for culling.

use glam::{Mat4, Vec3, Vec4};

/// A plane in 3D space (`normal · p + distance = 0`).
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal pointing into the frustum.
    pub normal: Vec3,
    /// Signed distance term.
    pub distance: f32,
}

impl Plane {
    /// Creates a plane from normal and distance.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Builds a normalized plane from raw `(a, b, c, d)` coefficients.
    fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self::new(normal / len, v.w / len)
        } else {
            Self::new(Vec3::ZERO, v.w)
        }
    }

    /// Returns the signed distance from a point to the plane.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Frustum for view culling.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the six planes of a view-projection matrix with depth in `[0, 1]`.
    pub fn from_view_proj(view_proj: Mat4) -> Self {
        let row0 = view_proj.row(0);
        let row1 = view_proj.row(1);
        let row2 = view_proj.row(2);
        let row3 = view_proj.row(3);

        let planes = [
            Plane::from_coefficients(row3 + row0), // left
            Plane::from_coefficients(row3 - row0), // right
            Plane::from_coefficients(row3 + row1), // bottom
            Plane::from_coefficients(row3 - row1), // top
            Plane::from_coefficients(row2),        // near
            Plane::from_coefficients(row3 - row2), // far
        ];

        Self { planes }
    }

    /// Returns true if a point is inside the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// Returns true if a sphere intersects the frustum.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(center) >= -radius)
    }
}
