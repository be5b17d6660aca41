//! Camera views and projection helpers.
//!
//! Projections follow glam's right-handed convention with clip-space depth in
//! `[0, 1]` (`Mat4::perspective_rh`).

use glam::{Mat4, Vec3, Vec4};

use pm_core::Pose;

/// One camera view for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewData {
    /// Index of the view (0 = left/mono, 1 = right).
    pub index: u32,
    /// Camera pose in world space.
    pub pose: Pose,
    /// World to view.
    pub view_matrix: Mat4,
    /// View to clip.
    pub projection_matrix: Mat4,
    /// World to clip.
    pub view_proj_matrix: Mat4,
    /// Near clip distance.
    pub near_clip: f32,
    /// Far clip distance.
    pub far_clip: f32,
}

impl ViewData {
    /// Build a view from a camera pose and projection.
    pub fn new(index: u32, pose: Pose, projection_matrix: Mat4) -> Self {
        let view_matrix = pose.view_matrix();
        let (near_clip, far_clip) = near_far_clip_from_projection(&projection_matrix);
        Self {
            index,
            pose,
            view_matrix,
            projection_matrix,
            view_proj_matrix: projection_matrix * view_matrix,
            near_clip,
            far_clip,
        }
    }

    /// Convenience constructor for a symmetric perspective camera.
    pub fn perspective(index: u32, pose: Pose, vfov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(index, pose, Mat4::perspective_rh(vfov, aspect, near, far))
    }

    /// Aspect ratio of the projection.
    pub fn aspect(&self) -> f32 {
        aspect_from_projection(&self.projection_matrix)
    }

    /// Vertical field of view of the projection, in radians.
    pub fn vfov(&self) -> f32 {
        vfov_from_projection(&self.projection_matrix)
    }
}

/// Width over height of a perspective projection.
pub fn aspect_from_projection(projection: &Mat4) -> f32 {
    projection.y_axis.y / projection.x_axis.x
}

/// Vertical field of view of a perspective projection, in radians.
pub fn vfov_from_projection(projection: &Mat4) -> f32 {
    2.0 * (1.0 / projection.y_axis.y).atan()
}

/// Near and far clip distances encoded in a perspective projection.
pub fn near_far_clip_from_projection(projection: &Mat4) -> (f32, f32) {
    let a = projection.z_axis.z;
    let b = projection.w_axis.z;
    (b / a, b / (a + 1.0))
}

/// Off-center right-handed perspective projection with depth in `[0, 1]`.
///
/// `left`, `right`, `bottom`, `top` are extents on the near plane.
pub fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let inv_w = 1.0 / (right - left);
    let inv_h = 1.0 / (top - bottom);
    let depth = far / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * inv_w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * inv_h, 0.0, 0.0),
        Vec4::new((right + left) * inv_w, (top + bottom) * inv_h, depth, -1.0),
        Vec4::new(0.0, 0.0, near * depth, 0.0),
    )
}

/// Tangents of the half-angles of a perspective projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumTangents {
    /// Left edge (negative for a centered frustum).
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge (negative for a centered frustum).
    pub bottom: f32,
    /// Top edge.
    pub top: f32,
}

impl FrustumTangents {
    /// Read the tangents out of a projection matrix.
    pub fn from_projection(projection: &Mat4) -> Self {
        let (sx, ox) = (projection.x_axis.x, projection.z_axis.x);
        let (sy, oy) = (projection.y_axis.y, projection.z_axis.y);
        Self {
            left: (ox - 1.0) / sx,
            right: (1.0 + ox) / sx,
            bottom: (oy - 1.0) / sy,
            top: (1.0 + oy) / sy,
        }
    }
}

/// Projection of a single view covering both eyes of a stereo pair.
///
/// Returns the combined projection and the offset, in the center eye's local
/// frame, by which the center eye must move back so that its frustum
/// contains both eye frusta.
pub fn compute_center_view(left: &Mat4, right: &Mat4, interocular: f32) -> (Mat4, Vec3) {
    let l = FrustumTangents::from_projection(left);
    let r = FrustumTangents::from_projection(right);

    let tan_left = l.left.min(r.left);
    let tan_right = l.right.max(r.right);
    let tan_bottom = l.bottom.min(r.bottom);
    let tan_top = l.top.max(r.top);

    let offset = interocular.abs() / (tan_right - tan_left);

    let (near, far) = near_far_clip_from_projection(left);
    let near = near + offset;
    let far = far + offset;

    let projection = frustum_rh(
        tan_left * near,
        tan_right * near,
        tan_bottom * near,
        tan_top * near,
        near,
        far,
    );
    (projection, Vec3::new(0.0, 0.0, offset))
}

/// Single view used for shadows and culling when rendering a stereo pair.
///
/// Positioned midway between the eyes with the left eye's orientation, then
/// pushed back so its superfrustum covers both eyes.
pub fn merged_center_view(left: &ViewData, right: &ViewData) -> ViewData {
    let pose = Pose::new(
        left.pose.orientation,
        (left.pose.position + right.pose.position) * 0.5,
    );

    let eye_delta = left.pose.orientation.inverse() * (right.pose.position - left.pose.position);
    let (projection_matrix, offset) =
        compute_center_view(&left.projection_matrix, &right.projection_matrix, eye_delta.x);

    let view_matrix = (pose.matrix() * Mat4::from_translation(offset)).inverse();
    let (near_clip, far_clip) = near_far_clip_from_projection(&projection_matrix);

    ViewData {
        index: left.index,
        pose,
        view_matrix,
        projection_matrix,
        view_proj_matrix: projection_matrix * view_matrix,
        near_clip,
        far_clip,
    }
}
