//! Additional math helpers layered on top of `glam`.

use glam::{Mat3, Quat, Vec3};

/// Integrates an orientation by the given angular velocity over `dt`.
pub fn integrate_rotation(rotation: Quat, angular: Vec3, dt: f32) -> Quat {
    let angle = angular.length() * dt;
    if angle.abs() < 1e-6 {
        return rotation;
    }
    let axis = angular.normalize();
    (Quat::from_axis_angle(axis, angle) * rotation).normalize()
}

/// Cross-product matrix: `skew(a) * b == a.cross(b)`.
pub fn skew(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

/// Component-wise absolute value of a matrix.
pub fn abs_mat3(m: Mat3) -> Mat3 {
    Mat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs())
}

/// Outer product `a * b^T`.
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Shifts an inertia tensor about the centre of mass to a point offset by `offset`.
pub fn parallel_axis(inertia: Mat3, mass: f32, offset: Vec3) -> Mat3 {
    inertia + (Mat3::from_diagonal(Vec3::splat(offset.length_squared())) - outer(offset, offset)) * mass
}

/// Rotates a body-frame tensor into the frame described by `rotation`.
pub fn rotate_tensor(tensor: Mat3, rotation: Mat3) -> Mat3 {
    rotation * tensor * rotation.transpose()
}

/// Inverse that returns zero instead of garbage for a singular tensor.
pub fn safe_inverse(m: Mat3) -> Mat3 {
    let det = m.determinant();
    if det.abs() <= f32::EPSILON || !det.is_finite() {
        Mat3::ZERO
    } else {
        m.inverse()
    }
}

/// Deterministic orthonormal pair perpendicular to `normal`.
pub fn tangent_basis(normal: Vec3) -> (Vec3, Vec3) {
    normal.any_orthonormal_pair()
}

/// Signed angle from `from` to `to` measured about `axis`, after projecting both onto
/// the plane perpendicular to `axis`.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let a = from - axis * from.dot(axis);
    let b = to - axis * to.dot(axis);
    a.cross(b).dot(axis).atan2(a.dot(b))
}

/// Rotation vector (axis * angle) of the shortest arc described by `q`.
pub fn rotation_vector(q: Quat) -> Vec3 {
    let q = if q.w < 0.0 { -q } else { q };
    q.to_scaled_axis()
}
