//! Math helpers:
//! - `[x, y, z, w]` arrays <-> nalgebra quaternions
//! - axis-angle quaternions (axis normalized, angle in radians)
//! - translate-rotate-scale matrix composition

use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};

/// Identity rotation in `[x, y, z, w]` order.
pub const IDENTITY_XYZW: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[inline]
pub fn quat_from_xyzw(q: [f32; 4]) -> Quaternion<f32> {
    Quaternion::new(q[3], q[0], q[1], q[2])
}

#[inline]
pub fn quat_to_xyzw(q: &Quaternion<f32>) -> [f32; 4] {
    [q.i, q.j, q.k, q.w]
}

#[inline]
pub fn vec3_from_array(v: [f32; 3]) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

#[inline]
pub fn vec3_to_array(v: &Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Rotation of `angle` radians about `axis`.
///
/// The axis is normalized first; a zero-length axis yields the identity.
pub fn axis_angle(axis: &Vector3<f32>, angle: f32) -> Quaternion<f32> {
    let len = axis.norm();
    if len <= f32::EPSILON {
        return Quaternion::identity();
    }
    let half = 0.5 * angle;
    let s = half.sin() / len;
    Quaternion::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
}

/// Local matrix `T * R * S`.
///
/// The rotation is used as stored; near-unit quaternions are not renormalized.
pub fn trs_matrix(
    translation: &Vector3<f32>,
    rotation: &Quaternion<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    let r = UnitQuaternion::new_unchecked(*rotation).to_homogeneous();
    Matrix4::new_translation(translation) * r * Matrix4::new_nonuniform_scaling(scale)
}

/// Translation column of an affine matrix.
#[inline]
pub fn matrix_translation(m: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}
