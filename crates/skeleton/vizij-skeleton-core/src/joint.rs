//! Joint nodes: local TRS, identifiers, and tree links.
//!
//! A `JointNode` is built detached (`JointNode::new(..).with_translation(..)`)
//! and then handed to a [`Skeleton`](crate::Skeleton), which owns it for the
//! rest of its life. Once attached, local transforms are only changed through
//! the skeleton so the world-transform cache sees every mutation.

use nalgebra::{Matrix4, Quaternion, Vector3};

use crate::ids::JointId;
use crate::math::{quat_from_xyzw, vec3_from_array};
use crate::transform::CacheState;

#[derive(Clone, Debug)]
pub struct JointNode {
    id: String,
    sid: String,
    translation: Vector3<f32>,
    rotation: Quaternion<f32>,
    scale: Vector3<f32>,
    pub(crate) parent: Option<JointId>,
    pub(crate) children: Vec<JointId>,
    pub(crate) world: Matrix4<f32>,
    pub(crate) cache: CacheState,
    #[cfg(test)]
    pub(crate) recomputes: u32,
}

impl JointNode {
    /// New joint with identity local transform.
    pub fn new(id: impl Into<String>, sid: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sid: sid.into(),
            translation: Vector3::zeros(),
            rotation: Quaternion::identity(),
            scale: Vector3::repeat(1.0),
            parent: None,
            children: Vec::new(),
            world: Matrix4::identity(),
            cache: CacheState::Dirty,
            #[cfg(test)]
            recomputes: 0,
        }
    }

    pub fn with_translation(mut self, t: [f32; 3]) -> Self {
        self.translation = vec3_from_array(t);
        self
    }

    /// Rotation as `[x, y, z, w]`; near-unit values are kept as given.
    pub fn with_rotation(mut self, q: [f32; 4]) -> Self {
        self.rotation = quat_from_xyzw(q);
        self
    }

    pub fn with_scale(mut self, s: [f32; 3]) -> Self {
        self.scale = vec3_from_array(s);
        self
    }

    /// Structural identifier (freeform).
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Symbolic identifier used for semantic lookup.
    #[inline]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<f32> {
        &self.translation
    }

    #[inline]
    pub fn rotation(&self) -> &Quaternion<f32> {
        &self.rotation
    }

    #[inline]
    pub fn scale(&self) -> &Vector3<f32> {
        &self.scale
    }

    #[inline]
    pub fn parent(&self) -> Option<JointId> {
        self.parent
    }

    /// Children in insertion order.
    #[inline]
    pub fn children(&self) -> &[JointId] {
        &self.children
    }

    /// Whether the cached world matrix is stale.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.cache == CacheState::Dirty
    }

    // Raw setters; callers are responsible for invalidating the cache.
    pub(crate) fn put_translation(&mut self, t: Vector3<f32>) {
        self.translation = t;
    }

    pub(crate) fn put_rotation(&mut self, q: Quaternion<f32>) {
        self.rotation = q;
    }

    pub(crate) fn put_scale(&mut self, s: Vector3<f32>) {
        self.scale = s;
    }

    /// Detach from any previous tree before insertion.
    pub(crate) fn reset_links(&mut self) {
        self.parent = None;
        self.children.clear();
        self.cache = CacheState::Dirty;
    }
}
