//! Skeleton: a joint arena with one root and a sid index.
//!
//! Joints live in an arena of slots addressed by [`JointId`]. Children are
//! owned by their parent through ordered `JointId` lists; the parent link is
//! a plain back-reference. The root is owned by the skeleton itself.
//!
//! The sid index is a snapshot. It is built by [`Skeleton::rebuild_index`]
//! and is not kept live across structural edits (`add_root`, `add_child`,
//! `remove_subtree`, `reparent`); callers rebuild before the next lookup.
//! A lookup against a stale index may return a joint that has since moved.
//!
//! Slots of removed joints stay in the arena as tombstones until the next
//! [`Skeleton::add_root`], which releases the whole arena. Handles are never
//! reissued, so a handle from a released arena reports `UnknownJoint`.

use hashbrown::HashMap;
use log::{debug, warn};
use nalgebra::{Quaternion, Vector3};

use crate::error::{Result, SkeletonError};
use crate::ids::{IdAllocator, JointId};
use crate::joint::JointNode;

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    id: String,
    nodes: Vec<Option<JointNode>>,
    /// Handle stored in `nodes[0]`.
    base: u32,
    live: usize,
    ids: IdAllocator,
    root: Option<JointId>,
    index: HashMap<String, JointId>,
    joint_sid_filter: Option<Vec<String>>,
}

impl Skeleton {
    /// Empty skeleton. An empty id is the unset id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Skeleton with `root` attached and the index built.
    pub fn with_root(id: impl Into<String>, root: JointNode) -> Self {
        let mut skel = Self::new(id);
        skel.add_root(root);
        skel.rebuild_index();
        skel
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    #[inline]
    pub fn root(&self) -> Option<JointId> {
        self.root
    }

    pub fn root_joint(&self) -> Option<&JointNode> {
        self.root.and_then(|r| self.joint(r))
    }

    /// Number of live joints.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn joint(&self, joint: JointId) -> Option<&JointNode> {
        let slot = self.slot(joint)?;
        self.nodes.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn slot_mut(&mut self, joint: JointId) -> Option<&mut JointNode> {
        let slot = self.slot(joint)?;
        self.nodes.get_mut(slot).and_then(Option::as_mut)
    }

    pub(crate) fn node(&self, joint: JointId) -> Result<&JointNode> {
        self.joint(joint).ok_or(SkeletonError::UnknownJoint { joint })
    }

    pub(crate) fn node_mut(&mut self, joint: JointId) -> Result<&mut JointNode> {
        self.slot_mut(joint).ok_or(SkeletonError::UnknownJoint { joint })
    }

    fn slot(&self, joint: JointId) -> Option<usize> {
        joint.0.checked_sub(self.base).map(|i| i as usize)
    }

    fn insert(&mut self, mut node: JointNode, parent: Option<JointId>) -> JointId {
        node.reset_links();
        node.parent = parent;
        let id = self.ids.alloc_joint();
        debug_assert_eq!(self.slot(id), Some(self.nodes.len()));
        self.nodes.push(Some(node));
        self.live += 1;
        id
    }

    // ----- structural edits -----

    /// Attach `node` as the root, discarding any previous tree.
    ///
    /// Every live joint belongs to the root's tree, so the arena is released
    /// as a whole, tombstones included.
    pub fn add_root(&mut self, node: JointNode) -> JointId {
        if let Some(old) = self.root.take() {
            debug!("skeleton '{}': replacing root {:?}", self.id, old);
        }
        self.nodes.clear();
        self.live = 0;
        self.base = self.ids.peek().0;
        let id = self.insert(node, None);
        self.root = Some(id);
        id
    }

    /// Append `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: JointId, node: JointNode) -> Result<JointId> {
        self.node(parent)?;
        let id = self.insert(node, Some(parent));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove `joint` and everything below it. Removing the root empties the
    /// skeleton.
    pub fn remove_subtree(&mut self, joint: JointId) -> Result<()> {
        let parent = self.node(joint)?.parent;
        match parent {
            Some(p) => self.node_mut(p)?.children.retain(|&c| c != joint),
            None => self.root = None,
        }
        self.discard(joint);
        Ok(())
    }

    /// Move `joint` (with its subtree) to the end of `new_parent`'s children.
    pub fn reparent(&mut self, joint: JointId, new_parent: JointId) -> Result<()> {
        let old_parent = self
            .node(joint)?
            .parent
            .ok_or_else(|| SkeletonError::structure("the root cannot be re-parented"))?;
        self.node(new_parent)?;

        let mut cursor = Some(new_parent);
        while let Some(id) = cursor {
            if id == joint {
                return Err(SkeletonError::structure(format!(
                    "{joint:?} cannot be moved below its own descendant {new_parent:?}"
                )));
            }
            cursor = self.node(id)?.parent;
        }

        self.node_mut(old_parent)?.children.retain(|&c| c != joint);
        self.node_mut(new_parent)?.children.push(joint);
        self.node_mut(joint)?.parent = Some(new_parent);
        self.invalidate(joint);
        Ok(())
    }

    fn discard(&mut self, joint: JointId) {
        let mut stack = vec![joint];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slot(id) else {
                continue;
            };
            if let Some(node) = self.nodes.get_mut(slot).and_then(Option::take) {
                self.live -= 1;
                stack.extend(node.children);
            }
        }
    }

    // ----- traversal -----

    /// Joints reachable from the root, parents before children, siblings in
    /// insertion order.
    pub fn preorder(&self) -> Vec<JointId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<JointId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.joint(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn children(&self, joint: JointId) -> Result<&[JointId]> {
        Ok(self.node(joint)?.children())
    }

    pub fn parent(&self, joint: JointId) -> Result<Option<JointId>> {
        Ok(self.node(joint)?.parent)
    }

    /// Depth counted from the root, which has depth 1.
    pub fn depth(&self, joint: JointId) -> Result<usize> {
        let mut depth = 1;
        let mut cursor = self.node(joint)?.parent;
        while let Some(id) = cursor {
            depth += 1;
            cursor = self.node(id)?.parent;
        }
        Ok(depth)
    }

    /// Sids in pre-order.
    pub fn sids(&self) -> Vec<&str> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.joint(id).map(JointNode::sid))
            .collect()
    }

    // ----- sid index -----

    /// Rebuild the sid index from a full pre-order walk.
    ///
    /// Duplicate sids resolve to the joint visited last.
    pub fn rebuild_index(&mut self) {
        let order = self.preorder();
        let mut index = HashMap::with_capacity(order.len());
        for id in order {
            let Some(node) = self.joint(id) else {
                continue;
            };
            if let Some(prev) = index.insert(node.sid().to_string(), id) {
                warn!(
                    "skeleton '{}': duplicate sid '{}' ({:?} shadowed by {:?})",
                    self.id,
                    node.sid(),
                    prev,
                    id
                );
            }
        }
        debug!("skeleton '{}': indexed {} joints", self.id, index.len());
        self.index = index;
    }

    /// Joint registered under `sid` at the last rebuild.
    pub fn lookup(&self, sid: &str) -> Result<JointId> {
        self.index
            .get(sid)
            .copied()
            .filter(|&id| self.joint(id).is_some())
            .ok_or_else(|| SkeletonError::NotFound {
                sid: sid.to_string(),
            })
    }

    pub fn joint_by_sid(&self, sid: &str) -> Result<&JointNode> {
        let id = self.lookup(sid)?;
        self.node(id)
    }

    // ----- export filter -----

    /// Restrict which sids are written by the serializer. `None` exports
    /// every joint. The live tree and index are unaffected.
    pub fn set_joint_sid_filter(&mut self, sids: Option<Vec<String>>) {
        self.joint_sid_filter = sids;
    }

    pub fn joint_sid_filter(&self) -> Option<&[String]> {
        self.joint_sid_filter.as_deref()
    }

    /// Whether a joint with `sid` passes the export filter.
    pub fn exports_sid(&self, sid: &str) -> bool {
        match &self.joint_sid_filter {
            Some(filter) => filter.iter().any(|s| s == sid),
            None => true,
        }
    }

    #[cfg(test)]
    pub(crate) fn take_recompute_counts(&mut self) -> HashMap<String, u32> {
        self.nodes
            .iter_mut()
            .flatten()
            .map(|n| (n.sid().to_string(), std::mem::take(&mut n.recomputes)))
            .collect()
    }

    // ----- local transforms -----

    pub fn set_local_translation(&mut self, joint: JointId, t: Vector3<f32>) -> Result<()> {
        self.node_mut(joint)?.put_translation(t);
        self.invalidate(joint);
        Ok(())
    }

    pub fn set_local_rotation(&mut self, joint: JointId, q: Quaternion<f32>) -> Result<()> {
        self.node_mut(joint)?.put_rotation(q);
        self.invalidate(joint);
        Ok(())
    }

    pub fn set_local_scale(&mut self, joint: JointId, s: Vector3<f32>) -> Result<()> {
        self.node_mut(joint)?.put_scale(s);
        self.invalidate(joint);
        Ok(())
    }

    /// Reset every joint's local rotation to the identity.
    pub fn set_neutral_pose(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.put_rotation(Quaternion::identity());
        }
        if let Some(root) = self.root {
            self.invalidate(root);
        }
    }
}
