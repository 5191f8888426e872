//! World-transform cache.
//!
//! Each joint carries a [`CacheState`]. Invariants:
//! - a `Dirty` joint has only `Dirty` descendants;
//! - a `Clean` joint has only `Clean` ancestors.
//!
//! Invalidation therefore stops at the first already-dirty joint, and a read
//! walks up only as far as the nearest clean ancestor before recomputing
//! top-down. Every joint is recomputed at most once per invalidation, no
//! matter how many joints a batch edit touched.

use nalgebra::{Matrix4, Vector3};

use crate::error::Result;
use crate::ids::JointId;
use crate::math::{matrix_translation, trs_matrix};
use crate::skeleton::Skeleton;

/// Staleness of a joint's cached world matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheState {
    Clean,
    Dirty,
}

impl Skeleton {
    /// Mark `start` and its descendants stale.
    pub(crate) fn invalidate(&mut self, start: JointId) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.slot_mut(id) else {
                continue;
            };
            if node.cache == CacheState::Dirty {
                continue;
            }
            node.cache = CacheState::Dirty;
            stack.extend(node.children.iter().copied());
        }
    }

    /// World matrix of `joint` (`parent_world * T * R * S`), recomputing stale
    /// ancestors top-down first.
    pub fn world_transform(&mut self, joint: JointId) -> Result<Matrix4<f32>> {
        let node = self.node(joint)?;
        if !node.is_dirty() {
            return Ok(node.world);
        }

        let mut chain = Vec::new();
        let mut base = Matrix4::identity();
        let mut cursor = Some(joint);
        while let Some(id) = cursor {
            let node = self.node(id)?;
            if !node.is_dirty() {
                base = node.world;
                break;
            }
            chain.push(id);
            cursor = node.parent;
        }

        for id in chain.into_iter().rev() {
            base = self.recompute(id, &base)?;
        }
        Ok(base)
    }

    /// World-space origin of `joint`.
    pub fn world_position(&mut self, joint: JointId) -> Result<Vector3<f32>> {
        self.world_transform(joint).map(|m| matrix_translation(&m))
    }

    /// Refresh every stale joint in one pre-order pass.
    pub fn update_world_transforms(&mut self) -> Result<()> {
        let Some(root) = self.root() else {
            return Ok(());
        };
        let mut stack = vec![(root, Matrix4::identity())];
        while let Some((id, parent_world)) = stack.pop() {
            let world = if self.node(id)?.is_dirty() {
                self.recompute(id, &parent_world)?
            } else {
                self.node(id)?.world
            };
            let node = self.node(id)?;
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
        Ok(())
    }

    fn recompute(&mut self, id: JointId, parent_world: &Matrix4<f32>) -> Result<Matrix4<f32>> {
        let node = self.node_mut(id)?;
        node.world = parent_world * trs_matrix(node.translation(), node.rotation(), node.scale());
        node.cache = CacheState::Clean;
        #[cfg(test)]
        {
            node.recomputes += 1;
        }
        Ok(node.world)
    }
}
