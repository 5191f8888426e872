//! Skeleton serialization.
//!
//! Both codecs go through one document model ([`SkeletonDoc`] / [`JointDoc`]).
//! Joints are stored as a flat pre-order list; each record carries the number
//! of direct children that follow it, so the tree shape is rebuilt without
//! recursion and nesting depth never depends on skeleton depth.
//! - `text`: JSON
//! - `binary`: magic + version header, then a bincode payload of the same
//!   document with length-prefixed sequences
//!
//! Decoding always builds a fresh [`Skeleton`]; nothing already in use is
//! touched on failure.

pub mod binary;
pub mod text;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkeletonError};
use crate::ids::JointId;
use crate::joint::JointNode;
use crate::math::{quat_to_xyzw, vec3_to_array};
use crate::skeleton::Skeleton;

/// Format tag carried by every encoded skeleton.
pub const FORMAT_TAG: &str = "vizij-skeleton";
/// Current document version.
pub const FORMAT_VERSION: u16 = 1;

/// Encoded skeleton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonDoc {
    pub format: String,
    pub version: u16,
    pub id: String,
    /// Export filter active when the document was written.
    pub joint_sids: Option<Vec<String>>,
    /// Joints in pre-order, root first. Empty when the skeleton has no root.
    pub joints: Vec<JointDoc>,
}

/// Encoded joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointDoc {
    pub id: String,
    pub sid: String,
    pub translation: [f32; 3],
    /// `[x, y, z, w]`
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    /// Direct children; their subtrees follow this record in order.
    pub child_count: u32,
}

impl JointDoc {
    fn from_node(node: &JointNode) -> Self {
        Self {
            id: node.id().to_string(),
            sid: node.sid().to_string(),
            translation: vec3_to_array(node.translation()),
            rotation: quat_to_xyzw(node.rotation()),
            scale: vec3_to_array(node.scale()),
            child_count: 0,
        }
    }

    fn to_node(&self) -> JointNode {
        JointNode::new(self.id.as_str(), self.sid.as_str())
            .with_translation(self.translation)
            .with_rotation(self.rotation)
            .with_scale(self.scale)
    }

    fn validate(&self) -> Result<()> {
        let finite = self
            .translation
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .all(|v| v.is_finite());
        if !finite {
            return Err(SkeletonError::decode(format!(
                "joint '{}' has non-finite transform values",
                self.id
            )));
        }
        Ok(())
    }
}

impl SkeletonDoc {
    /// Snapshot `skeleton`, honouring its export filter.
    ///
    /// Joints whose sid is filtered out are skipped and their exported
    /// descendants attach to the nearest exported ancestor. The root is
    /// always written.
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut joints: Vec<JointDoc> = Vec::new();
        // (joint, record index of its nearest exported ancestor)
        let mut stack: Vec<(JointId, Option<usize>)> =
            skeleton.root().map(|r| (r, None)).into_iter().collect();
        while let Some((id, exported_parent)) = stack.pop() {
            let Some(node) = skeleton.joint(id) else {
                continue;
            };
            let keep = exported_parent.is_none() || skeleton.exports_sid(node.sid());
            let parent_ix = if keep {
                if let Some(p) = exported_parent {
                    joints[p].child_count += 1;
                }
                joints.push(JointDoc::from_node(node));
                Some(joints.len() - 1)
            } else {
                exported_parent
            };
            stack.extend(node.children().iter().rev().map(|&c| (c, parent_ix)));
        }
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            id: skeleton.id().to_string(),
            joint_sids: skeleton.joint_sid_filter().map(<[String]>::to_vec),
            joints,
        }
    }

    /// Number of encoded joints.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Build a fresh skeleton with its index rebuilt.
    pub fn to_skeleton(&self) -> Result<Skeleton> {
        if self.format != FORMAT_TAG {
            return Err(SkeletonError::decode(format!(
                "expected format '{FORMAT_TAG}', found '{}'",
                self.format
            )));
        }
        if self.version != FORMAT_VERSION {
            return Err(SkeletonError::decode(format!(
                "unsupported skeleton version {}",
                self.version
            )));
        }

        let mut skeleton = Skeleton::new(self.id.as_str());
        let mut records = self.joints.iter();
        if let Some(root) = records.next() {
            root.validate()?;
            let root_id = skeleton.add_root(root.to_node());
            // (joint, children still to attach)
            let mut open: Vec<(JointId, u32)> = vec![(root_id, root.child_count)];
            for doc in records {
                doc.validate()?;
                while open.last().is_some_and(|&(_, left)| left == 0) {
                    open.pop();
                }
                let Some((parent, left)) = open.last_mut() else {
                    return Err(SkeletonError::decode(format!(
                        "joint '{}' follows a completed root subtree",
                        doc.id
                    )));
                };
                *left -= 1;
                let parent = *parent;
                let id = skeleton.add_child(parent, doc.to_node())?;
                open.push((id, doc.child_count));
            }
            let missing: u64 = open.iter().map(|&(_, left)| u64::from(left)).sum();
            if missing > 0 {
                return Err(SkeletonError::decode(format!(
                    "skeleton truncated: {missing} child joints missing"
                )));
            }
        }
        skeleton.set_joint_sid_filter(self.joint_sids.clone());
        skeleton.rebuild_index();
        debug!(
            "decoded skeleton '{}' with {} joints",
            skeleton.id(),
            skeleton.len()
        );
        Ok(skeleton)
    }
}

impl Skeleton {
    /// Pretty JSON encoding.
    pub fn to_json(&self) -> Result<String> {
        text::to_json_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        text::from_json_str(s)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        binary::to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        binary::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Skeleton {
        let mut s = Skeleton::new("filtered");
        let root = s.add_root(JointNode::new("vj0", "root"));
        let hip = s.add_child(root, JointNode::new("vj01", "rhip")).unwrap();
        let knee = s.add_child(hip, JointNode::new("vj011", "rknee")).unwrap();
        s.add_child(knee, JointNode::new("vj0110", "rfoot"))
            .unwrap();
        s.add_child(root, JointNode::new("vj00", "lhip")).unwrap();
        s
    }

    fn layout(doc: &SkeletonDoc) -> Vec<(&str, u32)> {
        doc.joints
            .iter()
            .map(|j| (j.sid.as_str(), j.child_count))
            .collect()
    }

    #[test]
    fn records_are_preorder_with_child_counts() {
        let doc = SkeletonDoc::from_skeleton(&tree());
        assert_eq!(
            layout(&doc),
            vec![("root", 2), ("rhip", 1), ("rknee", 1), ("rfoot", 0), ("lhip", 0)]
        );
    }

    #[test]
    fn filter_hoists_kept_descendants() {
        let mut s = tree();
        s.set_joint_sid_filter(Some(vec!["rhip".into(), "rfoot".into()]));
        let doc = SkeletonDoc::from_skeleton(&s);
        assert_eq!(layout(&doc), vec![("root", 1), ("rhip", 1), ("rfoot", 0)]);
        assert_eq!(doc.joint_count(), 3);
        assert_eq!(
            doc.joint_sids,
            Some(vec!["rhip".to_string(), "rfoot".to_string()])
        );
    }

    #[test]
    fn filtered_out_joint_passes_children_up() {
        let mut s = tree();
        s.set_joint_sid_filter(Some(vec!["rknee".into(), "rfoot".into(), "lhip".into()]));
        let doc = SkeletonDoc::from_skeleton(&s);
        assert_eq!(
            layout(&doc),
            vec![("root", 2), ("rknee", 1), ("rfoot", 0), ("lhip", 0)]
        );
        let back = doc.to_skeleton().unwrap();
        let knee = back.lookup("rknee").unwrap();
        assert_eq!(back.parent(knee).unwrap(), back.root());
    }

    #[test]
    fn empty_skeleton_has_no_joints() {
        let doc = SkeletonDoc::from_skeleton(&Skeleton::new("empty"));
        assert!(doc.joints.is_empty());
        let back = doc.to_skeleton().unwrap();
        assert_eq!(back.id(), "empty");
        assert!(back.is_empty());
    }

    #[test]
    fn rejects_foreign_tag_and_version() {
        let mut doc = SkeletonDoc::from_skeleton(&tree());
        doc.format = "collada".into();
        assert!(matches!(
            doc.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));
        let mut doc = SkeletonDoc::from_skeleton(&tree());
        doc.version = 99;
        assert!(matches!(
            doc.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut doc = SkeletonDoc::from_skeleton(&tree());
        doc.joints[1].scale = [f32::NAN, 1.0, 1.0];
        assert!(matches!(
            doc.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));
    }

    #[test]
    fn rejects_inconsistent_child_counts() {
        let mut missing = SkeletonDoc::from_skeleton(&tree());
        missing.joints.pop();
        assert!(matches!(
            missing.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));

        let mut overflow = SkeletonDoc::from_skeleton(&tree());
        overflow.joints[0].child_count = 1;
        assert!(matches!(
            overflow.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));

        let mut huge = SkeletonDoc::from_skeleton(&tree());
        huge.joints[3].child_count = u32::MAX;
        assert!(matches!(
            huge.to_skeleton(),
            Err(SkeletonError::Decode { .. })
        ));
    }
}
