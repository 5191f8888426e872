//! Per-joint rotation records addressed by sid.
//!
//! Used by drivers that snapshot and restore a subset of joints (slider
//! panels, physics adapters) without holding arena handles.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{quat_from_xyzw, quat_to_xyzw};
use crate::skeleton::Skeleton;

/// Local rotation of one joint, `[x, y, z, w]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JointRotation {
    pub sid: String,
    pub rotation: [f32; 4],
}

impl JointRotation {
    pub fn new(sid: impl Into<String>, rotation: [f32; 4]) -> Self {
        Self {
            sid: sid.into(),
            rotation,
        }
    }
}

impl Skeleton {
    /// Capture the local rotations of `sids`, in the order given.
    pub fn joint_rotations<S: AsRef<str>>(&self, sids: &[S]) -> Result<Vec<JointRotation>> {
        let capture = |sid: &S| -> Result<JointRotation> {
            let sid = sid.as_ref();
            let rotation = quat_to_xyzw(self.joint_by_sid(sid)?.rotation());
            Ok(JointRotation::new(sid, rotation))
        };
        sids.iter().map(capture).collect()
    }

    /// Write rotations back by sid.
    ///
    /// Every sid is resolved before anything is written, so a miss leaves the
    /// skeleton untouched.
    pub fn apply_joint_rotations(&mut self, rotations: &[JointRotation]) -> Result<()> {
        let targets = rotations
            .iter()
            .map(|r| self.lookup(&r.sid))
            .collect::<Result<Vec<_>>>()?;
        for (joint, r) in targets.into_iter().zip(rotations) {
            self.set_local_rotation(joint, quat_from_xyzw(r.rotation))?;
        }
        Ok(())
    }
}
